//! Shell command execution and process environment.

pub mod command;
pub mod interrupt;
pub mod platform;

pub use command::{execute, CommandOptions, CommandResult};
pub use interrupt::{install_handler, interrupted};
pub use platform::{is_ci, is_elevated};
