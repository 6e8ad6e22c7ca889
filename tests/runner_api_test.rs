//! Integration tests for a full run through the public API.
//!
//! Hosts are simulated: a prober backed by a shared set of installed tools,
//! a mock inspector for pre-flight, and closure actions that "install" by
//! adding to that set.

use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::path::Path;
use std::rc::Rc;

use rigup::catalog::{Catalog, Category};
use rigup::config::{resolve, CategoryOverrides, Configuration, RigupConfig};
use rigup::error::RigupError;
use rigup::fetch::{Fetcher, RetryPolicy, Transfer};
use rigup::preflight::{MockInspector, PreflightOptions, BYTES_PER_GB};
use rigup::runner::{Orchestrator, RunProgress};
use rigup::session::Session;
use rigup::steps::{
    ActionContext, ActionFailure, ActionOutput, CapabilityProber, FnAction, InstallStep,
    StepOutcome,
};
use tempfile::TempDir;

type Installed = Rc<RefCell<HashSet<String>>>;

struct SimulatedHost(Installed);

impl CapabilityProber for SimulatedHost {
    fn is_present(&self, identifier: &str) -> bool {
        self.0.borrow().contains(identifier)
    }
}

struct Offline;

impl Transfer for Offline {
    fn transfer(&self, url: &str, _dest: &Path) -> anyhow::Result<()> {
        anyhow::bail!("no network for {}", url)
    }
}

fn never() -> bool {
    false
}

fn fetcher() -> Fetcher {
    Fetcher::new(Box::new(Offline), RetryPolicy::default())
}

/// A step whose action records the tool as installed.
fn installs(id: &'static str, host: &Installed, calls: &Rc<Cell<u32>>) -> InstallStep {
    let host = Rc::clone(host);
    let calls = Rc::clone(calls);
    InstallStep::new(
        id,
        format!("install {}", id),
        Box::new(FnAction::new(id, move |_ctx: &ActionContext<'_>| {
            calls.set(calls.get() + 1);
            host.borrow_mut().insert(id.to_string());
            Ok(ActionOutput::new(format!("{} installed", id)))
        })),
    )
}

/// A step whose installer always exits non-zero.
fn broken(id: &'static str, calls: &Rc<Cell<u32>>) -> InstallStep {
    let calls = Rc::clone(calls);
    InstallStep::new(
        id,
        format!("install {}", id),
        Box::new(FnAction::new(id, move |_ctx: &ActionContext<'_>| {
            calls.set(calls.get() + 1);
            Err(ActionFailure::new("installer exited with status 1").with_output("E: boom"))
        })),
    )
}

fn workstation(host: &Installed, calls: &Rc<Cell<u32>>) -> Vec<Category> {
    vec![
        Category::new(
            "system",
            "System basics",
            vec![installs("git", host, calls), installs("curl", host, calls)],
        ),
        Category::new(
            "containers",
            "Container tooling",
            vec![broken("docker", calls), installs("kubectl", host, calls)],
        ),
        Category::new(
            "languages",
            "Language toolchains",
            vec![installs("node", host, calls), installs("go", host, calls)],
        ),
    ]
}

fn names() -> Vec<&'static str> {
    vec!["system", "containers", "languages"]
}

#[test]
fn second_run_skips_everything_already_installed() {
    let temp = TempDir::new().unwrap();
    let host: Installed = Rc::default();
    let calls = Rc::new(Cell::new(0));
    let prober = SimulatedHost(Rc::clone(&host));
    let inspector = MockInspector::default();
    let fetcher = fetcher();
    let orchestrator =
        Orchestrator::new(&prober, &inspector, &fetcher, PreflightOptions::default())
            .with_interrupt_check(never);
    let config = Configuration::builder(names())
        .skip(&["containers".to_string()])
        .unwrap()
        .build();

    let mut session = Session::start(temp.path()).unwrap();
    let first = orchestrator
        .execute(&config, workstation(&host, &calls), &mut session, |_| {})
        .unwrap();
    session.finish().unwrap();

    assert_eq!(first.succeeded, 4);
    assert_eq!(calls.get(), 4);

    let mut session = Session::start(temp.path()).unwrap();
    let second = orchestrator
        .execute(&config, workstation(&host, &calls), &mut session, |_| {})
        .unwrap();
    session.finish().unwrap();

    assert_eq!(second.total_steps, 4);
    assert_eq!(second.skipped, 4);
    assert_eq!(second.succeeded, 0);
    assert_eq!(calls.get(), 4, "no action may run on the second pass");
}

#[test]
fn failing_step_does_not_stop_the_run() {
    let temp = TempDir::new().unwrap();
    let host: Installed = Rc::default();
    let calls = Rc::new(Cell::new(0));
    let prober = SimulatedHost(Rc::clone(&host));
    let inspector = MockInspector::default();
    let fetcher = fetcher();
    let orchestrator =
        Orchestrator::new(&prober, &inspector, &fetcher, PreflightOptions::default())
            .with_interrupt_check(never);
    let mut session = Session::start(temp.path()).unwrap();

    let summary = orchestrator
        .execute(
            &Configuration::all_enabled(),
            workstation(&host, &calls),
            &mut session,
            |_| {},
        )
        .unwrap();

    assert_eq!(summary.total_steps, 6);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.succeeded, 5);
    let failed: Vec<_> = summary.failures().map(|r| r.step.as_str()).collect();
    assert_eq!(failed, vec!["docker"]);
    assert!(host.borrow().contains("kubectl"));
    assert!(host.borrow().contains("go"));

    let log = std::fs::read_to_string(session.log.path()).unwrap();
    assert!(log.contains("installer exited with status 1"));
    assert!(log.contains("E: boom"));
}

#[test]
fn low_disk_aborts_before_any_step() {
    let temp = TempDir::new().unwrap();
    let host: Installed = Rc::default();
    let calls = Rc::new(Cell::new(0));
    let prober = SimulatedHost(Rc::clone(&host));
    let inspector = MockInspector {
        free_bytes: 2 * BYTES_PER_GB,
        ..MockInspector::default()
    };
    let fetcher = fetcher();
    let orchestrator =
        Orchestrator::new(&prober, &inspector, &fetcher, PreflightOptions::default());
    let mut session = Session::start(temp.path()).unwrap();

    let err = orchestrator
        .execute(
            &Configuration::all_enabled(),
            workstation(&host, &calls),
            &mut session,
            |_| {},
        )
        .unwrap_err();

    assert!(matches!(err, RigupError::Preflight { ref check, .. } if check == "disk"));
    assert_eq!(err.exit_code(), 1);
    assert_eq!(calls.get(), 0);
    assert!(host.borrow().is_empty());
}

#[test]
fn only_languages_runs_one_category() {
    let temp = TempDir::new().unwrap();
    let host: Installed = Rc::default();
    let calls = Rc::new(Cell::new(0));
    let prober = SimulatedHost(Rc::clone(&host));
    let inspector = MockInspector::default();
    let fetcher = fetcher();
    let orchestrator =
        Orchestrator::new(&prober, &inspector, &fetcher, PreflightOptions::default())
            .with_interrupt_check(never);
    let config = Configuration::builder(names())
        .only(&["languages".to_string()])
        .unwrap()
        .build();
    let mut session = Session::start(temp.path()).unwrap();
    let mut started = Vec::new();
    let mut passed_over = Vec::new();

    let summary = orchestrator
        .execute(
            &config,
            workstation(&host, &calls),
            &mut session,
            |event| match event {
                RunProgress::CategoryStarting { category, .. } => {
                    started.push(category.name.clone())
                }
                RunProgress::CategorySkipped { category } => {
                    passed_over.push(category.name.clone())
                }
                _ => {}
            },
        )
        .unwrap();

    assert_eq!(started, vec!["languages"]);
    assert_eq!(passed_over, vec!["system", "containers"]);
    assert_eq!(summary.skipped_categories, vec!["system", "containers"]);
    assert!(summary.results.iter().all(|r| r.category == "languages"));
    assert_eq!(calls.get(), 2);
}

#[test]
fn dry_run_invokes_no_action() {
    let temp = TempDir::new().unwrap();
    let host: Installed = Rc::default();
    let calls = Rc::new(Cell::new(0));
    let prober = SimulatedHost(Rc::clone(&host));
    let inspector = MockInspector::default();
    let fetcher = fetcher();
    let orchestrator =
        Orchestrator::new(&prober, &inspector, &fetcher, PreflightOptions::default())
            .with_options(rigup::steps::ExecutionOptions { dry_run: true })
            .with_interrupt_check(never);
    let mut session = Session::start(temp.path()).unwrap();

    let summary = orchestrator
        .execute(
            &Configuration::all_enabled(),
            workstation(&host, &calls),
            &mut session,
            |_| {},
        )
        .unwrap();

    assert_eq!(calls.get(), 0);
    assert!(summary.dry_run);
    assert!(summary
        .results
        .iter()
        .all(|r| r.outcome == StepOutcome::Succeeded
            && r.detail.as_deref().is_some_and(|d| d.starts_with("would run:"))));
}

#[test]
fn builtin_catalog_resolves_with_config_edits() {
    let config: RigupConfig = serde_yaml::from_str(
        r#"
categories:
  cloud: false
skip_steps: [htop]
"#,
    )
    .unwrap();

    let resolved = resolve(
        &config,
        Catalog::builtin().unwrap(),
        &CategoryOverrides {
            only: vec![],
            skip: vec!["databases".to_string()],
        },
    )
    .unwrap();

    let categories = resolved.catalog.build();
    assert_eq!(categories.len(), 6);
    assert!(!resolved.configuration.is_enabled("cloud"));
    assert!(!resolved.configuration.is_enabled("databases"));
    assert!(resolved.configuration.is_enabled("languages"));
    assert!(categories
        .iter()
        .flat_map(|c| &c.steps)
        .all(|s| s.identifier() != "htop"));
}
