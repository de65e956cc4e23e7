//! End-to-end poll cycles against a scripted runtime

use alertd::alerts::{AlertBatch, EventKind, NotificationManager, Notifier, TemplateSet};
use alertd::config::ContainerConfig;
use alertd::domain::{ContainerState, UsageSnapshot};
use alertd::error::{ChannelError, RuntimeError};
use alertd::runtime::{classify_response, ContainerRuntime};
use alertd::services::{Monitor, MonitorConfig};

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// What the runtime answers for one container
#[derive(Clone)]
enum Script {
    Missing,
    Down(String),
    Rejected(u16, String),
    Present(ContainerState, UsageSnapshot),
}

#[derive(Default)]
struct ScriptedRuntime {
    scripts: Mutex<HashMap<String, Script>>,
    samples: Mutex<usize>,
}

impl ScriptedRuntime {
    fn set(&self, name: &str, script: Script) {
        self.scripts
            .lock()
            .unwrap()
            .insert(name.to_string(), script);
    }

    fn running(&self, name: &str, usage: UsageSnapshot) {
        self.set(name, Script::Present(ContainerState::running(), usage));
    }

    fn samples(&self) -> usize {
        *self.samples.lock().unwrap()
    }

    fn script(&self, name: &str) -> Script {
        self.scripts
            .lock()
            .unwrap()
            .get(name)
            .cloned()
            .unwrap_or(Script::Missing)
    }
}

impl ContainerRuntime for ScriptedRuntime {
    fn inspect(&self, name: &str) -> Result<ContainerState, RuntimeError> {
        match self.script(name) {
            Script::Missing => Err(RuntimeError::NotFound(format!(
                "No such container: {}",
                name
            ))),
            Script::Down(reason) => Err(RuntimeError::Transport(reason)),
            Script::Rejected(status, body) => Err(classify_response(status, body)),
            Script::Present(state, _) => Ok(state),
        }
    }

    fn stats(&self, name: &str) -> Result<UsageSnapshot, RuntimeError> {
        *self.samples.lock().unwrap() += 1;
        match self.script(name) {
            Script::Present(_, usage) => Ok(usage),
            _ => Err(RuntimeError::Transport("no stats".to_string())),
        }
    }
}

#[derive(Default)]
struct Inbox {
    batches: Mutex<Vec<AlertBatch>>,
}

impl Inbox {
    fn kinds(&self) -> Vec<Vec<EventKind>> {
        self.batches
            .lock()
            .unwrap()
            .iter()
            .map(|b| b.events().iter().map(|e| e.kind).collect())
            .collect()
    }
}

impl Notifier for Inbox {
    fn notify(&self, batch: &AlertBatch) -> Result<(), ChannelError> {
        self.batches.lock().unwrap().push(batch.clone());
        Ok(())
    }

    fn name(&self) -> &str {
        "inbox"
    }
}

fn monitor(container: ContainerConfig) -> (Monitor, Arc<Inbox>) {
    let inbox = Arc::new(Inbox::default());
    let mut notifier = NotificationManager::new(Duration::from_secs(5));
    notifier.add_notifier(inbox.clone());

    let config = MonitorConfig {
        interval: Duration::from_secs(5),
        iterations: 0,
        shutdown_grace: Duration::from_secs(1),
    };
    let containers = vec![alertd::alerts::MonitoredContainer::from_config(&container)];
    (
        Monitor::new(config, containers, TemplateSet::defaults(), notifier),
        inbox,
    )
}

fn cycle_kinds(monitor: &Monitor) -> Vec<EventKind> {
    monitor.alerts().events().iter().map(|e| e.kind).collect()
}

#[test]
fn cpu_breach_alerts_once_and_recovers() {
    let runtime = ScriptedRuntime::default();
    let mut container = ContainerConfig::new("web");
    container.max_cpu = Some(80);
    let (mut monitor, inbox) = monitor(container);
    let t0 = Instant::now();

    runtime.running("web", UsageSnapshot::default().with_cpu_percent(85));
    monitor.run_cycle(&runtime, t0);
    assert_eq!(cycle_kinds(&monitor), vec![EventKind::CpuFailure]);

    monitor.run_cycle(&runtime, t0 + Duration::from_secs(5));
    assert!(cycle_kinds(&monitor).is_empty());

    runtime.running("web", UsageSnapshot::default().with_cpu_percent(70));
    monitor.run_cycle(&runtime, t0 + Duration::from_secs(10));
    assert_eq!(cycle_kinds(&monitor), vec![EventKind::CpuRecovery]);

    assert_eq!(
        inbox.kinds(),
        vec![vec![EventKind::CpuFailure], vec![EventKind::CpuRecovery]]
    );
}

#[test]
fn memory_breach_waits_for_delay_window() {
    let runtime = ScriptedRuntime::default();
    let mut container = ContainerConfig::new("db");
    container.max_mem = Some(500);
    container.delay_seconds = Some(10);
    let (mut monitor, inbox) = monitor(container);
    let t0 = Instant::now();

    runtime.running("db", UsageSnapshot::default().with_memory_mb(600));
    monitor.run_cycle(&runtime, t0);
    monitor.run_cycle(&runtime, t0 + Duration::from_secs(5));
    assert!(inbox.kinds().is_empty());

    monitor.run_cycle(&runtime, t0 + Duration::from_secs(10));
    assert_eq!(inbox.kinds(), vec![vec![EventKind::MemoryFailure]]);
}

#[test]
fn transient_memory_breach_is_filtered() {
    let runtime = ScriptedRuntime::default();
    let mut container = ContainerConfig::new("db");
    container.max_mem = Some(500);
    container.delay_seconds = Some(10);
    let (mut monitor, inbox) = monitor(container);
    let t0 = Instant::now();

    runtime.running("db", UsageSnapshot::default().with_memory_mb(600));
    monitor.run_cycle(&runtime, t0);
    monitor.run_cycle(&runtime, t0 + Duration::from_secs(5));
    runtime.running("db", UsageSnapshot::default().with_memory_mb(400));
    monitor.run_cycle(&runtime, t0 + Duration::from_secs(8));

    runtime.running("db", UsageSnapshot::default().with_memory_mb(600));
    monitor.run_cycle(&runtime, t0 + Duration::from_secs(12));
    monitor.run_cycle(&runtime, t0 + Duration::from_secs(17));
    assert!(inbox.kinds().is_empty());

    monitor.run_cycle(&runtime, t0 + Duration::from_secs(22));
    assert_eq!(inbox.kinds(), vec![vec![EventKind::MemoryFailure]]);
}

#[test]
fn process_count_below_minimum() {
    let runtime = ScriptedRuntime::default();
    let mut container = ContainerConfig::new("worker");
    container.min_procs = Some(5);
    let (mut monitor, _inbox) = monitor(container);
    let now = Instant::now();

    runtime.running("worker", UsageSnapshot::default().with_pids(3));
    monitor.run_cycle(&runtime, now);
    assert_eq!(cycle_kinds(&monitor), vec![EventKind::MinProcFailure]);

    monitor.run_cycle(&runtime, now);
    assert!(cycle_kinds(&monitor).is_empty());

    runtime.running("worker", UsageSnapshot::default().with_pids(6));
    monitor.run_cycle(&runtime, now);
    assert_eq!(cycle_kinds(&monitor), vec![EventKind::MinProcRecovery]);
}

#[test]
fn intentionally_stopped_container_skips_metrics() {
    let runtime = ScriptedRuntime::default();
    let mut container = ContainerConfig::new("backup");
    container.expected_running = Some(false);
    container.max_cpu = Some(1);
    let (mut monitor, _inbox) = monitor(container);
    let now = Instant::now();

    runtime.set(
        "backup",
        Script::Present(
            ContainerState::stopped(),
            UsageSnapshot::default().with_cpu_percent(99),
        ),
    );
    monitor.run_cycle(&runtime, now);
    assert!(cycle_kinds(&monitor).is_empty());

    runtime.running("backup", UsageSnapshot::default().with_cpu_percent(99));
    monitor.run_cycle(&runtime, now);
    assert_eq!(cycle_kinds(&monitor), vec![EventKind::RunningFailure]);
    assert_eq!(runtime.samples(), 0);
}

#[test]
fn missing_container_alerts_once_then_recovers() {
    let runtime = ScriptedRuntime::default();
    let (mut monitor, inbox) = monitor(ContainerConfig::new("ghost"));
    let now = Instant::now();

    for _ in 0..3 {
        monitor.run_cycle(&runtime, now);
    }
    runtime.running("ghost", UsageSnapshot::default());
    monitor.run_cycle(&runtime, now);

    assert_eq!(
        inbox.kinds(),
        vec![vec![EventKind::ExistFailure], vec![EventKind::ExistRecovery]]
    );
}

#[test]
fn missing_container_waits_for_delay_window() {
    let runtime = ScriptedRuntime::default();
    let mut container = ContainerConfig::new("ghost");
    container.max_mem = Some(100);
    container.delay_seconds = Some(10);
    let (mut monitor, inbox) = monitor(container);
    let t0 = Instant::now();

    monitor.run_cycle(&runtime, t0);
    monitor.run_cycle(&runtime, t0 + Duration::from_secs(5));
    assert!(inbox.kinds().is_empty());
    assert_eq!(runtime.samples(), 0);

    monitor.run_cycle(&runtime, t0 + Duration::from_secs(10));
    runtime.running("ghost", UsageSnapshot::default());
    monitor.run_cycle(&runtime, t0 + Duration::from_secs(15));

    assert_eq!(
        inbox.kinds(),
        vec![vec![EventKind::ExistFailure], vec![EventKind::ExistRecovery]]
    );
    assert_eq!(runtime.samples(), 0);
}

#[test]
fn foreign_not_found_answers_are_communication_errors() {
    let runtime = ScriptedRuntime::default();
    let mut container = ContainerConfig::new("web");
    container.delay_seconds = Some(10);
    let (mut monitor, inbox) = monitor(container);
    let t0 = Instant::now();

    runtime.set("web", Script::Rejected(404, "404 page not found".to_string()));
    for secs in [0, 5, 10] {
        monitor.run_cycle(&runtime, t0 + Duration::from_secs(secs));
    }

    assert_eq!(inbox.kinds(), vec![vec![EventKind::GenericError]; 3]);
}

#[test]
fn communication_errors_alert_every_cycle() {
    let runtime = ScriptedRuntime::default();
    let mut container = ContainerConfig::new("web");
    container.max_cpu = Some(80);
    let (mut monitor, inbox) = monitor(container);
    let now = Instant::now();

    runtime.set("web", Script::Down("connection refused".to_string()));
    for _ in 0..3 {
        monitor.run_cycle(&runtime, now);
    }

    assert_eq!(inbox.kinds().len(), 3);
    assert!(inbox
        .kinds()
        .iter()
        .all(|kinds| kinds == &vec![EventKind::GenericError]));
    assert_eq!(runtime.samples(), 0);
}
