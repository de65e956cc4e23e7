//! Per-container check orchestration
//!
//! Each cycle runs the checks of one container in a fixed order: existence,
//! running state, then the usage metrics. Metrics are skipped whenever the
//! container is missing, intentionally stopped, or has just changed state.

use super::batch::AlertBatch;
use super::check::{MetricCheck, StaticCheck};
use super::template::TemplateSet;
use super::types::Metric;
use crate::config::ContainerConfig;
use crate::domain::ContainerState;
use crate::error::RuntimeError;
use crate::runtime::ContainerRuntime;
use std::time::Instant;

/// Classified result of inspecting a container
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Existence {
    /// The runtime knows the container
    Found(ContainerState),
    /// The runtime reported that the container does not exist
    Absent,
    /// Any other failure talking to the runtime
    Unreachable(RuntimeError),
}

impl Existence {
    /// Classify an inspection result
    pub fn classify(result: Result<ContainerState, RuntimeError>) -> Self {
        match result {
            Ok(state) => Self::Found(state),
            Err(e) if e.is_not_found() => Self::Absent,
            Err(e) => Self::Unreachable(e),
        }
    }

    /// Whether the container was found
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }
}

/// How far evaluation got this cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Stopped before the usage metrics
    ShortCircuited,
    /// No usage limit configured, nothing sampled
    NoMetrics,
    /// Usage sampled and every enabled metric check evaluated
    MetricsChecked,
    /// Usage sampling failed; a generic error was recorded
    SampleFailed,
}

/// One monitored container and the checks it owns
#[derive(Debug, Clone)]
pub struct MonitoredContainer {
    name: String,
    existence: StaticCheck,
    running: StaticCheck,
    cpu: MetricCheck,
    pids: MetricCheck,
    memory: MetricCheck,
    batch: AlertBatch,
}

impl MonitoredContainer {
    /// Build the checks for one configured container
    pub fn from_config(config: &ContainerConfig) -> Self {
        let delay = config.delay();
        Self {
            name: config.name.clone(),
            existence: StaticCheck::existence(delay),
            running: StaticCheck::running(config.expected_running, delay),
            cpu: MetricCheck::new(Metric::Cpu, config.max_cpu, delay),
            pids: MetricCheck::new(Metric::MinProcs, config.min_procs, delay),
            memory: MetricCheck::new(Metric::Memory, config.max_mem, delay),
            batch: AlertBatch::new(),
        }
    }

    /// Container name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Events emitted during the last cycle
    pub fn batch(&self) -> &AlertBatch {
        &self.batch
    }

    /// Existence check
    pub fn existence(&self) -> &StaticCheck {
        &self.existence
    }

    /// Running state check
    pub fn running(&self) -> &StaticCheck {
        &self.running
    }

    /// Usage checks in evaluation order
    pub fn metrics(&self) -> [&MetricCheck; 3] {
        [&self.cpu, &self.pids, &self.memory]
    }

    /// Run one evaluation cycle against `runtime`
    pub fn evaluate<R>(&mut self, runtime: &R, templates: &TemplateSet, now: Instant) -> CycleOutcome
    where
        R: ContainerRuntime + ?Sized,
    {
        self.batch.clear();

        let existence = Existence::classify(runtime.inspect(&self.name));
        match &existence {
            Existence::Found(_) => {
                self.existence
                    .evaluate_existence(&self.name, true, templates, now, &mut self.batch);
            }
            Existence::Absent => {
                self.existence
                    .evaluate_existence(&self.name, false, templates, now, &mut self.batch);
            }
            Existence::Unreachable(e) => {
                log::debug!("{}: inspect failed: {}", self.name, e);
                self.batch
                    .push(templates.generic_error(&self.name, &e.to_string()));
            }
        }

        if let Existence::Found(state) = &existence {
            self.running.evaluate_running(
                &self.name,
                state.running,
                templates,
                now,
                &mut self.batch,
            );
        }

        if self.should_stop(&existence) {
            log::debug!("{}: skipping usage checks", self.name);
            return CycleOutcome::ShortCircuited;
        }

        if !self.metrics().iter().any(|check| check.is_enabled()) {
            return CycleOutcome::NoMetrics;
        }

        let snapshot = match runtime.stats(&self.name) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                log::debug!("{}: stats failed: {}", self.name, e);
                self.batch
                    .push(templates.generic_error(&self.name, &e.to_string()));
                return CycleOutcome::SampleFailed;
            }
        };

        for check in [&mut self.cpu, &mut self.pids, &mut self.memory] {
            check.evaluate(&self.name, &snapshot, templates, now, &mut self.batch);
        }

        CycleOutcome::MetricsChecked
    }

    /// Whether the usage metrics must be skipped this cycle
    ///
    /// Metrics are only sampled from a container that was found this cycle.
    /// This also covers a breach still inside its delay window.
    fn should_stop(&self, existence: &Existence) -> bool {
        self.running.is_active()
            || self.existence.is_active()
            || self.running.expected() == Some(false)
            || self.batch.has_pending()
            || !existence.is_found()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerts::types::EventKind;
    use crate::domain::UsageSnapshot;
    use crate::mock::MockRuntime;
    use std::time::Duration;

    fn container(name: &str) -> ContainerConfig {
        ContainerConfig::new(name)
    }

    fn kinds(monitored: &MonitoredContainer) -> Vec<EventKind> {
        monitored.batch().events().iter().map(|e| e.kind).collect()
    }

    #[test]
    fn test_classify() {
        assert!(Existence::classify(Ok(ContainerState::running())).is_found());
        assert_eq!(
            Existence::classify(Err(RuntimeError::NotFound(
                "No such container: web".into()
            ))),
            Existence::Absent
        );
        assert!(matches!(
            Existence::classify(Err(RuntimeError::Transport("refused".into()))),
            Existence::Unreachable(_)
        ));
    }

    #[test]
    fn test_cpu_scenario() {
        let runtime = MockRuntime::new()
            .with_container("web", ContainerState::running(), UsageSnapshot::default());
        let templates = TemplateSet::defaults();
        let mut config = container("web");
        config.max_cpu = Some(80);
        let mut web = MonitoredContainer::from_config(&config);
        let now = Instant::now();

        runtime.set_usage("web", UsageSnapshot::default().with_cpu_percent(85));
        assert_eq!(web.evaluate(&runtime, &templates, now), CycleOutcome::MetricsChecked);
        assert_eq!(kinds(&web), vec![EventKind::CpuFailure]);
        assert!(web.metrics()[0].state().is_active());

        web.evaluate(&runtime, &templates, now);
        assert!(web.batch().is_empty());

        runtime.set_usage("web", UsageSnapshot::default().with_cpu_percent(70));
        web.evaluate(&runtime, &templates, now);
        assert_eq!(kinds(&web), vec![EventKind::CpuRecovery]);
        assert!(!web.metrics()[0].state().is_active());
    }

    #[test]
    fn test_memory_debounce_scenario() {
        let usage = UsageSnapshot::default().with_memory_mb(600);
        let runtime = MockRuntime::new().with_container("db", ContainerState::running(), usage);
        let templates = TemplateSet::defaults();
        let mut config = container("db");
        config.max_mem = Some(500);
        config.delay_seconds = Some(10);
        let mut db = MonitoredContainer::from_config(&config);
        let t0 = Instant::now();

        db.evaluate(&runtime, &templates, t0);
        assert!(db.batch().is_empty());
        db.evaluate(&runtime, &templates, t0 + Duration::from_secs(5));
        assert!(db.batch().is_empty());
        db.evaluate(&runtime, &templates, t0 + Duration::from_secs(10));
        assert_eq!(kinds(&db), vec![EventKind::MemoryFailure]);
    }

    #[test]
    fn test_min_procs_scenario() {
        let runtime = MockRuntime::new().with_container(
            "worker",
            ContainerState::running(),
            UsageSnapshot::default().with_pids(3),
        );
        let templates = TemplateSet::defaults();
        let mut config = container("worker");
        config.min_procs = Some(5);
        let mut worker = MonitoredContainer::from_config(&config);
        let now = Instant::now();

        worker.evaluate(&runtime, &templates, now);
        assert_eq!(kinds(&worker), vec![EventKind::MinProcFailure]);
        worker.evaluate(&runtime, &templates, now);
        assert!(worker.batch().is_empty());

        runtime.set_usage("worker", UsageSnapshot::default().with_pids(6));
        worker.evaluate(&runtime, &templates, now);
        assert_eq!(kinds(&worker), vec![EventKind::MinProcRecovery]);
    }

    #[test]
    fn test_expected_stopped_short_circuits() {
        let runtime = MockRuntime::new().with_container(
            "batch",
            ContainerState::stopped(),
            UsageSnapshot::default().with_cpu_percent(99),
        );
        let templates = TemplateSet::defaults();
        let mut config = container("batch");
        config.expected_running = Some(false);
        config.max_cpu = Some(10);
        let mut job = MonitoredContainer::from_config(&config);
        let now = Instant::now();

        assert_eq!(job.evaluate(&runtime, &templates, now), CycleOutcome::ShortCircuited);
        assert!(job.batch().is_empty());

        runtime.set_state("batch", ContainerState::running());
        assert_eq!(job.evaluate(&runtime, &templates, now), CycleOutcome::ShortCircuited);
        assert_eq!(kinds(&job), vec![EventKind::RunningFailure]);
        assert_eq!(runtime.stats_calls("batch"), 0);
    }

    #[test]
    fn test_absent_container_scenario() {
        let runtime = MockRuntime::new();
        let templates = TemplateSet::defaults();
        let mut config = container("ghost");
        config.max_cpu = Some(50);
        let mut ghost = MonitoredContainer::from_config(&config);
        let now = Instant::now();

        ghost.evaluate(&runtime, &templates, now);
        assert_eq!(kinds(&ghost), vec![EventKind::ExistFailure]);
        ghost.evaluate(&runtime, &templates, now);
        assert!(ghost.batch().is_empty());
        ghost.evaluate(&runtime, &templates, now);
        assert!(ghost.batch().is_empty());
        assert!(ghost.existence().is_active());

        runtime.set_state("ghost", ContainerState::running());
        assert_eq!(ghost.evaluate(&runtime, &templates, now), CycleOutcome::ShortCircuited);
        assert_eq!(kinds(&ghost), vec![EventKind::ExistRecovery]);
        assert_eq!(runtime.stats_calls("ghost"), 0);

        assert_eq!(ghost.evaluate(&runtime, &templates, now), CycleOutcome::MetricsChecked);
        assert_eq!(runtime.stats_calls("ghost"), 1);
    }

    #[test]
    fn test_communication_errors_repeat_every_cycle() {
        let runtime = MockRuntime::new()
            .with_container("web", ContainerState::running(), UsageSnapshot::default());
        runtime.fail_inspect("web", RuntimeError::Transport("connection refused".into()));
        let templates = TemplateSet::defaults();
        let mut web = MonitoredContainer::from_config(&container("web"));
        let now = Instant::now();

        for _ in 0..3 {
            assert_eq!(web.evaluate(&runtime, &templates, now), CycleOutcome::ShortCircuited);
            assert_eq!(kinds(&web), vec![EventKind::GenericError]);
            assert!(!web.existence().is_active());
        }
        assert!(web.batch().events()[0]
            .error
            .as_deref()
            .is_some_and(|e| e.contains("connection refused")));
    }

    #[test]
    fn test_foreign_404_repeats_every_cycle() {
        let runtime = MockRuntime::new();
        runtime.fail_inspect(
            "web",
            RuntimeError::Api {
                status: 404,
                message: "404 page not found".into(),
            },
        );
        let templates = TemplateSet::defaults();
        let mut config = container("web");
        config.delay_seconds = Some(10);
        let mut web = MonitoredContainer::from_config(&config);
        let t0 = Instant::now();

        for secs in [0, 5, 10] {
            web.evaluate(&runtime, &templates, t0 + Duration::from_secs(secs));
            assert_eq!(kinds(&web), vec![EventKind::GenericError]);
        }
        assert!(!web.existence().is_active());
        assert!(!web.existence().state().is_delaying());
    }

    #[test]
    fn test_delayed_absence() {
        let runtime = MockRuntime::new();
        let templates = TemplateSet::defaults();
        let mut config = container("ghost");
        config.max_cpu = Some(50);
        config.delay_seconds = Some(10);
        let mut ghost = MonitoredContainer::from_config(&config);
        let t0 = Instant::now();

        assert_eq!(ghost.evaluate(&runtime, &templates, t0), CycleOutcome::ShortCircuited);
        assert!(ghost.batch().is_empty());
        assert!(ghost.existence().state().is_delaying());

        ghost.evaluate(&runtime, &templates, t0 + Duration::from_secs(5));
        assert!(ghost.batch().is_empty());
        assert_eq!(runtime.stats_calls("ghost"), 0);

        ghost.evaluate(&runtime, &templates, t0 + Duration::from_secs(10));
        assert_eq!(kinds(&ghost), vec![EventKind::ExistFailure]);

        runtime.set_state("ghost", ContainerState::running());
        ghost.evaluate(&runtime, &templates, t0 + Duration::from_secs(15));
        assert_eq!(kinds(&ghost), vec![EventKind::ExistRecovery]);
        assert_eq!(runtime.stats_calls("ghost"), 0);
    }

    #[test]
    fn test_short_absence_is_filtered() {
        let runtime = MockRuntime::new();
        let templates = TemplateSet::defaults();
        let mut config = container("web");
        config.delay_seconds = Some(10);
        let mut web = MonitoredContainer::from_config(&config);
        let t0 = Instant::now();

        web.evaluate(&runtime, &templates, t0);
        runtime.set_state("web", ContainerState::running());
        web.evaluate(&runtime, &templates, t0 + Duration::from_secs(5));
        assert!(web.batch().is_empty());
        assert!(!web.existence().state().is_delaying());

        runtime.remove("web");
        web.evaluate(&runtime, &templates, t0 + Duration::from_secs(12));
        assert!(web.batch().is_empty());
    }

    #[test]
    fn test_delayed_running_mismatch() {
        let runtime = MockRuntime::new().with_container(
            "web",
            ContainerState::stopped(),
            UsageSnapshot::default(),
        );
        let templates = TemplateSet::defaults();
        let mut config = container("web");
        config.expected_running = Some(true);
        config.delay_seconds = Some(10);
        let mut web = MonitoredContainer::from_config(&config);
        let t0 = Instant::now();

        web.evaluate(&runtime, &templates, t0);
        assert!(web.batch().is_empty());
        assert!(web.running().state().is_delaying());

        web.evaluate(&runtime, &templates, t0 + Duration::from_secs(5));
        assert!(web.batch().is_empty());

        assert_eq!(
            web.evaluate(&runtime, &templates, t0 + Duration::from_secs(10)),
            CycleOutcome::ShortCircuited
        );
        assert_eq!(kinds(&web), vec![EventKind::RunningFailure]);

        web.evaluate(&runtime, &templates, t0 + Duration::from_secs(15));
        assert!(web.batch().is_empty());

        runtime.set_state("web", ContainerState::running());
        web.evaluate(&runtime, &templates, t0 + Duration::from_secs(20));
        assert_eq!(kinds(&web), vec![EventKind::RunningRecovery]);
    }

    #[test]
    fn test_running_failure_blocks_metrics() {
        let runtime = MockRuntime::new().with_container(
            "web",
            ContainerState::stopped(),
            UsageSnapshot::default().with_cpu_percent(99),
        );
        let templates = TemplateSet::defaults();
        let mut config = container("web");
        config.expected_running = Some(true);
        config.max_cpu = Some(50);
        let mut web = MonitoredContainer::from_config(&config);
        let now = Instant::now();

        web.evaluate(&runtime, &templates, now);
        assert_eq!(kinds(&web), vec![EventKind::RunningFailure]);
        web.evaluate(&runtime, &templates, now);
        assert!(web.batch().is_empty());
        assert_eq!(runtime.stats_calls("web"), 0);
    }

    #[test]
    fn test_sample_failure_reports_once() {
        let runtime = MockRuntime::new()
            .with_container("web", ContainerState::running(), UsageSnapshot::default());
        runtime.fail_stats("web", RuntimeError::Decode("bad json".into()));
        let templates = TemplateSet::defaults();
        let mut config = container("web");
        config.max_cpu = Some(50);
        config.max_mem = Some(50);
        let mut web = MonitoredContainer::from_config(&config);

        assert_eq!(
            web.evaluate(&runtime, &templates, Instant::now()),
            CycleOutcome::SampleFailed
        );
        assert_eq!(kinds(&web), vec![EventKind::GenericError]);
    }

    #[test]
    fn test_metric_order() {
        let usage = UsageSnapshot::default()
            .with_cpu_percent(90)
            .with_pids(1)
            .with_memory_mb(900);
        let runtime = MockRuntime::new().with_container("web", ContainerState::running(), usage);
        let templates = TemplateSet::defaults();
        let mut config = container("web");
        config.max_cpu = Some(50);
        config.min_procs = Some(2);
        config.max_mem = Some(500);
        let mut web = MonitoredContainer::from_config(&config);

        web.evaluate(&runtime, &templates, Instant::now());
        assert_eq!(
            kinds(&web),
            vec![
                EventKind::CpuFailure,
                EventKind::MinProcFailure,
                EventKind::MemoryFailure
            ]
        );
    }

    #[test]
    fn test_no_limits_skips_sampling() {
        let runtime = MockRuntime::new()
            .with_container("web", ContainerState::running(), UsageSnapshot::default());
        let templates = TemplateSet::defaults();
        let mut web = MonitoredContainer::from_config(&container("web"));

        assert_eq!(
            web.evaluate(&runtime, &templates, Instant::now()),
            CycleOutcome::NoMetrics
        );
        assert_eq!(runtime.stats_calls("web"), 0);
    }
}
