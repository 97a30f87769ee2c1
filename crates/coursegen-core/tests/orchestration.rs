//! Integration tests: end-to-end runs over in-memory collaborators.
//!
//! The generator is scripted per title, the pacer records sleeps instead of
//! waiting, and the store captures every snapshot write so the tests can
//! assert the count invariant on all of them.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use coursegen_core::generator::{GenerationError, Generator};
use coursegen_core::retry;
use coursegen_core::scheduler::{
    run_batches, run_worker_pool, BatchOptions, Pacer, PoolOptions, RunContext,
};
use coursegen_core::state::{
    resume, MemoryStateStore, PersistedState, PersistenceError, ProgressSnapshot, ProgressStore,
};
use coursegen_core::task::{Task, TaskSpec, TaskStatus};

/// Generator scripted per title: listed titles fail, everything else
/// succeeds with a fresh artifact id. Records start/end events and the peak
/// number of concurrent calls.
struct ScriptedGenerator {
    failures: HashSet<String>,
    events: Mutex<Vec<(String, &'static str)>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    counter: AtomicUsize,
}

impl ScriptedGenerator {
    fn new(failures: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            failures: failures.iter().map(|s| s.to_string()).collect(),
            events: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            counter: AtomicUsize::new(0),
        })
    }

    fn events(&self) -> Vec<(String, &'static str)> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl Generator for ScriptedGenerator {
    async fn generate(&self, spec: &TaskSpec) -> Result<String, GenerationError> {
        self.events
            .lock()
            .unwrap()
            .push((spec.title.clone(), "start"));
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(running, Ordering::SeqCst);
        tokio::task::yield_now().await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.events.lock().unwrap().push((spec.title.clone(), "end"));

        if self.failures.contains(&spec.title) {
            Err(GenerationError::Rejected {
                title: spec.title.clone(),
                message: "scripted failure".to_string(),
            })
        } else {
            let n = self.counter.fetch_add(1, Ordering::SeqCst);
            Ok(format!("artifact-{n}"))
        }
    }
}

/// Pacer that records requested sleeps and returns immediately.
#[derive(Default)]
struct RecordingPacer {
    sleeps: Mutex<Vec<Duration>>,
}

#[async_trait]
impl Pacer for RecordingPacer {
    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
    }
}

/// Store that keeps every save so tests can assert invariants on all
/// observable snapshots, not just the last one.
#[derive(Default)]
struct CapturingStore {
    saves: Mutex<Vec<PersistedState>>,
}

impl CapturingStore {
    fn saves(&self) -> Vec<PersistedState> {
        self.saves.lock().unwrap().clone()
    }
}

impl ProgressStore for CapturingStore {
    fn load(&self) -> Result<Option<PersistedState>, PersistenceError> {
        Ok(self.saves.lock().unwrap().last().cloned())
    }

    fn save(&self, state: &PersistedState) -> Result<(), PersistenceError> {
        self.saves.lock().unwrap().push(state.clone());
        Ok(())
    }
}

/// Store whose writes always fail, standing in for a full disk.
struct BrokenStore;

impl ProgressStore for BrokenStore {
    fn load(&self) -> Result<Option<PersistedState>, PersistenceError> {
        Ok(None)
    }

    fn save(&self, _state: &PersistedState) -> Result<(), PersistenceError> {
        Err(PersistenceError::Write {
            path: "/dev/full".into(),
            source: std::io::Error::other("disk full"),
        })
    }
}

fn task(subject: &str, title: &str) -> Task {
    Task::new(subject, title, "beginner", vec!["Intro".to_string()])
}

fn ctx(
    generator: Arc<dyn Generator>,
    store: Arc<dyn ProgressStore>,
    pacer: Arc<dyn Pacer>,
) -> RunContext {
    RunContext::new(generator, store, pacer)
}

fn assert_count_invariant(state: &PersistedState) {
    let p = &state.progress;
    assert_eq!(
        p.completed_tasks + p.failed_tasks + p.in_progress_tasks + p.pending_tasks(),
        p.total_tasks,
        "snapshot counts must partition the total"
    );
    let unique: HashSet<&String> = p.completed_task_ids.iter().collect();
    assert_eq!(unique.len(), p.completed_task_ids.len());
}

// Scenario: two subjects, one worker, first task fails, second succeeds.
#[tokio::test]
async fn single_worker_processes_sequentially_and_isolates_failure() {
    let generator = ScriptedGenerator::new(&["Algebra"]);
    let pacer = Arc::new(RecordingPacer::default());
    let store = Arc::new(CapturingStore::default());
    let mut tasks = vec![task("Mathematics", "Algebra"), task("Biology", "Cells")];

    let ctx = ctx(generator.clone(), store.clone(), pacer.clone());
    let opts = PoolOptions {
        workers: 1,
        task_cooldown: Duration::from_millis(2000),
    };
    let summary = run_worker_pool(&mut tasks, &ctx, &opts).await.unwrap();

    assert_eq!(summary.completed, 1);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.failed_titles, vec!["Algebra".to_string()]);
    assert_eq!(tasks[0].status, TaskStatus::Failed);
    assert_eq!(tasks[0].error.as_deref(), Some(r#"generation of "Algebra" rejected: scripted failure"#));
    assert_eq!(tasks[1].status, TaskStatus::Completed);
    assert!(tasks[1].artifact_id.is_some());

    // Strictly sequential within the single worker's slice.
    let events = generator.events();
    let titles: Vec<&str> = events.iter().map(|(t, _)| t.as_str()).collect();
    assert_eq!(titles, ["Algebra", "Algebra", "Cells", "Cells"]);

    // Cooldown after every task, success or failure.
    let sleeps = pacer.sleeps.lock().unwrap().clone();
    assert_eq!(sleeps, vec![Duration::from_millis(2000); 2]);

    // Every observable snapshot keeps the count invariant.
    let saves = store.saves();
    assert!(!saves.is_empty());
    for state in &saves {
        assert_count_invariant(state);
    }
    let last = saves.last().unwrap();
    assert!(last.progress.is_finished());
    assert_eq!(last.progress.completed_tasks, 1);
    assert_eq!(last.progress.failed_tasks, 1);
}

#[tokio::test]
async fn pool_partitions_work_across_workers() {
    let generator = ScriptedGenerator::new(&[]);
    let pacer = Arc::new(RecordingPacer::default());
    let store = Arc::new(MemoryStateStore::new());
    let mut tasks: Vec<Task> = (0..5).map(|i| task("Math", &format!("T{i}"))).collect();

    let ctx = ctx(generator, store.clone(), pacer);
    let opts = PoolOptions {
        workers: 2,
        task_cooldown: Duration::from_millis(1),
    };
    let summary = run_worker_pool(&mut tasks, &ctx, &opts).await.unwrap();

    assert_eq!(summary.completed, 5);
    let mut per_worker: Vec<usize> = summary
        .workers
        .iter()
        .map(|w| w.completed_count)
        .collect();
    per_worker.sort_unstable();
    assert_eq!(per_worker, [2, 3]);

    let saved = store.saved().expect("final state saved");
    assert!(saved.progress.is_finished());
    assert_eq!(saved.progress.completed_task_ids.len(), 5);
}

// Scenario: batchSize=2, five pending tasks, generator always succeeds.
#[tokio::test]
async fn batches_of_five_run_as_two_two_one_with_two_delays() {
    let generator = ScriptedGenerator::new(&[]);
    let pacer = Arc::new(RecordingPacer::default());
    let store = Arc::new(CapturingStore::default());
    let mut tasks: Vec<Task> = (1..=5).map(|i| task("Math", &format!("T{i}"))).collect();

    let ctx = ctx(generator.clone(), store.clone(), pacer.clone());
    let opts = BatchOptions {
        batch_size: 2,
        batch_delay: Duration::from_secs(30),
    };
    let summary = run_batches(&mut tasks, &ctx, &opts).await.unwrap();

    assert_eq!(summary.completed, 5);
    assert_eq!(summary.failed, 0);
    assert!(tasks.iter().all(|t| t.status == TaskStatus::Completed));

    // Inter-batch delay between batches only: [2, 2, 1] means exactly two.
    let sleeps = pacer.sleeps.lock().unwrap().clone();
    assert_eq!(sleeps, vec![Duration::from_secs(30); 2]);

    // Fan-out never exceeds the batch size.
    assert!(generator.max_in_flight.load(Ordering::SeqCst) <= 2);

    for state in &store.saves() {
        assert_count_invariant(state);
    }
}

#[tokio::test]
async fn batch_barrier_holds_between_batches() {
    let generator = ScriptedGenerator::new(&[]);
    let pacer = Arc::new(RecordingPacer::default());
    let store = Arc::new(MemoryStateStore::new());
    let mut tasks: Vec<Task> = (1..=5).map(|i| task("Math", &format!("T{i}"))).collect();

    let ctx = ctx(generator.clone(), store, pacer);
    let opts = BatchOptions {
        batch_size: 2,
        batch_delay: Duration::from_secs(1),
    };
    run_batches(&mut tasks, &ctx, &opts).await.unwrap();

    // Pending order is the task-list order, so batches are {T1,T2}, {T3,T4},
    // {T5}. No task of batch k+1 may start before batch k is fully terminal.
    let events = generator.events();
    let position = |title: &str, kind: &str| {
        events
            .iter()
            .position(|(t, k)| t == title && *k == kind)
            .unwrap_or_else(|| panic!("missing event {title}/{kind}"))
    };
    for (earlier, later) in [
        ("T1", "T3"),
        ("T2", "T3"),
        ("T1", "T4"),
        ("T2", "T4"),
        ("T3", "T5"),
        ("T4", "T5"),
    ] {
        assert!(
            position(earlier, "end") < position(later, "start"),
            "{earlier} must be terminal before {later} starts"
        );
    }
}

#[tokio::test]
async fn retry_resets_failed_tasks_and_reruns_only_them() {
    let now = Utc::now();
    let mut prior = vec![
        task("Math", "Done"),
        task("Math", "Broken1"),
        task("Bio", "Broken2"),
    ];
    prior[0].start(now);
    prior[0].complete("artifact-old", now);
    prior[1].start(now);
    prior[1].fail("first failure", now);
    prior[2].start(now);
    prior[2].fail("second failure", now);
    let progress = ProgressSnapshot::recompute(&prior, now, now, None);
    let seeded = PersistedState {
        tasks: prior,
        progress,
    };

    let store = Arc::new(CapturingStore::default());
    store.save(&seeded).unwrap();

    let generator = ScriptedGenerator::new(&[]);
    let pacer = Arc::new(RecordingPacer::default());
    let ctx = ctx(generator.clone(), store.clone(), pacer);
    let opts = BatchOptions {
        batch_size: 3,
        batch_delay: Duration::from_secs(30),
    };
    let summary = retry::retry_failed(&ctx, &opts).await.unwrap();
    assert_eq!(summary.completed, 2);
    assert_eq!(summary.failed, 0);

    let saves = store.saves();
    // saves[0] is the seed; saves[1] is the persisted reset, before any
    // generation: previously-failed tasks pending with error cleared,
    // never-failed tasks untouched.
    let reset = &saves[1];
    assert_eq!(reset.tasks[0].status, TaskStatus::Completed);
    assert_eq!(reset.tasks[0].artifact_id.as_deref(), Some("artifact-old"));
    for t in &reset.tasks[1..] {
        assert_eq!(t.status, TaskStatus::Pending);
        assert!(t.error.is_none());
        assert!(t.start_time.is_none());
        assert!(t.end_time.is_none());
    }

    // Only the two reset tasks were submitted to the generator.
    let started: HashSet<String> = generator
        .events()
        .into_iter()
        .filter(|(_, k)| *k == "start")
        .map(|(t, _)| t)
        .collect();
    assert_eq!(
        started,
        HashSet::from(["Broken1".to_string(), "Broken2".to_string()])
    );

    let last = saves.last().unwrap();
    assert!(last.progress.is_finished());
    assert_eq!(last.progress.completed_tasks, 3);
    assert_eq!(last.progress.failed_tasks, 0);
}

#[tokio::test]
async fn retry_without_failures_is_rejected_up_front() {
    let now = Utc::now();
    let mut tasks = vec![task("Math", "Done")];
    tasks[0].start(now);
    tasks[0].complete("artifact-1", now);
    let progress = ProgressSnapshot::recompute(&tasks, now, now, None);
    let store = Arc::new(MemoryStateStore::seeded(PersistedState { tasks, progress }));

    let ctx = ctx(
        ScriptedGenerator::new(&[]),
        store,
        Arc::new(RecordingPacer::default()),
    );
    let opts = BatchOptions {
        batch_size: 3,
        batch_delay: Duration::from_secs(30),
    };
    let err = retry::retry_failed(&ctx, &opts).await.unwrap_err();
    assert!(matches!(err, retry::RetryError::NoFailedTasks));
}

// Scenario: a crashed run left one task in-progress; resume requeues it.
#[tokio::test]
async fn stale_in_progress_task_is_requeued_and_finished_on_resume() {
    let now = Utc::now();
    let mut prior = vec![task("Math", "Done"), task("Math", "Orphan")];
    prior[0].start(now);
    prior[0].complete("artifact-1", now);
    prior[1].start(now); // crashed mid-flight, never reached terminal state
    let progress = ProgressSnapshot::recompute(&prior, now, now, None);
    let store = Arc::new(MemoryStateStore::seeded(PersistedState {
        tasks: prior,
        progress,
    }));

    let mut state = store.load().unwrap().expect("prior state");
    state.reconcile();
    let mut tasks = state.tasks;
    let requeued = resume::requeue_stale(&mut tasks);
    assert_eq!(requeued, 1);
    assert_eq!(tasks[1].status, TaskStatus::Pending);
    assert!(tasks[1].start_time.is_none());

    let generator = ScriptedGenerator::new(&[]);
    let ctx = RunContext::new(generator.clone(), store.clone(), Arc::new(RecordingPacer::default()))
        .with_run_start(state.progress.start_time);
    let opts = BatchOptions {
        batch_size: 2,
        batch_delay: Duration::from_secs(30),
    };
    let summary = run_batches(&mut tasks, &ctx, &opts).await.unwrap();

    // Only the orphan ran; the completed task was excluded from the pending set.
    assert_eq!(summary.completed, 1);
    assert_eq!(generator.events().len(), 2);
    let saved = store.saved().unwrap();
    assert!(saved.progress.is_finished());
    assert_eq!(saved.progress.completed_tasks, 2);
    assert_eq!(saved.tasks[0].artifact_id.as_deref(), Some("artifact-1"));
}

#[tokio::test]
async fn run_survives_a_store_that_cannot_write() {
    let generator = ScriptedGenerator::new(&[]);
    let mut tasks = vec![task("Math", "A"), task("Math", "B")];

    let ctx = ctx(
        generator,
        Arc::new(BrokenStore),
        Arc::new(RecordingPacer::default()),
    );
    let opts = PoolOptions {
        workers: 2,
        task_cooldown: Duration::from_millis(1),
    };
    let summary = run_worker_pool(&mut tasks, &ctx, &opts).await.unwrap();

    assert_eq!(summary.completed, 2);
    assert!(tasks.iter().all(|t| t.status == TaskStatus::Completed));
}

#[tokio::test]
async fn empty_pending_set_is_a_partition_error() {
    let generator = ScriptedGenerator::new(&[]);
    let mut done = vec![task("Math", "A")];
    done[0].start(Utc::now());
    done[0].complete("artifact-1", Utc::now());

    let ctx = ctx(
        generator,
        Arc::new(MemoryStateStore::new()),
        Arc::new(RecordingPacer::default()),
    );
    let opts = PoolOptions {
        workers: 2,
        task_cooldown: Duration::from_millis(1),
    };
    assert!(run_worker_pool(&mut done, &ctx, &opts).await.is_err());
}
