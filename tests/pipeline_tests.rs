//! Pipeline tests with stub byte sources and digesters: delivery counts, ordering, failures, cancellation.

use anyhow::Result;
use crossbeam_channel::unbounded;
use fanhash::engine::{ByteSource, Digester, OutputFormat, format_result};
use fanhash::pipeline::{
    Aggregator, AggregatorState, CancelToken, PipelineTuning, hash_jobs, process_job,
    run_dispatch_loop,
};
use fanhash::{Completion, Job, JobResult, Opts, ReadFailure, Summary};
use std::collections::{HashMap, HashSet};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// In-memory byte source: fixed content per path, optional per-path latency, everything else NotFound.
#[derive(Default)]
struct StubSource {
    content: HashMap<PathBuf, Vec<u8>>,
    delays: HashMap<PathBuf, Duration>,
    default: Option<Vec<u8>>,
}

impl StubSource {
    fn all(bytes: &[u8]) -> Self {
        StubSource {
            default: Some(bytes.to_vec()),
            ..Default::default()
        }
    }

    fn with(mut self, path: &str, bytes: &[u8]) -> Self {
        self.content.insert(PathBuf::from(path), bytes.to_vec());
        self
    }

    fn delay(mut self, path: &str, d: Duration) -> Self {
        self.delays.insert(PathBuf::from(path), d);
        self
    }
}

impl ByteSource for StubSource {
    type Bytes = Vec<u8>;

    fn read(&self, job: &Job) -> io::Result<Vec<u8>> {
        if let Some(d) = self.delays.get(&job.path) {
            thread::sleep(*d);
        }
        self.content
            .get(&job.path)
            .or(self.default.as_ref())
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such file"))
    }
}

/// Digest stub: `H(<bytes as text>)`.
struct StubDigester;

impl Digester for StubDigester {
    type Output = String;

    fn digest(&self, bytes: &[u8]) -> String {
        format!("H({})", String::from_utf8_lossy(bytes))
    }
}

/// Panics on the content `boom`.
struct PanickyDigester;

impl Digester for PanickyDigester {
    type Output = String;

    fn digest(&self, bytes: &[u8]) -> String {
        if bytes == b"boom" {
            panic!("digest blew up");
        }
        StubDigester.digest(bytes)
    }
}

fn jobs(names: &[&str]) -> Vec<Job> {
    names.iter().map(|n| Job::new(*n)).collect()
}

fn numbered_jobs(n: usize) -> Vec<Job> {
    (0..n).map(|i| Job::new(format!("f{i}.txt"))).collect()
}

fn opts(workers: usize) -> Opts {
    Opts {
        num_workers: Some(workers),
        ..Default::default()
    }
}

/// Run the pipeline and return the text lines in arrival order.
fn run_lines<S: ByteSource + 'static>(
    source: S,
    jobs: Vec<Job>,
    opts: &Opts,
) -> Result<(Vec<String>, Summary)> {
    let mut lines = Vec::new();
    let summary = hash_jobs(
        jobs,
        Arc::new(source),
        Arc::new(StubDigester),
        opts,
        CancelToken::new(),
        |r| {
            lines.push(format_result(r, OutputFormat::Text));
            Ok(())
        },
    )?;
    Ok((lines, summary))
}

fn set(lines: &[String]) -> HashSet<String> {
    lines.iter().cloned().collect()
}

// --- concrete scenario ---

#[test]
fn test_two_files_same_content_any_order() {
    let (lines, summary) =
        run_lines(StubSource::all(b"hello"), jobs(&["a.txt", "b.txt"]), &opts(2)).unwrap();
    let expected: HashSet<String> = ["a.txt: H(hello)", "b.txt: H(hello)"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(set(&lines), expected);
    assert_eq!(summary.completion, Completion::Done);
    assert_eq!(summary.hashed, 2);
}

#[test]
fn test_two_files_single_worker_fixed_order() {
    let (lines, _) =
        run_lines(StubSource::all(b"hello"), jobs(&["a.txt", "b.txt"]), &opts(1)).unwrap();
    assert_eq!(lines, vec!["a.txt: H(hello)", "b.txt: H(hello)"]);
}

// --- delivery counts ---

#[test]
fn test_exactly_n_results_for_any_pool_size() {
    for n in [0, 1, 5, 37] {
        for w in [1, 2, 4, 16] {
            let mut source = StubSource::all(b"x");
            for i in 0..n {
                source = source.delay(&format!("f{i}.txt"), Duration::from_micros((i % 7) as u64 * 300));
            }
            let submitted = numbered_jobs(n);
            let (lines, summary) = run_lines(source, submitted.clone(), &opts(w)).unwrap();
            assert_eq!(lines.len(), n, "n={n} w={w}");
            assert_eq!(summary.emitted(), n);
            let expected: HashSet<String> =
                submitted.iter().map(|j| format!("{j}: H(x)")).collect();
            assert_eq!(set(&lines), expected, "n={n} w={w}: lost or duplicated results");
        }
    }
}

#[test]
fn test_zero_jobs_terminates_with_no_output() {
    let (lines, summary) = run_lines(StubSource::all(b"x"), Vec::new(), &opts(4)).unwrap();
    assert!(lines.is_empty());
    assert_eq!(summary.expected, 0);
    assert_eq!(summary.completion, Completion::Done);
}

#[test]
fn test_oversized_pool_matches_pool_of_n() {
    let n = 6;
    let (exact, _) = run_lines(StubSource::all(b"same"), numbered_jobs(n), &opts(n)).unwrap();
    let (over, _) = run_lines(StubSource::all(b"same"), numbered_jobs(n), &opts(64)).unwrap();
    assert_eq!(set(&exact), set(&over));
}

// --- ordering ---

#[test]
fn test_single_worker_preserves_submission_order() {
    let mut source = StubSource::all(b"x");
    for i in 0..20 {
        source = source.delay(&format!("f{i}.txt"), Duration::from_millis((20 - i) as u64 % 5));
    }
    let submitted = numbered_jobs(20);
    let (lines, _) = run_lines(source, submitted.clone(), &opts(1)).unwrap();
    let expected: Vec<String> = submitted.iter().map(|j| format!("{j}: H(x)")).collect();
    assert_eq!(lines, expected);
}

#[test]
fn test_fast_job_may_finish_before_slow_job() {
    let source = StubSource::all(b"x").delay("slow.txt", Duration::from_millis(400));
    let (lines, _) = run_lines(source, jobs(&["slow.txt", "fast.txt"]), &opts(2)).unwrap();
    assert_eq!(lines, vec!["fast.txt: H(x)", "slow.txt: H(x)"]);
}

// --- failures ---

#[test]
fn test_read_failure_is_a_result_not_an_abort() {
    let source = StubSource::default()
        .with("a.txt", b"one")
        .with("c.txt", b"three");
    let (lines, summary) = run_lines(source, jobs(&["a.txt", "missing.txt", "c.txt"]), &opts(2)).unwrap();
    assert_eq!(lines.len(), 3);
    assert!(set(&lines).contains("missing.txt: no such file"));
    assert!(set(&lines).contains("a.txt: H(one)"));
    assert!(set(&lines).contains("c.txt: H(three)"));
    assert_eq!(summary.hashed, 2);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.completion, Completion::Done);
}

#[test]
fn test_process_job_carries_error_kind() {
    let r = process_job(Job::new("nope"), &StubSource::default(), &StubDigester);
    assert_eq!(r.job, Job::new("nope"));
    let err: ReadFailure = r.outcome.unwrap_err();
    assert_eq!(err.kind, io::ErrorKind::NotFound);
    assert_eq!(err.to_string(), "no such file");
}

#[test]
fn test_worker_panic_fails_pipeline_instead_of_stalling() {
    let source = StubSource::default()
        .with("a", b"fine")
        .with("b", b"boom")
        .with("c", b"fine");
    let err = hash_jobs(
        jobs(&["a", "b", "c"]),
        Arc::new(source),
        Arc::new(PanickyDigester),
        &opts(2),
        CancelToken::new(),
        |_| Ok(()),
    )
    .unwrap_err();
    assert!(err.to_string().contains("1 of 3 results missing"), "{err}");
}

#[test]
fn test_emit_error_stops_pipeline() {
    let err = hash_jobs(
        numbered_jobs(10),
        Arc::new(StubSource::all(b"x")),
        Arc::new(StubDigester),
        &opts(2),
        CancelToken::new(),
        |_| anyhow::bail!("stdout closed"),
    )
    .unwrap_err();
    assert_eq!(err.to_string(), "stdout closed");
}

// --- queues ---

#[test]
fn test_capacity_one_queue_with_slow_consumer_completes() {
    let o = Opts {
        num_workers: Some(4),
        queue_cap: Some(1),
        ..Default::default()
    };
    let mut count = 0;
    let summary = hash_jobs(
        numbered_jobs(25),
        Arc::new(StubSource::all(b"x")),
        Arc::new(StubDigester),
        &o,
        CancelToken::new(),
        |_| {
            thread::sleep(Duration::from_millis(2));
            count += 1;
            Ok(())
        },
    )
    .unwrap();
    assert_eq!(count, 25);
    assert_eq!(summary.completion, Completion::Done);
}

#[test]
fn test_unbounded_queue_completes() {
    let o = Opts {
        num_workers: Some(3),
        queue_cap: Some(0),
        ..Default::default()
    };
    let (lines, _) = run_lines(StubSource::all(b"x"), numbered_jobs(100), &o).unwrap();
    assert_eq!(lines.len(), 100);
}

#[test]
fn test_tuning_resolve() {
    let t = PipelineTuning::resolve(&opts(8), 3, 16);
    assert_eq!(t.num_workers, 3);
    assert_eq!(t.queue_cap, Some(3));

    let t = PipelineTuning::resolve(&opts(2), 100, 16);
    assert_eq!(t.queue_cap, Some(8));

    let t = PipelineTuning::resolve(&Opts::default(), 100, 6);
    assert_eq!(t.num_workers, 6);

    let t = PipelineTuning::resolve(&opts(4), 0, 16);
    assert_eq!(t.num_workers, 1);

    let unbounded = Opts {
        queue_cap: Some(0),
        ..opts(2)
    };
    assert_eq!(PipelineTuning::resolve(&unbounded, 10, 16).queue_cap, None);

    let zero_workers = Opts {
        num_workers: Some(0),
        ..Default::default()
    };
    assert_eq!(PipelineTuning::resolve(&zero_workers, 10, 16).num_workers, 1);
}

#[test]
fn test_tuning_clamps_oversized_values_to_job_count() {
    let huge_cap = Opts {
        queue_cap: Some(usize::MAX / 2),
        ..opts(2)
    };
    assert_eq!(PipelineTuning::resolve(&huge_cap, 2, 16).queue_cap, Some(2));
    assert_eq!(PipelineTuning::resolve(&huge_cap, 0, 16).queue_cap, Some(1));

    let huge_pool = opts(usize::MAX);
    let t = PipelineTuning::resolve(&huge_pool, 5, 16);
    assert_eq!(t.num_workers, 5);
    assert_eq!(t.queue_cap, Some(5));
}

#[test]
fn test_extreme_config_values_still_complete() {
    let cases = [
        Opts {
            timeout: Some(Duration::from_secs(u64::MAX)),
            ..opts(2)
        },
        Opts {
            queue_cap: Some(usize::MAX / 2),
            ..opts(2)
        },
        Opts {
            queue_cap: Some(1_000_000_000),
            ..opts(2)
        },
        opts(usize::MAX),
    ];
    for o in cases {
        let (lines, summary) =
            run_lines(StubSource::all(b"x"), jobs(&["a.txt", "b.txt"]), &o).unwrap();
        assert_eq!(lines.len(), 2, "{o:?}");
        assert_eq!(summary.completion, Completion::Done, "{o:?}");
    }
}

// --- cancellation and timeout ---

#[test]
fn test_pre_cancelled_run_emits_nothing() {
    let cancel = CancelToken::new();
    cancel.cancel();
    let mut count = 0;
    let summary = hash_jobs(
        numbered_jobs(5),
        Arc::new(StubSource::all(b"x")),
        Arc::new(StubDigester),
        &opts(2),
        cancel,
        |_| {
            count += 1;
            Ok(())
        },
    )
    .unwrap();
    assert_eq!(count, 0);
    assert_eq!(summary.completion, Completion::Cancelled { remaining: 5 });
}

#[test]
fn test_cancel_mid_run_returns_early() {
    let cancel = CancelToken::new();
    let trigger = cancel.clone();
    let mut count = 0;
    let summary = hash_jobs(
        numbered_jobs(10),
        Arc::new(StubSource::all(b"x")),
        Arc::new(StubDigester),
        &opts(1),
        cancel,
        |_| {
            count += 1;
            if count == 2 {
                trigger.cancel();
            }
            Ok(())
        },
    )
    .unwrap();
    assert_eq!(count, 2);
    assert_eq!(summary.emitted(), 2);
    assert_eq!(summary.completion, Completion::Cancelled { remaining: 8 });
}

#[test]
fn test_timeout_reports_outstanding_results() {
    let source = StubSource::all(b"x").delay("stuck.txt", Duration::from_millis(500));
    let o = Opts {
        timeout: Some(Duration::from_millis(50)),
        ..opts(2)
    };
    let (lines, summary) = run_lines(source, jobs(&["ok.txt", "stuck.txt"]), &o).unwrap();
    assert_eq!(lines, vec!["ok.txt: H(x)"]);
    assert_eq!(summary.completion, Completion::TimedOut { remaining: 1 });
}

// --- aggregator and dispatcher in isolation ---

fn ok_result(name: &str) -> JobResult<String> {
    JobResult {
        job: Job::new(name),
        outcome: Ok(format!("H({name})")),
    }
}

#[test]
fn test_aggregator_state_counts_down() {
    let mut agg = Aggregator::new(2);
    assert_eq!(agg.state(), AggregatorState::Awaiting { remaining: 2 });
    agg.accept(&ok_result("a"));
    assert_eq!(agg.state(), AggregatorState::Awaiting { remaining: 1 });
    agg.accept(&ok_result("b"));
    assert_eq!(agg.state(), AggregatorState::Done);
    agg.accept(&ok_result("c"));
    assert_eq!(agg.state(), AggregatorState::Done);
    assert_eq!(Aggregator::new(0).state(), AggregatorState::Done);
}

#[test]
fn test_aggregator_deadline_overflow_means_no_deadline() {
    let agg = Aggregator::new(1).with_timeout(Some(Duration::from_secs(u64::MAX)));
    assert_eq!(agg.deadline(), None);
    let agg = Aggregator::new(1).with_timeout(Some(Duration::from_secs(5)));
    assert!(agg.deadline().is_some());
    assert_eq!(Aggregator::new(1).with_timeout(None).deadline(), None);
}

#[test]
fn test_aggregator_stops_at_expected_count() {
    let (tx, rx) = unbounded();
    for name in ["a", "b", "c"] {
        tx.send(ok_result(name)).unwrap();
    }
    let mut seen = Vec::new();
    let summary = Aggregator::new(2)
        .run(&rx, &CancelToken::new(), |r| {
            seen.push(r.job.to_string());
            Ok(())
        })
        .unwrap();
    assert_eq!(seen, vec!["a", "b"]);
    assert_eq!(summary.completion, Completion::Done);
    assert_eq!(rx.len(), 1);
}

#[test]
fn test_aggregator_errors_when_producers_vanish() {
    let (tx, rx) = unbounded();
    tx.send(ok_result("a")).unwrap();
    drop(tx);
    let cancel = CancelToken::new();
    let err = Aggregator::new(3).run(&rx, &cancel, |_| Ok(())).unwrap_err();
    assert!(err.to_string().contains("2 of 3 results missing"), "{err}");
    assert!(cancel.is_cancelled());
}

#[test]
fn test_dispatch_sends_all_then_closes() {
    let (tx, rx) = unbounded();
    let sent = run_dispatch_loop(tx, jobs(&["a", "b", "c"]), &CancelToken::new());
    assert_eq!(sent, 3);
    let received: Vec<Job> = rx.iter().collect();
    assert_eq!(received, jobs(&["a", "b", "c"]));
}

#[test]
fn test_dispatch_stops_when_cancelled_or_no_workers() {
    let cancel = CancelToken::new();
    cancel.cancel();
    let (tx, _rx) = unbounded();
    assert_eq!(run_dispatch_loop(tx, jobs(&["a"]), &cancel), 0);

    let (tx, rx) = unbounded::<Job>();
    drop(rx);
    assert_eq!(run_dispatch_loop(tx, jobs(&["a", "b"]), &CancelToken::new()), 0);
}
