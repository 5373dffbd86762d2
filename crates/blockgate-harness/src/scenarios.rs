//! Boundary verification scenarios.
//!
//! Each scenario drives a fresh crate-owned permit through real blocking
//! calls and checks one observable property of the boundary. Results go to
//! the emitter as JSONL and come back as a [`ScenarioReport`].

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, mpsc};
use std::thread;
use std::time::{Duration, Instant};

use serde::Serialize;
use serde_json::json;

use blockgate_core::{
    CONSTANTS, MessageFlag, NativeStatus, PollEvent, SocketOption, SocketType, errno, lookup,
};
use blockgate_permit::{BoundarySnapshot, ExecutionPermit, permit_mode};

use crate::error::HarnessError;
use crate::structured_log::{LogEmitter, LogEntry, LogLevel, Outcome};

/// Result of one scenario run.
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    pub name: &'static str,
    pub outcome: Outcome,
    pub duration_ms: u64,
    pub releases: u64,
    pub reacquires: u64,
    pub details: serde_json::Value,
}

impl ScenarioReport {
    #[must_use]
    pub fn passed(&self) -> bool {
        self.outcome == Outcome::Pass
    }
}

type ScenarioFn = fn(&mut LogEmitter) -> Result<ScenarioReport, HarnessError>;

/// Every scenario, in run order.
pub const SCENARIOS: &[(&str, ScenarioFn)] = &[
    ("forwarding", forwarding),
    ("balance", balance),
    ("liveness", liveness),
    ("would_block", would_block),
    ("constant_determinism", constant_determinism),
];

/// Run every scenario, logging a start/finish pair for each.
///
/// A scenario that errors is reported as [`Outcome::Error`] and the run
/// continues.
pub fn run_all(emitter: &mut LogEmitter) -> Result<Vec<ScenarioReport>, HarnessError> {
    let mut reports = Vec::with_capacity(SCENARIOS.len());
    for (name, scenario) in SCENARIOS {
        emitter.emit_entry(
            LogEntry::new("", LogLevel::Info, "scenario_start").with_scenario(*name),
        )?;
        let started = Instant::now();
        let report = match scenario(emitter) {
            Ok(report) => report,
            Err(err) => ScenarioReport {
                name: *name,
                outcome: Outcome::Error,
                duration_ms: elapsed_ms(started),
                releases: 0,
                reacquires: 0,
                details: json!({ "error": err.to_string() }),
            },
        };
        let level = if report.passed() {
            LogLevel::Info
        } else {
            LogLevel::Error
        };
        emitter.emit_entry(
            LogEntry::new("", level, "scenario_finish")
                .with_scenario(*name)
                .with_outcome(report.outcome)
                .with_duration_ms(report.duration_ms)
                .with_details(report.details.clone()),
        )?;
        reports.push(report);
    }
    emitter.flush()?;
    Ok(reports)
}

fn elapsed_ms(since: Instant) -> u64 {
    u64::try_from(since.elapsed().as_millis()).unwrap_or(u64::MAX)
}

fn outcome_of(ok: bool) -> Outcome {
    if ok { Outcome::Pass } else { Outcome::Fail }
}

fn report(
    name: &'static str,
    ok: bool,
    started: Instant,
    delta: &BoundarySnapshot,
    details: serde_json::Value,
) -> ScenarioReport {
    ScenarioReport {
        name,
        outcome: outcome_of(ok),
        duration_ms: elapsed_ms(started),
        releases: delta.releases,
        reacquires: delta.reacquires,
        details,
    }
}

fn call_entry(name: &str, permit: &ExecutionPermit, symbol: &str) -> LogEntry {
    LogEntry::new("", LogLevel::Debug, "boundary_call")
        .with_scenario(name)
        .with_permit(permit_mode().as_str(), permit.kind().as_str())
        .with_symbol(symbol)
}

/// Native results come back untouched: success counts, error sentinels and
/// their errno alike.
fn forwarding(emitter: &mut LogEmitter) -> Result<ScenarioReport, HarnessError> {
    const NAME: &str = "forwarding";
    let started = Instant::now();
    let permit = ExecutionPermit::local();
    let cases: [(i32, i32); 4] = [(0, 0), (17, 0), (-1, errno::EAGAIN), (-1, errno::EINTR)];

    let mut mismatches = Vec::new();
    let mut held = permit.enter()?;
    for (ret, errno) in cases {
        let before = permit.stats();
        let call_started = Instant::now();
        let (got_ret, got_errno) = held.blocking(|| (ret, errno));
        let latency_ns = u64::try_from(call_started.elapsed().as_nanos()).unwrap_or(u64::MAX);
        let delta = permit.stats().since(&before);
        if (got_ret, got_errno) != (ret, errno) {
            mismatches.push(json!({ "sent": [ret, errno], "got": [got_ret, got_errno] }));
        }
        emitter.emit_entry(
            call_entry(NAME, &permit, "native_op")
                .with_native_result(i64::from(got_ret), (got_ret < 0).then_some(got_errno))
                .with_boundary(&delta)
                .with_latency_ns(latency_ns),
        )?;
    }
    drop(held);

    let delta = permit.stats();
    let ok = mismatches.is_empty() && delta.releases == cases.len() as u64 && delta.is_balanced();
    Ok(report(
        NAME,
        ok,
        started,
        &delta,
        json!({ "cases": cases.len(), "mismatches": mismatches }),
    ))
}

/// One release and one reacquire per call, including when the native
/// operation unwinds.
fn balance(emitter: &mut LogEmitter) -> Result<ScenarioReport, HarnessError> {
    const NAME: &str = "balance";
    let started = Instant::now();
    let permit = ExecutionPermit::local();

    let outcomes: [Result<i32, i32>; 4] = [Ok(0), Ok(5), Err(errno::EAGAIN), Err(-1)];
    let mut forwarded = true;
    for expected in outcomes {
        let mut held = permit.enter()?;
        // An early `?` inside the window must still reacquire.
        let got = held.blocking(|| -> Result<i32, i32> {
            let value = expected?;
            Ok(value)
        });
        forwarded &= got == expected;
    }

    let unwound = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        let mut held = permit.enter().ok()?;
        Some(held.blocking(|| -> i32 { panic!("native operation unwound") }))
    }))
    .is_err();

    let delta = permit.stats();
    let expected_calls = outcomes.len() as u64 + 1;
    emitter.emit_entry(
        LogEntry::new("", LogLevel::Info, "boundary_balance")
            .with_scenario(NAME)
            .with_boundary(&delta)
            .with_details(json!({ "unwinding_reacquires": delta.unwinding_reacquires })),
    )?;

    let ok = forwarded
        && unwound
        && delta.releases == expected_calls
        && delta.reacquires == expected_calls
        && delta.unwinding_reacquires == 1
        && delta.is_balanced()
        && !permit.is_held_by_current_thread();
    Ok(report(
        NAME,
        ok,
        started,
        &delta,
        json!({ "calls": expected_calls, "unwound": unwound }),
    ))
}

const SLOW_CALL: Duration = Duration::from_millis(200);
const FAST_TASK: Duration = Duration::from_millis(10);

/// A task blocked in a 200 ms native call does not stop a 10 ms task from
/// running to completion first.
fn liveness(emitter: &mut LogEmitter) -> Result<ScenarioReport, HarnessError> {
    const NAME: &str = "liveness";
    let started = Instant::now();
    let permit = Arc::new(ExecutionPermit::local());
    let order = Arc::new(AtomicU64::new(0));
    let (inside_tx, inside_rx) = mpsc::channel::<()>();

    let slow = {
        let permit = Arc::clone(&permit);
        let order = Arc::clone(&order);
        thread::spawn(move || -> Result<u64, HarnessError> {
            let mut held = permit.enter()?;
            held.blocking(|| {
                let _ = inside_tx.send(());
                thread::sleep(SLOW_CALL);
            });
            Ok(order.fetch_add(1, Ordering::SeqCst))
        })
    };

    if inside_rx.recv_timeout(Duration::from_secs(5)).is_err() {
        let _ = slow.join();
        return Ok(report(
            NAME,
            false,
            started,
            &permit.stats(),
            json!({ "error": "slow task never entered its native call" }),
        ));
    }

    let fast = {
        let permit = Arc::clone(&permit);
        let order = Arc::clone(&order);
        thread::spawn(move || -> Result<(u64, u64), HarnessError> {
            let task_started = Instant::now();
            let _held = permit.enter()?;
            thread::sleep(FAST_TASK);
            Ok((order.fetch_add(1, Ordering::SeqCst), elapsed_ms(task_started)))
        })
    };

    let (fast_seq, fast_ms) = fast
        .join()
        .map_err(|_| HarnessError::ScenarioPanicked("liveness fast task"))??;
    let slow_seq = slow
        .join()
        .map_err(|_| HarnessError::ScenarioPanicked("liveness slow task"))??;

    let delta = permit.stats();
    emitter.emit_entry(
        LogEntry::new("", LogLevel::Info, "liveness_order")
            .with_scenario(NAME)
            .with_boundary(&delta)
            .with_details(json!({ "fast_seq": fast_seq, "slow_seq": slow_seq, "fast_ms": fast_ms })),
    )?;

    let ok = fast_seq < slow_seq && fast_ms < SLOW_CALL.as_millis() as u64 && delta.is_balanced();
    Ok(report(
        NAME,
        ok,
        started,
        &delta,
        json!({ "fast_finished_first": fast_seq < slow_seq, "fast_ms": fast_ms }),
    ))
}

/// A non-blocking receive with nothing queued comes back as a would-block
/// error, untouched by the boundary.
#[cfg(unix)]
fn would_block(emitter: &mut LogEmitter) -> Result<ScenarioReport, HarnessError> {
    use std::io::Read;
    use std::os::unix::net::UnixStream;

    const NAME: &str = "would_block";
    let started = Instant::now();
    let permit = ExecutionPermit::local();
    let (mut rx, _tx) = UnixStream::pair()?;
    rx.set_nonblocking(true)?;

    let mut buf = [0_u8; 16];
    let result = permit.with(|held| held.blocking(|| rx.read(&mut buf)))?;

    let (ret, errno) = match &result {
        Ok(n) => (*n as i64, None),
        Err(err) => (-1, err.raw_os_error()),
    };
    let status = NativeStatus::from_return(ret as i32, errno.unwrap_or(0));
    let delta = permit.stats();
    emitter.emit_entry(
        call_entry(NAME, &permit, "recv")
            .with_native_result(ret, errno)
            .with_boundary(&delta),
    )?;

    let would_block = matches!(&result, Err(e) if e.kind() == std::io::ErrorKind::WouldBlock);
    let ok = would_block && status == NativeStatus::WouldBlock && delta.is_balanced();
    Ok(report(
        NAME,
        ok,
        started,
        &delta,
        json!({ "ret": ret, "errno": errno, "status": format!("{status:?}") }),
    ))
}

#[cfg(not(unix))]
fn would_block(_emitter: &mut LogEmitter) -> Result<ScenarioReport, HarnessError> {
    Ok(ScenarioReport {
        name: "would_block",
        outcome: Outcome::Skip,
        duration_ms: 0,
        releases: 0,
        reacquires: 0,
        details: json!({ "reason": "needs unix socket pairs" }),
    })
}

/// Every constant reads the same from every thread, and the typed views
/// agree with the table.
fn constant_determinism(emitter: &mut LogEmitter) -> Result<ScenarioReport, HarnessError> {
    const NAME: &str = "constant_determinism";
    let started = Instant::now();

    let reference: BTreeMap<&'static str, Option<i32>> =
        CONSTANTS.iter().map(|c| (c.name, lookup(c.name))).collect();
    let handles: Vec<_> = (0..4)
        .map(|_| {
            thread::spawn(|| {
                CONSTANTS
                    .iter()
                    .rev()
                    .map(|c| (c.name, lookup(c.name)))
                    .collect::<BTreeMap<_, _>>()
            })
        })
        .collect();
    let mut threads_agree = true;
    for handle in handles {
        let seen = handle
            .join()
            .map_err(|_| HarnessError::ScenarioPanicked("constant lookup thread"))?;
        threads_agree &= seen == reference;
    }

    let typed: Vec<(&str, i32)> = SocketType::ALL
        .iter()
        .map(|t| (t.name(), t.as_raw()))
        .chain(SocketOption::ALL.iter().map(|o| (o.name(), o.as_raw())))
        .chain(PollEvent::ALL.iter().map(|e| (e.name(), e.as_raw())))
        .chain(MessageFlag::ALL.iter().map(|f| (f.name(), f.as_raw())))
        .collect();
    let disagreeing: Vec<&str> = typed
        .iter()
        .filter(|(name, raw)| lookup(name) != Some(*raw))
        .map(|(name, _)| *name)
        .collect();

    emitter.emit_entry(
        LogEntry::new("", LogLevel::Info, "constant_table")
            .with_scenario(NAME)
            .with_details(json!({ "constants": CONSTANTS.len(), "typed": typed.len() })),
    )?;

    Ok(report(
        NAME,
        threads_agree && disagreeing.is_empty(),
        started,
        &BoundarySnapshot::default(),
        json!({ "threads_agree": threads_agree, "disagreeing": disagreeing }),
    ))
}
