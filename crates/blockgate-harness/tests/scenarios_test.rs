//! Integration test: every boundary scenario passes and logs valid JSONL.
//!
//! Run: cargo test -p blockgate-harness --test scenarios_test

use blockgate_harness::scenarios::SCENARIOS;
use blockgate_harness::structured_log::validate_log_line;
use blockgate_harness::{LogEmitter, Outcome, run_all};

#[test]
fn all_scenarios_pass() {
    let (mut emitter, buffer) = LogEmitter::to_buffer("blockgate", "scenarios-test");
    let reports = run_all(&mut emitter).unwrap();

    assert_eq!(reports.len(), SCENARIOS.len());
    for report in &reports {
        assert!(
            !report.outcome.is_failure(),
            "{} failed: {}",
            report.name,
            report.details
        );
        assert_eq!(report.releases, report.reacquires, "{}", report.name);
    }

    let text = String::from_utf8(buffer.lock().unwrap().clone()).unwrap();
    let mut finishes = 0;
    for (i, line) in text.lines().enumerate() {
        let entry = validate_log_line(line, i + 1)
            .unwrap_or_else(|errs| panic!("line {} invalid: {errs:?}", i + 1));
        assert!(entry.trace_id.starts_with("blockgate::scenarios-test::"));
        assert_eq!(entry.run_id.as_deref(), Some("scenarios-test"));
        if entry.event == "scenario_finish" {
            finishes += 1;
            assert!(entry.outcome.is_some());
        }
    }
    assert_eq!(finishes, SCENARIOS.len());
}

#[test]
fn each_scenario_runs_on_its_own_permit() {
    for (name, scenario) in SCENARIOS {
        let mut emitter = LogEmitter::sink("blockgate", "isolated");
        let report = scenario(&mut emitter).unwrap();
        assert_eq!(report.name, *name);
        assert_ne!(report.outcome, Outcome::Error, "{name}: {}", report.details);
    }
}

#[test]
fn forwarding_logs_native_results_verbatim() {
    let (mut emitter, buffer) = LogEmitter::to_buffer("blockgate", "fwd");
    let (_, forwarding) = SCENARIOS
        .iter()
        .find(|(name, _)| *name == "forwarding")
        .unwrap();
    let report = forwarding(&mut emitter).unwrap();
    assert_eq!(report.outcome, Outcome::Pass);

    let text = String::from_utf8(buffer.lock().unwrap().clone()).unwrap();
    let calls: Vec<_> = text
        .lines()
        .enumerate()
        .map(|(i, line)| validate_log_line(line, i + 1).unwrap())
        .filter(|e| e.event == "boundary_call")
        .collect();
    assert_eq!(calls.len(), 4);
    assert_eq!(calls[1].ret, Some(17));
    assert_eq!(calls[1].errno, None);
    assert_eq!(calls[2].ret, Some(-1));
    assert_eq!(calls[2].errno, Some(blockgate_core::errno::EAGAIN));
    for call in &calls {
        assert_eq!(call.releases, Some(1));
        assert_eq!(call.reacquires, Some(1));
    }
}
