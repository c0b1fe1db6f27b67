//! Propiedades del contrato del secuenciador sobre escenarios de distinto
//! tamaño.

use serde::Serialize;
use stepviz_core::{step, Scenario, SequencerError, StepOutcome, StepSequencer};

#[derive(Debug, Clone, PartialEq, Serialize)]
struct Trail {
    visited: Vec<usize>,
}

fn trail_scenario(n: usize) -> Scenario<Trail> {
    let mut builder = Scenario::builder(format!("trail_{n}"), Trail { visited: vec![] });
    for i in 0..n {
        builder = builder.step(step(format!("visit_{i}"), move |bag: &Trail| {
                             let mut next = bag.clone();
                             next.visited.push(i);
                             StepOutcome::new(next, format!("Visit {i}"), format!("visited {} nodes", i + 1))
                         }));
    }
    builder.build()
}

#[test]
fn n_advances_finish_the_scenario() {
    for n in 1..=6 {
        let mut seq = StepSequencer::create(trail_scenario(n)).expect("valid");
        for _ in 0..n {
            assert!(!seq.state().is_finished());
            seq.advance();
        }
        assert!(seq.state().is_finished());
        assert_eq!(seq.state().current_step_index(), n as isize - 1);
        assert_eq!(seq.state().state_bag().visited, (0..n).collect::<Vec<_>>());
    }
}

#[test]
fn advance_at_terminal_is_idempotent() {
    let mut seq = StepSequencer::create(trail_scenario(3)).unwrap();
    let done = seq.run_to_completion().clone();
    let events_before = seq.journal().event_count();
    for _ in 0..5 {
        seq.advance();
        assert_eq!(seq.state(), &done);
    }
    assert_eq!(seq.journal().event_count(), events_before);
    assert_eq!(seq.event_variants(), vec!["I", "A", "A", "A", "C"]);
    assert_eq!(seq.ignored_advances(), 5);
}

#[test]
fn journal_stays_bounded_under_repeated_next_and_reset() {
    let mut seq = StepSequencer::create(trail_scenario(1)).unwrap();
    seq.advance();
    let events_before = seq.journal().event_count();
    for _ in 0..10_000 {
        seq.advance();
    }
    assert_eq!(seq.journal().event_count(), events_before);

    for _ in 0..1_000 {
        seq.reset();
    }
    assert_eq!(seq.journal().session_count(), 1);
    assert_eq!(seq.event_variants(), vec!["I"]);
    assert_eq!(seq.ignored_advances(), 0);
}

#[test]
fn index_is_monotonic_and_moves_by_one() {
    let mut seq = StepSequencer::create(trail_scenario(4)).unwrap();
    let mut prev = seq.state().current_step_index();
    assert_eq!(prev, -1);
    for _ in 0..10 {
        let next = seq.advance().current_step_index();
        assert!(next >= prev);
        assert!(next - prev <= 1);
        prev = next;
    }
    assert_eq!(prev, 3);
}

#[test]
fn reset_replays_deterministically() {
    let mut seq = StepSequencer::create(trail_scenario(5)).unwrap();
    let initial = seq.state().clone();

    seq.run_to_completion();
    let first_terminal = seq.state().clone();
    let first_fp = seq.run_fingerprint().expect("finished run has fingerprint");
    let first_steps = seq.step_fingerprints().to_vec();

    // reset a mitad de camino y de nuevo al final
    seq.reset();
    assert_eq!(seq.state(), &initial);
    seq.run_n(2);
    seq.reset();
    assert_eq!(seq.state(), &initial);

    seq.run_to_completion();
    assert_eq!(seq.state(), &first_terminal);
    assert_eq!(seq.run_fingerprint(), Some(first_fp));
    assert_eq!(seq.step_fingerprints(), first_steps.as_slice());
}

#[test]
fn independent_sessions_share_fingerprints() {
    let mut a = StepSequencer::create(trail_scenario(3)).unwrap();
    let mut b = StepSequencer::create(trail_scenario(3)).unwrap();
    a.run_to_completion();
    b.run_to_completion();
    assert_ne!(a.session_id(), b.session_id());
    assert_eq!(a.run_fingerprint(), b.run_fingerprint());
}

#[test]
fn empty_scenario_fails_at_create() {
    let err = StepSequencer::create(trail_scenario(0)).err().expect("empty scenario must fail");
    assert!(matches!(err, SequencerError::InvalidScenario(_)));
    assert!(trail_scenario(0).create_state().is_err());
}

#[test]
fn reset_with_invalid_scenario_keeps_current_session() {
    let mut seq = StepSequencer::create(trail_scenario(3)).unwrap();
    seq.advance();
    let before = seq.state().clone();
    let session = seq.session_id();

    let res = seq.reset_with(trail_scenario(0));
    assert!(matches!(res, Err(SequencerError::InvalidScenario(_))));
    assert_eq!(seq.state(), &before);
    assert_eq!(seq.session_id(), session);

    let fresh = seq.reset_with(trail_scenario(2)).expect("valid scenario").clone();
    assert_eq!(fresh.current_step_index(), -1);
    assert_eq!(fresh.step_count(), 2);
    assert_eq!(seq.scenario().id(), "trail_2");
}

#[test]
fn run_n_stops_at_terminal() {
    let mut seq = StepSequencer::create(trail_scenario(2)).unwrap();
    let state = seq.run_n(10);
    assert!(state.is_finished());
    assert_eq!(state.current_step_index(), 1);
}
