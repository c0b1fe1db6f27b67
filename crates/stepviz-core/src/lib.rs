//! stepviz-core: secuenciador de pasos finito y determinista.
//!
//! Un `Scenario` es una lista ordenada e inmutable de pasos; cada paso
//! transforma un state bag opaco y produce narración. `StepSequencer` avanza
//! el escenario de a un paso, es idempotente en el paso terminal y vuelve al
//! estado inicial exacto con `reset`.
pub mod constants;
pub mod errors;
pub mod event;
pub mod hashing;
pub mod presentation;
pub mod scenario;
pub mod sequencer;
pub mod step;

pub use errors::SequencerError;
pub use event::{InMemoryJournal, SequencerEvent, SequencerEventKind, SequencerJournal};
pub use presentation::{Cue, CueHandle, FiredCue, PresentationQueue};
pub use scenario::{Scenario, ScenarioBuilder};
pub use sequencer::{Frame, Playable, SequencerState, StepSequencer};
pub use step::{step, FnStep, Highlight, Narration, StateBag, StepDefinition, StepOutcome, StepTag};

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq, Serialize)]
    struct Counter {
        count: u32,
    }

    fn inc(id: &str) -> FnStep<Counter> {
        step(id, |bag: &Counter| {
            let next = Counter { count: bag.count + 1 };
            let text = format!("count is now {}", next.count);
            StepOutcome::new(next, "Increment", text)
        })
    }

    fn counter() -> Scenario<Counter> {
        Scenario::builder("counter", Counter { count: 0 }).step(inc("one"))
                                                          .step(inc("two"))
                                                          .step(inc("three"))
                                                          .build()
    }

    #[test]
    fn three_step_counter_trace() {
        let scenario = counter();
        let s0 = scenario.create_state().expect("valid scenario");
        assert_eq!((s0.state_bag().count, s0.current_step_index(), s0.is_finished()), (0, -1, false));

        let s1 = scenario.advance(s0.clone());
        assert_eq!((s1.state_bag().count, s1.current_step_index(), s1.is_finished()), (1, 0, false));
        let s2 = scenario.advance(s1);
        assert_eq!((s2.state_bag().count, s2.current_step_index(), s2.is_finished()), (2, 1, false));
        let s3 = scenario.advance(s2);
        assert_eq!((s3.state_bag().count, s3.current_step_index(), s3.is_finished()), (3, 2, true));

        let s4 = scenario.advance(s3.clone());
        assert_eq!(s4, s3);

        let again = scenario.reset().expect("valid scenario");
        assert_eq!(again, s0);
    }

    #[test]
    fn narration_labels_follow_the_index() {
        let scenario = counter();
        let mut state = scenario.create_state().unwrap();
        assert_eq!(state.narration().label, "Ready");
        state = scenario.advance(state);
        assert_eq!(state.narration().label, "Step 1 of 3");
        assert_eq!(state.narration().text, "count is now 1");
        state = scenario.advance(scenario.advance(state));
        assert_eq!(state.narration().label, "Complete");
    }

    #[test]
    fn duplicate_step_ids_are_rejected() {
        let scenario = Scenario::builder("dup", Counter { count: 0 }).step(inc("same"))
                                                                     .step(inc("same"))
                                                                     .build();
        let err = scenario.create_state().unwrap_err();
        assert!(matches!(err, SequencerError::InvalidScenario(ref m) if m.contains("same")));
    }

    #[test]
    fn step_lookup_by_id() {
        let scenario = counter();
        let (idx, s) = scenario.step_by_id("two").expect("step two exists");
        assert_eq!(idx, 1);
        assert_eq!(s.id(), "two");
        assert!(scenario.step_by_id("four").is_none());
    }

    #[test]
    fn frame_exposes_bag_as_json() {
        let mut seq = StepSequencer::create(counter()).unwrap();
        seq.advance();
        let frame = Playable::frame(&seq);
        assert_eq!(frame.step_index, 0);
        assert_eq!(frame.step_id.as_deref(), Some("one"));
        assert_eq!(frame.progress_label, "Step 1 of 3");
        assert_eq!(frame.bag, json!({"count": 1}));
    }
}
