use serde::Serialize;
use serde_json::json;
use stepviz_core::{step, Cue, Scenario, SequencerEventKind, SequencerJournal, StepOutcome, StepSequencer, StepTag};

#[derive(Debug, Clone, Serialize)]
struct Rows {
    shown: Vec<u32>,
}

fn reveal_scenario() -> Scenario<Rows> {
    Scenario::builder("reveal", Rows { shown: vec![] })
        .title("Reveal rows")
        .step(step("load", |_: &Rows| StepOutcome::new(Rows { shown: vec![1, 2, 3] }, "Load", "three rows"))
              .tagged(StepTag::Scan)
              .with_cues(|bag: &Rows| Cue::staggered("row", 400, bag.shown.iter().map(|r| json!(r)))))
        .step(step("done", |bag: &Rows| StepOutcome::new(bag.clone(), "Done", "all rows shown")).tagged(StepTag::Summary))
        .build()
}

#[test]
fn journal_records_a_full_session() {
    let mut seq = StepSequencer::create(reveal_scenario()).unwrap();
    seq.run_to_completion();

    let events = seq.events();
    assert_eq!(seq.event_variants(), vec!["I", "A", "A", "C"]);
    assert!(events.windows(2).all(|w| w[0].seq + 1 == w[1].seq));
    match &events[0].kind {
        SequencerEventKind::SessionStarted { scenario_id,
                                              step_count,
                                              scenario_hash,
                                              reset_from_step_index, } => {
            assert_eq!(scenario_id, "reveal");
            assert_eq!(*reset_from_step_index, None);
            assert_eq!(*step_count, 2);
            assert_eq!(scenario_hash, seq.scenario().scenario_hash());
        }
        other => panic!("unexpected first event {other:?}"),
    }
    assert!(events.iter().any(|e| matches!(&e.kind,
        SequencerEventKind::StepApplied { step_id, tag: StepTag::Scan, .. } if step_id == "load")));
}

#[test]
fn reset_discards_the_old_session() {
    let mut seq = StepSequencer::create(reveal_scenario()).unwrap();
    seq.advance();
    let old = seq.session_id();
    seq.reset();

    assert!(seq.journal().list(old).is_empty());
    assert_ne!(seq.session_id(), old);
    assert_eq!(seq.event_variants(), vec!["I"]);
    assert!(matches!(seq.events()[0].kind,
                     SequencerEventKind::SessionStarted { reset_from_step_index: Some(0), .. }));
}

#[test]
fn cues_fire_with_pacing_and_never_touch_state() {
    let mut seq = StepSequencer::create(reveal_scenario()).unwrap();
    seq.advance();
    let before = seq.state().clone();

    let first = seq.tick(0);
    assert_eq!(first.len(), 1);
    assert_eq!(first[0].payload, json!(1));
    assert_eq!(first[0].step_index, 0);

    let rest = seq.tick(800);
    assert_eq!(rest.iter().map(|c| c.payload.clone()).collect::<Vec<_>>(), vec![json!(2), json!(3)]);
    assert_eq!(seq.state().state_bag().shown, before.state_bag().shown);
    assert_eq!(seq.state().current_step_index(), before.current_step_index());
}

#[test]
fn reset_flushes_pending_cues() {
    let mut seq = StepSequencer::create(reveal_scenario()).unwrap();
    seq.advance();
    assert_eq!(seq.presentation().pending_len(), 3);
    seq.tick(0);
    seq.reset();
    assert!(seq.presentation().is_idle());
    assert!(seq.tick(10_000).is_empty());
}
