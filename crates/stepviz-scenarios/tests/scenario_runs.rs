use stepviz_core::{Playable, StepSequencer, StepTag};
use stepviz_domain::{BomTable, IndexStrategy, JoinKind};
use stepviz_scenarios::counter::three_step_counter;
use stepviz_scenarios::recursive_cte::{bom_explosion, one_hop, ROOT_PART};
use stepviz_scenarios::{index_seek, Catalog, ScenarioOptions};

#[test]
fn one_hop_results_are_anchor_then_children() {
    let mut seq = StepSequencer::create(one_hop()).unwrap();
    seq.run_n(3);
    let bag = seq.state().state_bag();
    let children: Vec<&str> = bag.results.iter().map(|r| r.child.as_str()).collect();
    assert_eq!(children,
               vec!["BLOCK-ASM",
                    "PISTON-SET",
                    "CRANKSHAFT",
                    "CYLINDER-LINER",
                    "CAM-BEARING",
                    "PISTON-RING",
                    "WRIST-PIN"]);
    let levels: Vec<u32> = bag.results.iter().map(|r| r.level).collect();
    assert_eq!(levels, vec![1, 1, 1, 2, 2, 2, 2]);
    assert!(seq.state().is_finished());
}

#[test]
fn bom_explosion_ends_with_the_full_tree() {
    let mut seq = StepSequencer::create(bom_explosion()).unwrap();
    seq.run_to_completion();
    let bag = seq.state().state_bag();
    let expected = BomTable::engine_sample().explode(ROOT_PART).unwrap();
    assert_eq!(bag.results, expected);
    assert_eq!(bag.results.len(), 8);
    assert_eq!(bag.level, 3);
    assert!(bag.output_buffer.is_empty());
    assert!(!bag.processing);
    assert!(bag.results.iter().all(|r| r.parent != "TURBO-ASSY"));
    assert_eq!(seq.state().narration().label, "Complete");
}

#[test]
fn counter_terminal_bag() {
    let mut seq = StepSequencer::create(three_step_counter()).unwrap();
    seq.run_to_completion();
    assert_eq!(seq.state().state_bag().count, 3);
    assert_eq!(seq.state().current_step_index(), 2);
}

#[test]
fn reset_drops_pending_log_cues() {
    let mut seq = StepSequencer::create(index_seek::scenario(8, IndexStrategy::NonClustered)).unwrap();
    seq.advance();
    // La raíz emite dos líneas de log más el pulso del nodo.
    assert_eq!(seq.presentation().pending_len(), 3);
    let fired = seq.tick(0);
    assert_eq!(fired.len(), 2);
    seq.reset();
    assert!(seq.presentation().is_idle());
    assert!(seq.tick(10_000).is_empty());
}

#[test]
fn log_cues_fire_every_400ms() {
    let mut seq = StepSequencer::create(index_seek::scenario(8, IndexStrategy::Clustered)).unwrap();
    seq.advance();
    let first = seq.tick(0);
    assert!(first.iter().any(|c| c.key == "log_line"));
    assert!(seq.tick(399).is_empty());
    let second = seq.tick(1);
    assert_eq!(second.len(), 1);
    assert_eq!(second[0].due_at_ms, 400);
}

#[test]
fn every_catalog_entry_plays_to_completion() {
    let catalog = Catalog::builtin();
    let options = ScenarioOptions::default();
    for id in catalog.ids() {
        let mut p = catalog.open(id, &options).unwrap();
        assert_eq!(p.frame().step_index, -1, "{id}");
        let steps = p.frame().step_count;
        for _ in 0..steps {
            p.advance();
        }
        assert!(p.is_finished(), "{id}");
        let done = p.frame();
        p.advance();
        assert_eq!(p.frame(), done, "{id} terminal advance must be a no-op");
        assert!(p.run_fingerprint().is_some());
    }
}

#[test]
fn replay_after_reset_gives_the_same_fingerprint() {
    let catalog = Catalog::builtin();
    let mut options = ScenarioOptions::default();
    options.join = JoinKind::Full;
    let mut p = catalog.open("joins", &options).unwrap();
    while !p.is_finished() {
        p.advance();
    }
    let first = p.run_fingerprint();
    p.reset();
    assert_eq!(p.frame().step_index, -1);
    assert_eq!(p.run_fingerprint(), None);
    while !p.is_finished() {
        p.advance();
    }
    assert_eq!(p.run_fingerprint(), first);
}

#[test]
fn frames_carry_step_tags() {
    let mut p = Catalog::builtin().open("recursive_cte", &ScenarioOptions::default())
                                  .unwrap();
    assert_eq!(p.frame().tag, None);
    p.advance();
    assert_eq!(p.frame().tag, Some(StepTag::Anchor));
    assert_eq!(p.frame().highlights[0].keys, vec!["2", "3", "4", "5", "6"]);
}

#[test]
fn gap_fill_method_comes_from_options() {
    let mut options = ScenarioOptions::default();
    options.set("fill", "linear").unwrap();
    let mut p = Catalog::builtin().open("gap_fill", &options).unwrap();
    while !p.is_finished() {
        p.advance();
    }
    let bag = p.frame().bag;
    assert_eq!(bag["method"], "linear");
    assert_eq!(bag["filled"][3]["filled"], 83);
    assert_eq!(bag["filled"][3]["synthetic"], true);
}

#[test]
fn deadlock_frame_names_the_victim() {
    let mut p = Catalog::builtin().open("deadlock", &ScenarioOptions::default())
                                  .unwrap();
    for _ in 0..5 {
        p.advance();
    }
    let frame = p.frame();
    assert_eq!(frame.step_id.as_deref(), Some("detect_deadlock"));
    assert_eq!(frame.tag, Some(StepTag::Terminate));
    assert_eq!(frame.bag["victim"], "TxB");
}
