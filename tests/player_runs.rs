use std::io::Cursor;

use stepviz::{AppConfig, Player};
use stepviz_scenarios::{Catalog, ScenarioOptions};

fn quiet_config() -> AppConfig {
    AppConfig { show_bag: false,
                ..AppConfig::default() }
}

fn open(id: &str) -> Box<dyn stepviz_core::Playable> {
    Catalog::builtin().open(id, &ScenarioOptions::default()).unwrap()
}

#[test]
fn auto_play_prints_every_frame_and_the_fingerprint() {
    let config = quiet_config();
    let mut player = Player::new(open("counter"), &config);
    let mut out = Vec::new();
    player.run_auto(&mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert!(text.starts_with("[Ready]"));
    assert!(text.contains("[Step 1 of 3] Increment"));
    assert!(text.contains("[Step 2 of 3] Increment"));
    assert!(text.contains("[Complete] Increment"));
    assert_eq!(text.matches("run fingerprint: ").count(), 1);
    assert!(!text.contains("bag:"));
    assert!(player.playable().is_finished());
}

#[test]
fn interactive_commands_drive_the_sequencer() {
    let config = quiet_config();
    let mut player = Player::new(open("counter"), &config);
    let mut out = Vec::new();
    player.run_interactive(Cursor::new("n\n\nr\nn\nq\nn\n"), &mut out).unwrap();
    // Tras `q` no se procesa nada más: un avance después del reset.
    assert_eq!(player.playable().frame().step_index, 0);
}

#[test]
fn terminal_advance_is_reported_not_applied() {
    let config = quiet_config();
    let mut player = Player::new(open("counter"), &config);
    let mut out = Vec::new();
    player.run_interactive(Cursor::new("n\nn\nn\nn\n"), &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("already complete"));
    assert_eq!(text.matches("run fingerprint:").count(), 1);
    assert_eq!(player.playable().frame().step_index, 2);
}

#[test]
fn cues_are_drained_after_each_step() {
    let config = quiet_config();
    let mut player = Player::new(open("index_seek"), &config);
    let mut out = Vec::new();
    player.run_interactive(Cursor::new("n\n"), &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("@0ms log_line"));
    assert!(text.contains("@400ms log_line"));
    assert_eq!(player.playable().pending_cues(), 0);
}

#[test]
fn bag_is_printed_when_enabled() {
    let config = AppConfig::default();
    let mut player = Player::new(open("counter"), &config);
    let mut out = Vec::new();
    player.run_interactive(Cursor::new("n\n"), &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains(r#"bag: {"count":1}"#));
}

#[test]
fn same_scenario_same_fingerprint_across_hosts() {
    let config = quiet_config();
    let mut a = Player::new(open("recursive_cte"), &config);
    let mut b = Player::new(open("recursive_cte"), &config);
    a.run_auto(&mut Vec::new()).unwrap();
    b.run_auto(&mut Vec::new()).unwrap();
    assert!(a.playable().run_fingerprint().is_some());
    assert_eq!(a.playable().run_fingerprint(), b.playable().run_fingerprint());
}
