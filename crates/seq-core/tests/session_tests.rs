// End-to-end session tests: drag-to-sequence, toggling, transport, config
// switching and the invariant that the track set and the special-effect set
// never drift apart.

use fnv::FnvHashMap;
use glam::Vec2;
use seq_core::config::{ConfigError, MusicConfig, Player};
use seq_core::drag::DropOutcome;
use seq_core::grid::{CellKey, GridEffect};
use seq_core::pulse::PulseOp;
use seq_core::session::Session;

const STAGE: Vec2 = Vec2::new(1200.0, 800.0);

fn groove() -> MusicConfig {
    let mut audio_files = FnvHashMap::default();
    for number in 1..=6u32 {
        audio_files.insert(number, format!("audio/groove/note-{number}.ogg"));
    }
    let mut nested_items = FnvHashMap::default();
    nested_items.insert(1, vec![4]);
    MusicConfig {
        name: "test groove".into(),
        bpm: 120.0,
        total_cells: 6,
        player_a_cells: vec![1, 2, 3],
        player_b_cells: vec![4, 5, 6],
        player_a_notes: vec![1, 2, 3],
        player_b_notes: vec![4, 5, 6],
        audio_files,
        background_music: Some("audio/groove/background.ogg".into()),
        nested_items,
    }
}

fn b_side() -> MusicConfig {
    let mut audio_files = FnvHashMap::default();
    for number in 1..=4u32 {
        audio_files.insert(number, format!("audio/bside/note-{number}.ogg"));
    }
    MusicConfig {
        name: "b side".into(),
        bpm: 96.0,
        total_cells: 4,
        player_a_cells: vec![1, 2],
        player_b_cells: vec![3, 4],
        player_a_notes: vec![1, 2],
        player_b_notes: vec![3, 4],
        audio_files,
        background_music: None,
        nested_items: FnvHashMap::default(),
    }
}

fn session() -> Session {
    Session::new(groove(), STAGE).unwrap()
}

fn cell(position: u32, player: Player) -> CellKey {
    CellKey::new(position, player)
}

fn assert_consistent(session: &Session) {
    assert_eq!(
        session.tracks.enabled(),
        session.pulse.active_effects(),
        "enabled tracks and active special effects must agree"
    );
}

/// Drive the active drag until it settles on the pointer target.
fn settle(session: &mut Session) {
    for _ in 0..240 {
        let _ = session.drag_frame();
    }
}

#[test]
fn new_session_rejects_invalid_configs() {
    let mut config = groove();
    config.audio_files.remove(&3);
    assert!(matches!(
        Session::new(config, STAGE),
        Err(ConfigError::MissingAudioFile(3))
    ));
}

#[test]
fn dropping_a_note_into_its_cell_enables_track_and_effect() {
    let mut session = session();
    let key = cell(2, Player::A);
    let target = session.stage.cell_rect(key).unwrap().center();
    let grab = session.notes.get(2).unwrap().center();

    assert!(session.begin_drag(2, grab));
    session.drag_pointer(target);
    settle(&mut session);
    let resolution = session.release_drag().unwrap();

    assert_eq!(resolution.outcome, DropOutcome::InCell(key));
    assert_eq!(
        resolution.ops.track_effects,
        vec![GridEffect::NoteActivated(2)]
    );
    assert!(resolution
        .ops
        .pulse_ops
        .contains(&PulseOp::ShowEffect { note: 2 }));
    assert!(session.tracks.is_enabled(2));
    assert_eq!(session.notes.get(2).unwrap().in_cell, Some(2));
    assert_eq!(session.grid.occupant(key).unwrap().note, 2);
    assert_consistent(&session);
}

#[test]
fn snapped_back_and_cross_side_drops_touch_no_tracks() {
    let mut session = session();
    let grab = session.notes.get(3).unwrap().center();
    session.begin_drag(3, grab);
    session.drag_pointer(Vec2::new(800.0, 300.0));
    settle(&mut session);
    let resolution = session.release_drag().unwrap();
    assert_eq!(
        resolution.outcome,
        DropOutcome::CrossedSides {
            from: Player::A,
            to: Player::B
        }
    );
    assert!(resolution.ops.track_effects.is_empty());
    assert!(session.tracks.enabled().is_empty());
    assert_consistent(&session);
}

#[test]
fn toggling_a_cell_mutes_and_unmutes_its_note() {
    let mut session = session();
    let key = cell(2, Player::A);
    session.place_note(key, 2);
    assert_consistent(&session);

    let ops = session.toggle_cell(key);
    assert_eq!(ops.track_effects, vec![GridEffect::NoteDeactivated(2)]);
    assert!(ops.pulse_ops.contains(&PulseOp::HideEffect { note: 2 }));
    assert!(!session.tracks.is_enabled(2));
    assert_eq!(
        session.grid.occupant(key).unwrap().note,
        2,
        "the note stays in the cell while muted"
    );
    assert_consistent(&session);

    let ops = session.toggle_cell(key);
    assert_eq!(ops.track_effects, vec![GridEffect::NoteActivated(2)]);
    assert!(session.tracks.is_enabled(2));
    assert_consistent(&session);
}

#[test]
fn replacing_an_occupant_orders_deactivation_first() {
    let mut session = session();
    let key = cell(2, Player::A);
    session.place_note(key, 2);
    let ops = session.place_note(key, 2);
    assert_eq!(
        ops.track_effects,
        vec![GridEffect::NoteDeactivated(2), GridEffect::NoteActivated(2)],
        "the evicted occupant goes silent before the new activation"
    );
    assert_eq!(session.grid.occupant(key).unwrap().note, 2);
    assert_consistent(&session);
}

#[test]
fn invalid_session_ops_are_silent_no_ops() {
    let mut session = session();
    assert!(session.place_note(cell(2, Player::A), 9).is_empty());
    assert!(session.toggle_cell(cell(2, Player::A)).is_empty());
    assert!(session.clear_cell(cell(2, Player::A)).is_empty());
    assert!(session.grid.is_empty());
    assert_consistent(&session);
}

#[test]
fn beat_ticks_advance_and_wrap_the_step_counter() {
    let mut session = session();
    assert!(session.beat_tick().is_empty(), "no beats while stopped");
    assert_eq!(session.current_step(), 0);

    session.start_playback(true);
    for _ in 0..7 {
        session.beat_tick();
    }
    assert_eq!(session.current_step(), 1, "seven beats wrap six cells once");
}

#[test]
fn starting_from_beginning_resets_the_step_counter() {
    let mut session = session();
    session.start_playback(true);
    for _ in 0..3 {
        session.beat_tick();
    }
    assert_eq!(session.current_step(), 3);

    session.start_playback(false);
    assert_eq!(session.current_step(), 3, "resume keeps the position");
    session.start_playback(true);
    assert_eq!(session.current_step(), 0, "fresh start rewinds");
}

#[test]
fn stop_clears_pulse_styling_and_rewinds() {
    let mut session = session();
    let key = cell(2, Player::A);
    session.place_note(key, 2);
    session.start_playback(true);
    for _ in 0..5 {
        session.beat_tick();
    }

    let ops = session.stop_playback();
    assert!(ops.pulse_ops.contains(&PulseOp::ClearStyle { cell: key }));
    assert!(!session.pulse.is_running());
    assert!(!session.tracks.is_playing());
    assert_eq!(session.current_step(), 0);
    assert!(
        session.tracks.is_enabled(2),
        "stopping the transport does not unsequence the cell"
    );
    assert_consistent(&session);
}

#[test]
fn reset_restores_the_initial_layout() {
    let mut session = session();
    session.place_note(cell(2, Player::A), 2);
    session.begin_drag(4, session.notes.get(4).unwrap().center());
    let _ = session.release_drag();
    assert!(!session.notes.is_attached_child(4), "drag extracted the child");
    session.start_playback(true);

    let ops = session.reset();
    assert!(ops
        .track_effects
        .contains(&GridEffect::NoteDeactivated(2)));
    assert!(session.grid.is_empty());
    assert!(session.tracks.enabled().is_empty());
    assert!(!session.tracks.is_playing());
    assert_eq!(session.current_step(), 0);
    assert!(
        session.notes.is_attached_child(4),
        "reset rebuilds the config's initial nesting"
    );
    assert_consistent(&session);
}

#[test]
fn config_switch_rebuilds_everything() {
    let mut session = session();
    session.place_note(cell(2, Player::A), 2);
    session.start_playback(true);
    session.set_split(64.0);
    session.set_master_volume(0.5);

    let ops = session.apply_config(b_side()).unwrap();
    assert!(ops.pulse_ops.contains(&PulseOp::HideEffect { note: 2 }));
    assert_eq!(session.config().name, "b side");
    assert_eq!(session.notes.len(), 4);
    assert!(session.grid.is_empty());
    assert!(session.tracks.enabled().is_empty());
    assert!(!session.tracks.is_playing());
    assert_eq!(session.current_step(), 0);

    assert_eq!(session.split.percent(), 64.0, "divider is page state");
    assert_eq!(
        session.tracks.master_volume(),
        0.5,
        "volume survives the switch"
    );
    assert!(
        session.tracks.started_once(),
        "the first-start marker survives the switch"
    );
    assert_consistent(&session);
}

#[test]
fn rejected_config_leaves_the_session_running() {
    let mut session = session();
    session.place_note(cell(2, Player::A), 2);

    let mut bad = b_side();
    bad.player_b_cells = vec![3, 9];
    let err = session.apply_config(bad).unwrap_err();
    assert!(matches!(err, ConfigError::CellOutOfRange { position: 9, .. }));

    assert_eq!(session.config().name, "test groove");
    assert_eq!(
        session.grid.occupant(cell(2, Player::A)).unwrap().note,
        2,
        "the live grid is untouched by the failed switch"
    );
    assert!(session.tracks.is_enabled(2));
    assert_consistent(&session);
}

#[test]
fn track_and_effect_sets_agree_across_a_whole_script() {
    let mut session = session();
    session.place_note(cell(2, Player::A), 2);
    assert_consistent(&session);
    session.place_note(cell(5, Player::B), 5);
    assert_consistent(&session);
    session.toggle_cell(cell(2, Player::A));
    assert_consistent(&session);
    session.clear_cell(cell(5, Player::B));
    assert_consistent(&session);
    session.toggle_cell(cell(2, Player::A));
    assert_consistent(&session);
    session.start_playback(true);
    session.beat_tick();
    assert_consistent(&session);
    session.stop_playback();
    assert_consistent(&session);
    session.reset();
    assert_consistent(&session);
}

#[test]
fn clearing_a_cell_frees_its_note() {
    let mut session = session();
    let key = cell(2, Player::A);
    session.place_note(key, 2);
    let ops = session.clear_cell(key);
    assert_eq!(ops.track_effects, vec![GridEffect::NoteDeactivated(2)]);
    assert!(session.notes.get(2).unwrap().is_free());
    assert!(!session.tracks.is_enabled(2));
    assert_consistent(&session);
}

#[test]
fn stage_resize_keeps_cells_reachable() {
    let mut session = session();
    session.set_stage_size(Vec2::new(1600.0, 900.0));
    let key = cell(6, Player::B);
    let rect = session.stage.cell_rect(key).unwrap();
    assert!(rect.max.x <= 1600.0);
    assert_eq!(session.stage.cell_at(rect.center()), Some(key));
}
