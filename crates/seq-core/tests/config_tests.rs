// Validation tests for music configs: a config is accepted as a whole or
// rejected before it can touch a running session.

use fnv::FnvHashMap;
use seq_core::config::{ConfigError, MusicConfig, Player};

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

#[test]
fn complete_config_validates() {
    assert_eq!(groove().validate(), Ok(()));
}

#[test]
fn empty_name_is_rejected() {
    let mut config = groove();
    config.name = "   ".into();
    assert_eq!(config.validate(), Err(ConfigError::EmptyName));
}

#[test]
fn zero_cells_is_rejected() {
    let mut config = groove();
    config.total_cells = 0;
    assert_eq!(config.validate(), Err(ConfigError::NoCells));
}

#[test]
fn non_positive_bpm_is_rejected() {
    let mut config = groove();
    config.bpm = 0.0;
    assert_eq!(config.validate(), Err(ConfigError::NonPositiveBpm));
    config.bpm = -10.0;
    assert_eq!(config.validate(), Err(ConfigError::NonPositiveBpm));
}

#[test]
fn out_of_range_cell_is_rejected() {
    let mut config = groove();
    config.player_b_cells = vec![4, 5, 7];
    assert_eq!(
        config.validate(),
        Err(ConfigError::CellOutOfRange {
            position: 7,
            player: Player::B,
            total: 6
        })
    );
}

#[test]
fn cell_position_used_twice_is_rejected() {
    let mut config = groove();
    config.player_b_cells = vec![3, 4, 5];
    assert_eq!(config.validate(), Err(ConfigError::DuplicateCell(3)));
}

#[test]
fn note_number_used_twice_is_rejected() {
    let mut config = groove();
    config.player_b_notes = vec![3, 5, 6];
    assert_eq!(config.validate(), Err(ConfigError::DuplicateNote(3)));
}

#[test]
fn note_without_audio_file_is_rejected() {
    let mut config = groove();
    config.audio_files.remove(&5);
    assert_eq!(config.validate(), Err(ConfigError::MissingAudioFile(5)));
}

#[test]
fn nesting_under_unknown_parent_is_rejected() {
    let mut config = groove();
    config.nested_items.insert(9, vec![2]);
    assert_eq!(config.validate(), Err(ConfigError::UnknownNestedParent(9)));
}

#[test]
fn nesting_of_unknown_child_is_rejected() {
    let mut config = groove();
    config.nested_items.insert(2, vec![9]);
    assert_eq!(
        config.validate(),
        Err(ConfigError::UnknownNestedChild { parent: 2, child: 9 })
    );
}

#[test]
fn self_nesting_is_rejected() {
    let mut config = groove();
    config.nested_items.insert(2, vec![2]);
    assert_eq!(config.validate(), Err(ConfigError::SelfNested(2)));
}

#[test]
fn child_under_two_parents_is_rejected() {
    let mut config = groove();
    config.nested_items.insert(2, vec![4]);
    assert_eq!(config.validate(), Err(ConfigError::ChildUnderManyParents(4)));
}

#[test]
fn nesting_cycle_is_rejected() {
    let mut config = groove();
    config.nested_items.clear();
    config.nested_items.insert(2, vec![3]);
    config.nested_items.insert(3, vec![2]);
    assert!(matches!(
        config.validate(),
        Err(ConfigError::NestingCycle(_))
    ));
}

#[test]
fn nesting_chains_are_allowed() {
    let mut config = groove();
    config.nested_items.clear();
    config.nested_items.insert(1, vec![5]);
    config.nested_items.insert(5, vec![2]);
    assert_eq!(config.validate(), Ok(()));
}

#[test]
fn lookup_helpers_answer_by_side() {
    let config = groove();
    assert_eq!(config.home_of_note(2), Some(Player::A));
    assert_eq!(config.home_of_note(6), Some(Player::B));
    assert_eq!(config.home_of_note(9), None);
    assert_eq!(config.owner_of_cell(1), Some(Player::A));
    assert_eq!(config.owner_of_cell(6), Some(Player::B));
    assert_eq!(config.owner_of_cell(9), None);
    assert_eq!(config.note_count(), 6);
    assert!(config.audio_file(3).unwrap().ends_with("note-3.ogg"));
}
