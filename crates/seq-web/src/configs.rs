// Built-in music configurations. The host page selects one by name through
// the track-selected event. Every entry must pass `MusicConfig::validate`; a
// test pins that so a bad edit here fails in CI rather than at page load.

use fnv::FnvHashMap;
use seq_core::MusicConfig;

/// Configuration applied at startup.
pub const DEFAULT_CONFIG: &str = "neon-skyline";

pub fn names() -> &'static [&'static str] {
    &["neon-skyline", "glitch-garden"]
}

pub fn by_name(name: &str) -> Option<MusicConfig> {
    match name {
        "neon-skyline" => Some(neon_skyline()),
        "glitch-garden" => Some(glitch_garden()),
        _ => None,
    }
}

fn audio_files(dir: &str, notes: &[u32]) -> FnvHashMap<u32, String> {
    notes
        .iter()
        .map(|&n| (n, format!("audio/{dir}/note-{n}.ogg")))
        .collect()
}

/// Six cells, one nested pair: note 4 starts tucked inside note 1.
fn neon_skyline() -> MusicConfig {
    let mut nested = FnvHashMap::default();
    nested.insert(1, vec![4]);
    MusicConfig {
        name: "neon-skyline".to_owned(),
        bpm: 120.0,
        total_cells: 6,
        player_a_cells: vec![1, 2, 3],
        player_b_cells: vec![4, 5, 6],
        player_a_notes: vec![1, 2, 3],
        player_b_notes: vec![4, 5, 6],
        audio_files: audio_files("neon-skyline", &[1, 2, 3, 4, 5, 6]),
        background_music: Some("audio/neon-skyline/background.ogg".to_owned()),
        nested_items: nested,
    }
}

/// Eight cells and a two-level nest: note 2 rides inside note 5, which rides
/// inside note 1.
fn glitch_garden() -> MusicConfig {
    let mut nested = FnvHashMap::default();
    nested.insert(1, vec![5]);
    nested.insert(5, vec![2]);
    MusicConfig {
        name: "glitch-garden".to_owned(),
        bpm: 96.0,
        total_cells: 8,
        player_a_cells: vec![1, 2, 3, 4],
        player_b_cells: vec![5, 6, 7, 8],
        player_a_notes: vec![1, 2, 3, 4],
        player_b_notes: vec![5, 6, 7, 8],
        audio_files: audio_files("glitch-garden", &[1, 2, 3, 4, 5, 6, 7, 8]),
        background_music: Some("audio/glitch-garden/background.ogg".to_owned()),
        nested_items: nested,
    }
}
