//! Music configuration data and validation.
//!
//! A [`MusicConfig`] describes one selectable groove: which cells each player
//! side owns, which notes exist, where their audio lives and how notes nest
//! inside each other at the start of a session. Configs are validated as a
//! whole before a session is (re)built from them; a config that fails
//! validation is rejected and must leave any previously active session
//! untouched.

use fnv::{FnvHashMap, FnvHashSet};
use thiserror::Error;

/// One of the two screen sides / players.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Player {
    A,
    B,
}

impl Player {
    pub fn opposite(self) -> Self {
        match self {
            Player::A => Player::B,
            Player::B => Player::A,
        }
    }

    /// Short key used in element ids and CSS classes.
    pub fn key(self) -> &'static str {
        match self {
            Player::A => "a",
            Player::B => "b",
        }
    }
}

impl std::fmt::Display for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Player::A => "A",
            Player::B => "B",
        })
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("config name is empty")]
    EmptyName,
    #[error("total_cells must be at least 1")]
    NoCells,
    #[error("bpm must be positive")]
    NonPositiveBpm,
    #[error("cell position {position} for player {player} is outside 1..={total}")]
    CellOutOfRange { position: u32, player: Player, total: u32 },
    #[error("cell position {0} is assigned more than once")]
    DuplicateCell(u32),
    #[error("note {number} is outside 1..={total}")]
    NoteOutOfRange { number: u32, total: u32 },
    #[error("note {0} is listed more than once")]
    DuplicateNote(u32),
    #[error("note {0} has no audio file")]
    MissingAudioFile(u32),
    #[error("nested parent {0} is not a configured note")]
    UnknownNestedParent(u32),
    #[error("nested child {child} under {parent} is not a configured note")]
    UnknownNestedChild { parent: u32, child: u32 },
    #[error("note {0} cannot nest under itself")]
    SelfNested(u32),
    #[error("nested child {0} appears under more than one parent")]
    ChildUnderManyParents(u32),
    #[error("nesting relationships form a cycle through note {0}")]
    NestingCycle(u32),
}

/// Full description of one groove.
///
/// `nested_items` maps a parent note to the children tucked inside it when the
/// session starts. Nesting may chain (a child may itself be a parent) but a
/// child has at most one parent and chains never loop back.
#[derive(Clone, Debug)]
pub struct MusicConfig {
    pub name: String,
    pub bpm: f32,
    pub total_cells: u32,
    pub player_a_cells: Vec<u32>,
    pub player_b_cells: Vec<u32>,
    pub player_a_notes: Vec<u32>,
    pub player_b_notes: Vec<u32>,
    pub audio_files: FnvHashMap<u32, String>,
    pub background_music: Option<String>,
    pub nested_items: FnvHashMap<u32, Vec<u32>>,
}

impl MusicConfig {
    pub fn cells_for(&self, player: Player) -> &[u32] {
        match player {
            Player::A => &self.player_a_cells,
            Player::B => &self.player_b_cells,
        }
    }

    pub fn notes_for(&self, player: Player) -> &[u32] {
        match player {
            Player::A => &self.player_a_notes,
            Player::B => &self.player_b_notes,
        }
    }

    /// Which side a note belongs to by configuration (its home side).
    pub fn home_of_note(&self, number: u32) -> Option<Player> {
        if self.player_a_notes.contains(&number) {
            Some(Player::A)
        } else if self.player_b_notes.contains(&number) {
            Some(Player::B)
        } else {
            None
        }
    }

    pub fn owner_of_cell(&self, position: u32) -> Option<Player> {
        if self.player_a_cells.contains(&position) {
            Some(Player::A)
        } else if self.player_b_cells.contains(&position) {
            Some(Player::B)
        } else {
            None
        }
    }

    pub fn audio_file(&self, number: u32) -> Option<&str> {
        self.audio_files.get(&number).map(String::as_str)
    }

    pub fn note_count(&self) -> usize {
        self.player_a_notes.len() + self.player_b_notes.len()
    }

    /// Check the whole config for internal consistency.
    ///
    /// The first failing rule wins; callers reject the config wholesale and
    /// keep whatever was active before.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::EmptyName);
        }
        if self.total_cells == 0 {
            return Err(ConfigError::NoCells);
        }
        if !(self.bpm > 0.0) {
            return Err(ConfigError::NonPositiveBpm);
        }

        let mut seen_cells = FnvHashSet::default();
        for (player, cells) in [
            (Player::A, &self.player_a_cells),
            (Player::B, &self.player_b_cells),
        ] {
            for &position in cells.iter() {
                if position == 0 || position > self.total_cells {
                    return Err(ConfigError::CellOutOfRange {
                        position,
                        player,
                        total: self.total_cells,
                    });
                }
                if !seen_cells.insert(position) {
                    return Err(ConfigError::DuplicateCell(position));
                }
            }
        }

        let mut seen_notes = FnvHashSet::default();
        for &number in self.player_a_notes.iter().chain(self.player_b_notes.iter()) {
            if number == 0 || number > self.total_cells {
                return Err(ConfigError::NoteOutOfRange {
                    number,
                    total: self.total_cells,
                });
            }
            if !seen_notes.insert(number) {
                return Err(ConfigError::DuplicateNote(number));
            }
            if !self.audio_files.contains_key(&number) {
                return Err(ConfigError::MissingAudioFile(number));
            }
        }

        let mut parent_of: FnvHashMap<u32, u32> = FnvHashMap::default();
        for (&parent, children) in self.nested_items.iter() {
            if !seen_notes.contains(&parent) {
                return Err(ConfigError::UnknownNestedParent(parent));
            }
            for &child in children.iter() {
                if !seen_notes.contains(&child) {
                    return Err(ConfigError::UnknownNestedChild { parent, child });
                }
                if child == parent {
                    return Err(ConfigError::SelfNested(child));
                }
                if parent_of.insert(child, parent).is_some() {
                    return Err(ConfigError::ChildUnderManyParents(child));
                }
            }
        }

        // Each child has one parent, so a cycle is the only way a parent
        // chain can fail to terminate.
        for &start in parent_of.keys() {
            let mut cursor = start;
            let mut hops = 0usize;
            while let Some(&next) = parent_of.get(&cursor) {
                cursor = next;
                hops += 1;
                if hops > parent_of.len() {
                    return Err(ConfigError::NestingCycle(start));
                }
            }
        }

        Ok(())
    }
}
