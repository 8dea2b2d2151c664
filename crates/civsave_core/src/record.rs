use std::fmt;

use serde::{Deserialize, Serialize};

use crate::header::{SaveHeader, Variant};

/// Leader identifier used for barbarian and city-state filler slots.
pub const BARBARIAN_LEADER: &str = "LEADER_BARBARIAN";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerStatus {
    Alive,
    Dead,
    Human,
    Absent,
    Unknown(u32),
}

impl PlayerStatus {
    pub const ALIVE_RAW: u32 = 1;
    pub const DEAD_RAW: u32 = 2;
    pub const HUMAN_RAW: u32 = 3;
    pub const ABSENT_RAW: u32 = 4;

    pub fn from_raw(raw: u32) -> Self {
        match raw {
            Self::ALIVE_RAW => Self::Alive,
            Self::DEAD_RAW => Self::Dead,
            Self::HUMAN_RAW => Self::Human,
            Self::ABSENT_RAW => Self::Absent,
            other => Self::Unknown(other),
        }
    }

    pub fn raw(&self) -> u32 {
        match *self {
            Self::Alive => Self::ALIVE_RAW,
            Self::Dead => Self::DEAD_RAW,
            Self::Human => Self::HUMAN_RAW,
            Self::Absent => Self::ABSENT_RAW,
            Self::Unknown(other) => other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match *self {
            Self::Alive => "Alive",
            Self::Dead => "Dead",
            Self::Human => "Human",
            Self::Absent => "Absent",
            Self::Unknown(_) => "Unknown",
        }
    }
}

impl fmt::Display for PlayerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Unknown(v) => write!(f, "Unknown ({})", v),
            _ => f.write_str(self.as_str()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSlot {
    /// Position in the file's slot tables, before absent slots are dropped.
    /// Mutations are addressed by this index.
    pub slot_index: usize,
    pub display_name: String,
    pub status: Option<PlayerStatus>,
    pub civilization: Option<String>,
    pub leader: Option<String>,
    pub password: Option<String>,
    pub color: Option<String>,
}

impl PlayerSlot {
    pub fn new(slot_index: usize, display_name: String) -> Self {
        Self {
            slot_index,
            display_name,
            status: None,
            civilization: None,
            leader: None,
            password: None,
            color: None,
        }
    }

    /// Slots without a civilization, or marked absent, are placeholders.
    pub fn is_real(&self) -> bool {
        self.civilization.is_some() && self.status != Some(PlayerStatus::Absent)
    }

    pub fn is_barbarian(&self) -> bool {
        self.leader.as_deref() == Some(BARBARIAN_LEADER)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveRecord {
    pub header: SaveHeader,
    /// Delimiter offset of the chunk accepted at each ordinal.
    pub chunk_start_offsets: Vec<usize>,
    /// Real players only, in slot order.
    pub players: Vec<PlayerSlot>,
    /// Number of slots in the display-name table, including dropped ones.
    pub slot_count: usize,
    pub barbarian_slot_count: usize,
    /// Pre-filter slot index of the player whose turn it is.
    pub active_player_index: Option<u32>,
    /// Colour-table candidates skipped because their first entry was blank.
    pub rejected_color_candidates: usize,
}

impl SaveRecord {
    pub fn variant(&self) -> Variant {
        self.header.variant
    }

    pub fn header_end_offset(&self) -> usize {
        self.header.end_offset
    }

    pub fn chunk_count(&self) -> usize {
        self.chunk_start_offsets.len()
    }

    pub fn player_by_slot(&self, slot_index: usize) -> Option<&PlayerSlot> {
        self.players.iter().find(|p| p.slot_index == slot_index)
    }

    pub fn active_player(&self) -> Option<&PlayerSlot> {
        self.active_player_index
            .and_then(|index| self.player_by_slot(index as usize))
    }
}
