use serde::{Deserialize, Serialize};

use crate::header::{ModEntry, Variant};
use crate::record::{PlayerSlot, PlayerStatus, SaveRecord};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlayerSummary {
    pub slot_index: usize,
    pub display_name: String,
    pub status: Option<PlayerStatus>,
    pub civilization: Option<String>,
    pub leader: Option<String>,
    pub password: Option<String>,
    pub color: Option<String>,
    pub is_active: bool,
}

impl PlayerSummary {
    fn from_slot(slot: &PlayerSlot, active_player_index: Option<u32>) -> Self {
        Self {
            slot_index: slot.slot_index,
            display_name: slot.display_name.clone(),
            status: slot.status,
            civilization: slot.civilization.clone(),
            leader: slot.leader.clone(),
            password: slot.password.clone(),
            color: slot.color.clone(),
            is_active: active_player_index.is_some_and(|i| i as usize == slot.slot_index),
        }
    }
}

/// Flat view of a parsed save, stable for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub variant: Variant,
    pub save_version: u32,
    pub game_version: String,
    pub build_label: String,
    pub turn: u32,
    pub starting_civilization: String,
    pub handicap: String,
    pub initial_era: String,
    pub current_era: String,
    pub game_speed: String,
    pub world_size: String,
    pub map_script: String,
    pub mods: Vec<ModEntry>,
    pub slot_count: usize,
    pub barbarian_slot_count: usize,
    pub active_player_index: Option<u32>,
    pub players: Vec<PlayerSummary>,
}

impl Snapshot {
    pub fn from_record(record: &SaveRecord) -> Self {
        let h = &record.header;
        Self {
            variant: h.variant,
            save_version: h.save_version,
            game_version: h.game_version.clone(),
            build_label: h.build_label.clone(),
            turn: h.turn,
            starting_civilization: h.starting_civilization.clone(),
            handicap: h.handicap.clone(),
            initial_era: h.initial_era.clone(),
            current_era: h.current_era.clone(),
            game_speed: h.game_speed.clone(),
            world_size: h.world_size.clone(),
            map_script: h.map_script.clone(),
            mods: h.mods.clone(),
            slot_count: record.slot_count,
            barbarian_slot_count: record.barbarian_slot_count,
            active_player_index: record.active_player_index,
            players: record
                .players
                .iter()
                .map(|slot| PlayerSummary::from_slot(slot, record.active_player_index))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CapabilityIssue {
    /// One or more colour-table candidates were skipped, so chunks past that
    /// point were matched by a shifted ordinal.
    LowConfidenceLayout,
    /// The active-player index points at a slot that was filtered out.
    ActivePlayerNotListed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Capabilities {
    pub can_query: bool,
    pub can_apply_edits: bool,
    pub issues: Vec<CapabilityIssue>,
}

impl Capabilities {
    pub fn editable(issues: Vec<CapabilityIssue>) -> Self {
        Self {
            can_query: true,
            can_apply_edits: true,
            issues,
        }
    }

    pub fn for_record(record: &SaveRecord) -> Self {
        let mut issues = Vec::new();
        if record.rejected_color_candidates > 0 {
            issues.push(CapabilityIssue::LowConfidenceLayout);
        }
        if record.active_player_index.is_some() && record.active_player().is_none() {
            issues.push(CapabilityIssue::ActivePlayerNotListed);
        }
        Self::editable(issues)
    }
}
