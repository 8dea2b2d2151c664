//! Synthetic save files for tests.
//!
//! Real saves are proprietary, so tests build minimal well-formed buffers
//! with the same header and chunk layout. Values are chosen so the chunk
//! delimiter never appears by accident: no 64-valued integers, no '@'.

#![allow(dead_code)]

use civsave_core::Variant;

pub const DELIMITER: [u8; 4] = [0x40, 0x00, 0x00, 0x00];
pub const END_MARKER: [u8; 4] = [0x00, 0x00, 0xFF, 0xFF];

pub const GAME_VERSION: &str = "1.0.3.279";
pub const BUILD_LABEL: &str = "(403694) Final Release";
pub const MAP_SCRIPT: &str = "Assets\\Maps\\Continents.lua";
pub const MOD_NAME: &str = "Expansion - Gods and Kings";
pub const MOD_ID: [u8; 16] = [
    0xa0, 0xa1, 0xa2, 0xa3, 0xa4, 0xa5, 0xa6, 0xa7, 0xa8, 0xa9, 0xaa, 0xab, 0xac, 0xad, 0xae, 0xaf,
];
pub const MOD_ID_HEX: &str = "a0a1a2a3a4a5a6a7a8a9aaabacadaeaf";
pub const TURN: u32 = 112;
pub const SAVE_VERSION: u32 = 8;

#[derive(Debug, Clone)]
pub struct SlotSpec {
    pub name: String,
    pub status: u32,
    pub civilization: String,
    pub leader: String,
    pub password: String,
    pub color: String,
}

pub fn slot(
    name: &str,
    status: u32,
    civilization: &str,
    leader: &str,
    password: &str,
    color: &str,
) -> SlotSpec {
    SlotSpec {
        name: name.to_string(),
        status,
        civilization: civilization.to_string(),
        leader: leader.to_string(),
        password: password.to_string(),
        color: color.to_string(),
    }
}

/// Six slots: two humans, one AI, one absent, two barbarian fillers with no
/// civilization. Slots 0, 1 and 2 survive filtering.
pub fn default_slots() -> Vec<SlotSpec> {
    vec![
        slot(
            "Alice",
            3,
            "CIVILIZATION_ROME",
            "LEADER_AUGUSTUS",
            "hunter2",
            "PLAYERCOLOR_ROME",
        ),
        slot(
            "Bob",
            3,
            "CIVILIZATION_ENGLAND",
            "LEADER_ELIZABETH",
            "",
            "PLAYERCOLOR_ENGLAND",
        ),
        slot(
            "",
            1,
            "CIVILIZATION_INDIA",
            "LEADER_GANDHI",
            "",
            "PLAYERCOLOR_INDIA",
        ),
        slot(
            "",
            4,
            "CIVILIZATION_SIAM",
            "LEADER_RAMKHAMHAENG",
            "",
            "PLAYERCOLOR_SIAM",
        ),
        slot("", 2, "", "LEADER_BARBARIAN", "", "PLAYERCOLOR_BARBARIAN"),
        slot("", 2, "", "LEADER_BARBARIAN", "", "PLAYERCOLOR_BARBARIAN"),
    ]
}

#[derive(Debug, Clone)]
pub struct SaveBuilder {
    pub variant: Variant,
    pub slots: Vec<SlotSpec>,
    pub active_player: u32,
    /// Insert a chunk whose first colour entry is blank just before the real
    /// colour table.
    pub color_drift: bool,
    /// Values written to the status mirror instead of each slot's status.
    pub mirror_statuses: Option<Vec<u32>>,
    /// Emit only this many logical chunks.
    pub chunk_limit: Option<usize>,
    /// Opaque bytes between the header and the first delimiter.
    pub header_gap: Vec<u8>,
}

impl SaveBuilder {
    pub fn new(variant: Variant) -> Self {
        Self {
            variant,
            slots: default_slots(),
            active_player: 1,
            color_drift: false,
            mirror_statuses: None,
            chunk_limit: None,
            header_gap: vec![0x05, 0x06, 0x07],
        }
    }

    pub fn drifted(mut self, drift: bool) -> Self {
        self.color_drift = drift;
        self
    }

    pub fn with_slots(mut self, slots: Vec<SlotSpec>) -> Self {
        self.slots = slots;
        self
    }

    pub fn with_active_player(mut self, active: u32) -> Self {
        self.active_player = active;
        self
    }

    pub fn with_mirror_statuses(mut self, statuses: Vec<u32>) -> Self {
        self.mirror_statuses = Some(statuses);
        self
    }

    pub fn with_chunk_limit(mut self, limit: usize) -> Self {
        self.chunk_limit = Some(limit);
        self
    }

    pub fn color_ordinal(&self) -> usize {
        match self.variant {
            Variant::Civ5 => 23,
            Variant::BeyondEarth => 26,
        }
    }

    pub fn mirror_ordinal(&self) -> usize {
        self.color_ordinal() + 3
    }

    pub fn build(&self) -> Vec<u8> {
        let mut out = self.header();
        out.extend_from_slice(&self.header_gap);

        let total = self.chunk_limit.unwrap_or(self.mirror_ordinal() + 3);
        for ordinal in 0..total {
            if self.color_drift && ordinal == self.color_ordinal() {
                out.extend_from_slice(&DELIMITER);
                let mut decoy = Vec::new();
                push_str(&mut decoy, "");
                push_str(&mut decoy, "PLAYERCOLOR_DECOY");
                out.extend_from_slice(&decoy);
            }
            out.extend_from_slice(&DELIMITER);
            out.extend_from_slice(&self.payload(ordinal));
        }

        out.extend_from_slice(&DELIMITER);
        out.extend_from_slice(&[0x11, 0x22]);
        out.extend_from_slice(&END_MARKER);
        out
    }

    /// Header bytes up to and including the mod list.
    pub fn header(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(match self.variant {
            Variant::Civ5 => b"CIV5".as_slice(),
            Variant::BeyondEarth => b"CIVBE".as_slice(),
        });
        push_u32(&mut out, SAVE_VERSION);
        push_str(&mut out, GAME_VERSION);
        push_str(&mut out, BUILD_LABEL);
        push_u32(&mut out, TURN);
        out.push(0x01);
        for field in [
            "CIVILIZATION_ROME",
            "HANDICAP_PRINCE",
            "ERA_ANCIENT",
            "ERA_MEDIEVAL",
            "GAMESPEED_STANDARD",
            "WORLDSIZE_SMALL",
        ] {
            push_str(&mut out, field);
        }
        push_str(&mut out, MAP_SCRIPT);
        push_u32(&mut out, 1);
        out.extend_from_slice(&MOD_ID);
        out.extend_from_slice(&[0, 0, 0, 0]);
        push_str(&mut out, MOD_NAME);
        out
    }

    fn payload(&self, ordinal: usize) -> Vec<u8> {
        let mut out = Vec::new();
        match ordinal {
            1 => self.slots.iter().for_each(|s| push_str(&mut out, &s.name)),
            2 => self.slots.iter().for_each(|s| push_u32(&mut out, s.status)),
            6 => self
                .slots
                .iter()
                .for_each(|s| push_str(&mut out, &s.civilization)),
            7 => {
                self.slots.iter().for_each(|s| push_str(&mut out, &s.leader));
                push_u32(&mut out, self.active_player);
                out.extend_from_slice(&[0; 12]);
            }
            11 => self
                .slots
                .iter()
                .for_each(|s| push_str(&mut out, &s.password)),
            o if o == self.color_ordinal() => {
                self.slots.iter().for_each(|s| push_str(&mut out, &s.color))
            }
            o if o == self.mirror_ordinal() => match &self.mirror_statuses {
                Some(statuses) => statuses.iter().for_each(|v| push_u32(&mut out, *v)),
                None => self.slots.iter().for_each(|s| push_u32(&mut out, s.status)),
            },
            other => out.extend_from_slice(&[other as u8, 0xAA, 0xBB]),
        }
        out
    }
}

pub fn push_u32(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_le_bytes());
}

pub fn push_str(out: &mut Vec<u8>, text: &str) {
    push_u32(out, text.len() as u32);
    out.extend_from_slice(text.as_bytes());
}

/// Number of bytes `text` occupies once length-prefixed.
pub fn encoded_len(text: &str) -> usize {
    4 + text.len()
}
