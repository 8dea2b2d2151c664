use std::fmt;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use tracing::debug;

use crate::error::{Result, SaveError};
use crate::layout::has_end_marker;
use crate::reader::LittleEndianReader;

const MOD_ID_LEN: usize = 16;
const MOD_RECORD_PADDING: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Variant {
    /// Civilization V, magic `CIV5`.
    Civ5,
    /// Civilization: Beyond Earth, magic `CIVBE`.
    BeyondEarth,
}

impl Variant {
    pub const ALL: [Variant; 2] = [Variant::Civ5, Variant::BeyondEarth];

    pub fn magic(self) -> &'static [u8] {
        match self {
            Self::Civ5 => b"CIV5",
            Self::BeyondEarth => b"CIVBE",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Civ5 => "Civ5",
            Self::BeyondEarth => "BeyondEarth",
        }
    }

    /// Identify the variant from the leading magic bytes.
    pub fn detect(bytes: &[u8]) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|variant| bytes.starts_with(variant.magic()))
            .ok_or(SaveError::UnrecognizedFormat)
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opaque 16-byte identifier of an installed mod or DLC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModId(pub [u8; MOD_ID_LEN]);

impl ModId {
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }

    pub fn from_hex(hex: &str) -> Option<Self> {
        if hex.len() != MOD_ID_LEN * 2 || !hex.is_ascii() {
            return None;
        }
        let mut out = [0u8; MOD_ID_LEN];
        for (i, byte) in out.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16).ok()?;
        }
        Some(Self(out))
    }
}

impl fmt::Display for ModId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for ModId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ModId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let hex = String::deserialize(deserializer)?;
        Self::from_hex(&hex)
            .ok_or_else(|| de::Error::custom(format!("invalid mod id '{hex}'")))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModEntry {
    pub id: ModId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveHeader {
    pub variant: Variant,
    pub save_version: u32,
    pub game_version: String,
    pub build_label: String,
    pub turn: u32,
    /// Single byte after the turn number. Meaning unknown; kept verbatim.
    pub unknown_flag: u8,
    pub starting_civilization: String,
    pub handicap: String,
    pub initial_era: String,
    pub current_era: String,
    pub game_speed: String,
    pub world_size: String,
    pub map_script: String,
    pub mods: Vec<ModEntry>,
    /// Offset just past the decoded header fields; chunk scanning starts here.
    pub end_offset: usize,
}

impl SaveHeader {
    /// Decode the preamble. Fails before reading any field past the magic
    /// if the buffer does not end with the end-of-file marker.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let variant = Variant::detect(bytes)?;
        if !has_end_marker(bytes) {
            return Err(SaveError::TruncatedFile);
        }

        let mut r = LittleEndianReader::new(bytes);
        r.skip(variant.magic().len())?;

        let save_version = r.read_u32()?;
        let game_version = r.read_string()?;
        let build_label = r.read_string()?;
        let turn = r.read_u32()?;
        let unknown_flag = r.read_u8()?;
        let starting_civilization = r.read_string()?;
        let handicap = r.read_string()?;
        let initial_era = r.read_string()?;
        let current_era = r.read_string()?;
        let game_speed = r.read_string()?;
        let world_size = r.read_string()?;
        let map_script = r.read_string()?;

        let mod_count = r.read_u32()? as usize;
        let mut mods = Vec::with_capacity(mod_count.min(64));
        for _ in 0..mod_count {
            let id = ModId(r.read_array::<MOD_ID_LEN>()?);
            r.skip(MOD_RECORD_PADDING)?;
            let name = r.read_string()?;
            mods.push(ModEntry { id, name });
        }

        let end_offset = r.position();
        debug!(
            %variant,
            save_version,
            turn,
            mods = mods.len(),
            end_offset,
            "parsed save header"
        );

        Ok(Self {
            variant,
            save_version,
            game_version,
            build_label,
            turn,
            unknown_flag,
            starting_civilization,
            handicap,
            initial_era,
            current_era,
            game_speed,
            world_size,
            map_script,
            mods,
            end_offset,
        })
    }
}
