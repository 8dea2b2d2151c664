use std::fmt::{self, Write as _};

use civsave_core::core_api::{CapabilityIssue, PlayerSummary, Session};
use civsave_core::layout::next_chunk;
use civsave_core::{ChunkRole, ModEntry, Variant};
use serde_json::{Map as JsonMap, Value as JsonValue};

const COL_SLOT: usize = 5;
const COL_NAME: usize = 18;
const COL_CIV: usize = 24;
const COL_LEADER: usize = 22;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonStyle {
    #[default]
    CanonicalV1,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FieldSelection {
    pub variant: bool,
    pub save_version: bool,
    pub game_version: bool,
    pub build_label: bool,
    pub turn: bool,
    pub starting_civilization: bool,
    pub handicap: bool,
    pub initial_era: bool,
    pub current_era: bool,
    pub game_speed: bool,
    pub world_size: bool,
    pub map_script: bool,
    pub mods: bool,
    pub players: bool,
    pub active_player: bool,
    pub barbarians: bool,
}

impl FieldSelection {
    pub fn is_any_selected(&self) -> bool {
        self.variant
            || self.save_version
            || self.game_version
            || self.build_label
            || self.turn
            || self.starting_civilization
            || self.handicap
            || self.initial_era
            || self.current_era
            || self.game_speed
            || self.world_size
            || self.map_script
            || self.mods
            || self.players
            || self.active_player
            || self.barbarians
    }
}

/// One row of the chunk layout report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkLayoutEntry {
    pub ordinal: usize,
    pub delimiter_offset: usize,
    pub payload_len: usize,
    pub role: Option<ChunkRole>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutReport {
    pub variant: Variant,
    pub header_end_offset: usize,
    pub file_len: usize,
    pub rejected_color_candidates: usize,
    pub chunks: Vec<ChunkLayoutEntry>,
}

pub fn render_json_full(session: &Session, style: JsonStyle) -> JsonValue {
    match style {
        JsonStyle::CanonicalV1 => JsonValue::Object(default_json(session)),
    }
}

pub fn render_json_selected(
    session: &Session,
    fields: &FieldSelection,
    style: JsonStyle,
) -> JsonValue {
    match style {
        JsonStyle::CanonicalV1 => JsonValue::Object(selected_json(fields, session)),
    }
}

/// `key=value` pairs for the selected fields, in canonical order. List
/// fields produce one pair per entry.
pub fn selected_pairs(session: &Session, fields: &FieldSelection) -> Vec<(&'static str, String)> {
    let snapshot = session.snapshot();
    let mut out = Vec::new();

    if fields.variant {
        out.push(("variant", snapshot.variant.to_string()));
    }
    if fields.save_version {
        out.push(("save_version", snapshot.save_version.to_string()));
    }
    if fields.game_version {
        out.push(("game_version", snapshot.game_version.clone()));
    }
    if fields.build_label {
        out.push(("build_label", snapshot.build_label.clone()));
    }
    if fields.turn {
        out.push(("turn", snapshot.turn.to_string()));
    }
    if fields.starting_civilization {
        out.push(("starting_civilization", snapshot.starting_civilization.clone()));
    }
    if fields.handicap {
        out.push(("handicap", snapshot.handicap.clone()));
    }
    if fields.initial_era {
        out.push(("initial_era", snapshot.initial_era.clone()));
    }
    if fields.current_era {
        out.push(("current_era", snapshot.current_era.clone()));
    }
    if fields.game_speed {
        out.push(("game_speed", snapshot.game_speed.clone()));
    }
    if fields.world_size {
        out.push(("world_size", snapshot.world_size.clone()));
    }
    if fields.map_script {
        out.push(("map_script", snapshot.map_script.clone()));
    }
    if fields.mods {
        for m in &snapshot.mods {
            out.push(("mod", format!("{} {}", m.id, m.name)));
        }
    }
    if fields.players {
        for p in &snapshot.players {
            out.push(("player", format_player_pair(p)));
        }
    }
    if fields.active_player {
        out.push((
            "active_player",
            snapshot
                .active_player_index
                .map(|v| v.to_string())
                .unwrap_or_else(|| "unknown".to_string()),
        ));
    }
    if fields.barbarians {
        out.push(("barbarians", snapshot.barbarian_slot_count.to_string()));
    }

    out
}

pub fn render_text_summary(session: &Session) -> Result<String, fmt::Error> {
    let mut out = String::new();
    write_summary(&mut out, session)?;
    Ok(out)
}

pub fn layout_report(session: &Session) -> LayoutReport {
    let record = session.record();
    let bytes = session.bytes();
    let layout = record.variant().layout();

    let chunks = record
        .chunk_start_offsets
        .iter()
        .enumerate()
        .map(|(ordinal, &offset)| ChunkLayoutEntry {
            ordinal,
            delimiter_offset: offset,
            payload_len: next_chunk(bytes, offset).map_or(0, |c| c.payload.len()),
            role: layout.role_at(ordinal),
        })
        .collect();

    LayoutReport {
        variant: record.variant(),
        header_end_offset: record.header_end_offset(),
        file_len: bytes.len(),
        rejected_color_candidates: record.rejected_color_candidates,
        chunks,
    }
}

pub fn render_layout_json(report: &LayoutReport) -> JsonValue {
    let mut out = JsonMap::new();
    out.insert(
        "variant".to_string(),
        JsonValue::String(report.variant.to_string()),
    );
    out.insert(
        "header_end_offset".to_string(),
        JsonValue::from(report.header_end_offset),
    );
    out.insert("file_len".to_string(), JsonValue::from(report.file_len));
    out.insert(
        "chunk_count".to_string(),
        JsonValue::from(report.chunks.len()),
    );
    out.insert(
        "rejected_color_candidates".to_string(),
        JsonValue::from(report.rejected_color_candidates),
    );
    out.insert(
        "chunks".to_string(),
        JsonValue::Array(
            report
                .chunks
                .iter()
                .map(|c| {
                    let mut entry = JsonMap::new();
                    entry.insert("ordinal".to_string(), JsonValue::from(c.ordinal));
                    entry.insert(
                        "delimiter_offset".to_string(),
                        JsonValue::from(c.delimiter_offset),
                    );
                    entry.insert("payload_len".to_string(), JsonValue::from(c.payload_len));
                    entry.insert(
                        "role".to_string(),
                        c.role
                            .map_or(JsonValue::Null, |r| JsonValue::String(r.as_str().to_string())),
                    );
                    JsonValue::Object(entry)
                })
                .collect(),
        ),
    );
    JsonValue::Object(out)
}

pub fn render_layout_text(report: &LayoutReport) -> String {
    let mut out = format!(
        "{} save, {} bytes, header ends at {:#x}\n",
        variant_title(report.variant),
        report.file_len,
        report.header_end_offset
    );
    if report.rejected_color_candidates > 0 {
        out.push_str(&format!(
            "{} colour chunk candidate(s) rejected\n",
            report.rejected_color_candidates
        ));
    }
    out.push_str("ordinal  offset      length  role\n");
    for c in &report.chunks {
        let role = c.role.map_or("-", ChunkRole::as_str);
        out.push_str(&format!(
            "{:>7}  {:<10}  {:>6}  {}\n",
            c.ordinal,
            format!("{:#08x}", c.delimiter_offset),
            c.payload_len,
            role
        ));
    }
    out
}

fn default_json(session: &Session) -> JsonMap<String, JsonValue> {
    let snapshot = session.snapshot();
    let mut out = JsonMap::new();

    out.insert(
        "variant".to_string(),
        JsonValue::String(snapshot.variant.to_string()),
    );
    out.insert(
        "save_version".to_string(),
        JsonValue::from(snapshot.save_version),
    );
    out.insert(
        "game_version".to_string(),
        JsonValue::String(snapshot.game_version.clone()),
    );
    out.insert(
        "build_label".to_string(),
        JsonValue::String(snapshot.build_label.clone()),
    );
    out.insert("turn".to_string(), JsonValue::from(snapshot.turn));
    out.insert(
        "starting_civilization".to_string(),
        JsonValue::String(snapshot.starting_civilization.clone()),
    );
    out.insert(
        "handicap".to_string(),
        JsonValue::String(snapshot.handicap.clone()),
    );
    out.insert(
        "initial_era".to_string(),
        JsonValue::String(snapshot.initial_era.clone()),
    );
    out.insert(
        "current_era".to_string(),
        JsonValue::String(snapshot.current_era.clone()),
    );
    out.insert(
        "game_speed".to_string(),
        JsonValue::String(snapshot.game_speed.clone()),
    );
    out.insert(
        "world_size".to_string(),
        JsonValue::String(snapshot.world_size.clone()),
    );
    out.insert(
        "map_script".to_string(),
        JsonValue::String(snapshot.map_script.clone()),
    );
    out.insert("mods".to_string(), mods_to_json(&snapshot.mods));
    out.insert("slot_count".to_string(), JsonValue::from(snapshot.slot_count));
    out.insert(
        "barbarian_slot_count".to_string(),
        JsonValue::from(snapshot.barbarian_slot_count),
    );
    out.insert(
        "active_player".to_string(),
        optional_u32(snapshot.active_player_index),
    );
    out.insert("players".to_string(), players_to_json(&snapshot.players));
    out.insert(
        "issues".to_string(),
        issues_to_json(&session.capabilities().issues),
    );

    out
}

fn selected_json(fields: &FieldSelection, session: &Session) -> JsonMap<String, JsonValue> {
    let snapshot = session.snapshot();
    let mut out = JsonMap::new();

    if fields.variant {
        out.insert(
            "variant".to_string(),
            JsonValue::String(snapshot.variant.to_string()),
        );
    }
    if fields.save_version {
        out.insert(
            "save_version".to_string(),
            JsonValue::from(snapshot.save_version),
        );
    }
    if fields.game_version {
        out.insert(
            "game_version".to_string(),
            JsonValue::String(snapshot.game_version.clone()),
        );
    }
    if fields.build_label {
        out.insert(
            "build_label".to_string(),
            JsonValue::String(snapshot.build_label.clone()),
        );
    }
    if fields.turn {
        out.insert("turn".to_string(), JsonValue::from(snapshot.turn));
    }
    if fields.starting_civilization {
        out.insert(
            "starting_civilization".to_string(),
            JsonValue::String(snapshot.starting_civilization.clone()),
        );
    }
    if fields.handicap {
        out.insert(
            "handicap".to_string(),
            JsonValue::String(snapshot.handicap.clone()),
        );
    }
    if fields.initial_era {
        out.insert(
            "initial_era".to_string(),
            JsonValue::String(snapshot.initial_era.clone()),
        );
    }
    if fields.current_era {
        out.insert(
            "current_era".to_string(),
            JsonValue::String(snapshot.current_era.clone()),
        );
    }
    if fields.game_speed {
        out.insert(
            "game_speed".to_string(),
            JsonValue::String(snapshot.game_speed.clone()),
        );
    }
    if fields.world_size {
        out.insert(
            "world_size".to_string(),
            JsonValue::String(snapshot.world_size.clone()),
        );
    }
    if fields.map_script {
        out.insert(
            "map_script".to_string(),
            JsonValue::String(snapshot.map_script.clone()),
        );
    }
    if fields.mods {
        out.insert("mods".to_string(), mods_to_json(&snapshot.mods));
    }
    if fields.players {
        out.insert("players".to_string(), players_to_json(&snapshot.players));
    }
    if fields.active_player {
        out.insert(
            "active_player".to_string(),
            optional_u32(snapshot.active_player_index),
        );
    }
    if fields.barbarians {
        out.insert(
            "barbarian_slot_count".to_string(),
            JsonValue::from(snapshot.barbarian_slot_count),
        );
    }

    out
}

fn mods_to_json(mods: &[ModEntry]) -> JsonValue {
    JsonValue::Array(
        mods.iter()
            .map(|m| {
                let mut entry = JsonMap::new();
                entry.insert("id".to_string(), JsonValue::String(m.id.to_hex()));
                entry.insert("name".to_string(), JsonValue::String(m.name.clone()));
                JsonValue::Object(entry)
            })
            .collect(),
    )
}

fn players_to_json(players: &[PlayerSummary]) -> JsonValue {
    JsonValue::Array(players.iter().map(player_to_json).collect())
}

fn player_to_json(p: &PlayerSummary) -> JsonValue {
    let mut out = JsonMap::new();
    out.insert("slot".to_string(), JsonValue::from(p.slot_index));
    out.insert(
        "display_name".to_string(),
        JsonValue::String(p.display_name.clone()),
    );
    out.insert(
        "status".to_string(),
        p.status
            .map_or(JsonValue::Null, |s| JsonValue::String(s.as_str().to_string())),
    );
    out.insert(
        "status_code".to_string(),
        optional_u32(p.status.map(|s| s.raw())),
    );
    out.insert("civilization".to_string(), optional_str(&p.civilization));
    out.insert("leader".to_string(), optional_str(&p.leader));
    out.insert("password".to_string(), optional_str(&p.password));
    out.insert("color".to_string(), optional_str(&p.color));
    out.insert("is_active".to_string(), JsonValue::Bool(p.is_active));
    JsonValue::Object(out)
}

fn issues_to_json(issues: &[CapabilityIssue]) -> JsonValue {
    JsonValue::Array(
        issues
            .iter()
            .map(|issue| JsonValue::String(format!("{issue:?}")))
            .collect(),
    )
}

fn optional_u32(value: Option<u32>) -> JsonValue {
    value.map_or(JsonValue::Null, JsonValue::from)
}

fn optional_str(value: &Option<String>) -> JsonValue {
    value
        .as_ref()
        .map_or(JsonValue::Null, |s| JsonValue::String(s.clone()))
}

fn write_summary(out: &mut String, session: &Session) -> fmt::Result {
    let s = session.snapshot();

    writeln!(
        out,
        "{} save (format version {})",
        variant_title(s.variant),
        s.save_version
    )?;
    writeln!(out, "Game version: {} {}", s.game_version, s.build_label)?;
    writeln!(out, "Turn: {}", s.turn)?;
    writeln!(
        out,
        "Map: {}  Size: {}  Speed: {}",
        s.map_script, s.world_size, s.game_speed
    )?;
    writeln!(
        out,
        "Difficulty: {}  Era: {} -> {}",
        s.handicap, s.initial_era, s.current_era
    )?;
    writeln!(out, "Starting civilization: {}", s.starting_civilization)?;

    if !s.mods.is_empty() {
        writeln!(out)?;
        writeln!(out, "Mods:")?;
        for m in &s.mods {
            writeln!(out, "  {}  {}", m.id, m.name)?;
        }
    }

    writeln!(out)?;
    writeln!(
        out,
        "Players ({} listed of {} slots, {} barbarian):",
        s.players.len(),
        s.slot_count,
        s.barbarian_slot_count
    )?;
    writeln!(
        out,
        "  {:<sw$} {:<nw$} {:<cw$} {:<lw$} Status",
        "Slot",
        "Name",
        "Civilization",
        "Leader",
        sw = COL_SLOT,
        nw = COL_NAME,
        cw = COL_CIV,
        lw = COL_LEADER,
    )?;
    for p in &s.players {
        let marker = if p.is_active { '*' } else { ' ' };
        let name = if p.display_name.is_empty() {
            "(AI)"
        } else {
            p.display_name.as_str()
        };
        let status = p.status.map_or_else(|| "-".to_string(), |st| st.to_string());
        let line = format!(
            "{marker} {:<sw$} {:<nw$} {:<cw$} {:<lw$} {}",
            p.slot_index,
            fit_column(name, COL_NAME),
            fit_column(p.civilization.as_deref().unwrap_or("-"), COL_CIV),
            fit_column(p.leader.as_deref().unwrap_or("-"), COL_LEADER),
            status,
            sw = COL_SLOT,
            nw = COL_NAME,
            cw = COL_CIV,
            lw = COL_LEADER,
        );
        writeln!(out, "{}", line.trim_end())?;
    }

    for issue in &session.capabilities().issues {
        let note = match issue {
            CapabilityIssue::LowConfidenceLayout => {
                "note: colour table was found past its usual position; later chunks are shifted"
            }
            CapabilityIssue::ActivePlayerNotListed => {
                "note: the active player slot is not among the listed players"
            }
        };
        writeln!(out)?;
        writeln!(out, "{note}")?;
    }

    Ok(())
}

fn format_player_pair(p: &PlayerSummary) -> String {
    format!(
        "{}:{}:{}:{}:{}",
        p.slot_index,
        p.display_name,
        p.civilization.as_deref().unwrap_or(""),
        p.leader.as_deref().unwrap_or(""),
        p.status.map_or("", |s| s.as_str())
    )
}

fn variant_title(variant: Variant) -> &'static str {
    match variant {
        Variant::Civ5 => "Civilization V",
        Variant::BeyondEarth => "Civilization: Beyond Earth",
    }
}

fn fit_column(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    if width <= 3 {
        return value.chars().take(width).collect();
    }

    let mut out = String::with_capacity(width);
    for ch in value.chars().take(width - 3) {
        out.push(ch);
    }
    out.push_str("...");
    out
}
