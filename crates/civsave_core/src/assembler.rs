use tracing::{debug, warn};

use crate::chunk_map::{ACTIVE_PLAYER_BACK_OFFSET, ChunkRole, Classification};
use crate::error::{Result, SaveError};
use crate::header::SaveHeader;
use crate::layout::{Chunk, Chunks};
use crate::reader::LittleEndianReader;
use crate::record::{BARBARIAN_LEADER, PlayerSlot, PlayerStatus, SaveRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Fail when the two copies of the status table disagree. When off, the
    /// second copy is read and discarded.
    pub validate_duplicate_status: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            validate_duplicate_status: true,
        }
    }
}

impl ParseOptions {
    pub fn unvalidated() -> Self {
        Self {
            validate_duplicate_status: false,
        }
    }
}

/// Outcome of interpreting one chunk at its tentative ordinal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verdict {
    Accepted,
    /// The chunk does not hold the table its ordinal suggests; the next
    /// chunk is tried at the same ordinal.
    Rejected,
}

pub fn parse(bytes: &[u8]) -> Result<SaveRecord> {
    parse_with_options(bytes, ParseOptions::default())
}

pub fn parse_with_options(bytes: &[u8], options: ParseOptions) -> Result<SaveRecord> {
    let header = SaveHeader::parse(bytes)?;
    let layout = header.variant.layout();

    let mut assembly = Assembly::new(options);
    let mut ordinal = 0usize;

    for chunk in Chunks::new(bytes, header.end_offset) {
        assembly.record_chunk_start(ordinal, chunk.delimiter_offset);

        let verdict = match layout.classify(ordinal) {
            Classification::Unclassified => Verdict::Accepted,
            Classification::Confirmed(role) | Classification::Tentative(role) => {
                assembly.apply(role, bytes, &chunk)?
            }
        };

        match verdict {
            Verdict::Accepted => ordinal += 1,
            Verdict::Rejected => {
                warn!(
                    ordinal,
                    delimiter_offset = chunk.delimiter_offset,
                    "chunk rejected as colour table, retrying next chunk at same ordinal"
                );
                assembly.rejected_color_candidates += 1;
            }
        }
    }

    let record = assembly.finish(header);
    debug!(
        variant = %record.header.variant,
        chunks = record.chunk_count(),
        slots = record.slot_count,
        players = record.players.len(),
        "assembled save record"
    );
    Ok(record)
}

struct Assembly {
    options: ParseOptions,
    slots: Vec<PlayerSlot>,
    chunk_start_offsets: Vec<usize>,
    barbarian_slot_count: usize,
    active_player_index: Option<u32>,
    rejected_color_candidates: usize,
}

impl Assembly {
    fn new(options: ParseOptions) -> Self {
        Self {
            options,
            slots: Vec::new(),
            chunk_start_offsets: Vec::new(),
            barbarian_slot_count: 0,
            active_player_index: None,
            rejected_color_candidates: 0,
        }
    }

    fn record_chunk_start(&mut self, ordinal: usize, offset: usize) {
        match self.chunk_start_offsets.get_mut(ordinal) {
            Some(existing) => *existing = offset,
            None => self.chunk_start_offsets.push(offset),
        }
    }

    fn apply(&mut self, role: ChunkRole, bytes: &[u8], chunk: &Chunk) -> Result<Verdict> {
        let payload = chunk.payload(bytes);
        let mut r = LittleEndianReader::with_base(payload, chunk.payload.start);

        match role {
            ChunkRole::DisplayNames => {
                while !r.is_exhausted() {
                    let name = r.read_string()?;
                    let slot_index = self.slots.len();
                    self.slots.push(PlayerSlot::new(slot_index, name));
                }
            }
            ChunkRole::Status => self.apply_status(&mut r)?,
            ChunkRole::CivilizationNames => {
                for slot in &mut self.slots {
                    if r.is_exhausted() {
                        break;
                    }
                    let civilization = r.read_string()?;
                    if !civilization.trim().is_empty() {
                        slot.civilization = Some(civilization);
                    }
                }
            }
            ChunkRole::Leaders => {
                self.barbarian_slot_count = 0;
                for slot in &mut self.slots {
                    if r.is_exhausted() {
                        break;
                    }
                    let leader = r.read_string()?;
                    if leader == BARBARIAN_LEADER {
                        self.barbarian_slot_count += 1;
                    }
                    slot.leader = Some(leader);
                }

                // Not a decoded field: the index lives at a fixed distance
                // from the end of the chunk.
                let back = payload.len().checked_sub(ACTIVE_PLAYER_BACK_OFFSET).ok_or(
                    SaveError::UnexpectedEof {
                        offset: chunk.payload.start,
                        need: ACTIVE_PLAYER_BACK_OFFSET,
                        have: payload.len(),
                    },
                )?;
                self.active_player_index = Some(r.peek_u32_at(back)?);
            }
            ChunkRole::Passwords => {
                for slot in &mut self.slots {
                    if r.is_exhausted() {
                        break;
                    }
                    slot.password = Some(r.read_string()?);
                }
            }
            ChunkRole::Colors => {
                for (i, slot) in self.slots.iter_mut().enumerate() {
                    if r.is_exhausted() {
                        break;
                    }
                    let color = r.read_string()?;
                    if i == 0 && color.is_empty() {
                        return Ok(Verdict::Rejected);
                    }
                    slot.color = Some(color);
                }
            }
        }

        Ok(Verdict::Accepted)
    }

    fn apply_status(&mut self, r: &mut LittleEndianReader<'_>) -> Result<()> {
        let validate = self.options.validate_duplicate_status;

        for slot in &mut self.slots {
            if r.is_exhausted() {
                break;
            }
            let raw = r.read_u32()?;
            match slot.status {
                None => slot.status = Some(PlayerStatus::from_raw(raw)),
                Some(primary) if primary.raw() == raw => {}
                Some(primary) if validate => {
                    return Err(SaveError::StatusMismatch {
                        slot: slot.slot_index,
                        primary: primary.raw(),
                        secondary: raw,
                    });
                }
                Some(primary) => {
                    warn!(
                        slot = slot.slot_index,
                        primary = primary.raw(),
                        secondary = raw,
                        "discarding mismatched secondary status"
                    );
                }
            }
        }

        Ok(())
    }

    fn finish(self, header: SaveHeader) -> SaveRecord {
        let slot_count = self.slots.len();
        let players = self
            .slots
            .into_iter()
            .filter(PlayerSlot::is_real)
            .collect();

        SaveRecord {
            header,
            chunk_start_offsets: self.chunk_start_offsets,
            players,
            slot_count,
            barbarian_slot_count: self.barbarian_slot_count,
            active_player_index: self.active_player_index,
            rejected_color_candidates: self.rejected_color_candidates,
        }
    }
}
