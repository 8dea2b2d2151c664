//! Byte-level edits of a save buffer.
//!
//! Every edit takes the original buffer by reference and returns a fresh
//! copy; the input is never written. Chunk offsets are re-derived from a new
//! parse on each call, so edits can be chained by feeding one result into the
//! next.

use tracing::debug;

use crate::assembler::{ParseOptions, parse_with_options};
use crate::chunk_map::{
    ACTIVE_PLAYER_BACK_OFFSET, ChunkRole, DISPLAY_NAMES_ORDINAL, LEADERS_ORDINAL,
    PASSWORDS_ORDINAL, STATUS_ORDINAL,
};
use crate::error::{Result, SaveError};
use crate::layout::{ByteRange, CHUNK_DELIMITER, Chunk, find_delimiter, next_chunk};
use crate::reader::{LittleEndianReader, StringField, U32_WIDTH};
use crate::record::{PlayerStatus, SaveRecord};
use crate::text::encode_string;

/// Overwrite a slot's status in the primary table and in every mirror the
/// variant defines that is present in the file. Buffer length is unchanged.
pub fn set_player_status(bytes: &[u8], slot_index: usize, status: PlayerStatus) -> Result<Vec<u8>> {
    let record = parse_with_options(bytes, ParseOptions::unvalidated())?;
    let ordinals = record.variant().layout().ordinals_of(ChunkRole::Status);

    // Resolve all copies before writing any, so a failed lookup leaves
    // nothing half-applied.
    let mut targets = Vec::with_capacity(ordinals.len());
    for &ordinal in &ordinals {
        if ordinal != STATUS_ORDINAL && ordinal >= record.chunk_count() {
            debug!(ordinal, available = record.chunk_count(), "status mirror absent, skipping");
            continue;
        }
        let chunk = locate_chunk(bytes, &record, ordinal)?;
        targets.push(locate_u32_field(bytes, &chunk, ordinal, slot_index)?);
    }

    let mut out = bytes.to_vec();
    for &range in &targets {
        patch_u32(&mut out, range, status.raw())?;
    }
    for &range in &targets {
        ensure_no_delimiter(&out, range)?;
    }

    debug!(slot_index, status = status.raw(), ?ordinals, "patched player status");
    Ok(out)
}

/// Point the active-player index at `slot_index`. Buffer length is unchanged.
pub fn set_active_player(bytes: &[u8], slot_index: usize) -> Result<Vec<u8>> {
    let record = parse_with_options(bytes, ParseOptions::unvalidated())?;
    let not_found = SaveError::PositionNotFound {
        ordinal: LEADERS_ORDINAL,
        position: slot_index,
    };
    if slot_index >= record.slot_count {
        return Err(not_found);
    }
    let raw = u32::try_from(slot_index).map_err(|_| not_found.clone())?;

    let chunk = locate_chunk(bytes, &record, LEADERS_ORDINAL)?;
    let start = chunk
        .payload
        .end
        .checked_sub(ACTIVE_PLAYER_BACK_OFFSET)
        .filter(|start| *start >= chunk.payload.start)
        .ok_or(SaveError::UnexpectedEof {
            offset: chunk.payload.start,
            need: ACTIVE_PLAYER_BACK_OFFSET,
            have: chunk.payload.len(),
        })?;

    let range = ByteRange {
        start,
        end: start + U32_WIDTH,
    };
    let mut out = bytes.to_vec();
    patch_u32(&mut out, range, raw)?;
    ensure_no_delimiter(&out, range)?;

    debug!(slot_index, offset = start, "patched active player");
    Ok(out)
}

pub fn set_player_password(bytes: &[u8], slot_index: usize, password: &str) -> Result<Vec<u8>> {
    replace_string(bytes, PASSWORDS_ORDINAL, slot_index, password)
}

pub fn set_player_display_name(bytes: &[u8], slot_index: usize, name: &str) -> Result<Vec<u8>> {
    replace_string(bytes, DISPLAY_NAMES_ORDINAL, slot_index, name)
}

/// Swap the `position`-th string of chunk `ordinal` for `text`, rebuilding
/// the buffer. Everything after the string shifts by the length difference.
fn replace_string(bytes: &[u8], ordinal: usize, position: usize, text: &str) -> Result<Vec<u8>> {
    let record = parse_with_options(bytes, ParseOptions::unvalidated())?;
    let chunk = locate_chunk(bytes, &record, ordinal)?;
    let current = locate_string_field(bytes, &chunk, ordinal, position)?;
    let encoded = encode_string(text)?;

    let span = current.range;
    let mut out = Vec::with_capacity(bytes.len() - span.len() + encoded.len());
    out.extend_from_slice(&bytes[..span.start]);
    out.extend_from_slice(&encoded);
    out.extend_from_slice(&bytes[span.end..]);
    ensure_no_delimiter(
        &out,
        ByteRange {
            start: span.start,
            end: span.start + encoded.len(),
        },
    )?;

    debug!(
        ordinal,
        position,
        old_len = span.len(),
        new_len = encoded.len(),
        "rebuilt buffer with replacement string"
    );
    Ok(out)
}

fn locate_chunk(bytes: &[u8], record: &SaveRecord, ordinal: usize) -> Result<Chunk> {
    let not_found = || SaveError::ChunkNotFound {
        ordinal,
        available: record.chunk_count(),
    };
    let &offset = record.chunk_start_offsets.get(ordinal).ok_or_else(not_found)?;
    next_chunk(bytes, offset).ok_or_else(not_found)
}

fn locate_u32_field(
    bytes: &[u8],
    chunk: &Chunk,
    ordinal: usize,
    position: usize,
) -> Result<ByteRange> {
    let mut r = LittleEndianReader::with_base(chunk.payload(bytes), chunk.payload.start);
    let not_found = SaveError::PositionNotFound { ordinal, position };

    for _ in 0..position {
        if r.remaining() < U32_WIDTH {
            return Err(not_found);
        }
        r.read_u32()?;
    }
    if r.remaining() < U32_WIDTH {
        return Err(not_found);
    }

    let start = r.position();
    Ok(ByteRange {
        start,
        end: start + U32_WIDTH,
    })
}

fn locate_string_field(
    bytes: &[u8],
    chunk: &Chunk,
    ordinal: usize,
    position: usize,
) -> Result<StringField> {
    let mut r = LittleEndianReader::with_base(chunk.payload(bytes), chunk.payload.start);
    let not_found = SaveError::PositionNotFound { ordinal, position };

    for _ in 0..position {
        if r.remaining() < U32_WIDTH {
            return Err(not_found);
        }
        r.read_string()?;
    }
    if r.remaining() < U32_WIDTH {
        return Err(not_found);
    }

    r.read_string_field()
}

fn patch_u32(out: &mut [u8], range: ByteRange, value: u32) -> Result<()> {
    if range.end > out.len() || range.len() != U32_WIDTH {
        return Err(SaveError::UnexpectedEof {
            offset: range.start,
            need: U32_WIDTH,
            have: out.len().saturating_sub(range.start),
        });
    }
    out[range.start..range.end].copy_from_slice(&value.to_le_bytes());
    Ok(())
}

/// Reject an edit whose `written` bytes take part in a chunk delimiter.
///
/// Edited fields always sit inside a chunk payload, and a payload never
/// contains a delimiter, so any match overlapping `written` is new.
fn ensure_no_delimiter(out: &[u8], written: ByteRange) -> Result<()> {
    if written.is_empty() {
        return Ok(());
    }
    let reach = CHUNK_DELIMITER.len() - 1;
    let from = written.start.saturating_sub(reach);
    let to = written.end.saturating_add(reach).min(out.len());
    match find_delimiter(&out[..to], from) {
        Some(offset) if offset < written.end => Err(SaveError::DelimiterCollision { offset }),
        _ => Ok(()),
    }
}
