use serde::{Deserialize, Serialize};

/// Separates chunks in the region after the header.
pub const CHUNK_DELIMITER: [u8; 4] = [0x40, 0x00, 0x00, 0x00];

/// Every complete save ends with these bytes.
pub const END_OF_FILE_MARKER: [u8; 4] = [0x00, 0x00, 0xFF, 0xFF];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ByteRange {
    pub start: usize,
    pub end: usize,
}

impl ByteRange {
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// A delimiter-bounded span of the chunk region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Offset of the delimiter that opens this chunk.
    pub delimiter_offset: usize,
    /// Bytes strictly between the opening and the following delimiter.
    pub payload: ByteRange,
}

impl Chunk {
    pub fn payload<'a>(&self, bytes: &'a [u8]) -> &'a [u8] {
        &bytes[self.payload.start..self.payload.end]
    }
}

pub fn has_end_marker(bytes: &[u8]) -> bool {
    bytes.ends_with(&END_OF_FILE_MARKER)
}

/// Offset of the first delimiter at or after `from`.
pub fn find_delimiter(bytes: &[u8], from: usize) -> Option<usize> {
    bytes
        .get(from..)?
        .windows(CHUNK_DELIMITER.len())
        .position(|window| window == CHUNK_DELIMITER)
        .map(|found| from + found)
}

/// Find the chunk opened by the first delimiter at or after `search_from`.
///
/// Searching from 0 scans the whole buffer. Returns `None` when the opening
/// delimiter has no following delimiter; that is the end of the chunk region,
/// not an error.
pub fn next_chunk(bytes: &[u8], search_from: usize) -> Option<Chunk> {
    let delimiter_offset = find_delimiter(bytes, search_from)?;
    let start = delimiter_offset + CHUNK_DELIMITER.len();
    let end = find_delimiter(bytes, start)?;

    Some(Chunk {
        delimiter_offset,
        payload: ByteRange { start, end },
    })
}

/// Iterator chaining [`next_chunk`] calls, each resuming at the previous
/// payload end.
#[derive(Debug, Clone)]
pub struct Chunks<'a> {
    bytes: &'a [u8],
    search_from: Option<usize>,
}

impl<'a> Chunks<'a> {
    pub fn new(bytes: &'a [u8], search_from: usize) -> Self {
        Self {
            bytes,
            search_from: Some(search_from),
        }
    }
}

impl Iterator for Chunks<'_> {
    type Item = Chunk;

    fn next(&mut self) -> Option<Chunk> {
        let from = self.search_from?;
        match next_chunk(self.bytes, from) {
            Some(chunk) => {
                self.search_from = Some(chunk.payload.end);
                Some(chunk)
            }
            None => {
                self.search_from = None;
                None
            }
        }
    }
}
