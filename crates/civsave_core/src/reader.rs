use crate::error::{Result, SaveError};
use crate::layout::ByteRange;
use crate::text::decode_single_byte;

/// Length prefixes of zero or above this are read as an empty string.
pub const MAX_STRING_LEN: usize = 1000;

pub const U32_WIDTH: usize = 4;

/// A length-prefixed string together with the bytes it occupies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringField {
    pub value: String,
    /// Absolute range covering the length prefix and any consumed payload.
    pub range: ByteRange,
}

/// Little-endian cursor over a byte slice.
///
/// `base` is the absolute file offset of `data[0]`, so positions and errors
/// always refer to the whole save file even when reading a single chunk.
#[derive(Debug, Clone)]
pub struct LittleEndianReader<'a> {
    data: &'a [u8],
    base: usize,
    pos: usize,
}

impl<'a> LittleEndianReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self::with_base(data, 0)
    }

    pub fn with_base(data: &'a [u8], base: usize) -> Self {
        Self { data, base, pos: 0 }
    }

    /// Absolute file offset of the cursor.
    pub fn position(&self) -> usize {
        self.base + self.pos
    }

    /// Offset of the cursor relative to the start of this slice.
    pub fn local_position(&self) -> usize {
        self.pos
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    /// True once the cursor has reached (or, after a clamped string, passed)
    /// the end of the slice.
    pub fn is_exhausted(&self) -> bool {
        self.pos >= self.data.len()
    }

    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.ensure(n)?;
        self.pos += n;
        Ok(())
    }

    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        self.ensure(n)?;
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_array::<1>()?[0])
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.read_array::<U32_WIDTH>()?))
    }

    /// Read a u32 at a slice-relative offset without moving the cursor.
    pub fn peek_u32_at(&self, local_offset: usize) -> Result<u32> {
        let mut probe = self.clone();
        probe.pos = local_offset;
        probe.read_u32()
    }

    pub fn read_string(&mut self) -> Result<String> {
        Ok(self.read_string_field()?.value)
    }

    /// Read a u32 length prefix followed by that many bytes of text.
    ///
    /// A prefix of 0 or above [`MAX_STRING_LEN`] yields an empty string and
    /// leaves the cursor just past the prefix. A payload running off the end
    /// of the slice is clamped and leaves the reader exhausted.
    pub fn read_string_field(&mut self) -> Result<StringField> {
        let start = self.position();
        let declared = self.read_u32()? as usize;
        if declared == 0 || declared > MAX_STRING_LEN {
            return Ok(StringField {
                value: String::new(),
                range: ByteRange {
                    start,
                    end: self.position(),
                },
            });
        }

        let available = declared.min(self.remaining());
        let bytes = &self.data[self.pos..self.pos + available];
        self.pos += declared;

        Ok(StringField {
            value: decode_single_byte(bytes),
            range: ByteRange {
                start,
                end: start + U32_WIDTH + available,
            },
        })
    }

    fn ensure(&self, n: usize) -> Result<()> {
        if self.pos.saturating_add(n) > self.data.len() {
            return Err(SaveError::UnexpectedEof {
                offset: self.position(),
                need: n,
                have: self.remaining(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prefixed(text: &[u8]) -> Vec<u8> {
        let mut out = (text.len() as u32).to_le_bytes().to_vec();
        out.extend_from_slice(text);
        out
    }

    #[test]
    fn reads_little_endian_integers() {
        let mut r = LittleEndianReader::new(&[0x08, 0, 0, 0, 0x13, 0x01, 0, 0]);
        assert_eq!(r.read_u32().unwrap(), 8);
        assert_eq!(r.read_u32().unwrap(), 0x113);
        assert!(r.is_exhausted());
    }

    #[test]
    fn short_integer_read_reports_absolute_offset() {
        let mut r = LittleEndianReader::with_base(&[1, 2], 100);
        let err = r.read_u32().unwrap_err();
        assert_eq!(
            err,
            SaveError::UnexpectedEof {
                offset: 100,
                need: 4,
                have: 2
            }
        );
    }

    #[test]
    fn zero_length_string_consumes_only_prefix() {
        let data = [0, 0, 0, 0, b'x'];
        let mut r = LittleEndianReader::new(&data);
        let field = r.read_string_field().unwrap();
        assert_eq!(field.value, "");
        assert_eq!(field.range, ByteRange { start: 0, end: 4 });
        assert_eq!(r.local_position(), 4);
    }

    #[test]
    fn oversized_length_prefix_is_treated_as_blank() {
        let mut data = 1001u32.to_le_bytes().to_vec();
        data.extend_from_slice(b"junk");
        let mut r = LittleEndianReader::new(&data);
        assert_eq!(r.read_string().unwrap(), "");
        assert_eq!(r.local_position(), 4);
    }

    #[test]
    fn string_span_covers_prefix_and_payload() {
        let data = prefixed(b"berlin");
        let mut r = LittleEndianReader::with_base(&data, 40);
        let field = r.read_string_field().unwrap();
        assert_eq!(field.value, "berlin");
        assert_eq!(field.range, ByteRange { start: 40, end: 50 });
        assert!(r.is_exhausted());
    }

    #[test]
    fn string_running_past_slice_is_clamped() {
        let mut data = 10u32.to_le_bytes().to_vec();
        data.extend_from_slice(b"abc");
        let mut r = LittleEndianReader::new(&data);
        let field = r.read_string_field().unwrap();
        assert_eq!(field.value, "abc");
        assert_eq!(field.range.end, data.len());
        assert!(r.is_exhausted());
    }

    #[test]
    fn peek_does_not_move_cursor() {
        let data = [1, 0, 0, 0, 7, 0, 0, 0];
        let r = LittleEndianReader::new(&data);
        assert_eq!(r.peek_u32_at(4).unwrap(), 7);
        assert_eq!(r.local_position(), 0);
    }
}
