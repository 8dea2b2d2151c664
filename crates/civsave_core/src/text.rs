//! Single-byte text handling for save file strings.
//!
//! The game stores names as length-prefixed Windows-1252 bytes. Anything
//! written back is reduced to plain ASCII first, so accented names survive as
//! their closest unaccented spelling.

use deunicode::deunicode;
use encoding_rs::WINDOWS_1252;

use crate::error::{Result, SaveError};
use crate::reader::{MAX_STRING_LEN, U32_WIDTH};

pub fn decode_single_byte(bytes: &[u8]) -> String {
    let (text, _) = WINDOWS_1252.decode_without_bom_handling(bytes);
    text.into_owned()
}

/// Transliterate `text` to ASCII ("Míké" -> "Mike").
pub fn to_ascii(text: &str) -> String {
    deunicode(text)
}

/// Encode `text` as a u32 little-endian length prefix plus ASCII payload.
pub fn encode_string(text: &str) -> Result<Vec<u8>> {
    let ascii = to_ascii(text);
    let payload = ascii.as_bytes();
    if payload.len() > MAX_STRING_LEN {
        return Err(SaveError::StringTooLong {
            len: payload.len(),
            max: MAX_STRING_LEN,
        });
    }

    let mut out = Vec::with_capacity(U32_WIDTH + payload.len());
    out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    out.extend_from_slice(payload);
    Ok(out)
}
