//! Legacy text encoding for `.anm` files.
//!
//! The authoring tool writes Shift_JIS. Input that is not valid Shift_JIS is
//! decoded one char per byte (ISO-8859-1) instead, so it still parses and
//! writes back to the same bytes.

use encoding_rs::SHIFT_JIS;
use std::borrow::Cow;
use thiserror::Error;

/// Error when text cannot be written back in the legacy encoding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("character {ch:?} at offset {offset} cannot be encoded as Shift_JIS")]
pub struct EncodingError {
    /// The offending character
    pub ch: char,
    /// Char offset within the input
    pub offset: usize,
}

/// Decode legacy bytes into a string.
///
/// # Examples
///
/// ```
/// use anmkit::encoding::decode_legacy;
///
/// assert_eq!(decode_legacy(b"DELAY=100"), "DELAY=100");
/// assert_eq!(decode_legacy(&[0x95, 0xE0, 0x82, 0xAD]), "\u{6B69}\u{304F}");
/// ```
pub fn decode_legacy(bytes: &[u8]) -> Cow<'_, str> {
    match SHIFT_JIS.decode_without_bom_handling_and_without_replacement(bytes) {
        Some(text) => text,
        None => {
            log::debug!("input is not valid Shift_JIS, decoding bytes as ISO-8859-1");
            Cow::Owned(bytes.iter().map(|&b| char::from(b)).collect())
        }
    }
}

/// Encode a string as Shift_JIS.
///
/// Text that Shift_JIS cannot represent is accepted if every char fits in a
/// single byte, which covers anything [`decode_legacy`] produced from
/// undecodable input.
pub fn encode_legacy(text: &str) -> Result<Vec<u8>, EncodingError> {
    let (bytes, _, unmappable) = SHIFT_JIS.encode(text);
    if !unmappable {
        return Ok(bytes.into_owned());
    }
    text.chars()
        .enumerate()
        .map(|(offset, ch)| u8::try_from(ch).map_err(|_| EncodingError { ch, offset }))
        .collect()
}
