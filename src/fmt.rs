//! Writer for `.anm` files
//!
//! Produces the exact layout the authoring tool writes: a header comment,
//! the version, then one block per pattern with indented frame fields in a
//! fixed key order. Used to hand documents back to the tool and by
//! `anm fmt` to normalize hand-edited files.

use crate::encoding::{encode_legacy, EncodingError};
use crate::models::{AnimationDocument, Key};
use crate::parser::{parse_bytes, ParseError};
use thiserror::Error;

/// Header comment written by the authoring tool.
const HEADER_COMMENT: &str = ";EDGE\u{7528}\u{30A2}\u{30CB}\u{30E1}\u{30FC}\u{30B7}\u{30E7}\u{30F3}\u{30C7}\u{30FC}\u{30BF}";

/// Separator comment written before each pattern.
const PATTERN_SEPARATOR: &str = ";--------------------------";

/// Line terminator used by the authoring tool.
const NEWLINE: &str = "\r\n";

/// Error while reformatting a file.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Encoding(#[from] EncodingError),
}

/// Serialize a document to text in the tool's layout.
pub fn write_document(doc: &AnimationDocument) -> String {
    let mut out = String::new();
    let mut line = |text: &str| {
        out.push_str(text);
        out.push_str(NEWLINE);
    };

    line(HEADER_COMMENT);
    line(&format!("{}={}", Key::AnimeVersion, doc.version));
    line("");

    for pattern in &doc.patterns {
        line("");
        line(PATTERN_SEPARATOR);
        line(&format!("{}={}", Key::PatternName, pattern.name));

        for (i, frame) in pattern.frames.iter().enumerate() {
            line("");
            line(&format!("\t{}={}", Key::FrameNumber, i + 1));
            for key in Key::FRAME_KEYS {
                if let Some(value) = frame.field_value(key) {
                    line(&format!("\t\t{}={}", key, value));
                }
            }
        }
        line("");
    }

    out
}

/// Serialize a document to bytes in the tool's legacy encoding.
pub fn write_document_bytes(doc: &AnimationDocument) -> Result<Vec<u8>, EncodingError> {
    encode_legacy(&write_document(doc))
}

/// Reformat raw `.anm` bytes into the canonical layout.
///
/// Comments other than the tool's own header and separators are dropped, as
/// are unknown keys.
pub fn format_anm(bytes: &[u8]) -> Result<Vec<u8>, FormatError> {
    let doc = parse_bytes(bytes)?;
    Ok(write_document_bytes(&doc)?)
}
