//! Line-oriented parsing of `.anm` files
//!
//! Each line may carry `KEY=VALUE` assignments. A cursor (current pattern,
//! current frame) is threaded through the lines as local state: `PATTERN_NAME`
//! opens a pattern, `FRAME_NUMBER` opens a frame inside it, and the frame
//! keys fill in the frame that was opened last.

use crate::encoding::decode_legacy;
use crate::models::{AnimationDocument, Frame, Key, Pattern};
use regex::Regex;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use thiserror::Error;

/// Error type for parsing failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {kind}")]
pub struct ParseError {
    pub line: usize,
    pub kind: ParseErrorKind,
}

/// What went wrong on a line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ParseErrorKind {
    /// A frame or field key appeared before any `PATTERN_NAME`
    #[error("{key} appears before any PATTERN_NAME")]
    NoCurrentPattern { key: Key },
    /// A field key appeared before any `FRAME_NUMBER` of the current pattern
    #[error("{key} appears before any FRAME_NUMBER in pattern '{pattern}'")]
    NoCurrentFrame { key: Key, pattern: String },
    /// An integer key had a non-integer value
    #[error("{key} expects an integer, found '{value}'")]
    InvalidInteger { key: Key, value: String },
}

/// Error reading a document from disk.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DocumentError {
    #[error("cannot read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },
}

fn assignment_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s*(\w+)=(.*)").expect("assignment pattern is valid"))
}

/// Parse decoded `.anm` text into a document.
///
/// # Examples
///
/// ```
/// use anmkit::parser::parse_str;
///
/// let doc = parse_str("ANIME_VERSION=1\nPATTERN_NAME=Walk\n\tFRAME_NUMBER=1\n\t\tDELAY=100\n").unwrap();
/// assert_eq!(doc.version, 1);
/// assert_eq!(doc.patterns[0].frames[0].delay, 100);
/// ```
pub fn parse_str(text: &str) -> Result<AnimationDocument, ParseError> {
    let mut doc = AnimationDocument::default();

    for (index, raw) in text.split('\n').enumerate() {
        let line = raw.strip_suffix('\r').unwrap_or(raw);
        if line.trim_start().starts_with(';') {
            continue;
        }

        for caps in assignment_regex().captures_iter(line) {
            let Some(key) = Key::parse(&caps[1]) else {
                continue;
            };
            apply(&mut doc, key, &caps[2])
                .map_err(|kind| ParseError { line: index + 1, kind })?;
        }
    }

    Ok(doc)
}

/// Parse raw bytes in the tool's legacy encoding.
pub fn parse_bytes(bytes: &[u8]) -> Result<AnimationDocument, ParseError> {
    parse_str(&decode_legacy(bytes))
}

/// Parse a document from any reader.
pub fn parse_reader<R: Read>(mut reader: R) -> Result<AnimationDocument, DocumentError> {
    let mut bytes = Vec::new();
    reader
        .read_to_end(&mut bytes)
        .map_err(|source| DocumentError::Io { path: PathBuf::from("<reader>"), source })?;
    parse_bytes(&bytes)
        .map_err(|source| DocumentError::Parse { path: PathBuf::from("<reader>"), source })
}

/// Read and parse a `.anm` file.
pub fn read_document(path: &Path) -> Result<AnimationDocument, DocumentError> {
    let bytes = std::fs::read(path)
        .map_err(|source| DocumentError::Io { path: path.to_path_buf(), source })?;
    parse_bytes(&bytes).map_err(|source| DocumentError::Parse { path: path.to_path_buf(), source })
}

/// Apply one assignment to the document under construction.
fn apply(doc: &mut AnimationDocument, key: Key, value: &str) -> Result<(), ParseErrorKind> {
    match key {
        Key::AnimeVersion => {
            doc.version = parse_int(key, value)?;
        }
        Key::PatternName => {
            doc.patterns.push(Pattern::new(value));
        }
        Key::FrameNumber => {
            let pattern = doc.patterns.last_mut().ok_or(ParseErrorKind::NoCurrentPattern { key })?;
            pattern.frames.push(Frame::default());
        }
        _ => {
            let pattern = doc.patterns.last_mut().ok_or(ParseErrorKind::NoCurrentPattern { key })?;
            let frame = match pattern.frames.last_mut() {
                Some(frame) => frame,
                None => {
                    return Err(ParseErrorKind::NoCurrentFrame {
                        key,
                        pattern: pattern.name.clone(),
                    })
                }
            };
            set_field(frame, key, value)?;
        }
    }
    Ok(())
}

fn set_field(frame: &mut Frame, key: Key, value: &str) -> Result<(), ParseErrorKind> {
    match key {
        Key::Filename => frame.filename = value.to_string(),
        Key::WinTitle => frame.win_title = value.to_string(),
        Key::SrcX => frame.src_x = parse_int(key, value)?,
        Key::SrcY => frame.src_y = parse_int(key, value)?,
        Key::LayerNum => frame.layer_num = parse_int(key, value)?,
        Key::Width => frame.width = parse_int(key, value)?,
        Key::Height => frame.height = parse_int(key, value)?,
        Key::DestX => frame.dest_x = parse_int(key, value)?,
        Key::DestY => frame.dest_y = parse_int(key, value)?,
        Key::Delay => frame.delay = parse_int(key, value)?,
        Key::LayerAdd => frame.layer_add = parse_int(key, value)?,
        Key::CkeyEnable => frame.ckey_enable = parse_int(key, value)? != 0,
        Key::CkeyNum => frame.ckey_num = parse_int(key, value)?,
        Key::AnimeVersion | Key::PatternName | Key::FrameNumber => {}
    }
    Ok(())
}

fn parse_int(key: Key, value: &str) -> Result<i32, ParseErrorKind> {
    value
        .trim()
        .parse()
        .map_err(|_| ParseErrorKind::InvalidInteger { key, value: value.to_string() })
}
