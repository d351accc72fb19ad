//! Source document types parsed from `.anm` files.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Root of a parsed `.anm` file.
///
/// Pattern order is significant: it is the playback selector index used by
/// the generated state machine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimationDocument {
    /// Value of `ANIME_VERSION`
    pub version: i32,
    /// Patterns in declaration order
    pub patterns: Vec<Pattern>,
}

/// A named animation sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pattern {
    pub name: String,
    /// Frames in playback order
    pub frames: Vec<Frame>,
}

impl Pattern {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), frames: Vec::new() }
    }

    /// Sum of all frame delays in milliseconds.
    pub fn total_delay_ms(&self) -> i64 {
        self.frames.iter().map(|f| i64::from(f.delay)).sum()
    }
}

/// One timed step of a pattern.
///
/// `src_x`/`src_y` use the authoring tool's convention: origin at the
/// bottom-left of the source image, y increasing upward.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    /// Tool-relative path of the source image
    pub filename: String,
    /// Title of the tool window the frame was captured from
    pub win_title: String,
    pub src_x: i32,
    pub src_y: i32,
    pub layer_num: i32,
    pub width: i32,
    pub height: i32,
    /// Registration offset, used to compute the pivot
    pub dest_x: i32,
    pub dest_y: i32,
    /// Display time in milliseconds
    pub delay: i32,
    pub layer_add: i32,
    pub ckey_enable: bool,
    pub ckey_num: i32,
}

/// Keys recognized in `.anm` files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    AnimeVersion,
    PatternName,
    FrameNumber,
    Filename,
    WinTitle,
    SrcX,
    SrcY,
    LayerNum,
    Width,
    Height,
    DestX,
    DestY,
    Delay,
    LayerAdd,
    CkeyEnable,
    CkeyNum,
}

impl Key {
    /// Frame keys in the order the authoring tool writes them.
    pub const FRAME_KEYS: [Key; 13] = [
        Key::Filename,
        Key::WinTitle,
        Key::SrcX,
        Key::SrcY,
        Key::LayerNum,
        Key::Width,
        Key::Height,
        Key::DestX,
        Key::DestY,
        Key::Delay,
        Key::LayerAdd,
        Key::CkeyEnable,
        Key::CkeyNum,
    ];

    /// Look up a key by its spelling in the file. Unknown keys return `None`.
    pub fn parse(s: &str) -> Option<Self> {
        let key = match s {
            "ANIME_VERSION" => Key::AnimeVersion,
            "PATTERN_NAME" => Key::PatternName,
            "FRAME_NUMBER" => Key::FrameNumber,
            "FILENAME" => Key::Filename,
            "WIN_TITLE" => Key::WinTitle,
            "SRC_X" => Key::SrcX,
            "SRC_Y" => Key::SrcY,
            "LAYER_NUM" => Key::LayerNum,
            "WIDTH" => Key::Width,
            "HEIGHT" => Key::Height,
            "DEST_X" => Key::DestX,
            "DEST_Y" => Key::DestY,
            "DELAY" => Key::Delay,
            "LAYER_ADD" => Key::LayerAdd,
            "CKEY_ENABLE" => Key::CkeyEnable,
            "CKEY_NUM" => Key::CkeyNum,
            _ => return None,
        };
        Some(key)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Key::AnimeVersion => "ANIME_VERSION",
            Key::PatternName => "PATTERN_NAME",
            Key::FrameNumber => "FRAME_NUMBER",
            Key::Filename => "FILENAME",
            Key::WinTitle => "WIN_TITLE",
            Key::SrcX => "SRC_X",
            Key::SrcY => "SRC_Y",
            Key::LayerNum => "LAYER_NUM",
            Key::Width => "WIDTH",
            Key::Height => "HEIGHT",
            Key::DestX => "DEST_X",
            Key::DestY => "DEST_Y",
            Key::Delay => "DELAY",
            Key::LayerAdd => "LAYER_ADD",
            Key::CkeyEnable => "CKEY_ENABLE",
            Key::CkeyNum => "CKEY_NUM",
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Frame {
    /// Render a frame field in file syntax.
    pub fn field_value(&self, key: Key) -> Option<String> {
        let value = match key {
            Key::Filename => self.filename.clone(),
            Key::WinTitle => self.win_title.clone(),
            Key::SrcX => self.src_x.to_string(),
            Key::SrcY => self.src_y.to_string(),
            Key::LayerNum => self.layer_num.to_string(),
            Key::Width => self.width.to_string(),
            Key::Height => self.height.to_string(),
            Key::DestX => self.dest_x.to_string(),
            Key::DestY => self.dest_y.to_string(),
            Key::Delay => self.delay.to_string(),
            Key::LayerAdd => self.layer_add.to_string(),
            Key::CkeyEnable => i32::from(self.ckey_enable).to_string(),
            Key::CkeyNum => self.ckey_num.to_string(),
            Key::AnimeVersion | Key::PatternName | Key::FrameNumber => return None,
        };
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_spelling_round_trip() {
        for key in Key::FRAME_KEYS {
            assert_eq!(Key::parse(key.as_str()), Some(key));
        }
        assert_eq!(Key::parse("ANIME_VERSION"), Some(Key::AnimeVersion));
        assert_eq!(Key::parse("anime_version"), None);
        assert_eq!(Key::parse("UNKNOWN"), None);
    }

    #[test]
    fn test_field_value_ckey_enable() {
        let frame = Frame { ckey_enable: true, ..Default::default() };
        assert_eq!(frame.field_value(Key::CkeyEnable).as_deref(), Some("1"));
        assert_eq!(Frame::default().field_value(Key::CkeyEnable).as_deref(), Some("0"));
        assert_eq!(frame.field_value(Key::PatternName), None);
    }

    #[test]
    fn test_total_delay() {
        let mut pattern = Pattern::new("Walk");
        pattern.frames.push(Frame { delay: 100, ..Default::default() });
        pattern.frames.push(Frame { delay: 150, ..Default::default() });
        assert_eq!(pattern.total_delay_ms(), 250);
    }
}
