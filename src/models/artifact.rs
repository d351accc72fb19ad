//! Generated artifact types.
//!
//! These are the logical contents of what an import produces and what a
//! destination store holds: sliced sprites, per-pattern timelines and the
//! selector state machine. Stable names are the reconciliation key, so the
//! naming helpers here are the single source of truth for them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of the generated selector machine.
pub const SELECTOR_NAME: &str = "Controller";

/// Name of the selector's integer parameter.
pub const SELECTOR_PARAMETER: &str = "Pattern";

/// Name of the selector's only layer.
pub const SELECTOR_LAYER: &str = "Base Layer";

/// Stable name of the sprite for a frame (`frame_index` is 0-based).
pub fn sprite_name(pattern: &str, frame_index: usize) -> String {
    format!("{}#{}", pattern, frame_index + 1)
}

/// Stable name of the selector state for a pattern.
pub fn state_name(pattern: &str) -> String {
    format!("{} State", pattern)
}

/// Stable name of the any-state transition into a pattern's state.
pub fn transition_name(pattern: &str) -> String {
    format!("{} Transition", pattern)
}

/// Identity of an artifact inside a store.
///
/// Ids survive in-place updates, which is what keeps external references
/// valid across rebuilds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArtifactId(pub u64);

impl fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Kind of generated artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    Sprite,
    Timeline,
    Selector,
}

impl ArtifactKind {
    /// All kinds, in reconciliation order.
    pub const ALL: [ArtifactKind; 3] =
        [ArtifactKind::Sprite, ArtifactKind::Timeline, ArtifactKind::Selector];
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactKind::Sprite => write!(f, "sprite"),
            ArtifactKind::Timeline => write!(f, "timeline"),
            ArtifactKind::Selector => write!(f, "selector"),
        }
    }
}

/// Store key of an artifact: its kind plus stable name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ArtifactKey {
    pub kind: ArtifactKind,
    pub name: String,
}

impl ArtifactKey {
    pub fn new(kind: ArtifactKind, name: impl Into<String>) -> Self {
        Self { kind, name: name.into() }
    }
}

impl fmt::Display for ArtifactKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} '{}'", self.kind, self.name)
    }
}

/// How the sprite mesh covers its rectangle.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum MeshType {
    /// Mesh hugs the opaque pixels
    #[default]
    #[serde(alias = "Tight")]
    Tight,
    /// Mesh covers the whole rectangle
    #[serde(alias = "FullRect")]
    FullRect,
}

impl fmt::Display for MeshType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MeshType::Tight => write!(f, "tight"),
            MeshType::FullRect => write!(f, "full-rect"),
        }
    }
}

/// 2D vector.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl From<[f32; 2]> for Vec2 {
    fn from([x, y]: [f32; 2]) -> Self {
        Self { x, y }
    }
}

/// Pixel rectangle with a top-left origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SpriteRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

/// A sliced region of a source image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedSprite {
    /// `<pattern>#<1-based frame index>`
    pub name: String,
    /// Project-relative path of the source image
    pub texture: String,
    pub rect: SpriteRect,
    /// Normalized pivot within `rect`
    pub pivot: Vec2,
    pub pixels_per_unit: f32,
    pub extrude: u32,
    pub mesh_type: MeshType,
}

/// A sprite swap at a point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    /// Seconds from the start of the timeline
    pub time: f64,
    /// Name of the sprite shown from this keyframe on
    pub sprite: String,
}

/// The animation clip generated for one pattern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedTimeline {
    /// Pattern name
    pub name: String,
    pub frame_rate: u32,
    pub loop_time: bool,
    /// Total length in seconds
    pub duration: f64,
    pub keyframes: Vec<Keyframe>,
}

impl GeneratedTimeline {
    /// Sprite visible at `time` seconds, wrapping around when looping.
    pub fn sprite_at(&self, time: f64) -> Option<&str> {
        let t = if self.loop_time && self.duration > 0.0 { time.rem_euclid(self.duration) } else { time };
        self.keyframes.iter().rev().find(|k| k.time <= t).map(|k| k.sprite.as_str())
    }
}

/// Type of a selector parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterType {
    Int,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectorParameter {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ParameterType,
    pub default: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectorState {
    /// `<pattern> State`
    pub name: String,
    /// Timeline played in this state; `None` when the pattern failed to build
    pub motion: Option<String>,
    /// Presentation position in a graph view
    pub position: Vec2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConditionMode {
    Equals,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    pub mode: ConditionMode,
    pub parameter: String,
    pub threshold: i32,
}

impl Condition {
    pub fn holds(&self, value: i32) -> bool {
        match self.mode {
            ConditionMode::Equals => value == self.threshold,
        }
    }
}

/// A transition from the synthetic "any state" source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectorTransition {
    pub name: String,
    /// Name of the destination state
    pub destination: String,
    pub conditions: Vec<Condition>,
    pub duration: f32,
    pub offset: f32,
    /// Fraction of the current state's timeline that must play first
    pub exit_time: f32,
    pub has_exit_time: bool,
    pub can_transition_to_self: bool,
}

/// State machine selecting a pattern's timeline by an integer parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectorMachine {
    pub name: String,
    pub layer: String,
    pub parameters: Vec<SelectorParameter>,
    pub states: Vec<SelectorState>,
    pub any_state_transitions: Vec<SelectorTransition>,
}

impl SelectorMachine {
    pub fn state(&self, name: &str) -> Option<&SelectorState> {
        self.states.iter().find(|s| s.name == name)
    }

    /// State entered when the selector parameter holds `value`.
    pub fn select(&self, value: i32) -> Option<&SelectorState> {
        self.any_state_transitions
            .iter()
            .find(|t| t.conditions.iter().all(|c| c.holds(value)))
            .and_then(|t| self.state(&t.destination))
    }
}

/// Any generated artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Artifact {
    Sprite(GeneratedSprite),
    Timeline(GeneratedTimeline),
    Selector(SelectorMachine),
}

impl Artifact {
    pub fn kind(&self) -> ArtifactKind {
        match self {
            Artifact::Sprite(_) => ArtifactKind::Sprite,
            Artifact::Timeline(_) => ArtifactKind::Timeline,
            Artifact::Selector(_) => ArtifactKind::Selector,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Artifact::Sprite(s) => &s.name,
            Artifact::Timeline(t) => &t.name,
            Artifact::Selector(m) => &m.name,
        }
    }

    pub fn key(&self) -> ArtifactKey {
        ArtifactKey::new(self.kind(), self.name())
    }

    pub fn as_sprite(&self) -> Option<&GeneratedSprite> {
        match self {
            Artifact::Sprite(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_timeline(&self) -> Option<&GeneratedTimeline> {
        match self {
            Artifact::Timeline(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_selector(&self) -> Option<&SelectorMachine> {
        match self {
            Artifact::Selector(m) => Some(m),
            _ => None,
        }
    }
}

impl From<GeneratedSprite> for Artifact {
    fn from(sprite: GeneratedSprite) -> Self {
        Artifact::Sprite(sprite)
    }
}

impl From<GeneratedTimeline> for Artifact {
    fn from(timeline: GeneratedTimeline) -> Self {
        Artifact::Timeline(timeline)
    }
}

impl From<SelectorMachine> for Artifact {
    fn from(machine: SelectorMachine) -> Self {
        Artifact::Selector(machine)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timeline() -> GeneratedTimeline {
        GeneratedTimeline {
            name: "Walk".to_string(),
            frame_rate: 60,
            loop_time: true,
            duration: 0.25,
            keyframes: vec![
                Keyframe { time: 0.0, sprite: "Walk#1".to_string() },
                Keyframe { time: 0.1, sprite: "Walk#2".to_string() },
            ],
        }
    }

    #[test]
    fn test_stable_names() {
        assert_eq!(sprite_name("Walk", 0), "Walk#1");
        assert_eq!(sprite_name("Walk", 9), "Walk#10");
        assert_eq!(state_name("Walk"), "Walk State");
        assert_eq!(transition_name("Walk"), "Walk Transition");
    }

    #[test]
    fn test_artifact_key() {
        let artifact = Artifact::from(timeline());
        assert_eq!(artifact.kind(), ArtifactKind::Timeline);
        assert_eq!(artifact.key(), ArtifactKey::new(ArtifactKind::Timeline, "Walk"));
        assert_eq!(artifact.key().to_string(), "timeline 'Walk'");
    }

    #[test]
    fn test_sprite_at_wraps() {
        let t = timeline();
        assert_eq!(t.sprite_at(0.0), Some("Walk#1"));
        assert_eq!(t.sprite_at(0.05), Some("Walk#1"));
        assert_eq!(t.sprite_at(0.1), Some("Walk#2"));
        assert_eq!(t.sprite_at(0.3), Some("Walk#1"));
    }

    #[test]
    fn test_mesh_type_serde() {
        assert_eq!(serde_json::to_string(&MeshType::FullRect).unwrap(), "\"full-rect\"");
        let parsed: MeshType = serde_json::from_str("\"FullRect\"").unwrap();
        assert_eq!(parsed, MeshType::FullRect);
    }

    #[test]
    fn test_artifact_json_tagged() {
        let json = serde_json::to_value(Artifact::from(timeline())).unwrap();
        assert_eq!(json["kind"], "timeline");
        assert_eq!(json["frameRate"], 60);
        let back: Artifact = serde_json::from_value(json).unwrap();
        assert_eq!(back, Artifact::from(timeline()));
    }
}
