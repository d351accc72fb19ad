//! Data models for source documents and generated artifacts

mod artifact;
mod document;

pub use artifact::{
    sprite_name, state_name, transition_name, Artifact, ArtifactId, ArtifactKey, ArtifactKind,
    Condition, ConditionMode, GeneratedSprite, GeneratedTimeline, Keyframe, MeshType,
    ParameterType, SelectorMachine, SelectorParameter, SelectorState, SelectorTransition,
    SpriteRect, Vec2, SELECTOR_LAYER, SELECTOR_NAME, SELECTOR_PARAMETER,
};
pub use document::{AnimationDocument, Frame, Key, Pattern};
