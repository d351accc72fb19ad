//! Artifact synthesis
//!
//! Turns a parsed document into sprites, timelines and the selector. A
//! pattern is built entirely or not at all: if any of its frames cannot be
//! sliced, every issue of the pattern is collected into one
//! [`PatternFailure`] and the pattern produces no sprites and no timeline.
//! Its selector state is still emitted, without a motion, so parameter
//! values keep pointing at the same patterns. Reconciliation binds that state
//! to the pattern's stored timeline if there is one.

pub mod selector;
pub mod sprite;
pub mod timeline;

pub use selector::{state_position, synthesize_selector};
pub use sprite::{check_frame, frame_pivot, frame_rect, synthesize_sprite};
pub use timeline::synthesize_timeline;

use crate::config::{ImportSettings, ValidateConfig, ValidationLevel};
use crate::models::{
    AnimationDocument, Artifact, ArtifactKey, ArtifactKind, GeneratedSprite, GeneratedTimeline,
    SelectorMachine,
};
use crate::resolve::{AssetIndex, TextureResolver};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// Fatal synthesis error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum SynthError {
    /// Two patterns share a name, so their artifacts would share names too
    #[error("pattern '{name}' is declared more than once (patterns {first} and {second})")]
    DuplicatePattern { name: String, first: usize, second: usize },
}

/// Why a frame could not be sliced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum FrameIssueKind {
    #[error("image '{reference}' not found")]
    UnresolvedImage { reference: String },
    #[error("size {width}x{height} is not positive")]
    DegenerateSize { width: i32, height: i32 },
    #[error("delay {delay} is negative")]
    NegativeDelay { delay: i32 },
    #[error("rect ({x}, {y}, {width}x{height}) lies outside {image} ({image_width}x{image_height})")]
    OutOfBounds {
        x: i64,
        y: i64,
        width: i32,
        height: i32,
        image: String,
        image_width: u32,
        image_height: u32,
    },
}

/// An issue with one frame of a pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameIssue {
    /// 1-based frame index within the pattern
    pub frame: usize,
    pub kind: FrameIssueKind,
}

impl fmt::Display for FrameIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "frame {}: {}", self.frame, self.kind)
    }
}

/// A pattern that plays nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyPattern {
    NoFrames,
    ZeroDuration,
}

impl fmt::Display for EmptyPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmptyPattern::NoFrames => write!(f, "has no frames"),
            EmptyPattern::ZeroDuration => write!(f, "has a total delay of zero"),
        }
    }
}

/// Why a pattern was not built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureCause {
    Frames(Vec<FrameIssue>),
    Empty(EmptyPattern),
}

/// A pattern that was not built in this run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternFailure {
    pub pattern: String,
    /// 0-based index in the document, also the selector value
    pub index: usize,
    pub cause: FailureCause,
}

impl PatternFailure {
    pub fn issues(&self) -> &[FrameIssue] {
        match &self.cause {
            FailureCause::Frames(issues) => issues,
            FailureCause::Empty(_) => &[],
        }
    }
}

impl fmt::Display for PatternFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.cause {
            FailureCause::Empty(empty) => write!(f, "pattern '{}' {}", self.pattern, empty),
            FailureCause::Frames(issues) => {
                write!(f, "pattern '{}' failed:", self.pattern)?;
                for issue in issues {
                    write!(f, "\n  {}", issue)?;
                }
                Ok(())
            }
        }
    }
}

/// A pattern that was built but plays nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternWarning {
    pub pattern: String,
    pub index: usize,
    pub empty: EmptyPattern,
}

impl fmt::Display for PatternWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pattern '{}' {}", self.pattern, self.empty)
    }
}

/// Everything one synthesis run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesisOutput {
    pub sprites: Vec<GeneratedSprite>,
    pub timelines: Vec<GeneratedTimeline>,
    pub selector: SelectorMachine,
    pub failures: Vec<PatternFailure>,
    pub warnings: Vec<PatternWarning>,
}

impl SynthesisOutput {
    /// All artifacts: sprites, then timelines, then the selector.
    pub fn artifacts(&self) -> Vec<Artifact> {
        self.sprites
            .iter()
            .cloned()
            .map(Artifact::from)
            .chain(self.timelines.iter().cloned().map(Artifact::from))
            .chain(std::iter::once(Artifact::from(self.selector.clone())))
            .collect()
    }

    /// Whether a previously stored artifact belongs to a pattern that failed
    /// in this run and must be left as it is.
    pub fn is_retained(&self, key: &ArtifactKey) -> bool {
        let owner = match key.kind {
            ArtifactKind::Timeline => key.name.as_str(),
            ArtifactKind::Sprite => match key.name.rsplit_once('#') {
                Some((pattern, index))
                    if !index.is_empty() && index.bytes().all(|b| b.is_ascii_digit()) =>
                {
                    pattern
                }
                _ => return false,
            },
            ArtifactKind::Selector => return false,
        };
        self.failures.iter().any(|f| f.pattern == owner)
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty() && self.warnings.is_empty()
    }
}

/// Runs the sprite, timeline and selector synthesizers over a document.
pub struct Synthesizer<'a> {
    settings: &'a ImportSettings,
    validate: &'a ValidateConfig,
}

impl<'a> Synthesizer<'a> {
    pub fn new(settings: &'a ImportSettings, validate: &'a ValidateConfig) -> Self {
        Self { settings, validate }
    }

    /// Synthesize all artifacts of `doc`, resolving images from `scope`.
    pub fn run<I: AssetIndex>(
        &self,
        doc: &AnimationDocument,
        scope: &str,
        resolver: &mut TextureResolver<I>,
    ) -> Result<SynthesisOutput, SynthError> {
        check_unique_names(doc)?;

        let mut sprites = Vec::new();
        let mut timelines = Vec::new();
        let mut motions: Vec<Option<String>> = Vec::with_capacity(doc.patterns.len());
        let mut failures = Vec::new();
        let mut warnings = Vec::new();

        for (index, pattern) in doc.patterns.iter().enumerate() {
            let mut pattern_sprites = Vec::with_capacity(pattern.frames.len());
            let mut issues = Vec::new();

            for (frame_index, frame) in pattern.frames.iter().enumerate() {
                let image = resolver.resolve(&frame.filename, scope);
                match synthesize_sprite(&pattern.name, frame_index, frame, image.as_ref(), self.settings)
                {
                    Ok(sprite) => pattern_sprites.push(sprite),
                    Err(frame_issues) => issues.extend(frame_issues),
                }
            }

            if !issues.is_empty() {
                let failure = PatternFailure {
                    pattern: pattern.name.clone(),
                    index,
                    cause: FailureCause::Frames(issues),
                };
                log::warn!("{}", failure);
                failures.push(failure);
                motions.push(None);
                continue;
            }

            let empty = if pattern.frames.is_empty() {
                Some(EmptyPattern::NoFrames)
            } else if pattern.total_delay_ms() == 0 {
                Some(EmptyPattern::ZeroDuration)
            } else {
                None
            };

            if let Some(empty) = empty {
                match self.validate.empty_patterns {
                    ValidationLevel::Error => {
                        let failure = PatternFailure {
                            pattern: pattern.name.clone(),
                            index,
                            cause: FailureCause::Empty(empty),
                        };
                        log::warn!("{}", failure);
                        failures.push(failure);
                        motions.push(None);
                        continue;
                    }
                    ValidationLevel::Warn => {
                        let warning = PatternWarning { pattern: pattern.name.clone(), index, empty };
                        log::warn!("{}", warning);
                        warnings.push(warning);
                    }
                    ValidationLevel::Ignore => {}
                }
            }

            let timeline = synthesize_timeline(pattern, self.settings.frame_rate);
            motions.push(Some(timeline.name.clone()));
            timelines.push(timeline);
            sprites.extend(pattern_sprites);
        }

        let selector = synthesize_selector(
            doc.patterns.iter().zip(&motions).map(|(p, m)| (p.name.as_str(), m.as_deref())),
        );

        Ok(SynthesisOutput { sprites, timelines, selector, failures, warnings })
    }
}

fn check_unique_names(doc: &AnimationDocument) -> Result<(), SynthError> {
    let mut seen: HashMap<&str, usize> = HashMap::new();
    for (index, pattern) in doc.patterns.iter().enumerate() {
        if let Some(&first) = seen.get(pattern.name.as_str()) {
            return Err(SynthError::DuplicatePattern {
                name: pattern.name.clone(),
                first: first + 1,
                second: index + 1,
            });
        }
        seen.insert(&pattern.name, index);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Frame, Pattern};
    use crate::resolve::ImageHandle;

    struct OneImage;

    impl AssetIndex for OneImage {
        fn find(&self, filter: &str, _scope: &str) -> Vec<ImageHandle> {
            if filter == "hero" {
                vec![ImageHandle::new("hero.png", 64, 32)]
            } else {
                Vec::new()
            }
        }
    }

    fn frame(filename: &str, src_x: i32, delay: i32) -> Frame {
        Frame { filename: filename.to_string(), src_x, width: 32, height: 32, delay, ..Default::default() }
    }

    fn doc(patterns: Vec<Pattern>) -> AnimationDocument {
        AnimationDocument { version: 1, patterns }
    }

    fn run(doc: &AnimationDocument, validate: &ValidateConfig) -> Result<SynthesisOutput, SynthError> {
        let settings = ImportSettings::default();
        let mut resolver = TextureResolver::new(OneImage);
        Synthesizer::new(&settings, validate).run(doc, "", &mut resolver)
    }

    #[test]
    fn test_walk_example() {
        let doc = doc(vec![Pattern {
            name: "Walk".to_string(),
            frames: vec![frame("hero.bmp", 0, 100), frame("hero.bmp", 32, 150)],
        }]);
        let output = run(&doc, &ValidateConfig::default()).unwrap();

        let names: Vec<&str> = output.sprites.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Walk#1", "Walk#2"]);
        assert_eq!(output.timelines.len(), 1);
        assert_eq!(output.timelines[0].duration, 0.25);
        assert_eq!(output.timelines[0].keyframes[1].time, 0.1);
        assert_eq!(output.selector.states[0].motion.as_deref(), Some("Walk"));
        assert!(output.is_complete());
        assert_eq!(output.artifacts().len(), 4);
    }

    #[test]
    fn test_failed_pattern_collects_all_issues() {
        let doc = doc(vec![
            Pattern {
                name: "Broken".to_string(),
                frames: vec![frame("missing.bmp", 0, 100), frame("hero.bmp", 0, -5), frame("hero.bmp", 0, 100)],
            },
            Pattern { name: "Walk".to_string(), frames: vec![frame("hero.bmp", 0, 100)] },
        ]);
        let output = run(&doc, &ValidateConfig::default()).unwrap();

        assert_eq!(output.failures.len(), 1);
        let failure = &output.failures[0];
        assert_eq!(failure.pattern, "Broken");
        assert_eq!(failure.index, 0);
        let frames: Vec<usize> = failure.issues().iter().map(|i| i.frame).collect();
        assert_eq!(frames, vec![1, 2]);

        let names: Vec<&str> = output.sprites.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Walk#1"]);
        assert_eq!(output.timelines.len(), 1);

        assert_eq!(output.selector.states.len(), 2);
        assert!(output.selector.states[0].motion.is_none());
        assert_eq!(output.selector.select(1).unwrap().motion.as_deref(), Some("Walk"));
        assert!(!output.is_complete());
    }

    #[test]
    fn test_duplicate_pattern_names() {
        let doc = doc(vec![Pattern::new("Walk"), Pattern::new("Run"), Pattern::new("Walk")]);
        let err = run(&doc, &ValidateConfig::default()).unwrap_err();
        assert_eq!(err, SynthError::DuplicatePattern { name: "Walk".to_string(), first: 1, second: 3 });
    }

    #[test]
    fn test_empty_pattern_warns_by_default() {
        let doc = doc(vec![Pattern::new("Idle")]);
        let output = run(&doc, &ValidateConfig::default()).unwrap();

        assert_eq!(output.warnings.len(), 1);
        assert_eq!(output.warnings[0].empty, EmptyPattern::NoFrames);
        assert_eq!(output.timelines.len(), 1);
        assert!(output.timelines[0].keyframes.is_empty());
        assert!(output.failures.is_empty());
    }

    #[test]
    fn test_zero_duration_as_error() {
        let doc = doc(vec![Pattern { name: "Pose".to_string(), frames: vec![frame("hero.bmp", 0, 0)] }]);
        let validate = ValidateConfig { empty_patterns: ValidationLevel::Error, ..Default::default() };
        let output = run(&doc, &validate).unwrap();

        assert_eq!(output.failures.len(), 1);
        assert_eq!(output.failures[0].cause, FailureCause::Empty(EmptyPattern::ZeroDuration));
        assert!(output.sprites.is_empty());
        assert!(output.timelines.is_empty());
    }

    #[test]
    fn test_empty_pattern_ignored() {
        let doc = doc(vec![Pattern::new("Idle")]);
        let validate = ValidateConfig { empty_patterns: ValidationLevel::Ignore, ..Default::default() };
        let output = run(&doc, &validate).unwrap();
        assert!(output.is_complete());
        assert_eq!(output.timelines.len(), 1);
    }

    #[test]
    fn test_is_retained() {
        let doc = doc(vec![Pattern { name: "A#1".to_string(), frames: vec![frame("missing.bmp", 0, 10)] }]);
        let output = run(&doc, &ValidateConfig::default()).unwrap();

        assert!(output.is_retained(&ArtifactKey::new(ArtifactKind::Sprite, "A#1#7")));
        assert!(output.is_retained(&ArtifactKey::new(ArtifactKind::Timeline, "A#1")));
        assert!(!output.is_retained(&ArtifactKey::new(ArtifactKind::Sprite, "A#1")));
        assert!(!output.is_retained(&ArtifactKey::new(ArtifactKind::Sprite, "A#1#x")));
        assert!(!output.is_retained(&ArtifactKey::new(ArtifactKind::Selector, "Controller")));
    }

    #[test]
    fn test_failure_display() {
        let failure = PatternFailure {
            pattern: "Walk".to_string(),
            index: 0,
            cause: FailureCause::Frames(vec![FrameIssue {
                frame: 2,
                kind: FrameIssueKind::NegativeDelay { delay: -1 },
            }]),
        };
        assert_eq!(failure.to_string(), "pattern 'Walk' failed:\n  frame 2: delay -1 is negative");
    }
}
