//! Timeline generation for patterns

use crate::models::{sprite_name, GeneratedTimeline, Keyframe, Pattern};

/// Build the looping timeline that plays `pattern`'s sprites in order.
///
/// Keyframe times come from the running millisecond total so that long
/// patterns do not drift.
pub fn synthesize_timeline(pattern: &Pattern, frame_rate: u32) -> GeneratedTimeline {
    let mut elapsed_ms: i64 = 0;
    let mut keyframes = Vec::with_capacity(pattern.frames.len());

    for (index, frame) in pattern.frames.iter().enumerate() {
        keyframes.push(Keyframe {
            time: elapsed_ms as f64 / 1000.0,
            sprite: sprite_name(&pattern.name, index),
        });
        elapsed_ms += i64::from(frame.delay);
    }

    GeneratedTimeline {
        name: pattern.name.clone(),
        frame_rate,
        loop_time: true,
        duration: elapsed_ms as f64 / 1000.0,
        keyframes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Frame;

    fn pattern(delays: &[i32]) -> Pattern {
        Pattern {
            name: "Walk".to_string(),
            frames: delays.iter().map(|&delay| Frame { delay, ..Default::default() }).collect(),
        }
    }

    #[test]
    fn test_keyframe_times() {
        let timeline = synthesize_timeline(&pattern(&[100, 150]), 60);

        assert_eq!(timeline.name, "Walk");
        assert_eq!(timeline.frame_rate, 60);
        assert!(timeline.loop_time);
        assert_eq!(timeline.duration, 0.25);
        assert_eq!(
            timeline.keyframes,
            vec![
                Keyframe { time: 0.0, sprite: "Walk#1".to_string() },
                Keyframe { time: 0.1, sprite: "Walk#2".to_string() },
            ]
        );
    }

    #[test]
    fn test_empty_pattern() {
        let timeline = synthesize_timeline(&pattern(&[]), 30);
        assert!(timeline.keyframes.is_empty());
        assert_eq!(timeline.duration, 0.0);
        assert!(timeline.loop_time);
    }

    #[test]
    fn test_no_drift() {
        let timeline = synthesize_timeline(&pattern(&[1; 1000]), 60);
        assert_eq!(timeline.keyframes[999].time, 0.999);
        assert_eq!(timeline.duration, 1.0);
    }

    #[test]
    fn test_zero_delays_share_time() {
        let timeline = synthesize_timeline(&pattern(&[0, 0, 50]), 60);
        let times: Vec<f64> = timeline.keyframes.iter().map(|k| k.time).collect();
        assert_eq!(times, vec![0.0, 0.0, 0.0]);
        assert_eq!(timeline.duration, 0.05);
    }
}
