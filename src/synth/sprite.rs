//! Sprite slicing for individual frames

use super::{FrameIssue, FrameIssueKind};
use crate::config::ImportSettings;
use crate::models::{sprite_name, Frame, GeneratedSprite, SpriteRect, Vec2};
use crate::resolve::ImageHandle;

/// Pixel rectangle of a frame inside an image of `image_height` pixels.
///
/// The authoring tool counts `src_y` from the other edge of the image, so the
/// row is flipped. Computed in `i64`; callers check bounds before narrowing.
pub fn frame_rect(frame: &Frame, image_height: u32) -> (i64, i64, i64, i64) {
    let y = i64::from(image_height) - i64::from(frame.src_y) - i64::from(frame.height);
    (i64::from(frame.src_x), y, i64::from(frame.width), i64::from(frame.height))
}

/// Normalized pivot that keeps frames of a pattern registered on `anchor`.
///
/// `frame.width` and `frame.height` must be positive.
pub fn frame_pivot(frame: &Frame, anchor: Vec2) -> Vec2 {
    Vec2::new(
        anchor.x - frame.dest_x as f32 / frame.width as f32,
        anchor.y + frame.dest_y as f32 / frame.height as f32,
    )
}

/// Everything wrong with a frame, given the image it resolved to (if any).
pub fn check_frame(frame: &Frame, image: Option<&ImageHandle>) -> Vec<FrameIssueKind> {
    let mut issues = Vec::new();

    if image.is_none() {
        issues.push(FrameIssueKind::UnresolvedImage { reference: frame.filename.clone() });
    }
    if frame.width <= 0 || frame.height <= 0 {
        issues.push(FrameIssueKind::DegenerateSize { width: frame.width, height: frame.height });
    }
    if frame.delay < 0 {
        issues.push(FrameIssueKind::NegativeDelay { delay: frame.delay });
    }

    if let Some(image) = image {
        if frame.width > 0 && frame.height > 0 {
            let (x, y, w, h) = frame_rect(frame, image.height);
            let in_bounds = x >= 0
                && y >= 0
                && x + w <= i64::from(image.width)
                && y + h <= i64::from(image.height);
            if !in_bounds {
                issues.push(FrameIssueKind::OutOfBounds {
                    x,
                    y,
                    width: frame.width,
                    height: frame.height,
                    image: image.path.clone(),
                    image_width: image.width,
                    image_height: image.height,
                });
            }
        }
    }

    issues
}

/// Build the sprite for frame `index` (0-based) of `pattern`.
///
/// Returns the frame's issues instead when it cannot be sliced.
pub fn synthesize_sprite(
    pattern: &str,
    index: usize,
    frame: &Frame,
    image: Option<&ImageHandle>,
    settings: &ImportSettings,
) -> Result<GeneratedSprite, Vec<FrameIssue>> {
    let kinds = check_frame(frame, image);
    let image = match image {
        Some(image) if kinds.is_empty() => image,
        _ => {
            return Err(kinds.into_iter().map(|kind| FrameIssue { frame: index + 1, kind }).collect())
        }
    };

    let (x, y, _, _) = frame_rect(frame, image.height);
    Ok(GeneratedSprite {
        name: sprite_name(pattern, index),
        texture: image.path.clone(),
        rect: SpriteRect {
            // in bounds, so both fit the image dimensions
            x: x as i32,
            y: y as i32,
            width: frame.width,
            height: frame.height,
        },
        pivot: frame_pivot(frame, settings.anchor()),
        pixels_per_unit: settings.pixels_per_unit,
        extrude: settings.extrude,
        mesh_type: settings.mesh_type,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MeshType;

    fn frame(src_x: i32, src_y: i32, width: i32, height: i32) -> Frame {
        Frame { filename: "hero.bmp".to_string(), src_x, src_y, width, height, delay: 100, ..Default::default() }
    }

    fn image() -> ImageHandle {
        ImageHandle::new("chars/hero.png", 128, 64)
    }

    #[test]
    fn test_rect_flips_rows() {
        assert_eq!(frame_rect(&frame(32, 0, 32, 16), 64), (32, 48, 32, 16));
        assert_eq!(frame_rect(&frame(0, 48, 32, 16), 64), (0, 0, 32, 16));
    }

    #[test]
    fn test_pivot_centered_without_offset() {
        let anchor = Vec2::new(0.5, 0.5);
        for (w, h) in [(1, 1), (32, 48), (7, 300)] {
            assert_eq!(frame_pivot(&frame(0, 0, w, h), anchor), anchor);
        }
    }

    #[test]
    fn test_pivot_with_offset() {
        let f = Frame { dest_x: 8, dest_y: -16, ..frame(0, 0, 32, 32) };
        assert_eq!(frame_pivot(&f, Vec2::new(0.5, 0.5)), Vec2::new(0.25, 0.0));
    }

    #[test]
    fn test_synthesize_sprite() {
        let settings = ImportSettings {
            pixels_per_unit: 16.0,
            extrude: 2,
            mesh_type: MeshType::FullRect,
            ..Default::default()
        };
        let sprite = synthesize_sprite("Walk", 1, &frame(32, 0, 32, 32), Some(&image()), &settings).unwrap();

        assert_eq!(sprite.name, "Walk#2");
        assert_eq!(sprite.texture, "chars/hero.png");
        assert_eq!(sprite.rect, SpriteRect { x: 32, y: 32, width: 32, height: 32 });
        assert_eq!(sprite.pivot, Vec2::new(0.5, 0.5));
        assert_eq!(sprite.pixels_per_unit, 16.0);
        assert_eq!(sprite.extrude, 2);
        assert_eq!(sprite.mesh_type, MeshType::FullRect);
    }

    #[test]
    fn test_unresolved_image() {
        let issues = synthesize_sprite("Walk", 0, &frame(0, 0, 8, 8), None, &ImportSettings::default())
            .unwrap_err();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].frame, 1);
        assert!(matches!(issues[0].kind, FrameIssueKind::UnresolvedImage { ref reference } if reference == "hero.bmp"));
    }

    #[test]
    fn test_degenerate_size() {
        let issues = check_frame(&frame(0, 0, 0, 8), Some(&image()));
        assert_eq!(issues, vec![FrameIssueKind::DegenerateSize { width: 0, height: 8 }]);
    }

    #[test]
    fn test_negative_delay() {
        let f = Frame { delay: -1, ..frame(0, 0, 8, 8) };
        assert_eq!(check_frame(&f, Some(&image())), vec![FrameIssueKind::NegativeDelay { delay: -1 }]);
    }

    #[test]
    fn test_out_of_bounds() {
        let issues = check_frame(&frame(120, 0, 16, 16), Some(&image()));
        assert!(matches!(issues.as_slice(), [FrameIssueKind::OutOfBounds { x: 120, .. }]));

        let issues = check_frame(&frame(0, 60, 16, 16), Some(&image()));
        assert!(matches!(issues.as_slice(), [FrameIssueKind::OutOfBounds { y: -12, .. }]));
    }

    #[test]
    fn test_whole_image_is_in_bounds() {
        assert!(check_frame(&frame(0, 0, 128, 64), Some(&image())).is_empty());
    }
}
