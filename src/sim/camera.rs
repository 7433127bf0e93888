//! Horizontal camera follow

use crate::consts::SCALE;

/// Fraction of the viewport kept to the left of the player
pub const CAMERA_LEAD: f32 = 0.4;

/// Scroll offset (screen pixels) keeping the player in view
///
/// `level_pixel_width` is in screen pixels. The result never reveals space
/// left of column 0 or past the last column; a level narrower than the
/// viewport pins the camera at 0.
pub fn follow(player_x: f32, viewport_width: f32, level_pixel_width: f32) -> f32 {
    let max_offset = level_pixel_width - viewport_width;
    (player_x * SCALE - viewport_width * CAMERA_LEAD).min(max_offset).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_follow_clamps_left() {
        assert_eq!(follow(10.0, 960.0, 12480.0), 0.0);
    }

    #[test]
    fn test_follow_tracks_player() {
        // 400 * 3 - 960 * 0.4 = 816
        assert!((follow(400.0, 960.0, 12480.0) - 816.0).abs() < 1e-3);
    }

    #[test]
    fn test_follow_clamps_right() {
        assert_eq!(follow(4150.0, 960.0, 12480.0), 12480.0 - 960.0);
    }

    #[test]
    fn test_narrow_level_pins_to_zero() {
        assert_eq!(follow(100.0, 960.0, 480.0), 0.0);
    }
}
