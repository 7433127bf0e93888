//! Platform abstraction layer
//!
//! Browser-independent pieces of host integration:
//! - Key code to intent mapping
//! - Viewport fitting

use crate::sim::TickInput;

/// Smallest canvas width in CSS pixels
pub const MIN_VIEWPORT_WIDTH: f32 = 480.0;
/// Smallest canvas height in CSS pixels
pub const MIN_VIEWPORT_HEIGHT: f32 = 270.0;
/// Widest the canvas grows before the window margin is taken off
pub const MAX_VIEWPORT_WIDTH: f32 = 1200.0;
/// Horizontal page margin around the canvas
pub const VIEWPORT_MARGIN: f32 = 32.0;

/// What a key does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Left,
    Right,
    Jump,
    Run,
    Pause,
    Restart,
}

impl Intent {
    /// Map a `KeyboardEvent.code` to an intent
    pub fn from_code(code: &str) -> Option<Self> {
        Some(match code {
            "ArrowLeft" | "KeyA" => Intent::Left,
            "ArrowRight" | "KeyD" => Intent::Right,
            "Space" | "KeyZ" => Intent::Jump,
            "ShiftLeft" | "ShiftRight" => Intent::Run,
            "KeyP" => Intent::Pause,
            "KeyR" => Intent::Restart,
            _ => return None,
        })
    }
}

/// Apply a key transition to the held input
///
/// Auto-repeat events are ignored. Held intents follow the key state; pause
/// fires on key down only. Restart is returned to the caller (also on key
/// down only) since it needs the frame scheduler.
pub fn apply_key(input: &mut TickInput, code: &str, down: bool, repeat: bool) -> Option<Intent> {
    let intent = Intent::from_code(code)?;
    if repeat {
        return None;
    }
    match intent {
        Intent::Left => input.left = down,
        Intent::Right => input.right = down,
        Intent::Jump => input.jump = down,
        Intent::Run => input.run = down,
        Intent::Pause | Intent::Restart if !down => return None,
        Intent::Pause => input.pause = true,
        Intent::Restart => {}
    }
    Some(intent)
}

/// Canvas size (CSS pixels) for a window `window_width` wide, kept at 16:9
pub fn fit_viewport(window_width: f32) -> (f32, f32) {
    let width = (window_width.min(MAX_VIEWPORT_WIDTH) - VIEWPORT_MARGIN).max(MIN_VIEWPORT_WIDTH);
    let height = (width * 9.0 / 16.0).round().max(MIN_VIEWPORT_HEIGHT);
    (width, height)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_map() {
        assert_eq!(Intent::from_code("KeyA"), Some(Intent::Left));
        assert_eq!(Intent::from_code("ArrowRight"), Some(Intent::Right));
        assert_eq!(Intent::from_code("KeyZ"), Some(Intent::Jump));
        assert_eq!(Intent::from_code("ShiftRight"), Some(Intent::Run));
        assert_eq!(Intent::from_code("KeyP"), Some(Intent::Pause));
        assert_eq!(Intent::from_code("KeyR"), Some(Intent::Restart));
        assert_eq!(Intent::from_code("KeyQ"), None);
    }

    #[test]
    fn test_held_keys_follow_state() {
        let mut input = TickInput::default();
        apply_key(&mut input, "ArrowLeft", true, false);
        apply_key(&mut input, "Space", true, false);
        assert!(input.left && input.jump);

        apply_key(&mut input, "ArrowLeft", false, false);
        assert!(!input.left);
        assert!(input.jump);
    }

    #[test]
    fn test_repeat_is_ignored() {
        let mut input = TickInput::default();
        assert_eq!(apply_key(&mut input, "KeyP", true, true), None);
        assert!(!input.pause);
        assert_eq!(apply_key(&mut input, "KeyD", true, true), None);
        assert!(!input.right);
    }

    #[test]
    fn test_pause_and_restart_fire_on_press() {
        let mut input = TickInput::default();
        assert_eq!(apply_key(&mut input, "KeyP", true, false), Some(Intent::Pause));
        assert!(input.pause);

        input.pause = false;
        assert_eq!(apply_key(&mut input, "KeyP", false, false), None);
        assert!(!input.pause);

        assert_eq!(apply_key(&mut input, "KeyR", true, false), Some(Intent::Restart));
        assert_eq!(apply_key(&mut input, "KeyR", false, false), None);
        assert!(!input.restart);
    }

    #[test]
    fn test_fit_viewport() {
        assert_eq!(fit_viewport(1920.0), (1168.0, 657.0));
        assert_eq!(fit_viewport(1000.0), (968.0, 545.0));
        assert_eq!(fit_viewport(320.0), (480.0, 270.0));
    }
}
