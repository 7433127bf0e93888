//! Rendering module
//!
//! `shapes` turns the world into a backend-agnostic draw list; the Canvas2D
//! backend paints it in the browser.

#[cfg(target_arch = "wasm32")]
pub mod canvas;
pub mod shapes;

#[cfg(target_arch = "wasm32")]
pub use canvas::CanvasRenderer;
pub use shapes::{DrawRect, frame_shapes, visible_columns};
