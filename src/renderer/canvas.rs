//! Canvas2D backend

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use super::shapes::frame_shapes;
use crate::game::FrameRenderer;
use crate::sim::World;

/// Paints the draw list onto a 2D canvas context
pub struct CanvasRenderer {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl CanvasRenderer {
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, JsValue> {
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into::<CanvasRenderingContext2d>()?;
        ctx.set_image_smoothing_enabled(false);
        Ok(Self { canvas, ctx })
    }

    /// Match the backing store to the viewport
    pub fn resize(&mut self, width: f32, height: f32) {
        self.canvas.set_width(width as u32);
        self.canvas.set_height(height as u32);
        // resizing resets context state
        self.ctx.set_image_smoothing_enabled(false);
        log::debug!("Canvas resized to {width}x{height}");
    }

    fn vignette(&self, width: f64, height: f64) -> Result<(), JsValue> {
        let (cx, cy) = (width / 2.0, height / 2.0);
        let gradient = self
            .ctx
            .create_radial_gradient(cx, cy, height * 0.2, cx, cy, width.max(height) * 0.75)?;
        gradient.add_color_stop(0.0, "rgba(0,0,0,0)")?;
        gradient.add_color_stop(1.0, "rgba(0,0,0,0.25)")?;
        self.ctx.set_fill_style_canvas_gradient(&gradient);
        self.ctx.fill_rect(0.0, 0.0, width, height);
        Ok(())
    }
}

impl FrameRenderer for CanvasRenderer {
    fn render(&mut self, world: &World) {
        let (width, height) = (world.viewport.x as f64, world.viewport.y as f64);
        self.ctx.clear_rect(0.0, 0.0, width, height);

        for rect in frame_shapes(world) {
            self.ctx.set_fill_style_str(rect.color);
            self.ctx
                .fill_rect(rect.x as f64, rect.y as f64, rect.w as f64, rect.h as f64);
        }

        if let Err(e) = self.vignette(width, height) {
            log::warn!("Vignette failed: {e:?}");
        }
    }
}
