//! HTML canvas surface (browser only)

use glam::Vec2;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use super::{Paint, Path, PathSegment, Stroke, Surface};

/// Surface backed by a canvas 2D context
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
    /// Grab the 2D context of `canvas`; `None` if the browser refuses one
    pub fn new(canvas: HtmlCanvasElement) -> Option<Self> {
        let ctx = canvas
            .get_context("2d")
            .ok()
            .flatten()?
            .dyn_into::<CanvasRenderingContext2d>()
            .ok()?;
        ctx.set_line_cap("round");
        Some(Self { canvas, ctx })
    }

    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    /// Match the backing store to the displayed size
    pub fn fit_to_client(&self) {
        let width = self.canvas.client_width().max(0) as u32;
        let height = self.canvas.client_height().max(0) as u32;
        if self.canvas.width() != width || self.canvas.height() != height {
            self.canvas.set_width(width);
            self.canvas.set_height(height);
            // Resizing resets context state
            self.ctx.set_line_cap("round");
            log::info!("Canvas resized to {}x{}", width, height);
        }
    }

    fn trace(&self, path: &Path) {
        self.ctx.begin_path();
        for segment in path.segments() {
            match *segment {
                PathSegment::MoveTo(p) => self.ctx.move_to(p.x as f64, p.y as f64),
                PathSegment::LineTo(p) => self.ctx.line_to(p.x as f64, p.y as f64),
                PathSegment::CubicTo { c1, c2, to } => self.ctx.bezier_curve_to(
                    c1.x as f64,
                    c1.y as f64,
                    c2.x as f64,
                    c2.y as f64,
                    to.x as f64,
                    to.y as f64,
                ),
                PathSegment::Circle { center, radius } => {
                    self.ctx.move_to((center.x + radius) as f64, center.y as f64);
                    if let Err(e) = self.ctx.arc(
                        center.x as f64,
                        center.y as f64,
                        radius as f64,
                        0.0,
                        std::f64::consts::TAU,
                    ) {
                        log::warn!("arc failed: {:?}", e);
                    }
                }
                PathSegment::Close => self.ctx.close_path(),
            }
        }
    }
}

impl Surface for CanvasSurface {
    fn size(&self) -> Option<Vec2> {
        if !self.canvas.is_connected() {
            return None;
        }
        Some(Vec2::new(self.canvas.width() as f32, self.canvas.height() as f32))
    }

    fn clear(&mut self, origin: Vec2, size: Vec2) {
        self.ctx
            .clear_rect(origin.x as f64, origin.y as f64, size.x as f64, size.y as f64);
    }

    fn fill(&mut self, path: &Path, paint: &Paint) {
        match *paint {
            Paint::Solid(color) => self.ctx.set_fill_style_str(&color.to_css()),
            Paint::Radial {
                center,
                radius,
                inner,
                outer,
            } => {
                let (x, y) = (center.x as f64, center.y as f64);
                let gradient = match self.ctx.create_radial_gradient(x, y, 0.0, x, y, radius as f64) {
                    Ok(gradient) => gradient,
                    Err(e) => {
                        log::warn!("radial gradient failed: {:?}", e);
                        return;
                    }
                };
                let stops = gradient
                    .add_color_stop(0.0, &inner.to_css())
                    .and_then(|_| gradient.add_color_stop(1.0, &outer.to_css()));
                if let Err(e) = stops {
                    log::warn!("gradient stop rejected: {:?}", e);
                    return;
                }
                self.ctx.set_fill_style_canvas_gradient(&gradient);
            }
        }
        self.trace(path);
        self.ctx.fill();
    }

    fn stroke(&mut self, path: &Path, stroke: &Stroke) {
        self.ctx.set_stroke_style_str(&stroke.color.to_css());
        self.ctx.set_line_width(stroke.width as f64);
        self.trace(path);
        self.ctx.stroke();
    }
}
