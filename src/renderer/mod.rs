//! 2D rendering module
//!
//! Drawing goes through the [`Surface`] trait, a small subset of a canvas 2D
//! context. The browser build draws on an HTML canvas; tests and the native
//! binary draw into a [`RecordingSurface`].

pub mod recording;
pub mod scene;
pub mod shapes;

#[cfg(target_arch = "wasm32")]
pub mod canvas;

pub use recording::{DrawCommand, RecordingSurface};
pub use scene::render;

#[cfg(target_arch = "wasm32")]
pub use canvas::CanvasSurface;

use glam::Vec2;

/// RGBA color with 8-bit channels and a float alpha, like CSS `rgba()`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Color {
    pub const fn rgba(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self {
            a: a.clamp(0.0, 1.0),
            ..self
        }
    }

    /// CSS color string
    pub fn to_css(&self) -> String {
        format!("rgba({},{},{},{:.3})", self.r, self.g, self.b, self.a)
    }
}

/// Colors for scene elements
pub mod colors {
    use super::Color;

    pub const KNOT: Color = Color::rgb(170, 170, 170);
    pub const RING: Color = Color::rgb(56, 189, 248); // sky-400
    pub const PARTICLE: Color = Color::rgb(255, 255, 255);
    pub const STAR_DISTURB: Color = Color::rgb(250, 204, 21); // yellow-400
    pub const STAR_STOP: Color = Color::rgb(248, 113, 113); // red-400
    pub const STAR_EXPAND: Color = Color::rgb(74, 222, 128); // green-400
    pub const STAR_SCORE: Color = Color::rgb(192, 132, 252); // purple-400
    pub const STAR_DETONATION: Color = Color::rgb(251, 146, 60); // orange-400
}

/// One element of a [`Path`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathSegment {
    MoveTo(Vec2),
    LineTo(Vec2),
    CubicTo { c1: Vec2, c2: Vec2, to: Vec2 },
    /// Full circle as its own subpath
    Circle { center: Vec2, radius: f32 },
    Close,
}

/// Vector path in surface coordinates
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Path {
    segments: Vec<PathSegment>,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn move_to(&mut self, to: Vec2) -> &mut Self {
        self.segments.push(PathSegment::MoveTo(to));
        self
    }

    pub fn line_to(&mut self, to: Vec2) -> &mut Self {
        self.segments.push(PathSegment::LineTo(to));
        self
    }

    pub fn cubic_to(&mut self, c1: Vec2, c2: Vec2, to: Vec2) -> &mut Self {
        self.segments.push(PathSegment::CubicTo { c1, c2, to });
        self
    }

    pub fn circle(&mut self, center: Vec2, radius: f32) -> &mut Self {
        self.segments.push(PathSegment::Circle { center, radius });
        self
    }

    pub fn close(&mut self) -> &mut Self {
        self.segments.push(PathSegment::Close);
        self
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

/// Fill style
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Paint {
    Solid(Color),
    /// Gradient from `inner` at `center` to `outer` at `radius`
    Radial {
        center: Vec2,
        radius: f32,
        inner: Color,
        outer: Color,
    },
}

/// Stroke style
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub color: Color,
    pub width: f32,
}

/// A raster target the scene can be drawn on
pub trait Surface {
    /// Current pixel size, `None` once the surface is gone
    fn size(&self) -> Option<Vec2>;
    fn clear(&mut self, origin: Vec2, size: Vec2);
    fn fill(&mut self, path: &Path, paint: &Paint);
    fn stroke(&mut self, path: &Path, stroke: &Stroke);
}
