//! Headless surface that records draw calls

use glam::Vec2;

use super::{Paint, Path, Stroke, Surface};

/// A recorded draw call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear { origin: Vec2, size: Vec2 },
    Fill { path: Path, paint: Paint },
    Stroke { path: Path, stroke: Stroke },
}

/// Surface that keeps every command of the current frame
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    size: Option<Vec2>,
    commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    pub fn new(size: Vec2) -> Self {
        Self {
            size: Some(size),
            commands: Vec::new(),
        }
    }

    pub fn resize(&mut self, size: Vec2) {
        self.size = Some(size);
    }

    /// Simulate the surface being removed from the page
    pub fn detach(&mut self) {
        self.size = None;
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn fill_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Fill { .. }))
            .count()
    }

    pub fn stroke_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Stroke { .. }))
            .count()
    }
}

impl Surface for RecordingSurface {
    fn size(&self) -> Option<Vec2> {
        self.size
    }

    /// A full clear starts a new frame
    fn clear(&mut self, origin: Vec2, size: Vec2) {
        if Some(size) == self.size && origin == Vec2::ZERO {
            self.commands.clear();
        }
        self.commands.push(DrawCommand::Clear { origin, size });
    }

    fn fill(&mut self, path: &Path, paint: &Paint) {
        self.commands.push(DrawCommand::Fill {
            path: path.clone(),
            paint: *paint,
        });
    }

    fn stroke(&mut self, path: &Path, stroke: &Stroke) {
        self.commands.push(DrawCommand::Stroke {
            path: path.clone(),
            stroke: *stroke,
        });
    }
}
