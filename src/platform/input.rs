//! Pointer input normalization
//!
//! Mouse and touch events are folded into a single pointer stream. Only the
//! latest sample matters: events arriving between two frames overwrite each
//! other, except that a press change is kept until the next frame reads it.
//! A press released before any frame saw it is delivered as a press, and the
//! release follows on the next frame.

use glam::Vec2;

/// Where the last pointer event came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PointerSource {
    #[default]
    Mouse,
    Touch,
}

/// One pointer update. `pressed` is `None` for plain moves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSample {
    pub position: Vec2,
    pub pressed: Option<bool>,
}

/// Collects raw input events between frames
#[derive(Debug, Clone, Default)]
pub struct PointerTracker {
    position: Vec2,
    pressed: bool,
    source: PointerSource,
    pending: Option<PointerSample>,
    /// Release held back for one frame after a short tap
    release: Option<Vec2>,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mouse_down(&mut self, position: Vec2) {
        self.record(PointerSource::Mouse, position, Some(true));
    }

    pub fn mouse_move(&mut self, position: Vec2) {
        self.record(PointerSource::Mouse, position, None);
    }

    pub fn mouse_up(&mut self, position: Vec2) {
        self.record(PointerSource::Mouse, position, Some(false));
    }

    pub fn touch_start(&mut self, position: Vec2) {
        self.record(PointerSource::Touch, position, Some(true));
    }

    pub fn touch_move(&mut self, position: Vec2) {
        self.record(PointerSource::Touch, position, None);
    }

    /// Touch end; `position` is the last known touch point
    pub fn touch_end(&mut self, position: Option<Vec2>) {
        let position = position.unwrap_or(self.position);
        self.record(PointerSource::Touch, position, Some(false));
    }

    /// Pointer left the surface or the window lost focus
    pub fn cancel(&mut self) {
        if self.pressed {
            self.record(self.source, self.position, Some(false));
        }
    }

    fn record(&mut self, source: PointerSource, position: Vec2, pressed: Option<bool>) {
        self.source = source;
        self.position = position;
        if let Some(pressed) = pressed {
            self.pressed = pressed;
        }
        let pending_press = self.pending.and_then(|p| p.pressed);
        let pressed = match pressed {
            Some(false) if pending_press == Some(true) => {
                self.release = Some(position);
                Some(true)
            }
            Some(true) => {
                self.release = None;
                Some(true)
            }
            Some(false) => Some(false),
            None => {
                if self.release.is_some() {
                    self.release = Some(position);
                }
                pending_press
            }
        };
        self.pending = Some(PointerSample { position, pressed });
    }

    /// Latest sample since the previous call, if anything happened
    pub fn take(&mut self) -> Option<PointerSample> {
        let sample = self.pending.take();
        if let Some(position) = self.release.take() {
            self.pending = Some(PointerSample {
                position,
                pressed: Some(false),
            });
        }
        sample
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    pub fn source(&self) -> PointerSource {
        self.source
    }
}
