//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Input events (mouse and touch folded into one pointer)

pub mod input;

pub use input::{PointerSample, PointerTracker};
