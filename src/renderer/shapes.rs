//! Shape drawing primitives for 2D surfaces

use glam::Vec2;
use std::f32::consts::TAU;

use super::{Paint, Path, Stroke, Surface};
use crate::consts::BEZIER_CIRCLE_K;

/// Append one quarter of a circle as a cubic Bézier.
///
/// The quarter starts at `center - (size.x, 0)` and ends at `center - (0, size.y)`;
/// flipping the signs of `size` picks the other quadrants.
fn bezier_quarter(path: &mut Path, center: Vec2, size: Vec2) {
    path.move_to(Vec2::new(center.x - size.x, center.y));
    path.cubic_to(
        Vec2::new(center.x - size.x, center.y - BEZIER_CIRCLE_K * size.y),
        Vec2::new(center.x - BEZIER_CIRCLE_K * size.x, center.y - size.y),
        Vec2::new(center.x, center.y - size.y),
    );
}

/// Circle outline built from four Bézier quarters
pub fn bezier_circle_path(center: Vec2, radius: f32) -> Path {
    let mut path = Path::new();
    bezier_quarter(&mut path, center, Vec2::new(-radius, radius));
    bezier_quarter(&mut path, center, Vec2::new(radius, radius));
    bezier_quarter(&mut path, center, Vec2::new(radius, -radius));
    bezier_quarter(&mut path, center, Vec2::new(-radius, -radius));
    path
}

/// Closed star outline alternating between `radius` and `radius / 2`
pub fn star_path(center: Vec2, radius: f32, points: u32) -> Path {
    let mut path = Path::new();
    path.move_to(center + Vec2::new(radius, 0.0));
    let steps = points * 2;
    for i in 1..=steps {
        let theta = i as f32 * TAU / steps as f32;
        let r = if i % 2 == 0 { radius } else { radius * 0.5 };
        path.line_to(center + Vec2::new(r * theta.cos(), r * theta.sin()));
    }
    path.close();
    path
}

/// Draw a filled circle
pub fn fill_circle<S: Surface + ?Sized>(surface: &mut S, center: Vec2, radius: f32, paint: &Paint) {
    if radius <= 0.0 {
        return;
    }
    let mut path = Path::new();
    path.circle(center, radius);
    surface.fill(&path, paint);
}

/// Draw a circle outline
pub fn stroke_circle<S: Surface + ?Sized>(surface: &mut S, center: Vec2, radius: f32, stroke: &Stroke) {
    surface.stroke(&bezier_circle_path(center, radius), stroke);
}

/// Draw a straight line
pub fn line<S: Surface + ?Sized>(surface: &mut S, from: Vec2, to: Vec2, stroke: &Stroke) {
    let mut path = Path::new();
    path.move_to(from).line_to(to);
    surface.stroke(&path, stroke);
}

/// Draw an n-pointed star outline
pub fn star<S: Surface + ?Sized>(surface: &mut S, center: Vec2, radius: f32, points: u32, stroke: &Stroke) {
    if points < 2 {
        return;
    }
    surface.stroke(&star_path(center, radius, points), stroke);
}
