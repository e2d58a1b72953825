//! Scene pass: draws a simulation state onto a surface

use glam::Vec2;

use super::shapes::{fill_circle, line, star, stroke_circle};
use super::{Color, Paint, Stroke, Surface, colors};
use crate::sim::{Effect, Knot, SimState};

/// Link opacity never leaves this band
const LINK_ALPHA_MIN: f32 = 0.05;
const LINK_ALPHA_MAX: f32 = 0.9;
/// Protection ring opacity band
const RING_ALPHA_MIN: f32 = 0.1;
const RING_ALPHA_MAX: f32 = 0.8;
const STAR_WIDTH: f32 = 2.0;

/// Opacity of a link: opaque when the knots touch, fading toward the threshold
pub fn link_alpha(connect_distance: f32, distance: f32) -> f32 {
    if connect_distance <= 0.0 {
        return LINK_ALPHA_MIN;
    }
    ((connect_distance - distance) / connect_distance).clamp(LINK_ALPHA_MIN, LINK_ALPHA_MAX)
}

/// Grey level of a link; long links are lighter
fn link_color(distance: f32, alpha: f32) -> Color {
    let grey = (distance * 4.0).clamp(0.0, 255.0) as u8;
    Color::rgba(grey, grey, grey, alpha)
}

/// Opacity of the protection ring for a given link energy
pub fn ring_alpha(link_energy: f32, connect_distance: f32) -> f32 {
    (link_energy / (connect_distance.max(1.0) * 4.0)).clamp(RING_ALPHA_MIN, RING_ALPHA_MAX)
}

fn star_color(effect: Effect) -> Color {
    match effect {
        Effect::Disturb => colors::STAR_DISTURB,
        Effect::Stop => colors::STAR_STOP,
        Effect::Expand => colors::STAR_EXPAND,
        Effect::Score => colors::STAR_SCORE,
        Effect::Detonation => colors::STAR_DETONATION,
    }
}

/// Draw the whole scene. Returns `false` without drawing if the surface is gone.
pub fn render<S: Surface + ?Sized>(state: &SimState, surface: &mut S) -> bool {
    let Some(size) = surface.size() else {
        return false;
    };
    surface.clear(Vec2::ZERO, size);

    for particle in state.particles.iter() {
        let paint = Paint::Solid(colors::PARTICLE.with_alpha(particle.alpha()));
        fill_circle(surface, particle.position, particle.radius, &paint);
    }

    let line_width = state.tuning.line_width;
    for knot in &state.knots {
        for link in &knot.links {
            let alpha = link_alpha(state.connect_distance, link.distance);
            let stroke = Stroke {
                color: link_color(link.distance, alpha),
                width: line_width,
            };
            line(surface, knot.position, link.target, &stroke);
        }
    }

    for knot in &state.knots {
        draw_knot(surface, knot, state.connect_distance, line_width);
    }

    true
}

fn draw_knot<S: Surface + ?Sized>(surface: &mut S, knot: &Knot, connect_distance: f32, line_width: f32) {
    let body = Paint::Radial {
        center: knot.position,
        radius: knot.radius,
        inner: colors::KNOT,
        outer: colors::KNOT.with_alpha(0.0),
    };
    fill_circle(surface, knot.position, knot.radius, &body);

    if !knot.links.is_empty() {
        let stroke = Stroke {
            color: colors::RING.with_alpha(ring_alpha(knot.link_energy, connect_distance)),
            width: line_width * 0.5,
        };
        stroke_circle(surface, knot.position, knot.radius + line_width, &stroke);
    }

    if let Some(effect) = knot.special {
        let stroke = Stroke {
            color: star_color(effect),
            width: STAR_WIDTH,
        };
        star(surface, knot.position, knot.radius, effect.code(), &stroke);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::{DrawCommand, RecordingSurface};
    use crate::tuning::Tuning;

    fn scene() -> SimState {
        let mut state = SimState::new(5, Tuning::default(), Vec2::new(800.0, 600.0));
        state.spawn_knot(Vec2::new(100.0, 100.0), Vec2::X, None);
        state.spawn_knot(Vec2::new(160.0, 100.0), Vec2::X, Some(Effect::Expand));
        state.spawn_knot(Vec2::new(600.0, 400.0), Vec2::X, None);
        state.rebuild_links();
        state
    }

    #[test]
    fn test_link_alpha_band() {
        assert_eq!(link_alpha(140.0, 0.0), LINK_ALPHA_MAX);
        assert_eq!(link_alpha(140.0, 139.9), LINK_ALPHA_MIN);
        assert!((link_alpha(140.0, 70.0) - 0.5).abs() < 1e-6);
        assert!(link_alpha(140.0, 20.0) > link_alpha(140.0, 100.0));
    }

    #[test]
    fn test_ring_alpha_grows_with_energy() {
        assert_eq!(ring_alpha(0.0, 140.0), RING_ALPHA_MIN);
        assert!(ring_alpha(200.0, 140.0) > ring_alpha(100.0, 140.0));
        assert_eq!(ring_alpha(10_000.0, 140.0), RING_ALPHA_MAX);
    }

    #[test]
    fn test_render_draw_calls() {
        let state = scene();
        let mut surface = RecordingSurface::new(state.bounds);
        assert!(render(&state, &mut surface));

        assert!(matches!(surface.commands()[0], DrawCommand::Clear { .. }));
        // Three bodies
        assert_eq!(surface.fill_count(), 3);
        // One link, one ring (first knot only), one star
        assert_eq!(surface.stroke_count(), 3);
    }

    #[test]
    fn test_render_knot_body_is_gradient() {
        let state = scene();
        let mut surface = RecordingSurface::new(state.bounds);
        render(&state, &mut surface);
        let gradient = surface.commands().iter().find_map(|c| match c {
            DrawCommand::Fill {
                paint: Paint::Radial { inner, outer, .. },
                ..
            } => Some((*inner, *outer)),
            _ => None,
        });
        let (inner, outer) = gradient.unwrap();
        assert_eq!(inner.a, 1.0);
        assert_eq!(outer.a, 0.0);
    }

    #[test]
    fn test_render_particles() {
        let mut state = scene();
        let mut rng = rand_pcg::Pcg32::new(1, 1);
        state.particles.spawn_burst(Vec2::new(300.0, 300.0), &mut rng);
        let mut surface = RecordingSurface::new(state.bounds);
        render(&state, &mut surface);
        assert_eq!(surface.fill_count(), 3 + 96);
    }

    #[test]
    fn test_render_skips_detached_surface() {
        let state = scene();
        let mut surface = RecordingSurface::new(state.bounds);
        surface.detach();
        assert!(!render(&state, &mut surface));
        assert!(surface.commands().is_empty());
    }
}
