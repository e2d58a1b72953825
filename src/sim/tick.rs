//! Per-frame simulation step
//!
//! Advances the knot web by one tick. Rendering is a separate pass in
//! [`crate::renderer::scene`], so this runs headless.

use glam::Vec2;
use std::f32::consts::PI;

use super::effects;
use super::state::{Knot, SimEvent, SimState, radius_for_energy};
use crate::consts::*;
use crate::{away_from, clamp_range};

/// Advance the simulation by one tick covering `dt_ms` of simulated time
pub fn advance(state: &mut SimState, dt_ms: f64) {
    state.now_ms += dt_ms;
    state.time_ticks += 1;

    effects::expire_due(state);
    ease_connect_distance(state);

    let evicted = state.particles.update();
    if evicted > 0 {
        log::trace!("evicted {} particles", evicted);
    }

    if state.pointer.pressed {
        pointer_pass(state);
    }

    let tuning = &state.tuning;
    for knot in &mut state.knots {
        attract(knot, tuning.attraction * state.gravitation);
        relax_speed(knot, state.min_speed, tuning.max_speed, tuning.damping, tuning.speed_recovery);
        knot.position += knot.direction * knot.speed;
        knot.radius = radius_for_energy(tuning.knot_radius, knot.link_energy, tuning.line_width);
        collide_borders(knot, state.bounds, tuning.bounce_damping);
    }

    state.rebuild_links();
}

fn ease_connect_distance(state: &mut SimState) {
    let target = state.connect_distance_target;
    if state.connect_distance < target {
        state.connect_distance = (state.connect_distance + CONNECT_EASE_STEP).min(target);
    } else if state.connect_distance > target {
        state.connect_distance = (state.connect_distance - CONNECT_EASE_STEP).max(target);
    }
}

/// Destroy unlinked knots near the pressed pointer and push the rest away.
///
/// Specials of destroyed knots fire once the whole pass is done, so a stop
/// freezes every knot regardless of index order. Removal comes last so
/// indices stay valid while effects touch the whole population.
fn pointer_pass(state: &mut SimState) {
    let pointer = state.pointer.position;
    let range = state.tuning.range;
    let power = state.tuning.power;
    let mut doomed = vec![false; state.knots.len()];
    let mut fired = Vec::new();

    for index in 0..state.knots.len() {
        if doomed[index] {
            continue;
        }
        let knot = &state.knots[index];
        let distance = knot.position.distance(pointer);
        if distance >= range {
            continue;
        }

        if !knot.is_linked() {
            let (position, special) = (knot.position, knot.special);
            doomed[index] = true;
            state.particles.spawn_burst(position, &mut state.rng);
            state.events.push(SimEvent::KnotDestroyed { position, special });
            if let Some(effect) = special {
                log::info!("{} knot destroyed at ({:.0}, {:.0})", effect.name(), position.x, position.y);
                fired.push(effect);
            }
            continue;
        }

        let knot = &mut state.knots[index];
        knot.direction = away_from(knot.position, pointer);
        knot.speed = power / distance.max(f32::EPSILON) * 10.0;
    }

    for effect in fired {
        effects::fire(state, effect, &mut doomed);
    }

    if doomed.iter().any(|&d| d) {
        let mut flags = doomed.into_iter();
        state.knots.retain(|_| !flags.next().unwrap_or(false));
    }
}

/// Pull the heading toward every linked knot farther away than the radius
fn attract(knot: &mut Knot, strength: f32) {
    if knot.links.is_empty() {
        return;
    }
    for link in &knot.links {
        if link.distance > knot.radius {
            knot.direction -= (knot.position - link.target) * strength;
        }
    }
    knot.direction = Vec2::new(
        clamp_range(knot.direction.x, -PI, PI, false),
        clamp_range(knot.direction.y, -PI, PI, false),
    );
}

/// Ease speed toward the floor and cap it
fn relax_speed(knot: &mut Knot, min_speed: f32, max_speed: f32, damping: f32, recovery: f32) {
    if knot.speed < min_speed {
        knot.speed = (knot.speed + recovery).min(min_speed);
    } else {
        knot.speed = (knot.speed - damping).max(min_speed);
    }
    knot.speed = knot.speed.min(max_speed);
}

/// Keep the knot inside the surface, bouncing off the edges
fn collide_borders(knot: &mut Knot, bounds: Vec2, bounce: f32) {
    let r = knot.radius;
    if knot.position.y < r {
        knot.position.y = r;
        knot.direction.y = -knot.direction.y * bounce;
    } else if knot.position.y > bounds.y - r {
        knot.position.y = (bounds.y - r).max(r);
        knot.direction.y = -knot.direction.y * bounce;
    }
    if knot.position.x < r {
        knot.position.x = r;
        knot.direction.x = -knot.direction.x * bounce;
    } else if knot.position.x > bounds.x - r {
        knot.position.x = (bounds.x - r).max(r);
        knot.direction.x = -knot.direction.x * bounce;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::input::PointerSample;
    use crate::sim::Effect;
    use crate::tuning::Tuning;
    use proptest::prelude::*;

    const DT: f64 = 1000.0 / 60.0;

    fn state() -> SimState {
        SimState::new(12345, Tuning::default(), Vec2::new(800.0, 600.0))
    }

    fn press(state: &mut SimState, at: Vec2) {
        state.apply_pointer(PointerSample {
            position: at,
            pressed: Some(true),
        });
    }

    fn release(state: &mut SimState) {
        let position = state.pointer.position;
        state.apply_pointer(PointerSample {
            position,
            pressed: Some(false),
        });
    }

    #[test]
    fn test_no_destruction_without_pointer() {
        let mut state = state();
        state.spawn_knots(32);
        for _ in 0..600 {
            advance(&mut state, DT);
        }
        assert_eq!(state.knots.len(), 32);
        assert!(state.particles.is_empty());
        assert_eq!(state.time_ticks, 600);
    }

    #[test]
    fn test_determinism() {
        let mut a = state();
        let mut b = state();
        a.spawn_knots(24);
        b.spawn_knots(24);
        for tick in 0..200 {
            if tick == 50 {
                press(&mut a, Vec2::new(400.0, 300.0));
                press(&mut b, Vec2::new(400.0, 300.0));
            }
            advance(&mut a, DT);
            advance(&mut b, DT);
        }
        assert_eq!(a.knots.len(), b.knots.len());
        assert_eq!(a.particles.len(), b.particles.len());
        for (ka, kb) in a.knots.iter().zip(&b.knots) {
            assert_eq!(ka.position, kb.position);
        }
    }

    #[test]
    fn test_stop_knot_scenario() {
        let mut state = state();
        let target = Vec2::new(400.0, 300.0);
        state.spawn_knot(Vec2::new(100.0, 100.0), Vec2::X, None);
        state.spawn_knot(target, Vec2::Y, Some(Effect::Stop));
        state.spawn_knot(Vec2::new(700.0, 500.0), -Vec2::X, None);
        state.rebuild_links();
        assert!(state.knots.iter().all(|k| !k.is_linked()));

        // Run the pointer pass directly so the knot has not moved yet
        press(&mut state, target);
        pointer_pass(&mut state);

        assert_eq!(state.knots.len(), 2);
        assert_eq!(state.particles.len(), PARTICLE_BURST);
        for particle in state.particles.iter() {
            let offset = particle.position - target;
            assert!(offset.x.abs() <= 12.0 && offset.y.abs() <= 12.0);
            assert_eq!(particle.lifetime, 60);
        }
        for knot in &state.knots {
            assert_eq!(knot.speed, 0.0);
            assert_eq!(knot.direction, Vec2::ZERO);
        }
        assert_eq!(state.min_speed, 0.0);
        release(&mut state);

        // Frozen for the whole effect
        while state.now_ms + DT < STOP_DURATION_MS {
            advance(&mut state, DT);
            for knot in &state.knots {
                assert_eq!(knot.speed, 0.0);
            }
        }

        // After expiry speeds climb back toward the floor
        for _ in 0..10 {
            advance(&mut state, DT);
        }
        assert!(!state.effects.is_active(Effect::Stop));
        assert_eq!(state.min_speed, 0.3);
        let climbing: Vec<f32> = state.knots.iter().map(|k| k.speed).collect();
        for &speed in &climbing {
            assert!(speed > 0.0 && speed < 0.3);
        }
        advance(&mut state, DT);
        for (knot, before) in state.knots.iter().zip(&climbing) {
            assert!(knot.speed > *before);
            assert!((knot.direction.length() - 1.0).abs() < 1e-5);
        }
        for _ in 0..100 {
            advance(&mut state, DT);
        }
        for knot in &state.knots {
            assert_eq!(knot.speed, 0.3);
        }
    }

    #[test]
    fn test_stop_freezes_knots_repelled_later_in_the_pass() {
        let mut state = state();
        let pointer = Vec2::new(400.0, 300.0);
        state.spawn_knot(pointer - Vec2::new(100.0, 0.0), Vec2::X, Some(Effect::Stop));
        state.spawn_knot(pointer + Vec2::new(100.0, 0.0), Vec2::Y, None);
        state.spawn_knot(pointer + Vec2::new(160.0, 0.0), Vec2::Y, None);
        state.rebuild_links();
        assert!(!state.knots[0].is_linked());
        assert!(state.knots[1].is_linked() && state.knots[2].is_linked());

        press(&mut state, pointer);
        advance(&mut state, DT);

        assert!(state.effects.is_active(Effect::Stop));
        assert_eq!(state.knots.len(), 2);
        for knot in &state.knots {
            assert_eq!(knot.speed, 0.0);
        }
        assert_eq!(state.knots[0].position, pointer + Vec2::new(100.0, 0.0));
    }

    #[test]
    fn test_stop_retrigger_extends_freeze() {
        let mut state = state();
        state.spawn_knot(Vec2::new(100.0, 100.0), Vec2::X, Some(Effect::Stop));
        state.spawn_knot(Vec2::new(700.0, 500.0), Vec2::X, Some(Effect::Stop));
        state.spawn_knot(Vec2::new(100.0, 500.0), Vec2::X, None);
        state.rebuild_links();

        press(&mut state, Vec2::new(100.0, 100.0));
        advance(&mut state, DT);
        release(&mut state);
        let first = state.effects.stop.map(|d| d.at_ms);

        for _ in 0..30 {
            advance(&mut state, DT);
        }
        press(&mut state, Vec2::new(700.0, 500.0));
        advance(&mut state, DT);
        release(&mut state);
        let second = state.effects.stop.map(|d| d.at_ms);
        assert_eq!(second, Some(state.now_ms + STOP_DURATION_MS));
        assert!(second > first);

        // Still frozen past the first deadline
        while state.now_ms < first.unwrap_or_default() + DT {
            advance(&mut state, DT);
        }
        assert!(state.effects.is_active(Effect::Stop));
        assert_eq!(state.min_speed, 0.0);
        assert_eq!(state.knots[0].speed, 0.0);

        while state.effects.is_active(Effect::Stop) {
            advance(&mut state, DT);
        }
        assert!(state.now_ms >= second.unwrap_or_default());
        assert_eq!(state.min_speed, 0.3);
        let ended = state
            .drain_events()
            .into_iter()
            .filter(|e| *e == SimEvent::EffectEnded(Effect::Stop))
            .count();
        assert_eq!(ended, 1);
    }

    #[test]
    fn test_destroyed_through_advance() {
        let mut state = state();
        state.spawn_knot(Vec2::new(400.0, 300.0), Vec2::X, None);
        state.rebuild_links();
        press(&mut state, Vec2::new(400.0, 300.0));
        advance(&mut state, DT);
        assert!(state.knots.is_empty());
        assert_eq!(state.particles.len(), PARTICLE_BURST);
        assert!(matches!(
            state.events[0],
            SimEvent::KnotDestroyed { special: None, .. }
        ));
    }

    #[test]
    fn test_linked_knot_is_repelled() {
        let mut state = state();
        state.spawn_knot(Vec2::new(400.0, 300.0), Vec2::Y, None);
        state.spawn_knot(Vec2::new(450.0, 300.0), Vec2::Y, None);
        state.rebuild_links();
        press(&mut state, Vec2::new(380.0, 300.0));
        pointer_pass(&mut state);

        assert_eq!(state.knots.len(), 2);
        let knot = &state.knots[0];
        assert!((knot.direction.length() - 1.0).abs() < 1e-5);
        assert!(knot.direction.x > 0.99);
        assert!((knot.speed - 64.0 / 20.0 * 10.0).abs() < 1e-3);

        // Relaxation caps the pointer speed
        relax_speed(&mut state.knots[0], 0.3, 5.0, 0.005, 0.01);
        assert_eq!(state.knots[0].speed, 5.0);
    }

    #[test]
    fn test_removal_does_not_skip_neighbors() {
        let mut state = state();
        // Two adjacent unlinked knots inside the pointer range
        state.spawn_knot(Vec2::new(300.0, 300.0), Vec2::X, None);
        state.spawn_knot(Vec2::new(300.0, 450.0), Vec2::X, None);
        state.spawn_knot(Vec2::new(300.0, 150.0), Vec2::X, None);
        state.rebuild_links();
        assert_eq!(state.link_count(), 0);

        press(&mut state, Vec2::new(300.0, 370.0));
        pointer_pass(&mut state);
        assert_eq!(state.knots.len(), 1);
        assert_eq!(state.knots[0].position, Vec2::new(300.0, 150.0));
        assert_eq!(state.particles.len(), 2 * PARTICLE_BURST);
    }

    #[test]
    fn test_detonation_spares_linked_and_does_not_chain() {
        let mut state = state();
        state.spawn_knot(Vec2::new(100.0, 100.0), Vec2::X, Some(Effect::Detonation));
        state.spawn_knot(Vec2::new(400.0, 300.0), Vec2::X, None);
        state.spawn_knot(Vec2::new(460.0, 300.0), Vec2::X, None);
        state.spawn_knot(Vec2::new(700.0, 550.0), Vec2::X, Some(Effect::Stop));
        state.rebuild_links();

        press(&mut state, Vec2::new(100.0, 100.0));
        pointer_pass(&mut state);

        assert_eq!(state.knots.len(), 2);
        assert!(state.knots.iter().all(|k| k.is_linked()));
        assert_eq!(state.particles.len(), 2 * PARTICLE_BURST);
        // The stop knot died to the blast and did not fire
        assert!(!state.effects.is_active(Effect::Stop));
        assert_eq!(state.min_speed, 0.3);
    }

    #[test]
    fn test_disturb_through_pointer_and_easing() {
        let mut state = state();
        state.spawn_knot(Vec2::new(200.0, 200.0), Vec2::X, Some(Effect::Disturb));
        state.spawn_knot(Vec2::new(600.0, 400.0), Vec2::X, Some(Effect::Disturb));
        state.rebuild_links();

        press(&mut state, Vec2::new(200.0, 200.0));
        advance(&mut state, DT);
        release(&mut state);
        assert_eq!(state.connect_distance_target, 70.0);

        // Second disturb while active leaves the target alone
        press(&mut state, Vec2::new(600.0, 400.0));
        advance(&mut state, DT);
        release(&mut state);
        assert!(state.knots.is_empty());
        assert_eq!(state.connect_distance_target, 70.0);

        // Eased one unit per tick
        assert_eq!(state.connect_distance, 139.0);
        for _ in 0..100 {
            advance(&mut state, DT);
        }
        assert_eq!(state.connect_distance, 70.0);
    }

    #[test]
    fn test_attraction_pulls_toward_link() {
        let mut knot = Knot::new(Vec2::new(100.0, 100.0), Vec2::ZERO, 0.3, 10.0);
        knot.links.push(crate::sim::Link {
            target: Vec2::new(200.0, 100.0),
            distance: 100.0,
        });
        attract(&mut knot, 0.00008);
        assert!(knot.direction.x > 0.0);
        assert_eq!(knot.direction.y, 0.0);

        // Repulsion under negative gravitation, clamped per axis
        attract(&mut knot, -1.0);
        assert_eq!(knot.direction.x, -PI);
    }

    #[test]
    fn test_attraction_ignores_links_inside_radius() {
        let mut knot = Knot::new(Vec2::ZERO, Vec2::X, 0.3, 32.0);
        knot.links.push(crate::sim::Link {
            target: Vec2::new(20.0, 0.0),
            distance: 20.0,
        });
        attract(&mut knot, 1.0);
        assert_eq!(knot.direction, Vec2::X);
    }

    #[test]
    fn test_relax_speed_approaches_floor_from_below() {
        let mut knot = Knot::new(Vec2::ZERO, Vec2::X, 0.0, 5.0);
        relax_speed(&mut knot, 0.3, 5.0, 0.005, 0.01);
        assert!((knot.speed - 0.01).abs() < 1e-6);
        knot.speed = 0.295;
        relax_speed(&mut knot, 0.3, 5.0, 0.005, 0.01);
        assert_eq!(knot.speed, 0.3);
        relax_speed(&mut knot, 0.3, 5.0, 0.005, 0.01);
        assert_eq!(knot.speed, 0.3);
        knot.speed = 1.0;
        relax_speed(&mut knot, 0.3, 5.0, 0.005, 0.01);
        assert!((knot.speed - 0.995).abs() < 1e-6);
    }

    #[test]
    fn test_border_bounce() {
        let mut knot = Knot::new(Vec2::new(-5.0, 300.0), Vec2::new(-1.0, 0.0), 1.0, 10.0);
        collide_borders(&mut knot, Vec2::new(800.0, 600.0), 0.8);
        assert_eq!(knot.position.x, 10.0);
        assert!((knot.direction.x - 0.8).abs() < 1e-6);

        let mut knot = Knot::new(Vec2::new(400.0, 700.0), Vec2::new(0.0, 1.0), 1.0, 10.0);
        collide_borders(&mut knot, Vec2::new(800.0, 600.0), 0.8);
        assert_eq!(knot.position.y, 590.0);
        assert!((knot.direction.y + 0.8).abs() < 1e-6);
    }

    proptest! {
        #[test]
        fn knots_stay_inside(seed in 0u64..10_000, count in 1usize..40, w in 100f32..1600.0, h in 100f32..1200.0) {
            let mut state = SimState::new(seed, Tuning::default(), Vec2::new(w, h));
            state.spawn_knots(count);
            for _ in 0..60 {
                advance(&mut state, DT);
                for knot in &state.knots {
                    prop_assert!(knot.position.x >= knot.radius && knot.position.x <= w - knot.radius);
                    prop_assert!(knot.position.y >= knot.radius && knot.position.y <= h - knot.radius);
                }
            }
        }

        #[test]
        fn speeds_stay_bounded(seed in 0u64..10_000, px in 0f32..800.0, py in 0f32..600.0) {
            let mut state = SimState::new(seed, Tuning::default(), Vec2::new(800.0, 600.0));
            state.spawn_knots(30);
            for knot in &state.knots {
                prop_assert!(knot.speed >= state.min_speed);
            }
            state.apply_pointer(PointerSample { position: Vec2::new(px, py), pressed: Some(true) });
            for _ in 0..30 {
                advance(&mut state, DT);
                if state.effects.is_active(Effect::Stop) {
                    break;
                }
                for knot in &state.knots {
                    prop_assert!(knot.speed >= state.min_speed - 1e-6);
                    prop_assert!(knot.speed <= state.tuning.max_speed);
                }
            }
        }
    }
}
