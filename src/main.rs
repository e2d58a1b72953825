//! Knot Web entry point
//!
//! Handles platform-specific initialization and runs the frame loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_app {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec2;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, KeyboardEvent, MouseEvent, TouchEvent};

    use knot_web::platform::PointerTracker;
    use knot_web::renderer::{CanvasSurface, Surface};
    use knot_web::{FrameDriver, FrameOutcome, Settings};

    /// Everything the browser callbacks share
    struct App {
        driver: FrameDriver,
        surface: CanvasSurface,
        pointer: PointerTracker,
        settings: Settings,
        /// A frame callback is pending
        scheduled: bool,
    }

    impl App {
        /// One frame callback; returns whether to schedule another
        fn tick(&mut self, time: f64) -> bool {
            if let Some(sample) = self.pointer.take() {
                self.driver.state.apply_pointer(sample);
            }
            self.surface.fit_to_client();

            let outcome = self.driver.frame(time, &mut self.surface);
            if outcome == FrameOutcome::Rendered && self.driver.state.knots.is_empty() {
                log::info!("Web cleared, spawning {} knots", self.settings.refill_knots);
                self.driver.state.spawn_knots(self.settings.refill_knots);
            }
            if self.settings.show_fps {
                self.update_fps();
            }
            outcome.reschedule()
        }

        /// Show or hide the FPS counter and remember the choice
        fn toggle_fps(&mut self) {
            self.settings.show_fps = !self.settings.show_fps;
            self.settings.save();
            if !self.settings.show_fps {
                let document = web_sys::window().and_then(|w| w.document());
                if let Some(el) = document.and_then(|d| d.get_element_by_id("fps")) {
                    el.set_text_content(None);
                }
            }
        }

        fn update_fps(&self) {
            let document = web_sys::window().and_then(|w| w.document());
            if let Some(el) = document.and_then(|d| d.get_element_by_id("fps")) {
                el.set_text_content(Some(&self.driver.fps().to_string()));
            }
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Knot Web starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");

        let surface = CanvasSurface::new(canvas.clone()).expect("no 2d context");
        surface.fit_to_client();
        let bounds = surface.size().unwrap_or(Vec2::new(800.0, 600.0));

        let settings = Settings::load();
        let seed = js_sys::Date::now() as u64;
        let mut driver = FrameDriver::new(seed, settings.tuning.clone(), bounds);
        driver.state.spawn_knots(settings.initial_knots);
        log::info!("Simulation initialized with seed: {}", seed);

        let app = Rc::new(RefCell::new(App {
            driver,
            surface,
            pointer: PointerTracker::new(),
            settings,
            scheduled: false,
        }));

        setup_input_handlers(&canvas, app.clone());
        setup_keyboard(app.clone());
        setup_visibility(app.clone());

        request_animation_frame(app);
        log::info!("Knot Web running!");
    }

    /// Position of a touch relative to the canvas
    fn touch_position(canvas: &HtmlCanvasElement, event: &TouchEvent) -> Option<Vec2> {
        let touch = event.changed_touches().get(0)?;
        let rect = canvas.get_bounding_client_rect();
        Some(Vec2::new(
            touch.client_x() as f32 - rect.left() as f32,
            touch.client_y() as f32 - rect.top() as f32,
        ))
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, app: Rc<RefCell<App>>) {
        // Mouse
        for (name, pressed) in [("mousedown", Some(true)), ("mousemove", None), ("mouseup", Some(false))] {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let position = Vec2::new(event.offset_x() as f32, event.offset_y() as f32);
                let mut a = app.borrow_mut();
                match pressed {
                    Some(true) => a.pointer.mouse_down(position),
                    Some(false) => a.pointer.mouse_up(position),
                    None => a.pointer.mouse_move(position),
                }
            });
            let _ = canvas.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                app.borrow_mut().pointer.cancel();
            });
            let _ = canvas
                .add_event_listener_with_callback("mouseleave", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch
        for (name, pressed) in [("touchstart", Some(true)), ("touchmove", None), ("touchend", Some(false))] {
            let app = app.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                let position = touch_position(&canvas_clone, &event);
                let mut a = app.borrow_mut();
                match (pressed, position) {
                    (Some(true), Some(p)) => a.pointer.touch_start(p),
                    (None, Some(p)) => a.pointer.touch_move(p),
                    (Some(false), p) => a.pointer.touch_end(p),
                    _ => {}
                }
            });
            let _ = canvas.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // No context menu on long press
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::Event| {
                event.prevent_default();
            });
            let _ = canvas
                .add_event_listener_with_callback("contextmenu", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_keyboard(app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
            if event.code() == "KeyF" {
                app.borrow_mut().toggle_fps();
                return;
            }
            if event.code() != "Space" {
                return;
            }
            let resume = {
                let mut a = app.borrow_mut();
                let running = a.driver.toggle();
                running && !a.scheduled
            };
            if resume {
                request_animation_frame(app.clone());
            }
        });
        let _ = window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_visibility(app: Rc<RefCell<App>>) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        let document_clone = document.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                // A finger lifted while hidden never sends touchend
                app.borrow_mut().pointer.cancel();
            }
        });
        let _ = document
            .add_event_listener_with_callback("visibilitychange", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        app.borrow_mut().scheduled = true;
        let closure = Closure::once(move |time: f64| {
            frame_loop(app, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn frame_loop(app: Rc<RefCell<App>>, time: f64) {
        let reschedule = {
            let mut a = app.borrow_mut();
            a.scheduled = false;
            a.tick(time)
        };
        if reschedule {
            request_animation_frame(app);
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_app::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Knot Web (native) starting...");
    log::info!("Native mode runs headless - use `trunk serve` for the canvas version");

    if let Err(e) = native::run_headless(std::env::args().skip(1).collect()) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use glam::Vec2;

    use knot_web::platform::PointerTracker;
    use knot_web::renderer::RecordingSurface;
    use knot_web::{FrameDriver, Settings, Tuning, TuningError};

    /// Usage: `knot-web [ticks] [seed] [tuning.json]`
    pub fn run_headless(args: Vec<String>) -> Result<(), TuningError> {
        let ticks: u64 = args.first().and_then(|s| s.parse().ok()).unwrap_or(600);
        let seed: u64 = args.get(1).and_then(|s| s.parse().ok()).unwrap_or(42);
        let mut settings = Settings::load();
        if let Some(path) = args.get(2) {
            settings.tuning = Tuning::load_file(path)?;
            log::info!("Loaded tuning from {}", path);
        }

        let bounds = Vec2::new(1280.0, 720.0);
        let mut surface = RecordingSurface::new(bounds);
        let mut driver = FrameDriver::new(seed, settings.tuning.clone(), bounds);
        driver.state.spawn_knots(settings.initial_knots);
        let mut pointer = PointerTracker::new();

        for tick in 0..ticks {
            // Sweep a pressed pointer across the middle every other second
            let phase = tick % 120;
            if phase == 0 {
                pointer.mouse_down(Vec2::new(0.0, bounds.y * 0.5));
            } else if phase < 60 {
                pointer.mouse_move(Vec2::new(bounds.x * phase as f32 / 60.0, bounds.y * 0.5));
            } else if phase == 60 {
                pointer.mouse_up(Vec2::new(bounds.x, bounds.y * 0.5));
            }
            if let Some(sample) = pointer.take() {
                driver.state.apply_pointer(sample);
            }

            driver.frame(tick as f64 * 1000.0 / 60.0, &mut surface);
            if driver.state.knots.is_empty() {
                driver.state.spawn_knots(settings.refill_knots);
            }

            if tick % 60 == 0 {
                log::info!(
                    "tick {:>5}: {} knots, {} links, {} particles, {} draw calls",
                    tick,
                    driver.state.knots.len(),
                    driver.state.link_count(),
                    driver.state.particles.len(),
                    surface.commands().len()
                );
            }
        }

        println!(
            "Simulated {} ticks: {} knots, {} links, {} particles",
            ticks,
            driver.state.knots.len(),
            driver.state.link_count(),
            driver.state.particles.len()
        );
        Ok(())
    }
}
