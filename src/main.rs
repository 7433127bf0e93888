//! Tile Runner entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, HtmlCanvasElement, KeyboardEvent, Window};

    use tile_runner::Tuning;
    use tile_runner::game::{FrameHandle, FrameScheduler, Game, SnapshotObserver};
    use tile_runner::platform::{Intent, apply_key, fit_viewport};
    use tile_runner::renderer::CanvasRenderer;
    use tile_runner::sim::{Snapshot, World, build_level};

    type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;
    type Listener = Closure<dyn FnMut(web_sys::Event)>;

    /// requestAnimationFrame wrapper around the shared frame closure
    struct RafScheduler {
        window: Window,
        callback: FrameCallback,
    }

    impl FrameScheduler for RafScheduler {
        fn request_frame(&mut self) -> Option<FrameHandle> {
            let callback = self.callback.borrow();
            let closure = callback.as_ref()?;
            match self.window.request_animation_frame(closure.as_ref().unchecked_ref()) {
                Ok(handle) => Some(handle),
                Err(e) => {
                    log::error!("requestAnimationFrame failed: {e:?}");
                    None
                }
            }
        }

        fn cancel_frame(&mut self, handle: FrameHandle) {
            if let Err(e) = self.window.cancel_animation_frame(handle) {
                log::warn!("cancelAnimationFrame failed: {e:?}");
            }
        }
    }

    /// Writes snapshots into the `#hud-*` elements
    struct DomHud {
        document: Document,
        last: Option<Snapshot>,
    }

    impl DomHud {
        fn set_field(&self, field: &str, value: &str) {
            let selector = format!("#hud-{field} .hud-value");
            if let Some(el) = self.document.query_selector(&selector).ok().flatten() {
                el.set_text_content(Some(value));
            }
        }
    }

    impl SnapshotObserver for DomHud {
        fn publish(&mut self, snapshot: &Snapshot) {
            if self.last.as_ref() == Some(snapshot) {
                return;
            }

            self.set_field("score", &snapshot.score.to_string());
            self.set_field("coins", &snapshot.coins.to_string());
            self.set_field("time", &snapshot.display_time().to_string());
            self.set_field("world", &snapshot.world);
            self.set_field("lives", &snapshot.lives.to_string());
            self.set_field("status", snapshot.status.as_str());

            if let Some(hud) = self.document.get_element_by_id("hud") {
                let _ = hud.set_attribute("data-status", snapshot.status.as_str());
            }

            self.last = Some(snapshot.clone());
        }
    }

    /// Everything a frame or input callback touches
    struct Shell {
        game: Game,
        scheduler: RafScheduler,
        renderer: CanvasRenderer,
        hud: DomHud,
    }

    impl Shell {
        fn frame(&mut self, time: f64) {
            let Shell {
                game,
                scheduler,
                renderer,
                hud,
            } = self;
            game.frame(time, scheduler, renderer, hud);
        }

        fn key(&mut self, event: &KeyboardEvent, down: bool) {
            let code = event.code();
            if Intent::from_code(&code).is_some() {
                event.prevent_default();
            }
            if apply_key(&mut self.game.input, &code, down, event.repeat()) == Some(Intent::Restart) {
                self.game.restart(&mut self.scheduler);
            }
        }

        fn resize(&mut self, window: &Window) {
            let inner = window
                .inner_width()
                .ok()
                .and_then(|w| w.as_f64())
                .unwrap_or(960.0);
            let (width, height) = fit_viewport(inner as f32);
            self.renderer.resize(width, height);
            self.game.set_viewport(width, height);
        }
    }

    /// Live session; dropping the frame closure and listeners ends it
    struct Runtime {
        window: Window,
        shell: Rc<RefCell<Shell>>,
        callback: FrameCallback,
        listeners: Vec<(&'static str, Listener)>,
    }

    impl Runtime {
        fn teardown(self) {
            for (kind, listener) in &self.listeners {
                let _ = self
                    .window
                    .remove_event_listener_with_callback(kind, listener.as_ref().unchecked_ref());
            }
            {
                let mut shell = self.shell.borrow_mut();
                let Shell { game, scheduler, .. } = &mut *shell;
                game.stop(scheduler);
            }
            // Breaks the closure -> shell -> scheduler -> closure cycle
            self.callback.borrow_mut().take();
            log::info!("Tile Runner torn down");
        }
    }

    thread_local! {
        static RUNTIME: RefCell<Option<Runtime>> = const { RefCell::new(None) };
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::warn_1(&format!("Logger init failed: {e}").into());
        }

        log::info!("Tile Runner starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .ok_or("no canvas")?
            .dyn_into()?;

        let world = World::new(build_level(), Tuning::load());
        log::info!("Level {} loaded", world.tuning.world_label);

        let callback: FrameCallback = Rc::new(RefCell::new(None));
        let shell = Rc::new(RefCell::new(Shell {
            game: Game::new(world),
            scheduler: RafScheduler {
                window: window.clone(),
                callback: callback.clone(),
            },
            renderer: CanvasRenderer::new(canvas)?,
            hud: DomHud {
                document: document.clone(),
                last: None,
            },
        }));
        shell.borrow_mut().resize(&window);

        {
            let shell = shell.clone();
            *callback.borrow_mut() = Some(Closure::new(move |time: f64| {
                shell.borrow_mut().frame(time);
            }));
        }

        let mut listeners: Vec<(&'static str, Listener)> = Vec::new();
        for (kind, down) in [("keydown", true), ("keyup", false)] {
            let shell = shell.clone();
            listeners.push((
                kind,
                Closure::new(move |event: web_sys::Event| {
                    if let Some(key) = event.dyn_ref::<KeyboardEvent>() {
                        shell.borrow_mut().key(key, down);
                    }
                }),
            ));
        }
        {
            let shell = shell.clone();
            let window = window.clone();
            listeners.push((
                "resize",
                Closure::new(move |_event: web_sys::Event| {
                    shell.borrow_mut().resize(&window);
                }),
            ));
        }
        for (kind, listener) in &listeners {
            window.add_event_listener_with_callback(kind, listener.as_ref().unchecked_ref())?;
        }

        if let Some(hud) = document.get_element_by_id("hud") {
            let _ = hud.set_attribute("class", "");
        }

        {
            let mut guard = shell.borrow_mut();
            let Shell { game, scheduler, .. } = &mut *guard;
            game.start(scheduler);
        }

        RUNTIME.with(|rt| {
            let previous = rt.borrow_mut().replace(Runtime {
                window,
                shell,
                callback,
                listeners,
            });
            if let Some(previous) = previous {
                previous.teardown();
            }
        });

        log::info!("Tile Runner running!");
        Ok(())
    }

    pub fn teardown() {
        let runtime = RUNTIME.with(|rt| rt.borrow_mut().take());
        if let Some(runtime) = runtime {
            runtime.teardown();
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run()
}

/// Stop the frame loop and detach input listeners
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn teardown() {
    wasm_game::teardown();
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use tile_runner::game::{FrameHandle, FrameRenderer, FrameScheduler, Game, SnapshotObserver};
    use tile_runner::renderer::frame_shapes;
    use tile_runner::sim::{GameEvent, Snapshot, World, build_level};
    use tile_runner::Tuning;

    /// Frames simulated by the scripted run (~60 seconds of play)
    const FRAMES: u32 = 3600;

    #[derive(Default)]
    struct ImmediateScheduler {
        next: FrameHandle,
        pending: Option<FrameHandle>,
    }

    impl FrameScheduler for ImmediateScheduler {
        fn request_frame(&mut self) -> Option<FrameHandle> {
            self.next += 1;
            self.pending = Some(self.next);
            self.pending
        }

        fn cancel_frame(&mut self, handle: FrameHandle) {
            if self.pending == Some(handle) {
                self.pending = None;
            }
        }
    }

    /// Builds the draw list without painting it
    #[derive(Default)]
    struct ShapeCounter {
        rects: usize,
    }

    impl FrameRenderer for ShapeCounter {
        fn render(&mut self, world: &World) {
            self.rects += frame_shapes(world).len();
        }
    }

    #[derive(Default)]
    struct HudLog {
        published: usize,
        last: Option<Snapshot>,
    }

    impl SnapshotObserver for HudLog {
        fn publish(&mut self, snapshot: &Snapshot) {
            self.published += 1;
            if self.last.as_ref().map(|s| s.status) != Some(snapshot.status) {
                log::info!("Status {}", snapshot.status.as_str());
            }
            self.last = Some(snapshot.clone());
        }

        fn event(&mut self, event: &GameEvent) {
            log::debug!("{event:?}");
        }
    }

    /// Run right with periodic jumps until the session ends
    pub fn run() {
        let tuning = Tuning::load();
        let frame_ms = tuning.frame_ms as f64;
        let mut game = Game::new(World::new(build_level(), tuning));

        let mut scheduler = ImmediateScheduler::default();
        let mut renderer = ShapeCounter::default();
        let mut hud = HudLog::default();

        game.start(&mut scheduler);
        game.input.right = true;
        game.input.run = true;

        for i in 0..FRAMES {
            if scheduler.pending.take().is_none() {
                break;
            }
            game.input.jump = i % 45 < 14;
            game.frame(i as f64 * frame_ms, &mut scheduler, &mut renderer, &mut hud);
            if game.world.status().is_terminal() {
                break;
            }
        }
        game.stop(&mut scheduler);

        log::info!(
            "{} frames, {} rects drawn, {} snapshots published",
            game.frames(),
            renderer.rects,
            hud.published
        );
        match serde_json::to_string_pretty(game.world.snapshot()) {
            Ok(json) => println!("{json}"),
            Err(e) => log::error!("Failed to serialize snapshot: {e}"),
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Tile Runner (native) starting...");
    log::info!("Native mode runs a headless scripted session - run with `trunk serve` for the web version");

    headless::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
