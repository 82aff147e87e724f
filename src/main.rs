//! Gate Glider entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::JsCast;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, HtmlCanvasElement, KeyboardEvent, PointerEvent};

    use gate_glider::Game;
    use gate_glider::persistence::LocalStorage;
    use gate_glider::platform::FrameLoop;
    use gate_glider::platform::web::{AnimationFrameScheduler, FrameCallback};
    use gate_glider::sim::{GamePhase, TokenKind};

    // Hand the frame snapshot to whatever drawing script the page installed
    #[wasm_bindgen(inline_js = "
        export function draw_frame(json) {
            const draw = window.gateGliderDraw;
            if (typeof draw === 'function') {
                draw(JSON.parse(json));
            }
        }
    ")]
    extern "C" {
        fn draw_frame(json: &str);
    }

    /// Game instance plus its frame loop
    struct App {
        game: Game<LocalStorage>,
        frames: FrameLoop<AnimationFrameScheduler>,
    }

    impl App {
        fn start(&mut self) {
            let seed = js_sys::Date::now() as u64;
            if self.game.start(seed) {
                self.frames.start();
                update_hud(&self.game);
                publish_view(&self.game);
            }
        }

        fn on_frame(&mut self, time: f64) {
            if !self.frames.on_frame() {
                return;
            }
            let events = self.game.frame(time);
            publish_view(&self.game);
            if !events.is_empty() {
                update_hud(&self.game);
            }
            if self.game.phase() == GamePhase::Playing {
                self.frames.start();
            }
        }
    }

    fn document() -> Option<Document> {
        web_sys::window()?.document()
    }

    fn set_text(document: &Document, id: &str, text: &str) {
        if let Some(el) = document.get_element_by_id(id) {
            el.set_text_content(Some(text));
        }
    }

    fn set_visible(document: &Document, id: &str, visible: bool) {
        if let Some(el) = document.get_element_by_id(id) {
            let _ = el.set_attribute("class", if visible { "" } else { "hidden" });
        }
    }

    fn publish_view<S: gate_glider::persistence::Storage>(game: &Game<S>) {
        match serde_json::to_string(&game.view()) {
            Ok(json) => draw_frame(&json),
            Err(e) => log::warn!("Could not encode frame view: {}", e),
        }
    }

    /// Update HUD elements in DOM
    fn update_hud(game: &Game<LocalStorage>) {
        let Some(document) = document() else {
            return;
        };

        set_text(&document, "hud-score", &game.score().to_string());
        set_text(&document, "hud-best", &game.best_score().to_string());
        for kind in TokenKind::ALL {
            let text = format!(
                "{} / {}",
                game.run_tokens().get(kind),
                game.best_tokens().get(kind)
            );
            set_text(&document, &format!("token-{}", kind.as_str()), &text);
        }

        set_visible(&document, "start-screen", game.phase() == GamePhase::Start);
        let over = game.phase() == GamePhase::GameOver;
        set_visible(&document, "game-over", over);
        if over {
            set_text(&document, "final-score", &game.score().to_string());
            let new_best = game.last_outcome().is_some_and(|o| o.new_high_score);
            set_visible(&document, "new-best", new_best);
        }
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        let _ = console_log::init_with_level(log::Level::Info);

        log::info!("Gate Glider starting...");

        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))?;
        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .ok_or_else(|| JsValue::from_str("no canvas"))?
            .dyn_into()?;

        let seed = js_sys::Date::now() as u64;
        let callback: FrameCallback = Rc::new(RefCell::new(None));
        let app = Rc::new(RefCell::new(App {
            game: Game::new(LocalStorage, seed),
            frames: FrameLoop::new(AnimationFrameScheduler::new(callback.clone())),
        }));

        {
            let app = app.clone();
            *callback.borrow_mut() = Some(Closure::<dyn FnMut(f64)>::new(move |time: f64| {
                app.borrow_mut().on_frame(time);
            }));
        }

        setup_input_handlers(&window, &canvas, app.clone())?;
        setup_start_button(&document, app.clone())?;
        setup_teardown(&window, app.clone())?;

        {
            let app = app.borrow();
            update_hud(&app.game);
            publish_view(&app.game);
        }

        log::info!("Gate Glider ready");
        Ok(())
    }

    fn setup_input_handlers(
        window: &web_sys::Window,
        canvas: &HtmlCanvasElement,
        app: Rc<RefCell<App>>,
    ) -> Result<(), JsValue> {
        // Keyboard: Space bounces, Enter starts
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut a = app.borrow_mut();
                match event.key().as_str() {
                    " " => {
                        event.prevent_default();
                        a.game.impulse();
                    }
                    "Enter" => a.start(),
                    _ => {}
                }
            });
            window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Pointer press on the play surface (mouse and touch)
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                event.prevent_default();
                app.borrow_mut().game.impulse();
            });
            canvas
                .add_event_listener_with_callback("pointerdown", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        Ok(())
    }

    fn setup_start_button(document: &Document, app: Rc<RefCell<App>>) -> Result<(), JsValue> {
        for id in ["start-btn", "restart-btn"] {
            if let Some(btn) = document.get_element_by_id(id) {
                let app = app.clone();
                let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                    app.borrow_mut().start();
                });
                btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
                closure.forget();
            }
        }
        Ok(())
    }

    /// Stop the frame loop when the page goes away so no callback fires after teardown
    fn setup_teardown(window: &web_sys::Window, app: Rc<RefCell<App>>) -> Result<(), JsValue> {
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            app.borrow_mut().frames.stop();
            log::info!("Frame loop stopped");
        });
        window.add_event_listener_with_callback("pagehide", closure.as_ref().unchecked_ref())?;
        closure.forget();
        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Headless autopilot runs for native builds
#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use gate_glider::Game;
    use gate_glider::persistence::Storage;
    use gate_glider::platform::{FrameLoop, ManualScheduler};
    use gate_glider::sim::{GameEvent, GamePhase, TokenKind};

    /// 60 Hz display
    const FRAME_MS: f64 = 1000.0 / 60.0;
    /// Give up on a run after five simulated minutes
    const MAX_FRAMES: u64 = 60 * 60 * 5;

    pub struct RunSummary {
        pub score: u32,
        pub frames: u64,
        pub finished: bool,
    }

    /// Play one run with the autopilot, persisting records through `storage`
    pub fn play_run<S: Storage>(storage: S, seed: u64) -> RunSummary {
        let mut game = Game::new(storage, seed);
        game.idle_mode = true;
        game.start(seed);

        let mut frames = FrameLoop::new(ManualScheduler::new(FRAME_MS));
        frames.start();
        let mut count = 0;

        while let Some(now) = frames.scheduler_mut().fire() {
            if !frames.on_frame() {
                continue;
            }
            count += 1;
            for event in game.frame(now) {
                match event {
                    GameEvent::SpeedUp { level, speed } => {
                        log::info!("Level {} (speed {:.2})", level, speed)
                    }
                    GameEvent::TokenCollected { kind, count } => {
                        log::debug!("{} token x{}", kind.as_str(), count)
                    }
                    GameEvent::ScoreChanged { .. } | GameEvent::RunEnded { .. } => {}
                }
            }
            if game.phase() == GamePhase::Playing && count < MAX_FRAMES {
                frames.start();
            } else {
                frames.stop();
            }
        }

        let tally: Vec<String> = TokenKind::ALL
            .iter()
            .map(|k| format!("{}={}", k.as_str(), game.run_tokens().get(*k)))
            .filter(|s| !s.ends_with("=0"))
            .collect();
        log::info!(
            "Seed {} scored {} (best {}) tokens [{}]",
            seed,
            game.score(),
            game.best_score(),
            tally.join(", ")
        );

        RunSummary {
            score: game.score(),
            frames: count,
            finished: game.phase() == GamePhase::GameOver,
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use gate_glider::persistence::FileStorage;

    env_logger::init();
    log::info!("Gate Glider (native) starting...");
    log::info!("Native mode runs the autopilot headless - run with `trunk serve` to play");

    let runs: u64 = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(5);
    let dir = std::env::var_os("GATE_GLIDER_DATA")
        .map(std::path::PathBuf::from)
        .unwrap_or_else(|| std::env::temp_dir().join("gate-glider"));
    let storage = FileStorage::new(dir);
    log::info!("Records stored in {}", storage.dir().display());

    let base_seed = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);

    for i in 0..runs {
        let summary = headless::play_run(storage.clone(), base_seed.wrapping_add(i));
        println!(
            "run {}: score {} in {} frames{}",
            i + 1,
            summary.score,
            summary.frames,
            if summary.finished { "" } else { " (capped)" }
        );
    }
}
