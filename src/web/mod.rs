//! Browser glue: canvas, overlays, keyboard and the frame loop.
//!
//! Everything here only feeds the session (key presses, the clock) or reads
//! from it (render, audio). The session lives in a thread-local cell because a
//! wasm page has exactly one thread; every callback borrows it briefly and
//! never across another callback.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, Document, Element, HtmlCanvasElement, window};

use crate::chart::NoteDescriptor;
use crate::config::GameConfig;
use crate::game::Action;
use crate::session::Session;

mod audio;
mod render;

pub use audio::WebAudio;
pub use render::CanvasRenderer;

const CANVAS_ID: &str = "nf-canvas";
const SCORE_ID: &str = "nf-score";

struct WebGame {
    session: Session,
    renderer: CanvasRenderer,
    audio: WebAudio,
    start_ms: f64,
}

thread_local! {
    static GAME: RefCell<Option<WebGame>> = RefCell::new(None);
    static LISTENERS_INSTALLED: Cell<bool> = Cell::new(false);
    static LOOP_RUNNING: Cell<bool> = Cell::new(false);
}

fn js_err(msg: &str) -> JsValue {
    JsValue::from_str(msg)
}

fn now_ms() -> f64 {
    window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0)
}

/// Build a session for `chart`, attach it to the page and start the loop.
/// Calling again replaces the running game.
pub fn start(chart: Vec<NoteDescriptor>, config: GameConfig) -> Result<(), JsValue> {
    let win = window().ok_or_else(|| js_err("no window"))?;
    let doc = win.document().ok_or_else(|| js_err("no document"))?;

    let canvas = ensure_canvas(&doc, &config)?;
    let ctx: CanvasRenderingContext2d = canvas
        .get_context("2d")?
        .ok_or_else(|| js_err("2d context unavailable"))?
        .dyn_into()?;
    let score_el = ensure_score_overlay(&doc)?;

    let renderer = CanvasRenderer::new(canvas, ctx, Some(score_el), config.rules);
    let session = Session::new(chart, config);
    renderer.paint(session.state());

    let game = WebGame {
        session,
        renderer,
        audio: WebAudio::default(),
        start_ms: now_ms(),
    };
    GAME.with(|g| g.replace(Some(game)));

    if !LISTENERS_INSTALLED.with(Cell::get) {
        install_key_listeners(&doc)?;
        LISTENERS_INSTALLED.with(|c| c.set(true));
    }
    if !LOOP_RUNNING.with(Cell::get) {
        start_frame_loop();
    }
    Ok(())
}

fn ensure_canvas(doc: &Document, config: &GameConfig) -> Result<HtmlCanvasElement, JsValue> {
    let canvas: HtmlCanvasElement = if let Some(el) = doc.get_element_by_id(CANVAS_ID) {
        el.dyn_into()?
    } else {
        let c: HtmlCanvasElement = doc.create_element("canvas")?.dyn_into()?;
        c.set_id(CANVAS_ID);
        c.set_attribute("style", "position:fixed; left:50%; top:50%; transform:translate(-50%,-50%); border:2px solid #222; border-radius:8px; background:#141414; z-index:20;").ok();
        doc.body()
            .ok_or_else(|| js_err("no body"))?
            .append_child(&c)?;
        c
    };
    canvas.set_width(config.canvas_width);
    canvas.set_height(config.canvas_height);
    Ok(canvas)
}

fn ensure_score_overlay(doc: &Document) -> Result<Element, JsValue> {
    if let Some(el) = doc.get_element_by_id(SCORE_ID) {
        return Ok(el);
    }
    let div = doc.create_element("div")?;
    div.set_id(SCORE_ID);
    div.set_text_content(Some("Score: 0"));
    div.set_attribute("style", "position:fixed; top:10px; left:12px; font-family:'Fira Code', monospace; font-size:15px; padding:4px 8px; background:rgba(0,0,0,0.42); border:1px solid #333; border-radius:6px; color:#ffd166; z-index:45;").ok();
    doc.body()
        .ok_or_else(|| js_err("no body"))?
        .append_child(&div)?;
    Ok(div)
}

fn install_key_listeners(doc: &Document) -> Result<(), JsValue> {
    let keydown = Closure::wrap(Box::new(move |evt: web_sys::KeyboardEvent| {
        if evt.repeat() {
            return;
        }
        GAME.with(|cell| {
            if let Some(game) = cell.borrow_mut().as_mut() {
                game.audio.resume();
                if let Some(lane) = game.session.press_key(&evt.code()) {
                    if game.renderer.set_pressed(lane, true) {
                        game.renderer.paint(game.session.state());
                    }
                }
            }
        });
    }) as Box<dyn FnMut(_)>);
    doc.add_event_listener_with_callback("keydown", keydown.as_ref().unchecked_ref())?;
    keydown.forget();

    let keyup = Closure::wrap(Box::new(move |evt: web_sys::KeyboardEvent| {
        GAME.with(|cell| {
            if let Some(game) = cell.borrow_mut().as_mut() {
                if let Some(lane) = game.session.config().lane_for_key(&evt.code()) {
                    if game.renderer.set_pressed(lane, false) {
                        game.renderer.paint(game.session.state());
                    }
                }
            }
        });
    }) as Box<dyn FnMut(_)>);
    doc.add_event_listener_with_callback("keyup", keyup.as_ref().unchecked_ref())?;
    keyup.forget();
    Ok(())
}

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

fn start_frame_loop() {
    let f: FrameCallback = Rc::new(RefCell::new(None));
    let g = f.clone();
    *g.borrow_mut() = Some(Closure::wrap(Box::new(move |ts: f64| {
        let keep_going = GAME.with(|cell| match cell.borrow_mut().as_mut() {
            Some(game) => frame(game, ts),
            None => false,
        });
        if keep_going {
            request_frame(&f);
        } else {
            LOOP_RUNNING.with(|c| c.set(false));
        }
    }) as Box<dyn FnMut(f64)>));
    LOOP_RUNNING.with(|c| c.set(true));
    request_frame(&g);
}

fn request_frame(cb: &FrameCallback) {
    let Some(w) = window() else { return };
    if let Some(closure) = cb.borrow().as_ref() {
        if let Err(e) = w.request_animation_frame(closure.as_ref().unchecked_ref()) {
            log::error!("requestAnimationFrame failed: {e:?}");
        }
    }
}

/// One animation frame. Returns false once the game is over and drawn.
fn frame(game: &mut WebGame, ts: f64) -> bool {
    game.session.advance_clock(ts - game.start_ms, &mut game.audio);
    game.session.drain(&mut game.audio, &mut game.renderer);
    !game.session.is_finished()
}

/// Queue a textual action (`tick`, `activate:<id>`, `press:<1-4>`, `end`).
pub fn push_action(text: &str) -> Result<(), JsValue> {
    let action: Action = text.parse().map_err(|e| js_err(&format!("{e}")))?;
    GAME.with(|cell| match cell.borrow_mut().as_mut() {
        Some(game) => {
            game.session.push(action);
            Ok(())
        }
        None => Err(js_err("game not started")),
    })
}

#[cfg(feature = "serde_json")]
pub fn snapshot_json() -> Result<String, JsValue> {
    GAME.with(|cell| match cell.borrow().as_ref() {
        Some(game) => serde_json::to_string(&game.session.state().snapshot())
            .map_err(|e| js_err(&e.to_string())),
        None => Err(js_err("game not started")),
    })
}
