//! Canvas render sink: lanes, hit zone, falling circles, score and game over.

use wasm_bindgen::JsValue;
use web_sys::{CanvasRenderingContext2d, Element, HtmlCanvasElement};

use crate::chart::Lane;
use crate::config::Rules;
use crate::game::GameState;
use crate::session::RenderSink;

// Lane colors, lane one first.
const LANE_COLORS: [&str; 4] = ["#2ecc40", "#ff4136", "#0074d9", "#ffdc00"];
const NOTE_RADIUS: f64 = 14.0;

/// Horizontal center of a lane: 20 / 40 / 60 / 80 % of the canvas width.
pub(crate) fn lane_x(lane: Lane, width: f64) -> f64 {
    width * (lane.index() as f64 + 1.0) / 5.0
}

pub struct CanvasRenderer {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    score_el: Option<Element>,
    rules: Rules,
    pressed: [bool; 4],
}

impl CanvasRenderer {
    pub fn new(
        canvas: HtmlCanvasElement,
        ctx: CanvasRenderingContext2d,
        score_el: Option<Element>,
        rules: Rules,
    ) -> Self {
        Self {
            canvas,
            ctx,
            score_el,
            rules,
            pressed: [false; 4],
        }
    }

    /// Returns true when the highlight actually changed.
    pub fn set_pressed(&mut self, lane: Lane, down: bool) -> bool {
        let slot = &mut self.pressed[lane.index()];
        let changed = *slot != down;
        *slot = down;
        changed
    }

    pub fn paint(&self, state: &GameState) {
        if let Err(e) = self.try_paint(state) {
            log::warn!("render failed: {e:?}");
        }
        if let Some(el) = &self.score_el {
            el.set_text_content(Some(&format!("Score: {}", state.score)));
        }
    }

    fn try_paint(&self, state: &GameState) -> Result<(), JsValue> {
        let ctx = &self.ctx;
        let w = self.canvas.width() as f64;
        let h = self.canvas.height() as f64;

        ctx.set_fill_style_str("#141414");
        ctx.fill_rect(0.0, 0.0, w, h);

        // Lane guides, brighter while the lane key is held
        ctx.set_line_width(2.0);
        for lane in Lane::ALL {
            let x = lane_x(lane, w);
            if self.pressed[lane.index()] {
                ctx.set_global_alpha(0.25);
                ctx.set_fill_style_str(LANE_COLORS[lane.index()]);
                ctx.fill_rect(x - NOTE_RADIUS - 4.0, 0.0, 2.0 * (NOTE_RADIUS + 4.0), h);
                ctx.set_global_alpha(1.0);
            }
            ctx.set_stroke_style_str("#2a2a2a");
            ctx.begin_path();
            ctx.move_to(x, 0.0);
            ctx.line_to(x, h);
            ctx.stroke();
        }

        // Hit zone band and exit line
        ctx.set_fill_style_str("rgba(255,255,255,0.10)");
        ctx.fill_rect(0.0, self.rules.hit_low, w, self.rules.hit_high - self.rules.hit_low);
        ctx.set_stroke_style_str("#888888");
        ctx.begin_path();
        ctx.move_to(0.0, self.rules.exit_threshold);
        ctx.line_to(w, self.rules.exit_threshold);
        ctx.stroke();

        // Receptors at the hit line
        for lane in Lane::ALL {
            ctx.set_stroke_style_str(LANE_COLORS[lane.index()]);
            ctx.begin_path();
            ctx.arc(
                lane_x(lane, w),
                self.rules.exit_threshold,
                NOTE_RADIUS,
                0.0,
                std::f64::consts::TAU,
            )?;
            ctx.stroke();
        }

        for note in &state.active {
            ctx.set_fill_style_str(LANE_COLORS[note.lane.index()]);
            ctx.begin_path();
            ctx.arc(
                lane_x(note.lane, w),
                note.position,
                NOTE_RADIUS,
                0.0,
                std::f64::consts::TAU,
            )?;
            ctx.fill();
        }

        if state.ended {
            ctx.set_fill_style_str("rgba(0,0,0,0.6)");
            ctx.fill_rect(0.0, 0.0, w, h);
            ctx.set_fill_style_str("#ffffff");
            ctx.set_stroke_style_str("#000000");
            ctx.set_line_width(4.0);
            ctx.set_text_align("center");
            ctx.set_font("28px 'Fira Code', monospace");
            ctx.stroke_text("GAME OVER", w / 2.0, h / 2.0)?;
            ctx.fill_text("GAME OVER", w / 2.0, h / 2.0)?;
            ctx.set_font("16px 'Fira Code', monospace");
            ctx.fill_text(&format!("Score: {}", state.score), w / 2.0, h / 2.0 + 32.0)?;
        }
        Ok(())
    }
}

impl RenderSink for CanvasRenderer {
    fn render(&mut self, state: &GameState) {
        self.paint(state);
    }
}
