//! Web Audio sink: one short oscillator voice per note.

use wasm_bindgen::JsValue;
use web_sys::{AudioContext, OscillatorType};

use crate::chart::NoteDescriptor;
use crate::session::AudioSink;

const MIN_DURATION_S: f64 = 0.08;
const MAX_GAIN: f32 = 0.3;

pub(crate) fn midi_to_hz(pitch: u8) -> f32 {
    440.0 * 2f32.powf((pitch as f32 - 69.0) / 12.0)
}

pub(crate) fn velocity_gain(velocity: u8) -> f32 {
    (velocity.min(127) as f32 / 127.0) * MAX_GAIN
}

fn waveform(instrument: &str) -> OscillatorType {
    match instrument.to_ascii_lowercase().as_str() {
        "piano" | "guitar" | "harp" => OscillatorType::Triangle,
        "violin" | "cello" | "trumpet" | "saxophone" => OscillatorType::Sawtooth,
        "bass" | "bass guitar" | "organ" => OscillatorType::Square,
        _ => OscillatorType::Sine,
    }
}

/// Lazily created so pages that never make a sound never open a context.
#[derive(Default)]
pub struct WebAudio {
    ctx: Option<AudioContext>,
}

impl WebAudio {
    fn context(&mut self) -> Result<&AudioContext, JsValue> {
        if self.ctx.is_none() {
            self.ctx = Some(AudioContext::new()?);
        }
        self.ctx
            .as_ref()
            .ok_or_else(|| JsValue::from_str("audio context unavailable"))
    }

    /// Browsers keep contexts suspended until a user gesture; call from input
    /// handlers.
    pub fn resume(&mut self) {
        match self.context() {
            Ok(ctx) => {
                if let Err(e) = ctx.resume() {
                    log::warn!("audio context did not resume: {e:?}");
                }
            }
            Err(e) => log::warn!("audio context unavailable: {e:?}"),
        }
    }

    fn try_play(&mut self, note: &NoteDescriptor) -> Result<(), JsValue> {
        let ctx = self.context()?;
        let now = ctx.current_time();
        let stop_at = now + note.duration().max(MIN_DURATION_S);

        let osc = ctx.create_oscillator()?;
        osc.set_type(waveform(&note.instrument));
        osc.frequency().set_value(midi_to_hz(note.pitch));

        let gain = ctx.create_gain()?;
        let level = gain.gain();
        level.set_value_at_time(velocity_gain(note.velocity), now)?;
        level.linear_ramp_to_value_at_time(0.0, stop_at)?;

        osc.connect_with_audio_node(&gain)?;
        gain.connect_with_audio_node(&ctx.destination())?;
        osc.start_with_when(now)?;
        osc.stop_with_when(stop_at)?;
        Ok(())
    }
}

impl AudioSink for WebAudio {
    fn play(&mut self, note: &NoteDescriptor) {
        if let Err(e) = self.try_play(note) {
            log::warn!("could not play {} pitch {}: {e:?}", note.instrument, note.pitch);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn concert_pitch_and_octaves() {
        assert!((midi_to_hz(69) - 440.0).abs() < 1e-3);
        assert!((midi_to_hz(81) - 880.0).abs() < 1e-2);
        assert!((midi_to_hz(60) - 261.63).abs() < 0.01);
    }

    #[test]
    fn gain_scales_with_velocity() {
        assert_eq!(velocity_gain(0), 0.0);
        assert!((velocity_gain(127) - MAX_GAIN).abs() < f32::EPSILON);
        assert!(velocity_gain(64) < velocity_gain(100));
    }
}
