//! Effect registry
//!
//! Maps an effect identity plus the raw text of the form's parameter fields
//! to a ready-to-run transform. Every required field is read in declaration
//! order and must parse; nothing is defaulted.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::{
    DelayEffect, DistortionEffect, EchoEffect, Effect, FilteringMode, OverdriveEffect,
    PhaserEffect, PitchShiftEffect, TremoloEffect, TubeDistortionEffect, WahWahEffect,
};
use crate::audio::SignalBuffer;
use crate::dsp::MAX_STRETCH_FACTOR;
use crate::error::{Error, Result};
use crate::operations::time_stretch;

/// The closed set of selectable effects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectKind {
    Tremolo,
    Overdrive,
    Distortion,
    TubeDistortion,
    Echo,
    Delay,
    WahWah,
    PitchShift,
    Phaser,
}

impl EffectKind {
    pub const ALL: [EffectKind; 9] = [
        EffectKind::Tremolo,
        EffectKind::Overdrive,
        EffectKind::Distortion,
        EffectKind::TubeDistortion,
        EffectKind::Echo,
        EffectKind::Delay,
        EffectKind::WahWah,
        EffectKind::PitchShift,
        EffectKind::Phaser,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            EffectKind::Tremolo => "Tremolo",
            EffectKind::Overdrive => "Overdrive",
            EffectKind::Distortion => "Distortion",
            EffectKind::TubeDistortion => "Tube Distortion",
            EffectKind::Echo => "Echo",
            EffectKind::Delay => "Delay",
            EffectKind::WahWah => "Wah-Wah",
            EffectKind::PitchShift => "Pitch Shift",
            EffectKind::Phaser => "Phaser",
        }
    }

    /// Parse an effect name (case-insensitive, spaces, dashes and underscores ignored)
    pub fn from_name(name: &str) -> Option<Self> {
        let normalized: String = name
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .collect::<String>()
            .to_lowercase();

        match normalized.as_str() {
            "tremolo" => Some(EffectKind::Tremolo),
            "overdrive" => Some(EffectKind::Overdrive),
            "distortion" => Some(EffectKind::Distortion),
            "tubedistortion" | "tube" => Some(EffectKind::TubeDistortion),
            "echo" => Some(EffectKind::Echo),
            "delay" => Some(EffectKind::Delay),
            "wahwah" | "wah" => Some(EffectKind::WahWah),
            "pitchshift" | "pitch" => Some(EffectKind::PitchShift),
            "phaser" => Some(EffectKind::Phaser),
            _ => None,
        }
    }

    /// Required parameters, in the order they are read
    pub fn params(self) -> &'static [Param] {
        use Param::*;
        match self {
            EffectKind::Tremolo => &[Frequency, Index],
            EffectKind::Overdrive => &[],
            EffectKind::Distortion => &[Gain, Mix],
            EffectKind::TubeDistortion => &[Gain, Mix, Resonance, Drive],
            EffectKind::Echo | EffectKind::Delay => &[DelayTime, Decay],
            EffectKind::WahWah | EffectKind::Phaser => {
                &[LfoFrequency, MinFrequency, MaxFrequency, QFactor]
            }
            EffectKind::PitchShift => &[ShiftAmount],
        }
    }
}

impl fmt::Display for EffectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// One named text field of the parameter form
///
/// Fields are shared between effects the way the form shares its text boxes,
/// e.g. `Gain`/`Mix` feed both distortions and `ShiftAmount` doubles as the
/// time-stretch factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Param {
    Frequency,
    Index,
    Gain,
    Mix,
    Resonance,
    Drive,
    DelayTime,
    Decay,
    LfoFrequency,
    MinFrequency,
    MaxFrequency,
    QFactor,
    ShiftAmount,
}

impl Param {
    pub const ALL: [Param; 13] = [
        Param::Frequency,
        Param::Index,
        Param::Gain,
        Param::Mix,
        Param::Resonance,
        Param::Drive,
        Param::DelayTime,
        Param::Decay,
        Param::LfoFrequency,
        Param::MinFrequency,
        Param::MaxFrequency,
        Param::QFactor,
        Param::ShiftAmount,
    ];

    /// Field name as typed by the user
    pub fn key(self) -> &'static str {
        match self {
            Param::Frequency => "frequency",
            Param::Index => "index",
            Param::Gain => "gain",
            Param::Mix => "mix",
            Param::Resonance => "resonance",
            Param::Drive => "drive",
            Param::DelayTime => "delay_time",
            Param::Decay => "decay",
            Param::LfoFrequency => "lfo_frequency",
            Param::MinFrequency => "min_frequency",
            Param::MaxFrequency => "max_frequency",
            Param::QFactor => "q",
            Param::ShiftAmount => "shift",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let lower = name.trim().to_lowercase().replace('-', "_");
        match lower.as_str() {
            "shift_amount" | "stretch" => Some(Param::ShiftAmount),
            "delay" => Some(Param::DelayTime),
            "q_factor" => Some(Param::QFactor),
            other => Param::ALL.into_iter().find(|p| p.key() == other),
        }
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Raw text of the parameter fields, keyed by field
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterSet {
    values: HashMap<Param, String>,
}

impl ParameterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, param: Param, text: impl Into<String>) {
        self.values.insert(param, text.into());
    }

    /// Builder-style `set`
    pub fn with(mut self, param: Param, text: impl Into<String>) -> Self {
        self.set(param, text);
        self
    }

    pub fn clear(&mut self, param: Param) {
        self.values.remove(&param);
    }

    pub fn get(&self, param: Param) -> Option<&str> {
        self.values.get(&param).map(String::as_str)
    }

    /// Read a required field as a number that is finite in single precision
    pub fn number(&self, effect: EffectKind, param: Param) -> Result<f64> {
        let text = self.get(param).unwrap_or("");
        text.trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite() && (*v as f32).is_finite())
            .ok_or_else(|| Error::ParameterFormat {
                effect,
                param,
                text: text.to_string(),
            })
    }
}

fn positive(effect: EffectKind, param: Param, value: f64) -> Result<f64> {
    if value > 0.0 {
        Ok(value)
    } else {
        Err(Error::ParameterRange {
            effect,
            param,
            value,
            expected: "> 0",
        })
    }
}

/// Shift / stretch factors share one bound, whichever path reads them
fn shift_factor(effect: EffectKind, value: f64) -> Result<f64> {
    let value = positive(effect, Param::ShiftAmount, value)?;
    if value <= MAX_STRETCH_FACTOR {
        Ok(value)
    } else {
        Err(Error::ParameterRange {
            effect,
            param: Param::ShiftAmount,
            value,
            expected: "<= 16",
        })
    }
}

fn non_negative(effect: EffectKind, param: Param, value: f64) -> Result<f64> {
    if value >= 0.0 {
        Ok(value)
    } else {
        Err(Error::ParameterRange {
            effect,
            param,
            value,
            expected: ">= 0",
        })
    }
}

/// Validated parameters, one variant per effect identity
#[derive(Debug, Clone, PartialEq)]
pub enum EffectSettings {
    Tremolo(TremoloEffect),
    Overdrive(OverdriveEffect),
    Distortion(DistortionEffect),
    TubeDistortion(TubeDistortionEffect),
    Echo(EchoEffect),
    Delay(DelayEffect),
    WahWah(WahWahEffect),
    PitchShift(PitchShiftEffect),
    Phaser(PhaserEffect),
}

impl EffectSettings {
    /// Read and validate the fields `kind` requires
    pub fn from_params(kind: EffectKind, params: &ParameterSet) -> Result<Self> {
        let num = |param: Param| params.number(kind, param);

        let settings = match kind {
            EffectKind::Tremolo => {
                let frequency = num(Param::Frequency)?;
                let index = num(Param::Index)?;
                EffectSettings::Tremolo(TremoloEffect::new(frequency as f32, index as f32))
            }
            EffectKind::Overdrive => EffectSettings::Overdrive(OverdriveEffect::new()),
            EffectKind::Distortion => {
                let gain = num(Param::Gain)?;
                let mix = num(Param::Mix)?;
                EffectSettings::Distortion(DistortionEffect::new(gain as f32, mix as f32))
            }
            EffectKind::TubeDistortion => {
                let gain = num(Param::Gain)?;
                let mix = num(Param::Mix)?;
                let resonance = num(Param::Resonance)?;
                let drive = positive(kind, Param::Drive, num(Param::Drive)?)?;
                EffectSettings::TubeDistortion(TubeDistortionEffect::new(
                    gain as f32,
                    mix as f32,
                    resonance as f32,
                    drive as f32,
                ))
            }
            EffectKind::Echo | EffectKind::Delay => {
                let delay_time = non_negative(kind, Param::DelayTime, num(Param::DelayTime)?)?;
                let decay = num(Param::Decay)?;
                if kind == EffectKind::Echo {
                    EffectSettings::Echo(EchoEffect::new(delay_time as f32, decay as f32))
                } else {
                    EffectSettings::Delay(DelayEffect::new(delay_time as f32, decay as f32))
                }
            }
            EffectKind::WahWah | EffectKind::Phaser => {
                let lfo_frequency = num(Param::LfoFrequency)?;
                let min = positive(kind, Param::MinFrequency, num(Param::MinFrequency)?)?;
                let max = positive(kind, Param::MaxFrequency, num(Param::MaxFrequency)?)?;
                let q = positive(kind, Param::QFactor, num(Param::QFactor)?)?;
                let (lfo, min, max, q) = (lfo_frequency as f32, min as f32, max as f32, q as f32);
                if kind == EffectKind::WahWah {
                    EffectSettings::WahWah(WahWahEffect::new(lfo, min, max, q))
                } else {
                    EffectSettings::Phaser(PhaserEffect::new(lfo, min, max, q))
                }
            }
            EffectKind::PitchShift => {
                let shift = shift_factor(kind, num(Param::ShiftAmount)?)?;
                EffectSettings::PitchShift(PitchShiftEffect::new(shift as f32))
            }
        };

        Ok(settings)
    }

    pub fn kind(&self) -> EffectKind {
        match self {
            EffectSettings::Tremolo(_) => EffectKind::Tremolo,
            EffectSettings::Overdrive(_) => EffectKind::Overdrive,
            EffectSettings::Distortion(_) => EffectKind::Distortion,
            EffectSettings::TubeDistortion(_) => EffectKind::TubeDistortion,
            EffectSettings::Echo(_) => EffectKind::Echo,
            EffectSettings::Delay(_) => EffectKind::Delay,
            EffectSettings::WahWah(_) => EffectKind::WahWah,
            EffectSettings::PitchShift(_) => EffectKind::PitchShift,
            EffectSettings::Phaser(_) => EffectKind::Phaser,
        }
    }

    /// Bind into a ready-to-run effect instance
    pub fn into_effect(self) -> Box<dyn Effect> {
        match self {
            EffectSettings::Tremolo(e) => Box::new(e),
            EffectSettings::Overdrive(e) => Box::new(e),
            EffectSettings::Distortion(e) => Box::new(e),
            EffectSettings::TubeDistortion(e) => Box::new(e),
            EffectSettings::Echo(e) => Box::new(e),
            EffectSettings::Delay(e) => Box::new(e),
            EffectSettings::WahWah(e) => Box::new(e),
            EffectSettings::PitchShift(e) => Box::new(e),
            EffectSettings::Phaser(e) => Box::new(e),
        }
    }
}

/// What an apply request resolves to
pub enum Transform {
    Effect(Box<dyn Effect>),
    /// Duration change; chosen for PitchShift with the true-pitch-shift toggle off
    TimeStretch { factor: f64 },
}

impl Transform {
    pub fn apply(&self, signal: &SignalBuffer, mode: FilteringMode) -> Result<SignalBuffer> {
        match self {
            Transform::Effect(effect) => {
                log::debug!(
                    "Applying {} ({:?})",
                    effect.name(),
                    mode.resolve(effect.preferred_mode(signal.sample_rate()))
                );
                Ok(effect.apply(signal, mode))
            }
            Transform::TimeStretch { factor } => time_stretch(signal, *factor),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Transform::Effect(effect) => effect.name().to_string(),
            Transform::TimeStretch { factor } => format!("TimeStretch(x{})", factor),
        }
    }
}

impl fmt::Debug for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transform::Effect(effect) => f.debug_tuple("Effect").field(&effect.name()).finish(),
            Transform::TimeStretch { factor } => f
                .debug_struct("TimeStretch")
                .field("factor", factor)
                .finish(),
        }
    }
}

/// Current state of the effect form: selection, field text and the
/// true-pitch-shift toggle. Read in full on every apply.
#[derive(Debug, Clone, Default)]
pub struct EffectForm {
    pub selected: Option<EffectKind>,
    pub params: ParameterSet,
    pub true_pitch_shift: bool,
}

impl EffectForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(&mut self, kind: EffectKind) {
        self.selected = Some(kind);
    }

    /// Resolve the form into an effect instance or a stretch directive
    pub fn transform(&self) -> Result<Transform> {
        let kind = self.selected.ok_or_else(|| {
            Error::UnsupportedCombination(if self.true_pitch_shift {
                "true pitch shift is enabled but no effect is selected".to_string()
            } else {
                "no effect selected".to_string()
            })
        })?;

        if kind == EffectKind::PitchShift && !self.true_pitch_shift {
            // Same field, reinterpreted as a duration factor
            let factor = shift_factor(kind, self.params.number(kind, Param::ShiftAmount)?)?;
            log::debug!("PitchShift without true pitch shift -> time stretch x{}", factor);
            return Ok(Transform::TimeStretch { factor });
        }

        Ok(Transform::Effect(
            EffectSettings::from_params(kind, &self.params)?.into_effect(),
        ))
    }
}
