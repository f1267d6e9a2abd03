pub mod distortion;
pub mod echo;
pub mod effect_trait;
pub mod overdrive;
pub mod phaser;
pub mod pitch_shift;
pub mod registry;
pub mod tremolo;
pub mod wahwah;

pub use distortion::{DistortionEffect, TubeDistortionEffect};
pub use echo::{DelayEffect, EchoEffect};
pub use effect_trait::{Effect, FilteringMode};
pub use overdrive::OverdriveEffect;
pub use phaser::PhaserEffect;
pub use pitch_shift::PitchShiftEffect;
pub use registry::{EffectForm, EffectKind, EffectSettings, Param, ParameterSet, Transform};
pub use tremolo::TremoloEffect;
pub use wahwah::WahWahEffect;
