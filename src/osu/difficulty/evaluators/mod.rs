pub use self::{
    aim::AimEvaluator, flashlight::FlashlightEvaluator, rhythm::RhythmEvaluator,
    speed::SpeedEvaluator,
};

mod aim;
mod flashlight;
mod rhythm;
mod speed;
