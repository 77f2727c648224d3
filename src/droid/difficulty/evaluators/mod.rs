pub use self::{
    aim::DroidAimEvaluator, flashlight::DroidFlashlightEvaluator, rhythm::DroidRhythmEvaluator,
    tap::TapEvaluator, visual::VisualEvaluator,
};

mod aim;
mod flashlight;
mod rhythm;
mod tap;
mod visual;
