pub use self::{
    aim::DroidAim, flashlight::DroidFlashlight, rhythm::Rhythm, tap::Tap, visual::Visual,
};

mod aim;
mod flashlight;
mod rhythm;
mod tap;
mod visual;
