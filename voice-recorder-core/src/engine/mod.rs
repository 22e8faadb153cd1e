pub mod capture;
mod gate;
pub mod playback;
