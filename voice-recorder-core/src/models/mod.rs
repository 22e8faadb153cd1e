pub mod config;
pub mod error;
pub mod sample;
pub mod state;
