pub mod block_transfer;
pub mod display;
pub mod periodic_timer;
pub mod pwm_output;
pub mod sampling;
pub mod status_indicator;
