pub mod capture_buffer;
pub mod duty;
pub mod levels;
