use crate::models::sample::BarFrame;

/// Bar-graph sink fed by the control loop.
pub trait Display {
    fn render(&mut self, frame: &BarFrame);
}
