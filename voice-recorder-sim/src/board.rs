use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use voice_recorder_core::{
    DeviceContext, RecorderConfig, RecorderError, SessionController, VisualizationFeed,
};

use crate::adc::SimAdc;
use crate::clock::SimClock;
use crate::display::FrameLog;
use crate::dma::SimDma;
use crate::pwm::SimPwm;
use crate::signal::Signal;
use crate::status::RgbLed;
use crate::timer::SimTimer;

/// Control-loop period of the reference firmware, in device time.
const LOOP_PERIOD: Duration = Duration::from_millis(100);

pub type SimController = SessionController<SimAdc, SimDma, SimPwm, SimTimer>;

/// A complete simulated device: peripherals, core and control-loop state.
///
/// ```text
/// [Signal] → SimAdc ─→ SimDma ─IRQ→ SessionController ─→ SimTimer ─IRQ→ SimPwm
///                                          │
///                           VisualizationFeed → FrameLog        RgbLed
/// ```
pub struct SimBoard {
    controller: Arc<SimController>,
    adc: SimAdc,
    pwm: SimPwm,
    led: Arc<RgbLed>,
    feed: VisualizationFeed,
    display: FrameLog,
    clock: SimClock,
}

impl SimBoard {
    pub fn new(config: RecorderConfig, signal: Signal, clock: SimClock) -> Result<Self, RecorderError> {
        let led = Arc::new(RgbLed::default());
        let context = DeviceContext::new(config, led.clone())?;
        let config = context.config();

        let adc = SimAdc::new(signal, config.sample_rate, config.sample_bits);
        let pwm = SimPwm::new(config.pwm_wrap);
        let dma = SimDma::new(adc.clone(), clock);
        let timer = SimTimer::new(clock);
        let feed = VisualizationFeed::new(&context);

        let controller = SessionController::new(context, adc.clone(), dma, pwm.clone(), timer)?;

        Ok(Self {
            controller,
            adc,
            pwm,
            led,
            feed,
            display: FrameLog::default(),
            clock,
        })
    }

    pub fn controller(&self) -> &Arc<SimController> {
        &self.controller
    }

    pub fn adc(&self) -> &SimAdc {
        &self.adc
    }

    pub fn pwm(&self) -> &SimPwm {
        &self.pwm
    }

    pub fn led(&self) -> &RgbLed {
        &self.led
    }

    pub fn display(&self) -> &FrameLog {
        &self.display
    }

    /// One control-loop pass: draw the latest completed block, if any.
    pub fn poll_display(&mut self) -> bool {
        self.feed.pump(&mut self.display)
    }

    /// Run the control loop until the session is idle again.
    ///
    /// Returns `false` if `timeout` (wall clock) passes first.
    pub fn run_until_idle(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let period = self.clock.scale(LOOP_PERIOD);
        loop {
            self.poll_display();
            if self.controller.session().is_idle() {
                // Pick up the block that ended the recording.
                self.poll_display();
                return true;
            }
            if Instant::now() >= deadline {
                return false;
            }
            thread::sleep(period);
        }
    }
}
