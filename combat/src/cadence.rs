/// Fixed-interval repeating timer driven by the host's frame delta.
///
/// `advance` returns how many periods elapsed so the caller can run its callback that many
/// times, the way a looping engine timer catches up after a long frame.
#[derive(Clone, Debug, PartialEq)]
pub struct RepeatingTimer {
    interval: f32,
    accumulated: f32,
    running: bool,
}

impl RepeatingTimer {
    pub fn new(interval: f32) -> Self {
        Self {
            interval,
            accumulated: 0.0,
            running: false,
        }
    }

    /// (Re)start the timer from zero. The first period fires one `interval` later.
    pub fn start(&mut self, interval: f32) {
        self.interval = interval;
        self.accumulated = 0.0;
        self.running = true;
    }

    pub fn cancel(&mut self) {
        self.running = false;
        self.accumulated = 0.0;
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.running
    }

    #[inline]
    pub fn interval(&self) -> f32 {
        self.interval
    }

    /// Advance by `dt` seconds and return the number of periods that elapsed.
    ///
    /// A non-positive interval fires once per call with a positive `dt`.
    pub fn advance(&mut self, dt: f32) -> u32 {
        if !self.running || !(dt > 0.0) {
            return 0;
        }
        if !(self.interval > 0.0) {
            return 1;
        }

        self.accumulated += dt;
        let mut fired = 0;
        while self.accumulated >= self.interval {
            self.accumulated -= self.interval;
            fired += 1;
        }
        fired
    }
}
