/// Seconds accumulated from frame deltas since the owning scene was built.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ElapsedClock {
    secs: f64,
}

impl ElapsedClock {
    /// A clock at `t = 0`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one frame delta. Negative and non-finite deltas are ignored so `t` never decreases.
    pub fn advance(&mut self, delta_secs: f64) -> f64 {
        if delta_secs.is_finite() && delta_secs > 0.0 {
            self.secs += delta_secs;
        }
        self.secs
    }

    /// Current elapsed seconds.
    pub fn secs(&self) -> f64 {
        self.secs
    }
}
