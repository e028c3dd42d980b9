use std::time::Instant;

/// Logs how long a phase took when it goes out of scope.
pub struct ScopedTimer {
    phase: String,
    start: Instant,
}

impl ScopedTimer {
    pub fn new(phase: impl Into<String>) -> Self {
        let phase = phase.into();
        log::debug!("{} started", phase);
        Self {
            phase,
            start: Instant::now(),
        }
    }

    pub fn elapsed_ms(&self) -> u128 {
        self.start.elapsed().as_millis()
    }
}

impl Drop for ScopedTimer {
    fn drop(&mut self) {
        log::info!("{} took {} ms", self.phase, self.elapsed_ms());
    }
}
