//! Frame timing

use std::time::Instant;

/// Monotonic clock for the render loop
///
/// Particle birth times and the shader time uniform both read this clock, so
/// they share one origin and particle ages stay meaningful.
#[derive(Clone, Debug)]
pub struct FrameClock {
    started: Instant,
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
        }
    }

    /// Seconds since the clock started
    pub fn elapsed_secs(&self) -> f32 {
        self.started.elapsed().as_secs_f32()
    }

    /// Reset the origin to now
    pub fn restart(&mut self) {
        self.started = Instant::now();
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_is_monotonic() {
        let clock = FrameClock::new();
        let a = clock.elapsed_secs();
        let b = clock.elapsed_secs();
        assert!(a >= 0.0);
        assert!(b >= a);
    }

    #[test]
    fn restart_rewinds_origin() {
        let mut clock = FrameClock::new();
        std::thread::sleep(std::time::Duration::from_millis(5));
        let before = clock.elapsed_secs();
        clock.restart();
        assert!(clock.elapsed_secs() <= before);
    }
}
