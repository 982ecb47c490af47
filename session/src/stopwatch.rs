use std::time::Duration;

/// How often drivers should call [`GameSession::tick`](crate::GameSession::tick), one elapsed unit per tick.
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Tick counter owned by a session, only advances while running.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Stopwatch {
    elapsed: u32,
    running: bool,
}

impl Stopwatch {
    /// Resets to zero and starts counting.
    pub fn start(&mut self) {
        self.elapsed = 0;
        self.running = true;
    }

    /// Stops counting, returns whether it was running. Stopping twice is harmless.
    pub fn stop(&mut self) -> bool {
        std::mem::replace(&mut self.running, false)
    }

    pub fn tick(&mut self) {
        if self.running {
            self.elapsed = self.elapsed.saturating_add(1);
        }
    }

    pub fn elapsed(&self) -> u32 {
        self.elapsed
    }

    pub fn is_running(&self) -> bool {
        self.running
    }
}
