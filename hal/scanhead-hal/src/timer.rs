//! Hardware timer abstractions
//!
//! The head uses two independent timers: one paces sampling (servo settling,
//! playback steps), the other captures the ultrasonic echo pulse width.

/// Timer identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimerId {
    /// Periodic sampling tick
    Sampling,
    /// Echo pulse-width capture
    EchoCapture,
}

/// Enable/disable/reset entry points for the sampling timers
pub trait SamplingTimers {
    /// Start the timer and its interrupt
    fn enable_timer(&mut self, timer: TimerId);

    /// Stop the timer and mask its interrupt
    fn disable_timer(&mut self, timer: TimerId);

    /// Restart the timer count from zero
    fn reset_timer(&mut self, timer: TimerId);
}
