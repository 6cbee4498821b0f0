//! Interrupt masking

/// Run a closure with interrupts masked
///
/// Resource hand-over between modes goes through this so that no capture
/// interrupt can observe a half-configured peripheral.
pub trait InterruptMask {
    /// Mask interrupts, run `f`, then restore the previous mask state
    fn with_interrupts_masked<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R;
}
