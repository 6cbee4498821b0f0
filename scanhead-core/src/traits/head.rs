//! The sensor head as one collaborator

use scanhead_hal::{EchoTrigger, InterruptMask, LdrAdc, Readout, SamplingTimers, ServoPwm};

/// Every peripheral the dispatcher arbitrates between modes
///
/// Automatically implemented for any type providing all the parts.
pub trait SensorHead:
    SamplingTimers + LdrAdc + ServoPwm + EchoTrigger + InterruptMask + Readout
{
}

impl<T> SensorHead for T where
    T: SamplingTimers + LdrAdc + ServoPwm + EchoTrigger + InterruptMask + Readout
{
}
