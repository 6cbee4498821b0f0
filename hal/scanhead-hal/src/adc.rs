//! Light sensor ADC abstractions

/// Light-dependent resistor channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LdrChannel {
    /// Left sensor
    Ldr1,
    /// Right sensor
    Ldr2,
}

impl LdrChannel {
    /// Both channels, in conversion order
    pub const ALL: [LdrChannel; 2] = [LdrChannel::Ldr1, LdrChannel::Ldr2];
}

/// ADC driving the two light sensors
///
/// A conversion samples both configured channels; the result is delivered
/// asynchronously as an event, never returned from `start_conversion`.
pub trait LdrAdc {
    /// Route a light sensor channel to the ADC
    fn configure_channel(&mut self, channel: LdrChannel);

    /// Power down the ADC and drop all channel configuration
    fn disable_adc(&mut self);

    /// Request one conversion of every configured channel
    fn start_conversion(&mut self);
}
