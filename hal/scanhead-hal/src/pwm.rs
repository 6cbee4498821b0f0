//! PWM outputs: servo positioning and the ranger trigger

/// Servo PWM output
///
/// The pulse width is the duty-cycle equivalent of the servo angle; the
/// angle mapping lives in the core so it can be configured and tested.
pub trait ServoPwm {
    /// Drive the servo with the given pulse width in microseconds
    fn set_servo_pulse(&mut self, pulse_us: u16);

    /// Stop driving the servo
    fn disable_servo(&mut self);
}

/// Ultrasonic ranger trigger output
pub trait EchoTrigger {
    /// Configure the trigger output
    fn enable_trigger(&mut self);

    /// Release the trigger output
    fn disable_trigger(&mut self);

    /// Emit one trigger pulse; the echo arrives later as an event
    fn fire(&mut self);
}
