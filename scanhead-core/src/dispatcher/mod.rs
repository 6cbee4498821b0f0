//! Top-level dispatcher
//!
//! The dispatcher owns every collaborator and all mutable state. Capture
//! code only produces [`Event`]s; the dispatcher interprets them, routes
//! them to the active mode and performs mode changes.
//!
//! A mode change runs entirely with interrupts masked:
//!
//! 1. the outgoing mode's peripherals are disabled and released
//! 2. the outgoing sub-state is replaced, dropping any upload or playback
//! 3. the incoming mode's peripherals are acquired and enabled

pub mod resources;

pub use resources::{ResourceLedger, ResourceSet, ResourcesHeld};

use scanhead_hal::{ByteTx, LdrChannel, SegmentFlash, TimerId};

use crate::config::{CalibrationTable, FlashLayout, SensorConfig};
use crate::link::{HostCommand, LinkDecoder};
use crate::modes::{Io, ModeEvent, ModeState};
use crate::sampling;
use crate::script::ScriptStore;
use crate::state::{Button, ButtonEvent, Event, Press, SystemState};
use crate::telemetry;
use crate::traits::SensorHead;

/// Owner of the sensor head and its state machines
pub struct Dispatcher<H, T, F> {
    state: SystemState,
    mode: ModeState,
    ledger: ResourceLedger,
    decoder: LinkDecoder,
    scripts: ScriptStore,
    calibration: CalibrationTable,
    head: H,
    tx: T,
    flash: F,
    config: SensorConfig,
}

impl<H: SensorHead, T: ByteTx, F: SegmentFlash> Dispatcher<H, T, F> {
    /// Load persisted state and enter the initial mode
    ///
    /// Unreadable flash yields an empty directory and a blank calibration
    /// table rather than an error.
    pub fn new(head: H, tx: T, mut flash: F, config: SensorConfig, layout: FlashLayout) -> Self {
        let scripts =
            ScriptStore::load(&mut flash, &layout).unwrap_or_else(|_| ScriptStore::new(&layout));
        let calibration = CalibrationTable::load(&mut flash, layout.calibration)
            .unwrap_or_else(|_| CalibrationTable::new(layout.calibration));

        let initial = SystemState::default();
        let mut dispatcher = Self {
            state: initial,
            mode: ModeState::initial(initial),
            ledger: ResourceLedger::new(),
            decoder: LinkDecoder::new(),
            scripts,
            calibration,
            head,
            tx,
            flash,
            config,
        };
        dispatcher.transition(initial);
        dispatcher
    }

    pub fn state(&self) -> SystemState {
        self.state
    }

    pub fn mode(&self) -> &ModeState {
        &self.mode
    }

    pub fn ledger(&self) -> &ResourceLedger {
        &self.ledger
    }

    pub fn scripts(&self) -> &ScriptStore {
        &self.scripts
    }

    pub fn calibration(&self) -> &CalibrationTable {
        &self.calibration
    }

    pub fn config(&self) -> &SensorConfig {
        &self.config
    }

    pub fn head(&self) -> &H {
        &self.head
    }

    pub fn head_mut(&mut self) -> &mut H {
        &mut self.head
    }

    pub fn tx(&self) -> &T {
        &self.tx
    }

    pub fn tx_mut(&mut self) -> &mut T {
        &mut self.tx
    }

    /// Handle one drained event
    ///
    /// Returns the new state if the event caused a mode change.
    pub fn handle_event(&mut self, event: Event) -> Option<SystemState> {
        match event {
            Event::Tick => self.dispatch(ModeEvent::Tick),
            Event::EchoCaptured { pulse_us } => {
                let cm = sampling::distance_cm(pulse_us, &self.config.ranger);
                self.dispatch(ModeEvent::Echo(cm));
            }
            Event::EchoTimeout => {
                let cm = sampling::timeout_distance_cm(&self.config.ranger);
                self.dispatch(ModeEvent::Echo(cm));
            }
            Event::LdrSampled { ldr1, ldr2 } => self.dispatch(ModeEvent::Light {
                ldr1: sampling::light_level(ldr1),
                ldr2: sampling::light_level(ldr2),
            }),
            Event::LdrFailed => self.dispatch(ModeEvent::Light {
                ldr1: sampling::LIGHT_LEVEL_MAX,
                ldr2: sampling::LIGHT_LEVEL_MAX,
            }),
            Event::Button(button) => return self.handle_button_event(button),
            Event::HostByte(byte) => {
                if let Some(command) = self.decoder.feed(byte) {
                    return self.handle_host_command(command);
                }
            }
        }
        None
    }

    /// Handle a debounced button press
    ///
    /// Advance cycles the mode; Action goes to the active mode.
    pub fn handle_button_event(&mut self, event: ButtonEvent) -> Option<SystemState> {
        match event.button {
            Button::Advance => Some(self.transition(self.state.next())),
            Button::Action => {
                self.dispatch(ModeEvent::Action(event.press));
                None
            }
        }
    }

    fn handle_host_command(&mut self, command: HostCommand) -> Option<SystemState> {
        match command {
            // A host mode select is a virtual advance straight to the target
            HostCommand::SelectMode(target) => return Some(self.transition(target)),
            HostCommand::SendCalibration => {
                telemetry::report_calibration(&mut self.tx, self.calibration.points());
            }
            HostCommand::Action => self.dispatch(ModeEvent::Action(Press::Short)),
            other => self.dispatch(ModeEvent::Host(other)),
        }
        None
    }

    fn dispatch(&mut self, event: ModeEvent) {
        let mut io = Io {
            head: &mut self.head,
            tx: &mut self.tx,
            flash: &mut self.flash,
            config: &self.config,
            scripts: &mut self.scripts,
            calibration: &mut self.calibration,
        };
        self.mode.handle(&mut io, event);
    }

    fn transition(&mut self, target: SystemState) -> SystemState {
        let Self {
            head,
            ledger,
            mode,
            state,
            decoder,
            config,
            ..
        } = self;

        head.with_interrupts_masked(|head| {
            let held = ledger.release();
            disable(head, held);

            *mode = ModeState::initial(target);
            *state = target;
            decoder.reset();

            // Nothing is held after the release above
            if let Ok(set) = ledger.acquire(target) {
                enable(head, set, config);
            }
        });

        if target == SystemState::LightDetector && self.calibration.reload(&mut self.flash).is_err()
        {
            // An unreadable table counts as never calibrated
            self.calibration = CalibrationTable::new(self.calibration.region());
        }
        target
    }
}

fn disable<H: SensorHead>(head: &mut H, set: ResourceSet) {
    if set.contains(ResourceSet::SAMPLING_TIMER) {
        head.disable_timer(TimerId::Sampling);
    }
    if set.contains(ResourceSet::ECHO_TIMER) {
        head.disable_timer(TimerId::EchoCapture);
    }
    if set.contains(ResourceSet::ADC) {
        head.disable_adc();
    }
    if set.contains(ResourceSet::TRIGGER) {
        head.disable_trigger();
    }
    if set.contains(ResourceSet::SERVO) {
        head.disable_servo();
    }
}

fn enable<H: SensorHead>(head: &mut H, set: ResourceSet, config: &SensorConfig) {
    if set.contains(ResourceSet::SERVO) {
        // Park at the telemeter angle until a mode points elsewhere
        let pulse = sampling::pulse_us(config.telemeter.default_angle, &config.servo);
        head.set_servo_pulse(pulse);
    }
    if set.contains(ResourceSet::TRIGGER) {
        head.enable_trigger();
    }
    if set.contains(ResourceSet::ADC) {
        for channel in LdrChannel::ALL {
            head.configure_channel(channel);
        }
    }
    if set.contains(ResourceSet::ECHO_TIMER) {
        head.enable_timer(TimerId::EchoCapture);
    }
    if set.contains(ResourceSet::SAMPLING_TIMER) {
        head.reset_timer(TimerId::Sampling);
        head.enable_timer(TimerId::Sampling);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CALIBRATION_POINTS;
    use crate::mock::{Call, MockFlash, MockHead, MockTx};

    type TestDispatcher = Dispatcher<MockHead, MockTx, MockFlash>;

    fn dispatcher() -> TestDispatcher {
        dispatcher_with(MockFlash::new())
    }

    fn dispatcher_with(flash: MockFlash) -> TestDispatcher {
        let mut d = Dispatcher::new(
            MockHead::new(),
            MockTx::new(),
            flash,
            SensorConfig::default(),
            FlashLayout::default(),
        );
        d.head_mut().take();
        d
    }

    fn host(d: &mut TestDispatcher, bytes: &[u8]) -> Option<SystemState> {
        let mut changed = None;
        for &b in bytes {
            if let Some(state) = d.handle_event(Event::HostByte(b)) {
                changed = Some(state);
            }
        }
        changed
    }

    fn advance(d: &mut TestDispatcher) -> Option<SystemState> {
        d.handle_event(Event::Button(ButtonEvent::advance()))
    }

    #[test]
    fn test_starts_in_object_detector_with_resources() {
        let d = Dispatcher::new(
            MockHead::new(),
            MockTx::new(),
            MockFlash::new(),
            SensorConfig::default(),
            FlashLayout::default(),
        );
        assert_eq!(d.state(), SystemState::ObjectDetector);
        assert_eq!(d.ledger().owner(), Some(SystemState::ObjectDetector));
        assert!(d.head().calls.contains(&Call::EnableTimer(TimerId::Sampling)));
        assert!(d.head().calls.contains(&Call::EnableTrigger));
    }

    #[test]
    fn test_five_advances_return_to_start() {
        let mut d = dispatcher();
        let mut seen = vec![];
        for _ in 0..5 {
            seen.push(advance(&mut d).unwrap());
        }
        assert_eq!(
            seen,
            vec![
                SystemState::Telemeter,
                SystemState::LightDetector,
                SystemState::LightObjectDetector,
                SystemState::Script,
                SystemState::ObjectDetector,
            ]
        );
        assert_eq!(d.state(), SystemState::ObjectDetector);
    }

    #[test]
    fn test_transition_disables_before_enabling_inside_mask() {
        let mut d = dispatcher();
        for _ in 0..5 {
            advance(&mut d);
            let calls = d.head_mut().take();

            assert_eq!(calls.first(), Some(&Call::Mask));
            let unmask = calls.iter().position(|c| *c == Call::Unmask).unwrap();
            let inside = &calls[1..unmask];

            let last_disable = inside.iter().rposition(Call::is_disable).unwrap();
            let first_enable = inside.iter().position(Call::is_enable).unwrap();
            assert!(last_disable < first_enable);
            // Nothing touches hardware outside the mask
            assert!(calls[unmask + 1..].iter().all(|c| !c.is_enable() && !c.is_disable()));
        }
    }

    #[test]
    fn test_light_mode_releases_trigger() {
        let mut d = dispatcher();
        advance(&mut d);
        d.head_mut().take();
        advance(&mut d);
        assert_eq!(d.state(), SystemState::LightDetector);
        let calls = d.head_mut().take();
        assert!(calls.contains(&Call::DisableTrigger));
        assert!(calls.contains(&Call::DisableTimer(TimerId::EchoCapture)));
        assert!(calls.contains(&Call::ConfigureChannel(LdrChannel::Ldr1)));
        assert!(calls.contains(&Call::ConfigureChannel(LdrChannel::Ldr2)));
        assert!(!calls.contains(&Call::EnableTrigger));
    }

    #[test]
    fn test_host_mode_select() {
        let mut d = dispatcher();
        assert_eq!(host(&mut d, b"4"), Some(SystemState::LightObjectDetector));
        assert_eq!(d.ledger().owner(), Some(SystemState::LightObjectDetector));
    }

    #[test]
    fn test_mode_change_abandons_activity() {
        let mut d = dispatcher();
        host(&mut d, b"U");
        assert!(!d.mode().is_idle());
        advance(&mut d);
        advance(&mut d);
        advance(&mut d);
        advance(&mut d);
        advance(&mut d);
        assert!(d.mode().is_idle());
    }

    #[test]
    fn test_advance_mid_upload_drops_frame() {
        let mut d = dispatcher();
        host(&mut d, b"5");
        host(&mut d, &[b'A', 9, b'0', b'0']);
        advance(&mut d);
        assert_eq!(host(&mut d, b"2"), Some(SystemState::Telemeter));
        assert_eq!(d.scripts().count(), 0);
    }

    #[test]
    fn test_object_sweep_end_to_end() {
        let mut d = dispatcher();
        host(&mut d, b"U");
        while !d.mode().is_idle() {
            d.handle_event(Event::Tick);
            d.handle_event(Event::EchoCaptured { pulse_us: 58 * 25 });
        }
        let lines = d.tx().lines();
        assert_eq!(&lines[..3], &["000", "180", "025"]);
        assert_eq!(lines.last().map(String::as_str), Some("500"));
    }

    #[test]
    fn test_echo_timeout_saturates() {
        let mut d = dispatcher();
        host(&mut d, b"2V090$");
        d.handle_event(Event::Tick);
        d.handle_event(Event::EchoTimeout);
        assert_eq!(d.tx().lines(), vec!["400", "090"]);
    }

    #[test]
    fn test_action_button_routed_to_mode() {
        let mut d = dispatcher();
        let changed = d.handle_event(Event::Button(ButtonEvent::action(Press::Short)));
        assert_eq!(changed, None);
        assert_eq!(d.state(), SystemState::ObjectDetector);
        assert!(!d.mode().is_idle());
    }

    #[test]
    fn test_calibration_through_dispatcher() {
        let mut d = dispatcher();
        host(&mut d, b"3X");
        for _ in 0..CALIBRATION_POINTS {
            d.handle_event(Event::Button(ButtonEvent::action(Press::Short)));
            // 12-bit raw counts: 1616 -> 404 -> 101, 1632 -> 408 -> 102
            d.handle_event(Event::LdrSampled {
                ldr1: 1616,
                ldr2: 1632,
            });
        }
        assert!(d.calibration().is_complete());
        assert_eq!(d.calibration().points(), &[101; CALIBRATION_POINTS]);

        d.tx_mut().clear();
        host(&mut d, b"6");
        let mut expected = vec![101u8; CALIBRATION_POINTS];
        expected.push(b'\n');
        assert_eq!(d.tx().bytes(), &expected[..]);
    }

    #[test]
    fn test_failed_conversion_keeps_calibration_going() {
        let mut d = dispatcher();
        host(&mut d, b"3X");
        d.handle_event(Event::Button(ButtonEvent::action(Press::Short)));
        d.handle_event(Event::LdrFailed);
        d.head_mut().take();

        d.handle_event(Event::Button(ButtonEvent::action(Press::Short)));
        assert_eq!(d.head().count(Call::StartConversion), 1);
        assert_eq!(d.calibration().get(0), Some(255));
    }

    #[test]
    fn test_failed_conversion_finishes_light_sweep() {
        let mut d = dispatcher();
        host(&mut d, b"3Y");
        let mut steps = 0;
        while !d.mode().is_idle() {
            d.handle_event(Event::Tick);
            d.handle_event(Event::Tick);
            d.handle_event(Event::LdrFailed);
            steps += 1;
            assert!(steps < 100, "sweep stalled");
        }
        let lines = d.tx().lines();
        assert_eq!(lines[2], "1023");
        assert_eq!(lines.last().map(String::as_str), Some("1024"));
    }

    #[test]
    fn test_unreadable_calibration_not_kept_stale() {
        let mut d = dispatcher();
        host(&mut d, b"3X");
        for _ in 0..CALIBRATION_POINTS {
            d.handle_event(Event::Button(ButtonEvent::action(Press::Short)));
            d.handle_event(Event::LdrSampled {
                ldr1: 1616,
                ldr2: 1632,
            });
        }
        assert!(d.calibration().is_complete());

        host(&mut d, b"1");
        d.flash.fail_read(true);
        host(&mut d, b"3");
        assert!(!d.calibration().is_complete());
        assert_eq!(d.calibration().points(), &[0xFF; CALIBRATION_POINTS]);
    }

    #[test]
    fn test_upload_and_play_over_link() {
        let mut d = dispatcher();
        host(&mut d, b"5");

        let mut frame = vec![b'E', 18];
        frame.extend_from_slice(b"006045000008000000");
        frame.extend_from_slice(&[b'$', 4]);
        frame.extend_from_slice(b"ping$");
        host(&mut d, &frame);
        assert_eq!(d.tx().bytes(), b"1\0");
        assert_eq!(d.scripts().count(), 1);

        d.tx_mut().clear();
        host(&mut d, b"B");
        d.handle_event(Event::Tick);
        d.handle_event(Event::Tick);
        d.handle_event(Event::EchoCaptured { pulse_us: 58 * 12 });
        d.handle_event(Event::Tick);
        assert_eq!(d.tx().lines(), vec!["6", "012", "045", "8"]);
        assert!(d.mode().is_idle());
    }

    #[test]
    fn test_scripts_survive_restart() {
        let mut d = dispatcher();
        host(&mut d, b"5");
        let mut frame = vec![b'A', 9];
        frame.extend_from_slice(b"005000000$");
        frame.push(3);
        frame.extend_from_slice(b"clr$");
        host(&mut d, &frame);

        let Dispatcher { flash, .. } = d;
        let d = dispatcher_with(flash);
        assert_eq!(d.scripts().count(), 1);
        assert_eq!(d.scripts().directory().find("clr"), Some(0));
    }
}
