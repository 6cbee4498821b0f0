//! Test doubles for the HAL traits

use scanhead_hal::{
    ByteTx, EchoTrigger, FlashError, InterruptMask, LdrAdc, LdrChannel, Readout, SamplingTimers,
    SegmentFlash, ServoPwm, TimerId,
};

use crate::config::{CalibrationTable, FlashLayout, SensorConfig};
use crate::modes::Io;
use crate::script::ScriptStore;

/// One recorded hardware call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    EnableTimer(TimerId),
    DisableTimer(TimerId),
    ResetTimer(TimerId),
    ConfigureChannel(LdrChannel),
    DisableAdc,
    StartConversion,
    ServoPulse(u16),
    DisableServo,
    EnableTrigger,
    DisableTrigger,
    Fire,
    Mask,
    Unmask,
    ShowNumber(u16),
    ShowChar(u8, u8),
    Clear,
}

impl Call {
    pub fn is_disable(&self) -> bool {
        matches!(
            self,
            Call::DisableTimer(_) | Call::DisableAdc | Call::DisableServo | Call::DisableTrigger
        )
    }

    pub fn is_enable(&self) -> bool {
        matches!(
            self,
            Call::EnableTimer(_) | Call::ConfigureChannel(_) | Call::EnableTrigger
        )
    }

    /// Calls that move or sample hardware
    pub fn is_actuation(&self) -> bool {
        matches!(
            self,
            Call::ServoPulse(_)
                | Call::Fire
                | Call::StartConversion
                | Call::ShowNumber(_)
                | Call::ShowChar(..)
                | Call::Clear
        )
    }
}

/// Sensor head that records every call
#[derive(Debug, Default)]
pub struct MockHead {
    pub calls: Vec<Call>,
}

impl MockHead {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain the recorded calls
    pub fn take(&mut self) -> Vec<Call> {
        core::mem::take(&mut self.calls)
    }

    pub fn count(&self, call: Call) -> usize {
        self.calls.iter().filter(|&&c| c == call).count()
    }
}

impl SamplingTimers for MockHead {
    fn enable_timer(&mut self, timer: TimerId) {
        self.calls.push(Call::EnableTimer(timer));
    }

    fn disable_timer(&mut self, timer: TimerId) {
        self.calls.push(Call::DisableTimer(timer));
    }

    fn reset_timer(&mut self, timer: TimerId) {
        self.calls.push(Call::ResetTimer(timer));
    }
}

impl LdrAdc for MockHead {
    fn configure_channel(&mut self, channel: LdrChannel) {
        self.calls.push(Call::ConfigureChannel(channel));
    }

    fn disable_adc(&mut self) {
        self.calls.push(Call::DisableAdc);
    }

    fn start_conversion(&mut self) {
        self.calls.push(Call::StartConversion);
    }
}

impl ServoPwm for MockHead {
    fn set_servo_pulse(&mut self, pulse_us: u16) {
        self.calls.push(Call::ServoPulse(pulse_us));
    }

    fn disable_servo(&mut self) {
        self.calls.push(Call::DisableServo);
    }
}

impl EchoTrigger for MockHead {
    fn enable_trigger(&mut self) {
        self.calls.push(Call::EnableTrigger);
    }

    fn disable_trigger(&mut self) {
        self.calls.push(Call::DisableTrigger);
    }

    fn fire(&mut self) {
        self.calls.push(Call::Fire);
    }
}

impl InterruptMask for MockHead {
    fn with_interrupts_masked<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        self.calls.push(Call::Mask);
        let result = f(self);
        self.calls.push(Call::Unmask);
        result
    }
}

impl Readout for MockHead {
    fn show_number(&mut self, value: u16) {
        self.calls.push(Call::ShowNumber(value));
    }

    fn show_char(&mut self, position: u8, ch: u8) {
        self.calls.push(Call::ShowChar(position, ch));
    }

    fn clear(&mut self) {
        self.calls.push(Call::Clear);
    }
}

/// Byte sink capturing telemetry
#[derive(Debug, Default)]
pub struct MockTx {
    bytes: Vec<u8>,
}

impl MockTx {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Newline-terminated reports as strings
    pub fn lines(&self) -> Vec<String> {
        self.bytes
            .split(|&b| b == b'\n')
            .filter(|l| !l.is_empty())
            .map(|l| String::from_utf8_lossy(l).into_owned())
            .collect()
    }

    pub fn clear(&mut self) {
        self.bytes.clear();
    }
}

impl ByteTx for MockTx {
    fn send_char(&mut self, byte: u8) {
        self.bytes.push(byte);
    }
}

const MOCK_SEGMENT: u32 = 4096;
const MOCK_SIZE: usize = 64 * 1024;

/// RAM flash that enforces erase-before-write
#[derive(Debug)]
pub struct MockFlash {
    data: Vec<u8>,
    session: Option<u32>,
    erases: usize,
    fail_erase: bool,
    fail_read: bool,
}

impl MockFlash {
    pub fn new() -> Self {
        Self {
            data: vec![0xFF; MOCK_SIZE],
            session: None,
            erases: 0,
            fail_erase: false,
            fail_read: false,
        }
    }

    pub fn byte(&self, addr: u32) -> u8 {
        self.data[addr as usize]
    }

    pub fn erase_count(&self) -> usize {
        self.erases
    }

    /// Make every following erase fail
    pub fn fail_erase(&mut self, fail: bool) {
        self.fail_erase = fail;
    }

    /// Make every following read fail
    pub fn fail_read(&mut self, fail: bool) {
        self.fail_read = fail;
    }

    fn check(&self, addr: u32) -> Result<usize, FlashError> {
        let addr = addr as usize;
        if addr < self.data.len() {
            Ok(addr)
        } else {
            Err(FlashError::OutOfBounds)
        }
    }

    fn program(&mut self, addr: u32, byte: u8) -> Result<(), FlashError> {
        let addr = self.check(addr)?;
        if self.data[addr] != 0xFF {
            // Written twice without an erase
            return Err(FlashError::Flash);
        }
        self.data[addr] = byte;
        Ok(())
    }
}

impl SegmentFlash for MockFlash {
    fn segment_size(&self) -> u32 {
        MOCK_SEGMENT
    }

    fn init_write(&mut self, addr: u32) -> Result<(), FlashError> {
        self.check(addr)?;
        if self.fail_erase {
            return Err(FlashError::Flash);
        }
        let start = self.segment_start(addr) as usize;
        self.data[start..start + MOCK_SEGMENT as usize].fill(0xFF);
        self.erases += 1;
        self.session = Some(addr);
        Ok(())
    }

    fn cont_write(&mut self, addr: u32) -> Result<(), FlashError> {
        self.check(addr)?;
        self.session = Some(addr);
        Ok(())
    }

    fn write_byte(&mut self, byte: u8) -> Result<(), FlashError> {
        let addr = self.session.ok_or(FlashError::NotOpen)?;
        self.program(addr, byte)?;
        self.session = Some(addr + 1);
        Ok(())
    }

    fn write_byte_at(&mut self, byte: u8, addr: u32) -> Result<(), FlashError> {
        self.program(addr, byte)
    }

    fn disable_write(&mut self) {
        self.session = None;
    }

    fn read(&mut self, addr: u32, buf: &mut [u8]) -> Result<(), FlashError> {
        if self.fail_read {
            return Err(FlashError::Flash);
        }
        let start = addr as usize;
        let end = start + buf.len();
        if end > self.data.len() {
            return Err(FlashError::OutOfBounds);
        }
        buf.copy_from_slice(&self.data[start..end]);
        Ok(())
    }
}

/// Everything a mode needs, owned for one test
pub struct Rig {
    pub head: MockHead,
    pub tx: MockTx,
    pub flash: MockFlash,
    pub config: SensorConfig,
    pub scripts: ScriptStore,
    pub calibration: CalibrationTable,
}

impl Rig {
    pub fn new() -> Self {
        let layout = FlashLayout::default();
        Self {
            head: MockHead::new(),
            tx: MockTx::new(),
            flash: MockFlash::new(),
            config: SensorConfig::default(),
            scripts: ScriptStore::new(&layout),
            calibration: CalibrationTable::new(layout.calibration),
        }
    }

    pub fn io(&mut self) -> Io<'_, MockHead, MockTx, MockFlash> {
        Io {
            head: &mut self.head,
            tx: &mut self.tx,
            flash: &mut self.flash,
            config: &self.config,
            scripts: &mut self.scripts,
            calibration: &mut self.calibration,
        }
    }
}
