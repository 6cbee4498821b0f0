//! Scanhead - Servo-Mounted Sensor Head Firmware
//!
//! Main firmware binary for an RP2040 board carrying a hobby servo, an
//! HC-SR04 style ranger and two light-dependent resistors. A host drives
//! the head over UART; scripts and calibration live in flash.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::adc::{self, Adc, Channel as AdcChannel};
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::peripherals::UART0;
use embassy_rp::pwm::Pwm;
use embassy_rp::uart::{BufferedInterruptHandler, BufferedUart, Config as UartConfig};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use scanhead_core::config::{parse_config, FlashLayout, SensorConfig};
use scanhead_core::dispatcher::Dispatcher;
use scanhead_core::state::Button;
use scanhead_hal_rp2040::flash::FLASH_ERASE_SIZE;
use scanhead_hal_rp2040::{servo_config, EchoRanger, LdrPair, Rp2040SegmentFlash, Rp2040Servo};

use crate::board::{Board, LinkTx};

/// Embedded configuration (compiled into firmware)
/// Edit sensor.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../sensor.toml");

mod board;
mod channels;
mod tasks;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
    ADC_IRQ_FIFO => adc::InterruptHandler;
});

// Static cells for UART buffers (must live forever)
static TX_BUF: StaticCell<[u8; 128]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 64]> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Scanhead firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let config = load_config();
    let layout = FlashLayout::default();
    if !layout.is_valid(FLASH_ERASE_SIZE) {
        error!("Flash layout does not fit the storage partition");
    }

    // Host link (UART0: TX=GPIO0, RX=GPIO1)
    let mut uart_config = UartConfig::default();
    uart_config.baudrate = config.link.baud;
    let uart = BufferedUart::new(
        p.UART0,
        p.PIN_0,
        p.PIN_1,
        Irqs,
        TX_BUF.init([0u8; 128]),
        RX_BUF.init([0u8; 64]),
        uart_config,
    );
    let (tx, rx) = uart.split();
    info!("UART initialized at {} baud", config.link.baud);

    // Servo on GPIO15 (PWM slice 7, channel B)
    let pwm = Pwm::new_output_b(p.PWM_SLICE7, p.PIN_15, servo_config());
    let servo = Rp2040Servo::new(pwm);

    // Ranger: trigger GPIO14, echo GPIO13
    let ranger = EchoRanger::new(
        Output::new(p.PIN_14, Level::Low),
        Input::new(p.PIN_13, Pull::None),
        config.ranger.us_per_cm,
    );

    // Light sensors on ADC0 / ADC1
    let adc = Adc::new(p.ADC, Irqs, adc::Config::default());
    let ldrs = LdrPair::new(
        adc,
        AdcChannel::new_pin(p.PIN_26, Pull::None),
        AdcChannel::new_pin(p.PIN_27, Pull::None),
    );

    let advance = Input::new(p.PIN_16, Pull::Up);
    let action = Input::new(p.PIN_17, Pull::Up);

    let flash = Rp2040SegmentFlash::new(p.FLASH);
    let dispatcher = Dispatcher::new(Board::new(servo), LinkTx, flash, config, layout);
    info!(
        "Loaded {} scripts, calibration {}",
        dispatcher.scripts().count(),
        if dispatcher.calibration().is_complete() {
            "complete"
        } else {
            "missing"
        }
    );

    // Spawn tasks
    spawner.spawn(tasks::tick_task(config.timing.tick_ms)).unwrap();
    spawner
        .spawn(tasks::echo_task(ranger, config.ranger.timeout_ms))
        .unwrap();
    spawner.spawn(tasks::ldr_task(ldrs)).unwrap();
    spawner
        .spawn(tasks::button_task(advance, Button::Advance, config.buttons))
        .unwrap();
    spawner
        .spawn(tasks::button_task(action, Button::Action, config.buttons))
        .unwrap();
    spawner.spawn(tasks::uart_rx_task(rx)).unwrap();
    spawner.spawn(tasks::uart_tx_task(tx)).unwrap();
    spawner.spawn(tasks::controller_task(dispatcher)).unwrap();

    info!("All tasks spawned, firmware running");
}

/// Parse the embedded configuration
///
/// build.rs already rejected invalid files, so a failure here means the
/// on-device parser and the build check disagree. Defaults keep the head
/// usable in that case.
fn load_config() -> SensorConfig {
    match parse_config(EMBEDDED_CONFIG) {
        Ok(config) => {
            info!("Parsed embedded configuration");
            config
        }
        Err(e) => {
            error!("Failed to parse embedded config: {:?}", e);
            error!("Using default configuration");
            SensorConfig::default()
        }
    }
}
