//! Host link transmit task
//!
//! Drains the telemetry queue into the UART in small bursts.

use defmt::*;
use embassy_rp::uart::BufferedUartTx;
use embedded_io_async::Write;

use crate::channels::HOST_TX;

/// Largest burst handed to the UART at once
const TX_CHUNK: usize = 16;

#[embassy_executor::task]
pub async fn uart_tx_task(mut tx: BufferedUartTx) {
    info!("UART TX task started");

    let mut buf = [0u8; TX_CHUNK];

    loop {
        buf[0] = HOST_TX.receive().await;
        let mut len = 1;
        while len < TX_CHUNK {
            match HOST_TX.try_receive() {
                Ok(byte) => {
                    buf[len] = byte;
                    len += 1;
                }
                Err(_) => break,
            }
        }

        if let Err(e) = tx.write_all(&buf[..len]).await {
            warn!("UART write error: {:?}", e);
        }
    }
}
