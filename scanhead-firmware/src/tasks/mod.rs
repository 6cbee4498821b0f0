//! Embassy async tasks
//!
//! The controller owns the dispatcher. Every other task stands in for an
//! interrupt handler: it captures one thing and posts it to a mailbox.

pub mod buttons;
pub mod controller;
pub mod echo;
pub mod ldr;
pub mod tick;
pub mod uart_rx;
pub mod uart_tx;

pub use buttons::button_task;
pub use controller::controller_task;
pub use echo::echo_task;
pub use ldr::ldr_task;
pub use tick::tick_task;
pub use uart_rx::uart_rx_task;
pub use uart_tx::uart_tx_task;
