//! UART receive path feeding the telemetry scheduler.

use core::cell::RefCell;

use defmt::warn;
use embassy_rp::uart::{Async, UartRx};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use heater_core::{ByteQueue, ByteSource, ReadError};

/// Capacity of the receive queue (about ten frames).
pub const RX_QUEUE_LEN: usize = 512;

/// Queue shared between the UART receiver and the scheduler.
pub type RxQueue = Mutex<CriticalSectionRawMutex, RefCell<ByteQueue<RX_QUEUE_LEN>>>;

/// Create an empty receive queue, usable in a `static`.
#[must_use]
pub const fn new_rx_queue() -> RxQueue {
    Mutex::new(RefCell::new(ByteQueue::new()))
}

/// Receives bytes from the heater bus and appends them to the shared queue.
///
/// # Pins
///
/// Uses UART1 by default:
/// - GPIO 8: TX (unused, the monitor only listens)
/// - GPIO 9: RX, wired to the blue wire through a level shifter
pub struct UartReceiver<'d> {
    rx: UartRx<'d, Async>,
    queue: &'static RxQueue,
    errors: u32,
}

impl<'d> UartReceiver<'d> {
    /// Create a receiver writing into `queue`.
    pub fn new(rx: UartRx<'d, Async>, queue: &'static RxQueue) -> Self {
        Self {
            rx,
            queue,
            errors: 0,
        }
    }

    /// Receive bytes forever.
    ///
    /// Line errors drop the affected byte; the framer resynchronizes on its
    /// own.
    pub async fn run(&mut self) -> ! {
        let mut byte = [0u8; 1];
        loop {
            match self.rx.read(&mut byte).await {
                Ok(()) => {
                    let accepted = self.queue.lock(|q| q.borrow_mut().push(byte[0]));
                    if !accepted {
                        warn!("RX queue full, byte dropped");
                    }
                }
                Err(e) => {
                    self.errors = self.errors.wrapping_add(1);
                    warn!("UART error: {:?} (total {})", e, self.errors);
                }
            }
        }
    }
}

/// [`ByteSource`] view of the shared receive queue.
pub struct QueueSource {
    queue: &'static RxQueue,
}

impl QueueSource {
    pub fn new(queue: &'static RxQueue) -> Self {
        Self { queue }
    }

    /// Bytes lost because the queue was full.
    pub fn dropped(&self) -> u32 {
        self.queue.lock(|q| q.borrow().dropped())
    }
}

impl ByteSource for QueueSource {
    fn available(&mut self) -> usize {
        self.queue.lock(|q| q.borrow().len())
    }

    fn read_byte(&mut self) -> Result<u8, ReadError> {
        self.queue.lock(|q| q.borrow_mut().read_byte())
    }
}
