//! Byte source trait, error types and adapters.

use heapless::Deque;

/// Error type for byte reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReadError {
    /// Nothing buffered right now. Routine, not a fault.
    NoData,
    /// Peripheral reported an I/O error (framing, parity, overrun, ...).
    Io,
}

impl core::fmt::Display for ReadError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ReadError::NoData => f.write_str("no data buffered"),
            ReadError::Io => f.write_str("serial I/O error"),
        }
    }
}

/// Non-blocking pull of already-buffered serial bytes.
///
/// # `no_std` Compatibility
///
/// Implementations must never block, suspend or allocate: both methods only
/// look at data the peripheral (or its interrupt handler) has already
/// buffered.
pub trait ByteSource {
    /// Number of bytes that can be read without blocking.
    ///
    /// May be a lower bound; `0` means nothing is buffered.
    fn available(&mut self) -> usize;

    /// Read the next buffered byte, or [`ReadError::NoData`] if none is.
    fn read_byte(&mut self) -> Result<u8, ReadError>;
}

impl<T: ByteSource + ?Sized> ByteSource for &mut T {
    fn available(&mut self) -> usize {
        (**self).available()
    }

    fn read_byte(&mut self) -> Result<u8, ReadError> {
        (**self).read_byte()
    }
}

/// Fixed-capacity FIFO of received bytes.
///
/// Filled by an RX interrupt handler (or a test) and drained by the
/// scheduler. Bytes that arrive while the queue is full are dropped and
/// counted.
#[derive(Debug, Clone)]
pub struct ByteQueue<const N: usize> {
    queue: Deque<u8, N>,
    dropped: u32,
}

impl<const N: usize> ByteQueue<N> {
    /// Create an empty queue.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            queue: Deque::new(),
            dropped: 0,
        }
    }

    /// Append one byte. Returns `false` if the queue was full.
    pub fn push(&mut self, byte: u8) -> bool {
        if self.queue.push_back(byte).is_err() {
            self.dropped = self.dropped.saturating_add(1);
            return false;
        }
        true
    }

    /// Append a slice. Returns how many bytes were accepted.
    pub fn extend(&mut self, bytes: &[u8]) -> usize {
        bytes.iter().filter(|&&b| self.push(b)).count()
    }

    /// Bytes currently queued.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Bytes dropped because the queue was full.
    #[inline]
    #[must_use]
    pub fn dropped(&self) -> u32 {
        self.dropped
    }

    /// Discard everything queued.
    pub fn clear(&mut self) {
        self.queue.clear();
    }
}

impl<const N: usize> Default for ByteQueue<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> ByteSource for ByteQueue<N> {
    fn available(&mut self) -> usize {
        self.queue.len()
    }

    fn read_byte(&mut self) -> Result<u8, ReadError> {
        self.queue.pop_front().ok_or(ReadError::NoData)
    }
}

/// [`ByteSource`] over any `embedded-io` reader that can report readiness.
///
/// Reads happen only while [`ReadReady::read_ready`](embedded_io::ReadReady)
/// reports data, so the underlying blocking `read` returns immediately.
#[cfg(feature = "embedded-io")]
pub struct ReadyReader<T> {
    inner: T,
}

#[cfg(feature = "embedded-io")]
impl<T> ReadyReader<T> {
    /// Wrap a peripheral reader.
    pub fn new(inner: T) -> Self {
        Self { inner }
    }

    /// Get a reference to the wrapped reader.
    pub fn inner(&self) -> &T {
        &self.inner
    }

    /// Unwrap the peripheral reader.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

#[cfg(feature = "embedded-io")]
impl<T: embedded_io::Read + embedded_io::ReadReady> ByteSource for ReadyReader<T> {
    fn available(&mut self) -> usize {
        match self.inner.read_ready() {
            Ok(true) => 1,
            _ => 0,
        }
    }

    fn read_byte(&mut self) -> Result<u8, ReadError> {
        match self.inner.read_ready() {
            Ok(true) => {}
            Ok(false) => return Err(ReadError::NoData),
            Err(_) => return Err(ReadError::Io),
        }

        let mut byte = [0u8; 1];
        match self.inner.read(&mut byte) {
            Ok(1) => Ok(byte[0]),
            Ok(_) => Err(ReadError::NoData),
            Err(_) => Err(ReadError::Io),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_fifo_order() {
        let mut queue: ByteQueue<8> = ByteQueue::new();
        assert_eq!(queue.extend(&[1, 2, 3]), 3);
        assert_eq!(queue.available(), 3);
        assert_eq!(queue.read_byte(), Ok(1));
        assert_eq!(queue.read_byte(), Ok(2));
        assert_eq!(queue.read_byte(), Ok(3));
        assert_eq!(queue.read_byte(), Err(ReadError::NoData));
    }

    #[test]
    fn test_queue_overflow_counts_drops() {
        let mut queue: ByteQueue<2> = ByteQueue::new();
        assert_eq!(queue.extend(&[1, 2, 3, 4]), 2);
        assert_eq!(queue.dropped(), 2);
        assert_eq!(queue.len(), 2);
        queue.clear();
        assert!(queue.is_empty());
    }

    #[test]
    fn test_mut_ref_forwards() {
        let mut queue: ByteQueue<4> = ByteQueue::new();
        queue.push(9);
        let mut source = &mut queue;
        assert_eq!(source.available(), 1);
        assert_eq!(source.read_byte(), Ok(9));
    }

    #[cfg(feature = "embedded-io")]
    mod ready_reader {
        use super::super::*;

        struct MockUart {
            data: &'static [u8],
            fail: bool,
        }

        impl embedded_io::ErrorType for MockUart {
            type Error = embedded_io::ErrorKind;
        }

        impl embedded_io::ReadReady for MockUart {
            fn read_ready(&mut self) -> Result<bool, Self::Error> {
                if self.fail {
                    return Err(embedded_io::ErrorKind::Other);
                }
                Ok(!self.data.is_empty())
            }
        }

        impl embedded_io::Read for MockUart {
            fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
                let n = buf.len().min(self.data.len());
                buf[..n].copy_from_slice(&self.data[..n]);
                self.data = &self.data[n..];
                Ok(n)
            }
        }

        #[test]
        fn test_reads_until_not_ready() {
            let mut reader = ReadyReader::new(MockUart {
                data: &[0x76, 0x16],
                fail: false,
            });
            assert_eq!(reader.available(), 1);
            assert_eq!(reader.read_byte(), Ok(0x76));
            assert_eq!(reader.read_byte(), Ok(0x16));
            assert_eq!(reader.available(), 0);
            assert_eq!(reader.read_byte(), Err(ReadError::NoData));
        }

        #[test]
        fn test_peripheral_error() {
            let mut reader = ReadyReader::new(MockUart {
                data: &[1],
                fail: true,
            });
            assert_eq!(reader.available(), 0);
            assert_eq!(reader.read_byte(), Err(ReadError::Io));
        }
    }
}
