//! Packet sink trait and error types.

use std::io;

/// Error type for transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The link could not be opened. Fatal at startup.
    #[error("failed to open {port}: {reason}")]
    Open { port: String, reason: String },
    /// A packet could not be written. The bridge backs off and retries.
    #[error("write failed: {0}")]
    Write(#[from] io::Error),
}

/// Byte-oriented link to the device.
///
/// Each call carries one complete encoded packet; implementations must
/// write it whole or fail.
pub trait Transport {
    fn write_packet(&mut self, packet: &[u8]) -> Result<(), TransportError>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn write_packet(&mut self, packet: &[u8]) -> Result<(), TransportError> {
        (**self).write_packet(packet)
    }
}

/// Transport over any [`io::Write`], flushing after every packet.
#[derive(Debug)]
pub struct WriteTransport<W> {
    writer: W,
}

impl<W: io::Write> WriteTransport<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: io::Write> Transport for WriteTransport<W> {
    fn write_packet(&mut self, packet: &[u8]) -> Result<(), TransportError> {
        self.writer.write_all(packet)?;
        self.writer.flush()?;
        Ok(())
    }
}
