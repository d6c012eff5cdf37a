use crate::error::Error;
use crate::packet::{Packet, FRAME_LEN};
use std::io;

/// An opaque byte pipe into the radio. Both calls block with whatever
/// timeout the bridge configured at bring-up; there is no per-call
/// override and no cancellation.
pub trait Transport {
    /// Write every byte of `bytes` to the pipe.
    fn write(&mut self, bytes: &[u8]) -> io::Result<()>;

    /// Read up to `buffer.len()` bytes, returning how many arrived.
    fn read(&mut self, buffer: &mut [u8]) -> io::Result<usize>;
}

/// The two endpoints a bridge hands over after bring-up: the full-duplex
/// command pipe and the physically distinct sample pipe.
pub struct Pipes<P> {
    pub command: P,
    pub data: P,
}

/// The USB bridge chip in front of the radio. Enumeration, GPIO
/// sequencing, and pipe timeout configuration all live behind `open`;
/// the protocol core only requires that it completes before the first
/// transaction.
pub trait Bridge {
    type Pipe: Transport;

    fn open(&mut self) -> Result<Pipes<Self::Pipe>, Error>;

    fn close(&mut self) -> Result<(), Error>;

    fn is_ready(&self) -> bool;
}

/// The command channel: one request frame out, one response frame back.
pub(crate) struct CommandLink<P> {
    pipe: P,
}

impl<P> CommandLink<P>
where
    P: Transport,
{
    pub(crate) fn new(pipe: P) -> Self {
        Self { pipe }
    }

    /// Drive one exchange. Either direction failing or stalling yields the
    /// stand-in failed response's classification; retrying is the
    /// caller's decision.
    pub(crate) fn transact(&mut self, request: &Packet) -> Result<Packet, Error> {
        if let Err(err) = self.pipe.write(&request.to_bytes()) {
            log::warn!("command TX failed: {}", err);
            return Err(Packet::failed(request).error().flag().into());
        }

        let mut frame = [0u8; FRAME_LEN];
        let mut filled = 0;
        while filled < FRAME_LEN {
            match self.pipe.read(&mut frame[filled..]) {
                Ok(0) => {
                    log::warn!("command RX pipe closed after {} bytes", filled);
                    return Err(Packet::failed(request).error().flag().into());
                }
                Ok(count) => filled += count,
                Err(err) => {
                    log::warn!("command RX failed: {}", err);
                    return Err(Packet::failed(request).error().flag().into());
                }
            }
        }
        Ok(Packet::from_bytes(&frame))
    }
}
