//! Host-side control of SABR software-defined radios: the 16-byte framed
//! command protocol, its single-flight transaction engine, and the typed
//! parameter operations layered on top. USB bring-up and the bulk IQ
//! sample transfer live behind the [`transport`] seams.
mod command;
mod device;
pub mod error;
pub mod packet;
mod payload;
pub mod transport;
mod types;

pub use command::{Channel, Command};
pub use device::{RadioDevice, SUPPORTED_SAMPLE_RATES, TEMP_UNAVAILABLE};
pub use error::{Error, ErrorKind};
pub use packet::{Packet, ResponseError, CRC16, FRAME_LEN};
pub use payload::Payload;
pub use transport::{Bridge, Pipes, Transport};
pub use types::{DeviceStatus, ErmVersion, GainMode, IqChannelConfig, MultiplexMode};
