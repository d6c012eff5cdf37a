use crate::error::{Error, ErrorKind};
use core::convert::TryFrom;

/// Control-plane command catalog. Each command is bound to a wire ID that
/// occupies the header's 5-bit command field; the binding is the static
/// [`WIRE_TABLE`] and is stable across firmware revisions.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Initialize the radio hardware. Must be the first command sent.
    InitDevice,
    /// Start/stop IQ capture on the active receive channels.
    CaptureEnable,
    /// Local oscillator frequency, in Hz.
    LoFrequency,
    /// Manual gain (receive) or attenuation (transmit), per channel.
    Gain,
    /// Gain control mode (manual or an AGC variant).
    GainMode,
    /// Analog low pass filter complex bandwidth, in Hz.
    Bandwidth,
    /// IQ sample rate, in Hz.
    SampleRate,
    /// IR filter configuration.
    IrFilterCfg,
    /// Start/stop IQ transmission on the active transmit channels.
    TransmitEnable,
    /// Device activity query.
    DeviceStatus,
    /// TDM/FDM mode and active channel configuration.
    MultiplexMode,
    /// Device reset.
    Reset,
    /// Internal/external reference selection.
    ReferenceSource,
    /// IR filter enable.
    IrFilterUse,
    /// Extended AGC parameter block.
    AgcParams,
    /// Command counter query.
    CmdCounter,
    /// RF chipset identification.
    ChipsetId,
    /// Firmware update entry.
    FirmwareUpdate,
    /// Device temperature, in millidegrees Celsius.
    Temperature,
    /// Embedded radio module version/status word.
    ErmVersion,
    DebugB,
    DebugA,
    /// No operation; also the substitute pattern for unrecognized IDs.
    Nop,
}

/// Bidirectional binding between commands and their wire IDs.
const WIRE_TABLE: [(Command, u32); 23] = [
    (Command::InitDevice, 0x00),
    (Command::CaptureEnable, 0x01),
    (Command::LoFrequency, 0x02),
    (Command::Gain, 0x03),
    (Command::GainMode, 0x04),
    (Command::Bandwidth, 0x05),
    (Command::SampleRate, 0x06),
    (Command::IrFilterCfg, 0x07),
    (Command::TransmitEnable, 0x08),
    (Command::DeviceStatus, 0x09),
    (Command::MultiplexMode, 0x0A),
    (Command::Reset, 0x0B),
    (Command::ReferenceSource, 0x0C),
    (Command::IrFilterUse, 0x0D),
    (Command::AgcParams, 0x0E),
    (Command::CmdCounter, 0x0F),
    (Command::ChipsetId, 0x10),
    (Command::FirmwareUpdate, 0x11),
    (Command::Temperature, 0x12),
    (Command::ErmVersion, 0x13),
    (Command::DebugB, 0x14),
    (Command::DebugA, 0x15),
    (Command::Nop, 0x16),
];

impl Command {
    /// Every catalog member, in wire-ID order.
    pub const ALL: [Command; 23] = [
        Command::InitDevice,
        Command::CaptureEnable,
        Command::LoFrequency,
        Command::Gain,
        Command::GainMode,
        Command::Bandwidth,
        Command::SampleRate,
        Command::IrFilterCfg,
        Command::TransmitEnable,
        Command::DeviceStatus,
        Command::MultiplexMode,
        Command::Reset,
        Command::ReferenceSource,
        Command::IrFilterUse,
        Command::AgcParams,
        Command::CmdCounter,
        Command::ChipsetId,
        Command::FirmwareUpdate,
        Command::Temperature,
        Command::ErmVersion,
        Command::DebugB,
        Command::DebugA,
        Command::Nop,
    ];

    /// Wire ID as carried in the header's command field.
    pub fn wire_id(self) -> u32 {
        WIRE_TABLE
            .iter()
            .find(|(command, _)| *command == self)
            .map(|(_, id)| *id)
            .unwrap_or_else(|| unreachable!("every command is in the wire table"))
    }

    /// Look a wire ID back up. Unknown IDs yield `None`; the packet layer
    /// substitutes [`Command::Nop`] and flags the frame.
    pub fn from_wire_id(id: u32) -> Option<Command> {
        WIRE_TABLE
            .iter()
            .find(|(_, wire_id)| *wire_id == id)
            .map(|(command, _)| *command)
    }
}

/// A radio channel is an individual ADC or DAC path. Whether a given index
/// is receive or transmit is device-specific; the protocol carries only
/// the index, in the low two header bits.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Channel {
    One = 0,
    Two = 1,
    Three = 2,
    Four = 3,
}

impl Channel {
    pub(crate) fn bits(self) -> u32 {
        self as u32
    }

    /// Total over the 2-bit wire field.
    pub(crate) fn from_bits(bits: u32) -> Channel {
        match bits & 0x03 {
            0 => Channel::One,
            1 => Channel::Two,
            2 => Channel::Three,
            _ => Channel::Four,
        }
    }
}

impl TryFrom<u32> for Channel {
    type Error = Error;

    fn try_from(index: u32) -> Result<Self, Self::Error> {
        match index {
            0 => Ok(Channel::One),
            1 => Ok(Channel::Two),
            2 => Ok(Channel::Three),
            3 => Ok(Channel::Four),
            _ => Err(ErrorKind::InvalidParameter.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::TryFrom;

    #[test]
    fn wire_table_roundtrips_exhaustively() {
        for &command in Command::ALL.iter() {
            assert_eq!(Command::from_wire_id(command.wire_id()), Some(command));
        }
    }

    #[test]
    fn wire_ids_are_unique() {
        for (i, &(_, a)) in WIRE_TABLE.iter().enumerate() {
            for &(_, b) in WIRE_TABLE.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn out_of_range_id_is_unrecognized() {
        assert_eq!(Command::from_wire_id(0x17), None);
        assert_eq!(Command::from_wire_id(0x1F), None);
    }

    #[test]
    fn channel_from_index() {
        assert_eq!(Channel::try_from(0).unwrap(), Channel::One);
        assert_eq!(Channel::try_from(3).unwrap(), Channel::Four);
        assert_eq!(
            Channel::try_from(4).unwrap_err().kind(),
            crate::error::ErrorKind::InvalidParameter
        );
    }
}
