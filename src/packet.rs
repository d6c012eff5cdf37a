use crate::command::{Channel, Command};
use crate::error::ErrorKind;
use crate::payload::Payload;
use crc::{Algorithm, Crc};

/// Serialized frame length: header (4) + payload (8) + footer (4).
pub const FRAME_LEN: usize = 16;

/// Fixed delimiter carried in the upper header bits.
pub const PACKET_PREFIX: u32 = 0x5AB2_0000;
/// Fixed delimiter carried in the upper footer bits.
pub const PACKET_SUFFIX: u32 = 0xBA52_0000;
/// Masks the delimiter bits of either boundary word.
pub const PACKET_DELIMITER_MASK: u32 = 0xFFFF_0000;

/// Set/get bit: set commands carry it, gets leave it clear.
pub const SET_CMD_BIT: u32 = 0x0000_0200;
pub const GET_CMD_BIT: u32 = 0x0000_0000;
pub const SET_GET_FIELD_MASK: u32 = 0x0000_0200;

/// Ack/nack field. A device refusing a command sets the bit; the cleared
/// field is the acknowledged pattern, so an outgoing request frames as an
/// acknowledged packet.
pub const ACK_NACK_FIELD_MASK: u32 = 0x0000_0400;
pub const DEV_ACK_RESP: u32 = 0x0000_0000;

/// Command ID field, 5 bits starting 4 bits into the header.
pub const CMD_ID_FIELD_MASK: u32 = 0x0000_01F0;
const CMD_ID_SHIFT: u32 = 4;

/// Channel field, the low two header bits.
pub const CHANNEL_FIELD_MASK: u32 = 0x0000_0003;

/// Checksum field, the low footer bits.
pub const CHECKSUM_FIELD_MASK: u32 = 0x0000_FFFF;

// Parameters to calculate the frame CRC (CRC-16/ARC).
const FRAME_ALG: Algorithm<u16> = Algorithm {
    width: 16,
    poly: 0x8005,
    init: 0x0000,
    refin: true,
    refout: true,
    xorout: 0x0000,
    check: 0xbb3d,
    residue: 0x0000,
};

// CRC memoise table
pub const CRC16: Crc<u16> = Crc::<u16>::new(&FRAME_ALG);

/// Frame checksum over the header, payload, and footer delimiter. The
/// footer's checksum field is cleared before it enters the computation.
pub fn checksum(header: u32, payload: &Payload, footer: u32) -> u32 {
    let mut buffer = [0u8; FRAME_LEN];
    buffer[..4].copy_from_slice(&header.to_be_bytes());
    buffer[4..12].copy_from_slice(&payload.to_bytes());
    buffer[12..].copy_from_slice(&(footer & PACKET_DELIMITER_MASK).to_be_bytes());
    u32::from(CRC16.checksum(&buffer))
}

/// Classification a frame acquires while it is built or validated.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ResponseError {
    None,
    ChecksumFailure,
    FramingError,
    NotAcknowledged,
    /// Synthetic classification for the stand-in frame produced when the
    /// device never answered.
    DeviceNotResponding,
    CommandNotRecognized,
}

impl ResponseError {
    /// Deterministic mapping into the operation-level taxonomy. Anything
    /// the protocol layer does not classify falls back to `Unsuccessful`.
    pub fn flag(self) -> ErrorKind {
        match self {
            ResponseError::ChecksumFailure => ErrorKind::ChecksumFailure,
            ResponseError::FramingError => ErrorKind::FramingError,
            ResponseError::NotAcknowledged => ErrorKind::InvalidState,
            ResponseError::DeviceNotResponding => ErrorKind::NotResponding,
            ResponseError::None | ResponseError::CommandNotRecognized => ErrorKind::Unsuccessful,
        }
    }
}

/// One 16-byte command frame. Built fresh for each request and rebuilt
/// from raw words for each response; never mutated after construction.
#[derive(Copy, Clone, Debug)]
pub struct Packet {
    header: u32,
    payload: Payload,
    footer: u32,
    valid: bool,
    error: ResponseError,
}

impl Packet {
    /// Frame an outgoing command.
    pub fn build(command: Command, channel: Channel, is_set: bool, payload: Payload) -> Self {
        Self::build_raw(command.wire_id(), channel, is_set, payload)
    }

    /// Frame an outgoing command from a raw wire ID. Unknown IDs produce
    /// the Nop pattern and an invalid packet; callers must check validity
    /// before handing the frame to a transport.
    pub fn build_raw(command_id: u32, channel: Channel, is_set: bool, payload: Payload) -> Self {
        let mut header = PACKET_PREFIX;
        header |= if is_set { SET_CMD_BIT } else { GET_CMD_BIT };
        let (wire_id, valid, error) = match Command::from_wire_id(command_id) {
            Some(command) => (command.wire_id(), true, ResponseError::None),
            None => (
                Command::Nop.wire_id(),
                false,
                ResponseError::CommandNotRecognized,
            ),
        };
        header |= (wire_id << CMD_ID_SHIFT) & CMD_ID_FIELD_MASK;
        header |= channel.bits() & CHANNEL_FIELD_MASK;
        let footer = PACKET_SUFFIX | checksum(header, &payload, PACKET_SUFFIX);
        Self {
            header,
            payload,
            footer,
            valid,
            error,
        }
    }

    /// Reconstruct and validate a received frame. Checks run in a fixed
    /// order so a mangled frame always reports the same classification:
    /// checksum, header prefix, footer suffix, ack field.
    pub fn parse(header: u32, payload: Payload, footer: u32) -> Self {
        let (valid, error) = Self::validate(header, &payload, footer);
        Self {
            header,
            payload,
            footer,
            valid,
            error,
        }
    }

    fn validate(header: u32, payload: &Payload, footer: u32) -> (bool, ResponseError) {
        if checksum(header, payload, footer) != footer & CHECKSUM_FIELD_MASK {
            return (false, ResponseError::ChecksumFailure);
        }
        if header & PACKET_DELIMITER_MASK != PACKET_PREFIX {
            return (false, ResponseError::FramingError);
        }
        if footer & PACKET_DELIMITER_MASK != PACKET_SUFFIX {
            return (false, ResponseError::FramingError);
        }
        if header & ACK_NACK_FIELD_MASK != DEV_ACK_RESP {
            return (false, ResponseError::NotAcknowledged);
        }
        (true, ResponseError::None)
    }

    /// Frame the response a healthy device returns for `request`, echoing
    /// or replacing the payload. This is the device side of the exchange;
    /// loopback rigs and simulators use it to stand in for hardware.
    pub fn acknowledgement(request: &Packet, payload: Payload) -> Self {
        let header = (request.header & !ACK_NACK_FIELD_MASK) | DEV_ACK_RESP;
        let footer = PACKET_SUFFIX | checksum(header, &payload, PACKET_SUFFIX);
        Self::parse(header, payload, footer)
    }

    /// Stand-in response for a transaction the device never answered.
    pub fn failed(request: &Packet) -> Self {
        Self {
            header: request.header,
            payload: request.payload,
            footer: request.footer,
            valid: false,
            error: ResponseError::DeviceNotResponding,
        }
    }

    /// Serialize: header, payload high word, payload low word, footer,
    /// all big-endian.
    pub fn to_bytes(&self) -> [u8; FRAME_LEN] {
        let mut bytes = [0u8; FRAME_LEN];
        bytes[..4].copy_from_slice(&self.header.to_be_bytes());
        bytes[4..12].copy_from_slice(&self.payload.to_bytes());
        bytes[12..].copy_from_slice(&self.footer.to_be_bytes());
        bytes
    }

    /// Slice a received frame into its words and validate them.
    pub fn from_bytes(bytes: &[u8; FRAME_LEN]) -> Self {
        let mut header = [0u8; 4];
        let mut payload = [0u8; 8];
        let mut footer = [0u8; 4];
        header.copy_from_slice(&bytes[..4]);
        payload.copy_from_slice(&bytes[4..12]);
        footer.copy_from_slice(&bytes[12..]);
        Self::parse(
            u32::from_be_bytes(header),
            Payload::from_bytes(payload),
            u32::from_be_bytes(footer),
        )
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn error(&self) -> ResponseError {
        self.error
    }

    pub fn header(&self) -> u32 {
        self.header
    }

    pub fn footer(&self) -> u32 {
        self.footer
    }

    pub fn payload(&self) -> Payload {
        self.payload
    }

    pub fn is_set_command(&self) -> bool {
        self.header & SET_GET_FIELD_MASK == SET_CMD_BIT
    }

    /// Command carried in the header, if the ID field holds a known one.
    pub fn command(&self) -> Option<Command> {
        Command::from_wire_id((self.header & CMD_ID_FIELD_MASK) >> CMD_ID_SHIFT)
    }

    pub fn channel(&self) -> Channel {
        Channel::from_bits(self.header & CHANNEL_FIELD_MASK)
    }
}
