use crate::command::{Channel, Command};
use crate::error::{Error, ErrorKind};
use crate::packet::{Packet, ResponseError};
use crate::payload::Payload;
use crate::transport::{Bridge, CommandLink, Transport};
use crate::types::{DeviceStatus, ErmVersion, GainMode, IqChannelConfig, MultiplexMode};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

const FAST_RATE_STREAM_SIZE_BYTES: u32 = 4_194_304;
const MED_RATE_STREAM_SIZE_BYTES: u32 = 1_048_576;
const MED_LOW_RATE_STREAM_SIZE_BYTES: u32 = 262_144;
const SLOW_RATE_STREAM_SIZE_BYTES: u32 = 65_536;

const MIN_ATTENUATION_DB: f32 = 0.0;
const MAX_ATTENUATION_DB: f32 = 89.75;
const MIN_LO_HZ: u64 = 70_000_000;
const MAX_LO_HZ: u64 = 6_000_000_000;

/// Reported in place of a reading when the temperature query fails.
pub const TEMP_UNAVAILABLE: f32 = -99.0;

/// Sample rates the SABR product family accepts, in Hz.
pub const SUPPORTED_SAMPLE_RATES: [u64; 27] = [
    640_000,
    960_000,
    1_000_000,
    1_920_000,
    2_000_000,
    3_840_000,
    4_000_000,
    6_000_000,
    7_680_000,
    8_000_000,
    10_000_000,
    14_000_000,
    15_360_000,
    16_000_000,
    20_000_000,
    24_000_000,
    28_000_000,
    30_720_000,
    32_000_000,
    36_000_000,
    40_000_000,
    44_000_000,
    48_000_000,
    52_000_000,
    56_000_000,
    60_000_000,
    61_440_000,
];

/// Command-channel state. Lives behind one mutex so a transaction can
/// never observe a half-finished bring-up.
struct Session<P> {
    link: Option<CommandLink<P>>,
    capturing: bool,
    transmitting: bool,
}

/// A SABR radio. Command transactions are single-flight: the session lock
/// admits one exchange at a time and concurrent callers queue on it. The
/// sample pipe is a separate endpoint under its own lock, so one dedicated
/// streaming caller can move IQ bytes while commands are in flight.
pub struct RadioDevice<B: Bridge> {
    bridge: Mutex<B>,
    session: Mutex<Session<B::Pipe>>,
    data_pipe: Mutex<Option<B::Pipe>>,
    iq_chunk_bytes: AtomicU32,
}

impl<B: Bridge> RadioDevice<B> {
    pub fn new(bridge: B) -> Self {
        Self {
            bridge: Mutex::new(bridge),
            session: Mutex::new(Session {
                link: None,
                capturing: false,
                transmitting: false,
            }),
            data_pipe: Mutex::new(None),
            iq_chunk_bytes: AtomicU32::new(MED_RATE_STREAM_SIZE_BYTES),
        }
    }

    /// Bring the device up: open the bridge and install its pipes. Must
    /// complete before the first transaction. A second `setup` on a live
    /// session is refused rather than re-entered.
    pub fn setup(&self) -> Result<(), Error> {
        let mut session = self.session.lock();
        if session.link.is_some() {
            return Err(ErrorKind::AlreadyRunning.into());
        }
        let mut bridge = self.bridge.lock();
        let pipes = bridge.open()?;
        drop(bridge);
        *self.data_pipe.lock() = Some(pipes.data);
        session.link = Some(CommandLink::new(pipes.command));
        log::debug!("device session established");
        Ok(())
    }

    /// Tear the session down and close the bridge.
    pub fn close(&self) -> Result<(), Error> {
        let mut session = self.session.lock();
        session.link = None;
        session.capturing = false;
        session.transmitting = false;
        let mut bridge = self.bridge.lock();
        let result = bridge.close();
        drop(bridge);
        *self.data_pipe.lock() = None;
        result
    }

    pub fn is_ready(&self) -> bool {
        self.session.lock().link.is_some() && self.bridge.lock().is_ready()
    }

    /// One command transaction. Serializes the request, drives a single
    /// write+read exchange under the session lock, validates the response,
    /// and extracts its payload.
    fn process(
        &self,
        command: Command,
        channel: Channel,
        is_set: bool,
        payload: Payload,
    ) -> Result<Payload, Error> {
        self.process_raw(command.wire_id(), channel, is_set, payload)
    }

    /// Send an arbitrary wire command ID. This is the untyped entry the
    /// debug and vendor-specific IDs travel through; unknown IDs are
    /// refused before any transport I/O.
    pub fn raw_command(
        &self,
        command_id: u32,
        channel: Channel,
        is_set: bool,
        payload: Payload,
    ) -> Result<Payload, Error> {
        self.process_raw(command_id, channel, is_set, payload)
    }

    fn process_raw(
        &self,
        command_id: u32,
        channel: Channel,
        is_set: bool,
        payload: Payload,
    ) -> Result<Payload, Error> {
        let mut session = self.session.lock();
        let link = match session.link.as_mut() {
            Some(link) => link,
            None => return Err(ErrorKind::NotInitialized.into()),
        };

        let request = Packet::build_raw(command_id, channel, is_set, payload);
        if !request.is_valid() {
            return Err(ErrorKind::Unsuccessful.into());
        }

        let response = link.transact(&request)?;
        if !response.is_valid() {
            match response.error() {
                ResponseError::ChecksumFailure => log::warn!("SABR response checksum failed"),
                ResponseError::FramingError => log::warn!("SABR response framing invalid"),
                ResponseError::NotAcknowledged => log::warn!("SABR did not ACK the command"),
                other => log::warn!("SABR response rejected: {:?}", other),
            }
            return Err(response.error().flag().into());
        }
        Ok(response.payload())
    }

    /// Initialize the radio hardware. Call before anything else.
    pub fn init_device(&self) -> Result<(), Error> {
        self.process(Command::InitDevice, Channel::One, true, Payload::new())
            .map(drop)
    }

    /// Reset the device and re-initialize it. Settings may revert to
    /// defaults; can take several seconds.
    pub fn reset(&self) -> Result<(), Error> {
        self.process(Command::Reset, Channel::One, true, Payload::new())?;
        self.init_device()
    }

    pub fn device_status(&self) -> Result<DeviceStatus, Error> {
        let payload = self.process(Command::DeviceStatus, Channel::One, false, Payload::new())?;
        DeviceStatus::from_wire(payload.as_i32()).ok_or_else(|| ErrorKind::Unsuccessful.into())
    }

    /// Current multiplex mode: the TDM flag travels in the low word, the
    /// channel configuration in the high word.
    pub fn multiplex_mode(&self) -> Result<MultiplexMode, Error> {
        let payload = self.process(Command::MultiplexMode, Channel::One, false, Payload::new())?;
        let channels = IqChannelConfig::from_wire(payload.high())
            .ok_or_else(|| Error::from(ErrorKind::Unsuccessful))?;
        Ok(MultiplexMode {
            tdm: payload.as_bool(),
            channels,
        })
    }

    /// Set the multiplex mode. The current mode is unchanged on failure.
    /// Every product defaults to an R1T0/R0T1/R1T1 mode, so this is only
    /// needed for other configurations or to control TDM.
    pub fn set_multiplex_mode(&self, mode: MultiplexMode) -> Result<(), Error> {
        let payload = Payload::from_words(mode.channels as u32, mode.tdm as u32);
        self.process(Command::MultiplexMode, Channel::One, true, payload)
            .map(drop)
    }

    /// Current LO frequency of the channel, in Hz.
    pub fn lo_frequency(&self, channel: Channel) -> Result<u64, Error> {
        let payload = self.process(Command::LoFrequency, channel, false, Payload::new())?;
        Ok(payload.as_u64())
    }

    /// Tune the channel's LO. Frequencies outside [70 MHz, 6 GHz] are
    /// refused without touching the device.
    pub fn set_lo_frequency(&self, channel: Channel, frequency: u64) -> Result<(), Error> {
        if frequency < MIN_LO_HZ || frequency > MAX_LO_HZ {
            return Err(ErrorKind::InvalidParameter.into());
        }
        self.process(Command::LoFrequency, channel, true, Payload::from(frequency))
            .map(drop)
    }

    /// Manual gain in dB; only meaningful in manual gain control mode.
    pub fn gain(&self, channel: Channel) -> Result<i32, Error> {
        let payload = self.process(Command::Gain, channel, false, Payload::new())?;
        Ok(payload.as_i32())
    }

    pub fn set_gain(&self, channel: Channel, gain: i32) -> Result<(), Error> {
        self.process(Command::Gain, channel, true, Payload::from(gain))
            .map(drop)
    }

    pub fn gain_mode(&self, channel: Channel) -> Result<GainMode, Error> {
        let payload = self.process(Command::GainMode, channel, false, Payload::new())?;
        GainMode::from_wire(payload.as_i32()).ok_or_else(|| ErrorKind::Unsuccessful.into())
    }

    pub fn set_gain_mode(&self, channel: Channel, mode: GainMode) -> Result<(), Error> {
        self.process(Command::GainMode, channel, true, Payload::from(mode as i32))
            .map(drop)
    }

    /// Transmit attenuation in dB. The device reports millidecibels.
    pub fn transmit_attenuation(&self, channel: Channel) -> Result<f32, Error> {
        let payload = self.process(Command::Gain, channel, false, Payload::new())?;
        Ok(payload.as_i32() as f32 / 1000.0)
    }

    /// Set the transmit attenuation of a transmit channel. The accepted
    /// range is [0.0, 89.75] dB; anything outside is refused without
    /// touching the device.
    pub fn set_transmit_attenuation(&self, channel: Channel, attenuation: f32) -> Result<(), Error> {
        if !(MIN_ATTENUATION_DB..=MAX_ATTENUATION_DB).contains(&attenuation) {
            return Err(ErrorKind::InvalidParameter.into());
        }
        let millidecibels = (attenuation * 1000.0) as i32;
        self.process(Command::Gain, channel, true, Payload::from(millidecibels))
            .map(drop)
    }

    /// Analog low pass filter complex bandwidth, in Hz.
    pub fn complex_bandwidth(&self, channel: Channel) -> Result<u64, Error> {
        let payload = self.process(Command::Bandwidth, channel, false, Payload::new())?;
        Ok(payload.as_u64())
    }

    pub fn set_complex_bandwidth(&self, channel: Channel, bandwidth: u64) -> Result<(), Error> {
        self.process(Command::Bandwidth, channel, true, Payload::from(bandwidth))
            .map(drop)
    }

    /// Sample rate in Hz, where a sample is one IQ pair. Some firmware
    /// reports a rate off by one; odd readings are rounded to the even
    /// rate the device is actually running.
    pub fn sample_rate(&self, channel: Channel) -> Result<u64, Error> {
        let payload = self.process(Command::SampleRate, channel, false, Payload::new())?;
        let mut rate = payload.as_u64();
        if rate % 2 != 0 {
            if rate & 0x02 == 0x02 {
                rate += 1;
            } else {
                rate -= 1;
            }
        }
        Ok(rate)
    }

    /// Set the sample rate. On success the IQ stream chunk size is
    /// re-bucketed to suit the new rate.
    pub fn set_sample_rate(&self, channel: Channel, sample_rate: u64) -> Result<(), Error> {
        self.process(
            Command::SampleRate,
            channel,
            true,
            Payload::from(sample_rate),
        )?;
        self.iq_chunk_bytes
            .store(chunk_size_for_rate(sample_rate), Ordering::Relaxed);
        Ok(())
    }

    /// Device temperature in degrees Celsius; the device reports
    /// millidegrees. Callers keeping the legacy convention can fall back
    /// with `unwrap_or(TEMP_UNAVAILABLE)`.
    pub fn device_temperature(&self) -> Result<f32, Error> {
        let payload = self.process(Command::Temperature, Channel::One, false, Payload::new())?;
        Ok(payload.as_i32() as f32 / 1000.0)
    }

    /// Start capturing IQ samples on all channels configured active.
    pub fn start_capture(&self) -> Result<(), Error> {
        self.process(
            Command::CaptureEnable,
            Channel::One,
            true,
            Payload::from(true),
        )?;
        self.session.lock().capturing = true;
        Ok(())
    }

    pub fn stop_capture(&self) -> Result<(), Error> {
        self.process(
            Command::CaptureEnable,
            Channel::One,
            true,
            Payload::from(false),
        )?;
        self.session.lock().capturing = false;
        Ok(())
    }

    /// Start transmitting IQ samples on all channels configured active.
    pub fn start_transmit(&self) -> Result<(), Error> {
        self.process(
            Command::TransmitEnable,
            Channel::One,
            true,
            Payload::from(true),
        )?;
        self.session.lock().transmitting = true;
        Ok(())
    }

    pub fn stop_transmit(&self) -> Result<(), Error> {
        self.process(
            Command::TransmitEnable,
            Channel::One,
            true,
            Payload::from(false),
        )?;
        self.session.lock().transmitting = false;
        Ok(())
    }

    pub fn is_capturing(&self) -> bool {
        self.session.lock().capturing
    }

    pub fn is_transmitting(&self) -> bool {
        self.session.lock().transmitting
    }

    /// The embedded radio module's version/status word. One query covers
    /// the software/hardware versions, FPGA type, and recovery flag.
    pub fn erm_version(&self) -> Result<ErmVersion, Error> {
        let payload = self.process(Command::ErmVersion, Channel::One, false, Payload::new())?;
        Ok(ErmVersion::new(payload))
    }

    /// Reference source control is not implemented by current firmware.
    pub fn reference_source(&self) -> Result<bool, Error> {
        Err(ErrorKind::OperationUnsupported.into())
    }

    pub fn set_reference_source(&self, _internal: bool) -> Result<(), Error> {
        Err(ErrorKind::OperationUnsupported.into())
    }

    /// Extended AGC parameter control is not implemented by current
    /// firmware.
    pub fn set_agc_parameters(&self, _channel: Channel, _params: &[i32]) -> Result<(), Error> {
        Err(ErrorKind::OperationUnsupported.into())
    }

    pub fn agc_parameter_defaults(&self, _channel: Channel) -> Result<Vec<i32>, Error> {
        Err(ErrorKind::OperationUnsupported.into())
    }

    /// Number of bytes one `receive_stream` call returns. Each IQ sample
    /// is 4 bytes (2 for I, 2 for Q).
    pub fn iq_stream_size(&self) -> u32 {
        self.iq_chunk_bytes.load(Ordering::Relaxed)
    }

    /// Read raw IQ bytes from the sample pipe into `buffer`, returning
    /// how many arrived.
    pub fn receive_samples(&self, buffer: &mut [u8]) -> Result<usize, Error> {
        let mut guard = self.data_pipe.lock();
        let pipe = match guard.as_mut() {
            Some(pipe) => pipe,
            None => return Err(ErrorKind::NotInitialized.into()),
        };
        pipe.read(buffer).map_err(|err| {
            log::warn!("IQ RX failed: {}", err);
            ErrorKind::Unsuccessful.into()
        })
    }

    /// Read one chunk-sized block of raw IQ bytes.
    pub fn receive_stream(&self) -> Result<Vec<u8>, Error> {
        let mut samples = vec![0u8; self.iq_stream_size() as usize];
        let count = self.receive_samples(&mut samples)?;
        samples.truncate(count);
        Ok(samples)
    }

    /// Write raw IQ bytes to the sample pipe. Feed at the sample rate;
    /// the length should be a multiple of 4.
    pub fn transmit_samples(&self, samples: &[u8]) -> Result<(), Error> {
        let mut guard = self.data_pipe.lock();
        let pipe = match guard.as_mut() {
            Some(pipe) => pipe,
            None => return Err(ErrorKind::NotInitialized.into()),
        };
        pipe.write(samples).map_err(|err| {
            log::warn!("IQ TX failed: {}", err);
            ErrorKind::Unsuccessful.into()
        })
    }
}

fn chunk_size_for_rate(sample_rate: u64) -> u32 {
    if sample_rate <= 1_000_000 {
        SLOW_RATE_STREAM_SIZE_BYTES
    } else if sample_rate <= 2_000_000 {
        MED_LOW_RATE_STREAM_SIZE_BYTES
    } else if sample_rate < 30_000_000 {
        MED_RATE_STREAM_SIZE_BYTES
    } else {
        FAST_RATE_STREAM_SIZE_BYTES
    }
}
