use crate::payload::Payload;

/// Device activity as reported by the status query.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DeviceStatus {
    /// Not doing anything and not initialized.
    IdleNotInitialized = 0,
    /// Not doing anything, initialization complete.
    IdleInitialized = 1,
    /// Actively capturing IQ samples.
    Receiving = 2,
    /// Actively transmitting IQ samples.
    Transmitting = 3,
}

impl DeviceStatus {
    pub(crate) fn from_wire(value: i32) -> Option<Self> {
        match value {
            0 => Some(DeviceStatus::IdleNotInitialized),
            1 => Some(DeviceStatus::IdleInitialized),
            2 => Some(DeviceStatus::Receiving),
            3 => Some(DeviceStatus::Transmitting),
            _ => None,
        }
    }
}

/// Active channel count mappings, RxTy meaning x receivers and y
/// transmitters active. Not every product supports every member; check
/// the device spec.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum IqChannelConfig {
    /// Covers the R1T0, R0T1, and R1T1 modes every product defaults to.
    Default = 0,
    R2T0 = 1,
    R3T0 = 2,
    R4T0 = 3,
    R0T2 = 4,
    R0T3 = 5,
    R0T4 = 6,
    R1T2 = 7,
    R1T3 = 8,
    R2T1 = 9,
    R2T2 = 10,
    R3T1 = 11,
}

impl IqChannelConfig {
    pub(crate) fn from_wire(value: u32) -> Option<Self> {
        use IqChannelConfig::*;
        match value {
            0 => Some(Default),
            1 => Some(R2T0),
            2 => Some(R3T0),
            3 => Some(R4T0),
            4 => Some(R0T2),
            5 => Some(R0T3),
            6 => Some(R0T4),
            7 => Some(R1T2),
            8 => Some(R1T3),
            9 => Some(R2T1),
            10 => Some(R2T2),
            11 => Some(R3T1),
            _ => None,
        }
    }
}

/// Gain control modes. A device may not support every member.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GainMode {
    /// No algorithm; the user sets fixed gain values.
    Manual = 0,
    /// AGC variant for slow changing signals (WCDMA, FDD LTE).
    SlowAgc = 1,
    /// AGC variant for bursty signals (TDD or FDD GSM/EDGE).
    FastAgc = 2,
}

impl GainMode {
    pub(crate) fn from_wire(value: i32) -> Option<Self> {
        match value {
            0 => Some(GainMode::Manual),
            1 => Some(GainMode::SlowAgc),
            2 => Some(GainMode::FastAgc),
            _ => None,
        }
    }
}

/// Multiplexing configuration: TDM keeps transmit and receive from ever
/// being active at once; FDM runs them concurrently.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct MultiplexMode {
    pub tdm: bool,
    pub channels: IqChannelConfig,
}

/// The embedded radio module's version/status word, fetched with one
/// transaction. The high payload word packs the software version (low 15
/// bits), the recovery-mode flag (bit 15), and the FPGA type (bits 16+);
/// the low word holds the hardware version (low 16 bits).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ErmVersion {
    word: Payload,
}

impl ErmVersion {
    pub(crate) fn new(word: Payload) -> Self {
        Self { word }
    }

    /// Embedded software version, 0 if not applicable for the device.
    pub fn software_version(&self) -> u32 {
        self.word.high() & 0x0000_7FFF
    }

    /// FPGA bitstream version, 0 if not applicable for the device.
    pub fn hardware_version(&self) -> u32 {
        self.word.low() & 0x0000_FFFF
    }

    /// Installed FPGA identifier, highly device specific.
    pub fn fpga_type(&self) -> u32 {
        self.word.high() >> 16
    }

    /// True when the device lost its main image and is running the backup
    /// bootloader-type firmware.
    pub fn is_recovery_mode(&self) -> bool {
        self.word.high() & 0x0000_8000 != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn erm_version_subfields() {
        let word = Payload::from_words(0x0007_8123, 0x0002_0042);
        let version = ErmVersion::new(word);
        assert_eq!(version.software_version(), 0x0123);
        assert_eq!(version.hardware_version(), 0x0042);
        assert_eq!(version.fpga_type(), 0x0007);
        assert!(version.is_recovery_mode());

        let production = ErmVersion::new(Payload::from_words(0x0001_0123, 0x0000_0042));
        assert!(!production.is_recovery_mode());
    }

    #[test]
    fn wire_conversions_reject_unknowns() {
        assert_eq!(DeviceStatus::from_wire(2), Some(DeviceStatus::Receiving));
        assert_eq!(DeviceStatus::from_wire(4), None);
        assert_eq!(IqChannelConfig::from_wire(11), Some(IqChannelConfig::R3T1));
        assert_eq!(IqChannelConfig::from_wire(12), None);
        assert_eq!(GainMode::from_wire(1), Some(GainMode::SlowAgc));
        assert_eq!(GainMode::from_wire(-1), None);
    }
}
