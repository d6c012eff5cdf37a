use core::fmt;

/// An error type covering every way a radio operation can fail.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Error {
    kind: ErrorKind,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Error {
        Error { kind }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "{}", self.kind.as_str())
    }
}

impl std::error::Error for Error {}

/// A list of specific failure causes. Each kind is converted into `Error`
/// type. Successful operations return `Ok` rather than a dedicated kind.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Provided parameter is out of range or otherwise not what the device
    /// expects. Non-fatal; review the product capabilities.
    InvalidParameter,
    /// Operation as requested is not supported, or is unimplemented.
    OperationUnsupported,
    /// Buffer underflow.
    Underflow,
    /// Buffer overflow.
    Overflow,
    /// An external IO resource is unable to be used.
    ResourceUnavailable,
    /// Caller does not have authority to perform an operation.
    PermissionDenied,
    /// No response from the device within the pipe timeout. Normally fatal;
    /// check the cabling and restart.
    NotResponding,
    /// The device session has not completed bring-up.
    NotInitialized,
    /// Operation did not succeed.
    Unsuccessful,
    /// Operation/process already running.
    AlreadyRunning,
    /// Resource is disposed; cannot be used further.
    Disposed,
    /// From-device response frame isn't correct.
    FramingError,
    /// Checksum failed for the from-device response.
    ChecksumFailure,
    /// The device cannot perform the action in its current state (changing
    /// manual gain while in AGC mode, for instance).
    InvalidState,
}

impl ErrorKind {
    fn as_str(&self) -> &'static str {
        use ErrorKind::*;
        match self {
            InvalidParameter => "provided parameter is out of range or not what the device expects",
            OperationUnsupported => "operation is not supported by the device",
            Underflow => "buffer underflow",
            Overflow => "buffer overflow",
            ResourceUnavailable => "an external IO resource is unable to be used",
            PermissionDenied => "caller does not have authority to perform the operation",
            NotResponding => "device is not responding to queries",
            NotInitialized => "device session is not initialized",
            Unsuccessful => "operation did not succeed",
            AlreadyRunning => "operation or process is already running",
            Disposed => "resource is disposed and cannot be used further",
            FramingError => "from-device response is not framed properly",
            ChecksumFailure => "checksum failed for the from-device response",
            InvalidState => "device is not in a state that allows the action",
        }
    }
}
