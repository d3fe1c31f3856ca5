use thiserror::Error;

pub type Result<T> = core::result::Result<T, KernelError>;

/// Error kinds surfaced across the memory, interrupt and USB/xHCI cores.
///
/// Enumerators that hit [`KernelError::DeviceError`] or [`KernelError::ProtocolError`]
/// on a single port unwind that device and continue; every other variant is
/// fatal along the init paths that can produce it (see `arch`, `mem`, `driver::xhci`).
#[derive(Debug, Error, Copy, Clone, Eq, PartialEq)]
pub enum KernelError {
    #[error("out of memory")]
    OutOfMemory,
    #[error("invalid argument")]
    InvalidArgument,
    #[error("operation timed out")]
    Timeout,
    #[error("device reported a non-success completion code")]
    DeviceError,
    #[error("malformed protocol data")]
    ProtocolError,
    #[error("feature not supported by this controller")]
    Unsupported,
    #[error("fatal kernel error")]
    Fatal,
}
