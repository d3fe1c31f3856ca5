use thiserror::Error;

use crate::error::KernelError;

#[derive(Debug, Error, Copy, Clone, Eq, PartialEq)]
pub enum XhciError {
    #[error("device is not a USB host controller")]
    NotUsb,
    #[error(transparent)]
    Kernel(#[from] KernelError),
}
