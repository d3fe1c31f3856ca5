//! Human Interface Device class support (§4.13, §4.14): report-descriptor
//! parsing for devices that need it, a fast path for the boot-protocol
//! keyboard/mouse that don't, and the driver that ties either into the
//! global [`crate::input`] queue.

pub mod boot_protocol;
pub mod driver;
pub mod parser;
