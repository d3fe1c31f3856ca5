//! Host-controller vtable (§4.6): the USB core drives enumeration and class
//! drivers purely through this trait, so it has no idea whether the backing
//! controller is xHCI, EHCI, or a simulator in a test.

use alloc::sync::Arc;
use spin::Mutex;

use crate::driver::usb::device::Device;
use crate::driver::usb::endpoint::Endpoint;
use crate::Result;

/// A USB control-transfer setup packet (USB 2.0 §9.3).
#[derive(Debug, Copy, Clone)]
pub struct SetupPacket {
    pub request_type: u8,
    pub request: u8,
    pub value: u16,
    pub index: u16,
    pub length: u16,
}

impl SetupPacket {
    pub const GET_DESCRIPTOR: u8 = 0x06;
    pub const SET_ADDRESS: u8 = 0x05;
    pub const SET_CONFIGURATION: u8 = 0x09;
    pub const GET_REPORT: u8 = 0x01;
    pub const SET_PROTOCOL: u8 = 0x0b;
    pub const SET_IDLE: u8 = 0x0a;

    pub const HOST_TO_DEVICE_STANDARD_DEVICE: u8 = 0x00;
    pub const DEVICE_TO_HOST_STANDARD_DEVICE: u8 = 0x80;
    pub const HOST_TO_DEVICE_CLASS_INTERFACE: u8 = 0x21;
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Direction {
    In,
    Out,
}

/// Any host controller the USB core can drive (§4.6).
///
/// `slot_id` identifies the device within the controller's own device
/// table (for xHCI, literally the slot id); the core never interprets it.
pub trait HostController: Send + Sync {
    /// One-time controller bring-up; called exactly once before any other
    /// method.
    fn init(&self) -> Result<()>;

    /// Number of root-hub ports this controller exposes, for enumeration's
    /// initial port sweep. Ports are 1-based, `1..=port_count()`.
    fn port_count(&self) -> usize;

    /// Resets `port` (1-based) and reports the negotiated speed of whatever
    /// now responds there, or `Ok(None)` if nothing is attached.
    fn reset_port(&self, port: usize) -> Result<Option<crate::driver::usb::speed::Speed>>;

    /// Allocates a controller-side slot for a device just found on `port`
    /// and addresses it at the protocol level. Returns the slot id the core
    /// should use for every later call about this device.
    fn enable_device(&self, port: usize, speed: crate::driver::usb::speed::Speed) -> Result<u8>;

    /// Installs `endpoint` into the controller's device context for
    /// `slot_id` (Configure Endpoint, for xHCI).
    fn configure_endpoint(&self, slot_id: u8, endpoint: &Endpoint) -> Result<()>;

    /// Executes one control transfer to `slot_id`'s default pipe, writing at
    /// most `buf.len()` bytes of the data stage into or out of `buf`
    /// depending on `setup.request_type`'s direction bit. Returns the number
    /// of bytes actually transferred.
    fn control_transfer(&self, slot_id: u8, setup: SetupPacket, buf: &mut [u8]) -> Result<usize>;

    /// Executes one interrupt or bulk transfer on `endpoint`, per `direction`.
    fn transfer(
        &self,
        slot_id: u8,
        endpoint: &Endpoint,
        direction: Direction,
        buf: &mut [u8],
    ) -> Result<usize>;

    /// Drains and dispatches whatever transfer/command completions the
    /// controller has produced since the last call. Cooperative drivers call
    /// this from their own poll loop rather than relying on interrupts.
    fn poll(&self);

    /// Releases the controller-side slot for a device that has disconnected.
    fn cleanup(&self, slot_id: u8) -> Result<()>;
}

/// A registered host controller plus the devices the core currently tracks
/// as attached through it.
pub struct Controller {
    pub host: Arc<dyn HostController>,
    pub devices: Mutex<alloc::vec::Vec<Arc<Mutex<Device>>>>,
}

impl Controller {
    pub fn new(host: Arc<dyn HostController>) -> Self {
        Self {
            host,
            devices: Mutex::new(alloc::vec::Vec::new()),
        }
    }
}
