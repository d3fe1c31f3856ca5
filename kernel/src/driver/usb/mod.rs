//! USB core (§4.6): the host-controller-agnostic device model, descriptor
//! parser, enumeration state machine, hub and HID class drivers, and the
//! class-driver registration table they bind through.

pub mod controller;
pub mod descriptor;
pub mod device;
pub mod driver;
pub mod endpoint;
pub mod enumeration;
pub mod hub;
mod protocol_support;
mod speed;

pub use device::*;
pub use endpoint::*;
pub use protocol_support::*;
pub use speed::*;

use conquer_once::spin::OnceCell;

use crate::driver::hid;
use crate::driver::usb::controller::Controller;
use crate::driver::usb::driver::UsbDriverDescriptor;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Protocol {
    USB2,
    USB3,
    USB3_1,
    USB3_2,
}

static CONTROLLER: OnceCell<Controller> = OnceCell::uninit();

pub static HUB_DRIVER: UsbDriverDescriptor = UsbDriverDescriptor {
    name: "hub",
    probe: hub::probe,
    init: hub::init,
};

/// Registers the class drivers this core ships (§4.6, §4.12, §4.14) and
/// installs the singleton host-controller instance that drivers reach
/// through [`controller()`]. Called once, after the host controller
/// (currently only xHCI, see [`crate::driver::xhci`]) has finished its own
/// bring-up.
pub fn init(host_controller: Controller) {
    CONTROLLER.init_once(|| host_controller);
    driver::register(hid::driver::HID_DRIVER);
    driver::register(HUB_DRIVER);
}

/// The singleton host-controller-plus-device-list the USB core drives.
///
/// # Panics
/// Panics if [`init`] has not run yet.
pub fn controller() -> &'static Controller {
    CONTROLLER.get().expect("usb core not initialized")
}
