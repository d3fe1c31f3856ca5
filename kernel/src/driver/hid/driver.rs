//! HID class driver (§4.14): boot-protocol keyboard/mouse input glue.
//!
//! Registered into [`crate::driver::usb::driver`]'s table like any other
//! class driver; `init` claims the interrupt-IN endpoint and switches the
//! device into boot protocol, `poll` (called from the same cooperative loop
//! that drives the xHCI controller) submits one interrupt transfer and
//! turns the result into [`crate::input::InputEvent`]s.

use alloc::boxed::Box;
use alloc::sync::{Arc, Weak};
use alloc::vec::Vec;
use core::error::Error;

use spin::Mutex;

use crate::driver::hid::boot_protocol::{
    diff_keyboard_report, diff_mouse_report, KEYBOARD_REPORT_LEN, MOUSE_REPORT_MIN_LEN,
};
use crate::driver::usb::controller::{Direction, SetupPacket};
use crate::driver::usb::device::Device;
use crate::driver::usb::driver::UsbDriverDescriptor;
use crate::driver::usb::endpoint::{Endpoint, TransferType};
use crate::input;

const HID_CLASS: u8 = 0x03;
const BOOT_SUBCLASS: u8 = 0x01;
const PROTOCOL_KEYBOARD: u8 = 0x01;
const PROTOCOL_MOUSE: u8 = 0x02;

const BOOT_PROTOCOL_VALUE: u16 = 0;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum Kind {
    Keyboard,
    Mouse,
    Unknown,
}

struct HidState {
    kind: Kind,
    interrupt_in: Endpoint,
    last_report: Vec<u8>,
}

/// Matches device-class=3 or interface-class=3, preferring the boot
/// sub/protocol pairs but falling back to any HID class when those fields
/// are zero (§4.14's flexible-fallback rule).
pub fn probe(device: &Device) -> bool {
    if device.class() != HID_CLASS {
        return false;
    }
    if device.subclass() == 0 && device.protocol() == 0 {
        return true;
    }
    device.subclass() == BOOT_SUBCLASS
        && matches!(device.protocol(), PROTOCOL_KEYBOARD | PROTOCOL_MOUSE)
}

pub fn init(device: Weak<Mutex<Device>>) -> Result<(), Box<dyn Error>> {
    let device_arc = device.upgrade().ok_or(crate::error::KernelError::DeviceError)?;
    let mut guard = device_arc.lock();

    let interrupt_in = *guard
        .endpoints()
        .iter()
        .find(|ep| ep.is_in() && ep.transfer_type() == TransferType::Interrupt)
        .ok_or(crate::error::KernelError::Unsupported)?;

    let kind = match (guard.subclass(), guard.protocol()) {
        (BOOT_SUBCLASS, PROTOCOL_KEYBOARD) => Kind::Keyboard,
        (BOOT_SUBCLASS, PROTOCOL_MOUSE) => Kind::Mouse,
        _ => Kind::Unknown,
    };

    let slot_id = guard.slot_id();
    let host = guard.host().clone();

    host.control_transfer(
        slot_id,
        SetupPacket {
            request_type: SetupPacket::HOST_TO_DEVICE_CLASS_INTERFACE,
            request: SetupPacket::SET_IDLE,
            value: 0,
            index: 0,
            length: 0,
        },
        &mut [],
    )?;
    host.control_transfer(
        slot_id,
        SetupPacket {
            request_type: SetupPacket::HOST_TO_DEVICE_CLASS_INTERFACE,
            request: SetupPacket::SET_PROTOCOL,
            value: BOOT_PROTOCOL_VALUE,
            index: 0,
            length: 0,
        },
        &mut [],
    )?;

    let report_len = match kind {
        Kind::Keyboard => KEYBOARD_REPORT_LEN,
        Kind::Mouse | Kind::Unknown => MOUSE_REPORT_MIN_LEN + 1,
    };

    guard.set_driver_data(Box::new(HidState {
        kind,
        interrupt_in,
        last_report: alloc::vec![0u8; report_len],
    }));

    Ok(())
}

/// Submits one interrupt transfer for every bound HID device and turns the
/// result into input events (§4.14). Called from the cooperative poll loop.
pub fn poll(device: &Arc<Mutex<Device>>) {
    let mut guard = device.lock();
    let slot_id = guard.slot_id();
    let host = guard.host().clone();

    let Some(state) = guard
        .driver_data()
        .and_then(|d| d.downcast_ref::<HidState>())
    else {
        return;
    };
    let endpoint = state.interrupt_in;
    let mut report = state.last_report.clone();
    let last_report = state.last_report.clone();
    let kind = state.kind;

    let Ok(len) = host.transfer(slot_id, &endpoint, Direction::In, &mut report) else {
        return;
    };
    report.truncate(len.max(last_report.len()).min(report.len()));

    let mut events = Vec::new();
    match kind {
        Kind::Keyboard if report.len() >= KEYBOARD_REPORT_LEN => {
            diff_keyboard_report(&last_report, &report, &mut events);
        }
        Kind::Mouse if report.len() >= MOUSE_REPORT_MIN_LEN => {
            diff_mouse_report(*last_report.first().unwrap_or(&0), &report, &mut events);
        }
        _ => {}
    }

    for event in events {
        input::push(event);
    }

    guard.set_driver_data(Box::new(HidState {
        kind,
        interrupt_in: endpoint,
        last_report: report,
    }));
}

pub static HID_DRIVER: UsbDriverDescriptor = UsbDriverDescriptor {
    name: "hid",
    probe,
    init,
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::usb::device::tests::NullHost;
    use crate::driver::usb::speed::Speed;

    #[test]
    fn probe_accepts_boot_keyboard() {
        let mut dev = Device::new(1, 1, Speed::LOW_SPEED, None, Arc::new(NullHost));
        dev.set_class(HID_CLASS, BOOT_SUBCLASS, PROTOCOL_KEYBOARD);
        assert!(probe(&dev));
    }

    #[test]
    fn probe_flexible_fallback_accepts_any_hid_interface() {
        let mut dev = Device::new(1, 1, Speed::LOW_SPEED, None, Arc::new(NullHost));
        dev.set_class(HID_CLASS, 0, 0);
        assert!(probe(&dev));
    }

    #[test]
    fn probe_rejects_non_hid_class() {
        let dev = Device::new(1, 1, Speed::LOW_SPEED, None, Arc::new(NullHost));
        assert!(!probe(&dev));
    }
}
