//! USB hub class driver (§4.12): the one class this core treats specially
//! at the core level, since a hub's children are new devices to enumerate
//! rather than data for some downstream consumer.

use alloc::boxed::Box;
use alloc::sync::Weak;
use core::error::Error;

use spin::Mutex;

use crate::driver::usb::controller::{Controller, SetupPacket};
use crate::driver::usb::device::Device;
use crate::driver::usb::enumeration::enumerate_port;
use crate::error::KernelError;
use crate::Result;

const HUB_CLASS: u8 = 0x09;

const GET_DESCRIPTOR: u8 = 0x06;
const GET_PORT_STATUS: u8 = 0x00;
const SET_PORT_FEATURE: u8 = 0x03;
const PORT_FEATURE_RESET: u16 = 4;
const PORT_STATUS_CONNECTION: u16 = 1 << 0;
const DESCRIPTOR_TYPE_HUB: u16 = 0x29;

pub fn probe(device: &Device) -> bool {
    device.class() == HUB_CLASS
}

/// Class-driver entry point: reads the hub descriptor for its downstream
/// port count, then scans and enumerates every port (§4.12).
pub fn init(device: Weak<Mutex<Device>>) -> Result<(), Box<dyn Error>> {
    let device_arc = device.upgrade().ok_or(KernelError::DeviceError)?;
    let (slot_id, host) = {
        let guard = device_arc.lock();
        (guard.slot_id(), guard.host().clone())
    };

    let mut hub_descriptor = [0u8; 9];
    host.control_transfer(
        slot_id,
        SetupPacket {
            request_type: SetupPacket::HOST_TO_DEVICE_CLASS_INTERFACE | 0x80,
            request: GET_DESCRIPTOR,
            value: DESCRIPTOR_TYPE_HUB << 8,
            index: 0,
            length: 9,
        },
        &mut hub_descriptor,
    )?;
    let num_ports = hub_descriptor[2] as usize;

    scan_downstream_ports(crate::driver::usb::controller(), device, num_ports)?;
    Ok(())
}

/// Walks every downstream port on a just-bound hub and enumerates whatever
/// is plugged in. Takes the controller directly rather than looking it up,
/// since the core currently supports a single host controller instance.
pub fn scan_downstream_ports(
    controller: &Controller,
    hub: Weak<Mutex<Device>>,
    num_ports: usize,
) -> Result<()> {
    let hub_arc = hub.upgrade().ok_or(KernelError::DeviceError)?;
    let slot_id = hub_arc.lock().slot_id();

    for port in 1..=num_ports {
        let mut status = [0u8; 4];
        controller.host.control_transfer(
            slot_id,
            SetupPacket {
                request_type: SetupPacket::HOST_TO_DEVICE_CLASS_INTERFACE | 0x80,
                request: GET_PORT_STATUS,
                value: 0,
                index: port as u16,
                length: 4,
            },
            &mut status,
        )?;
        let port_status = u16::from_le_bytes([status[0], status[1]]);
        if port_status & PORT_STATUS_CONNECTION == 0 {
            continue;
        }

        controller.host.control_transfer(
            slot_id,
            SetupPacket {
                request_type: SetupPacket::HOST_TO_DEVICE_CLASS_INTERFACE,
                request: SET_PORT_FEATURE,
                value: PORT_FEATURE_RESET,
                index: port as u16,
                length: 0,
            },
            &mut [],
        )?;

        let _ = enumerate_port(controller, port, Some(Weak::clone(&hub)));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::usb::device::tests::NullHost;
    use crate::driver::usb::speed::Speed;
    use alloc::sync::Arc;

    #[test]
    fn probe_matches_only_hub_class() {
        let mut dev = Device::new(1, 1, Speed::HIGH_SPEED, None, Arc::new(NullHost));
        assert!(!probe(&dev));
        dev.set_class(HUB_CLASS, 0, 0);
        assert!(probe(&dev));
    }
}
