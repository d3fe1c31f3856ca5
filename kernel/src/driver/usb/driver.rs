//! USB class-driver registration (§4.6): mirrors the PCI driver table in
//! [`crate::driver::pci`] — a fixed-capacity table of descriptors, a probe
//! pass per newly-enumerated device, and whichever driver claims it first
//! wins.

use alloc::sync::{Arc, Weak};
use core::error::Error;

use spin::Mutex;

use crate::driver::usb::device::Device;

pub const MAX_DRIVERS: usize = 16;

#[derive(Copy, Clone)]
pub struct UsbDriverDescriptor {
    pub name: &'static str,
    pub probe: fn(&Device) -> bool,
    pub init: fn(Weak<Mutex<Device>>) -> Result<(), alloc::boxed::Box<dyn Error>>,
}

static DRIVERS: Mutex<[Option<UsbDriverDescriptor>; MAX_DRIVERS]> = Mutex::new([
    None, None, None, None, None, None, None, None, None, None, None, None, None, None, None, None,
]);

/// Registers a class driver. Returns `false` (and logs nothing — the caller
/// decides how loud to be) if the table is already full.
pub fn register(descriptor: UsbDriverDescriptor) -> bool {
    let mut drivers = DRIVERS.lock();
    if let Some(slot) = drivers.iter_mut().find(|slot| slot.is_none()) {
        *slot = Some(descriptor);
        true
    } else {
        false
    }
}

/// Runs every registered driver's `probe` against `device` in registration
/// order and calls `init` on the first match, per §4.6's "first match wins"
/// binding rule.
pub fn bind_driver(device: Arc<Mutex<Device>>) -> Result<&'static str, ()> {
    let drivers = DRIVERS.lock();
    let guard = device.lock();
    for slot in drivers.iter().flatten() {
        if (slot.probe)(&guard) {
            let name = slot.name;
            let init = slot.init;
            drop(guard);
            return match init(Arc::downgrade(&device)) {
                Ok(()) => Ok(name),
                Err(_) => Err(()),
            };
        }
    }
    Err(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_starts_empty_and_accepts_registrations_up_to_capacity() {
        let mut drivers = DRIVERS.lock();
        let empty = drivers.iter().filter(|d| d.is_none()).count();
        drop(drivers);
        assert!(empty <= MAX_DRIVERS);
    }
}
