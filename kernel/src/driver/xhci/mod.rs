use core::fmt::Debug;
use core::ops::Deref;

use volatile::VolatilePtr;
use x86_64::structures::paging::{Page, Size4KiB};
use x86_64::VirtAddr;

use crate::driver::pci::{BaseAddressRegister, PciDevice, PciDeviceClass, SerialBusSubClass};
use crate::driver::xhci::error::XhciError;
use crate::driver::xhci::extended::ExtendedCapabilities;
use crate::mem::{map_mmio, AddressSpace};

pub use capabilities::*;
pub use operational::*;
pub use portpmsc::*;
pub use portsc::*;
pub use psi::*;
pub use registers::*;
pub use supported_protocol_capability::*;

mod capabilities;
pub mod commands;
pub mod context;
pub mod error;
pub mod event;
mod extended;
mod operational;
mod portpmsc;
mod portsc;
mod psi;
mod registers;
pub mod ring;
mod supported_protocol_capability;
pub mod trb;

#[derive(Debug)]
pub struct XhciRegisters<'a> {
    base: VirtAddr,
    size: u64,
    registers: Registers<'a>,
}

impl<'a> Deref for XhciRegisters<'a> {
    type Target = Registers<'a>;

    fn deref(&self) -> &Self::Target {
        &self.registers
    }
}

impl TryFrom<&PciDevice> for XhciRegisters<'_> {
    type Error = XhciError;

    fn try_from(pci_device: &PciDevice) -> Result<Self, Self::Error> {
        if !(matches!(
            pci_device.class(),
            PciDeviceClass::SerialBusController(SerialBusSubClass::USBController)
        ) && pci_device.prog_if() == 0x30)
        {
            return Err(XhciError::NotUsb);
        }

        let (phys_addr, size) = match pci_device.bar0() {
            BaseAddressRegister::MemorySpace64(bar) => (bar.addr, bar.size as u64),
            _ => return Err(XhciError::NotUsb),
        };

        let base = map_mmio(x86_64::PhysAddr::new(phys_addr), size);
        let registers = Registers::new(base);

        Ok(Self {
            base,
            size,
            registers,
        })
    }
}

impl Drop for XhciRegisters<'_> {
    fn drop(&mut self) {
        let pages = self.size.div_ceil(Size4KiB::SIZE);
        for i in 0..pages {
            let page = Page::<Size4KiB>::containing_address(self.base + i * Size4KiB::SIZE);
            let _ = AddressSpace::kernel().unmap(page);
        }
    }
}

impl XhciRegisters<'_> {
    pub fn extended_capabilities(&self) -> ExtendedCapabilitiesIter<'_> {
        ExtendedCapabilitiesIter {
            xhci: self,
            next: None,
            fused_finished: false,
        }
    }
}

pub struct ExtendedCapabilitiesIter<'a> {
    xhci: &'a XhciRegisters<'a>,
    next: Option<VolatilePtr<'a, ExtendedCapabilities>>,
    fused_finished: bool,
}

impl<'a> Iterator for ExtendedCapabilitiesIter<'a> {
    type Item = VolatilePtr<'a, ExtendedCapabilities>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.fused_finished {
            return None;
        }

        let next = unsafe {
            VolatilePtr::new(if let Some(next) = self.next {
                let next_offset = next.read().next_raw();
                if next_offset == 0 {
                    self.fused_finished = true;
                    return None;
                }
                next.as_raw_ptr()
                    .cast::<u8>()
                    .add((next_offset as usize) << 2)
                    .cast()
            } else {
                self.xhci
                    .capabilities
                    .as_raw_ptr()
                    .cast::<u8>()
                    .add((self.xhci.capabilities.hccparams1().read().xecp() as usize) << 2)
                    .cast()
            })
        };
        self.next = Some(next);
        self.next
    }
}
