//! Top-level xHCI register surface: locates the Capability, Operational,
//! Port, Runtime and Interrupter register blocks relative to the BAR base
//! (§6 external interfaces) and hands out volatile views onto each.

use core::ptr::NonNull;

use volatile::access::ReadWrite;
use volatile::{VolatileFieldAccess, VolatilePtr};
use x86_64::VirtAddr;

use crate::driver::xhci::capabilities::Capabilities;
use crate::driver::xhci::operational::Operational;
use crate::driver::xhci::portsc::PortSc;

#[repr(C)]
#[derive(Debug)]
pub struct Registers<'a> {
    pub capabilities: VolatilePtr<'a, Capabilities>,
    pub operational: VolatilePtr<'a, Operational>,
    port_base: VirtAddr,
    max_ports: u8,
    runtime_base: VirtAddr,
    doorbell_base: VirtAddr,
}

impl<'a> Registers<'a> {
    pub fn new(base: VirtAddr) -> Self {
        let capabilities =
            unsafe { VolatilePtr::new(NonNull::new(base.as_mut_ptr::<Capabilities>()).unwrap()) };

        let caplength = capabilities.caplength().read();
        let operational_base = base + caplength as u64;
        assert!(
            base + size_of::<Capabilities>() < operational_base,
            "capabilities registers should not overlap into operational registers"
        );
        let operational = unsafe {
            VolatilePtr::new(NonNull::new(operational_base.as_mut_ptr::<Operational>()).unwrap())
        };

        let port_base = operational_base + 0x400_u64;
        let max_ports = capabilities.hcsparams1().read().max_ports();

        let rtsoff = capabilities.rtsoff().read();
        let runtime_base = base + rtsoff as u64;

        let dboff = capabilities.dboff().read().offset();
        let doorbell_base = base + (u64::from(dboff) << 2);

        Self {
            capabilities,
            operational,
            port_base,
            max_ports,
            runtime_base,
            doorbell_base,
        }
    }

    /// Port register sets are one-indexed in the xHCI spec (port 1..=MaxPorts).
    ///
    /// # Panics
    /// Panics if `port` is 0 or greater than the controller's reported
    /// maximum port count.
    pub fn port(&self, port: u8) -> VolatilePtr<'_, PortRegisterSet, ReadWrite> {
        assert!(
            port >= 1 && port <= self.max_ports,
            "port {port} out of range (max {})",
            self.max_ports
        );
        let addr = self.port_base + u64::from(port - 1) * size_of::<PortRegisterSet>() as u64;
        unsafe { VolatilePtr::new(NonNull::new(addr.as_mut_ptr::<PortRegisterSet>()).unwrap()) }
    }

    /// Doorbell register for `slot` (0 is the command-ring doorbell, §6).
    pub fn doorbell(&self, slot: u8) -> VolatilePtr<'_, u32, ReadWrite> {
        let addr = self.doorbell_base + u64::from(slot) * 4;
        unsafe { VolatilePtr::new(NonNull::new(addr.as_mut_ptr::<u32>()).unwrap()) }
    }

    pub fn runtime(&self) -> VolatilePtr<'_, Runtime, ReadWrite> {
        unsafe {
            VolatilePtr::new(NonNull::new(self.runtime_base.as_mut_ptr::<Runtime>()).unwrap())
        }
    }

    /// Interrupter register sets start at `runtime_base + 0x20`, 32 bytes apart.
    pub fn interrupter(&self, index: u16) -> VolatilePtr<'_, Interrupter, ReadWrite> {
        let addr =
            self.runtime_base + 0x20_u64 + u64::from(index) * size_of::<Interrupter>() as u64;
        unsafe { VolatilePtr::new(NonNull::new(addr.as_mut_ptr::<Interrupter>()).unwrap()) }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, VolatileFieldAccess)]
pub struct PortRegisterSet {
    #[access(ReadWrite)]
    portsc: PortSc,
    #[access(ReadWrite)]
    portpmsc: u32,
    #[access(ReadWrite)]
    portli: u32,
    #[access(ReadWrite)]
    porthlpmc: u32,
}

#[repr(C)]
#[derive(Debug, Copy, Clone, VolatileFieldAccess)]
pub struct Runtime {
    #[access(ReadWrite)]
    mfindex: u32,
    #[access(ReadWrite)]
    _rsvdz: [u32; 7],
}

#[repr(C)]
#[derive(Debug, Copy, Clone, VolatileFieldAccess)]
pub struct Interrupter {
    #[access(ReadWrite)]
    iman: u32,
    #[access(ReadWrite)]
    imod: u32,
    /// Event Ring Segment Table Size. 32-bit, not 64 — the table holds a
    /// segment *count*, not an address.
    #[access(ReadWrite)]
    erstsz: u32,
    #[access(ReadWrite)]
    _rsvdz: u32,
    #[access(ReadWrite)]
    erstba: u64,
    #[access(ReadWrite)]
    erdp: u64,
}
