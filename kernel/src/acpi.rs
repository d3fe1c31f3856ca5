use alloc::alloc::Global;
use core::ptr::NonNull;

use acpi::{AcpiHandler, AcpiTables, InterruptModel, PhysicalMapping, PlatformInfo};
use log::error;
use x86_64::PhysAddr;

use crate::error::KernelError;
use crate::limine::RSDP_REQUEST;
use crate::mem::map_mmio;
use crate::Result;

/// Parses the ACPI tables Limine handed us the RSDP for and returns the
/// platform's interrupt model. The design has no non-APIC support (§4.4a),
/// so the caller treats anything but `InterruptModel::Apic` as fatal.
pub fn init() -> Result<InterruptModel<Global>> {
    let rsdp = RSDP_REQUEST
        .get_response()
        .expect("limine did not answer the RSDP request")
        .address() as usize;

    let tables = unsafe { AcpiTables::from_rsdp(KernelAcpi, rsdp) }.map_err(|e| {
        error!("acpi: failed to parse tables: {:#?}", e);
        KernelError::ProtocolError
    })?;
    let platform_info = PlatformInfo::new(&tables).map_err(|e| {
        error!("acpi: failed to build platform info: {:#?}", e);
        KernelError::ProtocolError
    })?;

    Ok(platform_info.interrupt_model)
}

/// Maps every ACPI table region through the ordinary MMIO window. Regions
/// are never unmapped — ACPI tables are read once during boot and the
/// address space is never reclaimed.
#[derive(Clone, Debug)]
pub struct KernelAcpi;

impl AcpiHandler for KernelAcpi {
    unsafe fn map_physical_region<T>(
        &self,
        physical_address: usize,
        size: usize,
    ) -> PhysicalMapping<Self, T> {
        let virt = map_mmio(PhysAddr::new(physical_address as u64), size as u64);
        PhysicalMapping::new(
            physical_address,
            NonNull::new(virt.as_mut_ptr()).unwrap(),
            size,
            size,
            self.clone(),
        )
    }

    fn unmap_physical_region<T>(_region: &PhysicalMapping<Self, T>) {}
}
