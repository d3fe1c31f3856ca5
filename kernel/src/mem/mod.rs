use log::info;
use x86_64::structures::paging::{Page, PageTableFlags, PhysFrame, Size4KiB};
use x86_64::VirtAddr;

pub use address_space::*;
pub use size::*;

use crate::limine::MEMORY_MAP_REQUEST;
use crate::mem::heap::{Heap, HEAP_MAX_BYTES, HEAP_START};
use crate::mem::phys::PhysicalMemory;
use crate::Result;

pub mod address_space;
pub mod dma;
pub mod heap;
pub mod phys;
mod size;

/// Boots the memory core in the order §4.1/§4.2/§4.3 of the design require:
/// a bump-allocator PMM stage over the loader's memory map, the recursive VMM
/// on top of the loader-installed CR3, and finally the heap, which only needs
/// stage1 frames to be available since its pages are faulted in lazily.
pub fn init() -> Result<()> {
    let memmap = MEMORY_MAP_REQUEST
        .get_response()
        .expect("limine did not answer the memory map request")
        .entries();

    phys::init_stage1(memmap);
    address_space::init();
    heap::init();
    dma::init();

    // stage2 needs heap-backed Vec storage for its bitmap.
    phys::init_stage2();

    info!(
        "kernel heap reserved at {:p}, {} MiB virtual window, {} B resident",
        HEAP_START,
        HEAP_MAX_BYTES / 1024 / 1024,
        Heap::used(),
    );

    Ok(())
}

/// Kernel-owned portion of the virtual address space: the heap window plus a
/// generous slack region above it for device MMIO mappings (xHCI BARs)
/// allocated by [`reserve_mmio_window`]. LAPIC/IOAPIC live in the HHDM instead
/// (see [`map_mmio_hhdm`]). Faults here are lazily backed by
/// [`crate::arch::idt::page_fault_handler`]; faults outside it are fatal.
pub fn in_kernel_range(addr: VirtAddr) -> bool {
    let start = HEAP_START.as_u64();
    let end = start + HEAP_MAX_BYTES + MMIO_WINDOW_BYTES;
    (start..end).contains(&addr.as_u64())
}

const MMIO_WINDOW_BYTES: u64 = 256 * 1024 * 1024;
static MMIO_NEXT: core::sync::atomic::AtomicU64 =
    core::sync::atomic::AtomicU64::new(0);

/// Hands out a fresh, page-aligned virtual window for mapping `size` bytes of
/// device MMIO. The caller is responsible for actually mapping every page in
/// the returned range (MMIO must never be left to the lazy page-fault path,
/// since that path only ever maps zeroed RAM).
pub fn reserve_mmio_window(size: u64) -> VirtAddr {
    let pages = size.div_ceil(Size4KiB::SIZE);
    let base = MMIO_NEXT.fetch_add(pages * Size4KiB::SIZE, core::sync::atomic::Ordering::Relaxed);
    VirtAddr::new(HEAP_START.as_u64() + HEAP_MAX_BYTES + base)
}

/// Maps `size` bytes of physical MMIO space starting at `phys` into a freshly
/// reserved window and returns its virtual base. Used by the APIC and xHCI
/// drivers, which both need uncached, writable, non-executable mappings.
pub fn map_mmio(phys: x86_64::PhysAddr, size: u64) -> VirtAddr {
    let virt = reserve_mmio_window(size);
    let pages = size.div_ceil(Size4KiB::SIZE);
    let flags = PageTableFlags::PRESENT
        | PageTableFlags::WRITABLE
        | PageTableFlags::NO_CACHE
        | PageTableFlags::NO_EXECUTE;

    for i in 0..pages {
        let page = Page::<Size4KiB>::containing_address(virt + i * Size4KiB::SIZE);
        let frame = PhysFrame::<Size4KiB>::containing_address(phys + i * Size4KiB::SIZE);
        AddressSpace::kernel()
            .map(page, frame, flags)
            .expect("MMIO mapping should not collide with an existing one");
    }

    virt
}

/// Maps `size` bytes of physical MMIO space uncached at its HHDM address
/// (`hhdm_offset() + phys`), splitting the HHDM's 2 MiB RAM mapping into 4 KiB
/// entries as needed. For statically-known low-memory MMIO regions (LAPIC,
/// IOAPIC) that the loader's HHDM already covers as ordinary (cached) RAM,
/// rather than carving out a separate window the way [`map_mmio`] does for
/// PCI BARs.
pub fn map_mmio_hhdm(phys: x86_64::PhysAddr, size: u64) -> VirtAddr {
    let virt = dma::phys_to_virt(phys);
    let pages = size.div_ceil(Size4KiB::SIZE);
    let flags = PageTableFlags::PRESENT
        | PageTableFlags::WRITABLE
        | PageTableFlags::NO_CACHE
        | PageTableFlags::NO_EXECUTE;

    for i in 0..pages {
        let page = Page::<Size4KiB>::containing_address(virt + i * Size4KiB::SIZE);
        let frame = PhysFrame::<Size4KiB>::containing_address(phys + i * Size4KiB::SIZE);
        AddressSpace::kernel()
            .map4k_splitting_huge(page, frame, flags)
            .expect("HHDM MMIO mapping should not collide with an existing one");
    }

    virt
}
