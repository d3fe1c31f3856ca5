//! Physically-contiguous, identity-mapped-via-HHDM buffers for device DMA
//! (ring segments, device contexts, the DCBAA, the scratchpad array — §3,
//! §4.7). Every RAM frame is already mapped at `hhdm_offset + phys` by the
//! loader, so a DMA buffer needs no page-table work of its own: allocate
//! contiguous frames from the PMM and read the matching HHDM window.
//!
//! This sidesteps the `vmm_map_dma`/`pmm_alloc_dma` contiguity mismatch noted
//! in the design notes — there is only one allocation step, and its
//! contiguity guarantee comes straight from [`PhysicalMemory::allocate_frames`].

use conquer_once::spin::OnceCell;
use x86_64::structures::paging::{PageSize, PhysFrame, Size4KiB};
use x86_64::{PhysAddr, VirtAddr};

use crate::limine::HHDM_REQUEST;
use crate::mem::phys::PhysicalMemory;

static HHDM_OFFSET: OnceCell<u64> = OnceCell::uninit();

pub(in crate::mem) fn init() {
    let offset = HHDM_REQUEST
        .get_response()
        .expect("limine did not answer the HHDM request")
        .offset();
    HHDM_OFFSET.init_once(|| offset);
}

pub fn hhdm_offset() -> u64 {
    *HHDM_OFFSET.get().expect("HHDM offset not initialized")
}

pub fn phys_to_virt(phys: PhysAddr) -> VirtAddr {
    VirtAddr::new(phys.as_u64() + hhdm_offset())
}

/// A physically-contiguous region of `pages` 4 KiB frames, zeroed on
/// allocation and reachable both by physical address (for programming device
/// registers) and by its HHDM virtual address (for the driver to read/write).
#[derive(Debug)]
pub struct DmaBuffer {
    phys: PhysAddr,
    virt: VirtAddr,
    len: usize,
}

impl DmaBuffer {
    /// Allocates `pages` contiguous frames and zeroes them.
    ///
    /// # Panics
    /// Panics if the physical allocator has no contiguous run of `pages`
    /// frames left.
    pub fn alloc_pages(pages: usize) -> Self {
        let range = PhysicalMemory::allocate_frames(pages)
            .expect("out of contiguous physical memory for a DMA buffer");
        let phys = range.start.start_address();
        let virt = phys_to_virt(phys);
        let len = pages * Size4KiB::SIZE as usize;
        let buf = Self { phys, virt, len };
        unsafe { core::ptr::write_bytes(buf.virt.as_mut_ptr::<u8>(), 0, len) };
        buf
    }

    pub fn phys_addr(&self) -> PhysAddr {
        self.phys
    }

    pub fn virt_addr(&self) -> VirtAddr {
        self.virt
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// # Safety
    /// `T` must fit within the buffer and the caller must uphold the usual
    /// aliasing rules for the lifetime of the returned pointer.
    pub unsafe fn as_ptr<T>(&self) -> *mut T {
        self.virt.as_mut_ptr::<T>()
    }
}

impl Drop for DmaBuffer {
    fn drop(&mut self) {
        let pages = self.len as u64 / Size4KiB::SIZE;
        let range = x86_64::structures::paging::frame::PhysFrameRangeInclusive {
            start: PhysFrame::containing_address(self.phys),
            end: PhysFrame::containing_address(self.phys + (pages - 1) * Size4KiB::SIZE),
        };
        PhysicalMemory::deallocate_frames(range);
    }
}
