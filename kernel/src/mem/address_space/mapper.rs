use crate::mem::dma::phys_to_virt;
use crate::mem::phys::PhysicalMemory;
use log::warn;
use x86_64::registers::control::Cr3;
use x86_64::structures::paging::mapper::{MapToError, UnmapError};
use x86_64::structures::paging::page::PageRangeInclusive;
use x86_64::structures::paging::{
    Mapper, Page, PageSize, PageTable, PageTableFlags, PhysFrame, RecursivePageTable, Size2MiB,
    Size4KiB, Translate,
};
use x86_64::VirtAddr;

#[derive(Debug)]
pub struct AddressSpaceMapper {
    level4_frame: PhysFrame,
    level4_vaddr: VirtAddr,
}

impl AddressSpaceMapper {
    pub fn new(level4_frame: PhysFrame, level4_vaddr: VirtAddr) -> Self {
        Self {
            level4_frame,
            level4_vaddr,
        }
    }

    pub fn is_active(&self) -> bool {
        self.level4_frame == Cr3::read().0
    }

    pub fn map<S: PageSize>(
        &mut self,
        page: Page<S>,
        frame: PhysFrame<S>,
        flags: PageTableFlags,
    ) -> Result<(), MapToError<S>>
    where
        for<'a> RecursivePageTable<'a>: Mapper<S>,
    {
        assert!(self.is_active()); // TODO: support mapping into non-active address spaces

        #[cfg(debug_assertions)]
        {
            if !flags.contains(PageTableFlags::PRESENT) {
                warn!(
                    "mapping {:p} to {:p} without PRESENT flag",
                    page.start_address(),
                    frame.start_address()
                );
            }
        }

        let mut page_table = self.recursive_page_table();
        unsafe {
            page_table
                .map_to(page, frame, flags, &mut PhysicalMemory)?
                .flush();
        }

        Ok(())
    }

    pub fn map_range<S: PageSize>(
        &mut self,
        pages: PageRangeInclusive<S>,
        frames: impl Iterator<Item = PhysFrame<S>>,
        flags: PageTableFlags,
    ) -> Result<(), MapToError<S>>
    where
        for<'a> RecursivePageTable<'a>: Mapper<S>,
    {
        assert!(self.is_active()); // TODO: support mapping into non-active address spaces

        let frames = frames.into_iter();
        for (page, frame) in pages.zip(frames) {
            self.map(page, frame, flags)?;
        }

        Ok(())
    }

    /// Maps a single 4 KiB page, splitting a covering 2 MiB huge mapping into
    /// 512 individual PT entries first if necessary. The split entries preserve
    /// the huge mapping's contiguity and flags.
    pub fn map4k_splitting_huge(
        &mut self,
        page: Page<Size4KiB>,
        frame: PhysFrame<Size4KiB>,
        flags: PageTableFlags,
    ) -> Result<(), MapToError<Size4KiB>> {
        assert!(self.is_active());

        let huge_page = Page::<Size2MiB>::containing_address(page.start_address());
        let mut page_table = self.recursive_page_table();

        if let Ok(huge_frame_flags) = page_table.unmap(huge_page).map(|(f, _)| f) {
            // the lookup above already removed the huge mapping; re-map it as 512
            // individual 4 KiB entries so we don't lose the rest of its range.
            let huge_flags = PageTableFlags::PRESENT | PageTableFlags::WRITABLE;
            let base = huge_frame_flags.start_address();
            for i in 0..512u64 {
                let sub_frame = PhysFrame::<Size4KiB>::containing_address(base + i * Size4KiB::SIZE);
                let sub_page =
                    Page::<Size4KiB>::containing_address(huge_page.start_address() + i * Size4KiB::SIZE);
                if sub_page == page {
                    continue;
                }
                unsafe {
                    page_table
                        .map_to(sub_page, sub_frame, huge_flags, &mut PhysicalMemory)
                        .map_err(|_| MapToError::FrameAllocationFailed)?
                        .flush();
                }
            }
        }

        unsafe {
            page_table
                .map_to(page, frame, flags, &mut PhysicalMemory)?
                .flush();
        }

        Ok(())
    }

    /// Maps a single 2 MiB huge page, tearing down any existing 4 KiB PT that
    /// covers the same PD slot first. This is the mirror image of
    /// [`Self::map4k_splitting_huge`]: a PD entry never ends up with both
    /// `HUGE_PAGE` set and a live child table underneath it.
    pub fn map2m_replacing_pt(
        &mut self,
        page: Page<Size2MiB>,
        frame: PhysFrame<Size2MiB>,
        flags: PageTableFlags,
    ) -> Result<(), MapToError<Size2MiB>> {
        assert!(self.is_active());

        let covered_by_pt = self
            .pd_entry_mut(page)
            .map(|entry| {
                entry.flags().contains(PageTableFlags::PRESENT)
                    && !entry.flags().contains(PageTableFlags::HUGE_PAGE)
            })
            .unwrap_or(false);

        if covered_by_pt {
            // an existing 4 KiB PT covers this range: unmap every leaf entry
            // in it before the PD slot is replaced with a huge page.
            let mut page_table = self.recursive_page_table();
            for i in 0..512u64 {
                let sub_page =
                    Page::<Size4KiB>::containing_address(page.start_address() + i * Size4KiB::SIZE);
                let _ = page_table.unmap(sub_page);
            }

            let pd_entry = self
                .pd_entry_mut(page)
                .expect("PD entry for a page we just unmapped through must still exist");
            pd_entry.set_addr(frame.start_address(), flags | PageTableFlags::HUGE_PAGE);
            x86_64::instructions::tlb::flush_all();
            return Ok(());
        }

        let mut page_table = self.recursive_page_table();
        unsafe {
            page_table
                .map_to(page, frame, flags, &mut PhysicalMemory)?
                .flush();
        }

        Ok(())
    }

    pub fn unmap<S: PageSize>(&mut self, page: Page<S>) -> Result<PhysFrame<S>, UnmapError>
    where
        for<'a> RecursivePageTable<'a>: Mapper<S>,
    {
        assert!(self.is_active());

        let mut page_table = self.recursive_page_table();
        let (frame, flush) = page_table.unmap(page)?;
        flush.flush();
        Ok(frame)
    }

    pub fn translate(&mut self, vaddr: VirtAddr) -> Option<x86_64::PhysAddr> {
        let page_table = self.recursive_page_table();
        page_table.translate_addr(vaddr)
    }

    /// Walks the live page tables down to the PD entry covering `page`,
    /// returning `None` if an intermediate P4/P3 entry is absent. Used only
    /// to inspect/replace a PD slot directly; ordinary mapping still goes
    /// through the safe [`Mapper`] API.
    fn pd_entry_mut(&mut self, page: Page<Size2MiB>) -> Option<&mut x86_64::structures::paging::PageTableEntry> {
        let l4 = unsafe { &mut *self.level4_vaddr.as_mut_ptr::<PageTable>() };
        let l4_entry = &l4[page.p4_index()];
        if l4_entry.is_unused() {
            return None;
        }
        let l3 = unsafe { &mut *phys_to_virt(l4_entry.frame().ok()?.start_address()).as_mut_ptr::<PageTable>() };
        let l3_entry = &l3[page.p3_index()];
        if l3_entry.is_unused() || l3_entry.flags().contains(PageTableFlags::HUGE_PAGE) {
            return None;
        }
        let l2 = unsafe { &mut *phys_to_virt(l3_entry.frame().ok()?.start_address()).as_mut_ptr::<PageTable>() };
        Some(&mut l2[page.p2_index()])
    }

    fn recursive_page_table(&mut self) -> RecursivePageTable {
        let pt = unsafe { &mut *self.level4_vaddr.as_mut_ptr::<PageTable>() };
        RecursivePageTable::new(pt).expect("should be a valid recursive page table")
    }
}
