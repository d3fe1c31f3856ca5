//! Segregated free-list bucket allocator backing `#[global_allocator]`.
//!
//! Buckets are powers of two from 32 B to 4096 B. Each allocation is preceded
//! by a [`Header`] recording a magic word, the bucket index (or [`LARGE`] for
//! the direct multi-page path) and enough bookkeeping to free or realloc it.
//! Bucket refills and large allocations both just touch freshly-bumped
//! addresses inside the kernel heap range; the VMM's page-fault handler is
//! what actually backs them with physical frames (see `mem::address_space`).

use core::alloc::{GlobalAlloc, Layout};
use core::mem::size_of;
use core::ptr::NonNull;
use core::sync::atomic::AtomicU64;
use core::sync::atomic::Ordering::Relaxed;

use spin::Mutex;
use x86_64::structures::paging::{PageSize, Size4KiB};
use x86_64::VirtAddr;

use crate::mem::address_space::{virt_addr_from_page_table_indices, AddressSpace};
use crate::mem::phys::PhysicalMemory;

const HEADER_MAGIC: u32 = 0xDEAD_CAFE;
const LARGE: u8 = u8::MAX;
const BUCKET_SIZES: [usize; 8] = [32, 64, 128, 256, 512, 1024, 2048, 4096];

/// Virtual base of the kernel heap. Lives in the canonical kernel range the
/// page fault handler lazily backs with frames (see `mem::page_fault_handler`).
pub static HEAP_START: VirtAddr = virt_addr_from_page_table_indices([257, 0, 0, 0], 0);
/// Upper bound of the heap's virtual reservation: 1 GiB of address space, of
/// which only touched pages are ever actually backed by physical frames.
pub const HEAP_MAX_BYTES: u64 = 1024 * 1024 * 1024;

#[repr(C)]
struct Header {
    magic: u32,
    bucket: u8,
    _pad: [u8; 3],
    size: usize,
    page_count: usize,
}

struct FreeNode {
    next: Option<NonNull<FreeNode>>,
}

struct Buckets {
    free_lists: [Option<NonNull<FreeNode>>; BUCKET_SIZES.len()],
    next_virt: u64,
}

unsafe impl Send for Buckets {}

static BUCKETS: Mutex<Buckets> = Mutex::new(Buckets {
    free_lists: [None; BUCKET_SIZES.len()],
    next_virt: 0,
});
static INITIALIZED: core::sync::atomic::AtomicBool = core::sync::atomic::AtomicBool::new(false);
static STATS_USED: AtomicU64 = AtomicU64::new(0);

pub fn init() {
    BUCKETS.lock().next_virt = HEAP_START.as_u64();
    INITIALIZED.store(true, Relaxed);
}

#[derive(Copy, Clone)]
pub struct Heap;

impl Heap {
    pub fn is_initialized() -> bool {
        INITIALIZED.load(Relaxed)
    }

    pub fn used() -> usize {
        STATS_USED.load(Relaxed) as usize
    }
}

fn bucket_for(payload: usize) -> Option<usize> {
    let required = payload + size_of::<Header>();
    BUCKET_SIZES.iter().position(|&b| b >= required)
}

fn refill_bucket(buckets: &mut Buckets, bucket: usize) {
    let page_virt = buckets.next_virt;
    buckets.next_virt += Size4KiB::SIZE;
    assert!(
        buckets.next_virt - HEAP_START.as_u64() <= HEAP_MAX_BYTES,
        "kernel heap exhausted its virtual reservation"
    );

    let slot_size = BUCKET_SIZES[bucket];
    let slots_per_page = Size4KiB::SIZE as usize / slot_size;
    for i in 0..slots_per_page {
        let slot_addr = page_virt + (i * slot_size) as u64;
        let node = slot_addr as *mut FreeNode;
        unsafe {
            (*node).next = buckets.free_lists[bucket];
        }
        buckets.free_lists[bucket] = NonNull::new(node);
    }
}

fn alloc_large(size: usize) -> *mut u8 {
    let total = size + size_of::<Header>();
    let page_count = total.div_ceil(Size4KiB::SIZE as usize);

    let mut buckets = BUCKETS.lock();
    let base_virt = buckets.next_virt;
    buckets.next_virt += (page_count as u64) * Size4KiB::SIZE;
    drop(buckets);

    let header_ptr = base_virt as *mut Header;
    unsafe {
        header_ptr.write(Header {
            magic: HEADER_MAGIC,
            bucket: LARGE,
            _pad: [0; 3],
            size,
            page_count,
        });
        header_ptr.add(1).cast::<u8>()
    }
}

unsafe fn free_large(header: &Header, ptr: *mut u8) {
    let base = (ptr as u64) - size_of::<Header>() as u64;
    let pages = header.page_count;
    for i in 0..pages {
        let page_addr = VirtAddr::new(base + (i as u64) * Size4KiB::SIZE);
        if let Ok(frame) =
            AddressSpace::kernel().unmap(x86_64::structures::paging::Page::<Size4KiB>::containing_address(page_addr))
        {
            PhysicalMemory::deallocate_frame(frame);
        }
    }
}

pub struct BucketAllocator;

unsafe impl GlobalAlloc for BucketAllocator {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        let size = layout.size().max(1);

        let Some(bucket) = bucket_for(size) else {
            return alloc_large(size);
        };

        let mut buckets = BUCKETS.lock();
        if buckets.free_lists[bucket].is_none() {
            refill_bucket(&mut buckets, bucket);
        }

        let node = buckets.free_lists[bucket].expect("bucket refill must populate the free list");
        buckets.free_lists[bucket] = unsafe { (*node.as_ptr()).next };
        drop(buckets);

        STATS_USED.fetch_add(BUCKET_SIZES[bucket] as u64, Relaxed);

        let header_ptr = node.as_ptr().cast::<Header>();
        unsafe {
            header_ptr.write(Header {
                magic: HEADER_MAGIC,
                bucket: bucket as u8,
                _pad: [0; 3],
                size,
                page_count: 0,
            });
            header_ptr.add(1).cast::<u8>()
        }
    }

    unsafe fn dealloc(&self, ptr: *mut u8, _layout: Layout) {
        let header_ptr = unsafe { ptr.cast::<Header>().sub(1) };
        let header = unsafe { &*header_ptr };
        assert_eq!(header.magic, HEADER_MAGIC, "heap corruption: bad free header");

        if header.bucket == LARGE {
            unsafe { free_large(header, ptr) };
            return;
        }

        let bucket = header.bucket as usize;
        STATS_USED.fetch_sub(BUCKET_SIZES[bucket] as u64, Relaxed);
        let node = header_ptr.cast::<FreeNode>();
        let mut buckets = BUCKETS.lock();
        unsafe {
            (*node).next = buckets.free_lists[bucket];
        }
        buckets.free_lists[bucket] = NonNull::new(node);
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        let header_ptr = unsafe { ptr.cast::<Header>().sub(1) };
        let header = unsafe { &*header_ptr };
        assert_eq!(header.magic, HEADER_MAGIC, "heap corruption: bad realloc header");

        if header.bucket != LARGE && BUCKET_SIZES[header.bucket as usize] >= new_size + size_of::<Header>() {
            return ptr;
        }

        let new_ptr = unsafe { self.alloc(Layout::from_size_align_unchecked(new_size, layout.align())) };
        if !new_ptr.is_null() {
            let copy_len = header.size.min(new_size);
            unsafe { core::ptr::copy_nonoverlapping(ptr, new_ptr, copy_len) };
            unsafe { self.dealloc(ptr, layout) };
        }
        new_ptr
    }
}

#[global_allocator]
static ALLOCATOR: BucketAllocator = BucketAllocator;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bucket_selection_rounds_up() {
        assert_eq!(bucket_for(1), Some(0));
        assert_eq!(BUCKET_SIZES[bucket_for(1).unwrap()], 32);
        assert_eq!(bucket_for(4096 - size_of::<Header>()), Some(7));
    }
}
