//! TRB ring engines: the command ring, per-endpoint transfer rings, and the
//! event ring all share the same Link-TRB-terminated layout (§3, §4.7).
//!
//! The command ring's software cycle state is a constant for the kernel's
//! entire lifetime — only the controller's internal CSS ever flips it, via
//! the Link TRB's Toggle-Cycle bit (§3, testable property 6). Transfer rings
//! are not bound by that invariant: a long-lived endpoint can wrap many
//! times over its life, so [`ProducerRing::transfer_ring`] follows the usual
//! toggle-on-wrap discipline instead.

use core::mem::size_of;
use core::sync::atomic::{fence, Ordering};

use x86_64::structures::paging::Size4KiB;
use x86_64::PhysAddr;

use crate::driver::xhci::trb::{Trb, TrbType};
use crate::mem::dma::DmaBuffer;

/// Advances a producer ring's enqueue index past one written slot, following
/// the Link TRB back to the start when it would land on it. Pulled out of
/// [`ProducerRing::enqueue`] so the wrap/toggle arithmetic is host-testable
/// without a DMA-backed ring.
fn advance_producer(enqueue: usize, capacity: usize, cycle: bool, toggle_on_wrap: bool) -> (usize, bool) {
    let next = enqueue + 1;
    if next == capacity - 1 {
        (0, if toggle_on_wrap { !cycle } else { cycle })
    } else {
        (next, cycle)
    }
}

/// Advances an event ring's dequeue index, toggling the consumer cycle state
/// on wraparound (there is no Link TRB on the consumer side — the ring is a
/// single contiguous segment per the ERST entry).
fn advance_consumer(dequeue: usize, capacity: usize, cycle: bool) -> (usize, bool) {
    let next = dequeue + 1;
    if next == capacity {
        (0, !cycle)
    } else {
        (next, cycle)
    }
}

/// A producer-side ring: software enqueues TRBs, the controller consumes
/// them. Backs both the command ring and per-slot/per-endpoint transfer
/// rings.
pub struct ProducerRing {
    buf: DmaBuffer,
    capacity: usize,
    enqueue: usize,
    cycle_state: bool,
    toggle_on_wrap: bool,
}

impl ProducerRing {
    fn new(capacity: usize, toggle_on_wrap: bool) -> Self {
        assert!(
            capacity >= 2,
            "a ring needs at least one data slot plus the trailing Link TRB"
        );
        let bytes = capacity * size_of::<Trb>();
        let pages = bytes.div_ceil(Size4KiB::SIZE as usize);
        let buf = DmaBuffer::alloc_pages(pages);

        let ring = Self {
            buf,
            capacity,
            enqueue: 0,
            cycle_state: true,
            toggle_on_wrap,
        };

        let mut link = Trb::zeroed();
        link.parameter = ring.buf.phys_addr().as_u64();
        link.set_trb_type(TrbType::Link);
        link.control |= 1 << 1; // Toggle Cycle
        link.set_cycle(true);
        unsafe { ring.slot_ptr(capacity - 1).write_volatile(link) };

        ring
    }

    /// Command rings never toggle their software cycle state (§3).
    pub fn command_ring(capacity: usize) -> Self {
        Self::new(capacity, false)
    }

    /// Transfer rings toggle on wrap like any ordinary producer ring.
    pub fn transfer_ring(capacity: usize) -> Self {
        Self::new(capacity, true)
    }

    pub fn phys_addr(&self) -> PhysAddr {
        self.buf.phys_addr()
    }

    pub fn cycle_state(&self) -> bool {
        self.cycle_state
    }

    fn slot_ptr(&self, index: usize) -> *mut Trb {
        unsafe { self.buf.as_ptr::<Trb>().add(index) }
    }

    /// Enqueues `trb`, overwriting its cycle bit with the ring's current
    /// cycle state, memory-fences, then advances past the written slot
    /// (§4.8). Never writes into the Link TRB slot. Returns the physical
    /// address of the slot written, which callers use to key completion
    /// events back to their originating command or transfer.
    pub fn enqueue(&mut self, mut trb: Trb) -> PhysAddr {
        trb.set_cycle(self.cycle_state);
        let slot_addr = self.buf.phys_addr() + (self.enqueue * size_of::<Trb>()) as u64;
        unsafe { self.slot_ptr(self.enqueue).write_volatile(trb) };
        fence(Ordering::SeqCst);

        let (enqueue, cycle_state) =
            advance_producer(self.enqueue, self.capacity, self.cycle_state, self.toggle_on_wrap);
        self.enqueue = enqueue;
        self.cycle_state = cycle_state;

        slot_addr
    }
}

#[repr(C)]
struct ErstEntry {
    base: u64,
    size: u32,
    _rsvdz: u64,
}

/// The event ring: hardware-produced completion/status TRBs that software
/// dequeues and acknowledges via ERDP (§3, §4.8). Backed by a single-segment
/// ERST, as Phase C allocates.
pub struct EventRing {
    buf: DmaBuffer,
    erst: DmaBuffer,
    capacity: usize,
    dequeue: usize,
    cycle_state: bool,
}

impl EventRing {
    pub fn new(capacity: usize) -> Self {
        let bytes = capacity * size_of::<Trb>();
        let pages = bytes.div_ceil(Size4KiB::SIZE as usize);
        let buf = DmaBuffer::alloc_pages(pages);
        let erst = DmaBuffer::alloc_pages(1);

        let entry = ErstEntry {
            base: buf.phys_addr().as_u64(),
            size: capacity as u32,
            _rsvdz: 0,
        };
        unsafe { erst.as_ptr::<ErstEntry>().write_volatile(entry) };

        Self {
            buf,
            erst,
            capacity,
            dequeue: 0,
            cycle_state: true,
        }
    }

    pub fn ring_phys_addr(&self) -> PhysAddr {
        self.buf.phys_addr()
    }

    pub fn erst_phys_addr(&self) -> PhysAddr {
        self.erst.phys_addr()
    }

    /// The controller currently knows only one segment per event ring.
    pub fn erst_entry_count(&self) -> u32 {
        1
    }

    fn slot_ptr(&self, index: usize) -> *const Trb {
        unsafe { self.buf.as_ptr::<Trb>().add(index) }
    }

    /// Returns the next event TRB and the physical address to write into
    /// ERDP for it, or `None` if the controller has not produced one yet —
    /// recognized by the slot's cycle bit matching ours (§3's Event ring
    /// invariant).
    pub fn dequeue(&mut self) -> Option<(Trb, PhysAddr)> {
        let trb = unsafe { self.slot_ptr(self.dequeue).read_volatile() };
        if trb.cycle() != self.cycle_state {
            return None;
        }

        let addr = self.buf.phys_addr() + (self.dequeue * size_of::<Trb>()) as u64;
        let (dequeue, cycle_state) = advance_consumer(self.dequeue, self.capacity, self.cycle_state);
        self.dequeue = dequeue;
        self.cycle_state = cycle_state;

        Some((trb, addr))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn producer_cycle_state_never_toggles_when_disabled() {
        // mirrors the command ring's invariant (§3, testable property 6)
        let mut enqueue = 0;
        let mut cycle = true;
        for _ in 0..10 {
            let (next, c) = advance_producer(enqueue, 8, cycle, false);
            enqueue = next;
            cycle = c;
            assert!(cycle);
        }
    }

    #[test]
    fn producer_toggles_on_wrap_when_enabled() {
        let (enqueue, cycle) = advance_producer(6, 8, true, true);
        assert_eq!(enqueue, 0);
        assert!(!cycle);
    }

    #[test]
    fn producer_does_not_wrap_onto_link_slot() {
        // capacity 8: slots 0..=6 are data, slot 7 is the Link TRB
        let (enqueue, _) = advance_producer(5, 8, true, false);
        assert_eq!(enqueue, 6);
    }

    #[test]
    fn consumer_toggles_cycle_on_wrap() {
        let (dequeue, cycle) = advance_consumer(255, 256, true);
        assert_eq!(dequeue, 0);
        assert!(!cycle);
    }

    #[test]
    fn consumer_does_not_toggle_mid_ring() {
        let (dequeue, cycle) = advance_consumer(10, 256, true);
        assert_eq!(dequeue, 11);
        assert!(cycle);
    }
}
