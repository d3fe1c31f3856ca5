//! Control and interrupt/bulk transfer submission over per-endpoint
//! transfer rings (§4.10, §4.11): Setup/Data/Status stage TRBs for control
//! transfers, Normal TRBs for everything else.

use alloc::collections::BTreeMap;
use alloc::vec::Vec;

use x86_64::PhysAddr;

use crate::driver::usb::controller::{Direction, SetupPacket};
use crate::driver::xhci::event::{process_events, Event};
use crate::driver::xhci::registers::Registers;
use crate::driver::xhci::ring::{EventRing, ProducerRing};
use crate::driver::xhci::trb::{CompletionCode, Trb, TrbType};
use crate::error::KernelError;
use crate::mem::dma::DmaBuffer;
use crate::Result;

const WAIT_ITERATIONS: u32 = 5_000_000;
const BOUNCE_BUFFER_PAGES: usize = 1;

/// Setup-stage Transfer Type field (TRB control bits 17:16, §6.4.1.2.1).
const TRT_NO_DATA: u32 = 0;
const TRT_OUT_DATA: u32 = 2;
const TRT_IN_DATA: u32 = 3;

struct PendingTransfer {
    trb: PhysAddr,
    result: Option<(CompletionCode, u32)>,
}

/// One endpoint's transfer ring plus the bounce buffer its data stages use.
/// `EP0`'s ring is created the first time a slot is seen; others are added
/// as `configure_endpoint` calls succeed.
struct EndpointRing {
    ring: ProducerRing,
    bounce: DmaBuffer,
}

impl EndpointRing {
    fn new() -> Self {
        Self {
            ring: ProducerRing::transfer_ring(16),
            bounce: DmaBuffer::alloc_pages(BOUNCE_BUFFER_PAGES),
        }
    }
}

/// Submits and waits on transfers for every slot the controller owns.
/// Endpoint rings are keyed by `(slot_id, doorbell_endpoint_id)` since
/// doorbell endpoint ids are only unique within a slot.
pub struct Transfers<'a> {
    registers: &'a Registers<'a>,
    endpoints: BTreeMap<(u8, u8), EndpointRing>,
    pending: Vec<PendingTransfer>,
}

impl<'a> Transfers<'a> {
    pub fn new(registers: &'a Registers<'a>) -> Self {
        Self {
            registers,
            endpoints: BTreeMap::new(),
            pending: Vec::new(),
        }
    }

    /// Adds a transfer ring for `(slot_id, doorbell_endpoint_id)`, per
    /// Configure Endpoint (§4.9) or the implicit EP0 ring every slot gets.
    /// A no-op if the endpoint is already tracked.
    fn ensure_endpoint(&mut self, slot_id: u8, doorbell_endpoint_id: u8) -> &mut EndpointRing {
        self.endpoints
            .entry((slot_id, doorbell_endpoint_id))
            .or_insert_with(EndpointRing::new)
    }

    /// Physical base address of `(slot_id, doorbell_endpoint_id)`'s transfer
    /// ring, for Address-Device/Configure-Endpoint input contexts.
    pub fn ring_phys_addr(&mut self, slot_id: u8, doorbell_endpoint_id: u8) -> PhysAddr {
        self.ensure_endpoint(slot_id, doorbell_endpoint_id).ring.phys_addr()
    }

    /// Drops every endpoint ring belonging to `slot_id` (§4.6's device
    /// teardown path, `HostController::cleanup`).
    pub fn forget_slot(&mut self, slot_id: u8) {
        self.endpoints.retain(|(slot, _), _| *slot != slot_id);
        self.pending.clear();
    }

    fn post(&mut self, slot_id: u8, doorbell_endpoint_id: u8, trb: Trb) -> PhysAddr {
        let ep = self
            .endpoints
            .get_mut(&(slot_id, doorbell_endpoint_id))
            .expect("endpoint ring not configured");
        let addr = ep.ring.enqueue(trb);
        self.pending.push(PendingTransfer { trb: addr, result: None });
        self.registers.doorbell(slot_id).write(u32::from(doorbell_endpoint_id));
        addr
    }

    fn wait(
        &mut self,
        event_ring: &mut EventRing,
        interrupter: u16,
        trb: PhysAddr,
    ) -> Result<(CompletionCode, u32)> {
        for _ in 0..WAIT_ITERATIONS {
            let pending = &mut self.pending;
            process_events(event_ring, self.registers, interrupter, |event| {
                if let Event::Transfer {
                    trb,
                    completion_code,
                    residual_length,
                    ..
                } = event
                {
                    if let Some(slot) = pending.iter_mut().find(|p| p.trb == trb) {
                        slot.result = Some((completion_code, residual_length));
                    }
                }
            });

            if let Some(index) = self.pending.iter().position(|p| p.trb == trb) {
                if let Some(result) = self.pending[index].result {
                    self.pending.remove(index);
                    return Ok(result);
                }
            }
            core::hint::spin_loop();
        }
        Err(KernelError::Timeout)
    }

    /// Executes one control transfer on EP0 (§4.10): Setup, optional Data,
    /// Status. Returns the number of bytes actually moved in the data stage.
    pub fn control_transfer(
        &mut self,
        event_ring: &mut EventRing,
        interrupter: u16,
        slot_id: u8,
        setup: SetupPacket,
        buf: &mut [u8],
    ) -> Result<usize> {
        const EP0: u8 = 1;
        self.ensure_endpoint(slot_id, EP0);

        let has_data = setup.length > 0 && !buf.is_empty();
        let direction_in = setup.request_type & 0x80 != 0;

        let bounce_phys = self.endpoints[&(slot_id, EP0)].bounce.phys_addr();
        if has_data && !direction_in {
            let ep = &self.endpoints[&(slot_id, EP0)];
            let len = buf.len().min(ep.bounce.len());
            unsafe { core::ptr::copy_nonoverlapping(buf.as_ptr(), ep.bounce.virt_addr().as_mut_ptr(), len) };
        }

        let mut setup_trb = Trb::zeroed();
        setup_trb.parameter = u64::from(setup.request_type)
            | u64::from(setup.request) << 8
            | u64::from(setup.value) << 16
            | u64::from(setup.index) << 32
            | u64::from(setup.length) << 48;
        setup_trb.status = u32::from(setup.length);
        let trt = if !has_data {
            TRT_NO_DATA
        } else if direction_in {
            TRT_IN_DATA
        } else {
            TRT_OUT_DATA
        };
        setup_trb.control = (trt << 16) | (1 << 6); // IDT: parameter holds the packet, not a pointer
        setup_trb.set_trb_type(TrbType::SetupStage);
        self.post(slot_id, EP0, setup_trb);

        if has_data {
            let mut data_trb = Trb::zeroed();
            data_trb.parameter = bounce_phys.as_u64();
            data_trb.status = u32::from(setup.length);
            data_trb.control = u32::from(direction_in) << 16;
            data_trb.set_trb_type(TrbType::DataStage);
            self.post(slot_id, EP0, data_trb);
        }

        let mut status_trb = Trb::zeroed();
        // Status stage direction is the opposite of the data stage's (or IN
        // when there was no data stage at all), per §4.10.
        status_trb.control = u32::from(!direction_in || !has_data) << 16;
        status_trb.set_trb_type(TrbType::StatusStage);
        let status_addr = self.post(slot_id, EP0, status_trb);

        let (completion_code, residual) = self.wait(event_ring, interrupter, status_addr)?;
        if completion_code != CompletionCode::Success && completion_code != CompletionCode::ShortPacket {
            return Err(KernelError::DeviceError);
        }

        let transferred = (u32::from(setup.length) - residual.min(u32::from(setup.length))) as usize;
        if has_data && direction_in {
            let ep = &self.endpoints[&(slot_id, EP0)];
            let len = transferred.min(buf.len()).min(ep.bounce.len());
            unsafe { core::ptr::copy_nonoverlapping(ep.bounce.virt_addr().as_ptr(), buf.as_mut_ptr(), len) };
        }
        Ok(if has_data { transferred } else { 0 })
    }

    /// Executes one interrupt or bulk transfer (§4.11): a single Normal TRB.
    pub fn transfer(
        &mut self,
        event_ring: &mut EventRing,
        interrupter: u16,
        slot_id: u8,
        doorbell_endpoint_id: u8,
        direction: Direction,
        buf: &mut [u8],
    ) -> Result<usize> {
        self.ensure_endpoint(slot_id, doorbell_endpoint_id);
        let bounce_phys = self.endpoints[&(slot_id, doorbell_endpoint_id)].bounce.phys_addr();

        if direction == Direction::Out {
            let ep = &self.endpoints[&(slot_id, doorbell_endpoint_id)];
            let len = buf.len().min(ep.bounce.len());
            unsafe { core::ptr::copy_nonoverlapping(buf.as_ptr(), ep.bounce.virt_addr().as_mut_ptr(), len) };
        }

        let mut trb = Trb::zeroed();
        trb.parameter = bounce_phys.as_u64();
        trb.status = buf.len() as u32;
        trb.control = 1 << 5; // Interrupt On Short Packet
        trb.set_trb_type(TrbType::Normal);
        let addr = self.post(slot_id, doorbell_endpoint_id, trb);

        let (completion_code, residual) = self.wait(event_ring, interrupter, addr)?;
        if completion_code != CompletionCode::Success && completion_code != CompletionCode::ShortPacket {
            return Err(KernelError::DeviceError);
        }
        let transferred = (buf.len() as u32 - residual.min(buf.len() as u32)) as usize;

        if direction == Direction::In {
            let ep = &self.endpoints[&(slot_id, doorbell_endpoint_id)];
            let len = transferred.min(buf.len()).min(ep.bounce.len());
            unsafe { core::ptr::copy_nonoverlapping(ep.bounce.virt_addr().as_ptr(), buf.as_mut_ptr(), len) };
        }
        Ok(transferred)
    }
}

#[cfg(test)]
mod tests {
    #[test]
    fn status_stage_direction_flips_for_out_data() {
        let direction_in = false;
        let has_data = true;
        let bit = u32::from(!direction_in || !has_data) << 16;
        assert_eq!(bit, 1 << 16);
    }

    #[test]
    fn status_stage_direction_is_in_for_no_data_transfers() {
        let direction_in = false;
        let has_data = false;
        let bit = u32::from(!direction_in || !has_data) << 16;
        assert_eq!(bit, 1 << 16);
    }
}
