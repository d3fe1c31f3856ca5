//! Event draining: dequeuing event TRBs, advancing ERDP with EHB cleared,
//! and decoding them into the three event kinds the driver cares about
//! (§4.8, §4.10, §4.11).

use crate::driver::xhci::registers::Registers;
use crate::driver::xhci::ring::EventRing;
use crate::driver::xhci::trb::{CompletionCode, Trb, TrbType};
use x86_64::PhysAddr;

#[derive(Debug, Copy, Clone)]
pub enum Event {
    CommandCompletion {
        command_trb: PhysAddr,
        completion_code: CompletionCode,
        slot_id: u8,
    },
    Transfer {
        trb: PhysAddr,
        completion_code: CompletionCode,
        residual_length: u32,
        endpoint_id: u8,
        slot_id: u8,
    },
    PortStatusChange {
        port_id: u8,
    },
    /// An event type this driver doesn't interpret; forwarded so callers can
    /// at least log it instead of silently dropping it.
    Unhandled(TrbType),
}

fn decode(trb: &Trb) -> Event {
    match trb.trb_type() {
        TrbType::CommandCompletionEvent => Event::CommandCompletion {
            command_trb: PhysAddr::new(trb.parameter),
            completion_code: CompletionCode::from(trb.completion_code()),
            slot_id: (trb.control >> 24) as u8,
        },
        TrbType::TransferEvent => Event::Transfer {
            trb: PhysAddr::new(trb.parameter),
            completion_code: CompletionCode::from(trb.completion_code()),
            residual_length: trb.status & 0x00ff_ffff,
            endpoint_id: ((trb.control >> 16) & 0x1f) as u8,
            slot_id: (trb.control >> 24) as u8,
        },
        TrbType::PortStatusChangeEvent => Event::PortStatusChange {
            port_id: (trb.parameter >> 24) as u8,
        },
        other => Event::Unhandled(other),
    }
}

/// Drains every event TRB the controller has produced since the last call.
/// Each dequeue is immediately followed by an ERDP write with EHB cleared
/// (§3's Event ring invariant: "otherwise the controller will not deliver
/// further events"), before the next one is attempted.
pub fn process_events(
    ring: &mut EventRing,
    registers: &Registers,
    interrupter: u16,
    mut on_event: impl FnMut(Event),
) {
    while let Some((trb, dequeue_addr)) = ring.dequeue() {
        on_event(decode(&trb));

        const EHB: u64 = 1 << 3;
        let erdp = dequeue_addr.as_u64() & !0xf;
        registers.interrupter(interrupter).erdp().write(erdp & !EHB);
    }
}
