//! Command submission and completion (§4.8, §4.9): `post_command`, the
//! command doorbell, and a bounded wait for the matching Command-Completion
//! event.

use alloc::vec::Vec;

use x86_64::PhysAddr;

use crate::driver::xhci::context::{add_context_flag_for_endpoint, EndpointType, InputContext};
use crate::driver::xhci::event::{process_events, Event};
use crate::driver::xhci::registers::Registers;
use crate::driver::xhci::ring::{EventRing, ProducerRing};
use crate::driver::xhci::trb::{CompletionCode, Trb, TrbType};
use crate::error::KernelError;
use crate::Result;

/// Bounded busy-wait budget for command completion (§5: "timeouts are
/// measured in bounded busy-wait iterations, not wall time").
const WAIT_ITERATIONS: u32 = 5_000_000;

struct PendingCompletion {
    command_trb: PhysAddr,
    result: Option<(CompletionCode, u8)>,
}

/// The command ring plus the bookkeeping that ties completion events back to
/// their originating `post_command` call.
pub struct Commands<'a> {
    ring: ProducerRing,
    registers: &'a Registers<'a>,
    pending: Vec<PendingCompletion>,
}

impl<'a> Commands<'a> {
    pub fn new(ring: ProducerRing, registers: &'a Registers<'a>) -> Self {
        Self {
            ring,
            registers,
            pending: Vec::new(),
        }
    }

    pub fn ring_phys_addr(&self) -> PhysAddr {
        self.ring.phys_addr()
    }

    /// Enqueues `trb`, rings the command doorbell (slot 0), and registers it
    /// as pending. Returns the physical address `wait_for_completion` needs.
    fn post_command(&mut self, trb: Trb) -> PhysAddr {
        let addr = self.ring.enqueue(trb);
        self.pending.push(PendingCompletion {
            command_trb: addr,
            result: None,
        });
        self.registers.doorbell(0).write(0);
        addr
    }

    /// Drains the event ring, resolving any pending commands whose
    /// Command-Completion event has arrived, then busy-waits (bounded) for
    /// `command_trb` specifically to resolve.
    fn wait_for_completion(
        &mut self,
        event_ring: &mut EventRing,
        interrupter: u16,
        command_trb: PhysAddr,
    ) -> Result<(CompletionCode, u8)> {
        for _ in 0..WAIT_ITERATIONS {
            let pending = &mut self.pending;
            process_events(event_ring, self.registers, interrupter, |event| {
                if let Event::CommandCompletion {
                    command_trb,
                    completion_code,
                    slot_id,
                } = event
                {
                    if let Some(slot) = pending.iter_mut().find(|p| p.command_trb == command_trb) {
                        slot.result = Some((completion_code, slot_id));
                    }
                }
            });

            if self
                .registers
                .operational
                .usbsts()
                .read()
                .contains(crate::driver::xhci::UsbSts::HSE)
            {
                return Err(KernelError::Fatal);
            }

            if let Some(index) = self.pending.iter().position(|p| p.command_trb == command_trb) {
                if let Some(result) = self.pending[index].result {
                    self.pending.remove(index);
                    return Ok(result);
                }
            }

            core::hint::spin_loop();
        }

        Err(KernelError::Timeout)
    }

    /// Enable Slot (§4.9): a bare command TRB, returning the slot id on
    /// success.
    pub fn enable_slot(&mut self, event_ring: &mut EventRing, interrupter: u16) -> Result<u8> {
        let mut trb = Trb::zeroed();
        trb.set_trb_type(TrbType::EnableSlotCommand);
        let addr = self.post_command(trb);

        let (completion_code, slot_id) = self.wait_for_completion(event_ring, interrupter, addr)?;
        if completion_code != CompletionCode::Success {
            return Err(KernelError::DeviceError);
        }
        Ok(slot_id)
    }

    /// Address Device (§4.9): `input_context` must already have its Slot
    /// Context and EP0 Endpoint Context filled in and the Add-Context-Flags
    /// set for both.
    pub fn address_device(
        &mut self,
        event_ring: &mut EventRing,
        interrupter: u16,
        slot_id: u8,
        input_context_phys: PhysAddr,
    ) -> Result<()> {
        let mut trb = Trb::zeroed();
        trb.parameter = input_context_phys.as_u64();
        trb.control = (u32::from(slot_id)) << 24;
        trb.set_trb_type(TrbType::AddressDeviceCommand);
        let addr = self.post_command(trb);

        let (completion_code, _) = self.wait_for_completion(event_ring, interrupter, addr)?;
        if completion_code != CompletionCode::Success {
            return Err(KernelError::DeviceError);
        }
        Ok(())
    }

    /// Configure Endpoint (§4.6's driver lifecycle, §4.9's context shape):
    /// installs any endpoints the caller has filled into `input_context` and
    /// flagged via its Add-Context-Flags.
    pub fn configure_endpoint(
        &mut self,
        event_ring: &mut EventRing,
        interrupter: u16,
        slot_id: u8,
        input_context_phys: PhysAddr,
    ) -> Result<()> {
        let mut trb = Trb::zeroed();
        trb.parameter = input_context_phys.as_u64();
        trb.control = (u32::from(slot_id)) << 24;
        trb.set_trb_type(TrbType::ConfigureEndpointCommand);
        let addr = self.post_command(trb);

        let (completion_code, _) = self.wait_for_completion(event_ring, interrupter, addr)?;
        if completion_code != CompletionCode::Success {
            return Err(KernelError::DeviceError);
        }
        Ok(())
    }
}

/// Fills an Input Context's Slot Context and EP0 Endpoint Context for
/// Address-Device, per §4.9: endpoint type Control, max-packet from speed,
/// TR Dequeue Pointer at the EP0 ring base with DCS=1.
pub fn fill_address_device_input_context(
    input: &mut InputContext,
    route_string: u32,
    speed: u8,
    root_hub_port_number: u8,
    ep0_max_packet_size: u16,
    ep0_ring_base: PhysAddr,
) {
    input.control.add_flags.set_add_context_flags(
        input.control.add_flags.add_context_flags() | 0b1 | add_context_flag_for_endpoint(1),
    );

    input.slot.dword0.set_route_string(route_string);
    input.slot.dword0.set_speed(speed);
    input.slot.dword0.set_context_entries(1);
    input.slot.dword1.set_root_hub_port_number(root_hub_port_number);

    let ep0 = input.endpoint_mut(1);
    ep0.set_ep_type(EndpointType::Control);
    ep0.dword1.set_max_packet_size(ep0_max_packet_size);
    ep0.dword1.set_error_count(3);
    ep0.average_trb_length = 8;
    ep0.set_tr_dequeue_pointer(ep0_ring_base, true);
}

/// EP0 max-packet size by port speed (§4.9): Low=8, Full/High=64, Super=512.
pub fn ep0_max_packet_size(speed: u8) -> u16 {
    match speed {
        2 => 8,   // Low-Speed
        1 | 3 => 64, // Full-Speed / High-Speed
        _ => 512, // SuperSpeed and above
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ep0_max_packet_size_by_speed() {
        assert_eq!(ep0_max_packet_size(2), 8);
        assert_eq!(ep0_max_packet_size(1), 64);
        assert_eq!(ep0_max_packet_size(3), 64);
        assert_eq!(ep0_max_packet_size(4), 512);
    }

    #[test]
    fn fill_address_device_sets_expected_flags() {
        let mut input = InputContext::zeroed();
        fill_address_device_input_context(&mut input, 0, 4, 1, 512, PhysAddr::new(0x2000));
        assert_eq!(input.control.add_flags.add_context_flags(), 0b11);
        assert_eq!(input.slot.dword0.speed(), 4);
        assert_eq!(input.slot.dword1.root_hub_port_number(), 1);
        assert_eq!(input.endpoints[0].dword1.max_packet_size(), 512);
    }
}
