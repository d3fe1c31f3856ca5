//! Top-level xHCI host controller (§4.7): PCI discovery through a running
//! root hub, implementing [`HostController`] so the USB core can drive this
//! like any other controller without knowing it's xHCI underneath.

use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::sync::{Arc, Weak};
use alloc::vec::Vec;
use core::error::Error;
use core::sync::atomic::{fence, Ordering};

use linkme::distributed_slice;
use log::{error, info, warn};
use spin::Mutex;

use crate::driver::pci::{PciDevice, PciDriverDescriptor, PciDeviceClass, SerialBusSubClass, PCI_DRIVERS};
use crate::driver::usb::controller::{
    Controller as UsbController, Direction, HostController, SetupPacket,
};
use crate::driver::usb::endpoint::Endpoint;
use crate::driver::usb::enumeration::enumerate_port;
use crate::driver::usb::speed::Speed;
use crate::driver::xhci::commands::{ep0_max_packet_size, fill_address_device_input_context, Commands};
use crate::driver::xhci::context::{add_context_flag_for_endpoint, EndpointType, InputContext};
use crate::driver::xhci::event::{process_events, Event};
use crate::driver::xhci::operational::{Crcr, UsbCmd, UsbSts};
use crate::driver::xhci::portsc::PortSc;
use crate::driver::xhci::registers::Registers;
use crate::driver::xhci::ring::{EventRing, ProducerRing};
use crate::driver::xhci::transfer::Transfers;
use crate::driver::xhci::XhciRegisters;
use crate::error::KernelError;
use crate::mem::dma::DmaBuffer;
use crate::Result;

const COMMAND_RING_CAPACITY: usize = 256;
const EVENT_RING_CAPACITY: usize = 256;
const PRIMARY_INTERRUPTER: u16 = 0;
const RESET_WAIT_ITERATIONS: u32 = 5_000_000;

#[distributed_slice(PCI_DRIVERS)]
static XHCI_DRIVER: PciDriverDescriptor = PciDriverDescriptor {
    name: "xhci",
    probe,
    init,
};

fn probe(device: &PciDevice) -> bool {
    matches!(
        device.class(),
        PciDeviceClass::SerialBusController(SerialBusSubClass::USBController)
    ) && device.prog_if() == 0x30
}

fn init(device: Weak<PciDevice>) -> core::result::Result<(), Box<dyn Error>> {
    let device = device.upgrade().ok_or(KernelError::DeviceError)?;
    let controller = XhciController::bring_up(&device)?;
    let usb = UsbController::new(Arc::new(controller));
    crate::driver::usb::init(usb);
    scan_root_ports(crate::driver::usb::controller());
    Ok(())
}

/// Maps the xHCI Port Speed ID (PORTSC bits 13:10, default speed ID
/// assignment per §4.19.7 when no Protocol Speed ID table overrides it)
/// to the USB core's `Speed`.
fn raw_speed_to_usb_speed(raw: u8) -> Option<Speed> {
    match raw {
        1 => Some(Speed::FULL_SPEED),
        2 => Some(Speed::LOW_SPEED),
        3 => Some(Speed::HIGH_SPEED),
        4 => Some(Speed::SUPER_SPEED_GEN1_X1),
        5 => Some(Speed::SUPER_SPEED_GEN2_X1),
        6 => Some(Speed::SUPER_SPEED_GEN1_X2),
        7 => Some(Speed::SUPER_SPEED_GEN2_X2),
        _ => None,
    }
}

fn leak_static<T>(value: T) -> &'static T {
    Box::leak(Box::new(value))
}

struct PortState {
    raw_speed: u8,
}

struct DeviceSlot {
    output_context: DmaBuffer,
    max_dci: u8,
}

/// Owns every piece of controller state: the command and event rings, the
/// DCBAA and scratchpad buffers, per-slot output device contexts, and the
/// per-endpoint transfer rings (§3, §4.7).
pub struct XhciController {
    registers: &'static Registers<'static>,
    commands: Mutex<Commands<'static>>,
    events: Mutex<EventRing>,
    transfers: Mutex<Transfers<'static>>,
    dcbaa: DmaBuffer,
    _scratchpad_array: Option<DmaBuffer>,
    _scratchpad_buffers: Vec<DmaBuffer>,
    slots: Mutex<BTreeMap<u8, DeviceSlot>>,
    ports: Mutex<BTreeMap<usize, PortState>>,
    max_ports: u8,
}

impl XhciController {
    /// Phase A through E of §4.7: stop and reset the controller, size and
    /// program its core data structures, then set it running.
    fn bring_up(pci_device: &PciDevice) -> Result<Self> {
        let mmio = XhciRegisters::try_from(pci_device).map_err(|_| KernelError::Unsupported)?;
        let mmio: &'static XhciRegisters<'static> = leak_static(mmio);
        let registers: &'static Registers<'static> = mmio;

        // Phase A: stop, then reset.
        let mut cmd = registers.operational.usbcmd().read();
        cmd.remove(UsbCmd::RS);
        registers.operational.usbcmd().write(cmd);
        wait_until(|| registers.operational.usbsts().read().contains(UsbSts::HCH))?;

        registers
            .operational
            .usbcmd()
            .write(UsbCmd::HCRST);
        wait_until(|| !registers.operational.usbcmd().read().contains(UsbCmd::HCRST))?;
        wait_until(|| !registers.operational.usbsts().read().contains(UsbSts::CNR))?;

        let max_slots = registers.capabilities.hcsparams1().read().max_device_slots();
        let max_ports = registers.capabilities.hcsparams1().read().max_ports();

        // Phase C: DCBAA, scratchpad, command ring, event ring — memory only.
        // None of these register with the controller yet; that's Phase D,
        // in the exact order below.
        let dcbaa = DmaBuffer::alloc_pages((usize::from(max_slots) + 1).div_ceil(512));
        let scratchpad_count = registers.capabilities.hcsparams2().read().max_scratchpad_bufs();
        let (scratchpad_array, scratchpad_buffers) = if scratchpad_count > 0 {
            let array = DmaBuffer::alloc_pages(1);
            let mut buffers = Vec::new();
            for i in 0..scratchpad_count {
                let page = DmaBuffer::alloc_pages(1);
                unsafe {
                    array
                        .as_ptr::<u64>()
                        .add(i as usize)
                        .write_volatile(page.phys_addr().as_u64());
                }
                buffers.push(page);
            }
            unsafe { dcbaa.as_ptr::<u64>().write_volatile(array.phys_addr().as_u64()) };
            (Some(array), buffers)
        } else {
            (None, Vec::new())
        };

        let command_ring = ProducerRing::command_ring(COMMAND_RING_CAPACITY);
        let event_ring = EventRing::new(EVENT_RING_CAPACITY);

        program_and_run(
            registers,
            max_slots,
            dcbaa.phys_addr().as_u64(),
            command_ring.phys_addr().as_u64(),
            command_ring.cycle_state(),
            event_ring.erst_entry_count(),
            event_ring.erst_phys_addr().as_u64(),
            event_ring.ring_phys_addr().as_u64(),
            PRIMARY_INTERRUPTER,
        )?;

        let commands = Commands::new(command_ring, registers);

        info!(
            "xhci: controller running, {} slots, {} ports, {} scratchpad buffers",
            max_slots, max_ports, scratchpad_count
        );

        Ok(Self {
            registers,
            commands: Mutex::new(commands),
            events: Mutex::new(event_ring),
            transfers: Mutex::new(Transfers::new(registers)),
            dcbaa,
            _scratchpad_array: scratchpad_array,
            _scratchpad_buffers: scratchpad_buffers,
            slots: Mutex::new(BTreeMap::new()),
            ports: Mutex::new(BTreeMap::new()),
            max_ports,
        })
    }

    fn write_dcbaa_entry(&self, slot_id: u8, output_context_phys: x86_64::PhysAddr) {
        unsafe {
            self.dcbaa
                .as_ptr::<u64>()
                .add(usize::from(slot_id))
                .write_volatile(output_context_phys.as_u64());
        }
    }
}

fn wait_until(mut condition: impl FnMut() -> bool) -> Result<()> {
    for _ in 0..RESET_WAIT_ITERATIONS {
        if condition() {
            return Ok(());
        }
        core::hint::spin_loop();
    }
    Err(KernelError::Timeout)
}

/// Phase D and the first half of Phase E of §4.7: program DCBAAP, CONFIG,
/// ERSTSZ, ERSTBA, ERDP and CRCR in that order, fence after each so no
/// write is reordered past the next, then arm the primary interrupter and
/// set the controller running. Takes plain addresses/counts rather than the
/// ring types themselves so it is callable against simulated MMIO in tests
/// without a DMA-backed ring behind it.
#[allow(clippy::too_many_arguments)]
fn program_and_run(
    registers: &Registers,
    max_slots: u8,
    dcbaa_phys: u64,
    command_ring_phys: u64,
    command_ring_cycle: bool,
    erst_entry_count: u32,
    erst_phys: u64,
    event_ring_phys: u64,
    interrupter_index: u16,
) -> Result<()> {
    registers.operational.dcbaap().write(dcbaa_phys);
    fence(Ordering::SeqCst);

    registers.operational.config().write(u32::from(max_slots));
    fence(Ordering::SeqCst);

    let interrupter = registers.interrupter(interrupter_index);

    interrupter.erstsz().write(erst_entry_count);
    fence(Ordering::SeqCst);

    interrupter.erstba().write(erst_phys);
    fence(Ordering::SeqCst);

    interrupter.erdp().write(event_ring_phys); // ring base is 64-byte aligned, so EHB (bit 3) reads 0
    fence(Ordering::SeqCst);

    let preserved = Crcr::preserving_address(registers.operational.crcr().read());
    registers.operational.crcr().write(preserved);
    fence(Ordering::SeqCst);

    registers
        .operational
        .crcr()
        .write(Crcr::new(command_ring_phys, command_ring_cycle));
    fence(Ordering::SeqCst);

    wait_until(|| registers.operational.crcr().read().contains(Crcr::CSS))?;

    interrupter.imod().write(4000); // 4000 * 250ns = 1ms moderation interval
    interrupter.iman().write(1); // Interrupt Pending is RW1C; bit 0 (IE) set, IP left clear

    let mut cmd = registers.operational.usbcmd().read();
    cmd.insert(UsbCmd::INTE);
    cmd.insert(UsbCmd::RS);
    registers.operational.usbcmd().write(cmd);
    wait_until(|| !registers.operational.usbsts().read().contains(UsbSts::HCH))
}

/// SuperSpeed and above negotiate their Output (Device) Context before
/// Enable-Slot (§4.9), not after Address-Device like every other speed.
fn is_super_speed(raw_speed: u8) -> bool {
    (4..=7).contains(&raw_speed)
}

impl HostController for XhciController {
    fn init(&self) -> Result<()> {
        // Bring-up already ran the controller to completion in `bring_up`.
        Ok(())
    }

    fn port_count(&self) -> usize {
        usize::from(self.max_ports)
    }

    /// Drives PORTSC's Port Reset bit and reports back the negotiated speed
    /// (§4.19.7/§4.15): no connection, no speed.
    fn reset_port(&self, port: usize) -> Result<Option<Speed>> {
        let port_u8 = u8::try_from(port).map_err(|_| KernelError::InvalidArgument)?;
        let portsc_ptr = self.registers.port(port_u8);

        let status = portsc_ptr.portsc().read();
        if !status.contains(PortSc::CCS) {
            return Ok(None);
        }

        // Every RW1C bit must be written 0 unless we mean to clear it, and
        // PP must be preserved or the port loses power (§4.19.1.2.1).
        let mut write = PortSc::empty();
        write.set(PortSc::PP, status.contains(PortSc::PP));
        write.set(PortSc::PR, true);
        portsc_ptr.portsc().write(write);

        wait_until(|| portsc_ptr.portsc().read().contains(PortSc::PRC))?;

        let mut clear = PortSc::empty();
        clear.set(PortSc::PP, true);
        clear.set(PortSc::PRC, true);
        portsc_ptr.portsc().write(clear);

        let raw_speed = portsc_ptr.portsc().read().port_speed();
        self.ports.lock().insert(port, PortState { raw_speed });
        Ok(raw_speed_to_usb_speed(raw_speed))
    }

    fn enable_device(&self, port: usize, _speed: Speed) -> Result<u8> {
        let port_u8 = u8::try_from(port).map_err(|_| KernelError::InvalidArgument)?;
        let raw_speed = self
            .ports
            .lock()
            .get(&port)
            .map(|p| p.raw_speed)
            .ok_or(KernelError::DeviceError)?;

        // SuperSpeed and above must have their Output (Device) Context
        // allocated and installed in DCBAAP[slot_id] before Address-Device
        // is issued (§4.9); every other speed installs it afterward.
        let pre_allocated_output_context = if is_super_speed(raw_speed) {
            Some(DmaBuffer::alloc_pages(1))
        } else {
            None
        };

        let mut commands = self.commands.lock();
        let mut events = self.events.lock();
        let slot_id = commands.enable_slot(&mut events, PRIMARY_INTERRUPTER)?;

        if let Some(output_context) = &pre_allocated_output_context {
            self.write_dcbaa_entry(slot_id, output_context.phys_addr());
            fence(Ordering::SeqCst);
        }

        let ep0_ring_phys = self.transfers.lock().ring_phys_addr(slot_id, 1);
        let mut input = InputContext::zeroed();
        fill_address_device_input_context(
            &mut input,
            0,
            raw_speed,
            port_u8,
            ep0_max_packet_size(raw_speed),
            ep0_ring_phys,
        );
        let input_buf = DmaBuffer::alloc_pages(1);
        unsafe { input_buf.as_ptr::<InputContext>().write_volatile(input) };

        let result = commands.address_device(&mut events, PRIMARY_INTERRUPTER, slot_id, input_buf.phys_addr());
        drop(events);
        drop(commands);
        result?;

        let output_context = match pre_allocated_output_context {
            Some(output_context) => output_context,
            None => {
                let output_context = DmaBuffer::alloc_pages(1);
                self.write_dcbaa_entry(slot_id, output_context.phys_addr());
                fence(Ordering::SeqCst);
                output_context
            }
        };
        self.slots.lock().insert(
            slot_id,
            DeviceSlot {
                output_context,
                max_dci: 1,
            },
        );

        Ok(slot_id)
    }

    fn configure_endpoint(&self, slot_id: u8, endpoint: &Endpoint) -> Result<()> {
        let dci = endpoint.doorbell_endpoint_id();
        let ring_phys = self.transfers.lock().ring_phys_addr(slot_id, dci);

        // Context Entries must reflect the highest Device Context Index
        // configured for the slot so far (xHCI 1.2 §6.2.2), so track it
        // across calls rather than trusting this one endpoint's index.
        let max_dci = {
            let mut slots = self.slots.lock();
            let slot = slots.get_mut(&slot_id).ok_or(KernelError::DeviceError)?;
            slot.max_dci = slot.max_dci.max(dci);
            slot.max_dci
        };

        let mut input = InputContext::zeroed();
        input.control.add_flags.set_add_context_flags(
            0b1 | add_context_flag_for_endpoint(dci),
        );
        input.slot.dword0.set_context_entries(max_dci);

        let ep_type = match (endpoint.transfer_type(), endpoint.is_in()) {
            (crate::driver::usb::endpoint::TransferType::Control, _) => EndpointType::Control,
            (crate::driver::usb::endpoint::TransferType::Isoch, false) => EndpointType::IsochOut,
            (crate::driver::usb::endpoint::TransferType::Isoch, true) => EndpointType::IsochIn,
            (crate::driver::usb::endpoint::TransferType::Bulk, false) => EndpointType::BulkOut,
            (crate::driver::usb::endpoint::TransferType::Bulk, true) => EndpointType::BulkIn,
            (crate::driver::usb::endpoint::TransferType::Interrupt, false) => EndpointType::InterruptOut,
            (crate::driver::usb::endpoint::TransferType::Interrupt, true) => EndpointType::InterruptIn,
        };
        let ep_ctx = input.endpoint_mut(dci);
        ep_ctx.set_ep_type(ep_type);
        ep_ctx.dword1.set_max_packet_size(endpoint.max_packet_size());
        ep_ctx.dword1.set_error_count(3);
        ep_ctx.average_trb_length = endpoint.max_packet_size();
        ep_ctx.dword0.set_interval(endpoint.poll_interval());
        ep_ctx.set_tr_dequeue_pointer(ring_phys, true);

        let input_buf = DmaBuffer::alloc_pages(1);
        unsafe { input_buf.as_ptr::<InputContext>().write_volatile(input) };

        let mut commands = self.commands.lock();
        let mut events = self.events.lock();
        commands.configure_endpoint(&mut events, PRIMARY_INTERRUPTER, slot_id, input_buf.phys_addr())
    }

    fn control_transfer(&self, slot_id: u8, setup: SetupPacket, buf: &mut [u8]) -> Result<usize> {
        let mut transfers = self.transfers.lock();
        let mut events = self.events.lock();
        transfers.control_transfer(&mut events, PRIMARY_INTERRUPTER, slot_id, setup, buf)
    }

    fn transfer(&self, slot_id: u8, endpoint: &Endpoint, direction: Direction, buf: &mut [u8]) -> Result<usize> {
        let mut transfers = self.transfers.lock();
        let mut events = self.events.lock();
        transfers.transfer(
            &mut events,
            PRIMARY_INTERRUPTER,
            slot_id,
            endpoint.doorbell_endpoint_id(),
            direction,
            buf,
        )
    }

    /// Drains whatever the controller produced since the last poll, logging
    /// the hotplug events this core doesn't yet act on (§4.19.2's
    /// Connect/Disconnect notifications are surfaced here for visibility;
    /// reacting to a mid-run hot-unplug is not implemented).
    fn poll(&self) {
        let mut events = self.events.lock();
        process_events(&mut events, self.registers, PRIMARY_INTERRUPTER, |event| {
            if let Event::PortStatusChange { port_id } = event {
                warn!("xhci: port status change on port {port_id}, rescan not implemented");
            }
        });
    }

    fn cleanup(&self, slot_id: u8) -> Result<()> {
        self.transfers.lock().forget_slot(slot_id);
        self.slots.lock().remove(&slot_id);
        self.write_dcbaa_entry(slot_id, x86_64::PhysAddr::new(0));
        Ok(())
    }
}

/// Scans every root-hub port once at startup and enumerates whatever is
/// already plugged in (§4.15). Ports that connect later are not noticed —
/// see [`XhciController::poll`]'s note on hotplug.
fn scan_root_ports(controller: &UsbController) {
    for port in 1..=controller.host.port_count() {
        match controller.host.reset_port(port) {
            Ok(Some(_)) => {
                let _ = enumerate_port(controller, port, None);
            }
            Ok(None) => {}
            Err(e) => error!("xhci: root port {port} reset failed: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use x86_64::VirtAddr;

    use super::*;

    #[test]
    fn raw_speed_maps_known_ids() {
        assert_eq!(raw_speed_to_usb_speed(2), Some(Speed::LOW_SPEED));
        assert_eq!(raw_speed_to_usb_speed(3), Some(Speed::HIGH_SPEED));
        assert_eq!(raw_speed_to_usb_speed(0), None);
        assert_eq!(raw_speed_to_usb_speed(15), None);
    }

    #[test]
    fn super_speed_ids_require_pre_allocation() {
        assert!(!is_super_speed(1));
        assert!(!is_super_speed(3));
        assert!(is_super_speed(4));
        assert!(is_super_speed(7));
    }

    /// A page-aligned byte buffer standing in for a controller's MMIO BAR:
    /// big enough for Capabilities, Operational, four ports and one
    /// interrupter at the offsets `fake_mmio` below lays out.
    #[repr(C, align(8))]
    struct FakeMmio([u8; 0x1200]);

    /// Lays out a synthetic register file matching the "most unforgiving
    /// sequence" scenario: CAPLENGTH (rounded up from 0x20 to fit this
    /// crate's wider `Capabilities`, which also carries HCCPARAMS2/VTIOSOFF),
    /// HCIVERSION=0x0110, HCSPARAMS1 with 32 slots / 4 ports / 1 interrupter,
    /// HCCPARAMS1=0x1, HCSPARAMS2=0, RTSOFF and DBOFF pointing past the port
    /// register block.
    fn fake_mmio() -> FakeMmio {
        let mut mmio = FakeMmio([0u8; 0x1200]);
        let base = mmio.0.as_mut_ptr();
        unsafe {
            base.write(0x28); // CAPLENGTH
            base.add(1).write(0); // RsvdZ
            base.add(2).cast::<u16>().write_unaligned(0x0110); // HCIVERSION
            base.add(4).cast::<u32>().write_unaligned(0x0400_0120); // HCSPARAMS1: slots=32 | interrupters=1<<8 | ports=4<<24
            base.add(8).cast::<u32>().write_unaligned(0); // HCSPARAMS2
            base.add(12).cast::<u32>().write_unaligned(0); // HCSPARAMS3
            base.add(16).cast::<u32>().write_unaligned(0x1); // HCCPARAMS1: AC64
            base.add(20).cast::<u32>().write_unaligned(0x1100); // DBOFF
            base.add(24).cast::<u32>().write_unaligned(0x1000); // RTSOFF
            base.add(28).cast::<u32>().write_unaligned(0); // HCCPARAMS2
            base.add(32).cast::<u32>().write_unaligned(0); // VTIOSOFF
        }
        mmio
    }

    /// Drives `program_and_run` — the Phase D/E register sequence `bring_up`
    /// delegates to — against simulated MMIO and checks the post-init state
    /// scenario S3 asserts: USBCMD.RS/INTE set, USBSTS.HCH clear, CRCR reads
    /// back CSS=1/RCS=1/CRR=0 with the command ring address intact, DCBAAP
    /// and the interrupter's ERSTSZ/ERSTBA/ERDP/IMOD hold exactly what was
    /// handed in.
    #[test]
    fn bring_up_register_sequence_matches_scenario_s3() {
        let mut mmio = fake_mmio();
        let registers = Registers::new(VirtAddr::new(mmio.0.as_mut_ptr() as u64));

        let result = program_and_run(&registers, 32, 0x2000, 0x3000, true, 1, 0x4000, 0x5000, 0);
        assert!(result.is_ok());

        let cmd = registers.operational.usbcmd().read();
        assert!(cmd.contains(UsbCmd::RS));
        assert!(cmd.contains(UsbCmd::INTE));
        assert!(!registers.operational.usbsts().read().contains(UsbSts::HCH));

        let crcr = registers.operational.crcr().read();
        assert!(crcr.contains(Crcr::CSS));
        assert!(crcr.contains(Crcr::RCS));
        assert!(!crcr.contains(Crcr::CRR));
        assert_eq!(crcr.address(), 0x3000);

        assert_eq!(registers.operational.dcbaap().read(), 0x2000);
        assert_eq!(registers.operational.config().read(), 32);

        let interrupter = registers.interrupter(0);
        assert_eq!(interrupter.erstsz().read(), 1);
        assert_eq!(interrupter.erstba().read(), 0x4000);
        assert_eq!(interrupter.erdp().read(), 0x5000);
        assert_eq!(interrupter.imod().read(), 4000);
        assert_eq!(interrupter.iman().read() & 1, 1);
    }
}
