//! Input/Slot/Endpoint/Device contexts (§3, §4.9): the 32-byte-context
//! layout the controller reads for Address-Device and Configure-Endpoint,
//! and writes back as the Output (Device) Context once a slot is live.
//!
//! These are plain DMA-visible structures, not MMIO — the OS builds an
//! Input Context in ordinary memory and hands the controller its physical
//! address; there is no volatile access discipline here, only the ordinary
//! "write fields, then memory-fence before the doorbell/command" rule from
//! §5.

use bitfield::bitfield;

bitfield! {
    #[repr(transparent)]
    #[derive(Copy, Clone)]
    pub struct SlotContextDword0(u32);
    impl Debug;
    pub u32, route_string, set_route_string: 19, 0;
    pub u8, speed, set_speed: 23, 20;
    pub bool, multi_tt, set_multi_tt: 25;
    pub bool, hub, set_hub: 26;
    pub u8, context_entries, set_context_entries: 31, 27;
}

bitfield! {
    #[repr(transparent)]
    #[derive(Copy, Clone)]
    pub struct SlotContextDword1(u32);
    impl Debug;
    pub u16, max_exit_latency, set_max_exit_latency: 15, 0;
    pub u8, root_hub_port_number, set_root_hub_port_number: 23, 16;
    pub u8, number_of_ports, set_number_of_ports: 31, 24;
}

bitfield! {
    #[repr(transparent)]
    #[derive(Copy, Clone)]
    pub struct SlotContextDword2(u32);
    impl Debug;
    pub u8, parent_hub_slot_id, set_parent_hub_slot_id: 7, 0;
    pub u8, parent_port_number, set_parent_port_number: 15, 8;
    pub u16, interrupter_target, set_interrupter_target: 31, 22;
}

bitfield! {
    #[repr(transparent)]
    #[derive(Copy, Clone)]
    pub struct SlotContextDword3(u32);
    impl Debug;
    pub u8, usb_device_address, set_usb_device_address: 7, 0;
    pub u8, slot_state, set_slot_state: 31, 27;
}

#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct SlotContext {
    pub dword0: SlotContextDword0,
    pub dword1: SlotContextDword1,
    pub dword2: SlotContextDword2,
    pub dword3: SlotContextDword3,
    _reserved: [u32; 4],
}

impl SlotContext {
    pub const fn zeroed() -> Self {
        Self {
            dword0: SlotContextDword0(0),
            dword1: SlotContextDword1(0),
            dword2: SlotContextDword2(0),
            dword3: SlotContextDword3(0),
            _reserved: [0; 4],
        }
    }
}

/// Endpoint type field values (§4.9's EP0 fill, xHCI 1.2 table 6-9).
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[repr(u8)]
pub enum EndpointType {
    NotValid = 0,
    IsochOut = 1,
    BulkOut = 2,
    InterruptOut = 3,
    Control = 4,
    IsochIn = 5,
    BulkIn = 6,
    InterruptIn = 7,
}

bitfield! {
    #[repr(transparent)]
    #[derive(Copy, Clone)]
    pub struct EndpointContextDword0(u32);
    impl Debug;
    pub u8, ep_state, set_ep_state: 2, 0;
    pub u8, mult, set_mult: 9, 8;
    pub u8, max_pstreams, set_max_pstreams: 14, 10;
    pub bool, lsa, set_lsa: 15;
    pub u8, interval, set_interval: 23, 16;
}

bitfield! {
    #[repr(transparent)]
    #[derive(Copy, Clone)]
    pub struct EndpointContextDword1(u32);
    impl Debug;
    pub u8, error_count, set_error_count: 2, 1;
    pub u8, ep_type_raw, set_ep_type_raw: 5, 3;
    pub bool, host_initiate_disable, set_host_initiate_disable: 7;
    pub u8, max_burst_size, set_max_burst_size: 15, 8;
    pub u16, max_packet_size, set_max_packet_size: 31, 16;
}

#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct EndpointContext {
    pub dword0: EndpointContextDword0,
    pub dword1: EndpointContextDword1,
    /// TR Dequeue Pointer, bits 63..4, with the Dequeue Cycle State in bit 0.
    tr_dequeue_ptr: u64,
    pub average_trb_length: u16,
    max_esit_payload_lo: u16,
    _reserved: [u32; 3],
}

impl EndpointContext {
    pub const fn zeroed() -> Self {
        Self {
            dword0: EndpointContextDword0(0),
            dword1: EndpointContextDword1(0),
            tr_dequeue_ptr: 0,
            average_trb_length: 0,
            max_esit_payload_lo: 0,
            _reserved: [0; 3],
        }
    }

    pub fn set_ep_type(&mut self, ty: EndpointType) {
        self.dword1.set_ep_type_raw(ty as u8);
    }

    /// Points the TR Dequeue Pointer at `ring_base` and sets the Dequeue
    /// Cycle State bit (§4.9: "points the TR Dequeue Pointer to the ring
    /// base with DCS=1").
    pub fn set_tr_dequeue_pointer(&mut self, ring_base: x86_64::PhysAddr, dcs: bool) {
        assert_eq!(ring_base.as_u64() & 0xf, 0, "TR Dequeue Pointer must be 16-byte aligned");
        self.tr_dequeue_ptr = ring_base.as_u64() | u64::from(dcs);
    }
}

bitfield! {
    #[repr(transparent)]
    #[derive(Copy, Clone)]
    pub struct InputControlContextDword1(u32);
    impl Debug;
    /// Bit 0 is the Slot Context flag (A0); bit N (N>=1) is Endpoint
    /// Context N's flag — see [`add_context_flag_for_endpoint`].
    pub u32, add_context_flags, set_add_context_flags: 31, 0;
}

/// Add-Context-Flags bit for endpoint context N (N=1 is EP0, §4.9).
pub fn add_context_flag_for_endpoint(n: u8) -> u32 {
    1 << (n + 1)
}

#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct InputControlContext {
    drop_context_flags: u32,
    pub add_flags: InputControlContextDword1,
    _reserved: [u32; 5],
    configuration_value: u8,
    interface_number: u8,
    alternate_setting: u8,
    _reserved2: u8,
}

impl InputControlContext {
    pub const fn zeroed() -> Self {
        Self {
            drop_context_flags: 0,
            add_flags: InputControlContextDword1(0),
            _reserved: [0; 5],
            configuration_value: 0,
            interface_number: 0,
            alternate_setting: 0,
            _reserved2: 0,
        }
    }
}

/// 32 contexts of 32 bytes each: Input-Control + Slot + 31 Endpoint contexts
/// (§3). Endpoint context index N (1-based, N=1 is EP0) lives at `endpoints[N-1]`.
#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct InputContext {
    pub control: InputControlContext,
    pub slot: SlotContext,
    pub endpoints: [EndpointContext; 31],
}

impl InputContext {
    pub const fn zeroed() -> Self {
        Self {
            control: InputControlContext::zeroed(),
            slot: SlotContext::zeroed(),
            endpoints: [EndpointContext::zeroed(); 31],
        }
    }

    pub fn endpoint_mut(&mut self, dci: u8) -> &mut EndpointContext {
        assert!((1..=31).contains(&dci), "endpoint device context index out of range");
        &mut self.endpoints[dci as usize - 1]
    }
}

/// Same shape as [`InputContext`] minus the Input-Control word — this is
/// what `DCBAAP[slot_id]` points at once the controller owns the slot (§3).
#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct DeviceContext {
    pub slot: SlotContext,
    pub endpoints: [EndpointContext; 31],
}

impl DeviceContext {
    pub const fn zeroed() -> Self {
        Self {
            slot: SlotContext::zeroed(),
            endpoints: [EndpointContext::zeroed(); 31],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_context_dword0_roundtrip() {
        let mut d = SlotContextDword0(0);
        d.set_route_string(0x1234);
        d.set_speed(3);
        d.set_context_entries(1);
        assert_eq!(d.route_string(), 0x1234);
        assert_eq!(d.speed(), 3);
        assert_eq!(d.context_entries(), 1);
    }

    #[test]
    fn endpoint_context_tr_dequeue_pointer_sets_dcs_bit() {
        let mut ep = EndpointContext::zeroed();
        ep.set_tr_dequeue_pointer(x86_64::PhysAddr::new(0x1000), true);
        assert_eq!(ep.tr_dequeue_ptr, 0x1001);
    }

    #[test]
    fn add_context_flag_maps_ep0_to_bit_1() {
        assert_eq!(add_context_flag_for_endpoint(1), 0b10);
    }

    #[test]
    fn input_context_endpoint_mut_indexes_from_one() {
        let mut input = InputContext::zeroed();
        input.endpoint_mut(1).set_ep_type(EndpointType::Control);
        assert_eq!(input.endpoints[0].dword1.ep_type_raw(), EndpointType::Control as u8);
    }
}
