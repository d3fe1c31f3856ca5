//! USB endpoint (§3): endpoint 0 is implicit control and always present;
//! the rest are discovered by descriptor parsing during enumeration.

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum TransferType {
    Control,
    Isoch,
    Bulk,
    Interrupt,
}

/// A controller-private handle stashed on the endpoint by whichever host
/// controller owns it — for xHCI this is the transfer ring's physical base.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ControllerPrivate(pub u64);

#[derive(Debug, Copy, Clone)]
pub struct Endpoint {
    /// Bit 7 is direction (1 = IN); bits 3:0 are the endpoint number.
    address: u8,
    transfer_type: TransferType,
    max_packet_size: u16,
    poll_interval: u8,
    data_toggle: bool,
    controller_private: Option<ControllerPrivate>,
}

impl Endpoint {
    pub const CONTROL_EP0: Endpoint = Endpoint {
        address: 0,
        transfer_type: TransferType::Control,
        max_packet_size: 8,
        poll_interval: 0,
        data_toggle: false,
        controller_private: None,
    };

    pub fn new(
        address: u8,
        transfer_type: TransferType,
        max_packet_size: u16,
        poll_interval: u8,
    ) -> Self {
        Self {
            address,
            transfer_type,
            max_packet_size,
            poll_interval,
            data_toggle: false,
            controller_private: None,
        }
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    pub fn number(&self) -> u8 {
        self.address & 0x0f
    }

    pub fn is_in(&self) -> bool {
        self.address & 0x80 != 0
    }

    pub fn transfer_type(&self) -> TransferType {
        self.transfer_type
    }

    pub fn max_packet_size(&self) -> u16 {
        self.max_packet_size
    }

    pub fn set_max_packet_size(&mut self, size: u16) {
        self.max_packet_size = size;
    }

    pub fn poll_interval(&self) -> u8 {
        self.poll_interval
    }

    pub fn data_toggle(&self) -> bool {
        self.data_toggle
    }

    pub fn toggle_data(&mut self) {
        self.data_toggle = !self.data_toggle;
    }

    pub fn reset_data_toggle(&mut self) {
        self.data_toggle = false;
    }

    pub fn controller_private(&self) -> Option<ControllerPrivate> {
        self.controller_private
    }

    pub fn set_controller_private(&mut self, value: ControllerPrivate) {
        self.controller_private = Some(value);
    }

    /// The xHCI doorbell endpoint-id for this endpoint (§4.10, §4.11): EP0
    /// is always 1; for others it's `number*2 + direction_bit`.
    pub fn doorbell_endpoint_id(&self) -> u8 {
        if self.number() == 0 {
            1
        } else {
            self.number() * 2 + u8::from(self.is_in())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn doorbell_id_for_ep0_is_always_one() {
        assert_eq!(Endpoint::CONTROL_EP0.doorbell_endpoint_id(), 1);
    }

    #[test]
    fn doorbell_id_for_interrupt_in_endpoint() {
        let ep = Endpoint::new(0x81, TransferType::Interrupt, 8, 10);
        assert_eq!(ep.number(), 1);
        assert!(ep.is_in());
        assert_eq!(ep.doorbell_endpoint_id(), 3);
    }

    #[test]
    fn doorbell_id_for_bulk_out_endpoint() {
        let ep = Endpoint::new(0x02, TransferType::Bulk, 512, 0);
        assert!(!ep.is_in());
        assert_eq!(ep.doorbell_endpoint_id(), 4);
    }

    #[test]
    fn data_toggle_flips() {
        let mut ep = Endpoint::CONTROL_EP0;
        assert!(!ep.data_toggle());
        ep.toggle_data();
        assert!(ep.data_toggle());
        ep.reset_data_toggle();
        assert!(!ep.data_toggle());
    }
}
