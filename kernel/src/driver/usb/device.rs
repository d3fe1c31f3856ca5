//! USB device data model (§3): everything the core tracks about one
//! attached device, from first port-reset through configured operation.

use alloc::sync::{Arc, Weak};
use alloc::vec::Vec;

use spin::Mutex;

use crate::driver::usb::controller::HostController;
use crate::driver::usb::endpoint::Endpoint;
use crate::driver::usb::speed::Speed;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum DeviceState {
    Disconnected,
    Default,
    Address,
    Configured,
    Suspended,
}

/// Controller-assigned slot id, root-hub port, and whatever address the
/// core has handed out — `None` until Set-Address completes.
pub struct Device {
    slot_id: u8,
    port: usize,
    speed: Speed,
    address: Option<u8>,
    state: DeviceState,
    parent: Option<Weak<Mutex<Device>>>,
    host: Arc<dyn HostController>,
    vendor_id: u16,
    product_id: u16,
    class: u8,
    subclass: u8,
    protocol: u8,
    endpoints: Vec<Endpoint>,
    driver_data: Option<alloc::boxed::Box<dyn core::any::Any + Send>>,
}

impl core::fmt::Debug for Device {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Device")
            .field("slot_id", &self.slot_id)
            .field("port", &self.port)
            .field("speed", &self.speed)
            .field("address", &self.address)
            .field("state", &self.state)
            .field("vendor_id", &self.vendor_id)
            .field("product_id", &self.product_id)
            .field("class", &self.class)
            .field("subclass", &self.subclass)
            .field("protocol", &self.protocol)
            .field("endpoints", &self.endpoints.len())
            .finish()
    }
}

impl Device {
    pub fn new(
        slot_id: u8,
        port: usize,
        speed: Speed,
        parent: Option<Weak<Mutex<Device>>>,
        host: Arc<dyn HostController>,
    ) -> Self {
        Self {
            slot_id,
            port,
            speed,
            address: None,
            state: DeviceState::Default,
            parent,
            host,
            vendor_id: 0,
            product_id: 0,
            class: 0,
            subclass: 0,
            protocol: 0,
            endpoints: alloc::vec![Endpoint::CONTROL_EP0],
            driver_data: None,
        }
    }

    pub fn slot_id(&self) -> u8 {
        self.slot_id
    }

    pub fn port(&self) -> usize {
        self.port
    }

    pub fn speed(&self) -> Speed {
        self.speed
    }

    pub fn address(&self) -> Option<u8> {
        self.address
    }

    pub fn set_address(&mut self, address: u8) {
        assert!(address <= 127, "usb device addresses are 7 bits wide");
        self.address = Some(address);
        self.state = DeviceState::Address;
    }

    pub fn state(&self) -> DeviceState {
        self.state
    }

    pub fn set_state(&mut self, state: DeviceState) {
        self.state = state;
    }

    pub fn parent(&self) -> Option<&Weak<Mutex<Device>>> {
        self.parent.as_ref()
    }

    pub fn host(&self) -> &Arc<dyn HostController> {
        &self.host
    }

    pub fn set_identity(&mut self, vendor_id: u16, product_id: u16) {
        self.vendor_id = vendor_id;
        self.product_id = product_id;
    }

    pub fn vendor_id(&self) -> u16 {
        self.vendor_id
    }

    pub fn product_id(&self) -> u16 {
        self.product_id
    }

    pub fn set_class(&mut self, class: u8, subclass: u8, protocol: u8) {
        self.class = class;
        self.subclass = subclass;
        self.protocol = protocol;
    }

    pub fn class(&self) -> u8 {
        self.class
    }

    pub fn subclass(&self) -> u8 {
        self.subclass
    }

    pub fn protocol(&self) -> u8 {
        self.protocol
    }

    pub fn endpoints(&self) -> &[Endpoint] {
        &self.endpoints
    }

    pub fn endpoint_0(&self) -> &Endpoint {
        &self.endpoints[0]
    }

    pub fn endpoint_0_mut(&mut self) -> &mut Endpoint {
        &mut self.endpoints[0]
    }

    /// Adds a non-control endpoint discovered during configuration parsing.
    /// The core caps a device at 32 endpoints total (EP0 plus 31 others,
    /// matching the xHCI device-context shape in §3).
    pub fn add_endpoint(&mut self, endpoint: Endpoint) {
        assert!(self.endpoints.len() < 32, "device already has the maximum number of endpoints");
        self.endpoints.push(endpoint);
    }

    pub fn endpoint_mut(&mut self, address: u8) -> Option<&mut Endpoint> {
        self.endpoints.iter_mut().find(|ep| ep.address() == address)
    }

    pub fn driver_data(&self) -> Option<&(dyn core::any::Any + Send)> {
        self.driver_data.as_deref()
    }

    pub fn set_driver_data(&mut self, data: alloc::boxed::Box<dyn core::any::Any + Send>) {
        self.driver_data = Some(data);
    }

    pub fn clear_driver_data(&mut self) {
        self.driver_data = None;
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::driver::usb::controller::{Direction, SetupPacket};
    use crate::driver::usb::endpoint::TransferType;

    /// A `HostController` that does nothing; stands in for a real
    /// controller in device/enumeration-level unit tests.
    pub(crate) struct NullHost;

    impl HostController for NullHost {
        fn init(&self) -> crate::Result<()> {
            Ok(())
        }

        fn port_count(&self) -> usize {
            0
        }

        fn reset_port(&self, _port: usize) -> crate::Result<Option<Speed>> {
            Ok(None)
        }

        fn enable_device(&self, _port: usize, _speed: Speed) -> crate::Result<u8> {
            Ok(1)
        }

        fn configure_endpoint(&self, _slot_id: u8, _endpoint: &Endpoint) -> crate::Result<()> {
            Ok(())
        }

        fn control_transfer(
            &self,
            _slot_id: u8,
            _setup: SetupPacket,
            _buf: &mut [u8],
        ) -> crate::Result<usize> {
            Ok(0)
        }

        fn transfer(
            &self,
            _slot_id: u8,
            _endpoint: &Endpoint,
            _direction: Direction,
            _buf: &mut [u8],
        ) -> crate::Result<usize> {
            Ok(0)
        }

        fn poll(&self) {}

        fn cleanup(&self, _slot_id: u8) -> crate::Result<()> {
            Ok(())
        }
    }

    fn null_host() -> Arc<dyn HostController> {
        Arc::new(NullHost)
    }

    #[test]
    fn new_device_starts_in_default_state_with_only_ep0() {
        let dev = Device::new(1, 2, Speed::HIGH_SPEED, None, null_host());
        assert_eq!(dev.state(), DeviceState::Default);
        assert_eq!(dev.address(), None);
        assert_eq!(dev.endpoints().len(), 1);
    }

    #[test]
    fn set_address_moves_to_address_state() {
        let mut dev = Device::new(1, 2, Speed::HIGH_SPEED, None, null_host());
        dev.set_address(5);
        assert_eq!(dev.address(), Some(5));
        assert_eq!(dev.state(), DeviceState::Address);
    }

    #[test]
    fn add_endpoint_is_findable_by_address() {
        let mut dev = Device::new(1, 2, Speed::HIGH_SPEED, None, null_host());
        dev.add_endpoint(Endpoint::new(0x81, TransferType::Interrupt, 8, 10));
        assert!(dev.endpoint_mut(0x81).is_some());
        assert!(dev.endpoint_mut(0x02).is_none());
    }

    #[test]
    #[should_panic]
    fn set_address_rejects_addresses_above_127() {
        let mut dev = Device::new(1, 2, Speed::HIGH_SPEED, None, null_host());
        dev.set_address(128);
    }
}
