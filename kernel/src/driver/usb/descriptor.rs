//! Standard descriptor parsing (USB 2.0 §9.6): device, configuration,
//! interface, endpoint, and HID descriptors, walked out of the raw bytes a
//! control transfer returns.

use alloc::vec::Vec;

use crate::driver::usb::endpoint::TransferType;
use crate::error::KernelError;
use crate::Result;

pub const DESCRIPTOR_TYPE_DEVICE: u8 = 1;
pub const DESCRIPTOR_TYPE_CONFIGURATION: u8 = 2;
pub const DESCRIPTOR_TYPE_INTERFACE: u8 = 4;
pub const DESCRIPTOR_TYPE_ENDPOINT: u8 = 5;
pub const DESCRIPTOR_TYPE_HID: u8 = 0x21;
pub const DESCRIPTOR_TYPE_HID_REPORT: u8 = 0x22;

#[derive(Debug, Copy, Clone)]
pub struct DeviceDescriptor {
    pub usb_version: u16,
    pub class: u8,
    pub subclass: u8,
    pub protocol: u8,
    pub max_packet_size_0: u8,
    pub vendor_id: u16,
    pub product_id: u16,
    pub num_configurations: u8,
}

impl DeviceDescriptor {
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < 18 || bytes[1] != DESCRIPTOR_TYPE_DEVICE {
            return Err(KernelError::ProtocolError);
        }
        Ok(Self {
            usb_version: u16::from_le_bytes([bytes[2], bytes[3]]),
            class: bytes[4],
            subclass: bytes[5],
            protocol: bytes[6],
            max_packet_size_0: bytes[7],
            vendor_id: u16::from_le_bytes([bytes[8], bytes[9]]),
            product_id: u16::from_le_bytes([bytes[10], bytes[11]]),
            num_configurations: bytes[17],
        })
    }
}

#[derive(Debug, Copy, Clone)]
pub struct ConfigurationDescriptor {
    pub total_length: u16,
    pub num_interfaces: u8,
    pub configuration_value: u8,
}

#[derive(Debug, Copy, Clone)]
pub struct InterfaceDescriptor {
    pub interface_number: u8,
    pub alternate_setting: u8,
    pub num_endpoints: u8,
    pub class: u8,
    pub subclass: u8,
    pub protocol: u8,
}

#[derive(Debug, Copy, Clone)]
pub struct EndpointDescriptor {
    pub address: u8,
    pub transfer_type: TransferType,
    pub max_packet_size: u16,
    pub interval: u8,
}

#[derive(Debug, Copy, Clone)]
pub struct HidDescriptor {
    pub hid_version: u16,
    pub country_code: u8,
    pub report_descriptor_length: u16,
}

/// One interface and the endpoints/HID descriptor that followed it in the
/// configuration descriptor's byte stream.
#[derive(Debug, Clone)]
pub struct InterfaceBundle {
    pub interface: InterfaceDescriptor,
    pub endpoints: Vec<EndpointDescriptor>,
    pub hid: Option<HidDescriptor>,
}

/// Walks a full configuration-descriptor blob (configuration descriptor
/// followed by interface/endpoint/class-specific descriptors back to back,
/// per §9.6's "set of descriptors" layout) and groups endpoints under their
/// owning interface.
pub fn parse_configuration(bytes: &[u8]) -> Result<(ConfigurationDescriptor, Vec<InterfaceBundle>)> {
    if bytes.len() < 9 || bytes[1] != DESCRIPTOR_TYPE_CONFIGURATION {
        return Err(KernelError::ProtocolError);
    }
    let config = ConfigurationDescriptor {
        total_length: u16::from_le_bytes([bytes[2], bytes[3]]),
        num_interfaces: bytes[4],
        configuration_value: bytes[5],
    };

    let mut interfaces = Vec::new();
    let mut offset = bytes[0] as usize;
    while offset + 2 <= bytes.len() {
        let length = bytes[offset] as usize;
        if length == 0 || offset + length > bytes.len() {
            break;
        }
        let desc_type = bytes[offset + 1];
        let body = &bytes[offset..offset + length];

        match desc_type {
            DESCRIPTOR_TYPE_INTERFACE if length >= 9 => {
                interfaces.push(InterfaceBundle {
                    interface: InterfaceDescriptor {
                        interface_number: body[2],
                        alternate_setting: body[3],
                        num_endpoints: body[4],
                        class: body[5],
                        subclass: body[6],
                        protocol: body[7],
                    },
                    endpoints: Vec::new(),
                    hid: None,
                });
            }
            DESCRIPTOR_TYPE_HID if length >= 9 => {
                if let Some(bundle) = interfaces.last_mut() {
                    bundle.hid = Some(HidDescriptor {
                        hid_version: u16::from_le_bytes([body[2], body[3]]),
                        country_code: body[4],
                        report_descriptor_length: u16::from_le_bytes([body[7], body[8]]),
                    });
                }
            }
            DESCRIPTOR_TYPE_ENDPOINT if length >= 7 => {
                let address = body[2];
                let attributes = body[3];
                let transfer_type = match attributes & 0x03 {
                    0 => TransferType::Control,
                    1 => TransferType::Isoch,
                    2 => TransferType::Bulk,
                    _ => TransferType::Interrupt,
                };
                let max_packet_size = u16::from_le_bytes([body[4], body[5]]) & 0x07ff;
                if let Some(bundle) = interfaces.last_mut() {
                    bundle.endpoints.push(EndpointDescriptor {
                        address,
                        transfer_type,
                        max_packet_size,
                        interval: body[6],
                    });
                }
            }
            _ => {}
        }

        offset += length;
    }

    Ok((config, interfaces))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_device_descriptor() -> [u8; 18] {
        let mut d = [0u8; 18];
        d[0] = 18;
        d[1] = DESCRIPTOR_TYPE_DEVICE;
        d[2..4].copy_from_slice(&0x0200u16.to_le_bytes());
        d[4] = 0;
        d[7] = 64;
        d[8..10].copy_from_slice(&0x046du16.to_le_bytes());
        d[10..12].copy_from_slice(&0xc52bu16.to_le_bytes());
        d[17] = 1;
        d
    }

    #[test]
    fn parses_device_descriptor() {
        let dd = DeviceDescriptor::parse(&sample_device_descriptor()).unwrap();
        assert_eq!(dd.usb_version, 0x0200);
        assert_eq!(dd.vendor_id, 0x046d);
        assert_eq!(dd.product_id, 0xc52b);
        assert_eq!(dd.max_packet_size_0, 64);
    }

    #[test]
    fn rejects_wrong_descriptor_type() {
        let mut d = sample_device_descriptor();
        d[1] = DESCRIPTOR_TYPE_CONFIGURATION;
        assert!(DeviceDescriptor::parse(&d).is_err());
    }

    #[test]
    fn parses_hid_keyboard_configuration() {
        #[rustfmt::skip]
        let bytes: &[u8] = &[
            9, DESCRIPTOR_TYPE_CONFIGURATION, 34, 0, 1, 1, 0, 0x80, 50,
            9, DESCRIPTOR_TYPE_INTERFACE, 0, 0, 1, 3, 1, 1, 0,
            9, DESCRIPTOR_TYPE_HID, 0x11, 1, 0, 1, 0x22, 65, 0,
            7, DESCRIPTOR_TYPE_ENDPOINT, 0x81, 0x03, 8, 0, 10,
        ];
        let (config, interfaces) = parse_configuration(bytes).unwrap();
        assert_eq!(config.num_interfaces, 1);
        assert_eq!(interfaces.len(), 1);
        let iface = &interfaces[0];
        assert_eq!(iface.interface.class, 3);
        assert_eq!(iface.interface.protocol, 1);
        assert!(iface.hid.is_some());
        assert_eq!(iface.hid.unwrap().report_descriptor_length, 65);
        assert_eq!(iface.endpoints.len(), 1);
        assert_eq!(iface.endpoints[0].transfer_type, TransferType::Interrupt);
        assert_eq!(iface.endpoints[0].max_packet_size, 8);
    }
}
