//! HID report-descriptor item parser (§4.13, USB HID 1.11 §6.2.2).
//!
//! Short items only — long items (tag 0xfe) are recognized and skipped, per
//! the spec's silent-skip instruction; this device class never emits them
//! in practice.

use alloc::vec::Vec;

const STACK_DEPTH: usize = 16;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ReportType {
    Input,
    Output,
    Feature,
}

/// One Main-item field, recorded with enough global/local state to decode a
/// matching report byte later (§4.13).
#[derive(Debug, Clone, Copy)]
pub struct Field {
    pub usage_min: u32,
    pub usage_max: u32,
    pub logical_min: i32,
    pub logical_max: i32,
    pub size: u8,
    pub count: u8,
    pub bit_offset: u16,
    pub flags: u32,
    pub report_id: u8,
    pub report_type: ReportType,
}

#[derive(Debug, Clone, Copy, Default)]
struct GlobalState {
    usage_page: u32,
    logical_min: i32,
    logical_max: i32,
    physical_min: i32,
    physical_max: i32,
    unit_exponent: i32,
    unit: u32,
    report_size: u8,
    report_id: u8,
    report_count: u8,
}

#[derive(Debug, Clone, Default)]
struct LocalState {
    usages: Vec<u32>,
    usage_min: u32,
    usage_max: u32,
}

impl LocalState {
    fn reset(&mut self) {
        self.usages.clear();
        self.usage_min = 0;
        self.usage_max = 0;
    }
}

pub struct ReportDescriptor {
    pub fields: Vec<Field>,
}

impl ReportDescriptor {
    /// Computed size in bytes of the report for `report_id` and
    /// `report_type`: the maximum `bit_offset + size*count` over matching
    /// fields, rounded up to a byte (§4.13).
    pub fn report_size_bytes(&self, report_id: u8, report_type: ReportType) -> usize {
        let max_bits = self
            .fields
            .iter()
            .filter(|f| f.report_id == report_id && f.report_type == report_type)
            .map(|f| u32::from(f.bit_offset) + u32::from(f.size) * u32::from(f.count))
            .max()
            .unwrap_or(0);
        (max_bits as usize).div_ceil(8)
    }
}

/// Parses a full report descriptor, per §4.13: maintains the global-state
/// stack (Push/Pop) and collection stack (Collection/End-Collection), both
/// bounded to depth 16; emits one [`Field`] per Main item.
pub fn parse(bytes: &[u8]) -> ReportDescriptor {
    let mut global = GlobalState::default();
    let mut local = LocalState::default();
    let mut global_stack: Vec<GlobalState> = Vec::new();
    let mut collection_depth: usize = 0;
    let mut bit_offset = [0u16; 3]; // indexed by ReportType as 0/1/2
    let mut fields = Vec::new();

    let mut i = 0;
    while i < bytes.len() {
        let prefix = bytes[i];
        if prefix == 0xfe {
            // Long item: byte after prefix is a data-length byte, then a
            // tag byte, then that many data bytes.
            let data_len = *bytes.get(i + 1).unwrap_or(&0) as usize;
            i += 3 + data_len;
            continue;
        }

        let size_code = prefix & 0x03;
        let data_len = match size_code {
            0 => 0,
            1 => 1,
            2 => 2,
            _ => 4,
        };
        let tag = (prefix >> 4) & 0x0f;
        let item_type = (prefix >> 2) & 0x03;

        if i + 1 + data_len > bytes.len() {
            break;
        }
        let data = &bytes[i + 1..i + 1 + data_len];
        let value = read_item_data(data);

        match item_type {
            0 => handle_main(
                tag,
                value,
                &global,
                &mut local,
                &mut bit_offset,
                &mut fields,
            ),
            1 => handle_global(tag, value, &mut global, &mut global_stack),
            2 => handle_local(tag, value, &mut local),
            3 => {
                // reserved item type, ignore
            }
            _ => unreachable!(),
        }

        // Collection/End-Collection bookkeeping (main-item tags 0xa/0xc).
        if item_type == 0 {
            match tag {
                0xa => collection_depth = (collection_depth + 1).min(STACK_DEPTH),
                0xc => collection_depth = collection_depth.saturating_sub(1),
                _ => {}
            }
        }

        i += 1 + data_len;
    }

    let _ = collection_depth;
    ReportDescriptor { fields }
}

fn read_item_data(data: &[u8]) -> i64 {
    match data.len() {
        0 => 0,
        1 => i64::from(data[0] as i8),
        2 => i64::from(i16::from_le_bytes([data[0], data[1]])),
        4 => i64::from(i32::from_le_bytes([data[0], data[1], data[2], data[3]])),
        _ => 0,
    }
}

fn read_item_data_unsigned(data: &[u8]) -> u32 {
    match data.len() {
        0 => 0,
        1 => u32::from(data[0]),
        2 => u32::from(u16::from_le_bytes([data[0], data[1]])),
        4 => u32::from_le_bytes([data[0], data[1], data[2], data[3]]),
        _ => 0,
    }
}

fn handle_global(tag: u8, value: i64, global: &mut GlobalState, stack: &mut Vec<GlobalState>) {
    match tag {
        0x0 => global.usage_page = value as u32,
        0x1 => global.logical_min = value as i32,
        0x2 => global.logical_max = value as i32,
        0x3 => global.physical_min = value as i32,
        0x4 => global.physical_max = value as i32,
        0x5 => global.unit_exponent = value as i32,
        0x6 => global.unit = value as u32,
        0x7 => global.report_size = value as u8,
        0x8 => global.report_id = value as u8,
        0x9 => global.report_count = value as u8,
        0xa => {
            // Push
            if stack.len() < STACK_DEPTH {
                stack.push(*global);
            }
        }
        0xb => {
            // Pop
            if let Some(restored) = stack.pop() {
                *global = restored;
            }
        }
        _ => {}
    }
}

fn handle_local(tag: u8, value: i64, local: &mut LocalState) {
    match tag {
        0x0 => local.usages.push(value as u32),
        0x1 => local.usage_min = value as u32,
        0x2 => local.usage_max = value as u32,
        _ => {}
    }
}

fn handle_main(
    tag: u8,
    value: i64,
    global: &GlobalState,
    local: &mut LocalState,
    bit_offset: &mut [u16; 3],
    fields: &mut Vec<Field>,
) {
    let report_type = match tag {
        0x8 => Some(ReportType::Input),
        0x9 => Some(ReportType::Output),
        0xb => Some(ReportType::Feature),
        _ => None,
    };

    if let Some(report_type) = report_type {
        let flags = read_item_data_unsigned(&value.to_le_bytes()[..1]);
        let (usage_min, usage_max) = if !local.usages.is_empty() {
            let first = local.usages[0];
            (first, first)
        } else {
            (local.usage_min, local.usage_max)
        };

        let idx = report_type as usize;
        let field = Field {
            usage_min,
            usage_max,
            logical_min: global.logical_min,
            logical_max: global.logical_max,
            size: global.report_size,
            count: global.report_count,
            bit_offset: bit_offset[idx],
            flags,
            report_id: global.report_id,
            report_type,
        };
        bit_offset[idx] += u16::from(global.report_size) * u16::from(global.report_count);
        fields.push(field);
        local.reset();
    }
    // Collection/End-Collection (tags 0xa/0xc) carry no field of their own.
}

#[cfg(test)]
mod tests {
    use super::*;

    /// §8 scenario S6: UsagePage=GenDesk, Usage=Mouse, Collection=App, Push,
    /// ReportSize=8, ReportCount=2, Input(data,var,abs), Pop, EndCollection.
    #[test]
    fn push_pop_restores_prior_global_state() {
        #[rustfmt::skip]
        let bytes: &[u8] = &[
            0x05, 0x01, // Usage Page (Generic Desktop)
            0x09, 0x02, // Usage (Mouse)
            0xa1, 0x01, // Collection (Application)
            0xa4,       // Push
            0x75, 0x08, // Report Size 8
            0x95, 0x02, // Report Count 2
            0x81, 0x02, // Input (Data, Var, Abs)
            0xb4,       // Pop
            0xc0,       // End Collection
        ];
        let descriptor = parse(bytes);
        assert_eq!(descriptor.fields.len(), 1);
        let field = descriptor.fields[0];
        assert_eq!(field.size, 8);
        assert_eq!(field.count, 2);
        assert_eq!(field.bit_offset, 0);
        assert_eq!(field.report_type, ReportType::Input);

        // after Pop, global report-size/count must have reverted to zero
        let empty_size = descriptor.report_size_bytes(0, ReportType::Feature);
        assert_eq!(empty_size, 0);
    }

    #[test]
    fn report_size_rounds_up_to_whole_bytes() {
        #[rustfmt::skip]
        let bytes: &[u8] = &[
            0x75, 0x01, // Report Size 1
            0x95, 0x0a, // Report Count 10
            0x81, 0x02, // Input
        ];
        let descriptor = parse(bytes);
        assert_eq!(descriptor.report_size_bytes(0, ReportType::Input), 2);
    }

    #[test]
    fn long_items_are_skipped() {
        let bytes: &[u8] = &[0xfe, 0x02, 0x00, 0xaa, 0xbb, 0x75, 0x08];
        let descriptor = parse(bytes);
        assert!(descriptor.fields.is_empty());
    }
}
