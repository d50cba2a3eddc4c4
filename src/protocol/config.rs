//! Configuration answer (message 12533) decoder.

use std::collections::HashMap;

use crate::codec;
use crate::error::{Result, WireError};
use crate::model::{Circuit, Color, Configuration};

/// Decoded configuration answer: controller metadata plus the full circuit
/// catalog (with initial `state = 0`; status fills it in).
#[derive(Debug, Clone)]
pub struct ConfigurationAnswer {
    pub configuration: Configuration,
    pub circuits: Vec<Circuit>,
}

/// Decode the configuration answer payload (message 12533).
///
/// See the field table this mirrors byte-for-byte, including the circuit
/// loop's double read of the function byte: the gateway's own encoder
/// writes a name-index byte immediately before the real function byte, and
/// both are consumed here even though only the second is kept.
pub fn decode(payload: &[u8]) -> Result<ConfigurationAnswer> {
    let mut offset = 0usize;

    let controller_id = codec::read_u32(payload, offset);
    offset += 4;

    let min0 = codec::read_u8(payload, offset);
    offset += 1;
    let max0 = codec::read_u8(payload, offset);
    offset += 1;
    let min1 = codec::read_u8(payload, offset);
    offset += 1;
    let max1 = codec::read_u8(payload, offset);
    offset += 1;

    let is_celsius = codec::read_u8(payload, offset) != 0;
    offset += 1;
    let controller_type = codec::read_u8(payload, offset);
    offset += 1;
    let hardware_type = codec::read_u8(payload, offset);
    offset += 1;
    offset += 1; // controller buffer byte, discarded

    let equipment_flags = codec::read_i32(payload, offset);
    offset += 4;

    let (_generic_circuit_name, next) = codec::read_string(payload, offset);
    offset = next;

    let circuit_count = codec::read_u32(payload, offset);
    offset += 4;

    let mut circuits = Vec::with_capacity(circuit_count.min(256) as usize);
    for _ in 0..circuit_count {
        if offset >= payload.len() {
            return Err(WireError::decode(
                "ConfigurationAnswer",
                format!(
                    "circuit count {circuit_count} exceeds payload (stopped at offset {offset})"
                ),
            ));
        }

        let id = codec::read_i32(payload, offset);
        offset += 4;
        let (name, next) = codec::read_string(payload, offset);
        offset = next;

        // name-index byte, immediately overwritten below — preserved for
        // wire fidelity rather than collapsed to a single read.
        let _name_index = codec::read_u8(payload, offset);
        offset += 1;
        let function = codec::read_u8(payload, offset);
        offset += 1;

        let interface = codec::read_u8(payload, offset);
        offset += 1;
        let flags = codec::read_u8(payload, offset);
        offset += 1;
        let color_set = codec::read_u8(payload, offset);
        offset += 1;
        let color_position = codec::read_u8(payload, offset);
        offset += 1;
        let color_stagger = codec::read_u8(payload, offset);
        offset += 1;
        let device_id = codec::read_u8(payload, offset);
        offset += 1;
        let default_runtime = codec::read_u16(payload, offset);
        offset += 2;
        offset += 2; // padding

        circuits.push(Circuit {
            id,
            name,
            function,
            interface,
            flags,
            color_set,
            color_position,
            color_stagger,
            device_id,
            default_runtime,
            state: 0,
        });
    }

    let color_count = codec::read_u32(payload, offset);
    offset += 4;

    let mut colors = Vec::with_capacity(color_count.min(256) as usize);
    for _ in 0..color_count {
        if offset >= payload.len() {
            return Err(WireError::decode(
                "ConfigurationAnswer",
                format!("color count {color_count} exceeds payload (stopped at offset {offset})"),
            ));
        }
        let (name, next) = codec::read_string(payload, offset);
        offset = next;
        let r = codec::read_u32(payload, offset);
        offset += 4;
        let g = codec::read_u32(payload, offset);
        offset += 4;
        let b = codec::read_u32(payload, offset);
        offset += 4;
        colors.push(Color { name, r, g, b });
    }

    let mut pumps = HashMap::with_capacity(8);
    for slot in 0u8..8 {
        pumps.insert(slot, codec::read_u8(payload, offset));
        offset += 1;
    }

    let interface_tab_flags = codec::read_u32(payload, offset);
    offset += 4;
    let show_alarms = codec::read_u32(payload, offset);

    Ok(ConfigurationAnswer {
        configuration: Configuration {
            controller_id,
            min_set_point: [min0, min1],
            max_set_point: [max0, max1],
            is_celsius,
            controller_type,
            hardware_type,
            equipment_flags,
            circuit_count,
            colors,
            pumps,
            interface_tab_flags,
            show_alarms,
        },
        circuits,
    })
}
