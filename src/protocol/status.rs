//! Status answer (message 12527) decoder.

use crate::codec;
use crate::error::{Result, WireError};
use crate::model::{Body, BodyType, Chemistry};

/// Decoded status answer. Circuit states are returned as `(id, state)`
/// pairs rather than merged into the catalog here — merging, and deriving
/// sensors from this data, is the bridge's job (§4.6 rebuild policy), since
/// it is the only layer that holds the catalog and the temperature unit.
#[derive(Debug, Clone)]
pub struct StatusAnswer {
    pub air_temperature: i32,
    pub bodies: Vec<Body>,
    pub circuit_states: Vec<(i32, i32)>,
    pub chemistry: Chemistry,
}

/// Decode the status answer payload (message 12527).
pub fn decode(payload: &[u8]) -> Result<StatusAnswer> {
    let mut offset = 0usize;

    offset += 4; // ok flag, discarded
    offset += 8; // freeze mode, remotes, 3 delay counters, 3 reserved bytes

    let air_temperature = codec::read_i32(payload, offset);
    offset += 4;

    let mut bodies_count = codec::read_u32(payload, offset);
    offset += 4;
    if bodies_count > 2 {
        bodies_count = 2;
    }

    let mut bodies = Vec::with_capacity(bodies_count as usize);
    for _ in 0..bodies_count {
        if offset >= payload.len() {
            return Err(WireError::decode(
                "StatusAnswer",
                format!("bodies count exceeds payload (stopped at offset {offset})"),
            ));
        }
        let body_type = BodyType::from_wire(codec::read_u32(payload, offset));
        offset += 4;
        let current_temperature = codec::read_i32(payload, offset);
        offset += 4;
        let heat_status = codec::read_i32(payload, offset);
        offset += 4;
        let heat_set_point = codec::read_i32(payload, offset);
        offset += 4;
        let cool_set_point = codec::read_i32(payload, offset);
        offset += 4;
        let heat_mode = codec::read_i32(payload, offset);
        offset += 4;
        bodies.push(Body {
            body_type,
            current_temperature,
            heat_status,
            heat_set_point,
            cool_set_point,
            heat_mode,
        });
    }

    let circuit_count = codec::read_u32(payload, offset);
    offset += 4;

    let mut circuit_states = Vec::with_capacity(circuit_count.min(256) as usize);
    for _ in 0..circuit_count {
        if offset >= payload.len() {
            return Err(WireError::decode(
                "StatusAnswer",
                format!("circuit count {circuit_count} exceeds payload (stopped at offset {offset})"),
            ));
        }
        let id = codec::read_u32(payload, offset) as i32;
        offset += 4;
        let state = codec::read_u32(payload, offset) as i32;
        offset += 4;
        offset += 4; // color_set, color_position, color_stagger, delay — discarded
        circuit_states.push((id, state));
    }

    let ph = codec::read_i32(payload, offset) as f64 / 100.0;
    offset += 4;
    let orp = codec::read_i32(payload, offset);
    offset += 4;
    let saturation = codec::read_i32(payload, offset) as f64 / 100.0;
    offset += 4;
    let salt_ppm = codec::read_i32(payload, offset);
    offset += 4;
    let ph_tank_level = codec::read_i32(payload, offset);
    offset += 4;
    let orp_tank_level = codec::read_i32(payload, offset);
    offset += 4;
    let alarms = codec::read_i32(payload, offset);

    Ok(StatusAnswer {
        air_temperature,
        bodies,
        circuit_states,
        chemistry: Chemistry {
            ph,
            orp,
            saturation,
            salt_ppm,
            ph_tank_level,
            orp_tank_level,
            alarms,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_payload() -> Vec<u8> {
        let mut buf = Vec::new();
        codec::write_u32(&mut buf, 1); // ok flag
        buf.extend_from_slice(&[0; 8]); // freeze/remotes/delays/reserved
        codec::write_i32(&mut buf, 78); // air temperature

        codec::write_u32(&mut buf, 2); // bodies_count
        // Pool
        codec::write_u32(&mut buf, 0);
        codec::write_i32(&mut buf, 80);
        codec::write_i32(&mut buf, 0);
        codec::write_i32(&mut buf, 85);
        codec::write_i32(&mut buf, 0);
        codec::write_i32(&mut buf, 3);
        // Spa
        codec::write_u32(&mut buf, 1);
        codec::write_i32(&mut buf, 102);
        codec::write_i32(&mut buf, 1);
        codec::write_i32(&mut buf, 100);
        codec::write_i32(&mut buf, 0);
        codec::write_i32(&mut buf, 3);

        codec::write_u32(&mut buf, 1); // circuit_count
        codec::write_u32(&mut buf, 500);
        codec::write_u32(&mut buf, 1);
        buf.extend_from_slice(&[0, 0, 0, 0]); // color bytes + delay

        codec::write_i32(&mut buf, 740); // ph * 100
        codec::write_i32(&mut buf, 650); // orp
        codec::write_i32(&mut buf, 12); // saturation * 100
        codec::write_i32(&mut buf, 3200); // salt ppm
        codec::write_i32(&mut buf, 4); // ph tank
        codec::write_i32(&mut buf, 5); // orp tank
        codec::write_i32(&mut buf, 0); // alarms
        buf
    }

    #[test]
    fn decodes_full_status() {
        let answer = decode(&sample_payload()).unwrap();
        assert_eq!(answer.air_temperature, 78);
        assert_eq!(answer.bodies.len(), 2);
        assert_eq!(answer.bodies[1].body_type, BodyType::Spa);
        assert_eq!(answer.bodies[1].current_temperature, 102);
        assert_eq!(answer.circuit_states, vec![(500, 1)]);
        assert!((answer.chemistry.ph - 7.4).abs() < 1e-9);
        assert!((answer.chemistry.saturation - 0.12).abs() < 1e-9);
    }

    #[test]
    fn bodies_count_clamped_to_two() {
        let mut buf = Vec::new();
        codec::write_u32(&mut buf, 1);
        buf.extend_from_slice(&[0; 8]);
        codec::write_i32(&mut buf, 0);
        codec::write_u32(&mut buf, 9); // implausible bodies_count
        // only provide data for 2 bodies worth of space afterward, then zeros
        buf.extend_from_slice(&[0; 24]);
        buf.extend_from_slice(&[0; 24]);
        codec::write_u32(&mut buf, 0); // circuit_count
        buf.extend_from_slice(&[0; 28]); // chemistry
        let answer = decode(&buf).unwrap();
        assert_eq!(answer.bodies.len(), 2);
    }
}
