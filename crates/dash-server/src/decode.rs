//! Frame decode map.
//!
//! Maps arbitration identifiers to the telemetry fields they carry.
//! Multi-byte values are little-endian; scale factors convert raw counts
//! to engineering units. Payloads shorter than a field's byte range skip
//! that field rather than erroring, and unknown identifiers decode to
//! nothing.

use serde_json::{json, Value};

/// A decoded field: `(domain, field, value)`.
pub type DecodedField = (&'static str, &'static str, Value);

fn u16_le(data: &[u8], at: usize) -> Option<f64> {
    let bytes: [u8; 2] = data.get(at..at + 2)?.try_into().ok()?;
    Some(u16::from_le_bytes(bytes) as f64)
}

fn i16_le(data: &[u8], at: usize) -> Option<f64> {
    let bytes: [u8; 2] = data.get(at..at + 2)?.try_into().ok()?;
    Some(i16::from_le_bytes(bytes) as f64)
}

fn i8_at(data: &[u8], at: usize) -> Option<f64> {
    data.get(at).map(|&b| b as i8 as f64)
}

fn flag(data: &[u8], at: usize) -> Option<bool> {
    data.get(at).map(|&b| b != 0)
}

fn push_num(out: &mut Vec<DecodedField>, domain: &'static str, field: &'static str, v: Option<f64>) {
    if let Some(v) = v {
        out.push((domain, field, json!(v)));
    }
}

fn push_flag(
    out: &mut Vec<DecodedField>,
    domain: &'static str,
    field: &'static str,
    v: Option<bool>,
) {
    if let Some(v) = v {
        out.push((domain, field, json!(v)));
    }
}

/// Decode one frame into the telemetry fields it carries.
pub fn decode_frame(id: u32, data: &[u8]) -> Vec<DecodedField> {
    let mut out = Vec::new();
    match id {
        // Wheel speed sensors, one corner per identifier
        0x406 => push_num(&mut out, "dynamics", "flw_speed", i16_le(data, 0).map(|v| v * 0.01)),
        0x407 => push_num(&mut out, "dynamics", "frw_speed", i16_le(data, 0).map(|v| v * 0.01)),
        0x408 => push_num(&mut out, "dynamics", "blw_speed", i16_le(data, 0).map(|v| v * 0.01)),
        0x409 => push_num(&mut out, "dynamics", "brw_speed", i16_le(data, 0).map(|v| v * 0.01)),

        // High-voltage pack status
        0x200 => {
            push_num(&mut out, "pack", "hv_pack_v", u16_le(data, 0).map(|v| v * 0.01));
            push_num(&mut out, "pack", "hv_c", u16_le(data, 2).map(|v| v * 0.01));
            push_num(&mut out, "pack", "hv_soc", u16_le(data, 4).map(|v| v * 0.01));
        }

        // Low-voltage supply and cell aggregates
        0x203 => {
            push_num(&mut out, "pack", "lv_v", u16_le(data, 0).map(|v| v * 0.01));
            push_num(&mut out, "pack", "lv_c", u16_le(data, 2).map(|v| v * 0.01));
            push_num(&mut out, "pack", "avg_cell_v", u16_le(data, 5).map(|v| v * 0.001));
            push_num(&mut out, "pack", "avg_cell_temp", i8_at(data, 7).map(|v| v * 0.1));
        }

        // Cell stack endpoint temperatures
        0x206 => {
            push_num(&mut out, "pack", "cell_top_temp", i16_le(data, 0).map(|v| v * 0.1));
            push_num(&mut out, "pack", "cell_bottom_temp", i16_le(data, 2).map(|v| v * 0.1));
        }

        // Shutdown circuit, first interlock group
        0x202 => {
            push_flag(&mut out, "diagnostics_low", "bmb_comm_error", flag(data, 0));
            push_flag(&mut out, "diagnostics_low", "imd_gnd_isolation_error", flag(data, 1));
            push_flag(&mut out, "diagnostics_low", "shutdown_leg1", flag(data, 2));
            push_flag(&mut out, "diagnostics_low", "shutdown_leg2", flag(data, 3));
            push_flag(&mut out, "diagnostics_low", "shutdown_leg3", flag(data, 4));
            push_flag(&mut out, "diagnostics_low", "shutdown_leg4", flag(data, 5));
        }

        // Shutdown circuit, second interlock group
        0x207 => {
            push_flag(&mut out, "diagnostics_low", "shutdown_leg5", flag(data, 0));
            push_flag(&mut out, "diagnostics_low", "shutdown_leg6", flag(data, 1));
            push_flag(&mut out, "diagnostics_low", "shutdown_leg7", flag(data, 2));
            push_flag(&mut out, "diagnostics_low", "shutdown_leg8", flag(data, 3));
            push_flag(&mut out, "diagnostics_low", "shutdown_leg9", flag(data, 4));
            push_flag(&mut out, "diagnostics_low", "shutdown_leg10", flag(data, 5));
            push_flag(&mut out, "diagnostics_low", "shutdown_leg11", flag(data, 6));
            push_flag(&mut out, "diagnostics_low", "shutdown_leg12", flag(data, 7));
        }

        // Legacy mapping for shutdown_leg1
        0x6CA => push_flag(&mut out, "diagnostics_low", "shutdown_leg1", flag(data, 0)),

        _ => {}
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wheel_speed_scaling() {
        // 4170 * 0.01 = 41.7
        let raw = 4170i16.to_le_bytes();
        let fields = decode_frame(0x406, &[raw[0], raw[1]]);
        assert_eq!(fields.len(), 1);
        let (domain, field, value) = &fields[0];
        assert_eq!(*domain, "dynamics");
        assert_eq!(*field, "flw_speed");
        assert!((value.as_f64().unwrap() - 41.7).abs() < 1e-9);
    }

    #[test]
    fn test_pack_status_decodes_all_fields() {
        // pack_v at 0:2, current at 2:4, soc at 4:6, all u16 LE * 0.01
        let data = [0x10, 0x27, 0xE8, 0x03, 0x34, 0x12];
        let fields = decode_frame(0x200, &data);
        assert_eq!(fields.len(), 3);
        let value = |name: &str| {
            fields
                .iter()
                .find(|(_, f, _)| *f == name)
                .map(|(_, _, v)| v.as_f64().unwrap())
                .unwrap()
        };
        assert!((value("hv_pack_v") - 100.0).abs() < 1e-9);
        assert!((value("hv_c") - 10.0).abs() < 1e-9);
        assert!((value("hv_soc") - 46.6).abs() < 1e-9);
    }

    #[test]
    fn test_shutdown_legs_from_flag_bytes() {
        let fields = decode_frame(0x202, &[0, 0, 1, 0, 1, 0]);
        let leg = |name: &str| {
            fields
                .iter()
                .find(|(_, f, _)| *f == name)
                .map(|(_, _, v)| v.as_bool().unwrap())
                .unwrap()
        };
        assert!(leg("shutdown_leg1"));
        assert!(!leg("shutdown_leg2"));
        assert!(leg("shutdown_leg3"));
        assert!(!leg("shutdown_leg4"));
    }

    #[test]
    fn test_short_payload_skips_fields() {
        // Only the first two of three pack fields fit
        let fields = decode_frame(0x200, &[0x10, 0x27, 0x00, 0x01]);
        assert_eq!(fields.len(), 2);
        // Empty payload decodes nothing
        assert!(decode_frame(0x202, &[]).is_empty());
    }

    #[test]
    fn test_unknown_identifier_decodes_nothing() {
        assert!(decode_frame(0x7FF, &[1, 2, 3, 4]).is_empty());
    }

    #[test]
    fn test_negative_cell_temp() {
        // -50 counts * 0.1 = -5.0 degrees
        let fields = decode_frame(0x203, &[0, 0, 0, 0, 0, 0, 0, (-50i8) as u8]);
        let temp = fields
            .iter()
            .find(|(_, f, _)| *f == "avg_cell_temp")
            .map(|(_, _, v)| v.as_f64().unwrap())
            .unwrap();
        assert!((temp + 5.0).abs() < 1e-9);
    }
}
