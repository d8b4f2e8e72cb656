//! Snapshot assembly.
//!
//! Folds decoded relay frames into the current nested telemetry
//! document. The assembler owns the only mutable copy; published
//! snapshots are stamped with a monotone id and a monotonic-clock
//! timestamp at publication and handed out by value, so a snapshot is
//! never mutated after it leaves the server.

use crate::decode::decode_frame;
use dash_core::{FrameRelay, TelemetrySnapshot};
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::{debug, trace};

/// Accumulates decoded telemetry between publications.
pub struct SnapshotAssembler {
    data: BTreeMap<String, BTreeMap<String, Value>>,
    next_id: i64,
    epoch: Instant,
}

impl SnapshotAssembler {
    pub fn new() -> Self {
        Self {
            data: BTreeMap::new(),
            next_id: 0,
            epoch: Instant::now(),
        }
    }

    /// Fold one relayed frame into the document.
    ///
    /// Malformed relay messages and unknown identifiers are dropped with
    /// a log line; neither disturbs the accumulated state.
    pub fn apply(&mut self, relay: &FrameRelay) {
        let (id, data) = match relay.decode() {
            Ok(decoded) => decoded,
            Err(e) => {
                debug!(error = %e, "Dropping malformed relay message");
                return;
            }
        };
        let fields = decode_frame(id, &data);
        if fields.is_empty() {
            trace!(id, "No mapped fields for frame");
            return;
        }
        for (domain, field, value) in fields {
            self.data
                .entry(domain.to_string())
                .or_default()
                .insert(field.to_string(), value);
        }
    }

    /// Stamp and emit the current document as a snapshot.
    pub fn snapshot(&mut self) -> TelemetrySnapshot {
        let id = self.next_id;
        self.next_id += 1;
        TelemetrySnapshot {
            id,
            timestamp: self.epoch.elapsed().as_secs_f64(),
            data: self.data.clone(),
        }
    }
}

impl Default for SnapshotAssembler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dash_core::BusFrame;

    fn relay(id: u32, data: Vec<u8>) -> FrameRelay {
        FrameRelay::from_frame(&BusFrame::new(id, data))
    }

    #[test]
    fn test_apply_folds_fields_into_domains() {
        let mut assembler = SnapshotAssembler::new();
        let raw = 4200i16.to_le_bytes();
        assembler.apply(&relay(0x406, vec![raw[0], raw[1]]));
        assembler.apply(&relay(0x202, vec![0, 0, 1, 1, 0, 0]));

        let snap = assembler.snapshot();
        assert!((snap.number("dynamics", "flw_speed").unwrap() - 42.0).abs() < 1e-9);
        assert_eq!(snap.boolean("diagnostics_low", "shutdown_leg1"), Some(true));
        assert_eq!(snap.boolean("diagnostics_low", "shutdown_leg3"), Some(false));
    }

    #[test]
    fn test_later_frames_supersede_fields() {
        let mut assembler = SnapshotAssembler::new();
        assembler.apply(&relay(0x202, vec![0, 0, 1, 0, 0, 0]));
        assembler.apply(&relay(0x202, vec![0, 0, 0, 0, 0, 0]));
        let snap = assembler.snapshot();
        assert_eq!(snap.boolean("diagnostics_low", "shutdown_leg1"), Some(false));
    }

    #[test]
    fn test_unknown_id_leaves_document_untouched() {
        let mut assembler = SnapshotAssembler::new();
        assembler.apply(&relay(0x7FF, vec![1, 2, 3]));
        assert!(assembler.snapshot().data.is_empty());
    }

    #[test]
    fn test_malformed_relay_is_dropped() {
        let mut assembler = SnapshotAssembler::new();
        assembler.apply(&FrameRelay {
            id: "junk".to_string(),
            data: "zz".to_string(),
        });
        assert!(assembler.snapshot().data.is_empty());
    }

    #[test]
    fn test_snapshot_ids_monotone_timestamps_nondecreasing() {
        let mut assembler = SnapshotAssembler::new();
        let a = assembler.snapshot();
        let b = assembler.snapshot();
        assert_eq!(b.id, a.id + 1);
        assert!(b.timestamp >= a.timestamp);
    }
}
