//! Display derivation.
//!
//! Pure functions mapping a telemetry snapshot (possibly absent or
//! partially populated) to concrete display values. Every lookup has an
//! explicit fallback; a missing domain, missing field, wrong-typed value
//! or `None` snapshot never faults. All numeric outputs are rounded to
//! the nearest integer for display.

use crate::snapshot::TelemetrySnapshot;

/// Number of shutdown-circuit interlock legs.
pub const SHUTDOWN_LEG_COUNT: usize = 12;

/// Leg index pairs whose joint health is displayed as one connector
/// segment on the diagnostic view: eight horizontal runs and three
/// vertical drops, in grid order.
pub const SEGMENTS: [(usize, usize); 11] = [
    (0, 1),
    (1, 2),
    (3, 4),
    (4, 5),
    (6, 7),
    (7, 8),
    (9, 10),
    (10, 11),
    (3, 6),
    (2, 5),
    (8, 11),
];

/// Ordered health of the 12 shutdown-circuit legs.
///
/// Index `i` corresponds to `diagnostics_low.shutdown_leg{i+1}`. An
/// absent leg reads `false`: open/unknown is treated as unsafe, never
/// silently healthy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShutdownLegVector(pub [bool; SHUTDOWN_LEG_COUNT]);

impl ShutdownLegVector {
    pub fn get(&self, index: usize) -> bool {
        self.0.get(index).copied().unwrap_or(false)
    }

    /// True only when every leg is closed.
    pub fn all_healthy(&self) -> bool {
        self.0.iter().all(|&leg| leg)
    }
}

impl Default for ShutdownLegVector {
    fn default() -> Self {
        Self([false; SHUTDOWN_LEG_COUNT])
    }
}

fn number_or_zero(snapshot: Option<&TelemetrySnapshot>, domain: &str, field: &str) -> f64 {
    snapshot
        .and_then(|s| s.number(domain, field))
        .unwrap_or(0.0)
}

/// Vehicle speed from the front-left wheel sensor. Falls back to 0.
pub fn speed(snapshot: Option<&TelemetrySnapshot>) -> i64 {
    number_or_zero(snapshot, "dynamics", "flw_speed").round() as i64
}

/// High-voltage pack state of charge. Falls back to 0.
pub fn pack_soc(snapshot: Option<&TelemetrySnapshot>) -> i64 {
    number_or_zero(snapshot, "pack", "hv_soc").round() as i64
}

/// Cell temperature: the pack average when reported, otherwise the
/// warmer of the top/bottom cell sensors. Falls back to 0.
pub fn cell_temp(snapshot: Option<&TelemetrySnapshot>) -> i64 {
    let temp = match snapshot.and_then(|s| s.number("pack", "avg_cell_temp")) {
        Some(avg) => avg,
        None => {
            let top = number_or_zero(snapshot, "pack", "cell_top_temp");
            let bottom = number_or_zero(snapshot, "pack", "cell_bottom_temp");
            top.max(bottom)
        }
    };
    temp.round() as i64
}

/// Power-draw gauge position, derived from the snapshot timestamp:
/// `(timestamp / 10) mod 100`. Falls back to 0.
pub fn draw_gauge(snapshot: Option<&TelemetrySnapshot>) -> i64 {
    match snapshot {
        // Wrapped again after rounding so 99.6..100.0 lands on 0, not 100
        Some(s) => ((s.timestamp / 10.0) % 100.0).round() as i64 % 100,
        None => 0,
    }
}

/// Shutdown-circuit leg health from `diagnostics_low.shutdown_leg1..12`.
///
/// Always returns exactly [`SHUTDOWN_LEG_COUNT`] entries regardless of
/// how many legs the snapshot reports.
pub fn shutdown_legs(snapshot: Option<&TelemetrySnapshot>) -> ShutdownLegVector {
    let mut legs = [false; SHUTDOWN_LEG_COUNT];
    if let Some(snap) = snapshot {
        for (i, leg) in legs.iter_mut().enumerate() {
            let field = format!("shutdown_leg{}", i + 1);
            *leg = snap.boolean("diagnostics_low", &field).unwrap_or(false);
        }
    }
    ShutdownLegVector(legs)
}

/// A connector segment is healthy iff both endpoint legs are closed.
///
/// Evaluated independently per segment and recomputed on every call,
/// never cached.
pub fn segment_healthy(legs: &ShutdownLegVector, a: usize, b: usize) -> bool {
    legs.get(a) && legs.get(b)
}
