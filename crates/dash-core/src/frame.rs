//! Bus frames and their relay wire form.

use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};

/// Maximum payload size of a classic bus frame.
pub const MAX_FRAME_BYTES: usize = 8;

/// A single addressed binary message from the instrumentation bus.
///
/// Frames are immutable once emitted: they are created per acquisition
/// tick or hardware interrupt, handed to the bridge for relay, then
/// discarded. No history is retained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusFrame {
    /// Arbitration identifier as reported by the bus.
    pub id: u32,
    /// Payload bytes, at most [`MAX_FRAME_BYTES`].
    pub data: Vec<u8>,
    /// Payload byte count, always equal to `data.len()`.
    pub len: u8,
}

impl BusFrame {
    /// Create a frame, truncating the payload to the bus maximum.
    pub fn new(id: u32, mut data: Vec<u8>) -> Self {
        data.truncate(MAX_FRAME_BYTES);
        let len = data.len() as u8;
        Self { id, data, len }
    }

    /// Create a frame, rejecting oversized payloads instead of truncating.
    pub fn try_new(id: u32, data: Vec<u8>) -> Result<Self> {
        if data.len() > MAX_FRAME_BYTES {
            return Err(CoreError::InvalidPayload(format!(
                "payload is {} bytes, bus maximum is {}",
                data.len(),
                MAX_FRAME_BYTES
            )));
        }
        Ok(Self::new(id, data))
    }
}

/// The wire form of a frame crossing the acquisition/distribution bridge.
///
/// Matches the relay message shape: a hex-prefixed identifier and the
/// payload as space-separated uppercase hex byte pairs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameRelay {
    /// Hex-prefixed identifier, e.g. `"0x202"`.
    pub id: String,
    /// Payload as hex byte pairs, e.g. `"DE AD BE EF"`. Empty for a
    /// zero-length payload.
    pub data: String,
}

impl FrameRelay {
    /// Encode a bus frame into its relay form.
    pub fn from_frame(frame: &BusFrame) -> Self {
        let data = frame
            .data
            .iter()
            .map(|b| format!("{b:02X}"))
            .collect::<Vec<_>>()
            .join(" ");
        Self {
            id: format!("{:#x}", frame.id),
            data,
        }
    }

    /// Decode the relay form back into identifier and payload bytes.
    ///
    /// Accepts both space-separated and concatenated hex byte pairs.
    pub fn decode(&self) -> Result<(u32, Vec<u8>)> {
        let id_str = self
            .id
            .strip_prefix("0x")
            .or_else(|| self.id.strip_prefix("0X"))
            .unwrap_or(&self.id);
        let id = u32::from_str_radix(id_str, 16)
            .map_err(|e| CoreError::InvalidRelay(format!("bad identifier {:?}: {e}", self.id)))?;

        let hex: String = self.data.split_whitespace().collect();
        // Byte-sliced below, so anything outside ASCII must bail here
        if !hex.is_ascii() {
            return Err(CoreError::InvalidRelay(format!(
                "non-hex payload {:?}",
                self.data
            )));
        }
        if hex.len() % 2 != 0 {
            return Err(CoreError::InvalidRelay(format!(
                "odd hex payload length in {:?}",
                self.data
            )));
        }
        let mut data = Vec::with_capacity(hex.len() / 2);
        for i in (0..hex.len()).step_by(2) {
            let byte = u8::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|e| CoreError::InvalidRelay(format!("bad hex byte: {e}")))?;
            data.push(byte);
        }
        if data.len() > MAX_FRAME_BYTES {
            return Err(CoreError::InvalidRelay(format!(
                "payload is {} bytes, bus maximum is {}",
                data.len(),
                MAX_FRAME_BYTES
            )));
        }
        Ok((id, data))
    }
}

impl From<&BusFrame> for FrameRelay {
    fn from(frame: &BusFrame) -> Self {
        Self::from_frame(frame)
    }
}
