//! One-directional frame relay between the acquisition context and the
//! distribution context.
//!
//! The bridge is a typed fire-and-forget channel carrying [`FrameRelay`]
//! payloads. The sending side never blocks: acquisition must not stall
//! on a slow consumer, so a full channel drops the frame with a logged
//! notice. Exactly one subscriber drains the receiving side, observing
//! frames in emission order.

mod channel;

pub use channel::{frame_bridge, BridgeReceiver, BridgeSender, DEFAULT_BRIDGE_CAPACITY};
