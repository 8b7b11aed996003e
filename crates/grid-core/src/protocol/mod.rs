//! Protocol module containing the TLV frame codec, message tags, and the
//! session-layer helpers shared by both peers.

pub mod frame;
pub mod messages;
pub mod session;

pub use frame::{decode_frame, encode_frame, read_frame, write_frame, Frame, FrameError};
pub use messages::*;
pub use session::SessionError;
