pub mod protocol;
pub mod transport;

pub use protocol::{Frame, FrameHeader};
