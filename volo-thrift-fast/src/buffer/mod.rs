//! Buffer strategies backing the two codecs.
//!
//! [`frame::FrameBuffer`] serves [`crate::codec::framed::FramedCodec`];
//! [`stream::StreamBuffer`] serves
//! [`crate::codec::buffered::BufferedCodec`]. Growth and shrink policy
//! ([`grow`]) is shared between them.

pub(crate) mod frame;
pub(crate) mod grow;
pub(crate) mod stream;
