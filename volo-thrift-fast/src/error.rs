//! Error kinds produced by the codecs in this crate.

use std::io;

/// The kind of failure a codec operation can report.
///
/// These map one-to-one onto the error taxonomy of the Thrift binary
/// protocol implementation this crate generalizes: a strict/lax version
/// mismatch, an out-of-range declared length, an oversized frame, a
/// transport that hit EOF early, or a transport that kept returning short
/// reads/writes until the retry budget ran out.
#[derive(Debug, thiserror::Error)]
pub enum CodecErrorKind {
    #[error("bad version in message header")]
    BadVersion,
    #[error("invalid data length: {0}")]
    InvalidDataLength(i64),
    #[error("declared length {0} exceeds safe buffer size limit {1}")]
    SafeBufferError(usize, usize),
    #[error("frame size {0} exceeds max frame length {1}")]
    FrameSizeError(usize, usize),
    #[error("unexpected EOF from transport")]
    UnexpectedEof,
    #[error("read count error: transport exhausted its attempt budget")]
    ReadCountError,
    #[error("write count error: transport exhausted its attempt budget")]
    WriteCountError,
    #[error("transport error: {0}")]
    TransportError(#[source] io::Error),
}

/// An error produced while encoding or decoding a message.
///
/// A codec that returns a `CodecError` is left in a broken state: per
/// spec, it must not be reused until [`reset`](crate::codec) is called
/// explicitly.
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct CodecError(#[from] pub CodecErrorKind);

impl CodecError {
    pub fn kind(&self) -> &CodecErrorKind {
        &self.0
    }

    pub(crate) fn invalid_data_length(len: i64) -> Self {
        Self(CodecErrorKind::InvalidDataLength(len))
    }

    pub(crate) fn safe_buffer(len: usize, limit: usize) -> Self {
        Self(CodecErrorKind::SafeBufferError(len, limit))
    }

    pub(crate) fn frame_size(len: usize, limit: usize) -> Self {
        Self(CodecErrorKind::FrameSizeError(len, limit))
    }
}

impl From<io::Error> for CodecError {
    fn from(e: io::Error) -> Self {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            CodecErrorKind::UnexpectedEof.into()
        } else {
            CodecErrorKind::TransportError(e).into()
        }
    }
}

pub type Result<T> = std::result::Result<T, CodecError>;
