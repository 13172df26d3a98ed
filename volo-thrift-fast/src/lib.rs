//! A low-allocation Thrift binary-protocol codec, wire-compatible with
//! the standard Apache Thrift binary protocol.
//!
//! Two codecs share the same field-level [`codec::ThriftCodec`] surface:
//!
//! - [`codec::framed::FramedCodec`] — a 4-byte length-prefixed frame,
//!   pre-read whole before field decoding begins; returns zero-copy
//!   string/binary borrows into the current frame.
//! - [`codec::buffered::BufferedCodec`] — no frame prefix, refills from
//!   the transport on demand, and bypasses its write buffer for large
//!   string/binary fields; returns owned copies.
//!
//! Both are generic over any `T: std::io::Read + std::io::Write`
//! transport (see [`transport`]) and share growth/shrink policy
//! ([`buffer::grow`]) and error taxonomy ([`error`]).
//!
//! Generated per-struct read/write glue (out of scope here, produced by
//! an external schema compiler) drives a codec through the
//! [`codec::ThriftCodec`] trait; [`skip::skip`] is the reference
//! unknown-field skipper that glue falls back on, and [`serializer`]
//! offers a one-shot buffer↔struct helper for tests and simple callers.

mod buffer;
pub mod byteops;
pub mod codec;
pub mod config;
pub mod error;
pub mod serializer;
pub mod skip;
pub mod transport;
pub mod types;

pub use codec::{buffered::BufferedCodec, framed::FramedCodec, ThriftCodec};
pub use config::CodecConfig;
pub use error::{CodecError, CodecErrorKind, Result};
pub use types::{TMessageType, TType};
