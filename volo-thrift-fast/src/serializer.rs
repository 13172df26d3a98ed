//! One-shot helpers pairing a codec with an in-memory transport for
//! buffer↔struct conversion (spec.md §2 SerializerGlue), mirroring the
//! Go benchmark's direct use of `thrift.TSerializer`/`TDeserializer` in
//! `thrift_serializer_test.go`.
//!
//! This crate has no struct code generator, so callers drive the
//! encode/decode closure directly with field-level [`ThriftCodec`]
//! calls, exactly like the Go benchmark's hand-written `EchoReq`/
//! `EchoResp` read/write methods.

use std::io::Cursor;

use crate::{
    codec::{buffered::BufferedCodec, framed::FramedCodec, ThriftCodec},
    config::CodecConfig,
    error::Result,
};

/// Pairs a codec with an in-memory `Cursor<Vec<u8>>` transport for one-shot
/// buffer-to-struct encoding.
///
/// Generic over any [`ThriftCodec`] `C` so the same glue code can target
/// either [`FramedCodec`] or [`BufferedCodec`]; [`serialize`]/[`deserialize`]
/// below are the `FramedCodec`-flavored convenience constructors most
/// callers want.
pub struct Serializer<C> {
    codec: C,
}

impl Serializer<FramedCodec<Cursor<Vec<u8>>>> {
    pub fn framed(config: CodecConfig) -> Self {
        Self {
            codec: FramedCodec::new(Cursor::new(Vec::new()), config),
        }
    }
}

impl Serializer<BufferedCodec<Cursor<Vec<u8>>>> {
    pub fn buffered(config: CodecConfig) -> Self {
        Self {
            codec: BufferedCodec::new(Cursor::new(Vec::new()), config),
        }
    }
}

impl<C: ThriftCodec> Serializer<C> {
    /// Drives `write` (expected to call `write_message_begin`/struct field
    /// ops/`write_message_end`/`flush` in sequence, exactly as generated
    /// glue would) and hands back the codec for its caller-owned transport.
    pub fn write<F>(&mut self, write: F) -> Result<()>
    where
        F: FnOnce(&mut C) -> Result<()>,
    {
        write(&mut self.codec)
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }
}

/// Mirror of [`Serializer`] for the decode direction.
pub struct Deserializer<C> {
    codec: C,
}

impl Deserializer<FramedCodec<Cursor<Vec<u8>>>> {
    pub fn framed(config: CodecConfig, bytes: Vec<u8>) -> Self {
        Self {
            codec: FramedCodec::new(Cursor::new(bytes), config),
        }
    }
}

impl Deserializer<BufferedCodec<Cursor<Vec<u8>>>> {
    pub fn buffered(config: CodecConfig, bytes: Vec<u8>) -> Self {
        Self {
            codec: BufferedCodec::new(Cursor::new(bytes), config),
        }
    }
}

impl<C: ThriftCodec> Deserializer<C> {
    pub fn read<F, R>(&mut self, read: F) -> Result<R>
    where
        F: FnOnce(&mut C) -> Result<R>,
    {
        read(&mut self.codec)
    }
}

/// Encodes a message into a fresh byte buffer by driving `write` against
/// a [`FramedCodec`] backed by an in-memory `Cursor<Vec<u8>>`.
///
/// `write` is expected to call `write_message_begin`/struct field ops/
/// `write_message_end`/`flush` in sequence, exactly as generated glue
/// would. A thin wrapper over [`Serializer::framed`] for callers who don't
/// need to hold onto the codec between calls.
pub fn serialize<F>(config: CodecConfig, write: F) -> Result<Vec<u8>>
where
    F: FnOnce(&mut FramedCodec<Cursor<Vec<u8>>>) -> Result<()>,
{
    let mut ser = Serializer::framed(config);
    ser.write(write)?;
    Ok(ser.codec().transport().get_ref().clone())
}

/// Decodes a message out of `bytes` by driving `read` against a
/// [`FramedCodec`] backed by an in-memory `Cursor<Vec<u8>>` already
/// positioned at the start of `bytes`. A thin wrapper over
/// [`Deserializer::framed`].
pub fn deserialize<F, R>(config: CodecConfig, bytes: Vec<u8>, read: F) -> Result<R>
where
    F: FnOnce(&mut FramedCodec<Cursor<Vec<u8>>>) -> Result<R>,
{
    let mut de = Deserializer::framed(config, bytes);
    de.read(read)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        codec::ThriftCodec,
        types::{TMessageType, TType},
    };

    #[test]
    fn round_trips_a_message_through_serialize_and_deserialize() {
        let bytes = serialize(CodecConfig::default(), |c| {
            c.write_message_begin("Hi", TMessageType::Call, 7)?;
            c.write_struct_begin("")?;
            c.write_field_begin("", TType::I32, 1)?;
            c.write_i32(42)?;
            c.write_field_stop()?;
            c.write_struct_end()?;
            c.write_message_end()?;
            c.flush()
        })
        .unwrap();

        let (name, ty, seq, value) = deserialize(CodecConfig::default(), bytes, |c| {
            let (name, ty, seq) = c.read_message_begin()?;
            c.read_struct_begin()?;
            let (_, field_ty, id) = c.read_field_begin()?;
            assert_eq!(field_ty, TType::I32);
            assert_eq!(id, 1);
            let value = c.read_i32()?;
            let (_, stop_ty, _) = c.read_field_begin()?;
            assert_eq!(stop_ty, TType::Stop);
            c.read_struct_end()?;
            c.read_message_end()?;
            Ok((name, ty, seq, value))
        })
        .unwrap();

        assert_eq!(name, "Hi");
        assert_eq!(ty, TMessageType::Call);
        assert_eq!(seq, 7);
        assert_eq!(value, 42);
    }

    #[test]
    fn generic_serializer_targets_the_buffered_codec_too() {
        let mut ser = Serializer::buffered(CodecConfig::default());
        ser.write(|c| {
            c.write_field_begin("", TType::I32, 1)?;
            c.write_i32(9)?;
            c.write_field_stop()?;
            c.flush()
        })
        .unwrap();
        let bytes = ser.codec().transport().get_ref().clone();

        let mut de = Deserializer::buffered(CodecConfig::default(), bytes);
        let value = de
            .read(|c| {
                let (_, ty, id) = c.read_field_begin()?;
                assert_eq!(ty, TType::I32);
                assert_eq!(id, 1);
                let v = c.read_i32()?;
                let (_, stop_ty, _) = c.read_field_begin()?;
                assert_eq!(stop_ty, TType::Stop);
                Ok(v)
            })
            .unwrap();
        assert_eq!(value, 9);
    }
}
