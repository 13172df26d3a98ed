//! Generic recursive skip, discarding an unknown field's value.
//!
//! Out of scope per spec.md §1 ("the traversal algorithm is a separate
//! utility"), but the codec still needs something behind
//! [`crate::codec::ThriftCodec::skip`] to hand to generated glue — this
//! is that utility, built only from [`ThriftCodec`]'s own public decode
//! ops, the same way the Go source's `Skip` methods delegate to
//! `thrift.SkipDefaultDepth(p, fieldType)`.

use crate::{
    codec::ThriftCodec,
    error::{CodecErrorKind, Result},
    types::TType,
};

/// Recursively discards the value of type `ty`, decrementing `max_depth`
/// on every nested struct/list/set/map so a malicious or corrupt stream
/// with unbounded nesting can't blow the stack.
pub fn skip<C: ThriftCodec>(codec: &mut C, ty: TType, max_depth: i32) -> Result<()> {
    if max_depth <= 0 {
        return Err(CodecErrorKind::InvalidDataLength(0).into());
    }
    match ty {
        TType::Bool => {
            codec.read_bool()?;
        }
        TType::Byte => {
            codec.read_byte()?;
        }
        TType::I16 => {
            codec.read_i16()?;
        }
        TType::I32 => {
            codec.read_i32()?;
        }
        TType::I64 => {
            codec.read_i64()?;
        }
        TType::Double => {
            codec.read_double()?;
        }
        TType::String => {
            codec.read_binary()?;
        }
        TType::Struct => {
            codec.read_struct_begin()?;
            loop {
                let (_, field_ty, _) = codec.read_field_begin()?;
                if field_ty == TType::Stop {
                    break;
                }
                skip(codec, field_ty, max_depth - 1)?;
                codec.read_field_end()?;
            }
            codec.read_struct_end()?;
        }
        TType::Map => {
            let (kt, vt, n) = codec.read_map_begin()?;
            for _ in 0..n {
                skip(codec, kt, max_depth - 1)?;
                skip(codec, vt, max_depth - 1)?;
            }
            codec.read_map_end()?;
        }
        TType::Set => {
            let (et, n) = codec.read_set_begin()?;
            for _ in 0..n {
                skip(codec, et, max_depth - 1)?;
            }
            codec.read_set_end()?;
        }
        TType::List => {
            let (et, n) = codec.read_list_begin()?;
            for _ in 0..n {
                skip(codec, et, max_depth - 1)?;
            }
            codec.read_list_end()?;
        }
        TType::Stop => {}
    }
    Ok(())
}
