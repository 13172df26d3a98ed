//! The field-level read/write surface shared by both codecs (spec.md
//! §6, the "generated-glue" contract).
//!
//! [`ThriftCodec`] is the trait the (externally out-of-scope) generated
//! per-struct read/write glue would drive. It is deliberately not
//! object-safe-optimized for zero-copy: `read_string`/`read_binary`
//! return owned values here so the trait can be used generically by
//! [`crate::skip`] and [`crate::serializer`] regardless of which codec
//! backs it. [`framed::FramedCodec`] additionally exposes zero-copy
//! inherent methods (`read_str_ref`/`read_bin_ref`) for callers who want
//! the allocation-free fast path spec.md describes; the trait method
//! just copies out of that same fast path.

pub mod buffered;
pub mod framed;

use crate::{
    error::Result,
    types::{TMessageType, TType},
};

/// Default recursion depth used by [`crate::skip::skip`] when a codec's
/// `skip` method is invoked through the trait's default implementation.
pub const DEFAULT_SKIP_MAX_DEPTH: i32 = 64;

/// Encode/decode operations a generated struct's read/write glue drives
/// (spec.md §6).
pub trait ThriftCodec {
    fn write_message_begin(&mut self, name: &str, ty: TMessageType, seq: i32) -> Result<()>;
    fn write_message_end(&mut self) -> Result<()>;
    fn write_struct_begin(&mut self, name: &str) -> Result<()>;
    fn write_struct_end(&mut self) -> Result<()>;
    fn write_field_begin(&mut self, name: &str, ty: TType, id: i16) -> Result<()>;
    fn write_field_end(&mut self) -> Result<()>;
    fn write_field_stop(&mut self) -> Result<()>;
    fn write_map_begin(&mut self, key_ty: TType, val_ty: TType, n: i32) -> Result<()>;
    fn write_map_end(&mut self) -> Result<()>;
    fn write_list_begin(&mut self, elem_ty: TType, n: i32) -> Result<()>;
    fn write_list_end(&mut self) -> Result<()>;
    fn write_set_begin(&mut self, elem_ty: TType, n: i32) -> Result<()>;
    fn write_set_end(&mut self) -> Result<()>;
    fn write_bool(&mut self, v: bool) -> Result<()>;
    fn write_byte(&mut self, v: u8) -> Result<()>;
    fn write_i16(&mut self, v: i16) -> Result<()>;
    fn write_i32(&mut self, v: i32) -> Result<()>;
    fn write_i64(&mut self, v: i64) -> Result<()>;
    fn write_double(&mut self, v: f64) -> Result<()>;
    fn write_string(&mut self, v: &str) -> Result<()>;
    fn write_binary(&mut self, v: &[u8]) -> Result<()>;
    fn flush(&mut self) -> Result<()>;

    fn read_message_begin(&mut self) -> Result<(String, TMessageType, i32)>;
    fn read_message_end(&mut self) -> Result<()>;
    fn read_struct_begin(&mut self) -> Result<String>;
    fn read_struct_end(&mut self) -> Result<()>;
    fn read_field_begin(&mut self) -> Result<(String, TType, i16)>;
    fn read_field_end(&mut self) -> Result<()>;
    fn read_map_begin(&mut self) -> Result<(TType, TType, i32)>;
    fn read_map_end(&mut self) -> Result<()>;
    fn read_list_begin(&mut self) -> Result<(TType, i32)>;
    fn read_list_end(&mut self) -> Result<()>;
    fn read_set_begin(&mut self) -> Result<(TType, i32)>;
    fn read_set_end(&mut self) -> Result<()>;
    fn read_bool(&mut self) -> Result<bool>;
    fn read_byte(&mut self) -> Result<u8>;
    fn read_i16(&mut self) -> Result<i16>;
    fn read_i32(&mut self) -> Result<i32>;
    fn read_i64(&mut self) -> Result<i64>;
    fn read_double(&mut self) -> Result<f64>;
    fn read_string(&mut self) -> Result<String>;
    fn read_binary(&mut self) -> Result<Vec<u8>>;

    /// Discards an unknown field's value. Default implementation
    /// delegates to the generic recursive skipper in [`crate::skip`],
    /// driven entirely through this trait's other methods.
    fn skip(&mut self, ty: TType) -> Result<()>
    where
        Self: Sized,
    {
        crate::skip::skip(self, ty, DEFAULT_SKIP_MAX_DEPTH)
    }

    /// Returns the codec to a usable state after an error. Per spec.md
    /// §4.5/§7, a codec that has returned an error is unusable until this
    /// is called.
    fn reset(&mut self);
}
