//! The framed codec: a 4-byte big-endian length prefix followed by a
//! complete serialized message, flushed once; the reader consumes the
//! entire frame before field decoding begins (spec.md §1, §4.4).
//!
//! Primitive reads borrow `&self` (see [`crate::buffer::frame::FrameReadBuffer`]):
//! the returned `&str`/`&[u8]` from [`FramedCodec::read_str_ref`]/
//! [`FramedCodec::read_bin_ref`] alias the current frame directly — no
//! copy — and the borrow checker refuses to compile a subsequent
//! `read_frame`/`reset` call while one is still held, which is exactly
//! the "valid until the next ReadFrame/Reset" lifetime spec.md asks for.

use std::io::{Read, Write};

use tracing::trace;

use super::ThriftCodec;
use crate::{
    buffer::frame::{FrameReadBuffer, FrameWriteBuffer},
    byteops,
    config::CodecConfig,
    error::{CodecError, CodecErrorKind, Result},
    types::{type_size, TMessageType, TType, VERSION_1, VERSION_MASK},
};

/// A framed Thrift binary-protocol codec over transport `T`.
///
/// `T` need only be `Read + Write`: that is the entire transport
/// contract spec.md §6 requires (short reads/writes and an EOF signal,
/// both of which `std::io` already models).
pub struct FramedCodec<T> {
    transport: T,
    config: CodecConfig,
    wbuf: FrameWriteBuffer,
    rbuf: FrameReadBuffer,
}

impl<T: Read + Write> FramedCodec<T> {
    pub fn new(transport: T, config: CodecConfig) -> Self {
        Self {
            wbuf: FrameWriteBuffer::new(config.write_buf_size),
            rbuf: FrameReadBuffer::new(config.read_buf_size),
            transport,
            config,
        }
    }

    /// Adopts caller-provided buffers (pool-borrow form). Per spec.md §9,
    /// the buffers' own capacities are authoritative; `config`'s buffer
    /// size fields are ignored for sizing (though still used for the
    /// other knobs: strictness, limits).
    pub fn from_shared_buffers(
        transport: T,
        config: CodecConfig,
        write_buf: Vec<u8>,
        read_buf: Vec<u8>,
    ) -> Self {
        Self {
            wbuf: FrameWriteBuffer::adopt(write_buf),
            rbuf: FrameReadBuffer::adopt(read_buf),
            transport,
            config,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    // ---- write side -----------------------------------------------

    fn ensure_write_capacity(&mut self, extra: usize) {
        self.wbuf.ensure_capacity(extra);
    }

    /// Writes `value` as an I32 without checking capacity: per spec.md
    /// §4.4, fixed-width primitive writes assume a prior field/list/map
    /// begin (or, for message headers, the initial buffer size) already
    /// reserved room for them. This mirrors the source exactly, down to
    /// the same latent assumption.
    fn write_i32_unchecked(&mut self, v: i32) {
        byteops::write_i32_be(&mut self.wbuf.buf, self.wbuf.rw_idx, v);
        self.wbuf.rw_idx += 4;
    }

    fn write_i16_unchecked(&mut self, v: i16) {
        byteops::write_i16_be(&mut self.wbuf.buf, self.wbuf.rw_idx, v);
        self.wbuf.rw_idx += 2;
    }

    fn write_i64_unchecked(&mut self, v: i64) {
        byteops::write_i64_be(&mut self.wbuf.buf, self.wbuf.rw_idx, v);
        self.wbuf.rw_idx += 8;
    }

    // ---- read side ---------------------------------------------------

    /// Pulls the next complete frame into the read buffer if the
    /// previous one has been fully consumed. Idempotent within a frame:
    /// if a frame is already loaded and `rw_idx < frame_size + 4`,
    /// returns immediately (spec.md §4.4). A fresh or just-reset buffer
    /// has `frame_size == 0`, which must NOT be mistaken for an
    /// already-loaded zero-length frame.
    pub fn read_frame(&mut self) -> Result<()> {
        if self.rbuf.frame_size() != 0 && self.rbuf.rw_idx() < self.rbuf.frame_size() + 4 {
            return Ok(());
        }
        self.rbuf.clear_cursor();

        // Bytes [0, 4) always hold the length prefix while reading it.
        self.rbuf.ensure_exact(4);
        let mut pos = 0;
        while pos < 4 {
            let n = self.transport.read(&mut self.rbuf.buf[pos..4])?;
            if n == 0 {
                return Err(CodecErrorKind::UnexpectedEof.into());
            }
            pos += n;
        }
        let frame_size = byteops::read_u32_be(&self.rbuf.buf, 0) as usize;
        if frame_size > self.config.max_frame_length {
            return Err(CodecError::frame_size(frame_size, self.config.max_frame_length));
        }
        self.rbuf.frame_size.set(frame_size);
        // Vec::resize keeps existing bytes (including the 4-byte prefix
        // just read) when growing, so there is nothing to re-lay here.
        self.rbuf.ensure_exact(frame_size + 4);

        let mut pos = 4;
        while pos < frame_size + 4 {
            let n = self.transport.read(&mut self.rbuf.buf[pos..frame_size + 4])?;
            if n == 0 {
                return Err(CodecErrorKind::UnexpectedEof.into());
            }
            pos += n;
        }
        self.rbuf.rw_idx.set(4);
        trace!(frame_size, "[fast-thrift] read frame");
        Ok(())
    }

    fn check_len(&self, len: i32) -> Result<usize> {
        if len < 0 {
            return Err(CodecError::invalid_data_length(len as i64));
        }
        let len = len as usize;
        if len > self.config.safe_buffer_size_lim {
            return Err(CodecError::safe_buffer(len, self.config.safe_buffer_size_lim));
        }
        Ok(len)
    }

    fn read_byte_raw(&self) -> u8 {
        let idx = self.rbuf.rw_idx();
        let b = self.rbuf.buf[idx];
        self.rbuf.advance(1);
        b
    }

    fn read_i16_raw(&self) -> i16 {
        let idx = self.rbuf.rw_idx();
        let v = byteops::read_i16_be(&self.rbuf.buf, idx);
        self.rbuf.advance(2);
        v
    }

    fn read_i32_raw(&self) -> i32 {
        let idx = self.rbuf.rw_idx();
        let v = byteops::read_i32_be(&self.rbuf.buf, idx);
        self.rbuf.advance(4);
        v
    }

    fn read_i64_raw(&self) -> i64 {
        let idx = self.rbuf.rw_idx();
        let v = byteops::read_i64_be(&self.rbuf.buf, idx);
        self.rbuf.advance(8);
        v
    }

    fn read_double_raw(&self) -> f64 {
        let idx = self.rbuf.rw_idx();
        let v = byteops::read_f64_be(&self.rbuf.buf, idx);
        self.rbuf.advance(8);
        v
    }

    /// Zero-copy string read: borrows directly out of the current frame.
    ///
    /// The binary protocol does not itself validate that string payloads
    /// are UTF-8; since every string this crate writes came from a Rust
    /// `&str` (always valid UTF-8), a well-formed peer's frames always
    /// decode cleanly here. Skipping validation mirrors the source's raw
    /// `bytes2str` reinterpret instead of adding a UTF-8 failure mode
    /// that has no corresponding error kind in spec.md §7.
    pub fn read_str_ref(&self) -> Result<&str> {
        let bytes = self.read_bin_ref()?;
        Ok(unsafe { std::str::from_utf8_unchecked(bytes) })
    }

    /// Zero-copy binary read: borrows directly out of the current frame.
    pub fn read_bin_ref(&self) -> Result<&[u8]> {
        let len = self.check_len(self.read_i32_raw())?;
        let idx = self.rbuf.rw_idx();
        let bytes = &self.rbuf.buf[idx..idx + len];
        self.rbuf.advance(len);
        Ok(bytes)
    }

    fn read_string_body_ref(&self, len: usize) -> Result<&str> {
        if len > self.config.safe_buffer_size_lim {
            return Err(CodecError::safe_buffer(len, self.config.safe_buffer_size_lim));
        }
        let idx = self.rbuf.rw_idx();
        let bytes = &self.rbuf.buf[idx..idx + len];
        self.rbuf.advance(len);
        Ok(unsafe { std::str::from_utf8_unchecked(bytes) })
    }
}

impl<T: Read + Write> ThriftCodec for FramedCodec<T> {
    fn write_message_begin(&mut self, name: &str, ty: TMessageType, seq: i32) -> Result<()> {
        if self.config.strict_write {
            let version = VERSION_1 | (ty as i32);
            self.write_i32_unchecked(version);
            self.write_string(name)?;
            self.write_i32(seq)?;
        } else {
            self.write_string(name)?;
            self.write_byte(ty as u8)?;
            self.write_i32(seq)?;
        }
        Ok(())
    }

    fn write_message_end(&mut self) -> Result<()> {
        Ok(())
    }

    fn write_struct_begin(&mut self, _name: &str) -> Result<()> {
        Ok(())
    }

    fn write_struct_end(&mut self) -> Result<()> {
        Ok(())
    }

    fn write_field_begin(&mut self, _name: &str, ty: TType, id: i16) -> Result<()> {
        self.ensure_write_capacity(3 + type_size(ty));
        let idx = self.wbuf.rw_idx;
        self.wbuf.buf[idx] = ty as u8;
        byteops::write_i16_be(&mut self.wbuf.buf, idx + 1, id);
        self.wbuf.rw_idx += 3;
        Ok(())
    }

    fn write_field_end(&mut self) -> Result<()> {
        Ok(())
    }

    fn write_field_stop(&mut self) -> Result<()> {
        self.write_byte(TType::Stop as u8)
    }

    fn write_map_begin(&mut self, key_ty: TType, val_ty: TType, n: i32) -> Result<()> {
        let val_size = (type_size(key_ty) + type_size(val_ty)) * n.max(0) as usize;
        self.ensure_write_capacity(6 + val_size);
        let idx = self.wbuf.rw_idx;
        self.wbuf.buf[idx] = key_ty as u8;
        self.wbuf.buf[idx + 1] = val_ty as u8;
        byteops::write_i32_be(&mut self.wbuf.buf, idx + 2, n);
        self.wbuf.rw_idx += 6;
        Ok(())
    }

    fn write_map_end(&mut self) -> Result<()> {
        Ok(())
    }

    fn write_list_begin(&mut self, elem_ty: TType, n: i32) -> Result<()> {
        let val_size = type_size(elem_ty) * n.max(0) as usize;
        self.ensure_write_capacity(5 + val_size);
        let idx = self.wbuf.rw_idx;
        self.wbuf.buf[idx] = elem_ty as u8;
        byteops::write_i32_be(&mut self.wbuf.buf, idx + 1, n);
        self.wbuf.rw_idx += 5;
        Ok(())
    }

    fn write_list_end(&mut self) -> Result<()> {
        Ok(())
    }

    fn write_set_begin(&mut self, elem_ty: TType, n: i32) -> Result<()> {
        self.write_list_begin(elem_ty, n)
    }

    fn write_set_end(&mut self) -> Result<()> {
        Ok(())
    }

    fn write_bool(&mut self, v: bool) -> Result<()> {
        self.write_byte(v as u8)
    }

    fn write_byte(&mut self, v: u8) -> Result<()> {
        self.ensure_write_capacity(1);
        let idx = self.wbuf.rw_idx;
        self.wbuf.buf[idx] = v;
        self.wbuf.rw_idx += 1;
        Ok(())
    }

    fn write_i16(&mut self, v: i16) -> Result<()> {
        self.write_i16_unchecked(v);
        Ok(())
    }

    fn write_i32(&mut self, v: i32) -> Result<()> {
        self.write_i32_unchecked(v);
        Ok(())
    }

    fn write_i64(&mut self, v: i64) -> Result<()> {
        self.write_i64_unchecked(v);
        Ok(())
    }

    fn write_double(&mut self, v: f64) -> Result<()> {
        byteops::write_f64_be(&mut self.wbuf.buf, self.wbuf.rw_idx, v);
        self.wbuf.rw_idx += 8;
        Ok(())
    }

    fn write_string(&mut self, v: &str) -> Result<()> {
        self.write_binary(v.as_bytes())
    }

    fn write_binary(&mut self, v: &[u8]) -> Result<()> {
        self.ensure_write_capacity(v.len() + 4);
        let idx = self.wbuf.rw_idx;
        byteops::write_i32_be(&mut self.wbuf.buf, idx, v.len() as i32);
        self.wbuf.buf[idx + 4..idx + 4 + v.len()].copy_from_slice(v);
        self.wbuf.rw_idx += 4 + v.len();
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        let frame_size = self.wbuf.rw_idx - 4;
        byteops::write_u32_be(&mut self.wbuf.buf, 0, frame_size as u32);
        let mut pos = 0;
        while pos < self.wbuf.rw_idx {
            let n = self.transport.write(&self.wbuf.buf[pos..self.wbuf.rw_idx])?;
            if n == 0 {
                return Err(CodecErrorKind::WriteCountError.into());
            }
            pos += n;
        }
        self.transport.flush()?;
        trace!(frame_size, "[fast-thrift] flushed frame");
        self.wbuf.reset();
        Ok(())
    }

    fn read_message_begin(&mut self) -> Result<(String, TMessageType, i32)> {
        self.read_frame()?;
        let raw = self.read_i32_raw();
        if raw < 0 {
            let type_byte = (raw & 0x0ff) as u8;
            let version = raw & VERSION_MASK;
            if version != VERSION_1 {
                return Err(CodecErrorKind::BadVersion.into());
            }
            let ty = TMessageType::from_byte(type_byte).ok_or(CodecErrorKind::BadVersion)?;
            let name = self.read_str_ref()?.to_owned();
            let seq = self.read_i32_raw();
            Ok((name, ty, seq))
        } else {
            if self.config.strict_read {
                return Err(CodecErrorKind::BadVersion.into());
            }
            // See spec.md §9 Open Questions: the lax branch trusts the
            // whole message is already in-frame and does not re-read.
            let name = self.read_string_body_ref(raw as usize)?.to_owned();
            let type_byte = self.read_byte_raw();
            let ty = TMessageType::from_byte(type_byte).ok_or(CodecErrorKind::BadVersion)?;
            let seq = self.read_i32_raw();
            Ok((name, ty, seq))
        }
    }

    fn read_message_end(&mut self) -> Result<()> {
        // Intentional asymmetry with BufferedCodec: see spec.md §9.
        Ok(())
    }

    fn read_struct_begin(&mut self) -> Result<String> {
        self.read_frame()?;
        Ok(String::new())
    }

    fn read_struct_end(&mut self) -> Result<()> {
        Ok(())
    }

    fn read_field_begin(&mut self) -> Result<(String, TType, i16)> {
        let t = self.read_byte_raw();
        let ty = TType::from_byte(t).unwrap_or(TType::Stop);
        let id = if ty == TType::Stop { 0 } else { self.read_i16_raw() };
        Ok((String::new(), ty, id))
    }

    fn read_field_end(&mut self) -> Result<()> {
        Ok(())
    }

    fn read_map_begin(&mut self) -> Result<(TType, TType, i32)> {
        let kt = TType::from_byte(self.read_byte_raw()).unwrap_or(TType::Stop);
        let vt = TType::from_byte(self.read_byte_raw()).unwrap_or(TType::Stop);
        let n = self.read_i32_raw();
        self.check_len(n)?;
        Ok((kt, vt, n))
    }

    fn read_map_end(&mut self) -> Result<()> {
        Ok(())
    }

    fn read_list_begin(&mut self) -> Result<(TType, i32)> {
        let et = TType::from_byte(self.read_byte_raw()).unwrap_or(TType::Stop);
        let n = self.read_i32_raw();
        self.check_len(n)?;
        Ok((et, n))
    }

    fn read_list_end(&mut self) -> Result<()> {
        Ok(())
    }

    fn read_set_begin(&mut self) -> Result<(TType, i32)> {
        self.read_list_begin()
    }

    fn read_set_end(&mut self) -> Result<()> {
        Ok(())
    }

    fn read_bool(&mut self) -> Result<bool> {
        Ok(self.read_byte_raw() == 1)
    }

    fn read_byte(&mut self) -> Result<u8> {
        Ok(self.read_byte_raw())
    }

    fn read_i16(&mut self) -> Result<i16> {
        Ok(self.read_i16_raw())
    }

    fn read_i32(&mut self) -> Result<i32> {
        Ok(self.read_i32_raw())
    }

    fn read_i64(&mut self) -> Result<i64> {
        Ok(self.read_i64_raw())
    }

    fn read_double(&mut self) -> Result<f64> {
        Ok(self.read_double_raw())
    }

    fn read_string(&mut self) -> Result<String> {
        Ok(self.read_str_ref()?.to_owned())
    }

    fn read_binary(&mut self) -> Result<Vec<u8>> {
        Ok(self.read_bin_ref()?.to_vec())
    }

    fn reset(&mut self) {
        self.wbuf.reset();
        self.rbuf.reset();
    }
}
