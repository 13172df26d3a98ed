//! The buffered codec: streams bytes directly with no frame prefix,
//! refilling from the transport on demand (spec.md §1, §4.5).
//!
//! Unlike [`crate::codec::framed::FramedCodec`], returned strings and
//! binaries are always caller-owned copies: [`StreamBuffer`](crate::buffer::stream::StreamBuffer)
//! may compact its backing region mid-message, so nothing here can safely
//! alias it across a read.

use std::io::{Read, Write};

use tracing::trace;

use super::ThriftCodec;
use crate::{
    buffer::stream::StreamBuffer,
    byteops,
    config::CodecConfig,
    error::{CodecError, CodecErrorKind, Result},
    types::{type_size, TMessageType, TType, VERSION_1, VERSION_MASK},
};

/// Number of transport `read` attempts [`BufferedCodec::read_at_least_n`]
/// will make before giving up with [`CodecErrorKind::ReadCountError`].
const READ_AT_LEAST_N_ATTEMPTS: u32 = 5;

/// A buffered (unframed) Thrift binary-protocol codec over transport `T`.
pub struct BufferedCodec<T> {
    transport: T,
    config: CodecConfig,
    wbuf: StreamBuffer,
    rbuf: StreamBuffer,
    /// Queued big-payload write, bypassing `wbuf` entirely (spec.md §4.5).
    w_big_data: Option<Vec<u8>>,
    /// Offset in `wbuf` at which the queued big payload belongs on flush.
    w_big_data_pos: usize,
}

impl<T: Read + Write> BufferedCodec<T> {
    pub fn new(transport: T, config: CodecConfig) -> Self {
        Self {
            wbuf: StreamBuffer::new(config.write_buf_size),
            rbuf: StreamBuffer::new(config.read_buf_size),
            transport,
            config,
            w_big_data: None,
            w_big_data_pos: 0,
        }
    }

    /// Adopts caller-provided buffers (pool-borrow form). Per spec.md §9,
    /// the buffers' own capacities are authoritative.
    pub fn from_shared_buffers(
        transport: T,
        config: CodecConfig,
        write_buf: Vec<u8>,
        read_buf: Vec<u8>,
    ) -> Self {
        Self {
            wbuf: StreamBuffer::adopt(write_buf),
            rbuf: StreamBuffer::adopt(read_buf),
            transport,
            config,
            w_big_data: None,
            w_big_data_pos: 0,
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

    fn write_i32_unchecked(&mut self, v: i32) {
        let idx = self.wbuf.w;
        byteops::write_i32_be(&mut self.wbuf.buf, idx, v);
        self.wbuf.w += 4;
    }

    fn write_i16_unchecked(&mut self, v: i16) {
        let idx = self.wbuf.w;
        byteops::write_i16_be(&mut self.wbuf.buf, idx, v);
        self.wbuf.w += 2;
    }

    fn write_i64_unchecked(&mut self, v: i64) {
        let idx = self.wbuf.w;
        byteops::write_i64_be(&mut self.wbuf.buf, idx, v);
        self.wbuf.w += 8;
    }

    /// Shared write path for `WriteString`/`WriteBinary`: queues the
    /// big-payload bypass when `v` is large enough and no payload is
    /// already queued for this message (spec.md §4.5).
    fn write_bytes_with_bypass(&mut self, v: &[u8]) {
        let is_big = v.len() >= self.config.min_big_data_len && self.w_big_data.is_none();
        let grow_len = if is_big { 4 } else { 4 + v.len() };
        self.ensure_write_capacity(grow_len);
        let idx = self.wbuf.w;
        byteops::write_i32_be(&mut self.wbuf.buf, idx, v.len() as i32);
        self.wbuf.w += 4;
        if is_big {
            self.w_big_data = Some(v.to_vec());
            self.w_big_data_pos = self.wbuf.w;
        } else {
            let idx = self.wbuf.w;
            self.wbuf.buf[idx..idx + v.len()].copy_from_slice(v);
            self.wbuf.w += v.len();
        }
    }

    // ---- read side ---------------------------------------------------

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

    /// Guarantees a contiguous readable window of exactly `n` bytes,
    /// compacting and refilling from the transport as needed (spec.md
    /// §4.5, `ReadAtLeastN`).
    fn read_at_least_n(&mut self, n: usize) -> Result<&[u8]> {
        let remain = self.rbuf.unread();
        if remain >= n {
            let r = self.rbuf.r;
            self.rbuf.r += n;
            return Ok(&self.rbuf.buf[r..r + n]);
        }
        if matches!(self.rbuf.err, Some(CodecErrorKind::UnexpectedEof)) {
            return Err(CodecErrorKind::UnexpectedEof.into());
        }
        self.rbuf.compact();
        self.rbuf.ensure_capacity(n - remain);
        let mut w_pos = remain;
        let mut needed = n - remain;
        let mut attempts = READ_AT_LEAST_N_ATTEMPTS;
        let mut io_err: Option<CodecError> = None;
        while needed > 0 && attempts > 0 && io_err.is_none() {
            match self.transport.read(&mut self.rbuf.buf[w_pos..]) {
                Ok(read) => {
                    if read == 0 {
                        self.rbuf.err = Some(CodecErrorKind::UnexpectedEof);
                        io_err = Some(CodecErrorKind::UnexpectedEof.into());
                    } else {
                        // `read` can exceed `needed` when the buffer window
                        // handed to `transport.read` is wider than what's
                        // still owed (the Go source's `nn` goes negative
                        // the same way on a signed int; saturate instead).
                        needed = needed.saturating_sub(read);
                        w_pos += read;
                    }
                }
                Err(e) => io_err = Some(e.into()),
            }
            attempts -= 1;
        }
        self.rbuf.r = n;
        self.rbuf.w = w_pos;
        if needed == 0 {
            return Ok(&self.rbuf.buf[0..n]);
        }
        if let Some(e) = io_err {
            return Err(e);
        }
        Err(CodecErrorKind::ReadCountError.into())
    }

    /// Copies exactly `dst.len()` bytes out of the read buffer/transport
    /// (spec.md §4.5, `ReadAll`). Large reads bypass the buffer and land
    /// directly in `dst`; small ones refill `rbuf` first, then copy.
    fn read_all(&mut self, dst: &mut [u8]) -> Result<()> {
        let remain = self.rbuf.unread();
        if remain >= dst.len() {
            let r = self.rbuf.r;
            dst.copy_from_slice(&self.rbuf.buf[r..r + dst.len()]);
            self.rbuf.r += dst.len();
            return Ok(());
        }
        if matches!(self.rbuf.err, Some(CodecErrorKind::UnexpectedEof)) {
            return Err(CodecErrorKind::UnexpectedEof.into());
        }
        let r = self.rbuf.r;
        let w = self.rbuf.w;
        dst[..remain].copy_from_slice(&self.rbuf.buf[r..w]);
        // The buffered region is now fully copied out; mark it consumed
        // so the bypass branch below doesn't leave it re-readable as
        // stale bytes for the next field (the non-bypass branch below
        // overwrites r/w itself when it refills from position 0).
        self.rbuf.r = self.rbuf.w;

        let bypass = dst.len() >= self.rbuf.capacity() / 2 || dst.len() >= self.config.min_big_data_len;
        let mut needed = dst.len() - remain;
        let attempts_budget = (needed / 32768 + 15).max(200) as u32;
        let mut attempts = attempts_budget;
        let mut io_err: Option<CodecError> = None;

        if bypass {
            let mut w_pos = remain;
            while needed > 0 && attempts > 0 && io_err.is_none() {
                match self.transport.read(&mut dst[w_pos..]) {
                    Ok(read) => {
                        if read == 0 {
                            self.rbuf.err = Some(CodecErrorKind::UnexpectedEof);
                            io_err = Some(CodecErrorKind::UnexpectedEof.into());
                        } else {
                            needed -= read;
                            w_pos += read;
                        }
                    }
                    Err(e) => io_err = Some(e.into()),
                }
                attempts -= 1;
            }
        } else {
            self.rbuf.r = 0;
            self.rbuf.w = 0;
            self.rbuf.ensure_capacity(dst.len() - remain);
            let mut w_pos = 0;
            while needed > 0 && attempts > 0 && io_err.is_none() {
                match self.transport.read(&mut self.rbuf.buf[w_pos..]) {
                    Ok(read) => {
                        if read == 0 {
                            self.rbuf.err = Some(CodecErrorKind::UnexpectedEof);
                            io_err = Some(CodecErrorKind::UnexpectedEof.into());
                        } else {
                            // `rbuf.buf` may be wider than `dst.len() -
                            // remain` (ensure_capacity only guarantees a
                            // lower bound), so `read` can overshoot `needed`.
                            needed = needed.saturating_sub(read);
                            w_pos += read;
                        }
                    }
                    Err(e) => io_err = Some(e.into()),
                }
                attempts -= 1;
            }
            self.rbuf.w = w_pos;
        }

        if needed == 0 {
            if !bypass {
                dst[remain..].copy_from_slice(&self.rbuf.buf[0..dst.len() - remain]);
                self.rbuf.r = dst.len() - remain;
            }
            return Ok(());
        }
        if let Some(e) = io_err {
            return Err(e);
        }
        Err(CodecErrorKind::ReadCountError.into())
    }

    fn read_string_body(&mut self, size: usize) -> Result<String> {
        let mut dat = vec![0u8; size];
        self.read_all(&mut dat)?;
        String::from_utf8(dat).map_err(|_| CodecErrorKind::InvalidDataLength(size as i64).into())
    }
}

impl<T: Read + Write> ThriftCodec for BufferedCodec<T> {
    fn write_message_begin(&mut self, name: &str, ty: TMessageType, seq: i32) -> Result<()> {
        if self.config.strict_write {
            let version = VERSION_1 | (ty as i32);
            self.write_i32(version)?;
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
        let idx = self.wbuf.w;
        self.wbuf.buf[idx] = ty as u8;
        byteops::write_i16_be(&mut self.wbuf.buf, idx + 1, id);
        self.wbuf.w += 3;
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
        let idx = self.wbuf.w;
        self.wbuf.buf[idx] = key_ty as u8;
        self.wbuf.buf[idx + 1] = val_ty as u8;
        byteops::write_i32_be(&mut self.wbuf.buf, idx + 2, n);
        self.wbuf.w += 6;
        Ok(())
    }

    fn write_map_end(&mut self) -> Result<()> {
        Ok(())
    }

    fn write_list_begin(&mut self, elem_ty: TType, n: i32) -> Result<()> {
        let val_size = type_size(elem_ty) * n.max(0) as usize;
        self.ensure_write_capacity(5 + val_size);
        let idx = self.wbuf.w;
        self.wbuf.buf[idx] = elem_ty as u8;
        byteops::write_i32_be(&mut self.wbuf.buf, idx + 1, n);
        self.wbuf.w += 5;
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
        let idx = self.wbuf.w;
        self.wbuf.buf[idx] = v;
        self.wbuf.w += 1;
        Ok(())
    }

    fn write_i16(&mut self, v: i16) -> Result<()> {
        self.ensure_write_capacity(2);
        self.write_i16_unchecked(v);
        Ok(())
    }

    fn write_i32(&mut self, v: i32) -> Result<()> {
        self.ensure_write_capacity(4);
        self.write_i32_unchecked(v);
        Ok(())
    }

    fn write_i64(&mut self, v: i64) -> Result<()> {
        self.ensure_write_capacity(8);
        self.write_i64_unchecked(v);
        Ok(())
    }

    fn write_double(&mut self, v: f64) -> Result<()> {
        self.ensure_write_capacity(8);
        let idx = self.wbuf.w;
        byteops::write_f64_be(&mut self.wbuf.buf, idx, v);
        self.wbuf.w += 8;
        Ok(())
    }

    fn write_string(&mut self, v: &str) -> Result<()> {
        self.write_bytes_with_bypass(v.as_bytes());
        Ok(())
    }

    fn write_binary(&mut self, v: &[u8]) -> Result<()> {
        self.write_bytes_with_bypass(v);
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        match self.w_big_data.take() {
            None => {
                let mut pos = 0;
                while pos < self.wbuf.w {
                    let n = self.transport.write(&self.wbuf.buf[pos..self.wbuf.w])?;
                    if n == 0 {
                        return Err(CodecErrorKind::WriteCountError.into());
                    }
                    pos += n;
                }
            }
            Some(big) => {
                write_all_loop(&mut self.transport, &self.wbuf.buf[0..self.w_big_data_pos])?;
                write_all_loop(&mut self.transport, &big)?;
                write_all_loop(&mut self.transport, &self.wbuf.buf[self.w_big_data_pos..self.wbuf.w])?;
            }
        }
        self.transport.flush()?;
        trace!(len = self.wbuf.w, "[fast-thrift] flushed buffered message");
        self.wbuf.clear();
        self.w_big_data = None;
        self.w_big_data_pos = 0;
        Ok(())
    }

    fn read_message_begin(&mut self) -> Result<(String, TMessageType, i32)> {
        let raw = self.read_i32()?;
        if raw < 0 {
            let type_byte = (raw & 0x0ff) as u8;
            let version = raw & VERSION_MASK;
            if version != VERSION_1 {
                return Err(CodecErrorKind::BadVersion.into());
            }
            let ty = TMessageType::from_byte(type_byte).ok_or(CodecErrorKind::BadVersion)?;
            let name = self.read_string()?;
            let seq = self.read_i32()?;
            Ok((name, ty, seq))
        } else {
            if self.config.strict_read {
                return Err(CodecErrorKind::BadVersion.into());
            }
            let size = self.check_len(raw)?;
            let name = self.read_string_body(size)?;
            let type_byte = self.read_byte()?;
            let ty = TMessageType::from_byte(type_byte).ok_or(CodecErrorKind::BadVersion)?;
            let seq = self.read_i32()?;
            Ok((name, ty, seq))
        }
    }

    fn read_message_end(&mut self) -> Result<()> {
        // Intentional asymmetry with FramedCodec: see spec.md §9. Resets
        // only the reader (matching the Go source's `ResetReader`), not
        // the writer or any pending big-payload write state.
        self.rbuf.clear();
        Ok(())
    }

    fn read_struct_begin(&mut self) -> Result<String> {
        Ok(String::new())
    }

    fn read_struct_end(&mut self) -> Result<()> {
        Ok(())
    }

    fn read_field_begin(&mut self) -> Result<(String, TType, i16)> {
        let t = self.read_byte()?;
        let ty = TType::from_byte(t).unwrap_or(TType::Stop);
        let id = if ty == TType::Stop { 0 } else { self.read_i16()? };
        Ok((String::new(), ty, id))
    }

    fn read_field_end(&mut self) -> Result<()> {
        Ok(())
    }

    fn read_map_begin(&mut self) -> Result<(TType, TType, i32)> {
        let dat = self.read_at_least_n(6)?;
        let kt = TType::from_byte(dat[0]).unwrap_or(TType::Stop);
        let vt = TType::from_byte(dat[1]).unwrap_or(TType::Stop);
        let n = byteops::read_i32_be(dat, 2);
        self.check_len(n)?;
        Ok((kt, vt, n))
    }

    fn read_map_end(&mut self) -> Result<()> {
        Ok(())
    }

    fn read_list_begin(&mut self) -> Result<(TType, i32)> {
        let dat = self.read_at_least_n(5)?;
        let et = TType::from_byte(dat[0]).unwrap_or(TType::Stop);
        let n = byteops::read_i32_be(dat, 1);
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
        Ok(self.read_at_least_n(1)?[0] == 1)
    }

    fn read_byte(&mut self) -> Result<u8> {
        Ok(self.read_at_least_n(1)?[0])
    }

    fn read_i16(&mut self) -> Result<i16> {
        Ok(byteops::read_i16_be(self.read_at_least_n(2)?, 0))
    }

    fn read_i32(&mut self) -> Result<i32> {
        Ok(byteops::read_i32_be(self.read_at_least_n(4)?, 0))
    }

    fn read_i64(&mut self) -> Result<i64> {
        Ok(byteops::read_i64_be(self.read_at_least_n(8)?, 0))
    }

    fn read_double(&mut self) -> Result<f64> {
        Ok(byteops::read_f64_be(self.read_at_least_n(8)?, 0))
    }

    fn read_string(&mut self) -> Result<String> {
        let size = self.check_len(self.read_i32()?)?;
        self.read_string_body(size)
    }

    fn read_binary(&mut self) -> Result<Vec<u8>> {
        let size = self.check_len(self.read_i32()?)?;
        let mut dat = vec![0u8; size];
        self.read_all(&mut dat)?;
        Ok(dat)
    }

    fn reset(&mut self) {
        self.wbuf.clear();
        self.rbuf.clear();
        self.w_big_data = None;
        self.w_big_data_pos = 0;
    }
}

/// Writes `buf` to `transport` in a loop, handling partial writes, the
/// way [`BufferedCodec::flush`]'s three-part big-payload write does.
fn write_all_loop<T: Write>(transport: &mut T, buf: &[u8]) -> Result<()> {
    let mut pos = 0;
    while pos < buf.len() {
        let n = transport.write(&buf[pos..])?;
        if n == 0 {
            return Err(CodecErrorKind::WriteCountError.into());
        }
        pos += n;
    }
    Ok(())
}
