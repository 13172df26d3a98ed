//! Configuration knobs shared by both codecs (spec.md §6).

/// Hard cap on any single length field accepted from the wire (map/list/
/// set element count, string/binary byte length).
pub const DEFAULT_SAFE_BUFFER_SIZE_LIM: usize = 64 * 1024 * 1024;

/// Hard cap on an accepted inbound frame length, as read by
/// [`crate::codec::framed::FramedCodec::read_frame`].
pub const DEFAULT_MAX_FRAME_LENGTH: usize = 16 * 1024 * 1024;

/// Threshold above which [`crate::codec::buffered::BufferedCodec`]
/// bypasses its write buffer and writes a string/binary field directly
/// from the caller's memory on flush.
pub const DEFAULT_MIN_BIG_DATA_LEN: usize = 30_000;

/// Default initial buffer capacity, used when the caller doesn't
/// request a specific one.
pub const DEFAULT_BUF_SIZE: usize = 4096;

/// The original Go benchmark (`protocol_common.go`) additionally names a
/// `minBufferLen` of 64 bytes as a sane lower bound for caller-provided
/// buffer sizes, and a `maxBufferLen` of ~32 MiB as an upper one; kept
/// here as documentation only, this crate never silently clamps a
/// caller's requested size (spec.md makes no clamping behavior a hard
/// invariant).
pub const DEFAULT_MIN_BUFFER_LEN: usize = 64;
pub const DEFAULT_MAX_BUFFER_LEN: usize = 32_000_000;

/// Capacity above which a buffer is shrunk back down on reset.
pub const SHRINK_ABOVE: usize = 2 * 1024 * 1024;
/// Capacity a buffer is shrunk to once [`SHRINK_ABOVE`] is exceeded.
pub const SHRINK_TARGET: usize = 1024 * 1024;

/// Configuration shared by [`crate::codec::framed::FramedCodec`] and
/// [`crate::codec::buffered::BufferedCodec`].
///
/// Defaults mirror the Go source this crate generalizes: lax read /
/// strict write, a 30 000-byte big-payload threshold, and the stock
/// Thrift safe-length / max-frame-length limits.
#[derive(Debug, Clone)]
pub struct CodecConfig {
    pub strict_read: bool,
    pub strict_write: bool,
    pub read_buf_size: usize,
    pub write_buf_size: usize,
    pub min_big_data_len: usize,
    pub safe_buffer_size_lim: usize,
    pub max_frame_length: usize,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            strict_read: false,
            strict_write: true,
            read_buf_size: DEFAULT_BUF_SIZE,
            write_buf_size: DEFAULT_BUF_SIZE,
            min_big_data_len: DEFAULT_MIN_BIG_DATA_LEN,
            safe_buffer_size_lim: DEFAULT_SAFE_BUFFER_SIZE_LIM,
            max_frame_length: DEFAULT_MAX_FRAME_LENGTH,
        }
    }
}

impl CodecConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn strict_read(mut self, v: bool) -> Self {
        self.strict_read = v;
        self
    }

    pub fn strict_write(mut self, v: bool) -> Self {
        self.strict_write = v;
        self
    }

    pub fn read_buf_size(mut self, v: usize) -> Self {
        self.read_buf_size = v;
        self
    }

    pub fn write_buf_size(mut self, v: usize) -> Self {
        self.write_buf_size = v;
        self
    }

    pub fn min_big_data_len(mut self, v: usize) -> Self {
        self.min_big_data_len = v;
        self
    }

    pub fn safe_buffer_size_lim(mut self, v: usize) -> Self {
        self.safe_buffer_size_lim = v;
        self
    }

    pub fn max_frame_length(mut self, v: usize) -> Self {
        self.max_frame_length = v;
        self
    }
}
