//! The transport contract this crate's codecs are generic over.
//!
//! spec.md §1 places the transport itself out of scope as an external
//! collaborator; §6 still names its interface (`Read(dst) -> (n, err)`,
//! `Write(src) -> (n, err)`, `Flush() -> err`, short reads/writes
//! permitted, EOF as a distinguished terminal signal). No new trait is
//! introduced here: any `T: std::io::Read + std::io::Write` already
//! satisfies that contract, the same way `std::io::ErrorKind::UnexpectedEof`
//! already models the Go source's distinguished `io.EOF` value — see
//! [`crate::error::CodecError`]'s `From<std::io::Error>` impl.
//!
//! [`FramedCodec`](crate::codec::framed::FramedCodec) and
//! [`BufferedCodec`](crate::codec::buffered::BufferedCodec) are both
//! generic over `T: Read + Write` directly rather than naming a type
//! alias here; this module exists only to document where that contract
//! is defined for readers looking for it.
