//! Thrift binary-protocol field types, message types, and version
//! constants.

/// The closed set of wire field types used by the Thrift binary protocol.
///
/// Values match the standard Thrift binary-protocol encoding exactly
/// (`STOP = 0`, ..., `LIST = 15`); these are not this crate's invention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TType {
    Stop = 0,
    Bool = 2,
    Byte = 3,
    Double = 4,
    I16 = 6,
    I32 = 8,
    I64 = 10,
    String = 11,
    Struct = 12,
    Map = 13,
    Set = 14,
    List = 15,
}

impl TType {
    /// Recover a [`TType`] from its wire byte, if it is one of the known
    /// values.
    pub fn from_byte(b: u8) -> Option<Self> {
        Some(match b {
            0 => TType::Stop,
            2 => TType::Bool,
            3 => TType::Byte,
            4 => TType::Double,
            6 => TType::I16,
            8 => TType::I32,
            10 => TType::I64,
            11 => TType::String,
            12 => TType::Struct,
            13 => TType::Map,
            14 => TType::Set,
            15 => TType::List,
            _ => return None,
        })
    }
}

/// Message type carried in the message header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TMessageType {
    Call = 1,
    Reply = 2,
    Exception = 3,
    OneWay = 4,
}

impl TMessageType {
    pub fn from_byte(b: u8) -> Option<Self> {
        Some(match b {
            1 => TMessageType::Call,
            2 => TMessageType::Reply,
            3 => TMessageType::Exception,
            4 => TMessageType::OneWay,
            _ => return None,
        })
    }
}

/// Strict-mode message header version tag.
pub const VERSION_1: i32 = 0x8001_0000_u32 as i32;
/// Mask isolating the version bits of a strict-mode header's leading i32.
pub const VERSION_MASK: i32 = 0xffff_0000_u32 as i32;

/// Minimum number of wire bytes a value of `t` can occupy, used to
/// pre-size collection writes (spec.md §3, TypeSize component).
///
/// Variable-length types report `1`, a conservative lower bound: the
/// codec still grows the buffer on demand for the rest, this is only
/// used to avoid a capacity check per element in the common case of
/// small, fixed-width collections.
#[inline]
pub fn type_size(t: TType) -> usize {
    match t {
        TType::Stop => 0,
        TType::Bool | TType::Byte => 1,
        TType::I16 => 2,
        TType::I32 => 4,
        TType::I64 | TType::Double => 8,
        TType::String | TType::Struct | TType::Map | TType::Set | TType::List => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_size_matches_spec_table() {
        assert_eq!(type_size(TType::Bool), 1);
        assert_eq!(type_size(TType::Byte), 1);
        assert_eq!(type_size(TType::I16), 2);
        assert_eq!(type_size(TType::I32), 4);
        assert_eq!(type_size(TType::I64), 8);
        assert_eq!(type_size(TType::Double), 8);
        assert_eq!(type_size(TType::String), 1);
        assert_eq!(type_size(TType::Struct), 1);
        assert_eq!(type_size(TType::Map), 1);
        assert_eq!(type_size(TType::Set), 1);
        assert_eq!(type_size(TType::List), 1);
    }

    #[test]
    fn ttype_roundtrips_through_byte() {
        for t in [
            TType::Stop,
            TType::Bool,
            TType::Byte,
            TType::Double,
            TType::I16,
            TType::I32,
            TType::I64,
            TType::String,
            TType::Struct,
            TType::Map,
            TType::Set,
            TType::List,
        ] {
            assert_eq!(TType::from_byte(t as u8), Some(t));
        }
        assert_eq!(TType::from_byte(200), None);
    }

    #[test]
    fn version_1_matches_strict_header_constant() {
        assert_eq!(VERSION_1 as u32, 0x8001_0000);
        assert_eq!(VERSION_MASK as u32, 0xffff_0000);
    }
}
