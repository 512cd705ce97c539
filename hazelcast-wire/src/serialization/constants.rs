//! Built-in serializer type ids.

/// Portable, self-describing payloads.
pub const PORTABLE_TYPE_ID: i32 = -1;
/// Identified data serializable payloads.
pub const IDENTIFIED_TYPE_ID: i32 = -2;
/// Single byte.
pub const BYTE_TYPE_ID: i32 = -3;
/// Boolean.
pub const BOOLEAN_TYPE_ID: i32 = -4;
/// UTF-16 code unit.
pub const CHAR_TYPE_ID: i32 = -5;
/// 16-bit integer.
pub const SHORT_TYPE_ID: i32 = -6;
/// 32-bit integer.
pub const INTEGER_TYPE_ID: i32 = -7;
/// 64-bit integer.
pub const LONG_TYPE_ID: i32 = -8;
/// 32-bit float.
pub const FLOAT_TYPE_ID: i32 = -9;
/// 64-bit float.
pub const DOUBLE_TYPE_ID: i32 = -10;
/// UTF-8 string.
pub const STRING_TYPE_ID: i32 = -11;
/// Byte array.
pub const BYTE_ARRAY_TYPE_ID: i32 = -12;
