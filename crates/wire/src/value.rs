use crate::error::WireError;

mod tag {
    pub const NULL: u8 = 0x00;
    pub const TRUE: u8 = 0x01;
    pub const FALSE: u8 = 0x02;
    pub const INT8: u8 = 0x03;
    pub const INT16: u8 = 0x04;
    pub const INT32: u8 = 0x05;
    pub const INT64: u8 = 0x06;
    pub const UINT8: u8 = 0x07;
    pub const UINT16: u8 = 0x08;
    pub const UINT32: u8 = 0x09;
    pub const UINT64: u8 = 0x0A;
    pub const FLOAT: u8 = 0x0B;
    pub const DOUBLE: u8 = 0x0C;
    pub const STRING: u8 = 0x0D;
    pub const BLOB: u8 = 0x0E;
    pub const LIST: u8 = 0x0F;
    pub const MAP: u8 = 0x10;
    pub const OBJECT: u8 = 0x11;
}

/// A single BINN-encoded value of any type.
///
/// Scalar variants cover the widths the specification calls out (1/2/4/8
/// byte signed and unsigned integers, booleans, floats, UTF-8 strings and
/// opaque blobs). [`Value::List`] and [`Value::Map`] are the two
/// container kinds; each element of a list carries its own type tag on
/// the wire, which is what lets [`Value::List`] double as the "list of
/// any" dispatch representation the design notes call for (§9).
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    UInt8(u8),
    UInt16(u16),
    UInt32(u32),
    UInt64(u64),
    Float(f32),
    Double(f64),
    Str(String),
    Blob(Vec<u8>),
    List(Vec<Value>),
    /// Ordered key/value pairs; objects use the same wire shape as maps
    /// and are modeled as the same variant (the distinction in the spec
    /// is purely about *what's inside*, not how it's encoded).
    Map(Vec<(String, Value)>),
}

impl Value {
    /// Convenience constructor for the common case of a positional list
    /// message (every message family in §4.A is selector-first list).
    #[must_use]
    pub fn list(items: impl IntoIterator<Item = Value>) -> Self {
        Value::List(items.into_iter().collect())
    }

    #[must_use]
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_blob(&self) -> Option<&[u8]> {
        match self {
            Value::Blob(b) => Some(b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Widens any integer variant to `i64`, used by message constructors
    /// that accept either signed or unsigned wire representations for the
    /// same logical field (e.g. a status code that's always small and
    /// non-negative but may arrive as `UInt8` or `Int32`).
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Value::Int8(v) => Some(i64::from(v)),
            Value::Int16(v) => Some(i64::from(v)),
            Value::Int32(v) => Some(i64::from(v)),
            Value::Int64(v) => Some(v),
            Value::UInt8(v) => Some(i64::from(v)),
            Value::UInt16(v) => Some(i64::from(v)),
            Value::UInt32(v) => Some(i64::from(v)),
            Value::UInt64(v) => i64::try_from(v).ok(),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_u64(&self) -> Option<u64> {
        self.as_i64().and_then(|v| u64::try_from(v).ok())
    }

    /// Serializes this value (tag + payload) and appends it to `buf`.
    pub fn encode(&self, buf: &mut Vec<u8>) {
        match self {
            Value::Null => buf.push(tag::NULL),
            Value::Bool(true) => buf.push(tag::TRUE),
            Value::Bool(false) => buf.push(tag::FALSE),
            Value::Int8(v) => {
                buf.push(tag::INT8);
                buf.push(*v as u8);
            }
            Value::Int16(v) => {
                buf.push(tag::INT16);
                buf.extend_from_slice(&v.to_le_bytes());
            }
            Value::Int32(v) => {
                buf.push(tag::INT32);
                buf.extend_from_slice(&v.to_le_bytes());
            }
            Value::Int64(v) => {
                buf.push(tag::INT64);
                buf.extend_from_slice(&v.to_le_bytes());
            }
            Value::UInt8(v) => {
                buf.push(tag::UINT8);
                buf.push(*v);
            }
            Value::UInt16(v) => {
                buf.push(tag::UINT16);
                buf.extend_from_slice(&v.to_le_bytes());
            }
            Value::UInt32(v) => {
                buf.push(tag::UINT32);
                buf.extend_from_slice(&v.to_le_bytes());
            }
            Value::UInt64(v) => {
                buf.push(tag::UINT64);
                buf.extend_from_slice(&v.to_le_bytes());
            }
            Value::Float(v) => {
                buf.push(tag::FLOAT);
                buf.extend_from_slice(&v.to_le_bytes());
            }
            Value::Double(v) => {
                buf.push(tag::DOUBLE);
                buf.extend_from_slice(&v.to_le_bytes());
            }
            Value::Str(s) => {
                buf.push(tag::STRING);
                buf.extend_from_slice(&(s.len() as u32).to_le_bytes());
                buf.extend_from_slice(s.as_bytes());
            }
            Value::Blob(b) => {
                buf.push(tag::BLOB);
                buf.extend_from_slice(&(b.len() as u32).to_le_bytes());
                buf.extend_from_slice(b);
            }
            Value::List(items) => encode_container(buf, tag::LIST, items.len() as u32, |body| {
                for item in items {
                    item.encode(body);
                }
            }),
            Value::Map(entries) => encode_container(buf, tag::MAP, entries.len() as u32, |body| {
                for (key, value) in entries {
                    body.extend_from_slice(&(key.len() as u32).to_le_bytes());
                    body.extend_from_slice(key.as_bytes());
                    value.encode(body);
                }
            }),
        }
    }

    /// Decodes one value starting at the front of `bytes`, returning the
    /// value and the unconsumed remainder.
    pub fn decode(bytes: &[u8]) -> Result<(Value, &[u8]), WireError> {
        let (&t, rest) = bytes
            .split_first()
            .ok_or_else(|| WireError::Malformed("unexpected end of buffer reading tag".into()))?;
        match t {
            tag::NULL => Ok((Value::Null, rest)),
            tag::TRUE => Ok((Value::Bool(true), rest)),
            tag::FALSE => Ok((Value::Bool(false), rest)),
            tag::INT8 => take(rest, 1).map(|(b, r)| (Value::Int8(b[0] as i8), r)),
            tag::INT16 => take(rest, 2).map(|(b, r)| (Value::Int16(i16::from_le_bytes(b.try_into().unwrap())), r)),
            tag::INT32 => take(rest, 4).map(|(b, r)| (Value::Int32(i32::from_le_bytes(b.try_into().unwrap())), r)),
            tag::INT64 => take(rest, 8).map(|(b, r)| (Value::Int64(i64::from_le_bytes(b.try_into().unwrap())), r)),
            tag::UINT8 => take(rest, 1).map(|(b, r)| (Value::UInt8(b[0]), r)),
            tag::UINT16 => take(rest, 2).map(|(b, r)| (Value::UInt16(u16::from_le_bytes(b.try_into().unwrap())), r)),
            tag::UINT32 => take(rest, 4).map(|(b, r)| (Value::UInt32(u32::from_le_bytes(b.try_into().unwrap())), r)),
            tag::UINT64 => take(rest, 8).map(|(b, r)| (Value::UInt64(u64::from_le_bytes(b.try_into().unwrap())), r)),
            tag::FLOAT => take(rest, 4).map(|(b, r)| (Value::Float(f32::from_le_bytes(b.try_into().unwrap())), r)),
            tag::DOUBLE => take(rest, 8).map(|(b, r)| (Value::Double(f64::from_le_bytes(b.try_into().unwrap())), r)),
            tag::STRING => decode_string(rest).map(|(s, r)| (Value::Str(s), r)),
            tag::BLOB => decode_blob(rest).map(|(b, r)| (Value::Blob(b), r)),
            tag::LIST => decode_list(rest),
            tag::MAP | tag::OBJECT => decode_map(rest),
            other => Err(WireError::Malformed(format!("unknown type tag 0x{other:02X}"))),
        }
    }
}

fn take(bytes: &[u8], n: usize) -> Result<(&[u8], &[u8]), WireError> {
    if bytes.len() < n {
        return Err(WireError::Malformed(format!(
            "expected {n} more bytes, found {}",
            bytes.len()
        )));
    }
    Ok(bytes.split_at(n))
}

fn decode_u32(bytes: &[u8]) -> Result<(u32, &[u8]), WireError> {
    let (raw, rest) = take(bytes, 4)?;
    Ok((u32::from_le_bytes(raw.try_into().unwrap()), rest))
}

fn decode_string(bytes: &[u8]) -> Result<(String, &[u8]), WireError> {
    let (len, rest) = decode_u32(bytes)?;
    let (raw, rest) = take(rest, len as usize)?;
    let s = std::str::from_utf8(raw)
        .map_err(|e| WireError::Malformed(format!("invalid utf-8 string: {e}")))?
        .to_string();
    Ok((s, rest))
}

fn decode_blob(bytes: &[u8]) -> Result<(Vec<u8>, &[u8]), WireError> {
    let (len, rest) = decode_u32(bytes)?;
    let (raw, rest) = take(rest, len as usize)?;
    Ok((raw.to_vec(), rest))
}

/// Container wire shape: `size:u32 (bytes of count+elements)`, `count:u32`,
/// then `count` elements. The explicit byte size lets [`crate::frame`]
/// read a whole top-level container in one shot without having to parse
/// it incrementally off the socket.
fn encode_container(buf: &mut Vec<u8>, tag: u8, count: u32, write_body: impl FnOnce(&mut Vec<u8>)) {
    let mut body = Vec::new();
    body.extend_from_slice(&count.to_le_bytes());
    write_body(&mut body);

    buf.push(tag);
    buf.extend_from_slice(&(body.len() as u32).to_le_bytes());
    buf.extend_from_slice(&body);
}

fn decode_list(bytes: &[u8]) -> Result<(Value, &[u8]), WireError> {
    let (size, rest) = decode_u32(bytes)?;
    let (body, rest) = take(rest, size as usize)?;
    let (count, mut cursor) = decode_u32(body)?;
    let mut items = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let (item, remainder) = Value::decode(cursor)?;
        items.push(item);
        cursor = remainder;
    }
    Ok((Value::List(items), rest))
}

fn decode_map(bytes: &[u8]) -> Result<(Value, &[u8]), WireError> {
    let (size, rest) = decode_u32(bytes)?;
    let (body, rest) = take(rest, size as usize)?;
    let (count, mut cursor) = decode_u32(body)?;
    let mut entries = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let (key, remainder) = decode_string(cursor)?;
        let (value, remainder) = Value::decode(remainder)?;
        entries.push((key, value));
        cursor = remainder;
    }
    Ok((Value::Map(entries), rest))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(value: Value) -> Value {
        let mut buf = Vec::new();
        value.encode(&mut buf);
        let (decoded, rest) = Value::decode(&buf).unwrap();
        assert!(rest.is_empty(), "decoder left unconsumed bytes");
        decoded
    }

    #[test]
    fn scalars_round_trip() {
        assert_eq!(round_trip(Value::Null), Value::Null);
        assert_eq!(round_trip(Value::Bool(true)), Value::Bool(true));
        assert_eq!(round_trip(Value::Bool(false)), Value::Bool(false));
        assert_eq!(round_trip(Value::Int64(-1234)), Value::Int64(-1234));
        assert_eq!(round_trip(Value::UInt32(99)), Value::UInt32(99));
        assert_eq!(round_trip(Value::Double(1.5)), Value::Double(1.5));
        assert_eq!(
            round_trip(Value::Str("hello".into())),
            Value::Str("hello".into())
        );
        assert_eq!(
            round_trip(Value::Blob(vec![1, 2, 3])),
            Value::Blob(vec![1, 2, 3])
        );
    }

    #[test]
    fn nested_list_round_trips_with_mixed_types() {
        let value = Value::list([
            Value::UInt8(1),
            Value::Str("ls -al".into()),
            Value::list([Value::Int32(-1), Value::Bool(true)]),
        ]);
        assert_eq!(round_trip(value.clone()), value);
    }

    #[test]
    fn map_round_trips_preserving_order() {
        let value = Value::Map(vec![
            ("name".into(), Value::Str("file.txt".into())),
            ("size".into(), Value::UInt64(42)),
        ]);
        assert_eq!(round_trip(value.clone()), value);
    }

    #[test]
    fn truncated_string_length_is_malformed_not_a_panic() {
        // STRING tag followed by a length that claims more bytes than exist.
        let bytes = [tag::STRING, 0xFF, 0xFF, 0xFF, 0x7F];
        assert!(Value::decode(&bytes).is_err());
    }

    #[test]
    fn unknown_tag_is_rejected() {
        let bytes = [0xEE_u8];
        assert!(Value::decode(&bytes).is_err());
    }

    #[test]
    fn as_i64_widens_every_integer_variant() {
        assert_eq!(Value::Int8(-5).as_i64(), Some(-5));
        assert_eq!(Value::UInt8(5).as_i64(), Some(5));
        assert_eq!(Value::UInt64(5).as_i64(), Some(5));
        assert_eq!(Value::Str("x".into()).as_i64(), None);
    }
}
