use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::WireError;
use crate::value::Value;

/// Fixed trailer written after every BINN container to mark the end of a
/// frame. Four bytes rather than a length-prefix-only scheme, matching the
/// wire format the daemon itself expects.
pub const END_MARKER: [u8; 4] = [0xFF, 0xFF, 0xFF, 0xFF];

/// Reads one full frame (container tag + size-prefixed body + end marker)
/// from `stream` and decodes it into a [`Value`].
///
/// The container's own size field tells us exactly how many more bytes to
/// read before the end marker, so this never needs to speculatively peek
/// past a message boundary: one read for the tag+size header, one read for
/// the body, one read for the 4-byte marker.
pub async fn read_frame<S>(stream: &mut S) -> Result<Value, WireError>
where
    S: AsyncRead + Unpin,
{
    let mut tag = [0u8; 1];
    stream.read_exact(&mut tag).await?;

    let mut header = vec![tag[0]];
    match tag[0] {
        // Scalars that carry no separate size field: read their fixed
        // payload width directly, then hand the whole thing to Value::decode.
        0x00 => {}
        0x01 | 0x02 => {}
        0x03 | 0x07 => read_into(stream, &mut header, 1).await?,
        0x04 | 0x08 => read_into(stream, &mut header, 2).await?,
        0x05 | 0x09 | 0x0B => read_into(stream, &mut header, 4).await?,
        0x06 | 0x0A | 0x0C => read_into(stream, &mut header, 8).await?,
        0x0D | 0x0E => {
            // STRING/BLOB: u32 length prefix, then that many bytes.
            read_into(stream, &mut header, 4).await?;
            let len = u32::from_le_bytes(header[1..5].try_into().unwrap());
            read_into(stream, &mut header, len as usize).await?;
        }
        0x0F | 0x10 | 0x11 => {
            // LIST/MAP/OBJECT: u32 byte size of the body, then that many bytes.
            read_into(stream, &mut header, 4).await?;
            let size = u32::from_le_bytes(header[1..5].try_into().unwrap());
            read_into(stream, &mut header, size as usize).await?;
        }
        other => return Err(WireError::Malformed(format!("unknown type tag 0x{other:02X}"))),
    }

    let (value, rest) = Value::decode(&header)?;
    debug_assert!(rest.is_empty(), "read_frame buffered exactly one value");

    let mut marker = [0u8; 4];
    stream.read_exact(&mut marker).await?;
    if marker != END_MARKER {
        return Err(WireError::EndMarkerMismatch { found: marker });
    }

    Ok(value)
}

async fn read_into<S>(stream: &mut S, buf: &mut Vec<u8>, n: usize) -> Result<(), WireError>
where
    S: AsyncRead + Unpin,
{
    let start = buf.len();
    buf.resize(start + n, 0);
    stream.read_exact(&mut buf[start..]).await?;
    Ok(())
}

/// Encodes `value` and writes it, followed by the end marker, to `stream`.
pub async fn write_frame<S>(stream: &mut S, value: &Value) -> Result<(), WireError>
where
    S: AsyncWrite + Unpin,
{
    let mut buf = Vec::new();
    value.encode(&mut buf);
    buf.extend_from_slice(&END_MARKER);
    stream.write_all(&buf).await?;
    stream.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use proptest::prelude::*;

    #[tokio::test]
    async fn write_then_read_scalar_round_trips() {
        let mut buf = Vec::new();
        write_frame(&mut buf, &Value::UInt32(7)).await.unwrap();

        let mut cursor = Cursor::new(buf);
        let value = read_frame(&mut cursor).await.unwrap();
        assert_eq!(value, Value::UInt32(7));
    }

    #[tokio::test]
    async fn write_then_read_nested_list_round_trips() {
        let original = Value::list([
            Value::UInt8(1),
            Value::Str("status".into()),
            Value::Map(vec![("ok".into(), Value::Bool(true))]),
        ]);

        let mut buf = Vec::new();
        write_frame(&mut buf, &original).await.unwrap();

        let mut cursor = Cursor::new(buf);
        let decoded = read_frame(&mut cursor).await.unwrap();
        assert_eq!(decoded, original);
    }

    #[tokio::test]
    async fn corrupted_end_marker_is_rejected() {
        let mut buf = Vec::new();
        write_frame(&mut buf, &Value::Bool(true)).await.unwrap();
        let last = buf.len() - 1;
        buf[last] = 0x00;

        let mut cursor = Cursor::new(buf);
        let err = read_frame(&mut cursor).await.unwrap_err();
        assert!(matches!(err, WireError::EndMarkerMismatch { .. }));
    }

    #[tokio::test]
    async fn truncated_stream_is_an_io_error() {
        let mut buf = Vec::new();
        write_frame(&mut buf, &Value::Str("hello".into())).await.unwrap();
        buf.truncate(buf.len() - 2);

        let mut cursor = Cursor::new(buf);
        let err = read_frame(&mut cursor).await.unwrap_err();
        assert!(matches!(err, WireError::Io(_)));
    }

    fn scalar_value() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i32>().prop_map(Value::Int32),
            any::<u64>().prop_map(Value::UInt64),
            any::<String>().prop_map(Value::Str),
            proptest::collection::vec(any::<u8>(), 0..64).prop_map(Value::Blob),
        ]
    }

    proptest! {
        // Invariant 1 (spec.md §8): writing a value then reading it back
        // yields the same value followed by exactly the 4-byte end marker,
        // for any frame made of scalars plus one level of list nesting.
        #[test]
        fn frame_round_trips_for_any_scalar_list(items in proptest::collection::vec(scalar_value(), 0..8)) {
            let original = Value::List(items);
            let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
            rt.block_on(async {
                let mut buf = Vec::new();
                write_frame(&mut buf, &original).await.unwrap();

                let mut cursor = Cursor::new(buf);
                let decoded = read_frame(&mut cursor).await.unwrap();
                prop_assert_eq!(decoded, original);
                Ok(())
            })?;
        }
    }
}
