//! Column entry encoding
//!
//! Each bundle entry holds one column:
//!
//! ```text
//! +------------------+
//! | Row Count        | (u32 LE)
//! +------------------+
//! | Value * count    |
//! +------------------+
//! ```
//!
//! Value encoding (tag byte, then body):
//!
//! | tag | kind  | body                              |
//! |-----|-------|-----------------------------------|
//! | 0   | null  | -                                 |
//! | 1   | bool  | u8 (0 / 1)                        |
//! | 2   | int   | i64 LE                            |
//! | 3   | float | f64 bits LE                       |
//! | 4   | str   | u32 LE length + UTF-8 bytes       |
//! | 5   | array | u32 LE count + values             |
//!
//! Floats are stored as raw bits so NaN payloads and infinities survive.

use std::io::{self, Cursor, Read};

use crate::record::Value;

const TAG_NULL: u8 = 0;
const TAG_BOOL: u8 = 1;
const TAG_INT: u8 = 2;
const TAG_FLOAT: u8 = 3;
const TAG_STR: u8 = 4;
const TAG_ARRAY: u8 = 5;

/// Maximum array nesting accepted on decode.
pub const MAX_DEPTH: usize = 64;

/// Encode a full column.
pub fn encode_column(values: &[Value]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(4 + values.len() * 9);
    buf.extend_from_slice(&(values.len() as u32).to_le_bytes());
    for value in values {
        encode_value(value, &mut buf);
    }
    buf
}

fn encode_value(value: &Value, buf: &mut Vec<u8>) {
    match value {
        Value::Null => buf.push(TAG_NULL),
        Value::Bool(v) => {
            buf.push(TAG_BOOL);
            buf.push(u8::from(*v));
        }
        Value::Int(v) => {
            buf.push(TAG_INT);
            buf.extend_from_slice(&v.to_le_bytes());
        }
        Value::Float(v) => {
            buf.push(TAG_FLOAT);
            buf.extend_from_slice(&v.to_bits().to_le_bytes());
        }
        Value::Str(s) => {
            buf.push(TAG_STR);
            buf.extend_from_slice(&(s.len() as u32).to_le_bytes());
            buf.extend_from_slice(s.as_bytes());
        }
        Value::Array(items) => {
            buf.push(TAG_ARRAY);
            buf.extend_from_slice(&(items.len() as u32).to_le_bytes());
            for item in items {
                encode_value(item, buf);
            }
        }
    }
}

/// Decode a full column, rejecting trailing bytes.
pub fn decode_column(data: &[u8]) -> io::Result<Vec<Value>> {
    let mut cursor = Cursor::new(data);
    let count = read_len(&mut cursor)?;

    // Every value takes at least one byte.
    if count > remaining(&cursor) {
        return Err(invalid(format!(
            "Row count {} exceeds entry size {}",
            count,
            data.len()
        )));
    }

    let mut values = Vec::with_capacity(count);
    for _ in 0..count {
        values.push(decode_value(&mut cursor, 0)?);
    }

    if remaining(&cursor) != 0 {
        return Err(invalid(format!(
            "{} trailing bytes after {} values",
            remaining(&cursor),
            count
        )));
    }
    Ok(values)
}

fn decode_value(cursor: &mut Cursor<&[u8]>, depth: usize) -> io::Result<Value> {
    if depth > MAX_DEPTH {
        return Err(invalid(format!("Array nesting deeper than {}", MAX_DEPTH)));
    }

    let mut tag = [0u8; 1];
    cursor.read_exact(&mut tag)?;

    match tag[0] {
        TAG_NULL => Ok(Value::Null),
        TAG_BOOL => {
            let mut b = [0u8; 1];
            cursor.read_exact(&mut b)?;
            match b[0] {
                0 => Ok(Value::Bool(false)),
                1 => Ok(Value::Bool(true)),
                other => Err(invalid(format!("Invalid bool byte: {}", other))),
            }
        }
        TAG_INT => {
            let mut b = [0u8; 8];
            cursor.read_exact(&mut b)?;
            Ok(Value::Int(i64::from_le_bytes(b)))
        }
        TAG_FLOAT => {
            let mut b = [0u8; 8];
            cursor.read_exact(&mut b)?;
            Ok(Value::Float(f64::from_bits(u64::from_le_bytes(b))))
        }
        TAG_STR => {
            let len = read_len(cursor)?;
            if len > remaining(cursor) {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "String truncated",
                ));
            }
            let mut buf = vec![0u8; len];
            cursor.read_exact(&mut buf)?;
            String::from_utf8(buf)
                .map(Value::Str)
                .map_err(|e| invalid(format!("Invalid UTF-8: {}", e)))
        }
        TAG_ARRAY => {
            let count = read_len(cursor)?;
            if count > remaining(cursor) {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "Array truncated",
                ));
            }
            let mut items = Vec::with_capacity(count);
            for _ in 0..count {
                items.push(decode_value(cursor, depth + 1)?);
            }
            Ok(Value::Array(items))
        }
        other => Err(invalid(format!("Unknown value tag: {}", other))),
    }
}

fn read_len(cursor: &mut Cursor<&[u8]>) -> io::Result<usize> {
    let mut b = [0u8; 4];
    cursor.read_exact(&mut b)?;
    Ok(u32::from_le_bytes(b) as usize)
}

fn remaining(cursor: &Cursor<&[u8]>) -> usize {
    cursor.get_ref().len().saturating_sub(cursor.position() as usize)
}

fn invalid(message: String) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ragged_column_survives() {
        let column = vec![
            Value::from(vec![0]),
            Value::from(vec![0, 1, 2]),
            Value::from(vec![Value::from("x"), Value::from(vec![1.5, 2.5]), Value::Null]),
        ];
        let decoded = decode_column(&encode_column(&column)).unwrap();
        assert_eq!(decoded, column);
    }

    #[test]
    fn test_float_bits_preserved() {
        let column = vec![Value::Float(f64::INFINITY), Value::Float(-0.0)];
        let decoded = decode_column(&encode_column(&column)).unwrap();
        assert_eq!(decoded[0], Value::Float(f64::INFINITY));
        match decoded[1] {
            Value::Float(v) => assert!(v == 0.0 && v.is_sign_negative()),
            ref other => panic!("expected float, got {:?}", other),
        }

        let nan = decode_column(&encode_column(&[Value::Float(f64::NAN)])).unwrap();
        assert!(matches!(nan[0], Value::Float(v) if v.is_nan()));
    }

    #[test]
    fn test_unknown_tag_rejected() {
        let mut bytes = 1u32.to_le_bytes().to_vec();
        bytes.push(42);
        let err = decode_column(&bytes).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn test_trailing_bytes_rejected() {
        let mut bytes = encode_column(&[Value::Int(1)]);
        bytes.push(0);
        assert!(decode_column(&bytes).is_err());
    }

    #[test]
    fn test_oversized_count_rejected() {
        let bytes = u32::MAX.to_le_bytes().to_vec();
        assert!(decode_column(&bytes).is_err());
    }

    #[test]
    fn test_nesting_limit() {
        let mut value = Value::Null;
        for _ in 0..(MAX_DEPTH + 2) {
            value = Value::Array(vec![value]);
        }
        let err = decode_column(&encode_column(&[value])).unwrap_err();
        assert!(err.to_string().contains("nesting"));
    }
}
