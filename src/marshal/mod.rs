//! Type codecs for rendering raw column bytes.
//!
//! A `MarshalType` is resolved once per run from a canonical type name
//! (e.g. `UTF8Type` or `org.apache.cassandra.db.marshal.LongType`) and then
//! shared read-only by every row the printer renders.

mod parser;

use crate::error::{CqlExecError, Result};
use chrono::{DateTime, Utc};
use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};
use uuid::Uuid;

/// A resolved column type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarshalType {
    /// Raw bytes, rendered as lowercase hex.
    Bytes,
    Utf8,
    Ascii,
    /// 8-byte signed big-endian integer.
    Long,
    /// Counter columns share the long encoding.
    Counter,
    /// 4-byte signed big-endian integer.
    Int32,
    /// Arbitrary precision two's-complement integer.
    Integer,
    /// 4-byte scale followed by an arbitrary precision unscaled value.
    Decimal,
    Boolean,
    Double,
    Float,
    /// Milliseconds since the epoch.
    Date,
    Uuid,
    TimeUuid,
    LexicalUuid,
    InetAddress,
    /// Same encoding as the inner type, reversed sort order.
    Reversed(Box<MarshalType>),
    /// Length-prefixed components, each followed by an end-of-component byte.
    Composite(Vec<MarshalType>),
}

impl MarshalType {
    /// Resolves a canonical type name.
    ///
    /// The `org.apache.cassandra.db.marshal.` package prefix is optional and
    /// `ReversedType(...)` / `CompositeType(...)` parameters may nest.
    pub fn parse(name: &str) -> Result<Self> {
        parser::parse(name)
    }

    /// Renders raw bytes as a human-readable string.
    pub fn get_string(&self, bytes: &[u8]) -> Result<String> {
        match self {
            Self::Bytes => Ok(hex::encode(bytes)),
            Self::Utf8 => std::str::from_utf8(bytes)
                .map(str::to_string)
                .map_err(|e| CqlExecError::decode(format!("invalid UTF8 bytes: {e}"))),
            Self::Ascii => {
                if bytes.is_ascii() {
                    Ok(bytes.iter().map(|&b| b as char).collect())
                } else {
                    Err(CqlExecError::decode("invalid ASCII bytes"))
                }
            }
            Self::Long | Self::Counter => {
                Ok(fixed::<8>(self, bytes)?.map_or_else(String::new, |b| {
                    i64::from_be_bytes(b).to_string()
                }))
            }
            Self::Int32 => Ok(fixed::<4>(self, bytes)?
                .map_or_else(String::new, |b| i32::from_be_bytes(b).to_string())),
            Self::Integer => Ok(varint_to_string(bytes)),
            Self::Decimal => decimal_to_string(bytes),
            Self::Boolean => Ok(fixed::<1>(self, bytes)?
                .map_or_else(String::new, |b| (b[0] != 0).to_string())),
            Self::Double => Ok(fixed::<8>(self, bytes)?
                .map_or_else(String::new, |b| format!("{:?}", f64::from_be_bytes(b)))),
            Self::Float => Ok(fixed::<4>(self, bytes)?
                .map_or_else(String::new, |b| format!("{:?}", f32::from_be_bytes(b)))),
            Self::Date => match fixed::<8>(self, bytes)? {
                None => Ok(String::new()),
                Some(b) => {
                    let millis = i64::from_be_bytes(b);
                    DateTime::<Utc>::from_timestamp_millis(millis)
                        .map(|ts| ts.format("%Y-%m-%d %H:%M:%S%z").to_string())
                        .ok_or_else(|| {
                            CqlExecError::decode(format!("date {millis} is out of range"))
                        })
                }
            },
            Self::Uuid | Self::TimeUuid | Self::LexicalUuid => {
                if bytes.is_empty() {
                    return Ok(String::new());
                }
                Uuid::from_slice(bytes)
                    .map(|uuid| uuid.hyphenated().to_string())
                    .map_err(|_| {
                        CqlExecError::decode(format!(
                            "{self} expects 16 or 0 bytes, got {}",
                            bytes.len()
                        ))
                    })
            }
            Self::InetAddress => match bytes.len() {
                0 => Ok(String::new()),
                4 => {
                    let octets: [u8; 4] = fixed::<4>(self, bytes)?.unwrap_or_default();
                    Ok(Ipv4Addr::from(octets).to_string())
                }
                16 => {
                    let octets: [u8; 16] = fixed::<16>(self, bytes)?.unwrap_or_default();
                    Ok(Ipv6Addr::from(octets).to_string())
                }
                n => Err(CqlExecError::decode(format!(
                    "{self} expects 4 or 16 bytes, got {n}"
                ))),
            },
            Self::Reversed(inner) => inner.get_string(bytes),
            Self::Composite(components) => composite_to_string(self, components, bytes),
        }
    }
}

impl fmt::Display for MarshalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Bytes => "BytesType",
            Self::Utf8 => "UTF8Type",
            Self::Ascii => "AsciiType",
            Self::Long => "LongType",
            Self::Counter => "CounterColumnType",
            Self::Int32 => "Int32Type",
            Self::Integer => "IntegerType",
            Self::Decimal => "DecimalType",
            Self::Boolean => "BooleanType",
            Self::Double => "DoubleType",
            Self::Float => "FloatType",
            Self::Date => "DateType",
            Self::Uuid => "UUIDType",
            Self::TimeUuid => "TimeUUIDType",
            Self::LexicalUuid => "LexicalUUIDType",
            Self::InetAddress => "InetAddressType",
            Self::Reversed(inner) => return write!(f, "ReversedType({inner})"),
            Self::Composite(components) => {
                let names: Vec<String> = components.iter().map(ToString::to_string).collect();
                return write!(f, "CompositeType({})", names.join(","));
            }
        };
        f.write_str(name)
    }
}

/// Interprets a fixed-width value; empty input means "no value".
fn fixed<const N: usize>(ty: &MarshalType, bytes: &[u8]) -> Result<Option<[u8; N]>> {
    if bytes.is_empty() {
        return Ok(None);
    }
    bytes.try_into().map(Some).map_err(|_| {
        CqlExecError::decode(format!(
            "{ty} expects {N} or 0 bytes, got {}",
            bytes.len()
        ))
    })
}

/// Renders a big-endian two's-complement integer of any length in decimal.
fn varint_to_string(bytes: &[u8]) -> String {
    if bytes.is_empty() {
        return String::new();
    }
    let negative = bytes[0] & 0x80 != 0;
    let mut magnitude = if negative {
        negate(bytes)
    } else {
        bytes.to_vec()
    };

    let mut digits = Vec::new();
    while magnitude.iter().any(|&b| b != 0) {
        let mut remainder = 0u32;
        for byte in magnitude.iter_mut() {
            let acc = (remainder << 8) | u32::from(*byte);
            *byte = (acc / 10) as u8;
            remainder = acc % 10;
        }
        digits.push(char::from(b'0' + remainder as u8));
    }
    if digits.is_empty() {
        digits.push('0');
    }
    if negative {
        digits.push('-');
    }
    digits.iter().rev().collect()
}

fn negate(bytes: &[u8]) -> Vec<u8> {
    let mut out: Vec<u8> = bytes.iter().map(|b| !b).collect();
    for byte in out.iter_mut().rev() {
        let (value, overflow) = byte.overflowing_add(1);
        *byte = value;
        if !overflow {
            break;
        }
    }
    out
}

/// Renders a decimal the way the node's own tooling prints it.
///
/// Plain notation is used only while the scale is non-negative and the
/// adjusted exponent is at least -6; everything else is `dE±n`, so the output
/// length is bounded by the number of unscaled digits.
fn decimal_to_string(bytes: &[u8]) -> Result<String> {
    if bytes.is_empty() {
        return Ok(String::new());
    }
    if bytes.len() < 4 {
        return Err(CqlExecError::decode(format!(
            "DecimalType expects at least 4 bytes, got {}",
            bytes.len()
        )));
    }
    let (scale_bytes, unscaled) = bytes.split_at(4);
    let scale = i64::from(i32::from_be_bytes([
        scale_bytes[0],
        scale_bytes[1],
        scale_bytes[2],
        scale_bytes[3],
    ]));
    let unscaled = varint_to_string(unscaled);
    let (sign, digits) = match unscaled.strip_prefix('-') {
        Some(digits) => ("-", digits.to_string()),
        None if unscaled.is_empty() => ("", "0".to_string()),
        None => ("", unscaled),
    };

    let adjusted = (digits.len() as i64 - 1) - scale;

    if scale == 0 {
        return Ok(format!("{sign}{digits}"));
    }
    if scale > 0 && adjusted >= -6 {
        // Bounded: adjusted >= -6 keeps scale within digits.len() + 5.
        let scale = scale as usize;
        let padded = if digits.len() <= scale {
            format!("{}{digits}", "0".repeat(scale + 1 - digits.len()))
        } else {
            digits
        };
        let (whole, fraction) = padded.split_at(padded.len() - scale);
        return Ok(format!("{sign}{whole}.{fraction}"));
    }

    let (first, rest) = digits.split_at(1);
    let mut out = format!("{sign}{first}");
    if !rest.is_empty() {
        out.push('.');
        out.push_str(rest);
    }
    if adjusted != 0 {
        out.push('E');
        if adjusted > 0 {
            out.push('+');
        }
        out.push_str(&adjusted.to_string());
    }
    Ok(out)
}

fn composite_to_string(
    ty: &MarshalType,
    components: &[MarshalType],
    bytes: &[u8],
) -> Result<String> {
    let mut out = String::new();
    let mut rest = bytes;
    let mut index = 0;

    while !rest.is_empty() {
        if index > 0 {
            out.push(':');
        }
        let component = components.get(index).ok_or_else(|| {
            CqlExecError::decode(format!(
                "{ty} value has more than {} components",
                components.len()
            ))
        })?;
        if rest.len() < 2 {
            return Err(CqlExecError::decode(format!(
                "{ty} component {index} is missing its length"
            )));
        }
        let len = usize::from(u16::from_be_bytes([rest[0], rest[1]]));
        rest = &rest[2..];
        if rest.len() < len + 1 {
            return Err(CqlExecError::decode(format!(
                "{ty} component {index} is truncated"
            )));
        }
        let (value, tail) = rest.split_at(len);
        out.push_str(&component.get_string(value)?.replace(':', "\\:"));

        let end_of_component = tail[0] as i8;
        rest = &tail[1..];
        if end_of_component != 0 {
            out.push_str(if end_of_component < 0 { ":_" } else { ":!" });
            break;
        }
        index += 1;
    }

    Ok(out)
}
