//! The built-in leaf types and their codecs.
//!
//! Every leaf the schema language knows is one variant of [`Primitive`], so
//! each codec direction is a single match site: [`Primitive::encode`] turns
//! one JSON event into appended wire bytes, [`Primitive::decode`] turns
//! wire bytes into one JSON value.
//!
//! Numeric policy: integers wider than 32 bits travel through JSON as
//! strings in both directions, because JSON consumers routinely read
//! numbers as doubles and would corrupt them. Narrower integers and floats
//! are JSON numbers; `bool` is a JSON bool but also accepts `0`/`1`
//! numerals on encode.

use serde_json::Value;

use crate::bin::InputBuffer;
use crate::crypto::{KeyType, PrivateKey, PublicKey, Signature};
use crate::encode::Event;
use crate::error::ErrorKind;
use crate::name::{name_to_string, string_to_name};
use crate::symbol::{
    asset_to_string, string_to_asset, string_to_symbol, string_to_symbol_code,
    symbol_code_to_string, symbol_to_string, Asset, Symbol,
};
use crate::time::{BlockTimestamp, TimePoint, TimePointSec};
use crate::varint::{read_varint32, read_varuint32, write_varint32, write_varuint32};

/// One of the built-in leaf types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Bool,
    Int8,
    Uint8,
    Int16,
    Uint16,
    Int32,
    Uint32,
    Int64,
    Uint64,
    Int128,
    Uint128,
    Varuint32,
    Varint32,
    Float32,
    Float64,
    Float128,
    TimePoint,
    TimePointSec,
    BlockTimestamp,
    Name,
    Bytes,
    String,
    Checksum160,
    Checksum256,
    Checksum512,
    PublicKey,
    PrivateKey,
    Signature,
    Symbol,
    SymbolCode,
    Asset,
}

impl Primitive {
    /// The schema-visible name of every built-in, in catalog order.
    pub const CATALOG: &'static [(&'static str, Primitive)] = &[
        ("bool", Primitive::Bool),
        ("int8", Primitive::Int8),
        ("uint8", Primitive::Uint8),
        ("int16", Primitive::Int16),
        ("uint16", Primitive::Uint16),
        ("int32", Primitive::Int32),
        ("uint32", Primitive::Uint32),
        ("int64", Primitive::Int64),
        ("uint64", Primitive::Uint64),
        ("int128", Primitive::Int128),
        ("uint128", Primitive::Uint128),
        ("varuint32", Primitive::Varuint32),
        ("varint32", Primitive::Varint32),
        ("float32", Primitive::Float32),
        ("float64", Primitive::Float64),
        ("float128", Primitive::Float128),
        ("time_point", Primitive::TimePoint),
        ("time_point_sec", Primitive::TimePointSec),
        ("block_timestamp_type", Primitive::BlockTimestamp),
        ("name", Primitive::Name),
        ("bytes", Primitive::Bytes),
        ("string", Primitive::String),
        ("checksum160", Primitive::Checksum160),
        ("checksum256", Primitive::Checksum256),
        ("checksum512", Primitive::Checksum512),
        ("public_key", Primitive::PublicKey),
        ("private_key", Primitive::PrivateKey),
        ("signature", Primitive::Signature),
        ("symbol", Primitive::Symbol),
        ("symbol_code", Primitive::SymbolCode),
        ("asset", Primitive::Asset),
    ];

    /// Converts one JSON event into this leaf's wire bytes, appended to
    /// `out`.
    pub fn encode(self, event: &Event<'_>, out: &mut Vec<u8>) -> Result<(), ErrorKind> {
        match self {
            Primitive::Bool => {
                let v = event_u64(event)?;
                out.push(byte_ranged(v)?);
            }
            Primitive::Int8 => out.extend_from_slice(&int_ranged::<i8>(event)?.to_le_bytes()),
            Primitive::Uint8 => out.extend_from_slice(&uint_ranged::<u8>(event)?.to_le_bytes()),
            Primitive::Int16 => out.extend_from_slice(&int_ranged::<i16>(event)?.to_le_bytes()),
            Primitive::Uint16 => out.extend_from_slice(&uint_ranged::<u16>(event)?.to_le_bytes()),
            Primitive::Int32 => out.extend_from_slice(&int_ranged::<i32>(event)?.to_le_bytes()),
            Primitive::Uint32 => out.extend_from_slice(&uint_ranged::<u32>(event)?.to_le_bytes()),
            Primitive::Int64 => out.extend_from_slice(&event_i64(event)?.to_le_bytes()),
            Primitive::Uint64 => out.extend_from_slice(&event_u64(event)?.to_le_bytes()),
            Primitive::Int128 => {
                let s = event_str(event, "string containing int128")?;
                out.extend_from_slice(&parse_i128(s)?.to_le_bytes());
            }
            Primitive::Uint128 => {
                let s = event_str(event, "string containing uint128")?;
                out.extend_from_slice(&parse_u128(s)?.to_le_bytes());
            }
            Primitive::Varuint32 => write_varuint32(out, uint_ranged::<u32>(event)?),
            Primitive::Varint32 => write_varint32(out, int_ranged::<i32>(event)?),
            Primitive::Float32 => {
                out.extend_from_slice(&event_f32(event)?.to_le_bytes());
            }
            Primitive::Float64 => {
                out.extend_from_slice(&event_f64(event)?.to_le_bytes());
            }
            Primitive::Float128 => fixed_hex(event, 16, "string containing hex", out)?,
            Primitive::TimePoint => {
                let s = event_str(event, "string containing time_point")?;
                out.extend_from_slice(&TimePoint::parse(s)?.0.to_le_bytes());
            }
            Primitive::TimePointSec => {
                let s = event_str(event, "string containing time_point_sec")?;
                out.extend_from_slice(&TimePointSec::parse(s)?.0.to_le_bytes());
            }
            Primitive::BlockTimestamp => {
                let s = event_str(event, "string containing block_timestamp")?;
                out.extend_from_slice(&BlockTimestamp::parse(s)?.0.to_le_bytes());
            }
            Primitive::Name => {
                let s = event_str(event, "string containing name")?;
                out.extend_from_slice(&string_to_name(s).to_le_bytes());
            }
            Primitive::Bytes => {
                let s = event_str(event, "string containing hex digits")?;
                if s.len() % 2 != 0 {
                    return Err(ErrorKind::OutOfRange("odd number of hex digits".to_owned()));
                }
                let raw = hex::decode(s)
                    .map_err(|_| ErrorKind::Parse("expected hex string".to_owned()))?;
                write_varuint32(out, raw.len() as u32);
                out.extend_from_slice(&raw);
            }
            Primitive::String => {
                let s = event_str(event, "string")?;
                write_varuint32(out, s.len() as u32);
                out.extend_from_slice(s.as_bytes());
            }
            Primitive::Checksum160 => fixed_hex(event, 20, "string containing hex", out)?,
            Primitive::Checksum256 => fixed_hex(event, 32, "string containing hex", out)?,
            Primitive::Checksum512 => fixed_hex(event, 64, "string containing hex", out)?,
            Primitive::PublicKey => {
                let s = event_str(event, "string containing public_key")?;
                let key: PublicKey = s.parse()?;
                out.push(key.key_type as u8);
                out.extend_from_slice(&key.data);
            }
            Primitive::PrivateKey => {
                let s = event_str(event, "string containing private_key")?;
                let key: PrivateKey = s.parse()?;
                out.push(key.key_type as u8);
                out.extend_from_slice(&key.data);
            }
            Primitive::Signature => {
                let s = event_str(event, "string containing signature")?;
                let sig: Signature = s.parse()?;
                out.push(sig.key_type as u8);
                out.extend_from_slice(&sig.data);
            }
            Primitive::Symbol => {
                let s = event_str(event, "string containing symbol")?;
                out.extend_from_slice(&string_to_symbol(s).to_le_bytes());
            }
            Primitive::SymbolCode => {
                let s = event_str(event, "string containing symbol_code")?;
                out.extend_from_slice(&string_to_symbol_code(s).to_le_bytes());
            }
            Primitive::Asset => {
                let s = event_str(event, "string containing asset")?;
                let v = string_to_asset(s)?;
                out.extend_from_slice(&v.amount.to_le_bytes());
                out.extend_from_slice(&v.symbol.value().to_le_bytes());
            }
        }
        Ok(())
    }

    /// Reads this leaf's wire bytes and produces its JSON value.
    pub fn decode(self, bin: &mut InputBuffer<'_>) -> Result<Value, ErrorKind> {
        Ok(match self {
            Primitive::Bool => Value::Bool(bin.read_byte()? != 0),
            Primitive::Int8 => Value::from(bin.read_byte()? as i8),
            Primitive::Uint8 => Value::from(bin.read_byte()?),
            Primitive::Int16 => Value::from(bin.read_i16()?),
            Primitive::Uint16 => Value::from(bin.read_u16()?),
            Primitive::Int32 => Value::from(bin.read_i32()?),
            Primitive::Uint32 => Value::from(bin.read_u32()?),
            Primitive::Int64 => Value::String(bin.read_i64()?.to_string()),
            Primitive::Uint64 => Value::String(bin.read_u64()?.to_string()),
            Primitive::Int128 => Value::String(bin.read_i128()?.to_string()),
            Primitive::Uint128 => Value::String(bin.read_u128()?.to_string()),
            Primitive::Varuint32 => Value::from(read_varuint32(bin)?),
            Primitive::Varint32 => Value::from(read_varint32(bin)?),
            Primitive::Float32 => finite_number(f64::from(bin.read_f32()?))?,
            Primitive::Float64 => finite_number(bin.read_f64()?)?,
            Primitive::Float128 => Value::String(hex::encode(bin.read_exact(16)?)),
            Primitive::TimePoint => Value::String(TimePoint(bin.read_u64()?).to_string()),
            Primitive::TimePointSec => Value::String(TimePointSec(bin.read_u32()?).to_string()),
            Primitive::BlockTimestamp => {
                Value::String(BlockTimestamp(bin.read_u32()?).to_string())
            }
            Primitive::Name => Value::String(name_to_string(bin.read_u64()?)),
            Primitive::Bytes => {
                let len = read_varuint32(bin)? as usize;
                Value::String(hex::encode(bin.read_exact(len)?))
            }
            Primitive::String => {
                let len = read_varuint32(bin)? as usize;
                let raw = bin.read_exact(len)?;
                Value::String(String::from_utf8(raw.to_vec()).map_err(|_| {
                    ErrorKind::Parse("string is not valid UTF-8".to_owned())
                })?)
            }
            Primitive::Checksum160 => Value::String(hex::encode(bin.read_exact(20)?)),
            Primitive::Checksum256 => Value::String(hex::encode(bin.read_exact(32)?)),
            Primitive::Checksum512 => Value::String(hex::encode(bin.read_exact(64)?)),
            Primitive::PublicKey => {
                let key_type = KeyType::from_tag(bin.read_byte()?)?;
                Value::String(PublicKey::new(key_type, bin.read_array()?).to_string())
            }
            Primitive::PrivateKey => {
                let key_type = KeyType::from_tag(bin.read_byte()?)?;
                Value::String(PrivateKey::new(key_type, bin.read_array()?).to_string())
            }
            Primitive::Signature => {
                let key_type = KeyType::from_tag(bin.read_byte()?)?;
                Value::String(Signature::new(key_type, bin.read_array()?).to_string())
            }
            Primitive::Symbol => Value::String(symbol_to_string(bin.read_u64()?)),
            Primitive::SymbolCode => Value::String(symbol_code_to_string(bin.read_u64()?)),
            Primitive::Asset => {
                let amount = bin.read_i64()?;
                let symbol = Symbol::new(bin.read_u64()?);
                Value::String(asset_to_string(&Asset { amount, symbol }))
            }
        })
    }
}

fn event_str<'e>(event: &'e Event<'_>, expected: &'static str) -> Result<&'e str, ErrorKind> {
    match event {
        Event::Str(s) => Ok(s.as_ref()),
        _ => Err(ErrorKind::TypeMismatch(expected)),
    }
}

fn bad_number() -> ErrorKind {
    ErrorKind::Parse("number is out of range or has bad format".to_owned())
}

fn out_of_range() -> ErrorKind {
    ErrorKind::OutOfRange("number is out of range".to_owned())
}

fn event_i64(event: &Event<'_>) -> Result<i64, ErrorKind> {
    match event {
        Event::Bool(b) => Ok(i64::from(*b)),
        Event::Str(s) => s.parse().map_err(|_| bad_number()),
        _ => Err(ErrorKind::TypeMismatch("number or boolean")),
    }
}

fn event_u64(event: &Event<'_>) -> Result<u64, ErrorKind> {
    match event {
        Event::Bool(b) => Ok(u64::from(*b)),
        Event::Str(s) => {
            if s.contains('-') {
                return Err(ErrorKind::TypeMismatch("non-negative number"));
            }
            s.parse().map_err(|_| bad_number())
        }
        _ => Err(ErrorKind::TypeMismatch("number or boolean")),
    }
}

fn event_f64(event: &Event<'_>) -> Result<f64, ErrorKind> {
    match event {
        Event::Bool(b) => Ok(f64::from(u8::from(*b))),
        Event::Str(s) => s.parse().map_err(|_| bad_number()),
        _ => Err(ErrorKind::TypeMismatch("number or boolean")),
    }
}

fn event_f32(event: &Event<'_>) -> Result<f32, ErrorKind> {
    match event {
        Event::Bool(b) => Ok(f32::from(u8::from(*b))),
        Event::Str(s) => s.parse().map_err(|_| bad_number()),
        _ => Err(ErrorKind::TypeMismatch("number or boolean")),
    }
}

fn int_ranged<T: TryFrom<i64>>(event: &Event<'_>) -> Result<T, ErrorKind> {
    T::try_from(event_i64(event)?).map_err(|_| out_of_range())
}

fn uint_ranged<T: TryFrom<u64>>(event: &Event<'_>) -> Result<T, ErrorKind> {
    T::try_from(event_u64(event)?).map_err(|_| out_of_range())
}

fn byte_ranged(v: u64) -> Result<u8, ErrorKind> {
    if v > 1 {
        return Err(out_of_range());
    }
    Ok(v as u8)
}

/// Parses an unsigned decimal magnitude: digits only, no signs, no blanks.
fn parse_u128(s: &str) -> Result<u128, ErrorKind> {
    if s.is_empty() || !s.bytes().all(|c| c.is_ascii_digit()) {
        return Err(bad_number());
    }
    s.parse().map_err(|_| out_of_range())
}

/// Parses a signed decimal with the sign-survives-negation check: `-0` and
/// magnitudes of 2^127 and beyond are out of range, so `i128::MIN` has no
/// text form.
fn parse_i128(s: &str) -> Result<i128, ErrorKind> {
    let (negative, magnitude) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    };
    let magnitude = parse_u128(magnitude)?;
    if magnitude > i128::MAX as u128 {
        return Err(out_of_range());
    }
    if negative {
        if magnitude == 0 {
            return Err(out_of_range());
        }
        Ok(-(magnitude as i128))
    } else {
        Ok(magnitude as i128)
    }
}

fn finite_number(v: f64) -> Result<Value, ErrorKind> {
    serde_json::Number::from_f64(v)
        .map(Value::Number)
        .ok_or_else(|| ErrorKind::OutOfRange("float is not finite".to_owned()))
}

fn fixed_hex(
    event: &Event<'_>,
    len: usize,
    expected: &'static str,
    out: &mut Vec<u8>,
) -> Result<(), ErrorKind> {
    let s = event_str(event, expected)?;
    let raw = hex::decode(s).map_err(|_| ErrorKind::Parse("expected hex string".to_owned()))?;
    if raw.len() != len {
        return Err(ErrorKind::OutOfRange(
            "hex string has incorrect length".to_owned(),
        ));
    }
    out.extend_from_slice(&raw);
    Ok(())
}
