//! The pull-driven binary→JSON engine.
//!
//! A mirror of the encoder: the resolved type graph steers a descent over
//! the input buffer, building the JSON value bottom-up. Leaves read their
//! wire form and produce one token; an optional reads its tag byte (`0`
//! emits `null`, `1` descends, anything else is rejected); an array reads
//! its `varuint32` count and decodes that many elements; a struct decodes
//! its flattened fields in declaration order under their names.
//!
//! The depth cap matches the encoder's. Input that ends early fails with
//! "read past end"; trailing bytes after a complete top-level value are a
//! caller concern and are not checked here.

use serde_json::Value;

use crate::bin::InputBuffer;
use crate::contract::{Contract, TypeId, TypeKind};
use crate::encode::MAX_STACK_DEPTH;
use crate::error::{Error, ErrorKind, Result};
use crate::varint::read_varuint32;

/// Decodes `bin` under the type `type_name` of `contract` into JSON text.
pub fn bin_to_json(contract: &Contract, type_name: &str, bin: &[u8]) -> Result<String> {
    let root = contract.resolve(type_name).map_err(Error::from)?;
    let mut buf = InputBuffer::new(bin);
    let value = decode_value(contract, root, &mut buf, 0).map_err(Error::from)?;
    serde_json::to_string(&value).map_err(|e| Error::from(ErrorKind::from(e)))
}

fn decode_value(
    contract: &Contract,
    type_id: TypeId,
    bin: &mut InputBuffer<'_>,
    depth: usize,
) -> Result<Value, ErrorKind> {
    match &contract.get(type_id).kind {
        TypeKind::Primitive(p) => p.decode(bin),
        TypeKind::Alias(target) => decode_value(contract, *target, bin, depth),
        TypeKind::Optional(inner) => match bin.read_byte()? {
            0 => Ok(Value::Null),
            1 => decode_value(contract, *inner, bin, depth),
            tag => Err(ErrorKind::InvalidTag(tag)),
        },
        TypeKind::Array(inner) => {
            if depth >= MAX_STACK_DEPTH {
                return Err(ErrorKind::RecursionLimit);
            }
            let count = read_varuint32(bin)? as usize;
            tracing::trace!(items = count, ty = %contract.get(type_id).name, "[");
            let mut items = Vec::with_capacity(count.min(bin.remaining()));
            for _ in 0..count {
                items.push(decode_value(contract, *inner, bin, depth + 1)?);
            }
            Ok(Value::Array(items))
        }
        TypeKind::Struct(s) => {
            if depth >= MAX_STACK_DEPTH {
                return Err(ErrorKind::RecursionLimit);
            }
            tracing::trace!(
                ty = %contract.get(type_id).name,
                fields = s.fields.len(),
                "{{"
            );
            let mut map = serde_json::Map::with_capacity(s.fields.len());
            for field in &s.fields {
                let value = decode_value(contract, field.type_id, bin, depth + 1)?;
                map.insert(field.name.clone(), value);
            }
            Ok(Value::Object(map))
        }
    }
}
