//! The literal ABI document and its codecs.
//!
//! [`RawAbi`] mirrors the schema document exactly as published: flat record
//! lists without cross-references. Resolution into a usable type graph is
//! the job of [`Contract`](crate::contract::Contract).
//!
//! Two transport forms are supported. The JSON form goes through `serde`;
//! unknown keys in a document are skipped rather than rejected, so ABIs
//! carrying forward-compatible extensions still load. The binary form reads
//! and writes the same fields in declaration order, each list prefixed with
//! a `varuint32` count, which is the layout ABI blobs use on chain.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::bin::InputBuffer;
use crate::error::{Error, ErrorKind, Result};
use crate::name::Name;
use crate::varint::{read_varuint32, write_varuint32};

/// A variable-length byte blob whose JSON form is an even-length hex string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Bytes(pub Vec<u8>);

impl From<Vec<u8>> for Bytes {
    fn from(v: Vec<u8>) -> Self {
        Bytes(v)
    }
}

impl Serialize for Bytes {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(&self.0))
    }
}

impl<'de> Deserialize<'de> for Bytes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex::decode(&s)
            .map(Bytes)
            .map_err(|_| serde::de::Error::custom("expected hex string"))
    }
}

/// A type alias declaration: `new_type_name` stands for `ty`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDef {
    #[serde(default)]
    pub new_type_name: String,
    #[serde(default, rename = "type")]
    pub ty: String,
}

/// One field of a struct declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "type")]
    pub ty: String,
}

/// A struct declaration with optional single inheritance through `base`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructDef {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub base: String,
    #[serde(default)]
    pub fields: Vec<FieldDef>,
}

/// Binds an action name to the type that encodes its payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionDef {
    #[serde(default)]
    pub name: Name,
    #[serde(default, rename = "type")]
    pub ty: String,
    #[serde(default)]
    pub ricardian_contract: String,
}

/// Declares a contract table and its key layout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDef {
    #[serde(default)]
    pub name: Name,
    #[serde(default)]
    pub index_type: String,
    #[serde(default)]
    pub key_names: Vec<String>,
    #[serde(default)]
    pub key_types: Vec<String>,
    #[serde(default, rename = "type")]
    pub ty: String,
}

/// A ricardian clause: identifier plus legal text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClausePair {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub body: String,
}

/// Maps a numeric error code to its human-readable message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorMessage {
    #[serde(default)]
    pub error_code: u64,
    #[serde(default)]
    pub error_msg: String,
}

fn default_version() -> String {
    "eosio::abi/1.0".to_owned()
}

/// The schema document, exactly as written: plain records, no
/// cross-references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawAbi {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub types: Vec<TypeDef>,
    #[serde(default)]
    pub structs: Vec<StructDef>,
    #[serde(default)]
    pub actions: Vec<ActionDef>,
    #[serde(default)]
    pub tables: Vec<TableDef>,
    #[serde(default)]
    pub ricardian_clauses: Vec<ClausePair>,
    #[serde(default)]
    pub error_messages: Vec<ErrorMessage>,
    #[serde(default)]
    pub abi_extensions: Vec<(u16, Bytes)>,
}

impl Default for RawAbi {
    fn default() -> Self {
        RawAbi {
            version: default_version(),
            types: Vec::new(),
            structs: Vec::new(),
            actions: Vec::new(),
            tables: Vec::new(),
            ricardian_clauses: Vec::new(),
            error_messages: Vec::new(),
            abi_extensions: Vec::new(),
        }
    }
}

impl RawAbi {
    /// Loads an ABI document from JSON text.
    pub fn from_json(json: &[u8]) -> Result<Self> {
        serde_json::from_slice(json).map_err(|e| Error::from(ErrorKind::from(e)))
    }

    /// Dumps the document back to compact JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| Error::from(ErrorKind::from(e)))
    }

    /// Loads an ABI document from its binary blob form.
    pub fn from_bin(bin: &[u8]) -> Result<Self> {
        let mut buf = InputBuffer::new(bin);
        BinRecord::read_bin(&mut buf).map_err(Error::from)
    }

    /// Serializes the document to its binary blob form.
    pub fn to_bin(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.write_bin(&mut out);
        out
    }
}

/// Field-ordered binary codec shared by every ABI record.
///
/// Aggregates write their fields in declaration order; lists carry a
/// `varuint32` element count.
trait BinRecord: Sized {
    fn write_bin(&self, out: &mut Vec<u8>);
    fn read_bin(bin: &mut InputBuffer<'_>) -> std::result::Result<Self, ErrorKind>;
}

impl BinRecord for String {
    fn write_bin(&self, out: &mut Vec<u8>) {
        write_varuint32(out, self.len() as u32);
        out.extend_from_slice(self.as_bytes());
    }

    fn read_bin(bin: &mut InputBuffer<'_>) -> std::result::Result<Self, ErrorKind> {
        let len = read_varuint32(bin)? as usize;
        let raw = bin.read_exact(len)?;
        String::from_utf8(raw.to_vec())
            .map_err(|_| ErrorKind::Parse("string is not valid UTF-8".to_owned()))
    }
}

impl BinRecord for Bytes {
    fn write_bin(&self, out: &mut Vec<u8>) {
        write_varuint32(out, self.0.len() as u32);
        out.extend_from_slice(&self.0);
    }

    fn read_bin(bin: &mut InputBuffer<'_>) -> std::result::Result<Self, ErrorKind> {
        let len = read_varuint32(bin)? as usize;
        Ok(Bytes(bin.read_exact(len)?.to_vec()))
    }
}

impl BinRecord for u16 {
    fn write_bin(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.to_le_bytes());
    }

    fn read_bin(bin: &mut InputBuffer<'_>) -> std::result::Result<Self, ErrorKind> {
        bin.read_u16()
    }
}

impl BinRecord for u64 {
    fn write_bin(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.to_le_bytes());
    }

    fn read_bin(bin: &mut InputBuffer<'_>) -> std::result::Result<Self, ErrorKind> {
        bin.read_u64()
    }
}

impl BinRecord for Name {
    fn write_bin(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.value().to_le_bytes());
    }

    fn read_bin(bin: &mut InputBuffer<'_>) -> std::result::Result<Self, ErrorKind> {
        bin.read_u64().map(Name::new)
    }
}

impl<T: BinRecord> BinRecord for Vec<T> {
    fn write_bin(&self, out: &mut Vec<u8>) {
        write_varuint32(out, self.len() as u32);
        for item in self {
            item.write_bin(out);
        }
    }

    fn read_bin(bin: &mut InputBuffer<'_>) -> std::result::Result<Self, ErrorKind> {
        let count = read_varuint32(bin)? as usize;
        let mut items = Vec::with_capacity(count.min(bin.remaining()));
        for _ in 0..count {
            items.push(T::read_bin(bin)?);
        }
        Ok(items)
    }
}

impl<A: BinRecord, B: BinRecord> BinRecord for (A, B) {
    fn write_bin(&self, out: &mut Vec<u8>) {
        self.0.write_bin(out);
        self.1.write_bin(out);
    }

    fn read_bin(bin: &mut InputBuffer<'_>) -> std::result::Result<Self, ErrorKind> {
        Ok((A::read_bin(bin)?, B::read_bin(bin)?))
    }
}

macro_rules! bin_record {
    ($ty:ty { $($field:ident),+ $(,)? }) => {
        impl BinRecord for $ty {
            fn write_bin(&self, out: &mut Vec<u8>) {
                $(self.$field.write_bin(out);)+
            }

            fn read_bin(bin: &mut InputBuffer<'_>) -> std::result::Result<Self, ErrorKind> {
                Ok(Self { $($field: BinRecord::read_bin(bin)?),+ })
            }
        }
    };
}

bin_record!(TypeDef { new_type_name, ty });
bin_record!(FieldDef { name, ty });
bin_record!(StructDef { name, base, fields });
bin_record!(ActionDef { name, ty, ricardian_contract });
bin_record!(TableDef { name, index_type, key_names, key_types, ty });
bin_record!(ClausePair { id, body });
bin_record!(ErrorMessage { error_code, error_msg });
bin_record!(RawAbi {
    version,
    types,
    structs,
    actions,
    tables,
    ricardian_clauses,
    error_messages,
    abi_extensions,
});
