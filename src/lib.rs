//! Schema-driven transcoding between JSON and the Antelope binary wire
//! format.
//!
//! # Overview
//!
//! Contracts on Antelope-style ledgers publish an *ABI*: a schema document
//! declaring named types, structs with single-base inheritance, aliases,
//! arrays, optionals, and a fixed catalog of built-in leaf types. Given
//! such a schema, this crate translates action payloads and table rows in
//! both directions:
//!
//! - [`json_to_bin`] drives an event stream from a JSON document through
//!   the resolved type graph and emits the compact binary form;
//! - [`bin_to_json`] walks the same graph over a byte buffer and emits
//!   JSON text;
//! - [`RawAbi`] loads the schema document itself, from JSON or from its
//!   binary blob form, and [`Contract`] resolves it into the type graph
//!   both engines consume.
//!
//! The wire format is little-endian and unaligned: LEB128 (`varuint32`)
//! length prefixes for strings, byte blobs and arrays, one-byte presence
//! tags for optionals, and flattened field concatenation for structs.
//! Domain scalars (names, symbols, assets, timestamps, keys) are packed
//! numeric forms with derived textual views.
//!
//! # Example
//!
//! ```
//! use abiwire::{bin_to_json, json_to_bin, Contract, RawAbi};
//!
//! let abi = RawAbi::from_json(br#"{
//!     "version": "eosio::abi/1.0",
//!     "structs": [{
//!         "name": "transfer",
//!         "base": "",
//!         "fields": [
//!             {"name": "from", "type": "name"},
//!             {"name": "to", "type": "name"},
//!             {"name": "quantity", "type": "asset"},
//!             {"name": "memo", "type": "string"}
//!         ]
//!     }],
//!     "actions": [{"name": "transfer", "type": "transfer", "ricardian_contract": ""}]
//! }"#).unwrap();
//! let contract = Contract::from_abi(&abi).unwrap();
//!
//! let json = r#"{"from":"alice","to":"bob","quantity":"1.0000 EOS","memo":"hi"}"#;
//! let bin = json_to_bin(&contract, "transfer", json).unwrap();
//! assert_eq!(bin_to_json(&contract, "transfer", &bin).unwrap(), json);
//! ```
//!
//! # Guarantees and limits
//!
//! Object keys must arrive in declaration order and every declared field
//! must be present; 64-bit and wider integers travel through JSON as
//! strings so no consumer rounds them through a double. Schema resolution
//! is capped at depth 32, document walks at depth 128, and every failure
//! is terminal: one error, annotated with the schema path where encoding
//! stopped, and no partial output.
//!
//! A [`Contract`] is immutable once built and can be shared freely across
//! threads; per-call codec state is private to each call.

pub mod abi;
pub mod bin;
pub mod contract;
pub mod crypto;
pub mod decode;
pub mod encode;
pub mod error;
pub mod name;
pub mod primitives;
pub mod symbol;
pub mod time;
pub mod varint;

pub use crate::abi::{Bytes, RawAbi};
pub use crate::contract::{AbiField, AbiType, Contract, TypeId, TypeKind};
pub use crate::decode::bin_to_json;
pub use crate::encode::json_to_bin;
pub use crate::error::{Error, ErrorKind, Result};
pub use crate::name::{name_to_string, string_to_name, Name};
pub use crate::primitives::Primitive;
pub use crate::symbol::{Asset, Symbol, SymbolCode};
pub use crate::time::{BlockTimestamp, TimePoint, TimePointSec};
