//! Schema resolution: from a literal [`RawAbi`] to a usable type graph.
//!
//! The graph lives in a flat arena of [`AbiType`] nodes addressed by
//! [`TypeId`], with a name index on the side; cross-references are plain
//! indices, so the graph can be cyclic (a struct may reference itself
//! through an optional field) without any ownership gymnastics.
//!
//! Resolution performs, in order: action registration, installation of the
//! built-in type catalog plus the implicit `extended_asset` struct, alias
//! declaration, struct declaration, alias chasing (chains collapse so that
//! every alias points at a non-alias terminal), and struct filling (base
//! fields first, recursively, then own fields). Synthetic `T?` and `T[]`
//! nodes are materialized for every eligible name during construction, so
//! the finished [`Contract`] is immutable and lookups at codec time are
//! read-only. Optionals and arrays do not nest; alias chains and base
//! chains deeper than 32 are rejected.

use std::collections::{BTreeMap, HashMap};

use crate::abi::{RawAbi, StructDef};
use crate::error::{Error, ErrorKind, Result};
use crate::name::Name;
use crate::primitives::Primitive;

/// Depth cap for alias chasing, suffix construction, and base inlining.
pub const SCHEMA_RECURSION_LIMIT: usize = 32;

/// Index of a node in a [`Contract`]'s type arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeId(usize);

/// One field of a resolved struct: the declared name and the resolved type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbiField {
    pub name: String,
    pub type_id: TypeId,
}

/// A resolved struct: the flattened field list, base fields first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StructType {
    pub fields: Vec<AbiField>,
    pub filled: bool,
}

/// The kind classifier of a resolved node; exactly one applies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeKind {
    Primitive(Primitive),
    /// Collapsed alias: the target is always a non-alias node.
    Alias(TypeId),
    Optional(TypeId),
    Array(TypeId),
    Struct(StructType),
}

/// A node of the resolved type graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbiType {
    pub name: String,
    pub kind: TypeKind,
}

/// The post-resolution artifact: a read-only type graph plus the
/// action-name → type-name table.
///
/// A `Contract` is created once from a [`RawAbi`] and never mutated again,
/// so it can be shared freely between concurrent callers.
#[derive(Debug, Clone)]
pub struct Contract {
    types: Vec<AbiType>,
    index: HashMap<String, TypeId>,
    action_types: BTreeMap<Name, String>,
}

impl Contract {
    /// Resolves a raw ABI document into its type graph.
    pub fn from_abi(abi: &RawAbi) -> Result<Self> {
        Builder::new(abi).build().map_err(Error::from)
    }

    /// The node behind `id`.
    pub fn get(&self, id: TypeId) -> &AbiType {
        &self.types[id.0]
    }

    /// Looks up `name` and collapses one alias hop, so the returned id is
    /// always a non-alias node. Synthetic suffix forms (`T?`, `T[]`) of any
    /// known type resolve too; nested suffix forms are rejected.
    pub fn resolve(&self, name: &str) -> Result<TypeId, ErrorKind> {
        if let Some(&id) = self.index.get(name) {
            return Ok(self.collapse(id));
        }
        let inner = name
            .strip_suffix('?')
            .or_else(|| name.strip_suffix("[]"));
        match inner {
            Some(inner) => {
                let inner_id = self.resolve(inner)?;
                match self.types[inner_id.0].kind {
                    TypeKind::Optional(_) | TypeKind::Array(_) => {
                        Err(ErrorKind::NestedOptionalOrArray)
                    }
                    _ => Err(ErrorKind::UnknownType(name.to_owned())),
                }
            }
            None => Err(ErrorKind::UnknownType(name.to_owned())),
        }
    }

    /// The type name an action's payload encodes under, if the ABI declares
    /// the action.
    pub fn action_type<N: Into<Name>>(&self, action: N) -> Option<&str> {
        self.action_types.get(&action.into()).map(String::as_str)
    }

    /// All declared actions, keyed by name.
    pub fn actions(&self) -> impl Iterator<Item = (Name, &str)> {
        self.action_types.iter().map(|(n, t)| (*n, t.as_str()))
    }

    fn collapse(&self, id: TypeId) -> TypeId {
        match self.types[id.0].kind {
            TypeKind::Alias(target) => target,
            _ => id,
        }
    }
}

/// Construction state: the arena under assembly plus the unresolved alias
/// targets and pending struct definitions that the finished graph no longer
/// needs.
struct Builder<'a> {
    abi: &'a RawAbi,
    types: Vec<AbiType>,
    index: HashMap<String, TypeId>,
    pending_aliases: HashMap<usize, String>,
    struct_defs: HashMap<usize, &'a StructDef>,
}

impl<'a> Builder<'a> {
    fn new(abi: &'a RawAbi) -> Self {
        Builder {
            abi,
            types: Vec::new(),
            index: HashMap::new(),
            pending_aliases: HashMap::new(),
            struct_defs: HashMap::new(),
        }
    }

    fn build(mut self) -> Result<Contract, ErrorKind> {
        let abi = self.abi;
        let mut action_types = BTreeMap::new();
        for action in &abi.actions {
            action_types.insert(action.name, action.ty.clone());
        }

        for &(name, prim) in Primitive::CATALOG {
            self.push(name.to_owned(), TypeKind::Primitive(prim));
        }
        self.install_extended_asset();

        for def in &abi.types {
            if def.new_type_name.is_empty() {
                return Err(ErrorKind::Parse(
                    "abi has a type with a missing name".to_owned(),
                ));
            }
            let id = self.push_checked(def.new_type_name.clone(), TypeKind::Alias(TypeId(0)))?;
            self.pending_aliases.insert(id.0, def.ty.clone());
        }
        for def in &abi.structs {
            if def.name.is_empty() {
                return Err(ErrorKind::Parse(
                    "abi has a struct with a missing name".to_owned(),
                ));
            }
            let id = self.push_checked(def.name.clone(), TypeKind::Struct(StructType::default()))?;
            self.struct_defs.insert(id.0, def);
        }

        for def in &abi.types {
            self.resolve_name(&def.new_type_name, 0)?;
        }
        let struct_ids: Vec<usize> = self.struct_defs.keys().copied().collect();
        for id in struct_ids {
            self.fill_struct(TypeId(id), 0)?;
        }
        self.materialize_suffix_forms()?;

        tracing::debug!(
            types = self.types.len(),
            actions = action_types.len(),
            "resolved abi"
        );
        Ok(Contract {
            types: self.types,
            index: self.index,
            action_types,
        })
    }

    fn install_extended_asset(&mut self) {
        let quantity = self.index["asset"];
        let contract = self.index["name"];
        self.push(
            "extended_asset".to_owned(),
            TypeKind::Struct(StructType {
                fields: vec![
                    AbiField { name: "quantity".to_owned(), type_id: quantity },
                    AbiField { name: "contract".to_owned(), type_id: contract },
                ],
                filled: true,
            }),
        );
    }

    fn push(&mut self, name: String, kind: TypeKind) -> TypeId {
        let id = TypeId(self.types.len());
        self.types.push(AbiType { name: name.clone(), kind });
        self.index.insert(name, id);
        id
    }

    fn push_checked(&mut self, name: String, kind: TypeKind) -> Result<TypeId, ErrorKind> {
        if self.index.contains_key(&name) {
            return Err(ErrorKind::DuplicateType(name));
        }
        Ok(self.push(name, kind))
    }

    /// Returns the non-alias terminal for `name`, creating synthetic
    /// optional/array nodes on demand and resolving alias targets lazily.
    fn resolve_name(&mut self, name: &str, depth: usize) -> Result<TypeId, ErrorKind> {
        if depth >= SCHEMA_RECURSION_LIMIT {
            return Err(ErrorKind::RecursionLimit);
        }
        if let Some(&id) = self.index.get(name) {
            if let Some(target_name) = self.pending_aliases.get(&id.0).cloned() {
                let target = self.resolve_name(&target_name, depth + 1)?;
                self.types[id.0].kind = TypeKind::Alias(target);
                self.pending_aliases.remove(&id.0);
                return Ok(target);
            }
            if let TypeKind::Alias(target) = self.types[id.0].kind {
                return Ok(target);
            }
            return Ok(id);
        }
        if let Some(inner_name) = name.strip_suffix('?') {
            let inner = self.resolve_name(inner_name, depth + 1)?;
            self.check_not_nested(inner)?;
            Ok(self.push(name.to_owned(), TypeKind::Optional(inner)))
        } else if let Some(inner_name) = name.strip_suffix("[]") {
            let inner = self.resolve_name(inner_name, depth + 1)?;
            self.check_not_nested(inner)?;
            Ok(self.push(name.to_owned(), TypeKind::Array(inner)))
        } else {
            Err(ErrorKind::UnknownType(name.to_owned()))
        }
    }

    fn check_not_nested(&self, inner: TypeId) -> Result<(), ErrorKind> {
        match self.types[inner.0].kind {
            TypeKind::Optional(_) | TypeKind::Array(_) => {
                Err(ErrorKind::NestedOptionalOrArray)
            }
            _ => Ok(()),
        }
    }

    /// Flattens the field list of the struct at `id`: base fields first,
    /// transitively, then its own. Filling an already-filled struct is a
    /// no-op.
    fn fill_struct(&mut self, id: TypeId, depth: usize) -> Result<(), ErrorKind> {
        if depth >= SCHEMA_RECURSION_LIMIT {
            return Err(ErrorKind::RecursionLimit);
        }
        match &self.types[id.0].kind {
            TypeKind::Struct(s) if s.filled => return Ok(()),
            TypeKind::Struct(_) => {}
            _ => {
                return Err(ErrorKind::Parse(format!(
                    "abi type \"{}\" is not a struct",
                    self.types[id.0].name
                )))
            }
        }
        let def = self.struct_defs[&id.0];

        let mut fields = Vec::with_capacity(def.fields.len());
        if !def.base.is_empty() {
            let base = self.resolve_name(&def.base, depth + 1)?;
            self.fill_struct(base, depth + 1)?;
            match &self.types[base.0].kind {
                TypeKind::Struct(s) => fields.extend(s.fields.iter().cloned()),
                _ => unreachable!("fill_struct verified the base kind"),
            }
        }
        for field in &def.fields {
            let type_id = self.resolve_name(&field.ty, depth + 1)?;
            fields.push(AbiField { name: field.name.clone(), type_id });
        }
        self.types[id.0].kind = TypeKind::Struct(StructType { fields, filled: true });
        Ok(())
    }

    /// Pre-creates `T?` and `T[]` for every name whose terminal allows
    /// them, so codec-time resolution never has to grow the arena.
    fn materialize_suffix_forms(&mut self) -> Result<(), ErrorKind> {
        let names: Vec<String> = self.index.keys().cloned().collect();
        for name in names {
            let terminal = self.resolve_name(&name, 0)?;
            if matches!(
                self.types[terminal.0].kind,
                TypeKind::Optional(_) | TypeKind::Array(_)
            ) {
                continue;
            }
            self.resolve_name(&format!("{name}?"), 0)?;
            self.resolve_name(&format!("{name}[]"), 0)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abi::{ActionDef, FieldDef, StructDef, TypeDef};

    fn abi_with(types: Vec<TypeDef>, structs: Vec<StructDef>) -> RawAbi {
        RawAbi { types, structs, ..RawAbi::default() }
    }

    fn typedef(new_type_name: &str, ty: &str) -> TypeDef {
        TypeDef { new_type_name: new_type_name.to_owned(), ty: ty.to_owned() }
    }

    fn field(name: &str, ty: &str) -> FieldDef {
        FieldDef { name: name.to_owned(), ty: ty.to_owned() }
    }

    #[test]
    fn builtins_and_extended_asset_are_present() {
        let c = Contract::from_abi(&RawAbi::default()).unwrap();
        assert!(c.resolve("uint32").is_ok());
        let ea = c.resolve("extended_asset").unwrap();
        match &c.get(ea).kind {
            TypeKind::Struct(s) => {
                assert!(s.filled);
                assert_eq!(s.fields[0].name, "quantity");
                assert_eq!(c.get(s.fields[0].type_id).name, "asset");
                assert_eq!(s.fields[1].name, "contract");
                assert_eq!(c.get(s.fields[1].type_id).name, "name");
            }
            other => panic!("extended_asset resolved to {other:?}"),
        }
    }

    #[test]
    fn aliases_collapse_to_terminals() {
        let abi = abi_with(
            vec![typedef("account_name", "name"), typedef("account", "account_name")],
            vec![],
        );
        let c = Contract::from_abi(&abi).unwrap();
        let id = c.resolve("account").unwrap();
        assert_eq!(c.get(id).name, "name");
    }

    #[test]
    fn suffix_forms_resolve_without_nesting() {
        let c = Contract::from_abi(&RawAbi::default()).unwrap();
        let arr = c.resolve("uint32[]").unwrap();
        assert!(matches!(c.get(arr).kind, TypeKind::Array(_)));
        let opt = c.resolve("string?").unwrap();
        assert!(matches!(c.get(opt).kind, TypeKind::Optional(_)));

        for bad in ["uint32[][]", "uint32[]?", "string??", "string?[]"] {
            assert_eq!(
                c.resolve(bad).unwrap_err(),
                ErrorKind::NestedOptionalOrArray,
                "{bad} should not resolve"
            );
        }
    }

    #[test]
    fn alias_to_suffix_form_is_terminal_but_unnestable() {
        let abi = abi_with(vec![typedef("many", "uint32[]")], vec![]);
        let c = Contract::from_abi(&abi).unwrap();
        let id = c.resolve("many").unwrap();
        assert!(matches!(c.get(id).kind, TypeKind::Array(_)));
        assert_eq!(c.resolve("many[]").unwrap_err(), ErrorKind::NestedOptionalOrArray);
    }

    #[test]
    fn base_fields_come_first() {
        let abi = abi_with(
            vec![],
            vec![
                StructDef {
                    name: "base_t".to_owned(),
                    base: String::new(),
                    fields: vec![field("id", "uint64")],
                },
                StructDef {
                    name: "derived_t".to_owned(),
                    base: "base_t".to_owned(),
                    fields: vec![field("memo", "string")],
                },
            ],
        );
        let c = Contract::from_abi(&abi).unwrap();
        let id = c.resolve("derived_t").unwrap();
        match &c.get(id).kind {
            TypeKind::Struct(s) => {
                let names: Vec<&str> = s.fields.iter().map(|f| f.name.as_str()).collect();
                assert_eq!(names, ["id", "memo"]);
            }
            other => panic!("derived_t resolved to {other:?}"),
        }
    }

    #[test]
    fn duplicate_declarations_are_rejected() {
        let abi = abi_with(vec![typedef("name", "uint64")], vec![]);
        assert_eq!(
            *Contract::from_abi(&abi).unwrap_err().kind(),
            ErrorKind::DuplicateType("name".to_owned())
        );

        let abi = abi_with(
            vec![typedef("t", "uint64")],
            vec![StructDef { name: "t".to_owned(), base: String::new(), fields: vec![] }],
        );
        assert_eq!(
            *Contract::from_abi(&abi).unwrap_err().kind(),
            ErrorKind::DuplicateType("t".to_owned())
        );
    }

    #[test]
    fn alias_chain_of_33_hits_the_recursion_limit() {
        let mut types = Vec::new();
        for i in 1..=33 {
            let target = if i == 33 { "uint32".to_owned() } else { format!("t{}", i + 1) };
            types.push(typedef(&format!("t{i}"), &target));
        }
        let abi = abi_with(types, vec![]);
        assert_eq!(
            *Contract::from_abi(&abi).unwrap_err().kind(),
            ErrorKind::RecursionLimit
        );
    }

    #[test]
    fn alias_chain_of_32_still_resolves() {
        let mut types = Vec::new();
        for i in 1..=32 {
            let target = if i == 32 { "uint32".to_owned() } else { format!("t{}", i + 1) };
            types.push(typedef(&format!("t{i}"), &target));
        }
        let abi = abi_with(types, vec![]);
        let c = Contract::from_abi(&abi).unwrap();
        assert_eq!(c.get(c.resolve("t1").unwrap()).name, "uint32");
    }

    #[test]
    fn alias_cycle_is_cut_by_the_limit() {
        let abi = abi_with(vec![typedef("a", "b"), typedef("b", "a")], vec![]);
        assert_eq!(
            *Contract::from_abi(&abi).unwrap_err().kind(),
            ErrorKind::RecursionLimit
        );
    }

    #[test]
    fn unknown_field_type_is_reported() {
        let abi = abi_with(
            vec![],
            vec![StructDef {
                name: "s".to_owned(),
                base: String::new(),
                fields: vec![field("x", "no_such_type")],
            }],
        );
        assert_eq!(
            *Contract::from_abi(&abi).unwrap_err().kind(),
            ErrorKind::UnknownType("no_such_type".to_owned())
        );
    }

    #[test]
    fn non_struct_base_is_rejected() {
        let abi = abi_with(
            vec![],
            vec![StructDef {
                name: "s".to_owned(),
                base: "uint32".to_owned(),
                fields: vec![],
            }],
        );
        assert!(Contract::from_abi(&abi).is_err());
    }

    #[test]
    fn action_lookup() {
        let abi = RawAbi {
            structs: vec![StructDef {
                name: "transfer".to_owned(),
                base: String::new(),
                fields: vec![],
            }],
            actions: vec![ActionDef {
                name: Name::from("transfer"),
                ty: "transfer".to_owned(),
                ricardian_contract: String::new(),
            }],
            ..RawAbi::default()
        };
        let c = Contract::from_abi(&abi).unwrap();
        assert_eq!(c.action_type("transfer"), Some("transfer"));
        assert_eq!(c.action_type("missing"), None);
    }
}
