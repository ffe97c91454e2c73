//! The event-driven JSON→binary engine.
//!
//! The parsed document is linearized into a stream of events (numbers
//! surface as their exact source text, so 64-bit and wider values never
//! pass through a double), and a stack machine consumes the stream under
//! the guidance of the resolved type graph:
//!
//! - a primitive leaf converts the current event to bytes directly;
//! - an optional emits its tag byte and, when present, re-dispatches the
//!   same event to its inner type;
//! - an array pushes a work frame and reserves a slot for its element
//!   count, which is only known at `]`;
//! - a struct pushes a work frame and insists on its field keys appearing
//!   in declaration order, all of them, exactly once.
//!
//! Array counts are `varuint32`, so their width is unknown while the body
//! is being written. The engine records `(offset, count)` pairs instead and
//! splices the prefixes in on [`emit`](EncodeState::emit), in offset order.
//!
//! On failure the work stack is walked root-first to produce the schema
//! path (`type.field[3].inner`) that prefixes the error message.

use std::borrow::Cow;

use serde_json::Value;

use crate::contract::{Contract, TypeId, TypeKind};
use crate::error::{Error, ErrorKind, Result};
use crate::varint::write_varuint32;

/// Work-frame cap shared by both engines; exceeding it is terminal.
pub const MAX_STACK_DEPTH: usize = 128;

/// One JSON event, as surfaced by the document walk.
#[derive(Debug, Clone, PartialEq)]
pub enum Event<'a> {
    Null,
    Bool(bool),
    /// A string value or a numeric token in its source spelling.
    Str(Cow<'a, str>),
    StartObject,
    Key(&'a str),
    EndObject,
    StartArray,
    EndArray,
}

/// Encodes `json` under the type `type_name` of `contract`.
///
/// The whole buffer is produced or nothing is: any failure aborts the
/// transformation and reports the schema path at which it happened.
pub fn json_to_bin(contract: &Contract, type_name: &str, json: &str) -> Result<Vec<u8>> {
    let root = contract.resolve(type_name).map_err(Error::from)?;
    let value: Value = serde_json::from_str(json).map_err(|e| Error::from(ErrorKind::from(e)))?;

    let mut events = Vec::new();
    collect_events(&value, &mut events);

    let mut state = EncodeState {
        contract,
        bin: Vec::new(),
        stack: vec![Frame { type_id: root, position: -1, size_insertion_index: 0 }],
        size_insertions: Vec::new(),
    };
    let mut start = true;
    for event in &events {
        if let Err(kind) = state.receive(event, start) {
            return Err(Error::with_path(state.error_path(), kind));
        }
        start = false;
    }
    Ok(state.emit())
}

/// Linearizes a parsed document into events, numbers as source text.
fn collect_events<'a>(value: &'a Value, out: &mut Vec<Event<'a>>) {
    match value {
        Value::Null => out.push(Event::Null),
        Value::Bool(b) => out.push(Event::Bool(*b)),
        Value::Number(n) => out.push(Event::Str(Cow::Owned(n.to_string()))),
        Value::String(s) => out.push(Event::Str(Cow::Borrowed(s))),
        Value::Array(items) => {
            out.push(Event::StartArray);
            for item in items {
                collect_events(item, out);
            }
            out.push(Event::EndArray);
        }
        Value::Object(map) => {
            out.push(Event::StartObject);
            for (key, item) in map {
                out.push(Event::Key(key.as_str()));
                collect_events(item, out);
            }
            out.push(Event::EndObject);
        }
    }
}

/// A deferred array-count prefix: `count` belongs at byte `position` of the
/// raw buffer.
struct SizeInsertion {
    position: usize,
    count: u32,
}

struct Frame {
    type_id: TypeId,
    /// Array: index of the element in flight. Struct: index of the field
    /// named by the last key. `-1` before the first element or key.
    position: i64,
    size_insertion_index: usize,
}

struct EncodeState<'c> {
    contract: &'c Contract,
    bin: Vec<u8>,
    stack: Vec<Frame>,
    size_insertions: Vec<SizeInsertion>,
}

impl<'c> EncodeState<'c> {
    fn receive(&mut self, event: &Event<'_>, start: bool) -> Result<(), ErrorKind> {
        let type_id = match self.stack.last() {
            Some(frame) => frame.type_id,
            None => return Err(ErrorKind::Parse("extra data".to_owned())),
        };
        if start {
            self.stack.clear();
        }
        if self.stack.len() > MAX_STACK_DEPTH {
            return Err(ErrorKind::RecursionLimit);
        }
        self.dispatch(type_id, event, start)
    }

    fn dispatch(&mut self, type_id: TypeId, event: &Event<'_>, start: bool) -> Result<(), ErrorKind> {
        match &self.contract.get(type_id).kind {
            TypeKind::Primitive(p) => p.encode(event, &mut self.bin),
            TypeKind::Alias(target) => self.dispatch(*target, event, start),
            TypeKind::Optional(inner) => {
                if matches!(event, Event::Null) {
                    self.bin.push(0);
                    Ok(())
                } else {
                    self.bin.push(1);
                    self.dispatch(*inner, event, true)
                }
            }
            TypeKind::Array(inner) => self.dispatch_array(type_id, *inner, event, start),
            TypeKind::Struct(_) => self.dispatch_struct(type_id, event, start),
        }
    }

    fn dispatch_array(
        &mut self,
        type_id: TypeId,
        inner: TypeId,
        event: &Event<'_>,
        start: bool,
    ) -> Result<(), ErrorKind> {
        if start {
            if !matches!(event, Event::StartArray) {
                return Err(ErrorKind::TypeMismatch("array"));
            }
            tracing::trace!(depth = self.stack.len(), ty = %self.contract.get(type_id).name, "[");
            self.stack.push(Frame {
                type_id,
                position: -1,
                size_insertion_index: self.size_insertions.len(),
            });
            self.size_insertions.push(SizeInsertion { position: self.bin.len(), count: 0 });
            return Ok(());
        }
        if matches!(event, Event::EndArray) {
            let frame = self.stack.pop().expect("array frame is on the stack");
            self.size_insertions[frame.size_insertion_index].count = (frame.position + 1) as u32;
            tracing::trace!(items = frame.position + 1, "]");
            return Ok(());
        }
        let frame = self.stack.last_mut().expect("array frame is on the stack");
        frame.position += 1;
        self.dispatch(inner, event, true)
    }

    fn dispatch_struct(
        &mut self,
        type_id: TypeId,
        event: &Event<'_>,
        start: bool,
    ) -> Result<(), ErrorKind> {
        let TypeKind::Struct(s) = &self.contract.get(type_id).kind else {
            unreachable!("dispatch_struct is only called for structs");
        };
        if start {
            if !matches!(event, Event::StartObject) {
                return Err(ErrorKind::TypeMismatch("object"));
            }
            tracing::trace!(
                depth = self.stack.len(),
                ty = %self.contract.get(type_id).name,
                fields = s.fields.len(),
                "{{"
            );
            self.stack.push(Frame { type_id, position: -1, size_insertion_index: 0 });
            return Ok(());
        }
        match event {
            Event::EndObject => {
                let frame = self.stack.last().expect("struct frame is on the stack");
                let next = (frame.position + 1) as usize;
                if next != s.fields.len() {
                    return Err(ErrorKind::MissingField(s.fields[next].name.clone()));
                }
                self.stack.pop();
                tracing::trace!("}}");
                Ok(())
            }
            Event::Key(key) => {
                let frame = self.stack.last_mut().expect("struct frame is on the stack");
                frame.position += 1;
                match s.fields.get(frame.position as usize) {
                    None => Err(ErrorKind::UnknownField((*key).to_owned())),
                    Some(field) if field.name != *key => {
                        Err(ErrorKind::MissingField(field.name.clone()))
                    }
                    Some(_) => Ok(()),
                }
            }
            _ => {
                let frame = self.stack.last().expect("struct frame is on the stack");
                let Some(field) = s.fields.get(frame.position as usize) else {
                    return Err(ErrorKind::Parse("expected key before value".to_owned()));
                };
                self.dispatch(field.type_id, event, true)
            }
        }
    }

    /// Splices the recorded array counts into the raw buffer, in offset
    /// order, and returns the finished encoding.
    fn emit(self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.bin.len() + 5 * self.size_insertions.len());
        let mut pos = 0;
        for insertion in &self.size_insertions {
            out.extend_from_slice(&self.bin[pos..insertion.position]);
            write_varuint32(&mut out, insertion.count);
            pos = insertion.position;
        }
        out.extend_from_slice(&self.bin[pos..]);
        out
    }

    /// Root-first walk of the work stack: the root struct contributes its
    /// type name, struct frames `.field`, array frames `[index]`.
    fn error_path(&self) -> String {
        let mut path = String::new();
        if let Some(first) = self.stack.first() {
            if matches!(self.contract.get(first.type_id).kind, TypeKind::Struct(_)) {
                path.push_str(&self.contract.get(first.type_id).name);
            }
        }
        for frame in &self.stack {
            match &self.contract.get(frame.type_id).kind {
                TypeKind::Array(_) => {
                    path.push('[');
                    path.push_str(&frame.position.to_string());
                    path.push(']');
                }
                TypeKind::Struct(s) => {
                    if let Some(field) =
                        usize::try_from(frame.position).ok().and_then(|p| s.fields.get(p))
                    {
                        path.push('.');
                        path.push_str(&field.name);
                    }
                }
                _ => path.push_str("<?>"),
            }
        }
        path
    }
}
