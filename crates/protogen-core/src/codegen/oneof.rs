//! Per-message oneof bookkeeping.
//!
//! Members of a oneof share one backing slot. The driver builds a
//! [`OneofSet`] for each message before visiting its fields; backends ask it
//! whether a field is a real union member and claim the slot declaration
//! exactly once.

use prost_types::field_descriptor_proto::Type;
use prost_types::{DescriptorProto, FieldDescriptorProto};

/// One oneof group of a message
#[derive(Debug, Clone)]
pub struct OneofStub {
    name: String,
    member_types: Vec<Type>,
    slot_declared: bool,
}

impl OneofStub {
    /// Schema name of the oneof
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of fields whose `oneof_index` points at this oneof
    pub fn count_total(&self) -> usize {
        self.member_types.len()
    }

    /// Types of the member fields, in declaration order
    pub fn member_types(&self) -> &[Type] {
        &self.member_types
    }

    /// A single-member oneof (including proto3 `optional`) is not a union
    pub fn is_union(&self) -> bool {
        self.count_total() > 1
    }

    /// Returns true the first time it is called, false afterwards
    pub fn claim_slot(&mut self) -> bool {
        !std::mem::replace(&mut self.slot_declared, true)
    }
}

/// All oneofs of one message, indexed like `oneof_decl`
#[derive(Debug, Clone, Default)]
pub struct OneofSet {
    stubs: Vec<OneofStub>,
}

impl OneofSet {
    /// Counts members of every oneof declared by `message`
    pub fn for_message(message: &DescriptorProto) -> Self {
        let mut stubs: Vec<OneofStub> = message
            .oneof_decl
            .iter()
            .map(|oneof| OneofStub {
                name: oneof.name().to_string(),
                member_types: Vec::new(),
                slot_declared: false,
            })
            .collect();

        for field in &message.field {
            if let Some(stub) = field
                .oneof_index
                .and_then(|i| usize::try_from(i).ok())
                .and_then(|i| stubs.get_mut(i))
            {
                stub.member_types.push(field.r#type());
            }
        }

        Self { stubs }
    }

    /// The union the field belongs to, if it is a member of a real oneof
    pub fn union_of(&mut self, field: &FieldDescriptorProto) -> Option<&mut OneofStub> {
        let index = usize::try_from(field.oneof_index?).ok()?;
        self.stubs.get_mut(index).filter(|stub| stub.is_union())
    }
}
