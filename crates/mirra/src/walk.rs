// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Generic traversal over the descriptor graph.
//!
//! [`walk`] drives a [`Visit`] implementation across a value using only the
//! uniform descriptor interface: it recurses into class fields, container
//! elements (by ordinal for sequences and sets, by key snapshot for maps),
//! and substitutes smart-pointer pointees together with their inner
//! descriptor before continuing - the wrapper's type name never reaches the
//! visitor.
//!
//! Concrete element types are never consulted; a visitor that wants typed
//! data downcasts the opaque reference at the leaves.

use crate::descriptor::{AccessError, Descriptor, Shape};
use crate::opaque::Opaque;

/// Callbacks fired while walking a value.
///
/// Every method has an empty default so visitors implement only what they
/// need.
pub trait Visit {
    /// A leaf value (primitive or `reflect_leaf!` registered).
    fn leaf(&mut self, desc: &'static Descriptor, value: Opaque<'_>) {
        let _ = (desc, value);
    }

    /// A foreign-opaque value; decompose it through its own facility.
    fn foreign(&mut self, desc: &'static Descriptor, value: Opaque<'_>) {
        let _ = (desc, value);
    }

    /// Entering a class value.
    fn enter_class(&mut self, desc: &'static Descriptor) {
        let _ = desc;
    }

    /// About to walk the named field of the current class.
    fn class_field(&mut self, name: &'static str) {
        let _ = name;
    }

    /// Leaving a class value.
    fn leave_class(&mut self, desc: &'static Descriptor) {
        let _ = desc;
    }

    /// Entering a container with `len` elements.
    fn enter_container(&mut self, desc: &'static Descriptor, len: usize) {
        let _ = (desc, len);
    }

    /// A map key; fired before its value is walked.
    fn map_key(&mut self, desc: &'static Descriptor, key: Opaque<'_>) {
        let _ = (desc, key);
    }

    /// Leaving a container value.
    fn leave_container(&mut self, desc: &'static Descriptor) {
        let _ = desc;
    }
}

/// Walk `value` as described by `desc`, firing `visitor` callbacks.
///
/// An empty smart pointer (an aliased `Arc` has no exclusive counterpart
/// here; shared deref always succeeds for the supported wrappers) ends that
/// branch silently.
pub fn walk(
    desc: &'static Descriptor,
    value: Opaque<'_>,
    visitor: &mut dyn Visit,
) -> Result<(), AccessError> {
    match desc.shape() {
        Shape::Leaf => {
            visitor.leaf(desc, value);
            Ok(())
        }
        Shape::Foreign => {
            visitor.foreign(desc, value);
            Ok(())
        }
        Shape::SmartPtr(ptr) => match ptr.deref(value) {
            Some(inner) => walk(ptr.pointee(), inner, visitor),
            None => Ok(()),
        },
        Shape::Class(class) => {
            visitor.enter_class(desc);
            for (id, member) in class.members().iter().enumerate() {
                visitor.class_field(member.name());
                let field = class.field_by_id(value, id)?;
                walk(member.descriptor(), field, visitor)?;
            }
            visitor.leave_class(desc);
            Ok(())
        }
        Shape::Container(ctn) => {
            let len = ctn.len(value)?;
            visitor.enter_container(desc, len);
            if ctn.kind().is_keyed() {
                for key in ctn.keys(value)? {
                    if let Some(key_desc) = ctn.key_descriptor() {
                        visitor.map_key(key_desc, key);
                    }
                    let element = ctn.value_by_key(value, key)?;
                    walk(ctn.value_descriptor(), element, visitor)?;
                }
            } else {
                for index in 0..len {
                    let element = ctn.value_by_index(value, index)?;
                    walk(ctn.value_descriptor(), element, visitor)?;
                }
            }
            visitor.leave_container(desc);
            Ok(())
        }
    }
}
