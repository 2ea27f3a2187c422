// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! The descriptor graph.
//!
//! A [`Descriptor`] is a process-wide singleton describing one static type:
//! its name, byte size, runtime tag and [`Shape`]. Shapes form a closed
//! tagged variant - generic code branches on the tag exhaustively instead of
//! downcasting through a class hierarchy:
//!
//! ```text
//! Shape
//! +-- Leaf                  fixed-size, no substructure (i32, String, ...)
//! +-- Foreign               externally-reflected opaque type
//! +-- SmartPtr              one level of indirection (Box, Arc)
//! +-- Container             Sequence / OrderedMap / UnorderedMap /
//! |                         OrderedSet / UnorderedSet
//! +-- Class                 ordered member table with byte offsets
//! ```
//!
//! Composite shapes hold `&'static` borrows of their element descriptors,
//! resolved once at construction through [`Describe`](crate::Describe);
//! descriptors never own the instances they describe.

mod class;
mod container;
mod leaf;
mod smart_ptr;

pub use class::{ClassShape, Member};
pub use container::{ContainerKind, ContainerShape};
pub use smart_ptr::SmartPtrShape;

use crate::opaque::{Opaque, OpaqueMut};
use std::any::TypeId;
use std::fmt;

#[cfg(test)]
mod tests;

/// Errors surfaced by dynamic access.
///
/// Ordinary misuse never panics; the three taxonomy families are kept
/// distinct so callers can tell an absent key from an operation the container
/// kind does not define.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessError {
    /// No field with this name in the class's member table.
    FieldNotFound(String),
    /// Key not present in the keyed container.
    KeyNotFound,
    /// Index or field id outside `[0, len)`.
    IndexOutOfBounds { index: usize, len: usize },
    /// Operation not defined for this container kind.
    Unsupported {
        op: &'static str,
        container: &'static str,
    },
    /// Opaque reference tagged with a different type than the descriptor
    /// describes.
    TypeMismatch { expected: String, got: String },
}

impl fmt::Display for AccessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FieldNotFound(name) => write!(f, "field not found: {}", name),
            Self::KeyNotFound => write!(f, "key not present in container"),
            Self::IndexOutOfBounds { index, len } => {
                write!(f, "index out of bounds: {} >= {}", index, len)
            }
            Self::Unsupported { op, container } => {
                write!(f, "operation {} not supported by {}", op, container)
            }
            Self::TypeMismatch { expected, got } => {
                write!(f, "type mismatch: expected {}, got {}", expected, got)
            }
        }
    }
}

impl std::error::Error for AccessError {}

/// Closed set of descriptor shapes.
#[derive(Debug)]
pub enum Shape {
    /// Fixed-size type with no exposed substructure.
    Leaf,
    /// Externally-defined type reflected by its own facility; opaque here.
    Foreign,
    /// Smart pointer wrapping one pointee.
    SmartPtr(SmartPtrShape),
    /// One of the five supported container kinds.
    Container(ContainerShape),
    /// User class with an explicitly registered member table.
    Class(ClassShape),
}

impl Shape {
    /// Short label for logs and `Debug` output.
    pub fn kind_label(&self) -> &'static str {
        match self {
            Self::Leaf => "leaf",
            Self::Foreign => "foreign",
            Self::SmartPtr(_) => "smart_ptr",
            Self::Container(_) => "container",
            Self::Class(_) => "class",
        }
    }
}

/// Runtime description of one static type.
///
/// Singleton per type (see [`Describe`](crate::Describe)); all queries are
/// pure.
pub struct Descriptor {
    type_name: String,
    size: usize,
    type_id: TypeId,
    shape: Shape,
}

impl Descriptor {
    /// Leaf descriptor for `T`: name and size only.
    pub fn leaf<T: 'static>(name: impl Into<String>) -> Self {
        Self {
            type_name: name.into(),
            size: std::mem::size_of::<T>(),
            type_id: TypeId::of::<T>(),
            shape: Shape::Leaf,
        }
    }

    /// Foreign-opaque descriptor for `T`.
    ///
    /// Field-level access goes through the type's own reflection facility
    /// after a checked downcast of the opaque reference; this crate only
    /// records the boundary.
    pub fn foreign<T: 'static>(name: impl Into<String>) -> Self {
        Self {
            type_name: name.into(),
            size: std::mem::size_of::<T>(),
            type_id: TypeId::of::<T>(),
            shape: Shape::Foreign,
        }
    }

    /// Class descriptor for `T` with its ordered member table.
    ///
    /// Invoked exactly once per class from the interner closure generated by
    /// [`reflect_class!`](crate::reflect_class); the table is immutable
    /// afterward.
    pub fn class<T: 'static>(name: impl Into<String>, members: Vec<Member>) -> Self {
        let type_name = name.into();
        Self {
            shape: Shape::Class(ClassShape::new::<T>(type_name.clone(), members)),
            size: std::mem::size_of::<T>(),
            type_id: TypeId::of::<T>(),
            type_name,
        }
    }

    pub(crate) fn container<C: 'static>(type_name: String, shape: ContainerShape) -> Self {
        Self {
            type_name,
            size: std::mem::size_of::<C>(),
            type_id: TypeId::of::<C>(),
            shape: Shape::Container(shape),
        }
    }

    pub(crate) fn smart_ptr<P: 'static>(type_name: String, shape: SmartPtrShape) -> Self {
        Self {
            type_name,
            size: std::mem::size_of::<P>(),
            type_id: TypeId::of::<P>(),
            shape: Shape::SmartPtr(shape),
        }
    }

    /// Full type name, element types included (`"BTreeMap<i32, String>"`).
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Byte size of the described type.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Runtime tag of the described type.
    pub fn rust_type_id(&self) -> TypeId {
        self.type_id
    }

    /// The shape tag; match on it for exhaustive dispatch.
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// `false` only for class descriptors.
    pub fn is_predefined(&self) -> bool {
        !matches!(self.shape, Shape::Class(_))
    }

    /// Whether this describes a supported container.
    pub fn is_container(&self) -> bool {
        matches!(self.shape, Shape::Container(_))
    }

    /// Whether this describes a smart pointer.
    pub fn is_smart_ptr(&self) -> bool {
        matches!(self.shape, Shape::SmartPtr(_))
    }

    /// Whether this describes a foreign-opaque type.
    pub fn is_foreign(&self) -> bool {
        matches!(self.shape, Shape::Foreign)
    }

    /// Whether this describes a registered class.
    pub fn is_class(&self) -> bool {
        matches!(self.shape, Shape::Class(_))
    }

    /// Container view, if this is a container descriptor.
    pub fn as_container(&self) -> Option<&ContainerShape> {
        match &self.shape {
            Shape::Container(shape) => Some(shape),
            _ => None,
        }
    }

    /// Smart-pointer view, if this is a smart-pointer descriptor.
    pub fn as_smart_ptr(&self) -> Option<&SmartPtrShape> {
        match &self.shape {
            Shape::SmartPtr(shape) => Some(shape),
            _ => None,
        }
    }

    /// Class view, if this is a class descriptor.
    pub fn as_class(&self) -> Option<&ClassShape> {
        match &self.shape {
            Shape::Class(shape) => Some(shape),
            _ => None,
        }
    }

    /// Resolve the value behind one level of indirection, shared.
    ///
    /// Identity for every shape except smart pointers, which yield their
    /// pointee (retagged with the pointee's type). `None` when the pointee
    /// is unavailable.
    pub fn value_ref<'a>(&self, obj: Opaque<'a>) -> Option<Opaque<'a>> {
        match &self.shape {
            Shape::SmartPtr(ptr) => ptr.deref(obj),
            _ => Some(obj),
        }
    }

    /// Resolve the value behind one level of indirection, exclusive.
    pub fn value_mut<'a>(&self, obj: OpaqueMut<'a>) -> Option<OpaqueMut<'a>> {
        match &self.shape {
            Shape::SmartPtr(ptr) => ptr.deref_mut(obj),
            _ => Some(obj),
        }
    }
}

impl fmt::Debug for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Descriptor")
            .field("type_name", &self.type_name)
            .field("size", &self.size)
            .field("shape", &self.shape.kind_label())
            .finish()
    }
}
