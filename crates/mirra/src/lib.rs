// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # mirra - runtime type introspection for Rust
//!
//! Statically-typed programs occasionally need to treat unrelated types
//! uniformly at runtime: generic tooling, data bridges, editor/inspector
//! surfaces, name-based wiring from configuration. `mirra` bridges
//! compile-time type knowledge to one dynamic interface operating over
//! type-tagged opaque references - no `build.rs` codegen, no proc macros.
//!
//! ## Quick Start
//!
//! ```rust
//! use mirra::{descriptor_of, reflect_class, OpaqueMut, Registry};
//!
//! #[derive(Default)]
//! struct Point {
//!     x: i32,
//!     y: i32,
//! }
//!
//! // Opt the fields in; nothing is discovered automatically.
//! reflect_class!(Point { x, y });
//!
//! // Static path: type -> descriptor, no name lookup.
//! let class = descriptor_of::<Point>().as_class().unwrap();
//! assert_eq!(class.field_name(0), Some("x"));
//!
//! // Field access through the erased interface.
//! let mut p = Point { x: 1, y: 2 };
//! let field = class.field_by_id_mut(OpaqueMut::new(&mut p), 0).unwrap();
//! *field.downcast_mut::<i32>().unwrap() = 99;
//! assert_eq!(p.x, 99);
//!
//! // Dynamic path: instantiate and look up by name.
//! let mut registry = Registry::new();
//! registry.register::<Point>();
//! assert!(registry.create_by_name("Point").unwrap().is::<Point>());
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +--------------------------------------------------------------------+
//! |                        Application Layer                           |
//! |     reflect_class! / reflect_leaf! / reflect_foreign! opt-ins      |
//! +--------------------------------------------------------------------+
//! |                        Dispatch Layer                              |
//! |  Describe (static: T -> &'static Descriptor)  |  Registry (name /  |
//! |  descriptor interner, singleton per type      |  runtime TypeId)   |
//! +--------------------------------------------------------------------+
//! |                        Descriptor Graph                            |
//! |   Shape: Leaf | Foreign | SmartPtr | Container{5 kinds} | Class    |
//! +--------------------------------------------------------------------+
//! |                        Erased Access                               |
//! |   Opaque / OpaqueMut / OpaqueBox  (tag, address, lifetime token)   |
//! +--------------------------------------------------------------------+
//! ```
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Descriptor`] | Singleton description of one static type: name, size, shape |
//! | [`Describe`] | Compile-time dispatch from a type to its descriptor |
//! | [`Registry`] | Explicit name/runtime-type store for instantiation and lookup |
//! | [`Opaque`] / [`OpaqueMut`] | Borrowed type-erased references, tag-checked |
//! | [`OpaqueBox`] | Owned type-erased value (factory output, insertion input) |
//!
//! ## Design Notes
//!
//! - Descriptors are process-wide singletons, built lazily on first
//!   reference and never destroyed; concurrent first-touch is safe.
//! - The world is closed: a type without a [`Describe`] impl fails to
//!   compile when introspected - there is no fallback descriptor.
//! - Descriptor/object pairing is checked through the opaque tag; a
//!   mismatch is an [`AccessError::TypeMismatch`], not undefined behavior.
//! - Mutation through opaque references carries the borrow it was created
//!   from; the usual aliasing rules keep cross-thread structural races out.

mod describe;
pub mod descriptor;
mod macros;
mod opaque;
mod registry;
pub mod walk;

pub use describe::{descriptor_of, Describe};
pub use descriptor::{
    AccessError, ClassShape, ContainerKind, ContainerShape, Descriptor, Member, Shape,
    SmartPtrShape,
};
pub use opaque::{Opaque, OpaqueBox, OpaqueMut};
pub use registry::{Constructor, Registry};
pub use walk::{walk, Visit};

#[doc(hidden)]
pub use describe::{descriptor_of_ptr, intern};
