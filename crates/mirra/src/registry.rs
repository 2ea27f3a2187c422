// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Name-based type registry and factory.
//!
//! A [`Registry`] maps type names to a zero-argument constructor and a
//! descriptor, and indexes descriptors by runtime [`TypeId`] so the concrete
//! type behind a polymorphic `&dyn` reference can be resolved to its
//! descriptor.
//!
//! The registry is an explicit value, not an ambient global: build one at
//! startup, populate it with registration calls, then share it by reference.
//! Registration takes `&mut self` and lookup takes `&self`, so the borrow
//! checker enforces that registration completes before concurrent lookup
//! begins.
//!
//! # Example
//!
//! ```
//! use mirra::{reflect_class, Registry};
//!
//! #[derive(Default)]
//! struct Waypoint { x: f64, y: f64 }
//! reflect_class!(Waypoint { x, y });
//!
//! let mut registry = Registry::new();
//! registry.register::<Waypoint>();
//!
//! let instance = registry.create_by_name("Waypoint").unwrap();
//! assert!(instance.is::<Waypoint>());
//! assert!(registry.create_by_name("Unknown").is_none());
//! ```

use crate::describe::Describe;
use crate::descriptor::Descriptor;
use crate::opaque::OpaqueBox;
use std::any::{Any, TypeId};
use std::collections::HashMap;

/// Zero-argument constructor producing a fresh heap instance.
pub type Constructor = fn() -> OpaqueBox;

/// One registry entry; either half may be present.
#[derive(Debug, Default, Clone, Copy)]
struct Entry {
    constructor: Option<Constructor>,
    descriptor: Option<&'static Descriptor>,
}

/// Explicit name -> {constructor, descriptor} store.
#[derive(Debug, Default)]
pub struct Registry {
    entries: HashMap<String, Entry>,
    runtime_index: HashMap<TypeId, String>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register both halves for `T` under its descriptor's type name.
    pub fn register<T: Describe + Default>(&mut self) {
        fn construct<T: Describe + Default>() -> OpaqueBox {
            OpaqueBox::new(T::default())
        }

        let desc = T::descriptor();
        let name = desc.type_name().to_string();
        self.register_descriptor(name.clone(), desc);
        self.register_constructor(name, construct::<T>);
    }

    /// Register a constructor under `name`, merging into an existing entry.
    ///
    /// A colliding constructor is replaced; the collision is logged so an
    /// accidental double registration is observable.
    pub fn register_constructor(&mut self, name: impl Into<String>, constructor: Constructor) {
        let name = name.into();
        let entry = self.entries.entry(name.clone()).or_default();
        if entry.constructor.is_some() {
            log::warn!("[registry] constructor for {} re-registered, last wins", name);
        }
        entry.constructor = Some(constructor);
        log::debug!("[registry] constructor registered for {}", name);
    }

    /// Register a descriptor under `name`, merging into an existing entry.
    ///
    /// Also indexes the descriptor's runtime `TypeId` for
    /// [`descriptor_of`](Self::descriptor_of). A colliding descriptor is
    /// replaced, last wins, with a warning.
    pub fn register_descriptor(&mut self, name: impl Into<String>, desc: &'static Descriptor) {
        let name = name.into();
        let entry = self.entries.entry(name.clone()).or_default();
        if entry.descriptor.is_some() {
            log::warn!("[registry] descriptor for {} re-registered, last wins", name);
        }
        entry.descriptor = Some(desc);
        self.runtime_index.insert(desc.rust_type_id(), name.clone());
        log::debug!("[registry] descriptor registered for {}", name);
    }

    /// Construct a fresh, independently-owned instance of the named type.
    ///
    /// `None` for unknown names or entries registered without a
    /// constructor; nothing is allocated in that case.
    pub fn create_by_name(&self, name: &str) -> Option<OpaqueBox> {
        let constructor = self.entries.get(name)?.constructor?;
        Some(constructor())
    }

    /// Descriptor registered under `name`.
    pub fn descriptor_by_name(&self, name: &str) -> Option<&'static Descriptor> {
        self.entries.get(name)?.descriptor
    }

    /// Descriptor of the most-derived runtime type behind `obj`.
    ///
    /// Resolves `obj.type_id()` - the concrete type's tag even when called
    /// through a `&dyn Base` upcast - and forwards to the name entry. This
    /// is how a polymorphic base reference yields the correct derived field
    /// table.
    pub fn descriptor_of(&self, obj: &dyn Any) -> Option<&'static Descriptor> {
        let name = self.runtime_index.get(&obj.type_id())?;
        self.descriptor_by_name(name)
    }

    /// Whether `name` has an entry (either half).
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Registered names, in arbitrary order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
