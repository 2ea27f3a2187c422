// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Compile-time descriptor dispatch.
//!
//! [`Describe`] maps a statically-known type to its process-wide singleton
//! [`Descriptor`] without a name lookup. Composite descriptors call back into
//! this trait to resolve their element descriptors, so the whole descriptor
//! graph is wired up from `T::descriptor()` alone.
//!
//! The world is closed: a type participates in introspection only if it has a
//! `Describe` impl - provided here for primitives and the supported
//! containers/smart pointers, or generated by [`reflect_class!`],
//! [`reflect_leaf!`] and [`reflect_foreign!`] for user types. Anything else
//! is a missing-trait-bound build failure, never a silently wrong descriptor.
//!
//! [`reflect_class!`]: crate::reflect_class
//! [`reflect_leaf!`]: crate::reflect_leaf
//! [`reflect_foreign!`]: crate::reflect_foreign

use crate::descriptor::Descriptor;
use dashmap::DashMap;
use std::any::TypeId;
use std::sync::OnceLock;

/// Maps a static type to its singleton descriptor.
pub trait Describe: 'static {
    /// The process-wide descriptor for `Self`.
    ///
    /// Built lazily on first call, then shared; two calls always return the
    /// same `&'static` reference.
    fn descriptor() -> &'static Descriptor;
}

/// Free-function form of [`Describe::descriptor`], convenient in generic code.
pub fn descriptor_of<T: Describe>() -> &'static Descriptor {
    T::descriptor()
}

/// Descriptor singletons, keyed by the described type.
///
/// Values are leaked so descriptors live for the whole process and can be
/// borrowed as `&'static` from anywhere (members, container element slots,
/// registry entries).
static INTERNED: OnceLock<DashMap<TypeId, &'static Descriptor>> = OnceLock::new();

/// Build-or-fetch the singleton descriptor for `T`.
///
/// `build` runs at most once per winning thread; when two threads race the
/// first insert wins and the loser's copy is dropped before anyone can
/// observe it. Recursive composites may re-enter for their element types -
/// no lock is held while `build` runs.
#[doc(hidden)]
pub fn intern<T: 'static>(build: impl FnOnce() -> Descriptor) -> &'static Descriptor {
    let map = INTERNED.get_or_init(DashMap::new);
    if let Some(existing) = map.get(&TypeId::of::<T>()) {
        return *existing;
    }

    let built = build();
    let entry = map.entry(TypeId::of::<T>()).or_insert_with(|| {
        log::debug!("[describe] interned descriptor for {}", built.type_name());
        Box::leak(Box::new(built))
    });
    *entry
}

/// Resolve a field's descriptor from a raw pointer to it.
///
/// Only used by [`reflect_class!`](crate::reflect_class) to recover the field
/// type from a place projection; the pointer is never read.
#[doc(hidden)]
pub fn descriptor_of_ptr<T: Describe>(_field: *const T) -> &'static Descriptor {
    T::descriptor()
}
