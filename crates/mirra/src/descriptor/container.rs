// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Container descriptors: one uniform contract over five container kinds.
//!
//! | kind          | backing    | indexed | keyed | membership |
//! |---------------|------------|---------|-------|------------|
//! | Sequence      | `Vec`      | yes     | no    | no         |
//! | OrderedMap    | `BTreeMap` | no      | yes   | key        |
//! | UnorderedMap  | `HashMap`  | no      | yes   | key        |
//! | OrderedSet    | `BTreeSet` | read    | no    | value      |
//! | UnorderedSet  | `HashSet`  | read    | no    | value      |
//!
//! Generic traversal code branches on [`ContainerKind`] only, never on
//! concrete element types. Each shape owns a table of monomorphized `fn`
//! pointers produced at construction; the element descriptors are resolved
//! once through [`Describe`](crate::Describe) at the same time.
//!
//! An operation a kind does not define returns
//! [`AccessError::Unsupported`] - distinct from the not-found family, so
//! callers can tell "no such key" from "this container has no keys".

use crate::describe::Describe;
use crate::descriptor::{AccessError, Descriptor};
use crate::opaque::{Opaque, OpaqueBox, OpaqueMut};
use std::any::TypeId;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fmt;
use std::hash::Hash;

/// The five supported container kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    Sequence,
    OrderedMap,
    UnorderedMap,
    OrderedSet,
    UnorderedSet,
}

impl ContainerKind {
    /// Whether this kind stores key/value entries.
    pub fn is_keyed(&self) -> bool {
        matches!(self, Self::OrderedMap | Self::UnorderedMap)
    }

    /// Whether this kind stores a set of values.
    pub fn is_set(&self) -> bool {
        matches!(self, Self::OrderedSet | Self::UnorderedSet)
    }

    /// Container name without element types (`"BTreeMap"`).
    pub fn label(&self) -> &'static str {
        match self {
            Self::Sequence => "Vec",
            Self::OrderedMap => "BTreeMap",
            Self::UnorderedMap => "HashMap",
            Self::OrderedSet => "BTreeSet",
            Self::UnorderedSet => "HashSet",
        }
    }
}

/// Erased operation table for one monomorphized container type.
///
/// `None` marks an operation the kind does not define. Every function
/// requires the pointer to address a live container of the owning type;
/// the public wrappers on [`ContainerShape`] establish that via tag checks.
struct ContainerOps {
    len: unsafe fn(*const u8) -> usize,
    value_by_index: Option<unsafe fn(*const u8, usize) -> Option<*const u8>>,
    value_by_index_mut: Option<unsafe fn(*mut u8, usize) -> Option<*mut u8>>,
    keys: Option<unsafe fn(*const u8) -> Vec<*const u8>>,
    value_by_key: Option<unsafe fn(*const u8, *const u8) -> Option<*const u8>>,
    value_by_key_mut: Option<unsafe fn(*mut u8, *const u8) -> Option<*mut u8>>,
    push: unsafe fn(*mut u8, OpaqueBox) -> Result<bool, AccessError>,
    contains: Option<unsafe fn(*const u8, *const u8) -> bool>,
}

/// Shape payload of a container descriptor.
pub struct ContainerShape {
    owner: TypeId,
    kind: ContainerKind,
    key: Option<&'static Descriptor>,
    value: &'static Descriptor,
    ops: ContainerOps,
}

fn mismatch(expected: String, got: TypeId) -> AccessError {
    AccessError::TypeMismatch {
        expected,
        got: format!("{:?}", got),
    }
}

// --- Vec -------------------------------------------------------------------

unsafe fn seq_len<T: 'static>(ptr: *const u8) -> usize {
    (*ptr.cast::<Vec<T>>()).len()
}

unsafe fn seq_value_by_index<T: 'static>(ptr: *const u8, index: usize) -> Option<*const u8> {
    (&(*ptr.cast::<Vec<T>>()))
        .get(index)
        .map(|item| (item as *const T).cast())
}

unsafe fn seq_value_by_index_mut<T: 'static>(ptr: *mut u8, index: usize) -> Option<*mut u8> {
    (&mut (*ptr.cast::<Vec<T>>()))
        .get_mut(index)
        .map(|item| (item as *mut T).cast())
}

unsafe fn seq_push<T: 'static>(ptr: *mut u8, value: OpaqueBox) -> Result<bool, AccessError> {
    let ctn = &mut *ptr.cast::<Vec<T>>();
    let value = value
        .downcast::<T>()
        .map_err(|b| mismatch(std::any::type_name::<T>().to_string(), b.tag()))?;
    ctn.push(*value);
    Ok(true)
}

// --- BTreeMap --------------------------------------------------------------

unsafe fn bmap_len<K: Ord + 'static, V: 'static>(ptr: *const u8) -> usize {
    (*ptr.cast::<BTreeMap<K, V>>()).len()
}

unsafe fn bmap_keys<K: Ord + 'static, V: 'static>(ptr: *const u8) -> Vec<*const u8> {
    (*ptr.cast::<BTreeMap<K, V>>())
        .keys()
        .map(|key| (key as *const K).cast())
        .collect()
}

unsafe fn bmap_value_by_key<K: Ord + 'static, V: 'static>(
    ptr: *const u8,
    key: *const u8,
) -> Option<*const u8> {
    (*ptr.cast::<BTreeMap<K, V>>())
        .get(&*key.cast::<K>())
        .map(|value| (value as *const V).cast())
}

unsafe fn bmap_value_by_key_mut<K: Ord + 'static, V: 'static>(
    ptr: *mut u8,
    key: *const u8,
) -> Option<*mut u8> {
    (*ptr.cast::<BTreeMap<K, V>>())
        .get_mut(&*key.cast::<K>())
        .map(|value| (value as *mut V).cast())
}

unsafe fn bmap_push<K: Ord + 'static, V: 'static>(
    ptr: *mut u8,
    value: OpaqueBox,
) -> Result<bool, AccessError> {
    let ctn = &mut *ptr.cast::<BTreeMap<K, V>>();
    let pair = value
        .downcast::<(K, V)>()
        .map_err(|b| mismatch(std::any::type_name::<(K, V)>().to_string(), b.tag()))?;
    let (key, value) = *pair;
    ctn.insert(key, value);
    Ok(true)
}

unsafe fn bmap_contains<K: Ord + 'static, V: 'static>(ptr: *const u8, key: *const u8) -> bool {
    (*ptr.cast::<BTreeMap<K, V>>()).contains_key(&*key.cast::<K>())
}

// --- HashMap ---------------------------------------------------------------

unsafe fn hmap_len<K: Eq + Hash + 'static, V: 'static>(ptr: *const u8) -> usize {
    (*ptr.cast::<HashMap<K, V>>()).len()
}

unsafe fn hmap_keys<K: Eq + Hash + 'static, V: 'static>(ptr: *const u8) -> Vec<*const u8> {
    (*ptr.cast::<HashMap<K, V>>())
        .keys()
        .map(|key| (key as *const K).cast())
        .collect()
}

unsafe fn hmap_value_by_key<K: Eq + Hash + 'static, V: 'static>(
    ptr: *const u8,
    key: *const u8,
) -> Option<*const u8> {
    (*ptr.cast::<HashMap<K, V>>())
        .get(&*key.cast::<K>())
        .map(|value| (value as *const V).cast())
}

unsafe fn hmap_value_by_key_mut<K: Eq + Hash + 'static, V: 'static>(
    ptr: *mut u8,
    key: *const u8,
) -> Option<*mut u8> {
    (*ptr.cast::<HashMap<K, V>>())
        .get_mut(&*key.cast::<K>())
        .map(|value| (value as *mut V).cast())
}

unsafe fn hmap_push<K: Eq + Hash + 'static, V: 'static>(
    ptr: *mut u8,
    value: OpaqueBox,
) -> Result<bool, AccessError> {
    let ctn = &mut *ptr.cast::<HashMap<K, V>>();
    let pair = value
        .downcast::<(K, V)>()
        .map_err(|b| mismatch(std::any::type_name::<(K, V)>().to_string(), b.tag()))?;
    let (key, value) = *pair;
    ctn.insert(key, value);
    Ok(true)
}

unsafe fn hmap_contains<K: Eq + Hash + 'static, V: 'static>(
    ptr: *const u8,
    key: *const u8,
) -> bool {
    (*ptr.cast::<HashMap<K, V>>()).contains_key(&*key.cast::<K>())
}

// --- BTreeSet --------------------------------------------------------------

unsafe fn bset_len<T: Ord + 'static>(ptr: *const u8) -> usize {
    (*ptr.cast::<BTreeSet<T>>()).len()
}

unsafe fn bset_value_by_index<T: Ord + 'static>(ptr: *const u8, index: usize) -> Option<*const u8> {
    // Ordinal traversal: O(index) over non-random-access storage.
    (*ptr.cast::<BTreeSet<T>>())
        .iter()
        .nth(index)
        .map(|item| (item as *const T).cast())
}

unsafe fn bset_push<T: Ord + 'static>(ptr: *mut u8, value: OpaqueBox) -> Result<bool, AccessError> {
    let ctn = &mut *ptr.cast::<BTreeSet<T>>();
    let value = value
        .downcast::<T>()
        .map_err(|b| mismatch(std::any::type_name::<T>().to_string(), b.tag()))?;
    Ok(ctn.insert(*value))
}

unsafe fn bset_contains<T: Ord + 'static>(ptr: *const u8, value: *const u8) -> bool {
    (*ptr.cast::<BTreeSet<T>>()).contains(&*value.cast::<T>())
}

// --- HashSet ---------------------------------------------------------------

unsafe fn hset_len<T: Eq + Hash + 'static>(ptr: *const u8) -> usize {
    (*ptr.cast::<HashSet<T>>()).len()
}

unsafe fn hset_value_by_index<T: Eq + Hash + 'static>(
    ptr: *const u8,
    index: usize,
) -> Option<*const u8> {
    (*ptr.cast::<HashSet<T>>())
        .iter()
        .nth(index)
        .map(|item| (item as *const T).cast())
}

unsafe fn hset_push<T: Eq + Hash + 'static>(
    ptr: *mut u8,
    value: OpaqueBox,
) -> Result<bool, AccessError> {
    let ctn = &mut *ptr.cast::<HashSet<T>>();
    let value = value
        .downcast::<T>()
        .map_err(|b| mismatch(std::any::type_name::<T>().to_string(), b.tag()))?;
    Ok(ctn.insert(*value))
}

unsafe fn hset_contains<T: Eq + Hash + 'static>(ptr: *const u8, value: *const u8) -> bool {
    (*ptr.cast::<HashSet<T>>()).contains(&*value.cast::<T>())
}

impl ContainerShape {
    pub(crate) fn sequence<T: Describe>() -> Self {
        Self {
            owner: TypeId::of::<Vec<T>>(),
            kind: ContainerKind::Sequence,
            key: None,
            value: T::descriptor(),
            ops: ContainerOps {
                len: seq_len::<T>,
                value_by_index: Some(seq_value_by_index::<T>),
                value_by_index_mut: Some(seq_value_by_index_mut::<T>),
                keys: None,
                value_by_key: None,
                value_by_key_mut: None,
                push: seq_push::<T>,
                contains: None,
            },
        }
    }

    pub(crate) fn ordered_map<K: Describe + Ord, V: Describe>() -> Self {
        Self {
            owner: TypeId::of::<BTreeMap<K, V>>(),
            kind: ContainerKind::OrderedMap,
            key: Some(K::descriptor()),
            value: V::descriptor(),
            ops: ContainerOps {
                len: bmap_len::<K, V>,
                value_by_index: None,
                value_by_index_mut: None,
                keys: Some(bmap_keys::<K, V>),
                value_by_key: Some(bmap_value_by_key::<K, V>),
                value_by_key_mut: Some(bmap_value_by_key_mut::<K, V>),
                push: bmap_push::<K, V>,
                contains: Some(bmap_contains::<K, V>),
            },
        }
    }

    pub(crate) fn unordered_map<K: Describe + Eq + Hash, V: Describe>() -> Self {
        Self {
            owner: TypeId::of::<HashMap<K, V>>(),
            kind: ContainerKind::UnorderedMap,
            key: Some(K::descriptor()),
            value: V::descriptor(),
            ops: ContainerOps {
                len: hmap_len::<K, V>,
                value_by_index: None,
                value_by_index_mut: None,
                keys: Some(hmap_keys::<K, V>),
                value_by_key: Some(hmap_value_by_key::<K, V>),
                value_by_key_mut: Some(hmap_value_by_key_mut::<K, V>),
                push: hmap_push::<K, V>,
                contains: Some(hmap_contains::<K, V>),
            },
        }
    }

    pub(crate) fn ordered_set<T: Describe + Ord>() -> Self {
        Self {
            owner: TypeId::of::<BTreeSet<T>>(),
            kind: ContainerKind::OrderedSet,
            key: None,
            value: T::descriptor(),
            ops: ContainerOps {
                len: bset_len::<T>,
                value_by_index: Some(bset_value_by_index::<T>),
                // In-place mutation would break the ordering invariant.
                value_by_index_mut: None,
                keys: None,
                value_by_key: None,
                value_by_key_mut: None,
                push: bset_push::<T>,
                contains: Some(bset_contains::<T>),
            },
        }
    }

    pub(crate) fn unordered_set<T: Describe + Eq + Hash>() -> Self {
        Self {
            owner: TypeId::of::<HashSet<T>>(),
            kind: ContainerKind::UnorderedSet,
            key: None,
            value: T::descriptor(),
            ops: ContainerOps {
                len: hset_len::<T>,
                value_by_index: Some(hset_value_by_index::<T>),
                value_by_index_mut: None,
                keys: None,
                value_by_key: None,
                value_by_key_mut: None,
                push: hset_push::<T>,
                contains: Some(hset_contains::<T>),
            },
        }
    }

    /// Which of the five kinds this container is.
    pub fn kind(&self) -> ContainerKind {
        self.kind
    }

    /// Container name without element types (`"BTreeMap"`).
    pub fn container_type_name(&self) -> &'static str {
        self.kind.label()
    }

    /// Key descriptor; present only for keyed kinds.
    pub fn key_descriptor(&self) -> Option<&'static Descriptor> {
        self.key
    }

    /// Value descriptor. Items of sequence and set kinds count as values.
    pub fn value_descriptor(&self) -> &'static Descriptor {
        self.value
    }

    /// Full type name including element types, for error payloads.
    fn type_label(&self) -> String {
        match self.key {
            Some(key) => format!(
                "{}<{}, {}>",
                self.kind.label(),
                key.type_name(),
                self.value.type_name()
            ),
            None => format!("{}<{}>", self.kind.label(), self.value.type_name()),
        }
    }

    fn check_owner(&self, tag: TypeId) -> Result<(), AccessError> {
        if tag == self.owner {
            Ok(())
        } else {
            Err(mismatch(self.type_label(), tag))
        }
    }

    fn check_key(&self, tag: TypeId) -> Result<(), AccessError> {
        let expected = match self.key {
            Some(key) => key,
            None => self.value,
        };
        if tag == expected.rust_type_id() {
            Ok(())
        } else {
            Err(mismatch(expected.type_name().to_string(), tag))
        }
    }

    fn unsupported(&self, op: &'static str) -> AccessError {
        AccessError::Unsupported {
            op,
            container: self.kind.label(),
        }
    }

    /// Number of elements. O(1) for every kind.
    pub fn len(&self, obj: Opaque<'_>) -> Result<usize, AccessError> {
        self.check_owner(obj.tag())?;
        Ok(unsafe { (self.ops.len)(obj.addr()) })
    }

    /// Whether the container holds no elements.
    pub fn is_empty(&self, obj: Opaque<'_>) -> Result<bool, AccessError> {
        self.len(obj).map(|len| len == 0)
    }

    /// Element at ordinal `index`; sequence and set kinds only.
    ///
    /// O(1) for sequences, O(index) for sets.
    pub fn value_by_index<'a>(
        &self,
        obj: Opaque<'a>,
        index: usize,
    ) -> Result<Opaque<'a>, AccessError> {
        self.check_owner(obj.tag())?;
        let get = self
            .ops
            .value_by_index
            .ok_or_else(|| self.unsupported("value_by_index"))?;
        match unsafe { get(obj.addr(), index) } {
            Some(item) => Ok(unsafe { Opaque::from_raw(self.value.rust_type_id(), item) }),
            None => Err(AccessError::IndexOutOfBounds {
                index,
                len: unsafe { (self.ops.len)(obj.addr()) },
            }),
        }
    }

    /// Exclusive element at ordinal `index`; sequences only.
    pub fn value_by_index_mut<'a>(
        &self,
        obj: OpaqueMut<'a>,
        index: usize,
    ) -> Result<OpaqueMut<'a>, AccessError> {
        self.check_owner(obj.tag())?;
        let get = self
            .ops
            .value_by_index_mut
            .ok_or_else(|| self.unsupported("value_by_index_mut"))?;
        let len = unsafe { (self.ops.len)(obj.addr()) };
        match unsafe { get(obj.addr(), index) } {
            Some(item) => Ok(unsafe { OpaqueMut::from_raw(self.value.rust_type_id(), item) }),
            None => Err(AccessError::IndexOutOfBounds { index, len }),
        }
    }

    /// Snapshot of the current keys in iteration order; keyed kinds only.
    ///
    /// Not restartable and not stable across mutation of the container.
    pub fn keys<'a>(&self, obj: Opaque<'a>) -> Result<Vec<Opaque<'a>>, AccessError> {
        self.check_owner(obj.tag())?;
        let keys = self.ops.keys.ok_or_else(|| self.unsupported("keys"))?;
        let key_desc = match self.key {
            Some(key) => key,
            None => return Err(self.unsupported("keys")),
        };
        let raw = unsafe { keys(obj.addr()) };
        Ok(raw
            .into_iter()
            .map(|key| unsafe { Opaque::from_raw(key_desc.rust_type_id(), key) })
            .collect())
    }

    /// Value stored under `key`; keyed kinds only.
    pub fn value_by_key<'a>(
        &self,
        obj: Opaque<'a>,
        key: Opaque<'_>,
    ) -> Result<Opaque<'a>, AccessError> {
        self.check_owner(obj.tag())?;
        let get = self
            .ops
            .value_by_key
            .ok_or_else(|| self.unsupported("value_by_key"))?;
        self.check_key(key.tag())?;
        match unsafe { get(obj.addr(), key.addr()) } {
            Some(value) => Ok(unsafe { Opaque::from_raw(self.value.rust_type_id(), value) }),
            None => Err(AccessError::KeyNotFound),
        }
    }

    /// Exclusive value stored under `key`; keyed kinds only.
    pub fn value_by_key_mut<'a>(
        &self,
        obj: OpaqueMut<'a>,
        key: Opaque<'_>,
    ) -> Result<OpaqueMut<'a>, AccessError> {
        self.check_owner(obj.tag())?;
        let get = self
            .ops
            .value_by_key_mut
            .ok_or_else(|| self.unsupported("value_by_key_mut"))?;
        self.check_key(key.tag())?;
        match unsafe { get(obj.addr(), key.addr()) } {
            Some(value) => Ok(unsafe { OpaqueMut::from_raw(self.value.rust_type_id(), value) }),
            None => Err(AccessError::KeyNotFound),
        }
    }

    /// Insert an owned value.
    ///
    /// Appends for sequences; insert-or-overwrite keyed by the boxed
    /// `(K, V)` pair's key for maps; insert-if-absent for sets (`Ok(false)`
    /// when the value was already present). Ownership of the box moves into
    /// the container, so move-only element types are fully supported.
    pub fn push(&self, obj: OpaqueMut<'_>, value: OpaqueBox) -> Result<bool, AccessError> {
        self.check_owner(obj.tag())?;
        unsafe { (self.ops.push)(obj.addr(), value) }
    }

    /// Membership probe: key membership for keyed kinds, value membership
    /// for set kinds.
    pub fn contains(&self, obj: Opaque<'_>, key_or_value: Opaque<'_>) -> Result<bool, AccessError> {
        self.check_owner(obj.tag())?;
        let contains = self
            .ops
            .contains
            .ok_or_else(|| self.unsupported("contains"))?;
        self.check_key(key_or_value.tag())?;
        Ok(unsafe { contains(obj.addr(), key_or_value.addr()) })
    }
}

impl fmt::Debug for ContainerShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContainerShape")
            .field("kind", &self.kind)
            .field("key", &self.key.map(Descriptor::type_name))
            .field("value", &self.value.type_name())
            .finish()
    }
}

impl<T: Describe> Describe for Vec<T> {
    fn descriptor() -> &'static Descriptor {
        crate::describe::intern::<Vec<T>>(|| {
            let name = format!("Vec<{}>", T::descriptor().type_name());
            Descriptor::container::<Vec<T>>(name, ContainerShape::sequence::<T>())
        })
    }
}

impl<K: Describe + Ord, V: Describe> Describe for BTreeMap<K, V> {
    fn descriptor() -> &'static Descriptor {
        crate::describe::intern::<BTreeMap<K, V>>(|| {
            let name = format!(
                "BTreeMap<{}, {}>",
                K::descriptor().type_name(),
                V::descriptor().type_name()
            );
            Descriptor::container::<BTreeMap<K, V>>(name, ContainerShape::ordered_map::<K, V>())
        })
    }
}

impl<K: Describe + Eq + Hash, V: Describe> Describe for HashMap<K, V> {
    fn descriptor() -> &'static Descriptor {
        crate::describe::intern::<HashMap<K, V>>(|| {
            let name = format!(
                "HashMap<{}, {}>",
                K::descriptor().type_name(),
                V::descriptor().type_name()
            );
            Descriptor::container::<HashMap<K, V>>(name, ContainerShape::unordered_map::<K, V>())
        })
    }
}

impl<T: Describe + Ord> Describe for BTreeSet<T> {
    fn descriptor() -> &'static Descriptor {
        crate::describe::intern::<BTreeSet<T>>(|| {
            let name = format!("BTreeSet<{}>", T::descriptor().type_name());
            Descriptor::container::<BTreeSet<T>>(name, ContainerShape::ordered_set::<T>())
        })
    }
}

impl<T: Describe + Eq + Hash> Describe for HashSet<T> {
    fn descriptor() -> &'static Descriptor {
        crate::describe::intern::<HashSet<T>>(|| {
            let name = format!("HashSet<{}>", T::descriptor().type_name());
            Descriptor::container::<HashSet<T>>(name, ContainerShape::unordered_set::<T>())
        })
    }
}
