// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Smart-pointer descriptors: one level of indirection over a pointee.
//!
//! Supported wrappers are `Box<T>` (exclusive ownership) and `Arc<T>`
//! (shared ownership). The wrapper's declared type name differs from the
//! payload's, so traversal code detecting a smart pointer must substitute
//! the unwrapped reference and the pointee descriptor before continuing.

use crate::describe::Describe;
use crate::descriptor::Descriptor;
use crate::opaque::{Opaque, OpaqueMut};
use std::any::TypeId;
use std::fmt;
use std::sync::Arc;

/// Erased deref table for one monomorphized wrapper type.
struct SmartPtrOps {
    deref: unsafe fn(*const u8) -> Option<*const u8>,
    deref_mut: unsafe fn(*mut u8) -> Option<*mut u8>,
}

/// Shape payload of a smart-pointer descriptor.
pub struct SmartPtrShape {
    owner: TypeId,
    wrapper: &'static str,
    pointee: &'static Descriptor,
    ops: SmartPtrOps,
}

unsafe fn box_deref<T: 'static>(ptr: *const u8) -> Option<*const u8> {
    let boxed = &*ptr.cast::<Box<T>>();
    Some((&**boxed as *const T).cast())
}

unsafe fn box_deref_mut<T: 'static>(ptr: *mut u8) -> Option<*mut u8> {
    let boxed = &mut *ptr.cast::<Box<T>>();
    Some((&mut **boxed as *mut T).cast())
}

unsafe fn arc_deref<T: 'static>(ptr: *const u8) -> Option<*const u8> {
    let shared = &*ptr.cast::<Arc<T>>();
    Some(Arc::as_ptr(shared).cast())
}

unsafe fn arc_deref_mut<T: 'static>(ptr: *mut u8) -> Option<*mut u8> {
    let shared = &mut *ptr.cast::<Arc<T>>();
    // Exclusive access to the pointee only exists while the count is one.
    Arc::get_mut(shared).map(|value| (value as *mut T).cast())
}

impl SmartPtrShape {
    /// Shape for `Box<T>`.
    pub(crate) fn boxed<T: Describe>() -> Self {
        Self {
            owner: TypeId::of::<Box<T>>(),
            wrapper: "Box",
            pointee: T::descriptor(),
            ops: SmartPtrOps {
                deref: box_deref::<T>,
                deref_mut: box_deref_mut::<T>,
            },
        }
    }

    /// Shape for `Arc<T>`.
    pub(crate) fn shared<T: Describe>() -> Self {
        Self {
            owner: TypeId::of::<Arc<T>>(),
            wrapper: "Arc",
            pointee: T::descriptor(),
            ops: SmartPtrOps {
                deref: arc_deref::<T>,
                deref_mut: arc_deref_mut::<T>,
            },
        }
    }

    /// Wrapper name without the pointee (`"Box"`, `"Arc"`).
    pub fn wrapper_name(&self) -> &'static str {
        self.wrapper
    }

    /// Descriptor of the wrapped value.
    pub fn pointee(&self) -> &'static Descriptor {
        self.pointee
    }

    /// Shared reference to the pointee, retagged with its type.
    ///
    /// `None` when `obj` is tagged with a different wrapper type. Never
    /// allocates.
    pub fn deref<'a>(&self, obj: Opaque<'a>) -> Option<Opaque<'a>> {
        if obj.tag() != self.owner {
            return None;
        }
        let inner = unsafe { (self.ops.deref)(obj.addr())? };
        Some(unsafe { Opaque::from_raw(self.pointee.rust_type_id(), inner) })
    }

    /// Exclusive reference to the pointee, retagged with its type.
    ///
    /// `None` on a wrapper tag mismatch, and for `Arc` while the pointee is
    /// aliased by other handles.
    pub fn deref_mut<'a>(&self, obj: OpaqueMut<'a>) -> Option<OpaqueMut<'a>> {
        if obj.tag() != self.owner {
            return None;
        }
        let inner = unsafe { (self.ops.deref_mut)(obj.addr())? };
        Some(unsafe { OpaqueMut::from_raw(self.pointee.rust_type_id(), inner) })
    }
}

impl fmt::Debug for SmartPtrShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmartPtrShape")
            .field("wrapper", &self.wrapper)
            .field("pointee", &self.pointee.type_name())
            .finish()
    }
}

impl<T: Describe> Describe for Box<T> {
    fn descriptor() -> &'static Descriptor {
        crate::describe::intern::<Box<T>>(|| {
            let name = format!("Box<{}>", T::descriptor().type_name());
            Descriptor::smart_ptr::<Box<T>>(name, SmartPtrShape::boxed::<T>())
        })
    }
}

impl<T: Describe> Describe for Arc<T> {
    fn descriptor() -> &'static Descriptor {
        crate::describe::intern::<Arc<T>>(|| {
            let name = format!("Arc<{}>", T::descriptor().type_name());
            Descriptor::smart_ptr::<Arc<T>>(name, SmartPtrShape::shared::<T>())
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::describe::descriptor_of;
    use crate::opaque::{Opaque, OpaqueMut};
    use std::sync::Arc;

    #[test]
    fn test_box_descriptor_shape() {
        let desc = descriptor_of::<Box<i32>>();
        assert!(desc.is_smart_ptr());
        assert_eq!(desc.type_name(), "Box<i32>");

        let shape = desc.as_smart_ptr().expect("smart ptr shape");
        assert_eq!(shape.wrapper_name(), "Box");
        assert!(std::ptr::eq(shape.pointee(), descriptor_of::<i32>()));
    }

    #[test]
    fn test_box_deref_roundtrip() {
        let value = Box::new(String::from("payload"));
        let desc = descriptor_of::<Box<String>>();
        let shape = desc.as_smart_ptr().expect("smart ptr shape");

        let inner = shape.deref(Opaque::new(&value)).expect("deref");
        assert_eq!(inner.downcast_ref::<String>().map(String::as_str), Some("payload"));
    }

    #[test]
    fn test_box_deref_mut_writes_through() {
        let mut value = Box::new(10i64);
        let shape = descriptor_of::<Box<i64>>()
            .as_smart_ptr()
            .expect("smart ptr shape");

        let inner = shape.deref_mut(OpaqueMut::new(&mut value)).expect("deref_mut");
        *inner.downcast_mut::<i64>().expect("downcast") = 99;
        assert_eq!(*value, 99);
    }

    #[test]
    fn test_arc_unique_vs_aliased() {
        let mut unique = Arc::new(5u32);
        let shape = descriptor_of::<Arc<u32>>()
            .as_smart_ptr()
            .expect("smart ptr shape");

        assert!(shape.deref_mut(OpaqueMut::new(&mut unique)).is_some());

        let mut aliased = Arc::new(5u32);
        let _other = Arc::clone(&aliased);
        assert!(shape.deref_mut(OpaqueMut::new(&mut aliased)).is_none());
        // Shared access still works while aliased.
        assert!(shape.deref(Opaque::new(&aliased)).is_some());
    }

    #[test]
    fn test_deref_rejects_wrong_wrapper() {
        let value = Box::new(1i32);
        let arc_shape = descriptor_of::<Arc<i32>>()
            .as_smart_ptr()
            .expect("smart ptr shape");
        assert!(arc_shape.deref(Opaque::new(&value)).is_none());
    }

    #[test]
    fn test_value_ref_unwraps_one_level() {
        let value = Box::new(7u16);
        let desc = descriptor_of::<Box<u16>>();

        let unwrapped = desc.value_ref(Opaque::new(&value)).expect("value_ref");
        assert_eq!(unwrapped.downcast_ref::<u16>(), Some(&7));

        // Leaves resolve to themselves.
        let leaf = descriptor_of::<u16>();
        let direct = leaf.value_ref(Opaque::new(&*value)).expect("identity");
        assert_eq!(direct.downcast_ref::<u16>(), Some(&7));
    }
}
