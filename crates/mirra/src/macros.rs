// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Registration macros.
//!
//! These generate the [`Describe`](crate::Describe) impl that wires a user
//! type into the descriptor graph:
//!
//! - [`reflect_class!`] - class with an explicit, ordered field list
//! - [`reflect_leaf!`] - external fixed-size type, name + size only
//! - [`reflect_foreign!`] - externally-reflected opaque type
//!
//! Introspection is opt-in per field: anything left out of the
//! `reflect_class!` list simply does not appear in the member table.

/// Implement [`Describe`](crate::Describe) for a class, registering the
/// listed fields in order.
///
/// ```
/// use mirra::{descriptor_of, reflect_class};
///
/// struct Odometry {
///     distance_m: f64,
///     ticks: u64,
/// }
///
/// reflect_class!(Odometry { distance_m, ticks });
///
/// let class = descriptor_of::<Odometry>().as_class().unwrap();
/// assert_eq!(class.field_len(), 2);
/// assert_eq!(class.field_name(0), Some("distance_m"));
/// ```
///
/// Field types must implement `Describe` themselves; a field of an
/// unregistered type is a compile error, never a wrong descriptor.
#[macro_export]
macro_rules! reflect_class {
    ($ty:ty { $($field:ident),+ $(,)? }) => {
        impl $crate::Describe for $ty {
            fn descriptor() -> &'static $crate::Descriptor {
                $crate::intern::<$ty>(|| {
                    let members = vec![
                        $(
                            $crate::Member::new(
                                stringify!($field),
                                ::std::mem::offset_of!($ty, $field),
                                {
                                    // Recover the field type from a raw place
                                    // projection; the pointer is never read.
                                    let slot = ::std::mem::MaybeUninit::<$ty>::uninit();
                                    let base = slot.as_ptr();
                                    let field = unsafe { ::std::ptr::addr_of!((*base).$field) };
                                    $crate::descriptor_of_ptr(field)
                                },
                            ),
                        )+
                    ];
                    $crate::Descriptor::class::<$ty>(stringify!($ty), members)
                })
            }
        }
    };
}

/// Implement [`Describe`](crate::Describe) for an external fixed-size type
/// as an opaque leaf: name and size only, no decomposition.
///
/// ```
/// use mirra::{descriptor_of, reflect_leaf};
///
/// #[derive(Clone, Copy)]
/// struct Quat { x: f32, y: f32, z: f32, w: f32 }
///
/// reflect_leaf!(Quat);
///
/// let desc = descriptor_of::<Quat>();
/// assert_eq!(desc.type_name(), "Quat");
/// assert_eq!(desc.size(), 16);
/// ```
#[macro_export]
macro_rules! reflect_leaf {
    ($ty:ty) => {
        $crate::reflect_leaf!($ty, stringify!($ty));
    };
    ($ty:ty, $name:expr) => {
        impl $crate::Describe for $ty {
            fn descriptor() -> &'static $crate::Descriptor {
                $crate::intern::<$ty>(|| $crate::Descriptor::leaf::<$ty>($name))
            }
        }
    };
}

/// Implement [`Describe`](crate::Describe) for a foreign message type that
/// carries its own reflection facility.
///
/// The descriptor reports `is_foreign() == true` and exposes no structure;
/// a caller wanting field-level access downcasts the opaque reference and
/// talks to the type's native facility directly.
#[macro_export]
macro_rules! reflect_foreign {
    ($ty:ty) => {
        $crate::reflect_foreign!($ty, stringify!($ty));
    };
    ($ty:ty, $name:expr) => {
        impl $crate::Describe for $ty {
            fn descriptor() -> &'static $crate::Descriptor {
                $crate::intern::<$ty>(|| $crate::Descriptor::foreign::<$ty>($name))
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::describe::descriptor_of;
    use crate::opaque::Opaque;

    #[derive(Clone, Copy, PartialEq, Debug)]
    struct Vec3 {
        x: f32,
        y: f32,
        z: f32,
    }

    reflect_leaf!(Vec3);

    /// Stand-in for an externally-defined message with its own facility.
    struct Envelope {
        fields: Vec<String>,
    }

    impl Envelope {
        fn field_count(&self) -> usize {
            self.fields.len()
        }
    }

    reflect_foreign!(Envelope);

    #[test]
    fn test_leaf_macro_name_and_size() {
        let desc = descriptor_of::<Vec3>();
        assert_eq!(desc.type_name(), "Vec3");
        assert_eq!(desc.size(), std::mem::size_of::<Vec3>());
        assert!(desc.is_predefined());
        assert!(!desc.is_foreign());
    }

    #[test]
    fn test_foreign_macro_boundary() {
        let desc = descriptor_of::<Envelope>();
        assert!(desc.is_foreign());
        assert!(desc.is_predefined());
        assert_eq!(desc.type_name(), "Envelope");

        // Field-level access happens through the type's own facility after
        // the checked downcast.
        let message = Envelope {
            fields: vec!["a".into(), "b".into()],
        };
        let opaque = Opaque::new(&message);
        let native = opaque.downcast_ref::<Envelope>().expect("downcast");
        assert_eq!(native.field_count(), 2);
    }
}
