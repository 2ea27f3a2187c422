// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Leaf descriptors for the built-in primitive types.
//!
//! Leaves expose name and size only; dynamic access ends here and the caller
//! downcasts the opaque reference to the concrete type. External fixed-size
//! types (math/vector/matrix) join this set through
//! [`reflect_leaf!`](crate::reflect_leaf).

use crate::describe::{intern, Describe};
use crate::descriptor::Descriptor;

macro_rules! leaf_describe {
    ($($ty:ty => $name:expr),+ $(,)?) => {
        $(
            impl Describe for $ty {
                fn descriptor() -> &'static Descriptor {
                    intern::<$ty>(|| Descriptor::leaf::<$ty>($name))
                }
            }
        )+
    };
}

leaf_describe! {
    bool => "bool",
    char => "char",
    u8 => "u8",
    u16 => "u16",
    u32 => "u32",
    u64 => "u64",
    i8 => "i8",
    i16 => "i16",
    i32 => "i32",
    i64 => "i64",
    f32 => "f32",
    f64 => "f64",
    usize => "usize",
    isize => "isize",
    String => "String",
}

#[cfg(test)]
mod tests {
    use crate::describe::descriptor_of;

    #[test]
    fn test_leaf_names_and_sizes() {
        assert_eq!(descriptor_of::<bool>().type_name(), "bool");
        assert_eq!(descriptor_of::<bool>().size(), 1);
        assert_eq!(descriptor_of::<i32>().type_name(), "i32");
        assert_eq!(descriptor_of::<i32>().size(), 4);
        assert_eq!(descriptor_of::<i64>().type_name(), "i64");
        assert_eq!(descriptor_of::<i64>().size(), 8);
        assert_eq!(descriptor_of::<f64>().type_name(), "f64");
        assert_eq!(descriptor_of::<f64>().size(), 8);
        assert_eq!(
            descriptor_of::<String>().size(),
            std::mem::size_of::<String>()
        );
    }

    #[test]
    fn test_leaf_stability_across_calls() {
        let first = descriptor_of::<f32>();
        let second = descriptor_of::<f32>();
        assert!(std::ptr::eq(first, second));
        assert_eq!(first.type_name(), "f32");
        assert_eq!(first.size(), 4);
    }

    #[test]
    fn test_leaf_capabilities() {
        let desc = descriptor_of::<i32>();
        assert!(desc.is_predefined());
        assert!(!desc.is_container());
        assert!(!desc.is_smart_ptr());
        assert!(!desc.is_foreign());
        assert!(!desc.is_class());
    }
}
