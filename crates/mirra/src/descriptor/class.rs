// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Class descriptors: ordered member tables for user types.
//!
//! A class records each introspectable field as a [`Member`] - name, byte
//! offset into the concrete layout, and a borrowed field descriptor. The
//! table is supplied once by [`reflect_class!`](crate::reflect_class) inside
//! the interner closure and is immutable afterward.
//!
//! Field references are computed as `object base + stored offset`. The
//! offset is only meaningful for the class's own concrete type, so every
//! access first compares the opaque reference's tag against the class tag
//! and fails with [`AccessError::TypeMismatch`] instead of reading through
//! a foreign layout.

use crate::descriptor::{AccessError, Descriptor};
use crate::opaque::{Opaque, OpaqueMut};
use std::any::TypeId;

/// One registered field of a class.
#[derive(Debug, Clone, Copy)]
pub struct Member {
    name: &'static str,
    offset: usize,
    desc: &'static Descriptor,
}

impl Member {
    /// Record a field: name, byte offset, field descriptor.
    pub fn new(name: &'static str, offset: usize, desc: &'static Descriptor) -> Self {
        Self { name, offset, desc }
    }

    /// Field name, unique within its class.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Byte offset inside the concrete type; fixed for the process lifetime.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Descriptor of the field's type (borrowed singleton).
    pub fn descriptor(&self) -> &'static Descriptor {
        self.desc
    }
}

/// Shape payload of a class descriptor.
#[derive(Debug)]
pub struct ClassShape {
    owner: TypeId,
    name: String,
    members: Vec<Member>,
}

impl ClassShape {
    pub(crate) fn new<T: 'static>(name: String, members: Vec<Member>) -> Self {
        debug_assert!(
            members
                .iter()
                .enumerate()
                .all(|(i, m)| members[..i].iter().all(|prev| prev.name != m.name)),
            "duplicate member name in class {}",
            name
        );
        Self {
            owner: TypeId::of::<T>(),
            name,
            members,
        }
    }

    /// Number of registered fields.
    pub fn field_len(&self) -> usize {
        self.members.len()
    }

    /// Name of field `id`, in registration order.
    pub fn field_name(&self, id: usize) -> Option<&'static str> {
        self.members.get(id).map(Member::name)
    }

    /// Descriptor of field `id`. O(1).
    pub fn descriptor_by_id(&self, id: usize) -> Option<&'static Descriptor> {
        self.members.get(id).map(Member::descriptor)
    }

    /// Descriptor of the field called `name`. Linear scan over the table.
    pub fn descriptor_by_name(&self, name: &str) -> Option<&'static Descriptor> {
        self.members
            .iter()
            .find(|member| member.name == name)
            .map(Member::descriptor)
    }

    /// Full member record for field `id`.
    pub fn member(&self, id: usize) -> Option<&Member> {
        self.members.get(id)
    }

    /// The ordered member table.
    pub fn members(&self) -> &[Member] {
        &self.members
    }

    fn check_owner(&self, tag: TypeId) -> Result<(), AccessError> {
        if tag == self.owner {
            Ok(())
        } else {
            Err(AccessError::TypeMismatch {
                expected: self.name.clone(),
                got: format!("{:?}", tag),
            })
        }
    }

    fn member_at(&self, id: usize) -> Result<&Member, AccessError> {
        self.members.get(id).ok_or(AccessError::IndexOutOfBounds {
            index: id,
            len: self.members.len(),
        })
    }

    /// Shared reference to field `id` of `obj`, retagged with the field type.
    pub fn field_by_id<'a>(&self, obj: Opaque<'a>, id: usize) -> Result<Opaque<'a>, AccessError> {
        self.check_owner(obj.tag())?;
        let member = self.member_at(id)?;
        let addr = unsafe { obj.addr().add(member.offset) };
        Ok(unsafe { Opaque::from_raw(member.desc.rust_type_id(), addr) })
    }

    /// Exclusive reference to field `id` of `obj`.
    pub fn field_by_id_mut<'a>(
        &self,
        obj: OpaqueMut<'a>,
        id: usize,
    ) -> Result<OpaqueMut<'a>, AccessError> {
        self.check_owner(obj.tag())?;
        let member = self.member_at(id)?;
        let addr = unsafe { obj.addr().add(member.offset) };
        Ok(unsafe { OpaqueMut::from_raw(member.desc.rust_type_id(), addr) })
    }

    /// Shared reference to the field called `name`.
    pub fn field_by_name<'a>(
        &self,
        obj: Opaque<'a>,
        name: &str,
    ) -> Result<Opaque<'a>, AccessError> {
        self.check_owner(obj.tag())?;
        let member = self
            .members
            .iter()
            .find(|member| member.name == name)
            .ok_or_else(|| AccessError::FieldNotFound(name.to_string()))?;
        let addr = unsafe { obj.addr().add(member.offset) };
        Ok(unsafe { Opaque::from_raw(member.desc.rust_type_id(), addr) })
    }

    /// Exclusive reference to the field called `name`.
    pub fn field_by_name_mut<'a>(
        &self,
        obj: OpaqueMut<'a>,
        name: &str,
    ) -> Result<OpaqueMut<'a>, AccessError> {
        self.check_owner(obj.tag())?;
        let member = self
            .members
            .iter()
            .find(|member| member.name == name)
            .ok_or_else(|| AccessError::FieldNotFound(name.to_string()))?;
        let addr = unsafe { obj.addr().add(member.offset) };
        Ok(unsafe { OpaqueMut::from_raw(member.desc.rust_type_id(), addr) })
    }
}

#[cfg(test)]
mod tests {
    use crate::describe::descriptor_of;
    use crate::descriptor::AccessError;
    use crate::opaque::{Opaque, OpaqueMut};
    use crate::reflect_class;
    use crate::Describe;

    struct Point {
        x: i32,
        y: i32,
    }

    reflect_class!(Point { x, y });

    struct Pose {
        position: Point,
        heading: f64,
        label: String,
    }

    reflect_class!(Pose {
        position,
        heading,
        label,
    });

    fn class_of<T: Describe>() -> &'static crate::ClassShape {
        descriptor_of::<T>().as_class().expect("class shape")
    }

    #[test]
    fn test_point_member_table() {
        let desc = descriptor_of::<Point>();
        assert_eq!(desc.type_name(), "Point");
        assert_eq!(desc.size(), std::mem::size_of::<Point>());
        assert!(desc.is_class());
        assert!(!desc.is_predefined());

        let class = class_of::<Point>();
        assert_eq!(class.field_len(), 2);
        assert_eq!(class.field_name(0), Some("x"));
        assert_eq!(class.field_name(1), Some("y"));
        assert_eq!(class.field_name(2), None);
        assert!(std::ptr::eq(
            class.descriptor_by_id(0).expect("field 0"),
            descriptor_of::<i32>()
        ));
        assert!(std::ptr::eq(
            class.descriptor_by_name("y").expect("field y"),
            descriptor_of::<i32>()
        ));
        assert!(class.descriptor_by_name("z").is_none());
    }

    #[test]
    fn test_member_queries_idempotent() {
        let class = class_of::<Point>();
        for _ in 0..3 {
            assert_eq!(class.field_name(0), Some("x"));
            assert!(std::ptr::eq(
                class.descriptor_by_id(1).expect("field 1"),
                class.descriptor_by_id(1).expect("field 1")
            ));
        }
    }

    #[test]
    fn test_field_write_through_reference() {
        let mut p1 = Point { x: 1, y: 2 };
        let p2 = Point { x: 3, y: 4 };
        let class = class_of::<Point>();

        {
            let field = class
                .field_by_id_mut(OpaqueMut::new(&mut p1), 0)
                .expect("field x");
            let x = field.downcast_mut::<i32>().expect("i32 field");
            assert_eq!(*x, 1);
            *x = 99;
        }

        assert_eq!(p1.x, 99);
        assert_eq!(p1.y, 2);
        assert_eq!(p2.x, 3);
    }

    #[test]
    fn test_distinct_instances_distinct_references() {
        let a = Point { x: 0, y: 0 };
        let b = Point { x: 0, y: 0 };
        let class = class_of::<Point>();

        let fa = class.field_by_id(Opaque::new(&a), 0).expect("field");
        let fb = class.field_by_id(Opaque::new(&b), 0).expect("field");
        assert!(!std::ptr::eq(
            fa.downcast_ref::<i32>().expect("i32"),
            fb.downcast_ref::<i32>().expect("i32")
        ));
    }

    #[test]
    fn test_field_access_by_name() {
        let mut pose = Pose {
            position: Point { x: 7, y: 8 },
            heading: 0.5,
            label: "origin".into(),
        };
        let class = class_of::<Pose>();

        let heading = class
            .field_by_name(Opaque::new(&pose), "heading")
            .expect("field heading");
        assert_eq!(heading.downcast_ref::<f64>(), Some(&0.5));

        let label = class
            .field_by_name_mut(OpaqueMut::new(&mut pose), "label")
            .expect("field label");
        *label.downcast_mut::<String>().expect("String field") = "goal".into();
        assert_eq!(pose.label, "goal");

        assert_eq!(
            class
                .field_by_name(Opaque::new(&pose), "missing")
                .unwrap_err(),
            AccessError::FieldNotFound("missing".into())
        );
    }

    #[test]
    fn test_nested_class_field_descriptor() {
        let class = class_of::<Pose>();
        let position = class.descriptor_by_name("position").expect("field");
        assert!(position.is_class());
        assert_eq!(position.type_name(), "Point");

        let pose = Pose {
            position: Point { x: 1, y: 2 },
            heading: 0.0,
            label: String::new(),
        };
        let field = class.field_by_name(Opaque::new(&pose), "position").expect("field");
        let inner = position
            .as_class()
            .expect("class shape")
            .field_by_id(field, 1)
            .expect("field y");
        assert_eq!(inner.downcast_ref::<i32>(), Some(&2));
    }

    #[test]
    fn test_mismatched_object_is_rejected() {
        let not_a_point = 123u64;
        let class = class_of::<Point>();
        assert!(matches!(
            class.field_by_id(Opaque::new(&not_a_point), 0),
            Err(AccessError::TypeMismatch { .. })
        ));

        let point = Point { x: 0, y: 0 };
        assert!(matches!(
            class.field_by_id(Opaque::new(&point), 5),
            Err(AccessError::IndexOutOfBounds { index: 5, len: 2 })
        ));
    }
}
