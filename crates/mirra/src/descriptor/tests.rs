// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Integration tests for the descriptor graph.

use crate::describe::descriptor_of;
use crate::opaque::{Opaque, OpaqueBox, OpaqueMut};
use crate::registry::Registry;
use crate::{reflect_class, reflect_foreign, reflect_leaf};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Clone, Copy, PartialEq, Debug, Default)]
struct Mat3 {
    cells: [f32; 9],
}

reflect_leaf!(Mat3);

/// Stand-in for an externally-defined message type with its own reflection.
#[derive(Default)]
struct Telemetry {
    entries: Vec<(String, f64)>,
}

impl Telemetry {
    fn entry_count(&self) -> usize {
        self.entries.len()
    }
}

reflect_foreign!(Telemetry);

#[derive(Default)]
struct Joint {
    name: String,
    angle_rad: f64,
}

reflect_class!(Joint { name, angle_rad });

#[derive(Default)]
struct Rig {
    id: u32,
    joints: Vec<Joint>,
    aliases: BTreeSet<String>,
    gains: BTreeMap<String, f64>,
    calibration: Mat3,
    telemetry: Telemetry,
    root: Option<()>,
}

reflect_class!(Rig {
    id,
    joints,
    aliases,
    gains,
    calibration,
    telemetry,
});

#[test]
fn test_full_workflow() {
    // 1. Dynamic instantiation by name.
    let mut registry = Registry::new();
    registry.register::<Rig>();
    registry.register::<Joint>();

    let mut instance = registry.create_by_name("Rig").expect("registered");
    let desc = registry.descriptor_by_name("Rig").expect("registered");
    assert!(std::ptr::eq(desc, descriptor_of::<Rig>()));

    // 2. Populate fields through the erased interface only.
    let class = desc.as_class().expect("class shape");
    {
        let field = class
            .field_by_name_mut(instance.as_opaque_mut(), "id")
            .expect("field id");
        *field.downcast_mut::<u32>().expect("u32") = 11;
    }
    {
        let field = class
            .field_by_name_mut(instance.as_opaque_mut(), "joints")
            .expect("field joints");
        let joints = class
            .descriptor_by_name("joints")
            .and_then(crate::Descriptor::as_container)
            .expect("container shape");
        let added = joints
            .push(
                field,
                OpaqueBox::new(Joint {
                    name: "shoulder".into(),
                    angle_rad: 0.25,
                }),
            )
            .expect("push");
        assert!(added);
    }

    // 3. Verify through the typed view.
    let rig = instance.as_opaque().downcast_ref::<Rig>().expect("Rig");
    assert_eq!(rig.id, 11);
    assert_eq!(rig.joints.len(), 1);
    assert_eq!(rig.joints[0].name, "shoulder");
}

#[test]
fn test_smart_ptr_roundtrip_matches_direct_access() {
    let mut boxed = Box::new(Joint {
        name: "elbow".into(),
        angle_rad: 1.25,
    });

    let wrapper = descriptor_of::<Box<Joint>>();
    let shape = wrapper.as_smart_ptr().expect("smart ptr shape");
    let pointee = shape.pointee();
    assert!(std::ptr::eq(pointee, descriptor_of::<Joint>()));

    // Reflect through the wrapper.
    let inner = shape
        .deref_mut(OpaqueMut::new(&mut boxed))
        .expect("deref_mut");
    let class = pointee.as_class().expect("class shape");
    let field = class.field_by_name_mut(inner, "angle_rad").expect("field");
    *field.downcast_mut::<f64>().expect("f64") = 2.5;

    // Reflect the unwrapped pointee directly; identical access.
    let direct = class
        .field_by_name(Opaque::new(&*boxed), "angle_rad")
        .expect("field");
    assert_eq!(direct.downcast_ref::<f64>(), Some(&2.5));
}

#[test]
fn test_exactly_one_composite_capability() {
    let leaf = descriptor_of::<i64>();
    let container = descriptor_of::<Vec<i64>>();
    let pointer = descriptor_of::<Box<i64>>();
    let class = descriptor_of::<Joint>();
    let foreign = descriptor_of::<Telemetry>();

    for desc in [leaf, container, pointer, class, foreign] {
        let flags = [
            desc.is_container(),
            desc.is_smart_ptr(),
            desc.is_class(),
            desc.is_foreign(),
        ];
        assert!(flags.iter().filter(|&&f| f).count() <= 1, "{:?}", desc);
    }
    assert!(container.is_container());
    assert!(pointer.is_smart_ptr());
    assert!(class.is_class());
    assert!(foreign.is_foreign());
}

#[test]
fn test_pointer_to_container_is_nested_not_combined() {
    let desc = descriptor_of::<Box<Vec<i32>>>();
    assert!(desc.is_smart_ptr());
    assert!(!desc.is_container());

    let pointee = desc.as_smart_ptr().expect("smart ptr shape").pointee();
    assert!(pointee.is_container());
    assert_eq!(desc.type_name(), "Box<Vec<i32>>");
}

#[test]
fn test_foreign_field_is_opaque_to_the_graph() {
    let rig = Rig {
        telemetry: Telemetry {
            entries: vec![("voltage".into(), 48.0)],
        },
        ..Rig::default()
    };

    let class = descriptor_of::<Rig>().as_class().expect("class shape");
    let field = class
        .field_by_name(Opaque::new(&rig), "telemetry")
        .expect("field");
    let desc = class.descriptor_by_name("telemetry").expect("descriptor");
    assert!(desc.is_foreign());

    // The graph stops here; the native facility takes over.
    let native = field.downcast_ref::<Telemetry>().expect("Telemetry");
    assert_eq!(native.entry_count(), 1);
}

#[test]
fn test_leaf_registration_of_math_type() {
    let desc = descriptor_of::<Mat3>();
    assert_eq!(desc.type_name(), "Mat3");
    assert_eq!(desc.size(), std::mem::size_of::<Mat3>());
    assert!(!desc.is_class());

    // Opaque leaf: values move through whole, never decomposed.
    let class = descriptor_of::<Rig>().as_class().expect("class shape");
    let rig = Rig::default();
    let field = class
        .field_by_name(Opaque::new(&rig), "calibration")
        .expect("field");
    assert_eq!(field.downcast_ref::<Mat3>(), Some(&Mat3::default()));
}

#[test]
fn test_unregistered_fields_stay_invisible() {
    // `root` is not listed in reflect_class!; it must not appear.
    let class = descriptor_of::<Rig>().as_class().expect("class shape");
    assert_eq!(class.field_len(), 6);
    assert!(class.descriptor_by_name("root").is_none());
}
