//! Shared fixtures and end-to-end scenarios.

pub(crate) mod fixtures {
    use alloc::collections::BTreeMap;
    use alloc::string::String;
    use alloc::sync::Arc;
    use alloc::vec;
    use alloc::vec::Vec;
    use std::collections::HashMap;
    use std::sync::{Mutex, PoisonError};

    use crate::registry::EventHandler;
    use crate::{AnyValue, Object, TypeRegistry, Typed, impl_typed};

    // -------------------------------------------------------------------------
    // Point

    #[derive(Default, Debug, Clone, PartialEq)]
    pub struct Point {
        pub x: i32,
        pub y: i32,
    }

    impl_typed!(Point, "{5B6C1B6A-6F4A-4BB2-A0B4-6F2C1A1D3E01}");

    /// Version 2 calls the second field `yCoord`.
    pub fn register_point(registry: &mut TypeRegistry, version: u32) {
        let builder = registry
            .class::<Point>()
            .version(version, None)
            .field("x", |p| &p.x, |p| &mut p.x);
        let builder = if version >= 2 {
            builder
                .field("yCoord", |p| &p.y, |p| &mut p.y)
                .name_change(1, 2, "y", "yCoord")
        } else {
            builder.field("y", |p| &p.y, |p| &mut p.y)
        };
        builder.register().unwrap();
    }

    // -------------------------------------------------------------------------
    // A <- B <- C

    #[derive(Default, Debug, Clone, PartialEq)]
    pub struct A {
        pub id: u32,
    }

    #[derive(Default, Debug, Clone, PartialEq)]
    pub struct B {
        pub a: A,
        pub weight: f32,
    }

    #[derive(Default, Debug, Clone, PartialEq)]
    pub struct C {
        pub b: B,
        pub label: String,
    }

    impl_typed!(A, "{1D9E8A34-2C71-4E0B-9F5D-3A6B7C8D9E01}");
    impl_typed!(B, "{1D9E8A34-2C71-4E0B-9F5D-3A6B7C8D9E02}");
    impl_typed!(C, "{1D9E8A34-2C71-4E0B-9F5D-3A6B7C8D9E03}");

    pub fn register_abc(registry: &mut TypeRegistry) {
        registry
            .class::<A>()
            .field("id", |a| &a.id, |a| &mut a.id)
            .register()
            .unwrap();
        registry
            .class::<B>()
            .base_class(|b| &b.a, |b| &mut b.a)
            .field("weight", |b| &b.weight, |b| &mut b.weight)
            .register()
            .unwrap();
        registry
            .class::<C>()
            .base_class(|c| &c.b, |c| &mut c.b)
            .field("label", |c| &c.label, |c| &mut c.label)
            .register()
            .unwrap();
    }

    // -------------------------------------------------------------------------
    // Mode

    #[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
    #[repr(u8)]
    pub enum Mode {
        #[default]
        Idle = 0,
        Walk = 1,
        Jump = 2,
    }

    impl_typed!(Mode, "{8E3F0B1C-4A5D-4C6E-8F70-91A2B3C4D5E6}");

    impl Mode {
        pub fn from_u8(value: u8) -> Option<Self> {
            match value {
                0 => Some(Self::Idle),
                1 => Some(Self::Walk),
                2 => Some(Self::Jump),
                _ => None,
            }
        }
    }

    // -------------------------------------------------------------------------
    // Holder

    /// A pointer declared as [`A`] and a type-erased value.
    #[derive(Default)]
    pub struct Holder {
        pub target: Option<alloc::boxed::Box<dyn Object>>,
        pub value: AnyValue,
    }

    impl_typed!(Holder, "{C0A1B2C3-D4E5-4F60-8718-293A4B5C6D7E}");

    pub fn register_holder(registry: &mut TypeRegistry) {
        registry
            .class::<Holder>()
            .pointer_field("target", A::type_uuid(), |h| &h.target, |h| &mut h.target)
            .field("value", |h| &h.value, |h| &mut h.value)
            .register()
            .unwrap();
    }

    // -------------------------------------------------------------------------
    // Inventory

    #[derive(Default, Debug, Clone, PartialEq)]
    pub struct Inventory {
        pub slots: Vec<u32>,
        pub names: Vec<String>,
        pub spare: Option<u32>,
        pub grid: [i16; 3],
        pub scores: BTreeMap<String, u32>,
        pub lookup: HashMap<u32, bool>,
    }

    impl_typed!(Inventory, "{3F2E1D0C-B9A8-4765-8432-10FEDCBA9876}");

    pub fn register_inventory(registry: &mut TypeRegistry) {
        registry
            .class::<Inventory>()
            .container_field("slots", |i| &i.slots, |i| &mut i.slots)
            .container_field("names", |i| &i.names, |i| &mut i.names)
            .container_field("spare", |i| &i.spare, |i| &mut i.spare)
            .container_field("grid", |i| &i.grid, |i| &mut i.grid)
            .container_field("scores", |i| &i.scores, |i| &mut i.scores)
            .container_field("lookup", |i| &i.lookup, |i| &mut i.lookup)
            .register()
            .unwrap();
    }

    pub fn sample_inventory() -> Inventory {
        Inventory {
            slots: vec![4, 8, 15],
            names: vec![String::from("sword"), String::from("shield")],
            spare: Some(16),
            grid: [1, -2, 3],
            scores: BTreeMap::from([(String::from("alice"), 10), (String::from("bob"), 7)]),
            lookup: HashMap::from([(1, true), (2, false)]),
        }
    }

    // -------------------------------------------------------------------------
    // Tracked

    #[derive(Default, Debug)]
    pub struct Tracked {
        pub count: u32,
    }

    impl_typed!(Tracked, "{9A8B7C6D-5E4F-4A3B-8C2D-1E0F9A8B7C6D}");

    /// Records the hooks of every `Tracked` instance.
    #[derive(Default)]
    pub struct Recorder(Mutex<Vec<&'static str>>);

    impl Recorder {
        pub fn take(&self) -> Vec<&'static str> {
            core::mem::take(&mut *self.0.lock().unwrap_or_else(PoisonError::into_inner))
        }

        fn record(&self, event: &'static str) {
            self.0.lock().unwrap_or_else(PoisonError::into_inner).push(event);
        }
    }

    impl EventHandler for Recorder {
        fn on_read_begin(&self, _: &dyn Object) {
            self.record("read_begin");
        }

        fn on_read_end(&self, _: &dyn Object) {
            self.record("read_end");
        }

        fn on_write_begin(&self, _: &mut dyn Object) {
            self.record("write_begin");
        }

        fn on_write_end(&self, _: &mut dyn Object) {
            self.record("write_end");
        }

        fn on_object_cloned(&self, _: &mut dyn Object) {
            self.record("cloned");
        }
    }

    pub fn register_tracked(registry: &mut TypeRegistry) -> Arc<Recorder> {
        let recorder = Arc::new(Recorder::default());
        registry
            .class::<Tracked>()
            .field("count", |t| &t.count, |t| &mut t.count)
            .event_handler(recorder.clone())
            .register()
            .unwrap();
        recorder
    }
}

// -----------------------------------------------------------------------------
// Scenarios

use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

use fixtures::{A, Inventory, Point};

use crate::document::{HEADER_LEN, LoadOptions, NODE_FIXED_LEN, SaveOptions, TextDocument};
use crate::serializer::DataSerializer;
use crate::{DocumentNode, ErrorHandler, Object, TypeRegistry, Typed};

#[test]
fn point_survives_a_field_rename() {
    let mut v1 = TypeRegistry::new();
    fixtures::register_point(&mut v1, 1);
    let mut errors = ErrorHandler::new();

    let bytes = v1
        .save_object(&Point { x: 3, y: 4 }, &SaveOptions::default(), &mut errors)
        .unwrap();
    assert_eq!(bytes.len(), HEADER_LEN + 3 * NODE_FIXED_LEN + "Point".len() + 2 * (1 + 4));

    let loaded = v1.load_object(&bytes, &LoadOptions::default(), &mut errors).unwrap();
    assert_eq!(loaded.downcast_ref::<Point>(), Some(&Point { x: 3, y: 4 }));

    let mut v2 = TypeRegistry::new();
    fixtures::register_point(&mut v2, 2);
    let loaded = v2.load_object(&bytes, &LoadOptions::default(), &mut errors).unwrap();
    assert_eq!(loaded.downcast_ref::<Point>().unwrap().y, 4);
    assert!(!errors.has_errors());
}

#[test]
fn text_documents_upgrade_too() {
    let mut v1 = TypeRegistry::new();
    fixtures::register_point(&mut v1, 1);
    let mut errors = ErrorHandler::new();

    let node = DocumentNode::from_object(&v1, &Point { x: 3, y: 4 }, &mut errors).unwrap();
    let json = serde_json::to_string(&TextDocument::new(&node, &v1)).unwrap();
    assert!(json.contains("\"name\":\"y\""));

    let mut v2 = TypeRegistry::new();
    fixtures::register_point(&mut v2, 2);
    let parsed: DocumentNode = serde_json::from_str(&json).unwrap();
    let loaded = v2.load_document(parsed, &LoadOptions::default(), &mut errors).unwrap();
    assert_eq!(loaded.downcast_ref::<Point>(), Some(&Point { x: 3, y: 4 }));
}

fn text_round_trip<T: Typed>(registry: &TypeRegistry, value: T, blank: impl Fn() -> T) {
    let serializer = registry.class_data(T::type_uuid()).unwrap().serializer().unwrap();

    for big_endian in [false, true] {
        let mut data = Vec::new();
        serializer.save(&value, &mut data, big_endian).unwrap();

        let mut text = String::new();
        serializer.data_to_text(&data, &mut text, big_endian).unwrap();
        let mut back = Vec::new();
        serializer
            .text_to_data(&text, serializer.text_version(), &mut back, big_endian)
            .unwrap();

        let mut loaded = blank();
        serializer.load(&mut loaded, &back, 0, big_endian).unwrap();
        assert!(
            serializer.compare_equal(&value, &loaded),
            "{} via {text:?}",
            T::type_name()
        );
    }
}

#[test]
fn text_and_binary_payloads_are_equivalent() {
    let registry = TypeRegistry::new();
    text_round_trip(&registry, true, || false);
    text_round_trip(&registry, -5_i8, || 0);
    text_round_trip(&registry, -300_i16, || 0);
    text_round_trip(&registry, i32::MIN, || 0);
    text_round_trip(&registry, i64::MAX, || 0);
    text_round_trip(&registry, 200_u8, || 0);
    text_round_trip(&registry, u16::MAX, || 0);
    text_round_trip(&registry, 7_u32, || 0);
    text_round_trip(&registry, u64::MAX, || 0);
    text_round_trip(&registry, 0.1_f32, || 0.0);
    text_round_trip(&registry, -2.5e10_f64, || 0.0);
    text_round_trip(&registry, String::from("héllo, world"), String::new);
}

#[test]
fn saved_documents_compare_equal_to_the_source() {
    let mut registry = TypeRegistry::new();
    fixtures::register_inventory(&mut registry);
    let mut errors = ErrorHandler::new();

    let inventory = fixtures::sample_inventory();
    let bytes = registry
        .save_object(&inventory, &SaveOptions { big_endian: true }, &mut errors)
        .unwrap();
    let loaded = registry.load_object(&bytes, &LoadOptions::default(), &mut errors).unwrap();
    assert!(registry.compare_objects(&inventory, &*loaded, &mut errors));

    let clone = registry.clone_object(&*loaded, &mut errors).unwrap();
    assert_eq!(clone.downcast_ref::<Inventory>(), Some(&inventory));
}

#[test]
fn elements_found_by_persistent_id() {
    let mut registry = TypeRegistry::new();
    registry
        .class::<A>()
        .field("id", |a| &a.id, |a| &mut a.id)
        .persistent_id(|a| Some(u64::from(a.id)))
        .register()
        .unwrap();
    let info = registry.register_generic::<Vec<A>>();
    let adapter = info.class().container().unwrap();
    let element = registry.class_data(A::type_uuid()).unwrap();

    let list = alloc::vec![A { id: 10 }, A { id: 12 }, A { id: 14 }];
    let object: &dyn Object = &list;
    assert_eq!(crate::container::position_by_persistent_id(&**adapter, element, object, 12), Some(1));
    assert_eq!(crate::container::position_by_persistent_id(&**adapter, element, object, 11), None);
}

#[test]
fn cloned_arrays_do_not_alias() {
    #[derive(Default, Debug)]
    struct Samples {
        values: Vec<i32>,
    }

    crate::impl_typed!(Samples, "{4E5D6C7B-8A99-4A0B-9C1D-2E3F4A5B6C7D}");

    let mut registry = TypeRegistry::new();
    registry
        .class::<Samples>()
        .container_field("values", |s| &s.values, |s| &mut s.values)
        .register()
        .unwrap();
    let adapter = registry
        .class_data(<Vec<i32>>::type_uuid())
        .and_then(|class| class.container())
        .unwrap()
        .clone();

    let mut original = Samples::default();
    for value in [5, 6, 7] {
        let mut element = adapter.reserve_element(&mut original.values).unwrap();
        *element.downcast_mut::<i32>().unwrap() = value;
        adapter.store_element(&mut original.values, element).unwrap();
    }
    assert_eq!(adapter.size(&original.values), 3);

    let mut errors = ErrorHandler::new();
    let mut copy = registry.clone_value(&original, &mut errors).unwrap();
    *adapter
        .element_by_index_mut(&mut copy.values, 0)
        .unwrap()
        .downcast_mut::<i32>()
        .unwrap() = 99;

    assert_eq!(copy.values, [99, 6, 7]);
    assert_eq!(original.values, [5, 6, 7]);
}

#[test]
fn nested_containers_round_trip() {
    use std::collections::HashMap;

    #[derive(Default, Debug, Clone, PartialEq)]
    struct Grid {
        rows: Vec<Vec<u32>>,
        buckets: HashMap<u32, Vec<u32>>,
    }

    crate::impl_typed!(Grid, "{6A7B8C9D-0E1F-4A2B-8C3D-4E5F6A7B8C9D}");

    let mut registry = TypeRegistry::new();
    registry
        .class::<Grid>()
        .container_field("rows", |g| &g.rows, |g| &mut g.rows)
        .container_field("buckets", |g| &g.buckets, |g| &mut g.buckets)
        .register()
        .unwrap();
    assert!(registry.generic_info(<Vec<u32>>::type_uuid()).is_some());

    let grid = Grid {
        rows: vec![vec![1, 2], vec![3]],
        buckets: HashMap::from([(7, vec![70, 71]), (8, Vec::new())]),
    };
    let mut errors = ErrorHandler::new();

    let bytes = registry
        .save_object(&grid, &SaveOptions::default(), &mut errors)
        .unwrap();
    let loaded = registry.load_object(&bytes, &LoadOptions::default(), &mut errors).unwrap();
    assert_eq!(loaded.downcast_ref::<Grid>(), Some(&grid));

    let mut copy = registry.clone_value(&grid, &mut errors).unwrap();
    assert_eq!(copy, grid);
    copy.rows[0].push(9);
    assert_eq!(grid.rows[0], [1, 2]);
    assert!(!errors.has_errors());
}
