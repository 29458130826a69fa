mod common;

use activator_rs::{
    error::{ResolutionError, SelectionError},
    resolve::{select_constructor, EmptyResolver, InstancePoolResolver, InstanceResolver, Resolver},
    types::{ConstructorDescription, TypeDescription, TypeRegistry},
    value::{ObjectRef, Value},
};
use common::Garage;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

fn same_constructor(a: &ConstructorDescription, b: &ConstructorDescription) -> bool {
    std::ptr::eq(a, b)
}

#[test]
fn single_resolvable_constructor_is_selected() {
    let mut reg = TypeRegistry::new();
    let foo = reg.interface("Demo.IFoo").build();
    let bar = reg.interface("Demo.IBar").build();
    let foo_impl = reg.class("Demo.Foo").implements(foo).build();
    let bar_impl = reg.class("Demo.Bar").implements(bar).build();
    let ty = reg
        .class("Demo.Service")
        .constructor(ConstructorDescription::new().param("foo", foo).param("bar", bar))
        .build();

    let pool = InstancePoolResolver::new([ObjectRef::new(foo_impl), ObjectRef::new(bar_impl)]);
    let selected = select_constructor(ty, &pool).unwrap();
    assert!(same_constructor(selected, &ty.constructors()[0]));
}

#[test]
fn equal_counts_without_optionals_are_ambiguous() {
    let mut reg = TypeRegistry::new();
    let foo = reg.interface("Demo.IFoo").build();
    let bar = reg.interface("Demo.IBar").build();
    let both = reg.class("Demo.FooBar").implements(foo).implements(bar).build();
    let ty = reg
        .class("Demo.Service")
        .constructor(ConstructorDescription::new().param("foo", foo))
        .constructor(ConstructorDescription::new().param("bar", bar))
        .build();

    let pool = InstancePoolResolver::new([ObjectRef::new(both)]);
    assert_eq!(
        select_constructor(ty, &pool).unwrap_err(),
        SelectionError::Ambiguous { candidates: 2 }
    );
    assert!(!pool.can_resolve(ty));
    assert!(pool.resolve(ty).is_none());
    assert!(matches!(
        pool.require(ty),
        Err(ResolutionError::Ambiguous { candidates: 2, .. })
    ));
}

#[test]
fn more_resolvable_parameters_score_higher() {
    let mut reg = TypeRegistry::new();
    let foo = reg.interface("Demo.IFoo").build();
    let bar = reg.interface("Demo.IBar").build();
    let foo_impl = reg.class("Demo.Foo").implements(foo).build();
    let bar_impl = reg.class("Demo.Bar").implements(bar).build();
    let ty = reg
        .class("Demo.Service")
        .constructor(ConstructorDescription::new().param("foo", foo))
        .constructor(ConstructorDescription::new().param("foo", foo).param("bar", bar))
        .build();

    let pool = InstancePoolResolver::new([ObjectRef::new(foo_impl), ObjectRef::new(bar_impl)]);
    let selected = select_constructor(ty, &pool).unwrap();
    assert!(same_constructor(selected, &ty.constructors()[1]));
}

#[test]
fn optional_parameters_use_defaults_when_unresolvable() {
    let mut reg = TypeRegistry::new();
    let foo = reg.interface("Demo.IFoo").build();
    let bar = reg.interface("Demo.IBar").build();
    let foo_impl = reg.class("Demo.Foo").implements(foo).build();
    let bar_impl = reg.class("Demo.Bar").implements(bar).build();
    let ty = reg
        .class("Demo.Service")
        .constructor(
            ConstructorDescription::new()
                .param("foo", foo)
                .optional("bar", bar, Value::Null),
        )
        .build();

    let foo_instance = ObjectRef::new(foo_impl);
    let pool = InstancePoolResolver::new([foo_instance.clone()]);
    let service = pool.resolve(ty).unwrap();
    assert_eq!(service.field("foo"), Some(Value::Object(foo_instance.clone())));
    assert_eq!(service.field("bar"), Some(Value::Null));

    let bar_instance = ObjectRef::new(bar_impl);
    let pool = InstancePoolResolver::new([foo_instance, bar_instance.clone()]);
    let service = pool.resolve(ty).unwrap();
    let Some(Value::Object(bar)) = service.field("bar") else {
        panic!("bar was not resolved");
    };
    assert!(ObjectRef::ptr_eq(&bar, &bar_instance));
}

#[test]
fn pool_indexes_every_satisfied_type_but_object() {
    let garage = Garage::new();
    let engine = garage.engine_with_power(90);
    let pool = InstancePoolResolver::new([engine.clone()]);

    for ty in [garage.engine, garage.engine_base, garage.engine_interface] {
        assert!(pool.can_resolve(ty), "{ty} should be resolvable");
        assert!(ObjectRef::ptr_eq(&pool.resolve(ty).unwrap(), &engine));
        assert_eq!(pool.resolved_type(ty), Some(garage.engine));
    }
    assert!(!pool.can_resolve(garage.registry.object()));
    assert!(pool.resolve(garage.registry.object()).is_none());
}

#[test]
fn first_registered_instance_keeps_the_slot() {
    let garage = Garage::new();
    let first = garage.engine_with_power(1);
    let second = garage.engine_with_power(2);
    let pool = InstancePoolResolver::new([first.clone(), second]);
    assert!(ObjectRef::ptr_eq(
        &pool.resolve(garage.engine_interface).unwrap(),
        &first
    ));
}

#[test]
fn pool_builds_types_from_its_instances() {
    let garage = Garage::new();
    let engine = garage.engine_with_power(120);
    let pool = InstancePoolResolver::new([engine.clone()]);

    assert!(pool.can_resolve(garage.car));
    let car = pool.resolve(garage.car).unwrap();
    assert_eq!(car.ty(), garage.car);
    assert_eq!(car.field("engine"), Some(Value::Object(engine.clone())));
    assert!(!ObjectRef::ptr_eq(&car, &pool.resolve(garage.car).unwrap()));

    // Interfaces are never built from nothing, so without a wheel instance
    // only the one-parameter constructor is usable.
    assert_eq!(car.field("wheel"), None);

    let pool = InstancePoolResolver::new([engine, garage.wheel()]);
    let wheeled = pool.resolve(garage.car).unwrap();
    assert_eq!(wheeled.field("wheel").map(|v| v.is_null()), Some(false));
}

#[test]
fn unresolvable_types_report_errors_only_on_require() {
    let garage = Garage::new();
    let pool = InstancePoolResolver::new([]);
    assert!(!pool.can_resolve(garage.car));
    assert!(pool.resolve(garage.car).is_none());
    assert_eq!(
        pool.require(garage.car).unwrap_err(),
        ResolutionError::Unresolvable("Demo.Car".into())
    );
    assert_eq!(pool.stats().failures, 2);
}

#[test]
fn merged_resolver_prefers_primary() {
    let garage = Garage::new();
    let primary_engine = garage.engine_with_power(1);
    let secondary_engine = garage.engine_with_power(2);
    let wheel = garage.wheel();

    let primary = Arc::new(InstancePoolResolver::new([primary_engine.clone()]));
    let secondary = InstancePoolResolver::new([secondary_engine, wheel.clone()]);
    let merged = primary.merge_with(secondary);

    assert!(merged.can_resolve(garage.engine_interface));
    assert!(merged.can_resolve(garage.wheel_interface));
    assert!(ObjectRef::ptr_eq(
        &merged.resolve(garage.engine_interface).unwrap(),
        &primary_engine
    ));
    assert!(ObjectRef::ptr_eq(
        &merged.resolve(garage.wheel_interface).unwrap(),
        &wheel
    ));
    assert!(!merged.can_resolve(garage.registry.object()));
    assert!(matches!(
        merged.require(garage.registry.object()),
        Err(ResolutionError::Unresolvable(_))
    ));
}

#[test]
fn merging_with_empty_changes_nothing() {
    let garage = Garage::new();
    let engine = garage.engine_with_power(3);
    let merged =
        Resolver::from(InstancePoolResolver::new([engine.clone()])).merge_with(EmptyResolver);
    assert!(ObjectRef::ptr_eq(
        &merged.resolve(garage.engine).unwrap(),
        &engine
    ));
    assert!(!merged.can_resolve(garage.wheel_interface));
}

struct CountingResolver {
    ty: TypeDescription,
    calls: AtomicUsize,
}

impl InstanceResolver for CountingResolver {
    fn can_resolve(&self, ty: TypeDescription) -> bool {
        ty == self.ty
    }

    fn resolve(&self, ty: TypeDescription) -> Option<ObjectRef> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        (ty == self.ty).then(|| ObjectRef::new(ty))
    }
}

#[test]
fn caller_resolvers_take_part_in_merges() {
    let garage = Garage::new();
    let counting = Arc::new(CountingResolver {
        ty: garage.wheel_interface,
        calls: AtomicUsize::new(0),
    });
    let merged = Resolver::from(InstancePoolResolver::new([garage.engine_with_power(5)]))
        .merge_with(Resolver::Dynamic(counting.clone()));

    assert!(merged.can_resolve(garage.wheel_interface));
    assert!(merged.resolve(garage.engine_interface).is_some());
    assert_eq!(counting.calls.load(Ordering::Relaxed), 0);
    assert!(merged.resolve(garage.wheel_interface).is_some());
    assert_eq!(counting.calls.load(Ordering::Relaxed), 1);
}

#[test]
fn concurrent_lookups_share_one_factory() {
    let garage = Garage::new();
    let engine = garage.engine_with_power(7);
    let pool = InstancePoolResolver::new([engine.clone()]);

    std::thread::scope(|s| {
        for _ in 0..8 {
            s.spawn(|| {
                for _ in 0..50 {
                    let car = pool.resolve(garage.car).expect("car is buildable");
                    assert_eq!(car.field("engine"), Some(Value::Object(engine.clone())));
                }
            });
        }
    });

    let stats = pool.stats();
    assert_eq!(stats.factories, 1);
    assert_eq!(stats.failures, 1);
    assert!(stats.hits > 0);
}

#[test]
fn selection_ignores_capability_for_abstract_types() {
    let garage = Garage::new();
    let pool = InstancePoolResolver::new([]);
    assert_eq!(
        select_constructor(garage.engine_base, &pool).unwrap_err(),
        SelectionError::NotInstantiable
    );
}
