#![allow(dead_code)]
use activator_rs::{
    types::{ConstructorDescription, PrimitiveKind, TypeDescription, TypeRegistry},
    value::{ObjectRef, Value},
};

/// A small object model shared by the integration tests.
pub struct Garage {
    pub registry: TypeRegistry,
    pub engine_interface: TypeDescription,
    pub engine_base: TypeDescription,
    pub engine: TypeDescription,
    pub wheel_interface: TypeDescription,
    pub wheel: TypeDescription,
    pub car: TypeDescription,
    pub style: TypeDescription,
}

impl Garage {
    pub fn new() -> Self {
        let mut registry = TypeRegistry::new();
        let int = registry.primitive(PrimitiveKind::Int32);
        let string = registry.primitive(PrimitiveKind::String);

        let engine_interface = registry.interface("Demo.IEngine").build();
        let engine_base = registry
            .abstract_class("Demo.EngineBase")
            .implements(engine_interface)
            .build();
        let engine = registry
            .class("Demo.Engine")
            .extends(engine_base)
            .constructor(ConstructorDescription::new())
            .field("Power", int)
            .build();

        let wheel_interface = registry.interface("Demo.IWheel").build();
        let wheel = registry
            .class("Demo.Wheel")
            .implements(wheel_interface)
            .constructor(ConstructorDescription::new())
            .build();

        let style = registry.enumeration(
            "Demo.Style",
            true,
            [("None", 0), ("Sport", 1), ("Luxury", 2), ("Electric", 4)],
        );

        let car = registry
            .class("Demo.Car")
            .constructor(ConstructorDescription::new().param("engine", engine_interface))
            .constructor(
                ConstructorDescription::new()
                    .param("engine", engine_interface)
                    .param("wheel", wheel_interface),
            )
            .field("Name", string)
            .field("Style", style)
            .readonly_field("Serial", int)
            .build();

        Self {
            registry,
            engine_interface,
            engine_base,
            engine,
            wheel_interface,
            wheel,
            car,
            style,
        }
    }

    pub fn engine_with_power(&self, power: i32) -> ObjectRef {
        let engine = ObjectRef::new(self.engine);
        engine
            .set_field("Power", Value::Int32(power))
            .expect("Power is writable");
        engine
    }

    pub fn wheel(&self) -> ObjectRef {
        ObjectRef::new(self.wheel)
    }
}
