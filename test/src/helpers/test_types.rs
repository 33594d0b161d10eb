use seer_shared::{TypeDefinition, TypeRegistry, TypeService};

/// Registry with the entity and operation types most tests need already
/// bound: `thing` and `character` entities, the operation classes the router
/// reacts to, and a few `action` descendants.
pub fn standard_types() -> TypeRegistry {
    let mut types = TypeRegistry::new();

    types.define(TypeDefinition::new("root_entity"));
    types.define(TypeDefinition::new("thing").with_parent("root_entity"));
    types.define(
        TypeDefinition::new("character")
            .with_parent("thing")
            .with_property("mass", 60.0),
    );
    types.define(TypeDefinition::new("world").with_parent("thing"));

    types.define(TypeDefinition::new("root_operation"));
    for name in ["sight", "sound", "set", "create", "delete", "talk", "info"] {
        types.define(TypeDefinition::new(name).with_parent("root_operation"));
    }
    types.define(TypeDefinition::new("action").with_parent("root_operation"));
    for name in ["hit", "imaginary", "chop"] {
        types.define(TypeDefinition::new(name).with_parent("action"));
    }

    types.take_bound_types();
    types
}
