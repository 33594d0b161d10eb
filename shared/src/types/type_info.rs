use std::rc::Rc;

use crate::objects::element::{Element, PropertyMap};

/// Bound metadata for one entity or operation type. Types form a single
/// inheritance chain, and default property values are looked up along it.
#[derive(Debug)]
pub struct TypeInfo {
    name: String,
    parent: Option<Rc<TypeInfo>>,
    properties: PropertyMap,
}

impl TypeInfo {
    pub fn new(name: impl Into<String>, parent: Option<Rc<TypeInfo>>, properties: PropertyMap) -> Self {
        Self {
            name: name.into(),
            parent,
            properties,
        }
    }

    /// A type with no parent and no default properties
    pub fn root(name: impl Into<String>) -> Self {
        Self::new(name, None, PropertyMap::new())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<&Rc<TypeInfo>> {
        self.parent.as_ref()
    }

    /// Default properties declared by this type itself, excluding ancestors
    pub fn own_properties(&self) -> &PropertyMap {
        &self.properties
    }

    /// Walks this type followed by each ancestor, nearest first
    pub fn ancestors(&self) -> Ancestors<'_> {
        Ancestors { next: Some(self) }
    }

    pub fn is_a(&self, name: &str) -> bool {
        self.ancestors().any(|ty| ty.name == name)
    }

    /// Default value of a property, taken from the nearest type declaring it
    pub fn property(&self, name: &str) -> Option<&Element> {
        self.ancestors().find_map(|ty| ty.properties.get(name))
    }

    /// All default properties along the chain, nearer types overriding
    /// their ancestors
    pub fn merged_properties(&self) -> PropertyMap {
        let chain: Vec<&TypeInfo> = self.ancestors().collect();
        let mut merged = PropertyMap::new();
        for ty in chain.into_iter().rev() {
            for (name, value) in &ty.properties {
                merged.insert(name.clone(), value.clone());
            }
        }
        merged
    }
}

pub struct Ancestors<'a> {
    next: Option<&'a TypeInfo>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = &'a TypeInfo;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.parent.as_deref();
        Some(current)
    }
}

/// Result of resolving a type name
#[derive(Debug, Clone)]
pub enum TypeLookup {
    Bound(Rc<TypeInfo>),
    /// Known by name only, binding is still in flight
    Unbound(String),
}

impl TypeLookup {
    pub fn is_bound(&self) -> bool {
        matches!(self, TypeLookup::Bound(_))
    }

    pub fn name(&self) -> &str {
        match self {
            TypeLookup::Bound(info) => info.name(),
            TypeLookup::Unbound(name) => name,
        }
    }

    pub fn bound(self) -> Option<Rc<TypeInfo>> {
        match self {
            TypeLookup::Bound(info) => Some(info),
            TypeLookup::Unbound(_) => None,
        }
    }
}
