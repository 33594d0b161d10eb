use std::{
    collections::{HashMap, HashSet},
    rc::Rc,
};

use log::{debug, warn};

use crate::{
    objects::element::{Element, PropertyMap},
    types::{
        error::TypeError,
        type_info::{TypeInfo, TypeLookup},
        type_service::TypeService,
    },
};

/// A type as described by the server, before it is bound
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDefinition {
    pub name: String,
    pub parent: Option<String>,
    pub properties: PropertyMap,
}

impl TypeDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            properties: PropertyMap::new(),
        }
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<Element>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }
}

/// In-memory [`TypeService`]. A definition binds as soon as its parent is
/// bound. Definitions whose parent is still missing wait for it, and the
/// missing parent name is queued as a request for the server.
pub struct TypeRegistry {
    bound: HashMap<String, Rc<TypeInfo>>,
    // parent name -> definitions waiting for it
    waiting_on_parent: HashMap<String, Vec<TypeDefinition>>,
    // waiting definition name -> its parent name
    waiting_parents: HashMap<String, String>,
    requested: HashSet<String>,
    outgoing_requests: Vec<String>,
    failed: HashSet<String>,
    newly_bound: Vec<String>,
    newly_failed: Vec<String>,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self {
            bound: HashMap::new(),
            waiting_on_parent: HashMap::new(),
            waiting_parents: HashMap::new(),
            requested: HashSet::new(),
            outgoing_requests: Vec::new(),
            failed: HashSet::new(),
            newly_bound: Vec::new(),
            newly_failed: Vec::new(),
        }
    }

    pub fn is_bound(&self, name: &str) -> bool {
        self.bound.contains_key(name)
    }

    pub fn is_failed(&self, name: &str) -> bool {
        self.failed.contains(name)
    }

    pub fn try_get(&self, name: &str) -> Result<Rc<TypeInfo>, TypeError> {
        self.bound
            .get(name)
            .cloned()
            .ok_or_else(|| TypeError::UnknownType {
                name: name.to_string(),
            })
    }

    /// Adds a type definition, binding it (and any definitions waiting on
    /// it) when its parent is already bound.
    pub fn try_define(&mut self, definition: TypeDefinition) -> Result<(), TypeError> {
        let name = definition.name.clone();
        if self.bound.contains_key(&name) || self.waiting_parents.contains_key(&name) {
            return Err(TypeError::AlreadyDefined { name });
        }

        let Some(parent) = definition.parent.clone() else {
            self.bind(definition);
            return Ok(());
        };

        if self.creates_cycle(&name, &parent) {
            return Err(TypeError::CyclicParent { name });
        }

        if self.bound.contains_key(&parent) {
            self.bind(definition);
            return Ok(());
        }

        if self.failed.contains(&parent) {
            self.fail(&name);
            return Ok(());
        }

        debug!("Type '{}' waits for parent '{}'", name, parent);
        if !self.waiting_parents.contains_key(&parent) {
            self.request(&parent);
        }
        self.waiting_parents.insert(name, parent.clone());
        self.waiting_on_parent
            .entry(parent)
            .or_default()
            .push(definition);
        Ok(())
    }

    /// Adds a type definition, logging a rejected one
    pub fn define(&mut self, definition: TypeDefinition) {
        if let Err(err) = self.try_define(definition) {
            warn!("Rejected type definition: {}", err);
        }
    }

    /// Records that the server does not know `name`. Definitions waiting on
    /// it fail along with it.
    pub fn try_mark_failed(&mut self, name: &str) -> Result<(), TypeError> {
        if self.bound.contains_key(name) {
            return Err(TypeError::AlreadyDefined {
                name: name.to_string(),
            });
        }
        self.fail(name);
        Ok(())
    }

    /// Names that have been looked up but are neither bound nor defined
    pub fn take_type_requests(&mut self) -> Vec<String> {
        std::mem::take(&mut self.outgoing_requests)
    }

    fn creates_cycle(&self, name: &str, parent: &str) -> bool {
        let mut current = parent;
        loop {
            if current == name {
                return true;
            }
            match self.waiting_parents.get(current) {
                Some(next) => current = next,
                None => return false,
            }
        }
    }

    fn request(&mut self, name: &str) {
        if self.requested.insert(name.to_string()) {
            self.outgoing_requests.push(name.to_string());
        }
    }

    fn bind(&mut self, definition: TypeDefinition) {
        let parent = definition
            .parent
            .as_ref()
            .and_then(|parent| self.bound.get(parent).cloned());
        let name = definition.name;
        let info = Rc::new(TypeInfo::new(name.clone(), parent, definition.properties));

        debug!("Type '{}' bound", name);
        self.requested.remove(&name);
        self.bound.insert(name.clone(), info);
        self.newly_bound.push(name.clone());

        if let Some(children) = self.waiting_on_parent.remove(&name) {
            for child in children {
                self.waiting_parents.remove(&child.name);
                self.bind(child);
            }
        }
    }

    fn fail(&mut self, name: &str) {
        if !self.failed.insert(name.to_string()) {
            return;
        }
        warn!("Type '{}' failed to bind", name);
        self.requested.remove(name);
        self.waiting_parents.remove(name);
        self.newly_failed.push(name.to_string());

        if let Some(children) = self.waiting_on_parent.remove(name) {
            for child in children {
                self.fail(&child.name);
            }
        }
    }
}

impl TypeService for TypeRegistry {
    fn type_by_name(&mut self, name: &str) -> TypeLookup {
        if let Some(info) = self.bound.get(name) {
            return TypeLookup::Bound(info.clone());
        }
        if !self.waiting_parents.contains_key(name) && !self.failed.contains(name) {
            self.request(name);
        }
        TypeLookup::Unbound(name.to_string())
    }

    fn take_bound_types(&mut self) -> Vec<String> {
        std::mem::take(&mut self.newly_bound)
    }

    fn take_failed_types(&mut self) -> Vec<String> {
        std::mem::take(&mut self.newly_failed)
    }

    fn is_failed(&self, name: &str) -> bool {
        TypeRegistry::is_failed(self, name)
    }
}
