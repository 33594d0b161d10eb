use crate::objects::element::{Element, PropertyMap};

/// Attribute names carried by entity data outside of the free-form
/// attribute map.
pub const RESERVED_ATTRIBUTES: [&str; 5] = ["id", "parent", "loc", "contents", "stamp"];

/// State of one entity as carried by the object protocol. Every field other
/// than `id` is optional, a partial update leaves unspecified fields untouched.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EntityData {
    /// Entity id, empty when unset
    pub id: String,
    /// Name of the entity's type
    pub parent: Option<String>,
    /// Id of the containing entity
    pub loc: Option<String>,
    /// Ids of contained entities
    pub contents: Option<Vec<String>>,
    /// Server modification time in seconds
    pub stamp: Option<f64>,
    pub attributes: PropertyMap,
}

impl EntityData {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn with_parent(mut self, type_name: impl Into<String>) -> Self {
        self.parent = Some(type_name.into());
        self
    }

    pub fn with_loc(mut self, location_id: impl Into<String>) -> Self {
        self.loc = Some(location_id.into());
        self
    }

    pub fn with_contents<I, S>(mut self, contents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.contents = Some(contents.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_stamp(mut self, stamp: f64) -> Self {
        self.stamp = Some(stamp);
        self
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<Element>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn has_id(&self) -> bool {
        !self.id.is_empty()
    }

    pub fn has_parent(&self) -> bool {
        self.parent.is_some()
    }

    /// True when the data carries no location, which marks the top-level entity
    pub fn is_default_loc(&self) -> bool {
        self.loc.is_none()
    }

    pub fn attr(&self, name: &str) -> Option<&Element> {
        self.attributes.get(name)
    }
}
