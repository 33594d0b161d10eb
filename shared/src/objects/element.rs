use std::collections::BTreeMap;

use thiserror::Error;

/// Ordered property map, keyed by attribute name
pub type PropertyMap = BTreeMap<String, Element>;

/// Errors that can occur while reading a typed value out of an [`Element`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ElementError {
    /// The element holds a different kind of value than the one requested
    #[error("Element type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        expected: &'static str,
        actual: &'static str,
    },

    /// A numeric list had the wrong number of components
    #[error("Element list has {actual} components, expected {expected}")]
    WrongLength { expected: usize, actual: usize },
}

/// A dynamically-typed attribute value of the object protocol
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Element {
    #[default]
    None,
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<Element>),
    Map(PropertyMap),
}

impl Element {
    pub fn type_name(&self) -> &'static str {
        match self {
            Element::None => "none",
            Element::Int(_) => "int",
            Element::Float(_) => "float",
            Element::String(_) => "string",
            Element::List(_) => "list",
            Element::Map(_) => "map",
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Element::None)
    }

    /// True for both integer and float values
    pub fn is_num(&self) -> bool {
        matches!(self, Element::Int(_) | Element::Float(_))
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Element::Int(value) => Some(*value),
            _ => None,
        }
    }

    /// Reads a number, promoting integers to floats
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Element::Int(value) => Some(*value as f64),
            Element::Float(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Element::String(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Element]> {
        match self {
            Element::List(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&PropertyMap> {
        match self {
            Element::Map(value) => Some(value),
            _ => None,
        }
    }

    pub fn try_as_float(&self) -> Result<f64, ElementError> {
        self.as_float().ok_or(ElementError::TypeMismatch {
            expected: "number",
            actual: self.type_name(),
        })
    }

    pub fn try_as_str(&self) -> Result<&str, ElementError> {
        self.as_str().ok_or(ElementError::TypeMismatch {
            expected: "string",
            actual: self.type_name(),
        })
    }

    pub fn try_as_map(&self) -> Result<&PropertyMap, ElementError> {
        self.as_map().ok_or(ElementError::TypeMismatch {
            expected: "map",
            actual: self.type_name(),
        })
    }

    /// Reads a list of exactly `len` numbers, as used for positions,
    /// vectors, quaternions and bounding boxes.
    pub fn try_as_numbers(&self, len: usize) -> Result<Vec<f64>, ElementError> {
        let list = self.as_list().ok_or(ElementError::TypeMismatch {
            expected: "list",
            actual: self.type_name(),
        })?;
        if list.len() != len {
            return Err(ElementError::WrongLength {
                expected: len,
                actual: list.len(),
            });
        }
        list.iter().map(Element::try_as_float).collect()
    }
}

impl From<i64> for Element {
    fn from(value: i64) -> Self {
        Element::Int(value)
    }
}

impl From<i32> for Element {
    fn from(value: i32) -> Self {
        Element::Int(value as i64)
    }
}

impl From<f64> for Element {
    fn from(value: f64) -> Self {
        Element::Float(value)
    }
}

impl From<&str> for Element {
    fn from(value: &str) -> Self {
        Element::String(value.to_string())
    }
}

impl From<String> for Element {
    fn from(value: String) -> Self {
        Element::String(value)
    }
}

impl From<Vec<Element>> for Element {
    fn from(value: Vec<Element>) -> Self {
        Element::List(value)
    }
}

impl From<PropertyMap> for Element {
    fn from(value: PropertyMap) -> Self {
        Element::Map(value)
    }
}

impl From<&[f64]> for Element {
    fn from(value: &[f64]) -> Self {
        Element::List(value.iter().map(|v| Element::Float(*v)).collect())
    }
}
