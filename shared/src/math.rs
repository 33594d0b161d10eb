use nalgebra::{Point3, Quaternion, UnitQuaternion, Vector3};

use crate::objects::element::{Element, ElementError};

pub type Point = Point3<f64>;
pub type Vector = Vector3<f64>;
pub type Orientation = UnitQuaternion<f64>;

/// Axis-aligned box in the entity's local frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Point,
    pub max: Point,
}

impl BoundingBox {
    pub fn new(min: Point, max: Point) -> Self {
        Self { min, max }
    }

    pub fn extents(&self) -> Vector {
        self.max - self.min
    }
}

/// Converts a point from a child frame (placed at `origin` with `orientation`
/// inside its parent) into the parent frame
pub fn to_parent_coords(point: &Point, origin: &Point, orientation: &Orientation) -> Point {
    origin + orientation * point.coords
}

/// Inverse of [`to_parent_coords`]
pub fn to_local_coords(point: &Point, origin: &Point, orientation: &Orientation) -> Point {
    Point::from(orientation.inverse() * (point - origin))
}

pub fn point_from_element(element: &Element) -> Result<Point, ElementError> {
    let values = element.try_as_numbers(3)?;
    Ok(Point::new(values[0], values[1], values[2]))
}

pub fn vector_from_element(element: &Element) -> Result<Vector, ElementError> {
    let values = element.try_as_numbers(3)?;
    Ok(Vector::new(values[0], values[1], values[2]))
}

/// Reads an orientation stored as `[x, y, z, w]`. A zero quaternion cannot
/// be normalized and is rejected.
pub fn orientation_from_element(element: &Element) -> Result<Orientation, ElementError> {
    let values = element.try_as_numbers(4)?;
    let quaternion = Quaternion::new(values[3], values[0], values[1], values[2]);
    UnitQuaternion::try_new(quaternion, f64::EPSILON).ok_or(ElementError::TypeMismatch {
        expected: "non-zero quaternion",
        actual: "zero quaternion",
    })
}

/// Reads a box stored as `[min_x, min_y, min_z, max_x, max_y, max_z]`
pub fn bbox_from_element(element: &Element) -> Result<BoundingBox, ElementError> {
    let values = element.try_as_numbers(6)?;
    Ok(BoundingBox::new(
        Point::new(values[0], values[1], values[2]),
        Point::new(values[3], values[4], values[5]),
    ))
}

pub fn point_to_element(point: &Point) -> Element {
    Element::from(&[point.x, point.y, point.z][..])
}

pub fn vector_to_element(vector: &Vector) -> Element {
    Element::from(&[vector.x, vector.y, vector.z][..])
}

pub fn orientation_to_element(orientation: &Orientation) -> Element {
    let q = orientation.quaternion();
    Element::from(&[q.i, q.j, q.k, q.w][..])
}
