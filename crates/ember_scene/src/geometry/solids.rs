//! Primitive solid descriptors consumed by [`crate::geometry::builder`].

use ember_core::Point3;

/// A flat circle lying in the XZ plane, facing up.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Circle {
    pub center: Point3,
    pub radius: f32,
}

impl Circle {
    pub const fn new(center: Point3, radius: f32) -> Self {
        Self { center, radius }
    }
}

/// An open-ended cylinder whose axis is vertical. `center` sits halfway up
/// the axis; the side wall spans `height / 2` above and below it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cylinder {
    pub center: Point3,
    pub radius: f32,
    pub height: f32,
}

impl Cylinder {
    pub const fn new(center: Point3, radius: f32, height: f32) -> Self {
        Self {
            center,
            radius,
            height,
        }
    }
}
