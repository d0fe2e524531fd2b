// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Axis-aligned bounding boxes and union aggregation for view fitting

use nalgebra::{Point3, Vector3};

/// Axis-aligned bounding box in renderer world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Point3<f64>,
    pub max: Point3<f64>,
}

impl Aabb {
    /// Create a box from its corners
    #[inline]
    pub fn new(min: Point3<f64>, max: Point3<f64>) -> Self {
        Self { min, max }
    }

    /// Box whose mins hold the largest and maxes the smallest representable
    /// value. Any real box expands it on the first merge.
    #[inline]
    pub fn sentinel() -> Self {
        Self {
            min: Point3::new(f64::MAX, f64::MAX, f64::MAX),
            max: Point3::new(f64::MIN, f64::MIN, f64::MIN),
        }
    }

    /// Whether this is still the untouched sentinel (no data merged)
    #[inline]
    pub fn is_sentinel(&self) -> bool {
        *self == Self::sentinel()
    }

    /// From wire bounds: min xyz, then max xyz
    pub fn from_bounds(bounds: &[f32; 6]) -> Self {
        Self {
            min: Point3::new(bounds[0] as f64, bounds[1] as f64, bounds[2] as f64),
            max: Point3::new(bounds[3] as f64, bounds[4] as f64, bounds[5] as f64),
        }
    }

    /// Flatten to min xyz, max xyz
    pub fn to_array(&self) -> [f64; 6] {
        [
            self.min.x, self.min.y, self.min.z, self.max.x, self.max.y, self.max.z,
        ]
    }

    /// Grow to enclose `other`
    #[inline]
    pub fn expand(&mut self, other: &Aabb) {
        self.min = self.min.inf(&other.min);
        self.max = self.max.sup(&other.max);
    }

    /// Smallest box enclosing both
    #[inline]
    pub fn union(&self, other: &Aabb) -> Aabb {
        let mut merged = *self;
        merged.expand(other);
        merged
    }

    #[inline]
    pub fn center(&self) -> Point3<f64> {
        nalgebra::center(&self.min, &self.max)
    }

    #[inline]
    pub fn size(&self) -> Vector3<f64> {
        self.max - self.min
    }

    /// Length of the min-max diagonal
    #[inline]
    pub fn diagonal(&self) -> f64 {
        self.size().norm()
    }
}

/// Union of the boxes of `ids`.
///
/// - no ids: `None`
/// - one id: that id's box, or `None` when it has no spatial extent
/// - several ids: fold over the ids that resolve, skipping the rest. When
///   none resolve the result is [`Aabb::sentinel`]; check
///   [`Aabb::is_sentinel`] before using it.
pub fn compute_union_aabb<S, F>(ids: &[S], mut lookup: F) -> Option<Aabb>
where
    S: AsRef<str>,
    F: FnMut(&str) -> Option<Aabb>,
{
    match ids {
        [] => None,
        [single] => lookup(single.as_ref()),
        _ => {
            let mut union = Aabb::sentinel();
            for id in ids {
                if let Some(aabb) = lookup(id.as_ref()) {
                    union.expand(&aabb);
                }
            }
            Some(union)
        }
    }
}
