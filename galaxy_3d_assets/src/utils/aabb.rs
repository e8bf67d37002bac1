/// Axis-aligned bounding box

use glam::{Mat4, Vec3};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AABB {
    /// Minimum corner (x, y, z)
    pub min: Vec3,
    /// Maximum corner (x, y, z)
    pub max: Vec3,
}

impl AABB {
    /// Inverted box: merging anything into it yields that thing
    pub const EMPTY: AABB = AABB {
        min: Vec3::splat(f32::INFINITY),
        max: Vec3::splat(f32::NEG_INFINITY),
    };

    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Smallest box holding every point; `EMPTY` for no points
    pub fn from_points<I: IntoIterator<Item = Vec3>>(points: I) -> AABB {
        let mut aabb = AABB::EMPTY;
        for p in points {
            aabb.expand(p);
        }
        aabb
    }

    pub fn expand(&mut self, point: Vec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    pub fn merged(&self, other: &AABB) -> AABB {
        AABB { min: self.min.min(other.min), max: self.max.max(other.max) }
    }

    /// False for `EMPTY` and other inverted boxes
    pub fn is_valid(&self) -> bool {
        self.min.cmple(self.max).all()
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn extent(&self) -> Vec3 {
        self.max - self.min
    }

    /// Box of this box after `matrix`
    ///
    /// Arvo's method: each matrix axis is projected onto the extents, which
    /// gives the tight result without transforming the 8 corners.
    pub fn transformed(&self, matrix: &Mat4) -> AABB {
        if !self.is_valid() {
            return *self;
        }
        let translation = matrix.col(3).truncate();
        let mut min = translation;
        let mut max = translation;

        for i in 0..3 {
            let axis = matrix.col(i).truncate();
            let a = axis * self.min[i];
            let b = axis * self.max[i];
            min += a.min(b);
            max += a.max(b);
        }

        AABB { min, max }
    }
}

impl Default for AABB {
    fn default() -> Self {
        AABB::EMPTY
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "aabb_tests.rs"]
mod tests;
