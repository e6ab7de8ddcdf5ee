use std::ops::Sub;

/// Minimal 3D vector; fault geometry lives in the z = 0 plane.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub const fn planar(x: f32, y: f32) -> Self {
        Self { x, y, z: 0.0 }
    }

    pub fn cross(self, other: Vec3) -> Vec3 {
        Vec3::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }
}

impl Sub for Vec3 {
    type Output = Vec3;

    fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

/// Which side of a fault line a point falls on.
/// Points exactly on the line report `Right`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

/// Directed segment from `base` to `end` splitting the tile in two.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaultLine {
    base: Vec3,
    end: Vec3,
}

impl FaultLine {
    pub fn new(base: Vec3, end: Vec3) -> Self {
        Self { base, end }
    }

    pub fn base(&self) -> Vec3 {
        self.base
    }

    pub fn end(&self) -> Vec3 {
        self.end
    }

    /// z component of `(point - base) x (end - base)`.
    /// Negative on the left, positive on the right, zero on the line.
    #[inline]
    pub fn test_point(&self, point: Vec3) -> f32 {
        (point - self.base).cross(self.end - self.base).z
    }

    #[inline]
    pub fn classify(&self, point: Vec3) -> Side {
        if self.test_point(point) < 0.0 {
            Side::Left
        } else {
            Side::Right
        }
    }

    /// Classify the centre of grid cell (`x`, `y`).
    #[inline]
    pub fn side_of(&self, x: usize, y: usize) -> Side {
        self.classify(Vec3::planar(x as f32, y as f32))
    }
}

#[cfg(test)]
mod tests {
    use super::{FaultLine, Side, Vec3};

    #[test]
    fn cross_product_components() {
        let a = Vec3::new(1.0, 0.0, 0.0);
        let b = Vec3::new(0.0, 1.0, 0.0);
        assert_eq!(a.cross(b), Vec3::new(0.0, 0.0, 1.0));
        assert_eq!(b.cross(a), Vec3::new(0.0, 0.0, -1.0));
    }

    #[test]
    fn classify_vertical_line() {
        // line pointing down the y axis at x = 10
        let line = FaultLine::new(Vec3::planar(10.0, 0.0), Vec3::planar(10.0, 100.0));
        assert_eq!(line.side_of(5, 50), Side::Left);
        assert_eq!(line.side_of(15, 50), Side::Right);
    }

    #[test]
    fn on_line_counts_as_right() {
        let line = FaultLine::new(Vec3::planar(0.0, 0.0), Vec3::planar(10.0, 10.0));
        assert_eq!(line.test_point(Vec3::planar(4.0, 4.0)), 0.0);
        assert_eq!(line.side_of(4, 4), Side::Right);
    }

    #[test]
    fn degenerate_line_puts_everything_right() {
        let p = Vec3::planar(3.0, 3.0);
        let line = FaultLine::new(p, p);
        for y in 0..8 {
            for x in 0..8 {
                assert_eq!(line.side_of(x, y), Side::Right);
            }
        }
    }

    #[test]
    fn swapping_endpoints_flips_sides() {
        let a = Vec3::planar(12.0, 200.0);
        let b = Vec3::planar(180.0, 31.0);
        let forward = FaultLine::new(a, b);
        let backward = FaultLine::new(b, a);
        for y in (0..256).step_by(7) {
            for x in (0..256).step_by(5) {
                let p = Vec3::planar(x as f32, y as f32);
                if forward.test_point(p) == 0.0 {
                    continue;
                }
                assert_ne!(forward.classify(p), backward.classify(p), "at ({x}, {y})");
            }
        }
    }
}
