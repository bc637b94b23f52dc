//! Planar helpers for the triangle method.

/// A point in the (bin index, count) plane.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vertex {
    pub x: f64,
    pub y: f64,
}

impl Vertex {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Height of the triangle `(a, b, c)` measured from `c` onto the base `a-b`,
/// i.e. the perpendicular distance from `c` to the line through `a` and `b`.
///
/// Returns 0 when `a` and `b` coincide.
pub fn triangle_height(a: Vertex, b: Vertex, c: Vertex) -> f64 {
    let (bx, by) = (b.x - a.x, b.y - a.y);
    let base = bx.hypot(by);
    if base == 0.0 {
        return 0.0;
    }
    let (cx, cy) = (c.x - a.x, c.y - a.y);
    (bx * cy - by * cx).abs() / base
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn height_above_horizontal_base() {
        let a = Vertex::new(0.0, 0.0);
        let b = Vertex::new(10.0, 0.0);
        assert_relative_eq!(triangle_height(a, b, Vertex::new(3.0, 4.0)), 4.0);
        assert_relative_eq!(triangle_height(b, a, Vertex::new(3.0, -4.0)), 4.0);
    }

    #[test]
    fn height_from_diagonal_base() {
        let a = Vertex::new(0.0, 0.0);
        let b = Vertex::new(1.0, 1.0);
        let d = triangle_height(a, b, Vertex::new(1.0, 0.0));
        assert_relative_eq!(d, std::f64::consts::FRAC_1_SQRT_2, epsilon = 1e-12);
        assert_relative_eq!(triangle_height(a, b, Vertex::new(5.0, 5.0)), 0.0);
    }

    #[test]
    fn degenerate_base() {
        let a = Vertex::new(2.0, 2.0);
        assert_eq!(triangle_height(a, a, Vertex::new(0.0, 0.0)), 0.0);
    }
}
