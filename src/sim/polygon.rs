//! Polygon geometry for body hulls
//!
//! A polygon is an ordered vertex list in counterclockwise winding, with an
//! implicit closing edge from the last vertex back to the first. Vertices are
//! stored in world space; bodies translate them whenever their centroid moves.

use serde::{Deserialize, Serialize};

use crate::{Vector, polar_to_cartesian, rotate};

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vector,
    pub max: Vector,
}

impl Aabb {
    /// Boxes that merely touch count as overlapping
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && other.min.x <= self.max.x
            && self.min.y <= other.max.y
            && other.min.y <= self.max.y
    }

    pub fn contains(&self, point: Vector) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y && point.y <= self.max.y
    }
}

/// A simple polygon with at least three vertices
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    vertices: Vec<Vector>,
}

impl Polygon {
    /// Panics if fewer than three vertices are supplied.
    pub fn new(vertices: Vec<Vector>) -> Self {
        assert!(
            vertices.len() >= 3,
            "polygon needs at least 3 vertices, got {}",
            vertices.len()
        );
        Self { vertices }
    }

    /// Axis-aligned rectangle centered at `center`
    pub fn rectangle(center: Vector, width: f64, height: f64) -> Self {
        let hw = width / 2.0;
        let hh = height / 2.0;
        Self::new(vec![
            center + Vector::new(hw, -hh),
            center + Vector::new(hw, hh),
            center + Vector::new(-hw, hh),
            center + Vector::new(-hw, -hh),
        ])
    }

    /// Regular n-gon inscribed in a circle of `radius`, first vertex at `phase`
    pub fn regular(center: Vector, radius: f64, sides: usize, phase: f64) -> Self {
        assert!(sides >= 3, "regular polygon needs at least 3 sides");
        let step = std::f64::consts::TAU / sides as f64;
        Self::new(
            (0..sides)
                .map(|i| center + polar_to_cartesian(radius, phase + i as f64 * step))
                .collect(),
        )
    }

    #[inline]
    pub fn vertices(&self) -> &[Vector] {
        &self.vertices
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// Always false; kept for API symmetry with `len`
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Edges as (start, end) pairs, closing edge last
    pub fn edges(&self) -> impl Iterator<Item = (Vector, Vector)> + '_ {
        let n = self.vertices.len();
        (0..n).map(move |i| (self.vertices[i], self.vertices[(i + 1) % n]))
    }

    /// Signed shoelace sum (twice the signed area)
    fn shoelace(&self) -> f64 {
        self.edges().map(|(a, b)| crate::cross(a, b)).sum()
    }

    /// Unsigned area
    pub fn area(&self) -> f64 {
        (self.shoelace() / 2.0).abs()
    }

    /// Area-weighted centroid
    ///
    /// Degenerate (zero-area) polygons fall back to the vertex average.
    pub fn centroid(&self) -> Vector {
        let twice_area = self.shoelace();
        if twice_area.abs() < f64::EPSILON {
            let sum: Vector = self.vertices.iter().copied().sum();
            return sum / self.vertices.len() as f64;
        }

        let mut acc = Vector::ZERO;
        for (a, b) in self.edges() {
            acc += (a + b) * crate::cross(a, b);
        }
        acc / (3.0 * twice_area)
    }

    pub fn translate(&mut self, delta: Vector) {
        for v in &mut self.vertices {
            *v += delta;
        }
    }

    /// Rotate every vertex counterclockwise by `angle` about `pivot`
    pub fn rotate(&mut self, angle: f64, pivot: Vector) {
        for v in &mut self.vertices {
            *v = pivot + rotate(*v - pivot, angle);
        }
    }

    pub fn bounds(&self) -> Aabb {
        let mut min = Vector::splat(f64::INFINITY);
        let mut max = Vector::splat(f64::NEG_INFINITY);
        for v in &self.vertices {
            min = min.min(*v);
            max = max.max(*v);
        }
        Aabb { min, max }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::is_close;
    use proptest::prelude::*;
    use std::f64::consts::PI;

    fn unit_square() -> Polygon {
        Polygon::new(vec![
            Vector::new(0.0, 0.0),
            Vector::new(1.0, 0.0),
            Vector::new(1.0, 1.0),
            Vector::new(0.0, 1.0),
        ])
    }

    #[test]
    fn test_square_area_and_centroid() {
        let sq = unit_square();
        assert!((sq.area() - 1.0).abs() < 1e-12);
        assert!(is_close(1e-12, sq.centroid(), Vector::new(0.5, 0.5)));
    }

    #[test]
    fn test_triangle_centroid() {
        let tri = Polygon::new(vec![
            Vector::new(0.0, 0.0),
            Vector::new(3.0, 0.0),
            Vector::new(0.0, 3.0),
        ]);
        assert!((tri.area() - 4.5).abs() < 1e-12);
        assert!(is_close(1e-12, tri.centroid(), Vector::new(1.0, 1.0)));
    }

    #[test]
    fn test_clockwise_area_is_positive() {
        let cw = Polygon::new(vec![
            Vector::new(0.0, 0.0),
            Vector::new(0.0, 2.0),
            Vector::new(2.0, 2.0),
            Vector::new(2.0, 0.0),
        ]);
        assert!((cw.area() - 4.0).abs() < 1e-12);
        assert!(is_close(1e-12, cw.centroid(), Vector::new(1.0, 1.0)));
    }

    #[test]
    fn test_rotate_about_centroid_keeps_centroid() {
        let mut sq = Polygon::rectangle(Vector::new(3.0, -2.0), 4.0, 2.0);
        let c = sq.centroid();
        sq.rotate(PI / 3.0, c);
        assert!(is_close(1e-9, sq.centroid(), c));
        assert!((sq.area() - 8.0).abs() < 1e-9);
    }

    #[test]
    fn test_bounds() {
        let rect = Polygon::rectangle(Vector::new(10.0, 5.0), 4.0, 2.0);
        let b = rect.bounds();
        assert_eq!(b.min, Vector::new(8.0, 4.0));
        assert_eq!(b.max, Vector::new(12.0, 6.0));
        assert!(b.contains(Vector::new(10.0, 5.0)));
    }

    #[test]
    fn test_aabb_touching_overlaps() {
        let a = Polygon::rectangle(Vector::ZERO, 2.0, 2.0).bounds();
        let b = Polygon::rectangle(Vector::new(2.0, 0.0), 2.0, 2.0).bounds();
        assert!(a.overlaps(&b));
        let c = Polygon::rectangle(Vector::new(2.5, 0.0), 2.0, 2.0).bounds();
        assert!(!a.overlaps(&c));
    }

    #[test]
    #[should_panic]
    fn test_two_vertices_rejected() {
        Polygon::new(vec![Vector::ZERO, Vector::X]);
    }

    proptest! {
        #[test]
        fn prop_translate_moves_centroid(
            cx in -500.0f64..500.0,
            cy in -500.0f64..500.0,
            dx in -100.0f64..100.0,
            dy in -100.0f64..100.0,
            sides in 3usize..12,
        ) {
            let mut poly = Polygon::regular(Vector::new(cx, cy), 7.0, sides, 0.3);
            let before = poly.centroid();
            let area = poly.area();
            poly.translate(Vector::new(dx, dy));
            prop_assert!(is_close(1e-6, poly.centroid(), before + Vector::new(dx, dy)));
            prop_assert!((poly.area() - area).abs() < 1e-6);
        }
    }
}
