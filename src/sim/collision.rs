//! Collision detection between convex polygons
//!
//! Separating axis test over the edge normals of both hulls, with a cheap
//! bounding-box rejection in front of it.

use super::polygon::Polygon;
use crate::Vector;

/// Result of a collision check
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionInfo {
    /// Whether the hulls overlap
    pub collided: bool,
    /// Unit axis of minimum penetration, pointing from the first hull toward
    /// the second. Meaningless when `collided` is false.
    pub axis: Vector,
}

impl CollisionInfo {
    pub fn miss() -> Self {
        Self {
            collided: false,
            axis: Vector::ZERO,
        }
    }
}

/// Check two convex hulls for overlap
///
/// Returns early without running SAT when the bounding boxes are disjoint.
pub fn find_collision(a: &Polygon, b: &Polygon) -> CollisionInfo {
    if !a.bounds().overlaps(&b.bounds()) {
        return CollisionInfo::miss();
    }
    find_collision_unchecked(a, b)
}

/// SAT core for callers that already filtered by bounding box
///
/// The pair is tested in a fixed order, so swapping the arguments only negates
/// the axis. Only a hull tested against an identical copy of itself gets the
/// same axis both ways.
pub fn find_collision_unchecked(a: &Polygon, b: &Polygon) -> CollisionInfo {
    if precedes(b, a) {
        let info = separating_axis_test(b, a);
        return CollisionInfo {
            axis: -info.axis,
            ..info
        };
    }
    separating_axis_test(a, b)
}

fn separating_axis_test(a: &Polygon, b: &Polygon) -> CollisionInfo {
    let mut best_depth = f64::INFINITY;
    let mut best_axis = None;

    for axis in edge_normals(a).chain(edge_normals(b)) {
        let (a_min, a_max) = project(a, axis);
        let (b_min, b_max) = project(b, axis);

        // Touching intervals are separated
        if !(b_min < a_max && a_min < b_max) {
            return CollisionInfo::miss();
        }

        let depth = (a_max - b_min).min(b_max - a_min);
        if depth < best_depth {
            best_depth = depth;
            best_axis = Some(axis);
        }
    }

    let Some(mut axis) = best_axis else {
        // Every edge was degenerate; nothing to test against
        return CollisionInfo::miss();
    };

    let toward = axis.dot(b.centroid() - a.centroid());
    // No separation along the axis (coincident centroids): upper half-plane
    if toward < 0.0 || (toward == 0.0 && (axis.y < 0.0 || (axis.y == 0.0 && axis.x < 0.0))) {
        axis = -axis;
    }

    CollisionInfo {
        collided: true,
        axis,
    }
}

/// Total order on hulls: centroid first, then vertices, both lexicographic
fn precedes(p: &Polygon, q: &Polygon) -> bool {
    let by_point = |u: Vector, v: Vector| u.x.total_cmp(&v.x).then(u.y.total_cmp(&v.y));
    by_point(p.centroid(), q.centroid())
        .then_with(|| {
            p.vertices()
                .iter()
                .zip(q.vertices())
                .map(|(u, v)| by_point(*u, *v))
                .find(|order| order.is_ne())
                .unwrap_or_else(|| p.vertices().len().cmp(&q.vertices().len()))
        })
        .is_lt()
}

/// Whether two hulls overlap, ignoring the axis
#[inline]
pub fn overlaps(a: &Polygon, b: &Polygon) -> bool {
    find_collision(a, b).collided
}

/// Unit edge normals; zero-length edges contribute no axis
fn edge_normals(poly: &Polygon) -> impl Iterator<Item = Vector> + '_ {
    poly.edges().filter_map(|(start, end)| {
        let edge = end - start;
        let len = edge.length();
        if len == 0.0 {
            None
        } else {
            Some(Vector::new(-edge.y, edge.x) / len)
        }
    })
}

/// Interval covered by the polygon projected onto `axis`
fn project(poly: &Polygon, axis: Vector) -> (f64, f64) {
    poly.vertices()
        .iter()
        .map(|v| v.dot(axis))
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), s| {
            (lo.min(s), hi.max(s))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::is_close;
    use proptest::prelude::*;
    use std::f64::consts::FRAC_PI_4;

    fn rect(x: f64, y: f64, w: f64, h: f64) -> Polygon {
        Polygon::rectangle(Vector::new(x, y), w, h)
    }

    #[test]
    fn test_overlapping_squares_axis_points_a_to_b() {
        let a = rect(0.0, 0.0, 2.0, 2.0);
        let b = rect(1.9, 0.5, 2.0, 2.0);
        let info = find_collision(&a, &b);
        assert!(info.collided);
        assert!(is_close(1e-12, info.axis, Vector::new(1.0, 0.0)));

        let flipped = find_collision(&b, &a);
        assert!(flipped.collided);
        assert!(is_close(1e-12, flipped.axis, Vector::new(-1.0, 0.0)));
    }

    #[test]
    fn test_minimum_penetration_axis_is_vertical() {
        let a = rect(0.0, 0.0, 10.0, 2.0);
        let b = rect(1.0, -1.8, 10.0, 2.0);
        let info = find_collision(&a, &b);
        assert!(info.collided);
        assert!(is_close(1e-12, info.axis, Vector::new(0.0, -1.0)));
    }

    #[test]
    fn test_separated_boxes_miss() {
        let a = rect(0.0, 0.0, 2.0, 2.0);
        let b = rect(5.0, 0.0, 2.0, 2.0);
        assert!(!find_collision(&a, &b).collided);
    }

    #[test]
    fn test_boxes_overlap_but_diamond_separated() {
        // Bounding boxes overlap at the corner, hulls do not
        let diamond = Polygon::regular(Vector::ZERO, 1.0, 4, 0.0);
        let square = rect(1.2, 1.2, 1.0, 1.0);
        assert!(diamond.bounds().overlaps(&square.bounds()));
        assert!(!find_collision(&diamond, &square).collided);
        assert!(!find_collision_unchecked(&diamond, &square).collided);
    }

    #[test]
    fn test_rotated_overlap() {
        let diamond = Polygon::regular(Vector::ZERO, 2.0, 4, 0.0);
        let square = rect(2.5, 0.0, 2.0, 2.0);
        assert!(overlaps(&diamond, &square));

        // Same square turned 45 degrees is an axis-aligned box of half-width sqrt(2)
        let diamond = Polygon::regular(Vector::ZERO, 2.0, 4, FRAC_PI_4);
        let square = rect(2.2, 0.0, 2.0, 2.0);
        assert!(overlaps(&diamond, &square));
    }

    #[test]
    fn test_degenerate_edges_are_skipped() {
        let with_duplicate = Polygon::new(vec![
            Vector::new(-1.0, -1.0),
            Vector::new(1.0, -1.0),
            Vector::new(1.0, -1.0),
            Vector::new(1.0, 1.0),
            Vector::new(-1.0, 1.0),
        ]);
        let other = rect(1.5, 0.0, 2.0, 2.0);
        let info = find_collision(&with_duplicate, &other);
        assert!(info.collided);
        assert!(info.axis.x.is_finite() && info.axis.y.is_finite());
        assert!(is_close(1e-12, info.axis, Vector::X));
    }

    #[test]
    fn test_coincident_centroids_give_opposite_axes() {
        let wide = rect(0.0, 0.0, 4.0, 2.0);
        let tall = rect(0.0, 0.0, 2.0, 4.0);
        let ab = find_collision(&wide, &tall);
        let ba = find_collision(&tall, &wide);
        assert!(ab.collided && ba.collided);
        assert_eq!(ab.axis, -ba.axis);
        assert!((ab.axis.length() - 1.0).abs() < 1e-12);

        let square = rect(0.0, 0.0, 2.0, 2.0);
        let diamond = Polygon::regular(Vector::ZERO, 1.2, 4, 0.0);
        assert_eq!(
            find_collision(&square, &diamond).axis,
            -find_collision(&diamond, &square).axis
        );
    }

    proptest! {
        #[test]
        fn prop_collision_is_symmetric(
            ax in -20.0f64..20.0, ay in -20.0f64..20.0,
            bx in -20.0f64..20.0, by in -20.0f64..20.0,
            a_sides in 3usize..9, b_sides in 3usize..9,
            a_phase in 0.0f64..1.0, b_phase in 0.0f64..1.0,
        ) {
            let a = Polygon::regular(Vector::new(ax, ay), 8.0, a_sides, a_phase);
            let b = Polygon::regular(Vector::new(bx, by), 6.0, b_sides, b_phase);
            let ab = find_collision(&a, &b);
            let ba = find_collision(&b, &a);
            prop_assert_eq!(ab.collided, ba.collided);
            if ab.collided {
                prop_assert!((ab.axis.length() - 1.0).abs() < 1e-9);
                prop_assert_eq!(ab.axis, -ba.axis);
            }
        }
    }
}
