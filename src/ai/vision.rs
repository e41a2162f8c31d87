//! Line-of-sight tests
//!
//! Sight is blocked by any hull nearer than the target whose angular span,
//! as seen from the observer, straddles the bearing to the target.

use crate::sim::Polygon;
use crate::stealth::StealthMap;
use crate::{Vector, angle_from, normalize_angle};

/// Whether `target` is visible from `observer` past `occluders`
pub fn line_of_sight<'a>(
    observer: Vector,
    target: Vector,
    occluders: impl IntoIterator<Item = &'a Polygon>,
) -> bool {
    let range = observer.distance(target);
    let bearing = angle_from(target, observer);

    !occluders.into_iter().any(|hull| {
        if observer.distance(hull.centroid()) > range {
            return false;
        }
        let (lo, hi) = angular_span(hull, observer, bearing);
        // Hulls around or behind the observer wrap past ±π
        lo < 0.0 && 0.0 < hi && hi - lo < std::f64::consts::PI
    })
}

/// Min and max vertex bearing relative to `bearing`, each in [-π, π)
fn angular_span(hull: &Polygon, observer: Vector, bearing: f64) -> (f64, f64) {
    hull.vertices()
        .iter()
        .map(|v| normalize_angle(angle_from(*v, observer) - bearing))
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), a| {
            (lo.min(a), hi.max(a))
        })
}

/// Whether the alien can see the player
///
/// Fails outright while the player hides or stands beyond `vision_radius`.
pub fn can_see_player(map: &StealthMap, vision_radius: f64) -> bool {
    if map.is_hiding() {
        return false;
    }
    let alien = map.alien_position();
    let player = map.player_position();
    if alien.distance(player) > vision_radius {
        return false;
    }
    line_of_sight(alien, player, map.occluders())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nav::Cell;
    use crate::sim::HidingKind;
    use crate::stealth::MapLayout;

    fn block(x: f64, y: f64) -> Polygon {
        Polygon::rectangle(Vector::new(x, y), 10.0, 10.0)
    }

    #[test]
    fn test_clear_sight() {
        assert!(line_of_sight(
            Vector::ZERO,
            Vector::new(50.0, 0.0),
            std::iter::empty::<&Polygon>()
        ));
        let off_axis = [block(25.0, 30.0)];
        assert!(line_of_sight(Vector::ZERO, Vector::new(50.0, 0.0), &off_axis));
    }

    #[test]
    fn test_blocked_by_nearer_hull() {
        let between = [block(25.0, 0.0)];
        assert!(!line_of_sight(Vector::ZERO, Vector::new(50.0, 0.0), &between));
    }

    #[test]
    fn test_hull_beyond_target_ignored() {
        let beyond = [block(75.0, 0.0)];
        assert!(line_of_sight(Vector::ZERO, Vector::new(50.0, 0.0), &beyond));
    }

    #[test]
    fn test_hull_behind_observer_ignored() {
        let behind = [block(-20.0, 0.0)];
        assert!(line_of_sight(Vector::ZERO, Vector::new(50.0, 0.0), &behind));
    }

    #[test]
    fn test_blocked_across_negative_x_axis() {
        // Bearing to target is -π; the blocker's span wraps through it
        let between = [block(-25.0, 0.0)];
        assert!(!line_of_sight(Vector::ZERO, Vector::new(-50.0, 0.0), &between));
    }

    #[test]
    fn test_can_see_player_respects_radius_and_hiding() {
        let mut layout = MapLayout::bordered(Cell::new(50, 50), Cell::new(50, 54));
        layout.hiding_spots.push((Cell::new(50, 51), HidingKind::Locker));
        let mut map = StealthMap::new(&layout, 3);

        // The hiding spot sits between them
        assert!(!can_see_player(&map, 75.0));

        let player = map.player();
        map.scene_mut()[player].set_centroid(Vector::new(545.0, 475.0));
        assert!(can_see_player(&map, 75.0));
        assert!(!can_see_player(&map, 20.0));

        let spot = map.hiding_spots()[0];
        assert!(map.hide_player(spot));
        assert!(!can_see_player(&map, 1000.0));
    }
}
