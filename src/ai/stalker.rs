//! The alien's stalking state machine
//!
//! Patrols multi-leg A* routes around the player, chases on sight, and walks
//! to the last sighting after losing the player.

use std::collections::VecDeque;

use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_pcg::Pcg32;

use super::vision::can_see_player;
use crate::consts::{
    ARRIVAL_TOLERANCE, CHASE_SPEED, LOOK_TIME, MAX_PATH_LEGS, STALK_RADIUS, STALK_SPEED,
    VISION_RADIUS,
};
use crate::nav::{Cell, a_star};
use crate::settings::SimSettings;
use crate::stealth::StealthMap;
use crate::{Vector, is_close};

/// Stalker tuning
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StalkerConfig {
    pub vision_radius: f64,
    pub stalk_speed: f64,
    pub chase_speed: f64,
    /// Pause at each patrol leg end (seconds)
    pub look_time: f64,
    /// Patrol sampling radius around the player (cells)
    pub stalk_radius: usize,
    pub max_path_legs: usize,
    pub arrival_tolerance: f64,
}

impl Default for StalkerConfig {
    fn default() -> Self {
        Self {
            vision_radius: VISION_RADIUS,
            stalk_speed: STALK_SPEED,
            chase_speed: CHASE_SPEED,
            look_time: LOOK_TIME,
            stalk_radius: STALK_RADIUS,
            max_path_legs: MAX_PATH_LEGS,
            arrival_tolerance: ARRIVAL_TOLERANCE,
        }
    }
}

impl From<&SimSettings> for StalkerConfig {
    fn from(settings: &SimSettings) -> Self {
        Self {
            vision_radius: settings.vision_radius,
            stalk_speed: settings.stalk_speed,
            chase_speed: settings.chase_speed,
            look_time: settings.look_time,
            stalk_radius: settings.stalk_radius,
            max_path_legs: settings.max_path_legs,
            arrival_tolerance: settings.arrival_tolerance,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StalkerState {
    Patrolling,
    /// Running straight at a visible player
    Chasing,
    /// Walking to where the player was last seen
    Investigating,
    /// Looking around at the end of a patrol leg
    WaitingAtNode { waited: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Waypoint {
    cell: Cell,
    /// Last cell of a planned leg; the stalker pauses here
    leg_end: bool,
}

#[derive(Debug, Clone)]
pub struct Stalker {
    config: StalkerConfig,
    state: StalkerState,
    path: VecDeque<Waypoint>,
    last_seen: Option<Cell>,
    rng: Pcg32,
}

impl Stalker {
    pub fn new(config: StalkerConfig, seed: u64) -> Self {
        Self {
            config,
            state: StalkerState::Patrolling,
            path: VecDeque::new(),
            last_seen: None,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn from_settings(settings: &SimSettings) -> Self {
        Self::new(StalkerConfig::from(settings), settings.seed)
    }

    #[inline]
    pub fn state(&self) -> StalkerState {
        self.state
    }

    #[inline]
    pub fn config(&self) -> &StalkerConfig {
        &self.config
    }

    /// Remaining waypoints, next first
    pub fn path(&self) -> impl Iterator<Item = Cell> + '_ {
        self.path.iter().map(|wp| wp.cell)
    }

    /// Cell of the most recent sighting, kept until investigated
    #[inline]
    pub fn last_seen(&self) -> Option<Cell> {
        self.last_seen
    }

    /// Run one AI step and set the alien's velocity
    pub fn update(&mut self, map: &mut StealthMap, dt: f64) {
        if can_see_player(map, self.config.vision_radius) {
            self.last_seen = map.player_cell();
            self.path.clear();
            self.transition(StalkerState::Chasing);
            let target = map.player_position();
            steer(map, target, self.config.chase_speed);
            return;
        }

        match self.state {
            StalkerState::Chasing => self.investigate(map),
            StalkerState::Investigating => {
                self.advance(map);
                if self.path.is_empty() {
                    self.last_seen = None;
                    self.transition(StalkerState::Patrolling);
                }
            }
            StalkerState::Patrolling => {
                if self.path.len() <= 1 {
                    self.plan_patrol(map);
                }
                if self.advance(map).is_some_and(|wp| wp.leg_end) {
                    map.set_alien_velocity(Vector::ZERO);
                    self.transition(StalkerState::WaitingAtNode { waited: 0.0 });
                }
            }
            StalkerState::WaitingAtNode { waited } => {
                if waited + dt >= self.config.look_time {
                    self.transition(StalkerState::Patrolling);
                    if self.path.len() <= 1 {
                        self.plan_patrol(map);
                    }
                    self.advance(map);
                } else {
                    map.set_alien_velocity(Vector::ZERO);
                    self.state = StalkerState::WaitingAtNode {
                        waited: waited + dt,
                    };
                }
            }
        }
    }

    fn transition(&mut self, next: StalkerState) {
        if std::mem::discriminant(&self.state) != std::mem::discriminant(&next) {
            log::debug!("Stalker: {:?} -> {:?}", self.state, next);
        }
        self.state = next;
    }

    /// Sight just lost: route to the last sighting, or resume patrolling
    fn investigate(&mut self, map: &mut StealthMap) {
        self.path.clear();
        let route = match (map.alien_cell(), self.last_seen) {
            (Some(from), Some(to)) => a_star(map.grid(), from, to).ok(),
            _ => None,
        };

        if let Some(route) = route {
            self.path.extend(route.into_iter().skip(1).map(|cell| Waypoint {
                cell,
                leg_end: false,
            }));
            if let Some(last) = self.path.back_mut() {
                last.leg_end = true;
            }
        }

        if self.path.is_empty() {
            self.last_seen = None;
            self.transition(StalkerState::Patrolling);
        } else {
            self.transition(StalkerState::Investigating);
            self.advance(map);
        }
    }

    /// Append up to `max_path_legs` A* legs through shuffled cells near the
    /// player. Unreachable targets are skipped.
    fn plan_patrol(&mut self, map: &StealthMap) {
        let Some(player_cell) = map.player_cell() else {
            return;
        };
        let from = match self.path.back() {
            Some(wp) => Some(wp.cell),
            None => map.alien_cell(),
        };
        let Some(mut from) = from else {
            return;
        };

        let mut targets = map.grid().cells_within(player_cell, self.config.stalk_radius);
        targets.shuffle(&mut self.rng);

        let mut legs = 0;
        for target in targets.into_iter().take(self.config.max_path_legs) {
            match a_star(map.grid(), from, target) {
                Ok(leg) => {
                    let before = self.path.len();
                    self.path.extend(leg.into_iter().skip(1).map(|cell| Waypoint {
                        cell,
                        leg_end: false,
                    }));
                    if self.path.len() > before {
                        if let Some(last) = self.path.back_mut() {
                            last.leg_end = true;
                        }
                        legs += 1;
                    }
                    from = target;
                }
                Err(err) => log::debug!("Skipping patrol leg: {err}"),
            }
        }
        log::debug!("Planned {} patrol legs, {} waypoints queued", legs, self.path.len());
    }

    /// Steer toward the next waypoint, popping it once reached
    fn advance(&mut self, map: &mut StealthMap) -> Option<Waypoint> {
        let Some(next) = self.path.front().copied() else {
            map.set_alien_velocity(Vector::ZERO);
            return None;
        };
        let target = map.grid().cell_center(next.cell);
        steer(map, target, self.config.stalk_speed);
        if is_close(self.config.arrival_tolerance, map.alien_position(), target) {
            self.path.pop_front();
            return Some(next);
        }
        None
    }
}

fn steer(map: &mut StealthMap, target: Vector, speed: f64) {
    let direction = (target - map.alien_position()).normalize_or_zero();
    map.set_alien_velocity(direction * speed);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::sim::HidingKind;
    use crate::stealth::MapLayout;

    fn map_with(alien: Cell, extra_walls: &[Cell]) -> StealthMap {
        let mut layout = MapLayout::bordered(Cell::new(50, 50), alien);
        layout.walls.extend_from_slice(extra_walls);
        layout.hiding_spots.push((Cell::new(70, 70), HidingKind::Locker));
        StealthMap::new(&layout, 5)
    }

    fn blind() -> StalkerConfig {
        StalkerConfig {
            vision_radius: 0.0,
            ..StalkerConfig::default()
        }
    }

    #[test]
    fn test_chases_visible_player() {
        let mut map = map_with(Cell::new(50, 54), &[]);
        let mut stalker = Stalker::new(StalkerConfig::default(), 1);
        stalker.update(&mut map, SIM_DT);

        assert_eq!(stalker.state(), StalkerState::Chasing);
        assert_eq!(stalker.last_seen(), Some(Cell::new(50, 50)));
        let velocity = map.scene()[map.alien()].velocity();
        assert!(is_close(1e-9, velocity, Vector::new(-CHASE_SPEED, 0.0)));
    }

    #[test]
    fn test_wall_blocks_sight() {
        let wall: Vec<Cell> = (45..=55).map(|row| Cell::new(row, 52)).collect();
        let mut map = map_with(Cell::new(50, 54), &wall);
        let mut stalker = Stalker::new(StalkerConfig::default(), 1);
        stalker.update(&mut map, SIM_DT);

        assert_eq!(stalker.state(), StalkerState::Patrolling);
        assert!(stalker.path().count() > 0);
        assert!(stalker.path().all(|cell| map.grid().is_walkable(cell)));
    }

    #[test]
    fn test_lost_sight_investigates_last_sighting() {
        let mut map = map_with(Cell::new(50, 54), &[]);
        let mut stalker = Stalker::new(StalkerConfig::default(), 1);
        stalker.update(&mut map, SIM_DT);
        assert_eq!(stalker.state(), StalkerState::Chasing);

        let spot = map.hiding_spots()[0];
        assert!(map.hide_player(spot));
        stalker.update(&mut map, SIM_DT);

        assert_eq!(stalker.state(), StalkerState::Investigating);
        assert_eq!(stalker.path().last(), Some(Cell::new(50, 50)));

        // Walk there, then fall back to patrolling
        for _ in 0..600 {
            stalker.update(&mut map, SIM_DT);
            map.tick(SIM_DT);
            if stalker.state() != StalkerState::Investigating {
                break;
            }
        }
        assert_eq!(stalker.state(), StalkerState::Patrolling);
        assert_eq!(stalker.last_seen(), None);
        assert_eq!(map.alien_cell(), Some(Cell::new(50, 50)));
    }

    #[test]
    fn test_patrol_pauses_at_leg_ends() {
        let mut map = map_with(Cell::new(20, 20), &[]);
        let mut stalker = Stalker::new(blind(), 11);

        let start = map.alien_position();
        let mut waited = false;
        let mut resumed = false;
        for _ in 0..6000 {
            let before = stalker.state();
            stalker.update(&mut map, SIM_DT);
            map.tick(SIM_DT);
            match (before, stalker.state()) {
                (StalkerState::Patrolling, StalkerState::WaitingAtNode { .. }) => {
                    waited = true;
                    assert_eq!(map.scene()[map.alien()].velocity(), Vector::ZERO);
                }
                (StalkerState::WaitingAtNode { .. }, StalkerState::Patrolling) => resumed = true,
                _ => {}
            }
            assert_ne!(stalker.state(), StalkerState::Chasing);
            if waited && resumed {
                break;
            }
        }
        assert!(waited && resumed);
        assert!(map.alien_position().distance(start) > 10.0);
    }

    #[test]
    fn test_waiting_lasts_look_time() {
        let mut map = map_with(Cell::new(20, 20), &[]);
        let mut stalker = Stalker::new(blind(), 2);
        stalker.state = StalkerState::WaitingAtNode { waited: 0.0 };
        stalker.path.push_back(Waypoint {
            cell: Cell::new(20, 25),
            leg_end: true,
        });
        stalker.path.push_back(Waypoint {
            cell: Cell::new(20, 26),
            leg_end: true,
        });

        stalker.update(&mut map, 0.4);
        stalker.update(&mut map, 0.4);
        assert!(matches!(stalker.state(), StalkerState::WaitingAtNode { .. }));
        stalker.update(&mut map, 0.4);
        assert_eq!(stalker.state(), StalkerState::Patrolling);
        let velocity = map.scene()[map.alien()].velocity();
        assert!(is_close(1e-9, velocity, Vector::new(STALK_SPEED, 0.0)));
    }

    #[test]
    fn test_same_seed_same_patrol() {
        let plan = |seed: u64| -> Vec<Cell> {
            let mut map = map_with(Cell::new(20, 20), &[]);
            let mut stalker = Stalker::new(blind(), seed);
            stalker.update(&mut map, SIM_DT);
            stalker.path().collect()
        };
        assert_eq!(plan(77), plan(77));
    }

    #[test]
    fn test_config_from_settings() {
        let settings = SimSettings {
            chase_speed: 100.0,
            stalk_radius: 8,
            ..SimSettings::default()
        };
        let stalker = Stalker::from_settings(&settings);
        assert_eq!(stalker.config().chase_speed, 100.0);
        assert_eq!(stalker.config().stalk_radius, 8);
        assert_eq!(stalker.config().look_time, LOOK_TIME);
    }
}
