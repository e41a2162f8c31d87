//! Stealth-chase world
//!
//! Owns the scene, the navigation grid built from the same layout, and the
//! player's hiding state. The alien's brain lives in [`crate::ai`] and drives
//! this world through its public methods.

use std::f64::consts::FRAC_PI_4;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::consts::{ACTOR_MASS, ACTOR_RADIUS, CELL_SIZE, GRID_HEIGHT, GRID_WIDTH};
use crate::nav::{Cell, CellContent, NavGrid};
use crate::settings::SimSettings;
use crate::sim::{
    BodyId, BodyKind, HidingKind, Polygon, Rgb, RigidBody, Scene, find_collision,
};
use crate::Vector;

pub const WALL_COLOR: Rgb = Rgb::new(0, 0, 0);
pub const DOOR_COLOR: Rgb = Rgb::new(255, 255, 0);
pub const PLAYER_COLOR: Rgb = Rgb::new(248, 75, 8);
pub const ALIEN_COLOR: Rgb = Rgb::new(11, 253, 25);
/// Tint of an occupied hiding spot
pub const HIDDEN_COLOR: Rgb = Rgb::new(128, 15, 128);

pub fn hiding_spot_color(kind: HidingKind) -> Rgb {
    match kind {
        HidingKind::Locker => Rgb::new(0, 191, 255),
        HidingKind::Dumpster => Rgb::new(139, 69, 19),
    }
}

/// Horizontal wall runs: (row, first col, last col)
const HORIZONTAL_RUNS: [(usize, usize, usize); 14] = [
    (10, 10, 25),
    (10, 45, 65),
    (25, 75, 95),
    (30, 5, 20),
    (40, 20, 50),
    (45, 70, 85),
    (50, 5, 15),
    (60, 35, 55),
    (65, 60, 75),
    (65, 85, 95),
    (70, 5, 50),
    (75, 85, 95),
    (80, 5, 40),
    (95, 45, 60),
];

/// Vertical wall runs: (col, first row, last row)
const VERTICAL_RUNS: [(usize, usize, usize); 15] = [
    (20, 25, 60),
    (25, 85, 99),
    (30, 0, 30),
    (40, 0, 12),
    (45, 60, 70),
    (45, 80, 95),
    (60, 65, 95),
    (65, 10, 50),
    (70, 80, 95),
    (75, 65, 80),
    (80, 35, 40),
    (85, 0, 15),
    (85, 75, 90),
    (90, 85, 95),
    (95, 50, 65),
];

/// Static description of a stealth map on the standard grid
#[derive(Debug, Clone, PartialEq)]
pub struct MapLayout {
    pub walls: Vec<Cell>,
    /// Doors replace border walls at random rows, alternating left and right
    pub doors: usize,
    /// Hiding spots at fixed cells
    pub hiding_spots: Vec<(Cell, HidingKind)>,
    /// Additional hiding spots on random open cells, alternating kinds
    pub random_hiding_spots: usize,
    pub player_spawn: Cell,
    pub alien_spawn: Cell,
}

impl MapLayout {
    /// Border walls only, no doors or hiding spots
    pub fn bordered(player_spawn: Cell, alien_spawn: Cell) -> Self {
        let mut walls = Vec::new();
        for row in 0..GRID_HEIGHT {
            for col in 0..GRID_WIDTH {
                if row == 0 || col == 0 || row == GRID_HEIGHT - 1 || col == GRID_WIDTH - 1 {
                    walls.push(Cell::new(row, col));
                }
            }
        }
        Self {
            walls,
            doors: 0,
            hiding_spots: Vec::new(),
            random_hiding_spots: 0,
            player_spawn,
            alien_spawn,
        }
    }
}

impl Default for MapLayout {
    fn default() -> Self {
        let mut layout = Self::bordered(Cell::new(5, 5), Cell::new(50, 90));
        for (row, first, last) in HORIZONTAL_RUNS {
            layout.walls.extend((first..=last).map(|col| Cell::new(row, col)));
        }
        for (col, first, last) in VERTICAL_RUNS {
            layout.walls.extend((first..=last).map(|row| Cell::new(row, col)));
        }
        layout.doors = 2;
        layout.random_hiding_spots = 40;
        layout
    }
}

/// The stealth-chase world
#[derive(Debug)]
pub struct StealthMap {
    scene: Scene,
    grid: NavGrid,
    player: BodyId,
    alien: BodyId,
    walls: Vec<BodyId>,
    doors: Vec<BodyId>,
    hiding_spots: Vec<BodyId>,
    /// Spot the player is currently hiding in
    hiding: Option<BodyId>,
}

impl StealthMap {
    pub fn new(layout: &MapLayout, seed: u64) -> Self {
        let settings = SimSettings {
            seed,
            ..SimSettings::default()
        };
        Self::with_settings(layout, &settings)
    }

    /// Build the world. Panics if a spawn or fixed hiding spot is not open
    /// floor, or the layout asks for more doors or hiding spots than fit.
    pub fn with_settings(layout: &MapLayout, settings: &SimSettings) -> Self {
        let mut rng = Pcg32::seed_from_u64(settings.seed);
        let cells = layout_cells(layout, &mut rng);
        let grid = NavGrid::new(cells);

        let mut scene = Scene::with_max_dt(settings.max_dt);
        let mut walls = Vec::new();
        let mut doors = Vec::new();
        let mut hiding_spots = Vec::new();
        for row in 0..grid.height() {
            for col in 0..grid.width() {
                let cell = Cell::new(row, col);
                let (kind, color) = match grid.content(cell) {
                    CellContent::Open => continue,
                    CellContent::Wall => (BodyKind::Wall, WALL_COLOR),
                    CellContent::Door => (BodyKind::Door, DOOR_COLOR),
                    CellContent::HidingSpot(hk) => (BodyKind::HidingSpot(hk), hiding_spot_color(hk)),
                };
                let body = RigidBody::new(
                    Polygon::rectangle(grid.cell_center(cell), CELL_SIZE, CELL_SIZE),
                    f64::INFINITY,
                    color,
                )
                .with_kind(kind);
                let id = scene.add_body(body);
                match kind {
                    BodyKind::Wall => walls.push(id),
                    BodyKind::Door => doors.push(id),
                    _ => hiding_spots.push(id),
                }
            }
        }

        let player = scene.add_body(actor(grid.cell_center(layout.player_spawn), PLAYER_COLOR).with_kind(BodyKind::Player));
        let alien = scene.add_body(actor(grid.cell_center(layout.alien_spawn), ALIEN_COLOR).with_kind(BodyKind::Alien));

        // Closed doors stop the player like walls. Reflection is written, not
        // queued, so a hull straddling two cells bounces once.
        for &blocker in walls.iter().chain(&doors) {
            scene.add_reflect_collision(settings.default_elasticity, player, blocker);
        }

        log::info!(
            "Stealth map: {} walls, {} doors, {} hiding spots (seed {})",
            walls.len(),
            doors.len(),
            hiding_spots.len(),
            settings.seed
        );

        Self {
            scene,
            grid,
            player,
            alien,
            walls,
            doors,
            hiding_spots,
            hiding: None,
        }
    }

    #[inline]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Removing the player or alien through this is a precondition violation.
    #[inline]
    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    #[inline]
    pub fn grid(&self) -> &NavGrid {
        &self.grid
    }

    #[inline]
    pub fn player(&self) -> BodyId {
        self.player
    }

    #[inline]
    pub fn alien(&self) -> BodyId {
        self.alien
    }

    pub fn walls(&self) -> &[BodyId] {
        &self.walls
    }

    pub fn doors(&self) -> &[BodyId] {
        &self.doors
    }

    pub fn hiding_spots(&self) -> &[BodyId] {
        &self.hiding_spots
    }

    pub fn player_position(&self) -> Vector {
        self.scene[self.player].centroid()
    }

    pub fn alien_position(&self) -> Vector {
        self.scene[self.alien].centroid()
    }

    pub fn player_cell(&self) -> Option<Cell> {
        self.grid.cell_at(self.player_position())
    }

    pub fn alien_cell(&self) -> Option<Cell> {
        self.grid.cell_at(self.alien_position())
    }

    pub fn set_player_velocity(&mut self, velocity: Vector) {
        self.scene[self.player].set_velocity(velocity);
    }

    pub fn set_alien_velocity(&mut self, velocity: Vector) {
        self.scene[self.alien].set_velocity(velocity);
    }

    /// Hulls that block the alien's sight: walls, then hiding spots
    pub fn occluders(&self) -> impl Iterator<Item = &Polygon> {
        self.walls
            .iter()
            .chain(&self.hiding_spots)
            .filter_map(|id| self.scene.get(*id))
            .map(RigidBody::shape)
    }

    #[inline]
    pub fn is_hiding(&self) -> bool {
        self.hiding.is_some()
    }

    /// Spot the player is hiding in, if any
    #[inline]
    pub fn hiding_spot(&self) -> Option<BodyId> {
        self.hiding
    }

    /// First hiding spot the player overlaps
    pub fn touching_hiding_spot(&self) -> Option<BodyId> {
        let player = self.scene[self.player].shape();
        self.hiding_spots.iter().copied().find(|id| {
            self.scene
                .get(*id)
                .is_some_and(|spot| find_collision(player, spot.shape()).collided)
        })
    }

    /// Snap the player into `spot` and stop it
    ///
    /// False if already hiding or `spot` is not a hiding spot of this map.
    pub fn hide_player(&mut self, spot: BodyId) -> bool {
        if self.hiding.is_some() || !self.hiding_spots.contains(&spot) {
            return false;
        }
        let Some(center) = self.scene.get(spot).map(RigidBody::centroid) else {
            return false;
        };
        self.scene[spot].set_color(HIDDEN_COLOR);
        let player = &mut self.scene[self.player];
        player.set_centroid(center);
        player.set_velocity(Vector::ZERO);
        self.hiding = Some(spot);
        log::debug!("Player hiding at {:?}", center);
        true
    }

    /// Leave the hiding spot once the player has moved more than a cell away
    /// from it on either axis. True if the player stopped hiding.
    pub fn unhide_player(&mut self) -> bool {
        let Some(spot) = self.hiding else {
            return false;
        };
        let Some(body) = self.scene.get(spot) else {
            self.hiding = None;
            return true;
        };
        let offset = (self.player_position() - body.centroid()).abs();
        if offset.x <= CELL_SIZE && offset.y <= CELL_SIZE {
            return false;
        }

        if let BodyKind::HidingSpot(kind) = body.kind() {
            self.scene[spot].set_color(hiding_spot_color(kind));
        }
        self.hiding = None;
        log::debug!("Player left hiding spot");
        true
    }

    /// Alien and player hulls overlap
    pub fn player_caught(&self) -> bool {
        find_collision(self.scene[self.player].shape(), self.scene[self.alien].shape()).collided
    }

    pub fn tick(&mut self, dt: f64) {
        if self.is_hiding() {
            self.unhide_player();
        }
        self.scene.tick(dt);
    }
}

/// Axis-aligned square actor of circumradius `ACTOR_RADIUS`
fn actor(center: Vector, color: Rgb) -> RigidBody {
    RigidBody::new(Polygon::regular(center, ACTOR_RADIUS, 4, FRAC_PI_4), ACTOR_MASS, color)
}

fn layout_cells(layout: &MapLayout, rng: &mut Pcg32) -> Vec<CellContent> {
    let idx = |cell: Cell| cell.row * GRID_WIDTH + cell.col;
    let mut cells = vec![CellContent::Open; GRID_WIDTH * GRID_HEIGHT];

    for wall in &layout.walls {
        assert!(
            wall.row < GRID_HEIGHT && wall.col < GRID_WIDTH,
            "wall {wall:?} outside grid"
        );
        cells[idx(*wall)] = CellContent::Wall;
    }

    // Each side holds at most one door per interior row
    assert!(
        layout.doors.div_ceil(2) <= GRID_HEIGHT - 2,
        "{} doors requested but each side fits {}",
        layout.doors,
        GRID_HEIGHT - 2
    );
    for door in 0..layout.doors {
        let col = if door % 2 == 0 { 0 } else { GRID_WIDTH - 1 };
        let cell = loop {
            let cell = Cell::new(rng.random_range(1..GRID_HEIGHT - 1), col);
            if cells[idx(cell)] != CellContent::Door {
                break cell;
            }
        };
        cells[idx(cell)] = CellContent::Door;
    }

    for spawn in [layout.player_spawn, layout.alien_spawn] {
        assert!(
            spawn.row < GRID_HEIGHT && spawn.col < GRID_WIDTH && cells[idx(spawn)] == CellContent::Open,
            "spawn {spawn:?} is not open floor"
        );
    }
    let spawns = [idx(layout.player_spawn), idx(layout.alien_spawn)];

    for (cell, kind) in &layout.hiding_spots {
        assert!(
            cell.row < GRID_HEIGHT
                && cell.col < GRID_WIDTH
                && cells[idx(*cell)] == CellContent::Open
                && !spawns.contains(&idx(*cell)),
            "hiding spot {cell:?} is not free open floor"
        );
        cells[idx(*cell)] = CellContent::HidingSpot(*kind);
    }

    let free = cells
        .iter()
        .enumerate()
        .filter(|(i, c)| **c == CellContent::Open && !spawns.contains(i))
        .count();
    assert!(
        layout.random_hiding_spots <= free,
        "{} hiding spots requested but only {} open cells",
        layout.random_hiding_spots,
        free
    );

    let mut placed = 0;
    while placed < layout.random_hiding_spots {
        let cell = Cell::new(
            rng.random_range(1..GRID_HEIGHT - 1),
            rng.random_range(1..GRID_WIDTH - 1),
        );
        let i = idx(cell);
        if cells[i] != CellContent::Open || spawns.contains(&i) {
            continue;
        }
        let kind = if placed % 2 == 0 {
            HidingKind::Locker
        } else {
            HidingKind::Dumpster
        };
        cells[i] = CellContent::HidingSpot(kind);
        placed += 1;
    }

    cells
}
