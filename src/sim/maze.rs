//! Perfect maze generation
//!
//! Randomized depth-first backtracking over the odd/odd interior lattice,
//! starting at `(1, 1)`. Each step carves the tile between two lattice
//! cells plus the target, so corridors are one tile wide, the outer border
//! stays solid and the carve graph is a spanning tree of the lattice.
//!
//! The entry `(0, 1)` is opened into `(1, 1)` and the player spawns there.
//! After the walk the exit row is forced open and the border tiles around
//! the entry are sealed. Connectivity from the entry is re-checked and
//! bridged if anything ended up stranded.

use std::collections::VecDeque;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::{EXIT_PATH_LEN, MAZE_CARVE_START, MAZE_ENTRY, MIN_MAZE_SIZE};
use crate::error::ArenaError;

/// Border tiles around the entry, sealed after generation, `(x, z)`
pub const SEALED_TILES: [(usize, usize); 3] = [(0, 0), (1, 0), (0, 2)];

/// Lattice steps: north, east, south, west
const LATTICE_STEPS: [(isize, isize); 4] = [(0, -2), (2, 0), (0, 2), (-2, 0)];

/// A single maze tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tile {
    Wall,
    Path,
}

/// Bookkeeping from the backtracking walk
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationStats {
    /// Individual tiles turned from Wall to Path by the walk, `(1, 1)` included
    pub carve_steps: usize,
    /// Path tiles when the walk finished (entry included)
    pub carved_tiles: usize,
    /// Deepest the backtracking stack got
    pub max_stack_depth: usize,
    /// Bridge tiles opened to restore connectivity after forcing
    pub repairs: usize,
}

/// Square maze grid, addressed `(x, z)`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MazeGrid {
    size: usize,
    seed: u64,
    tiles: Vec<Tile>,
    exit: (usize, usize),
    stats: GenerationStats,
}

impl MazeGrid {
    /// Generate a maze with forced exit/entry and verified connectivity
    pub fn generate(size: usize, seed: Option<u64>) -> Result<Self, ArenaError> {
        if size < MIN_MAZE_SIZE {
            return Err(ArenaError::MazeTooSmall {
                size,
                min: MIN_MAZE_SIZE,
            });
        }
        let seed = seed.unwrap_or_else(rand::random);
        let mut rng = Pcg32::seed_from_u64(seed);

        let mut grid = Self::carve(size, &mut rng);
        grid.seed = seed;
        grid.force_openings();
        grid.stats.repairs = grid.repair_connectivity();

        log::info!(
            "Generated {}x{} maze (seed {}): {} path tiles, {} repairs",
            size,
            size,
            seed,
            grid.path_count(),
            grid.stats.repairs
        );
        Ok(grid)
    }

    /// Run only the backtracking walk (no forcing, no repair)
    pub fn carve(size: usize, rng: &mut impl Rng) -> Self {
        let size = size.max(MIN_MAZE_SIZE);
        let mut grid = Self {
            size,
            seed: 0,
            tiles: vec![Tile::Wall; size * size],
            exit: Self::exit_for(size),
            stats: GenerationStats::default(),
        };

        let mut stack = Vec::with_capacity(size * size);
        grid.set(MAZE_ENTRY, Tile::Path);
        grid.set(MAZE_CARVE_START, Tile::Path);
        grid.stats.carve_steps = 1;
        stack.push(MAZE_CARVE_START);

        while let Some(&(x, z)) = stack.last() {
            grid.stats.max_stack_depth = grid.stats.max_stack_depth.max(stack.len());

            let mut options = [(0usize, 0usize); 4];
            let mut count = 0;
            for (dx, dz) in LATTICE_STEPS {
                if let Some(next) = grid.interior_offset((x, z), dx, dz) {
                    if grid.tile(next.0, next.1) == Tile::Wall {
                        options[count] = next;
                        count += 1;
                    }
                }
            }

            if count == 0 {
                stack.pop();
                continue;
            }

            let target = options[rng.random_range(0..count)];
            let between = ((x + target.0) / 2, (z + target.1) / 2);
            grid.set(between, Tile::Path);
            grid.set(target, Tile::Path);
            grid.stats.carve_steps += 2;
            stack.push(target);
        }

        grid.stats.carved_tiles = grid.path_count();
        grid
    }

    /// Exit cell on the east border, level with the last odd lattice row
    fn exit_for(size: usize) -> (usize, usize) {
        let z = if (size - 2) % 2 == 1 { size - 2 } else { size - 3 };
        (size - 1, z)
    }

    fn force_openings(&mut self) {
        let (ex, ez) = self.exit;
        for k in 0..EXIT_PATH_LEN.min(ex + 1) {
            self.set((ex - k, ez), Tile::Path);
        }
        for tile in SEALED_TILES {
            self.set(tile, Tile::Wall);
        }
    }

    /// Open single Wall tiles between the spawn region and stranded Path
    /// tiles until everything is reachable. Returns the number opened.
    fn repair_connectivity(&mut self) -> usize {
        let mut repairs = 0;
        loop {
            let reached = self.reachable_from(MAZE_ENTRY);
            let mut bridge = None;

            'search: for z in 0..self.size {
                for x in 0..self.size {
                    if self.tile(x, z) == Tile::Path || SEALED_TILES.contains(&(x, z)) {
                        continue;
                    }
                    let mut touches_reached = false;
                    let mut touches_stranded = false;
                    for (nx, nz) in self.neighbors(x, z) {
                        let idx = self.index(nx, nz);
                        if reached[idx] {
                            touches_reached = true;
                        } else if self.tiles[idx] == Tile::Path {
                            touches_stranded = true;
                        }
                    }
                    if touches_reached && touches_stranded {
                        bridge = Some((x, z));
                        break 'search;
                    }
                }
            }

            match bridge {
                Some(tile) => {
                    log::debug!("Bridging stranded maze region at {:?}", tile);
                    self.set(tile, Tile::Path);
                    repairs += 1;
                }
                None => break,
            }
        }

        let reached = self.reachable_from(MAZE_ENTRY);
        let stranded = self
            .tiles
            .iter()
            .zip(&reached)
            .filter(|(tile, seen)| **tile == Tile::Path && !**seen)
            .count();
        if stranded > 0 {
            log::warn!("{} maze tiles remain unreachable after repair", stranded);
        }
        repairs
    }

    /// Breadth-first flood fill over Path tiles
    pub fn reachable_from(&self, start: (usize, usize)) -> Vec<bool> {
        let mut visited = vec![false; self.tiles.len()];
        if !self.is_path(start.0 as isize, start.1 as isize) {
            return visited;
        }

        let mut queue = VecDeque::new();
        visited[self.index(start.0, start.1)] = true;
        queue.push_back(start);

        while let Some((x, z)) = queue.pop_front() {
            for (nx, nz) in self.neighbors(x, z) {
                let idx = self.index(nx, nz);
                if !visited[idx] && self.tiles[idx] == Tile::Path {
                    visited[idx] = true;
                    queue.push_back((nx, nz));
                }
            }
        }
        visited
    }

    /// Tiles from `start` to `goal` inclusive, both ends Path tiles
    pub fn shortest_path(
        &self,
        start: (usize, usize),
        goal: (usize, usize),
    ) -> Option<Vec<(usize, usize)>> {
        if !self.is_path(start.0 as isize, start.1 as isize) {
            return None;
        }
        let mut parent: Vec<Option<usize>> = vec![None; self.tiles.len()];
        let mut visited = vec![false; self.tiles.len()];
        let mut queue = VecDeque::new();
        visited[self.index(start.0, start.1)] = true;
        queue.push_back(start);

        while let Some((x, z)) = queue.pop_front() {
            if (x, z) == goal {
                let mut path = vec![goal];
                let mut idx = self.index(x, z);
                while let Some(prev) = parent[idx] {
                    path.push((prev % self.size, prev / self.size));
                    idx = prev;
                }
                path.reverse();
                return Some(path);
            }
            for (nx, nz) in self.neighbors(x, z) {
                let idx = self.index(nx, nz);
                if !visited[idx] && self.tiles[idx] == Tile::Path {
                    visited[idx] = true;
                    parent[idx] = Some(self.index(x, z));
                    queue.push_back((nx, nz));
                }
            }
        }
        None
    }

    /// In-grid 4-neighbours of a tile
    pub fn neighbors(&self, x: usize, z: usize) -> impl Iterator<Item = (usize, usize)> + '_ {
        [(0isize, -1isize), (1, 0), (0, 1), (-1, 0)]
            .into_iter()
            .filter_map(move |(dx, dz)| self.offset((x, z), dx, dz))
    }

    fn offset(&self, (x, z): (usize, usize), dx: isize, dz: isize) -> Option<(usize, usize)> {
        let nx = x.checked_add_signed(dx)?;
        let nz = z.checked_add_signed(dz)?;
        (nx < self.size && nz < self.size).then_some((nx, nz))
    }

    /// Like `offset`, but only lands inside `1..=size-2` on both axes
    fn interior_offset(&self, at: (usize, usize), dx: isize, dz: isize) -> Option<(usize, usize)> {
        self.offset(at, dx, dz)
            .filter(|&(nx, nz)| (1..self.size - 1).contains(&nx) && (1..self.size - 1).contains(&nz))
    }

    /// Whether a tile sits on the outer ring of the grid
    pub fn is_border(&self, x: usize, z: usize) -> bool {
        x == 0 || z == 0 || x == self.size - 1 || z == self.size - 1
    }

    #[inline]
    fn index(&self, x: usize, z: usize) -> usize {
        z * self.size + x
    }

    fn set(&mut self, (x, z): (usize, usize), tile: Tile) {
        let idx = self.index(x, z);
        self.tiles[idx] = tile;
    }

    /// Tile at `(x, z)`; panics outside the grid
    pub fn tile(&self, x: usize, z: usize) -> Tile {
        self.tiles[self.index(x, z)]
    }

    /// Whether a signed coordinate is an in-grid Path tile
    pub fn is_path(&self, x: isize, z: isize) -> bool {
        x >= 0
            && z >= 0
            && (x as usize) < self.size
            && (z as usize) < self.size
            && self.tile(x as usize, z as usize) == Tile::Path
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn stats(&self) -> GenerationStats {
        self.stats
    }

    /// The entry tile, where the player starts
    pub fn spawn(&self) -> (usize, usize) {
        MAZE_ENTRY
    }

    pub fn exit(&self) -> (usize, usize) {
        self.exit
    }

    pub fn path_count(&self) -> usize {
        self.tiles.iter().filter(|t| **t == Tile::Path).count()
    }

    /// Wall tiles in row-major order
    pub fn walls(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..self.size)
            .flat_map(move |z| (0..self.size).map(move |x| (x, z)))
            .filter(|&(x, z)| self.tile(x, z) == Tile::Wall)
    }

    /// Text dump: `#` wall, space path, `S` spawn, `E` exit
    pub fn to_ascii(&self) -> String {
        let mut out = String::with_capacity(self.size * (self.size + 1));
        for z in 0..self.size {
            for x in 0..self.size {
                let c = if (x, z) == MAZE_ENTRY {
                    'S'
                } else if (x, z) == self.exit {
                    'E'
                } else if self.tile(x, z) == Tile::Wall {
                    '#'
                } else {
                    ' '
                };
                out.push(c);
            }
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn assert_all_reachable(grid: &MazeGrid) {
        let reached = grid.reachable_from(grid.spawn());
        for z in 0..grid.size() {
            for x in 0..grid.size() {
                if grid.tile(x, z) == Tile::Path {
                    assert!(reached[z * grid.size() + x], "tile ({x}, {z}) unreachable");
                }
            }
        }
    }

    /// Undirected edges between horizontally/vertically adjacent Path tiles
    fn path_edges(grid: &MazeGrid) -> usize {
        let mut edges = 0;
        for z in 0..grid.size() {
            for x in 0..grid.size() {
                if grid.tile(x, z) != Tile::Path {
                    continue;
                }
                if x + 1 < grid.size() && grid.tile(x + 1, z) == Tile::Path {
                    edges += 1;
                }
                if z + 1 < grid.size() && grid.tile(x, z + 1) == Tile::Path {
                    edges += 1;
                }
            }
        }
        edges
    }

    #[test]
    fn test_rejects_small_sizes() {
        assert!(matches!(
            MazeGrid::generate(0, Some(1)),
            Err(ArenaError::MazeTooSmall { size: 0, min: 5 })
        ));
        assert!(MazeGrid::generate(4, Some(1)).is_err());
        assert!(MazeGrid::generate(5, Some(1)).is_ok());
    }

    #[test]
    fn test_entry_open_and_neighbours_sealed() {
        let mut rng = Pcg32::seed_from_u64(7);
        let walk = MazeGrid::carve(15, &mut rng);
        assert_eq!(walk.tile(0, 1), Tile::Path);
        assert_eq!(walk.tile(1, 1), Tile::Path);

        for seed in 0..32 {
            let grid = MazeGrid::generate(15, Some(seed)).unwrap();
            assert_eq!(grid.spawn(), (0, 1));
            assert_eq!(grid.tile(0, 1), Tile::Path);
            assert_eq!(grid.tile(1, 1), Tile::Path);
            for (x, z) in SEALED_TILES {
                assert_eq!(grid.tile(x, z), Tile::Wall, "({x}, {z}) open");
            }
            assert_eq!(grid.stats().repairs, 0);
        }
    }

    #[test]
    fn test_border_solid_except_entry_and_exit() {
        for size in [5, 6, 10, 15, 21] {
            for seed in 0..16 {
                let grid = MazeGrid::generate(size, Some(seed)).unwrap();
                for z in 0..size {
                    for x in 0..size {
                        if !grid.is_border(x, z) || (x, z) == grid.spawn() || (x, z) == grid.exit() {
                            continue;
                        }
                        assert_eq!(
                            grid.tile(x, z),
                            Tile::Wall,
                            "border ({x}, {z}) open in {size}x{size} seed {seed}"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_exit_path_open() {
        let grid = MazeGrid::generate(15, Some(3)).unwrap();
        assert_eq!(grid.exit(), (14, 13));
        for x in 12..15 {
            assert_eq!(grid.tile(x, 13), Tile::Path);
        }
        let even = MazeGrid::generate(10, Some(3)).unwrap();
        assert_eq!(even.exit(), (9, 7));
    }

    #[test]
    fn test_same_seed_same_maze() {
        let a = MazeGrid::generate(21, Some(42)).unwrap();
        let b = MazeGrid::generate(21, Some(42)).unwrap();
        assert_eq!(a.to_ascii(), b.to_ascii());
        assert_eq!(a.seed(), 42);
    }

    #[test]
    fn test_stack_depth_bounded() {
        let mut rng = Pcg32::seed_from_u64(11);
        let walk = MazeGrid::carve(31, &mut rng);
        let stats = walk.stats();
        assert!(stats.max_stack_depth >= 1);
        assert!(stats.max_stack_depth <= 31 * 31);
    }

    #[test]
    fn test_shortest_path_walks_adjacent_tiles() {
        let grid = MazeGrid::generate(21, Some(77)).unwrap();
        let path = grid.shortest_path(grid.spawn(), grid.exit()).unwrap();
        assert_eq!(path.first(), Some(&grid.spawn()));
        assert_eq!(path.last(), Some(&grid.exit()));
        for pair in path.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            assert_eq!(a.0.abs_diff(b.0) + a.1.abs_diff(b.1), 1);
            assert_eq!(grid.tile(b.0, b.1), Tile::Path);
        }
        assert!(grid.shortest_path((0, 0), grid.exit()).is_none());
    }

    #[test]
    fn test_ascii_marks_spawn_and_exit() {
        let grid = MazeGrid::generate(7, Some(5)).unwrap();
        let ascii = grid.to_ascii();
        assert_eq!(ascii.lines().count(), 7);
        assert_eq!(ascii.matches('S').count(), 1);
        assert_eq!(ascii.matches('E').count(), 1);
    }

    proptest! {
        #[test]
        fn prop_every_path_reachable(size in 5usize..32, seed in any::<u64>()) {
            let grid = MazeGrid::generate(size, Some(seed)).unwrap();
            assert_all_reachable(&grid);
        }

        #[test]
        fn prop_walk_is_a_tree(size in 5usize..32, seed in any::<u64>()) {
            let mut rng = Pcg32::seed_from_u64(seed);
            let walk = MazeGrid::carve(size, &mut rng);
            let stats = walk.stats();
            prop_assert_eq!(stats.carved_tiles, stats.carve_steps + 1);
            prop_assert_eq!(path_edges(&walk), stats.carved_tiles - 1);
            prop_assert!(walk.reachable_from(MAZE_ENTRY).iter().filter(|v| **v).count() == stats.carved_tiles);
        }

        #[test]
        fn prop_walk_stays_inside_border(size in 5usize..32, seed in any::<u64>()) {
            let mut rng = Pcg32::seed_from_u64(seed);
            let walk = MazeGrid::carve(size, &mut rng);
            for z in 0..size {
                for x in 0..size {
                    if walk.is_border(x, z) && (x, z) != MAZE_ENTRY {
                        prop_assert_eq!(walk.tile(x, z), Tile::Wall);
                    }
                }
            }
        }
    }
}
