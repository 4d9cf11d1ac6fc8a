// src/grid.rs
//
// Double-buffered cell store and the B3/S23 generation step.
//
// `front` is the generation everyone reads; `back` is scratch that only
// means anything inside `step`. A step writes the whole next generation
// into `back` from an unchanging `front`, then swaps the two vectors, so
// every cell's next state is a function of the same prior generation.

use rand::Rng;
use rayon::prelude::*;

/// Offsets of the eight Moore neighbours.
const NEIGHBOURS: [(i32, i32); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

pub struct Grid {
    width: i32,
    height: i32,
    front: Vec<bool>,
    back: Vec<bool>,
    alive: usize,
}

impl Grid {
    /// Allocates both buffers, all dead.
    pub fn new(width: i32, height: i32) -> Self {
        assert!(width > 0 && height > 0, "grid dimensions must be positive");
        let n = (width as usize) * (height as usize);
        Self {
            width,
            height,
            front: vec![false; n],
            back: vec![false; n],
            alive: 0,
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    /// Live cells in the current generation.
    pub fn alive(&self) -> usize {
        self.alive
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || x >= self.width || y < 0 || y >= self.height {
            None
        } else {
            Some((y * self.width + x) as usize)
        }
    }

    /// Out-of-range coordinates read as dead.
    #[inline]
    pub fn get(&self, x: i32, y: i32) -> bool {
        match self.index(x, y) {
            Some(i) => self.front[i],
            None => false,
        }
    }

    /// Writes one cell. Out-of-range coordinates are silently ignored.
    pub fn set(&mut self, x: i32, y: i32, alive: bool) {
        if let Some(i) = self.index(x, y) {
            if self.front[i] != alive {
                self.front[i] = alive;
                if alive {
                    self.alive += 1;
                } else {
                    self.alive -= 1;
                }
            }
        }
    }

    /// Kills every cell.
    pub fn init_empty(&mut self) {
        self.front.fill(false);
        self.alive = 0;
    }

    /// Fills the grid with an even coin flip per cell. Callers seed the rng;
    /// the controller seeds from the wall clock, so runs are not reproducible.
    pub fn init_random<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let mut alive = 0usize;
        for cell in &mut self.front {
            let v = rng.random::<bool>();
            *cell = v;
            alive += v as usize;
        }
        self.alive = alive;
    }

    /// Advances one generation. Neighbours outside the rectangle are dead;
    /// there is no wraparound. Full scan, row-parallel, O(1) buffer swap.
    pub fn step(&mut self) {
        let w = self.width as usize;
        let (width, height) = (self.width, self.height);
        let front = &self.front;

        self.alive = self
            .back
            .par_chunks_mut(w)
            .enumerate()
            .map(|(y, row)| {
                let y = y as i32;
                let mut live_in_row = 0usize;
                for x in 0..width {
                    let n = live_neighbours(front, width, height, x, y);
                    let alive = front[(y * width + x) as usize];
                    let next = n == 3 || (alive && n == 2);
                    row[x as usize] = next;
                    live_in_row += next as usize;
                }
                live_in_row
            })
            .sum();

        std::mem::swap(&mut self.front, &mut self.back);
    }
}

#[inline]
fn live_neighbours(cells: &[bool], width: i32, height: i32, x: i32, y: i32) -> u32 {
    let mut count = 0u32;
    for (dx, dy) in NEIGHBOURS {
        let nx = x + dx;
        let ny = y + dy;
        if nx < 0 || nx >= width || ny < 0 || ny >= height {
            continue;
        }
        count += cells[(ny * width + nx) as usize] as u32;
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn live_set(grid: &Grid) -> Vec<(i32, i32)> {
        let mut out = Vec::new();
        for y in 0..grid.height() {
            for x in 0..grid.width() {
                if grid.get(x, y) {
                    out.push((x, y));
                }
            }
        }
        out
    }

    fn recount(grid: &Grid) -> usize {
        live_set(grid).len()
    }

    #[test]
    fn empty_grid_stays_empty() {
        let mut grid = Grid::new(10, 10);
        for _ in 0..5 {
            grid.step();
            assert_eq!(grid.alive(), 0);
            assert!(live_set(&grid).is_empty());
        }
    }

    #[test]
    fn blinker_oscillates_with_period_two() {
        let mut grid = Grid::new(10, 10);
        grid.set(4, 5, true);
        grid.set(5, 5, true);
        grid.set(6, 5, true);
        assert_eq!(grid.alive(), 3);

        grid.step();
        assert_eq!(live_set(&grid), vec![(5, 4), (5, 5), (5, 6)]);
        assert_eq!(grid.alive(), 3);

        grid.step();
        assert_eq!(live_set(&grid), vec![(4, 5), (5, 5), (6, 5)]);
        assert_eq!(grid.alive(), 3);
    }

    #[test]
    fn block_is_a_still_life() {
        let mut grid = Grid::new(5, 5);
        for (x, y) in [(1, 1), (2, 1), (1, 2), (2, 2)] {
            grid.set(x, y, true);
        }
        for _ in 0..10 {
            grid.step();
            assert_eq!(live_set(&grid), vec![(1, 1), (2, 1), (1, 2), (2, 2)]);
            assert_eq!(grid.alive(), 4);
        }
    }

    #[test]
    fn glider_translates_by_one_one_every_four_steps() {
        let mut grid = Grid::new(20, 20);
        for (x, y) in [(1, 0), (2, 1), (0, 2), (1, 2), (2, 2)] {
            grid.set(x, y, true);
        }
        for _ in 0..4 {
            grid.step();
        }
        assert_eq!(
            live_set(&grid),
            vec![(2, 1), (3, 2), (1, 3), (2, 3), (3, 3)]
        );
    }

    #[test]
    fn lone_corner_cell_dies() {
        let mut grid = Grid::new(5, 5);
        grid.set(0, 0, true);
        grid.step();
        assert_eq!(grid.alive(), 0);
        assert!(live_set(&grid).is_empty());
    }

    #[test]
    fn boundary_neighbours_are_dead_not_wrapped() {
        // A blinker touching the left edge: (0,4),(0,5),(0,6). With dead
        // boundaries it flips to a horizontal triple at y=5; wraparound
        // would produce a different shape.
        let mut grid = Grid::new(8, 10);
        grid.set(0, 4, true);
        grid.set(0, 5, true);
        grid.set(0, 6, true);
        grid.step();
        assert_eq!(live_set(&grid), vec![(0, 5), (1, 5)]);
    }

    #[test]
    fn interior_cells_agree_with_a_padded_grid() {
        // Interior cells see identical neighbourhoods whether or not the
        // grid is padded by a dead ring, so one step must agree on them.
        let mut rng = StdRng::seed_from_u64(7);
        let mut small = Grid::new(10, 10);
        let mut padded = Grid::new(12, 12);
        for y in 0..10 {
            for x in 0..10 {
                let v = rng.random::<bool>();
                small.set(x, y, v);
                padded.set(x + 1, y + 1, v);
            }
        }

        small.step();
        padded.step();

        for y in 1..9 {
            for x in 1..9 {
                assert_eq!(
                    small.get(x, y),
                    padded.get(x + 1, y + 1),
                    "mismatch at ({x},{y})"
                );
            }
        }
    }

    #[test]
    fn out_of_range_access_is_silent() {
        let mut grid = Grid::new(4, 4);
        assert!(!grid.get(-1, 0));
        assert!(!grid.get(0, -1));
        assert!(!grid.get(4, 0));
        assert!(!grid.get(0, 4));

        grid.set(-1, 2, true);
        grid.set(2, -1, true);
        grid.set(4, 2, true);
        grid.set(2, 4, true);
        assert_eq!(grid.alive(), 0);
    }

    #[test]
    fn set_is_idempotent_and_invertible() {
        let mut grid = Grid::new(4, 4);
        grid.set(1, 1, true);
        grid.set(1, 1, true);
        assert_eq!(grid.alive(), 1);
        assert!(grid.get(1, 1));

        grid.set(1, 1, false);
        assert_eq!(grid.alive(), 0);
        assert!(!grid.get(1, 1));
    }

    #[test]
    fn init_empty_is_idempotent() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut grid = Grid::new(16, 16);
        grid.init_random(&mut rng);
        grid.init_empty();
        let once = live_set(&grid);
        grid.init_empty();
        assert_eq!(live_set(&grid), once);
        assert!(once.is_empty());
        assert_eq!(grid.alive(), 0);
    }

    #[test]
    fn alive_count_tracks_front_through_edits_and_steps() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut grid = Grid::new(24, 16);
        grid.init_random(&mut rng);
        assert_eq!(grid.alive(), recount(&grid));

        for i in 0..200 {
            let x = rng.random_range(-2..26);
            let y = rng.random_range(-2..18);
            grid.set(x, y, i % 3 != 0);
            assert_eq!(grid.alive(), recount(&grid));
        }

        for _ in 0..8 {
            grid.step();
            assert_eq!(grid.alive(), recount(&grid));
        }
    }

    #[test]
    fn random_init_populates_roughly_half() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut grid = Grid::new(64, 64);
        grid.init_random(&mut rng);
        let n = 64 * 64;
        assert_eq!(grid.alive(), recount(&grid));
        // Binomial(4096, 0.5) stays well inside this window.
        assert!(grid.alive() > n / 4 && grid.alive() < 3 * n / 4);
    }
}
