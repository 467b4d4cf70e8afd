//! Reactive materials: burning, phase changes, growth, acid, cloners, bombs and explosions

use sandkin_simulation::{CellType, MaterialType, WorldRng};

use super::grid::MAGMA_HEAT;
use super::Grid;

const NEIGHBORS: [(i32, i32); 4] = [(0, -1), (1, 0), (0, 1), (-1, 0)];

/// Lifespan lost by fire per tick
const FIRE_DECAY_MIN: f32 = 0.02;
const FIRE_DECAY_MAX: f32 = 0.06;
/// Chance a burnt-out fire leaves a puff of steam behind
const FIRE_SMOKE_CHANCE: f32 = 0.3;
const SMOKE_LIFE: f32 = 0.3;
const IGNITE_CHANCE: f32 = 0.3;
/// Flames linger next to their fuel instead of rising every tick
const FIRE_RISE_CHANCE: f32 = 0.3;
const QUENCH_CHANCE: f32 = 0.5;
const MELT_CHANCE: f32 = 0.1;

const STEAM_DECAY_MIN: f32 = 0.002;
const STEAM_DECAY_MAX: f32 = 0.006;
const GAS_DECAY_MIN: f32 = 0.0005;
const GAS_DECAY_MAX: f32 = 0.0015;
const GAS_MOBILITY: f32 = 0.5;

const ICE_MELT_HEAT: f32 = 0.3;
const SNOW_MELT_HEAT: f32 = 0.2;
const HEAT_SOURCE_MELT_CHANCE: f32 = 0.05;
const SALT_MELT_CHANCE: f32 = 0.01;

const SEED_GROWTH: f32 = 0.004;
const SEED_WATER_BOOST: f32 = 3.0;
/// Growth budget of a fresh sapling; each extension spends one unit
pub const WOOD_BUDGET: f32 = 10.5;
const WOOD_GROW_CHANCE: f32 = 0.04;
const BRANCH_CHANCE: f32 = 0.15;
const FRUIT_CHANCE: f32 = 0.3;

const VINE_GROW_CHANCE: f32 = 0.02;
const VINE_MIN_BUDGET: f32 = 0.2;
/// Fraction of a vine's budget handed to each new shoot
const VINE_CARRY: f32 = 0.8;

/// Chance per tick and per dissolvable neighbor of dissolving it, and of the acid using itself up
const ACID_RATE: f32 = 0.08;

const CLONE_CHANCE: f32 = 0.1;

const MAGMA_IGNITE_CHANCE: f32 = 0.05;
const MAGMA_COOL_CHANCE: f32 = 0.3;

const GUNPOWDER_IGNITE_CHANCE: f32 = 0.35;
pub const GUNPOWDER_BLAST_RADIUS: i32 = 4;
/// Ticks between a bomb touching heat and detonating
pub const BOMB_FUSE: f32 = 30.0;
/// Fuse given to bombs caught in another explosion
pub const BOMB_CHAIN_FUSE: f32 = 4.0;
pub const BOMB_BLAST_RADIUS: i32 = 8;
/// Fraction of the blast radius cleared to empty; the rest becomes fire
const BLAST_INNER_FRACTION: f32 = 0.6;

fn is_heat_source(cell: CellType) -> bool {
    matches!(cell, CellType::Fire | CellType::Magma)
}

impl Grid {
    fn has_neighbor(&self, x: i32, y: i32, pred: impl Fn(CellType) -> bool) -> bool {
        NEIGHBORS
            .iter()
            .any(|(dx, dy)| self.in_bounds(x + dx, y + dy) && pred(self.get(x + dx, y + dy)))
    }

    /// A random in-bounds empty 4-neighbor
    fn random_empty_neighbor(&mut self, x: i32, y: i32) -> Option<(i32, i32)> {
        let start = (self.rng.gen_f32() * 4.0) as usize;
        (0..4)
            .map(|k| NEIGHBORS[(start + k) % 4])
            .map(|(dx, dy)| (x + dx, y + dy))
            .find(|&(nx, ny)| self.in_bounds(nx, ny) && self.get(nx, ny) == CellType::Empty)
    }

    /// Count down a timer-type cell's lifespan; returns false once it has run out
    fn burn_down(&mut self, idx: usize, min: f32, max: f32) -> bool {
        self.heat[idx] -= self.rng.gen_range_f32(min, max);
        self.heat[idx] > 0.0
    }

    pub(super) fn update_fire(&mut self, x: i32, y: i32) {
        let Some(idx) = self.index(x, y) else {
            return;
        };

        for (dx, dy) in NEIGHBORS {
            let (nx, ny) = (x + dx, y + dy);
            if !self.in_bounds(nx, ny) {
                continue;
            }
            match self.get(nx, ny) {
                CellType::Water => {
                    if self.rng.check_probability(QUENCH_CHANCE) {
                        self.set(nx, ny, CellType::Steam);
                        self.place(idx, CellType::Empty, 0.0);
                        return;
                    }
                }
                CellType::Ice | CellType::Snow => {
                    if self.rng.check_probability(MELT_CHANCE) {
                        self.set(nx, ny, CellType::Water);
                    }
                }
                CellType::Gunpowder => {
                    if self.rng.check_probability(GUNPOWDER_IGNITE_CHANCE) {
                        self.explode(nx, ny, GUNPOWDER_BLAST_RADIUS);
                        return;
                    }
                }
                other => {
                    if self.materials.get(other).flammable
                        && self.rng.check_probability(IGNITE_CHANCE)
                    {
                        self.set(nx, ny, CellType::Fire);
                    }
                }
            }
        }

        if !self.burn_down(idx, FIRE_DECAY_MIN, FIRE_DECAY_MAX) {
            if self.rng.check_probability(FIRE_SMOKE_CHANCE) {
                self.place(idx, CellType::Steam, SMOKE_LIFE);
            } else {
                self.place(idx, CellType::Empty, 0.0);
            }
            return;
        }
        if self.rng.check_probability(FIRE_RISE_CHANCE) {
            self.update_rising(x, y);
        }
    }

    pub(super) fn update_steam(&mut self, x: i32, y: i32) {
        let Some(idx) = self.index(x, y) else {
            return;
        };
        if !self.burn_down(idx, STEAM_DECAY_MIN, STEAM_DECAY_MAX) {
            self.place(idx, CellType::Empty, 0.0);
            return;
        }
        self.update_rising(x, y);
    }

    pub(super) fn update_gas(&mut self, x: i32, y: i32) {
        let Some(idx) = self.index(x, y) else {
            return;
        };
        if !self.burn_down(idx, GAS_DECAY_MIN, GAS_DECAY_MAX) {
            self.place(idx, CellType::Empty, 0.0);
            return;
        }
        if self.rng.check_probability(GAS_MOBILITY) {
            self.update_rising(x, y);
        }
    }

    /// Ice melts next to fire or magma, or once its temperature climbs high enough
    pub(super) fn update_ice(&mut self, x: i32, y: i32) {
        let Some(idx) = self.index(x, y) else {
            return;
        };
        let temperature = self.heat[idx];
        if temperature > ICE_MELT_HEAT
            || (self.has_neighbor(x, y, is_heat_source)
                && self.rng.check_probability(HEAT_SOURCE_MELT_CHANCE))
        {
            self.place(idx, CellType::Water, temperature);
        }
    }

    pub(super) fn update_snow(&mut self, x: i32, y: i32) {
        let Some(idx) = self.index(x, y) else {
            return;
        };
        let temperature = self.heat[idx];
        if temperature > SNOW_MELT_HEAT
            || (self.has_neighbor(x, y, is_heat_source)
                && self.rng.check_probability(HEAT_SOURCE_MELT_CHANCE))
        {
            self.place(idx, CellType::Water, temperature);
            return;
        }
        self.update_granular(x, y);
    }

    /// Salt piles like sand and slowly melts ice it rests against
    pub(super) fn update_salt(&mut self, x: i32, y: i32) {
        if self.update_granular(x, y) {
            return;
        }
        for (dx, dy) in NEIGHBORS {
            let (nx, ny) = (x + dx, y + dy);
            if self.in_bounds(nx, ny)
                && self.get(nx, ny) == CellType::Ice
                && self.rng.check_probability(SALT_MELT_CHANCE)
            {
                let temperature = self.heat(nx, ny);
                self.set_with_heat(nx, ny, CellType::Water, temperature);
            }
        }
    }

    /// Seeds fall, then germinate on solid ground (faster next to water)
    pub(super) fn update_seed(&mut self, x: i32, y: i32) {
        if self.update_granular(x, y) {
            return;
        }
        let Some(idx) = self.index(x, y) else {
            return;
        };
        let below = self.get(x, y + 1);
        let rooted = matches!(
            self.materials.get(below).material_type,
            MaterialType::Solid | MaterialType::Powder
        ) && below != CellType::Seed;
        if !rooted {
            return;
        }

        let boost = if self.has_neighbor(x, y, |c| c == CellType::Water) {
            SEED_WATER_BOOST
        } else {
            1.0
        };
        self.heat[idx] += SEED_GROWTH * boost;
        if self.heat[idx] >= 1.0 {
            self.place(idx, CellType::Wood, 0.0);
            self.extra[idx] = WOOD_BUDGET;
        }
    }

    /// Growing tips extend upward; an exhausted tip may drop one fruit
    pub(super) fn update_wood(&mut self, x: i32, y: i32) {
        let Some(idx) = self.index(x, y) else {
            return;
        };
        let budget = self.extra[idx];
        if budget <= 0.0 {
            return;
        }
        if budget < 1.0 {
            if self.rng.check_probability(FRUIT_CHANCE) {
                if let Some((fx, fy)) = self.random_empty_neighbor(x, y) {
                    self.set(fx, fy, CellType::Food);
                }
            }
            self.extra[idx] = 0.0;
            return;
        }
        if !self.rng.check_probability(WOOD_GROW_CHANCE) {
            return;
        }

        let dx = (self.rng.gen_f32() * 3.0) as i32 - 1;
        let Some(target) = self.index(x + dx, y - 1) else {
            return;
        };
        if self.cells[target] != CellType::Empty {
            return;
        }
        let temperature = self.heat[idx];
        self.place(target, CellType::Wood, temperature);
        self.extra[target] = budget - 1.0;
        self.extra[idx] = if self.rng.check_probability(BRANCH_CHANCE) {
            budget * 0.5
        } else {
            0.0
        };
    }

    /// Vines creep into empty neighbors, each shoot carrying a shrinking budget
    pub(super) fn update_vine(&mut self, x: i32, y: i32) {
        let Some(idx) = self.index(x, y) else {
            return;
        };
        let budget = self.heat[idx];
        if budget < VINE_MIN_BUDGET || !self.rng.check_probability(VINE_GROW_CHANCE) {
            return;
        }
        if let Some((nx, ny)) = self.random_empty_neighbor(x, y) {
            self.set_with_heat(nx, ny, CellType::Vine, budget * VINE_CARRY);
        }
    }

    /// Acid eats dissolvable neighbors and uses itself up at the same rate
    pub(super) fn update_acid(&mut self, x: i32, y: i32) {
        let Some(idx) = self.index(x, y) else {
            return;
        };
        for (dx, dy) in NEIGHBORS {
            let (nx, ny) = (x + dx, y + dy);
            if !self.in_bounds(nx, ny) {
                continue;
            }
            let neighbor = self.get(nx, ny);
            if neighbor == CellType::Acid || !self.materials.get(neighbor).dissolvable {
                continue;
            }
            if self.rng.check_probability(ACID_RATE) {
                self.set(nx, ny, CellType::Empty);
            }
            if self.rng.check_probability(ACID_RATE) {
                self.place(idx, CellType::Empty, 0.0);
                return;
            }
        }
        self.update_acid_flow(x, y);
    }

    /// Magma keeps itself hot, boils water (sometimes cooling to rock) and ignites fuel
    pub(super) fn update_magma(&mut self, x: i32, y: i32) {
        let Some(idx) = self.index(x, y) else {
            return;
        };
        self.heat[idx] = MAGMA_HEAT;

        for (dx, dy) in NEIGHBORS {
            let (nx, ny) = (x + dx, y + dy);
            if !self.in_bounds(nx, ny) {
                continue;
            }
            match self.get(nx, ny) {
                CellType::Water => {
                    self.set(nx, ny, CellType::Steam);
                    if self.rng.check_probability(MAGMA_COOL_CHANCE) {
                        self.place(idx, CellType::Wall, MAGMA_HEAT);
                        return;
                    }
                }
                CellType::Gunpowder => {
                    if self.rng.check_probability(GUNPOWDER_IGNITE_CHANCE) {
                        self.explode(nx, ny, GUNPOWDER_BLAST_RADIUS);
                        return;
                    }
                }
                other => {
                    if self.materials.get(other).flammable
                        && self.rng.check_probability(MAGMA_IGNITE_CHANCE)
                    {
                        self.set(nx, ny, CellType::Fire);
                    }
                }
            }
        }
        self.update_slow_liquid(x, y);
    }

    /// Cloners remember the first material that touches them and copy it into empty neighbors
    pub(super) fn update_cloner(&mut self, x: i32, y: i32) {
        let Some(idx) = self.index(x, y) else {
            return;
        };
        let mut source = (self.extra[idx] as u8)
            .checked_sub(1)
            .and_then(CellType::from_u8);
        if source.is_none() {
            source = NEIGHBORS
                .iter()
                .filter(|(dx, dy)| self.in_bounds(x + dx, y + dy))
                .map(|(dx, dy)| self.get(x + dx, y + dy))
                .find(|c| !matches!(c, CellType::Empty | CellType::Cloner));
            if let Some(cell) = source {
                self.extra[idx] = (cell.as_u8() + 1) as f32;
            }
        }

        let Some(cell) = source else {
            return;
        };
        if self.rng.check_probability(CLONE_CHANCE) {
            if let Some((nx, ny)) = self.random_empty_neighbor(x, y) {
                self.set(nx, ny, cell);
            }
        }
    }

    /// Bombs arm next to heat and detonate when the fuse runs out
    pub(super) fn update_bomb(&mut self, x: i32, y: i32) {
        let Some(idx) = self.index(x, y) else {
            return;
        };
        if self.extra[idx] <= 0.0 {
            if self.has_neighbor(x, y, is_heat_source) {
                self.extra[idx] = BOMB_FUSE;
            }
            return;
        }
        self.extra[idx] -= 1.0;
        if self.extra[idx] <= 0.0 {
            self.explode(x, y, BOMB_BLAST_RADIUS);
        }
    }

    /// Arm a bomb, shortening a longer fuse that is already burning
    fn arm_bomb(&mut self, idx: usize, fuse: f32) {
        if self.extra[idx] <= 0.0 || self.extra[idx] > fuse {
            self.extra[idx] = fuse;
        }
    }

    /// Blast a disk: the inner part becomes empty, the outer ring fire.
    ///
    /// Blast-proof cells (wall, metal) are untouched and other bombs in range
    /// are armed with a short fuse instead of being destroyed.
    pub fn explode(&mut self, cx: i32, cy: i32, radius: i32) {
        let radius = radius.max(1);
        let r2 = radius * radius;
        let inner = radius as f32 * BLAST_INNER_FRACTION;
        self.explosions += 1;

        for dy in -radius..=radius {
            for dx in -radius..=radius {
                let d2 = dx * dx + dy * dy;
                if d2 > r2 {
                    continue;
                }
                let Some(idx) = self.index(cx + dx, cy + dy) else {
                    continue;
                };
                let cell = self.cells[idx];
                if self.materials.get(cell).blast_proof {
                    continue;
                }
                if cell == CellType::Bomb && d2 > 0 {
                    self.arm_bomb(idx, BOMB_CHAIN_FUSE);
                    continue;
                }
                if (d2 as f32).sqrt() <= inner {
                    self.place(idx, CellType::Empty, 0.0);
                } else {
                    let life = self.default_heat(CellType::Fire);
                    self.place(idx, CellType::Fire, life);
                }
            }
        }
        log::debug!("Explosion at ({cx}, {cy}), radius {radius}");
    }
}
