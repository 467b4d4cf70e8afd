//! Cell tags and grid constants
//!
//! Every grid cell stores exactly one byte: the discriminant of [`CellType`].

use crate::ParseNameError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default grid width in cells
pub const DEFAULT_GRID_WIDTH: usize = 320;

/// Default grid height in cells
pub const DEFAULT_GRID_HEIGHT: usize = 180;

/// Closed set of materials a cell can hold
#[repr(u8)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CellType {
    #[default]
    Empty = 0,
    Wall = 1,
    Water = 2,
    Sand = 3,
    Fire = 4,
    Food = 5,
    Oil = 6,
    Steam = 7,
    Powder = 8,
    Gunpowder = 9,
    Ice = 10,
    Snow = 11,
    Magma = 12,
    Gas = 13,
    Acid = 14,
    Seed = 15,
    Wood = 16,
    Vine = 17,
    Cloner = 18,
    Salt = 19,
    Metal = 20,
    Bomb = 21,
}

impl CellType {
    pub const COUNT: usize = 22;

    pub const ALL: [CellType; Self::COUNT] = [
        CellType::Empty,
        CellType::Wall,
        CellType::Water,
        CellType::Sand,
        CellType::Fire,
        CellType::Food,
        CellType::Oil,
        CellType::Steam,
        CellType::Powder,
        CellType::Gunpowder,
        CellType::Ice,
        CellType::Snow,
        CellType::Magma,
        CellType::Gas,
        CellType::Acid,
        CellType::Seed,
        CellType::Wood,
        CellType::Vine,
        CellType::Cloner,
        CellType::Salt,
        CellType::Metal,
        CellType::Bomb,
    ];

    /// Decode a stored byte; unknown values yield `None`
    pub fn from_u8(value: u8) -> Option<Self> {
        Self::ALL.get(value as usize).copied()
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            CellType::Empty => "empty",
            CellType::Wall => "wall",
            CellType::Water => "water",
            CellType::Sand => "sand",
            CellType::Fire => "fire",
            CellType::Food => "food",
            CellType::Oil => "oil",
            CellType::Steam => "steam",
            CellType::Powder => "powder",
            CellType::Gunpowder => "gunpowder",
            CellType::Ice => "ice",
            CellType::Snow => "snow",
            CellType::Magma => "magma",
            CellType::Gas => "gas",
            CellType::Acid => "acid",
            CellType::Seed => "seed",
            CellType::Wood => "wood",
            CellType::Vine => "vine",
            CellType::Cloner => "clone",
            CellType::Salt => "salt",
            CellType::Metal => "metal",
            CellType::Bomb => "bomb",
        }
    }

    pub fn is_empty(self) -> bool {
        self == CellType::Empty
    }
}

impl fmt::Display for CellType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CellType {
    type Err = ParseNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        if lower == "air" {
            return Ok(CellType::Empty);
        }
        Self::ALL
            .iter()
            .copied()
            .find(|cell| cell.name() == lower)
            .ok_or_else(|| {
                let valid: Vec<&str> = Self::ALL.iter().map(|c| c.name()).collect();
                ParseNameError::new("cell type", s, &valid)
            })
    }
}
