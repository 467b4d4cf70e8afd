//! Material definitions and registry

use crate::CellType;
use serde::{Deserialize, Serialize};

/// How a material behaves physically
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MaterialType {
    /// Nothing there
    Empty,
    /// Doesn't move (wall, wood, metal)
    Solid,
    /// Falls, piles up (sand, snow, salt)
    Powder,
    /// Flows, seeks level (water, oil, magma)
    Liquid,
    /// Rises, disperses (fire, steam, gas)
    Gas,
}

/// Definition of a material's properties
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MaterialDef {
    pub cell: CellType,
    pub name: String,
    pub material_type: MaterialType,

    /// Base color (RGBA)
    pub color: [u8; 4],

    /// Relative density - heavier movers sink through lighter fluids
    pub density: f32,

    /// Heat conductivity (0.0 - 1.0), scales the diffusion step
    pub conductivity: f32,

    /// `heat` holds a lifespan or growth budget instead of a temperature
    pub heat_is_timer: bool,

    /// Catches fire next to flames
    pub flammable: bool,
    /// Detonates (or arms) next to flames
    pub explosive: bool,
    /// Survives explosions untouched
    pub blast_proof: bool,
    /// Eaten away by acid
    pub dissolvable: bool,
    /// Drains creature energy on contact
    pub hazardous: bool,
    /// Creatures collide with it and can stand on it
    pub supports_creatures: bool,
}

impl Default for MaterialDef {
    fn default() -> Self {
        Self {
            cell: CellType::Empty,
            name: "unknown".to_string(),
            material_type: MaterialType::Solid,
            color: [255, 0, 255, 255], // Magenta for missing materials
            density: 1.0,
            conductivity: 0.3,
            heat_is_timer: false,
            flammable: false,
            explosive: false,
            blast_proof: false,
            dissolvable: false,
            hazardous: false,
            supports_creatures: false,
        }
    }
}

/// Registry of all materials, indexed by cell tag
pub struct Materials {
    materials: Vec<MaterialDef>,
}

impl Materials {
    pub fn new() -> Self {
        let mut materials = Self {
            materials: vec![MaterialDef::default(); CellType::COUNT],
        };
        materials.register_defaults();
        materials
    }

    fn register_defaults(&mut self) {
        self.register(MaterialDef {
            cell: CellType::Empty,
            name: "empty".to_string(),
            material_type: MaterialType::Empty,
            color: [12, 12, 18, 255],
            density: 0.0,
            conductivity: 0.0,
            heat_is_timer: true,
            ..Default::default()
        });

        self.register(MaterialDef {
            cell: CellType::Wall,
            name: "wall".to_string(),
            material_type: MaterialType::Solid,
            color: [112, 112, 120, 255],
            density: 10.0,
            conductivity: 0.3,
            blast_proof: true,
            dissolvable: true,
            supports_creatures: true,
            ..Default::default()
        });

        self.register(MaterialDef {
            cell: CellType::Water,
            name: "water".to_string(),
            material_type: MaterialType::Liquid,
            color: [48, 110, 220, 255],
            density: 1.0,
            conductivity: 0.5,
            ..Default::default()
        });

        self.register(MaterialDef {
            cell: CellType::Sand,
            name: "sand".to_string(),
            material_type: MaterialType::Powder,
            color: [214, 190, 120, 255],
            density: 1.6,
            conductivity: 0.2,
            dissolvable: true,
            supports_creatures: true,
            ..Default::default()
        });

        self.register(MaterialDef {
            cell: CellType::Fire,
            name: "fire".to_string(),
            material_type: MaterialType::Gas,
            color: [255, 110, 30, 255],
            density: 0.01,
            conductivity: 0.0,
            heat_is_timer: true,
            hazardous: true,
            ..Default::default()
        });

        self.register(MaterialDef {
            cell: CellType::Food,
            name: "food".to_string(),
            material_type: MaterialType::Powder,
            color: [120, 210, 70, 255],
            density: 1.1,
            conductivity: 0.2,
            flammable: true,
            ..Default::default()
        });

        self.register(MaterialDef {
            cell: CellType::Oil,
            name: "oil".to_string(),
            material_type: MaterialType::Liquid,
            color: [70, 52, 30, 255],
            density: 0.8,
            conductivity: 0.3,
            flammable: true,
            ..Default::default()
        });

        self.register(MaterialDef {
            cell: CellType::Steam,
            name: "steam".to_string(),
            material_type: MaterialType::Gas,
            color: [200, 205, 215, 255],
            density: 0.02,
            conductivity: 0.0,
            heat_is_timer: true,
            ..Default::default()
        });

        self.register(MaterialDef {
            cell: CellType::Powder,
            name: "powder".to_string(),
            material_type: MaterialType::Powder,
            color: [230, 225, 210, 255],
            density: 1.3,
            conductivity: 0.2,
            flammable: true,
            supports_creatures: true,
            ..Default::default()
        });

        self.register(MaterialDef {
            cell: CellType::Gunpowder,
            name: "gunpowder".to_string(),
            material_type: MaterialType::Powder,
            color: [60, 60, 66, 255],
            density: 1.4,
            conductivity: 0.2,
            explosive: true,
            supports_creatures: true,
            ..Default::default()
        });

        self.register(MaterialDef {
            cell: CellType::Ice,
            name: "ice".to_string(),
            material_type: MaterialType::Solid,
            color: [170, 220, 245, 255],
            density: 0.9,
            conductivity: 0.6,
            dissolvable: true,
            supports_creatures: true,
            ..Default::default()
        });

        self.register(MaterialDef {
            cell: CellType::Snow,
            name: "snow".to_string(),
            material_type: MaterialType::Powder,
            color: [240, 245, 250, 255],
            density: 0.9,
            conductivity: 0.4,
            supports_creatures: true,
            ..Default::default()
        });

        self.register(MaterialDef {
            cell: CellType::Magma,
            name: "magma".to_string(),
            material_type: MaterialType::Liquid,
            color: [240, 80, 20, 255],
            density: 2.5,
            conductivity: 0.4,
            hazardous: true,
            ..Default::default()
        });

        self.register(MaterialDef {
            cell: CellType::Gas,
            name: "gas".to_string(),
            material_type: MaterialType::Gas,
            color: [150, 170, 90, 255],
            density: 0.03,
            conductivity: 0.0,
            heat_is_timer: true,
            flammable: true,
            ..Default::default()
        });

        self.register(MaterialDef {
            cell: CellType::Acid,
            name: "acid".to_string(),
            material_type: MaterialType::Liquid,
            color: [150, 250, 60, 255],
            density: 1.2,
            conductivity: 0.3,
            hazardous: true,
            ..Default::default()
        });

        self.register(MaterialDef {
            cell: CellType::Seed,
            name: "seed".to_string(),
            material_type: MaterialType::Powder,
            color: [170, 120, 60, 255],
            density: 1.2,
            conductivity: 0.0,
            heat_is_timer: true,
            flammable: true,
            supports_creatures: true,
            ..Default::default()
        });

        self.register(MaterialDef {
            cell: CellType::Wood,
            name: "wood".to_string(),
            material_type: MaterialType::Solid,
            color: [120, 80, 40, 255],
            density: 0.7,
            conductivity: 0.15,
            flammable: true,
            dissolvable: true,
            supports_creatures: true,
            ..Default::default()
        });

        self.register(MaterialDef {
            cell: CellType::Vine,
            name: "vine".to_string(),
            material_type: MaterialType::Solid,
            color: [40, 150, 60, 255],
            density: 0.6,
            conductivity: 0.0,
            heat_is_timer: true,
            flammable: true,
            dissolvable: true,
            supports_creatures: true,
            ..Default::default()
        });

        self.register(MaterialDef {
            cell: CellType::Cloner,
            name: "clone".to_string(),
            material_type: MaterialType::Solid,
            color: [200, 180, 40, 255],
            density: 10.0,
            conductivity: 0.3,
            supports_creatures: true,
            ..Default::default()
        });

        self.register(MaterialDef {
            cell: CellType::Salt,
            name: "salt".to_string(),
            material_type: MaterialType::Powder,
            color: [235, 235, 240, 255],
            density: 2.1,
            conductivity: 0.3,
            supports_creatures: true,
            ..Default::default()
        });

        self.register(MaterialDef {
            cell: CellType::Metal,
            name: "metal".to_string(),
            material_type: MaterialType::Solid,
            color: [160, 165, 175, 255],
            density: 7.8,
            conductivity: 0.9,
            blast_proof: true,
            dissolvable: true,
            supports_creatures: true,
            ..Default::default()
        });

        self.register(MaterialDef {
            cell: CellType::Bomb,
            name: "bomb".to_string(),
            material_type: MaterialType::Solid,
            color: [180, 30, 40, 255],
            density: 3.0,
            conductivity: 0.4,
            explosive: true,
            supports_creatures: true,
            ..Default::default()
        });
    }

    fn register(&mut self, material: MaterialDef) {
        let index = material.cell.as_u8() as usize;
        self.materials[index] = material;
    }

    /// Get material definition by cell tag
    pub fn get(&self, cell: CellType) -> &MaterialDef {
        &self.materials[cell.as_u8() as usize]
    }

    /// Get color for a material
    pub fn get_color(&self, cell: CellType) -> [u8; 4] {
        self.get(cell).color
    }

    /// Whether `mover` may swap into a cell holding `target`.
    ///
    /// Anything moves into empty space; otherwise only fluids (liquid or gas)
    /// can be displaced, and only by something denser.
    pub fn can_displace(&self, mover: CellType, target: CellType) -> bool {
        if target == CellType::Empty {
            return true;
        }
        let target_def = self.get(target);
        matches!(
            target_def.material_type,
            MaterialType::Liquid | MaterialType::Gas
        ) && self.get(mover).density > target_def.density
    }
}

impl Default for Materials {
    fn default() -> Self {
        Self::new()
    }
}
