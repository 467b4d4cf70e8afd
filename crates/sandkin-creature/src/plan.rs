//! Body plans: the immutable template shared by every creature of a kind
//!
//! A plan fixes the segment chain (radii, masses, grip points), the joint
//! stiffness, the species (which selects the locomotion gait) and the diet.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use sandkin_simulation::ParseNameError;

use crate::physics::REST_FACTOR;

/// Creature species; each maps onto one locomotion gait
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Species {
    /// Long chain, lateral undulation
    #[default]
    Serpent,
    /// Short body, alternating tetrapod legs
    Spider,
    /// Wide body, alternating tetrapod legs
    Crab,
    /// Many legs, metachronal wave
    Centipede,
    /// Inchworm, peristaltic anchoring
    Crawler,
    /// Radial arms, peristaltic anchoring
    Starfish,
    /// Bell contraction swimmer
    Jellyfish,
    /// Tail-beat swimmer
    Manta,
    /// Flap-glide flyer
    Aerial,
    /// Traveling wave plus grip thrust
    Generic,
}

/// Locomotion algorithm applied during the gait phase of the physics step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gait {
    Undulate,
    Tetrapod,
    Metachronal,
    Peristaltic,
    Bell,
    TailBeat,
    FlapGlide,
    TravelingWave,
}

impl Species {
    pub fn all() -> &'static [Species] {
        &[
            Species::Serpent,
            Species::Spider,
            Species::Crab,
            Species::Centipede,
            Species::Crawler,
            Species::Starfish,
            Species::Jellyfish,
            Species::Manta,
            Species::Aerial,
            Species::Generic,
        ]
    }

    /// Human-readable name
    pub fn name(&self) -> &'static str {
        match self {
            Species::Serpent => "serpent",
            Species::Spider => "spider",
            Species::Crab => "crab",
            Species::Centipede => "centipede",
            Species::Crawler => "crawler",
            Species::Starfish => "starfish",
            Species::Jellyfish => "jellyfish",
            Species::Manta => "manta",
            Species::Aerial => "aerial",
            Species::Generic => "generic",
        }
    }

    pub fn gait(&self) -> Gait {
        match self {
            Species::Serpent => Gait::Undulate,
            Species::Spider | Species::Crab => Gait::Tetrapod,
            Species::Centipede => Gait::Metachronal,
            Species::Crawler | Species::Starfish => Gait::Peristaltic,
            Species::Jellyfish => Gait::Bell,
            Species::Manta => Gait::TailBeat,
            Species::Aerial => Gait::FlapGlide,
            Species::Generic => Gait::TravelingWave,
        }
    }

    /// Multiplier on gravity (aerial bodies nearly float)
    pub fn gravity_scale(&self) -> f32 {
        match self {
            Species::Aerial => 0.12,
            _ => 1.0,
        }
    }

    /// Fraction of gravity cancelled while a segment sits in water
    pub fn buoyancy(&self) -> f32 {
        match self {
            Species::Jellyfish | Species::Manta => 1.02,
            Species::Aerial => 0.9,
            _ => 0.6,
        }
    }

    pub fn is_swimmer(&self) -> bool {
        matches!(self, Species::Jellyfish | Species::Manta)
    }

    /// Preset body plan for this species
    pub fn plan(&self) -> BodyPlan {
        match self {
            Species::Serpent => BodyPlan::serpent(),
            Species::Spider => BodyPlan::spider(),
            Species::Crab => BodyPlan::crab(),
            Species::Centipede => BodyPlan::centipede(),
            Species::Crawler => BodyPlan::crawler(),
            Species::Starfish => BodyPlan::starfish(),
            Species::Jellyfish => BodyPlan::jellyfish(),
            Species::Manta => BodyPlan::manta(),
            Species::Aerial => BodyPlan::aerial(),
            Species::Generic => BodyPlan::generic(),
        }
    }
}

impl std::fmt::Display for Species {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Species {
    type Err = ParseNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "serpent" | "snake" => Ok(Species::Serpent),
            "spider" => Ok(Species::Spider),
            "crab" => Ok(Species::Crab),
            "centipede" => Ok(Species::Centipede),
            "crawler" | "worm" => Ok(Species::Crawler),
            "starfish" => Ok(Species::Starfish),
            "jellyfish" => Ok(Species::Jellyfish),
            "manta" | "swimmer" => Ok(Species::Manta),
            "aerial" | "flyer" => Ok(Species::Aerial),
            "generic" | "default" => Ok(Species::Generic),
            _ => {
                let valid: Vec<&str> = Species::all().iter().map(|s| s.name()).collect();
                Err(ParseNameError::new("species", s, &valid))
            }
        }
    }
}

/// What a creature can digest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Diet {
    #[default]
    Herbivore,
    Carnivore,
    Omnivore,
}

impl Diet {
    pub fn name(&self) -> &'static str {
        match self {
            Diet::Herbivore => "herbivore",
            Diet::Carnivore => "carnivore",
            Diet::Omnivore => "omnivore",
        }
    }

    /// Energy gained per food cell relative to a herbivore
    pub fn food_efficiency(&self) -> f32 {
        match self {
            Diet::Herbivore => 1.0,
            Diet::Omnivore => 0.7,
            Diet::Carnivore => 0.35,
        }
    }

    /// Largest prey mass, as a fraction of the hunter's own mass.
    /// `None` for diets that never hunt
    pub fn prey_mass_fraction(&self) -> Option<f32> {
        match self {
            Diet::Herbivore => None,
            Diet::Carnivore => Some(1.2),
            Diet::Omnivore => Some(0.8),
        }
    }
}

impl FromStr for Diet {
    type Err = ParseNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "herbivore" => Ok(Diet::Herbivore),
            "carnivore" => Ok(Diet::Carnivore),
            "omnivore" => Ok(Diet::Omnivore),
            _ => Err(ParseNameError::new(
                "diet",
                s,
                &["herbivore", "carnivore", "omnivore"],
            )),
        }
    }
}

/// Immutable segment-chain template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyPlan {
    pub name: String,
    pub species: Species,
    pub diet: Diet,
    /// Per-segment radius, head first
    pub radii: Vec<f32>,
    /// Per-segment mass, head first
    pub masses: Vec<f32>,
    /// Segment indices that act as ground-contact points
    pub grip_indices: Vec<usize>,
    /// Joint stiffness; clamped to [0.15, 0.85] by the constraint solver
    pub stiffness: f32,
    /// Base hue (0.0 - 1.0)
    pub hue: f32,
}

impl BodyPlan {
    /// Build a plan with tapering radii and masses
    #[allow(clippy::too_many_arguments)]
    pub fn tapered(
        species: Species,
        diet: Diet,
        segments: usize,
        head_radius: f32,
        tail_radius: f32,
        grip_indices: Vec<usize>,
        stiffness: f32,
        hue: f32,
    ) -> Self {
        let radii: Vec<f32> = (0..segments)
            .map(|i| {
                let t = if segments > 1 {
                    i as f32 / (segments - 1) as f32
                } else {
                    0.0
                };
                head_radius + (tail_radius - head_radius) * t
            })
            .collect();
        let masses = radii.iter().map(|r| r * r * 0.4).collect();
        let grip_indices = grip_indices.into_iter().filter(|&i| i < segments).collect();
        Self {
            name: species.name().to_string(),
            species,
            diet,
            radii,
            masses,
            grip_indices,
            stiffness,
            hue,
        }
    }

    pub fn segment_count(&self) -> usize {
        self.radii.len().min(self.masses.len())
    }

    pub fn is_grip(&self, index: usize) -> bool {
        self.grip_indices.contains(&index)
    }

    pub fn total_mass(&self) -> f32 {
        self.masses.iter().sum()
    }

    /// Rest distance between consecutive segments `a` and `b`
    pub fn rest_length(&self, a: usize, b: usize) -> f32 {
        (self.radii[a] + self.radii[b]) * REST_FACTOR
    }

    pub fn serpent() -> Self {
        Self::tapered(
            Species::Serpent,
            Diet::Herbivore,
            8,
            1.8,
            1.0,
            vec![1, 3, 5, 7],
            0.7,
            0.33,
        )
    }

    pub fn spider() -> Self {
        Self::tapered(
            Species::Spider,
            Diet::Carnivore,
            5,
            2.0,
            1.4,
            vec![1, 2, 3, 4],
            0.8,
            0.02,
        )
    }

    pub fn crab() -> Self {
        Self::tapered(
            Species::Crab,
            Diet::Omnivore,
            4,
            2.2,
            2.0,
            vec![0, 1, 2, 3],
            0.85,
            0.05,
        )
    }

    pub fn centipede() -> Self {
        Self::tapered(
            Species::Centipede,
            Diet::Herbivore,
            12,
            1.5,
            1.1,
            (1..12).collect(),
            0.75,
            0.12,
        )
    }

    pub fn crawler() -> Self {
        Self::tapered(
            Species::Crawler,
            Diet::Herbivore,
            6,
            1.6,
            1.6,
            vec![0, 5],
            0.5,
            0.25,
        )
    }

    pub fn starfish() -> Self {
        Self::tapered(
            Species::Starfish,
            Diet::Omnivore,
            5,
            1.7,
            1.7,
            vec![0, 2, 4],
            0.45,
            0.9,
        )
    }

    pub fn jellyfish() -> Self {
        Self::tapered(
            Species::Jellyfish,
            Diet::Carnivore,
            5,
            2.0,
            1.0,
            Vec::new(),
            0.3,
            0.8,
        )
    }

    pub fn manta() -> Self {
        Self::tapered(
            Species::Manta,
            Diet::Omnivore,
            6,
            2.4,
            0.9,
            Vec::new(),
            0.6,
            0.6,
        )
    }

    pub fn aerial() -> Self {
        Self::tapered(
            Species::Aerial,
            Diet::Herbivore,
            4,
            1.5,
            1.0,
            vec![3],
            0.8,
            0.15,
        )
    }

    pub fn generic() -> Self {
        Self::tapered(
            Species::Generic,
            Diet::Omnivore,
            5,
            1.8,
            1.3,
            vec![1, 3],
            0.6,
            0.45,
        )
    }
}

impl Default for BodyPlan {
    fn default() -> Self {
        Self::generic()
    }
}
