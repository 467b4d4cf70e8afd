//! RNG trait abstraction for the simulation
//!
//! Grid rules, creature spawning and the trainer all draw randomness through
//! [`WorldRng`], so any seeded `rand::Rng` can drive a reproducible run.

/// Random number generator trait for the simulation
pub trait WorldRng {
    /// Generate random boolean with 50% probability
    fn coin_flip(&mut self) -> bool;

    /// Generate random f32 in [0.0, 1.0)
    fn gen_f32(&mut self) -> f32;

    /// Check if random value is less than probability threshold
    fn check_probability(&mut self, probability: f32) -> bool {
        self.gen_f32() < probability
    }

    /// Uniform f32 in [min, max)
    fn gen_range_f32(&mut self, min: f32, max: f32) -> f32 {
        min + (max - min) * self.gen_f32()
    }

    /// -1 or 1 with equal probability
    fn gen_sign(&mut self) -> i32 {
        if self.coin_flip() {
            1
        } else {
            -1
        }
    }

    /// Standard normal sample (Box-Muller)
    fn gen_gaussian(&mut self) -> f32 {
        let u1 = self.gen_f32().clamp(f32::MIN_POSITIVE, 1.0);
        let u2 = self.gen_f32();
        (-2.0 * u1.ln()).sqrt() * (std::f32::consts::TAU * u2).cos()
    }
}

// Blanket implementation for any type implementing rand::Rng
impl<T: ?Sized + rand::Rng> WorldRng for T {
    fn coin_flip(&mut self) -> bool {
        rand::Rng::r#gen(self)
    }

    fn gen_f32(&mut self) -> f32 {
        rand::Rng::r#gen(self)
    }
}
