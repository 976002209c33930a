//! Deterministic RNG wrappers.
//!
//! # Streams
//!
//! A run has one master seed.  Every consumer draws from its own stream so
//! that, for example, adding a vaccination campaign does not perturb the
//! movement choices of the population:
//!
//!   stream seed = master XOR (stream_id * MIXING_CONSTANT)
//!   agent seed  = stream seed XOR (agent_id * MIXING_CONSTANT)
//!
//! The mixing constant is the 64-bit fractional part of the golden ratio,
//! which spreads consecutive ids uniformly across the seed space.  Re-seeding
//! every stream from the same master reproduces a run exactly; `reset` relies
//! on this.

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::AgentId;

/// Stream ids of the run's independent RNG streams.
pub mod stream {
    /// Population generation: homes, ages, workplaces, compliance draws.
    pub const POPULATION: u64 = 1;
    /// Per-individual movement families (`AgentRng`).
    pub const MOVEMENT: u64 = 2;
    /// Disease transitions, testing, tracing, vaccination order.
    pub const DISEASE: u64 = 3;
    /// Choice of the initially infected.
    pub const SEEDING: u64 = 4;
}

/// 64-bit fractional golden-ratio constant for seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

#[inline]
fn mix(seed: u64, id: u64) -> u64 {
    seed ^ id.wrapping_mul(MIXING_CONSTANT)
}

// ── AgentRng ──────────────────────────────────────────────────────────────────

/// Per-individual deterministic RNG, used for movement and room choices.
///
/// Stored in a `Vec<AgentRng>` parallel to the population so an individual
/// can be borrowed mutably alongside its own RNG.
#[derive(Clone, Debug)]
pub struct AgentRng(SmallRng);

impl AgentRng {
    /// Seed deterministically from a stream seed and an agent ID.
    pub fn new(stream_seed: u64, agent: AgentId) -> Self {
        AgentRng(SmallRng::seed_from_u64(mix(stream_seed, agent.0 as u64)))
    }

    /// Expose the inner `SmallRng` for use with `rand` distribution types.
    #[inline]
    pub fn inner(&mut self) -> &mut SmallRng {
        &mut self.0
    }

    /// Uniform `f64` in `[0, 1)`.
    #[inline]
    pub fn unit(&mut self) -> f64 {
        self.0.r#gen()
    }

    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }

    /// `true` with probability `p` (clamped to [0, 1]).
    #[inline]
    pub fn gen_bool(&mut self, p: f64) -> bool {
        self.0.gen_bool(p.clamp(0.0, 1.0))
    }

    /// Choose a random element; `None` for an empty slice.
    #[inline]
    pub fn choose<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        slice.choose(&mut self.0)
    }
}

// ── SimRng ────────────────────────────────────────────────────────────────────

/// Stream-level RNG for global operations (population generation, disease
/// transitions, vaccination order).
///
/// Only used from the single ticking thread.
#[derive(Clone, Debug)]
pub struct SimRng(SmallRng);

impl SimRng {
    pub fn new(seed: u64) -> Self {
        SimRng(SmallRng::seed_from_u64(seed))
    }

    /// The RNG for stream `stream_id` of the run seeded with `master`.
    pub fn stream(master: u64, stream_id: u64) -> Self {
        SimRng::new(mix(master, stream_id))
    }

    /// Seed for stream `stream_id`; used to build per-agent RNG families.
    pub fn stream_seed(master: u64, stream_id: u64) -> u64 {
        mix(master, stream_id)
    }

    #[inline]
    pub fn inner(&mut self) -> &mut SmallRng {
        &mut self.0
    }

    /// Uniform `f64` in `[0, 1)`.
    #[inline]
    pub fn unit(&mut self) -> f64 {
        self.0.r#gen()
    }

    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }

    #[inline]
    pub fn gen_bool(&mut self, p: f64) -> bool {
        self.0.gen_bool(p.clamp(0.0, 1.0))
    }

    #[inline]
    pub fn choose<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        slice.choose(&mut self.0)
    }

    /// `amount` distinct elements, in random order.
    pub fn sample<T: Copy>(&mut self, slice: &[T], amount: usize) -> Vec<T> {
        slice.choose_multiple(&mut self.0, amount).copied().collect()
    }
}
