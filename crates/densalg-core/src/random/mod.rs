//! Random value sources used to fill matrices.
//!
//! Provides a uniform and a Gaussian [`Randomizer`] backed by
//! [`rand`]'s `StdRng`. Both accept an explicit seed so generated matrices are
//! reproducible in tests; unseeded randomizers are seeded from the
//! thread-local generator.
//!
//! # Design
//!
//! - **Explicit state**: every randomizer owns its generator; there is no
//!   hidden global state beyond the seed drawn at construction.
//! - Distribution parameters are validated up front and rejected with
//!   [`AlgebraError::InvalidRange`].

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal, Uniform};

use crate::error::{AlgebraError, Result};

/// A source of `f64` samples drawn from a fixed distribution.
pub trait Randomizer {
    /// Draw the next sample.
    fn next_f64(&mut self) -> f64;

    /// Overwrite every element of `out` with a fresh sample.
    fn fill(&mut self, out: &mut [f64]) {
        for v in out {
            *v = self.next_f64();
        }
    }
}

// ---------------------------------------------------------------------------
// Uniform
// ---------------------------------------------------------------------------

/// Samples uniformly distributed in `[min, max)`.
///
/// # Examples
///
/// ```
/// use densalg_core::random::{Randomizer, UniformRandomizer};
///
/// let mut r = UniformRandomizer::with_seed(-1.0, 1.0, 42).unwrap();
/// let value = r.next_f64();
/// assert!((-1.0..1.0).contains(&value));
/// ```
#[derive(Debug, Clone)]
pub struct UniformRandomizer {
    rng: StdRng,
    dist: Uniform<f64>,
    min: f64,
    max: f64,
}

impl UniformRandomizer {
    /// Create a randomizer seeded from the thread-local generator.
    ///
    /// Returns an error if `min >= max`.
    pub fn new(min: f64, max: f64) -> Result<Self> {
        Self::from_std_rng(min, max, StdRng::from_rng(&mut rand::rng()))
    }

    /// Create a reproducible randomizer from a fixed seed.
    pub fn with_seed(min: f64, max: f64, seed: u64) -> Result<Self> {
        Self::from_std_rng(min, max, StdRng::seed_from_u64(seed))
    }

    fn from_std_rng(min: f64, max: f64, rng: StdRng) -> Result<Self> {
        let dist = uniform(min, max)?;
        Ok(Self {
            rng,
            dist,
            min,
            max,
        })
    }

    /// Lower bound (inclusive).
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Upper bound (exclusive).
    pub fn max(&self) -> f64 {
        self.max
    }
}

impl Randomizer for UniformRandomizer {
    #[inline]
    fn next_f64(&mut self) -> f64 {
        self.dist.sample(&mut self.rng)
    }
}

// ---------------------------------------------------------------------------
// Gaussian
// ---------------------------------------------------------------------------

/// Samples from a normal distribution `N(mean, standard_deviation²)`.
#[derive(Debug, Clone)]
pub struct GaussianRandomizer {
    rng: StdRng,
    dist: Normal<f64>,
}

impl GaussianRandomizer {
    /// Create a randomizer seeded from the thread-local generator.
    ///
    /// Returns an error if `standard_deviation` is negative or not finite.
    pub fn new(mean: f64, standard_deviation: f64) -> Result<Self> {
        Self::from_std_rng(
            mean,
            standard_deviation,
            StdRng::from_rng(&mut rand::rng()),
        )
    }

    /// Create a reproducible randomizer from a fixed seed.
    pub fn with_seed(mean: f64, standard_deviation: f64, seed: u64) -> Result<Self> {
        Self::from_std_rng(mean, standard_deviation, StdRng::seed_from_u64(seed))
    }

    fn from_std_rng(mean: f64, standard_deviation: f64, rng: StdRng) -> Result<Self> {
        let dist = normal(mean, standard_deviation)?;
        Ok(Self { rng, dist })
    }

    /// Mean of the distribution.
    pub fn mean(&self) -> f64 {
        self.dist.mean()
    }

    /// Standard deviation of the distribution.
    pub fn standard_deviation(&self) -> f64 {
        self.dist.std_dev()
    }
}

impl Randomizer for GaussianRandomizer {
    #[inline]
    fn next_f64(&mut self) -> f64 {
        self.dist.sample(&mut self.rng)
    }
}

// ---------------------------------------------------------------------------
// Free functions — fill a slice from a caller-supplied generator
// ---------------------------------------------------------------------------

/// Fill `out` with uniform samples in `[min, max)` drawn from `rng`.
pub fn fill_uniform<R: Rng + ?Sized>(out: &mut [f64], min: f64, max: f64, rng: &mut R) -> Result<()> {
    let dist = uniform(min, max)?;
    for v in out {
        *v = dist.sample(rng);
    }
    Ok(())
}

/// Fill `out` with Gaussian samples drawn from `rng`.
pub fn fill_gaussian<R: Rng + ?Sized>(
    out: &mut [f64],
    mean: f64,
    standard_deviation: f64,
    rng: &mut R,
) -> Result<()> {
    let dist = normal(mean, standard_deviation)?;
    for v in out {
        *v = dist.sample(rng);
    }
    Ok(())
}

fn uniform(min: f64, max: f64) -> Result<Uniform<f64>> {
    if min >= max {
        return Err(AlgebraError::InvalidRange {
            reason: "uniform sampling requires min < max",
        });
    }
    Uniform::new(min, max).map_err(|_| AlgebraError::InvalidRange {
        reason: "uniform bounds must be finite",
    })
}

fn normal(mean: f64, standard_deviation: f64) -> Result<Normal<f64>> {
    if standard_deviation < 0.0 {
        return Err(AlgebraError::InvalidRange {
            reason: "standard deviation must be non-negative",
        });
    }
    Normal::new(mean, standard_deviation).map_err(|_| AlgebraError::InvalidRange {
        reason: "gaussian parameters must be finite",
    })
}
