use log::{debug, error, info, trace, warn};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

use crate::bdz::Bdz;
use crate::chm::Chm;
use crate::error::{AttemptError, ConfigError, MphError};
use crate::graph::Hypergraph;
use crate::hash::{KeyHasher, MAX_HASH_SIZE, Xxh3Hasher};
use crate::peel::OutputOrder;

/// Smallest load factor accepted for 2-graphs.
pub const MIN_LOAD_FACTOR_2: f64 = 2.0;
/// Smallest load factor accepted for 3-hypergraphs.
pub const MIN_LOAD_FACTOR_3: f64 = 1.24;
/// Extra 3-hypergraph vertices per `sqrt(n)`; small sets sit far below the asymptotic threshold.
const SLACK_3: f64 = 2.0;

/// Build parameters.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Vertices per edge (2 or 3). BDZ only accepts 3.
    pub arity: usize,
    /// Vertex ratio v/n. `None` picks the minimum for `arity`.
    /// Near 2.0, 2-graphs are rarely acyclic; 2.1 or more keeps retries low.
    pub load_factor: Option<f64>,
    /// Width of the hash vector requested per key; must be at least `arity`.
    pub hash_size: usize,
    /// Base salt. Attempt seeds are drawn from an RNG seeded with it.
    pub salt: u64,
    /// How many seeds to try before giving up.
    /// At c = 1.24 only one 3-hypergraph in 10 to 20 is free of self-collisions and
    /// peelable, so the default leaves a wide margin.
    pub max_attempts: u32,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            arity: 3,
            load_factor: None,
            hash_size: 3,
            salt: 0xC0FF_EE00_D15E_A5E,
            max_attempts: 256,
        }
    }
}

impl BuildConfig {
    /// Minimum load factor for an arity, if the arity is supported.
    pub fn min_load_factor(arity: usize) -> Option<f64> {
        match arity {
            2 => Some(MIN_LOAD_FACTOR_2),
            3 => Some(MIN_LOAD_FACTOR_3),
            _ => None,
        }
    }

    /// Check the parameters against `n` keys and return the vertex count.
    ///
    /// `v` is one more than `floor(c * n)`, so it always lies strictly above
    /// the exact ratio. 3-hypergraphs get `ceil(2 * sqrt(n))` more, and no graph
    /// has fewer than `r + 1` vertices.
    pub fn validate(&self, n: usize) -> Result<u32, ConfigError> {
        let r = self.arity;
        let min = Self::min_load_factor(r).ok_or(ConfigError::UnsupportedArity(r))?;
        let c = self.load_factor.unwrap_or(min);
        if c.is_nan() || c < min {
            return Err(ConfigError::LoadFactorTooSmall { c, min, r });
        }
        if self.hash_size < r {
            return Err(ConfigError::HashSizeTooSmall {
                hash_size: self.hash_size,
                r,
            });
        }
        if self.hash_size > MAX_HASH_SIZE {
            return Err(ConfigError::HashSizeTooLarge {
                hash_size: self.hash_size,
                max: MAX_HASH_SIZE,
            });
        }
        if n == 0 {
            return Err(ConfigError::EmptyKeySet);
        }
        let slack = if r == 3 {
            (SLACK_3 * (n as f64).sqrt()).ceil()
        } else {
            0.0
        };
        let v = ((c * n as f64).floor() + 1.0 + slack).max((r + 1) as f64);
        if v >= f64::from(u32::MAX) {
            return Err(ConfigError::TooManyKeys { n });
        }
        Ok(v as u32)
    }
}

pub struct Builder<H = Xxh3Hasher> {
    cfg: BuildConfig,
    hasher: H,
}

impl Builder {
    pub fn new() -> Self {
        Self {
            cfg: BuildConfig::default(),
            hasher: Xxh3Hasher,
        }
    }
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: KeyHasher> Builder<H> {
    pub fn with_config(mut self, cfg: BuildConfig) -> Self {
        self.cfg = cfg;
        self
    }

    pub fn with_hasher<H2: KeyHasher>(self, hasher: H2) -> Builder<H2> {
        Builder {
            cfg: self.cfg,
            hasher,
        }
    }

    /// Build a CHM function over **unique** keys.
    pub fn build_chm<K>(self, keys: &[K]) -> Result<Chm<H>, MphError>
    where
        K: AsRef<[u8]> + Sync,
    {
        let v = self.cfg.validate(keys.len())?;
        let hash_size = self.cfg.hash_size;
        match self.cfg.arity {
            2 => {
                let (graph, order, seed) = self.search::<K, 2>(keys, v)?;
                Ok(Chm::from_parts(&graph, order, seed, hash_size, self.hasher))
            }
            _ => {
                let (graph, order, seed) = self.search::<K, 3>(keys, v)?;
                Ok(Chm::from_parts(&graph, order, seed, hash_size, self.hasher))
            }
        }
    }

    /// Build a BDZ function over **unique** keys. Requires `arity == 3`.
    pub fn build_bdz<K>(self, keys: &[K]) -> Result<Bdz<H>, MphError>
    where
        K: AsRef<[u8]> + Sync,
    {
        if self.cfg.arity != 3 {
            return Err(ConfigError::BdzRequiresThreeUniform(self.cfg.arity).into());
        }
        let v = self.cfg.validate(keys.len())?;
        let (graph, order, seed) = self.search::<K, 3>(keys, v)?;
        Ok(Bdz::from_parts(
            &graph,
            &order,
            seed,
            self.cfg.hash_size,
            self.hasher,
        ))
    }

    /// Retry loop: hash, peel, and on a recoverable failure draw the next seed.
    /// Duplicate keys are checked on the first attempt only and end the search.
    fn search<K, const R: usize>(
        &self,
        keys: &[K],
        v: u32,
    ) -> Result<(Hypergraph<R>, OutputOrder, u32), MphError>
    where
        K: AsRef<[u8]> + Sync,
    {
        let mut rng = StdRng::seed_from_u64(self.cfg.salt);
        let n = keys.len();

        for attempt in 1..=self.cfg.max_attempts {
            let seed = rng.next_u32();
            if attempt == 1 {
                info!("building r={R} graph: n={n}, v={v}, first seed {seed:#010x}");
            }
            match self.attempt::<K, R>(keys, seed, v, attempt == 1) {
                Ok((graph, order)) => {
                    info!("seed {seed:#010x} succeeded after {attempt} attempt(s)");
                    return Ok((graph, order, seed));
                }
                Err(AttemptError::DuplicateKey { first, second }) => {
                    error!("keys at positions {first} and {second} are identical");
                    return Err(MphError::DuplicateKey { first, second });
                }
                Err(err) => {
                    debug_assert!(err.is_recoverable());
                    debug!("attempt {attempt} with seed {seed:#010x} failed: {err}");
                }
            }
        }
        warn!(
            "no acyclic graph after {} attempts (n={n}, v={v})",
            self.cfg.max_attempts
        );
        Err(MphError::RetriesExhausted {
            attempts: self.cfg.max_attempts,
        })
    }

    fn attempt<K, const R: usize>(
        &self,
        keys: &[K],
        seed: u32,
        v: u32,
        check_duplicates: bool,
    ) -> Result<(Hypergraph<R>, OutputOrder), AttemptError>
    where
        K: AsRef<[u8]> + Sync,
    {
        trace!("hashing with seed {seed:#010x}");
        let mut graph = Hypergraph::<R>::build(
            keys,
            &self.hasher,
            self.cfg.hash_size,
            seed,
            v,
            check_duplicates,
        )?;
        trace!("peeling");
        let order = graph.peel()?;
        trace!("assigning");
        Ok((graph, order))
    }
}
