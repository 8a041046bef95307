use thiserror::Error;

/// Outcome of a single construction attempt that did not produce a function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AttemptError {
    /// The key's reduced hash values do not name r distinct vertices.
    #[error("edge {edge} maps to fewer than r distinct vertices")]
    SelfCollision { edge: u32 },
    /// Peeling stopped with edges left over, so the hypergraph has a cycle.
    #[error("hypergraph is cyclic: {remaining} edges could not be peeled")]
    CycleDetected { remaining: u32 },
    /// Two input positions hold byte-identical keys.
    #[error("keys at positions {first} and {second} are identical")]
    DuplicateKey { first: usize, second: usize },
}

impl AttemptError {
    /// `true` when a fresh seed may succeed where this attempt failed.
    #[inline]
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, AttemptError::DuplicateKey { .. })
    }
}

/// Caller errors detected before the first attempt.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("unsupported hypergraph arity {0} (expected 2 or 3)")]
    UnsupportedArity(usize),
    #[error("load factor {c} is below the minimum {min} for r = {r}")]
    LoadFactorTooSmall { c: f64, min: f64, r: usize },
    #[error("hash width {hash_size} is smaller than r = {r}")]
    HashSizeTooSmall { hash_size: usize, r: usize },
    #[error("hash width {hash_size} exceeds the supported maximum {max}")]
    HashSizeTooLarge { hash_size: usize, max: usize },
    #[error("BDZ needs a 3-uniform hypergraph, got r = {0}")]
    BdzRequiresThreeUniform(usize),
    #[error("empty key set is not supported")]
    EmptyKeySet,
    #[error("{n} keys need more vertices than a u32 index can address")]
    TooManyKeys { n: usize },
}

#[derive(Debug, Error)]
pub enum MphError {
    #[error("duplicate key detected during build: positions {first} and {second}")]
    DuplicateKey { first: usize, second: usize },
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("no acyclic hypergraph found after {attempts} attempts")]
    RetriesExhausted { attempts: u32 },
    #[cfg(feature = "serde")]
    #[error("serialization error: {0}")]
    Serde(#[from] Box<bincode::ErrorKind>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_duplicates_are_fatal() {
        assert!(AttemptError::SelfCollision { edge: 3 }.is_recoverable());
        assert!(AttemptError::CycleDetected { remaining: 2 }.is_recoverable());
        assert!(!AttemptError::DuplicateKey { first: 0, second: 1 }.is_recoverable());
    }

    #[test]
    fn config_errors_convert() {
        let err: MphError = ConfigError::EmptyKeySet.into();
        assert!(matches!(err, MphError::Config(ConfigError::EmptyKeySet)));
        assert_eq!(err.to_string(), "invalid configuration: empty key set is not supported");
    }
}
