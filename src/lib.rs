//! hypergraph_mph — CHM and BDZ minimal perfect hash generators.
//!
//! - Build once on a set of **unique** keys (bytes/str).
//! - Every key becomes an edge of a random r-uniform hypergraph (r = 2 or 3);
//!   peeling proves the graph acyclic and fixes the order vertex labels are assigned in.
//! - CHM: `h(k) = (Σ g[hash_s(k) mod v]) mod n`, one `u32` label per vertex.
//! - BDZ: 2-bit labels select one of the three vertices, a rank index compacts it into `[0..n)`.
//! - If an attempt hits a self-colliding edge or a cycle, the key set is rehashed with a new seed.

mod bdz;
mod builder;
mod chm;
mod error;
mod graph;
mod hash;
mod peel;
mod util;

pub use bdz::{Assignment as BdzAssignment, Bdz, RankIndex, UNUSED, assign as assign_bdz};
pub use builder::{BuildConfig, Builder, MIN_LOAD_FACTOR_2, MIN_LOAD_FACTOR_3};
pub use chm::{Chm, assign as assign_chm};
pub use error::{AttemptError, ConfigError, MphError};
pub use graph::{Edge, Hypergraph, NONE};
pub use hash::{KeyHasher, MAX_HASH_SIZE, WyHasher, Xxh3Hasher};
pub use peel::OutputOrder;
