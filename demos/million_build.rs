use hypergraph_mph::{BuildConfig, Builder, KeyHasher, MphError, Xxh3Hasher};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use std::collections::HashSet;
use std::time::Instant;

const N_KEYS: usize = 1_000_000;
const GEN_SEED: u64 = 42;

fn main() -> Result<(), MphError> {
    println!("--- hypergraph_mph: CHM vs BDZ ---");
    println!("n = {N_KEYS}");

    // 1) Generate unique keys
    let t0 = Instant::now();
    let keys = gen_unique_keys(N_KEYS, GEN_SEED);
    let gen_s = t0.elapsed().as_secs_f64();
    println!(
        "gen:        {:>8.3} s   ({:.1} M keys/s)",
        gen_s,
        N_KEYS as f64 / gen_s / 1e6
    );

    // 2) Raw hashing cost, for comparison with build time
    let t1 = Instant::now();
    let mut acc = 0u32;
    let mut buf = [0u32; 3];
    for k in &keys {
        Xxh3Hasher.hash(0x5EED, k, &mut buf);
        acc ^= buf[0] ^ buf[1] ^ buf[2];
    }
    let hash_s = t1.elapsed().as_secs_f64();
    println!(
        "hash:       {:>8.3} s   ({:.1} M keys/s)   (acc={acc})",
        hash_s,
        N_KEYS as f64 / hash_s / 1e6
    );

    let cfg = BuildConfig {
        // 1.24 is the floor for 3-graphs; a little slack cuts retries on large sets.
        load_factor: Some(1.25),
        ..Default::default()
    };

    // 3) Build both variants
    let t2 = Instant::now();
    let chm = Builder::new().with_config(cfg.clone()).build_chm(&keys)?;
    let chm_s = t2.elapsed().as_secs_f64();
    println!(
        "build CHM:  {:>8.3} s   ({:.1} M keys/s)   v={}",
        chm_s,
        N_KEYS as f64 / chm_s / 1e6,
        chm.v
    );

    let t3 = Instant::now();
    let bdz = Builder::new().with_config(cfg).build_bdz(&keys)?;
    let bdz_s = t3.elapsed().as_secs_f64();
    println!(
        "build BDZ:  {:>8.3} s   ({:.1} M keys/s)   v={}",
        bdz_s,
        N_KEYS as f64 / bdz_s / 1e6,
        bdz.v
    );

    // 4) Lookup all keys and check the bijection
    let t4 = Instant::now();
    let mut seen_chm = vec![false; N_KEYS];
    let mut seen_bdz = vec![false; N_KEYS];
    for chunk in keys.chunks(32_768) {
        for k in chunk {
            let a = chm.index(k) as usize;
            let b = bdz.index(k) as usize;
            assert!(!seen_chm[a], "CHM collision at {a}");
            assert!(!seen_bdz[b], "BDZ collision at {b}");
            seen_chm[a] = true;
            seen_bdz[b] = true;
        }
    }
    let lookup_s = t4.elapsed().as_secs_f64();
    println!(
        "lookup x2:  {:>8.3} s   ({:.1} M lookups/s)",
        lookup_s,
        2.0 * N_KEYS as f64 / lookup_s / 1e6
    );

    println!("----------------------------------------------");
    println!(
        "CHM table: {} bytes, BDZ labels: {} bytes + rank {} bytes",
        chm.g.len() * 4,
        bdz.labels.len().div_ceil(4),
        bdz.rank.holes64k.len() * 4 + bdz.rank.holes64.len() * 2 + bdz.rank.hole_words().len() * 8
    );
    println!(
        "Total (gen + hash + build + lookup): {:.3} s",
        gen_s + hash_s + chm_s + bdz_s + lookup_s
    );

    Ok(())
}

/// Generate N unique 16-byte keys (raw bytes), deterministically.
fn gen_unique_keys(n: usize, seed: u64) -> Vec<Vec<u8>> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut set = HashSet::with_capacity(n * 2);
    let mut keys = Vec::with_capacity(n);
    while keys.len() < n {
        let mut buf = [0u8; 16];
        rng.fill_bytes(&mut buf);
        if set.insert(buf) {
            keys.push(buf.to_vec());
        }
    }
    keys
}
