use rand::SeedableRng;
use rand::rngs::StdRng;

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// FNV-1a hash of an entity id. Stable across runs and platforms.
pub fn id_seed(id: &str) -> u64 {
    id.bytes().fold(FNV_OFFSET_BASIS, |hash, byte| {
        (hash ^ byte as u64).wrapping_mul(FNV_PRIME)
    })
}

/// Jitter source for one entity, seeded from its id only.
pub fn id_rng(id: &str) -> StdRng {
    StdRng::seed_from_u64(id_seed(id))
}
