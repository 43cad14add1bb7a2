use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use shared::env;
use uuid::Uuid;

/// Derives a stable numeric worker id in `1..=1000` from a seed string.
pub fn worker_id_from_seed(seed: &str) -> i32 {
    let mut hasher = DefaultHasher::new();
    seed.hash(&mut hasher);
    (hasher.finish() % 1000) as i32 + 1
}

#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub listen_address: String,
    pub worker_id: i32,
}

impl WorkerConfig {
    /// Reads the listen address and identity seed from the environment.
    /// Without a `WORKER_ID` seed every launch gets a fresh identity.
    pub fn from_env() -> Self {
        let listen_address = env::var_or("WORKER_SERVER_ADDRESS", "0.0.0.0:50051");
        let seed = env::var_or("WORKER_ID", &format!("worker-{}", Uuid::new_v4()));

        Self {
            listen_address,
            worker_id: worker_id_from_seed(&seed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeds_hash_into_the_expected_range() {
        for seed in ["worker-a", "worker-b", "", "raycast-worker-service"] {
            let id = worker_id_from_seed(seed);
            assert!((1..=1000).contains(&id), "seed {:?} gave id {}", seed, id);
        }
    }

    #[test]
    fn equal_seeds_give_equal_ids() {
        assert_eq!(worker_id_from_seed("pod-1"), worker_id_from_seed("pod-1"));
    }
}
