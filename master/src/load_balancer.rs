use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use rand::Rng;

use crate::worker_pool::{WorkerConnection, WorkerPool};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadBalancingStrategy {
    #[default]
    RoundRobin,
    LeastLoaded,
    Random,
    WeightedRoundRobin,
}

impl FromStr for LoadBalancingStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .to_ascii_lowercase()
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .collect();

        match normalized.as_str() {
            "roundrobin" => Ok(Self::RoundRobin),
            "leastloaded" => Ok(Self::LeastLoaded),
            "random" => Ok(Self::Random),
            "weightedroundrobin" => Ok(Self::WeightedRoundRobin),
            _ => Err(format!("unknown load balancing strategy: {}", s)),
        }
    }
}

/// Picks a worker from the pool's healthy snapshot. The strategy can be
/// swapped at runtime, the rotation cursor survives swaps.
pub struct LoadBalancer {
    pool: Arc<WorkerPool>,
    strategy: RwLock<LoadBalancingStrategy>,
    round_robin_index: AtomicUsize,
}

impl LoadBalancer {
    pub fn new(pool: Arc<WorkerPool>, strategy: LoadBalancingStrategy) -> Self {
        Self {
            pool,
            strategy: RwLock::new(strategy),
            round_robin_index: AtomicUsize::new(0),
        }
    }

    pub fn strategy(&self) -> LoadBalancingStrategy {
        *self.strategy.read().unwrap()
    }

    pub fn set_strategy(&self, strategy: LoadBalancingStrategy) {
        *self.strategy.write().unwrap() = strategy;
    }

    /// `None` exactly when the healthy snapshot is empty.
    pub async fn next_worker(&self) -> Option<Arc<WorkerConnection>> {
        let workers = self.pool.healthy_workers().await;
        if workers.is_empty() {
            return None;
        }

        let selected = match self.strategy() {
            LoadBalancingStrategy::RoundRobin => self.select_round_robin(&workers),
            LoadBalancingStrategy::LeastLoaded => Self::select_least_loaded(&workers),
            LoadBalancingStrategy::Random => Self::select_random(&workers),
            LoadBalancingStrategy::WeightedRoundRobin => Self::select_weighted(&workers),
        };

        selected.cloned()
    }

    fn select_round_robin<'a>(
        &self,
        workers: &'a [Arc<WorkerConnection>],
    ) -> Option<&'a Arc<WorkerConnection>> {
        let index = self.round_robin_index.fetch_add(1, Ordering::SeqCst) % workers.len();
        workers.get(index)
    }

    /// First worker with the fewest in-flight jobs.
    fn select_least_loaded(workers: &[Arc<WorkerConnection>]) -> Option<&Arc<WorkerConnection>> {
        workers.iter().min_by_key(|worker| worker.active_jobs())
    }

    fn select_random(workers: &[Arc<WorkerConnection>]) -> Option<&Arc<WorkerConnection>> {
        let index = rand::thread_rng().gen_range(0..workers.len());
        workers.get(index)
    }

    /// First worker with the highest blended weight. The strategy keeps
    /// its historical name, but it is an argmax over the snapshot rather
    /// than a rotation.
    fn select_weighted(workers: &[Arc<WorkerConnection>]) -> Option<&Arc<WorkerConnection>> {
        let mut best: Option<&Arc<WorkerConnection>> = None;
        let mut best_weight = f64::NEG_INFINITY;

        for worker in workers {
            let weight = Self::worker_weight(worker);
            if weight > best_weight {
                best_weight = weight;
                best = Some(worker);
            }
        }

        best
    }

    /// Blend of idleness, processing speed, and cached health.
    fn worker_weight(worker: &WorkerConnection) -> f64 {
        let active_jobs_weight = 1.0 / (1.0 + worker.active_jobs() as f64);
        let speed_weight = 1.0 / (1.0 + worker.average_processing_time_ms() / 1000.0);
        let health_weight = if worker.last_known_health() { 1.0 } else { 0.0 };

        active_jobs_weight * 0.5 + speed_weight * 0.3 + health_weight * 0.2
    }
}
