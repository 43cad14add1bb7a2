use clap::Parser;
use worker::config::{worker_id_from_seed, WorkerConfig};

/// 👷 Worker Command
///
/// This command is used to configure and start a compute worker.
#[derive(Parser, Debug)]
#[command(name = "worker", about = "👷 Start a raycast compute worker.", long_about = None)]
pub struct WorkerCommand {
    /// 🏷️ Identity seed, hashed into the numeric worker id
    ///
    /// Typically the pod or host name. Without one the `WORKER_ID`
    /// environment variable is used, and without that a random seed.
    #[arg(short, long)]
    pub name: Option<String>,

    /// 🔢 Explicit numeric worker id, overriding the hashed seed
    #[arg(long)]
    pub worker_id: Option<i32>,

    /// 📌 Listen address, for example 0.0.0.0:50051
    #[arg(short, long)]
    pub address: Option<String>,
}

impl WorkerCommand {
    /// Flags override the environment, the environment overrides the
    /// defaults.
    pub fn into_config(self) -> WorkerConfig {
        let base = WorkerConfig::from_env();

        let worker_id = match (self.worker_id, self.name) {
            (Some(worker_id), _) => worker_id,
            (None, Some(name)) => worker_id_from_seed(&name),
            (None, None) => base.worker_id,
        };

        WorkerConfig {
            listen_address: self.address.unwrap_or(base.listen_address),
            worker_id,
        }
    }
}
