use clap::Subcommand;

use self::{master::MasterCommand, worker::WorkerCommand};

pub mod master;
pub mod worker;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// 🚀 Master Gateway
    ///
    /// Start the gateway that discovers workers, health-checks them and
    /// load-balances render jobs across the pool.
    Master(MasterCommand),

    /// 👷 Worker Mode
    ///
    /// Launch a compute worker that traces column jobs for the gateway.
    Worker(WorkerCommand),
}
