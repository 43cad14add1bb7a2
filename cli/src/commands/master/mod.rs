use clap::Parser;
use log::warn;
use master::config::{parse_endpoint_list, MasterConfig};

/// 🖥️ Master Command
///
/// This command is used to configure and 🚀 start the master gateway.
#[derive(Parser, Debug)]
#[command(name = "master", about = "🚀 Start and configure the master gateway.", long_about = None)]
pub struct MasterCommand {
    /// 📌 Gateway bind address
    ///
    /// Specify the IP address 🌐 where the gateway will listen for
    /// incoming render jobs. If not set, all interfaces are used.
    #[arg(short, long, value_name = "ADDRESS")]
    pub address: Option<String>,

    /// 🚪 Gateway port
    ///
    /// Define the port number 🎛️ on which the gateway will listen.
    /// Default is 50052 if not specified.
    #[arg(short, long, value_name = "PORT")]
    pub port: Option<u16>,

    /// ⚖️ Load balancing strategy
    ///
    /// One of round-robin, least-loaded, random or weighted-round-robin.
    #[arg(short, long, value_name = "STRATEGY")]
    pub strategy: Option<String>,

    /// 🔎 Worker service name used for endpoint discovery
    #[arg(long, value_name = "NAME")]
    pub worker_service: Option<String>,

    /// 🗂️ Namespace the worker service is resolved in
    #[arg(long, value_name = "NAMESPACE")]
    pub worker_namespace: Option<String>,

    /// 📝 Comma-separated worker endpoints, bypassing discovery
    #[arg(long, value_name = "ENDPOINTS")]
    pub worker_endpoints: Option<String>,
}

impl MasterCommand {
    /// Flags override the environment, the environment overrides the
    /// defaults.
    pub fn into_config(self) -> MasterConfig {
        let mut config = MasterConfig::from_env();

        if let Some(address) = self.address {
            config.address = address;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(strategy) = self.strategy {
            match strategy.parse() {
                Ok(strategy) => config.strategy = strategy,
                Err(e) => warn!("Ignoring --strategy: {}", e),
            }
        }
        if let Some(worker_service) = self.worker_service {
            config.worker_service_name = worker_service;
        }
        if let Some(worker_namespace) = self.worker_namespace {
            config.worker_namespace = worker_namespace;
        }
        if let Some(worker_endpoints) = self.worker_endpoints {
            config.worker_endpoints = Some(parse_endpoint_list(&worker_endpoints));
        }

        config
    }
}
