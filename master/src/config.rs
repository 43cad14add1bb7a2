use std::time::Duration;

use shared::env;

use crate::discovery::{DnsServiceResolver, EndpointResolver, StaticEndpoints};
use crate::load_balancer::LoadBalancingStrategy;
use crate::worker_pool::PoolConfig;

#[derive(Debug, Clone)]
pub struct MasterConfig {
    pub address: String,
    pub port: u16,
    pub worker_service_name: String,
    pub worker_namespace: String,
    pub worker_port: u16,
    /// Explicit endpoint list. When set it replaces service discovery.
    pub worker_endpoints: Option<Vec<String>>,
    pub strategy: LoadBalancingStrategy,
    pub discovery_interval: Duration,
    pub health_check_interval: Duration,
    pub health_check_timeout: Duration,
    pub request_timeout: Duration,
}

impl MasterConfig {
    pub fn from_env() -> Self {
        Self {
            address: env::var_or("MASTER_ADDRESS", "0.0.0.0"),
            port: env::parse_var_or("MASTER_PORT", 50052),
            worker_service_name: env::var_or("WORKER_SERVICE_NAME", "raycast-worker-service"),
            worker_namespace: env::var_or("WORKER_NAMESPACE", "default"),
            worker_port: env::parse_var_or("WORKER_PORT", 50051),
            worker_endpoints: std::env::var("WORKER_ENDPOINTS")
                .ok()
                .map(|value| parse_endpoint_list(&value)),
            strategy: env::var_or("LOAD_BALANCING_STRATEGY", "round-robin")
                .parse()
                .unwrap_or_default(),
            discovery_interval: Duration::from_secs(env::parse_var_or(
                "DISCOVERY_INTERVAL_SECONDS",
                30,
            )),
            health_check_interval: Duration::from_secs(env::parse_var_or(
                "HEALTH_CHECK_INTERVAL_SECONDS",
                30,
            )),
            health_check_timeout: Duration::from_secs(env::parse_var_or(
                "HEALTH_CHECK_TIMEOUT_SECONDS",
                5,
            )),
            request_timeout: Duration::from_secs(env::parse_var_or("REQUEST_TIMEOUT_SECONDS", 30)),
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.address, self.port)
    }

    pub fn resolver(&self) -> Box<dyn EndpointResolver> {
        match &self.worker_endpoints {
            Some(endpoints) => Box::new(StaticEndpoints(endpoints.clone())),
            None => Box::new(DnsServiceResolver::new(
                self.worker_service_name.clone(),
                self.worker_namespace.clone(),
                self.worker_port,
            )),
        }
    }

    pub fn pool_config(&self) -> PoolConfig {
        PoolConfig {
            discovery_interval: self.discovery_interval,
            health_check_interval: self.health_check_interval,
            health_check_timeout: self.health_check_timeout,
            request_timeout: self.request_timeout,
        }
    }
}

pub fn parse_endpoint_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|endpoint| endpoint.trim().to_string())
        .filter(|endpoint| !endpoint.is_empty())
        .collect()
}
