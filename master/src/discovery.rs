use log::debug;

/// Source of worker endpoints for the pool to reconcile against.
pub trait EndpointResolver: Send + Sync {
    fn resolve(&self) -> Vec<String>;
}

/// Resolves the cluster-internal DNS name of the worker service. The
/// name itself is the endpoint, the connection dial resolves it.
pub struct DnsServiceResolver {
    service_name: String,
    namespace: String,
    worker_port: u16,
}

impl DnsServiceResolver {
    pub fn new(service_name: String, namespace: String, worker_port: u16) -> Self {
        Self {
            service_name,
            namespace,
            worker_port,
        }
    }
}

impl EndpointResolver for DnsServiceResolver {
    fn resolve(&self) -> Vec<String> {
        let endpoint = format!(
            "{}.{}.svc.cluster.local:{}",
            self.service_name, self.namespace, self.worker_port
        );
        debug!("Resolved worker service to {}", endpoint);
        vec![endpoint]
    }
}

/// Fixed endpoint list, for local setups and tests.
pub struct StaticEndpoints(pub Vec<String>);

impl EndpointResolver for StaticEndpoints {
    fn resolve(&self) -> Vec<String> {
        self.0.clone()
    }
}
