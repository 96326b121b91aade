use anyhow::{Context, Result, bail};
use k8s_openapi::api::core::v1::Pod;
use kube::Api;
use kube::api::LogParams;
use kube::config::{KubeConfigOptions, Kubeconfig};

use ocmscope_types::{ContainerInfo, LogRequest, PodInfo, PodStatus};

/// Kubernetes client wrapper
///
/// Holds the parsed kubeconfig so that a client can be built for any of
/// its contexts. Topology rows name the managed cluster they live on, and
/// ocmscope reaches each cluster through the context of the same name.
pub struct KubeClient {
    kubeconfig: Kubeconfig,
    current_context: Option<String>,
}

impl KubeClient {
    /// Create a new KubeClient by loading the kubeconfig
    pub fn new() -> Result<Self> {
        let kubeconfig =
            Kubeconfig::read().context("Failed to read kubeconfig. Is kubectl configured?")?;
        Ok(Self::from_kubeconfig(kubeconfig))
    }

    pub fn from_kubeconfig(kubeconfig: Kubeconfig) -> Self {
        let current_context = kubeconfig.current_context.clone();
        Self {
            kubeconfig,
            current_context,
        }
    }

    /// Names of all contexts in the kubeconfig
    pub fn context_names(&self) -> Vec<String> {
        self.kubeconfig
            .contexts
            .iter()
            .map(|ctx| ctx.name.clone())
            .collect()
    }

    pub fn has_context(&self, name: &str) -> bool {
        self.kubeconfig.contexts.iter().any(|ctx| ctx.name == name)
    }

    pub fn current_context(&self) -> Option<&str> {
        self.current_context.as_deref()
    }

    /// Context to use for a managed cluster: the one named after it, if any
    pub fn context_for_cluster(&self, cluster: &str) -> Option<String> {
        if self.has_context(cluster) {
            Some(cluster.to_string())
        } else {
            tracing::debug!(cluster, "no context named after cluster, using current context");
            None
        }
    }

    /// Create a kube::Client for a context, or for the current one
    pub async fn client_for_context(&self, context: Option<&str>) -> Result<kube::Client> {
        let context = context.or(self.current_context.as_deref());
        if let Some(name) = context {
            if !self.has_context(name) {
                bail!("Context '{}' not found in kubeconfig", name);
            }
        }

        let config = kube::Config::from_custom_kubeconfig(
            self.kubeconfig.clone(),
            &KubeConfigOptions {
                context: context.map(str::to_string),
                ..Default::default()
            },
        )
        .await
        .context(format!(
            "Failed to create config for context: {}",
            context.unwrap_or("<current>")
        ))?;

        kube::Client::try_from(config).context(format!(
            "Failed to create client for context: {}",
            context.unwrap_or("<current>")
        ))
    }

    /// Fetch a single pod with its containers
    pub async fn get_pod(
        &self,
        client: &kube::Client,
        namespace: &str,
        name: &str,
    ) -> Result<PodInfo> {
        let pods: Api<Pod> = Api::namespaced(client.clone(), namespace);
        let pod = pods.get(name).await.context(format!(
            "Failed to get pod '{}' in namespace '{}'",
            name, namespace
        ))?;

        Ok(pod_info(pod, namespace))
    }

    /// Read the log text of one container
    pub async fn fetch_logs(&self, client: &kube::Client, request: &LogRequest) -> Result<String> {
        let pods: Api<Pod> = Api::namespaced(client.clone(), &request.namespace);
        let params = LogParams {
            container: request.container.clone(),
            previous: request.previous,
            tail_lines: request.tail_lines,
            ..Default::default()
        };

        tracing::debug!(
            pod = %request.pod,
            container = ?request.container,
            previous = request.previous,
            "requesting logs"
        );

        pods.logs(&request.pod, &params)
            .await
            .context(format!("Failed to read logs of {}", request.label()))
    }
}

/// Convert a k8s Pod to PodInfo
///
/// Containers come from the pod spec, in declaration order, so that pods
/// which never started still list them. Readiness and restart counts are
/// filled in from the container statuses when present.
pub fn pod_info(pod: Pod, namespace: &str) -> PodInfo {
    let name = pod.metadata.name.unwrap_or_default();
    let mut info = PodInfo::new(name, namespace.to_string());

    if let Some(spec) = pod.spec {
        info.containers = spec
            .containers
            .into_iter()
            .map(|c| ContainerInfo::new(c.name))
            .collect();
    }

    if let Some(status) = pod.status {
        info.status = status
            .phase
            .as_deref()
            .map(PodStatus::from)
            .unwrap_or(PodStatus::Unknown);

        for cs in status.container_statuses.unwrap_or_default() {
            match info.containers.iter_mut().find(|c| c.name == cs.name) {
                Some(container) => {
                    container.ready = cs.ready;
                    container.restart_count = cs.restart_count;
                }
                None => {
                    let mut container = ContainerInfo::new(cs.name);
                    container.ready = cs.ready;
                    container.restart_count = cs.restart_count;
                    info.containers.push(container);
                }
            }
        }
    }

    info
}
