//! Shared types for ocmscope
//!
//! This crate contains data structures used across multiple ocmscope crates:
//! topology nodes and their status models, table rows, search coordinates,
//! and the pod/log descriptors used by the log viewer.

use std::collections::HashMap;
use std::fmt;

use ratatui::style::Color;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

// ============================================================================
// Status Types
// ============================================================================

/// Health indicator attached to a resource instance
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pulse {
    /// Failure
    Red,
    /// Blocked by a dependency or policy
    Blocked,
    /// Warning
    Yellow,
    /// Pending or unknown
    #[default]
    Orange,
    /// Healthy
    Green,
}

impl Pulse {
    /// Status priority ranking, most urgent first
    pub const PRIORITY: [Pulse; 5] = [
        Pulse::Red,
        Pulse::Blocked,
        Pulse::Yellow,
        Pulse::Orange,
        Pulse::Green,
    ];

    /// Position in the priority ranking (lower sorts first)
    pub fn priority(&self) -> usize {
        match self {
            Self::Red => 0,
            Self::Blocked => 1,
            Self::Yellow => 2,
            Self::Orange => 3,
            Self::Green => 4,
        }
    }

    /// Parse a pulse from its wire name
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "red" => Some(Self::Red),
            "blocked" => Some(Self::Blocked),
            "yellow" => Some(Self::Yellow),
            "orange" => Some(Self::Orange),
            "green" => Some(Self::Green),
            _ => None,
        }
    }

    /// Icon name shown next to the resource
    pub fn icon(&self) -> &'static str {
        match self {
            Self::Green => "success",
            Self::Red => "failure",
            Self::Yellow => "warning",
            Self::Blocked => "blocked",
            Self::Orange => "pending",
        }
    }

    /// Single-cell glyph for terminal rendering
    pub fn glyph(&self) -> &'static str {
        match self {
            Self::Green => "●",
            Self::Red => "✖",
            Self::Yellow => "▲",
            Self::Blocked => "⊘",
            Self::Orange => "◌",
        }
    }

    /// Get display color for this pulse
    pub fn color(&self) -> Color {
        match self {
            Self::Green => Color::Green,
            Self::Red => Color::Red,
            Self::Yellow => Color::Yellow,
            Self::Blocked => Color::Magenta,
            Self::Orange => Color::LightRed,
        }
    }
}

// ============================================================================
// Topology Types
// ============================================================================

/// Kind of resource a topology node represents
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ResourceType {
    Application,
    Subscription,
    Placement,
    Cluster,
    Deployment,
    ReplicaSet,
    StatefulSet,
    DaemonSet,
    Pod,
    Service,
    Route,
    Ingress,
    ConfigMap,
    Secret,
    Other(String),
}

impl ResourceType {
    /// Wire name, as used in the node's `type` field
    pub fn as_str(&self) -> &str {
        match self {
            Self::Application => "application",
            Self::Subscription => "subscription",
            Self::Placement => "placement",
            Self::Cluster => "cluster",
            Self::Deployment => "deployment",
            Self::ReplicaSet => "replicaset",
            Self::StatefulSet => "statefulset",
            Self::DaemonSet => "daemonset",
            Self::Pod => "pod",
            Self::Service => "service",
            Self::Route => "route",
            Self::Ingress => "ingress",
            Self::ConfigMap => "configmap",
            Self::Secret => "secret",
            Self::Other(name) => name,
        }
    }

    /// Key of this type's status model inside node specs (e.g. `podModel`)
    pub fn model_key(&self) -> String {
        format!("{}Model", self.as_str())
    }
}

impl From<&str> for ResourceType {
    fn from(s: &str) -> Self {
        match s {
            "application" => Self::Application,
            "subscription" => Self::Subscription,
            "placement" | "placements" => Self::Placement,
            "cluster" => Self::Cluster,
            "deployment" => Self::Deployment,
            "replicaset" => Self::ReplicaSet,
            "statefulset" => Self::StatefulSet,
            "daemonset" => Self::DaemonSet,
            "pod" => Self::Pod,
            "service" => Self::Service,
            "route" => Self::Route,
            "ingress" => Self::Ingress,
            "configmap" => Self::ConfigMap,
            "secret" => Self::Secret,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for ResourceType {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<ResourceType> for String {
    fn from(t: ResourceType) -> Self {
        t.as_str().to_string()
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resource definition deployed by a node, optionally pinned to one cluster
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster: Option<String>,
}

impl ResourceRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: None,
            cluster: None,
        }
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn pinned_to(mut self, cluster: impl Into<String>) -> Self {
        self.cluster = Some(cluster.into());
        self
    }

    /// Whether this resource is deployed on the given cluster
    pub fn applies_to(&self, cluster: &str) -> bool {
        self.cluster.as_deref().is_none_or(|c| c == cluster)
    }

    /// Composite key used to look the resource up in a status model
    pub fn status_key(&self, cluster: &str) -> String {
        match &self.namespace {
            Some(ns) => format!("{}-{}-{}", self.name, cluster, ns),
            None => format!("{}-{}", self.name, cluster),
        }
    }
}

/// Observed status of one resource instance
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceStatus {
    /// Missing pulse on a known instance means healthy
    #[serde(default, deserialize_with = "lenient_pulse")]
    pub pulse: Option<Pulse>,
    pub name: String,
    #[serde(default)]
    pub namespace: Option<String>,
}

/// Unrecognised pulse names (such as `spinner`) read as pending
fn lenient_pulse<'de, D>(deserializer: D) -> Result<Option<Pulse>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let Some(name) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    Ok(Some(Pulse::parse(&name).unwrap_or_else(|| {
        tracing::warn!(pulse = %name, "unknown pulse, treating as pending");
        Pulse::Orange
    })))
}

/// Status entries of one resource type, keyed by `name-cluster[-namespace]`
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StatusModel {
    entries: HashMap<String, Vec<ResourceStatus>>,
}

impl StatusModel {
    pub fn new(entries: HashMap<String, Vec<ResourceStatus>>) -> Self {
        Self { entries }
    }

    /// Status of the `replica`-th instance under `key`, if known
    pub fn lookup(&self, key: &str, replica: usize) -> Option<&ResourceStatus> {
        self.entries.get(key).and_then(|statuses| statuses.get(replica))
    }

    pub fn insert(&mut self, key: impl Into<String>, statuses: Vec<ResourceStatus>) {
        self.entries.insert(key.into(), statuses);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Lookup table of status models keyed by resource type
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StatusModels {
    by_type: HashMap<ResourceType, StatusModel>,
}

impl StatusModels {
    pub fn get(&self, resource_type: &ResourceType) -> Option<&StatusModel> {
        self.by_type.get(resource_type)
    }

    pub fn insert(&mut self, resource_type: ResourceType, model: StatusModel) {
        self.by_type.insert(resource_type, model);
    }

    pub fn is_empty(&self) -> bool {
        self.by_type.is_empty()
    }
}

/// Spec data carried by a topology node
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NodeSpecs {
    pub resources: Vec<ResourceRef>,
    pub clusters_names: Vec<String>,
    /// Always at least 1
    pub replica_count: usize,
    pub models: StatusModels,
}

/// A topology entity (application, resource kind or cluster)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TopologyNode {
    pub id: Option<String>,
    pub name: String,
    pub namespace: Option<String>,
    pub node_type: ResourceType,
    pub specs: NodeSpecs,
}

/// Errors raised while ingesting a topology node
#[derive(Debug, Error)]
pub enum NodeError {
    #[error("Invalid node JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid specs.{field}: {source}")]
    InvalidField {
        field: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Node specs must be an object")]
    SpecsNotObject,
}

#[derive(Deserialize)]
struct RawNode {
    #[serde(default)]
    id: Option<String>,
    name: String,
    #[serde(default)]
    namespace: Option<String>,
    #[serde(rename = "type")]
    node_type: ResourceType,
    #[serde(default)]
    specs: Option<Value>,
}

impl TopologyNode {
    /// Parse and validate a node from its JSON representation
    pub fn from_json(json: &str) -> Result<Self, NodeError> {
        let raw: RawNode = serde_json::from_str(json)?;
        Self::from_raw(raw)
    }

    /// Parse and validate a node from an already decoded JSON value
    pub fn from_value(value: Value) -> Result<Self, NodeError> {
        let raw: RawNode = serde_json::from_value(value)?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawNode) -> Result<Self, NodeError> {
        let specs = match raw.specs {
            None | Some(Value::Null) => serde_json::Map::new(),
            Some(Value::Object(map)) => map,
            Some(_) => return Err(NodeError::SpecsNotObject),
        };

        let resources = match specs.get("resources") {
            Some(value) if !value.is_null() => field::<Vec<ResourceRef>>("resources", value)?,
            // A node without explicit resources stands for itself
            _ => vec![ResourceRef {
                name: raw.name.clone(),
                namespace: raw.namespace.clone(),
                cluster: None,
            }],
        };

        let clusters_names = match specs.get("clustersNames") {
            Some(value) if !value.is_null() => field::<Vec<String>>("clustersNames", value)?,
            _ => Vec::new(),
        };

        let replica_count = specs
            .get("replicaCount")
            .map(parse_replica_count)
            .unwrap_or(1);

        let mut models = StatusModels::default();
        for (key, value) in &specs {
            let Some(type_name) = key.strip_suffix("Model") else {
                continue;
            };
            if type_name.is_empty() || value.is_null() {
                continue;
            }
            let entries = field::<HashMap<String, Vec<ResourceStatus>>>(key, value)?;
            models.insert(ResourceType::from(type_name), StatusModel::new(entries));
        }

        Ok(Self {
            id: raw.id,
            name: raw.name,
            namespace: raw.namespace,
            node_type: raw.node_type,
            specs: NodeSpecs {
                resources,
                clusters_names,
                replica_count,
                models,
            },
        })
    }

    /// Status model matching this node's own type
    pub fn status_model(&self) -> Option<&StatusModel> {
        self.specs.models.get(&self.node_type)
    }
}

fn field<T: serde::de::DeserializeOwned>(name: &str, value: &Value) -> Result<T, NodeError> {
    T::deserialize(value).map_err(|source| NodeError::InvalidField {
        field: name.to_string(),
        source,
    })
}

/// Upper bound on replicas expanded per resource and cluster
pub const MAX_REPLICAS: usize = 1000;

/// Interpret a replica count, falling back to 1 for anything non-numeric
///
/// Counts above [`MAX_REPLICAS`] are clamped.
pub fn parse_replica_count(value: &Value) -> usize {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    match number {
        Some(n) if n.is_finite() && n > MAX_REPLICAS as f64 => {
            tracing::warn!(replicas = n, max = MAX_REPLICAS, "replicaCount too large, clamping");
            MAX_REPLICAS
        }
        Some(n) if n.is_finite() && n >= 1.0 => n as usize,
        Some(n) if n.is_finite() => 1,
        _ => {
            tracing::warn!(?value, "non-numeric replicaCount, using 1");
            1
        }
    }
}

// ============================================================================
// Table Types
// ============================================================================

/// One resource instance shown in the details table
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResourceRow {
    pub pulse: Pulse,
    pub name: String,
    pub namespace: Option<String>,
    pub cluster: String,
    pub resource_type: ResourceType,
}

impl ResourceRow {
    pub fn namespace_or_empty(&self) -> &str {
        self.namespace.as_deref().unwrap_or("")
    }
}

// ============================================================================
// Log Types
// ============================================================================

/// Coordinates of one keyword occurrence in a log
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SearchMatch {
    /// Zero-based line index, or -1 for the "nothing found" sentinel
    pub row_index: isize,
    /// One-based occurrence index within the line, 0 for the sentinel
    pub match_index: usize,
}

impl SearchMatch {
    /// Result marker for a search that ran and found nothing
    pub const NOT_FOUND: Self = Self {
        row_index: -1,
        match_index: 0,
    };

    pub fn new(row: usize, match_index: usize) -> Self {
        Self {
            row_index: row as isize,
            match_index,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.row_index < 0
    }

    /// Row to scroll to, if this is a real match
    pub fn row(&self) -> Option<usize> {
        usize::try_from(self.row_index).ok()
    }
}

/// Which container log to read
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogRequest {
    /// Kubeconfig context, `None` for the current one
    pub context: Option<String>,
    pub namespace: String,
    pub pod: String,
    pub container: Option<String>,
    /// Read the previous terminated instance
    pub previous: bool,
    pub tail_lines: Option<i64>,
}

impl LogRequest {
    pub fn new(namespace: impl Into<String>, pod: impl Into<String>) -> Self {
        Self {
            context: None,
            namespace: namespace.into(),
            pod: pod.into(),
            container: None,
            previous: false,
            tail_lines: None,
        }
    }

    /// Short label used in headers and export file names
    pub fn label(&self) -> String {
        match &self.container {
            Some(c) => format!("{}/{}", self.pod, c),
            None => self.pod.clone(),
        }
    }
}

/// Pod information
#[derive(Clone, Debug)]
pub struct PodInfo {
    pub name: String,
    pub namespace: String,
    pub status: PodStatus,
    pub containers: Vec<ContainerInfo>,
}

impl PodInfo {
    pub fn new(name: String, namespace: String) -> Self {
        Self {
            name,
            namespace,
            status: PodStatus::Unknown,
            containers: Vec::new(),
        }
    }

    pub fn container_names(&self) -> Vec<String> {
        self.containers.iter().map(|c| c.name.clone()).collect()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PodStatus {
    Pending,
    Running,
    Succeeded,
    Failed,
    Unknown,
}

impl From<&str> for PodStatus {
    fn from(s: &str) -> Self {
        match s {
            "Pending" => Self::Pending,
            "Running" => Self::Running,
            "Succeeded" => Self::Succeeded,
            "Failed" => Self::Failed,
            _ => Self::Unknown,
        }
    }
}

#[derive(Clone, Debug)]
pub struct ContainerInfo {
    pub name: String,
    pub ready: bool,
    pub restart_count: i32,
}

impl ContainerInfo {
    pub fn new(name: String) -> Self {
        Self {
            name,
            ready: false,
            restart_count: 0,
        }
    }

    /// A restarted container has a previous instance with logs
    pub fn has_previous_logs(&self) -> bool {
        self.restart_count > 0
    }
}
