//! Kubernetes client for ocmscope
//!
//! This crate resolves kubeconfig contexts, looks up pods and their
//! containers, and reads container logs.

mod client;

pub use client::{KubeClient, pod_info};

// Re-export types that are used in our public API
pub use ocmscope_types::{ContainerInfo, LogRequest, PodInfo, PodStatus};
