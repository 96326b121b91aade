use ocmscope_types::{MAX_REPLICAS, Pulse, ResourceRow, TopologyNode};

/// Expand a node into one row per (resource, cluster, replica)
///
/// Resources pinned to a cluster only produce rows for that cluster. Each
/// row takes the status of the matching replica from the node's status
/// model; replicas the model does not know about are reported as pending.
/// The result is in default order (see [`sort_by_status`]).
pub fn build_rows(node: &TopologyNode) -> Vec<ResourceRow> {
    let specs = &node.specs;
    let model = node.status_model();
    let replicas = specs.replica_count.clamp(1, MAX_REPLICAS);

    let mut rows = Vec::with_capacity(
        specs
            .resources
            .len()
            .saturating_mul(specs.clusters_names.len())
            .saturating_mul(replicas),
    );

    for resource in &specs.resources {
        for cluster in &specs.clusters_names {
            if !resource.applies_to(cluster) {
                continue;
            }

            let key = resource.status_key(cluster);
            for replica in 0..replicas {
                let row = match model.and_then(|m| m.lookup(&key, replica)) {
                    Some(status) => ResourceRow {
                        pulse: status.pulse.unwrap_or(Pulse::Green),
                        name: status.name.clone(),
                        namespace: status.namespace.clone(),
                        cluster: cluster.clone(),
                        resource_type: node.node_type.clone(),
                    },
                    None => ResourceRow {
                        pulse: Pulse::Orange,
                        name: resource.name.clone(),
                        namespace: resource.namespace.clone(),
                        cluster: cluster.clone(),
                        resource_type: node.node_type.clone(),
                    },
                };
                rows.push(row);
            }
        }
    }

    sort_by_status(&mut rows);
    rows
}

/// Default row order: most urgent status first, then by name
pub fn sort_by_status(rows: &mut [ResourceRow]) {
    rows.sort_by(|a, b| {
        a.pulse
            .priority()
            .cmp(&b.pulse.priority())
            .then_with(|| a.name.cmp(&b.name))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use ocmscope_types::{
        NodeSpecs, ResourceRef, ResourceStatus, ResourceType, StatusModel, StatusModels,
    };

    fn node(resources: Vec<ResourceRef>, clusters: &[&str], replicas: usize) -> TopologyNode {
        TopologyNode {
            id: Some("member--pod--web".to_string()),
            name: "web".to_string(),
            namespace: Some("shop".to_string()),
            node_type: ResourceType::Pod,
            specs: NodeSpecs {
                resources,
                clusters_names: clusters.iter().map(|c| c.to_string()).collect(),
                replica_count: replicas,
                models: StatusModels::default(),
            },
        }
    }

    fn status(pulse: Option<Pulse>, name: &str) -> ResourceStatus {
        ResourceStatus {
            pulse,
            name: name.to_string(),
            namespace: Some("shop".to_string()),
        }
    }

    #[test]
    fn test_row_count_is_cross_product() {
        let n = node(
            vec![ResourceRef::new("a"), ResourceRef::new("b"), ResourceRef::new("c")],
            &["c1", "c2"],
            4,
        );
        assert_eq!(build_rows(&n).len(), 3 * 2 * 4);
    }

    #[test]
    fn test_replicas_capped() {
        let n = node(vec![ResourceRef::new("a")], &["c1"], usize::MAX);
        assert_eq!(build_rows(&n).len(), MAX_REPLICAS);
    }

    #[test]
    fn test_pinned_resource_only_on_its_cluster() {
        let n = node(
            vec![ResourceRef::new("a"), ResourceRef::new("b").pinned_to("c1")],
            &["c1", "c2", "c3"],
            2,
        );
        let rows = build_rows(&n);
        let b_rows: Vec<_> = rows.iter().filter(|r| r.name == "b").collect();
        assert_eq!(b_rows.len(), 2);
        assert!(b_rows.iter().all(|r| r.cluster == "c1"));
        assert_eq!(rows.len(), 3 * 2 + 2);
    }

    #[test]
    fn test_two_resources_two_clusters_example() {
        let n = node(
            vec![ResourceRef::new("a"), ResourceRef::new("b").pinned_to("c1")],
            &["c1", "c2"],
            2,
        );
        let rows = build_rows(&n);
        let summary: Vec<(&str, &str)> = rows
            .iter()
            .map(|r| (r.name.as_str(), r.cluster.as_str()))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("a", "c1"),
                ("a", "c1"),
                ("a", "c2"),
                ("a", "c2"),
                ("b", "c1"),
                ("b", "c1"),
            ]
        );
        assert!(rows.iter().all(|r| r.pulse == Pulse::Orange));
    }

    #[test]
    fn test_status_lookup_and_pending_default() {
        let mut n = node(vec![ResourceRef::new("web").with_namespace("shop")], &["east"], 3);
        let mut model = StatusModel::default();
        model.insert(
            "web-east-shop",
            vec![status(Some(Pulse::Red), "web-1"), status(None, "web-2")],
        );
        n.specs.models.insert(ResourceType::Pod, model);

        let rows = build_rows(&n);
        assert_eq!(rows.len(), 3);
        assert_eq!((rows[0].pulse, rows[0].name.as_str()), (Pulse::Red, "web-1"));
        // Third replica is unknown to the model
        assert_eq!((rows[1].pulse, rows[1].name.as_str()), (Pulse::Orange, "web"));
        assert_eq!((rows[2].pulse, rows[2].name.as_str()), (Pulse::Green, "web-2"));
    }

    #[test]
    fn test_model_of_other_type_is_ignored() {
        let mut n = node(vec![ResourceRef::new("web")], &["east"], 1);
        let mut model = StatusModel::default();
        model.insert("web-east", vec![status(Some(Pulse::Green), "web-1")]);
        n.specs.models.insert(ResourceType::Deployment, model);

        let rows = build_rows(&n);
        assert_eq!(rows[0].pulse, Pulse::Orange);
    }

    #[test]
    fn test_default_order_by_priority_then_name() {
        let mut rows = vec![
            ResourceRow {
                pulse: Pulse::Green,
                name: "alpha".to_string(),
                namespace: None,
                cluster: "c1".to_string(),
                resource_type: ResourceType::Pod,
            },
            ResourceRow {
                pulse: Pulse::Orange,
                name: "zeta".to_string(),
                namespace: None,
                cluster: "c1".to_string(),
                resource_type: ResourceType::Pod,
            },
            ResourceRow {
                pulse: Pulse::Red,
                name: "omega".to_string(),
                namespace: None,
                cluster: "c1".to_string(),
                resource_type: ResourceType::Pod,
            },
            ResourceRow {
                pulse: Pulse::Orange,
                name: "beta".to_string(),
                namespace: None,
                cluster: "c1".to_string(),
                resource_type: ResourceType::Pod,
            },
        ];
        sort_by_status(&mut rows);
        let names: Vec<_> = rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["omega", "beta", "zeta", "alpha"]);
    }

    #[test]
    fn test_no_clusters_no_rows() {
        let n = node(vec![ResourceRef::new("a")], &[], 3);
        assert!(build_rows(&n).is_empty());
    }
}
