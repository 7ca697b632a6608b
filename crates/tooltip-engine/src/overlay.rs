//! Bookkeeping for the overlay containers shared by every chart on a page
//!
//! A container is registered lazily when the first chart attaches a node to
//! it and dropped when the last chart holding it is released. Each node is
//! owned by exactly one chart, so charts can be torn down independently.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use uuid::Uuid;

#[derive(Debug, Default)]
struct ContainerEntry {
    charts: HashSet<Uuid>,
    nodes: HashMap<String, Uuid>,
}

// The UI thread is the only thread that touches tooltips
thread_local! {
    static CONTAINERS: RefCell<HashMap<String, ContainerEntry>> = RefCell::new(HashMap::new());
}

/// Outcome of releasing a chart's claim on a container
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Release {
    /// Nodes the chart still had registered when it was released
    pub orphaned_nodes: Vec<String>,
    /// The container was dropped because no chart holds it any more
    pub container_removed: bool,
}

/// Registry of shared overlay containers
pub struct OverlayRegistry;

impl OverlayRegistry {
    /// Register a node for a chart; returns true when the container was
    /// registered by this call
    pub fn attach_node(container_id: &str, chart_id: Uuid, node_id: &str) -> bool {
        CONTAINERS.with(|containers| {
            let mut containers = containers.borrow_mut();
            let created = !containers.contains_key(container_id);
            let entry = containers.entry(container_id.to_string()).or_default();
            entry.charts.insert(chart_id);
            entry.nodes.insert(node_id.to_string(), chart_id);
            created
        })
    }

    pub fn detach_node(container_id: &str, node_id: &str) -> bool {
        CONTAINERS.with(|containers| {
            containers
                .borrow_mut()
                .get_mut(container_id)
                .map(|entry| entry.nodes.remove(node_id).is_some())
                .unwrap_or(false)
        })
    }

    /// Drop a chart's claim and every node it still owns
    pub fn release_chart(container_id: &str, chart_id: Uuid) -> Release {
        CONTAINERS.with(|containers| {
            let mut containers = containers.borrow_mut();
            let Some(entry) = containers.get_mut(container_id) else {
                return Release::default();
            };

            let mut orphaned_nodes: Vec<String> = entry
                .nodes
                .iter()
                .filter(|(_, owner)| **owner == chart_id)
                .map(|(node_id, _)| node_id.clone())
                .collect();
            orphaned_nodes.sort();

            for node_id in &orphaned_nodes {
                entry.nodes.remove(node_id);
            }
            entry.charts.remove(&chart_id);

            let container_removed = entry.charts.is_empty();
            if container_removed {
                containers.remove(container_id);
            }

            Release {
                orphaned_nodes,
                container_removed,
            }
        })
    }

    pub fn contains_container(container_id: &str) -> bool {
        CONTAINERS.with(|containers| containers.borrow().contains_key(container_id))
    }

    pub fn node_count(container_id: &str) -> usize {
        CONTAINERS.with(|containers| {
            containers
                .borrow()
                .get(container_id)
                .map(|entry| entry.nodes.len())
                .unwrap_or(0)
        })
    }

    pub fn chart_count(container_id: &str) -> usize {
        CONTAINERS.with(|containers| {
            containers
                .borrow()
                .get(container_id)
                .map(|entry| entry.charts.len())
                .unwrap_or(0)
        })
    }

    pub fn nodes_owned_by(container_id: &str, chart_id: Uuid) -> Vec<String> {
        CONTAINERS.with(|containers| {
            let containers = containers.borrow();
            let mut nodes: Vec<String> = containers
                .get(container_id)
                .map(|entry| {
                    entry
                        .nodes
                        .iter()
                        .filter(|(_, owner)| **owner == chart_id)
                        .map(|(node_id, _)| node_id.clone())
                        .collect()
                })
                .unwrap_or_default();
            nodes.sort();
            nodes
        })
    }

    /// Forget every container (useful for cleanup)
    pub fn clear_all() {
        CONTAINERS.with(|containers| containers.borrow_mut().clear());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_container_created_lazily_and_shared() {
        OverlayRegistry::clear_all();
        let chart_a = Uuid::new_v4();
        let chart_b = Uuid::new_v4();

        assert!(!OverlayRegistry::contains_container("tips"));
        assert!(OverlayRegistry::attach_node("tips", chart_a, "a-1"));
        assert!(!OverlayRegistry::attach_node("tips", chart_b, "b-1"));
        assert!(!OverlayRegistry::attach_node("tips", chart_a, "a-2"));

        assert_eq!(OverlayRegistry::node_count("tips"), 3);
        assert_eq!(OverlayRegistry::chart_count("tips"), 2);
        assert_eq!(OverlayRegistry::nodes_owned_by("tips", chart_a), vec!["a-1", "a-2"]);
    }

    #[test]
    fn test_release_is_chart_scoped() {
        OverlayRegistry::clear_all();
        let chart_a = Uuid::new_v4();
        let chart_b = Uuid::new_v4();
        OverlayRegistry::attach_node("tips", chart_a, "a-1");
        OverlayRegistry::attach_node("tips", chart_b, "b-1");

        let release = OverlayRegistry::release_chart("tips", chart_a);
        assert_eq!(release.orphaned_nodes, vec!["a-1"]);
        assert!(!release.container_removed);
        assert_eq!(OverlayRegistry::nodes_owned_by("tips", chart_b), vec!["b-1"]);

        assert!(OverlayRegistry::detach_node("tips", "b-1"));
        assert!(!OverlayRegistry::detach_node("tips", "b-1"));

        let release = OverlayRegistry::release_chart("tips", chart_b);
        assert!(release.orphaned_nodes.is_empty());
        assert!(release.container_removed);
        assert!(!OverlayRegistry::contains_container("tips"));
    }

    #[test]
    fn test_release_unknown_container_is_noop() {
        OverlayRegistry::clear_all();
        assert_eq!(
            OverlayRegistry::release_chart("missing", Uuid::new_v4()),
            Release::default()
        );
        assert_eq!(OverlayRegistry::node_count("missing"), 0);
    }
}
