//! Validation layer implementations
//!
//! Each layer validates a specific aspect of the workflow:
//! - Layer 1: Nodes - ids, types, per-type configuration
//! - Layer 2: Start - exactly one start node
//! - Layer 3: Edges - endpoints exist, no self-loops
//! - Layer 4: Graph - every node reachable from start
//!
//! Layers are fail-fast: the first violation aborts the whole check.

use std::collections::HashSet;

use crate::errors::{EdgeEndpoint, StructuralError};
use crate::flow_graph::FlowGraph;
use crate::workflow::{Edge, EdgeDef, Node, NodeConfig, NodeDef, NodeType};

/// Layer 1: Validate node definitions
pub fn validate_nodes(nodes: &[NodeDef]) -> Result<Vec<Node>, StructuralError> {
    if nodes.is_empty() {
        return Err(StructuralError::EmptyDefinition);
    }

    let mut seen_ids: HashSet<&str> = HashSet::with_capacity(nodes.len());
    let mut validated = Vec::with_capacity(nodes.len());

    for (index, node) in nodes.iter().enumerate() {
        let (Some(id), Some(raw_type)) = (node.id.as_deref(), node.node_type.as_deref()) else {
            return Err(StructuralError::MissingNodeFields { index });
        };

        if !seen_ids.insert(id) {
            return Err(StructuralError::DuplicateNodeId { id: id.to_string() });
        }

        let node_type: NodeType =
            raw_type
                .parse()
                .map_err(|_| StructuralError::InvalidNodeType {
                    id: id.to_string(),
                    node_type: raw_type.to_string(),
                })?;

        let config = validate_node_configuration(id, node_type, node)?;
        validated.push(Node {
            id: id.to_string(),
            config,
            data: node.data.clone(),
        });
    }

    Ok(validated)
}

/// Per-type field check, dispatched on the node type
pub fn validate_node_configuration(
    id: &str,
    node_type: NodeType,
    node: &NodeDef,
) -> Result<NodeConfig, StructuralError> {
    NodeConfig::from_data(id, node_type, &node.data)
}

/// Layer 2: Exactly one start node; returns its id
pub fn validate_start_node(nodes: &[Node]) -> Result<&str, StructuralError> {
    let starts: Vec<&str> = nodes
        .iter()
        .filter(|n| n.node_type() == NodeType::Start)
        .map(|n| n.id.as_str())
        .collect();

    match starts.as_slice() {
        [] => Err(StructuralError::MissingStartNode),
        [start] => Ok(*start),
        _ => Err(StructuralError::MultipleStartNodes {
            ids: starts.iter().map(|s| s.to_string()).collect(),
        }),
    }
}

/// Layer 3: Validate edge connections
pub fn validate_edges(edges: &[EdgeDef], nodes: &[Node]) -> Result<Vec<Edge>, StructuralError> {
    let node_ids: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
    let mut validated = Vec::with_capacity(edges.len());

    for (index, edge) in edges.iter().enumerate() {
        let (Some(source), Some(target)) = (edge.source.as_deref(), edge.target.as_deref()) else {
            return Err(StructuralError::MissingEdgeFields { index });
        };

        if !node_ids.contains(source) {
            return Err(StructuralError::DanglingEdgeReference {
                endpoint: EdgeEndpoint::Source,
                id: source.to_string(),
            });
        }

        if !node_ids.contains(target) {
            return Err(StructuralError::DanglingEdgeReference {
                endpoint: EdgeEndpoint::Target,
                id: target.to_string(),
            });
        }

        if source == target {
            return Err(StructuralError::SelfLoopEdge {
                id: source.to_string(),
            });
        }

        validated.push(Edge {
            source: source.to_string(),
            target: target.to_string(),
        });
    }

    Ok(validated)
}

/// Layer 4: Every node must be reachable from the start node
///
/// Cycles among non-start nodes are allowed; only orphans are rejected.
pub fn validate_reachability(
    nodes: &[Node],
    edges: &[Edge],
    start_node: &str,
) -> Result<(), StructuralError> {
    let graph = FlowGraph::new(nodes.iter().map(|n| n.id.as_str()), edges);
    let unreachable = graph.unreachable_from(start_node);

    if unreachable.is_empty() {
        Ok(())
    } else {
        Err(StructuralError::UnreachableNodes {
            ids: unreachable.into_iter().map(String::from).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed(defs: &[NodeDef]) -> Vec<Node> {
        validate_nodes(defs).unwrap()
    }

    // ========== Layer 1: Node Validation ==========

    #[test]
    fn test_validate_nodes_valid() {
        let nodes = typed(&[NodeDef::new("a", "start"), NodeDef::new("b", "action")]);
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[1].node_type(), NodeType::Action);
    }

    #[test]
    fn test_validate_nodes_empty() {
        assert_eq!(validate_nodes(&[]), Err(StructuralError::EmptyDefinition));
    }

    #[test]
    fn test_validate_nodes_missing_type() {
        let defs = vec![
            NodeDef::new("a", "start"),
            NodeDef {
                id: Some("b".to_string()),
                ..Default::default()
            },
        ];
        assert_eq!(
            validate_nodes(&defs),
            Err(StructuralError::MissingNodeFields { index: 1 })
        );
    }

    #[test]
    fn test_validate_nodes_duplicate_before_type_check() {
        // The duplicate is reported even though its type is also invalid
        let defs = vec![NodeDef::new("a", "start"), NodeDef::new("a", "bogus")];
        assert_eq!(
            validate_nodes(&defs),
            Err(StructuralError::DuplicateNodeId {
                id: "a".to_string()
            })
        );
    }

    #[test]
    fn test_validate_nodes_invalid_type() {
        let defs = vec![NodeDef::new("a", "start"), NodeDef::new("b", "sms")];
        assert_eq!(
            validate_nodes(&defs),
            Err(StructuralError::InvalidNodeType {
                id: "b".to_string(),
                node_type: "sms".to_string()
            })
        );
    }

    #[test]
    fn test_validate_nodes_dispatches_configuration() {
        let defs = vec![
            NodeDef::new("a", "start"),
            NodeDef::new("w", "webhook").with("url", "not-a-url"),
        ];
        assert!(matches!(
            validate_nodes(&defs),
            Err(StructuralError::InvalidWebhookUrl { .. })
        ));
    }

    // ========== Layer 2: Start Node ==========

    #[test]
    fn test_validate_start_node() {
        let nodes = typed(&[NodeDef::new("b", "action"), NodeDef::new("a", "start")]);
        assert_eq!(validate_start_node(&nodes), Ok("a"));

        let nodes = typed(&[NodeDef::new("b", "action")]);
        assert_eq!(
            validate_start_node(&nodes),
            Err(StructuralError::MissingStartNode)
        );

        let nodes = typed(&[NodeDef::new("a", "start"), NodeDef::new("b", "start")]);
        assert_eq!(
            validate_start_node(&nodes),
            Err(StructuralError::MultipleStartNodes {
                ids: vec!["a".to_string(), "b".to_string()]
            })
        );
    }

    // ========== Layer 3: Edge Validation ==========

    #[test]
    fn test_validate_edges_dangling_source_and_target() {
        let nodes = typed(&[NodeDef::new("a", "start")]);

        let err = validate_edges(&[EdgeDef::new("ghost", "a")], &nodes);
        assert_eq!(
            err,
            Err(StructuralError::DanglingEdgeReference {
                endpoint: EdgeEndpoint::Source,
                id: "ghost".to_string()
            })
        );

        let err = validate_edges(&[EdgeDef::new("a", "ghost")], &nodes);
        assert_eq!(
            err,
            Err(StructuralError::DanglingEdgeReference {
                endpoint: EdgeEndpoint::Target,
                id: "ghost".to_string()
            })
        );
    }

    #[test]
    fn test_validate_edges_self_loop() {
        let nodes = typed(&[NodeDef::new("a", "start")]);
        assert_eq!(
            validate_edges(&[EdgeDef::new("a", "a")], &nodes),
            Err(StructuralError::SelfLoopEdge { id: "a".to_string() })
        );
    }

    #[test]
    fn test_validate_edges_missing_fields() {
        let nodes = typed(&[NodeDef::new("a", "start"), NodeDef::new("b", "end")]);
        let edges = vec![
            EdgeDef::new("a", "b"),
            EdgeDef {
                source: Some("a".to_string()),
                target: None,
            },
        ];
        assert_eq!(
            validate_edges(&edges, &nodes),
            Err(StructuralError::MissingEdgeFields { index: 1 })
        );
    }

    #[test]
    fn test_validate_edges_allows_parallel_edges() {
        let nodes = typed(&[NodeDef::new("a", "start"), NodeDef::new("b", "end")]);
        let edges = validate_edges(&[EdgeDef::new("a", "b"), EdgeDef::new("a", "b")], &nodes);
        assert_eq!(edges.map(|e| e.len()), Ok(2));
    }

    // ========== Layer 4: Graph ==========

    #[test]
    fn test_validate_reachability_reports_all_orphans() {
        let nodes = typed(&[
            NodeDef::new("s", "start"),
            NodeDef::new("x", "action"),
            NodeDef::new("y", "action"),
            NodeDef::new("z", "end"),
        ]);
        let edges = vec![Edge {
            source: "s".to_string(),
            target: "y".to_string(),
        }];
        assert_eq!(
            validate_reachability(&nodes, &edges, "s"),
            Err(StructuralError::UnreachableNodes {
                ids: vec!["x".to_string(), "z".to_string()]
            })
        );
    }

    #[test]
    fn test_validate_reachability_allows_cycles() {
        let nodes = typed(&[
            NodeDef::new("s", "start"),
            NodeDef::new("x", "condition"),
            NodeDef::new("y", "action"),
        ]);
        let edges = vec![
            Edge {
                source: "s".to_string(),
                target: "x".to_string(),
            },
            Edge {
                source: "x".to_string(),
                target: "y".to_string(),
            },
            Edge {
                source: "y".to_string(),
                target: "x".to_string(),
            },
        ];
        assert_eq!(validate_reachability(&nodes, &edges, "s"), Ok(()));
    }
}
