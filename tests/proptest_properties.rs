//! Property tests for structural validation

use flowgate::workflow::{EdgeDef, NodeDef};
use flowgate::{validate_structure, StructuralError, WorkflowDefinition};
use proptest::prelude::*;

const PLAIN_TYPES: [&str; 5] = ["action", "end", "condition", "database", "api_call"];

fn node_id(i: usize) -> String {
    format!("n{i}")
}

/// Node 0 is the start node, the rest get plain types
fn nodes_strategy() -> impl Strategy<Value = Vec<NodeDef>> {
    prop::collection::vec(prop::sample::select(PLAIN_TYPES.to_vec()), 1..16).prop_map(|types| {
        let mut nodes = vec![NodeDef::new(node_id(0), "start")];
        nodes.extend(
            types
                .into_iter()
                .enumerate()
                .map(|(i, t)| NodeDef::new(node_id(i + 1), t)),
        );
        nodes
    })
}

fn chain(count: usize) -> Vec<EdgeDef> {
    (1..count)
        .map(|i| EdgeDef::new(node_id(i - 1), node_id(i)))
        .collect()
}

proptest! {
    #[test]
    fn chain_from_start_is_valid(nodes in nodes_strategy()) {
        let edges = chain(nodes.len());
        let definition = WorkflowDefinition { nodes, edges };
        let workflow = validate_structure(&definition).unwrap();
        prop_assert_eq!(workflow.start_node.as_str(), "n0");
    }

    #[test]
    fn random_edges_from_start_cover_everything(
        nodes in nodes_strategy(),
        seed in prop::collection::vec(any::<prop::sample::Index>(), 16),
    ) {
        // Every node i > 0 gets one parent with a smaller index
        let edges: Vec<EdgeDef> = (1..nodes.len())
            .map(|i| EdgeDef::new(node_id(seed[i % seed.len()].index(i)), node_id(i)))
            .collect();
        let definition = WorkflowDefinition { nodes, edges };
        prop_assert!(validate_structure(&definition).is_ok());
    }

    #[test]
    fn dropping_an_edge_leaves_nodes_unreachable(
        nodes in nodes_strategy(),
        cut in any::<prop::sample::Index>(),
    ) {
        let mut edges = chain(nodes.len());
        let removed = edges.remove(cut.index(edges.len()));
        let definition = WorkflowDefinition { nodes, edges };

        match validate_structure(&definition) {
            Err(StructuralError::UnreachableNodes { ids }) => {
                prop_assert_eq!(ids.first(), removed.target.as_ref());
            }
            other => prop_assert!(false, "expected UnreachableNodes, got {:?}", other),
        }
    }

    #[test]
    fn no_start_node_is_rejected(types in prop::collection::vec(prop::sample::select(PLAIN_TYPES.to_vec()), 1..16)) {
        let nodes = types
            .into_iter()
            .enumerate()
            .map(|(i, t)| NodeDef::new(node_id(i), t))
            .collect();
        let definition = WorkflowDefinition { nodes, edges: vec![] };
        prop_assert_eq!(validate_structure(&definition).unwrap_err(), StructuralError::MissingStartNode);
    }

    #[test]
    fn several_start_nodes_are_rejected(extra in 1usize..5, nodes in nodes_strategy()) {
        let mut nodes = nodes;
        for i in 0..extra {
            nodes.push(NodeDef::new(format!("s{i}"), "start"));
        }
        let edges = chain(nodes.len() - extra);
        let definition = WorkflowDefinition { nodes, edges };

        match validate_structure(&definition) {
            Err(StructuralError::MultipleStartNodes { ids }) => prop_assert_eq!(ids.len(), extra + 1),
            other => prop_assert!(false, "expected MultipleStartNodes, got {:?}", other),
        }
    }

    #[test]
    fn self_loops_are_rejected(nodes in nodes_strategy(), pick in any::<prop::sample::Index>()) {
        let looped = node_id(pick.index(nodes.len()));
        let mut edges = chain(nodes.len());
        edges.push(EdgeDef::new(&looped, &looped));
        let definition = WorkflowDefinition { nodes, edges };

        prop_assert_eq!(
            validate_structure(&definition).unwrap_err(),
            StructuralError::SelfLoopEdge { id: looped }
        );
    }

    #[test]
    fn dangling_references_are_rejected(nodes in nodes_strategy(), as_source in any::<bool>()) {
        let mut edges = chain(nodes.len());
        edges.push(if as_source {
            EdgeDef::new("ghost", "n0")
        } else {
            EdgeDef::new("n0", "ghost")
        });
        let definition = WorkflowDefinition { nodes, edges };

        let is_dangling = matches!(
            validate_structure(&definition),
            Err(StructuralError::DanglingEdgeReference { ref id, .. }) if id == "ghost"
        );
        prop_assert!(is_dangling);
    }

    #[test]
    fn validation_is_idempotent(nodes in nodes_strategy(), keep in any::<prop::sample::Index>()) {
        let mut edges = chain(nodes.len());
        edges.truncate(keep.index(edges.len() + 1));
        let definition = WorkflowDefinition { nodes, edges };

        let first = validate_structure(&definition).map(|w| w.complexity_score());
        let second = validate_structure(&definition).map(|w| w.complexity_score());
        prop_assert_eq!(first, second);
    }
}
