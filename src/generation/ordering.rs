//! Dependency ordering of models
//!
//! Referenced models are emitted before the models that reference them. Models
//! that reference each other (including self references) form a strongly
//! connected component; inside a component the document order is kept and the
//! references pointing at a later model are marked `forward`.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use petgraph::Direction;
use petgraph::algo::condensation;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;

use crate::generation::ir::ModelDef;

/// Sort models so that every referenced model precedes its referrers, assign
/// `order_index`, and mark forward references.
///
/// Independent models keep their relative document order.
pub fn order_models(models: Vec<ModelDef>) -> Vec<ModelDef> {
    let mut graph: DiGraph<usize, ()> = DiGraph::new();
    let nodes: Vec<NodeIndex> = (0..models.len()).map(|index| graph.add_node(index)).collect();
    let by_name: HashMap<&str, NodeIndex> = models
        .iter()
        .zip(&nodes)
        .map(|(model, node)| (model.name.as_str(), *node))
        .collect();

    for (model, &node) in models.iter().zip(&nodes) {
        for target in model.references() {
            match by_name.get(target) {
                Some(&target) => {
                    graph.update_edge(node, target, ());
                }
                None => tracing::warn!(model = %model.name, target = %target, "Reference to unknown model"),
            }
        }
    }

    let components = condensation(graph, true);

    // A component is ready once every component it depends on was emitted
    let mut pending: Vec<usize> = components
        .node_indices()
        .map(|node| components.edges_directed(node, Direction::Outgoing).count())
        .collect();
    let mut ready: BinaryHeap<Reverse<(usize, NodeIndex)>> = components
        .node_indices()
        .filter(|node| pending[node.index()] == 0)
        .map(|node| Reverse((first_position(&components[node]), node)))
        .collect();

    let mut sequence = Vec::with_capacity(models.len());
    while let Some(Reverse((_, node))) = ready.pop() {
        let mut members = components[node].clone();
        members.sort_unstable();
        sequence.extend(members);

        for edge in components.edges_directed(node, Direction::Incoming) {
            let dependent = edge.source();
            pending[dependent.index()] -= 1;
            if pending[dependent.index()] == 0 {
                ready.push(Reverse((first_position(&components[dependent]), dependent)));
            }
        }
    }

    let mut slots: Vec<Option<ModelDef>> = models.into_iter().map(Some).collect();
    let mut ordered: Vec<ModelDef> = sequence
        .into_iter()
        .filter_map(|index| slots[index].take())
        .collect();

    let positions: HashMap<String, usize> = ordered
        .iter()
        .enumerate()
        .map(|(position, model)| (model.name.clone(), position))
        .collect();

    for (position, model) in ordered.iter_mut().enumerate() {
        model.order_index = position;
        let model_name = model.name.clone();
        for field in &mut model.fields {
            field.kind.map_reference(&mut |target: &str, forward: &mut bool| {
                *forward = positions
                    .get(target)
                    .is_some_and(|&target_position| target_position >= position);
                if *forward {
                    tracing::debug!(model = %model_name, target = %target, "Forward reference");
                }
                None
            });
        }
    }

    ordered
}

fn first_position(members: &[usize]) -> usize {
    members.iter().copied().min().unwrap_or(usize::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::ir::{Field, ModelOrigin, SchemaTypeKind, Visibility};

    fn reference(name: &str, target: &str) -> Field {
        Field {
            name: name.to_string(),
            wire_name: name.to_string(),
            kind: SchemaTypeKind::reference(target),
            optional: true,
            nullable: false,
            visibility: Visibility::Standard,
        }
    }

    fn model(name: &str, fields: Vec<Field>) -> ModelDef {
        ModelDef {
            name: name.to_string(),
            fields,
            validators: vec![],
            order_index: 0,
            variant: None,
            origin: ModelOrigin::Component {
                schema: name.to_string(),
            },
        }
    }

    fn names(models: &[ModelDef]) -> Vec<&str> {
        models.iter().map(|model| model.name.as_str()).collect()
    }

    fn is_forward(model: &ModelDef, field: &str) -> bool {
        matches!(
            model.field(field).map(|field| &field.kind),
            Some(SchemaTypeKind::Reference { forward: true, .. })
        )
    }

    #[test]
    fn test_referenced_model_comes_first() {
        let ordered = order_models(vec![
            model("Order", vec![reference("shipTo", "Address")]),
            model("Address", vec![]),
        ]);

        assert_eq!(names(&ordered), vec!["Address", "Order"]);
        assert_eq!(ordered[0].order_index, 0);
        assert_eq!(ordered[1].order_index, 1);
        assert!(!is_forward(&ordered[1], "shipTo"));
    }

    #[test]
    fn test_independent_models_keep_document_order() {
        let ordered = order_models(vec![
            model("Zebra", vec![]),
            model("Pet", vec![reference("category", "Category")]),
            model("Apple", vec![]),
            model("Category", vec![]),
        ]);

        assert_eq!(names(&ordered), vec!["Zebra", "Apple", "Category", "Pet"]);
    }

    #[test]
    fn test_transitive_dependencies() {
        let ordered = order_models(vec![
            model("A", vec![reference("b", "B")]),
            model("B", vec![reference("c", "C")]),
            model("C", vec![]),
        ]);

        assert_eq!(names(&ordered), vec!["C", "B", "A"]);
    }

    #[test]
    fn test_self_reference_is_forward() {
        let ordered = order_models(vec![model("Node", vec![reference("parent", "Node")])]);

        assert_eq!(names(&ordered), vec!["Node"]);
        assert!(is_forward(&ordered[0], "parent"));
    }

    #[test]
    fn test_cycle_keeps_document_order() {
        let ordered = order_models(vec![
            model("Leaf", vec![]),
            model("Employee", vec![reference("team", "Team"), reference("badge", "Leaf")]),
            model("Team", vec![reference("lead", "Employee")]),
        ]);

        assert_eq!(names(&ordered), vec!["Leaf", "Employee", "Team"]);
        assert!(is_forward(&ordered[1], "team"));
        assert!(!is_forward(&ordered[1], "badge"));
        assert!(!is_forward(&ordered[2], "lead"));
    }

    #[test]
    fn test_model_after_cycle() {
        let ordered = order_models(vec![
            model("Report", vec![reference("team", "Team")]),
            model("Employee", vec![reference("team", "Team")]),
            model("Team", vec![reference("lead", "Employee")]),
        ]);

        assert_eq!(names(&ordered), vec!["Employee", "Team", "Report"]);
    }
}
