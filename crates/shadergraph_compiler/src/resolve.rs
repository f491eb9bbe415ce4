// SPDX-License-Identifier: MIT OR Apache-2.0
//! Dynamic type resolution.
//!
//! A node's dynamic ports are grouped by marker. Each marker resolves to the
//! widest type among the outputs connected to its ports, or the lowest-arity
//! type when none are connected. Changes propagate downstream through a
//! worklist; termination relies on the graph being acyclic.

use crate::graph::Graph;
use crate::node::NodeId;
use crate::port::{InputKind, Marker, ValueType};

impl Graph {
    /// Re-resolve `seed` and everything downstream of a changed output
    pub(crate) fn resolve_from(&mut self, seed: NodeId) {
        let mut stack = vec![seed];
        while let Some(node_id) = stack.pop() {
            let changed = self.resolve_node(node_id);
            if changed.is_empty() {
                continue;
            }
            for edge in self.edges.values() {
                if edge.source == node_id && changed.iter().any(|port| *port == edge.source_port) {
                    stack.push(edge.target);
                }
            }
        }
    }

    /// Resolve one node's markers and outputs, returning the outputs whose type changed
    fn resolve_node(&mut self, node_id: NodeId) -> Vec<&'static str> {
        let Some(node) = self.nodes.get(&node_id) else {
            return Vec::new();
        };
        let kind = node.node_kind();

        let resolved: Vec<(Marker, ValueType)> = kind
            .markers()
            .into_iter()
            .map(|marker| (marker, self.marker_type(node_id, marker)))
            .collect();

        let Some(node) = self.nodes.get_mut(&node_id) else {
            return Vec::new();
        };
        for (marker, ty) in resolved {
            if node.dynamic_types.get(marker.name()) == Some(&ty) {
                continue;
            }
            tracing::debug!("Node {node_id} marker {} resolved to {ty}", marker.name());
            node.dynamic_types.insert(marker.name().to_string(), ty);
            for def in kind.inputs {
                if def.kind == InputKind::DynamicPort(marker) {
                    node.values.insert(def.id.to_string(), ty.zero_value());
                }
            }
        }

        let mut changed = Vec::new();
        for def in kind.outputs {
            let ty = node.compute_output_type(def);
            if node.output_types.get(def.id) != Some(&ty) {
                node.output_types.insert(def.id.to_string(), ty);
                changed.push(def.id);
            }
        }
        changed
    }

    /// Widest type among the outputs feeding the marker's ports
    fn marker_type(&self, node_id: NodeId, marker: Marker) -> ValueType {
        let Some(node) = self.nodes.get(&node_id) else {
            return ValueType::LOWEST;
        };
        node.node_kind()
            .inputs
            .iter()
            .filter(|def| def.kind == InputKind::DynamicPort(marker))
            .filter_map(|def| self.incoming_edge(node_id, def.id))
            .filter_map(|edge| self.nodes.get(&edge.source)?.output_type(&edge.source_port))
            .max()
            .unwrap_or(ValueType::LOWEST)
    }
}
