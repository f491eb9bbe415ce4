// SPDX-License-Identifier: MIT OR Apache-2.0
//! Compile scheduling: which nodes to emit and in what order.
//!
//! Both walks use an explicit stack, so their depth does not depend on the
//! host's recursion limit.

use crate::graph::Graph;
use crate::node::NodeId;
use indexmap::{IndexMap, IndexSet};
use std::collections::HashSet;

/// Nodes that can influence `sink`, found by following edges backward
pub fn reachable_from(graph: &Graph, sink: NodeId) -> IndexSet<NodeId> {
    let mut reachable = IndexSet::new();
    if graph.node(sink).is_none() {
        return reachable;
    }

    reachable.insert(sink);
    let mut stack = vec![sink];
    while let Some(node_id) = stack.pop() {
        for edge in graph.edges_to(node_id) {
            if reachable.insert(edge.source) {
                stack.push(edge.source);
            }
        }
    }
    reachable
}

/// Order `nodes` so every producer precedes its consumers.
///
/// Depth-first postorder over outgoing edges restricted to `nodes`, started
/// from each unvisited node in set order, then reversed.
pub fn topological_order(graph: &Graph, nodes: &IndexSet<NodeId>) -> Vec<NodeId> {
    let mut successors: IndexMap<NodeId, Vec<NodeId>> =
        nodes.iter().map(|id| (*id, Vec::new())).collect();
    for edge in graph.edges() {
        if !nodes.contains(&edge.target) {
            continue;
        }
        if let Some(targets) = successors.get_mut(&edge.source) {
            if !targets.contains(&edge.target) {
                targets.push(edge.target);
            }
        }
    }

    let mut visited = HashSet::new();
    let mut postorder = Vec::with_capacity(nodes.len());
    for &start in nodes {
        if !visited.insert(start) {
            continue;
        }
        let mut stack = vec![(start, 0usize)];
        while let Some(&(node_id, next)) = stack.last() {
            let next_child = successors
                .get(&node_id)
                .and_then(|targets| targets.get(next))
                .copied();
            match next_child {
                Some(child) => {
                    if let Some(top) = stack.last_mut() {
                        top.1 += 1;
                    }
                    if visited.insert(child) {
                        stack.push((child, 0));
                    }
                }
                None => {
                    postorder.push(node_id);
                    stack.pop();
                }
            }
        }
    }

    postorder.reverse();
    postorder
}
