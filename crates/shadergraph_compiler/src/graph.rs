// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph data structure containing nodes and edges.
//!
//! Every mutation leaves the graph consistent: at most one edge per input,
//! no cycles, only type-compatible edges, and dynamic types resolved.

use crate::conversion::compatible;
use crate::edge::{Edge, EdgeId};
use crate::node::{KindId, Node, NodeId};
use crate::port::{InputKind, PortValue, ValueType};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A shader node graph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Graph {
    /// Graph name
    pub name: String,
    /// Next node ID to hand out
    next_node_id: u64,
    /// Nodes in the graph
    pub(crate) nodes: IndexMap<NodeId, Node>,
    /// Edges between nodes
    pub(crate) edges: IndexMap<EdgeId, Edge>,
}

/// What a successful [`Graph::set_value`] changed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueChange {
    /// A parameter-backed input; compiled code is unaffected
    Parameter,
    /// A control; compiled code must be regenerated
    Control,
}

impl Graph {
    /// Create a new empty graph
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            next_node_id: 1,
            nodes: IndexMap::new(),
            edges: IndexMap::new(),
        }
    }

    /// Add a node of the given kind
    pub fn add_node(&mut self, kind: KindId) -> NodeId {
        let id = NodeId(self.next_node_id);
        self.next_node_id += 1;
        self.nodes.insert(id, Node::new(id, kind));
        tracing::debug!("Added {kind} node {id}");
        id
    }

    /// Remove a node and its edges
    pub fn remove_node(&mut self, node_id: NodeId) -> Option<Node> {
        let node = self.nodes.shift_remove(&node_id)?;

        let mut downstream = Vec::new();
        for edge in self.edges.values().filter(|e| e.source == node_id) {
            if edge.target != node_id && !downstream.contains(&edge.target) {
                downstream.push(edge.target);
            }
        }
        self.edges.retain(|_, e| !e.involves_node(node_id));
        tracing::debug!("Removed {} node {node_id}", node.kind);

        for target in downstream {
            self.resolve_from(target);
        }
        Some(node)
    }

    /// Get a node by ID
    pub fn node(&self, node_id: NodeId) -> Option<&Node> {
        self.nodes.get(&node_id)
    }

    /// Get all nodes
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Get all node IDs
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }

    /// Get the number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Move a node on the canvas
    pub fn set_position(&mut self, node_id: NodeId, position: [f32; 2]) -> Result<(), GraphError> {
        let node = self
            .nodes
            .get_mut(&node_id)
            .ok_or(GraphError::NodeNotFound(node_id))?;
        node.position = position;
        Ok(())
    }

    /// The output node the compiler uses: the one with the lowest ID
    pub fn sink(&self) -> Option<NodeId> {
        self.nodes
            .values()
            .filter(|node| node.node_kind().is_sink())
            .map(|node| node.id)
            .min()
    }

    /// Connect an output port to an input port.
    ///
    /// An edge already occupying the input is replaced. On failure the graph
    /// is left unchanged.
    pub fn add_edge(
        &mut self,
        source: NodeId,
        source_port: &str,
        target: NodeId,
        target_port: &str,
    ) -> Result<EdgeId, EdgeError> {
        let source_node = self
            .nodes
            .get(&source)
            .ok_or(EdgeError::NodeNotFound(source))?;
        let target_node = self
            .nodes
            .get(&target)
            .ok_or(EdgeError::NodeNotFound(target))?;

        let from = match source_node.output_type(source_port) {
            Some(ty) => ty,
            None if source_node.node_kind().input(source_port).is_some() => {
                return Err(EdgeError::NotConnectable(source_port.to_string()));
            }
            None => return Err(EdgeError::port_not_found(source, source_port)),
        };

        let target_def = match target_node.node_kind().input(target_port) {
            Some(def) => def,
            None if target_node.node_kind().output(target_port).is_some() => {
                return Err(EdgeError::NotConnectable(target_port.to_string()));
            }
            None => return Err(EdgeError::port_not_found(target, target_port)),
        };
        if !target_def.kind.accepts_edges() {
            return Err(EdgeError::NotConnectable(target_port.to_string()));
        }
        let to = target_node
            .input_type(target_port)
            .ok_or_else(|| EdgeError::NotConnectable(target_port.to_string()))?;

        if !compatible(from, to) {
            return Err(EdgeError::IncompatibleTypes { from, to });
        }
        if self.would_create_cycle(source, target) {
            return Err(EdgeError::WouldCreateCycle);
        }

        let occupied: Vec<EdgeId> = self
            .edges
            .values()
            .filter(|e| e.targets(target, target_port))
            .map(|e| e.id)
            .collect();
        for id in occupied {
            self.edges.shift_remove(&id);
            tracing::debug!("Replaced edge into {target}.{target_port}");
        }

        let edge = Edge::new(source, source_port, target, target_port);
        let id = edge.id;
        self.edges.insert(id, edge);
        tracing::debug!("Connected {source}.{source_port} -> {target}.{target_port}");

        self.resolve_from(target);
        Ok(id)
    }

    /// Remove an edge
    pub fn remove_edge(&mut self, edge_id: EdgeId) -> Option<Edge> {
        let edge = self.edges.shift_remove(&edge_id)?;
        tracing::debug!(
            "Disconnected {}.{} -> {}.{}",
            edge.source,
            edge.source_port,
            edge.target,
            edge.target_port
        );
        self.resolve_from(edge.target);
        Some(edge)
    }

    /// Get an edge by ID
    pub fn edge(&self, edge_id: EdgeId) -> Option<&Edge> {
        self.edges.get(&edge_id)
    }

    /// Get all edges
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }

    /// Get the number of edges
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// The edge feeding an input, if any
    pub fn incoming_edge(&self, node_id: NodeId, port: &str) -> Option<&Edge> {
        self.edges.values().find(|e| e.targets(node_id, port))
    }

    /// Edges leaving a node
    pub fn edges_from(&self, node_id: NodeId) -> impl Iterator<Item = &Edge> {
        self.edges.values().filter(move |e| e.source == node_id)
    }

    /// Edges entering a node
    pub fn edges_to(&self, node_id: NodeId) -> impl Iterator<Item = &Edge> {
        self.edges.values().filter(move |e| e.target == node_id)
    }

    /// Whether an edge `source -> target` would close a cycle
    pub fn would_create_cycle(&self, source: NodeId, target: NodeId) -> bool {
        if source == target {
            return true;
        }

        let mut visited = HashSet::new();
        let mut stack = vec![target];
        while let Some(node_id) = stack.pop() {
            if !visited.insert(node_id) {
                continue;
            }
            for edge in self.edges_from(node_id) {
                if edge.target == source {
                    return true;
                }
                stack.push(edge.target);
            }
        }
        false
    }

    /// Update the locally held value of an input or control.
    ///
    /// The value must match what the slot holds: the slot's current type
    /// for inputs, the same kind of choice for controls.
    pub fn set_value(
        &mut self,
        node_id: NodeId,
        port: &str,
        value: PortValue,
    ) -> Result<ValueChange, GraphError> {
        let node = self
            .nodes
            .get(&node_id)
            .ok_or(GraphError::NodeNotFound(node_id))?;
        let kind = node.node_kind();
        let def = match kind.input(port) {
            Some(def) => def,
            None if kind.output(port).is_some() => {
                return Err(GraphError::NotAValuePort(port.to_string()));
            }
            None => return Err(GraphError::port_not_found(node_id, port)),
        };

        let change = match def.kind {
            InputKind::Control => {
                if !def.default.same_variant(&value) {
                    return Err(GraphError::ValueMismatch {
                        expected: def.default.describe(),
                        found: value.describe(),
                    });
                }
                // type controls select a vector arity
                if value.as_type() == Some(ValueType::Float) {
                    return Err(GraphError::ValueMismatch {
                        expected: "vector type",
                        found: ValueType::Float.glsl_name(),
                    });
                }
                ValueChange::Control
            }
            _ => {
                let expected = node.input_type(port).unwrap_or(ValueType::LOWEST);
                if value.value_type() != Some(expected) {
                    return Err(GraphError::ValueMismatch {
                        expected: expected.glsl_name(),
                        found: value.describe(),
                    });
                }
                ValueChange::Parameter
            }
        };

        if let Some(node) = self.nodes.get_mut(&node_id) {
            node.values.insert(port.to_string(), value);
        }
        if change == ValueChange::Control {
            // type controls feed selected outputs
            self.resolve_from(node_id);
        }
        Ok(change)
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new("Untitled")
    }
}

/// Error when adding an edge
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EdgeError {
    /// Node not found
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    /// Port not found
    #[error("Port not found: {node}.{port}")]
    PortNotFound {
        /// Node the port was looked up on
        node: NodeId,
        /// Port ID
        port: String,
    },

    /// Port exists but cannot carry this end of an edge
    #[error("Port `{0}` cannot be connected")]
    NotConnectable(String),

    /// Incompatible port types
    #[error("Incompatible types: {from} cannot flow into {to}")]
    IncompatibleTypes {
        /// Source output type
        from: ValueType,
        /// Target input type
        to: ValueType,
    },

    /// The edge would close a cycle
    #[error("Edge would create a cycle")]
    WouldCreateCycle,
}

impl EdgeError {
    fn port_not_found(node: NodeId, port: &str) -> Self {
        Self::PortNotFound {
            node,
            port: port.to_string(),
        }
    }
}

/// Error when mutating node state
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GraphError {
    /// Node not found
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    /// Port not found
    #[error("Port not found: {node}.{port}")]
    PortNotFound {
        /// Node the port was looked up on
        node: NodeId,
        /// Port ID
        port: String,
    },

    /// Outputs hold no value
    #[error("Port `{0}` is an output and holds no value")]
    NotAValuePort(String),

    /// Value does not fit the slot
    #[error("Value mismatch: expected {expected}, found {found}")]
    ValueMismatch {
        /// What the slot holds
        expected: &'static str,
        /// What was supplied
        found: &'static str,
    },
}

impl GraphError {
    fn port_not_found(node: NodeId, port: &str) -> Self {
        Self::PortNotFound {
            node,
            port: port.to_string(),
        }
    }
}
