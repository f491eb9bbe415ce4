// SPDX-License-Identifier: MIT OR Apache-2.0
//! Editing session: a graph plus its latest compiled shader.
//!
//! Structural edits recompile. Editing a parameter-backed value only patches
//! the parameter table, since the generated source reads it at render time.

use crate::compiler::{parameter_name, CompiledShader, ParameterTable, ShaderCompiler};
use crate::edge::{Edge, EdgeId};
use crate::graph::{EdgeError, Graph, GraphError, ValueChange};
use crate::node::{KindId, Node, NodeId};
use crate::port::PortValue;

/// A graph being edited together with its compiled output
#[derive(Debug)]
pub struct ShaderSession {
    graph: Graph,
    compiler: ShaderCompiler,
    compiled: CompiledShader,
}

impl ShaderSession {
    /// Start a session on `graph`, compiling it immediately
    pub fn new(graph: Graph, compiler: ShaderCompiler) -> Self {
        let compiled = compiler.compile(&graph);
        Self {
            graph,
            compiler,
            compiled,
        }
    }

    /// Current graph
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Latest compiled shader
    pub fn compiled(&self) -> &CompiledShader {
        &self.compiled
    }

    /// Parameters the renderer should bind
    pub fn parameters(&self) -> &ParameterTable {
        &self.compiled.parameters
    }

    /// Compiler in use
    pub fn compiler(&self) -> &ShaderCompiler {
        &self.compiler
    }

    /// Mutable compiler access, e.g. to attach an optimizer once it loads.
    /// Call [`recompile`](Self::recompile) afterwards.
    pub fn compiler_mut(&mut self) -> &mut ShaderCompiler {
        &mut self.compiler
    }

    /// Add a node and recompile
    pub fn add_node(&mut self, kind: KindId) -> NodeId {
        let id = self.graph.add_node(kind);
        self.recompile();
        id
    }

    /// Remove a node and recompile
    pub fn remove_node(&mut self, node_id: NodeId) -> Option<Node> {
        let node = self.graph.remove_node(node_id)?;
        self.recompile();
        Some(node)
    }

    /// Connect two ports and recompile
    pub fn add_edge(
        &mut self,
        source: NodeId,
        source_port: &str,
        target: NodeId,
        target_port: &str,
    ) -> Result<EdgeId, EdgeError> {
        let id = self.graph.add_edge(source, source_port, target, target_port)?;
        self.recompile();
        Ok(id)
    }

    /// Remove an edge and recompile
    pub fn remove_edge(&mut self, edge_id: EdgeId) -> Option<Edge> {
        let edge = self.graph.remove_edge(edge_id)?;
        self.recompile();
        Some(edge)
    }

    /// Set an input or control value.
    ///
    /// Controls change the generated code and trigger a recompile. Other
    /// values update the matching parameter in place when the compiled
    /// shader declares one.
    pub fn set_value(
        &mut self,
        node_id: NodeId,
        port: &str,
        value: PortValue,
    ) -> Result<ValueChange, GraphError> {
        let change = self.graph.set_value(node_id, port, value.clone())?;
        match change {
            ValueChange::Control => self.recompile(),
            ValueChange::Parameter => {
                let name = parameter_name(node_id, port);
                if self.compiled.parameters.update(&name, value) {
                    tracing::debug!("Updated parameter {name}");
                }
            }
        }
        Ok(change)
    }

    /// Move a node; layout never affects compiled output
    pub fn set_position(&mut self, node_id: NodeId, position: [f32; 2]) -> Result<(), GraphError> {
        self.graph.set_position(node_id, position)
    }

    /// Recompile the current graph
    pub fn recompile(&mut self) {
        self.compiled = self.compiler.compile(&self.graph);
    }
}

impl Default for ShaderSession {
    fn default() -> Self {
        Self::new(Graph::default(), ShaderCompiler::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shaders::PLACEHOLDER_FRAGMENT_SHADER;

    #[test]
    fn test_structural_edits_recompile() {
        let mut session = ShaderSession::default();
        assert_eq!(session.compiled().fragment_source, PLACEHOLDER_FRAGMENT_SHADER);

        let color = session.add_node(KindId::Color);
        let out = session.add_node(KindId::FragmentOutput);
        assert!(session
            .compiled()
            .fragment_source
            .contains("uniform vec3 u_2_color;"));

        let edge = session.add_edge(color, "out", out, "color").unwrap();
        assert!(session.parameters().contains("u_1_color"));
        assert!(!session.parameters().contains("u_2_color"));

        session.remove_edge(edge).unwrap();
        assert!(session.parameters().contains("u_2_color"));
        assert!(!session.parameters().contains("u_1_color"));

        session.remove_node(out).unwrap();
        assert_eq!(session.compiled().fragment_source, PLACEHOLDER_FRAGMENT_SHADER);
    }

    #[test]
    fn test_parameter_edit_patches_table() {
        let mut session = ShaderSession::default();
        let color = session.add_node(KindId::Color);
        let out = session.add_node(KindId::FragmentOutput);
        session.add_edge(color, "out", out, "color").unwrap();
        let source = session.compiled().fragment_source.clone();

        let change = session
            .set_value(color, "color", PortValue::Vec3([0.0, 1.0, 0.0]))
            .unwrap();
        assert_eq!(change, ValueChange::Parameter);
        assert_eq!(session.compiled().fragment_source, source);
        assert_eq!(
            session.parameters().value("u_1_color"),
            Some(&PortValue::Vec3([0.0, 1.0, 0.0]))
        );
    }

    #[test]
    fn test_unreachable_parameter_edit_is_silent() {
        let mut session = ShaderSession::default();
        let value = session.add_node(KindId::Value);
        session.add_node(KindId::FragmentOutput);

        session.set_value(value, "value", PortValue::Float(2.0)).unwrap();
        assert!(!session.parameters().contains("u_1_value"));
        assert_eq!(
            session.graph().node(value).and_then(|n| n.value("value")),
            Some(&PortValue::Float(2.0))
        );
    }

    #[test]
    fn test_control_edit_recompiles() {
        let mut session = ShaderSession::default();
        let value = session.add_node(KindId::Value);
        let math = session.add_node(KindId::Math);
        let out = session.add_node(KindId::FragmentOutput);
        session.add_edge(value, "out", math, "a").unwrap();
        session.add_edge(math, "out", out, "color").unwrap();
        assert!(session.compiled().fragment_source.contains("o_2_out = o_1_out + u_2_b;"));

        session
            .set_value(math, "op", PortValue::Operator(crate::nodes::math::MathOp::Max))
            .unwrap();
        assert!(session
            .compiled()
            .fragment_source
            .contains("o_2_out = max(o_1_out, u_2_b);"));
    }

    #[test]
    fn test_failed_edits_leave_output_alone() {
        let mut session = ShaderSession::default();
        let mix = session.add_node(KindId::Mix);
        let before = session.compiled().clone();
        assert!(session.add_edge(mix, "out", mix, "a").is_err());
        assert!(session.set_value(mix, "a", PortValue::Vec4([0.0; 4])).is_err());
        assert_eq!(session.compiled(), &before);
        assert!(session.set_position(mix, [10.0, 20.0]).is_ok());
        assert!(session.set_position(NodeId(42), [0.0, 0.0]).is_err());
    }
}
