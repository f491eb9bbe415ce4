// SPDX-License-Identifier: MIT OR Apache-2.0
//! Sample graph compiled by the driver.

use shadergraph_compiler::nodes::math::MathOp;
use shadergraph_compiler::{EdgeError, Graph, GraphError, KindId, PortValue};

/// Failure while assembling the sample graph
#[derive(Debug, thiserror::Error)]
pub enum DemoError {
    /// An edge was rejected
    #[error(transparent)]
    Edge(#[from] EdgeError),
    /// A value was rejected
    #[error(transparent)]
    Value(#[from] GraphError),
}

/// Normal-tinted color: `mix(color, normal) * brightness`
pub fn tinted_normals() -> Result<Graph, DemoError> {
    let mut graph = Graph::new("Tinted normals");

    let normal = graph.add_node(KindId::Normal);
    let color = graph.add_node(KindId::Color);
    let mix = graph.add_node(KindId::Mix);
    let brightness = graph.add_node(KindId::Value);
    let math = graph.add_node(KindId::Math);
    let output = graph.add_node(KindId::FragmentOutput);

    graph.set_value(color, "color", PortValue::Vec3([1.0, 0.5, 0.25]))?;
    graph.set_value(brightness, "value", PortValue::Float(1.5))?;
    graph.set_value(math, "op", PortValue::Operator(MathOp::Multiply))?;

    graph.add_edge(normal, "out", mix, "a")?;
    graph.add_edge(color, "out", mix, "b")?;
    graph.add_edge(mix, "out", math, "a")?;
    graph.add_edge(brightness, "out", math, "b")?;
    graph.add_edge(math, "out", output, "color")?;

    for (index, node) in [normal, color, mix, brightness, math, output].into_iter().enumerate() {
        graph.set_position(node, [index as f32 * 160.0, 0.0])?;
    }
    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shadergraph_compiler::ShaderCompiler;

    #[test]
    fn test_demo_graph_compiles() {
        let graph = tinted_normals().unwrap();
        let compiled = ShaderCompiler::default().compile(&graph);
        assert!(compiled.fragment_source.contains("varying vec3 v_normal;"));
        assert!(compiled.fragment_source.contains("void node_mix_vec3("));
        assert!(compiled.vertex_source.contains("v_normal = normal;"));
        assert_eq!(compiled.parameters.len(), 2);
        assert!(!compiled.optimized);
    }
}
