// SPDX-License-Identifier: MIT OR Apache-2.0
//! Standalone export of a compiled fragment shader.
//!
//! Exported source has no external parameters: every `uniform` declaration
//! that the parameter table knows about becomes a `const` initialized with
//! the parameter's current value.

use crate::compiler::ParameterTable;
use crate::port::PortValue;

/// GLSL float literal; always carries a decimal point
pub fn format_float(value: f32) -> String {
    if !value.is_finite() {
        tracing::warn!("Non-finite value {value} exported as 0.0");
        return "0.0".to_string();
    }
    let text = value.to_string();
    if text.contains('.') {
        text
    } else {
        format!("{text}.0")
    }
}

/// GLSL literal for a parameter value; `None` for controls
pub fn format_literal(value: &PortValue) -> Option<String> {
    let ty = value.value_type()?;
    let components = value.components()?;
    let formatted: Vec<String> = components.iter().map(|c| format_float(*c)).collect();
    match formatted.as_slice() {
        [single] => Some(single.clone()),
        many => Some(format!("{ty}({})", many.join(", "))),
    }
}

/// Rewrite parameter declarations in `source` into constants
pub fn export_fragment(source: &str, parameters: &ParameterTable) -> String {
    let mut exported = String::with_capacity(source.len());
    for line in source.lines() {
        match constant_for(line, parameters) {
            Some(constant) => exported.push_str(&constant),
            None => exported.push_str(line),
        }
        exported.push('\n');
    }
    exported.trim().to_string()
}

fn constant_for(line: &str, parameters: &ParameterTable) -> Option<String> {
    let declaration = line.trim().strip_prefix("uniform ")?.strip_suffix(';')?;
    let (ty, name) = declaration.split_once(' ')?;
    let literal = format_literal(&parameters.get(name.trim())?.value)?;
    Some(format!("const {ty} {} = {literal};", name.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::{generate, Parameter};
    use crate::graph::Graph;
    use crate::node::{KindId, NodeId};
    use crate::nodes::math::MathOp;
    use crate::port::ValueType;

    #[test]
    fn test_format_float() {
        assert_eq!(format_float(1.0), "1.0");
        assert_eq!(format_float(0.0), "0.0");
        assert_eq!(format_float(-2.0), "-2.0");
        assert_eq!(format_float(0.25), "0.25");
        assert_eq!(format_float(1e20), "100000000000000000000.0");
        assert_eq!(format_float(1e-7), "0.0000001");
        assert_eq!(format_float(f32::NAN), "0.0");
        assert_eq!(format_float(f32::INFINITY), "0.0");
    }

    #[test]
    fn test_format_literal() {
        assert_eq!(format_literal(&PortValue::Float(0.5)).as_deref(), Some("0.5"));
        assert_eq!(
            format_literal(&PortValue::Vec3([1.0, 0.0, 1.0])).as_deref(),
            Some("vec3(1.0, 0.0, 1.0)")
        );
        assert_eq!(
            format_literal(&PortValue::Vec2([0.5, 2.0])).as_deref(),
            Some("vec2(0.5, 2.0)")
        );
        assert_eq!(format_literal(&PortValue::Operator(MathOp::Add)), None);
        assert_eq!(format_literal(&PortValue::Type(ValueType::Vec2)), None);
    }

    #[test]
    fn test_export_replaces_parameters() {
        let mut graph = Graph::default();
        let color = graph.add_node(KindId::Color);
        let out = graph.add_node(KindId::FragmentOutput);
        graph
            .set_value(color, "color", PortValue::Vec3([1.0, 0.0, 1.0]))
            .unwrap();
        graph.add_edge(color, "out", out, "color").unwrap();

        let generated = generate(&graph);
        let exported = export_fragment(&generated.fragment_source, &generated.parameters);
        assert!(!exported.contains("uniform"));
        assert!(exported.starts_with("const vec3 u_1_color = vec3(1.0, 0.0, 1.0);"));
        assert!(exported.ends_with('}'));
    }

    #[test]
    fn test_unknown_uniforms_are_kept() {
        let mut parameters = ParameterTable::new();
        parameters.insert(
            "u_1_value",
            Parameter {
                node: NodeId(1),
                port: "value".into(),
                value_type: ValueType::Float,
                value: PortValue::Float(3.0),
            },
        );
        let source = "uniform float u_1_value;\nuniform float time;\nvoid main() {}\n";
        assert_eq!(
            export_fragment(source, &parameters),
            "const float u_1_value = 3.0;\nuniform float time;\nvoid main() {}"
        );
    }
}
