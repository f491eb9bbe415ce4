// SPDX-License-Identifier: MIT OR Apache-2.0
//! Splitting vectors into components and combining them back.

use super::math::T;
use crate::emit::{EmitArgs, Emitted};
use crate::node::{KindId, NodeCategory, NodeKind};
use crate::port::{InputDef, OutputDef, PortValue, ValueType};

const COMPONENTS: [&str; 4] = ["x", "y", "z", "w"];

/// Vector to four scalars
pub static SPLIT: NodeKind = NodeKind {
    id: KindId::Split,
    name: "Split",
    category: NodeCategory::Utility,
    description: "Split a vector into components, absent components read 0",
    inputs: &[InputDef::dynamic("v", "Vector", T)],
    outputs: &[
        OutputDef::fixed("x", "X", ValueType::Float),
        OutputDef::fixed("y", "Y", ValueType::Float),
        OutputDef::fixed("z", "Z", ValueType::Float),
        OutputDef::fixed("w", "W", ValueType::Float),
    ],
    emit: emit_split,
};

/// Scalars to a vector of the selected type
pub static COMBINE: NodeKind = NodeKind {
    id: KindId::Combine,
    name: "Combine",
    category: NodeCategory::Utility,
    description: "Combine scalars into a vector",
    inputs: &[
        InputDef::control("type", "Type", PortValue::Type(ValueType::Vec3)),
        InputDef::port("x", "X", ValueType::Float, PortValue::Float(0.0)),
        InputDef::port("y", "Y", ValueType::Float, PortValue::Float(0.0)),
        InputDef::port("z", "Z", ValueType::Float, PortValue::Float(0.0)),
        InputDef::port("w", "W", ValueType::Float, PortValue::Float(0.0)),
    ],
    outputs: &[OutputDef::selected("out", "Vector", "type")],
    emit: emit_combine,
};

fn emit_split(args: &EmitArgs<'_>) -> Emitted {
    let ty = args.dynamic_type(T);
    let name = format!("node_split_{ty}");

    let mut body = String::new();
    for (index, component) in COMPONENTS.iter().enumerate() {
        let value = match ty {
            ValueType::Float if index == 0 => "v".to_string(),
            _ if index < ty.arity() => format!("v.{component}"),
            _ => "0.0".to_string(),
        };
        body.push_str(&format!("  {component} = {value};\n"));
    }

    let source = format!(
        "void {name}({ty} v, out float x, out float y, out float z, out float w) {{\n{body}}}"
    );
    Emitted::function(name, source)
}

fn emit_combine(args: &EmitArgs<'_>) -> Emitted {
    let ty = args.output_type("out");
    let components: Vec<&str> = COMPONENTS
        .iter()
        .take(ty.arity())
        .map(|component| args.var(component))
        .collect();

    let value = match ty {
        ValueType::Float => components.join(""),
        vector => format!("{vector}({})", components.join(", ")),
    };
    Emitted::statement(format!("{} = {value};", args.var("out")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emit::{Emission, Vars};
    use crate::node::{Node, NodeId};

    fn combine_vars() -> Vars {
        let mut vars = Vars::new();
        for component in COMPONENTS {
            vars.insert(component, format!("u_{component}"));
        }
        vars.insert("out", "o");
        vars
    }

    fn split_source(ty: ValueType) -> String {
        let mut node = Node::new(NodeId(1), KindId::Split);
        node.dynamic_types.insert("T".to_string(), ty);
        let mut vars = Vars::new();
        vars.insert("v", "in");
        match (SPLIT.emit)(&EmitArgs::new(&node, &vars)).emission {
            Emission::Function { source, .. } => source,
            other => panic!("expected function, got {other:?}"),
        }
    }

    #[test]
    fn test_split_pads_absent_components() {
        let source = split_source(ValueType::Vec2);
        assert!(source.starts_with("void node_split_vec2(vec2 v,"));
        assert!(source.contains("  x = v.x;\n"));
        assert!(source.contains("  y = v.y;\n"));
        assert!(source.contains("  z = 0.0;\n"));
        assert!(source.contains("  w = 0.0;\n"));
    }

    #[test]
    fn test_split_scalar() {
        let source = split_source(ValueType::Float);
        assert!(source.contains("  x = v;\n"));
        assert!(source.contains("  y = 0.0;\n"));
    }

    #[test]
    fn test_combine_follows_type_control() {
        let mut node = Node::new(NodeId(1), KindId::Combine);
        let vars = combine_vars();
        let emitted = (COMBINE.emit)(&EmitArgs::new(&node, &vars));
        assert_eq!(
            emitted.emission,
            Emission::Statement("o = vec3(u_x, u_y, u_z);".into())
        );

        node.output_types.insert("out".to_string(), ValueType::Vec2);
        let emitted = (COMBINE.emit)(&EmitArgs::new(&node, &vars));
        assert_eq!(emitted.emission, Emission::Statement("o = vec2(u_x, u_y);".into()));
    }
}
