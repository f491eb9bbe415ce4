// SPDX-License-Identifier: MIT OR Apache-2.0
//! Source nodes: geometry inputs and editable constants.

use crate::emit::{EmitArgs, Emitted, Varying};
use crate::node::{KindId, NodeCategory, NodeKind};
use crate::port::{InputDef, OutputDef, PortValue, ValueType};

/// Interpolated surface normal
pub static NORMAL: NodeKind = NodeKind {
    id: KindId::Normal,
    name: "Normal",
    category: NodeCategory::Input,
    description: "Normalized surface normal",
    inputs: &[],
    outputs: &[OutputDef::fixed("out", "Normal", ValueType::Vec3)],
    emit: emit_normal,
};

/// Texture coordinate
pub static UV: NodeKind = NodeKind {
    id: KindId::Uv,
    name: "UV",
    category: NodeCategory::Input,
    description: "Texture coordinate of the fragment",
    inputs: &[],
    outputs: &[OutputDef::fixed("out", "UV", ValueType::Vec2)],
    emit: emit_uv,
};

/// Editable color constant
pub static COLOR: NodeKind = NodeKind {
    id: KindId::Color,
    name: "Color",
    category: NodeCategory::Input,
    description: "Constant RGB color",
    inputs: &[InputDef::output_control(
        "color",
        "Color",
        ValueType::Vec3,
        PortValue::Vec3([1.0, 1.0, 1.0]),
    )],
    outputs: &[OutputDef::fixed("out", "Color", ValueType::Vec3)],
    emit: emit_constant,
};

/// Editable scalar constant
pub static VALUE: NodeKind = NodeKind {
    id: KindId::Value,
    name: "Value",
    category: NodeCategory::Input,
    description: "Constant scalar",
    inputs: &[InputDef::output_control(
        "value",
        "Value",
        ValueType::Float,
        PortValue::Float(0.0),
    )],
    outputs: &[OutputDef::fixed("out", "Value", ValueType::Float)],
    emit: emit_constant,
};

fn emit_normal(args: &EmitArgs<'_>) -> Emitted {
    let normal = Varying::Normal;
    Emitted::statement(format!("{} = normalize({});", args.var("out"), normal.name()))
        .with_varying(normal)
}

fn emit_uv(args: &EmitArgs<'_>) -> Emitted {
    let uv = Varying::Uv;
    Emitted::statement(format!("{} = {};", args.var("out"), uv.name())).with_varying(uv)
}

/// Copy the single output control into the output
fn emit_constant(args: &EmitArgs<'_>) -> Emitted {
    let control = args.node.node_kind().inputs.first().map_or("", |def| def.id);
    Emitted::statement(format!("{} = {};", args.var("out"), args.var(control)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emit::{Emission, Vars};
    use crate::node::{Node, NodeId};

    fn emit(kind: KindId, bindings: &[(&'static str, &str)]) -> Emitted {
        let node = Node::new(NodeId(1), kind);
        let mut vars = Vars::new();
        for (port, name) in bindings {
            vars.insert(*port, *name);
        }
        (kind.kind().emit)(&EmitArgs::new(&node, &vars))
    }

    #[test]
    fn test_normal_requires_varying() {
        let emitted = emit(KindId::Normal, &[("out", "o_1_out")]);
        assert_eq!(
            emitted.emission,
            Emission::Statement("o_1_out = normalize(v_normal);".into())
        );
        assert_eq!(emitted.varyings, vec![Varying::Normal]);
    }

    #[test]
    fn test_uv_requires_varying() {
        let emitted = emit(KindId::Uv, &[("out", "o_1_out")]);
        assert_eq!(emitted.emission, Emission::Statement("o_1_out = v_uv;".into()));
        assert_eq!(emitted.varyings, vec![Varying::Uv]);
    }

    #[test]
    fn test_constants_copy_their_control() {
        let color = emit(KindId::Color, &[("color", "u_1_color"), ("out", "o_1_out")]);
        assert_eq!(color.emission, Emission::Statement("o_1_out = u_1_color;".into()));
        assert!(color.varyings.is_empty());

        let value = emit(KindId::Value, &[("value", "u_1_value"), ("out", "o_1_out")]);
        assert_eq!(value.emission, Emission::Statement("o_1_out = u_1_value;".into()));
    }
}
