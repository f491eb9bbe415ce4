// SPDX-License-Identifier: MIT OR Apache-2.0
//! The graph's output node.

use crate::emit::{EmitArgs, Emitted};
use crate::node::{KindId, NodeCategory, NodeKind};
use crate::port::{InputDef, PortValue, ValueType};

/// Writes the final fragment color
pub static FRAGMENT_OUTPUT: NodeKind = NodeKind {
    id: KindId::FragmentOutput,
    name: "Fragment Output",
    category: NodeCategory::Output,
    description: "Final opaque fragment color",
    inputs: &[InputDef::port(
        "color",
        "Color",
        ValueType::Vec3,
        PortValue::Vec3([0.0, 0.0, 0.0]),
    )],
    outputs: &[],
    emit: emit_fragment_output,
};

fn emit_fragment_output(args: &EmitArgs<'_>) -> Emitted {
    Emitted::statement(format!("gl_FragColor = vec4({}, 1.0);", args.var("color")))
}
