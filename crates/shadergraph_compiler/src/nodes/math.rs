// SPDX-License-Identifier: MIT OR Apache-2.0
//! Arithmetic nodes over dynamically typed operands.

use crate::emit::{EmitArgs, Emitted};
use crate::node::{KindId, NodeCategory, NodeKind};
use crate::port::{InputDef, Marker, OutputDef, PortValue, ValueType};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Marker shared by the operands and result of the math nodes
pub const T: Marker = Marker("T");

/// Operator of a math node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MathOp {
    /// `a + b`
    #[default]
    Add,
    /// `a - b`
    Subtract,
    /// `a * b`
    Multiply,
    /// `a / b`
    Divide,
    /// `pow(a, b)`
    Power,
    /// `log(a)`
    Log,
    /// `exp(a)`
    Exp,
    /// `min(a, b)`
    Min,
    /// `max(a, b)`
    Max,
    /// `a < b`, one per component
    LessThan,
    /// `a <= b`, one per component
    LessEqual,
    /// `a > b`, one per component
    GreaterThan,
    /// `a >= b`, one per component
    GreaterEqual,
}

impl MathOp {
    /// All operators in menu order
    pub const ALL: [MathOp; 13] = [
        Self::Add,
        Self::Subtract,
        Self::Multiply,
        Self::Divide,
        Self::Power,
        Self::Log,
        Self::Exp,
        Self::Min,
        Self::Max,
        Self::LessThan,
        Self::LessEqual,
        Self::GreaterThan,
        Self::GreaterEqual,
    ];

    /// Display label
    pub fn label(self) -> &'static str {
        match self {
            Self::Add => "Add",
            Self::Subtract => "Subtract",
            Self::Multiply => "Multiply",
            Self::Divide => "Divide",
            Self::Power => "Power",
            Self::Log => "Log",
            Self::Exp => "Exp",
            Self::Min => "Min",
            Self::Max => "Max",
            Self::LessThan => "Less Than",
            Self::LessEqual => "Less or Equal",
            Self::GreaterThan => "Greater Than",
            Self::GreaterEqual => "Greater or Equal",
        }
    }

    /// Whether the second operand is ignored
    pub fn is_unary(self) -> bool {
        matches!(self, Self::Log | Self::Exp)
    }

    /// Expression of type `ty` applying the operator to `a` and `b`
    pub fn expression(self, a: &str, b: &str, ty: ValueType) -> String {
        match self {
            Self::Add => format!("{a} + {b}"),
            Self::Subtract => format!("{a} - {b}"),
            Self::Multiply => format!("{a} * {b}"),
            Self::Divide => format!("{a} / {b}"),
            Self::Power => format!("pow({a}, {b})"),
            Self::Log => format!("log({a})"),
            Self::Exp => format!("exp({a})"),
            Self::Min => format!("min({a}, {b})"),
            Self::Max => format!("max({a}, {b})"),
            Self::LessThan => comparison(a, b, ty, "<", "lessThan"),
            Self::LessEqual => comparison(a, b, ty, "<=", "lessThanEqual"),
            Self::GreaterThan => comparison(a, b, ty, ">", "greaterThan"),
            Self::GreaterEqual => comparison(a, b, ty, ">=", "greaterThanEqual"),
        }
    }
}

impl fmt::Display for MathOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Comparisons yield 0.0/1.0 per component in the operand type
fn comparison(a: &str, b: &str, ty: ValueType, operator: &str, function: &str) -> String {
    match ty {
        ValueType::Float => format!("float({a} {operator} {b})"),
        vector => format!("{vector}({function}({a}, {b}))"),
    }
}

/// Arithmetic mean of two inputs
pub static MIX: NodeKind = NodeKind {
    id: KindId::Mix,
    name: "Mix",
    category: NodeCategory::Math,
    description: "Average of two inputs",
    inputs: &[InputDef::dynamic("a", "A", T), InputDef::dynamic("b", "B", T)],
    outputs: &[OutputDef::dynamic("out", "Result", T)],
    emit: emit_mix,
};

/// Binary or unary operator chosen by a control
pub static MATH: NodeKind = NodeKind {
    id: KindId::Math,
    name: "Math",
    category: NodeCategory::Math,
    description: "Apply an arithmetic, comparison or min/max operator",
    inputs: &[
        InputDef::control("op", "Operator", PortValue::Operator(MathOp::Add)),
        InputDef::dynamic("a", "A", T),
        InputDef::dynamic("b", "B", T),
    ],
    outputs: &[OutputDef::dynamic("out", "Result", T)],
    emit: emit_math,
};

fn emit_mix(args: &EmitArgs<'_>) -> Emitted {
    let ty = args.dynamic_type(T);
    let name = format!("node_mix_{ty}");
    let source = format!("void {name}({ty} a, {ty} b, out {ty} o) {{\n  o = (a + b) * 0.5;\n}}");
    Emitted::function(name, source)
}

fn emit_math(args: &EmitArgs<'_>) -> Emitted {
    let op = args
        .value("op")
        .and_then(PortValue::as_operator)
        .unwrap_or_default();
    let b = if op.is_unary() { "" } else { args.var("b") };
    let expression = op.expression(args.var("a"), b, args.dynamic_type(T));
    Emitted::statement(format!("{} = {expression};", args.var("out")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emit::{Emission, Vars};
    use crate::node::{Node, NodeId};

    fn bound_vars() -> Vars {
        let mut vars = Vars::new();
        vars.insert("a", "x");
        vars.insert("b", "y");
        vars.insert("out", "o");
        vars
    }

    #[test]
    fn test_arithmetic_expressions() {
        assert_eq!(MathOp::Add.expression("x", "y", ValueType::Vec3), "x + y");
        assert_eq!(MathOp::Divide.expression("x", "y", ValueType::Float), "x / y");
        assert_eq!(MathOp::Power.expression("x", "y", ValueType::Vec2), "pow(x, y)");
        assert_eq!(MathOp::Log.expression("x", "", ValueType::Float), "log(x)");
        assert_eq!(MathOp::Max.expression("x", "y", ValueType::Float), "max(x, y)");
    }

    #[test]
    fn test_comparisons_keep_operand_type() {
        assert_eq!(
            MathOp::LessThan.expression("x", "y", ValueType::Float),
            "float(x < y)"
        );
        assert_eq!(
            MathOp::GreaterEqual.expression("x", "y", ValueType::Vec3),
            "vec3(greaterThanEqual(x, y))"
        );
    }

    #[test]
    fn test_math_reads_operator_control() {
        let mut node = Node::new(NodeId(2), KindId::Math);
        node.values
            .insert("op".to_string(), PortValue::Operator(MathOp::Multiply));
        let vars = bound_vars();
        let emitted = (MATH.emit)(&EmitArgs::new(&node, &vars));
        assert_eq!(emitted.emission, Emission::Statement("o = x * y;".into()));
    }

    #[test]
    fn test_unary_operator_ignores_second_operand() {
        let mut node = Node::new(NodeId(2), KindId::Math);
        node.values
            .insert("op".to_string(), PortValue::Operator(MathOp::Exp));
        let vars = bound_vars();
        let emitted = (MATH.emit)(&EmitArgs::new(&node, &vars));
        assert_eq!(emitted.emission, Emission::Statement("o = exp(x);".into()));
        assert!(vars.missing().is_empty());
    }

    #[test]
    fn test_mix_function_named_by_type() {
        let mut node = Node::new(NodeId(3), KindId::Mix);
        node.dynamic_types.insert("T".to_string(), ValueType::Vec3);
        let emitted = (MIX.emit)(&EmitArgs::new(&node, &bound_vars()));
        match emitted.emission {
            Emission::Function { name, source, call } => {
                assert_eq!(name, "node_mix_vec3");
                assert!(source.starts_with("void node_mix_vec3(vec3 a, vec3 b, out vec3 o)"));
                assert!(call.is_none());
            }
            other => panic!("expected function, got {other:?}"),
        }
    }
}
