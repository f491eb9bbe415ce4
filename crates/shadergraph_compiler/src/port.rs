// SPDX-License-Identifier: MIT OR Apache-2.0
//! Port definitions for node inputs/outputs.
//!
//! A node kind declares its ports statically. Inputs come in four roles
//! (see [`InputKind`]); outputs either carry a fixed type, follow a dynamic
//! marker, or are selected by one of the node's controls.

use crate::nodes::math::MathOp;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Data type that can flow along an edge.
///
/// Ordered by component count, so `max()` over a set of types picks the
/// widest one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    /// Scalar
    Float,
    /// 2D vector
    Vec2,
    /// 3D vector
    Vec3,
    /// 4D vector
    Vec4,
}

impl ValueType {
    /// All value types, lowest arity first
    pub const ALL: [ValueType; 4] = [Self::Float, Self::Vec2, Self::Vec3, Self::Vec4];

    /// Type a dynamic marker resolves to when nothing is connected
    pub const LOWEST: ValueType = Self::Float;

    /// Number of components
    pub fn arity(self) -> usize {
        match self {
            Self::Float => 1,
            Self::Vec2 => 2,
            Self::Vec3 => 3,
            Self::Vec4 => 4,
        }
    }

    /// Type with the given component count
    pub fn from_arity(arity: usize) -> Option<Self> {
        Self::ALL.into_iter().find(|ty| ty.arity() == arity)
    }

    /// GLSL spelling of the type
    pub fn glsl_name(self) -> &'static str {
        match self {
            Self::Float => "float",
            Self::Vec2 => "vec2",
            Self::Vec3 => "vec3",
            Self::Vec4 => "vec4",
        }
    }

    /// Zero value of this type
    pub fn zero_value(self) -> PortValue {
        match self {
            Self::Float => PortValue::Float(0.0),
            Self::Vec2 => PortValue::Vec2([0.0; 2]),
            Self::Vec3 => PortValue::Vec3([0.0; 3]),
            Self::Vec4 => PortValue::Vec4([0.0; 4]),
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.glsl_name())
    }
}

/// Value held locally by an input or control
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PortValue {
    /// Scalar
    Float(f32),
    /// 2D vector
    Vec2([f32; 2]),
    /// 3D vector
    Vec3([f32; 3]),
    /// 4D vector
    Vec4([f32; 4]),
    /// Operator choice of a math node
    Operator(MathOp),
    /// Output type choice of a combine node
    Type(ValueType),
}

impl PortValue {
    /// Value type carried by this value, `None` for control choices
    pub fn value_type(&self) -> Option<ValueType> {
        match self {
            Self::Float(_) => Some(ValueType::Float),
            Self::Vec2(_) => Some(ValueType::Vec2),
            Self::Vec3(_) => Some(ValueType::Vec3),
            Self::Vec4(_) => Some(ValueType::Vec4),
            Self::Operator(_) | Self::Type(_) => None,
        }
    }

    /// Numeric components, `None` for control choices
    pub fn components(&self) -> Option<&[f32]> {
        match self {
            Self::Float(v) => Some(std::slice::from_ref(v)),
            Self::Vec2(v) => Some(v),
            Self::Vec3(v) => Some(v),
            Self::Vec4(v) => Some(v),
            Self::Operator(_) | Self::Type(_) => None,
        }
    }

    /// Operator choice, if this is one
    pub fn as_operator(&self) -> Option<MathOp> {
        match self {
            Self::Operator(op) => Some(*op),
            _ => None,
        }
    }

    /// Type choice, if this is one
    pub fn as_type(&self) -> Option<ValueType> {
        match self {
            Self::Type(ty) => Some(*ty),
            _ => None,
        }
    }

    /// Short description used in error messages
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Operator(_) => "operator",
            Self::Type(_) => "type",
            other => other.value_type().map_or("value", ValueType::glsl_name),
        }
    }

    /// Whether both values are the same variant
    pub fn same_variant(&self, other: &PortValue) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}

/// Resolution key shared by a group of dynamic ports on one node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Marker(pub &'static str);

impl Marker {
    /// Marker key
    pub fn name(self) -> &'static str {
        self.0
    }
}

/// Role of an input slot
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputKind {
    /// Accepts an edge of a fixed type, falls back to a parameter
    Port(ValueType),
    /// Accepts an edge of any type, resolved per instance through the marker
    DynamicPort(Marker),
    /// Never accepts an edge, read by the emission function directly
    Control,
    /// Never accepts an edge, always exposed as a parameter
    OutputControl(ValueType),
}

impl InputKind {
    /// Whether edges may target this slot
    pub fn accepts_edges(&self) -> bool {
        matches!(self, Self::Port(_) | Self::DynamicPort(_))
    }

    /// Whether an unconnected slot is backed by an external parameter
    pub fn is_parameter_backed(&self) -> bool {
        !matches!(self, Self::Control)
    }
}

/// Input slot declared by a node kind
#[derive(Debug, Clone, PartialEq)]
pub struct InputDef {
    /// Identifier, unique within the node kind
    pub id: &'static str,
    /// Display label
    pub label: &'static str,
    /// Role
    pub kind: InputKind,
    /// Initial value for new instances
    pub default: PortValue,
}

impl InputDef {
    /// Create a fixed-type input port
    pub const fn port(
        id: &'static str,
        label: &'static str,
        ty: ValueType,
        default: PortValue,
    ) -> Self {
        Self {
            id,
            label,
            kind: InputKind::Port(ty),
            default,
        }
    }

    /// Create a dynamic input port bound to `marker`
    pub const fn dynamic(id: &'static str, label: &'static str, marker: Marker) -> Self {
        Self {
            id,
            label,
            kind: InputKind::DynamicPort(marker),
            default: PortValue::Float(0.0),
        }
    }

    /// Create a control
    pub const fn control(id: &'static str, label: &'static str, default: PortValue) -> Self {
        Self {
            id,
            label,
            kind: InputKind::Control,
            default,
        }
    }

    /// Create an output control
    pub const fn output_control(
        id: &'static str,
        label: &'static str,
        ty: ValueType,
        default: PortValue,
    ) -> Self {
        Self {
            id,
            label,
            kind: InputKind::OutputControl(ty),
            default,
        }
    }
}

/// How an output port's type is determined
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputType {
    /// Always the same type
    Fixed(ValueType),
    /// Follows the node's resolved type for the marker
    Dynamic(Marker),
    /// Follows a [`PortValue::Type`] control of the node
    Selected(&'static str),
}

/// Output port declared by a node kind
#[derive(Debug, Clone, PartialEq)]
pub struct OutputDef {
    /// Identifier, unique within the node kind
    pub id: &'static str,
    /// Display label
    pub label: &'static str,
    /// Type rule
    pub ty: OutputType,
}

impl OutputDef {
    /// Create an output with a fixed type
    pub const fn fixed(id: &'static str, label: &'static str, ty: ValueType) -> Self {
        Self {
            id,
            label,
            ty: OutputType::Fixed(ty),
        }
    }

    /// Create an output that follows a dynamic marker
    pub const fn dynamic(id: &'static str, label: &'static str, marker: Marker) -> Self {
        Self {
            id,
            label,
            ty: OutputType::Dynamic(marker),
        }
    }

    /// Create an output whose type is chosen by a control
    pub const fn selected(id: &'static str, label: &'static str, control: &'static str) -> Self {
        Self {
            id,
            label,
            ty: OutputType::Selected(control),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_types_ordered_by_arity() {
        let widest = [ValueType::Vec2, ValueType::Float, ValueType::Vec3]
            .into_iter()
            .max();
        assert_eq!(widest, Some(ValueType::Vec3));
        for ty in ValueType::ALL {
            assert_eq!(ValueType::from_arity(ty.arity()), Some(ty));
        }
        assert_eq!(ValueType::from_arity(5), None);
    }

    #[test]
    fn test_zero_values() {
        assert_eq!(ValueType::Float.zero_value(), PortValue::Float(0.0));
        assert_eq!(ValueType::Vec2.zero_value(), PortValue::Vec2([0.0, 0.0]));
        assert_eq!(ValueType::Vec3.zero_value(), PortValue::Vec3([0.0, 0.0, 0.0]));
        for ty in ValueType::ALL {
            assert_eq!(ty.zero_value().value_type(), Some(ty));
        }
    }

    #[test]
    fn test_control_values_have_no_type() {
        assert_eq!(PortValue::Operator(MathOp::Add).value_type(), None);
        assert_eq!(PortValue::Type(ValueType::Vec2).components(), None);
        assert!(PortValue::Float(1.0).same_variant(&PortValue::Float(2.0)));
        assert!(!PortValue::Float(1.0).same_variant(&PortValue::Vec2([1.0, 2.0])));
    }

    #[test]
    fn test_input_roles() {
        assert!(InputKind::Port(ValueType::Vec3).accepts_edges());
        assert!(InputKind::DynamicPort(Marker("T")).accepts_edges());
        assert!(!InputKind::Control.accepts_edges());
        assert!(!InputKind::OutputControl(ValueType::Vec3).accepts_edges());
        assert!(!InputKind::Control.is_parameter_backed());
        assert!(InputKind::OutputControl(ValueType::Float).is_parameter_backed());
    }
}
