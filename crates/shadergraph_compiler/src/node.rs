// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node definitions for the shader graph.

use crate::emit::{EmitArgs, Emitted, Vars};
use crate::nodes::{inputs, math, output, vector};
use crate::port::{InputDef, InputKind, Marker, OutputDef, OutputType, PortValue, ValueType};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a node instance within its graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a registered node kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KindId {
    /// Surface normal
    Normal,
    /// Texture coordinate
    Uv,
    /// Color constant
    Color,
    /// Scalar constant
    Value,
    /// Average of two inputs
    Mix,
    /// Operator selected by a control
    Math,
    /// Vector to components
    Split,
    /// Components to vector
    Combine,
    /// Final fragment color
    FragmentOutput,
}

impl KindId {
    /// All built-in kinds
    pub const ALL: [KindId; 9] = [
        Self::Normal,
        Self::Uv,
        Self::Color,
        Self::Value,
        Self::Mix,
        Self::Math,
        Self::Split,
        Self::Combine,
        Self::FragmentOutput,
    ];

    /// Static definition of this kind
    pub fn kind(self) -> &'static NodeKind {
        match self {
            Self::Normal => &inputs::NORMAL,
            Self::Uv => &inputs::UV,
            Self::Color => &inputs::COLOR,
            Self::Value => &inputs::VALUE,
            Self::Mix => &math::MIX,
            Self::Math => &math::MATH,
            Self::Split => &vector::SPLIT,
            Self::Combine => &vector::COMBINE,
            Self::FragmentOutput => &output::FRAGMENT_OUTPUT,
        }
    }

    /// Stable textual key
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Uv => "uv",
            Self::Color => "color",
            Self::Value => "value",
            Self::Mix => "mix",
            Self::Math => "math",
            Self::Split => "split",
            Self::Combine => "combine",
            Self::FragmentOutput => "fragment_output",
        }
    }
}

impl fmt::Display for KindId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Node type category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeCategory {
    /// Sources (constants, geometry inputs)
    Input,
    /// The sink
    Output,
    /// Math operations
    Math,
    /// Vector utilities
    Utility,
}

/// Emission function of a node kind
pub type EmitFn = fn(&EmitArgs<'_>) -> Emitted;

/// Immutable node kind definition
#[derive(Debug)]
pub struct NodeKind {
    /// Kind identifier
    pub id: KindId,
    /// Display name
    pub name: &'static str,
    /// Category
    pub category: NodeCategory,
    /// Description
    pub description: &'static str,
    /// Inputs and controls, in declaration order
    pub inputs: &'static [InputDef],
    /// Outputs, in declaration order
    pub outputs: &'static [OutputDef],
    /// Pure emission function
    pub emit: EmitFn,
}

impl NodeKind {
    /// Get an input or control by ID
    pub fn input(&self, id: &str) -> Option<&'static InputDef> {
        self.inputs.iter().find(|def| def.id == id)
    }

    /// Get an output by ID
    pub fn output(&self, id: &str) -> Option<&'static OutputDef> {
        self.outputs.iter().find(|def| def.id == id)
    }

    /// Dynamic markers used by this kind, in first-use order
    pub fn markers(&self) -> Vec<Marker> {
        let from_inputs = self.inputs.iter().filter_map(|def| match def.kind {
            InputKind::DynamicPort(marker) => Some(marker),
            _ => None,
        });
        let from_outputs = self.outputs.iter().filter_map(|def| match def.ty {
            OutputType::Dynamic(marker) => Some(marker),
            _ => None,
        });

        let mut markers = Vec::new();
        for marker in from_inputs.chain(from_outputs) {
            if !markers.contains(&marker) {
                markers.push(marker);
            }
        }
        markers
    }

    /// Whether this kind is the graph's output
    pub fn is_sink(&self) -> bool {
        self.category == NodeCategory::Output
    }
}

/// A node instance in the graph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// Unique instance ID
    pub id: NodeId,
    /// Node kind
    pub kind: KindId,
    /// Display name (can be customized)
    pub name: String,
    /// Position in the editor canvas
    pub position: [f32; 2],
    /// Current value of every input and control
    pub(crate) values: IndexMap<String, PortValue>,
    /// Resolved type of every dynamic marker
    pub(crate) dynamic_types: IndexMap<String, ValueType>,
    /// Resolved type of every output
    pub(crate) output_types: IndexMap<String, ValueType>,
}

impl Node {
    /// Create an instance with default values and lowest-arity dynamic types
    pub(crate) fn new(id: NodeId, kind: KindId) -> Self {
        let definition = kind.kind();
        let values = definition
            .inputs
            .iter()
            .map(|def| (def.id.to_string(), def.default.clone()))
            .collect();
        let dynamic_types = definition
            .markers()
            .into_iter()
            .map(|marker| (marker.name().to_string(), ValueType::LOWEST))
            .collect();

        let mut node = Self {
            id,
            kind,
            name: definition.name.to_string(),
            position: [0.0, 0.0],
            values,
            dynamic_types,
            output_types: IndexMap::new(),
        };
        node.output_types = definition
            .outputs
            .iter()
            .map(|def| (def.id.to_string(), node.compute_output_type(def)))
            .collect();
        node
    }

    /// Static definition of this node's kind
    pub fn node_kind(&self) -> &'static NodeKind {
        self.kind.kind()
    }

    /// Current value of an input or control
    pub fn value(&self, port: &str) -> Option<&PortValue> {
        self.values.get(port)
    }

    /// All input and control values
    pub fn values(&self) -> impl Iterator<Item = (&str, &PortValue)> {
        self.values.iter().map(|(port, value)| (port.as_str(), value))
    }

    /// Resolved type of a dynamic marker.
    ///
    /// Every marker of the node's kind has an entry from construction on;
    /// a marker the kind does not use reads as the lowest-arity type.
    pub fn dynamic_type(&self, marker: Marker) -> ValueType {
        self.dynamic_types
            .get(marker.name())
            .copied()
            .unwrap_or(ValueType::LOWEST)
    }

    /// Resolved type of an output
    pub fn output_type(&self, port: &str) -> Option<ValueType> {
        self.output_types.get(port).copied()
    }

    /// All resolved output types
    pub fn output_types(&self) -> impl Iterator<Item = (&str, ValueType)> {
        self.output_types.iter().map(|(port, ty)| (port.as_str(), *ty))
    }

    /// Type an input slot currently holds, `None` for controls and unknown ports
    pub fn input_type(&self, port: &str) -> Option<ValueType> {
        match self.node_kind().input(port)?.kind {
            InputKind::Port(ty) | InputKind::OutputControl(ty) => Some(ty),
            InputKind::DynamicPort(marker) => Some(self.dynamic_type(marker)),
            InputKind::Control => None,
        }
    }

    /// Type an output should have given the current markers and controls
    pub(crate) fn compute_output_type(&self, def: &OutputDef) -> ValueType {
        match def.ty {
            OutputType::Fixed(ty) => ty,
            OutputType::Dynamic(marker) => self.dynamic_type(marker),
            OutputType::Selected(control) => self
                .value(control)
                .and_then(PortValue::as_type)
                .unwrap_or(ValueType::LOWEST),
        }
    }
}

/// Registry of available node kinds
#[derive(Debug)]
pub struct NodeRegistry {
    /// Registered kinds by ID
    kinds: IndexMap<KindId, &'static NodeKind>,
}

impl NodeRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            kinds: IndexMap::new(),
        }
    }

    /// Create a registry holding every built-in kind, validated
    pub fn builtin() -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        for id in KindId::ALL {
            registry.register(id.kind());
        }
        registry.validate()?;
        Ok(registry)
    }

    /// Register a node kind
    pub fn register(&mut self, kind: &'static NodeKind) {
        self.kinds.insert(kind.id, kind);
    }

    /// Get a node kind by ID
    pub fn get(&self, id: KindId) -> Option<&'static NodeKind> {
        self.kinds.get(&id).copied()
    }

    /// Get all registered kinds
    pub fn kinds(&self) -> impl Iterator<Item = &'static NodeKind> + '_ {
        self.kinds.values().copied()
    }

    /// Get kinds by category
    pub fn kinds_in_category(
        &self,
        category: NodeCategory,
    ) -> impl Iterator<Item = &'static NodeKind> + '_ {
        self.kinds().filter(move |kind| kind.category == category)
    }

    /// Check every registered kind for declaration mistakes.
    ///
    /// Runs each emission function once against a fresh instance so that a
    /// lookup of an undeclared port surfaces here instead of in a compile.
    pub fn validate(&self) -> Result<(), RegistryError> {
        let sinks = self.kinds().filter(|kind| kind.is_sink()).count();
        if sinks != 1 {
            return Err(RegistryError::SinkCount(sinks));
        }
        for kind in self.kinds() {
            validate_kind(kind)?;
        }
        Ok(())
    }
}

impl Default for NodeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn validate_kind(kind: &'static NodeKind) -> Result<(), RegistryError> {
    let port_ids = kind
        .inputs
        .iter()
        .map(|def| def.id)
        .chain(kind.outputs.iter().map(|def| def.id));
    let mut seen = Vec::new();
    for id in port_ids {
        if seen.contains(&id) {
            return Err(RegistryError::DuplicatePort { kind: kind.id, port: id });
        }
        seen.push(id);
    }

    let input_markers: Vec<Marker> = kind
        .inputs
        .iter()
        .filter_map(|def| match def.kind {
            InputKind::DynamicPort(marker) => Some(marker),
            _ => None,
        })
        .collect();
    for def in kind.outputs {
        match def.ty {
            OutputType::Dynamic(marker) if !input_markers.contains(&marker) => {
                return Err(RegistryError::UnknownMarker { kind: kind.id, port: def.id });
            }
            OutputType::Selected(control) => {
                let is_type_control = kind.input(control).is_some_and(|input| {
                    input.kind == InputKind::Control && input.default.as_type().is_some()
                });
                if !is_type_control {
                    return Err(RegistryError::UnknownControl { kind: kind.id, port: def.id });
                }
            }
            _ => {}
        }
    }

    let node = Node::new(NodeId(0), kind.id);
    let mut vars = Vars::new();
    for def in kind.inputs.iter().filter(|def| def.kind != InputKind::Control) {
        vars.insert(def.id, format!("i_{}", def.id));
    }
    for def in kind.outputs {
        vars.insert(def.id, format!("o_{}", def.id));
    }
    (kind.emit)(&EmitArgs::new(&node, &vars));
    if let Some(port) = vars.missing().into_iter().next() {
        return Err(RegistryError::UndeclaredPort { kind: kind.id, port });
    }
    Ok(())
}

/// Declaration mistake in a node kind
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// Two ports of one kind share an ID
    #[error("Duplicate port `{port}` on node kind `{kind}`")]
    DuplicatePort {
        /// Offending kind
        kind: KindId,
        /// Duplicated port ID
        port: &'static str,
    },

    /// A dynamic output follows a marker no input carries
    #[error("Output `{port}` of node kind `{kind}` follows a marker with no dynamic input")]
    UnknownMarker {
        /// Offending kind
        kind: KindId,
        /// Output port ID
        port: &'static str,
    },

    /// A selected output names something that is not a type control
    #[error("Output `{port}` of node kind `{kind}` is selected by a missing type control")]
    UnknownControl {
        /// Offending kind
        kind: KindId,
        /// Output port ID
        port: &'static str,
    },

    /// The emission function looked up a port the kind does not declare
    #[error("Node kind `{kind}` emits code for undeclared port `{port}`")]
    UndeclaredPort {
        /// Offending kind
        kind: KindId,
        /// Port name looked up
        port: String,
    },

    /// The registry does not hold exactly one sink kind
    #[error("Expected exactly one output node kind, found {0}")]
    SinkCount(usize),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emit::Emission;

    #[test]
    fn test_builtin_registry_is_valid() {
        let registry = NodeRegistry::builtin().unwrap();
        assert_eq!(registry.kinds().count(), KindId::ALL.len());
        assert_eq!(registry.kinds_in_category(NodeCategory::Output).count(), 1);
        for id in KindId::ALL {
            assert_eq!(registry.get(id).map(|kind| kind.id), Some(id));
        }
    }

    #[test]
    fn test_registry_without_sink_is_rejected() {
        let mut registry = NodeRegistry::new();
        registry.register(KindId::Color.kind());
        assert!(matches!(registry.validate(), Err(RegistryError::SinkCount(0))));
    }

    static BROKEN: NodeKind = NodeKind {
        id: KindId::Value,
        name: "Broken",
        category: NodeCategory::Input,
        description: "Refers to a port it does not declare",
        inputs: &[],
        outputs: &[OutputDef::fixed("out", "Out", ValueType::Float)],
        emit: emit_broken,
    };

    fn emit_broken(args: &EmitArgs<'_>) -> Emitted {
        Emitted::statement(format!("{} = {};", args.var("out"), args.var("missing")))
    }

    #[test]
    fn test_undeclared_port_is_caught() {
        let err = validate_kind(&BROKEN).unwrap_err();
        assert!(matches!(
            err,
            RegistryError::UndeclaredPort { ref port, .. } if port == "missing"
        ));
    }

    #[test]
    fn test_new_node_resolves_types() {
        let node = Node::new(NodeId(7), KindId::Mix);
        assert_eq!(node.dynamic_type(Marker("T")), ValueType::Float);
        assert_eq!(node.output_type("out"), Some(ValueType::Float));
        assert_eq!(node.input_type("a"), Some(ValueType::Float));

        let combine = Node::new(NodeId(8), KindId::Combine);
        assert_eq!(combine.output_type("out"), Some(ValueType::Vec3));
        assert_eq!(combine.input_type("type"), None);

        let color = Node::new(NodeId(9), KindId::Color);
        assert_eq!(color.value("color"), Some(&PortValue::Vec3([1.0, 1.0, 1.0])));
    }

    #[test]
    fn test_markers_are_deduplicated() {
        assert_eq!(KindId::Mix.kind().markers(), vec![Marker("T")]);
        assert!(KindId::Color.kind().markers().is_empty());
    }

    #[test]
    fn test_emission_is_deterministic() {
        for id in KindId::ALL {
            let kind = id.kind();
            let node = Node::new(NodeId(1), id);
            let mut vars = Vars::new();
            for def in kind.inputs {
                vars.insert(def.id, def.id);
            }
            for def in kind.outputs {
                vars.insert(def.id, def.id);
            }
            let first = (kind.emit)(&EmitArgs::new(&node, &vars));
            let second = (kind.emit)(&EmitArgs::new(&node, &vars));
            assert_eq!(first, second);
            if let Emission::Statement(statement) = &first.emission {
                assert!(statement.ends_with(';'), "{id}: {statement}");
            }
        }
    }
}
