// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph-to-GLSL compiler.
//!
//! Compilation prunes the graph to what the output node can see, orders it
//! producers-first, asks every node kind for its code and assembles:
//!
//! 1. varying declarations
//! 2. parameter (uniform) declarations
//! 3. shared function definitions
//! 4. `main()` with each node's output declarations and statements
//!
//! Variable names derive from node and port IDs only, so compiling an
//! unchanged graph twice yields identical source.

use crate::conversion::coerce;
use crate::emit::{EmitArgs, Emission, Varying, Vars};
use crate::graph::Graph;
use crate::node::NodeId;
use crate::optimizer::{OptimizerAdapter, ShaderOptimizer};
use crate::port::{PortValue, ValueType};
use crate::schedule::{reachable_from, topological_order};
use crate::settings::CompilerSettings;
use crate::shaders::{vertex_source, PLACEHOLDER_FRAGMENT_SHADER};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Name of the parameter backing an unconnected input
pub fn parameter_name(node: NodeId, port: &str) -> String {
    format!("u_{node}_{port}")
}

/// Name of the local holding an output
pub fn output_name(node: NodeId, port: &str) -> String {
    format!("o_{node}_{port}")
}

/// External parameter the renderer keeps in sync
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    /// Owning node
    pub node: NodeId,
    /// Backed input
    pub port: String,
    /// Declared type
    pub value_type: ValueType,
    /// Current value
    pub value: PortValue,
}

/// Parameters by uniform name, in declaration order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterTable {
    entries: IndexMap<String, Parameter>,
}

impl ParameterTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a parameter under `name`
    pub fn insert(&mut self, name: impl Into<String>, parameter: Parameter) {
        self.entries.insert(name.into(), parameter);
    }

    /// Get a parameter by uniform name
    pub fn get(&self, name: &str) -> Option<&Parameter> {
        self.entries.get(name)
    }

    /// Current value of a parameter
    pub fn value(&self, name: &str) -> Option<&PortValue> {
        self.entries.get(name).map(|p| &p.value)
    }

    /// Replace the value of an existing parameter; returns whether one existed
    pub fn update(&mut self, name: &str, value: PortValue) -> bool {
        match self.entries.get_mut(name) {
            Some(parameter) => {
                parameter.value = value;
                true
            }
            None => false,
        }
    }

    /// Whether a parameter exists
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Number of parameters
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parameters in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Parameter)> {
        self.entries.iter().map(|(name, p)| (name.as_str(), p))
    }
}

/// Unoptimized compiler output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedShader {
    /// Vertex stage source
    pub vertex_source: String,
    /// Fragment stage source
    pub fragment_source: String,
    /// Parameters declared by the fragment source
    pub parameters: ParameterTable,
    /// Whether the graph had an output node
    pub has_output: bool,
}

impl GeneratedShader {
    /// Output for a graph without an output node
    pub fn placeholder() -> Self {
        Self {
            vertex_source: vertex_source(&[]),
            fragment_source: PLACEHOLDER_FRAGMENT_SHADER.to_string(),
            parameters: ParameterTable::new(),
            has_output: false,
        }
    }
}

/// Everything the renderer needs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledShader {
    /// Vertex stage source
    pub vertex_source: String,
    /// Fragment source to render: optimized when the optimizer succeeded
    pub fragment_source: String,
    /// Fragment source as generated
    pub unoptimized_fragment_source: String,
    /// Parameters to bind
    pub parameters: ParameterTable,
    /// Whether `fragment_source` came from the optimizer
    pub optimized: bool,
}

/// Generate shader source for a graph snapshot
pub fn generate(graph: &Graph) -> GeneratedShader {
    let Some(sink) = graph.sink() else {
        tracing::debug!("No output node, emitting placeholder");
        return GeneratedShader::placeholder();
    };

    let reachable = reachable_from(graph, sink);
    let order = topological_order(graph, &reachable);

    let mut emitter = Emitter::default();
    for node_id in order {
        emitter.emit_node(graph, node_id);
    }
    emitter.finish()
}

/// Accumulates code across nodes
#[derive(Default)]
struct Emitter {
    varyings: IndexMap<&'static str, Varying>,
    uniforms: Vec<String>,
    functions: IndexMap<String, String>,
    body: Vec<String>,
    parameters: ParameterTable,
}

impl Emitter {
    fn emit_node(&mut self, graph: &Graph, node_id: NodeId) {
        let Some(node) = graph.node(node_id) else {
            return;
        };
        let kind = node.node_kind();
        let mut vars = Vars::new();
        let mut call_args = Vec::new();
        let mut pending = Vec::new();

        for def in kind.inputs {
            if !def.kind.is_parameter_backed() {
                continue;
            }
            let ty = node.input_type(def.id).unwrap_or(ValueType::LOWEST);
            let edge = graph
                .incoming_edge(node_id, def.id)
                .filter(|_| def.kind.accepts_edges());

            let var = match edge {
                Some(edge) => {
                    let source_ty = graph
                        .node(edge.source)
                        .and_then(|source| source.output_type(&edge.source_port))
                        .unwrap_or(ty);
                    coerce(&output_name(edge.source, &edge.source_port), source_ty, ty)
                }
                None => {
                    let name = parameter_name(node_id, def.id);
                    let value = node
                        .value(def.id)
                        .cloned()
                        .unwrap_or_else(|| ty.zero_value());
                    pending.push((
                        def.id,
                        name.clone(),
                        Parameter {
                            node: node_id,
                            port: def.id.to_string(),
                            value_type: ty,
                            value,
                        },
                    ));
                    name
                }
            };
            call_args.push(var.clone());
            vars.insert(def.id, var);
        }

        for def in kind.outputs {
            let ty = node.output_type(def.id).unwrap_or(ValueType::LOWEST);
            let name = output_name(node_id, def.id);
            self.body.push(format!("{ty} {name};"));
            call_args.push(name.clone());
            vars.insert(def.id, name);
        }

        let emitted = (kind.emit)(&EmitArgs::new(node, &vars));
        for port in vars.missing() {
            tracing::error!("Node {node_id} ({}) emitted code for undeclared port `{port}`", kind.id);
        }

        // a synthesized call passes every input, otherwise only what was read is live
        let passes_all = matches!(emitted.emission, Emission::Function { call: None, .. });
        for (port, name, parameter) in pending {
            if !passes_all && !vars.was_read(port) {
                continue;
            }
            self.uniforms
                .push(format!("uniform {} {name};", parameter.value_type));
            self.parameters.insert(name, parameter);
        }

        match emitted.emission {
            Emission::Statement(statement) => self.body.push(statement),
            Emission::Function { name, source, call } => {
                let call = call.unwrap_or_else(|| format!("{name}({});", call_args.join(", ")));
                self.functions.entry(name).or_insert(source);
                self.body.push(call);
            }
        }
        for varying in emitted.varyings {
            self.varyings.entry(varying.declaration()).or_insert(varying);
        }
    }

    fn finish(self) -> GeneratedShader {
        let mut source = String::new();
        for declaration in self.varyings.keys() {
            source.push_str(declaration);
            source.push('\n');
        }
        for uniform in &self.uniforms {
            source.push_str(uniform);
            source.push('\n');
        }
        for function in self.functions.values() {
            source.push('\n');
            source.push_str(function);
            source.push('\n');
        }
        source.push_str("\nvoid main() {\n");
        for line in &self.body {
            source.push_str("  ");
            source.push_str(line);
            source.push('\n');
        }
        source.push_str("}\n");

        let varyings: Vec<Varying> = self.varyings.values().copied().collect();
        GeneratedShader {
            vertex_source: vertex_source(&varyings),
            fragment_source: source,
            parameters: self.parameters,
            has_output: true,
        }
    }
}

/// Compiles graphs and post-processes them with the optimizer
#[derive(Debug, Default)]
pub struct ShaderCompiler {
    settings: CompilerSettings,
    optimizer: OptimizerAdapter,
}

impl ShaderCompiler {
    /// Create a compiler with no optimizer backend loaded
    pub fn new(settings: CompilerSettings) -> Self {
        Self {
            settings,
            optimizer: OptimizerAdapter::new(settings.optimizer),
        }
    }

    /// Attach an optimizer backend
    pub fn with_optimizer(mut self, backend: impl ShaderOptimizer + 'static) -> Self {
        self.optimizer.set_backend(backend);
        self
    }

    /// Attach or replace the optimizer backend once it has loaded
    pub fn set_optimizer(&mut self, backend: impl ShaderOptimizer + 'static) {
        self.optimizer.set_backend(backend);
    }

    /// Active settings
    pub fn settings(&self) -> &CompilerSettings {
        &self.settings
    }

    /// Compile a graph snapshot
    pub fn compile(&self, graph: &Graph) -> CompiledShader {
        let generated = generate(graph);

        let optimized = if self.settings.optimize && generated.has_output {
            self.optimizer.try_optimize(&generated.fragment_source)
        } else {
            None
        };
        tracing::debug!(
            "Compiled {} nodes, {} parameters, optimized: {}",
            graph.node_count(),
            generated.parameters.len(),
            optimized.is_some()
        );

        CompiledShader {
            vertex_source: generated.vertex_source,
            optimized: optimized.is_some(),
            fragment_source: optimized.unwrap_or_else(|| generated.fragment_source.clone()),
            unoptimized_fragment_source: generated.fragment_source,
            parameters: generated.parameters,
        }
    }
}
