// SPDX-License-Identifier: MIT OR Apache-2.0
//! Shader node graph and graph-to-GLSL compiler.
//!
//! A [`Graph`] holds typed nodes connected output-to-input. Every mutation
//! keeps it acyclic, type-compatible and with dynamic port types resolved.
//! The [`ShaderCompiler`] turns a graph snapshot into vertex and fragment
//! sources plus a [`ParameterTable`] of uniforms for the renderer to bind,
//! optionally post-processed by an external [`ShaderOptimizer`].
//!
//! ## Architecture
//!
//! - [`port`] and [`conversion`]: value types and implicit coercions
//! - [`node`] and [`nodes`]: node kind declarations and the built-in kinds
//! - [`graph`] and [`resolve`]: graph mutation and dynamic type resolution
//! - [`schedule`] and [`compiler`]: pruning, ordering and code assembly
//! - [`optimizer`], [`export`] and [`session`]: post-processing and editing

pub mod compiler;
pub mod conversion;
pub mod edge;
pub mod emit;
pub mod export;
pub mod graph;
pub mod node;
pub mod nodes;
pub mod optimizer;
pub mod port;
pub mod resolve;
pub mod schedule;
pub mod session;
pub mod settings;
pub mod shaders;

pub use compiler::{CompiledShader, GeneratedShader, Parameter, ParameterTable, ShaderCompiler};
pub use edge::{Edge, EdgeId};
pub use graph::{EdgeError, Graph, GraphError, ValueChange};
pub use node::{KindId, Node, NodeId, NodeKind, NodeRegistry};
pub use optimizer::{OptimizerAdapter, OptimizerOutput, ShaderOptimizer};
pub use port::{PortValue, ValueType};
pub use session::ShaderSession;
pub use settings::CompilerSettings;
