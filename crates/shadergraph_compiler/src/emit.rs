// SPDX-License-Identifier: MIT OR Apache-2.0
//! Code emission contract between node kinds and the compiler.

use crate::node::Node;
use crate::port::{Marker, PortValue, ValueType};
use indexmap::IndexMap;
use std::cell::RefCell;

/// Per-invocation global input computed by the vertex stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Varying {
    /// Object-space surface normal
    Normal,
    /// Texture coordinate
    Uv,
}

impl Varying {
    /// All varyings in template order
    pub const ALL: [Varying; 2] = [Self::Normal, Self::Uv];

    /// Variable name shared by both stages
    pub fn name(self) -> &'static str {
        match self {
            Self::Normal => "v_normal",
            Self::Uv => "v_uv",
        }
    }

    /// Type of the varying
    pub fn value_type(self) -> ValueType {
        match self {
            Self::Normal => ValueType::Vec3,
            Self::Uv => ValueType::Vec2,
        }
    }

    /// Declaration line, identical in both stages
    pub fn declaration(self) -> &'static str {
        match self {
            Self::Normal => "varying vec3 v_normal;",
            Self::Uv => "varying vec2 v_uv;",
        }
    }

    /// Vertex stage statement that writes the varying
    pub fn vertex_assignment(self) -> &'static str {
        match self {
            Self::Normal => "v_normal = normal;",
            Self::Uv => "v_uv = uv;",
        }
    }
}

/// Variable names allocated for a node's ports.
///
/// Unconnected inputs map to parameter names, connected inputs to the
/// (possibly coerced) upstream output expression, outputs to fresh locals.
/// Controls have no entry.
#[derive(Debug, Default)]
pub struct Vars {
    names: IndexMap<&'static str, String>,
    read: RefCell<Vec<String>>,
    missing: RefCell<Vec<String>>,
}

impl Vars {
    /// Create an empty mapping
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a port to a variable or expression
    pub fn insert(&mut self, port: &'static str, name: impl Into<String>) {
        self.names.insert(port, name.into());
    }

    /// Variable bound to `port`.
    ///
    /// Looking up a port with no binding is recorded and yields an empty
    /// string; see [`Vars::missing`].
    pub fn get(&self, port: &str) -> &str {
        match self.names.get(port) {
            Some(name) => {
                let mut read = self.read.borrow_mut();
                if !read.iter().any(|p| p == port) {
                    read.push(port.to_string());
                }
                name
            }
            None => {
                self.missing.borrow_mut().push(port.to_string());
                ""
            }
        }
    }

    /// Whether `port` was looked up with a binding
    pub fn was_read(&self, port: &str) -> bool {
        self.read.borrow().iter().any(|p| p == port)
    }

    /// Ports looked up without a binding
    pub fn missing(&self) -> Vec<String> {
        self.missing.borrow().clone()
    }

    /// Bound variables in port declaration order
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.names.iter().map(|(port, name)| (*port, name.as_str()))
    }
}

/// Inputs handed to an emission function
#[derive(Debug, Clone, Copy)]
pub struct EmitArgs<'a> {
    /// Instance being emitted
    pub node: &'a Node,
    /// Port variable bindings
    pub vars: &'a Vars,
}

impl<'a> EmitArgs<'a> {
    /// Create emission arguments
    pub fn new(node: &'a Node, vars: &'a Vars) -> Self {
        Self { node, vars }
    }

    /// Variable bound to `port`
    pub fn var(&self, port: &str) -> &'a str {
        self.vars.get(port)
    }

    /// Current value of an input or control
    pub fn value(&self, port: &str) -> Option<&'a PortValue> {
        self.node.value(port)
    }

    /// Resolved type of a dynamic marker
    pub fn dynamic_type(&self, marker: Marker) -> ValueType {
        self.node.dynamic_type(marker)
    }

    /// Resolved type of an output
    pub fn output_type(&self, port: &str) -> ValueType {
        self.node.output_type(port).unwrap_or(ValueType::LOWEST)
    }
}

/// Code produced for one node
#[derive(Debug, Clone, PartialEq)]
pub enum Emission {
    /// A single statement in the entry routine
    Statement(String),
    /// A shared function definition plus a call in the entry routine
    Function {
        /// Function name, used to deduplicate definitions
        name: String,
        /// Full definition
        source: String,
        /// Explicit call; when absent the compiler passes every input
        /// variable followed by every output variable
        call: Option<String>,
    },
}

/// Result of an emission function
#[derive(Debug, Clone, PartialEq)]
pub struct Emitted {
    /// Emitted code
    pub emission: Emission,
    /// Varyings the code reads
    pub varyings: Vec<Varying>,
}

impl Emitted {
    /// Emit a single statement
    pub fn statement(statement: impl Into<String>) -> Self {
        Self {
            emission: Emission::Statement(statement.into()),
            varyings: Vec::new(),
        }
    }

    /// Emit a shared function with a synthesized call
    pub fn function(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            emission: Emission::Function {
                name: name.into(),
                source: source.into(),
                call: None,
            },
            varyings: Vec::new(),
        }
    }

    /// Replace the synthesized call of a function emission
    pub fn with_call(mut self, statement: impl Into<String>) -> Self {
        if let Emission::Function { call, .. } = &mut self.emission {
            *call = Some(statement.into());
        }
        self
    }

    /// Declare a required varying
    pub fn with_varying(mut self, varying: Varying) -> Self {
        self.varyings.push(varying);
        self
    }
}
