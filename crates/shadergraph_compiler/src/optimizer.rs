// SPDX-License-Identifier: MIT OR Apache-2.0
//! Adapter around an external GLSL source optimizer.
//!
//! The optimizer may not be loaded yet, and when it is, its output is not
//! trusted: anything outside the shader source character set, or carrying
//! an error report, is discarded and the caller keeps the unoptimized
//! source. None of these outcomes is fatal.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Shader stage flag passed to the optimizer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShaderStage {
    /// Vertex stage
    Vertex,
    /// Fragment stage
    #[default]
    Fragment,
}

/// Fixed tuning knobs handed to the optimizer on every call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerPreset {
    /// Optimization target level
    pub target: u32,
    /// Stage the source belongs to
    pub stage: ShaderStage,
}

impl Default for OptimizerPreset {
    fn default() -> Self {
        Self {
            target: 1,
            stage: ShaderStage::Fragment,
        }
    }
}

/// Raw answer of an optimizer backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptimizerOutput {
    /// Backend not initialized yet
    Unavailable,
    /// Whatever text the backend produced
    Text(String),
}

/// An external source-to-source optimizer
pub trait ShaderOptimizer {
    /// Optimize `source` for `target`; `vertex` selects the vertex stage
    fn optimize(&self, source: &str, target: u32, vertex: bool) -> OptimizerOutput;
}

impl<F> ShaderOptimizer for F
where
    F: Fn(&str, u32, bool) -> OptimizerOutput,
{
    fn optimize(&self, source: &str, target: u32, vertex: bool) -> OptimizerOutput {
        self(source, target, vertex)
    }
}

/// Why an optimizer result was discarded
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OptimizerError {
    /// No backend, or the backend is still loading
    #[error("Optimizer unavailable")]
    Unavailable,

    /// The backend reported an internal error
    #[error("Optimizer reported an error: {0}")]
    ReportedError(String),

    /// The output contains characters no shader source contains
    #[error("Optimizer output contains {offending:?} at byte {position}")]
    Malformed {
        /// First offending character
        offending: char,
        /// Byte offset of that character
        position: usize,
    },

    /// The output is blank
    #[error("Optimizer returned empty output")]
    Empty,
}

/// Marker the optimizer prefixes its failure reports with
const ERROR_MARKER: &str = "Error:";

/// Whether `c` may appear in generated or optimized shader source
pub fn is_shader_char(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || matches!(
            c,
            ' ' | '\t'
                | '\n'
                | '\r'
                | '_'
                | '.'
                | ','
                | ';'
                | ':'
                | '('
                | ')'
                | '{'
                | '}'
                | '['
                | ']'
                | '+'
                | '-'
                | '*'
                | '/'
                | '%'
                | '='
                | '<'
                | '>'
                | '!'
                | '&'
                | '|'
                | '^'
                | '~'
                | '?'
                | '#'
        )
}

/// Check an optimizer result before it replaces generated source
pub fn validate_output(text: &str) -> Result<(), OptimizerError> {
    if text.trim().is_empty() {
        return Err(OptimizerError::Empty);
    }
    if let Some(index) = text.find(ERROR_MARKER) {
        let report = text[index..].lines().next().unwrap_or_default();
        return Err(OptimizerError::ReportedError(report.to_string()));
    }
    if let Some((position, offending)) = text.char_indices().find(|(_, c)| !is_shader_char(*c)) {
        return Err(OptimizerError::Malformed {
            offending,
            position,
        });
    }
    Ok(())
}

/// Calls the optimizer backend with a fixed preset and vets its output
pub struct OptimizerAdapter {
    backend: Option<Box<dyn ShaderOptimizer>>,
    preset: OptimizerPreset,
}

impl OptimizerAdapter {
    /// Create an adapter with no backend loaded
    pub fn new(preset: OptimizerPreset) -> Self {
        Self {
            backend: None,
            preset,
        }
    }

    /// Attach a backend
    pub fn with_backend(mut self, backend: impl ShaderOptimizer + 'static) -> Self {
        self.set_backend(backend);
        self
    }

    /// Attach or replace the backend once it has loaded
    pub fn set_backend(&mut self, backend: impl ShaderOptimizer + 'static) {
        self.backend = Some(Box::new(backend));
    }

    /// Whether a backend is attached
    pub fn has_backend(&self) -> bool {
        self.backend.is_some()
    }

    /// Preset passed on every call
    pub fn preset(&self) -> OptimizerPreset {
        self.preset
    }

    /// Optimized source, or `None` when the caller should keep `source`
    pub fn try_optimize(&self, source: &str) -> Option<String> {
        match self.optimize(source) {
            Ok(optimized) => Some(optimized),
            Err(OptimizerError::Unavailable) => {
                tracing::debug!("Optimizer not loaded, keeping unoptimized source");
                None
            }
            Err(err) => {
                tracing::warn!("Discarding optimizer output: {err}");
                None
            }
        }
    }

    /// Run the backend and validate its answer
    pub fn optimize(&self, source: &str) -> Result<String, OptimizerError> {
        let backend = self.backend.as_ref().ok_or(OptimizerError::Unavailable)?;
        let vertex = self.preset.stage == ShaderStage::Vertex;
        match backend.optimize(source, self.preset.target, vertex) {
            OptimizerOutput::Unavailable => Err(OptimizerError::Unavailable),
            OptimizerOutput::Text(text) => {
                validate_output(&text)?;
                Ok(text)
            }
        }
    }
}

impl Default for OptimizerAdapter {
    fn default() -> Self {
        Self::new(OptimizerPreset::default())
    }
}

impl fmt::Debug for OptimizerAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptimizerAdapter")
            .field("backend", &self.backend.is_some())
            .field("preset", &self.preset)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn echo(source: &str, _target: u32, _vertex: bool) -> OptimizerOutput {
        OptimizerOutput::Text(source.trim().to_string())
    }

    #[test]
    fn test_missing_backend_is_unavailable() {
        let adapter = OptimizerAdapter::default();
        assert!(!adapter.has_backend());
        assert_eq!(adapter.optimize("void main() {}"), Err(OptimizerError::Unavailable));
        assert_eq!(adapter.try_optimize("void main() {}"), None);
    }

    #[test]
    fn test_loading_backend_is_unavailable() {
        let adapter = OptimizerAdapter::default()
            .with_backend(|_: &str, _: u32, _: bool| OptimizerOutput::Unavailable);
        assert_eq!(adapter.try_optimize("void main() {}"), None);
    }

    #[test]
    fn test_valid_output_is_used() {
        let adapter = OptimizerAdapter::default().with_backend(echo);
        assert_eq!(
            adapter.try_optimize("  void main() { gl_FragColor = vec4(1.0); }\n"),
            Some("void main() { gl_FragColor = vec4(1.0); }".to_string())
        );
    }

    #[test]
    fn test_backtick_is_rejected() {
        let adapter = OptimizerAdapter::default().with_backend(echo);
        assert_eq!(
            adapter.optimize("void main() { ` }"),
            Err(OptimizerError::Malformed {
                offending: '`',
                position: 14
            })
        );
        assert_eq!(adapter.try_optimize("void main() { ` }"), None);
    }

    #[test]
    fn test_error_report_is_rejected() {
        assert_eq!(
            validate_output("Error: syntax error, unexpected '}'\nmore"),
            Err(OptimizerError::ReportedError(
                "Error: syntax error, unexpected '}'".to_string()
            ))
        );
        assert_eq!(validate_output(" \n"), Err(OptimizerError::Empty));
        assert!(validate_output("héllo").is_err());
    }

    #[test]
    fn test_preset_reaches_backend() {
        let adapter = OptimizerAdapter::new(OptimizerPreset {
            target: 2,
            stage: ShaderStage::Vertex,
        })
        .with_backend(|_: &str, target: u32, vertex: bool| {
            OptimizerOutput::Text(format!("// {target} {vertex}"))
        });
        assert_eq!(adapter.optimize("x").as_deref(), Ok("// 2 true"));
    }
}
