// SPDX-License-Identifier: MIT OR Apache-2.0
//! Fixed shader templates.
//!
//! The vertex stage is never user-editable: it transforms the position with
//! the host's `projectionMatrix`, `viewMatrix` and `modelMatrix` uniforms and
//! writes whichever varyings the fragment stage reads.

use crate::emit::Varying;

/// Fragment source used while the graph has no output node
pub const PLACEHOLDER_FRAGMENT_SHADER: &str = "void main() {\n  gl_FragColor = vec4(1.0, 0.0, 1.0, 1.0);\n}\n";

/// Vertex source writing exactly `varyings`
pub fn vertex_source(varyings: &[Varying]) -> String {
    let mut source = String::new();
    for varying in Varying::ALL.iter().filter(|v| varyings.contains(v)) {
        source.push_str(varying.declaration());
        source.push('\n');
    }
    source.push_str("void main() {\n");
    source.push_str(
        "  gl_Position = projectionMatrix * viewMatrix * modelMatrix * vec4(position, 1.0);\n",
    );
    for varying in Varying::ALL.iter().filter(|v| varyings.contains(v)) {
        source.push_str("  ");
        source.push_str(varying.vertex_assignment());
        source.push('\n');
    }
    source.push_str("}\n");
    source
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_vertex_template() {
        let source = vertex_source(&[]);
        assert!(!source.contains("varying"));
        assert!(source.contains("gl_Position"));
    }

    #[test]
    fn test_vertex_template_order_is_fixed() {
        let source = vertex_source(&[Varying::Uv, Varying::Normal]);
        assert_eq!(source, vertex_source(&[Varying::Normal, Varying::Uv]));
        let normal = source.find("varying vec3 v_normal;").unwrap();
        let uv = source.find("varying vec2 v_uv;").unwrap();
        assert!(normal < uv);
        assert!(source.contains("  v_normal = normal;\n"));
        assert!(source.contains("  v_uv = uv;\n"));
    }
}
