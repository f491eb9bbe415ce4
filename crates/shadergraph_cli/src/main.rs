// SPDX-License-Identifier: MIT OR Apache-2.0
//! Shader graph compiler driver.
//!
//! Compiles a sample graph and prints the vertex source, the fragment
//! source, the parameter table as JSON and the standalone export. An
//! optional first argument names a RON settings file.

mod demo;

use shadergraph_compiler::export::export_fragment;
use shadergraph_compiler::node::RegistryError;
use shadergraph_compiler::settings::SettingsError;
use shadergraph_compiler::{CompilerSettings, NodeRegistry, ShaderCompiler};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Driver failure
#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("Failed to load settings: {0}")]
    Settings(#[from] SettingsError),
    #[error("Invalid node registry: {0}")]
    Registry(#[from] RegistryError),
    #[error("Failed to build graph: {0}")]
    Demo(#[from] demo::DemoError),
    #[error("Failed to encode parameters: {0}")]
    Json(#[from] serde_json::Error),
}

fn main() {
    let mut env_filter = tracing_subscriber::EnvFilter::from_default_env();
    for directive in ["shadergraph_cli=debug", "shadergraph_compiler=info"] {
        match directive.parse() {
            Ok(directive) => env_filter = env_filter.add_directive(directive),
            Err(e) => eprintln!("Ignoring log directive {directive}: {e}"),
        }
    }

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("Starting shadergraph v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(std::env::args().nth(1)) {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}

fn run(settings_path: Option<String>) -> Result<(), CliError> {
    let settings = match settings_path {
        Some(path) => {
            tracing::debug!("Loading settings from {path}");
            CompilerSettings::load(&path)?
        }
        None => CompilerSettings::default(),
    };

    let registry = NodeRegistry::builtin()?;
    tracing::debug!("{} node kinds registered", registry.kinds().count());

    let graph = demo::tinted_normals()?;
    let compiler = ShaderCompiler::new(settings);
    let compiled = compiler.compile(&graph);
    tracing::debug!(
        "Compiled '{}': {} nodes, {} edges",
        graph.name,
        graph.node_count(),
        graph.edge_count()
    );

    println!("// Vertex shader\n{}", compiled.vertex_source);
    println!("// Fragment shader\n{}", compiled.fragment_source);
    println!(
        "// Parameters\n{}\n",
        serde_json::to_string_pretty(&compiled.parameters)?
    );
    println!(
        "// Export\n{}",
        export_fragment(&compiled.unoptimized_fragment_source, &compiled.parameters)
    );
    Ok(())
}
