use std::path::Path;

use mfl_codegen::CodegenOptions;
use mfl_secd::MachineConfig;
use serde::Deserialize;

use crate::diagnostics::DiagnosticOptions;

/// Which backend runs after type checking.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Backend {
    /// Compile to SECD instructions and evaluate them.
    #[default]
    Secd,
    /// Emit a Core Erlang module.
    CoreErlang,
}

/// Options for one pipeline run, usually read from an `mfl.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompileOptions {
    pub backend: Backend,
    /// Record every shift/reduce action of the parser.
    pub trace_parse: bool,
    pub module_name: String,
    pub entry_name: String,
    /// Annotate let-bound values in Core Erlang output with their types.
    pub annotate_types: bool,
    /// SECD step budget; unbounded when absent.
    pub max_steps: Option<u64>,
    pub diagnostics: DiagnosticOptions,
}

impl Default for CompileOptions {
    fn default() -> Self {
        let codegen = CodegenOptions::default();
        Self {
            backend: Backend::default(),
            trace_parse: false,
            module_name: codegen.module_name,
            entry_name: codegen.entry_name,
            annotate_types: codegen.annotate_types,
            max_steps: None,
            diagnostics: DiagnosticOptions::default(),
        }
    }
}

impl CompileOptions {
    /// Read and parse options from a TOML file.
    pub fn from_file(path: &Path) -> Result<CompileOptions, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
        Self::from_toml(&content)
    }

    /// Parse options from a TOML string. Missing keys take their defaults.
    pub fn from_toml(content: &str) -> Result<CompileOptions, String> {
        toml::from_str(content).map_err(|e| format!("Failed to parse options: {}", e))
    }

    pub fn codegen_options(&self) -> CodegenOptions {
        CodegenOptions {
            module_name: self.module_name.clone(),
            entry_name: self.entry_name.clone(),
            annotate_types: self.annotate_types,
        }
    }

    pub fn machine_config(&self) -> MachineConfig {
        MachineConfig {
            max_steps: self.max_steps,
        }
    }
}
