//! Render documents from a file or inline text

use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::CliError;
use crate::convert::{parse_yaml_documents, to_yaml_string};
use crate::output::to_json_pretty;
use crate::{Config, DirFs, Engine, Syntax, Value};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Yaml,
    Json,
}

/// Options for the render command
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    /// Template file; includes resolve relative to its directory
    pub file: Option<PathBuf>,
    /// Inline YAML, used when no file is given
    pub input: Option<String>,
    /// Directive keyword overrides
    pub syntax: Option<Syntax>,
}

/// Evaluate the template and return the output documents
pub fn execute_render(options: &RenderOptions) -> Result<Vec<Value>, CliError> {
    let config = match &options.syntax {
        Some(syntax) => Config::new().with_syntax(syntax.clone()),
        None => Config::new(),
    };

    if let Some(file) = &options.file {
        let dir = file
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        let name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or(CliError::NoInput)?;
        let engine = Engine::new(config.with_fs(Arc::new(DirFs::new(dir))));
        return Ok(engine.load(&name)?);
    }

    let text = options.input.as_ref().ok_or(CliError::NoInput)?;
    let engine = Engine::new(config.with_fs(Arc::new(DirFs::new("."))));
    let mut output = Vec::new();
    for doc in parse_yaml_documents(text)? {
        output.extend(engine.parse(&doc)?);
    }
    Ok(output)
}

/// Serialize documents: YAML separated by `---`, or JSON (an array when
/// there is more than one)
pub fn format_documents(docs: &[Value], format: OutputFormat) -> Result<String, CliError> {
    match format {
        OutputFormat::Yaml => {
            let rendered = docs
                .iter()
                .map(to_yaml_string)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rendered.join("---\n"))
        }
        OutputFormat::Json => {
            let json = match docs {
                [single] => to_json_pretty(single),
                many => to_json_pretty(&Value::Sequence(many.to_vec())),
            };
            Ok(format!("{}\n", json))
        }
    }
}

/// Read directive keyword overrides from a YAML or JSON file
pub fn load_syntax(path: &Path) -> Result<Syntax, CliError> {
    let text = std::fs::read_to_string(path)?;
    let syntax = if path.extension().is_some_and(|ext| ext == "json") {
        serde_json::from_str(&text)?
    } else {
        serde_yaml::from_str(&text)?
    };
    Ok(syntax)
}
