pub mod config;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use handlebars::{handlebars_helper, Handlebars};
use serde::Serialize;
use tracing::debug;
use walkdir::WalkDir;

use crate::utils::error::{Result, StacksError};

pub use config::{
    validate_yaml_config, DataSourceType, IngestWorkloadConfig, ProcessingWorkloadConfig,
    WorkloadConfig, WorkloadType,
};

pub const TEMPLATES_DIRECTORY: &str = "templates";
pub const TEMPLATE_EXTENSION: &str = "hbs";
const DQ_TEMPLATE_SUFFIX: &str = "_DQ";

handlebars_helper!(upper: |value: String| value.to_uppercase());

/// Confirmation seam for overwriting an existing workload directory. The CLI
/// asks on the terminal; tests substitute a fixed answer.
pub trait ConfirmOverwrite {
    fn confirm(&self, target_dir: &Path) -> bool;
}

pub struct TerminalPrompt;

impl ConfirmOverwrite for TerminalPrompt {
    fn confirm(&self, _target_dir: &Path) -> bool {
        dialoguer::Confirm::new()
            .with_prompt("Do you want to continue?")
            .default(false)
            .interact()
            .unwrap_or(false)
    }
}

/// Fixed-answer prompt for tests and non-interactive runs.
pub struct StaticAnswer(pub bool);

impl ConfirmOverwrite for StaticAnswer {
    fn confirm(&self, _target_dir: &Path) -> bool {
        self.0
    }
}

/// Root of the template tree. Overridable so generated projects can carry
/// their own templates.
pub fn templates_root() -> PathBuf {
    match std::env::var("STACKS_TEMPLATES_DIR") {
        Ok(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => Path::new(env!("CARGO_MANIFEST_DIR")).join(TEMPLATES_DIRECTORY),
    }
}

/// Target directory for a generated workload: `de_workloads/<type>/<name>`.
pub fn target_dir(workload_type: WorkloadType, name: &str) -> PathBuf {
    Path::new("de_workloads").join(workload_type.as_str()).join(name)
}

fn renderer() -> Handlebars<'static> {
    let mut registry = Handlebars::new();
    registry.register_helper("upper", Box::new(upper));
    registry.register_escape_fn(handlebars::no_escape);
    registry
}

/// Renders every template under `template_source_path` into `target_dir`,
/// mirroring the directory structure. `.hbs` files are rendered with the
/// config as context and lose the extension; other files are copied verbatim.
/// Existing files with the same name are overwritten.
pub fn render_template_components<C: Serialize>(
    config: &C,
    template_source_path: &Path,
    target_dir: &Path,
) -> Result<()> {
    fs::create_dir_all(target_dir)?;
    let registry = renderer();

    for entry in WalkDir::new(template_source_path) {
        let entry = entry.map_err(io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(template_source_path)
            .map_err(|_| StacksError::ConfigError {
                message: format!("template path escapes source tree: {}", entry.path().display()),
            })?;

        let is_template = entry
            .path()
            .extension()
            .is_some_and(|ext| ext == TEMPLATE_EXTENSION);

        let output_path = if is_template {
            target_dir.join(relative.with_extension(""))
        } else {
            target_dir.join(relative)
        };
        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent)?;
        }

        if is_template {
            let template = fs::read_to_string(entry.path())?;
            let rendered = registry.render_template(&template, config)?;
            fs::write(&output_path, rendered)?;
        } else {
            fs::copy(entry.path(), &output_path)?;
        }
        debug!("Rendered {}", output_path.display());
    }
    Ok(())
}

/// Generates a data pipeline workload into the project tree.
///
/// Renders the workload's template folder into `de_workloads/<type>/<name>`.
/// If the target already exists the prompt decides whether to continue; a
/// refusal leaves the existing files untouched. With `dq_flag` set, the
/// `<template_source_folder>_DQ` tree is rendered into the same target.
/// Returns the target directory.
pub fn generate_pipeline<C: WorkloadConfig>(
    config: &C,
    dq_flag: bool,
    prompt: &dyn ConfirmOverwrite,
) -> Result<PathBuf> {
    let workload_type = config.workload_type();
    let template_source_path = templates_root()
        .join(workload_type.as_str())
        .join(config.template_source_folder());
    let target = target_dir(workload_type, config.name());

    if target.exists() {
        println!(
            "Target directory {} already exists. Any files which are duplicated in the template will be overwritten.",
            target.display()
        );
        if !prompt.confirm(&target) {
            println!("Terminating process.");
            return Ok(target);
        }
        println!("Continuing with overwrite.");
    } else {
        println!("Target directory {} doesn't exist, creating directory.", target.display());
    }

    println!("Generating workload components for pipeline {}...", config.name());
    render_template_components(config, &template_source_path, &target)?;

    if dq_flag {
        let dq_source_path = templates_root()
            .join(workload_type.as_str())
            .join(format!("{}{DQ_TEMPLATE_SUFFIX}", config.template_source_folder()));
        render_template_components(config, &dq_source_path, &target)?;
    }

    println!("Successfully generated workload components: {}", target.display());
    Ok(target)
}
