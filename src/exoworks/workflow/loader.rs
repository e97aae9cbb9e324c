//! Workflow loader - YAML and JSON document loading
//!
//! Documents carry `id`, `name`, `nodes` and `edges`. Each node's config is
//! checked against its type while parsing, but graph invariants are not:
//! a loaded workflow may still have duplicate ids or dangling edges, which
//! `Workflow::validate` and the engine report.

use std::fs;
use std::path::{Path, PathBuf};

use super::graph::Workflow;
use crate::sdk::error::ExoError;

const EXTENSIONS: [&str; 3] = ["yaml", "yml", "json"];

/// Loads workflow documents from disk
pub struct WorkflowLoader;

impl WorkflowLoader {
    pub fn new() -> Self {
        Self
    }

    /// Load a workflow from a file; `.json` files are parsed as JSON, anything
    /// else as YAML
    pub fn load_workflow<P: AsRef<Path>>(&self, path: P) -> Result<Workflow, ExoError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let workflow = Self::parse_document(path, &content)?;
        log::debug!(
            "Loaded workflow '{}' from {} ({} nodes)",
            workflow.id,
            path.display(),
            workflow.nodes().len()
        );
        Ok(workflow)
    }

    /// Parse already read content, picking the format from `path` the same
    /// way `load_workflow` does
    pub fn parse_document(path: &Path, content: &str) -> Result<Workflow, ExoError> {
        if has_extension(path, "json") {
            Self::parse_json(content)
        } else {
            Self::parse_yaml(content)
        }
    }

    /// Parse a workflow from a YAML string
    pub fn parse_yaml(content: &str) -> Result<Workflow, ExoError> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Parse a workflow from a JSON string
    pub fn parse_json(content: &str) -> Result<Workflow, ExoError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Whether a path looks like a workflow document
    pub fn is_workflow_file(path: &Path) -> bool {
        EXTENSIONS.iter().any(|ext| has_extension(path, ext))
    }

    /// Locate the document for `id` inside `dir`, trying each known extension
    pub fn find_workflow(dir: &Path, id: &str) -> Option<PathBuf> {
        // Ids are file stems; anything that could leave `dir` is not one
        if id.is_empty() || id.contains(['/', '\\']) || id.contains("..") {
            return None;
        }
        EXTENSIONS
            .iter()
            .map(|ext| dir.join(format!("{}.{}", id, ext)))
            .find(|p| p.is_file())
    }
}

impl Default for WorkflowLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension().is_some_and(|e| e.eq_ignore_ascii_case(ext))
}
