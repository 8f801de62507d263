//! Workflow structure validator
//!
//! Runs the four validation layers in order and stops at the first failure.
//! File helpers load JSON or YAML definitions and summarize the outcome.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use walkdir::WalkDir;

use crate::errors::{FixSuggestion, GateError, StructuralError};
use crate::rules::WorkflowRules;
use crate::validators::{validate_edges, validate_nodes, validate_reachability, validate_start_node};
use crate::workflow::{ValidatedWorkflow, WorkflowDefinition};

/// Validate a definition, returning the typed workflow on success
pub fn validate_structure(
    definition: &WorkflowDefinition,
) -> std::result::Result<ValidatedWorkflow, StructuralError> {
    // Layer 1: Nodes
    let nodes = validate_nodes(&definition.nodes)?;
    tracing::debug!(nodes = nodes.len(), "node layer passed");

    // Layer 2: Start
    let start_node = validate_start_node(&nodes)?.to_string();

    // Layer 3: Edges
    let edges = validate_edges(&definition.edges, &nodes)?;
    tracing::debug!(edges = edges.len(), start = %start_node, "edge layer passed");

    // Layer 4: Graph
    validate_reachability(&nodes, &edges, &start_node)?;

    Ok(ValidatedWorkflow {
        nodes,
        edges,
        start_node,
    })
}

/// Definition file formats, picked by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefinitionFormat {
    Json,
    Yaml,
}

impl DefinitionFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
            "json" => Some(Self::Json),
            "yaml" | "yml" => Some(Self::Yaml),
            _ => None,
        }
    }
}

/// Read and parse a workflow definition file
pub fn load_definition(path: &Path) -> Result<WorkflowDefinition> {
    let format = DefinitionFormat::from_path(path).ok_or_else(|| GateError::UnsupportedFormat {
        path: path.display().to_string(),
    })?;

    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read workflow file {:?}", path))?;

    let definition = match format {
        DefinitionFormat::Json => WorkflowDefinition::from_json(&text)
            .map_err(GateError::from)
            .with_context(|| format!("Failed to parse workflow JSON from {:?}", path))?,
        DefinitionFormat::Yaml => WorkflowDefinition::from_yaml(&text)
            .map_err(GateError::from)
            .with_context(|| format!("Failed to parse workflow YAML from {:?}", path))?,
    };
    Ok(definition)
}

/// Rejection details for a report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportedError {
    pub code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fix: Option<String>,
}

impl From<&StructuralError> for ReportedError {
    fn from(error: &StructuralError) -> Self {
        Self {
            code: error.code(),
            message: error.to_string(),
            node_id: error.node_id().map(String::from),
            fix: error.fix_suggestion().map(String::from),
        }
    }
}

/// Summary of validating one definition
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationReport {
    pub file_path: String,
    pub node_count: usize,
    pub edge_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub complexity_score: Option<u32>,
    pub is_complex: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ReportedError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.error.is_none()
    }
}

/// Validator with the complexity threshold from the rule set
#[derive(Debug, Clone)]
pub struct Validator {
    complex_threshold: u32,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(&WorkflowRules::default())
    }
}

impl Validator {
    pub fn new(rules: &WorkflowRules) -> Self {
        Self {
            complex_threshold: rules.complex_threshold,
        }
    }

    /// Validate a parsed definition and summarize it
    pub fn validate(&self, definition: &WorkflowDefinition, file_path: &str) -> ValidationReport {
        let mut report = ValidationReport {
            file_path: file_path.to_string(),
            node_count: definition.nodes.len(),
            edge_count: definition.edges.len(),
            complexity_score: None,
            is_complex: false,
            error: None,
        };

        match validate_structure(definition) {
            Ok(workflow) => {
                let score = workflow.complexity_score();
                report.complexity_score = Some(score);
                report.is_complex = score > self.complex_threshold;
            }
            Err(error) => {
                tracing::debug!(file = file_path, code = error.code(), "definition rejected");
                report.error = Some(ReportedError::from(&error));
            }
        }
        report
    }

    /// Validate one definition file
    pub fn validate_file(&self, path: &Path) -> Result<ValidationReport> {
        let definition = load_definition(path)?;
        Ok(self.validate(&definition, &path.to_string_lossy()))
    }

    /// Validate every .json/.yaml/.yml file under a directory, sorted by path
    pub fn validate_dir(&self, dir: &Path) -> Result<Vec<ValidationReport>> {
        let mut paths = Vec::new();
        for entry in WalkDir::new(dir).sort_by_file_name() {
            let entry = entry.with_context(|| format!("Failed to walk {:?}", dir))?;
            if entry.file_type().is_file() && DefinitionFormat::from_path(entry.path()).is_some() {
                paths.push(entry.into_path());
            }
        }

        paths.iter().map(|path| self.validate_file(path)).collect()
    }

    /// Validate a file or, for a directory, every definition inside it
    pub fn validate_path(&self, path: &Path) -> Result<Vec<ValidationReport>> {
        if path.is_dir() {
            self.validate_dir(path)
        } else {
            Ok(vec![self.validate_file(path)?])
        }
    }
}
