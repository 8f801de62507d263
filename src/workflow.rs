//! Workflow definition structures
//!
//! Two layers:
//! - `WorkflowDefinition`: the wire shape submitted by a client (JSON or YAML).
//!   Fields the validator must report on are optional so that their absence
//!   becomes a structural error rather than a parse error.
//! - `ValidatedWorkflow`: typed nodes whose per-type configuration was checked
//!   at construction. Only the validator produces one.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use url::Url;

use crate::errors::StructuralError;

/// Workflow graph as submitted by a client
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct WorkflowDefinition {
    #[serde(default, deserialize_with = "null_as_default")]
    pub nodes: Vec<NodeDef>,
    /// Absent or null edges are treated as an empty list
    #[serde(default, deserialize_with = "null_as_default")]
    pub edges: Vec<EdgeDef>,
}

impl WorkflowDefinition {
    /// Parse from JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Parse from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Iterate over node IDs that are present
    pub fn node_ids(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().filter_map(|n| n.id.as_deref())
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct NodeDef {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, rename = "type")]
    pub node_type: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: Map<String, Value>,
}

/// Explicit `null` reads the same as an absent field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl NodeDef {
    pub fn new(id: impl Into<String>, node_type: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            node_type: Some(node_type.into()),
            data: Map::new(),
        }
    }

    /// Builder-style data field
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.data.insert(key.to_string(), value.into());
        self
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct EdgeDef {
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub target: Option<String>,
}

impl EdgeDef {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: Some(source.into()),
            target: Some(target.into()),
        }
    }
}

/// The closed set of node types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    Start,
    End,
    Condition,
    Action,
    Delay,
    Email,
    Webhook,
    Database,
    ApiCall,
}

impl NodeType {
    pub const ALL: [NodeType; 9] = [
        NodeType::Start,
        NodeType::End,
        NodeType::Condition,
        NodeType::Action,
        NodeType::Delay,
        NodeType::Email,
        NodeType::Webhook,
        NodeType::Database,
        NodeType::ApiCall,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeType::Start => "start",
            NodeType::End => "end",
            NodeType::Condition => "condition",
            NodeType::Action => "action",
            NodeType::Delay => "delay",
            NodeType::Email => "email",
            NodeType::Webhook => "webhook",
            NodeType::Database => "database",
            NodeType::ApiCall => "api_call",
        }
    }

    /// Branching or external-call nodes weigh more in the complexity score
    pub fn is_complex(&self) -> bool {
        matches!(self, NodeType::Condition | NodeType::ApiCall | NodeType::Webhook)
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NodeType::ALL
            .iter()
            .find(|t| t.as_str() == s)
            .copied()
            .ok_or(())
    }
}

/// Email content: at least one of the two is set
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmailContent {
    pub template_id: Option<Value>,
    pub subject: Option<Value>,
}

/// Per-type node configuration, valid by construction
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeConfig {
    Start,
    End,
    Condition,
    Action,
    Delay { duration: f64 },
    Email(EmailContent),
    Webhook { url: Url },
    Database,
    ApiCall,
}

impl NodeConfig {
    /// Build the typed configuration for a node, enforcing per-type fields
    pub fn from_data(
        id: &str,
        node_type: NodeType,
        data: &Map<String, Value>,
    ) -> Result<Self, StructuralError> {
        let config = match node_type {
            NodeType::Start => NodeConfig::Start,
            NodeType::End => NodeConfig::End,
            NodeType::Condition => NodeConfig::Condition,
            NodeType::Action => NodeConfig::Action,
            NodeType::Database => NodeConfig::Database,
            NodeType::ApiCall => NodeConfig::ApiCall,
            NodeType::Email => {
                let template_id = present(data, "template_id");
                let subject = present(data, "subject");
                if template_id.is_none() && subject.is_none() {
                    return Err(StructuralError::MissingEmailContent { id: id.to_string() });
                }
                NodeConfig::Email(EmailContent {
                    template_id,
                    subject,
                })
            }
            NodeType::Webhook => {
                let raw = data.get("url").and_then(Value::as_str).unwrap_or_default();
                let url = parse_absolute_url(raw).ok_or_else(|| {
                    StructuralError::InvalidWebhookUrl {
                        id: id.to_string(),
                        url: raw.to_string(),
                    }
                })?;
                NodeConfig::Webhook { url }
            }
            NodeType::Delay => {
                let duration = data
                    .get("duration")
                    .and_then(numeric)
                    .filter(|d| d.is_finite() && *d > 0.0)
                    .ok_or_else(|| StructuralError::InvalidDelayDuration { id: id.to_string() })?;
                NodeConfig::Delay { duration }
            }
        };
        Ok(config)
    }

    pub fn node_type(&self) -> NodeType {
        match self {
            NodeConfig::Start => NodeType::Start,
            NodeConfig::End => NodeType::End,
            NodeConfig::Condition => NodeType::Condition,
            NodeConfig::Action => NodeType::Action,
            NodeConfig::Delay { .. } => NodeType::Delay,
            NodeConfig::Email(_) => NodeType::Email,
            NodeConfig::Webhook { .. } => NodeType::Webhook,
            NodeConfig::Database => NodeType::Database,
            NodeConfig::ApiCall => NodeType::ApiCall,
        }
    }
}

/// A key counts as present when it exists and is not null
fn present(data: &Map<String, Value>, key: &str) -> Option<Value> {
    data.get(key).filter(|v| !v.is_null()).cloned()
}

/// Numbers and numeric strings both count as durations
fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn parse_absolute_url(raw: &str) -> Option<Url> {
    let url = Url::parse(raw.trim()).ok()?;
    url.has_host().then_some(url)
}

/// Node that passed every per-node check
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    pub id: String,
    pub config: NodeConfig,
    pub data: Map<String, Value>,
}

impl Node {
    pub fn node_type(&self) -> NodeType {
        self.config.node_type()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Edge {
    pub source: String,
    pub target: String,
}

/// Workflow that passed structural validation
#[derive(Debug, Clone, Serialize)]
pub struct ValidatedWorkflow {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub start_node: String,
}

impl ValidatedWorkflow {
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn get_node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// 2 per node, 1 per edge, 5 extra per condition/api_call/webhook node
    pub fn complexity_score(&self) -> u32 {
        let nodes = self.nodes.len() as u32;
        let edges = self.edges.len() as u32;
        let complex = self
            .nodes
            .iter()
            .filter(|n| n.node_type().is_complex())
            .count() as u32;
        nodes * 2 + edges + complex * 5
    }
}
