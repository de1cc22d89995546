//! Workflow module - automation workflows synthesized for a client.
//!
//! A workflow is stored as one row carrying its graph as a JSON blob, plus
//! one row per node so nodes can be queried and edited individually.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};

use crate::domain::foundation::{ClientId, NodeId, Timestamp, UserId, WorkflowId};
use crate::domain::survey::{AnalyzedSurvey, WorkflowRecommendation};

/// Role of a node inside a workflow graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    Trigger,
    Action,
    End,
}

impl NodeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeType::Trigger => "trigger",
            NodeType::Action => "action",
            NodeType::End => "end",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workflow {
    pub id: WorkflowId,
    pub client_id: ClientId,
    pub user_id: UserId,
    pub name: String,
    pub description: String,
    pub graph: JsonValue,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub workflow_id: WorkflowId,
    pub name: String,
    pub node_type: NodeType,
    pub position: i32,
}

/// A workflow together with its nodes, ready to persist.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedWorkflow {
    pub workflow: Workflow,
    pub nodes: Vec<Node>,
}

/// Builds one workflow per recommendation in the analysis.
///
/// Each graph is linear: a trigger node, one action node per recommended
/// step, and an end node.
pub fn synthesize_workflows(
    client_id: ClientId,
    user_id: UserId,
    analysis: &AnalyzedSurvey,
    at: Timestamp,
) -> Vec<GeneratedWorkflow> {
    analysis
        .workflows
        .iter()
        .map(|rec| synthesize_one(client_id, user_id, rec, at))
        .collect()
}

fn synthesize_one(
    client_id: ClientId,
    user_id: UserId,
    rec: &WorkflowRecommendation,
    at: Timestamp,
) -> GeneratedWorkflow {
    let workflow_id = WorkflowId::new();

    let labels = std::iter::once((format!("{} trigger", rec.name), NodeType::Trigger))
        .chain(rec.steps.iter().map(|s| (s.clone(), NodeType::Action)))
        .chain(std::iter::once(("Done".to_string(), NodeType::End)));

    let nodes: Vec<Node> = labels
        .enumerate()
        .map(|(position, (name, node_type))| Node {
            id: NodeId::new(),
            workflow_id,
            name,
            node_type,
            position: position as i32,
        })
        .collect();

    let edges: Vec<JsonValue> = nodes
        .windows(2)
        .map(|pair| json!({ "source": pair[0].id, "target": pair[1].id }))
        .collect();

    let graph = json!({
        "nodes": nodes
            .iter()
            .map(|n| json!({
                "id": n.id,
                "name": n.name,
                "type": n.node_type.as_str(),
                "position": n.position,
            }))
            .collect::<Vec<_>>(),
        "edges": edges,
        "estimated_hours_saved": rec.estimated_hours_saved,
    });

    GeneratedWorkflow {
        workflow: Workflow {
            id: workflow_id,
            client_id,
            user_id,
            name: rec.name.clone(),
            description: rec.description.clone(),
            graph,
            created_at: at,
        },
        nodes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analysis() -> AnalyzedSurvey {
        AnalyzedSurvey {
            summary: String::new(),
            workflows: vec![
                WorkflowRecommendation {
                    name: "Invoice sync".into(),
                    description: "Push invoices".into(),
                    estimated_hours_saved: 4.0,
                    steps: vec!["Fetch".into(), "Post".into()],
                },
                WorkflowRecommendation {
                    name: "Lead routing".into(),
                    description: String::new(),
                    estimated_hours_saved: 0.0,
                    steps: vec![],
                },
            ],
        }
    }

    #[test]
    fn one_workflow_per_recommendation() {
        let client = ClientId::new();
        let generated = synthesize_workflows(client, UserId::new(), &analysis(), Timestamp::now());

        assert_eq!(generated.len(), 2);
        assert!(generated.iter().all(|g| g.workflow.client_id == client));
        assert_eq!(generated[0].workflow.name, "Invoice sync");
    }

    #[test]
    fn nodes_form_linear_graph() {
        let generated = synthesize_workflows(ClientId::new(), UserId::new(), &analysis(), Timestamp::now());
        let first = &generated[0];

        let types: Vec<NodeType> = first.nodes.iter().map(|n| n.node_type).collect();
        assert_eq!(types, vec![NodeType::Trigger, NodeType::Action, NodeType::Action, NodeType::End]);
        assert!(first.nodes.iter().all(|n| n.workflow_id == first.workflow.id));

        let edges = first.workflow.graph["edges"].as_array().unwrap();
        assert_eq!(edges.len(), 3);
        assert_eq!(first.workflow.graph["nodes"].as_array().unwrap().len(), 4);
    }

    #[test]
    fn workflow_without_steps_has_trigger_and_end() {
        let generated = synthesize_workflows(ClientId::new(), UserId::new(), &analysis(), Timestamp::now());
        assert_eq!(generated[1].nodes.len(), 2);
        assert_eq!(generated[1].nodes[1].position, 1);
    }
}
