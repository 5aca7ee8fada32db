//! Catalog entity tree matching the shared document shape.
//!
//! Strict containment: Department → Subject → Experiment → Contribution.
//! IDs are opaque strings, unique across the whole tree.

use serde::{Deserialize, Serialize};

use super::Timestamp;

/// Kind of artifact a student attaches to an experiment.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ContributionType {
    #[serde(rename = "Code Snippet")]
    Code,
    #[serde(rename = "Viva Q&A")]
    Viva,
    #[serde(rename = "Theory/Concept")]
    Theory,
    #[serde(rename = "Diagram/Flowchart")]
    Diagram,
}

impl ContributionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContributionType::Code => "Code Snippet",
            ContributionType::Viva => "Viva Q&A",
            ContributionType::Theory => "Theory/Concept",
            ContributionType::Diagram => "Diagram/Flowchart",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Code Snippet" => Some(ContributionType::Code),
            "Viva Q&A" => Some(ContributionType::Viva),
            "Theory/Concept" => Some(ContributionType::Theory),
            "Diagram/Flowchart" => Some(ContributionType::Diagram),
            _ => None,
        }
    }
}

/// One code listing inside a multi-snippet contribution.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CodeSnippet {
    pub language: String,
    pub code: String,
}

/// A user-submitted artifact attached to an experiment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Contribution {
    pub id: String,
    pub author: String,
    #[serde(rename = "type")]
    pub kind: ContributionType,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Kept for backward compatibility with single-snippet documents
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_snippets: Option<Vec<CodeSnippet>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question: Option<String>,
    #[serde(default)]
    pub upvotes: u32,
    pub created_at: Timestamp,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_ai_generated: Option<bool>,
}

/// A lab experiment under a subject.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Experiment {
    pub id: String,
    pub title: String,
    pub objective: String,
    #[serde(default)]
    pub contributions: Vec<Contribution>,
}

/// A subject under a department.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    pub id: String,
    pub name: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drive_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github_link: Option<String>,
    #[serde(default)]
    pub experiments: Vec<Experiment>,
}

/// A root-level department. Insertion order is display order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub subjects: Vec<Subject>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contribution_type_wire_strings() {
        assert_eq!(ContributionType::Code.as_str(), "Code Snippet");
        assert_eq!(
            ContributionType::from_str("Viva Q&A"),
            Some(ContributionType::Viva)
        );
        assert_eq!(ContributionType::from_str("Essay"), None);
    }

    #[test]
    fn test_contribution_serializes_camel_case() {
        let contribution = Contribution {
            id: "c-1".to_string(),
            author: "Jane Doe".to_string(),
            kind: ContributionType::Theory,
            content: "Stacks are LIFO.".to_string(),
            image_url: None,
            language: None,
            code_snippets: None,
            question: None,
            upvotes: 3,
            created_at: Timestamp::parse("2023-10-26T10:00:00Z"),
            is_ai_generated: None,
        };

        let value = serde_json::to_value(&contribution).unwrap();
        assert_eq!(value["type"], "Theory/Concept");
        assert_eq!(value["createdAt"], "2023-10-26T10:00:00+00:00");
        assert!(value.get("imageUrl").is_none());
        assert!(value.get("isAiGenerated").is_none());
    }

    #[test]
    fn test_department_tolerates_missing_collections() {
        let dept: Department =
            serde_json::from_str(r#"{"id": "dept-1", "name": "Physics"}"#).unwrap();
        assert!(dept.subjects.is_empty());
    }
}
