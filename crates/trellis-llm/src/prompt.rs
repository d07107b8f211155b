//! Prompt templates for relation extraction and grounded answering.

use serde::{Deserialize, Serialize};

/// A prompt template for backend requests.
pub trait PromptTemplate {
    /// Render the full prompt text.
    fn generate(&self) -> String;

    /// Optional system prompt to send alongside.
    fn system_prompt(&self) -> Option<String> {
        None
    }
}

/// Domain framing for relation extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionProfile {
    /// General-purpose text.
    #[default]
    General,
    /// Clinical narratives: case reports, radiology impressions, findings.
    Clinical,
}

impl ExtractionProfile {
    /// System instructions for the structured-generation call.
    pub fn instructions(&self) -> &'static str {
        match self {
            Self::General => GENERAL_INSTRUCTIONS,
            Self::Clinical => CLINICAL_INSTRUCTIONS,
        }
    }
}

const GENERAL_INSTRUCTIONS: &str = "\
You are a precise graph relationship extractor. Extract all relationships \
from the text and format them as a JSON object with this exact structure:
{
    \"graph\": [
        {\"node\": \"Person/Entity\",
         \"target_node\": \"Related Entity\",
         \"relationship\": \"Type of Relationship\"},
        ...more relationships...
    ]
}
Include ALL relationships mentioned in the text, including implicit ones. \
Be thorough and precise. If a node has no extractable target or \
relationship, emit it with null for the missing fields.";

const CLINICAL_INSTRUCTIONS: &str = "\
You are a medical graph relationship extractor. Focus on relations between \
anatomy, impressions, observations, diagnoses and treatments. Extract \
medical relationships from the text and format them as a JSON object with \
this exact structure:
{
    \"graph\": [
        {\"node\": \"Clinical Entity\",
         \"target_node\": \"Related Clinical Entity\",
         \"relationship\": \"Type of Relationship\"},
        ...more relationships...
    ]
}
Only include relations between clinically relevant entities.";

/// Prompt for structured relation extraction.
#[derive(Debug, Clone)]
pub struct RelationPrompt {
    /// The text to extract relations from.
    pub text: String,
    /// Domain framing.
    pub profile: ExtractionProfile,
}

impl RelationPrompt {
    /// Create a new relation extraction prompt.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            profile: ExtractionProfile::General,
        }
    }

    /// Set the extraction profile.
    pub fn with_profile(mut self, profile: ExtractionProfile) -> Self {
        self.profile = profile;
        self
    }
}

impl PromptTemplate for RelationPrompt {
    fn system_prompt(&self) -> Option<String> {
        Some(self.profile.instructions().to_string())
    }

    fn generate(&self) -> String {
        format!("Here is the text:\n{}", self.text)
    }
}

/// Grounding prompt for answer generation over an assembled subgraph.
#[derive(Debug, Clone)]
pub struct AnswerPrompt<'a> {
    /// Deduplicated entity names from the subgraph.
    pub nodes: &'a [String],
    /// Rendered edge lines, one per triple.
    pub edges: &'a [String],
    /// The original user query.
    pub query: &'a str,
}

impl<'a> AnswerPrompt<'a> {
    pub fn new(nodes: &'a [String], edges: &'a [String], query: &'a str) -> Self {
        Self {
            nodes,
            edges,
            query,
        }
    }
}

impl PromptTemplate for AnswerPrompt<'_> {
    fn generate(&self) -> String {
        format!(
            "Provide the answer for the following question:\n\
             Question: {}\n\n\
             Use only the following graph context to ground your answer.\n\
             Nodes: {}\n\
             Edges: {}\n\n\
             Answer:",
            self.query,
            self.nodes.join(", "),
            self.edges.join("; "),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_instructions_describe_schema() {
        for profile in [ExtractionProfile::General, ExtractionProfile::Clinical] {
            let instructions = profile.instructions();
            assert!(instructions.contains("\"graph\""));
            assert!(instructions.contains("target_node"));
            assert!(instructions.contains("relationship"));
        }
    }

    #[test]
    fn test_relation_prompt_carries_text_and_profile() {
        let prompt = RelationPrompt::new("A causes B.").with_profile(ExtractionProfile::Clinical);
        assert!(prompt.generate().contains("A causes B."));
        assert!(prompt.system_prompt().unwrap().contains("medical"));
    }

    #[test]
    fn test_answer_prompt_includes_context_and_query() {
        let nodes = vec!["A".to_string(), "B".to_string()];
        let edges = vec!["A causes B".to_string()];
        let prompt = AnswerPrompt::new(&nodes, &edges, "What causes B?");
        let text = prompt.generate();
        assert!(text.contains("What causes B?"));
        assert!(text.contains("Nodes: A, B"));
        assert!(text.contains("Edges: A causes B"));
        assert!(prompt.system_prompt().is_none());
    }
}
