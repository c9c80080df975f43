//! Request and response types for `text:analyze`.

use serde::{Deserialize, Serialize};

/// Harm categories understood by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TextCategory {
    Hate,
    SelfHarm,
    Sexual,
    Violence,
}

/// Granularity of returned severities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputType {
    /// Severities 0, 2, 4, 6.
    FourSeverityLevels,
    /// Severities 0 through 7.
    EightSeverityLevels,
}

/// Body of a text analysis request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeTextOptions {
    pub text: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<TextCategory>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub blocklist_names: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub halt_on_blocklist_hit: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_type: Option<OutputType>,
}

impl AnalyzeTextOptions {
    /// Analyze `text` for the given categories only.
    pub fn new(text: impl Into<String>, categories: &[TextCategory]) -> Self {
        Self {
            text: text.into(),
            categories: categories.to_vec(),
            blocklist_names: Vec::new(),
            halt_on_blocklist_hit: None,
            output_type: Some(OutputType::FourSeverityLevels),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlocklistMatch {
    pub blocklist_name: String,
    pub blocklist_item_id: String,
    pub blocklist_item_text: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CategoryAnalysis {
    pub category: TextCategory,
    #[serde(default)]
    pub severity: Option<f64>,
}

/// Response of a text analysis request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeTextResult {
    #[serde(default)]
    pub blocklists_match: Vec<BlocklistMatch>,
    pub categories_analysis: Vec<CategoryAnalysis>,
}

impl AnalyzeTextResult {
    /// Severity reported for `category`, if any.
    pub fn severity(&self, category: TextCategory) -> Option<f64> {
        self.categories_analysis
            .iter()
            .find(|c| c.category == category)
            .and_then(|c| c.severity)
    }
}
