//! Request and payload shapes for the external matching API.
//!
//! Only the fields the panels render are typed; anything else the analysis
//! endpoint returns is kept in `extra` so it can be sent back verbatim as
//! `original_analysis`.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ────────────────────────────────────────────────────────────────────────────
// POST /analyze-cv
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Improvement {
    pub priority: String, // "high" | "medium" | "low"
    pub message: String,
}

impl Improvement {
    pub fn is_high_priority(&self) -> bool {
        self.priority.eq_ignore_ascii_case("high")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KeywordMatch {
    pub word: String,
    pub matched: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CvAnalysis {
    pub overall_score: f64,
    #[serde(default)]
    pub improvements: Vec<Improvement>,
    #[serde(default)]
    pub keywords: Vec<KeywordMatch>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ────────────────────────────────────────────────────────────────────────────
// POST /optimize-cv
// ────────────────────────────────────────────────────────────────────────────

/// Optional targeting the visitor picked before asking for optimization.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct OptimizationTargets {
    pub target_industry: Option<String>,
    pub experience_level: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OptimizeCvRequest {
    pub original_analysis: CvAnalysis,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_industry: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experience_level: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OptimizedCv {
    pub improvement_score: f64,
    pub ats_score: f64,
    pub readability_score: f64,
    pub preview: String,
}

// ────────────────────────────────────────────────────────────────────────────
// POST /generate-cover-letter
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    #[default]
    Professional,
    Enthusiastic,
    Formal,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LetterLength {
    Short,
    #[default]
    Medium,
    Long,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CoverLetterRequest {
    pub job_description: String,
    pub cv_data: Value,
    pub tone: Tone,
    pub length: LetterLength,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CoverLetter {
    pub relevance_score: f64,
    pub personalization_score: f64,
    pub content: String,
}

// ────────────────────────────────────────────────────────────────────────────
// POST /scan-jobs
// ────────────────────────────────────────────────────────────────────────────

/// Candidate profile sent to the job scanner.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct JobScanRequest {
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experience: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salary_expectation: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
}

/// Ids from the scanner may arrive as strings or numbers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum ExternalId {
    Text(String),
    Number(i64),
}

impl fmt::Display for ExternalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExternalId::Text(s) => f.write_str(s),
            ExternalId::Number(n) => write!(f, "{n}"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JobMatch {
    pub id: ExternalId,
    pub title: String,
    pub company: String,
    pub location: String,
    pub salary: String,
    pub match_score: f64,
    #[serde(default)]
    pub match_reasons: Vec<String>,
}
