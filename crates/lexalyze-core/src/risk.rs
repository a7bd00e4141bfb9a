//! Keyword-based risk scoring for legal documents.
//!
//! A document's risk is the number of distinct risk keywords it contains,
//! matched case-insensitively as substrings ("terminated" counts for
//! "terminate"). Each keyword counts once however often it appears.
//!
//! | distinct keywords | level |
//! |---|---|
//! | 0 | Low Risk |
//! | 1–3 | Medium Risk |
//! | 4+ | High Risk |

use std::fmt;

use serde::{Deserialize, Serialize};

/// Terms whose presence raises a document's risk level.
pub const RISK_KEYWORDS: &[&str] = &[
    "terminate",
    "indemnify",
    "liability",
    "breach",
    "default",
    "waive",
    "penalty",
];

/// Keyword count above which a document is high risk.
const HIGH_RISK_ABOVE: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    #[serde(rename = "Low Risk")]
    Low,
    #[serde(rename = "Medium Risk")]
    Medium,
    #[serde(rename = "High Risk")]
    High,
}

impl RiskLevel {
    /// Level for a count of distinct matched keywords.
    pub fn from_score(score: usize) -> Self {
        match score {
            0 => Self::Low,
            s if s > HIGH_RISK_ABOVE => Self::High,
            _ => Self::Medium,
        }
    }

    /// Wire label, e.g. `"Medium Risk"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "Low Risk",
            Self::Medium => "Medium Risk",
            Self::High => "High Risk",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of scoring one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RiskAssessment {
    pub level: RiskLevel,
    /// Distinct keywords found, in keyword-list order.
    pub matched: Vec<String>,
}

impl RiskAssessment {
    /// Number of distinct keywords matched.
    pub fn score(&self) -> usize {
        self.matched.len()
    }
}

/// Document-level risk classifier.
pub trait RiskScorer: Send + Sync {
    fn score(&self, text: &str) -> RiskAssessment;
}

/// Fixed keyword-list scorer.
#[derive(Debug, Clone)]
pub struct KeywordRiskScorer {
    keywords: Vec<String>,
}

impl KeywordRiskScorer {
    /// Scorer over a custom keyword list. Keywords are lowercased.
    pub fn with_keywords<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            keywords: keywords
                .into_iter()
                .map(|k| k.as_ref().to_lowercase())
                .collect(),
        }
    }
}

impl Default for KeywordRiskScorer {
    fn default() -> Self {
        Self::with_keywords(RISK_KEYWORDS)
    }
}

impl RiskScorer for KeywordRiskScorer {
    fn score(&self, text: &str) -> RiskAssessment {
        let lower = text.to_lowercase();
        let matched: Vec<String> = self
            .keywords
            .iter()
            .filter(|k| lower.contains(k.as_str()))
            .cloned()
            .collect();
        RiskAssessment {
            level: RiskLevel::from_score(matched.len()),
            matched,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level(text: &str) -> RiskLevel {
        KeywordRiskScorer::default().score(text).level
    }

    #[test]
    fn empty_document_is_low_risk() {
        assert_eq!(level(""), RiskLevel::Low);
    }

    #[test]
    fn no_keywords_is_low_risk() {
        let memo = "The parties agree to meet quarterly.";
        assert_eq!(level(memo), RiskLevel::Low);
    }

    #[test]
    fn single_breach_is_medium_risk() {
        assert_eq!(level("breach"), RiskLevel::Medium);
    }

    #[test]
    fn three_keywords_is_still_medium() {
        let text = "Seller shall indemnify Buyer. Any breach allows Buyer to terminate.";
        let assessment = KeywordRiskScorer::default().score(text);
        assert_eq!(assessment.score(), 3);
        assert_eq!(assessment.level, RiskLevel::Medium);
    }

    #[test]
    fn all_seven_keywords_is_high_risk() {
        let text = "terminate indemnify liability breach default waive penalty";
        let assessment = KeywordRiskScorer::default().score(text);
        assert_eq!(assessment.score(), 7);
        assert_eq!(assessment.level, RiskLevel::High);
    }

    #[test]
    fn four_keywords_is_high_risk() {
        assert_eq!(level("breach default waive penalty"), RiskLevel::High);
    }

    #[test]
    fn matching_is_case_insensitive() {
        assert_eq!(level("BREACH of Contract"), RiskLevel::Medium);
    }

    #[test]
    fn repeated_keyword_counts_once() {
        let assessment = KeywordRiskScorer::default().score("breach, breach, and breach again");
        assert_eq!(assessment.score(), 1);
    }

    #[test]
    fn substring_match_counts_inflections() {
        let assessment = KeywordRiskScorer::default().score("The agreement was terminated.");
        assert_eq!(assessment.matched, vec!["terminate".to_string()]);
    }

    #[test]
    fn custom_keywords_are_lowercased() {
        let scorer = KeywordRiskScorer::with_keywords(["Arbitration"]);
        assert_eq!(scorer.score("binding arbitration").level, RiskLevel::Medium);
    }

    #[test]
    fn from_score_thresholds() {
        assert_eq!(RiskLevel::from_score(0), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(1), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(3), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(4), RiskLevel::High);
    }

    #[test]
    fn serializes_as_display_string() {
        assert_eq!(
            serde_json::to_string(&RiskLevel::Medium).unwrap(),
            "\"Medium Risk\""
        );
        assert_eq!(RiskLevel::High.to_string(), "High Risk");
    }
}
