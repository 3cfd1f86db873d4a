use serde::{Deserialize, Serialize};

/// Mobility impairment level, ordered from least to most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SeverityLevel {
    Normal,
    Slight,
    Mild,
    Moderate,
    Severe,
}

impl SeverityLevel {
    pub const ALL: [SeverityLevel; 5] = [
        SeverityLevel::Normal,
        SeverityLevel::Slight,
        SeverityLevel::Mild,
        SeverityLevel::Moderate,
        SeverityLevel::Severe,
    ];

    /// Ordinal score 0-4
    pub fn score(&self) -> u8 {
        match self {
            SeverityLevel::Normal => 0,
            SeverityLevel::Slight => 1,
            SeverityLevel::Mild => 2,
            SeverityLevel::Moderate => 3,
            SeverityLevel::Severe => 4,
        }
    }

    /// Moderate and Severe results are treated as high fall risk
    pub fn is_high_risk(&self) -> bool {
        matches!(self, SeverityLevel::Moderate | SeverityLevel::Severe)
    }
}

impl std::fmt::Display for SeverityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SeverityLevel::Normal => write!(f, "Normal"),
            SeverityLevel::Slight => write!(f, "Slight"),
            SeverityLevel::Mild => write!(f, "Mild"),
            SeverityLevel::Moderate => write!(f, "Moderate"),
            SeverityLevel::Severe => write!(f, "Severe"),
        }
    }
}

/// Classification outcome with the reasoning that produced it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeverityResult {
    #[serde(rename = "severity_level")]
    pub level: SeverityLevel,
    #[serde(rename = "severity_score")]
    pub score: u8,
    #[serde(rename = "severity_rationale")]
    pub rationale: String,
}

impl SeverityResult {
    pub fn new(level: SeverityLevel, rationale: String) -> Self {
        Self {
            level,
            score: level.score(),
            rationale,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scores_follow_order() {
        for (i, level) in SeverityLevel::ALL.iter().enumerate() {
            assert_eq!(level.score() as usize, i);
        }
        assert!(SeverityLevel::Severe > SeverityLevel::Moderate);
    }

    #[test]
    fn test_result_serialization_field_names() {
        let result = SeverityResult::new(SeverityLevel::Mild, "because".to_string());
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["severity_level"], "Mild");
        assert_eq!(json["severity_score"], 2);
        assert_eq!(json["severity_rationale"], "because");
    }
}
