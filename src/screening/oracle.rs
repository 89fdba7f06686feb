use std::collections::BTreeSet;

use async_trait::async_trait;

use super::domain::{JobRequirements, ResumeDocument};

/// Match assessment produced by the scoring oracle for one resume.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillAssessment {
    pub match_percentage: u8,
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub strengths: Vec<String>,
    pub improvement_areas: Vec<String>,
    pub recommendations: Vec<String>,
}

/// Failure of a single scoring call. Absorbed by the engine as a recorded
/// skip; never aborts the batch.
#[derive(Debug, thiserror::Error)]
pub enum OracleError {
    #[error("scoring backend unavailable: {0}")]
    Unavailable(String),
    #[error("oracle returned a match percentage outside 0..=100: {value}")]
    OutOfRange { value: i64 },
    #[error("oracle response malformed: {reason}")]
    Malformed { reason: String },
}

/// External scoring collaborator: resume content + posting requirements in,
/// match assessment out. The model behind it is out of scope; implementors
/// only honor this contract.
#[async_trait]
pub trait ScoringOracle: Send + Sync {
    async fn score(
        &self,
        resume: &ResumeDocument,
        requirements: &JobRequirements,
    ) -> Result<SkillAssessment, OracleError>;
}

/// Deterministic skill-overlap scorer used when no external model is wired.
///
/// Required skills weigh twice as much as preferred ones; the percentage is
/// the covered weight over the total weight, rounded to the nearest integer.
#[derive(Debug, Clone, Default)]
pub struct KeywordOverlapOracle;

impl KeywordOverlapOracle {
    pub fn new() -> Self {
        Self
    }

    fn tokens(text: &str) -> BTreeSet<String> {
        text.split(|c: char| !c.is_alphanumeric() && c != '+' && c != '#')
            .filter(|token| !token.is_empty())
            .map(|token| token.to_ascii_lowercase())
            .collect()
    }

    fn mentions(tokens: &BTreeSet<String>, text_lower: &str, skill: &str) -> bool {
        let skill_lower = skill.trim().to_ascii_lowercase();
        if skill_lower.is_empty() {
            return false;
        }
        // Multi-word skills fall back to a substring check on the whole text.
        if skill_lower.contains(char::is_whitespace) {
            text_lower.contains(&skill_lower)
        } else {
            tokens.contains(&skill_lower)
        }
    }
}

#[async_trait]
impl ScoringOracle for KeywordOverlapOracle {
    async fn score(
        &self,
        resume: &ResumeDocument,
        requirements: &JobRequirements,
    ) -> Result<SkillAssessment, OracleError> {
        if resume.text.trim().is_empty() {
            return Err(OracleError::Malformed {
                reason: "resume text is empty".to_string(),
            });
        }

        let text_lower = resume.text.to_ascii_lowercase();
        let tokens = Self::tokens(&resume.text);

        let mut matched_skills = Vec::new();
        let mut missing_skills = Vec::new();
        let mut covered_weight = 0u32;
        let mut total_weight = 0u32;

        for skill in &requirements.required_skills {
            total_weight += 2;
            if Self::mentions(&tokens, &text_lower, skill) {
                covered_weight += 2;
                matched_skills.push(skill.clone());
            } else {
                missing_skills.push(skill.clone());
            }
        }
        for skill in &requirements.preferred_skills {
            total_weight += 1;
            if Self::mentions(&tokens, &text_lower, skill) {
                covered_weight += 1;
                matched_skills.push(skill.clone());
            } else {
                missing_skills.push(skill.clone());
            }
        }

        let match_percentage = if total_weight == 0 {
            0
        } else {
            ((covered_weight * 100 + total_weight / 2) / total_weight) as u8
        };

        let strengths = if matched_skills.is_empty() {
            Vec::new()
        } else {
            vec![format!(
                "covers {} of {} posted skills ({})",
                matched_skills.len(),
                requirements.required_skills.len() + requirements.preferred_skills.len(),
                matched_skills.join(", ")
            )]
        };

        let improvement_areas = missing_skills
            .iter()
            .map(|skill| format!("no evidence of {skill}"))
            .collect();

        let recommendations = if missing_skills.is_empty() {
            vec![format!("strong fit for {}", requirements.title)]
        } else {
            vec![format!(
                "probe {} during interview",
                missing_skills.join(", ")
            )]
        };

        Ok(SkillAssessment {
            match_percentage,
            matched_skills,
            missing_skills,
            strengths,
            improvement_areas,
            recommendations,
        })
    }
}
