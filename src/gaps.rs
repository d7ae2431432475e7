//! Skill-gap analysis against an occupation's requirements.
//!
//! Purpose
//! -------
//! Compare a user's assessed proficiencies with the θ levels an occupation
//! requires and rank the shortfalls by how much closing them matters.
//!
//! Key behaviors
//! -------------
//! - A skill the user was never assessed on counts as
//!   [`UNASSESSED_THETA`].
//! - `gap = required − current`; only strictly positive gaps are reported.
//! - `criticality = importance · (1 + 0.1·prerequisites + 0.1·dependents)`,
//!   so skills embedded deeper in the skill graph weigh more.
//! - `priority = gap · criticality`; results are sorted by descending
//!   priority, ties by skill name.
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::session::Proficiency;

/// θ assumed for skills without an assessment.
pub const UNASSESSED_THETA: f64 = -2.0;

/// Weight added to criticality per prerequisite or dependent skill.
pub const GRAPH_WEIGHT: f64 = 0.1;

fn default_importance() -> f64 {
    0.5
}

/// One skill an occupation requires.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillRequirement {
    pub skill_ref: String,
    #[serde(default = "default_importance")]
    pub importance: f64,
    #[serde(default)]
    pub required_theta: f64,
    /// Number of skills this one builds on.
    #[serde(default)]
    pub prerequisite_count: u32,
    /// Number of skills that build on this one.
    #[serde(default)]
    pub dependent_count: u32,
}

impl SkillRequirement {
    pub fn criticality(&self) -> f64 {
        self.importance
            * (1.0
                + GRAPH_WEIGHT * self.prerequisite_count as f64
                + GRAPH_WEIGHT * self.dependent_count as f64)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillGap {
    pub skill_ref: String,
    pub current_theta: f64,
    pub required_theta: f64,
    pub gap: f64,
    pub criticality: f64,
    pub priority: f64,
}

/// Rank the user's shortfalls against `requirements`.
///
/// `proficiencies` are the user's assessed skills; later entries for the
/// same skill override earlier ones.
pub fn calculate_skill_gaps(
    requirements: &[SkillRequirement], proficiencies: &[Proficiency],
) -> Vec<SkillGap> {
    let assessed: HashMap<&str, f64> =
        proficiencies.iter().map(|p| (p.skill_ref.as_str(), p.theta)).collect();

    let mut gaps: Vec<SkillGap> = requirements
        .iter()
        .filter_map(|req| {
            let current_theta =
                assessed.get(req.skill_ref.as_str()).copied().unwrap_or(UNASSESSED_THETA);
            let gap = req.required_theta - current_theta;
            if gap <= 0.0 {
                return None;
            }
            let criticality = req.criticality();
            Some(SkillGap {
                skill_ref: req.skill_ref.clone(),
                current_theta,
                required_theta: req.required_theta,
                gap,
                criticality,
                priority: gap * criticality,
            })
        })
        .collect();

    gaps.sort_by(|l, r| r.priority.total_cmp(&l.priority).then_with(|| l.skill_ref.cmp(&r.skill_ref)));
    gaps
}
