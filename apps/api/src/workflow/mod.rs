//! Pure derivations over consultant records: progress, skill merging, filtering, summary.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::consultant::{
    BenchStatus, Consultant, Department, MeetingStatus, ResumeStatus, Workflow,
};

/// Attended meetings over total meetings; 0.0 when there are no meetings.
pub fn attendance_ratio(consultant: &Consultant) -> f64 {
    let total = consultant.meetings.len();
    if total == 0 {
        return 0.0;
    }
    let attended = consultant
        .meetings
        .iter()
        .filter(|m| m.status == MeetingStatus::Attended)
        .count();
    attended as f64 / total as f64
}

pub fn workflow_completion_percent(workflow: &Workflow) -> f64 {
    workflow.completed_steps() as f64 / Workflow::STEPS as f64 * 100.0
}

/// Comparison key shared by skills, training names and login names:
/// trimmed, case-insensitive.
pub fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}

pub fn same_name(a: &str, b: &str) -> bool {
    normalize(a) == normalize(b)
}

/// Adds `incoming` to `skills`, skipping blanks and anything already present under
/// `normalize`. The first spelling seen is the one kept.
pub fn merge_skills<I, S>(skills: &mut Vec<String>, incoming: I) -> usize
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut added = 0;
    for skill in incoming {
        let skill = skill.as_ref().trim();
        if skill.is_empty() || skills.iter().any(|s| same_name(s, skill)) {
            continue;
        }
        skills.push(skill.to_string());
        added += 1;
    }
    added
}

/// Admin table filter. Empty / `None` predicates match everything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConsultantFilter {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub skill: String,
    #[serde(default)]
    pub department: Option<Department>,
    #[serde(default)]
    pub status: Option<BenchStatus>,
}

impl ConsultantFilter {
    pub fn is_empty(&self) -> bool {
        self.name.trim().is_empty()
            && self.skill.trim().is_empty()
            && self.department.is_none()
            && self.status.is_none()
    }

    pub fn matches(&self, consultant: &Consultant) -> bool {
        let name = normalize(&self.name);
        if !name.is_empty() && !consultant.name.to_lowercase().contains(&name) {
            return false;
        }
        if !self.skill.trim().is_empty()
            && !consultant.skills.iter().any(|s| same_name(s, &self.skill))
        {
            return false;
        }
        if let Some(department) = self.department {
            if consultant.department != department {
                return false;
            }
        }
        if let Some(status) = self.status {
            if consultant.status != status {
                return false;
            }
        }
        true
    }

    pub fn apply<'a>(&self, consultants: &'a [Consultant]) -> Vec<&'a Consultant> {
        if self.is_empty() {
            return consultants.iter().collect();
        }
        consultants.iter().filter(|c| self.matches(c)).collect()
    }
}

/// Head-count overview for the admin console.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BenchSummary {
    pub total: usize,
    pub on_bench: usize,
    pub in_project: usize,
    pub pending_resumes: usize,
    pub average_completion: f64,
    pub by_department: BTreeMap<String, usize>,
}

pub fn bench_summary(consultants: &[Consultant]) -> BenchSummary {
    let total = consultants.len();
    let mut by_department: BTreeMap<String, usize> = Department::ALL
        .iter()
        .map(|d| (d.as_str().to_string(), 0))
        .collect();
    for c in consultants {
        *by_department
            .entry(c.department.as_str().to_string())
            .or_default() += 1;
    }

    let average_completion = if total == 0 {
        0.0
    } else {
        consultants
            .iter()
            .map(|c| workflow_completion_percent(&c.workflow))
            .sum::<f64>()
            / total as f64
    };

    BenchSummary {
        total,
        on_bench: consultants
            .iter()
            .filter(|c| c.status == BenchStatus::OnBench)
            .count(),
        in_project: consultants
            .iter()
            .filter(|c| c.status == BenchStatus::InProject)
            .count(),
        pending_resumes: consultants
            .iter()
            .filter(|c| c.resume_status == ResumeStatus::Pending)
            .count(),
        average_completion,
        by_department,
    }
}
