use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Number of weekly sync slots every consultant starts with.
pub const DEFAULT_MEETING_COUNT: u32 = 10;

pub type ConsultantId = i64;
pub type MeetingId = u32;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Department {
    Technology,
    Finance,
    Healthcare,
    #[default]
    Unassigned,
}

impl Department {
    pub const ALL: [Department; 4] = [
        Department::Technology,
        Department::Finance,
        Department::Healthcare,
        Department::Unassigned,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Department::Technology => "Technology",
            Department::Finance => "Finance",
            Department::Healthcare => "Healthcare",
            Department::Unassigned => "Unassigned",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.as_str() == s.trim())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BenchStatus {
    #[default]
    #[serde(rename = "On Bench")]
    OnBench,
    #[serde(rename = "In Project")]
    InProject,
}

impl BenchStatus {
    pub const ALL: [BenchStatus; 2] = [BenchStatus::OnBench, BenchStatus::InProject];

    pub fn as_str(&self) -> &'static str {
        match self {
            BenchStatus::OnBench => "On Bench",
            BenchStatus::InProject => "In Project",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|st| st.as_str() == s.trim())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResumeStatus {
    Updated,
    #[default]
    Pending,
}

impl ResumeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResumeStatus::Updated => "Updated",
            ResumeStatus::Pending => "Pending",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrainingStatus {
    #[default]
    #[serde(rename = "Not Started")]
    NotStarted,
    #[serde(rename = "In Progress")]
    InProgress,
    Completed,
}

impl TrainingStatus {
    pub const ALL: [TrainingStatus; 3] = [
        TrainingStatus::NotStarted,
        TrainingStatus::InProgress,
        TrainingStatus::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TrainingStatus::NotStarted => "Not Started",
            TrainingStatus::InProgress => "In Progress",
            TrainingStatus::Completed => "Completed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|st| st.as_str() == s.trim())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MeetingStatus {
    #[default]
    Pending,
    Attended,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meeting {
    pub id: MeetingId,
    pub title: String,
    pub status: MeetingStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Meeting {
    pub fn weekly(week: u32, status: MeetingStatus) -> Self {
        Self {
            id: week,
            title: weekly_title(week),
            status,
            notes: None,
        }
    }

    /// One-way Pending → Attended. Returns false when the meeting was already attended;
    /// the existing notes are kept in that case.
    pub fn mark_attended(&mut self, notes: Option<String>) -> bool {
        if self.status == MeetingStatus::Attended {
            return false;
        }
        self.status = MeetingStatus::Attended;
        self.notes = notes.filter(|n| !n.trim().is_empty());
        true
    }
}

pub fn weekly_title(week: u32) -> String {
    format!("Weekly Sync - Week {week}")
}

/// The cohort every newly registered consultant receives.
pub fn default_meetings() -> Vec<Meeting> {
    (1..=DEFAULT_MEETING_COUNT)
        .map(|week| Meeting::weekly(week, MeetingStatus::Pending))
        .collect()
}

/// Opportunity log. `count` mirrors `descriptions.len()` after every logging call;
/// records migrated from the bare-number shape may carry a larger legacy tally until
/// their first new entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Opportunities {
    pub count: u32,
    pub descriptions: Vec<String>,
}

impl Opportunities {
    pub fn log(&mut self, description: String) {
        self.descriptions.push(description);
        self.count = self.descriptions.len() as u32;
    }
}

/// Milestone flags. Only ever set, never cleared.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Workflow {
    pub resume_updated: bool,
    pub attendance_reported: bool,
    pub opportunities_logged: bool,
    pub training_completed: bool,
}

impl Workflow {
    pub const STEPS: u32 = 4;

    pub fn completed_steps(&self) -> u32 {
        [
            self.resume_updated,
            self.attendance_reported,
            self.opportunities_logged,
            self.training_completed,
        ]
        .iter()
        .filter(|f| **f)
        .count() as u32
    }
}

/// Snapshot of the last successful structured resume analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeAnalytics {
    pub summary: String,
    pub extracted_skills: Vec<String>,
    pub years_of_experience: f64,
    pub project_highlights: Vec<String>,
    pub resume_status: ResumeStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingRecord {
    pub name: String,
    pub date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Consultant {
    pub id: ConsultantId,
    pub name: String,
    pub password_hash: String,
    #[serde(default)]
    pub department: Department,
    #[serde(default)]
    pub status: BenchStatus,
    #[serde(default)]
    pub resume_status: ResumeStatus,
    pub meetings: Vec<Meeting>,
    pub opportunities: Opportunities,
    #[serde(default)]
    pub training_status: TrainingStatus,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub workflow: Workflow,
    #[serde(default)]
    pub resume_analytics: Option<ResumeAnalytics>,
    pub training_history: Vec<TrainingRecord>,
    /// Fields this version does not know about; written back untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Consultant {
    /// A freshly registered consultant with the default workflow position.
    pub fn new(id: ConsultantId, name: String, password_hash: String) -> Self {
        Self {
            id,
            name,
            password_hash,
            department: Department::default(),
            status: BenchStatus::default(),
            resume_status: ResumeStatus::default(),
            meetings: default_meetings(),
            opportunities: Opportunities::default(),
            training_status: TrainingStatus::default(),
            skills: Vec::new(),
            workflow: Workflow::default(),
            resume_analytics: None,
            training_history: Vec::new(),
            extra: Map::new(),
        }
    }

    pub fn meeting_mut(&mut self, meeting_id: MeetingId) -> Option<&mut Meeting> {
        self.meetings.iter_mut().find(|m| m.id == meeting_id)
    }
}
