//! View renderer: a pure function from the dashboard snapshot to a full HTML page.
//!
//! Every control is a form whose action is emitted here, so a fresh render carries all
//! of its own bindings. Controls for an in-flight AI call render disabled.

use serde::Serialize;
use tera::{Context, Tera};

use crate::dashboard::{Dashboard, Notification, PendingOp, Tab, UiState};
use crate::models::consultant::{
    BenchStatus, Consultant, Department, MeetingStatus, ResumeAnalytics, TrainingRecord,
    TrainingStatus,
};
use crate::models::session::SessionIdentity;
use crate::workflow::{
    attendance_ratio, bench_summary, workflow_completion_percent, BenchSummary,
};

const PAGE_TEMPLATE: &str = include_str!("page.html");

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
enum Mode {
    Login,
    Consultant,
    Admin,
}

#[derive(Debug, Serialize)]
struct PageView<'a> {
    mode: Mode,
    login_error: Option<&'a str>,
    notifications: &'a [Notification],
    consultant: Option<ConsultantView<'a>>,
    admin: Option<AdminView<'a>>,
}

#[derive(Debug, Serialize)]
struct Step {
    label: &'static str,
    done: bool,
}

#[derive(Debug, Serialize)]
struct TabView {
    key: &'static str,
    label: &'static str,
    active: bool,
}

#[derive(Debug, Serialize)]
struct MeetingView<'a> {
    id: u32,
    title: &'a str,
    attended: bool,
    notes: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct ConsultantView<'a> {
    name: &'a str,
    department: &'static str,
    status: &'static str,
    resume_status: &'static str,
    training_status: &'static str,
    training_statuses: Vec<&'static str>,
    skills: &'a [String],
    steps: Vec<Step>,
    completion: String,
    attendance: String,
    tabs: Vec<TabView>,
    active_tab: &'static str,
    meetings: Vec<MeetingView<'a>>,
    opportunities: &'a [String],
    opportunity_count: u32,
    training_history: &'a [TrainingRecord],
    resume_analytics: Option<&'a ResumeAnalytics>,
    training_suggestion: Option<&'a str>,
    resume_loading: bool,
    training_loading: bool,
}

#[derive(Debug, Serialize)]
struct RowView<'a> {
    id: i64,
    name: &'a str,
    department: &'static str,
    status: &'static str,
    resume_status: &'static str,
    skills: &'a [String],
    skills_csv: String,
    attendance: String,
    completion: String,
    opportunity_count: u32,
    attendance_analysis: Option<&'a str>,
    analyzing: bool,
}

#[derive(Debug, Serialize)]
struct FilterView<'a> {
    name: &'a str,
    skill: &'a str,
    department: &'static str,
    status: &'static str,
}

#[derive(Debug, Serialize)]
struct AnalysisView<'a> {
    scope: &'static str,
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct AdminView<'a> {
    summary: BenchSummary,
    average_completion: String,
    filter: FilterView<'a>,
    departments: Vec<&'static str>,
    statuses: Vec<&'static str>,
    rows: Vec<RowView<'a>>,
    opportunity_analysis: Option<AnalysisView<'a>>,
    opportunity_loading: bool,
}

pub struct Renderer {
    tera: Tera,
}

impl Renderer {
    pub fn new() -> Result<Self, tera::Error> {
        let mut tera = Tera::default();
        tera.add_raw_template("page.html", PAGE_TEMPLATE)?;
        Ok(Self { tera })
    }

    pub fn render(&self, dashboard: &Dashboard) -> Result<String, tera::Error> {
        let view = build_view(dashboard.ui(), dashboard.session(), dashboard.consultants());
        let context = Context::from_serialize(&view)?;
        self.tera.render("page.html", &context)
    }
}

fn build_view<'a>(
    ui: &'a UiState,
    session: Option<SessionIdentity>,
    consultants: &'a [Consultant],
) -> PageView<'a> {
    let mut view = PageView {
        mode: Mode::Login,
        login_error: ui.login_error.as_deref(),
        notifications: &ui.notifications,
        consultant: None,
        admin: None,
    };

    match session {
        Some(SessionIdentity::Admin { .. }) => {
            view.mode = Mode::Admin;
            view.admin = Some(admin_view(ui, consultants));
        }
        Some(SessionIdentity::Consultant { id }) => {
            if let Some(c) = consultants.iter().find(|c| c.id == id) {
                view.mode = Mode::Consultant;
                view.consultant = Some(consultant_view(ui, c));
            }
        }
        None => {}
    }
    view
}

fn percent_label(value: f64) -> String {
    format!("{value:.0}%")
}

fn consultant_view<'a>(ui: &'a UiState, c: &'a Consultant) -> ConsultantView<'a> {
    let w = &c.workflow;
    ConsultantView {
        name: &c.name,
        department: c.department.as_str(),
        status: c.status.as_str(),
        resume_status: c.resume_status.as_str(),
        training_status: c.training_status.as_str(),
        training_statuses: TrainingStatus::ALL.iter().map(|s| s.as_str()).collect(),
        skills: &c.skills,
        steps: vec![
            Step { label: "Resume updated", done: w.resume_updated },
            Step { label: "Attendance reported", done: w.attendance_reported },
            Step { label: "Opportunities logged", done: w.opportunities_logged },
            Step { label: "Training completed", done: w.training_completed },
        ],
        completion: percent_label(workflow_completion_percent(w)),
        attendance: percent_label(attendance_ratio(c) * 100.0),
        tabs: Tab::ALL
            .iter()
            .map(|t| TabView {
                key: t.as_str(),
                label: tab_label(*t),
                active: *t == ui.active_tab,
            })
            .collect(),
        active_tab: ui.active_tab.as_str(),
        meetings: c
            .meetings
            .iter()
            .map(|m| MeetingView {
                id: m.id,
                title: &m.title,
                attended: m.status == MeetingStatus::Attended,
                notes: m.notes.as_deref(),
            })
            .collect(),
        opportunities: &c.opportunities.descriptions,
        opportunity_count: c.opportunities.count,
        training_history: &c.training_history,
        resume_analytics: c.resume_analytics.as_ref(),
        training_suggestion: ui.training_suggestions.get(&c.id).map(String::as_str),
        resume_loading: ui.is_loading(PendingOp::ResumeAnalysis(c.id)),
        training_loading: ui.is_loading(PendingOp::TrainingSuggestion(c.id)),
    }
}

fn admin_view<'a>(ui: &'a UiState, consultants: &'a [Consultant]) -> AdminView<'a> {
    let rows = ui
        .filter
        .apply(consultants)
        .into_iter()
        .map(|c| RowView {
            id: c.id,
            name: &c.name,
            department: c.department.as_str(),
            status: c.status.as_str(),
            resume_status: c.resume_status.as_str(),
            skills: &c.skills,
            skills_csv: c.skills.join(", "),
            attendance: percent_label(attendance_ratio(c) * 100.0),
            completion: percent_label(workflow_completion_percent(&c.workflow)),
            opportunity_count: c.opportunities.count,
            attendance_analysis: ui.attendance_analyses.get(&c.id).map(String::as_str),
            analyzing: ui.is_loading(PendingOp::AttendanceAnalysis(c.id)),
        })
        .collect();

    let summary = bench_summary(consultants);
    AdminView {
        average_completion: percent_label(summary.average_completion),
        summary,
        filter: FilterView {
            name: &ui.filter.name,
            skill: &ui.filter.skill,
            department: ui.filter.department.map_or("", |d| d.as_str()),
            status: ui.filter.status.map_or("", |s| s.as_str()),
        },
        departments: Department::ALL.iter().map(|d| d.as_str()).collect(),
        statuses: BenchStatus::ALL.iter().map(|s| s.as_str()).collect(),
        rows,
        opportunity_analysis: ui.opportunity_analysis.as_ref().map(|a| AnalysisView {
            scope: a.scope.map_or("All departments", |d| d.as_str()),
            text: &a.text,
        }),
        opportunity_loading: ui.is_loading(PendingOp::OpportunityAnalysis),
    }
}

fn tab_label(tab: Tab) -> &'static str {
    match tab {
        Tab::Resume => "Resume",
        Tab::Attendance => "Attendance",
        Tab::Training => "Training",
        Tab::Opportunities => "Opportunities",
    }
}
