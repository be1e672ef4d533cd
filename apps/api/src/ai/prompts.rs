// Prompt templates for the dashboard's AI operations.
// Placeholders in braces are replaced before sending.

pub const RESUME_ANALYSIS_SYSTEM: &str = "\
You are a resume analyst for a consultancy bench team. \
Summarize the candidate honestly and extract only skills that appear in the text. \
Mark resume_status \"Updated\" when the resume describes recent work in enough detail \
to staff the consultant, otherwise \"Pending\".";

pub const RESUME_ANALYSIS_PROMPT: &str = r#"Analyze the following resume.

RESUME TEXT:
{resume_text}

Return:
- summary: 2-3 sentence professional summary
- extracted_skills: list of concrete technical and domain skills
- years_of_experience: total professional years as a number
- project_highlights: up to 5 notable projects or achievements
- resume_status: "Updated" or "Pending""#;

pub const TRAINING_SUGGESTION_PROMPT: &str = r#"A bench consultant needs a short training plan to become deployable again.

CONSULTANT: {name}
DEPARTMENT: {department}
CURRENT SKILLS: {skills}
RESUME SUMMARY: {summary}
TRAININGS ALREADY COMPLETED: {completed}

Suggest 3 to 5 trainings or certifications, most valuable first. For each give the name
and one sentence on why it helps this consultant get staffed. Do not repeat completed trainings."#;

pub const ATTENDANCE_ANALYSIS_PROMPT: &str = r#"Review the weekly sync attendance of a bench consultant.

CONSULTANT: {name}
ATTENDANCE: {attended} of {total} meetings attended
MEETING LOG:
{meetings}

Comment on engagement, point out any gaps or patterns in the notes, and give one
concrete recommendation for the consultant's manager."#;

pub const OPPORTUNITY_ANALYSIS_PROMPT: &str = r#"Analyze the client opportunities logged by bench consultants.

SCOPE: {scope}
OPPORTUNITIES ({count}):
{opportunities}

Group the opportunities into themes, name the skills most often in demand, and
recommend where the department should focus its upskilling."#;
