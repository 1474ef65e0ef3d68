use autojenkins::{Error, JobStatus, JobSummary};
use colored::{ColoredString, Colorize};

/// How `list` prints each job.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListStyle {
    /// Names only.
    Raw,
    /// Status label padded to ten columns, then the name.
    Plain,
    /// The name painted by status.
    Color,
}

impl ListStyle {
    pub fn new(raw: bool, no_color: bool) -> Self {
        if raw {
            Self::Raw
        } else if no_color {
            Self::Plain
        } else {
            Self::Color
        }
    }
}

fn label(job: &JobSummary) -> &str {
    job.color
        .status()
        .map_or_else(|| job.color.base(), |status| status.label())
}

fn paint(job: &JobSummary) -> ColoredString {
    let name = job.name.as_str();
    match job.color.status() {
        Some(JobStatus::Success) => name.green().bold(),
        Some(JobStatus::Failed) => name.red().bold(),
        Some(JobStatus::Unstable) => name.yellow().bold(),
        Some(JobStatus::Aborted | JobStatus::NotBuilt) => name.white().bold(),
        Some(JobStatus::Disabled) => name.dimmed(),
        None => name.normal(),
    }
}

pub fn job_line(job: &JobSummary, style: ListStyle) -> String {
    let prefix = if job.color.is_building() { "* " } else { "  " };
    match style {
        ListStyle::Raw => job.name.to_string(),
        ListStyle::Plain => format!("{prefix}{:<10} {}", label(job), job.name),
        ListStyle::Color => format!("{prefix}{}", paint(job)),
    }
}

pub fn report(err: &Error) {
    eprintln!("{} {err}", "Error:".red().bold());
}
