use std::fmt;

use crate::job_status::JobStatus;

pub const COMPILING_STATUS: &str = "Compiling clips...";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderFormat {
    /// Phases shown without a percentage.
    pub status_only: Vec<String>,
}

impl Default for RenderFormat {
    fn default() -> Self {
        Self {
            status_only: vec![COMPILING_STATUS.to_string()],
        }
    }
}

impl RenderFormat {
    pub fn render(&self, job: &JobStatus) -> String {
        if self.status_only.iter().any(|s| *s == job.status) {
            return job.status.clone();
        }
        match job.progress {
            Some(progress) => format!("{}\n{}%", job.status, progress),
            None => job.status.clone(),
        }
    }
}

pub fn render_error(message: impl fmt::Display) -> String {
    format!("Error: {message}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn job(status: &str, progress: Option<f64>) -> JobStatus {
        JobStatus {
            status: status.to_string(),
            progress,
        }
    }

    #[test]
    fn compiling_phase_omits_progress() {
        let text = RenderFormat::default().render(&job("Compiling clips...", Some(50.0)));
        assert_eq!(text, "Compiling clips...");
    }

    #[test]
    fn regular_phase_shows_percentage_on_second_line() {
        let format = RenderFormat::default();
        assert_eq!(format.render(&job("Downloading", Some(42.0))), "Downloading\n42%");
        assert_eq!(format.render(&job("Complete", Some(100.0))), "Complete\n100%");
        assert_eq!(format.render(&job("Downloading", Some(12.5))), "Downloading\n12.5%");
    }

    #[test]
    fn missing_progress_shows_status_alone() {
        assert_eq!(RenderFormat::default().render(&job("Queued", None)), "Queued");
    }

    #[test]
    fn custom_status_only_phases() {
        let format = RenderFormat {
            status_only: vec!["Uploading".to_string()],
        };
        assert_eq!(format.render(&job("Uploading", Some(7.0))), "Uploading");
        assert_eq!(
            format.render(&job("Compiling clips...", Some(7.0))),
            "Compiling clips...\n7%"
        );
    }

    #[test]
    fn errors_are_prefixed() {
        assert_eq!(render_error("bad url"), "Error: bad url");
    }
}
