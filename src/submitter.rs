use crate::display::ProgressDisplay;
use crate::errors::ClipJobError;
use crate::job_status::StartAck;
use crate::poller::{PollOutcome, Poller, StatusSource};
use crate::render::render_error;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DownloadForm {
    fields: Vec<(String, String)>,
}

impl DownloadForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(name, value);
        self
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.push((name.into(), value.into()));
    }

    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }
}

impl FromIterator<(String, String)> for DownloadForm {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

// The value may itself contain `=`.
pub fn parse_form_field(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name.to_string(), value.to_string())),
        _ => Err(format!("expected NAME=VALUE, got {s:?}")),
    }
}

#[async_trait::async_trait]
pub trait JobStarter: Send + Sync {
    async fn start_job(&self, form: &DownloadForm) -> Result<StartAck, ClipJobError>;
}

#[derive(Debug)]
pub enum SubmitOutcome {
    Accepted { message: String },
    Rejected { message: String },
    Failed(ClipJobError),
}

#[derive(Debug)]
pub enum DownloadOutcome {
    Rejected { message: String },
    SubmitFailed(ClipJobError),
    Polled(PollOutcome),
}

pub async fn submit<J, D>(starter: &J, form: &DownloadForm, display: &mut D) -> SubmitOutcome
where
    J: JobStarter + ?Sized,
    D: ProgressDisplay + ?Sized,
{
    match starter.start_job(form).await {
        Ok(ack) if ack.is_success() => {
            tracing::info!(reply = ack.message(), "download job accepted");
            display.show(ack.message());
            SubmitOutcome::Accepted {
                message: ack.message().to_string(),
            }
        }
        Ok(ack) => {
            tracing::warn!(status = %ack.status, reply = ack.message(), "download job rejected");
            display.show(&render_error(ack.message()));
            SubmitOutcome::Rejected {
                message: ack.message().to_string(),
            }
        }
        Err(err) => {
            tracing::warn!(error = %err, "download request failed");
            display.show(&render_error(&err));
            SubmitOutcome::Failed(err)
        }
    }
}

/// Submits the form and, only if the server accepts it, polls to the end.
pub async fn submit_and_poll<C, D>(
    client: &C,
    form: &DownloadForm,
    poller: &Poller,
    display: &mut D,
) -> DownloadOutcome
where
    C: JobStarter + StatusSource + ?Sized,
    D: ProgressDisplay + ?Sized,
{
    match submit(client, form, display).await {
        SubmitOutcome::Accepted { .. } => {
            DownloadOutcome::Polled(poller.run(client, display).await)
        }
        SubmitOutcome::Rejected { message } => DownloadOutcome::Rejected { message },
        SubmitOutcome::Failed(err) => DownloadOutcome::SubmitFailed(err),
    }
}
