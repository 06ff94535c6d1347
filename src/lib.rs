use serde::de::DeserializeOwned;

pub const DEFAULT_SERVER_ADDR: &str = "http://127.0.0.1:5000";
pub const START_DOWNLOAD_PATH: &str = "/start_download";
pub const PROGRESS_PATH: &str = "/progress";

pub mod display;
pub mod errors;
pub mod job_status;
pub mod poller;
pub mod render;
pub mod submitter;

pub use display::{ProgressDisplay, TerminalDisplay};
pub use errors::ClipJobError;
pub use job_status::{JobStatus, StartAck};
pub use poller::{PollConfig, PollErrorPolicy, PollOutcome, PollTask, Poller, StatusSource};
pub use render::RenderFormat;
pub use submitter::{DownloadForm, DownloadOutcome, JobStarter, SubmitOutcome};

#[derive(Debug, Clone)]
pub struct ClipJobClient {
    start_url: url::Url,
    progress_url: url::Url,
    http_client: reqwest::Client,
}

impl ClipJobClient {
    pub fn new() -> Result<ClipJobClient, ClipJobError> {
        ClipJobClient::new_for_server(DEFAULT_SERVER_ADDR)
    }

    pub fn new_for_server(server_addr: &str) -> Result<ClipJobClient, ClipJobError> {
        let server_addr = url::Url::parse(server_addr)?;
        let start_url = server_addr.join(START_DOWNLOAD_PATH)?;
        let progress_url = server_addr.join(PROGRESS_PATH)?;
        Ok(ClipJobClient {
            start_url,
            progress_url,
            http_client: reqwest::Client::new(),
        })
    }

    pub async fn send_start_request(&self, form: &DownloadForm) -> Result<StartAck, ClipJobError> {
        tracing::debug!(url = %self.start_url, fields = form.fields().len(), "starting download job");
        let resp = self
            .http_client
            .post(self.start_url.clone())
            .form(form.fields())
            .send()
            .await?;
        read_json(&self.start_url, resp).await
    }

    pub async fn fetch_progress(&self) -> Result<JobStatus, ClipJobError> {
        tracing::debug!(url = %self.progress_url, "fetching progress");
        let resp = self
            .http_client
            .get(self.progress_url.clone())
            .send()
            .await?;
        read_json(&self.progress_url, resp).await
    }

    pub async fn download<D: ProgressDisplay + ?Sized>(
        &self,
        form: &DownloadForm,
        poller: &Poller,
        display: &mut D,
    ) -> DownloadOutcome {
        submitter::submit_and_poll(self, form, poller, display).await
    }
}

#[async_trait::async_trait]
impl JobStarter for ClipJobClient {
    async fn start_job(&self, form: &DownloadForm) -> Result<StartAck, ClipJobError> {
        self.send_start_request(form).await
    }
}

#[async_trait::async_trait]
impl StatusSource for ClipJobClient {
    async fn fetch_status(&self) -> Result<JobStatus, ClipJobError> {
        self.fetch_progress().await
    }
}

// The body is read whatever the HTTP status: the server reports job
// failures as JSON on error statuses too.
async fn read_json<T: DeserializeOwned>(
    endpoint_url: &url::Url,
    resp: reqwest::Response,
) -> Result<T, ClipJobError> {
    let resp_status = resp.status();
    let resp_body_bytes = resp.bytes().await?;
    match serde_json::from_slice(&resp_body_bytes) {
        Ok(data) => Ok(data),
        Err(_) if !resp_status.is_success() => Err(ClipJobError::Api {
            endpoint_url: endpoint_url.to_string(),
            status: resp_status.as_u16(),
            body: String::from_utf8_lossy(&resp_body_bytes).into_owned(),
        }),
        Err(source) => Err(ClipJobError::Decode {
            endpoint_url: endpoint_url.to_string(),
            source,
        }),
    }
}
