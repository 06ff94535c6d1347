use serde::Deserialize;

pub const SUCCESS_STATUS: &str = "success";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StartAck {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
}

impl StartAck {
    pub fn is_success(&self) -> bool {
        self.status == SUCCESS_STATUS
    }

    pub fn message(&self) -> &str {
        self.message.as_deref().unwrap_or("")
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct JobStatus {
    pub status: String,
    #[serde(default)]
    pub progress: Option<f64>,
}
