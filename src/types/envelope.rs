//! Response envelope
//!
//! Every endpoint wraps its payload as `{"code": .., "msg": .., "data": ..}`.

use serde::Deserialize;

use crate::error::{Result, classify_code};

/// Envelope shared by all responses
#[derive(Debug, Deserialize)]
pub struct ApiEnvelope<T> {
    pub code: Option<i64>,
    pub msg: Option<String>,
    pub data: Option<T>,
}

impl<T> ApiEnvelope<T> {
    /// Effective status code: the body's, else the HTTP status
    pub fn effective_code(&self, http_status: u16) -> i64 {
        self.code.unwrap_or(i64::from(http_status))
    }

    /// Turn a non-success code into a typed error and yield the payload
    pub fn into_data(self, http_status: u16) -> Result<Option<T>> {
        let code = self.effective_code(http_status);
        if code == 200 {
            return Ok(self.data);
        }
        let message = self
            .msg
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| "Unknown error".to_string());
        Err(classify_code(code, message))
    }
}

/// `data` of every submission endpoint
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SubmitData {
    pub task_id: Option<String>,
}
