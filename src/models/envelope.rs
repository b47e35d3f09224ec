use serde::{Deserialize, Serialize};

use crate::services::pagination::Pagination;

/// Shape shared by every response body: `{message, data, pagination?}`.
#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct ApiResponse<T> {
    pub message: String,
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub pagination: Option<Pagination>,
}

impl<T> ApiResponse<T> {
    pub fn new(message: impl Into<String>, data: T) -> Self {
        ApiResponse {
            message: message.into(),
            data: Some(data),
            pagination: None,
        }
    }

    pub fn paginated(message: impl Into<String>, data: T, pagination: Pagination) -> Self {
        ApiResponse {
            message: message.into(),
            data: Some(data),
            pagination: Some(pagination),
        }
    }
}

impl ApiResponse<()> {
    /// Envelope carrying `data: null`.
    pub fn empty(message: impl Into<String>) -> Self {
        ApiResponse {
            message: message.into(),
            data: None,
            pagination: None,
        }
    }
}
