use serde::Serialize;

/// The `{status, message, data}` envelope shared by every success response.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub status: bool,
    pub message: String,
    #[serde(rename = "productCount", skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn with_data(message: impl Into<String>, data: T) -> Self {
        Self {
            status: true,
            message: message.into(),
            count: None,
            data: Some(data),
        }
    }

    pub fn with_count(message: impl Into<String>, count: usize, data: T) -> Self {
        Self {
            status: true,
            message: message.into(),
            count: Some(count),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            status: true,
            message: message.into(),
            count: None,
            data: None,
        }
    }
}
