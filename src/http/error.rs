use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResponseError {
    #[error("Invalid status code {code}: {reason}")]
    InvalidStatusCode { code: u16, reason: &'static str },

    #[error("Failed to write response")]
    Output(#[from] std::io::Error),

    #[error("Failed to encode JSON body")]
    Json(#[from] serde_json::Error),
}

impl ResponseError {
    pub(crate) fn invalid_status(code: u16) -> Self {
        ResponseError::InvalidStatusCode {
            code,
            reason: "not a known status code",
        }
    }

    pub(crate) fn invalid_redirect(code: u16) -> Self {
        ResponseError::InvalidStatusCode {
            code,
            reason: "not a known redirect status code",
        }
    }
}

pub type Result<T> = std::result::Result<T, ResponseError>;
