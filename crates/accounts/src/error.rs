use thiserror::Error;

/// Shown when the failure is on our side rather than the caller's.
pub const SERVER_ERROR_MESSAGE: &str = "Server error occurred";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("{0}")]
    Validation(String),

    /// The identity provider rejected the request.
    #[error("Identity provider returned {status}: {message}")]
    Provider { status: u16, message: String },

    #[error("Identity provider unreachable: {0}")]
    Transport(String),

    #[error("Unexpected identity provider response: {0}")]
    Serialization(String),
}

impl AuthError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Text safe to put in a redirect for the user to read.
    pub fn user_message(&self) -> &str {
        match self {
            Self::Validation(message) => message,
            Self::Provider { message, .. } => message,
            Self::Transport(_) | Self::Serialization(_) => SERVER_ERROR_MESSAGE,
        }
    }
}

pub type AuthResult<T> = Result<T, AuthError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_hides_transport_detail() {
        let err = AuthError::Transport("connection refused (os error 111)".to_string());
        assert_eq!(err.user_message(), SERVER_ERROR_MESSAGE);

        let err = AuthError::Provider {
            status: 400,
            message: "Invalid login credentials".to_string(),
        };
        assert_eq!(err.user_message(), "Invalid login credentials");
    }
}
