use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PaymentError {
    #[error("{0}")]
    Validation(String),

    #[error("Payment provider returned {status}: {message}")]
    Provider { status: u16, message: String },

    #[error("Payment provider unreachable: {0}")]
    Transport(String),

    #[error("Unexpected payment provider response: {0}")]
    Serialization(String),
}

impl PaymentError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

pub type PaymentResult<T> = Result<T, PaymentError>;
