pub type SplashResult<T> = Result<T, SplashError>;

#[derive(thiserror::Error, Debug)]
pub enum SplashError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid packet: {0}")]
    InvalidPacket(String),

    #[error("sample stream exhausted: {0}")]
    StreamExhausted(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SplashError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn invalid_packet(msg: impl Into<String>) -> Self {
        Self::InvalidPacket(msg.into())
    }

    pub fn exhausted(msg: impl Into<String>) -> Self {
        Self::StreamExhausted(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert!(
            SplashError::config("x")
                .to_string()
                .contains("configuration error:")
        );
        assert!(
            SplashError::invalid_packet("x")
                .to_string()
                .contains("invalid packet:")
        );
        assert!(
            SplashError::exhausted("x")
                .to_string()
                .contains("sample stream exhausted:")
        );
    }

    #[test]
    fn other_preserves_source() {
        let base = std::io::Error::other("boom");
        let err = SplashError::Other(anyhow::Error::new(base));
        assert!(err.to_string().contains("boom"));
    }
}
