pub type TrailResult<T> = Result<T, TrailError>;

#[derive(thiserror::Error, Debug)]
pub enum TrailError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("stage error: {0}")]
    Stage(String),

    #[error("animation error: {0}")]
    Animation(String),

    #[error("serialization error: {0}")]
    Serde(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TrailError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn stage(msg: impl Into<String>) -> Self {
        Self::Stage(msg.into())
    }

    pub fn animation(msg: impl Into<String>) -> Self {
        Self::Animation(msg.into())
    }

    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert!(
            TrailError::validation("x")
                .to_string()
                .contains("validation error:")
        );
        assert!(TrailError::stage("x").to_string().contains("stage error:"));
        assert!(
            TrailError::animation("x")
                .to_string()
                .contains("animation error:")
        );
        assert!(
            TrailError::serde("x")
                .to_string()
                .contains("serialization error:")
        );
    }

    #[test]
    fn other_preserves_source() {
        let base = std::io::Error::other("boom");
        let err = TrailError::Other(anyhow::Error::new(base));
        assert!(err.to_string().contains("boom"));
    }
}
