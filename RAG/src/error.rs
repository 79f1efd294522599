use thiserror::Error;

/// Conditions callers branch on. Everything else travels as `anyhow::Error`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RagError {
    #[error("GEMINI_API_KEY environment variable not set")]
    MissingApiKey,
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("No PDF documents found in '{0}'")]
    NoDocuments(String),
    #[error("Assistant is not ready yet")]
    NotReady,
    #[error("Question is empty")]
    EmptyQuestion,
    #[error("Model returned an empty response")]
    EmptyResponse,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_condition() {
        assert!(RagError::MissingApiKey.to_string().contains("GEMINI_API_KEY"));
        assert_eq!(
            RagError::NoDocuments("docs".into()).to_string(),
            "No PDF documents found in 'docs'"
        );
    }

    #[test]
    fn survives_anyhow_round_trip() {
        let err: anyhow::Error = RagError::NotReady.into();
        assert_eq!(err.downcast_ref::<RagError>(), Some(&RagError::NotReady));
    }
}
