use thiserror::Error;

use crate::domain::document::DocumentError;

#[derive(Debug, Error)]
pub enum WorldBuilderError {
    /// A prerequisite generation stage has not been completed yet
    #[error("{0}")]
    MissingWorldData(String),

    /// The provider failed or produced no text for one category
    #[error("LLM error ({category}): {message}")]
    LlmGeneration { category: String, message: String },

    #[error("An unexpected error occurred during {category} generation: {source}")]
    Unexpected {
        category: String,
        #[source]
        source: anyhow::Error,
    },

    /// An imported snapshot could not be used
    #[error("{0}")]
    WorldFile(String),
}

impl WorldBuilderError {
    pub(crate) fn llm(category: &str, message: impl Into<String>) -> Self {
        Self::LlmGeneration {
            category: category.to_string(),
            message: message.into(),
        }
    }
}

impl From<DocumentError> for WorldBuilderError {
    fn from(err: DocumentError) -> Self {
        match err {
            DocumentError::Malformed(message) => Self::WorldFile(message),
            DocumentError::Serialization(source) => Self::Unexpected {
                category: "world document".to_string(),
                source: source.into(),
            },
        }
    }
}
