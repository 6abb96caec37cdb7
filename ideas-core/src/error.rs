use thiserror::Error;

use crate::models::{FeatureId, IdeaId};

/// Errors raised by idea store operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdeasError {
    #[error("Idea not found: {0}")]
    IdeaNotFound(IdeaId),

    #[error("Feature {feature} not found in idea {idea}")]
    FeatureNotFound { idea: IdeaId, feature: FeatureId },

    #[error("Idea position {position} is out of range (store has {len} ideas)")]
    IdeaIndexOutOfRange { position: usize, len: usize },

    #[error("Feature position {position} is out of range (idea has {len} features)")]
    FeatureIndexOutOfRange { position: usize, len: usize },
}
