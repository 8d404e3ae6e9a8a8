//! Load executor errors, one variant per phase.

use thiserror::Error;

/// Failure causes distinguished by the load executor.
#[derive(Debug, Error)]
pub enum LoaderError {
    /// The trigger notification could not be parsed.
    #[error("Trigger parse error: {0}")]
    Parse(String),

    /// The COPY command object could not be fetched or decoded.
    #[error("Command fetch error: {0}")]
    Fetch(String),

    /// The warehouse rejected the statement submission.
    #[error("Statement submit error: {0}")]
    Submit(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variants_name_their_phase() {
        assert!(LoaderError::Parse("bad json".to_string())
            .to_string()
            .starts_with("Trigger parse error"));
        assert!(LoaderError::Fetch("missing".to_string())
            .to_string()
            .starts_with("Command fetch error"));
        assert!(LoaderError::Submit("rejected".to_string())
            .to_string()
            .starts_with("Statement submit error"));
    }
}
