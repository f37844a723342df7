use crate::model::Variable;

/// Failure taxonomy for the commute weather pipeline.
///
/// None of these are recovered locally: the first failure aborts the current
/// fetch and no partial summary rows are returned.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The caller passed an unusable argument, e.g. an inverted date range
    /// or an unrecognized variable name.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The provider payload violated a structural invariant (mismatched
    /// column lengths, broken time axis, unparseable JSON).
    #[error("malformed provider response: {0}")]
    MalformedResponse(String),

    /// An observation carried a variable with no assigned reducer. Given a
    /// correctly configured caller this is unreachable.
    #[error("no reducer assigned for variable '{0}'")]
    UnknownVariable(Variable),

    /// Opaque upstream failure, passed through unmodified.
    #[error("provider error: {0}")]
    Provider(#[from] anyhow::Error),
}
