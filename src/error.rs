use thiserror::Error;

/// Misuse of a [`StreamProcessor`](crate::StreamProcessor).
///
/// Malformed directive content is never an error here; it flows through as
/// raw content for the consumer to deal with.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StreamError {
    #[error("finalize called on a stream processor that never received a chunk")]
    NoInput,
}
