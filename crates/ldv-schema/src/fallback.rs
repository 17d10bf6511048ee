//! Ordered fallback over a list of strategies.
//!
//! Used for both fallback chains of the engine: alternate branch locations
//! when fetching, and full-document-then-fragment when checking.

/// Try `attempt` on each candidate in order and return the first success.
///
/// Candidates after the first success are never attempted. When every
/// candidate fails, all errors are returned in attempt order.
pub fn first_success<S, T, E, I, F>(candidates: I, mut attempt: F) -> Result<T, Vec<E>>
where
    I: IntoIterator<Item = S>,
    F: FnMut(S) -> Result<T, E>,
{
    let mut errors = Vec::new();
    for candidate in candidates {
        match attempt(candidate) {
            Ok(value) => return Ok(value),
            Err(e) => errors.push(e),
        }
    }
    Err(errors)
}
