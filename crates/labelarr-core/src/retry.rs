use std::future::Future;
use thiserror::Error;
use tracing::warn;

/// Attempts allowed when resolving a label to a tag id
pub const TAG_LOOKUP_ATTEMPTS: u32 = 3;

/// Every attempt failed; carries the last error
#[derive(Debug, Error)]
#[error("gave up after {attempts} attempts: {last}")]
pub struct Exhausted<E> {
    pub attempts: u32,
    pub last: E,
}

/// Run `f` until it succeeds or `max_attempts` calls have failed.
///
/// `f` receives the 1-based attempt number. There is no delay between attempts.
pub async fn attempt<T, E, F, Fut>(max_attempts: u32, mut f: F) -> Result<T, Exhausted<E>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let max_attempts = max_attempts.max(1);
    let mut number = 1;
    loop {
        match f(number).await {
            Ok(value) => return Ok(value),
            Err(e) if number >= max_attempts => {
                return Err(Exhausted {
                    attempts: number,
                    last: e,
                })
            }
            Err(e) => {
                warn!(attempt = number, max_attempts, "Attempt failed: {}", e);
                number += 1;
            }
        }
    }
}
