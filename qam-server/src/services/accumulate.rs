//! Ordered fan-out over a source list
//!
//! Enriches every element of a source list with one asynchronous lookup and
//! returns the results in source order. Lookups run concurrently, at most
//! `limit` in flight; the output always has exactly one result per source
//! element.
//!
//! **Failure policy:** the first failed lookup aborts the whole accumulation
//! and its error is returned. Lookups not yet started are never issued.

use futures::stream::{self, StreamExt, TryStreamExt};
use std::future::Future;

/// Run `lookup` for every element of `source`, keeping source order
///
/// An empty source returns an empty list without calling `lookup`. A `limit`
/// of 0 is treated as 1 (strictly sequential).
pub async fn accumulate_ordered<'a, S, R, E, F, Fut>(
    source: &'a [S],
    limit: usize,
    lookup: F,
) -> Result<Vec<R>, E>
where
    F: FnMut(&'a S) -> Fut,
    Fut: Future<Output = Result<R, E>>,
{
    if source.is_empty() {
        return Ok(Vec::new());
    }

    // Lookup futures are lazy; none runs until the stream polls it
    let lookups: Vec<Fut> = source.iter().map(lookup).collect();
    let results: Vec<R> = stream::iter(lookups)
        .buffered(limit.max(1))
        .try_collect()
        .await?;

    debug_assert_eq!(results.len(), source.len());
    Ok(results)
}
