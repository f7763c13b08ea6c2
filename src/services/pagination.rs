// SPDX-License-Identifier: MIT

//! Generic "fetch all pages until exhausted" primitive.
//!
//! Used for both the activity-history and segment-effort-history downloads.
//! Requests are strictly sequential with a fixed inter-page delay to respect
//! the remote rate limits.

use std::future::Future;
use std::time::Duration;

use crate::error::Result;

/// Strava's documented per-page cap.
pub const PER_PAGE: u32 = 200;

/// Hard page ceiling for activity history downloads.
pub const ACTIVITY_PAGE_CEILING: u32 = 500;

/// Hard page ceiling for segment-effort history downloads.
pub const EFFORT_PAGE_CEILING: u32 = 50;

/// Fixed pause between page requests.
const INTER_PAGE_DELAY: Duration = Duration::from_millis(100);

/// Fetch pages starting at 1 until a page comes back empty.
///
/// Only emptiness terminates: the API may quietly serve fewer items than the
/// requested page size, so "shorter than per_page" is not a last-page signal.
/// `on_progress` fires with the cumulative count after each non-empty page
/// and never after a failed one. The `page_ceiling` bounds worst-case work
/// against pathological responses; any page error aborts the remaining
/// pagination and propagates as-is.
pub async fn fetch_all_pages<T, F, Fut, P>(
    mut fetch_page: F,
    page_ceiling: u32,
    mut on_progress: P,
) -> Result<Vec<T>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<Vec<T>>>,
    P: FnMut(usize),
{
    let mut items = Vec::new();

    for page in 1..=page_ceiling {
        if page > 1 {
            tokio::time::sleep(INTER_PAGE_DELAY).await;
        }

        let batch = fetch_page(page).await?;
        if batch.is_empty() {
            return Ok(items);
        }

        items.extend(batch);
        on_progress(items.len());
        tracing::debug!(page, total = items.len(), "fetched page");
    }

    tracing::warn!(
        page_ceiling,
        total = items.len(),
        "page ceiling reached before an empty page, stopping"
    );
    Ok(items)
}
