//! Tracker-list fetching and candidate extraction

use std::collections::HashSet;

/// Default tracker list: the full ngosang/trackerslist set.
pub const DEFAULT_TRACKER_LIST_URL: &str =
    "https://raw.githubusercontent.com/ngosang/trackerslist/master/trackers_all.txt";

/// Fetches the raw tracker list and reduces it to candidate URIs.
///
/// # Errors
/// Fails on transport errors or a non-success HTTP status; an unreachable
/// list is a run-level failure, unlike any single probe.
pub async fn fetch_candidates(list_url: &str) -> anyhow::Result<Vec<String>> {
    let response = reqwest::get(list_url).await?.error_for_status()?;
    let body = response.text().await?;
    Ok(dedup_lines(&body))
}

/// Trims lines, drops blanks, keeps the first occurrence of each URI.
pub fn dedup_lines(raw: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| seen.insert(line.to_string()))
        .map(str::to_string)
        .collect()
}
