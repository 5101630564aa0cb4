use crate::error::{Error, Result};
use chrono::NaiveDate;
use clap::ValueEnum;
use derive_more::Display;
use serde::{Deserialize, Serialize};
use url::Url;

const PROFILE_BASE: &str = "https://www.tiktok.com/@";
const PROFILE_DOMAIN: &str = "tiktok.com";
/// Endings that mark a dotted bare value as a host rather than a handle.
const HOST_SUFFIXES: &[&str] = &["com", "net", "org", "io", "co", "tv", "me", "app", "dev", "info"];
const LIST_SEPARATOR: &str = ", ";

/// Countries the channel search can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, ValueEnum)]
#[value(rename_all = "UPPER")]
pub enum Country {
    #[display("US")]
    Us,
    #[display("IN")]
    In,
    #[display("ID")]
    Id,
    #[display("BD")]
    Bd,
    #[display("VN")]
    Vn,
}

/// One row of the channel database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelRecord {
    pub channel_url: String,
    pub keywords: String,
    pub country: String,
    pub first_seen: NaiveDate,
    pub last_seen: NaiveDate,
    pub recommendation_count: u32,
}

impl ChannelRecord {
    pub fn new(
        channel_url: String,
        keywords: &[String],
        country: Country,
        run_date: NaiveDate,
    ) -> Self {
        Self {
            channel_url,
            keywords: keywords.join(LIST_SEPARATOR),
            country: country.to_string(),
            first_seen: run_date,
            last_seen: run_date,
            recommendation_count: 1,
        }
    }

    /// Records a re-suggestion. `first_seen` never moves.
    pub fn touch(&mut self, keywords: &[String], country: Country, run_date: NaiveDate) {
        self.recommendation_count = self.recommendation_count.saturating_add(1);
        if run_date > self.last_seen {
            self.last_seen = run_date;
        }
        self.keywords = merge_list(&self.keywords, keywords.iter().map(String::as_str));
        self.country = merge_list(&self.country, [country.to_string().as_str()]);
    }
}

/// Appends the entries of `additions` that are not already in the
/// comma-separated `existing` list (case-insensitive). Unchanged input is
/// returned verbatim.
pub fn merge_list<'a>(existing: &str, additions: impl IntoIterator<Item = &'a str>) -> String {
    let mut items: Vec<String> = split_list(existing);
    let mut changed = false;

    for addition in additions {
        let addition = addition.trim();
        if addition.is_empty() {
            continue;
        }
        if !items.iter().any(|item| item.eq_ignore_ascii_case(addition)) {
            items.push(addition.to_string());
            changed = true;
        }
    }

    if changed {
        items.join(LIST_SEPARATOR)
    } else {
        existing.to_string()
    }
}

/// Splits a comma-separated user list into trimmed, non-empty entries.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Canonical form of a channel URL.
///
/// Bare handles (`@name`, `name` or `name.with.dots`) expand to a TikTok
/// profile URL, and any `tiktok.com` profile link (other subdomains, `http`,
/// share-link query strings) collapses onto that same form. Other URLs get
/// `https` when the scheme is missing, a lower-cased scheme and host, no
/// fragment and no trailing slashes. The path keeps its case; see
/// [`dedup_key`] for comparisons.
pub fn normalize_channel_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(Error::MalformedCandidates("empty channel URL".to_string()));
    }

    let candidate = if let Some(handle) = trimmed.strip_prefix('@') {
        profile_url(handle)?
    } else if is_bare_handle(trimmed) {
        profile_url(trimmed)?
    } else if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };

    let mut url = Url::parse(&candidate)
        .map_err(|e| Error::MalformedCandidates(format!("'{trimmed}' is not a URL: {e}")))?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(Error::MalformedCandidates(format!(
            "'{trimmed}' is not an http(s) URL"
        )));
    }
    if let Some(handle) = tiktok_profile_handle(&url) {
        return profile_url(handle);
    }
    url.set_fragment(None);

    let serialized = url.to_string();
    Ok(serialized.trim_end_matches('/').to_string())
}

/// Identity used for duplicate detection: the normalized URL, case-folded.
pub fn dedup_key(raw: &str) -> Result<String> {
    Ok(normalize_channel_url(raw)?.to_lowercase())
}

fn is_bare_handle(value: &str) -> bool {
    let handle_chars = value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_'));
    let looks_like_host = value.rsplit_once('.').is_some_and(|(_, suffix)| {
        HOST_SUFFIXES
            .iter()
            .any(|known| known.eq_ignore_ascii_case(suffix))
    });
    handle_chars && !looks_like_host
}

/// The handle of a `tiktok.com/@handle` profile URL on any subdomain.
fn tiktok_profile_handle(url: &Url) -> Option<&str> {
    let host = url.host_str()?;
    if host != PROFILE_DOMAIN && !host.ends_with(&format!(".{PROFILE_DOMAIN}")) {
        return None;
    }
    let mut segments = url.path_segments()?.filter(|s| !s.is_empty());
    let handle = segments.next()?.strip_prefix('@')?;
    if segments.next().is_some() {
        return None;
    }
    Some(handle)
}

fn profile_url(handle: &str) -> Result<String> {
    let handle = handle.trim();
    if handle.is_empty()
        || !handle
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_'))
    {
        return Err(Error::MalformedCandidates(format!(
            "'@{handle}' is not a valid handle"
        )));
    }
    Ok(format!("{PROFILE_BASE}{handle}"))
}
