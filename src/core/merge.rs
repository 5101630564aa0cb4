use crate::core::channel::{ChannelRecord, Country, dedup_key, normalize_channel_url};
use crate::core::store::ChannelDatabase;
use crate::error::Result;
use chrono::NaiveDate;
use std::collections::HashSet;

/// Metadata shared by every candidate of one (keywords, country) request.
#[derive(Debug, Clone)]
pub struct MergeRequest {
    pub keywords: Vec<String>,
    pub country: Country,
    pub run_date: NaiveDate,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeSummary {
    pub new: usize,
    pub updated: usize,
    pub total: usize,
}

/// Reconciles a candidate list with the database.
///
/// Every candidate is normalized before anything is written, so a list with
/// one bad entry leaves `db` untouched. Repeats inside the list collapse onto
/// their first occurrence.
pub fn merge_candidates(
    db: &mut ChannelDatabase,
    candidates: &[String],
    request: &MergeRequest,
) -> Result<MergeSummary> {
    let mut prepared = Vec::with_capacity(candidates.len());
    let mut seen = HashSet::new();
    for candidate in candidates {
        let url = normalize_channel_url(candidate)?;
        let key = dedup_key(&url)?;
        if seen.insert(key.clone()) {
            prepared.push((key, url));
        }
    }

    let mut summary = MergeSummary::default();
    for (key, url) in prepared {
        match db.get_mut(&key) {
            Some(existing) => {
                existing.touch(&request.keywords, request.country, request.run_date);
                summary.updated += 1;
            }
            None => {
                let record =
                    ChannelRecord::new(url, &request.keywords, request.country, request.run_date);
                db.push(key, record);
                summary.new += 1;
            }
        }
    }

    summary.total = db.len();
    Ok(summary)
}
