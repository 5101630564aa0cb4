use crate::core::batch::BatchReport;
use crate::core::candidates::parse_candidates;
use crate::core::channel::Country;
use crate::core::merge::{MergeRequest, MergeSummary, merge_candidates};
use crate::core::store::ChannelDatabase;
use crate::core::suggester::{ChannelPrompt, ChannelSuggester};
use crate::error::Result;
use chrono::NaiveDate;

pub const DEFAULT_TARGET: usize = 20;

#[derive(Debug)]
pub struct DiscoveryReport {
    pub batch: BatchReport,
    pub merges: Vec<(Country, MergeSummary)>,
}

impl DiscoveryReport {
    pub fn new_channels(&self) -> usize {
        self.merges.iter().map(|(_, s)| s.new).sum()
    }

    pub fn updated_channels(&self) -> usize {
        self.merges.iter().map(|(_, s)| s.updated).sum()
    }
}

/// Runs one channel search per country and merges each answer into the
/// database. A failing country is recorded and skipped.
pub struct ChannelDiscovery<S> {
    suggester: S,
    target: usize,
}

impl<S: ChannelSuggester> ChannelDiscovery<S> {
    pub fn new(suggester: S, target: usize) -> Self {
        Self { suggester, target }
    }

    pub async fn run(
        &self,
        db: &mut ChannelDatabase,
        keywords: &[String],
        countries: &[Country],
        run_date: NaiveDate,
    ) -> Result<DiscoveryReport> {
        let mut batch = BatchReport::new(countries.iter().map(Country::to_string));
        let mut merges = Vec::new();

        for (idx, &country) in countries.iter().enumerate() {
            batch.start(idx)?;
            println!(
                "\n[{}/{}] Searching {} channels in {country}...",
                idx + 1,
                countries.len(),
                self.target
            );

            match self.discover_country(db, keywords, country, run_date).await {
                Ok(summary) => {
                    println!(
                        "{country}: {} new, {} updated, {} total",
                        summary.new, summary.updated, summary.total
                    );
                    merges.push((country, summary));
                    batch.succeed(idx)?;
                }
                Err(e) => {
                    tracing::warn!("Skipping {country}: {e}");
                    batch.fail(idx, e.to_string())?;
                }
            }
        }

        debug_assert!(batch.is_complete());
        Ok(DiscoveryReport { batch, merges })
    }

    async fn discover_country(
        &self,
        db: &mut ChannelDatabase,
        keywords: &[String],
        country: Country,
        run_date: NaiveDate,
    ) -> Result<MergeSummary> {
        let prompt = ChannelPrompt::build(keywords, country, self.target);
        let response = self.suggester.suggest(&prompt).await?;
        tracing::debug!("Raw suggestion response for {country}:\n{response}");

        let candidates = parse_candidates(&response, self.target)?;
        tracing::info!("Model suggested {} channels for {country}", candidates.len());

        let request = MergeRequest {
            keywords: keywords.to_vec(),
            country,
            run_date,
        };
        merge_candidates(db, &candidates, &request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use async_trait::async_trait;
    use std::collections::HashMap;

    /// Canned responses keyed by the prompt's country code.
    struct ScriptedSuggester {
        responses: HashMap<&'static str, std::result::Result<String, String>>,
    }

    #[async_trait]
    impl ChannelSuggester for ScriptedSuggester {
        async fn suggest(&self, prompt: &ChannelPrompt) -> Result<String> {
            let outcome = self
                .responses
                .get(prompt.country.to_string().as_str())
                .ok_or_else(|| Error::custom("no scripted response"))?;
            outcome.clone().map_err(|e| Error::custom(e))
        }
    }

    fn scripted<const N: usize>(
        responses: [(&'static str, std::result::Result<String, String>); N],
    ) -> ScriptedSuggester {
        ScriptedSuggester {
            responses: HashMap::from(responses),
        }
    }

    fn handles(range: std::ops::Range<usize>) -> String {
        range.map(|i| format!("@pet_creator_{i}\n")).collect()
    }

    fn run_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).expect("valid date")
    }

    #[tokio::test]
    async fn pets_fixture_adds_twenty_then_five() {
        let keywords = vec!["pets".to_string()];
        let mut db = ChannelDatabase::new();

        let first = ChannelDiscovery::new(scripted([("US", Ok(handles(0..20)))]), 20);
        let report = first.run(&mut db, &keywords, &[Country::Us], run_date()).await.unwrap();
        assert_eq!(report.new_channels(), 20);
        assert_eq!(report.updated_channels(), 0);
        assert_eq!(db.len(), 20);

        let second = ChannelDiscovery::new(scripted([("US", Ok(handles(0..25)))]), 25);
        let report = second.run(&mut db, &keywords, &[Country::Us], run_date()).await.unwrap();
        assert_eq!(report.new_channels(), 5);
        assert_eq!(report.updated_channels(), 20);
        assert_eq!(db.len(), 25);
    }

    #[tokio::test]
    async fn failing_country_is_skipped_and_reported() {
        let suggester = scripted([
            ("US", Ok(handles(0..3))),
            ("IN", Err("rate limited".to_string())),
            ("VN", Ok("I cannot help with that.".to_string())),
            ("BD", Ok(handles(3..5))),
        ]);
        let discovery = ChannelDiscovery::new(suggester, DEFAULT_TARGET);
        let mut db = ChannelDatabase::new();

        let report = discovery
            .run(
                &mut db,
                &["cats".to_string()],
                &[Country::Us, Country::In, Country::Vn, Country::Bd],
                run_date(),
            )
            .await
            .unwrap();

        assert!(report.batch.is_complete());
        assert_eq!(report.batch.succeeded(), 2);
        let failed: Vec<&str> = report.batch.failures().map(|(label, _)| label).collect();
        assert_eq!(failed, ["IN", "VN"]);
        assert_eq!(db.len(), 5);
    }

    #[tokio::test]
    async fn response_is_truncated_to_target() {
        let discovery = ChannelDiscovery::new(scripted([("US", Ok(handles(0..30)))]), 10);
        let mut db = ChannelDatabase::new();

        let report = discovery.run(&mut db, &[], &[Country::Us], run_date()).await.unwrap();

        assert_eq!(report.new_channels(), 10);
        assert_eq!(db.len(), 10);
    }
}
