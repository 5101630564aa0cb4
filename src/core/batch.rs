use crate::error::{Error, Result};
use derive_more::Display;

#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum ItemState {
    #[display("pending")]
    Pending,
    #[display("in progress")]
    InProgress,
    #[display("succeeded")]
    Succeeded,
    #[display("failed: {_0}")]
    Failed(String),
}

impl ItemState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ItemState::Succeeded | ItemState::Failed(_))
    }

    fn advance(&self, next: ItemState) -> Result<ItemState> {
        let allowed = matches!(
            (self, &next),
            (ItemState::Pending, ItemState::InProgress)
                | (ItemState::InProgress, ItemState::Succeeded)
                | (ItemState::InProgress, ItemState::Failed(_))
        );
        if allowed {
            Ok(next)
        } else {
            Err(Error::custom(format!(
                "illegal batch transition from {self} to {next}"
            )))
        }
    }
}

#[derive(Debug, Clone)]
pub struct BatchItem {
    pub label: String,
    pub state: ItemState,
}

/// Per-item bookkeeping for one run. Items never retry.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    items: Vec<BatchItem>,
}

impl BatchReport {
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            items: labels
                .into_iter()
                .map(|label| BatchItem {
                    label: label.into(),
                    state: ItemState::Pending,
                })
                .collect(),
        }
    }

    pub fn items(&self) -> &[BatchItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn start(&mut self, idx: usize) -> Result<()> {
        self.transition(idx, ItemState::InProgress)
    }

    pub fn succeed(&mut self, idx: usize) -> Result<()> {
        self.transition(idx, ItemState::Succeeded)
    }

    pub fn fail(&mut self, idx: usize, reason: impl Into<String>) -> Result<()> {
        self.transition(idx, ItemState::Failed(reason.into()))
    }

    fn transition(&mut self, idx: usize, next: ItemState) -> Result<()> {
        let item = self
            .items
            .get_mut(idx)
            .ok_or_else(|| Error::custom(format!("no batch item at index {idx}")))?;
        item.state = item.state.advance(next)?;
        Ok(())
    }

    pub fn succeeded(&self) -> usize {
        self.items
            .iter()
            .filter(|item| item.state == ItemState::Succeeded)
            .count()
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &str)> {
        self.items().iter().filter_map(|item| match &item.state {
            ItemState::Failed(reason) => Some((item.label.as_str(), reason.as_str())),
            _ => None,
        })
    }

    pub fn failed(&self) -> usize {
        self.failures().count()
    }

    pub fn is_complete(&self) -> bool {
        self.items.iter().all(|item| item.state.is_terminal())
    }

    pub fn print_summary(&self, title: &str) {
        println!();
        println!(
            "{title}: {} succeeded, {} failed, {} total",
            self.succeeded(),
            self.failed(),
            self.len()
        );
        for (label, reason) in self.failures() {
            println!("  FAILED {label}: {reason}");
        }
    }
}
