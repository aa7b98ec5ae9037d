//! Per-item upsert bookkeeping shared by the content tables.

use serde::Serialize;

/// Outcome of a single natural-key upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertAction {
    Inserted,
    Updated,
}

impl UpsertAction {
    pub(crate) fn from_inserted_flag(inserted: bool) -> Self {
        if inserted {
            Self::Inserted
        } else {
            Self::Updated
        }
    }
}

/// Tally of a batch upsert. One bad item never aborts the batch; it lands
/// in `failed` (storage error) or `skipped` (no natural key).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UpsertCounts {
    pub inserted: usize,
    pub updated: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl UpsertCounts {
    pub fn record(&mut self, action: UpsertAction) {
        match action {
            UpsertAction::Inserted => self.inserted += 1,
            UpsertAction::Updated => self.updated += 1,
        }
    }

    /// Rows written by the batch, new or refreshed.
    #[must_use]
    pub fn processed(&self) -> usize {
        self.inserted + self.updated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn processed_counts_inserts_and_updates_only() {
        let mut counts = UpsertCounts::default();
        counts.record(UpsertAction::Inserted);
        counts.record(UpsertAction::Inserted);
        counts.record(UpsertAction::Updated);
        counts.skipped = 4;
        counts.failed = 1;

        assert_eq!(counts.processed(), 3);
    }

    #[test]
    fn inserted_flag_maps_to_action() {
        assert_eq!(UpsertAction::from_inserted_flag(true), UpsertAction::Inserted);
        assert_eq!(UpsertAction::from_inserted_flag(false), UpsertAction::Updated);
    }
}
