//! Configuration for the sync engine.

use crate::transfer::TransferOptions;
use std::time::Duration;

/// Configuration for synchronization calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    /// Appended to the target name to form the staging table name.
    pub staging_suffix: String,

    /// Add a random component to staging names so concurrent calls against
    /// the same target do not share a staging table.
    pub unique_staging_names: bool,

    /// Run the merge inside an explicit transaction.
    pub transactional_merge: bool,

    /// Keep identity values when writing the staging table.
    pub staging_keep_identity: bool,

    /// Rows per bulk-write round trip (0 = single batch).
    pub batch_size: usize,

    /// Timeout applied to every database call (None = driver default).
    pub statement_timeout: Option<Duration>,

    /// Serialize calls that target the same table.
    pub serialize_per_table: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            staging_suffix: "_temp".to_owned(),
            unique_staging_names: false,
            transactional_merge: false,
            staging_keep_identity: true,
            batch_size: 0,
            statement_timeout: None,
            serialize_per_table: true,
        }
    }
}

impl SyncConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the staging table suffix.
    #[must_use]
    pub fn with_staging_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.staging_suffix = suffix.into();
        self
    }

    /// Sets whether staging names get a unique component.
    #[must_use]
    pub const fn with_unique_staging_names(mut self, value: bool) -> Self {
        self.unique_staging_names = value;
        self
    }

    /// Sets whether the merge runs in a transaction.
    #[must_use]
    pub const fn with_transactional_merge(mut self, value: bool) -> Self {
        self.transactional_merge = value;
        self
    }

    /// Sets whether staging writes keep identity values.
    #[must_use]
    pub const fn with_staging_keep_identity(mut self, value: bool) -> Self {
        self.staging_keep_identity = value;
        self
    }

    /// Sets the bulk-write batch size.
    #[must_use]
    pub const fn with_batch_size(mut self, rows: usize) -> Self {
        self.batch_size = rows;
        self
    }

    /// Sets the statement timeout.
    #[must_use]
    pub const fn with_statement_timeout(mut self, timeout: Duration) -> Self {
        self.statement_timeout = Some(timeout);
        self
    }

    /// Sets whether calls on the same table are serialized.
    #[must_use]
    pub const fn with_serialize_per_table(mut self, value: bool) -> Self {
        self.serialize_per_table = value;
        self
    }

    /// Staging table name for `target`, without the unique component.
    pub fn staging_name(&self, target: &str) -> String {
        format!("{target}{}", self.staging_suffix)
    }

    pub(crate) fn transfer_options(&self, keep_identity: bool) -> TransferOptions {
        TransferOptions::default()
            .with_batch_size(self.batch_size)
            .with_keep_identity(keep_identity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_plain_bulk_load() {
        let config = SyncConfig::default();
        assert_eq!(config.staging_name("Employees"), "Employees_temp");
        assert!(!config.transactional_merge);
        assert!(!config.unique_staging_names);
        assert!(config.staging_keep_identity);
        assert_eq!(config.batch_size, 0);
        assert_eq!(config.statement_timeout, None);
    }

    #[test]
    fn builders() {
        let config = SyncConfig::new()
            .with_staging_suffix("_stage")
            .with_transactional_merge(true)
            .with_batch_size(500)
            .with_statement_timeout(Duration::from_secs(30));

        assert_eq!(config.staging_name("T"), "T_stage");
        assert!(config.transactional_merge);
        assert_eq!(config.transfer_options(false).batch_size, 500);
        assert!(!config.transfer_options(false).keep_identity);
        assert_eq!(config.statement_timeout, Some(Duration::from_secs(30)));
    }
}
