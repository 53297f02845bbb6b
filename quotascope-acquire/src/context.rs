//! Acquisition context providing transports and settings to sources.

use std::sync::Arc;

use quotascope_core::{ClientKeyPolicy, CostQueryApi, UsageDetailApi};

/// Default ceiling on detail records retrieved per source.
const DEFAULT_MAX_DETAIL_RECORDS: u32 = 1000;

// ============================================================================
// Acquire Settings
// ============================================================================

/// Settings shared by all acquisition sources.
#[derive(Debug, Clone)]
pub struct AcquireSettings {
    /// Maximum detail records to retrieve in the detail-record sources.
    pub max_detail_records: u32,
    /// How rows are assigned to client keys.
    pub keying: ClientKeyPolicy,
}

impl Default for AcquireSettings {
    fn default() -> Self {
        Self {
            max_detail_records: DEFAULT_MAX_DETAIL_RECORDS,
            keying: ClientKeyPolicy::overall("Default"),
        }
    }
}

impl AcquireSettings {
    /// Creates settings with the given client-key policy.
    pub fn with_keying(keying: ClientKeyPolicy) -> Self {
        Self {
            keying,
            ..Default::default()
        }
    }

    /// Overrides the detail-record ceiling.
    pub fn with_max_detail_records(mut self, max: u32) -> Self {
        self.max_detail_records = max;
        self
    }
}

// ============================================================================
// Acquire Context
// ============================================================================

/// Context provided to acquisition sources.
///
/// Bundles the billing transports a source might need plus the settings for
/// the run. The inventory-backed estimate source carries its own inventory
/// reference instead; see `sources::InventoryEstimateSource`.
pub struct AcquireContext {
    /// Primary cost query transport.
    pub cost: Arc<dyn CostQueryApi>,
    /// Detail-record transport (secondary source).
    pub details: Arc<dyn UsageDetailApi>,
    /// Alternative detail-record transport (tertiary source).
    pub legacy: Arc<dyn UsageDetailApi>,
    /// Acquisition settings.
    pub settings: AcquireSettings,
}

impl AcquireContext {
    /// Creates a context from transports and settings.
    pub fn new(
        cost: Arc<dyn CostQueryApi>,
        details: Arc<dyn UsageDetailApi>,
        legacy: Arc<dyn UsageDetailApi>,
        settings: AcquireSettings,
    ) -> Self {
        Self {
            cost,
            details,
            legacy,
            settings,
        }
    }
}

impl std::fmt::Debug for AcquireContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AcquireContext")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = AcquireSettings::default();
        assert_eq!(settings.max_detail_records, DEFAULT_MAX_DETAIL_RECORDS);
        assert!(!settings.keying.use_client_tags);
    }

    #[test]
    fn test_settings_builders() {
        let settings = AcquireSettings::with_keying(ClientKeyPolicy::tagged())
            .with_max_detail_records(50);
        assert!(settings.keying.use_client_tags);
        assert_eq!(settings.max_detail_records, 50);
    }
}
