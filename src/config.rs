//! Encoder and decoder configuration.

use crate::decode::MigrationRegistry;

/// Hard ceiling the transport accepts, in bytes.
pub const HARD_LIMIT_BYTES: usize = 4096;
/// Headroom kept below the ceiling for framing added after encoding.
pub const SAFETY_MARGIN_BYTES: usize = 256;
/// Environment variable overriding the hard ceiling, read by [`Budget::from_env`].
pub const BUDGET_ENV: &str = "ISLET_BUDGET_BYTES";

/// Size limits for an encoded envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Budget {
    hard_limit: usize,
    safety_margin: usize,
}

impl Budget {
    /// The transport's limits.
    pub const DEFAULT: Self = Self::new(HARD_LIMIT_BYTES, SAFETY_MARGIN_BYTES);

    /// Creates a budget. The margin is subtracted from the ceiling.
    #[must_use]
    pub const fn new(hard_limit: usize, safety_margin: usize) -> Self {
        Self {
            hard_limit,
            safety_margin,
        }
    }

    /// The default margin under a different ceiling.
    #[must_use]
    pub const fn with_hard_limit(hard_limit: usize) -> Self {
        Self::new(hard_limit, SAFETY_MARGIN_BYTES)
    }

    /// Reads the ceiling from `ISLET_BUDGET_BYTES`, falling back to [`Budget::DEFAULT`].
    #[must_use]
    pub fn from_env() -> Self {
        match std::env::var(BUDGET_ENV) {
            Ok(raw) => raw.trim().parse().map_or_else(
                |error| {
                    tracing::warn!(%raw, %error, "ignoring invalid {BUDGET_ENV}");
                    Self::DEFAULT
                },
                Self::with_hard_limit,
            ),
            Err(_) => Self::DEFAULT,
        }
    }

    /// The transport ceiling.
    #[must_use]
    pub const fn hard_limit(&self) -> usize {
        self.hard_limit
    }

    /// The headroom below the ceiling.
    #[must_use]
    pub const fn safety_margin(&self) -> usize {
        self.safety_margin
    }

    /// The largest envelope the encoder accepts.
    #[must_use]
    pub const fn effective(&self) -> usize {
        self.hard_limit.saturating_sub(self.safety_margin)
    }

    /// Whether `size` bytes fit.
    #[must_use]
    pub const fn fits(&self, size: usize) -> bool {
        size <= self.effective()
    }
}

impl Default for Budget {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// How the encoder shapes its output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncoderConfig {
    /// Size limits.
    pub budget: Budget,
    /// Store elements reused by identity once and reference them.
    pub dedupe: bool,
    /// Move repeated styles into the shared style pool.
    pub pool_styles: bool,
}

impl EncoderConfig {
    /// Replaces the budget.
    #[must_use]
    pub const fn with_budget(mut self, budget: Budget) -> Self {
        self.budget = budget;
        self
    }

    /// Turns element deduplication on or off.
    #[must_use]
    pub const fn with_dedupe(mut self, dedupe: bool) -> Self {
        self.dedupe = dedupe;
        self
    }

    /// Turns style pooling on or off.
    #[must_use]
    pub const fn with_style_pooling(mut self, pool_styles: bool) -> Self {
        self.pool_styles = pool_styles;
        self
    }
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            budget: Budget::DEFAULT,
            dedupe: true,
            pool_styles: true,
        }
    }
}

/// How the decoder upgrades old envelopes.
#[derive(Debug, Clone, Default)]
pub struct DecoderConfig {
    /// Single-step migrations up to the decoder's version.
    pub migrations: MigrationRegistry,
}

impl DecoderConfig {
    /// Replaces the migration registry.
    #[must_use]
    pub fn with_migrations(mut self, migrations: MigrationRegistry) -> Self {
        self.migrations = migrations;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn effective_budget_leaves_headroom() {
        assert_eq!(Budget::DEFAULT.effective(), 3840);
        assert!(Budget::DEFAULT.fits(3840));
        assert!(!Budget::DEFAULT.fits(3841));
        assert_eq!(Budget::new(100, 200).effective(), 0);
    }

    #[test]
    fn defaults_enable_every_optimization() {
        let config = EncoderConfig::default();
        assert!(config.dedupe && config.pool_styles);
        let config = config.with_style_pooling(false).with_budget(Budget::with_hard_limit(1024));
        assert!(!config.pool_styles);
        assert_eq!(config.budget.effective(), 768);
    }
}
