//! Localization fallback metrics.
//!
//! Counts how content lookups were satisfied so operators can see how often
//! readers are served a language other than the one they asked for.

use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};

/// How a single resolution was satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionOutcome {
    /// Found in the requested language
    Direct,
    /// Served from the canonical language instead
    CanonicalFallback,
    /// Found only through legacy suffix discovery
    Legacy,
    /// Nothing found anywhere
    Miss,
}

/// Resolver counters, owned by a content store and shared by its clones.
#[derive(Debug, Default)]
pub struct ResolverMetrics {
    direct: AtomicUsize,
    canonical_fallbacks: AtomicUsize,
    legacy: AtomicUsize,
    misses: AtomicUsize,
}

impl ResolverMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, outcome: ResolutionOutcome) {
        let counter = match outcome {
            ResolutionOutcome::Direct => &self.direct,
            ResolutionOutcome::CanonicalFallback => &self.canonical_fallbacks,
            ResolutionOutcome::Legacy => &self.legacy,
            ResolutionOutcome::Miss => &self.misses,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn direct(&self) -> usize {
        self.direct.load(Ordering::Relaxed)
    }

    pub fn canonical_fallbacks(&self) -> usize {
        self.canonical_fallbacks.load(Ordering::Relaxed)
    }

    pub fn legacy(&self) -> usize {
        self.legacy.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> usize {
        self.misses.load(Ordering::Relaxed)
    }

    /// Generate a metrics report.
    pub fn report(&self) -> MetricsReport {
        let direct = self.direct();
        let canonical_fallbacks = self.canonical_fallbacks();
        let legacy = self.legacy();
        let misses = self.misses();

        let found = direct + canonical_fallbacks + legacy;
        let fallback_rate = if found > 0 {
            ((canonical_fallbacks + legacy) as f64 / found as f64) * 100.0
        } else {
            0.0
        };

        MetricsReport {
            direct,
            canonical_fallbacks,
            legacy,
            misses,
            fallback_rate,
        }
    }
}

/// Snapshot of resolver counters.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsReport {
    pub direct: usize,
    pub canonical_fallbacks: usize,
    pub legacy: usize,
    pub misses: usize,
    /// Percentage of found content that was served through a fallback
    pub fallback_rate: f64,
}
