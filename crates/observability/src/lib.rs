use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::OnceCell;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

static TRACING_INIT: OnceCell<()> = OnceCell::new();

#[derive(Debug, Default)]
pub struct AppMetrics {
    turns_total: AtomicU64,
    classification_fallback_total: AtomicU64,
    data_lookups_total: AtomicU64,
    provider_errors_total: AtomicU64,
    generation_fallback_total: AtomicU64,
    total_latency_millis: AtomicU64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub turns_total: u64,
    pub classification_fallback_total: u64,
    pub data_lookups_total: u64,
    pub provider_errors_total: u64,
    pub generation_fallback_total: u64,
    pub avg_latency_millis: f64,
}

impl AppMetrics {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn inc_turn(&self) {
        self.turns_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_classification_fallback(&self) {
        self.classification_fallback_total
            .fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_data_lookup(&self) {
        self.data_lookups_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_provider_error(&self) {
        self.provider_errors_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_generation_fallback(&self) {
        self.generation_fallback_total
            .fetch_add(1, Ordering::Relaxed);
    }

    pub fn observe_latency(&self, duration: Duration) {
        self.total_latency_millis
            .fetch_add(duration.as_millis() as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let turns = self.turns_total.load(Ordering::Relaxed);
        let latency = self.total_latency_millis.load(Ordering::Relaxed);

        MetricsSnapshot {
            turns_total: turns,
            classification_fallback_total: self
                .classification_fallback_total
                .load(Ordering::Relaxed),
            data_lookups_total: self.data_lookups_total.load(Ordering::Relaxed),
            provider_errors_total: self.provider_errors_total.load(Ordering::Relaxed),
            generation_fallback_total: self.generation_fallback_total.load(Ordering::Relaxed),
            avg_latency_millis: if turns == 0 {
                0.0
            } else {
                latency as f64 / turns as f64
            },
        }
    }
}

const WORKSPACE_TARGETS: [&str; 5] = [
    "tripgenie_api",
    "tripgenie_agents",
    "tripgenie_travel",
    "tripgenie_llm",
    "tower_http",
];

/// Filter used when `RUST_LOG` is unset: `info` for the calling binary and
/// the workspace crates, everything else left at the subscriber default.
pub fn default_filter(service_name: &str) -> String {
    std::iter::once(service_name)
        .chain(WORKSPACE_TARGETS.iter().copied().filter(|target| *target != service_name))
        .map(|target| format!("{target}=info"))
        .collect::<Vec<_>>()
        .join(",")
}

/// Installs the JSON subscriber once per process; later calls are no-ops.
pub fn init_tracing(service_name: &str) {
    TRACING_INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_filter(service_name)));

        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .with_current_span(true)
            .with_span_list(false)
            .init();
    });
}
