use hdrhistogram::Histogram;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// Process-wide counters and per-event latency histograms.
#[derive(Debug)]
pub struct ServerMetrics {
    // Connection metrics
    pub total_connections: AtomicU64,
    pub active_connections: AtomicU64,
    pub disconnections: AtomicU64,
    pub connections_rejected: AtomicU64,
    pub websocket_messages_dropped: AtomicU64,

    // Room metrics
    pub rooms_created: AtomicU64,
    pub rooms_deleted: AtomicU64,
    pub players_joined: AtomicU64,
    pub players_left: AtomicU64,
    pub room_join_failures: AtomicU64,

    // Game actions
    pub steals: AtomicU64,
    pub attacks: AtomicU64,
    pub moves: AtomicU64,

    // Voice signaling relay
    pub signals_relayed: AtomicU64,
    pub signals_dropped: AtomicU64,
    pub signals_rejected: AtomicU64,

    // Error tracking
    pub errors_sent: AtomicU64,
    pub validation_errors: AtomicU64,
    pub rate_limit_rejections: AtomicU64,
    pub websocket_errors: AtomicU64,

    // Performance metrics
    pub average_response_times: Arc<RwLock<ResponseTimeTracker>>,
    pub latency_histogram_clamped_samples: AtomicU64,
}

#[derive(Debug, Clone)]
pub struct ResponseTimeTracker {
    operations: HashMap<String, OperationLatencyHistogram>,
    lowest_discernible_micros: u64,
    highest_trackable_micros: u64,
    significant_figures: u8,
}

const DEFAULT_LOWEST_DISCERNIBLE_MICROS: u64 = 1;
const DEFAULT_HIGHEST_TRACKABLE_MICROS: u64 = 60_000_000; // 1 minute in microseconds
const DEFAULT_SIGNIFICANT_FIGURES: u8 = 3;

#[derive(Debug, Clone)]
struct OperationLatencyHistogram {
    /// None if every creation attempt failed
    histogram: Option<Histogram<u64>>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub connections: ConnectionMetrics,
    pub rooms: RoomMetrics,
    pub actions: ActionMetrics,
    pub signaling: SignalingMetrics,
    pub errors: ErrorMetrics,
    /// Keyed by inbound event name
    pub latency: BTreeMap<String, OperationLatencyMetrics>,
    pub latency_histogram_clamped_samples: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionMetrics {
    pub total_connections: u64,
    pub active_connections: u64,
    pub disconnections: u64,
    pub connections_rejected: u64,
    pub websocket_messages_dropped: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RoomMetrics {
    pub rooms_created: u64,
    pub rooms_deleted: u64,
    pub active_rooms: u64,
    pub players_joined: u64,
    pub players_left: u64,
    pub room_join_failures: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ActionMetrics {
    pub steals: u64,
    pub attacks: u64,
    pub moves: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SignalingMetrics {
    pub relayed: u64,
    pub dropped: u64,
    pub rejected: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ErrorMetrics {
    pub errors_sent: u64,
    pub validation_errors: u64,
    pub rate_limit_rejections: u64,
    pub websocket_errors: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OperationLatencyMetrics {
    pub average_ms: Option<f64>,
    pub p50_ms: Option<f64>,
    pub p95_ms: Option<f64>,
    pub p99_ms: Option<f64>,
    pub min_ms: Option<f64>,
    pub max_ms: Option<f64>,
    pub sample_count: u64,
}

impl Default for ServerMetrics {
    fn default() -> Self {
        Self::new()
    }
}

fn bump(counter: &AtomicU64) {
    counter.fetch_add(1, Ordering::Relaxed);
}

fn read(counter: &AtomicU64) -> u64 {
    counter.load(Ordering::Relaxed)
}

impl ServerMetrics {
    pub fn new() -> Self {
        Self {
            total_connections: AtomicU64::new(0),
            active_connections: AtomicU64::new(0),
            disconnections: AtomicU64::new(0),
            connections_rejected: AtomicU64::new(0),
            websocket_messages_dropped: AtomicU64::new(0),
            rooms_created: AtomicU64::new(0),
            rooms_deleted: AtomicU64::new(0),
            players_joined: AtomicU64::new(0),
            players_left: AtomicU64::new(0),
            room_join_failures: AtomicU64::new(0),
            steals: AtomicU64::new(0),
            attacks: AtomicU64::new(0),
            moves: AtomicU64::new(0),
            signals_relayed: AtomicU64::new(0),
            signals_dropped: AtomicU64::new(0),
            signals_rejected: AtomicU64::new(0),
            errors_sent: AtomicU64::new(0),
            validation_errors: AtomicU64::new(0),
            rate_limit_rejections: AtomicU64::new(0),
            websocket_errors: AtomicU64::new(0),
            average_response_times: Arc::new(RwLock::new(ResponseTimeTracker::new())),
            latency_histogram_clamped_samples: AtomicU64::new(0),
        }
    }

    // Connection metrics
    pub fn increment_connections(&self) {
        bump(&self.total_connections);
        bump(&self.active_connections);
    }

    pub fn decrement_active_connections(&self) {
        // Check-then-decrement in one step so concurrent disconnects cannot underflow
        let _ = self
            .active_connections
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |current| {
                current.checked_sub(1)
            });
        bump(&self.disconnections);
    }

    pub fn increment_connections_rejected(&self) {
        bump(&self.connections_rejected);
    }

    pub fn increment_websocket_messages_dropped(&self) {
        bump(&self.websocket_messages_dropped);
    }

    // Room metrics
    pub fn increment_rooms_created(&self) {
        bump(&self.rooms_created);
    }

    pub fn increment_rooms_deleted(&self) {
        bump(&self.rooms_deleted);
    }

    pub fn increment_players_joined(&self) {
        bump(&self.players_joined);
    }

    pub fn increment_players_left(&self) {
        bump(&self.players_left);
    }

    pub fn increment_room_join_failures(&self) {
        bump(&self.room_join_failures);
    }

    // Game actions
    pub fn increment_steals(&self) {
        bump(&self.steals);
    }

    pub fn increment_attacks(&self) {
        bump(&self.attacks);
    }

    pub fn increment_moves(&self) {
        bump(&self.moves);
    }

    // Signaling
    pub fn increment_signals_relayed(&self) {
        bump(&self.signals_relayed);
    }

    pub fn increment_signals_dropped(&self) {
        bump(&self.signals_dropped);
    }

    pub fn increment_signals_rejected(&self) {
        bump(&self.signals_rejected);
    }

    // Errors
    pub fn increment_errors_sent(&self) {
        bump(&self.errors_sent);
    }

    pub fn increment_validation_errors(&self) {
        bump(&self.validation_errors);
    }

    pub fn increment_rate_limit_rejections(&self) {
        bump(&self.rate_limit_rejections);
    }

    pub fn increment_websocket_errors(&self) {
        bump(&self.websocket_errors);
    }

    pub fn increment_latency_histogram_clamps(&self) {
        bump(&self.latency_histogram_clamped_samples);
    }

    pub async fn record_response_time(&self, operation: &str, duration: Duration) {
        let mut tracker = self.average_response_times.write().await;
        let clamped = tracker.add_sample(operation, duration);
        drop(tracker);
        if clamped {
            self.increment_latency_histogram_clamps();
        }
    }

    /// Point-in-time copy of every counter. `active_rooms` comes from the room registry.
    pub async fn snapshot(&self, active_rooms: usize) -> MetricsSnapshot {
        let latency = self.average_response_times.read().await.all_latency_metrics();

        MetricsSnapshot {
            timestamp: chrono::Utc::now(),
            connections: ConnectionMetrics {
                total_connections: read(&self.total_connections),
                active_connections: read(&self.active_connections),
                disconnections: read(&self.disconnections),
                connections_rejected: read(&self.connections_rejected),
                websocket_messages_dropped: read(&self.websocket_messages_dropped),
            },
            rooms: RoomMetrics {
                rooms_created: read(&self.rooms_created),
                rooms_deleted: read(&self.rooms_deleted),
                active_rooms: active_rooms as u64,
                players_joined: read(&self.players_joined),
                players_left: read(&self.players_left),
                room_join_failures: read(&self.room_join_failures),
            },
            actions: ActionMetrics {
                steals: read(&self.steals),
                attacks: read(&self.attacks),
                moves: read(&self.moves),
            },
            signaling: SignalingMetrics {
                relayed: read(&self.signals_relayed),
                dropped: read(&self.signals_dropped),
                rejected: read(&self.signals_rejected),
            },
            errors: ErrorMetrics {
                errors_sent: read(&self.errors_sent),
                validation_errors: read(&self.validation_errors),
                rate_limit_rejections: read(&self.rate_limit_rejections),
                websocket_errors: read(&self.websocket_errors),
            },
            latency,
            latency_histogram_clamped_samples: read(&self.latency_histogram_clamped_samples),
        }
    }
}

impl Default for ResponseTimeTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseTimeTracker {
    pub fn new() -> Self {
        Self {
            operations: HashMap::new(),
            lowest_discernible_micros: DEFAULT_LOWEST_DISCERNIBLE_MICROS,
            highest_trackable_micros: DEFAULT_HIGHEST_TRACKABLE_MICROS,
            significant_figures: DEFAULT_SIGNIFICANT_FIGURES,
        }
    }

    #[cfg(test)]
    pub fn with_bounds(
        lowest_discernible_micros: u64,
        highest_trackable_micros: u64,
        significant_figures: u8,
    ) -> Self {
        Self {
            operations: HashMap::new(),
            lowest_discernible_micros: lowest_discernible_micros.max(1),
            highest_trackable_micros: highest_trackable_micros
                .max(lowest_discernible_micros.max(1)),
            significant_figures: significant_figures.clamp(1, 5),
        }
    }

    /// Record one sample. Returns true when the sample exceeded the histogram
    /// ceiling and was clamped.
    pub fn add_sample(&mut self, operation: &str, duration: Duration) -> bool {
        let micros = duration_to_micros(duration);
        let lowest = self.lowest_discernible_micros;
        let highest = self.highest_trackable_micros;
        let significant = self.significant_figures;
        let histogram = self
            .operations
            .entry(operation.to_string())
            .or_insert_with(|| OperationLatencyHistogram::new(lowest, highest, significant));

        histogram.record(micros, highest)
    }

    pub fn get_latency_metrics(&self, operation: &str) -> Option<OperationLatencyMetrics> {
        self.operations.get(operation)?.metrics()
    }

    pub fn all_latency_metrics(&self) -> BTreeMap<String, OperationLatencyMetrics> {
        self.operations
            .iter()
            .filter_map(|(name, histogram)| histogram.metrics().map(|m| (name.clone(), m)))
            .collect()
    }
}

impl OperationLatencyHistogram {
    fn new(
        lowest_discernible_micros: u64,
        highest_trackable_micros: u64,
        significant_figures: u8,
    ) -> Self {
        let lowest = lowest_discernible_micros.max(1);
        let highest = highest_trackable_micros.max(lowest);
        let sig_figs = significant_figures.clamp(1, 5);

        // Fall back to an auto-resizing histogram if the bounds are rejected
        let histogram = Histogram::new_with_bounds(lowest, highest, sig_figs)
            .or_else(|e| {
                tracing::warn!(
                    target: "metrics",
                    error = %e,
                    lowest,
                    highest,
                    sig_figs,
                    "Failed to create histogram with requested bounds, using unbounded fallback"
                );
                Histogram::new(2)
            })
            .ok();

        if histogram.is_none() {
            tracing::error!(target: "metrics", "Histogram creation failed; latency for this event will not be recorded");
        }

        Self { histogram }
    }

    fn record(&mut self, micros: u64, highest_trackable_micros: u64) -> bool {
        let was_clamped = micros > highest_trackable_micros;
        let value = micros.min(highest_trackable_micros);
        if let Some(ref mut histogram) = self.histogram {
            if let Err(error) = histogram.record(value) {
                tracing::warn!(
                    target: "metrics",
                    %error,
                    clamped_value = value,
                    highest_trackable_micros,
                    "failed to record latency sample"
                );
            }
        }
        was_clamped
    }

    fn metrics(&self) -> Option<OperationLatencyMetrics> {
        let histogram = self.histogram.as_ref()?;
        if histogram.is_empty() {
            return None;
        }

        let percentile = |p: f64| Some(histogram.value_at_percentile(p) as f64 / MICROS_PER_MS);
        Some(OperationLatencyMetrics {
            average_ms: Some(histogram.mean() / MICROS_PER_MS),
            p50_ms: percentile(50.0),
            p95_ms: percentile(95.0),
            p99_ms: percentile(99.0),
            min_ms: Some(histogram.min() as f64 / MICROS_PER_MS),
            max_ms: Some(histogram.max() as f64 / MICROS_PER_MS),
            sample_count: histogram.len(),
        })
    }
}

const MICROS_PER_MS: f64 = 1000.0;

fn duration_to_micros(duration: Duration) -> u64 {
    duration.as_micros().min(u128::from(u64::MAX)) as u64
}

/// Times one inbound event and records it under the event name.
pub struct OperationTimer {
    operation: &'static str,
    start: Instant,
    metrics: Arc<ServerMetrics>,
}

impl OperationTimer {
    pub fn new(operation: &'static str, metrics: Arc<ServerMetrics>) -> Self {
        Self {
            operation,
            start: Instant::now(),
            metrics,
        }
    }

    pub async fn finish(self) {
        let duration = self.start.elapsed();
        self.metrics
            .record_response_time(self.operation, duration)
            .await;
    }
}
