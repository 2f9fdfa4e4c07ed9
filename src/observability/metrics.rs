//! Metrics for catalog loads, transport requests and variant retrieval.
//!
//! Recorded through the `metrics` facade; nothing is exported unless the
//! embedding application installs a recorder.

use std::fmt;

/// Enum representing all metric names used in the crate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    // Catalog metrics
    CatalogLoadsCacheHit,
    CatalogLoadsNetwork,
    CatalogLoadsError,
    CatalogEntries,

    // Transport metrics
    TransportRequestsSuccess,
    TransportRequestsError,
    TransportPayloadBytes,

    // Retrieval metrics
    RetrievalVariantsSuccess,
    RetrievalVariantsFailed,
    RetrievalBatchesPartial,
}

impl MetricName {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::CatalogLoadsCacheHit => "webfont_catalog_loads_cache_hit_total",
            MetricName::CatalogLoadsNetwork => "webfont_catalog_loads_network_total",
            MetricName::CatalogLoadsError => "webfont_catalog_loads_error_total",
            MetricName::CatalogEntries => "webfont_catalog_entries",

            MetricName::TransportRequestsSuccess => "webfont_transport_requests_success_total",
            MetricName::TransportRequestsError => "webfont_transport_requests_error_total",
            MetricName::TransportPayloadBytes => "webfont_transport_payload_bytes",

            MetricName::RetrievalVariantsSuccess => "webfont_retrieval_variants_success_total",
            MetricName::RetrievalVariantsFailed => "webfont_retrieval_variants_failed_total",
            MetricName::RetrievalBatchesPartial => "webfont_retrieval_batches_partial_total",
        }
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Catalog Metrics
// ============================================================================

pub mod catalog {
    use super::MetricName;

    pub fn cache_hit() {
        ::metrics::counter!(MetricName::CatalogLoadsCacheHit.as_str()).increment(1);
    }

    pub fn network_load() {
        ::metrics::counter!(MetricName::CatalogLoadsNetwork.as_str()).increment(1);
    }

    pub fn load_error() {
        ::metrics::counter!(MetricName::CatalogLoadsError.as_str()).increment(1);
    }

    /// Number of entries currently held in memory
    pub fn entries(count: usize) {
        ::metrics::gauge!(MetricName::CatalogEntries.as_str()).set(count as f64);
    }
}

// ============================================================================
// Transport Metrics
// ============================================================================

pub mod transport {
    use super::MetricName;

    pub fn request_success() {
        ::metrics::counter!(MetricName::TransportRequestsSuccess.as_str()).increment(1);
    }

    pub fn request_error() {
        ::metrics::counter!(MetricName::TransportRequestsError.as_str()).increment(1);
    }

    pub fn payload_bytes(bytes: usize) {
        ::metrics::histogram!(MetricName::TransportPayloadBytes.as_str()).record(bytes as f64);
    }
}

// ============================================================================
// Retrieval Metrics
// ============================================================================

pub mod retrieval {
    use super::MetricName;

    pub fn variant_success(family: &str) {
        ::metrics::counter!(MetricName::RetrievalVariantsSuccess.as_str(), "family" => family.to_string())
            .increment(1);
    }

    pub fn variant_failed(family: &str) {
        ::metrics::counter!(MetricName::RetrievalVariantsFailed.as_str(), "family" => family.to_string())
            .increment(1);
    }

    pub fn partial_batch() {
        ::metrics::counter!(MetricName::RetrievalBatchesPartial.as_str()).increment(1);
    }
}
