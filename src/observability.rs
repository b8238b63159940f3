use std::net::SocketAddr;

// ── RED metrics (request-driven) ────────────────────────────────

/// Counter: reservation requests accepted into `pending`.
pub const RESERVATIONS_CREATED_TOTAL: &str = "ruang_reservations_created_total";

/// Counter: admin decisions applied. Labels: decision.
pub const RESERVATION_DECISIONS_TOTAL: &str = "ruang_reservation_decisions_total";

/// Counter: recurring academic rules created.
pub const ACADEMIC_RULES_CREATED_TOTAL: &str = "ruang_academic_rules_created_total";

/// Counter: operations rejected on conflict. Labels: op.
pub const CONFLICTS_TOTAL: &str = "ruang_conflicts_total";

/// Counter: availability checks. Labels: available.
pub const AVAILABILITY_CHECKS_TOTAL: &str = "ruang_availability_checks_total";

/// Histogram: availability check latency in seconds.
pub const AVAILABILITY_CHECK_DURATION_SECONDS: &str =
    "ruang_availability_check_duration_seconds";

// ── Consistency metrics ─────────────────────────────────────────

/// Counter: dated-schedule materializations that failed after the approval
/// was already persisted. Nonzero means manual reconciliation is due.
pub const MATERIALIZATION_FAILURES_TOTAL: &str = "ruang_materialization_failures_total";

/// Install Prometheus metrics exporter on the given port. No-op if port is None.
pub fn init(port: Option<u16>) {
    let Some(port) = port else { return };
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .expect("failed to install Prometheus metrics exporter");
    tracing::info!("metrics endpoint: http://0.0.0.0:{port}/metrics");
}
