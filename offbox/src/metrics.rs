//! Metrics declaration and recording helpers.

use offbox_core::RequestClass;

use crate::strategy::{ResponseSource, Served};

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
lazy_static! {
    // Response source metrics

    /// Track number of responses served from a cache store.
    pub static ref CACHE_HIT_COUNTER: &'static str = {
        metrics::describe_counter!(
            "offbox_cache_hit_total",
            "Total number of responses served from a cache store."
        );
        "offbox_cache_hit_total"
    };
    /// Track number of responses served from the network.
    pub static ref CACHE_MISS_COUNTER: &'static str = {
        metrics::describe_counter!(
            "offbox_cache_miss_total",
            "Total number of responses served from the network."
        );
        "offbox_cache_miss_total"
    };
    /// Track number of synthesized fallback responses.
    pub static ref CACHE_FALLBACK_COUNTER: &'static str = {
        metrics::describe_counter!(
            "offbox_fallback_total",
            "Total number of synthesized offline responses."
        );
        "offbox_fallback_total"
    };
    /// Track number of failed origin fetches.
    pub static ref ORIGIN_FAILURE_COUNTER: &'static str = {
        metrics::describe_counter!(
            "offbox_origin_failure_total",
            "Total number of origin fetches that failed at the network level."
        );
        "offbox_origin_failure_total"
    };

    // Offload manager metrics

    /// Track number of offload tasks spawned.
    pub static ref OFFLOAD_TASKS_SPAWNED: &'static str = {
        metrics::describe_counter!(
            "offbox_offload_tasks_spawned_total",
            "Total number of offload tasks spawned."
        );
        "offbox_offload_tasks_spawned_total"
    };
    /// Track number of offload tasks completed successfully.
    pub static ref OFFLOAD_TASKS_COMPLETED: &'static str = {
        metrics::describe_counter!(
            "offbox_offload_tasks_completed_total",
            "Total number of offload tasks completed successfully."
        );
        "offbox_offload_tasks_completed_total"
    };
    /// Track number of offload tasks that timed out.
    pub static ref OFFLOAD_TASKS_TIMEOUT: &'static str = {
        metrics::describe_counter!(
            "offbox_offload_tasks_timeout_total",
            "Total number of offload tasks that timed out."
        );
        "offbox_offload_tasks_timeout_total"
    };
    /// Track number of revalidations skipped because one was in flight.
    pub static ref OFFLOAD_TASKS_DEDUPLICATED: &'static str = {
        metrics::describe_counter!(
            "offbox_offload_tasks_deduplicated_total",
            "Total number of revalidations skipped because one for the same key was in flight."
        );
        "offbox_offload_tasks_deduplicated_total"
    };
    /// Gauge of currently active offload tasks.
    pub static ref OFFLOAD_TASKS_ACTIVE: &'static str = {
        metrics::describe_gauge!(
            "offbox_offload_tasks_active",
            "Number of currently active offload tasks."
        );
        "offbox_offload_tasks_active"
    };
    /// Histogram of offload task duration.
    pub static ref OFFLOAD_TASK_DURATION: &'static str = {
        metrics::describe_histogram!(
            "offbox_offload_task_duration_seconds",
            metrics::Unit::Seconds,
            "Duration of offload tasks in seconds."
        );
        "offbox_offload_task_duration_seconds"
    };
}

/// Record where a served response came from.
///
/// When the `metrics` feature is disabled, this function is a no-op
/// and will be eliminated by the compiler.
#[cfg(feature = "metrics")]
#[inline]
pub fn record_served(served: &Served, class: RequestClass) {
    let strategy = served.strategy.as_str();
    match &served.source {
        ResponseSource::Cache(store) => metrics::counter!(
            *CACHE_HIT_COUNTER,
            "class" => class.as_str(),
            "strategy" => strategy,
            "store" => store.to_string()
        )
        .increment(1),
        ResponseSource::Network => metrics::counter!(
            *CACHE_MISS_COUNTER,
            "class" => class.as_str(),
            "strategy" => strategy
        )
        .increment(1),
        ResponseSource::Fallback => metrics::counter!(
            *CACHE_FALLBACK_COUNTER,
            "class" => class.as_str(),
            "strategy" => strategy
        )
        .increment(1),
    }
}

/// No-op version when metrics feature is disabled.
#[cfg(not(feature = "metrics"))]
#[inline]
pub fn record_served(_served: &Served, _class: RequestClass) {}

/// Record an origin fetch that failed at the network level.
#[cfg(feature = "metrics")]
#[inline]
pub fn record_origin_failure(class: RequestClass) {
    metrics::counter!(*ORIGIN_FAILURE_COUNTER, "class" => class.as_str()).increment(1);
}

/// No-op version when metrics feature is disabled.
#[cfg(not(feature = "metrics"))]
#[inline]
pub fn record_origin_failure(_class: RequestClass) {}
