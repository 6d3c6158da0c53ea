//! Session metrics for observability and the HUD.
//!
//! Plain counters: the session is single-threaded, so there is nothing to
//! synchronize. `snapshot()` hands out a point-in-time copy for display.

/// Counters accumulated over a viewer session.
#[derive(Debug, Default, Clone)]
pub struct SessionMetrics {
    /// Frames fetched with a fresh sequential read.
    pub fresh_reads: u64,
    /// Backward steps served from cache.
    pub backward_cache_hits: u64,
    /// Forward steps replayed from cache after a cached back-step.
    pub forward_replays: u64,
    /// Backward steps that required a seek.
    pub reseeks: u64,
    /// Stale buffered frames drained after seeks.
    pub flushed_frames: u64,
    /// Fetches that timed out (folded into exhaustion).
    pub fetch_timeouts: u64,
    /// Clicks rejected for landing outside the raw sensor bounds.
    pub rejected_clicks: u64,
    /// Rectangle queries committed with a valid average.
    pub committed_queries: u64,
}

impl SessionMetrics {
    /// Point-in-time copy for display.
    pub fn snapshot(&self) -> SessionMetrics {
        self.clone()
    }
}

impl std::fmt::Display for SessionMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "reads {} | back-hits {} | replays {} | reseeks {} (flushed {}) | timeouts {} | rejected clicks {} | queries {}",
            self.fresh_reads,
            self.backward_cache_hits,
            self.forward_replays,
            self.reseeks,
            self.flushed_frames,
            self.fetch_timeouts,
            self.rejected_clicks,
            self.committed_queries,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_is_independent_copy() {
        let mut metrics = SessionMetrics::default();
        metrics.fresh_reads = 3;
        let snap = metrics.snapshot();
        metrics.fresh_reads = 9;
        assert_eq!(snap.fresh_reads, 3);
    }

    #[test]
    fn test_display_contains_counts() {
        let metrics = SessionMetrics {
            fresh_reads: 12,
            reseeks: 2,
            ..Default::default()
        };
        let text = metrics.to_string();
        assert!(text.contains("reads 12"));
        assert!(text.contains("reseeks 2"));
    }
}
