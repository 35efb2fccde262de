//! Path: native/game_simulation/src/frame_metrics.rs
//! Summary: フェーズ別処理時間メトリクス（予算超過の警告 + 周期レポート）

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use game_core::constants::FRAME_BUDGET_MS;

use crate::scheduler::Phase;

pub const REPORT_INTERVAL_MS: u64 = 5_000;

#[inline]
fn now_ms() -> u64 {
    let Ok(dur) = SystemTime::now().duration_since(UNIX_EPOCH) else {
        return 0;
    };
    dur.as_millis().min(u64::MAX as u128) as u64
}

#[inline]
fn as_nanos_u64(dur: Duration) -> u64 {
    dur.as_nanos().min(u64::MAX as u128) as u64
}

/// 直近レポート窓の平均値
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MetricsSnapshot {
    pub phase_avg_us:    [u64; 5],
    pub tick_avg_us:     u64,
    pub ticks:           u64,
    pub budget_overruns: u64,
    pub last_tick_ms:    f64,
}

/// `&self` で記録できるので、ワールドを可変借用したままフェーズから呼べる
pub struct FrameMetrics {
    phase_total_ns:     [AtomicU64; 5],
    phase_samples:      [AtomicU64; 5],
    tick_total_ns:      AtomicU64,
    tick_samples:       AtomicU64,
    budget_overruns:    AtomicU64,
    last_tick_ns:       AtomicU64,
    last_report_ms:     AtomicU64,
    report_interval_ms: u64,
}

impl Default for FrameMetrics {
    fn default() -> Self {
        Self::new(REPORT_INTERVAL_MS)
    }
}

impl FrameMetrics {
    pub fn new(report_interval_ms: u64) -> Self {
        Self {
            phase_total_ns:  Default::default(),
            phase_samples:   Default::default(),
            tick_total_ns:   AtomicU64::new(0),
            tick_samples:    AtomicU64::new(0),
            budget_overruns: AtomicU64::new(0),
            last_tick_ns:    AtomicU64::new(0),
            last_report_ms:  AtomicU64::new(now_ms()),
            report_interval_ms,
        }
    }

    pub fn record_phase(&self, phase: Phase, elapsed: Duration) {
        let i = phase.index();
        self.phase_total_ns[i].fetch_add(as_nanos_u64(elapsed), Ordering::Relaxed);
        self.phase_samples[i].fetch_add(1, Ordering::Relaxed);
    }

    /// 計測しながら `f` を実行する
    pub fn time_phase<R>(&self, phase: Phase, f: impl FnOnce() -> R) -> R {
        let start = std::time::Instant::now();
        let r = f();
        self.record_phase(phase, start.elapsed());
        r
    }

    pub fn record_tick(&self, elapsed: Duration, enemy_count: usize) {
        let ns = as_nanos_u64(elapsed);
        self.tick_total_ns.fetch_add(ns, Ordering::Relaxed);
        self.tick_samples.fetch_add(1, Ordering::Relaxed);
        self.last_tick_ns.store(ns, Ordering::Relaxed);
        let ms = elapsed.as_secs_f64() * 1000.0;
        if ms > FRAME_BUDGET_MS {
            self.budget_overruns.fetch_add(1, Ordering::Relaxed);
            log::warn!(
                "Frame budget exceeded: {:.2}ms (budget={:.2}ms, enemies={})",
                ms,
                FRAME_BUDGET_MS,
                enemy_count
            );
        }
        self.maybe_report();
    }

    pub fn last_tick_ms(&self) -> f64 {
        self.last_tick_ns.load(Ordering::Relaxed) as f64 / 1_000_000.0
    }

    /// 窓を消費せずに現在の平均を読む
    pub fn snapshot(&self) -> MetricsSnapshot {
        let avg = |total: &AtomicU64, samples: &AtomicU64| {
            let n = samples.load(Ordering::Relaxed);
            if n > 0 { total.load(Ordering::Relaxed) / n / 1_000 } else { 0 }
        };
        let mut phase_avg_us = [0u64; 5];
        for (i, slot) in phase_avg_us.iter_mut().enumerate() {
            *slot = avg(&self.phase_total_ns[i], &self.phase_samples[i]);
        }
        MetricsSnapshot {
            phase_avg_us,
            tick_avg_us: avg(&self.tick_total_ns, &self.tick_samples),
            ticks: self.tick_samples.load(Ordering::Relaxed),
            budget_overruns: self.budget_overruns.load(Ordering::Relaxed),
            last_tick_ms: self.last_tick_ms(),
        }
    }

    fn maybe_report(&self) {
        let now = now_ms();
        let last = self.last_report_ms.load(Ordering::Relaxed);
        if now.saturating_sub(last) < self.report_interval_ms {
            return;
        }
        if self
            .last_report_ms
            .compare_exchange(last, now, Ordering::AcqRel, Ordering::Relaxed)
            .is_err()
        {
            return;
        }

        let snap = self.snapshot();
        for i in 0..5 {
            self.phase_total_ns[i].store(0, Ordering::Relaxed);
            self.phase_samples[i].store(0, Ordering::Relaxed);
        }
        self.tick_total_ns.store(0, Ordering::Relaxed);
        self.tick_samples.store(0, Ordering::Relaxed);
        self.budget_overruns.store(0, Ordering::Relaxed);

        let phases: Vec<String> = Phase::ALL
            .iter()
            .map(|p| format!("{}={}", p.name(), snap.phase_avg_us[p.index()]))
            .collect();
        log::info!(
            "[FRAME] avg_tick_us={} ticks={} overruns={} phase_avg_us({}) window={}ms",
            snap.tick_avg_us,
            snap.ticks,
            snap.budget_overruns,
            phases.join(", "),
            self.report_interval_ms
        );
    }
}
