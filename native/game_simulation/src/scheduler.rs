//! Path: native/game_simulation/src/scheduler.rs
//! Summary: フェーズ単位の並列実行（rayon ThreadPool）と逐次フォールバック
//!
//! ワーカーは読み取り専用の入力から 1 要素につき 1 結果を返すだけ。ワールドの変更は
//! 呼び出し側が結果を入力順に適用する逐次ステップで行うので、並列の有無で結果は変わらない。

use std::cell::Cell;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};

use rayon::prelude::*;

use crate::config::SchedulerConfig;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    EnemyMovement,
    ProjectileUpdate,
    AttackUpdate,
    CollisionCheck,
    ParticleUpdate,
}

impl Phase {
    pub const ALL: [Phase; 5] = [
        Phase::EnemyMovement,
        Phase::ProjectileUpdate,
        Phase::AttackUpdate,
        Phase::CollisionCheck,
        Phase::ParticleUpdate,
    ];

    pub fn index(self) -> usize {
        match self {
            Phase::EnemyMovement    => 0,
            Phase::ProjectileUpdate => 1,
            Phase::AttackUpdate     => 2,
            Phase::CollisionCheck   => 3,
            Phase::ParticleUpdate   => 4,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Phase::EnemyMovement    => "enemy_movement",
            Phase::ProjectileUpdate => "projectile_update",
            Phase::AttackUpdate     => "attack_update",
            Phase::CollisionCheck   => "collision_check",
            Phase::ParticleUpdate   => "particle_update",
        }
    }
}

pub const WORKER_THREAD_PREFIX: &str = "sim-worker";

thread_local! {
    /// ワーカーのチャンク実行中は true（入れ子の fan-out を逐次にする）
    static IN_PHASE_WORKER: Cell<bool> = const { Cell::new(false) };
}

struct WorkerGuard {
    prev: bool,
}

impl WorkerGuard {
    fn enter() -> Self {
        let prev = IN_PHASE_WORKER.with(|c| c.replace(true));
        Self { prev }
    }
}

impl Drop for WorkerGuard {
    fn drop(&mut self) {
        let prev = self.prev;
        IN_PHASE_WORKER.with(|c| c.set(prev));
    }
}

pub struct ConcurrencyScheduler {
    pool:      Option<rayon::ThreadPool>,
    workers:   usize,
    threshold: usize,
    /// ワーカーが panic したフェーズはラン終了まで逐次
    disabled:  [AtomicBool; 5],
}

impl ConcurrencyScheduler {
    pub fn new(config: &SchedulerConfig) -> Self {
        let available = std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1);
        let workers = available.min(config.max_workers).max(1);

        let pool = if config.parallel_enabled && workers > 1 {
            match rayon::ThreadPoolBuilder::new()
                .num_threads(workers)
                .thread_name(|i| format!("{WORKER_THREAD_PREFIX}-{i}"))
                .build()
            {
                Ok(pool) => Some(pool),
                Err(e) => {
                    log::warn!("failed to build worker pool, running sequentially: {e}");
                    None
                }
            }
        } else {
            None
        };

        log::info!(
            "scheduler: parallel={} workers={} threshold={}",
            pool.is_some(),
            workers,
            config.parallel_threshold
        );

        Self {
            pool,
            workers,
            threshold: config.parallel_threshold,
            disabled: Default::default(),
        }
    }

    /// 常に逐次で動くスケジューラ（テスト・ベンチの比較用）
    pub fn sequential() -> Self {
        Self::new(&SchedulerConfig { parallel_enabled: false, ..SchedulerConfig::default() })
    }

    pub fn is_parallel(&self) -> bool {
        self.pool.is_some()
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn is_phase_disabled(&self, phase: Phase) -> bool {
        self.disabled[phase.index()].load(Ordering::Relaxed)
    }

    fn should_fan_out(&self, phase: Phase, len: usize) -> bool {
        self.pool.is_some()
            && len >= self.threshold.max(1)
            && !self.is_phase_disabled(phase)
            && !IN_PHASE_WORKER.with(|c| c.get())
    }

    /// `items` の各要素に `f` を適用し、入力順の結果を返す。
    ///
    /// 閾値未満・無効・入れ子・panic 後のフェーズは逐次。並列時は `ceil(len / workers)` の
    /// 連続チャンクに分ける。どれかのチャンクが panic したらフェーズ全体を逐次でやり直す。
    pub fn map_phase<T, R, F>(&self, phase: Phase, items: &[T], f: F) -> Vec<R>
    where
        T: Sync,
        R: Send,
        F: Fn(&T) -> R + Sync,
    {
        let pool = match &self.pool {
            Some(pool) if self.should_fan_out(phase, items.len()) => pool,
            _ => return items.iter().map(&f).collect(),
        };

        let chunk_len = items.len().div_ceil(self.workers).max(1);
        let chunks: Vec<std::thread::Result<Vec<R>>> = pool.install(|| {
            items
                .par_chunks(chunk_len)
                .map(|chunk| {
                    catch_unwind(AssertUnwindSafe(|| {
                        let _guard = WorkerGuard::enter();
                        chunk.iter().map(&f).collect::<Vec<R>>()
                    }))
                })
                .collect()
        });

        let mut out = Vec::with_capacity(items.len());
        for chunk in chunks {
            match chunk {
                Ok(results) => out.extend(results),
                Err(_) => {
                    self.disabled[phase.index()].store(true, Ordering::Relaxed);
                    log::error!(
                        "worker panicked in phase {}; re-running sequentially and disabling parallelism for it",
                        phase.name()
                    );
                    return items.iter().map(&f).collect();
                }
            }
        }
        out
    }
}
