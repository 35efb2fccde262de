//! Path: native/game_simulation/src/persistence.rs
//! Summary: ラン終了時の記録先（RunRecorder）。保存形式・保存先は外側が決める。

use std::sync::{Arc, Mutex};

use game_core::weapon::WeaponKind;
use serde::Serialize;

/// 1 ラン分の結果
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RunSummary {
    pub seed:            u64,
    pub elapsed_seconds: f32,
    pub ticks:           u64,
    pub level:           u32,
    pub exp:             u32,
    pub kill_count:      u32,
    pub bosses_defeated: u32,
    pub player_died:     bool,
}

pub trait RunRecorder: Send {
    fn record_run_end(&mut self, summary: &RunSummary);
    fn record_weapon_damage(&mut self, weapon: WeaponKind, total: u64);
}

/// 記録をメモリに溜める（テスト・ヘッドレス用）。clone したハンドルから中身を読める。
#[derive(Clone, Debug, Default)]
pub struct MemoryRecorder {
    inner: Arc<Mutex<RecordedRuns>>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct RecordedRuns {
    pub runs:          Vec<RunSummary>,
    pub weapon_damage: Vec<(WeaponKind, u64)>,
}

impl MemoryRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> RecordedRuns {
        match self.inner.lock() {
            Ok(g) => g.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn with<F: FnOnce(&mut RecordedRuns)>(&self, f: F) {
        match self.inner.lock() {
            Ok(mut g) => f(&mut g),
            Err(poisoned) => f(&mut poisoned.into_inner()),
        }
    }
}

impl RunRecorder for MemoryRecorder {
    fn record_run_end(&mut self, summary: &RunSummary) {
        self.with(|r| r.runs.push(summary.clone()));
    }

    fn record_weapon_damage(&mut self, weapon: WeaponKind, total: u64) {
        self.with(|r| r.weapon_damage.push((weapon, total)));
    }
}

/// JSON 1 行でログに出すだけ
#[derive(Clone, Copy, Debug, Default)]
pub struct LogRecorder;

impl RunRecorder for LogRecorder {
    fn record_run_end(&mut self, summary: &RunSummary) {
        match serde_json::to_string(summary) {
            Ok(json) => log::info!("run end: {json}"),
            Err(e) => log::warn!("failed to serialize run summary: {e}"),
        }
    }

    fn record_weapon_damage(&mut self, weapon: WeaponKind, total: u64) {
        log::info!("weapon damage: {}={}", weapon.name(), total);
    }
}
