//! Path: native/game_core/src/spawn.rs
//! Summary: スポーン方針（出現頻度・バッチサイズ・ボス出現・人口上限と退去計画）

use crate::boss::BossSchedule;
use crate::constants::{
    MAX_SPAWN_BATCH, SPAWN_THRESHOLD_FLOOR, SPAWN_THRESHOLD_START, SURVIVAL_WINDOW_SECS,
};
use crate::entity_params::ArchetypeTable;
use crate::physics::rng::SimpleRng;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpawnRequest {
    pub archetype_id: u16,
    pub is_boss:      bool,
}

/// 出現頻度倍率（後半ほど高い）
pub fn spawn_frequency(elapsed_secs: f32) -> f32 {
    1.0 + elapsed_secs / 60.0
}

/// アキュムレータの閾値（時間とともに下がり、下限あり）
pub fn spawn_threshold(elapsed_secs: f32) -> f32 {
    (SPAWN_THRESHOLD_START - elapsed_secs * 0.012).max(SPAWN_THRESHOLD_FLOOR)
}

/// バッチサイズ: 序盤は `1 + floor(t/10)`、ラン 1/3 以降は超線形項を加える。常に 1..=8。
pub fn batch_size(elapsed_secs: f32, run_secs: f32) -> usize {
    let t = elapsed_secs.max(0.0);
    let base = 1.0 + (t / 10.0).floor();
    let third = run_secs / 3.0;
    let size = if t < third {
        base
    } else {
        base + ((t - third) / 30.0).powf(1.5).floor()
    };
    (size as usize).clamp(1, MAX_SPAWN_BATCH)
}

/// 人口上限（ボスは数えない）
pub fn population_cap(base_cap: usize, cap_per_level: usize, level: u32) -> usize {
    base_cap + cap_per_level * level.saturating_sub(1) as usize
}

/// 上限を超えないための退去計画
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Admission {
    /// 退去させるスロット（遠い順）
    pub evict: Vec<usize>,
    /// 実際に生成してよい数
    pub admit: usize,
}

/// `wanted` 体を追加したい。`offscreen` は画面外かつ非ボスの (スロット, 距離²)。
/// 空きが足りなければ遠い順に退去させ、それでも足りなければ生成数を削る。
pub fn plan_admission(
    wanted: usize,
    live_non_boss: usize,
    cap: usize,
    offscreen: &[(usize, f32)],
) -> Admission {
    let room = cap.saturating_sub(live_non_boss);
    if wanted <= room {
        return Admission { evict: Vec::new(), admit: wanted };
    }
    let need = wanted - room;
    let mut sorted: Vec<(usize, f32)> = offscreen.to_vec();
    // 距離が同じならスロット番号順（決定論のため）
    sorted.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
    let evict: Vec<usize> = sorted.iter().take(need).map(|&(slot, _)| slot).collect();
    let admit = room + evict.len();
    Admission { evict, admit }
}

/// 通常敵のアキュムレータとボスのカーソル、カリング分の再補充を管理する
#[derive(Clone, Debug)]
pub struct SpawnPolicy {
    accumulator:    f32,
    bosses:         BossSchedule,
    repop_debt:     usize,
    run_secs:       f32,
    pub normal_enabled: bool,
    pub boss_enabled:   bool,
}

impl SpawnPolicy {
    pub fn new(table: &ArchetypeTable) -> Self {
        Self {
            accumulator:    0.0,
            bosses:         BossSchedule::new(table),
            repop_debt:     0,
            run_secs:       SURVIVAL_WINDOW_SECS,
            normal_enabled: true,
            boss_enabled:   true,
        }
    }

    pub fn with_run_secs(mut self, run_secs: f32) -> Self {
        self.run_secs = run_secs;
        self
    }

    /// 距離カリングで消えた分。次のスポーン判定で新しく抽選し直して補充する。
    pub fn add_repopulation_debt(&mut self, n: usize) {
        if self.normal_enabled {
            self.repop_debt += n;
        }
    }

    pub fn repopulation_debt(&self) -> usize {
        self.repop_debt
    }

    /// スケジュール外でボスを出す前に呼ぶ。このランで既に出ていれば false。
    pub fn claim_boss(&mut self, id: u16) -> bool {
        self.bosses.claim(id)
    }

    pub fn next_boss_time(&self) -> Option<f32> {
        self.bosses.next_spawn_time()
    }

    /// このティックで要求するスポーン（ボスが先頭）。上限チェックは呼び出し側で行う。
    pub fn decide_spawns(
        &mut self,
        elapsed_secs: f32,
        dt: f32,
        table: &ArchetypeTable,
        rng: &mut SimpleRng,
    ) -> Vec<SpawnRequest> {
        let mut out = Vec::new();

        if self.boss_enabled {
            for id in self.bosses.poll(elapsed_secs) {
                log::debug!("boss {id} due at {elapsed_secs:.1}s");
                out.push(SpawnRequest { archetype_id: id, is_boss: true });
            }
        }

        if !self.normal_enabled {
            return out;
        }

        let mut count = 0;
        self.accumulator += spawn_frequency(elapsed_secs) * dt;
        let threshold = spawn_threshold(elapsed_secs);
        if self.accumulator >= threshold {
            self.accumulator -= threshold;
            count += batch_size(elapsed_secs, self.run_secs);
        }

        if self.repop_debt > 0 {
            let repay = self.repop_debt.min(MAX_SPAWN_BATCH);
            self.repop_debt -= repay;
            count += repay;
        }

        for _ in 0..count {
            out.push(SpawnRequest {
                archetype_id: table.roll_archetype(elapsed_secs, rng),
                is_boss: false,
            });
        }
        out
    }
}
