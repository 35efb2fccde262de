//! Path: native/game_core/src/boss.rs
//! Summary: ボス出現スケジュール（表の順番どおり、各 ID は 1 ラン 1 回まで）

use rustc_hash::FxHashSet;

use crate::entity_params::ArchetypeTable;

/// ボス出現カーソル。`poll` が返した ID と `claim` 済みの ID は二度と返らない。
#[derive(Clone, Debug)]
pub struct BossSchedule {
    /// (出現時刻, ボス ID) 出現時刻順
    entries:  Vec<(f32, u16)>,
    cursor:   usize,
    /// このランで出現済みの ID（スケジュール外の生成も含む）
    released: FxHashSet<u16>,
}

impl BossSchedule {
    pub fn new(table: &ArchetypeTable) -> Self {
        let mut entries: Vec<(f32, u16)> = table
            .bosses
            .iter()
            .enumerate()
            .filter_map(|(i, b)| table.boss_spawn_time(i).map(|t| (t, b.stats.id)))
            .collect();
        // 同時刻は表の順番を保つ（安定ソート）
        entries.sort_by(|a, b| a.0.total_cmp(&b.0));
        Self { entries, cursor: 0, released: FxHashSet::default() }
    }

    /// 経過時間が出現時刻に達したボス ID を取り出す（大きく時間が飛んだ場合は複数）
    pub fn poll(&mut self, elapsed_secs: f32) -> Vec<u16> {
        let mut due = Vec::new();
        while let Some(&(at, id)) = self.entries.get(self.cursor) {
            if elapsed_secs < at {
                break;
            }
            self.cursor += 1;
            if self.released.insert(id) {
                due.push(id);
            }
        }
        due
    }

    /// スケジュール外で出す前に呼ぶ。既に出現済みなら false。
    pub fn claim(&mut self, id: u16) -> bool {
        self.released.insert(id)
    }

    pub fn next_spawn_time(&self) -> Option<f32> {
        self.entries
            .iter()
            .skip(self.cursor)
            .find(|(_, id)| !self.released.contains(id))
            .map(|&(t, _)| t)
    }

    pub fn spawned_count(&self) -> usize {
        self.released.len()
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.entries.len()
    }
}
