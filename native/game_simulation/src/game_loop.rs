//! Path: native/game_simulation/src/game_loop.rs
//! Summary: SimulationLoop（フレーム駆動・入力・スナップショット・イベント drain・ラン終了記録）

use std::sync::{Arc, RwLockReadGuard, RwLockWriteGuard};
use std::thread;
use std::time::{Duration, Instant};

use game_core::entity_params::{ArchetypeTable, BOSS_ID_MIN};
use game_core::physics::spatial_hash::StaticObstacle;
use game_core::spawn::SpawnRequest;
use game_core::weapon::{Modifiers, WeaponKind};
use game_core::{SimError, SimResult};

use crate::asset::{AssetRegistry, ResourceProvider};
use crate::config::SimConfig;
use crate::frame_clock::FrameClock;
use crate::frame_metrics::FrameMetrics;
use crate::game_logic::systems::spawn::admit_spawns;
use crate::game_logic::{
    compute_weapon_choices, drain_frame_events_inner, drain_loot_inner, physics_step_inner,
    StepContext,
};
use crate::persistence::{RunRecorder, RunSummary};
use crate::render_snapshot::{build_render_frame, RenderFrame};
use crate::scheduler::ConcurrencyScheduler;
use crate::world::{FrameEvent, GameLoopControl, GameWorld, GameWorldInner, LootEvent};

pub struct SimulationLoop {
    world:     Arc<GameWorld>,
    table:     ArchetypeTable,
    assets:    AssetRegistry,
    scheduler: ConcurrencyScheduler,
    clock:     FrameClock,
    metrics:   FrameMetrics,
    control:   Arc<GameLoopControl>,
    recorder:  Box<dyn RunRecorder>,
    seed:      u64,
    finished:  bool,
}

impl SimulationLoop {
    /// アーキタイプ表が空なら起動しない
    pub fn new(
        config: SimConfig,
        table: ArchetypeTable,
        provider: &dyn ResourceProvider,
        recorder: Box<dyn RunRecorder>,
    ) -> SimResult<Self> {
        table.validate()?;
        let assets = AssetRegistry::preload(provider, &table);
        let scheduler = ConcurrencyScheduler::new(&config.scheduler);
        let world = GameWorld::new(GameWorldInner::new(&config, &table));
        log::info!(
            "simulation start: seed={} timestep={:?} enemies={} bosses={}",
            config.seed,
            config.timestep.mode,
            table.enemies.len(),
            table.bosses.len()
        );

        Ok(Self {
            world: Arc::new(world),
            table,
            assets,
            scheduler,
            clock: FrameClock::new(config.timestep.clone()),
            metrics: FrameMetrics::default(),
            control: Arc::new(GameLoopControl::new()),
            recorder,
            seed: config.seed,
            finished: false,
        })
    }

    /// 実時間 `raw_dt`（秒）を与えて必要なティック数だけ進める。一時停止中・死亡後は何もしない。
    pub fn advance_frame(&mut self, raw_dt: f32) -> SimResult<u32> {
        if self.control.is_paused() {
            return Ok(0);
        }
        let mut w = self.world.write()?;
        if w.player.is_dead() {
            return Ok(0);
        }
        let plan = self.clock.advance(raw_dt);
        let ctx = StepContext { table: &self.table, scheduler: &self.scheduler, metrics: &self.metrics };
        let mut ran = 0;
        for _ in 0..plan.ticks {
            physics_step_inner(&mut w, &ctx, plan.dt);
            ran += 1;
            if w.player.is_dead() {
                break;
            }
        }
        Ok(ran)
    }

    /// クロックを通さずに 1 ティックだけ進める
    pub fn step(&mut self, dt: f32) -> SimResult<()> {
        let mut w = self.world.write()?;
        let ctx = StepContext { table: &self.table, scheduler: &self.scheduler, metrics: &self.metrics };
        physics_step_inner(&mut w, &ctx, dt);
        Ok(())
    }

    /// 指定の実時間の間、`tick_hz` で advance_frame を呼び続ける（`keep_going` が false で終了）
    pub fn run_realtime<F>(&mut self, tick_hz: f64, mut keep_going: F) -> SimResult<()>
    where
        F: FnMut(&mut Self) -> bool,
    {
        let tick = Duration::from_secs_f64(1.0 / tick_hz.max(1.0));
        let mut next_tick = Instant::now();
        let mut last = Instant::now();
        while keep_going(self) {
            next_tick += tick;
            let now = Instant::now();
            if next_tick > now {
                thread::sleep(next_tick - now);
            }
            let now = Instant::now();
            let dt = (now - last).as_secs_f32();
            last = now;
            self.advance_frame(dt)?;
        }
        Ok(())
    }

    pub fn render_frame(&self) -> SimResult<RenderFrame> {
        let w = self.world.read()?;
        Ok(build_render_frame(&w, &self.assets, self.clock.alpha()))
    }

    pub fn drain_frame_events(&self) -> SimResult<Vec<FrameEvent>> {
        let mut w = self.world.write()?;
        Ok(drain_frame_events_inner(&mut w))
    }

    pub fn drain_loot(&self) -> SimResult<Vec<LootEvent>> {
        let mut w = self.world.write()?;
        Ok(drain_loot_inner(&mut w))
    }

    // ─── 入力・UI からの操作 ─────────────────────────────────────

    pub fn set_player_input(&self, dx: f32, dy: f32) -> SimResult<()> {
        let mut w = self.world.write()?;
        w.player.input_dx = dx;
        w.player.input_dy = dy;
        Ok(())
    }

    pub fn set_aim(&self, aim: Option<(f32, f32)>) -> SimResult<()> {
        self.world.write()?.player.aim = aim;
        Ok(())
    }

    /// 追加またはレベルアップ。変化が無ければ false。
    pub fn add_weapon(&self, kind: WeaponKind) -> SimResult<bool> {
        Ok(self.world.write()?.player.add_or_upgrade_weapon(kind))
    }

    pub fn weapon_choices(&self) -> SimResult<Vec<WeaponKind>> {
        Ok(compute_weapon_choices(&self.world.read()?.player))
    }

    pub fn set_modifiers(&self, modifiers: Modifiers) -> SimResult<()> {
        self.world.write()?.player.modifiers = modifiers;
        Ok(())
    }

    pub fn set_obstacles(&self, obstacles: &[StaticObstacle]) -> SimResult<()> {
        self.world.write()?.set_obstacles(obstacles);
        Ok(())
    }

    /// 指定位置に 1 体置く（上限チェックなし）。uid を返す。
    /// ボス ID はこのランで一度きりで、出現済みなら `BossAlreadySpawned`。
    pub fn spawn_enemy_at(&self, archetype_id: u16, x: f32, y: f32) -> SimResult<u32> {
        let mut w = self.world.write()?;
        let is_boss = archetype_id >= BOSS_ID_MIN;
        if is_boss && !w.spawn.claim_boss(archetype_id) {
            return Err(SimError::BossAlreadySpawned { id: archetype_id });
        }
        let params = self.table.stats(archetype_id);
        let now = w.elapsed_seconds;
        let slot = w.enemies.spawn(params, is_boss, x, y, now);
        Ok(w.enemies.uid[slot])
    }

    /// 通常のスポーン経路（上限・退去・画面外配置）で追加する。生成数を返す。
    /// 出現済みのボス ID は黙って落とす。
    pub fn request_spawns(&self, archetype_ids: &[u16]) -> SimResult<usize> {
        let mut w = self.world.write()?;
        let mut requests = Vec::with_capacity(archetype_ids.len());
        for &id in archetype_ids {
            let is_boss = id >= BOSS_ID_MIN;
            if is_boss && !w.spawn.claim_boss(id) {
                log::warn!("boss {id} already spawned this run; request dropped");
                continue;
            }
            requests.push(SpawnRequest { archetype_id: id, is_boss });
        }
        Ok(admit_spawns(&mut w, &self.table, &requests).len())
    }

    // ─── 制御 ────────────────────────────────────────────────

    pub fn pause(&self) {
        self.control.pause();
    }

    pub fn resume(&self) {
        self.control.resume();
    }

    pub fn is_paused(&self) -> bool {
        self.control.is_paused()
    }

    /// 別スレッドから pause/resume するためのハンドル
    pub fn control(&self) -> Arc<GameLoopControl> {
        Arc::clone(&self.control)
    }

    /// ラン結果と武器ごとの累計ダメージを記録する（2 回目以降は None）
    pub fn finish_run(&mut self) -> SimResult<Option<RunSummary>> {
        if self.finished {
            return Ok(None);
        }
        let w = self.world.read()?;
        let summary = RunSummary {
            seed:            self.seed,
            elapsed_seconds: w.elapsed_seconds,
            ticks:           w.tick,
            level:           w.player.level,
            exp:             w.player.exp,
            kill_count:      w.kill_count,
            bosses_defeated: w.bosses_defeated,
            player_died:     w.player.is_dead(),
        };
        let mut totals: Vec<(WeaponKind, u64)> = w.weapon_damage.iter().map(|(&k, &v)| (k, v)).collect();
        drop(w);
        totals.sort();

        self.recorder.record_run_end(&summary);
        for (kind, total) in totals {
            self.recorder.record_weapon_damage(kind, total);
        }
        self.finished = true;
        log::info!(
            "run finished: t={:.1}s level={} kills={} died={}",
            summary.elapsed_seconds,
            summary.level,
            summary.kill_count,
            summary.player_died
        );
        Ok(Some(summary))
    }

    // ─── 参照 ────────────────────────────────────────────────

    pub fn world(&self) -> &Arc<GameWorld> {
        &self.world
    }

    pub fn read_world(&self) -> SimResult<RwLockReadGuard<'_, GameWorldInner>> {
        self.world.read()
    }

    pub fn write_world(&self) -> SimResult<RwLockWriteGuard<'_, GameWorldInner>> {
        self.world.write()
    }

    pub fn table(&self) -> &ArchetypeTable {
        &self.table
    }

    pub fn assets(&self) -> &AssetRegistry {
        &self.assets
    }

    pub fn scheduler(&self) -> &ConcurrencyScheduler {
        &self.scheduler
    }

    pub fn metrics(&self) -> &FrameMetrics {
        &self.metrics
    }
}
