//! Path: native/game_simulation/tests/scenarios.rs
//! Summary: SimulationLoop 越しのシナリオテスト（移動・持続ヒット・跳弾・ボス出現・接触判定・上限退去・並列決定論）

use game_core::attack::{AttackInstance, AttackMotion};
use game_core::entity_params::ArchetypeTable;
use game_core::enemy::Behavior;
use game_core::weapon::WeaponKind;
use game_core::SimError;
use game_simulation::{
    FrameEvent, MemoryRecorder, NullProvider, SchedulerConfig, SimConfig, SimulationLoop,
    TimestepMode,
};

fn setup() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// 通常スポーン・ボス・初期武器を切った静かな設定
fn quiet_config() -> SimConfig {
    let mut config = SimConfig::default();
    config.seed = 1;
    config.spawn.normal_spawning = false;
    config.spawn.boss_spawning = false;
    config.player.starting_weapons = Vec::new();
    config
}

/// dt をそのまま 1 ティックとして使う
fn variable_timestep(config: &mut SimConfig, max_frame_dt: f32) {
    config.timestep.mode = TimestepMode::Variable;
    config.timestep.max_frame_dt = max_frame_dt;
    config.timestep.smoothing = 1.0;
}

fn start(config: SimConfig, table: ArchetypeTable) -> SimulationLoop {
    SimulationLoop::new(config, table, &NullProvider, Box::new(MemoryRecorder::new()))
        .expect("table is valid")
}

#[test]
fn chase_enemy_moves_exactly_its_speed_toward_the_player() {
    setup();
    let mut table = ArchetypeTable::default();
    table.enemies[0].speed = 1.5;
    table.enemies[0].behavior = Behavior::Chase;
    let id = table.enemies[0].id;

    let mut config = quiet_config();
    variable_timestep(&mut config, 1.0);
    let mut sim = start(config, table);

    let (px, py) = {
        let w = sim.read_world().unwrap();
        (w.player.x, w.player.y)
    };
    let uid = sim.spawn_enemy_at(id, px + 300.0, py).unwrap();

    assert_eq!(sim.advance_frame(1.0).unwrap(), 1);

    let w = sim.read_world().unwrap();
    let slot = w.enemies.slot_of_uid(uid).expect("enemy still alive");
    assert!((w.enemies.positions_x[slot] - (px + 298.5)).abs() < 1e-3);
    assert!((w.enemies.positions_y[slot] - py).abs() < 1e-3);
}

#[test]
fn persistent_aura_hits_once_per_retrigger_interval() {
    setup();
    let mut table = ArchetypeTable::default();
    let boss_id = table.bosses[0].stats.id;
    {
        // 動かず・撃たず・死なない的
        let target = &mut table.bosses[0].stats;
        target.speed = 0.0;
        target.max_hp = 100_000;
        target.contact_damage = 0;
        target.projectile = None;
        target.avoidance = 0.0;
    }

    let mut config = quiet_config();
    config.player.starting_weapons = vec![WeaponKind::Garlic];
    config.timestep.mode = TimestepMode::Fixed;
    config.timestep.tick_secs = 0.05;
    let mut sim = start(config, table);

    let (px, py) = {
        let w = sim.read_world().unwrap();
        (w.player.x, w.player.y)
    };
    let uid = sim.spawn_enemy_at(boss_id, px + 30.0, py).unwrap();

    let mut ticks = 0;
    for _ in 0..20 {
        ticks += sim.advance_frame(0.05).unwrap();
    }
    assert_eq!(ticks, 20);

    let hits: Vec<i32> = sim
        .drain_frame_events()
        .unwrap()
        .into_iter()
        .filter_map(|e| match e {
            FrameEvent::DamageNumber { amount, to_player: false, .. } => Some(amount),
            _ => None,
        })
        .collect();
    assert_eq!(hits.len(), 5, "hits: {hits:?}");
    assert!(hits.iter().all(|&d| (4..=6).contains(&d)));

    let w = sim.read_world().unwrap();
    let slot = w.enemies.slot_of_uid(uid).expect("target survives");
    assert_eq!(100_000 - w.enemies.hp[slot], hits.iter().sum::<i32>());
}

#[test]
fn ricochet_expires_on_the_third_boundary_contact() {
    setup();
    let mut sim = start(quiet_config(), ArchetypeTable::default());

    {
        let mut w = sim.write_world().unwrap();
        let (x, y, now) = (w.player.x, w.player.y, w.now_ms);
        let axe = AttackInstance::new(
            WeaponKind::Axe,
            x, y,
            14.0, 14.0,
            25,
            0.0,
            now,
            4000.0,
            WeaponKind::Axe.hit_policy(),
            AttackMotion::Ricochet { vx: 3000.0, vy: 0.0, bounces_left: 2, trail: Vec::new() },
        );
        w.attacks.push(axe);
    }

    // 1 ティック 1500px 動くので毎ティック左右どちらかの端に当たる
    let bounces_after = |sim: &SimulationLoop| -> Option<i32> {
        let w = sim.read_world().unwrap();
        w.attacks.attacks.first().map(|a| match a.motion {
            AttackMotion::Ricochet { bounces_left, .. } => bounces_left,
            _ => unreachable!("only the axe was added"),
        })
    };

    sim.step(0.5).unwrap();
    assert_eq!(bounces_after(&sim), Some(1));
    sim.step(0.5).unwrap();
    assert_eq!(bounces_after(&sim), Some(0));
    sim.step(0.5).unwrap();
    assert_eq!(bounces_after(&sim), None);
}

#[test]
fn scheduled_boss_spawns_exactly_once_per_run() {
    setup();
    let mut table = ArchetypeTable::default();
    table.bosses.truncate(1);
    table.bosses[0].spawn_time_secs = Some(60.0);
    table.bosses[0].stats.contact_damage = 0;
    table.bosses[0].stats.projectile = None;
    let boss_id = table.bosses[0].stats.id;

    let mut config = quiet_config();
    config.spawn.boss_spawning = true;
    config.player.max_hp = 1_000_000;
    variable_timestep(&mut config, 1.0);
    let mut sim = start(config, table);

    let mut spawned = Vec::new();
    loop {
        assert_eq!(sim.advance_frame(0.5).unwrap(), 1);
        for e in sim.drain_frame_events().unwrap() {
            if let FrameEvent::BossSpawned { archetype_id } = e {
                let t = sim.read_world().unwrap().elapsed_seconds;
                spawned.push((archetype_id, t));
            }
        }
        if sim.read_world().unwrap().elapsed_seconds >= 600.0 {
            break;
        }
    }

    assert_eq!(spawned.len(), 1, "{spawned:?}");
    assert_eq!(spawned[0].0, boss_id);
    assert!(spawned[0].1 >= 60.0);
    assert_eq!(sim.read_world().unwrap().enemies.boss_count(), 1);
}

#[test]
fn boss_spawned_early_is_not_spawned_again_by_the_schedule() {
    setup();
    let mut table = ArchetypeTable::default();
    table.bosses.truncate(1);
    table.bosses[0].spawn_time_secs = Some(60.0);
    table.bosses[0].stats.contact_damage = 0;
    table.bosses[0].stats.projectile = None;
    let boss_id = table.bosses[0].stats.id;

    let mut config = quiet_config();
    config.spawn.boss_spawning = true;
    config.player.max_hp = 1_000_000;
    variable_timestep(&mut config, 1.0);
    let mut sim = start(config, table);

    assert_eq!(sim.request_spawns(&[boss_id]).unwrap(), 1);
    assert!(matches!(
        sim.spawn_enemy_at(boss_id, 0.0, 0.0),
        Err(SimError::BossAlreadySpawned { id }) if id == boss_id
    ));
    assert_eq!(sim.request_spawns(&[boss_id]).unwrap(), 0);

    let mut announced = 0;
    while sim.read_world().unwrap().elapsed_seconds < 120.0 {
        sim.advance_frame(0.5).unwrap();
        announced += sim
            .drain_frame_events()
            .unwrap()
            .iter()
            .filter(|e| matches!(e, FrameEvent::BossSpawned { .. }))
            .count();
    }
    assert_eq!(announced, 1);
    assert_eq!(sim.read_world().unwrap().enemies.boss_count(), 1);
}

#[test]
fn wide_boss_overlapping_the_player_deals_contact_damage() {
    setup();
    let mut table = ArchetypeTable::default();
    let boss_id = table.bosses[0].stats.id;
    {
        let boss = &mut table.bosses[0].stats;
        boss.radius = 100.0;
        boss.speed = 0.0;
        boss.contact_damage = 10;
        boss.projectile = None;
    }

    let mut config = quiet_config();
    config.player.avoidance = 0.0;
    config.player.defense = 0;
    config.timestep.mode = TimestepMode::Fixed;
    config.timestep.tick_secs = 0.05;
    let mut sim = start(config, table);

    let (px, py, before) = {
        let w = sim.read_world().unwrap();
        (w.player.x, w.player.y, w.player.hp)
    };
    // 中心間 110 < 100 + プレイヤー半径
    sim.spawn_enemy_at(boss_id, px + 110.0, py).unwrap();
    // 無敵時間内なので 1 回だけ
    for _ in 0..6 {
        sim.advance_frame(0.05).unwrap();
    }
    assert_eq!(sim.read_world().unwrap().player.hp, before - 10);
}

#[test]
fn full_population_evicts_only_offscreen_enemies() {
    setup();
    let table = ArchetypeTable::default();
    let id = table.enemies[0].id;
    let mut config = quiet_config();
    config.spawn.base_cap = 100;
    config.spawn.cap_per_level = 0;
    let sim = start(config, table);

    let (px, py) = {
        let w = sim.read_world().unwrap();
        (w.player.x, w.player.y)
    };
    let mut onscreen = Vec::new();
    for i in 0..70 {
        let dx = (i % 10) as f32 * 40.0 - 180.0;
        let dy = (i / 10) as f32 * 40.0 - 120.0;
        onscreen.push(sim.spawn_enemy_at(id, px + dx, py + dy).unwrap());
    }
    let mut offscreen = Vec::new();
    for i in 0..30 {
        let x = px + 1000.0 + i as f32 * 20.0;
        offscreen.push(sim.spawn_enemy_at(id, x, py).unwrap());
    }

    assert_eq!(sim.request_spawns(&[id; 5]).unwrap(), 5);

    let w = sim.read_world().unwrap();
    assert_eq!(w.enemies.live_non_boss(), 100);
    assert!(onscreen.iter().all(|&uid| w.enemies.slot_of_uid(uid).is_some()));
    let survivors = offscreen.iter().filter(|&&uid| w.enemies.slot_of_uid(uid).is_some()).count();
    assert_eq!(survivors, 25);
    // 遠い順に退去する
    assert!(offscreen[25..].iter().all(|&uid| w.enemies.slot_of_uid(uid).is_none()));
}

fn trajectory(parallel: bool) -> (Vec<(u32, f32, f32, i32)>, i32, u32) {
    let mut config = SimConfig::default();
    config.seed = 7;
    config.scheduler = SchedulerConfig {
        parallel_enabled:   parallel,
        max_workers:        4,
        parallel_threshold: 1,
    };
    config.player.starting_weapons = vec![WeaponKind::Whip, WeaponKind::Garlic, WeaponKind::Axe];
    let mut sim = start(config, ArchetypeTable::default());
    sim.set_player_input(0.7, -0.2).unwrap();

    for _ in 0..900 {
        sim.advance_frame(1.0 / 60.0).unwrap();
        sim.drain_frame_events().unwrap();
        sim.drain_loot().unwrap();
    }

    let w = sim.read_world().unwrap();
    let e = &w.enemies;
    let enemies = (0..e.len())
        .filter(|&i| e.alive[i])
        .map(|i| (e.uid[i], e.positions_x[i], e.positions_y[i], e.hp[i]))
        .collect();
    (enemies, w.player.hp, w.kill_count)
}

#[test]
fn parallel_and_sequential_runs_are_identical() {
    setup();
    let sequential = trajectory(false);
    let parallel = trajectory(true);
    assert!(!sequential.0.is_empty());
    assert_eq!(sequential, parallel);
}

#[test]
fn finished_run_is_recorded_once() {
    setup();
    let recorder = MemoryRecorder::new();
    let mut config = SimConfig::default();
    config.seed = 3;
    let mut sim = SimulationLoop::new(
        config,
        ArchetypeTable::default(),
        &NullProvider,
        Box::new(recorder.clone()),
    )
    .unwrap();
    for _ in 0..120 {
        sim.advance_frame(1.0 / 60.0).unwrap();
    }
    let summary = sim.finish_run().unwrap().expect("first finish records");
    assert!(sim.finish_run().unwrap().is_none());

    let recorded = recorder.snapshot();
    assert_eq!(recorded.runs, vec![summary]);
    assert_eq!(recorded.runs[0].seed, 3);
    assert!(recorded.runs[0].ticks >= 119);
}
