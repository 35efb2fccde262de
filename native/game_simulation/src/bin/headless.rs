//! Path: native/game_simulation/src/bin/headless.rs
//! Summary: 描画なしでサバイバル時間分のシミュレーションを回し、結果をログに出す

use std::process::ExitCode;

use clap::Parser;
use game_core::entity_params::ArchetypeTable;
use game_core::SimResult;
use game_simulation::{DirectoryProvider, FrameEvent, LogRecorder, SimConfig, SimulationLoop};

#[derive(Debug, Parser)]
#[command(name = "headless", about = "Run the simulation without a window and log the result")]
struct Args {
    /// SimConfig の JSON（省略時はデフォルト）
    #[arg(long, value_name = "PATH")]
    config: Option<String>,
    /// アーキタイプ表の JSON
    #[arg(long, value_name = "PATH")]
    archetypes: Option<String>,
    /// 回すシミュレーション時間（秒）
    #[arg(long, value_name = "SECONDS", default_value_t = 180.0)]
    secs: f32,
    #[arg(long)]
    seed: Option<u64>,
    /// 実時間に合わせてスリープしながら回す
    #[arg(long)]
    realtime: bool,
}

fn run(args: Args) -> SimResult<()> {
    let mut config = match &args.config {
        Some(path) => SimConfig::load(path)?,
        None => SimConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    config.apply_env_overrides();

    let table = match &args.archetypes {
        Some(path) => {
            let text = std::fs::read_to_string(path).map_err(|source| game_core::SimError::Io {
                path: path.clone(),
                source,
            })?;
            ArchetypeTable::from_json_str(&text)?
        }
        None => ArchetypeTable::default(),
    };

    let tick = config.timestep.tick_secs;
    let mut sim = SimulationLoop::new(config, table, &DirectoryProvider::new(), Box::new(LogRecorder))?;
    sim.set_player_input(0.6, 0.3)?;

    let target = args.secs;
    let mut kills = 0usize;
    let mut drain = |sim: &mut SimulationLoop| -> SimResult<bool> {
        for e in sim.drain_frame_events()? {
            match e {
                FrameEvent::EnemyKilled { .. } => kills += 1,
                FrameEvent::BossSpawned { archetype_id } => log::info!("boss {archetype_id} appeared"),
                FrameEvent::LevelUp { new_level } => {
                    let choices = sim.weapon_choices()?;
                    log::info!("level {new_level}; choices {:?}", choices);
                    if let Some(&kind) = choices.first() {
                        sim.add_weapon(kind)?;
                    }
                }
                FrameEvent::PlayerDied => return Ok(false),
                _ => {}
            }
        }
        sim.drain_loot()?;
        let elapsed = sim.read_world()?.elapsed_seconds;
        Ok(elapsed < target)
    };

    if args.realtime {
        let mut failure = None;
        sim.run_realtime(1.0 / tick as f64, |s| match drain(s) {
            Ok(go) => go,
            Err(e) => {
                failure = Some(e);
                false
            }
        })?;
        if let Some(e) = failure {
            return Err(e);
        }
    } else {
        while drain(&mut sim)? {
            sim.advance_frame(tick)?;
        }
    }

    let snap = sim.metrics().snapshot();
    log::info!(
        "headless done: kills={} avg_tick_us={} overruns={} parallel={} workers={}",
        kills,
        snap.tick_avg_us,
        snap.budget_overruns,
        sim.scheduler().is_parallel(),
        sim.scheduler().workers()
    );
    sim.finish_run()?;
    Ok(())
}

fn main() -> ExitCode {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).try_init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("headless run failed: {e}");
            ExitCode::FAILURE
        }
    }
}
