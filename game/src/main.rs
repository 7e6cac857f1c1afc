use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use engine::HeadlessRunner;
use game::config::{ConfigStore, GameConfig};
use game::floor::HudLayout;
use game::logic::{CavernLogic, SessionInput};
use game::pile::{DigInput, PileEvent};
use game::session::{GameOverState, SessionEvent};
use log::info;
use serde::Serialize;

#[derive(Debug, Parser)]
#[command(name = "cavern")]
#[command(about = "Headless driver for the cavern dig & floor core")]
struct Cli {
    /// Config file; defaults to $CAVERN_CONFIG_PATH or ~/.config/cavern/config.json.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run a scripted session and print a JSON summary.
    Simulate {
        #[arg(long, default_value_t = 30.0)]
        seconds: f32,
        #[arg(long, default_value_t = 1.0 / 60.0)]
        dt: f32,
        /// Seconds between mine hits; 0 disables mines.
        #[arg(long, default_value_t = 2.0)]
        mine_every: f32,
        /// Buy floor reinforcement at the start of every floor.
        #[arg(long, default_value_t = false)]
        reinforce: bool,
    },
    /// Print the effective configuration.
    Config,
}

#[derive(Debug, Serialize)]
struct Summary {
    frames: usize,
    floor: u32,
    oxygen: f32,
    decay_rate: f32,
    lava_volume: f32,
    prizes_unearthed: usize,
    floors_broken: usize,
    game_over: bool,
    faded_out: bool,
}

fn setup_logging() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
}

fn main() -> Result<()> {
    setup_logging();
    let cli = Cli::parse();

    let store = match &cli.config {
        Some(path) => ConfigStore::new(path),
        None => ConfigStore::from_env(),
    };
    let config = if cli.config.is_some() {
        store
            .load_strict()
            .with_context(|| format!("failed to load {}", store.path().display()))?
    } else {
        store.load()
    };

    match cli.command {
        Commands::Simulate {
            seconds,
            dt,
            mine_every,
            reinforce,
        } => {
            let summary = simulate(config, seconds, dt, mine_every, reinforce)?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Commands::Config => {
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
    }
    Ok(())
}

fn simulate(
    config: GameConfig,
    seconds: f32,
    dt: f32,
    mine_every: f32,
    reinforce: bool,
) -> Result<Summary> {
    if !(dt.is_finite() && dt > 0.0) {
        bail!("--dt must be a positive number of seconds, got {dt}");
    }
    let logic = CavernLogic::new(config, &HudLayout::default()).context("invalid session setup")?;
    let mut runner = HeadlessRunner::new(logic);
    info!("simulating {seconds}s at dt={dt}");

    if reinforce {
        runner.step(SessionInput::Reinforce);
    }
    runner.step(SessionInput::SpawnPile);
    let pile = runner
        .state()
        .piles()
        .last()
        .map(|p| p.id())
        .context("pile did not spawn")?;
    runner.step(SessionInput::EnterPile(pile));

    let mut elapsed = 0.0_f32;
    let mut since_mine = 0.0_f32;
    let mut dig = DigInput::press();
    while elapsed < seconds && runner.state().game_over() != GameOverState::FadedOut {
        runner.step(SessionInput::Tick { dt, dig });
        dig = DigInput::hold();
        elapsed += dt;
        since_mine += dt;

        if mine_every > 0.0 && since_mine >= mine_every && !runner.state().is_over() {
            since_mine = 0.0;
            let floor_before = runner.state().counter().current_floor();
            let next = runner.state().counter().hits() + 1;
            runner.step(SessionInput::MineHits(next));
            if reinforce && runner.state().counter().current_floor() != floor_before {
                runner.step(SessionInput::Reinforce);
            }
        }
    }

    let events = runner.events();
    let state = runner.state();
    Ok(Summary {
        frames: runner.frame(),
        floor: state.display_floor(),
        oxygen: state.oxygen().value(),
        decay_rate: state.oxygen().decay_rate(),
        lava_volume: state.lava_volume(),
        prizes_unearthed: events
            .iter()
            .filter(|e| {
                matches!(
                    e.event,
                    SessionEvent::Pile {
                        event: PileEvent::PrizeUnearthed,
                        ..
                    }
                )
            })
            .count(),
        floors_broken: events
            .iter()
            .filter(|e| matches!(e.event, SessionEvent::FloorText(_)))
            .count(),
        game_over: state.is_over(),
        faded_out: state.game_over() == GameOverState::FadedOut,
    })
}
