mod platform;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::fs;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use platform::{FsAsciiLoader, FsDataLoader, FsStorage};
use tilequest_game::{Game, GameConfig, GameEngine, GameState, NoArt, Services};

#[derive(Debug, Parser)]
#[command(name = "tilequest", version)]
#[command(about = "Turn-based text adventure: explore, fight, shop and level up")]
struct Args {
    /// World seed; skips the start menu and drops you at the village
    #[arg(long)]
    seed: Option<u64>,

    /// Side length of the generated world
    #[arg(long)]
    size: Option<usize>,

    /// Directory holding save files
    #[arg(long, default_value = "saves")]
    save_dir: PathBuf,

    /// Save slot used by `save` and `load`
    #[arg(long)]
    save_name: Option<String>,

    /// Assets directory with optional `data/` overrides and `ascii/` art
    #[arg(long, default_value = concat!(env!("CARGO_MANIFEST_DIR"), "/assets"))]
    assets: PathBuf,

    /// JSON config file; flags take precedence over its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Read commands from a file instead of the terminal
    #[arg(long)]
    script: Option<PathBuf>,

    /// Disable tile and enemy art
    #[arg(long)]
    no_art: bool,

    /// Show the cause of failed actions and the state after each command
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = build_config(&args)?;
    let engine = GameEngine::new(FsDataLoader::new(args.assets.join("data")), config);
    let services = build_services(&args);
    let mut game = match args.seed {
        Some(seed) => engine.new_game(services, Some(seed)),
        None => engine.start_menu(services, None),
    }
    .context("failed to start a game")?;

    announce_banner();
    print_output(&game.look().unwrap_or_default());

    let input: Box<dyn BufRead> = match &args.script {
        Some(path) => {
            let file = fs::File::open(path)
                .with_context(|| format!("failed to open script {}", path.display()))?;
            Box::new(BufReader::new(file))
        }
        None => Box::new(io::stdin().lock()),
    };
    run(&mut game, input, args.script.is_none(), args.verbose)?;

    log::info!("session finished in state {}", game.state());
    Ok(())
}

fn build_config(args: &Args) -> Result<GameConfig> {
    let mut config = match &args.config {
        Some(path) => read_config(path)?,
        None => GameConfig::default(),
    };
    if let Some(size) = args.size {
        config.world_size = size;
    }
    if let Some(name) = &args.save_name {
        config.save_name.clone_from(name);
    }
    if args.no_art {
        config.ascii_tiles = false;
    }
    Ok(config)
}

fn read_config(path: &Path) -> Result<GameConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    GameConfig::from_json(&text).with_context(|| format!("invalid config {}", path.display()))
}

fn build_services(args: &Args) -> Services {
    let storage = FsStorage::new(&args.save_dir);
    if args.no_art {
        Services::new(storage, NoArt)
    } else {
        Services::new(storage, FsAsciiLoader::new(args.assets.join("ascii")))
    }
}

fn run(game: &mut Game, input: Box<dyn BufRead>, interactive: bool, verbose: bool) -> Result<()> {
    let mut lines = input.lines();
    loop {
        if interactive {
            print!("{} ", format!("[{}] >", game.state()).cyan());
            io::stdout().flush().context("failed to flush prompt")?;
        }
        let Some(line) = lines.next() else {
            break;
        };
        let line = line.context("failed to read command")?;
        let command = line.trim();
        if command.is_empty() {
            continue;
        }
        if !interactive {
            println!("{}", format!("> {command}").dimmed());
        }

        match game.try_execute_action(command) {
            Ok(Some(output)) => print_output(&output),
            Ok(None) => println!(
                "{}",
                "Unknown command. Type 'help' for options.".yellow()
            ),
            Err(failure) => {
                println!("{}", failure.user_message().red());
                let cause = game.record_failure(failure);
                if verbose {
                    eprintln!("{}", format!("{cause:?}").red());
                }
            }
        }
        if verbose {
            println!("{}", format!("(state: {})", game.state()).dimmed());
        }
        if game.is_ended() {
            break;
        }
    }
    if game.state() == GameState::GameOver {
        println!("{}", "Thanks for playing.".bright_magenta());
    }
    Ok(())
}

fn announce_banner() {
    println!("{}", "Tilequest".bright_cyan().bold());
    println!("{}", "=========".cyan());
}

fn print_output(text: &str) {
    for line in text.lines() {
        if line.starts_with("Warning:") || line.ends_with("[y/N]") {
            println!("{}", line.yellow());
        } else if line.starts_with("Level up!") || line.starts_with("You defeated") {
            println!("{}", line.green().bold());
        } else if line == "You were defeated..." {
            println!("{}", line.red().bold());
        } else {
            println!("{line}");
        }
    }
}
