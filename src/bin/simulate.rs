//! Battle balance simulator CLI.
//!
//! Run Monte Carlo battles to analyze combat balance.
//!
//! Usage:
//!   cargo run --bin simulate -- [OPTIONS]
//!
//! Examples:
//!   cargo run --bin simulate                        # 100 one-hour boar fights
//!   cargo run --bin simulate -- -e sunken_crypt -p mage
//!   cargo run --bin simulate -- --seed 42 --verify  # Reproducible, checked offline

use idle_battle::character::profession::ProfessionId;
use idle_battle::core::config::CombatLoopOptions;
use idle_battle::encounter::presets::PRESET_NAMES;
use idle_battle::simulator::{run_simulation, SimConfig};
use std::env;
use tracing_subscriber::EnvFilter;

fn main() {
    let args: Vec<String> = env::args().collect();
    let config = parse_args(&args);

    let default_level = match config.verbosity {
        0 | 1 => "warn",
        2 => "info",
        _ => "idle_battle=trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    println!("╔═══════════════════════════════════════════════════════════════╗");
    println!("║              IDLE BATTLE SIMULATOR                            ║");
    println!("╚═══════════════════════════════════════════════════════════════╝");
    println!();
    println!("Configuration:");
    println!("  Runs:           {}", config.num_runs);
    println!("  Duration:       {:.0}s", config.duration_seconds);
    println!("  Step:           {}s", config.step_seconds);
    println!("  Encounter:      {}", config.encounter);
    println!("  Profession:     {}", config.profession.name());
    println!("  Verify Offline: {}", config.verify_offline);
    if let Some(seed) = config.seed {
        println!("  Seed:           {}", seed);
    }
    println!();
    println!("Running simulation...");
    println!();

    let report = match run_simulation(&config) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Simulation failed: {}", e);
            std::process::exit(1);
        }
    };

    println!("{}", report.to_text());

    if args.iter().any(|a| a == "--json") {
        let json = report.to_json();
        let filename = format!(
            "sim_report_{}.json",
            chrono::Utc::now().format("%Y%m%d_%H%M%S")
        );
        std::fs::write(&filename, json).expect("Failed to write JSON report");
        println!("JSON report saved to: {}", filename);
    }

    if report.offline_mismatches > 0 {
        std::process::exit(2);
    }
}

fn parse_args(args: &[String]) -> SimConfig {
    let mut config = SimConfig::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-n" | "--runs" => {
                if i + 1 < args.len() {
                    config.num_runs = args[i + 1].parse().unwrap_or(100);
                    i += 1;
                }
            }
            "-d" | "--duration" => {
                if i + 1 < args.len() {
                    config.duration_seconds = args[i + 1].parse().unwrap_or(3600.0);
                    i += 1;
                }
            }
            "--step" => {
                if i + 1 < args.len() {
                    config.step_seconds = args[i + 1].parse().unwrap_or(1.0);
                    i += 1;
                }
            }
            "-e" | "--encounter" => {
                if i + 1 < args.len() {
                    config.encounter = args[i + 1].clone();
                    i += 1;
                }
            }
            "-p" | "--profession" => {
                if i + 1 < args.len() {
                    match ProfessionId::from_name(&args[i + 1]) {
                        Some(p) => config.profession = p,
                        None => eprintln!("Unknown profession '{}', keeping default", args[i + 1]),
                    }
                    i += 1;
                }
            }
            "-s" | "--seed" => {
                if i + 1 < args.len() {
                    config.seed = args[i + 1].parse().ok();
                    i += 1;
                }
            }
            "-c" | "--options" => {
                if i + 1 < args.len() {
                    match std::fs::read_to_string(&args[i + 1])
                        .map_err(|e| e.to_string())
                        .and_then(|s| CombatLoopOptions::from_json_str(&s).map_err(|e| e.to_string()))
                    {
                        Ok(options) => config.options = options,
                        Err(e) => {
                            eprintln!("Failed to load options from {}: {}", args[i + 1], e);
                            std::process::exit(1);
                        }
                    }
                    i += 1;
                }
            }
            "--verify" => {
                config.verify_offline = true;
            }
            "-q" | "--quick" => {
                config = SimConfig::quick();
            }
            "--dungeon" => {
                config = SimConfig::dungeon_balance(config.profession);
            }
            "--determinism" => {
                config = SimConfig::determinism_check();
            }
            "-v" | "--verbose" => {
                config.verbosity = 2;
            }
            "-vv" => {
                config.verbosity = 3;
            }
            "--json" => {
                // Handled in main
            }
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                print_help();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    config
}

fn print_help() {
    println!("Idle Battle Simulator");
    println!();
    println!("USAGE:");
    println!("    simulate [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("    -n, --runs <N>          Number of battles (default: 100)");
    println!("    -d, --duration <SECS>   Simulated seconds per battle (default: 3600)");
    println!("        --step <SECS>       Online step size (default: 1)");
    println!("    -e, --encounter <NAME>  Encounter preset (default: meadow_boar)");
    println!("    -p, --profession <P>    warrior, ranger or mage (default: warrior)");
    println!("    -s, --seed <N>          Base random seed for reproducibility");
    println!("    -c, --options <FILE>    Combat loop options as JSON");
    println!("        --verify            Check every battle against the offline engine");
    println!("    -q, --quick             Quick balance check (20 runs, 10 minutes)");
    println!("        --dungeon           Dungeon balance preset");
    println!("        --determinism       Long battles with offline verification");
    println!("    -v, --verbose           Per-run output and info logs");
    println!("    -vv                     Trace logs with every battle notification");
    println!("        --json              Save JSON report to file");
    println!("    -h, --help              Show this help");
    println!();
    println!("ENCOUNTERS:");
    for name in PRESET_NAMES {
        println!("    {}", name);
    }
}
