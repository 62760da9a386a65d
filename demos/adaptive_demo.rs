// demos/adaptive_demo.rs
use sde_stepctl::controller::{Checkpoints, SabrController};
use sde_stepctl::math_utils::Timer;
use sde_stepctl::mc::driver::{simulate_adaptive_path, simulate_adaptive_paths, summarize, AdaptiveConfig};
use sde_stepctl::models::heston::{Heston, HestonParams};
use sde_stepctl::models::sabr::{Sabr, SabrParams};
use sde_stepctl::output::{write_path_to_csv, write_summary_to_csv};
use sde_stepctl::rng;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("Adaptive Step-Size Control Demo");
    println!("===============================\n");

    let sabr = Sabr::new(SabrParams {
        f0: 100.0,
        alpha: 0.25,
        rho: -0.5,
        nu: 0.8,
    })
    .expect("Valid SABR parameters");

    let heston = Heston::new(HestonParams {
        s0: 100.0,
        v0: 0.04,
        r: 0.02,
        kappa: 1.0,
        theta: 0.04,
        xi: 0.8, // Violates Feller, variance reaches zero
        rho: -0.7,
    })
    .expect("Valid Heston parameters");

    let cfg = AdaptiveConfig {
        paths: 50_000,
        ..Default::default()
    };

    let modes = [
        ("reactive", false, false),
        ("reactive + euler", false, true),
        ("previsible", true, false),
        ("previsible + euler", true, true),
    ];

    println!("--- SABR (β = 1), {} paths ---", cfg.paths);
    println!(
        "{:<20} {:>12} {:>12} {:>12} {:>10}",
        "Mode", "E[F_T]", "Steps/path", "Reject rate", "Time (ms)"
    );
    let mut summary_rows = Vec::new();
    for (name, previsible, euler) in modes {
        let controller = SabrController::with_bounds(1e-2, 1e-5, 0.05)
            .expect("Valid configuration")
            .previsible(previsible)
            .euler(euler);

        let timer = Timer::new();
        let paths = simulate_adaptive_paths(&sabr, &controller, &cfg).expect("Simulation failed");
        let elapsed = timer.elapsed_ms();
        let summary = summarize(&paths);

        println!(
            "{:<20} {:>12.4} {:>12.1} {:>11.2}% {:>10.1}",
            name,
            summary.mean_terminal_value,
            summary.mean_accepted_steps,
            summary.rejection_rate * 100.0,
            elapsed
        );
        summary_rows.push((name, format!("{:.6}", summary.mean_terminal_value)));
    }

    println!("\n--- Heston with quarterly checkpoints (single path) ---");
    let controller = SabrController::with_bounds(1e-2, 1e-5, 0.05)
        .expect("Valid configuration")
        .with_step_ts(Checkpoints::new(vec![0.25, 0.5, 0.75]).expect("Valid checkpoints"))
        .expect("Checkpoint precision");

    let mut rng = rng::seed_rng_from_u64(42);
    let path = simulate_adaptive_path(&heston, &controller, &cfg, &mut rng).expect("Simulation failed");
    println!(
        "accepted = {}, rejected = {}, smallest dt = {:.2e}, largest dt = {:.2e}",
        path.accepted,
        path.rejected,
        path.step_sizes().iter().cloned().fold(f64::INFINITY, f64::min),
        path.step_sizes().iter().cloned().fold(0.0, f64::max),
    );

    if let Err(e) = write_path_to_csv("heston_adaptive_path.csv", &path) {
        eprintln!("Could not write path CSV: {}", e);
    }

    let summary_data: Vec<(&str, &str)> = summary_rows
        .iter()
        .map(|(name, value)| (*name, value.as_str()))
        .collect();
    if let Err(e) = write_summary_to_csv("sabr_adaptive_summary.csv", &summary_data) {
        eprintln!("Could not write summary CSV: {}", e);
    }

    println!("\nWrote heston_adaptive_path.csv and sabr_adaptive_summary.csv");
}
