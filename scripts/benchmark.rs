// scripts/benchmark.rs
use ndarray::{Array1, Array2};
use sde_stepctl::controller::batch::{adapt_lanes, desired_step_sizes};
use sde_stepctl::controller::{SabrController, StepRequest, StepSizeController};
use sde_stepctl::math_utils::Timer;
use sde_stepctl::mc::driver::{simulate_adaptive_paths, AdaptiveConfig};
use sde_stepctl::models::sabr::{Sabr, SabrParams};
use std::env;
use std::fs::File;
use std::io::{self, Write};

#[derive(Debug)]
struct SystemInfo {
    os: String,
    cpu_cores: usize,
    rustc_flags: String,
    rayon_threads: usize,
}

impl SystemInfo {
    fn gather() -> Self {
        Self {
            os: env::consts::OS.to_string(),
            cpu_cores: num_cpus::get(),
            rustc_flags: env::var("RUSTFLAGS").unwrap_or_else(|_| "default".to_string()),
            rayon_threads: rayon::current_num_threads(),
        }
    }
}

#[derive(Debug)]
struct BenchmarkResult {
    name: String,
    evaluations: usize,
    time_ms: f64,
    throughput_per_sec: f64,
}

impl BenchmarkResult {
    fn new(name: &str, evaluations: usize, time_ms: f64) -> Self {
        Self {
            name: name.to_string(),
            evaluations,
            time_ms,
            throughput_per_sec: evaluations as f64 / (time_ms / 1000.0),
        }
    }
}

fn lane_inputs(lanes: usize) -> (Array1<f64>, Array1<f64>, Array2<f64>, Array2<f64>) {
    let t0 = Array1::zeros(lanes);
    let t1 = Array1::from_shape_fn(lanes, |i| 0.001 + 0.05 * (i % 100) as f64 / 100.0);
    let y0 = Array2::from_shape_fn((lanes, 2), |(i, j)| {
        if j == 0 {
            100.0
        } else {
            -2.0 + 3.0 * (i % 97) as f64 / 97.0
        }
    });
    let y1 = y0.mapv(|v| v + 0.01);
    (t0, t1, y0, y1)
}

fn run_controller_benchmarks() -> Vec<BenchmarkResult> {
    let mut results = Vec::new();

    for euler in [false, true] {
        let controller = SabrController::with_bounds(1e-2, 1e-5, 0.05)
            .expect("Valid configuration")
            .euler(euler);
        let label = if euler { "euler" } else { "log" };

        for &lanes in &[10_000usize, 1_000_000] {
            let (t0, t1, y0, y1) = lane_inputs(lanes);

            let timer = Timer::new();
            let v = y1.column(1).to_owned();
            let dt = desired_step_sizes(&controller, v.view());
            let elapsed = timer.elapsed_ms();
            assert_eq!(dt.len(), lanes);
            results.push(BenchmarkResult::new(
                &format!("desired_step_size ({})", label),
                lanes,
                elapsed,
            ));

            let timer = Timer::new();
            let mut accepted = 0;
            for i in 0..lanes {
                let a = [y0[[i, 0]], y0[[i, 1]]];
                let b = [y1[[i, 0]], y1[[i, 1]]];
                let d = controller
                    .adapt_step_size(StepRequest::stateless(t0[i], t1[i], &a, &b))
                    .expect("Valid lane");
                accepted += d.accept as usize;
            }
            let elapsed = timer.elapsed_ms();
            results.push(BenchmarkResult::new(
                &format!("adapt scalar loop ({})", label),
                lanes,
                elapsed,
            ));

            let timer = Timer::new();
            let decisions = adapt_lanes(&controller, t0.view(), t1.view(), y0.view(), y1.view())
                .expect("Valid lanes");
            let elapsed = timer.elapsed_ms();
            assert_eq!(decisions.accepted_count(), accepted);
            results.push(BenchmarkResult::new(
                &format!("adapt_lanes ({})", label),
                lanes,
                elapsed,
            ));
        }
    }

    results
}

fn run_driver_benchmarks() -> Vec<BenchmarkResult> {
    let sabr = Sabr::new(SabrParams {
        f0: 100.0,
        alpha: 0.25,
        rho: -0.5,
        nu: 0.8,
    })
    .expect("Valid SABR parameters");

    let mut results = Vec::new();
    for &paths in &[10_000usize, 100_000] {
        let cfg = AdaptiveConfig {
            paths,
            ..Default::default()
        };
        let controller = SabrController::with_bounds(1e-2, 1e-5, 0.05)
            .expect("Valid configuration")
            .previsible(true);

        let timer = Timer::new();
        let simulated = simulate_adaptive_paths(&sabr, &controller, &cfg).expect("Simulation failed");
        let elapsed = timer.elapsed_ms();
        let steps: usize = simulated.iter().map(|p| p.accepted).sum();
        results.push(BenchmarkResult::new("SABR adaptive paths (steps)", steps, elapsed));
    }
    results
}

fn write_results_to_csv(
    results: &[BenchmarkResult],
    system_info: &SystemInfo,
    filename: &str,
) -> io::Result<()> {
    let mut file = File::create(filename)?;

    writeln!(file, "# OS: {}", system_info.os)?;
    writeln!(file, "# CPU Cores: {}", system_info.cpu_cores)?;
    writeln!(file, "# RUSTFLAGS: {}", system_info.rustc_flags)?;
    writeln!(file, "# Rayon Threads: {}", system_info.rayon_threads)?;
    writeln!(
        file,
        "# Benchmark Date: {}",
        chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    )?;
    writeln!(file, "Benchmark,Evaluations,Time_ms,Throughput_per_sec")?;

    for result in results {
        writeln!(
            file,
            "{},{},{:.3},{:.0}",
            result.name, result.evaluations, result.time_ms, result.throughput_per_sec
        )?;
    }
    Ok(())
}

fn main() {
    println!("sde-stepctl Benchmark Suite");
    println!("===========================\n");

    let system_info = SystemInfo::gather();
    println!("System Information:");
    println!("  OS: {}", system_info.os);
    println!("  CPU Cores: {}", system_info.cpu_cores);
    println!("  RUSTFLAGS: {}", system_info.rustc_flags);
    println!("  Rayon Threads: {}", system_info.rayon_threads);
    println!();

    let mut all_results = run_controller_benchmarks();
    all_results.extend(run_driver_benchmarks());

    println!("{:=<80}", "");
    println!(
        "{:<40} {:>12} {:>12} {:>14}",
        "Benchmark", "Evaluations", "Time (ms)", "Throughput/s"
    );
    println!("{:-<80}", "");
    for result in &all_results {
        println!(
            "{:<40} {:>12} {:>12.3} {:>14.0}",
            result.name, result.evaluations, result.time_ms, result.throughput_per_sec
        );
    }
    println!("{:=<80}", "");

    let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S");
    let filename = format!("benchmark_results_{}.csv", timestamp);
    match write_results_to_csv(&all_results, &system_info, &filename) {
        Ok(()) => println!("\nResults saved to: {}", filename),
        Err(e) => eprintln!("\nCould not write {}: {}", filename, e),
    }
}
