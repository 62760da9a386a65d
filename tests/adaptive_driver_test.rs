use ndarray::Array2;
use sde_stepctl::controller::batch::adapt_lanes;
use sde_stepctl::controller::{Checkpoints, SabrController, StepRequest, StepSizeController};
use sde_stepctl::mc::driver::{simulate_adaptive_path, simulate_adaptive_paths, summarize, AdaptiveConfig};
use sde_stepctl::models::heston::{Heston, HestonParams};
use sde_stepctl::models::model::TwoFactorModel;
use sde_stepctl::models::sabr::{Sabr, SabrParams};
use sde_stepctl::rng;

fn heston() -> Heston {
    Heston::new(HestonParams {
        s0: 100.0,
        v0: 0.04,
        r: 0.02,
        kappa: 1.5,
        theta: 0.04,
        xi: 0.5,
        rho: -0.7,
    })
    .expect("Valid parameters")
}

fn sabr() -> Sabr {
    Sabr::new(SabrParams {
        f0: 100.0,
        alpha: 0.25,
        rho: -0.5,
        nu: 0.8,
    })
    .expect("Valid parameters")
}

#[test]
fn test_heston_path_lands_on_checkpoints() {
    let checkpoints = vec![0.25, 0.5, 0.75];
    let controller = SabrController::with_bounds(1e-2, 1e-5, 0.1)
        .unwrap()
        .with_step_ts(Checkpoints::new(checkpoints.clone()).unwrap())
        .unwrap();

    let mut rng = rng::seed_rng_from_u64(2024);
    let path =
        simulate_adaptive_path(&heston(), &controller, &AdaptiveConfig::default(), &mut rng)
            .expect("Simulation should finish");

    for c in checkpoints {
        assert!(
            path.times.contains(&c),
            "checkpoint {} missing from accepted grid",
            c
        );
    }
    assert_eq!(*path.times.last().unwrap(), 1.0);
    assert!(path.times.windows(2).all(|w| w[1] > w[0]));
}

#[test]
fn test_parallel_paths_are_reproducible() {
    let controller = SabrController::with_bounds(1e-2, 1e-4, 0.05)
        .unwrap()
        .euler(true);
    let cfg = AdaptiveConfig {
        paths: 64,
        seed: 99,
        ..Default::default()
    };

    let a = simulate_adaptive_paths(&sabr(), &controller, &cfg).unwrap();
    let b = simulate_adaptive_paths(&sabr(), &controller, &cfg).unwrap();

    assert_eq!(a.len(), 64);
    for (pa, pb) in a.iter().zip(&b) {
        assert_eq!(pa.times, pb.times);
        assert_eq!(pa.states, pb.states);
        assert_eq!(pa.rejected, pb.rejected);
    }
}

#[test]
fn test_sabr_forward_is_martingale() {
    let controller = SabrController::with_bounds(1e-2, 1e-4, 0.05)
        .unwrap()
        .previsible(true);
    let cfg = AdaptiveConfig {
        paths: 20_000,
        seed: 7,
        ..Default::default()
    };

    let paths = simulate_adaptive_paths(&sabr(), &controller, &cfg).unwrap();
    let summary = summarize(&paths);

    println!("Mean terminal forward: {}", summary.mean_terminal_value);
    println!("Mean accepted steps: {}", summary.mean_accepted_steps);

    assert_eq!(summary.rejection_rate, 0.0);
    let rel_error = (summary.mean_terminal_value - 100.0).abs() / 100.0;
    assert!(rel_error < 0.01, "Relative error exceeds 1%: {}", rel_error);
}

#[test]
fn test_reactive_mode_rejects_some_steps() {
    let controller = SabrController::with_bounds(1e-2, 1e-4, 0.05).unwrap();
    let cfg = AdaptiveConfig {
        paths: 200,
        seed: 11,
        ..Default::default()
    };

    let paths = simulate_adaptive_paths(&sabr(), &controller, &cfg).unwrap();
    let summary = summarize(&paths);

    assert!(summary.rejection_rate > 0.0);
    assert!(summary.rejection_rate < 0.5);
}

#[test]
fn test_lanes_follow_scalar_decisions_along_paths() {
    let controller = SabrController::with_bounds(1e-2, 1e-4, 0.05).unwrap();
    let model = heston();
    let lanes = 32;

    let mut t0 = ndarray::Array1::<f64>::zeros(lanes);
    let mut t1 = ndarray::Array1::<f64>::zeros(lanes);
    let mut y0 = Array2::<f64>::zeros((lanes, 2));
    let mut y1 = Array2::<f64>::zeros((lanes, 2));

    for lane in 0..lanes {
        let mut rng = rng::seed_rng_from_u64(lane as u64);
        let start = model.initial_state();
        let (stop, ()) = controller.init(0.0, 1.0, &start, None, None).unwrap();
        let dt = stop * (0.5 + lane as f64 / lanes as f64);
        let (dw1, dw2) = rng::brownian_increments(&mut rng, dt);
        let mut end = start;
        model.step_with_dw(&mut end, 0.0, dt, dw1, dw2).unwrap();

        t1[lane] = dt;
        y0[[lane, 0]] = start[0];
        y0[[lane, 1]] = start[1];
        y1[[lane, 0]] = end[0];
        y1[[lane, 1]] = end[1];
    }
    t0.fill(0.0);

    let decisions = adapt_lanes(&controller, t0.view(), t1.view(), y0.view(), y1.view()).unwrap();

    for lane in 0..lanes {
        let a = [y0[[lane, 0]], y0[[lane, 1]]];
        let b = [y1[[lane, 0]], y1[[lane, 1]]];
        let scalar = controller
            .adapt_step_size(StepRequest::stateless(t0[lane], t1[lane], &a, &b))
            .unwrap();
        assert_eq!(decisions.accept[lane], scalar.accept);
        assert_eq!(decisions.t0[lane], scalar.t0);
        assert_eq!(decisions.t1[lane], scalar.t1);
    }
}
