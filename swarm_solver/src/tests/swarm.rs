use nalgebra::{DMatrix, DVector, dmatrix, dvector};
use pretty_assertions::assert_eq;
use rand::{SeedableRng, rngs::StdRng};

use crate::prelude::*;

fn three_particle_swarm() -> Swarm {
    let positions = dmatrix![
        1.0, 1.0;
        2.0, 2.0;
        3.0, 3.0
    ];
    Swarm::new(positions, DMatrix::zeros(3, 2))
}

fn move_particle(swarm: &mut Swarm, i: usize, position: &[f64]) {
    let kinematics = swarm.kinematics_mut().unwrap();
    for (j, x) in position.iter().enumerate() {
        kinematics.positions[(i, j)] = *x;
    }
}

#[test]
fn test_new_swarm_has_no_global_best() {
    let mut swarm = three_particle_swarm();

    assert_eq!(swarm.n_particles(), 3);
    assert_eq!(swarm.dimensions(), 2);
    assert!(swarm.global_best().is_none());
    assert_eq!(swarm.global_best_cost(), f64::INFINITY);
    assert!(swarm.personal_best_costs().iter().all(|c| *c == f64::INFINITY));
    assert_eq!(swarm.personal_best(), swarm.positions());
    assert!(swarm.kinematics_mut().is_none());
}

#[test]
fn test_report_costs_seeds_bests() {
    let mut swarm = three_particle_swarm();

    let outcome = swarm.report_costs(&dvector![3.0, 1.0, 2.0]);

    assert_eq!(
        outcome,
        ReportOutcome {
            personal_improvements: 3,
            global_improved: true
        }
    );
    assert_eq!(swarm.personal_best_costs(), &dvector![3.0, 1.0, 2.0]);
    assert_eq!(
        swarm.global_best(),
        Some(&GlobalBest {
            position: dvector![2.0, 2.0],
            cost: 1.0
        })
    );
}

#[test]
fn test_personal_best_moves_only_on_strict_improvement() {
    let mut swarm = three_particle_swarm();
    swarm.report_costs(&dvector![3.0, 1.0, 2.0]);

    move_particle(&mut swarm, 0, &[10.0, 10.0]);
    move_particle(&mut swarm, 2, &[20.0, 20.0]);
    let outcome = swarm.report_costs(&dvector![3.0, 5.0, 1.5]);

    // particle 0 tied, particle 1 got worse, particle 2 improved
    assert_eq!(outcome.personal_improvements, 1);
    assert!(!outcome.global_improved);
    assert_eq!(swarm.personal_best().row(0).transpose(), dvector![1.0, 1.0]);
    assert_eq!(swarm.personal_best().row(2).transpose(), dvector![20.0, 20.0]);
    assert_eq!(swarm.personal_best_costs(), &dvector![3.0, 1.0, 1.5]);
}

#[test]
fn test_global_best_tie_keeps_incumbent() {
    let mut swarm = three_particle_swarm();
    swarm.report_costs(&dvector![3.0, 1.0, 2.0]);

    move_particle(&mut swarm, 2, &[-4.0, -4.0]);
    let outcome = swarm.report_costs(&dvector![3.0, 1.0, 1.0]);

    assert!(!outcome.global_improved);
    assert_eq!(swarm.global_best().unwrap().position, dvector![2.0, 2.0]);
}

#[test]
fn test_tie_within_first_batch_picks_lowest_index() {
    let mut swarm = three_particle_swarm();
    swarm.report_costs(&dvector![2.0, 1.0, 1.0]);

    assert_eq!(swarm.global_best().unwrap().position, dvector![2.0, 2.0]);
}

#[test]
fn test_non_finite_costs_never_become_best() {
    let mut swarm = three_particle_swarm();

    swarm.report_costs(&dvector![f64::NAN, 4.0, f64::NEG_INFINITY]);

    let best = swarm.global_best().unwrap();
    assert_eq!(best.cost, 4.0);
    assert_eq!(best.position, dvector![2.0, 2.0]);
    assert_eq!(swarm.personal_best_costs()[0], f64::INFINITY);
    assert_eq!(swarm.personal_best_costs()[2], f64::INFINITY);
}

#[test]
fn test_all_non_finite_batch_still_defines_global_best() {
    let mut swarm = three_particle_swarm();

    swarm.report_costs(&dvector![f64::NAN, f64::NAN, f64::INFINITY]);

    let best = swarm.global_best().unwrap();
    assert_eq!(best.cost, f64::INFINITY);
    assert_eq!(best.position, dvector![1.0, 1.0]);
    assert!(swarm.kinematics_mut().is_some());

    swarm.report_costs(&dvector![f64::NAN, 7.0, f64::NAN]);
    assert_eq!(swarm.global_best_cost(), 7.0);
}

#[test]
fn test_mean_personal_best_cost_skips_non_finite() {
    let mut swarm = three_particle_swarm();
    assert_eq!(swarm.mean_personal_best_cost(), f64::INFINITY);

    swarm.report_costs(&dvector![2.0, f64::NAN, 4.0]);
    assert_eq!(swarm.mean_personal_best_cost(), 3.0);
}

#[test]
fn test_single_particle_is_its_own_global_best() {
    let mut swarm = Swarm::new(dmatrix![0.5, -0.5], DMatrix::zeros(1, 2));

    swarm.report_costs(&dvector![0.5]);
    move_particle(&mut swarm, 0, &[0.1, 0.1]);
    swarm.report_costs(&dvector![0.02]);

    let best = swarm.global_best().unwrap();
    assert_eq!(best.position, swarm.personal_best().row(0).transpose());
    assert_eq!(best.cost, swarm.personal_best_costs()[0]);
}

#[test]
fn test_random_swarm_respects_bounds_and_seed() {
    let config = PsoConfig::builder(20, 3)
        .bounds(vec![-1.0, 0.0, 5.0], vec![1.0, 0.5, 6.0])
        .build()
        .unwrap();

    let swarm = Swarm::random(&config, &mut StdRng::seed_from_u64(3));
    let again = Swarm::random(&config, &mut StdRng::seed_from_u64(3));

    let bounds = config.bounds().unwrap();
    for i in 0..swarm.n_particles() {
        let row: Vec<f64> = swarm.positions().row(i).iter().copied().collect();
        assert!(bounds.contains(&row), "particle {i} out of bounds: {row:?}");
    }
    assert_eq!(swarm.velocities(), &DMatrix::<f64>::zeros(20, 3));
    assert_eq!(swarm.positions(), again.positions());
}

#[test]
fn test_random_swarm_uses_init_range_without_bounds() {
    let config = PsoConfig::builder(50, 2)
        .init_range(4.0, 5.0)
        .velocity_clamp(-0.25, 0.25)
        .build()
        .unwrap();

    let swarm = Swarm::random(&config, &mut StdRng::seed_from_u64(11));

    assert!(swarm.positions().iter().all(|x| (4.0..5.0).contains(x)));
    assert!(swarm.velocities().iter().all(|v| (-0.25..=0.25).contains(v)));
    assert!(swarm.velocities().iter().any(|v| *v != 0.0));
}

#[test]
fn test_with_positions_checks_shape_and_bounds() {
    let config = PsoConfig::builder(2, 2)
        .bounds(vec![0.0, 0.0], vec![1.0, 1.0])
        .build()
        .unwrap();
    let mut rng = StdRng::seed_from_u64(0);

    let swarm = Swarm::with_positions(&config, dmatrix![0.1, 0.2; 0.3, 0.4], &mut rng).unwrap();
    assert_eq!(swarm.positions(), &dmatrix![0.1, 0.2; 0.3, 0.4]);

    let err = Swarm::with_positions(&config, DMatrix::zeros(3, 2), &mut rng).unwrap_err();
    assert!(matches!(
        err,
        PsoError::InitialPositionsShape {
            expected: (2, 2),
            got: (3, 2)
        }
    ));

    let err =
        Swarm::with_positions(&config, dmatrix![0.1, 0.2; 0.3, 1.4], &mut rng).unwrap_err();
    assert!(matches!(
        err,
        PsoError::InitialPositionOutOfBounds {
            particle: 1,
            dim: 1
        }
    ));
}

#[test]
fn test_costs_vector_is_aligned_with_rows() {
    let mut swarm = three_particle_swarm();
    let costs = DVector::from_fn(3, |i, _| (3 - i) as f64);

    swarm.report_costs(&costs);

    assert_eq!(swarm.global_best().unwrap().position, dvector![3.0, 3.0]);
}
