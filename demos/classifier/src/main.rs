use classifier_demo::prelude::*;
use swarm_solver::prelude::*;

const HIDDEN_UNITS: usize = 6;
const N_CLASSES: usize = 3;

fn main() -> anyhow::Result<()> {
    let dataset = Dataset::blobs(50, N_CLASSES, 7)?;
    let network = Network::new(vec![dataset.n_features(), HIDDEN_UNITS, N_CLASSES])?;
    let dimensions = network.n_params();

    let config = PsoConfig::builder(100, dimensions)
        .options(SwarmOptions {
            c1: 0.5,
            c2: 0.3,
            w: 0.9,
        })
        .init_range(-1.0, 1.0)
        .iterations(1000)
        .seed(42)
        .build()?;

    let mut objective = ClassifierObjective::new(network, dataset)?;
    let mut pso = ParticleSwarm::new(config);

    println!("\n------- pre optimization -------");
    println!("network layers: {:?}", objective.network.layer_sizes());
    println!("parameters per particle: {}", dimensions);
    println!(
        "loss at zero weights: {}",
        objective
            .network
            .nll_loss(&vec![0.0; dimensions], &objective.dataset)?
    );

    let result = pso.run(&mut objective)?;

    println!("\n------- post optimization -------");
    println!("termination: {:?}", result.termination);
    println!("iterations: {}", result.iterations);
    println!("evaluations: {}", result.evaluations);
    println!("best loss: {}", result.best_cost);
    if let (Some(first), Some(last)) = (
        pso.history().best_cost.first(),
        pso.history().last_best_cost(),
    ) {
        println!("best loss went from {} to {}", first, last);
    }

    let accuracy = objective
        .network
        .accuracy(result.best_position.as_slice(), &objective.dataset)?;
    println!("training accuracy: {:.3}", accuracy);

    Ok(())
}
