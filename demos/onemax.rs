//! OneMax solved by four islands
//!
//! Each island runs a different mutation strength; migration probabilities
//! adapt so the islands whose migrants help the most receive more traffic.
//! Every island logs its progress to `result_monitor_<rank>`.
//!
//! Run with `cargo run --example onemax`.

use std::fs::File;
use std::io::Write;

use archipelago::prelude::*;

const ISLANDS: usize = 4;
const POPULATION: usize = 100;
const CHROMOSOME: usize = 1000;

fn variation_for(rank: usize) -> Box<dyn VariationOperator<BitString>> {
    match rank {
        0 => Box::new(DetBitFlip::new(1)),
        1 => Box::new(BitMutation::new(1.0, true)),
        2 => Box::new(DetBitFlip::new(3)),
        _ => Box::new(DetBitFlip::new(5)),
    }
}

fn main() -> IslandResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let mut rng = rand::thread_rng();
    let report = IslandModelBuilder::new(OneMax)
        .num_islands(ISLANDS)
        .population_size(POPULATION)
        .target_fitness(CHROMOSOME as f64)
        .max_generations(50_000)
        .genome_init(move || BitString::random(CHROMOSOME, &mut rng))
        .variation(variation_for)
        .monitor_sink(|rank| {
            let file = File::create(format!("result_monitor_{rank}"))?;
            Ok(Box::new(file) as Box<dyn Write + Send>)
        })
        .build()?
        .run()?;

    for island in &report.islands {
        let best = island.best.as_ref().and_then(|ind| ind.fitness());
        println!(
            "island {} finished after {} generations, best fitness {:?}",
            island.rank, island.generations, best
        );
    }
    if let Some(best) = report.best().and_then(|ind| ind.fitness()) {
        println!("overall best fitness: {best}");
    }
    Ok(())
}
