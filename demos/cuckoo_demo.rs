use anyhow::Result;
use cuckoo_search::benchmarks::Benchmark;
use cuckoo_search::stats::{compare_strategies, TrialRunner};
use cuckoo_search::{Bounds, CuckooConfig, CuckooSolver, Direction, GenerationSnapshot, ObjectiveFunction, Problem};
use std::time::Instant;

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    println!("🐦 Cuckoo Search Demo");
    println!("=====================");

    // 1. Single run on Michalewicz with a progress observer
    let michalewicz = Benchmark::Michalewicz.default_objective();
    let config = CuckooConfig::default()
        .with_population_size(25)
        .with_max_generations(300)
        .with_step(1e-4, 1.0)
        .with_seed(7);

    println!("\n-> {} in {} dimensions", michalewicz.name(), michalewicz.dim());
    let start = Instant::now();
    let solver = CuckooSolver::new(config.clone()).with_observer(|snapshot: &GenerationSnapshot<'_>| {
        if snapshot.generation % 50 == 0 {
            println!(
                "   generation {:>4}: champion {:.6} (alpha {:.2e}, {} replaced, {} abandoned)",
                snapshot.generation,
                snapshot.champion.fitness(),
                snapshot.alpha[0],
                snapshot.replaced,
                snapshot.abandoned
            );
        }
    });
    let result = solver.solve(&michalewicz)?;
    println!("   Best fitness: {:.6}", result.best_fitness);
    println!("   Known minimum: {:.6}", Benchmark::Michalewicz.global_minimum(2).unwrap_or(f64::NAN));
    println!("   Solution: {}", result.best_variables);
    println!("   Evaluations: {} in {:?}", result.evaluations, start.elapsed());

    // 2. Maximization of a custom objective
    let bump = ObjectiveFunction::new("Gaussian bump", 3, Bounds::new(-4.0, 4.0)?, |x| {
        (-x.iter().map(|v| (v - 1.0).powi(2)).sum::<f64>()).exp()
    });
    let result = CuckooSolver::new(config.clone().with_max_generations(200)).find_max(&bump)?;
    println!("\n-> {} (maximize)", bump.name());
    println!("   Peak value: {:.6} at {}", result.best_fitness, result.best_variables);

    // 3. Repeated trials on the benchmark catalogue
    println!("\n📊 Trials");
    for benchmark in [Benchmark::Sphere, Benchmark::Ackley, Benchmark::Rastrigin] {
        let objective = benchmark.objective(5);
        let runner = TrialRunner::new(
            config
                .clone()
                .with_step(1e-4, benchmark.bounds().width() / 10.0)
                .with_max_generations(500)
                .with_direction(Direction::Minimize),
            8,
        );
        let report = runner.run(&objective)?;
        println!("\n{}", report);
    }

    // 4. Lazy against standard flights at a matched evaluation budget
    let rosenbrock = Benchmark::Rosenbrock.objective(5);
    let comparison = compare_strategies(&config.clone().with_step(1e-4, 1.5).with_max_generations(300), &rosenbrock, 8, 3.0)?;
    println!("\n⚖️  Standard vs lazy on {}", rosenbrock.name());
    println!("   Standard mean: {:.6}", comparison.standard.summary.mean);
    println!("   Lazy mean:     {:.6}", comparison.lazy.summary.mean);
    println!("   Ratio (lazy / standard): {:.3}", comparison.mean_ratio());

    Ok(())
}
