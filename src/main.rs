use clap::{Args, Parser, Subcommand};
use delivery_ga::config::{Config, VrpConfig};
use delivery_ga::genetic::{CrossoverKind, MutationKind, SelectionKind};
use delivery_ga::problem::Problem;
use delivery_ga::tsp::TspEngine;
use delivery_ga::utils::{format_duration, save_json, SearchStatistics, TspExport, VrpExport};
use delivery_ga::vrp::VrpEngine;
use log::info;
use serde::de::DeserializeOwned;
use std::error::Error;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "delivery-ga", version, about = "Genetic search for delivery routes")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Search a single tour over every city
    Tsp {
        #[command(flatten)]
        common: CommonArgs,
        /// Selection operator (tournament, tournament:<k>, roulette, rank)
        #[arg(long)]
        selection: Option<SelectionKind>,
        /// Crossover operator (ox, pmx, cx)
        #[arg(long)]
        crossover: Option<CrossoverKind>,
        /// Mutation operator (swap, inversion, scramble)
        #[arg(long)]
        mutation: Option<MutationKind>,
    },
    /// Partition the cities over the available vehicles
    Vrp {
        #[command(flatten)]
        common: CommonArgs,
    },
}

#[derive(Args)]
struct CommonArgs {
    /// Instance file (JSON)
    #[arg(long)]
    instance: PathBuf,
    /// Configuration file (JSON); missing fields keep their defaults
    #[arg(long)]
    config: Option<PathBuf>,
    /// Number of generations to run
    #[arg(long)]
    generations: Option<usize>,
    /// Random seed
    #[arg(long)]
    seed: Option<u64>,
    /// Write the result as JSON to this path
    #[arg(long)]
    output: Option<PathBuf>,
}

fn load_config<T: DeserializeOwned + Default>(path: Option<&Path>) -> Result<T, Box<dyn Error>> {
    match path {
        Some(path) => {
            let reader = BufReader::new(File::open(path)?);
            Ok(serde_json::from_reader(reader)?)
        }
        None => Ok(T::default()),
    }
}

fn load_problem(path: &Path) -> Result<Arc<Problem>, Box<dyn Error>> {
    info!("Loading problem from: {}", path.display());
    let problem = Problem::from_file(path)?;
    info!(
        "Loaded problem: {} with {} cities, {} deliveries and {} vehicles",
        problem.name,
        problem.city_count(),
        problem.delivery_count(),
        problem.vehicles().len()
    );
    Ok(Arc::new(problem))
}

fn run_tsp(
    common: CommonArgs,
    selection: Option<SelectionKind>,
    crossover: Option<CrossoverKind>,
    mutation: Option<MutationKind>,
) -> Result<(), Box<dyn Error>> {
    let problem = load_problem(&common.instance)?;

    let mut config: Config = load_config(common.config.as_deref())?;
    if let Some(seed) = common.seed {
        config = config.with_seed(seed);
    }
    if let Some(selection) = selection {
        config = config.with_selection(selection);
    }
    if let Some(crossover) = crossover {
        config = config.with_crossover(crossover);
    }
    if let Some(mutation) = mutation {
        config = config.with_mutation(mutation);
    }
    let generations = common.generations.unwrap_or(500);

    let mut engine = TspEngine::new(problem, config)?;
    engine.run_for(generations)?;

    println!("Search completed in {}", format_duration(engine.elapsed()));
    match TspExport::new(&engine) {
        Some(export) => {
            println!("Best fitness: {:.2}", export.fitness);
            println!("Best distance: {:.2}", export.distance);
            println!("Route: {}", export.route.join(" -> "));
            match &export.vehicle_id {
                Some(vehicle) => println!("Cheapest vehicle: {}", vehicle),
                None => println!("No vehicle can cover this tour"),
            }
            if let Some(path) = &common.output {
                save_json(&export, path)?;
                println!("Saved result to: {}", path.display());
            }
        }
        None => println!("Nothing to route"),
    }

    Ok(())
}

fn run_vrp(common: CommonArgs) -> Result<(), Box<dyn Error>> {
    let problem = load_problem(&common.instance)?;

    let mut config: VrpConfig = load_config(common.config.as_deref())?;
    if let Some(seed) = common.seed {
        config = config.with_seed(seed);
    }
    if let Some(generations) = common.generations {
        config = config.with_generations(generations);
    }

    let mut engine = VrpEngine::new(Arc::clone(&problem), config);
    let outcome = engine.solve()?;

    println!("{}", SearchStatistics::from_outcome(&outcome).format());
    for (i, route) in outcome.solution.active_routes().enumerate() {
        let names: Vec<&str> = route
            .cities
            .iter()
            .map(|&c| problem.node(c).name.as_str())
            .collect();
        println!(
            "Route #{} ({}): {}",
            i + 1,
            problem.vehicles()[route.vehicle].name,
            names.join(" -> ")
        );
    }

    if let Some(path) = &common.output {
        save_json(&VrpExport::new(&outcome, &problem), path)?;
        println!("Saved result to: {}", path.display());
    }

    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match Cli::parse().command {
        Command::Tsp {
            common,
            selection,
            crossover,
            mutation,
        } => run_tsp(common, selection, crossover, mutation),
        Command::Vrp { common } => run_vrp(common),
    }
}
