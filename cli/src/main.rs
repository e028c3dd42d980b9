use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use steiner_common::db::core::NetlistDB;
use steiner_common::db::parser::netlist;
use steiner_common::util::config::{Config, DetourFunction};
use steiner_common::util::generator::{self, BenchmarkParams};
use steiner_common::util::logger;
use steiner_router::generator::SpanningTreeGenerator;
use steiner_router::{RoutingTopology, resume};

#[derive(Parser)]
#[command(author, version, about = "Congestion- and timing-aware Steiner topology refinement", long_about = None)]
struct Args {
    #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Args, Default)]
struct OptimizeArgs {
    /// Netlist with HCAP/VCAP sections and NET records.
    #[arg(long)]
    input_file: Option<String>,
    #[arg(long)]
    outdir: Option<String>,
    #[arg(long)]
    loglevel: Option<String>,
    #[arg(long)]
    weight_wirelength: Option<f64>,
    #[arg(long)]
    weight_detour: Option<f64>,
    #[arg(long)]
    weight_overflow: Option<f64>,
    /// `exp` or `partial_linear`.
    #[arg(long)]
    detour_function: Option<DetourFunction>,
    /// Start from these topologies instead of generating them.
    #[arg(long)]
    resume_file: Option<String>,
    /// Write before/after PNGs of every improved net.
    #[arg(long)]
    render: bool,
}

#[derive(Subcommand)]
enum Commands {
    Optimize(OptimizeArgs),
    Generate {
        #[arg(long, default_value_t = 64)]
        width: usize,
        #[arg(long, default_value_t = 64)]
        height: usize,
        #[arg(long, default_value_t = 500)]
        nets: usize,
        #[arg(long, default_value_t = 8)]
        pins: usize,
        #[arg(long, default_value_t = 2)]
        min_capacity: i32,
        #[arg(long, default_value_t = 6)]
        max_capacity: i32,
        #[arg(long, default_value_t = 1)]
        seed: u64,
        #[arg(long, default_value = "inputs/random.txt")]
        output: String,
    },
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let command = args
        .command
        .unwrap_or_else(|| Commands::Optimize(OptimizeArgs::default()));

    let config_found = args.config.exists();
    let mut config: Config = if config_found {
        let config_str = std::fs::read_to_string(&args.config)
            .map_err(|e| anyhow::anyhow!("Failed to read config file: {}", e))?;
        toml::from_str(&config_str)
            .map_err(|e| anyhow::anyhow!("Failed to parse config TOML: {}", e))?
    } else {
        Config::default()
    };

    if let Commands::Optimize(opts) = &command {
        apply_overrides(&mut config, opts);
    }
    logger::init(&config.output.log_level);

    if config_found {
        log::info!("Loaded configuration from {:?}", args.config);
    } else {
        log::warn!(
            "Configuration file {:?} not found. Using internal defaults.",
            args.config
        );
    }

    match command {
        Commands::Generate {
            width,
            height,
            nets,
            pins,
            min_capacity,
            max_capacity,
            seed,
            output,
        } => {
            if let Some(parent) = Path::new(&output).parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            let params = BenchmarkParams {
                grid_width: width,
                grid_height: height,
                num_nets: nets,
                max_pins_per_net: pins,
                min_capacity,
                max_capacity,
                seed,
                ..BenchmarkParams::default()
            };
            generator::generate_random_netlist(&output, &params)?;
            log::info!("Generated: {}", output);
        }
        Commands::Optimize(_) => run_optimize(&config)?,
    }

    Ok(())
}

fn apply_overrides(config: &mut Config, opts: &OptimizeArgs) {
    if let Some(v) = &opts.input_file {
        config.input.netlist_file = Some(v.clone());
    }
    if let Some(v) = &opts.outdir {
        config.output.directory = v.clone();
    }
    if let Some(v) = &opts.loglevel {
        config.output.log_level = v.clone();
    }
    if let Some(v) = opts.weight_wirelength {
        config.weights.wirelength = v;
    }
    if let Some(v) = opts.weight_detour {
        config.weights.detour = v;
    }
    if let Some(v) = opts.weight_overflow {
        config.weights.overflow = v;
    }
    if let Some(v) = opts.detour_function {
        config.detour.function = v;
    }
    if let Some(v) = &opts.resume_file {
        config.input.resume_file = Some(v.clone());
    }
    if opts.render {
        config.output.render = true;
    }
}

fn run_optimize(config: &Config) -> anyhow::Result<()> {
    let input = config
        .input
        .netlist_file
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("No input file given (--input-file or [input] netlist_file)"))?;
    if !Path::new(input).exists() {
        return Err(anyhow::anyhow!("Input netlist missing: {}", input));
    }

    let outdir = Path::new(&config.output.directory);
    if !outdir.exists() {
        log::info!("Creating output directory: {:?}", outdir);
        std::fs::create_dir_all(outdir)?;
    }

    let db = load_netlist(input)?;
    log::info!(
        "Weights: wirelength {}, detour {} ({:?}), overflow {}",
        config.weights.wirelength,
        config.weights.detour,
        config.detour.function,
        config.weights.overflow
    );

    let topologies = initial_topologies(&db, config, outdir)?;

    let mut forest = steiner_router::build_forest(&db, topologies, config)?;
    log::info!("Cost before optimization:\n{}", forest.cost_summary());
    steiner_router::optimize_forest(&mut forest)?;
    log::info!("Cost after optimization:\n{}", forest.cost_summary());

    resume::save_resume(
        &outdir.join(&config.output.final_topology_file),
        resume::entries(forest.trees()),
    )?;
    steiner_router::save_steiner_trees(&outdir.join(&config.output.steiner_file), forest.trees())?;

    Ok(())
}

fn load_netlist(input: &str) -> anyhow::Result<NetlistDB> {
    let mut db = NetlistDB::new();
    netlist::parse(&mut db, input)?;
    Ok(db)
}

fn initial_topologies(
    db: &NetlistDB,
    config: &Config,
    outdir: &Path,
) -> anyhow::Result<Vec<RoutingTopology>> {
    if let Some(path) = &config.input.resume_file {
        return resume::read_resume(Path::new(path), &steiner_router::net_shapes(db));
    }

    let generator = SpanningTreeGenerator::new(config.generator.fast_two_pin);
    let topologies = steiner_router::generate_topologies(db, &generator)?;
    resume::save_resume(
        &outdir.join(&config.output.topology_file),
        db.nets.iter().map(|n| n.id).zip(&topologies),
    )?;
    Ok(topologies)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn netlist_error_reports_cause_once() {
        let path = std::env::temp_dir()
            .join(format!("steiner_cli_no_vcap_{}.txt", std::process::id()));
        std::fs::write(&path, "HCAP 1 2\n1 1\n").unwrap();
        let input = path.to_string_lossy().to_string();

        let err = load_netlist(&input).unwrap_err();
        std::fs::remove_file(&path).unwrap();

        let chain: Vec<String> = err.chain().map(|e| e.to_string()).collect();
        assert_eq!(
            chain,
            vec![
                format!("Invalid netlist '{}'", input),
                "VCAP section not found".to_string()
            ]
        );
    }

    #[test]
    fn overrides_replace_config_values() {
        let mut config = Config::default();
        let opts = OptimizeArgs {
            input_file: Some("in.txt".to_string()),
            render: true,
            ..OptimizeArgs::default()
        };
        apply_overrides(&mut config, &opts);
        assert_eq!(config.input.netlist_file.as_deref(), Some("in.txt"));
        assert!(config.output.render);
    }
}
