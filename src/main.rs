use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing::info;

use common::utils::format_bytes;
use inference_engine::kernels::affine::AffineConfig;
use inference_engine::{DataRepresentation, Function, FunctionConfig, Shape, VariableRef};
use nnrt::Runtime;
use runtime_config::DispatchPolicy;

/// Runs the reference affine scenarios on the NNRT runtime
#[derive(Debug, Parser)]
#[command(name = "nnrt", version, about)]
struct Cli {
    /// Configuration file (TOML or JSON)
    #[arg(long, env = "NNRT_CONFIG")]
    config: Option<PathBuf>,

    /// Log level or filter directive, overrides the configuration
    #[arg(long)]
    log_level: Option<String>,

    /// Storage representation of the weight tensor
    #[arg(long, default_value = "float32")]
    weight_repr: DataRepresentation,

    /// Dispatch policy, overrides the configuration
    #[arg(long)]
    dispatch: Option<DispatchPolicy>,

    /// Print results as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Serialize)]
struct ScenarioReport {
    name: &'static str,
    weight_representation: String,
    output: Vec<f32>,
    footprint_bytes: u64,
}

fn shape(dims: &[usize]) -> Result<Shape> {
    Ok(Shape::new(dims.to_vec())?)
}

fn run_scenario(
    runtime: &Runtime,
    name: &'static str,
    weight_repr: DataRepresentation,
    with_bias: bool,
) -> Result<ScenarioReport> {
    let x = runtime.variable(DataRepresentation::Float32, shape(&[1, 2])?, &[1.0, 2.0])?;
    let w = runtime.variable(
        weight_repr,
        shape(&[2, 3])?,
        &[1.0, 0.0, 1.0, 0.0, 1.0, 1.0],
    )?;
    let y = runtime.variable(DataRepresentation::Float32, shape(&[1, 3])?, &[0.0; 3])?;

    let mut inputs: Vec<VariableRef> = vec![x, w];
    if with_bias {
        let bias = runtime.variable(DataRepresentation::Float32, shape(&[3])?, &[0.0, 0.0, 1.0])?;
        inputs.push(bias);
    }

    let mut all = inputs.clone();
    all.push(y.clone());
    let footprint = Runtime::footprint(&all);
    info!("Scenario '{}' binds {} of tensors", name, format_bytes(footprint));

    let mut functions = vec![Function::new(
        FunctionConfig::Affine(AffineConfig::default()),
        inputs,
        vec![y.clone()],
    )];
    runtime
        .run(&mut functions)
        .with_context(|| format!("scenario '{}' failed", name))?;
    if let Some(path) = functions[0].execution_path() {
        info!("Scenario '{}' ran on the {} path", name, path);
    }
    runtime.release(&mut functions)?;

    let output = y.read().to_f32_vec();
    Ok(ScenarioReport {
        name,
        weight_representation: weight_repr.to_string(),
        output,
        footprint_bytes: footprint,
    })
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = runtime_config::load(cli.config.as_deref())
        .context("failed to load configuration")?;
    if let Some(level) = cli.log_level {
        config.log.level = level;
    }
    if let Some(dispatch) = cli.dispatch {
        config.engine.dispatch = dispatch;
    }

    let runtime = Runtime::new(config)?;

    let reports = vec![
        run_scenario(&runtime, "affine with bias", cli.weight_repr, true)?,
        run_scenario(&runtime, "affine without bias", cli.weight_repr, false)?,
    ];

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        for report in &reports {
            println!(
                "{:<20} weight={:<8} output={:?} ({})",
                report.name,
                report.weight_representation,
                report.output,
                format_bytes(report.footprint_bytes)
            );
        }
    }

    Ok(())
}
