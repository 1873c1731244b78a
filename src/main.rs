//! rhem - derive RHEM parameters, run the hillslope model and compare
//! scenarios by return period.

use anyhow::Context;
use chrono::Local;
use clap::{Parser, Subcommand};
use rhem_params::deck::parameter_report;
use rhem_params::model::{EditedRun, build_date, run_edited_deck, run_scenario};
use rhem_params::risk::TABLE_FILE;
use rhem_params::site::{SlopeShape, SoilTextureClass};
use rhem_params::{Executable, Parameters, RiskAssessment, RunConfig, ScenarioFile};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(
    name = "rhem",
    version,
    about = "Rangeland Hydrology and Erosion Model parameterization and runs"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Derive parameters for a scenario and run the model
    Run {
        /// Run configuration TOML
        #[arg(short, long)]
        config: PathBuf,

        /// Scenario TOML (site table and station precipitation)
        #[arg(short, long)]
        scenario: PathBuf,
    },

    /// Run the model with a hand-edited parameter deck
    EditPar {
        #[arg(short, long)]
        config: PathBuf,

        /// Parameter deck to run
        #[arg(short, long)]
        par: PathBuf,

        /// Scenario name used for the output files
        #[arg(short, long)]
        name: String,

        /// State of the climate station, e.g. AZ
        #[arg(long)]
        state: String,

        /// Climate station identifier
        #[arg(long)]
        station: String,

        /// Average yearly precipitation of the station [mm]
        #[arg(long)]
        precip: f64,
    },

    /// Compare alternative scenarios against a baseline by return period
    Risk {
        #[arg(short, long)]
        config: PathBuf,

        /// Detailed output file of the baseline run, in the workspace
        #[arg(short, long)]
        baseline: String,

        /// Detailed output files of up to five alternative runs
        #[arg(short, long, num_args = 1..)]
        scenario: Vec<String>,
    },

    /// List the accepted slope shapes
    Shapes,

    /// List the accepted soil texture classes
    Textures,
}

// Load the configuration and make its workspace absolute, since the model
// runs from inside it.
fn load_config(path: &Path) -> anyhow::Result<RunConfig> {
    let mut config = RunConfig::from_toml_file(path)
        .with_context(|| format!("loading configuration {}", path.display()))?;
    fs::create_dir_all(&config.workspace)
        .with_context(|| format!("creating workspace {}", config.workspace.display()))?;
    config.workspace = config.workspace.canonicalize()?;
    Ok(config)
}

fn print_report(parameters: &Parameters) {
    for (name, value) in parameter_report(parameters) {
        println!("{name:<8}= {value}");
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let built = build_date(Local::now().naive_local());

    match cli.command {
        Command::Run { config, scenario } => {
            let config = load_config(&config)?;
            let textures = config.soil_textures()?;
            let scenario = ScenarioFile::from_toml_file(&scenario)?;
            let runner = Executable::new(&config.rhem_executable, &config.workspace);
            let (parameters, run) = run_scenario(&config, &textures, scenario, &runner, &built)?;
            print_report(&parameters);
            println!("{} storms, summary in {}", run.storms, run.summary_file.display());
        }
        Command::EditPar {
            config,
            par,
            name,
            state,
            station,
            precip,
        } => {
            let config = load_config(&config)?;
            let edited = EditedRun {
                scenario_name: &name,
                state_id: &state,
                station_id: &station,
                avg_yearly_precip: precip,
            };
            let runner = Executable::new(&config.rhem_executable, &config.workspace);
            let (parameters, run) = run_edited_deck(&config, &par, &edited, &runner, &built)?;
            print_report(&parameters);
            println!("{} storms, summary in {}", run.storms, run.summary_file.display());
        }
        Command::Risk {
            config,
            baseline,
            scenario,
        } => {
            let config = load_config(&config)?;
            let assessment = RiskAssessment::new(&config.workspace, baseline, scenario)?;
            let runner = Executable::new(&config.risk_executable, &config.workspace);
            let rows = assessment.run(&runner)?;
            let table = config.workspace.join(TABLE_FILE);
            print!("{}", fs::read_to_string(&table)?);
            println!("{} return periods written to {}", rows.len(), table.display());
        }
        Command::Shapes => {
            for shape in SlopeShape::ALL {
                println!("{}", shape.label());
            }
        }
        Command::Textures => {
            for class in SoilTextureClass::ALL {
                println!("{}", class.label());
            }
        }
    }
    Ok(())
}
