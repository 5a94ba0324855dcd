use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use vf_app::{AppResult, BenchReport, load_scenario, run_scenario_with_progress, validate_scenario};
use vf_core::units::{cc, liters};
use vf_sim::BenchProgress;

#[derive(Parser)]
#[command(name = "vf-cli")]
#[command(about = "Ventiflow CLI - ventilator actuator bench tool", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate scenario file syntax and structure
    Validate {
        /// Path to the scenario YAML file
        scenario_path: PathBuf,
    },
    /// Run a bench scenario
    Run {
        /// Path to the scenario YAML file
        scenario_path: PathBuf,
        /// Write the recorded trace as CSV
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Write the archival run record as JSON
        #[arg(long)]
        json: Option<PathBuf>,
        /// Suppress the progress line
        #[arg(short, long)]
        quiet: bool,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Validate { scenario_path } => cmd_validate(&scenario_path),
        Commands::Run {
            scenario_path,
            output,
            json,
            quiet,
        } => cmd_run(&scenario_path, output.as_deref(), json.as_deref(), quiet),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn cmd_validate(path: &std::path::Path) -> AppResult<()> {
    let scenario = load_scenario(path)?;
    let warnings = validate_scenario(&scenario)?;
    if warnings.is_empty() {
        println!("{}: OK", path.display());
    } else {
        println!("{}: OK with {} warning(s)", path.display(), warnings.len());
        for warning in warnings {
            println!("  warning: {warning}");
        }
    }
    Ok(())
}

fn cmd_run(
    path: &std::path::Path,
    output: Option<&std::path::Path>,
    json: Option<&std::path::Path>,
    quiet: bool,
) -> AppResult<()> {
    let scenario = load_scenario(path)?;

    let mut print_progress = |p: BenchProgress| {
        eprint!("\r  t = {:6.2} s  ({:3.0}%)", p.t, p.fraction_complete * 100.0);
    };
    let progress: Option<&mut dyn FnMut(BenchProgress)> = if quiet {
        None
    } else {
        Some(&mut print_progress)
    };

    let report = run_scenario_with_progress(&scenario, progress)?;
    if !quiet {
        eprintln!();
    }
    print_summary(&report);

    if let Some(csv_path) = output {
        vf_app::write_trace_csv(&report.trace, csv_path)?;
        println!("trace written to {}", csv_path.display());
    }
    if let Some(json_path) = json {
        vf_app::write_trace_json(&report, json_path)?;
        println!("run record written to {}", json_path.display());
    }
    Ok(())
}

fn print_summary(report: &BenchReport) {
    if let Some(name) = &report.scenario_name {
        println!("scenario: {name}");
    }
    let p = &report.final_parameters;
    println!(
        "ticks: {}  breaths: {}  final position: {:.0}",
        report.trace.ticks, report.trace.breaths, report.final_position
    );
    println!(
        "settings: rate {:.0}/min  Ti {:.2} s  Te {:.2} s  tidal volume {:.0} cc ({:.2} L)",
        p.rate,
        p.ti,
        p.te,
        p.volume,
        liters(cc(p.volume))
    );
    for warning in &report.warnings {
        println!("warning: {warning}");
    }
}
