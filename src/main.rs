//! Batch driver: reads settings, a task, a rule set and the initial candidates,
//! runs the synthesis for every candidate and reports the outcome.
//!
//! Usage: `mechsynth [settings.toml]`

use std::path::PathBuf;
use std::process::ExitCode;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use mechsynth::interface::SynthesisInterface;
use mechsynth::persist::{load_candidates, load_rules, load_task, write_reports, write_steps};
use mechsynth::settings::Settings;
use mechsynth::{Result, SynthesisError};

fn required(path: &Option<PathBuf>, key: &str) -> Result<PathBuf> {
    path.clone()
        .ok_or_else(|| SynthesisError::Config(format!("missing setting '{key}'")))
}

fn run(settings: &Settings) -> Result<bool> {
    let task = load_task(&required(&settings.inputs.task, "inputs.task")?)?;
    let rules = load_rules(&required(&settings.inputs.rules, "inputs.rules")?)?;
    let candidates = load_candidates(&required(&settings.inputs.candidates, "inputs.candidates")?)?;
    if task.first_ef().is_none() {
        return Err(SynthesisError::MissingFirstEf);
    }

    let interface = SynthesisInterface::new(task, rules)
        .with_max_iterations(settings.search.max_iterations);
    let reports = if settings.search.parallel {
        interface.run_parallel(candidates)?
    } else {
        interface.run_all(&candidates)?
    };

    for report in &reports {
        match (&report.solution, report.failure) {
            (Some(solution), _) => {
                println!("{}: solved with cost {} via {}", report.candidate, solution.cost, solution.path.join(" -> "));
                println!("{}", solution.topology);
            }
            (None, reason) => println!("{}: no solution ({reason:?})", report.candidate),
        }
    }
    if let Some(path) = &settings.outputs.report {
        write_reports(path, &reports)?;
        info!(path = %path.display(), "wrote synthesis report");
    }
    if let Some(path) = &settings.outputs.steps {
        let logs: Vec<_> = reports.iter().map(|report| report.steps.clone()).collect();
        write_steps(path, &logs)?;
        info!(path = %path.display(), "wrote synthesis steps");
    }
    Ok(reports.iter().any(|report| report.is_solved()))
}

fn main() -> ExitCode {
    let path = std::env::args().nth(1);
    let settings = match Settings::load(path.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };
    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.logging.level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match run(&settings) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(2),
        Err(e) => {
            error!(error = %e, "synthesis failed");
            ExitCode::FAILURE
        }
    }
}
