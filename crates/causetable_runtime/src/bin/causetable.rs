//! causetable CLI entry point.

use std::env;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use causetable_engine::{Dag, InferenceConfig, Query};
use causetable_foundation::Value;
use causetable_runtime::Repl;
use causetable_runtime::bif;
use causetable_runtime::datasets::simple_study_dataset;
use causetable_runtime::render::{RenderOptions, query_to_dot};
use causetable_runtime::serialize::{self, ModelSnapshot};

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

/// CLI configuration parsed from arguments.
#[derive(Default)]
struct CliConfig {
    file: Option<PathBuf>,
    given: Vec<(String, Value)>,
    intervene: Vec<(String, Value)>,
    rows: Option<usize>,
    seed: Option<u64>,
    sample: Option<usize>,
    save: Option<PathBuf>,
    show_table: bool,
    show_dot: bool,
    interactive: bool,
    show_help: bool,
    show_version: bool,
}

const DEFAULT_ROWS: usize = 10_000;

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("\x1b[31mError: {e}\x1b[0m");
            ExitCode::FAILURE
        }
    }
}

fn value_after<'a>(args: &'a [String], i: usize, flag: &str) -> CliResult<&'a str> {
    args.get(i)
        .map(String::as_str)
        .ok_or_else(|| format!("{flag} requires a value").into())
}

fn parse_pair(arg: &str, flag: &str) -> CliResult<(String, Value)> {
    match arg.split_once('=') {
        Some((k, v)) if !k.is_empty() && !v.is_empty() => {
            Ok((k.to_string(), Value::parse_token(v)))
        }
        _ => Err(format!("{flag} expects k=v, got '{arg}'").into()),
    }
}

fn parse_args(args: &[String]) -> CliResult<CliConfig> {
    let mut config = CliConfig::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => config.show_help = true,
            "-V" | "--version" => config.show_version = true,
            "--table" => config.show_table = true,
            "--dot" => config.show_dot = true,
            "--repl" => config.interactive = true,
            flag @ ("--given" | "--do") => {
                i += 1;
                let pair = parse_pair(value_after(args, i, flag)?, flag)?;
                if flag == "--given" {
                    config.given.push(pair);
                } else {
                    config.intervene.push(pair);
                }
            }
            flag @ ("--rows" | "--sample") => {
                i += 1;
                let raw = value_after(args, i, flag)?;
                let n = raw
                    .parse()
                    .map_err(|_| format!("invalid {flag} value: {raw}"))?;
                if flag == "--rows" {
                    config.rows = Some(n);
                } else {
                    config.sample = Some(n);
                }
            }
            "--seed" => {
                i += 1;
                let raw = value_after(args, i, "--seed")?;
                config.seed = Some(
                    raw.parse()
                        .map_err(|_| format!("invalid --seed value: {raw}"))?,
                );
            }
            "--save" => {
                i += 1;
                config.save = Some(PathBuf::from(value_after(args, i, "--save")?));
            }
            arg if arg.starts_with('-') => {
                return Err(format!("unknown option: {arg}").into());
            }
            path => {
                if config.file.is_some() {
                    return Err("only one model file can be given".into());
                }
                config.file = Some(PathBuf::from(path));
            }
        }
        i += 1;
    }

    Ok(config)
}

/// Loads the graph named on the command line, or the built-in study graph.
fn load_dag(config: &CliConfig) -> CliResult<Dag> {
    let rows = config.rows.unwrap_or(DEFAULT_ROWS);
    let Some(path) = &config.file else {
        let dag = Dag::new(simple_study_dataset()?)
            .add_edges([("study", "grade"), ("hard", "grade")])?;
        return Ok(dag);
    };

    if path.extension().is_some_and(|ext| ext == "bif") {
        let text = fs::read_to_string(path)
            .map_err(|e| format!("failed to read file '{}': {e}", path.display()))?;
        let network = bif::parse(&text)?;
        for warning in &network.warnings {
            eprintln!("\x1b[33mwarning:\x1b[0m {warning}");
        }
        Ok(network.to_dag(rows)?)
    } else {
        Ok(serialize::load_from_file(path)?.to_dag()?)
    }
}

fn run(args: Vec<String>) -> CliResult<()> {
    let config = parse_args(&args)?;

    if config.show_help {
        print_help();
        return Ok(());
    }

    if config.show_version {
        println!("causetable {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let dag = load_dag(&config)?;
    if let Some(path) = &config.save {
        serialize::save_to_file(&ModelSnapshot::from_dag(&dag), path)?;
        eprintln!("saved model to {}", path.display());
    }

    let dag = dag.bake()?;
    let mut inference = InferenceConfig::default();
    if let Some(seed) = config.seed {
        inference = inference.with_seed(seed);
    }
    let query = Query::new(dag.clone())
        .with_config(inference)
        .given(config.given.iter().map(|(k, v)| (k.as_str(), v.clone())))?
        .intervene(config.intervene.iter().map(|(k, v)| (k.as_str(), v.clone())))?;

    if config.interactive {
        let mut repl = Repl::new(dag)?.with_query(query);
        repl.run()?;
        return Ok(());
    }

    if config.show_dot {
        print!(
            "{}",
            query_to_dot(&query, &RenderOptions::default().with_emphasized_interventions(true))
        );
    } else if config.show_table {
        print!("{}", query.infer_table()?);
    } else if let Some(n) = config.sample {
        print!("{}", query.sample(n)?);
    } else {
        print!("{}", query.infer()?);
    }
    Ok(())
}

fn print_help() {
    println!(
        "\x1b[1mcausetable\x1b[0m - Exact causal inference over discrete data

\x1b[1mUSAGE:\x1b[0m
    causetable [OPTIONS] [FILE]

\x1b[1mARGUMENTS:\x1b[0m
    [FILE]    A .bif network or a saved model; defaults to the study example

\x1b[1mOPTIONS:\x1b[0m
    -h, --help         Print help information
    -V, --version      Print version information
    --given K=V        Condition on an observation (repeatable)
    --do K=V           Intervene on a variable (repeatable)
    --rows N           Observations generated from a .bif network (default {DEFAULT_ROWS})
    --table            Print the full posterior table
    --sample N         Print N rows drawn from the posterior
    --dot              Print the query as Graphviz DOT
    --seed N           Seed used for sampling
    --save PATH        Save the loaded model before querying
    --repl             Start an interactive session

\x1b[1mEXAMPLES:\x1b[0m
    causetable --given hard=yes                Grade odds on a hard exam
    causetable --do study=lots                 Effect of forcing study habits
    causetable alarm.bif --given D=yes --table Posterior of a BIF network
    causetable alarm.bif --save alarm.model    Convert a network to a model file
    causetable alarm.model --repl              Explore a saved model

\x1b[1mREPL COMMANDS:\x1b[0m
    given k=v, do k=v, infer, table, sample N, paths a b [z ..], dot, reset, help, quit
    Ctrl+D               Exit REPL
    Ctrl+C               Cancel current input"
    );
}
