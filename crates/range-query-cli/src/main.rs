//! CLI for range counting over `balanced-tree`.
#![forbid(unsafe_code)]

mod bench;
mod config;
mod gen;

use std::collections::BTreeSet;
use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use balanced_tree::BalancedTree;
use clap::{ArgAction, Parser, Subcommand};
use eyre::{Result, WrapErr};
use rand::rngs::StdRng;
use rand::SeedableRng;
use range_query::DriverError;
use tracing::level_filters::LevelFilter;

use crate::config::Config;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    "\n",
    include_str!(concat!(env!("OUT_DIR"), "/build-info.txt")),
);

#[derive(Parser, Debug)]
#[command(name = "range-query", version, long_version = LONG_VERSION)]
#[command(about = "Count stored values in ranges using an AVL-balanced tree")]
struct Opt {
    /// Log more; may be repeated.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Configuration file. Defaults to `range-query.toml` if present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Execute `k`/`q` commands and print one count per query.
    Run {
        /// Command file; reads stdin when omitted.
        input: Option<PathBuf>,
        /// Use the standard BTreeSet instead of the balanced tree.
        #[arg(long)]
        reference: bool,
    },
    /// Generate random benchmark input.
    Gen {
        inserts: usize,
        queries: usize,
        /// Output file; writes to stdout when omitted.
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Values are drawn from [-N, N].
        #[arg(long, value_name = "N")]
        value_range: Option<i64>,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Time the balanced tree against BTreeSet on a command file.
    Bench {
        input: PathBuf,
        #[arg(short = 'n', long)]
        iterations: Option<u32>,
        /// Print the report as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Insert the values from a command file and print the tree as Graphviz.
    Dump {
        input: Option<PathBuf>,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();
}

fn read_input(input: Option<&Path>) -> Result<String> {
    let mut text = String::new();
    match input {
        Some(path) => {
            File::open(path)
                .and_then(|mut f| f.read_to_string(&mut text))
                .wrap_err_with(|| format!("reading {}", path.display()))?;
        }
        None => {
            io::stdin()
                .lock()
                .read_to_string(&mut text)
                .wrap_err("reading stdin")?;
        }
    }
    Ok(text)
}

fn input_name(input: Option<&Path>) -> String {
    input.map_or_else(|| "<stdin>".to_owned(), |p| p.display().to_string())
}

/// `name:line:column` of a byte offset into `text`, both 1-based.
fn location(name: &str, text: &str, offset: usize) -> String {
    let before = text.get(..offset).unwrap_or(text);
    let line = before.matches('\n').count() + 1;
    let column = before.len() - before.rfind('\n').map_or(0, |i| i + 1) + 1;
    format!("{}:{}:{}", name, line, column)
}

/// Attaches the position of the failing command to a driver error.
fn driver_report(input: Option<&Path>, text: &str, err: DriverError) -> eyre::Report {
    let name = input_name(input);
    let context = match err.offset() {
        Some(offset) => location(&name, text, offset),
        None => name,
    };
    eyre::Report::new(err).wrap_err(context)
}

fn main() -> Result<()> {
    let opt = Opt::parse();
    init_logging(opt.verbose);
    let config = Config::load(opt.config.as_deref())?;

    match opt.command {
        Command::Run { input, reference } => {
            let text = read_input(input.as_deref())?;
            let stdout = io::stdout();
            let mut out = BufWriter::new(stdout.lock());
            let result = if reference {
                range_query::driver::<BTreeSet<i64>, i64, _>(&text, &mut out).map(|set| set.len())
            } else {
                range_query::driver::<BalancedTree<i64>, i64, _>(&text, &mut out)
                    .map(|tree| tree.len())
            };
            out.flush()?;
            let values = result.map_err(|e| driver_report(input.as_deref(), &text, e))?;
            tracing::info!(values, reference, "done");
        }
        Command::Gen {
            inserts,
            queries,
            output,
            value_range,
            seed,
        } => {
            let value_range = value_range.unwrap_or(config.gen.value_range);
            let seed = seed.or(config.gen.seed).unwrap_or_else(rand::random);
            tracing::info!(seed, value_range, "generating");
            let mut rng = StdRng::seed_from_u64(seed);
            let blocks = gen::generate(&mut rng, inserts, queries, value_range)?;
            match &output {
                Some(path) => {
                    let mut f = BufWriter::new(
                        File::create(path).wrap_err_with(|| format!("creating {}", path.display()))?,
                    );
                    gen::write_blocks(&mut f, &blocks)?;
                    println!(
                        "Generated {} inserts and {} queries in '{}'.",
                        inserts,
                        queries,
                        path.display()
                    );
                }
                None => gen::write_blocks(&mut io::stdout().lock(), &blocks)?,
            }
        }
        Command::Bench {
            input,
            iterations,
            json,
        } => {
            let text = fs::read_to_string(&input)
                .wrap_err_with(|| format!("reading {}", input.display()))?;
            let iterations = iterations.unwrap_or(config.bench.iterations);
            let report = bench::compare(&input.display().to_string(), &text, iterations)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", report);
            }
        }
        Command::Dump { input } => {
            let text = read_input(input.as_deref())?;
            let tree = range_query::driver::<BalancedTree<i64>, i64, _>(&text, &mut io::sink())
                .map_err(|e| driver_report(input.as_deref(), &text, e))?;
            tracing::debug!(values = tree.len(), height = tree.height(), "dumping");
            let stdout = io::stdout();
            let mut out = stdout.lock();
            tree.dump(&mut out)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_is_consistent() {
        Opt::command().debug_assert();
    }

    #[test]
    fn error_location() {
        let text = "k 1\nk 2 q 0\nx 5";
        assert_eq!(location("in.txt", text, 0), "in.txt:1:1");
        assert_eq!(location("in.txt", text, 6), "in.txt:2:3");
        assert_eq!(location("in.txt", text, 12), "in.txt:3:1");
        assert_eq!(location("in.txt", text, text.len()), "in.txt:3:4");
    }

    #[test]
    fn driver_errors_carry_position() {
        let text = "k 1\nq 0 abc";
        let err = range_query::driver::<BalancedTree<i64>, i64, _>(text, &mut io::sink()).unwrap_err();
        let report = driver_report(Some(Path::new("cmds.txt")), text, err);
        assert_eq!(report.to_string(), "cmds.txt:2:5");
        assert!(matches!(
            report.downcast_ref::<DriverError>(),
            Some(DriverError::WrongInput { offset: 8 })
        ));

        let closed = DriverError::Io(io::Error::other("closed"));
        assert_eq!(driver_report(None, "", closed).to_string(), "<stdin>");
    }

    #[test]
    fn parses_subcommands() {
        let opt = Opt::try_parse_from(["range-query", "-vv", "run", "--reference", "data.txt"]).unwrap();
        assert_eq!(opt.verbose, 2);
        assert!(matches!(
            opt.command,
            Command::Run { reference: true, input: Some(ref p) } if p == Path::new("data.txt")
        ));

        let opt = Opt::try_parse_from(["range-query", "gen", "10", "5", "--seed", "7"]).unwrap();
        assert!(matches!(
            opt.command,
            Command::Gen { inserts: 10, queries: 5, seed: Some(7), value_range: None, output: None }
        ));

        let opt = Opt::try_parse_from(["range-query", "bench", "in.dat", "-n", "3", "--json"]).unwrap();
        assert!(matches!(opt.command, Command::Bench { iterations: Some(3), json: true, .. }));
    }
}
