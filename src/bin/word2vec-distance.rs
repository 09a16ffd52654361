//! word2vec distance tool
//!
//! Prints the nearest neighbors of one or more terms in a word2vec binary
//! model. With `--interactive`, keeps the model loaded and reads one query
//! per line from stdin.

use clap::Parser;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};
use word2vec::{EmbeddingModel, Lookup, ParseConfig, QueryConfig};

/// Nearest neighbors in a word2vec model
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// word2vec binary model file
    #[arg(value_name = "VECTOR_FILE")]
    vector_file: PathBuf,

    /// Search terms (required unless --interactive)
    #[arg(value_name = "TERMS", required_unless_present = "interactive")]
    terms: Vec<String>,

    /// Number of neighbors to print
    #[arg(short, long, env = "NEIGHBORS_COUNT", default_value_t = 10)]
    neighbors_count: usize,

    /// Resolve terms through a hash index instead of a linear scan
    #[arg(long)]
    mapped: bool,

    /// Reject models containing words that are not valid UTF-8
    #[arg(long)]
    validate_utf8: bool,

    /// Read queries from stdin until EXIT
    #[arg(short, long)]
    interactive: bool,
}

fn main() -> anyhow::Result<()> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("word2vec=info".parse()?))
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    if args.neighbors_count == 0 {
        anyhow::bail!("--neighbors-count must be positive");
    }

    let parse_config = ParseConfig::default().with_validate_utf8(args.validate_utf8);
    let query_config = QueryConfig::default()
        .with_neighbors_count(args.neighbors_count)
        .with_lookup(if args.mapped {
            Lookup::Mapped
        } else {
            Lookup::Linear
        });

    info!("Loading {}", args.vector_file.display());
    let model = EmbeddingModel::parse_file(&args.vector_file, &parse_config)?;

    let mut out = io::stdout().lock();

    if !args.terms.is_empty() {
        run_query(&model, &args.terms, &query_config, &mut out)?;
    }

    if args.interactive {
        repl(&model, &query_config, &mut out)?;
    }

    Ok(())
}

fn repl(model: &EmbeddingModel, config: &QueryConfig, out: &mut impl Write) -> anyhow::Result<()> {
    let stdin = io::stdin();
    let mut input = String::new();

    loop {
        write!(out, "Enter word or sentence (EXIT to break): ")?;
        out.flush()?;

        input.clear();
        if stdin.lock().read_line(&mut input)? == 0 {
            break;
        }
        let line = input.trim();

        if line.is_empty() {
            continue;
        }

        if line == "EXIT" || line.eq_ignore_ascii_case("quit") || line.eq_ignore_ascii_case("exit") {
            break;
        }

        let terms: Vec<String> = line.split_whitespace().map(str::to_string).collect();
        if let Err(e) = run_query(model, &terms, config, out) {
            writeln!(out, "Error: {}", e)?;
        }
        writeln!(out)?;
    }

    Ok(())
}

/// Print the known terms with their rank, then the neighbors of those terms.
fn run_query(
    model: &EmbeddingModel,
    terms: &[String],
    config: &QueryConfig,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let known: Vec<(&String, usize)> = terms
        .iter()
        .filter_map(|term| {
            model
                .resolve_index(term, config.lookup)
                .map(|index| (term, index))
        })
        .collect();

    if known.is_empty() {
        anyhow::bail!("None of the provided terms existed in the model");
    }

    writeln!(out, "### Terms in model")?;
    writeln!(out)?;
    for (term, index) in &known {
        writeln!(out, "*   `{}`: `{}`", term, index)?;
    }

    let search_terms: Vec<&String> = known.iter().map(|(term, _)| *term).collect();
    let neighbors = model.nearest_neighbors(&search_terms, config)?;

    writeln!(out)?;
    writeln!(out, "### Neighbors")?;
    writeln!(out)?;
    for neighbor in &neighbors {
        writeln!(out, "*   `{}`: `{}`", neighbor.word_lossy(), neighbor.score)?;
    }

    Ok(())
}
