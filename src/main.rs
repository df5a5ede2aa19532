use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use sarex::index::{
    IndexConfig, RecordSearch, SuffixArrayAccess, SuffixArrayBuilder, SuffixArrayReader,
    SuffixArrayWriter,
};
use sarex::output;
use sarex::regex::{ExecutorConfig, MatchMode};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sarex")]
#[command(about = "Regex search over a suffix-array index")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build an index from a file of records
    Index {
        /// Input file
        input: PathBuf,

        /// Index directory (default: <input>.sarex)
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Record delimiter: a single character, \n, \t, \0 or a byte value
        #[arg(short, long, default_value = "\\n", value_parser = parse_delim)]
        delim: u8,

        /// Fold ASCII case in the index
        #[arg(short = 'i', long)]
        ignore_case: bool,
    },
    /// Count occurrences of a literal
    Count {
        index: PathBuf,
        query: String,
    },
    /// Print the records containing a literal
    Search {
        index: PathBuf,
        query: String,

        /// Print records as JSON strings
        #[arg(long)]
        json: bool,
    },
    /// Evaluate a regex against the index
    Regex {
        index: PathBuf,
        regex: String,

        /// Report every match instead of the longest non-overlapping ones
        #[arg(short, long)]
        all: bool,

        /// Print JSON lines
        #[arg(long)]
        json: bool,

        /// Print matching records instead of matches
        #[arg(short, long)]
        records: bool,

        /// Evaluate both sides of each '.*' in parallel
        #[arg(short, long)]
        parallel: bool,

        /// Give up after this many milliseconds
        #[arg(long)]
        timeout_ms: Option<u64>,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },
    /// Print a run of records
    Extract {
        index: PathBuf,
        first: u32,
        count: usize,
    },
    /// Show index statistics
    Stats {
        index: PathBuf,

        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Index {
            input,
            out,
            delim,
            ignore_case,
        } => {
            let data = std::fs::read(&input)
                .with_context(|| format!("Failed to read {}", input.display()))?;

            let mut builder = SuffixArrayBuilder::new(IndexConfig {
                record_delim: delim,
                case_insensitive: ignore_case,
                ..Default::default()
            });
            let added = builder.add_text(&data);
            let built = builder.build();
            if built.excluded_count > 0 {
                eprintln!("Skipped {} records over the size limit", built.excluded_count);
            }

            let out = out.unwrap_or_else(|| input.with_extension("sarex"));
            SuffixArrayWriter::write(&out, &built)?;
            println!("Indexed {} records into {}", added, out.display());
        }
        Commands::Count { index, query } => {
            let reader = SuffixArrayReader::open(&index)?;
            println!("{}", reader.record_count(query.as_bytes()));
        }
        Commands::Search { index, query, json } => {
            let reader = SuffixArrayReader::open(&index)?;
            let records = reader.record_search(query.as_bytes());
            output::print_records(&records, json)?;
        }
        Commands::Regex {
            index,
            regex,
            all,
            json,
            records,
            parallel,
            timeout_ms,
            no_color,
        } => {
            let reader = SuffixArrayReader::open(&index)?;
            let config = ExecutorConfig {
                mode: if all {
                    MatchMode::NonGreedy
                } else {
                    MatchMode::Greedy
                },
                parallel,
                timeout: timeout_ms.map(Duration::from_millis),
            };

            if records {
                let found = reader.record_search_regex(&regex, &config)?;
                output::print_records(&found, json)?;
            } else {
                let matches = reader.regex_search(&regex, &config)?;
                info!(regex = %regex, matches = matches.len(), "regex search done");
                if json {
                    output::print_matches_json(&reader, &matches)?;
                } else {
                    output::print_matches(&reader, &matches, !no_color)?;
                }
            }
        }
        Commands::Extract {
            index,
            first,
            count,
        } => {
            let reader = SuffixArrayReader::open(&index)?;
            output::print_records(&reader.extract_records(first, count), false)?;
        }
        Commands::Stats { index, json } => {
            let reader = SuffixArrayReader::open(&index)?;
            output::print_stats(&reader.stats(), json)?;
            if reader.suffix_count() == 0 {
                eprintln!("Index is empty");
            }
        }
    }

    Ok(())
}

/// Parse a record delimiter argument
fn parse_delim(s: &str) -> Result<u8> {
    match s {
        "\\n" => return Ok(b'\n'),
        "\\t" => return Ok(b'\t'),
        "\\0" => return Ok(0),
        _ => {}
    }

    let bytes = s.as_bytes();
    if bytes.len() == 1 {
        return Ok(bytes[0]);
    }
    match s.parse::<u8>() {
        Ok(b) => Ok(b),
        Err(_) => bail!("delimiter must be a single byte, got '{}'", s),
    }
}
