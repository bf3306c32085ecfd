use clap::{Parser, Subcommand};
use packed_bloom_rs::{
    BloomFilter, FilterBuilder,
    common::{bits2hr, bytes2hr},
};
use std::{
    fs::File,
    io::{self, BufRead, BufWriter, Write},
    path::{Path, PathBuf},
    process::ExitCode,
};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a filter from newline-delimited items on stdin
    Create {
        /// Confidence percentage between 0 and 100 (99 means 1% false positives)
        #[arg(short, long, default_value = "95")]
        probability: f64,

        /// Where to write the serialized filter
        #[arg(short, long, default_value = "filter.txt")]
        output: PathBuf,

        /// Worker threads used for insertion
        #[arg(short, long, default_value = "1")]
        workers: usize,
    },

    /// Read a serialized filter from stdin and query it
    Load {
        /// Words to look up
        #[arg(short, long = "query", default_values_t = [String::from("saphal")])]
        queries: Vec<String>,
    },

    /// Read a serialized filter from stdin and print its statistics
    Info {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Items are read until the first empty line or end of input.
fn read_items<R: BufRead>(input: R) -> io::Result<Vec<Vec<u8>>> {
    let mut items = Vec::new();
    for line in input.split(b'\n') {
        let mut line = line?;
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        if line.is_empty() {
            break;
        }
        items.push(line);
    }
    Ok(items)
}

fn create(probability: f64, output: &Path, workers: usize) -> CliResult<()> {
    let items = read_items(io::stdin().lock())?;
    info!(items = items.len(), probability, "Read dataset from stdin");

    let mut builder = FilterBuilder::new(probability, items.len() as u64)?;
    println!("Created {builder} ({})", bits2hr(builder.size()));

    if workers > 1 {
        builder.insert_all_parallel(&items, workers)?;
    } else {
        builder.insert_all(&items);
    }

    let filter = builder.finalize();
    debug!(%filter, "Finalized filter");
    println!("After inserting {} items: {}", items.len(), filter);

    let mut writer = BufWriter::new(File::create(output)?);
    filter.write_to(&mut writer)?;
    writer.flush()?;

    let encoded = filter.stats().encoded_bytes;
    info!(path = %output.display(), bytes = encoded, "Saved filter");
    println!("Size of filter: {}", bytes2hr(encoded));
    Ok(())
}

fn load(queries: &[String]) -> CliResult<()> {
    let filter = BloomFilter::read_from(io::stdin().lock())?;
    info!(bits = filter.size(), "Loaded filter from stdin");
    println!("Loaded {filter}");

    for word in queries {
        println!(
            "The filter contains the word {word}: {}",
            filter.may_contain(word.as_bytes())
        );
    }
    Ok(())
}

fn show_info(json: bool) -> CliResult<()> {
    let filter = BloomFilter::read_from(io::stdin().lock())?;
    let stats = filter.stats();

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!("Bit array length:   {}", stats.size_bits);
    println!("Encoded size:       {}", bytes2hr(stats.encoded_bytes));
    println!("Hash functions:     {}", stats.hash_functions);
    println!("Set bits:           {}", stats.set_bits);
    println!("Fill ratio:         {:.4}", stats.fill_ratio);
    println!("Estimated FP rate:  {:.6}", stats.estimated_fpr);
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    let result = match &cli.command {
        Commands::Create {
            probability,
            output,
            workers,
        } => create(*probability, output, *workers),
        Commands::Load { queries } => load(queries),
        Commands::Info { json } => show_info(*json),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
