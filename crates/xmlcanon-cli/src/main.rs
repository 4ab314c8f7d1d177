use std::io::{self, Read, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;

use xmlcanon::Config;

#[derive(Debug, Parser)]
#[command(
    name = "xmlcanon",
    version,
    about = "Convert XML to canonical JSON (children are always arrays)"
)]
struct Args {
    /// Input XML file (defaults to stdin)
    #[arg(value_name = "INPUT")]
    input: Option<PathBuf>,
    /// Output file (defaults to stdout)
    #[arg(short, long, value_name = "OUTPUT")]
    output: Option<PathBuf>,
    /// Maximum element nesting depth
    #[arg(long, default_value_t = 128)]
    max_depth: u16,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let input_data = read_input(&args.input)?;
    let config = Config {
        max_depth: args.max_depth,
    };
    let doc = xmlcanon::canonicalize_str_with_config(&input_data, config)
        .context("failed to convert XML")?;

    let mut json = doc.to_json();
    json.push('\n');
    write_output(&args.output, json.as_bytes())?;
    Ok(())
}

fn read_input(path: &Option<PathBuf>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read input file {}", path.display())),
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read stdin")?;
            if buffer.trim().is_empty() {
                bail!("no input provided on stdin");
            }
            Ok(buffer)
        }
    }
}

fn write_output(path: &Option<PathBuf>, data: &[u8]) -> Result<()> {
    match path {
        Some(path) => std::fs::write(path, data)
            .with_context(|| format!("failed to write output file {}", path.display())),
        None => {
            let mut stdout = io::stdout();
            stdout.write_all(data).context("failed to write stdout")?;
            Ok(())
        }
    }
}
