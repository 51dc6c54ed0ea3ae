use std::fs::{self, File};
use std::io::{self, Read};
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, LevelFilter};
use pegc::Grammar;

#[derive(Parser)]
#[command(name = "pegc")]
#[command(about = "Parse a file with a PEG grammar and print the parse tree")]
struct Args {
    /// Path to the grammar file
    grammar: PathBuf,
    /// File to parse, stdin if omitted
    input: Option<PathBuf>,
    /// Fail unless the whole input is consumed
    #[arg(long)]
    complete: bool,
    /// Print the compiled grammar instead of parsing
    #[arg(long)]
    print_grammar: bool,
}

fn main() -> Result<()> {
    let level = std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".to_owned());
    let level = LevelFilter::from_str(&level).context("invalid RUST_LOG level")?;
    simplelog::TermLogger::init(
        level,
        simplelog::ConfigBuilder::new()
            .set_time_format_custom(&[])
            .build(),
        simplelog::TerminalMode::Stderr,
        simplelog::ColorChoice::Never,
    )
    .context("failed to init logger")?;

    let args = Args::parse();

    let source = fs::read_to_string(&args.grammar)
        .with_context(|| format!("failed to read grammar {}", args.grammar.display()))?;
    let grammar = Grammar::compile(&source)
        .with_context(|| format!("failed to compile grammar {}", args.grammar.display()))?;

    if args.print_grammar {
        print!("{}", grammar);
        return Ok(());
    }

    let mut input = Vec::new();
    match &args.input {
        Some(path) => File::open(path)
            .and_then(|mut f| f.read_to_end(&mut input))
            .with_context(|| format!("failed to read input {}", path.display()))?,
        None => io::stdin()
            .read_to_end(&mut input)
            .context("failed to read stdin")?,
    };

    let tree = if args.complete {
        grammar.parse_complete(&input).context("parse failed")?
    } else {
        let parse = grammar.parse(&input).context("parse failed")?;
        debug!("consumed {} of {} bytes", parse.consumed, input.len());
        parse.tree
    };
    print!("{}", tree);

    Ok(())
}
