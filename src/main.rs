use clap::Parser as _;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use just_argv::parser::Parser;
use just_argv::schema::SchemaRegistry;
use just_argv::shell::split_line;

#[derive(clap::Parser)]
#[command(name = "just-argv")]
#[command(about = "Parse and validate an argument vector against a command schema")]
#[command(version)]
struct Cli {
    /// Schema document (.toml, .yaml, .yml or .json)
    #[arg(short = 's', long = "schema")]
    schema: PathBuf,

    /// Parse a single shell-style line instead of trailing tokens
    #[arg(short = 'l', long = "line")]
    line: Option<String>,

    /// Print bound contexts as JSON
    #[arg(long = "json")]
    json: bool,

    /// Print the lexed node tree without binding
    #[arg(long = "tree")]
    tree: bool,

    /// Enable debug logging on stderr
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,

    /// Tokens to parse
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    tokens: Vec<String>,
}

/// Failure of a run: validation errors exit 1, anything that prevents
/// parsing from starting exits 2.
struct Failure {
    message: String,
    code: u8,
}

impl Failure {
    fn fatal(e: impl std::fmt::Display) -> Self {
        Self { message: e.to_string(), code: 2 }
    }
}

impl From<just_argv::ParseError> for Failure {
    fn from(e: just_argv::ParseError) -> Self {
        let code = if e.is_fatal() { 2 } else { 1 };
        Self { message: e.to_string(), code }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { LevelFilter::DEBUG } else { LevelFilter::WARN };
    let env_filter = EnvFilter::builder()
        .with_default_directive(default.into())
        .from_env_lossy();
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init();
}

fn run(cli: Cli) -> Result<(), Failure> {
    let registry = SchemaRegistry::from_path(&cli.schema).map_err(Failure::fatal)?;

    let tokens = match cli.line {
        Some(ref line) => split_line(line).map_err(Failure::fatal)?,
        None => cli.tokens,
    };
    tracing::debug!(count = tokens.len(), "parsing tokens");

    let parser = Parser::new(&registry);

    if cli.tree {
        for node in parser.lex(&tokens)? {
            for (depth, child) in node.walk() {
                println!("{}{} @{}", "  ".repeat(depth), child, child.index());
            }
        }
        return Ok(());
    }

    let contexts = parser.parse(&tokens)?;
    if cli.json {
        let rendered = serde_json::to_string_pretty(&contexts).map_err(Failure::fatal)?;
        println!("{}", rendered);
    } else {
        for ctx in &contexts {
            println!("{}", ctx);
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(failure) => {
            eprintln!("error: {}", failure.message);
            ExitCode::from(failure.code)
        }
    }
}
