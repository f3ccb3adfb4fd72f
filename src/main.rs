use clap::{Parser as ClapParser, Subcommand};
use std::io::{self, Read};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use yamlexpr::cli::{self, CliError, OutputFormat, RenderOptions};

#[derive(ClapParser)]
#[command(name = "yamlexpr")]
#[command(about = "yamlexpr - Expand YAML templates with conditionals, loops, includes and matrices")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a template and print the resulting documents
    Render {
        /// Template file (reads --input or stdin if not provided)
        file: Option<PathBuf>,

        /// Inline YAML template
        #[arg(short, long)]
        input: Option<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Yaml)]
        format: OutputFormat,

        /// YAML or JSON file overriding directive keywords
        #[arg(long)]
        syntax: Option<PathBuf>,
    },

    /// List documentation topics
    Docs,

    /// Show documentation for a specific topic
    Doc {
        /// Topic name (use 'yamlexpr docs' to list topics)
        topic: String,
    },
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "yamlexpr=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Render {
            file,
            input,
            format,
            syntax,
        } => run_render(file, input, format, syntax),
        Commands::Docs => {
            print!("{}", cli::get_docs_overview());
            Ok(())
        }
        Commands::Doc { topic } => cli::get_doc_topic(&topic).map(|content| print!("{}", content)),
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn run_render(
    file: Option<PathBuf>,
    input: Option<String>,
    format: OutputFormat,
    syntax: Option<PathBuf>,
) -> Result<(), CliError> {
    let input = match (&file, input) {
        (Some(_), _) => None,
        (None, Some(s)) => Some(s),
        (None, None) if !atty::is(atty::Stream::Stdin) => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Some(buffer)
        }
        (None, None) => None,
    };

    let options = RenderOptions {
        file,
        input,
        syntax: syntax.as_deref().map(cli::load_syntax).transpose()?,
    };

    let docs = cli::execute_render(&options)?;
    print!("{}", cli::format_documents(&docs, format)?);
    Ok(())
}
