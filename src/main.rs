//! Stencil CLI
//!
//! Usage:
//!   stencil [OPTIONS] [NAME]
//!
//! Compiles a named template (and every partial it references) from a
//! template directory, or an ad hoc template read from stdin. Useful for
//! checking a template tree before shipping it.

use std::fs;
use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use stencil::{Error, Repository, RepositoryConfig};

#[derive(Parser)]
#[command(name = "stencil")]
#[command(about = "Compile templates and their partials from a directory")]
struct Cli {
    /// Template name to compile (reads an ad hoc template from stdin if
    /// not provided)
    name: Option<String>,

    /// Directory holding the template files
    #[arg(short, long, default_value = ".")]
    dir: PathBuf,

    /// Template file extension
    #[arg(short, long, default_value = "mustache")]
    extension: String,

    /// Configuration file naming the template directory (overrides
    /// --dir and --extension)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the compiled node tree
    #[arg(long)]
    dump: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    // No name and an interactive stdin: nothing to compile, show help
    if cli.name.is_none() && io::stdin().is_terminal() {
        print_intro();
        return;
    }

    let repository = match &cli.config {
        Some(path) => match RepositoryConfig::from_file(path) {
            Ok(config) => config.into_repository(),
            Err(e) => {
                eprintln!("Error loading config '{}': {}", path.display(), e);
                process::exit(1);
            }
        },
        None => Repository::from_directory_with_extension(&cli.dir, cli.extension.as_str()),
    };

    let template = match &cli.name {
        Some(name) => match repository.compile_by_name(name, None) {
            Ok(template) => template,
            Err(e) => {
                report_error(&e, None);
                process::exit(1);
            }
        },
        None => {
            let mut buffer = String::new();
            if let Err(e) = io::stdin().read_to_string(&mut buffer) {
                eprintln!("Error reading from stdin: {}", e);
                process::exit(1);
            }
            match repository.compile_from_string(&buffer, None) {
                Ok(template) => template,
                Err(e) => {
                    report_error(&e, Some(&buffer));
                    process::exit(1);
                }
            }
        }
    };

    if cli.dump {
        print!("{}", template.dump_tree());
    } else {
        let what = template
            .id()
            .map(|id| id.to_string())
            .unwrap_or_else(|| "<stdin>".to_string());
        println!("compiled {} ({} nodes)", what, template.nodes().len());
    }
}

/// Print a compile failure, with source context for parse errors when the
/// failing text is available
fn report_error(err: &Error, stdin_source: Option<&str>) {
    if let Error::Compile { id, errors } = err {
        let (source, filename) = match (id, stdin_source) {
            (Some(id), _) => (
                fs::read_to_string(id.as_str()).unwrap_or_default(),
                id.to_string(),
            ),
            (None, Some(text)) => (text.to_string(), "<stdin>".to_string()),
            (None, None) => (String::new(), "<template>".to_string()),
        };
        for error in errors {
            eprint!("{}", error.format(&source, &filename));
        }
    } else {
        eprintln!("Error: {}", err);
    }
}

fn print_intro() {
    println!(
        r#"Stencil - template compilation with cached partial resolution

USAGE:
    stencil [OPTIONS] [NAME]
    echo '<template>' | stencil

OPTIONS:
    -d, --dir <DIR>         Template directory (default: current directory)
    -e, --extension <EXT>   Template file extension (default: mustache)
    -c, --config <FILE>     TOML config naming directory and extension
    --dump                  Print the compiled node tree
    -h, --help              Print help

QUICK START:
    stencil --dir templates profile

This compiles templates/profile.mustache and every {{{{>partial}}}} it
references, reporting unresolved names, parse errors, and circular
partial references."#
    );
}
