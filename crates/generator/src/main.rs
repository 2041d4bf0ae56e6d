//! tapg CLI
//!
//! Generates the C wrappers and SQL bindings of the TA-Lib PostgreSQL
//! extension from a function catalog.

use clap::Parser as ClapParser;
use std::path::PathBuf;
use std::process;

#[derive(ClapParser)]
#[command(name = "tapg")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Generate PostgreSQL wrappers and SQL bindings for TA-Lib", long_about = None)]
struct Cli {
    /// Function catalog: TOML, or TA-Lib's ta_func_api.xml
    schema: PathBuf,

    /// Output path for the C wrapper source
    wrapper_output: PathBuf,

    /// Output path for the SQL binding script
    binding_output: PathBuf,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = tapg::GeneratorConfig::new()
        .with_schema(&cli.schema)
        .with_wrapper_output(&cli.wrapper_output)
        .with_binding_output(&cli.binding_output);

    match tapg::generate_files(&config) {
        Ok(_) => {
            println!(
                "Generated {} and {} from {}",
                cli.wrapper_output.display(),
                cli.binding_output.display(),
                cli.schema.display()
            );
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}
