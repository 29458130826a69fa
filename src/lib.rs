//! # activator-rs
//!
//! Builds objects of described types out of loosely typed inputs.
//!
//! - [`resolve`] hands out objects by type: an [`InstancePoolResolver`] serves
//!   a fixed set of instances and builds anything else it can by picking the
//!   single best constructor whose parameters it can itself supply.
//! - [`activation`] builds one object from named values harvested from a
//!   document, ranking constructors by how well the values cover them and
//!   using a resolver as fallback for everything else.
//!
//! Types are described at runtime through a [`TypeRegistry`], either in code
//! or from a JSON [`catalog`].
use clap::Parser;
use std::{fs, path::PathBuf, process::ExitCode};

pub mod activation;
pub mod catalog;
pub mod config;
pub mod error;
pub mod resolve;
pub mod source;
pub mod types;
pub mod utils;
pub mod value;

pub use activation::Activator;
pub use config::ActivatorConfig;
pub use resolve::{InstancePoolResolver, InstanceResolver, Resolver};
pub use types::{TypeDescription, TypeRegistry};
pub use value::{ObjectRef, Value};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Build an object from a JSON document using a type catalog"
)]
pub struct Args {
    /// JSON type catalog
    #[arg(short, long, value_name = "FILE")]
    pub catalog: PathBuf,
    /// JSON document describing the object to build
    #[arg(short, long, value_name = "FILE")]
    pub document: PathBuf,
    /// Declared type of the document
    #[arg(short = 't', long = "type", value_name = "TYPE")]
    pub type_name: String,
    /// Pre-built instance for the resolver pool, built from a JSON document
    #[arg(short, long, value_name = "TYPE=FILE", value_parser = parse_seed)]
    pub seed: Vec<(String, PathBuf)>,
    /// Print resolver cache statistics to stderr
    #[arg(long)]
    pub stats: bool,
}

fn parse_seed(s: &str) -> Result<(String, PathBuf), String> {
    match s.split_once('=') {
        Some((ty, file)) if !ty.trim().is_empty() && !file.is_empty() => {
            Ok((ty.trim().to_string(), PathBuf::from(file)))
        }
        _ => Err(format!("expected TYPE=FILE, got {s:?}")),
    }
}

fn read_document(path: &PathBuf) -> Result<source::Node, Box<dyn std::error::Error>> {
    let text = fs::read_to_string(path).map_err(|e| format!("{}: {e}", path.display()))?;
    let json: serde_json::Value = serde_json::from_str(&text)?;
    Ok(source::Node::from_json("document", &json))
}

fn activate(
    registry: &TypeRegistry,
    config: &ActivatorConfig,
    type_name: &str,
    document: &PathBuf,
    fallback: Option<&dyn InstanceResolver>,
) -> Result<ObjectRef, Box<dyn std::error::Error>> {
    let declared = registry.find_type(type_name)?;
    let node = read_document(document)?;
    Ok(Activator::from_node(registry, declared, &node, config.clone()).create_instance(fallback)?)
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let catalog: catalog::Catalog = fs::read_to_string(&args.catalog)
        .map_err(|e| format!("{}: {e}", args.catalog.display()))?
        .parse()?;
    let mut registry = TypeRegistry::new();
    catalog.load_into(&mut registry)?;

    let config = ActivatorConfig::from_env();
    let seeds = args
        .seed
        .iter()
        .map(|(ty, file)| activate(&registry, &config, ty, file, None))
        .collect::<Result<Vec<_>, _>>()?;
    let pool = InstancePoolResolver::new(seeds);

    let object = activate(&registry, &config, &args.type_name, &args.document, Some(&pool))?;
    println!(
        "{}",
        serde_json::to_string_pretty(&value::json::object_to_json(&object))?
    );
    if args.stats {
        eprintln!("Resolver cache: {}", pool.stats());
    }
    Ok(())
}

pub fn run_cli() -> ExitCode {
    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(1)
        }
    }
}
