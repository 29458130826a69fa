use activator_rs::{
    catalog::Catalog,
    resolve::{select_constructor, virtual_candidates, EmptyResolver},
    types::{TypeDescription, TypeRegistry},
};
use clap::Parser;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Dump the hierarchy and constructors of a catalog type"
)]
struct Args {
    /// The JSON type catalog to load
    catalog: String,
    /// The name of the type to dump (full, simple or case-insensitive)
    type_name: String,
}

fn print_type_info(ty: TypeDescription) {
    println!("Type: {} ({:?})", ty, ty.kind());

    let ancestors: Vec<_> = ty.ancestors().map(|t| t.to_string()).collect();
    if !ancestors.is_empty() {
        println!("Base types: {}", ancestors.join(" -> "));
    }
    let interfaces: Vec<_> = ty.all_interfaces().iter().map(|t| t.to_string()).collect();
    if !interfaces.is_empty() {
        println!("Interfaces: {}", interfaces.join(", "));
    }

    println!("\nFields:");
    for field in ty.fields() {
        let access = if field.writable { "" } else { " (read-only)" };
        println!("  - {}: {}{}", field.name, field.ty, access);
    }

    println!("\nConstructors:");
    for (i, ctor) in ty.constructors().iter().enumerate() {
        println!("  [{}] {}", i, ctor.signature(ty));
        for candidate in virtual_candidates(ctor) {
            let params: Vec<_> = candidate.parameters.iter().map(|p| p.name.as_str()).collect();
            println!("      score {:>5}: ({})", candidate.score(), params.join(", "));
        }
    }

    match select_constructor(ty, &EmptyResolver) {
        Ok(ctor) => println!("\nSelected without instances: {}", ctor.signature(ty)),
        Err(e) => println!("\nSelected without instances: none ({})", e),
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    let catalog: Catalog = match std::fs::read_to_string(&args.catalog) {
        Ok(text) => match text.parse() {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error loading catalog: {}", e);
                return ExitCode::from(1);
            }
        },
        Err(e) => {
            eprintln!("Error reading {}: {}", args.catalog, e);
            return ExitCode::from(1);
        }
    };

    let mut registry = TypeRegistry::new();
    if let Err(e) = catalog.load_into(&mut registry) {
        eprintln!("Error loading catalog: {}", e);
        return ExitCode::from(1);
    }

    match registry.find_type(&args.type_name) {
        Ok(ty) => {
            print_type_info(ty);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}", e);
            println!("\nAvailable types:");
            for t in registry.types() {
                println!("  {}", t);
            }
            ExitCode::from(1)
        }
    }
}
