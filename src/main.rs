use std::process::ExitCode;

fn main() -> ExitCode {
    activator_rs::run_cli()
}
