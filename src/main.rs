use clap::Parser;
use longshot::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
