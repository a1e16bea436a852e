mod cli;

use std::process;

use clap::Parser;
use env_logger::Env;

use cli::Cli;

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    if let Err(e) = cli::run(cli) {
        eprintln!("{}: {e:#}", cli::describe(&e));
        process::exit(1);
    }
}
