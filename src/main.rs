mod args;
mod extract;

use clap::Parser;
use log::{debug, LevelFilter};

use crate::args::Args;
use crate::extract::{run, RunOptions};

fn main() {
    let args = Args::parse();

    let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
    if args.verbose {
        builder.filter_level(LevelFilter::Debug);
    } else if std::env::var_os("RUST_LOG").is_none() {
        builder.filter_level(LevelFilter::Info);
    }
    builder.init();
    debug!("args: {:?}", args);

    let options = RunOptions {
        config: args.config,
        input: args.input,
        input_type: args.input_type,
        out: args.out,
        stage: args.stage,
        workers: args.workers,
        reference: args.reference,
        pages: args.pages,
        section: args.section,
    };
    if let Err(e) = run(&options) {
        eprintln!("An error occurred: {}", e);
        if let Some(source) = std::error::Error::source(&e) {
            eprintln!("Caused by: {}", source);
        }
        std::process::exit(1);
    }
}
