//! `hypart <element-values> <communities> [options...]`
//!
//! Loads the two auxiliary series, hands the remaining options to the
//! partitioner's own parser, and partitions the hypergraph once. SIGINT or
//! SIGTERM during partitioning writes a checkpoint before exiting.

use hypart::error::StartupError;
use hypart::exit_codes;
use hypart::io::checkpoint_store::JsonCheckpointStore;
use hypart::logging;
use hypart::orchestrator::{self, Collaborators};

fn main() {
    logging::init();
    std::process::exit(run());
}

fn run() -> i32 {
    let args = std::env::args_os().collect();
    match orchestrator::run(args, &Collaborators::standard(), JsonCheckpointStore) {
        Ok(outcome) => {
            if !outcome.context.output.quiet {
                println!("result: {}", outcome.summary);
                println!("result: part_weights={:?}", outcome.summary.part_weights);
                if outcome.context.output.write_partition {
                    println!(
                        "result: partition={}",
                        outcome.context.output.partition_filename.display()
                    );
                }
            }
            exit_codes::OK
        }
        Err(err) => {
            if let Some(usage) = err.downcast_ref::<clap::Error>() {
                usage.exit();
            }
            eprintln!("{:#}", err);
            err.downcast_ref::<StartupError>()
                .map(StartupError::exit_code)
                .unwrap_or(exit_codes::FAILURE)
        }
    }
}
