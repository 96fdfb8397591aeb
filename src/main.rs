//! Paging MMU simulator - Main Entry Point
//!
//! Usage: paging-mmu [OPTIONS] <script> [output]
//!
//! Runs an operation script (alloc / write / read / free / dump, one per
//! line) against a simulated MMU and writes one result line per operation.

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use log::info;

use paging_mmu::constants::{DEFAULT_FRAME_SIZE, DEFAULT_MEM_SIZE};
use paging_mmu::io::{Script, write_results};
use paging_mmu::{Mmu, logger};

#[derive(Parser)]
#[command(name = "paging-mmu")]
#[command(about = "Simulated MMU - runs paging operations for several processes")]
struct Args {
    /// Operation script, one operation per line
    script: PathBuf,

    /// Output file for results (default: stdout)
    output: Option<PathBuf>,

    /// Physical memory size in bytes
    #[arg(long, default_value_t = DEFAULT_MEM_SIZE)]
    mem_size: usize,

    /// Frame size in bytes (power of two)
    #[arg(long, default_value_t = DEFAULT_FRAME_SIZE)]
    frame_size: usize,

    /// Print the final memory map to stderr
    #[arg(long)]
    dump: bool,

    /// Log MMU activity (-v for allocations, -vv for translations)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let args = Args::parse();
    logger::init(logger::level_for_verbosity(args.verbose)).map_err(|e| anyhow!("{}", e))?;
    run(&args)
}

fn run(args: &Args) -> Result<()> {
    let script = Script::from_file(&args.script)?;
    let mut mmu = Mmu::new(args.mem_size, args.frame_size).context("Invalid memory geometry")?;

    info!(
        "running {} operations on {} frames of {} bytes",
        script.operations.len(),
        mmu.frame_count(),
        mmu.frame_size()
    );

    let results = script.run(&mut mmu);

    match &args.output {
        Some(path) => write_results(path, &results)?,
        None => {
            for line in &results {
                println!("{}", line);
            }
        }
    }

    if args.dump {
        eprintln!("{}", mmu);
    }

    info!("{} free frames remain", mmu.free_frame_count());
    Ok(())
}
