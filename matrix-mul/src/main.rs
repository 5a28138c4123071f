use std::env;
use std::process;

use matrix_mul::{Error, ProcessLauncher, Report, RunConfig, worker};

fn main() {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let args: Vec<String> = env::args().collect();

    if worker::is_worker_invocation(args.get(1..).unwrap_or_default()) {
        if let Err(e) = worker::run_from_args(&args[2..]) {
            eprintln!("Worker error: {}", e);
            process::exit(1);
        }
        return;
    }

    if args.len() != 4 {
        let program = args.first().map_or("matrix-mul", String::as_str);
        eprintln!(
            "Usage: {} <matrix_a_path> <matrix_b_path> <num_workers>",
            program
        );
        process::exit(1);
    }

    let result = RunConfig::from_args(&args[1], &args[2], &args[3]).and_then(run_coordinator);
    match result {
        Ok(report) => print!("{}", report.timings),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

#[tokio::main]
async fn run_coordinator(config: RunConfig) -> Result<Report, Error> {
    let launcher = ProcessLauncher::current_exe()?;
    matrix_mul::run(&config, launcher).await
}
