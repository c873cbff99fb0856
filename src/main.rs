// src/main.rs

use cacher::errors::CacherError;
use cacher::{cli, logging, run};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = match cli::try_parse() {
        Ok(args) => args,
        Err(err) => {
            let _ = err.print();
            std::process::exit(cli::exit_code_for(&err));
        }
    };

    if let Err(err) = run_main(args).await {
        eprintln!("cacher error: {err:#}");
        if let CacherError::Usage(_) = err {
            eprintln!("\n{}", cli::render_usage());
        }
        std::process::exit(err.exit_code());
    }
}

async fn run_main(args: cli::CliArgs) -> cacher::errors::Result<()> {
    logging::init_logging(args.log_level)?;
    run(args).await
}
