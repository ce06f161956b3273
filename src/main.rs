// src/main.rs

use bakrun::errors::Result;
use bakrun::{cli, logging, run};

#[tokio::main]
async fn main() {
    if let Err(err) = run_main().await {
        eprintln!("bakrun error: {err:?}");
        std::process::exit(1);
    }
}

async fn run_main() -> Result<()> {
    let args = cli::parse();
    let log_path = logging::default_log_path(&args.config);
    logging::init_logging(args.log_level, Some(&log_path))?;
    tracing::info!(log_file = %log_path.display(), "session started");
    run(args).await
}
