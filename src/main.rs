use std::process::ExitCode;

use swapscan::bootstrap::{init_tracing, parse_args, run};

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    init_tracing();

    let command = match parse_args(std::env::args().skip(1)) {
        Ok(command) => command,
        Err(e) => {
            tracing::error!("{e}");
            return ExitCode::from(2);
        }
    };

    if let Err(e) = run(command).await {
        tracing::error!("swapscan error: {e:#}");
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}
