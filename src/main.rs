use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    match elitecuts::run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("elitecuts: {e}");
            ExitCode::FAILURE
        }
    }
}
