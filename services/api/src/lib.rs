mod batch;
mod cli;
mod infra;
mod routes;
mod server;

use carebridge::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
