mod cli;
mod infra;
mod routes;
mod score;
mod server;

use culture_index::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
