//! Main entry point for the Bizdash server.

use std::sync::Arc;

use bizdash_persistence::Database;
use bizdash_server::{
    model::{AppState, Configuration},
    startup,
};
use tracing::info;

#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let configuration = Configuration::new()?;

    let logging_config = configuration.logging_config();
    let _logging_guard = startup::init_logging(&logging_config)?;

    let database_config = configuration.database_config();
    info!(
        database = %database_config.db_path().display(),
        "Opening database"
    );
    let database = Database::connect(database_config).await?;

    let server_address = configuration.server_address();
    let server_port = configuration.server_port();
    let context_path = configuration.server_context_path();

    let app_state = Arc::new(AppState::new(configuration, database));

    info!(
        address = %server_address,
        port = server_port,
        context_path = %context_path,
        "Starting HTTP server"
    );

    startup::main_server(app_state, context_path, server_address, server_port)?.await?;

    info!("Server stopped");
    Ok(())
}
