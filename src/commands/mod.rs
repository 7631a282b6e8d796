use crate::{
    config::Config,
    database::{DatabaseManager, DatabaseManagerImpl},
    error::AppError,
};
use clap::Subcommand;
use tracing::info;

#[derive(Subcommand)]
pub enum Commands {
    /// Run database migrations and exit
    Migrate,
}

pub async fn handle_command(command: Commands, config: &Config) -> Result<(), AppError> {
    match command {
        Commands::Migrate => {
            let database = DatabaseManagerImpl::new_from_config(config)
                .await
                .map_err(AppError::Database)?;
            database.migrate().await.map_err(AppError::Database)?;
            info!("Migrations complete");
            Ok(())
        }
    }
}
