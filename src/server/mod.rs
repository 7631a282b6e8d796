use crate::{
    auth::{admin_middleware, cron_auth_middleware, identity_middleware},
    config::Config,
    cost_tracking::CostTrackingService,
    database::{DatabaseManager, DatabaseManagerImpl},
    error::AppError,
    jobs::{DailyResetJob, Job, JobScheduler, WeeklyResetJob},
    metering::MeteringService,
    routes::{
        create_admin_cost_routes, create_cost_routes, create_cron_routes, create_health_routes,
        create_usage_routes,
    },
};
use axum::{Router, middleware};
use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::{info, warn};

#[derive(Clone)]
pub struct Server {
    pub config: Arc<Config>,
    pub database: Arc<dyn DatabaseManager>,
    pub metering: Arc<MeteringService>,
    pub cost_service: Arc<CostTrackingService>,
}

impl Server {
    pub async fn new(config: Config) -> Result<Self, AppError> {
        // Initialize database
        let database_impl = Arc::new(
            DatabaseManagerImpl::new_from_config(&config)
                .await
                .map_err(AppError::Database)?,
        );
        let database: Arc<dyn DatabaseManager> = database_impl;

        let metering = Arc::new(MeteringService::new(database.clone()));
        let cost_service = Arc::new(CostTrackingService::new(database.clone()));

        Ok(Self {
            config: Arc::new(config),
            database,
            metering,
            cost_service,
        })
    }

    pub async fn run(&self) -> Result<(), AppError> {
        // Run database migrations on startup to ensure tables exist
        self.database.migrate().await.map_err(AppError::Database)?;

        // Seed the model price table in the background (now that migrations
        // are complete)
        let cost_service = self.cost_service.clone();
        tokio::spawn(async move {
            if let Err(e) = cost_service.seed_default_costs().await {
                warn!("Failed to seed default model costs: {}", e);
            }
        });

        // Start the embedded reset scheduler when configured
        let mut scheduler = JobScheduler::new(self.config.jobs.clone());
        let jobs: Vec<Arc<dyn Job>> = vec![
            Arc::new(DailyResetJob::new(self.metering.clone())),
            Arc::new(WeeklyResetJob::new(self.metering.clone())),
        ];
        scheduler.start(jobs).await?;

        let app = self.create_app();

        let addr = SocketAddr::from(([0, 0, 0, 0], self.config.server.port));
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to bind to address: {}", e)))?;

        info!("Server listening on http://{}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| AppError::Internal(format!("Server error: {}", e)))?;

        scheduler.stop().await;
        info!("Server shutdown complete");

        Ok(())
    }

    // Creates an application router
    pub fn create_app(&self) -> Router {
        Router::new()
            // Health check routes
            .nest("/health", create_health_routes())
            // User API routes
            .nest("/api", self.user_api_routes())
            // Admin API routes
            .nest("/api", self.admin_api_routes())
            // External reset trigger routes
            .nest("/cron", self.cron_routes())
            // All routes use Server as state
            .with_state(self.clone())
    }

    /// Helper method for user API routes
    fn user_api_routes(&self) -> Router<Server> {
        create_usage_routes()
            .merge(create_cost_routes())
            .layer(middleware::from_fn(identity_middleware))
    }

    /// Helper method for admin API routes
    fn admin_api_routes(&self) -> Router<Server> {
        create_admin_cost_routes()
            .layer(middleware::from_fn_with_state(
                self.clone(),
                admin_middleware,
            ))
            .layer(middleware::from_fn(identity_middleware))
    }

    /// Helper method for the shared-secret cron trigger routes
    fn cron_routes(&self) -> Router<Server> {
        create_cron_routes().layer(middleware::from_fn_with_state(
            self.clone(),
            cron_auth_middleware,
        ))
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install ctrl-c handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Graceful shutdown initiated");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::TestServerBuilder;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_health_check_without_identity() {
        let server = TestServerBuilder::new().build().await;
        let app = server.create_app();

        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_readiness_check() {
        let server = TestServerBuilder::new().build().await;
        let app = server.create_app();

        let request = Request::builder()
            .uri("/health/ready")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_usage_requires_identity() {
        let server = TestServerBuilder::new().build().await;
        let app = server.create_app();

        let request = Request::builder()
            .uri("/api/usage")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_admin_routes_require_admin() {
        let server = TestServerBuilder::new().build().await;
        let app = server.create_app();

        let request = Request::builder()
            .uri("/api/admin/costs")
            .header("x-user-id", "user_plain")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_cron_routes_require_secret() {
        let server = TestServerBuilder::new().build().await;
        let app = server.create_app();

        let request = Request::builder()
            .uri("/cron/reset-daily")
            .method("POST")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
