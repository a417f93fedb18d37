use std::{process, sync::Arc};

use quaderno::{
    application::auth::{AuthService, TokenService},
    application::cache::TodoCache,
    application::error::AppError,
    application::repos::{TodosRepo, UsersRepo},
    application::todos::TodoService,
    config,
    infra::{
        cache::RedisTodoCache,
        db::PostgresRepositories,
        error::InfraError,
        http::{self, ApiState},
        telemetry,
    },
};
use tracing::{Dispatch, Level, dispatcher, error, info};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
    }
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let repositories = init_repositories(&settings).await?;
    let cache = init_cache(&settings).await?;
    let api_state = build_application_context(repositories, cache, &settings)?;

    serve_http(&settings, api_state).await
}

async fn init_repositories(
    settings: &config::Settings,
) -> Result<Arc<PostgresRepositories>, AppError> {
    let database_url = settings
        .database
        .url
        .as_ref()
        .ok_or_else(|| InfraError::configuration("database url is not configured"))
        .map_err(AppError::from)?;

    let pool = PostgresRepositories::connect(database_url, settings.database.max_connections.get())
        .await
        .map_err(|err| AppError::from(InfraError::database(err.to_string())))?;

    PostgresRepositories::ensure_schema(&pool)
        .await
        .map_err(|err| AppError::from(InfraError::database(err.to_string())))?;

    Ok(Arc::new(PostgresRepositories::new(pool)))
}

async fn init_cache(settings: &config::Settings) -> Result<RedisTodoCache, AppError> {
    let cache_url = settings
        .cache
        .url
        .as_ref()
        .ok_or_else(|| InfraError::configuration("cache url is not configured"))
        .map_err(AppError::from)?;

    RedisTodoCache::connect(cache_url, settings.cache.max_connections.get())
        .await
        .map_err(|err| AppError::from(InfraError::cache(err.to_string())))
}

fn build_application_context(
    repositories: Arc<PostgresRepositories>,
    cache: RedisTodoCache,
    settings: &config::Settings,
) -> Result<ApiState, AppError> {
    let token_secret = settings
        .auth
        .token_secret
        .as_ref()
        .ok_or_else(|| InfraError::configuration("auth token secret is not configured"))
        .map_err(AppError::from)?;

    let users_repo: Arc<dyn UsersRepo> = repositories.clone();
    let todos_repo: Arc<dyn TodosRepo> = repositories.clone();
    let todo_cache: Arc<dyn TodoCache> = Arc::new(cache);

    let tokens = Arc::new(TokenService::new(token_secret.as_bytes()));
    let auth = Arc::new(AuthService::new(users_repo, tokens.clone()));
    let todos = Arc::new(TodoService::new(todos_repo, todo_cache));

    Ok(ApiState::new(auth, todos, tokens, repositories))
}

async fn serve_http(settings: &config::Settings, api_state: ApiState) -> Result<(), AppError> {
    let router = http::build_api_router(api_state);

    let listener = tokio::net::TcpListener::bind(settings.server.public_addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;

    info!(
        target = "quaderno::serve",
        addr = %settings.server.public_addr,
        "listening"
    );

    axum::serve(listener, router.into_make_service())
        .await
        .map_err(|err| AppError::unexpected(format!("server error: {err}")))?;

    Ok(())
}
