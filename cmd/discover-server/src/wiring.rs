//! Builds adapters and services from settings.

use anyhow::Context;
use api_adapters::{AppState, DiscoverMetrics, ProxyTrust};
use auth_adapters::StaticTokenAuthenticator;
use configs::{Settings, StorageBackend};
use domains::{Authenticator, Badges, PostRepository};
use services::rate_limit::discover_rule;
use services::{BadgeAdminPolicy, DiscoveryService, RateLimitGate, SystemClock};
use std::sync::Arc;
use storage_adapters::{InMemoryPostRepository, InMemoryRateLimiter, PageBounds, SeedData};
use tokio::task::JoinHandle;

pub struct Wired {
    pub state: AppState,
    /// Background purge of expired rate-limit windows.
    pub sweeper: JoinHandle<()>,
}

pub async fn build(settings: &Settings) -> anyhow::Result<Wired> {
    let bounds = PageBounds {
        default_limit: settings.discovery.default_limit,
        max_limit: settings.discovery.max_limit,
    };

    let posts: Arc<dyn PostRepository> = match settings.storage.backend {
        StorageBackend::Memory => {
            let seed = match &settings.storage.seed_path {
                Some(path) => SeedData::load(path)
                    .await
                    .with_context(|| format!("loading seed data from {}", path.display()))?,
                None => SeedData::default(),
            };
            tracing::info!(posts = seed.posts.len(), blocks = seed.blocks.len(), "using in-memory post storage");
            Arc::new(InMemoryPostRepository::with_seed(bounds, seed))
        }
        StorageBackend::Postgres => postgres_repository(settings, bounds).await?,
    };

    let limiter = Arc::new(InMemoryRateLimiter::new());
    let sweeper = limiter.clone().spawn_sweeper(settings.rate_limit.sweep_interval());
    let rate_limit = RateLimitGate::new(
        limiter,
        discover_rule(settings.rate_limit.requests, settings.rate_limit.window()),
    );

    if settings.server.trust_forwarded_for {
        tracing::info!("client addresses taken from X-Forwarded-For");
    }

    let discovery = DiscoveryService::new(posts, Arc::new(BadgeAdminPolicy), Arc::new(SystemClock));

    Ok(Wired {
        state: AppState {
            discovery: Arc::new(discovery),
            authenticator: authenticator(settings),
            rate_limit: Arc::new(rate_limit),
            metrics: Arc::new(DiscoverMetrics::new()),
            proxy: ProxyTrust {
                trust_forwarded_for: settings.server.trust_forwarded_for,
            },
        },
        sweeper,
    })
}

fn authenticator(settings: &Settings) -> Arc<dyn Authenticator> {
    #[cfg(feature = "auth-jwt")]
    if let Some(secret) = &settings.auth.jwt_secret {
        tracing::info!("using JWT bearer authentication");
        return Arc::new(auth_adapters::JwtAuthenticator::new(
            secret,
            settings.auth.issuer.clone(),
        ));
    }

    tracing::warn!(
        tokens = settings.auth.static_tokens.len(),
        "using static token authentication"
    );
    let table = settings
        .auth
        .static_tokens
        .iter()
        .fold(StaticTokenAuthenticator::new(), |auth, entry| {
            auth.with_token(&entry.token, &entry.user_id, Badges(entry.badges))
        });
    Arc::new(table)
}

#[cfg(feature = "db-postgres")]
async fn postgres_repository(
    settings: &Settings,
    bounds: PageBounds,
) -> anyhow::Result<Arc<dyn PostRepository>> {
    use secrecy::ExposeSecret;

    let url = settings
        .storage
        .database_url
        .as_ref()
        .context("storage.database_url is required for the postgres backend")?;
    let repo = storage_adapters::PgPostRepository::connect(url.expose_secret(), bounds)
        .await
        .context("connecting to postgres")?;
    repo.migrate().await.context("running migrations")?;
    tracing::info!("using postgres post storage");
    Ok(Arc::new(repo))
}

#[cfg(not(feature = "db-postgres"))]
async fn postgres_repository(
    _settings: &Settings,
    _bounds: PageBounds,
) -> anyhow::Result<Arc<dyn PostRepository>> {
    anyhow::bail!("storage.backend = postgres requires the db-postgres feature")
}
