//! Application state - shared across all handlers.

use std::sync::Arc;

use tera::Tera;

use blogify_core::ports::{
    AccountRepository, CommentRepository, Mailer, MediaStore, PasswordService, PostRepository,
    TokenService, ViewRecordRepository,
};
use blogify_core::services::{EngagementService, MediaPipeline, NotificationService, PostService};
use blogify_infra::{Argon2PasswordService, InMemoryMediaStore, InMemoryStore, JwtTokenService};

#[cfg(feature = "postgres")]
use blogify_infra::database::{
    DatabaseConnections, PostgresAccountRepository, PostgresCommentRepository,
    PostgresPostRepository, PostgresViewRecordRepository,
};

use crate::config::AppConfig;
use crate::views;

/// Repository set backing the services.
#[derive(Clone)]
pub struct Stores {
    pub accounts: Arc<dyn AccountRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub views: Arc<dyn ViewRecordRepository>,
}

impl Stores {
    pub fn in_memory() -> Self {
        let store = Arc::new(InMemoryStore::new());
        Self {
            accounts: store.clone(),
            posts: store.clone(),
            comments: store.clone(),
            views: store,
        }
    }

    #[cfg(feature = "postgres")]
    pub fn postgres(connections: &DatabaseConnections) -> Self {
        let db = connections.main.clone();
        Self {
            accounts: Arc::new(PostgresAccountRepository::new(db.clone())),
            posts: Arc::new(PostgresPostRepository::new(db.clone())),
            comments: Arc::new(PostgresCommentRepository::new(db.clone())),
            views: Arc::new(PostgresViewRecordRepository::new(db)),
        }
    }

    /// Connect to PostgreSQL when configured, otherwise fall back to memory.
    async fn connect(config: &AppConfig) -> Self {
        #[cfg(feature = "postgres")]
        {
            if let Some(db_config) = &config.database {
                match DatabaseConnections::init(db_config).await {
                    Ok(connections) => return Self::postgres(&connections),
                    Err(e) => tracing::error!(
                        error = %e,
                        "Failed to connect to database. Using in-memory fallback."
                    ),
                }
            } else {
                tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
            }
        }

        #[cfg(not(feature = "postgres"))]
        {
            let _ = config;
            tracing::info!("Running without postgres feature - using in-memory store");
        }

        Self::in_memory()
    }
}

/// Per-site values the templates and cookies need.
#[derive(Debug, Clone)]
pub struct SiteSettings {
    pub session_cookie: String,
    pub tinymce_api_key: String,
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub posts: PostService,
    pub engagement: EngagementService,
    pub notifications: NotificationService,
    pub accounts: Arc<dyn AccountRepository>,
    pub views: Arc<dyn ViewRecordRepository>,
    pub tokens: Arc<dyn TokenService>,
    pub passwords: Arc<dyn PasswordService>,
    pub templates: Arc<Tera>,
    pub site: SiteSettings,
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig) -> Result<Self, tera::Error> {
        let templates = views::load_templates(&config.templates_glob())?;
        let stores = Stores::connect(config).await;

        let state = Self::assemble(
            config,
            stores,
            media_store(config),
            mailer(config),
            templates,
        );
        tracing::info!("Application state initialized");
        Ok(state)
    }

    /// Wire services over explicit collaborators.
    pub fn assemble(
        config: &AppConfig,
        stores: Stores,
        media: Arc<dyn MediaStore>,
        mailer: Option<Arc<dyn Mailer>>,
        templates: Tera,
    ) -> Self {
        let posts = PostService::new(
            stores.posts.clone(),
            stores.comments.clone(),
            MediaPipeline::new(media),
        );
        let engagement = EngagementService::new(
            stores.posts.clone(),
            stores.comments.clone(),
            stores.views.clone(),
        );

        Self {
            posts,
            engagement,
            notifications: NotificationService::new(mailer, config.mail.clone()),
            accounts: stores.accounts,
            views: stores.views,
            tokens: Arc::new(JwtTokenService::new(config.jwt.clone())),
            passwords: Arc::new(Argon2PasswordService::new()),
            templates: Arc::new(templates),
            site: SiteSettings {
                session_cookie: config.session_cookie.clone(),
                tinymce_api_key: config.tinymce_api_key.clone(),
            },
        }
    }
}

fn media_store(config: &AppConfig) -> Arc<dyn MediaStore> {
    #[cfg(feature = "cloudinary")]
    if let Some(c) = &config.cloudinary {
        let signature_algorithm = c.signature_algorithm.parse().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Falling back to SHA-1 Cloudinary signatures");
            blogify_infra::SignatureAlgorithm::default()
        });
        tracing::info!(cloud = %c.cloud_name, ?signature_algorithm, "Using Cloudinary image storage");
        return Arc::new(blogify_infra::CloudinaryMediaStore::new(
            blogify_infra::CloudinaryConfig {
                cloud_name: c.cloud_name.clone(),
                api_key: c.api_key.clone(),
                api_secret: c.api_secret.clone(),
                signature_algorithm,
            },
        ));
    }

    if config.cloudinary.is_some() {
        tracing::warn!("Cloudinary configured but the cloudinary feature is disabled");
    } else {
        tracing::warn!("Cloudinary not configured. Uploaded images are kept in memory only.");
    }
    Arc::new(InMemoryMediaStore::new())
}

fn mailer(config: &AppConfig) -> Option<Arc<dyn Mailer>> {
    #[cfg(feature = "resend")]
    if let Some(api_key) = &config.resend_api_key {
        return Some(Arc::new(blogify_infra::ResendMailer::new(
            blogify_infra::ResendConfig {
                api_key: api_key.clone(),
            },
        )));
    }

    #[cfg(not(feature = "resend"))]
    let _ = config;

    None
}
