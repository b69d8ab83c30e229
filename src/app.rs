use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, post, put},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

use crate::auth::SessionKeys;
use crate::config::AppConfig;
use crate::database::{ListQuery, MemoryStore, PgStore, RecordStore, StoreError};
use crate::handlers::{auth, content, crud, system, visitors};
use crate::middleware::{gate_middleware, session_middleware};
use crate::models::{
    AdminUser, BlogPost, Gallery, HeroButton, Partner, Product, Resource, Setting, SocialMedia, Testimonial, Visit,
};

/// One store per record type
#[derive(Clone)]
pub struct Stores {
    pub blogs: Arc<dyn RecordStore<BlogPost>>,
    pub galleries: Arc<dyn RecordStore<Gallery>>,
    pub products: Arc<dyn RecordStore<Product>>,
    pub testimonials: Arc<dyn RecordStore<Testimonial>>,
    pub social_media: Arc<dyn RecordStore<SocialMedia>>,
    pub hero_buttons: Arc<dyn RecordStore<HeroButton>>,
    pub partners: Arc<dyn RecordStore<Partner>>,
    pub settings: Arc<dyn RecordStore<Setting>>,
    pub visits: Arc<dyn RecordStore<Visit>>,
    pub admin_users: Arc<dyn RecordStore<AdminUser>>,
}

impl Stores {
    pub fn memory() -> Self {
        Self {
            blogs: Arc::new(MemoryStore::new()),
            galleries: Arc::new(MemoryStore::new()),
            products: Arc::new(MemoryStore::new()),
            testimonials: Arc::new(MemoryStore::new()),
            social_media: Arc::new(MemoryStore::new()),
            hero_buttons: Arc::new(MemoryStore::new()),
            partners: Arc::new(MemoryStore::new()),
            settings: Arc::new(MemoryStore::new()),
            visits: Arc::new(MemoryStore::new()),
            admin_users: Arc::new(MemoryStore::new()),
        }
    }

    pub fn postgres(pool: PgPool) -> Self {
        Self {
            blogs: Arc::new(PgStore::new(pool.clone())),
            galleries: Arc::new(PgStore::new(pool.clone())),
            products: Arc::new(PgStore::new(pool.clone())),
            testimonials: Arc::new(PgStore::new(pool.clone())),
            social_media: Arc::new(PgStore::new(pool.clone())),
            hero_buttons: Arc::new(PgStore::new(pool.clone())),
            partners: Arc::new(PgStore::new(pool.clone())),
            settings: Arc::new(PgStore::new(pool.clone())),
            visits: Arc::new(PgStore::new(pool.clone())),
            admin_users: Arc::new(PgStore::new(pool)),
        }
    }
}

/// Typed access to the store of `R`, so generic handlers can find it
pub trait HasStore<R> {
    fn store(&self) -> &Arc<dyn RecordStore<R>>;
}

macro_rules! has_store {
    ($($record:ty => $field:ident),* $(,)?) => {
        $(
            impl HasStore<$record> for Stores {
                fn store(&self) -> &Arc<dyn RecordStore<$record>> {
                    &self.$field
                }
            }
        )*
    };
}

has_store! {
    BlogPost => blogs,
    Gallery => galleries,
    Product => products,
    Testimonial => testimonials,
    SocialMedia => social_media,
    HeroButton => hero_buttons,
    Partner => partners,
    Setting => settings,
    Visit => visits,
    AdminUser => admin_users,
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub sessions: Arc<SessionKeys>,
    pub stores: Stores,
}

impl AppState {
    pub fn new(config: AppConfig, stores: Stores) -> Self {
        let sessions = SessionKeys::from_config(&config.session);
        if !sessions.is_configured() {
            tracing::warn!("SESSION_SECRET is not set: logins are disabled and every session is rejected");
        }
        Self {
            config: Arc::new(config),
            sessions: Arc::new(sessions),
            stores,
        }
    }
}

/// Create the configured admin account if no account uses its email yet
pub async fn bootstrap_admin(state: &AppState) -> Result<(), StoreError> {
    let Some(admin) = state.config.admin.as_ref() else {
        return Ok(());
    };

    let existing = state
        .stores
        .admin_users
        .find_one(&ListQuery::new().eq("email", admin.email.clone()))
        .await?;
    if existing.is_none() {
        let user = AdminUser::new(&admin.email, &admin.name, &admin.password_hash);
        state.stores.admin_users.create(&user).await?;
        tracing::info!("Created bootstrap admin account {}", user.email);
    }
    Ok(())
}

/// Public reads plus session-gated writes on the same collection path
fn public_resource_routes<R>() -> Router<AppState>
where
    R: Resource,
    Stores: HasStore<R>,
{
    let collection = format!("/api/{}", R::COLLECTION);
    let item = format!("/api/{}/:id", R::COLLECTION);
    Router::new()
        .route(&collection, get(crud::list_public::<R>).post(crud::create::<R>))
        .route(&item, put(crud::update::<R>).delete(crud::delete::<R>))
}

fn admin_resource_routes<R>() -> Router<AppState>
where
    R: Resource,
    Stores: HasStore<R>,
{
    let collection = format!("/api/admin/{}", R::COLLECTION);
    let item = format!("/api/admin/{}/:id", R::COLLECTION);
    Router::new()
        .route(&collection, get(crud::list_all::<R>).post(crud::create::<R>))
        .route(&item, get(crud::get_one::<R>).put(crud::update::<R>).delete(crud::delete::<R>))
}

fn content_routes() -> Router<AppState> {
    Router::new()
        .route("/api/blogs", get(crud::list_public::<BlogPost>))
        .route("/api/blogs/:slug", get(content::blog_by_slug))
        .route("/api/products", get(crud::list_public::<Product>))
        .route("/api/products/:slug", get(content::product_by_slug))
        // GET takes a setting key, PUT/DELETE an id
        .route("/api/settings", get(crud::list_public::<Setting>).post(crud::create::<Setting>))
        .route(
            "/api/settings/:id",
            get(content::setting_by_key)
                .put(crud::update::<Setting>)
                .delete(crud::delete::<Setting>),
        )
        .merge(public_resource_routes::<SocialMedia>())
        .merge(public_resource_routes::<HeroButton>())
        .merge(public_resource_routes::<Partner>())
        .merge(public_resource_routes::<Testimonial>())
        .merge(public_resource_routes::<Gallery>())
}

fn admin_routes() -> Router<AppState> {
    Router::new()
        .merge(admin_resource_routes::<SocialMedia>())
        .merge(admin_resource_routes::<HeroButton>())
        .merge(admin_resource_routes::<Partner>())
        .merge(admin_resource_routes::<Testimonial>())
        .merge(admin_resource_routes::<Setting>())
        .merge(admin_resource_routes::<Gallery>())
        .merge(admin_resource_routes::<BlogPost>())
        .merge(admin_resource_routes::<Product>())
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/session", get(auth::current_session))
}

fn visitor_routes() -> Router<AppState> {
    Router::new()
        .route("/api/visitors", post(visitors::record_visit))
        .route("/api/visitors/stats", get(visitors::stats))
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .security
        .cors_origins
        .iter()
        .filter_map(|o| HeaderValue::from_str(o).ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true)
}

pub fn app(state: AppState) -> Router {
    let static_dir = state.config.server.static_dir.clone();
    let pages = ServeDir::new(&static_dir).fallback(ServeFile::new(static_dir.join("index.html")));

    let router = Router::new()
        .route("/", get(system::root))
        .route("/health", get(system::health))
        .merge(auth_routes())
        .merge(content_routes())
        .merge(admin_routes())
        .merge(visitor_routes())
        .fallback_service(pages)
        // Layers run bottom-up: session verification happens before the gate
        .layer(middleware::from_fn_with_state(state.clone(), gate_middleware))
        .layer(middleware::from_fn_with_state(state.clone(), session_middleware))
        .layer(TraceLayer::new_for_http());

    let router = if state.config.security.enable_cors {
        router.layer(cors_layer(&state.config))
    } else {
        router
    };

    router.with_state(state)
}
