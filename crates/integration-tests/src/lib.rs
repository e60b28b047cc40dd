//! Integration tests for Corner Store.
//!
//! # Running Tests
//!
//! ```bash
//! # In-process flow tests (no database needed)
//! cargo test -p corner-store-integration-tests
//!
//! # Live tests against a running storefront backed by PostgreSQL
//! STOREFRONT_BASE_URL=http://127.0.0.1:3000 \
//!     cargo test -p corner-store-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `storefront_flows` - Full router over the in-memory store
//! - `live_storefront` - HTTP against a deployed instance (ignored by default)
//!
//! [`TestApp`] builds the real router with `MemoryStore` and an in-memory
//! session store, and drives it with `tower::ServiceExt::oneshot`. Cookies
//! are carried by hand.

use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, Response, StatusCode, header};
use secrecy::SecretString;
use tempfile::TempDir;
use tower::ServiceExt;

use corner_store_core::{AccountRole, CategoryId, ProductId};
use corner_store_storefront::app;
use corner_store_storefront::config::{SentryConfig, StorefrontConfig};
use corner_store_storefront::db::memory::MemoryStore;
use corner_store_storefront::forms::{CategoryForm, ProductForm};
use corner_store_storefront::models::{Account, Product};
use corner_store_storefront::services::{AuthService, CatalogService, ProfileService};
use corner_store_storefront::state::AppState;

/// Password given to every account created by [`TestApp::create_account`].
pub const PASSWORD: &str = "correct-horse-battery";

fn product_form(category: CategoryId, sku: &str, price: &str) -> ProductForm {
    ProductForm {
        sku: sku.to_owned(),
        name: format!("Product {sku}"),
        description: "Test product".to_owned(),
        price: price.to_owned(),
        stock: "10".to_owned(),
        category: category.to_string(),
    }
}

/// Multipart boundary used by [`TestApp::post_multipart`].
const BOUNDARY: &str = "corner-store-test-boundary";

/// The storefront router wired to in-memory stores.
pub struct TestApp {
    router: Router,
    store: Arc<MemoryStore>,
    media: TempDir,
}

impl TestApp {
    /// # Panics
    ///
    /// Panics if the temporary media directory cannot be created.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new() -> Self {
        let media = tempfile::tempdir().expect("Failed to create media dir");
        let config = StorefrontConfig {
            database_url: SecretString::from("postgres://unused/test"),
            host: std::net::IpAddr::from([127, 0, 0, 1]),
            port: 3000,
            base_url: "http://127.0.0.1:3000".to_owned(),
            session_secret: SecretString::from("k3J9qW2xV7mZ4tR8yB1nC6hL0pD5sF3a"),
            media_dir: PathBuf::from(media.path()),
            trust_proxy_headers: false,
            sentry: SentryConfig::default(),
        };

        let store = Arc::new(MemoryStore::new());
        let state = AppState::new(config, store.clone());
        let router = app(state, tower_sessions::MemoryStore::default(), None);

        Self {
            router,
            store,
            media,
        }
    }

    #[must_use]
    pub fn store(&self) -> &MemoryStore {
        &self.store
    }

    #[must_use]
    pub fn media_dir(&self) -> &std::path::Path {
        self.media.path()
    }

    /// # Panics
    ///
    /// Panics if the account cannot be created.
    #[allow(clippy::expect_used)]
    pub async fn create_account(&self, username: &str, staff: bool) -> Account {
        let role = if staff {
            AccountRole::Staff
        } else {
            AccountRole::Customer
        };
        AuthService::new(self.store())
            .create_account(username, PASSWORD, role)
            .await
            .expect("Failed to create account")
    }

    /// A customer account that already has a profile.
    pub async fn create_customer(&self, username: &str) -> Account {
        let account = self.create_account(username, false).await;
        self.create_profile(&account).await;
        account
    }

    /// # Panics
    ///
    /// Panics if the store fails.
    #[allow(clippy::expect_used)]
    pub async fn create_profile(&self, account: &Account) {
        ProfileService::new(self.store())
            .get_or_create_profile(account.id)
            .await
            .expect("Failed to create profile");
    }

    /// # Panics
    ///
    /// Panics if the category is rejected.
    #[allow(clippy::expect_used)]
    pub async fn create_category(&self, name: &str) -> CategoryId {
        let form = CategoryForm {
            name: name.to_owned(),
            description: String::new(),
        };
        CatalogService::new(self.store())
            .create_category(&form)
            .await
            .expect("Failed to create category")
            .id
    }

    /// # Panics
    ///
    /// Panics if the product is rejected.
    #[allow(clippy::expect_used)]
    pub async fn create_product(&self, category: CategoryId, sku: &str, price: &str) -> Product {
        CatalogService::new(self.store())
            .create_product(&product_form(category, sku, price), None)
            .await
            .expect("Failed to create product")
    }

    /// Create a product whose image file exists under the media dir.
    ///
    /// # Panics
    ///
    /// Panics if the file cannot be written or the product is rejected.
    #[allow(clippy::expect_used)]
    pub async fn create_product_with_image(&self, category: CategoryId, sku: &str) -> Product {
        let image = format!("products/{}.png", sku.to_lowercase());
        let path = self.media.path().join(&image);
        std::fs::create_dir_all(path.parent().expect("image path has a parent"))
            .expect("Failed to create products dir");
        std::fs::write(&path, b"\x89PNG\r\n").expect("Failed to write image");

        CatalogService::new(self.store())
            .create_product(&product_form(category, sku, "1.00"), Some(image))
            .await
            .expect("Failed to create product")
    }

    /// Log in through the form and return the session cookie.
    ///
    /// # Panics
    ///
    /// Panics if the login is rejected or no cookie is set.
    #[allow(clippy::expect_used)]
    pub async fn login(&self, username: &str) -> String {
        let body = format!("username={username}&password={PASSWORD}");
        let resp = self.post_form("/", &body, None).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER, "login failed");
        session_cookie(&resp).expect("Login did not set a session cookie")
    }

    /// # Panics
    ///
    /// Panics if the request cannot be built or the router errors.
    #[allow(clippy::expect_used)]
    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> Response<Body> {
        let mut builder = Request::get(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::empty()).expect("Failed to build request"))
            .await
    }

    /// # Panics
    ///
    /// Panics if the request cannot be built or the router errors.
    #[allow(clippy::expect_used)]
    pub async fn post_form(&self, uri: &str, body: &str, cookie: Option<&str>) -> Response<Body> {
        let mut builder = Request::post(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(
            builder
                .body(Body::from(body.to_owned()))
                .expect("Failed to build request"),
        )
        .await
    }

    /// POST text fields as `multipart/form-data`.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built or the router errors.
    #[allow(clippy::expect_used)]
    pub async fn post_multipart(
        &self,
        uri: &str,
        fields: &[(&str, &str)],
        cookie: Option<&str>,
    ) -> Response<Body> {
        let mut body = String::new();
        for (name, value) in fields {
            body.push_str(&format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            ));
        }
        body.push_str(&format!("--{BOUNDARY}--\r\n"));

        let mut builder = Request::post(uri).header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        );
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::from(body)).expect("Failed to build request"))
            .await
    }

    #[allow(clippy::expect_used)]
    async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("Router is infallible")
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

/// `name=value` of the session cookie set by a response, if any.
#[must_use]
pub fn session_cookie(resp: &Response<Body>) -> Option<String> {
    resp.headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find(|value| value.starts_with("cs_session="))
        .and_then(|value| value.split(';').next())
        .map(str::to_owned)
}

/// The `Location` header of a redirect.
#[must_use]
pub fn location(resp: &Response<Body>) -> Option<&str> {
    resp.headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
}

/// Read the whole response body as text.
///
/// # Panics
///
/// Panics if the body cannot be read or is not UTF-8.
#[allow(clippy::expect_used)]
pub async fn body_text(resp: Response<Body>) -> String {
    let bytes = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    String::from_utf8(bytes.to_vec()).expect("Body is not UTF-8")
}

/// Path helper for product-scoped routes, e.g. `product_path("/add-to-cart", id)`.
#[must_use]
pub fn product_path(prefix: &str, id: ProductId) -> String {
    format!("{prefix}/{id}/")
}
