//! End-to-end flows through the storefront router.
//!
//! Every test builds a fresh [`TestApp`] over the in-memory store, so they
//! run in parallel without a database.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;

use corner_store_integration_tests::{
    TestApp, body_text, location, product_path, session_cookie,
};
use corner_store_core::AccountRole;
use corner_store_storefront::services::{
    AuthService, CartService, CatalogService, OrderService, ProfileService, WishlistService,
};

// ============================================================================
// Health & Public Pages
// ============================================================================

#[tokio::test]
async fn test_health() {
    let app = TestApp::new();

    let resp = app.get("/health", None).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app.get("/health/ready", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_public_product_list() {
    let app = TestApp::new();
    let category = app.create_category("Produce").await;
    app.create_product(category, "PRD-1", "1.50").await;

    let resp = app.get("/products/", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().contains_key("x-request-id"));

    let body = body_text(resp).await;
    assert!(body.contains("Product PRD-1"));
    assert!(body.contains("$1.50"));
    // No cart buttons for anonymous visitors
    assert!(!body.contains("/add-to-cart/"));
}

#[tokio::test]
async fn test_public_category_list() {
    let app = TestApp::new();
    app.create_category("Bakery").await;

    let resp = app.get("/category-list/", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_text(resp).await.contains("Bakery"));
}

// ============================================================================
// Authentication
// ============================================================================

#[tokio::test]
async fn test_login_and_logout() {
    let app = TestApp::new();
    app.create_account("alice", false).await;

    let resp = app
        .post_form("/", "username=alice&password=correct-horse-battery", None)
        .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), Some("/products/?success=logged_in"));
    let cookie = session_cookie(&resp).unwrap();

    // Logged-in visitors skip the login form
    let resp = app.get("/", Some(&cookie)).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), Some("/products/"));

    let resp = app.post_form("/logout/", "", Some(&cookie)).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), Some("/?success=logged_out"));

    let resp = app.get("/cart/", Some(&cookie)).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), Some("/"));
}

#[tokio::test]
async fn test_login_wrong_password() {
    let app = TestApp::new();
    app.create_account("alice", false).await;

    let resp = app
        .post_form("/", "username=alice&password=not-the-password", None)
        .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(session_cookie(&resp).is_none());
    assert!(body_text(resp).await.contains("Invalid username or password."));
}

#[tokio::test]
async fn test_login_unknown_user() {
    let app = TestApp::new();

    let resp = app
        .post_form("/", "username=nobody&password=correct-horse-battery", None)
        .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unauthenticated_add_to_cart_is_401() {
    let app = TestApp::new();
    let category = app.create_category("Produce").await;
    let product = app.create_product(category, "PRD-1", "1.00").await;

    let resp = app
        .post_form(&product_path("/add-to-cart", product.id), "", None)
        .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = app
        .get(&product_path("/add-to-wishlist", product.id), None)
        .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unauthenticated_pages_redirect_to_login() {
    let app = TestApp::new();

    for path in ["/cart/", "/wishlist/", "/checkout/", "/profile/", "/order/1/"] {
        let resp = app.get(path, None).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER, "{path}");
        assert_eq!(location(&resp), Some("/"), "{path}");
    }
}

// ============================================================================
// Cart & Wishlist
// ============================================================================

#[tokio::test]
async fn test_add_to_cart_without_profile_redirects() {
    let app = TestApp::new();
    app.create_account("alice", false).await;
    let category = app.create_category("Produce").await;
    let product = app.create_product(category, "PRD-1", "1.00").await;
    let cookie = app.login("alice").await;

    let resp = app
        .post_form(&product_path("/add-to-cart", product.id), "", Some(&cookie))
        .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), Some("/profile/?error=profile_required"));
}

#[tokio::test]
async fn test_cart_added_notice_ignores_free_text() {
    let app = TestApp::new();
    app.create_customer("alice").await;
    let category = app.create_category("Produce").await;
    let product = app.create_product(category, "PRD-1", "2.50").await;
    let cookie = app.login("alice").await;

    let resp = app
        .get(
            "/cart/?added=Your%20account%20is%20locked.%20Call%20555-0100.",
            Some(&cookie),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_text(resp).await;
    assert!(!body.contains("Your account is locked"));
    assert!(!body.contains("has been added to your cart"));

    // A real product id that is not in the cart shows nothing either
    let resp = app
        .get(&format!("/cart/?added={}", product.id), Some(&cookie))
        .await;
    let body = body_text(resp).await;
    assert!(!body.contains("has been added to your cart"));
}

#[tokio::test]
async fn test_cart_flow() {
    let app = TestApp::new();
    let alice = app.create_customer("alice").await;
    let category = app.create_category("Produce").await;
    let product = app.create_product(category, "PRD-1", "2.50").await;
    let cookie = app.login("alice").await;
    let add = product_path("/add-to-cart", product.id);
    let remove = product_path("/remove-from-cart", product.id);

    let resp = app.post_form(&add, "", Some(&cookie)).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    let added = format!("/cart/?added={}", product.id);
    assert_eq!(location(&resp), Some(added.as_str()));

    let resp = app.get(&add, Some(&cookie)).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    let cart = CartService::new(app.store()).list_cart(alice.id).await.unwrap();
    assert_eq!(cart.items.len(), 1);
    assert_eq!(cart.items[0].line.quantity, 2);

    let resp = app.get(&added, Some(&cookie)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_text(resp).await;
    assert!(body.contains("Product PRD-1 has been added to your cart."));
    assert!(body.contains("$5.00"));

    let resp = app.post_form(&remove, "", Some(&cookie)).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), Some("/cart/"));
    let cart = CartService::new(app.store()).list_cart(alice.id).await.unwrap();
    assert!(cart.is_empty());

    let resp = app.post_form(&remove, "", Some(&cookie)).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_add_unknown_product_is_404() {
    let app = TestApp::new();
    app.create_customer("alice").await;
    let cookie = app.login("alice").await;

    let resp = app.post_form("/add-to-cart/999/", "", Some(&cookie)).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_wishlist_duplicate_is_conflict() {
    let app = TestApp::new();
    let alice = app.create_customer("alice").await;
    let category = app.create_category("Produce").await;
    let product = app.create_product(category, "PRD-1", "1.00").await;
    let cookie = app.login("alice").await;
    let add = product_path("/add-to-wishlist", product.id);

    let resp = app.post_form(&add, "", Some(&cookie)).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), Some("/wishlist/"));

    let resp = app.post_form(&add, "", Some(&cookie)).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let items = WishlistService::new(app.store())
        .list_wishlist(alice.id)
        .await
        .unwrap();
    assert_eq!(items.len(), 1);

    let resp = app.get("/wishlist/", Some(&cookie)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_text(resp).await.contains("Product PRD-1"));

    let remove = product_path("/remove-from-wishlist", product.id);
    let resp = app.post_form(&remove, "", Some(&cookie)).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    let resp = app.post_form(&remove, "", Some(&cookie)).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// ============================================================================
// Profile
// ============================================================================

#[tokio::test]
async fn test_profile_created_on_first_visit() {
    let app = TestApp::new();
    let alice = app.create_account("alice", false).await;
    let cookie = app.login("alice").await;

    let resp = app.get("/profile/", Some(&cookie)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let first = ProfileService::new(app.store())
        .get_customer_for_account(alice.id)
        .await
        .unwrap();

    let resp = app.get("/profile/", Some(&cookie)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let second = ProfileService::new(app.store())
        .get_customer_for_account(alice.id)
        .await
        .unwrap();
    assert_eq!(first.id, second.id);
}

#[tokio::test]
async fn test_profile_update() {
    let app = TestApp::new();
    let alice = app.create_customer("alice").await;
    let cookie = app.login("alice").await;

    let resp = app
        .post_form("/profile/", "phone=555-0100&address=1+Main+St", Some(&cookie))
        .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), Some("/profile/?success=profile_updated"));

    let customer = ProfileService::new(app.store())
        .get_customer_for_account(alice.id)
        .await
        .unwrap();
    assert_eq!(customer.phone.as_deref(), Some("555-0100"));
    assert_eq!(customer.address, "1 Main St");

    let resp = app
        .post_form("/profile/", "phone=call+me+maybe&address=", Some(&cookie))
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// ============================================================================
// Catalog (staff)
// ============================================================================

#[tokio::test]
async fn test_non_staff_add_product_is_403() {
    let app = TestApp::new();
    app.create_customer("alice").await;
    let category = app.create_category("Produce").await;
    let cookie = app.login("alice").await;

    let resp = app.get("/add-product/", Some(&cookie)).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let category = category.to_string();
    let resp = app
        .post_multipart(
            "/add-product/",
            &[
                ("sku", "PRD-9"),
                ("name", "Nope"),
                ("description", "Nope"),
                ("price", "1.00"),
                ("stock", "1"),
                ("category", &category),
            ],
            Some(&cookie),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let products = CatalogService::new(app.store()).list_products().await.unwrap();
    assert!(products.is_empty());
}

#[tokio::test]
async fn test_demoted_staff_loses_catalog_access() {
    let app = TestApp::new();
    app.create_account("staff", true).await;
    let cookie = app.login("staff").await;

    let resp = app.get("/add-category/", Some(&cookie)).await;
    assert_eq!(resp.status(), StatusCode::OK);

    AuthService::new(app.store())
        .set_role("staff", AccountRole::Customer)
        .await
        .unwrap();

    let resp = app.get("/add-category/", Some(&cookie)).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let resp = app
        .post_form("/add-category/", "name=Dairy&description=", Some(&cookie))
        .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert!(CatalogService::new(app.store()).list_categories().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_deleted_staff_session_is_logged_out() {
    let app = TestApp::new();
    let staff = app.create_account("staff", true).await;
    let cookie = app.login("staff").await;

    app.store().delete_account(staff.id).await.unwrap();

    let resp = app.get("/add-category/", Some(&cookie)).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), Some("/"));

    let resp = app
        .post_form("/add-category/", "name=Dairy&description=", Some(&cookie))
        .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unauthenticated_add_product_is_401() {
    let app = TestApp::new();

    let resp = app
        .post_multipart("/add-product/", &[("sku", "PRD-9")], None)
        .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_staff_add_product() {
    let app = TestApp::new();
    app.create_account("staff", true).await;
    let category = app.create_category("Produce").await.to_string();
    let cookie = app.login("staff").await;

    let resp = app.get("/add-product/", Some(&cookie)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_text(resp).await.contains("multipart/form-data"));

    let fields = [
        ("sku", "PRD-42"),
        ("name", "Honey"),
        ("description", "Wildflower honey."),
        ("price", "7.25"),
        ("stock", "5"),
        ("category", category.as_str()),
    ];
    let resp = app.post_multipart("/add-product/", &fields, Some(&cookie)).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), Some("/add-product/?success=product_added"));

    let products = CatalogService::new(app.store()).list_products().await.unwrap();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].name, "Honey");
    assert!(products[0].image.is_none());

    // Same SKU again: the form comes back with a field error
    let resp = app.post_multipart("/add-product/", &fields, Some(&cookie)).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(body_text(resp).await.contains("Product with this Sku already exists."));
}

#[tokio::test]
async fn test_staff_add_category_duplicate_name() {
    let app = TestApp::new();
    app.create_account("staff", true).await;
    let cookie = app.login("staff").await;

    let resp = app
        .post_form("/add-category/", "name=Dairy&description=", Some(&cookie))
        .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), Some("/category-list/?success=category_added"));

    let resp = app
        .post_form("/add-category/", "name=Dairy&description=", Some(&cookie))
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(body_text(resp).await.contains("Category with this Name already exists."));
}

#[tokio::test]
async fn test_delete_category_cascades() {
    let app = TestApp::new();
    app.create_account("staff", true).await;
    let alice = app.create_customer("alice").await;
    let category = app.create_category("Produce").await;
    let product = app.create_product(category, "PRD-1", "1.00").await;
    let other = app.create_category("Bakery").await;
    let kept = app.create_product(other, "BKY-1", "3.00").await;

    CartService::new(app.store())
        .add_to_cart(alice.id, product.id)
        .await
        .unwrap();
    CartService::new(app.store())
        .add_to_cart(alice.id, kept.id)
        .await
        .unwrap();
    WishlistService::new(app.store())
        .add_to_wishlist(alice.id, product.id)
        .await
        .unwrap();

    let cookie = app.login("staff").await;
    let resp = app
        .post_form(&format!("/delete-category/{category}/"), "", Some(&cookie))
        .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    let products = CatalogService::new(app.store()).list_products().await.unwrap();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].id, kept.id);

    let cart = CartService::new(app.store()).list_cart(alice.id).await.unwrap();
    assert_eq!(cart.items.len(), 1);
    assert_eq!(cart.items[0].product.id, kept.id);

    let wishlist = WishlistService::new(app.store())
        .list_wishlist(alice.id)
        .await
        .unwrap();
    assert!(wishlist.is_empty());
}

#[tokio::test]
async fn test_delete_category_removes_product_images() {
    let app = TestApp::new();
    app.create_account("staff", true).await;
    let category = app.create_category("Produce").await;
    let other = app.create_category("Bakery").await;
    let deleted = app.create_product_with_image(category, "PRD-1").await;
    let kept = app.create_product_with_image(other, "BKY-1").await;

    let deleted_path = app.media_dir().join(deleted.image.unwrap());
    let kept_path = app.media_dir().join(kept.image.unwrap());
    assert!(deleted_path.exists());

    let cookie = app.login("staff").await;
    let resp = app
        .post_form(&format!("/delete-category/{category}/"), "", Some(&cookie))
        .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    assert!(!deleted_path.exists());
    assert!(kept_path.exists());
}

// ============================================================================
// Checkout & Orders
// ============================================================================

#[tokio::test]
async fn test_checkout_writes_nothing() {
    let app = TestApp::new();
    let alice = app.create_customer("alice").await;
    let category = app.create_category("Produce").await;
    let product = app.create_product(category, "PRD-1", "4.00").await;
    let cookie = app.login("alice").await;

    app.post_form(&product_path("/add-to-cart", product.id), "", Some(&cookie))
        .await;

    let resp = app.get("/checkout/", Some(&cookie)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_text(resp).await.contains("$4.00"));

    let cart = CartService::new(app.store()).list_cart(alice.id).await.unwrap();
    assert_eq!(cart.item_count(), 1);
    let orders = OrderService::new(app.store()).list_orders(alice.id).await.unwrap();
    assert!(orders.is_empty());
    let stock = CatalogService::new(app.store())
        .get_product(product.id)
        .await
        .unwrap()
        .stock;
    assert_eq!(stock, product.stock);
}

#[tokio::test]
async fn test_order_visible_to_owner_only() {
    let app = TestApp::new();
    let alice = app.create_customer("alice").await;
    app.create_customer("bob").await;
    let category = app.create_category("Produce").await;
    let product = app.create_product(category, "PRD-1", "2.00").await;

    let customer = ProfileService::new(app.store())
        .get_customer_for_account(alice.id)
        .await
        .unwrap();
    let order = OrderService::new(app.store())
        .create_order(customer.id, &[(product.id, 3)])
        .await
        .unwrap();
    let path = format!("/order/{}/", order.id);

    let cookie = app.login("alice").await;
    let resp = app.get(&path, Some(&cookie)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_text(resp).await;
    assert!(body.contains("Product PRD-1"));
    assert!(body.contains("$6.00"));

    let cookie = app.login("bob").await;
    let resp = app.get(&path, Some(&cookie)).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = app.get("/order/9999/", Some(&cookie)).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_uploaded_media_directory_is_served() {
    let app = TestApp::new();
    std::fs::create_dir_all(app.media_dir().join("products")).unwrap();
    std::fs::write(app.media_dir().join("products/test.png"), b"\x89PNG\r\n").unwrap();

    let resp = app.get("/media/products/test.png", None).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app.get("/static/img/placeholder.svg", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
}
