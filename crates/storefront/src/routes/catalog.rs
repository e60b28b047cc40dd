//! Catalog route handlers: the public category list and the staff-only
//! product and category forms.
//!
//! Product forms are multipart so they can carry an image. The image is only
//! written to disk once every other field validates, and is removed again if
//! the store rejects the product.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use tracing::instrument;

use corner_store_core::{CategoryId, ProductId};

use super::MessageQuery;
use crate::error::AppError;
use crate::filters;
use crate::forms::{CategoryForm, FieldErrors, ProductForm};
use crate::media::{self, ImageUpload};
use crate::middleware::{OptionalAuth, RequireStaff};
use crate::models::{Category, CurrentAccount, Product};
use crate::services::{CatalogService, ServiceError};
use crate::state::AppState;

// =============================================================================
// Templates
// =============================================================================

/// Category listing template.
#[derive(Template, WebTemplate)]
#[template(path = "catalog/category_list.html")]
pub struct CategoryListTemplate {
    pub account: Option<CurrentAccount>,
    pub error: Option<String>,
    pub success: Option<String>,
    pub categories: Vec<Category>,
}

impl CategoryListTemplate {
    fn is_staff(&self) -> bool {
        self.account.as_ref().is_some_and(|a| a.is_staff)
    }
}

/// Add/edit product form template.
#[derive(Template, WebTemplate)]
#[template(path = "catalog/product_form.html")]
pub struct ProductFormTemplate {
    pub account: Option<CurrentAccount>,
    pub error: Option<String>,
    pub success: Option<String>,
    pub heading: &'static str,
    pub action: String,
    pub form: ProductForm,
    pub errors: FieldErrors,
    pub categories: Vec<Category>,
    /// Image URL of the product being edited.
    pub current_image: Option<String>,
}

/// Add/edit category form template.
#[derive(Template, WebTemplate)]
#[template(path = "catalog/category_form.html")]
pub struct CategoryFormTemplate {
    pub account: Option<CurrentAccount>,
    pub error: Option<String>,
    pub success: Option<String>,
    pub heading: &'static str,
    pub action: String,
    pub form: CategoryForm,
    pub errors: FieldErrors,
}

// =============================================================================
// Category list (public)
// =============================================================================

/// Display all categories.
#[instrument(skip(state, account, query))]
pub async fn category_list(
    State(state): State<AppState>,
    OptionalAuth(account): OptionalAuth,
    Query(query): Query<MessageQuery>,
) -> Result<impl IntoResponse, AppError> {
    let categories = CatalogService::new(state.store()).list_categories().await?;
    Ok(CategoryListTemplate {
        account,
        error: query.error_message(),
        success: query.success_message(),
        categories,
    })
}

// =============================================================================
// Products (staff)
// =============================================================================

/// Read the product fields and optional image out of a multipart body.
async fn read_product_form(
    mut multipart: Multipart,
) -> Result<(ProductForm, Option<ImageUpload>), AppError> {
    let mut form = ProductForm::default();
    let mut image = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_owned();
        if name == "image" {
            let file_name = field.file_name().unwrap_or_default().to_owned();
            let content_type = field.content_type().map(str::to_owned);
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()))?;
            // Browsers send an empty part when no file was chosen
            if !file_name.is_empty() || !bytes.is_empty() {
                image = Some(ImageUpload {
                    file_name,
                    content_type,
                    bytes,
                });
            }
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        match name.as_str() {
            "sku" => form.sku = value,
            "name" => form.name = value,
            "description" => form.description = value,
            "price" => form.price = value,
            "stock" => form.stock = value,
            "category" => form.category = value,
            _ => {}
        }
    }

    Ok((form, image))
}

/// Validate, store the image, then create or update the product.
///
/// The inner `Err` carries field errors for re-rendering the form.
async fn save_product(
    state: &AppState,
    product_id: Option<ProductId>,
    form: &ProductForm,
    upload: Option<&ImageUpload>,
) -> Result<Result<Product, FieldErrors>, AppError> {
    let mut errors = form.clean(None).err().unwrap_or_default();
    let ext = match upload.map(ImageUpload::extension).transpose() {
        Ok(ext) => ext,
        Err(message) => {
            errors.add("image", message);
            None
        }
    };
    if !errors.is_empty() {
        return Ok(Err(errors));
    }

    let image = match (upload, ext) {
        (Some(upload), Some(ext)) => Some(
            media::save_product_image(state.media_dir(), upload, &ext)
                .await
                .map_err(|e| AppError::Internal(format!("failed to save image: {e}")))?,
        ),
        _ => None,
    };

    let catalog = CatalogService::new(state.store());
    let result = match product_id {
        Some(id) => catalog.edit_product(id, form, image.clone()).await,
        None => catalog.create_product(form, image.clone()).await,
    };

    match result {
        Ok(product) => Ok(Ok(product)),
        Err(e) => {
            if let Some(path) = &image {
                media::remove_product_image(state.media_dir(), path).await;
            }
            match e {
                ServiceError::Validation(errors) => Ok(Err(errors)),
                other => Err(other.into()),
            }
        }
    }
}

/// Display the add product form.
#[instrument(skip(state, account, query), fields(account_id = %account.id))]
pub async fn add_product_page(
    State(state): State<AppState>,
    RequireStaff(account): RequireStaff,
    Query(query): Query<MessageQuery>,
) -> Result<impl IntoResponse, AppError> {
    let categories = CatalogService::new(state.store()).list_categories().await?;
    Ok(ProductFormTemplate {
        account: Some(account),
        error: query.error_message(),
        success: query.success_message(),
        heading: "Add product",
        action: "/add-product/".to_string(),
        form: ProductForm::default(),
        errors: FieldErrors::new(),
        categories,
        current_image: None,
    })
}

/// Handle the add product form.
#[instrument(skip(state, account, multipart), fields(account_id = %account.id))]
pub async fn add_product(
    State(state): State<AppState>,
    RequireStaff(account): RequireStaff,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let (form, upload) = read_product_form(multipart).await?;

    match save_product(&state, None, &form, upload.as_ref()).await? {
        Ok(_) => Ok(Redirect::to("/add-product/?success=product_added").into_response()),
        Err(errors) => {
            let categories = CatalogService::new(state.store()).list_categories().await?;
            let page = ProductFormTemplate {
                account: Some(account),
                error: None,
                success: None,
                heading: "Add product",
                action: "/add-product/".to_string(),
                form,
                errors,
                categories,
                current_image: None,
            };
            Ok((StatusCode::BAD_REQUEST, page).into_response())
        }
    }
}

/// Display the edit product form.
#[instrument(skip(state, account), fields(account_id = %account.id))]
pub async fn edit_product_page(
    State(state): State<AppState>,
    RequireStaff(account): RequireStaff,
    Path(product_id): Path<ProductId>,
) -> Result<impl IntoResponse, AppError> {
    let catalog = CatalogService::new(state.store());
    let product = catalog.get_product(product_id).await?;
    let categories = catalog.list_categories().await?;

    Ok(ProductFormTemplate {
        account: Some(account),
        error: None,
        success: None,
        heading: "Edit product",
        action: format!("/edit-product/{product_id}/"),
        form: ProductForm::from_product(&product),
        errors: FieldErrors::new(),
        categories,
        current_image: product.image.is_some().then(|| product.image_url()),
    })
}

/// Handle the edit product form. Leaving the image empty keeps the old one.
#[instrument(skip(state, account, multipart), fields(account_id = %account.id))]
pub async fn edit_product(
    State(state): State<AppState>,
    RequireStaff(account): RequireStaff,
    Path(product_id): Path<ProductId>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let (form, upload) = read_product_form(multipart).await?;
    let catalog = CatalogService::new(state.store());
    let existing = catalog.get_product(product_id).await?;

    match save_product(&state, Some(product_id), &form, upload.as_ref()).await? {
        Ok(updated) => {
            if let Some(old) = existing.image
                && updated.image.as_deref() != Some(old.as_str())
            {
                media::remove_product_image(state.media_dir(), &old).await;
            }
            Ok(Redirect::to("/products/?success=product_updated").into_response())
        }
        Err(errors) => {
            let categories = catalog.list_categories().await?;
            let page = ProductFormTemplate {
                account: Some(account),
                error: None,
                success: None,
                heading: "Edit product",
                action: format!("/edit-product/{product_id}/"),
                form,
                errors,
                categories,
                current_image: existing.image.is_some().then(|| existing.image_url()),
            };
            Ok((StatusCode::BAD_REQUEST, page).into_response())
        }
    }
}

/// Delete a product and its stored image.
#[instrument(skip(state, account), fields(account_id = %account.id))]
pub async fn delete_product(
    State(state): State<AppState>,
    RequireStaff(account): RequireStaff,
    Path(product_id): Path<ProductId>,
) -> Result<Redirect, AppError> {
    let catalog = CatalogService::new(state.store());
    let product = catalog.get_product(product_id).await?;
    catalog.delete_product(product_id).await?;
    if let Some(image) = &product.image {
        media::remove_product_image(state.media_dir(), image).await;
    }
    Ok(Redirect::to("/products/?success=product_deleted"))
}

// =============================================================================
// Categories (staff)
// =============================================================================

fn category_page(
    account: CurrentAccount,
    heading: &'static str,
    action: String,
    form: CategoryForm,
    errors: FieldErrors,
) -> CategoryFormTemplate {
    CategoryFormTemplate {
        account: Some(account),
        error: None,
        success: None,
        heading,
        action,
        form,
        errors,
    }
}

/// Display the add category form.
pub async fn add_category_page(RequireStaff(account): RequireStaff) -> impl IntoResponse {
    category_page(
        account,
        "Add category",
        "/add-category/".to_string(),
        CategoryForm::default(),
        FieldErrors::new(),
    )
}

/// Handle the add category form.
#[instrument(skip(state, account, form), fields(account_id = %account.id))]
pub async fn add_category(
    State(state): State<AppState>,
    RequireStaff(account): RequireStaff,
    Form(form): Form<CategoryForm>,
) -> Result<Response, AppError> {
    match CatalogService::new(state.store())
        .create_category(&form)
        .await
    {
        Ok(_) => Ok(Redirect::to("/category-list/?success=category_added").into_response()),
        Err(ServiceError::Validation(errors)) => {
            let page = category_page(
                account,
                "Add category",
                "/add-category/".to_string(),
                form,
                errors,
            );
            Ok((StatusCode::BAD_REQUEST, page).into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// Display the edit category form.
#[instrument(skip(state, account), fields(account_id = %account.id))]
pub async fn edit_category_page(
    State(state): State<AppState>,
    RequireStaff(account): RequireStaff,
    Path(category_id): Path<CategoryId>,
) -> Result<impl IntoResponse, AppError> {
    let category = CatalogService::new(state.store())
        .get_category(category_id)
        .await?;
    let form = CategoryForm {
        name: category.name,
        description: category.description.unwrap_or_default(),
    };
    Ok(category_page(
        account,
        "Edit category",
        format!("/edit-category/{category_id}/"),
        form,
        FieldErrors::new(),
    ))
}

/// Handle the edit category form.
#[instrument(skip(state, account, form), fields(account_id = %account.id))]
pub async fn edit_category(
    State(state): State<AppState>,
    RequireStaff(account): RequireStaff,
    Path(category_id): Path<CategoryId>,
    Form(form): Form<CategoryForm>,
) -> Result<Response, AppError> {
    match CatalogService::new(state.store())
        .edit_category(category_id, &form)
        .await
    {
        Ok(_) => Ok(Redirect::to("/category-list/?success=category_updated").into_response()),
        Err(ServiceError::Validation(errors)) => {
            let page = category_page(
                account,
                "Edit category",
                format!("/edit-category/{category_id}/"),
                form,
                errors,
            );
            Ok((StatusCode::BAD_REQUEST, page).into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// Delete a category with all of its products and their images.
#[instrument(skip(state, account), fields(account_id = %account.id))]
pub async fn delete_category(
    State(state): State<AppState>,
    RequireStaff(account): RequireStaff,
    Path(category_id): Path<CategoryId>,
) -> Result<Redirect, AppError> {
    let images = CatalogService::new(state.store())
        .delete_category(category_id)
        .await?;
    for image in &images {
        media::remove_product_image(state.media_dir(), image).await;
    }
    Ok(Redirect::to("/category-list/?success=category_deleted"))
}
