use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        auth::{LoginRequest, LoginResponse, RegisterRequest},
        cart::{CartAmountRequest, CartLine, CartSummary, ClearedCart},
        catalog::{
            CategoryList, CreateCategoryRequest, CreateProductRequest, CreateSubcategoryRequest,
            ProductList, SubcategoryList,
        },
    },
    models::{CartEntry, Category, Product, Role, Subcategory, User},
    response::{ApiResponse, Meta},
    routes::{auth, cart, catalog, health, params},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::register,
        auth::login,
        catalog::list_categories,
        catalog::get_category,
        catalog::create_category,
        catalog::list_subcategories,
        catalog::get_subcategory,
        catalog::create_subcategory,
        catalog::list_products,
        catalog::get_product,
        catalog::create_product,
        cart::cart_summary,
        cart::clear_cart,
        cart::add_to_cart,
        cart::update_cart_item,
        cart::remove_from_cart
    ),
    components(
        schemas(
            User,
            Role,
            Category,
            Subcategory,
            Product,
            CartEntry,
            CartLine,
            CartSummary,
            ClearedCart,
            CartAmountRequest,
            CategoryList,
            SubcategoryList,
            ProductList,
            CreateCategoryRequest,
            CreateSubcategoryRequest,
            CreateProductRequest,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            params::Pagination,
            Meta,
            ApiResponse<CartSummary>,
            ApiResponse<CartEntry>,
            ApiResponse<Product>,
            ApiResponse<ProductList>,
            ApiResponse<CategoryList>
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Registration and token issuance"),
        (name = "Catalog", description = "Categories, subcategories and products"),
        (name = "Cart", description = "Per-user shopping cart"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
