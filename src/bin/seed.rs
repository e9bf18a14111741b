use std::str::FromStr;

use rust_decimal::Decimal;
use shop_api::{
    config::database_url_from_env,
    db::{create_orm_conn, run_migrations},
    models::Role,
    repository::{
        CatalogRepository, NewCategory, NewProduct, NewSubcategory, NewUser, PageRequest,
        SeaOrmStore, UserRepository,
    },
    services::auth_service::hash_password,
};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let orm = create_orm_conn(&database_url_from_env()?).await?;
    run_migrations(&orm).await?;
    let store = SeaOrmStore::new(orm);

    let admin_id = ensure_user(&store, "admin@example.com", "admin123", Role::Admin).await?;
    let user_id = ensure_user(&store, "user@example.com", "user123", Role::User).await?;
    seed_catalog(&store).await?;

    tracing::info!(%admin_id, %user_id, "seed completed");
    Ok(())
}

async fn ensure_user(
    store: &SeaOrmStore,
    email: &str,
    password: &str,
    role: Role,
) -> anyhow::Result<Uuid> {
    if let Some(existing) = store.find_user_by_email(email).await? {
        tracing::info!(email, "user already present");
        return Ok(existing.id);
    }

    let user = store
        .create_user(NewUser {
            email: email.to_string(),
            password_hash: hash_password(password)?,
            role,
        })
        .await?;
    tracing::info!(email, role = role.as_str(), "user created");
    Ok(user.id)
}

async fn seed_catalog(store: &SeaOrmStore) -> anyhow::Result<()> {
    let existing = store
        .list_categories(PageRequest {
            limit: 1,
            offset: 0,
        })
        .await?;
    if existing.total > 0 {
        tracing::info!("catalog already seeded");
        return Ok(());
    }

    let catalog = [
        (
            "Electronics",
            "electronics",
            vec![
                (
                    "Phones",
                    "phones",
                    vec![("iPhone 13", "iphone-13", "799.99"), ("Pixel 8", "pixel-8", "699.00")],
                ),
                (
                    "Laptops",
                    "laptops",
                    vec![("ThinkPad X1", "thinkpad-x1", "1499.50")],
                ),
            ],
        ),
        (
            "Groceries",
            "groceries",
            vec![(
                "Bakery",
                "bakery",
                vec![("Rye bread", "rye-bread", "2.40"), ("Baguette", "baguette", "1.90")],
            )],
        ),
    ];

    for (title, slug, subcategories) in catalog {
        let category = store
            .create_category(NewCategory {
                title: title.to_string(),
                slug: slug.to_string(),
                image: None,
            })
            .await?;

        for (sub_title, sub_slug, products) in subcategories {
            let subcategory = store
                .create_subcategory(NewSubcategory {
                    title: sub_title.to_string(),
                    slug: sub_slug.to_string(),
                    image: None,
                    category_id: category.id,
                })
                .await?;

            for (name, product_slug, price) in products {
                store
                    .create_product(NewProduct {
                        name: name.to_string(),
                        slug: product_slug.to_string(),
                        image: None,
                        price: Decimal::from_str(price)?,
                        category_id: category.id,
                        subcategory_id: subcategory.id,
                    })
                    .await?;
            }
        }
    }

    tracing::info!("catalog seeded");
    Ok(())
}
