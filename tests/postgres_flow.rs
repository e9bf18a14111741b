use std::str::FromStr;

use rust_decimal::Decimal;
use sea_orm::{ConnectionTrait, Statement};
use shop_api::{
    db::{create_orm_conn, run_migrations},
    models::Role,
    repository::{
        CatalogRepository, NewCategory, NewProduct, NewSubcategory, NewUser, SeaOrmStore,
        StoreError, UserRepository,
    },
    services::cart_service::{
        self, CartError, CartStatus, add_to_cart, clear_cart, remove_from_cart, summarize_cart,
        update_quantity,
    },
};
use uuid::Uuid;

async fn setup_store(database_url: &str) -> anyhow::Result<SeaOrmStore> {
    let orm = create_orm_conn(database_url).await?;
    run_migrations(&orm).await?;

    orm.execute(Statement::from_string(
        orm.get_database_backend(),
        "TRUNCATE TABLE shopping_cart, products, subcategories, categories, users CASCADE",
    ))
    .await?;

    Ok(SeaOrmStore::new(orm))
}

// Cart lifecycle against PostgreSQL: row locks, the unique pair constraint and
// the NUMERIC price column.
#[tokio::test]
async fn cart_lifecycle_on_postgres() -> anyhow::Result<()> {
    // Allow skipping when no DB is configured in the environment.
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!("Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run postgres tests.");
            return Ok(());
        }
    };

    let store = setup_store(&database_url).await?;

    let user = store
        .create_user(NewUser {
            email: "cart@example.com".into(),
            password_hash: "unused".into(),
            role: Role::User,
        })
        .await?;
    let err = store
        .create_user(NewUser {
            email: "cart@example.com".into(),
            password_hash: "unused".into(),
            role: Role::User,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Conflict(_)));

    let category = store
        .create_category(NewCategory {
            title: "Electronics".into(),
            slug: "electronics".into(),
            image: None,
        })
        .await?;
    let subcategory = store
        .create_subcategory(NewSubcategory {
            title: "Phones".into(),
            slug: "phones".into(),
            image: None,
            category_id: category.id,
        })
        .await?;
    let phone = store
        .create_product(NewProduct {
            name: "iPhone 13".into(),
            slug: "iphone-13".into(),
            image: None,
            price: Decimal::from_str("799.99")?,
            category_id: category.id,
            subcategory_id: subcategory.id,
        })
        .await?;

    let listed = store
        .find_category(category.id)
        .await?
        .expect("category exists");
    assert_eq!(listed.subcategories, vec!["Phones".to_string()]);

    // the user foreign key is reported against the user, not the product
    let stranger = Uuid::new_v4();
    let err = add_to_cart(&store, stranger, phone.id, 1).await.unwrap_err();
    assert!(matches!(err, CartError::UserNotFound(id) if id == stranger));

    // add, duplicate add
    let added = add_to_cart(&store, user.id, phone.id, 2).await?;
    assert_eq!(added.status, CartStatus::Created);
    let err = add_to_cart(&store, user.id, phone.id, 1).await.unwrap_err();
    assert!(matches!(err, CartError::Conflict(_)));

    let summary = summarize_cart(&store, user.id).await?;
    assert_eq!(summary.total_items, 2);
    assert_eq!(summary.total_price, Decimal::from_str("1599.98")?);

    // update, then remove and re-add on the same row
    update_quantity(&store, user.id, phone.id, 3).await?;
    let summary = summarize_cart(&store, user.id).await?;
    assert_eq!(summary.total_price, Decimal::from_str("2399.97")?);

    let removed = remove_from_cart(&store, user.id, phone.id).await?;
    assert_eq!(removed.data.amount, 0);
    assert!(!removed.data.is_in_shopping_cart);
    let err = update_quantity(&store, user.id, phone.id, 1).await.unwrap_err();
    assert!(matches!(err, CartError::NotInCart(_)));

    let again = add_to_cart(&store, user.id, phone.id, 1).await?;
    assert_eq!(again.data.id, added.data.id);

    // clear is idempotent
    assert_eq!(clear_cart(&store, user.id).await?.data, 1);
    assert_eq!(clear_cart(&store, user.id).await?.data, 0);
    let summary = cart_service::summarize_cart(&store, user.id).await?;
    assert!(summary.cart_contents.is_empty());
    assert_eq!(summary.total_price, Decimal::ZERO);

    // concurrent adds race on the row lock and unique constraint
    let (first, second) = tokio::join!(
        add_to_cart(&store, user.id, phone.id, 1),
        add_to_cart(&store, user.id, phone.id, 4),
    );
    let outcomes = [first, second];
    assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
    assert_eq!(
        outcomes
            .iter()
            .filter(|r| matches!(r, Err(CartError::Conflict(_))))
            .count(),
        1
    );

    Ok(())
}
