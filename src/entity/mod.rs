pub mod categories;
pub mod products;
pub mod shopping_cart;
pub mod subcategories;
pub mod users;

pub use categories::Entity as Categories;
pub use products::Entity as Products;
pub use shopping_cart::Entity as ShoppingCart;
pub use subcategories::Entity as Subcategories;
pub use users::Entity as Users;
