pub mod artworks;
pub mod order_items;
pub mod orders;
pub mod users;

pub use artworks::Entity as Artworks;
pub use order_items::Entity as OrderItems;
pub use orders::Entity as Orders;
pub use users::Entity as Users;
