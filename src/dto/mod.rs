pub mod artworks;
pub mod auth;
pub mod orders;
