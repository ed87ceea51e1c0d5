pub mod deck;
pub mod users;
pub mod words;

pub use deck::PgDeckStore;
pub use users::PgIdentityStore;
pub use words::PgWordStore;
