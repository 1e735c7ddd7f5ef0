//! Persistent user state: accounts, transit card settings and favorites.

mod error;
mod users;

pub use error::StoreError;
pub use users::{Account, Favorite, UserStore};
