pub mod builder;
pub mod client;
pub mod errors;

pub use builder::*;
pub use client::*;
pub use errors::*;

pub mod prelude {
    pub use crate::builder::PlaylistBuilder;
    pub use crate::client::PlaylistClient;
    pub use crate::errors::{PlaylistError, Result};
}
