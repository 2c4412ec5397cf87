//! Client for the shelfctl GraphQL API.
//!
//! # Example
//!
//! ```no_run
//! use shelfctl_client::{SavePageRequest, ShelfClient};
//!
//! # async fn example() -> shelfctl_client::Result<()> {
//! let client = ShelfClient::builder()
//!     .base_url("http://127.0.0.1:3030")
//!     .api_key("shelf_...")
//!     .build()?;
//!
//! let saved = client
//!     .save_page(SavePageRequest::new("https://example.com/post", "<p>...</p>"))
//!     .await?;
//! println!("saved as {}", saved.library_item_id);
//! # Ok(())
//! # }
//! ```

mod client;
mod error;
mod types;

pub use client::{ClientBuilder, ShelfClient};
pub use error::{ClientError, Result};
pub use types::{SavePageRequest, SavedPage};
