//! Domain models with validation at construction
//!
//! All user input is validated when creating these types.
//! Invalid input returns ValidationError, not panic.

pub mod highlight;
pub mod integration;
pub mod label;
pub mod library_item;
pub mod pagination;
pub mod position;
pub mod user;
pub mod validation;

pub use highlight::{Highlight, HighlightDetail, NewHighlight};
pub use integration::{Integration, IntegrationChanges, IntegrationKind};
pub use label::{Label, LabelChanges, LabelColor, LabelDescription, LabelName, LabelSelection, NewLabel};
pub use library_item::{ItemFilter, LibraryItem, LibraryItemDetail, NewLibraryItem, PageUrl};
pub use pagination::{Paginated, Pagination};
pub use position::MovePlan;
pub use user::{Email, User};
pub use validation::ValidationError;
