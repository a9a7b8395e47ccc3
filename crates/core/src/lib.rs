pub mod catalog;
pub mod config;
pub mod domain;
pub mod errors;
pub mod gateway;
pub mod search;
pub mod store;
pub mod suggestions;

pub use catalog::pipeline::{view, FilterSelection, PriceBucket, ProductQuery, SortSelection};
pub use catalog::pricing::{final_price, format_currency, has_discount, STORE_CURRENCY};
pub use catalog::Catalog;
pub use domain::category::{Category, CategoryDraft, CategoryId};
pub use domain::product::{Product, ProductDraft, ProductId};
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use gateway::{CatalogReader, CatalogWriter, GatewayError};
pub use search::{
    RequestSequence, RequestTicket, SearchOutcome, SearchSession, SearchSettings, SearchState,
    SuggestionBox, SuggestionUpdate,
};
pub use store::CatalogStore;
pub use suggestions::{suggest, NavigationTarget, Suggestion, SuggestionKind, SuggestionMatcher};
