//! Search-box suggestions built from products the backend already matched.

mod matcher;
mod types;

pub use matcher::{suggest, SuggestionMatcher};
pub use types::{NavigationTarget, Suggestion, SuggestionKind};

/// Shorter queries produce no suggestions and never reach the backend.
pub const MIN_QUERY_CHARS: usize = 2;

/// Candidate products requested per suggestion lookup.
pub const DEFAULT_SUGGESTION_LIMIT: usize = 10;

/// Quiet period after the last keystroke before a lookup is issued.
pub const DEFAULT_DEBOUNCE_MS: u64 = 300;
