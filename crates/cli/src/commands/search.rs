use std::time::Duration;

use serde::Serialize;
use storefront_core::gateway::GatewayError;
use storefront_core::{
    NavigationTarget, SearchOutcome, SearchSession, SearchSettings, Suggestion, SuggestionBox,
    SuggestionUpdate,
};

use crate::commands::catalog::ProductLine;
use crate::commands::{with_backend, CommandResult};

#[derive(Debug, Serialize)]
struct SuggestionLine {
    #[serde(flatten)]
    suggestion: Suggestion,
    target: NavigationTarget,
}

pub fn search(text: &str) -> CommandResult {
    with_backend("search", |_config, reader| async move {
        let session = SearchSession::new(reader);
        match session.search(text).await {
            SearchOutcome::Results(results) => {
                let lines: Vec<ProductLine> = results.iter().map(ProductLine::from).collect();
                let message = format!("{} results for `{}`", lines.len(), session.state().term);
                Ok(CommandResult::success_with_data("search", message, lines))
            }
            SearchOutcome::Failed(error) => Err(error),
            SearchOutcome::Superseded => {
                Ok(CommandResult::failure("search", "superseded", "search was superseded", 1))
            }
        }
    })
}

pub fn suggest(text: &str) -> CommandResult {
    with_backend("suggest", |config, reader| async move {
        // a single input has nothing to coalesce with
        let settings =
            SearchSettings { debounce: Duration::ZERO, ..SearchSettings::from(&config.search) };
        let suggestion_box = SuggestionBox::new(reader, settings);

        let suggestions = match suggestion_box.input(text).await {
            SuggestionUpdate::Applied(suggestions) => suggestions,
            SuggestionUpdate::Superseded => Vec::new(),
        };
        let lines: Vec<SuggestionLine> = suggestions
            .into_iter()
            .map(|suggestion| SuggestionLine { target: suggestion.target(), suggestion })
            .collect();

        let message = format!("{} suggestions for `{}`", lines.len(), text.trim());
        Ok::<_, GatewayError>(CommandResult::success_with_data("suggest", message, lines))
    })
}
