//! Best-effort event metadata scraped from the registration page.

use std::time::Duration;

use tracing::{debug, info};

use crate::config::ContextSelectors;
use crate::session::WebSession;

/// Title used when the page offers none.
pub const FALLBACK_TITLE: &str = "Event";

/// What the page says about the event. Any field but `title` may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventContext {
    pub title: String,
    pub description: String,
    pub date_time: String,
    pub location: String,
}

/// Scrape title, description, date/time and location. Never fails: missing
/// pieces are left empty and a missing title becomes [`FALLBACK_TITLE`].
pub async fn extract_context<S: WebSession>(
    session: &S,
    selectors: &ContextSelectors,
) -> EventContext {
    let mut context = EventContext {
        title: first_text(session, "title", &selectors.title).await,
        description: first_text(session, "description", &selectors.description).await,
        date_time: first_text(session, "date/time", &selectors.date_time).await,
        location: first_text(session, "location", &selectors.location).await,
    };
    if context.title.is_empty() {
        context.title = FALLBACK_TITLE.to_string();
    }
    info!(title = %context.title, "extracted event context");
    context
}

/// Text of the first selector that finds a non-blank element, else empty.
async fn first_text<S: WebSession>(session: &S, what: &str, selectors: &[String]) -> String {
    for selector in selectors {
        let element = match session.locate(selector, Duration::ZERO).await {
            Ok(element) => element,
            Err(e) => {
                debug!(field = what, selector = %selector, error = %e, "context selector missed");
                continue;
            }
        };
        match session.read_text(&element).await {
            Ok(text) if !text.trim().is_empty() => return text.trim().to_string(),
            Ok(_) => debug!(field = what, selector = %selector, "context element is blank"),
            Err(e) => debug!(field = what, selector = %selector, error = %e, "could not read context text"),
        }
    }
    info!("could not extract event {what}");
    String::new()
}
