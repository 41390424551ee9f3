//! User-Agent string shared by API and progress-stream requests.

const UA_PRODUCT: &str = "literature-assistant";

/// Default User-Agent for requests to the literature service.
#[must_use]
pub(crate) fn default_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("{UA_PRODUCT}/{version} (library-client)")
}
