// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Environment-derived preference defaults (display language, timezone).
//!
//! These are pure with respect to the store but depend on the ambient
//! platform; the preference service calls each exactly once, at build
//! time, and never retries.

use thiserror::Error;

/// Language key used when the environment reports no locale at all.
const FALLBACK_LANGUAGE: &str = "en";

/// Error type for environment detection.
#[derive(Debug, Error)]
pub enum DetectError {
    /// The platform timezone could not be determined.
    #[error("timezone detection failed: {0}")]
    Timezone(#[from] iana_time_zone::GetTimezoneError),
}

/// Key of the language currently in use within the environment.
///
/// Prefers the first entry of the platform's ordered locale list, then the
/// single reported locale, then the literal `en`. The tag is normalized to
/// the underscore form used internally (`en-US` -> `en_US`).
pub fn default_language() -> String {
    language_or_fallback(sys_locale::get_locales().next().or_else(sys_locale::get_locale))
}

/// IANA name of the timezone detected for the current session
/// (e.g. `America/New_York`).
///
/// There is no fallback zone: callers that resolve defaults eagerly treat
/// a detection failure as an initialization fault.
pub fn detected_timezone() -> Result<String, DetectError> {
    Ok(iana_time_zone::get_timezone()?)
}

fn language_or_fallback(candidate: Option<String>) -> String {
    match candidate {
        Some(tag) => normalize_language_tag(&tag),
        None => FALLBACK_LANGUAGE.to_string(),
    }
}

/// Convert a BCP 47 style tag to the underscore form (`en-US` -> `en_US`).
fn normalize_language_tag(tag: &str) -> String {
    tag.replace('-', "_")
}
