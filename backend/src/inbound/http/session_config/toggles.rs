//! Environment toggles behind the session cookie settings.
//!
//! Debug builds log a bad or missing toggle and carry on with a fallback;
//! release builds refuse to start.

use actix_web::cookie::SameSite;
use mockable::Env;
use tracing::warn;

use super::{BuildMode, SAMESITE_ENV, SessionConfigError};

const FLAG_VALUES: &str = "1|0|true|false|yes|no|y|n";
const SAME_SITE_VALUES: &str = "Strict|Lax|None";

/// Reads toggles from `env` under the rules of one build mode.
pub(super) struct Toggles<'a, E> {
    env: &'a E,
    mode: BuildMode,
}

impl<'a, E: Env> Toggles<'a, E> {
    pub(super) fn new(env: &'a E, mode: BuildMode) -> Self {
        Self { env, mode }
    }

    fn lenient<T>(&self, fallback: T, error: SessionConfigError) -> Result<T, SessionConfigError> {
        match self.mode {
            BuildMode::Debug => {
                warn!(%error, "session setting replaced by debug fallback");
                Ok(fallback)
            }
            BuildMode::Release => Err(error),
        }
    }

    /// Boolean toggle `name`; `debug_default` applies only in debug builds.
    pub(super) fn flag(
        &self,
        name: &'static str,
        debug_default: bool,
    ) -> Result<bool, SessionConfigError> {
        let Some(raw) = self.env.string(name) else {
            return self.lenient(debug_default, SessionConfigError::MissingEnv { name });
        };
        match parse_flag(&raw) {
            Some(flag) => Ok(flag),
            None => self.lenient(
                debug_default,
                SessionConfigError::InvalidEnv {
                    name,
                    value: raw,
                    expected: FLAG_VALUES,
                },
            ),
        }
    }

    /// `SameSite` policy. `None` needs a secure cookie.
    pub(super) fn same_site(&self, cookie_secure: bool) -> Result<SameSite, SessionConfigError> {
        let fallback = match self.mode {
            BuildMode::Debug => SameSite::Lax,
            BuildMode::Release => SameSite::Strict,
        };
        let Some(raw) = self.env.string(SAMESITE_ENV) else {
            return self.lenient(fallback, SessionConfigError::MissingEnv { name: SAMESITE_ENV });
        };
        let Some(policy) = parse_same_site(&raw) else {
            return self.lenient(
                fallback,
                SessionConfigError::InvalidEnv {
                    name: SAMESITE_ENV,
                    value: raw,
                    expected: SAME_SITE_VALUES,
                },
            );
        };
        if policy == SameSite::None && !cookie_secure {
            return self.lenient(policy, SessionConfigError::InsecureSameSiteNone);
        }
        Ok(policy)
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" => Some(true),
        "0" | "false" | "no" | "n" => Some(false),
        _ => None,
    }
}

fn parse_same_site(raw: &str) -> Option<SameSite> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "strict" => Some(SameSite::Strict),
        "lax" => Some(SameSite::Lax),
        "none" => Some(SameSite::None),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("1", Some(true))]
    #[case(" Yes ", Some(true))]
    #[case("FALSE", Some(false))]
    #[case("n", Some(false))]
    #[case("on", None)]
    fn flags_accept_common_spellings(#[case] raw: &str, #[case] expected: Option<bool>) {
        assert_eq!(parse_flag(raw), expected);
    }

    #[rstest]
    #[case("lax", Some(SameSite::Lax))]
    #[case("STRICT", Some(SameSite::Strict))]
    #[case("None", Some(SameSite::None))]
    #[case("sometimes", None)]
    fn same_site_is_case_insensitive(#[case] raw: &str, #[case] expected: Option<SameSite>) {
        assert_eq!(parse_same_site(raw), expected);
    }
}
