//! URL-fragment codec.
//!
//! A pure bidirectional mapping between [`RoutingState`] and the
//! `#key=value&...` fragment of a dashboard deep link. Parsing is
//! total: malformed pairs and unknown keys are skipped, invalid values
//! fall back to their defaults, and nothing here ever errors.
//!
//! Recognized keys, in serialization order:
//! `view`, `project`, `q`, `level`, `env`, `release`, `from`, `to`,
//! `limit`, `offset`.

use crate::models::Level;
use crate::routing::state::{RoutingState, Tab};
use crate::time::TimeSelection;
use std::borrow::Cow;
use std::fmt::Write as _;

/// The parameters recovered from a fragment, with one `Option` per
/// recognized field so callers can tell "absent" from "default".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FragmentParams {
    /// `view=` value, when present and valid.
    pub view: Option<Tab>,
    /// `project=` slug, when present and non-empty.
    pub project: Option<String>,
    /// `q=` search text, when present.
    pub q: Option<String>,
    /// `level=` filter, when present and valid.
    pub level: Option<Level>,
    /// `env=` filter, when present and non-empty.
    pub env: Option<String>,
    /// `release=` filter, when present and non-empty.
    pub release: Option<String>,
    /// Absolute window, when both `from=` and `to=` were present.
    pub time_selection: Option<TimeSelection>,
    /// `limit=` value, when present and numeric.
    pub limit: Option<usize>,
    /// `offset=` value, when present and numeric.
    pub offset: Option<usize>,
    /// True when at least one recognized key appeared, valid or not.
    pub recognized: bool,
}

/// Parses a fragment (with or without the leading `#`).
///
/// Unknown `view` values are dropped so the caller keeps its prior tab;
/// non-numeric `limit`/`offset` are dropped so defaults apply; `from`
/// without `to` (and vice versa) yields no time selection.
#[must_use]
pub fn parse_fragment(fragment: &str) -> FragmentParams {
    let raw = fragment.strip_prefix('#').unwrap_or(fragment);
    let mut params = FragmentParams::default();
    let mut from: Option<String> = None;
    let mut to: Option<String> = None;

    for pair in raw.split('&') {
        let Some((key, value)) = pair.split_once('=') else {
            continue;
        };
        let value = decode(value);

        match key {
            "view" => {
                params.recognized = true;
                if let Ok(tab) = value.parse::<Tab>() {
                    params.view = Some(tab);
                }
            }
            "project" => {
                params.recognized = true;
                if !value.is_empty() {
                    params.project = Some(value.into_owned());
                }
            }
            "q" => {
                params.recognized = true;
                params.q = Some(value.into_owned());
            }
            "level" => {
                params.recognized = true;
                if let Ok(level) = value.parse::<Level>() {
                    params.level = Some(level);
                }
            }
            "env" => {
                params.recognized = true;
                if !value.is_empty() {
                    params.env = Some(value.into_owned());
                }
            }
            "release" => {
                params.recognized = true;
                if !value.is_empty() {
                    params.release = Some(value.into_owned());
                }
            }
            "from" => {
                params.recognized = true;
                from = Some(value.into_owned());
            }
            "to" => {
                params.recognized = true;
                to = Some(value.into_owned());
            }
            "limit" => {
                params.recognized = true;
                params.limit = value.parse::<usize>().ok();
            }
            "offset" => {
                params.recognized = true;
                params.offset = value.parse::<usize>().ok();
            }
            _ => {}
        }
    }

    // Both bounds are required to form a window.
    if let (Some(from), Some(to)) = (from, to) {
        params.time_selection = Some(TimeSelection { from, to });
    }

    params
}

/// Serializes the recognized key set of a state back into a fragment,
/// leading `#` included.
///
/// Keys at their empty/absent value are omitted; `view`, `limit`, and
/// `offset` are always written so a pasted link is self-describing.
#[must_use]
pub fn encode_fragment(state: &RoutingState) -> String {
    let mut out = String::from("#");
    let _ = write!(out, "view={}", state.active_tab);

    if let Some(project) = &state.selected_project {
        let _ = write!(out, "&project={}", urlencoding::encode(project));
    }
    if !state.search.is_empty() {
        let _ = write!(out, "&q={}", urlencoding::encode(&state.search));
    }
    if let Some(level) = state.filter_level {
        let _ = write!(out, "&level={level}");
    }
    if let Some(env) = &state.filter_env {
        let _ = write!(out, "&env={}", urlencoding::encode(env));
    }
    if let Some(release) = &state.filter_release {
        let _ = write!(out, "&release={}", urlencoding::encode(release));
    }
    if let Some(selection) = &state.time_selection {
        let _ = write!(
            out,
            "&from={}&to={}",
            urlencoding::encode(&selection.from),
            urlencoding::encode(&selection.to)
        );
    }
    let _ = write!(
        out,
        "&limit={}&offset={}",
        state.event_limit, state.event_offset
    );

    out
}

/// Percent-decodes a value; malformed escapes fall back to the raw text.
fn decode(value: &str) -> Cow<'_, str> {
    urlencoding::decode(value).unwrap_or(Cow::Borrowed(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty_fragment() {
        let params = parse_fragment("");
        assert!(!params.recognized);
        assert_eq!(params, FragmentParams::default());

        let params = parse_fragment("#");
        assert!(!params.recognized);
    }

    #[test]
    fn test_parse_unknown_keys_ignored() {
        let params = parse_fragment("#foo=bar&baz=1");
        assert!(!params.recognized);
    }

    #[test]
    fn test_parse_full_fragment() {
        let params = parse_fragment(
            "#view=events&project=my-app&q=timeout&level=error&env=prod&release=1.2.0\
             &from=2024-01-01T00%3A00%3A00Z&to=2024-01-02T00%3A00%3A00Z&limit=25&offset=50",
        );
        assert!(params.recognized);
        assert_eq!(params.view, Some(Tab::Events));
        assert_eq!(params.project.as_deref(), Some("my-app"));
        assert_eq!(params.q.as_deref(), Some("timeout"));
        assert_eq!(params.level, Some(Level::Error));
        assert_eq!(params.env.as_deref(), Some("prod"));
        assert_eq!(params.release.as_deref(), Some("1.2.0"));
        assert_eq!(
            params.time_selection,
            Some(TimeSelection {
                from: "2024-01-01T00:00:00Z".to_string(),
                to: "2024-01-02T00:00:00Z".to_string(),
            })
        );
        assert_eq!(params.limit, Some(25));
        assert_eq!(params.offset, Some(50));
    }

    #[test]
    fn test_parse_invalid_view_dropped() {
        let params = parse_fragment("#view=dashboard");
        assert!(params.recognized);
        assert_eq!(params.view, None);
    }

    #[test]
    fn test_parse_invalid_numbers_dropped() {
        let params = parse_fragment("#limit=abc&offset=-5");
        assert!(params.recognized);
        assert_eq!(params.limit, None);
        assert_eq!(params.offset, None);
    }

    #[test]
    fn test_parse_from_without_to() {
        let params = parse_fragment("#from=2024-01-01T00:00:00Z");
        assert!(params.recognized);
        assert_eq!(params.time_selection, None);
    }

    #[test]
    fn test_parse_malformed_pairs_skipped() {
        let params = parse_fragment("#view&&=x&view=issues");
        assert_eq!(params.view, Some(Tab::Issues));
    }

    #[test]
    fn test_parse_encoded_search() {
        let params = parse_fragment("#q=level%3Aerror%20%22db%20error%22");
        assert_eq!(params.q.as_deref(), Some(r#"level:error "db error""#));
    }

    #[test]
    fn test_encode_default_state() {
        let state = RoutingState::default();
        assert_eq!(encode_fragment(&state), "#view=overview&limit=50&offset=0");
    }

    #[test]
    fn test_encode_parse_round_trip() {
        let mut state = RoutingState::default();
        state.active_tab = Tab::Events;
        state.selected_project = Some("my-app".to_string());
        state.search = r#"level:error "db error""#.to_string();
        state.filter_level = Some(Level::Warning);
        state.filter_env = Some("prod".to_string());
        state.filter_release = Some("1.2.0".to_string());
        state.time_selection = Some(TimeSelection {
            from: "2024-01-01T00:00:00Z".to_string(),
            to: "2024-01-02T00:00:00Z".to_string(),
        });
        state.event_limit = 25;
        state.event_offset = 75;

        let params = parse_fragment(&encode_fragment(&state));
        assert_eq!(params.view, Some(Tab::Events));
        assert_eq!(params.project.as_deref(), Some("my-app"));
        assert_eq!(params.q.as_deref(), Some(r#"level:error "db error""#));
        assert_eq!(params.level, Some(Level::Warning));
        assert_eq!(params.env.as_deref(), Some("prod"));
        assert_eq!(params.release.as_deref(), Some("1.2.0"));
        assert_eq!(params.time_selection, state.time_selection);
        assert_eq!(params.limit, Some(25));
        assert_eq!(params.offset, Some(75));
    }
}
