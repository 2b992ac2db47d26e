//! API version value type: parsing, formatting, and ordering.
//!
//! An [`ApiVersion`] is either a calendar-style group version (`2013-08-06`),
//! a numeric `major.minor` version (`2.1`), or the distinguished
//! version-neutral marker. Any non-neutral version may carry a status label
//! (`2.1-beta`). Values are immutable and safe to share across threads.

use crate::error::ParseError;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// Raw token recognized (case-insensitively) as the version-neutral marker.
pub(crate) const NEUTRAL_TOKEN: &str = "neutral";

/// Calendar-style version group: a year, month, and day.
///
/// Parsed from `yyyy-MM` or `yyyy-MM-dd` tokens; a missing day defaults
/// to the first of the month. Validation is shape-level only (month 1-12,
/// day 1-31), not a full calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GroupVersion {
    year: u16,
    month: u8,
    day: u8,
}

impl GroupVersion {
    /// Create a group version, validating the month and day ranges.
    pub fn new(year: u16, month: u8, day: u8) -> Result<Self, ParseError> {
        let token = format!("{year:04}-{month:02}-{day:02}");
        if month == 0 || month > 12 {
            return Err(ParseError::InvalidDate {
                token,
                component: month.to_string(),
            });
        }
        if day == 0 || day > 31 {
            return Err(ParseError::InvalidDate {
                token,
                component: day.to_string(),
            });
        }
        Ok(Self { year, month, day })
    }

    /// Year component.
    pub fn year(&self) -> u16 {
        self.year
    }

    /// Month component (1-12).
    pub fn month(&self) -> u8 {
        self.month
    }

    /// Day component (1-31).
    pub fn day(&self) -> u8 {
        self.day
    }
}

impl fmt::Display for GroupVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

/// An API version.
///
/// Exactly one of three identities: a [`GroupVersion`], a `major.minor`
/// pair, or version-neutral. A missing minor component defaults to `0`,
/// so `"1"` and `"1.0"` parse to equal values.
///
/// # Ordering
///
/// Versions are totally ordered: group versions compare first (undated
/// sorts before dated), then major, then minor, then status. A version
/// *without* a status sorts after the same version *with* one, so `1.0`
/// is later than `1.0-beta`. Status labels compare case-insensitively.
/// The neutral version sorts after everything else.
///
/// # Example
///
/// ```rust
/// use verso_core::ApiVersion;
///
/// let requested: ApiVersion = "2.1-beta".parse().unwrap();
/// assert!(requested < ApiVersion::new(2, 1));
/// assert_eq!(requested.to_string(), "2.1-beta");
/// ```
#[derive(Debug, Clone)]
pub struct ApiVersion {
    group: Option<GroupVersion>,
    major: Option<u64>,
    minor: Option<u64>,
    status: Option<String>,
    neutral: bool,
}

impl ApiVersion {
    /// The version-neutral marker. Matches every requested version.
    pub const NEUTRAL: ApiVersion = ApiVersion {
        group: None,
        major: None,
        minor: None,
        status: None,
        neutral: true,
    };

    /// Create a `major.minor` version.
    pub fn new(major: u64, minor: u64) -> Self {
        Self {
            group: None,
            major: Some(major),
            minor: Some(minor),
            status: None,
            neutral: false,
        }
    }

    /// Create a `major.minor` version with a status label such as `"beta"`.
    ///
    /// The label must start with an ASCII letter and contain only ASCII
    /// alphanumerics.
    pub fn with_status(
        major: u64,
        minor: u64,
        status: impl Into<String>,
    ) -> Result<Self, ParseError> {
        let status = validate_status(&format!("{major}.{minor}"), &status.into())?;
        Ok(Self {
            group: None,
            major: Some(major),
            minor: Some(minor),
            status: Some(status),
            neutral: false,
        })
    }

    /// Create a calendar-style group version.
    pub fn from_group(group: GroupVersion) -> Self {
        Self {
            group: Some(group),
            major: None,
            minor: None,
            status: None,
            neutral: false,
        }
    }

    /// Create a calendar-style group version with a status label.
    pub fn from_group_with_status(
        group: GroupVersion,
        status: impl Into<String>,
    ) -> Result<Self, ParseError> {
        let status = validate_status(&group.to_string(), &status.into())?;
        Ok(Self {
            group: Some(group),
            major: None,
            minor: None,
            status: Some(status),
            neutral: false,
        })
    }

    /// Parse a raw version token. Equivalent to [`str::parse`].
    pub fn parse(raw: &str) -> Result<Self, ParseError> {
        raw.parse()
    }

    /// Calendar group, when this is a group version.
    pub fn group(&self) -> Option<GroupVersion> {
        self.group
    }

    /// Major component, when this is a numeric version.
    pub fn major(&self) -> Option<u64> {
        self.major
    }

    /// Minor component, when this is a numeric version.
    pub fn minor(&self) -> Option<u64> {
        self.minor
    }

    /// Status label, if any.
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// Whether this is the version-neutral marker.
    pub fn is_neutral(&self) -> bool {
        self.neutral
    }

    /// Whether this version carries a status label such as `-beta`.
    pub fn is_prerelease(&self) -> bool {
        self.status.is_some()
    }
}

impl Default for ApiVersion {
    fn default() -> Self {
        Self::new(1, 0)
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.neutral {
            return f.write_str(NEUTRAL_TOKEN);
        }
        if let Some(group) = &self.group {
            write!(f, "{group}")?;
        } else if let Some(major) = self.major {
            write!(f, "{}.{}", major, self.minor.unwrap_or(0))?;
        }
        if let Some(status) = &self.status {
            write!(f, "-{status}")?;
        }
        Ok(())
    }
}

impl PartialEq for ApiVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ApiVersion {}

impl Hash for ApiVersion {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.neutral.hash(state);
        self.group.hash(state);
        self.major.hash(state);
        self.minor.hash(state);
        match &self.status {
            Some(status) => {
                state.write_u8(1);
                for b in status.bytes() {
                    state.write_u8(b.to_ascii_lowercase());
                }
            }
            None => state.write_u8(0),
        }
    }
}

impl PartialOrd for ApiVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ApiVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.neutral, other.neutral) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => self
                .group
                .cmp(&other.group)
                .then_with(|| self.major.cmp(&other.major))
                .then_with(|| self.minor.cmp(&other.minor))
                .then_with(|| cmp_status(self.status.as_deref(), other.status.as_deref())),
        }
    }
}

/// A missing status sorts after any present one: the released version is
/// later than its pre-release sibling at the same major.minor.
fn cmp_status(a: Option<&str>, b: Option<&str>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => a
            .bytes()
            .map(|b| b.to_ascii_lowercase())
            .cmp(b.bytes().map(|b| b.to_ascii_lowercase())),
    }
}

impl FromStr for ApiVersion {
    type Err = ParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let token = raw.trim();
        if token.is_empty() {
            return Err(ParseError::Empty);
        }
        if token.eq_ignore_ascii_case(NEUTRAL_TOKEN) {
            return Ok(ApiVersion::NEUTRAL);
        }

        // Optional `v`/`V` prefix ahead of a digit, as in `v2` or `v2013-08-06`.
        let body = match token.strip_prefix(['v', 'V']) {
            Some(rest) if rest.starts_with(|c: char| c.is_ascii_digit()) => rest,
            _ => token,
        };

        if let Some((group, rest)) = split_group(token, body)? {
            if rest.is_empty() {
                return Ok(Self::from_group(group));
            }
            if rest.starts_with('.') {
                return Err(ParseError::MixedComponents(token.to_string()));
            }
            if let Some(status) = rest.strip_prefix('-') {
                if !status.is_empty()
                    && status.bytes().all(|b| b.is_ascii_digit() || b == b'.')
                {
                    return Err(ParseError::MixedComponents(token.to_string()));
                }
                let status = validate_status(token, status)?;
                return Ok(Self {
                    group: Some(group),
                    major: None,
                    minor: None,
                    status: Some(status),
                    neutral: false,
                });
            }
            return Err(ParseError::Malformed(token.to_string()));
        }

        let (numbers, status) = match body.split_once('-') {
            Some((numbers, status)) => (numbers, Some(status)),
            None => (body, None),
        };
        let mut pieces = numbers.split('.');
        let major = parse_component(token, pieces.next().unwrap_or_default())?;
        let minor = match pieces.next() {
            Some(minor) => parse_component(token, minor)?,
            None => 0,
        };
        if pieces.next().is_some() {
            return Err(ParseError::Malformed(token.to_string()));
        }
        let status = match status {
            Some(status) => Some(validate_status(token, status)?),
            None => None,
        };
        Ok(Self {
            group: None,
            major: Some(major),
            minor: Some(minor),
            status,
            neutral: false,
        })
    }
}

impl Serialize for ApiVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ApiVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct VersionVisitor;

        impl Visitor<'_> for VersionVisitor {
            type Value = ApiVersion;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an api version string")
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<ApiVersion, E> {
                value.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_str(VersionVisitor)
    }
}

/// Split a leading `yyyy-MM` or `yyyy-MM-dd` calendar component off `body`.
///
/// `token` is the full original token, used for error context only.
fn split_group<'a>(
    token: &str,
    body: &'a str,
) -> Result<Option<(GroupVersion, &'a str)>, ParseError> {
    let bytes = body.as_bytes();
    if bytes.len() < 7
        || !bytes[..4].iter().all(u8::is_ascii_digit)
        || bytes[4] != b'-'
        || !bytes[5].is_ascii_digit()
        || !bytes[6].is_ascii_digit()
    {
        return Ok(None);
    }
    let year = parse_date_part::<u16>(token, &body[..4])?;
    let month = parse_date_part::<u8>(token, &body[5..7])?;
    let (day, consumed) = if bytes.len() >= 10
        && bytes[7] == b'-'
        && bytes[8].is_ascii_digit()
        && bytes[9].is_ascii_digit()
    {
        (parse_date_part::<u8>(token, &body[8..10])?, 10)
    } else {
        (1, 7)
    };
    let group = GroupVersion::new(year, month, day).map_err(|err| match err {
        ParseError::InvalidDate { component, .. } => ParseError::InvalidDate {
            token: token.to_string(),
            component,
        },
        other => other,
    })?;
    Ok(Some((group, &body[consumed..])))
}

fn parse_date_part<T: FromStr>(token: &str, text: &str) -> Result<T, ParseError> {
    text.parse().map_err(|_| ParseError::InvalidDate {
        token: token.to_string(),
        component: text.to_string(),
    })
}

fn parse_component(token: &str, text: &str) -> Result<u64, ParseError> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseError::InvalidNumber {
            token: token.to_string(),
            component: text.to_string(),
        });
    }
    text.parse().map_err(|_| ParseError::InvalidNumber {
        token: token.to_string(),
        component: text.to_string(),
    })
}

fn validate_status(token: &str, status: &str) -> Result<String, ParseError> {
    let mut bytes = status.bytes();
    let valid = matches!(bytes.next(), Some(b) if b.is_ascii_alphabetic())
        && bytes.all(|b| b.is_ascii_alphanumeric());
    if valid {
        Ok(status.to_string())
    } else {
        Err(ParseError::InvalidStatus {
            token: token.to_string(),
            status: status.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn group(year: u16, month: u8, day: u8) -> GroupVersion {
        GroupVersion::new(year, month, day).unwrap()
    }

    #[test]
    fn test_parse_major_minor() {
        assert_eq!("1.0".parse::<ApiVersion>().unwrap(), ApiVersion::new(1, 0));
        assert_eq!("2.5".parse::<ApiVersion>().unwrap(), ApiVersion::new(2, 5));
        assert_eq!("v2.5".parse::<ApiVersion>().unwrap(), ApiVersion::new(2, 5));
    }

    #[test]
    fn test_parse_major_only_defaults_minor() {
        assert_eq!("3".parse::<ApiVersion>().unwrap(), ApiVersion::new(3, 0));
        assert_eq!("3".parse::<ApiVersion>().unwrap().to_string(), "3.0");
    }

    #[test]
    fn test_parse_status() {
        let version = "2.5-beta".parse::<ApiVersion>().unwrap();
        assert_eq!(version, ApiVersion::with_status(2, 5, "beta").unwrap());
        assert_eq!(version.status(), Some("beta"));
        // Status comparison is case-insensitive.
        assert_eq!(version, "2.5-BETA".parse::<ApiVersion>().unwrap());
    }

    #[test]
    fn test_parse_group() {
        assert_eq!(
            "2013-08-06".parse::<ApiVersion>().unwrap(),
            ApiVersion::from_group(group(2013, 8, 6))
        );
        // A missing day defaults to the first of the month.
        assert_eq!(
            "2013-08".parse::<ApiVersion>().unwrap(),
            ApiVersion::from_group(group(2013, 8, 1))
        );
    }

    #[test]
    fn test_parse_group_with_status() {
        let version = "2013-08-06-rc1".parse::<ApiVersion>().unwrap();
        assert_eq!(version.group(), Some(group(2013, 8, 6)));
        assert_eq!(version.status(), Some("rc1"));
        assert_eq!(version.to_string(), "2013-08-06-rc1");
    }

    #[test]
    fn test_parse_neutral() {
        assert!("neutral".parse::<ApiVersion>().unwrap().is_neutral());
        assert!("Neutral".parse::<ApiVersion>().unwrap().is_neutral());
        assert_eq!(ApiVersion::NEUTRAL.to_string(), "neutral");
    }

    #[test]
    fn test_parse_trims_whitespace() {
        assert_eq!("  1.0 ".parse::<ApiVersion>().unwrap(), ApiVersion::new(1, 0));
    }

    #[test]
    fn test_parse_rejects_empty() {
        assert_eq!("".parse::<ApiVersion>(), Err(ParseError::Empty));
        assert_eq!("   ".parse::<ApiVersion>(), Err(ParseError::Empty));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("abc".parse::<ApiVersion>().is_err());
        assert!("1.2.3".parse::<ApiVersion>().is_err());
        assert!("1..2".parse::<ApiVersion>().is_err());
        assert!("1.0-".parse::<ApiVersion>().is_err());
        assert!("1.0-beta!".parse::<ApiVersion>().is_err());
        assert!("-1.0".parse::<ApiVersion>().is_err());
    }

    #[test]
    fn test_parse_rejects_overflow() {
        let err = "18446744073709551616".parse::<ApiVersion>().unwrap_err();
        assert!(matches!(err, ParseError::InvalidNumber { .. }));
    }

    #[test]
    fn test_parse_rejects_bad_calendar() {
        assert!(matches!(
            "2013-13".parse::<ApiVersion>().unwrap_err(),
            ParseError::InvalidDate { .. }
        ));
        assert!(matches!(
            "2013-08-32".parse::<ApiVersion>().unwrap_err(),
            ParseError::InvalidDate { .. }
        ));
    }

    #[test]
    fn test_parse_rejects_mixed_forms() {
        assert_eq!(
            "2013-08-06.1.0".parse::<ApiVersion>(),
            Err(ParseError::MixedComponents("2013-08-06.1.0".to_string()))
        );
        assert!(matches!(
            "2013-08-06-1.0".parse::<ApiVersion>().unwrap_err(),
            ParseError::MixedComponents(_)
        ));
    }

    #[test]
    fn test_ordering() {
        let v1 = ApiVersion::new(1, 0);
        let v1_1 = ApiVersion::new(1, 1);
        let v2 = ApiVersion::new(2, 0);
        let v1_beta = ApiVersion::with_status(1, 0, "beta").unwrap();
        let dated = ApiVersion::from_group(group(2013, 8, 6));

        assert!(v1 < v1_1);
        assert!(v1_1 < v2);
        // A released version is later than its pre-release sibling.
        assert!(v1_beta < v1);
        // Undated sorts before dated.
        assert!(v2 < dated);
        // Neutral sorts after everything.
        assert!(dated < ApiVersion::NEUTRAL);
    }

    #[test]
    fn test_status_ordering_case_insensitive() {
        let alpha = ApiVersion::with_status(1, 0, "Alpha").unwrap();
        let beta = ApiVersion::with_status(1, 0, "beta").unwrap();
        assert!(alpha < beta);
    }

    #[test]
    fn test_serde_round_trip() {
        let version = ApiVersion::with_status(2, 1, "rc1").unwrap();
        let json = serde_json::to_string(&version).unwrap();
        assert_eq!(json, "\"2.1-rc1\"");
        assert_eq!(serde_json::from_str::<ApiVersion>(&json).unwrap(), version);
    }

    fn api_version_strategy() -> impl Strategy<Value = ApiVersion> {
        let status = proptest::option::of("[a-z][a-z0-9]{0,6}");
        let numeric = (0u64..10_000, 0u64..10_000, status.clone()).prop_map(
            |(major, minor, status)| match status {
                Some(status) => ApiVersion::with_status(major, minor, status).unwrap(),
                None => ApiVersion::new(major, minor),
            },
        );
        let dated = (1970u16..2100, 1u8..=12, 1u8..=31, status).prop_map(
            |(year, month, day, status)| {
                let group = GroupVersion::new(year, month, day).unwrap();
                match status {
                    Some(status) => ApiVersion::from_group_with_status(group, status).unwrap(),
                    None => ApiVersion::from_group(group),
                }
            },
        );
        prop_oneof![numeric, dated, Just(ApiVersion::NEUTRAL)]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_format_parse_round_trip(version in api_version_strategy()) {
            let text = version.to_string();
            let parsed: ApiVersion = text.parse().unwrap();
            prop_assert_eq!(parsed, version);
        }

        #[test]
        fn prop_ordering_is_total_and_consistent(
            a in api_version_strategy(),
            b in api_version_strategy(),
            c in api_version_strategy(),
        ) {
            // Exactly one of <, ==, > holds.
            let outcomes = [a < b, a == b, a > b];
            prop_assert_eq!(outcomes.iter().filter(|&&held| held).count(), 1);
            // Comparison agrees with equality.
            prop_assert_eq!(a.cmp(&b) == std::cmp::Ordering::Equal, a == b);
            // Transitivity.
            if a <= b && b <= c {
                prop_assert!(a <= c);
            }
        }
    }
}
