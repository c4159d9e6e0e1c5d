//! Discipline registry.
//!
//! A discipline is a licensable feature set of the application, identified by
//! a two-letter code and a canonical display name. The registry is a static
//! table; lookups never allocate registry state.
//!
//! # Matching
//!
//! User input is resolved by [`normalize`], which tries an explicit ordered
//! list of strategies and stops at the first hit:
//!
//! 1. [`MatchStrategy::ExactName`]: the whole input equals a long name or alias.
//! 2. [`MatchStrategy::NormalizedCode`]: the input, with `&` spelled `and` and
//!    spaces removed, equals a code.
//! 3. [`MatchStrategy::NamePrefix`]: the input is a prefix of a long name or alias.
//!
//! All comparisons are case-insensitive on the trimmed input.
//!
//! ```rust
//! use sitekey::disciplines::normalize;
//!
//! let info = normalize("GIS & Mapping").unwrap();
//! assert_eq!(info.code, "GM");
//! assert_eq!(info.long_name, "Gis & Mapping");
//! ```

use serde::Serialize;

use crate::errors::{LicenseError, LicenseResult};

/// A registered discipline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Discipline {
    /// Two uppercase ASCII letters, unique within the registry.
    pub code: &'static str,
    /// Canonical display name. This exact string is part of every signed key.
    pub long_name: &'static str,
    /// Lowercase alternative spellings accepted on input, never emitted.
    pub aliases: &'static [&'static str],
}

impl Discipline {
    pub fn info(&self) -> DisciplineInfo {
        DisciplineInfo {
            code: self.code,
            long_name: self.long_name,
        }
    }

    /// Lowercased long name followed by the aliases.
    fn spellings(&self) -> impl Iterator<Item = String> + '_ {
        std::iter::once(self.long_name.to_lowercase())
            .chain(self.aliases.iter().map(|a| a.to_string()))
    }
}

/// The `(code, long_name)` pair resolved from input or from a verified key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct DisciplineInfo {
    pub code: &'static str,
    pub long_name: &'static str,
}

static DISCIPLINES: &[Discipline] = &[
    Discipline {
        code: "ES",
        long_name: "Engineering Surveying",
        aliases: &[],
    },
    Discipline {
        code: "CS",
        long_name: "Cadastral Surveying",
        aliases: &[],
    },
    Discipline {
        code: "RS",
        long_name: "Remote Sensing",
        aliases: &[],
    },
    Discipline {
        code: "GM",
        long_name: "Gis & Mapping",
        aliases: &["gis and mapping"],
    },
];

/// All registered disciplines, in registry order.
pub fn all() -> &'static [Discipline] {
    DISCIPLINES
}

/// The strategy that resolved a selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStrategy {
    ExactName,
    NormalizedCode,
    NamePrefix,
}

impl MatchStrategy {
    /// Strategies in the order [`normalize`] tries them.
    pub const ORDER: [MatchStrategy; 3] = [
        MatchStrategy::ExactName,
        MatchStrategy::NormalizedCode,
        MatchStrategy::NamePrefix,
    ];

    fn find(self, needle: &str) -> Option<&'static Discipline> {
        match self {
            MatchStrategy::ExactName => DISCIPLINES
                .iter()
                .find(|d| d.spellings().any(|s| s == needle)),
            MatchStrategy::NormalizedCode => {
                let squashed = needle.replace('&', "and").replace(' ', "");
                DISCIPLINES
                    .iter()
                    .find(|d| d.code.eq_ignore_ascii_case(&squashed))
            }
            MatchStrategy::NamePrefix => DISCIPLINES
                .iter()
                .find(|d| d.spellings().any(|s| s.starts_with(needle))),
        }
    }
}

/// Resolve a discipline selector, reporting which strategy matched.
pub fn normalize_with_strategy(input: &str) -> LicenseResult<(DisciplineInfo, MatchStrategy)> {
    let needle = input.trim().to_lowercase();
    if needle.is_empty() {
        return Err(LicenseError::UnknownDiscipline(input.to_string()));
    }

    MatchStrategy::ORDER
        .iter()
        .find_map(|strategy| strategy.find(&needle).map(|d| (d.info(), *strategy)))
        .ok_or_else(|| LicenseError::UnknownDiscipline(input.trim().to_string()))
}

/// Resolve a discipline selector (name, alias, code or name prefix).
///
/// # Errors
///
/// Returns [`LicenseError::UnknownDiscipline`] when no strategy matches.
pub fn normalize(input: &str) -> LicenseResult<DisciplineInfo> {
    normalize_with_strategy(input).map(|(info, _)| info)
}

/// Look up a discipline by its exact two-letter code (case-insensitive).
pub fn lookup_code(code: &str) -> Option<DisciplineInfo> {
    DISCIPLINES
        .iter()
        .find(|d| d.code.eq_ignore_ascii_case(code))
        .map(Discipline::info)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_and_name_resolve_to_same_pair() {
        for d in all() {
            let by_code = normalize(d.code).unwrap();
            let by_name = normalize(d.long_name).unwrap();
            assert_eq!(by_code, by_name);
            assert_eq!(by_code, d.info());
        }
    }

    #[test]
    fn codes_are_unique_two_letter_uppercase() {
        let mut seen = std::collections::HashSet::new();
        for d in all() {
            assert_eq!(d.code.len(), 2);
            assert!(d.code.chars().all(|c| c.is_ascii_uppercase()));
            assert!(seen.insert(d.code), "duplicate code {}", d.code);
        }
    }

    #[test]
    fn long_names_never_contain_the_message_delimiter() {
        for d in all() {
            assert!(!d.long_name.contains('|'));
        }
    }

    #[test]
    fn documented_examples() {
        let gm = normalize("GIS & Mapping").unwrap();
        assert_eq!((gm.code, gm.long_name), ("GM", "Gis & Mapping"));

        let es = normalize("es").unwrap();
        assert_eq!((es.code, es.long_name), ("ES", "Engineering Surveying"));
    }

    #[test]
    fn alias_resolves_to_canonical_name() {
        let (info, strategy) = normalize_with_strategy("  Gis and Mapping ").unwrap();
        assert_eq!(info.long_name, "Gis & Mapping");
        assert_eq!(strategy, MatchStrategy::ExactName);
    }

    #[test]
    fn code_with_spaces_is_squashed() {
        let (info, strategy) = normalize_with_strategy("r s").unwrap();
        assert_eq!(info.code, "RS");
        assert_eq!(strategy, MatchStrategy::NormalizedCode);
    }

    #[test]
    fn prefix_match_is_last_resort() {
        let (info, strategy) = normalize_with_strategy("cadas").unwrap();
        assert_eq!(info.code, "CS");
        assert_eq!(strategy, MatchStrategy::NamePrefix);

        let (info, _) = normalize_with_strategy("gis").unwrap();
        assert_eq!(info.code, "GM");
    }

    #[test]
    fn exact_name_wins_over_prefix() {
        let (_, strategy) = normalize_with_strategy("remote sensing").unwrap();
        assert_eq!(strategy, MatchStrategy::ExactName);
    }

    #[test]
    fn unknown_and_empty_inputs_fail() {
        assert_eq!(
            normalize("hydrography"),
            Err(LicenseError::UnknownDiscipline("hydrography".to_string()))
        );
        assert!(normalize("").is_err());
        assert!(normalize("   ").is_err());
    }

    #[test]
    fn lookup_code_is_exact() {
        assert_eq!(lookup_code("gm").map(|i| i.code), Some("GM"));
        assert!(lookup_code("G").is_none());
        assert!(lookup_code("GIS").is_none());
    }
}
