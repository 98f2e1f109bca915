//! Cross-catalog matching engine.
//!
//! Every storefront adapter reduces its native search hits to [`Candidate`]
//! records and runs them through [`best_match`], so matching policy is the
//! same for all five sources despite their differing schemas. The engine is
//! pure and holds no state across calls; it is safe to invoke from any number
//! of concurrent tasks as long as each call gets its own candidate slice.

/// One storefront search hit, reduced to the fields matching cares about.
///
/// `price` is in USD; adapters drop hits with unknown prices before building
/// candidates, so the selector never sees a negative sentinel. `locator` is
/// an opaque slug/path/URL carried through for deep-link building and is not
/// consulted by the matching logic.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub name: String,
    pub price: f64,
    pub locator: String,
}

impl Candidate {
    pub fn new(name: impl Into<String>, price: f64, locator: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            price,
            locator: locator.into(),
        }
    }
}

/// Keywords marking a result as structurally invalid: add-on content, media,
/// or bundle packaging rather than a base game. Matched case-sensitively as
/// plain substrings against the unnormalized name. `" Demo"` keeps its
/// leading space so titles merely containing "Demo" inside a longer word are
/// not rejected.
const EXCLUDED_KEYWORDS: [&str; 9] = [
    "DLC",
    "Soundtrack",
    "OST",
    "Artbook",
    "Adventure Pack",
    "Content Pack",
    "Costume Pack",
    "Season Pass",
    " Demo",
];

/// Suffix markers stripped by [`normalize`]. Storefronts append these to
/// otherwise identical titles ("Foobar PC", "Foobar Deluxe Edition").
const NOISE_MARKERS: [&str; 2] = [" PC", " Deluxe"];

/// Whether a candidate can never be a valid match, regardless of the query.
///
/// A price of exactly zero is treated as a demo/free-tier placeholder, not a
/// genuine free game, and is always rejected.
pub fn should_ignore(candidate: &Candidate) -> bool {
    if candidate.price == 0.0 {
        return true;
    }
    EXCLUDED_KEYWORDS
        .iter()
        .any(|kw| candidate.name.contains(kw))
}

/// Strip cosmetic suffix markers and ASCII-lowercase a result name for
/// comparison. Cuts at the first occurrence of each marker; whatever follows
/// the marker is trimmed and re-appended.
///
/// Known limitation: punctuation (dashes, colons) and trademark glyphs
/// (™, ®) are left as-is, so equality after normalization fails on names
/// that differ only in those. Looser comparison is an extension point, not
/// implemented here.
pub fn normalize(raw: &str) -> String {
    let mut normalized = raw.to_string();
    for marker in NOISE_MARKERS {
        if let Some((before, after)) = normalized.split_once(marker) {
            normalized = format!("{before}{}", after.trim());
        }
    }
    normalized.to_ascii_lowercase()
}

/// Similarity between the query name and a result name, from 0.0 (no match)
/// to 1.0 (direct match). Deliberately binary: either the names are equal
/// after normalization or they are not. No edit distance, no token overlap.
pub fn score(query: &str, candidate_name: &str) -> f64 {
    if query.to_ascii_lowercase() == normalize(candidate_name) {
        1.0
    } else {
        0.0
    }
}

/// Select the best-matching candidate for `query`, or `None` when no
/// candidate qualifies.
///
/// Single pass in the storefront's own relevance order. Excluded candidates
/// are skipped outright; a remaining candidate only takes the lead on a
/// strictly greater score, so the first exact match wins ties and a
/// zero-score candidate is never selected. "No match" is a normal outcome,
/// not an error.
pub fn best_match(query: &str, candidates: &[Candidate]) -> Option<usize> {
    if candidates.is_empty() {
        return None;
    }

    let mut best_score = 0.0;
    let mut best_index = None;
    for (i, candidate) in candidates.iter().enumerate() {
        if should_ignore(candidate) {
            continue;
        }
        let s = score(query, &candidate.name);
        if s > best_score {
            best_score = s;
            best_index = Some(i);
        }
    }
    best_index
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidates(names: &[&str]) -> Vec<Candidate> {
        names
            .iter()
            .map(|n| Candidate::new(*n, 9.99, "slug"))
            .collect()
    }

    #[test]
    fn empty_list_has_no_match() {
        assert_eq!(best_match("Foobar", &[]), None);
    }

    #[test]
    fn excluded_keywords_never_match() {
        for name in [
            "Foobar DLC",
            "Foobar Soundtrack",
            "Foobar OST",
            "Foobar Artbook",
            "Foobar Adventure Pack",
            "Foobar Content Pack",
            "Foobar Costume Pack",
            "Foobar Season Pass",
            "Foobar Demo",
        ] {
            assert_eq!(best_match("Foobar", &candidates(&[name])), None, "{name}");
        }
    }

    #[test]
    fn demo_needs_leading_space() {
        // "Demolition" style names must not trip the " Demo" keyword.
        let c = Candidate::new("Demolition Crew", 9.99, "s");
        assert!(!should_ignore(&c));
        assert_eq!(best_match("Demolition Crew", &[c]), Some(0));
    }

    #[test]
    fn zero_price_is_excluded_even_on_exact_name() {
        let c = Candidate::new("Foobar", 0.0, "s");
        assert!(should_ignore(&c));
        assert_eq!(best_match("Foobar", &[c]), None);
    }

    #[test]
    fn normalize_strips_pc_and_deluxe_suffixes() {
        assert_eq!(normalize("Foobar PC"), "foobar");
        assert_eq!(normalize("Foobar Deluxe"), "foobar");
        assert_eq!(normalize("Foobar"), "foobar");
    }

    #[test]
    fn exact_match_is_case_insensitive() {
        assert_eq!(score("FOOBAR", "foobar"), 1.0);
        assert_eq!(score("Foobar", "Foobar PC"), 1.0);
        assert_eq!(score("Foobar", "Foobar 2"), 0.0);
    }

    #[test]
    fn pc_suffix_matches_over_sequel() {
        let found = best_match("Foobar", &candidates(&["Foobar 2", "Foobar PC"]));
        assert_eq!(found, Some(1));
    }

    #[test]
    fn lone_deluxe_edition_matches() {
        let found = best_match("Foobar", &candidates(&["Foobar Deluxe"]));
        assert_eq!(found, Some(0));
    }

    #[test]
    fn base_game_beats_deluxe_on_first_seen_tie_break() {
        let found = best_match("Foobar", &candidates(&["Foobar", "Foobar Deluxe"]));
        assert_eq!(found, Some(0));
    }

    #[test]
    fn base_game_beats_earlier_inexact_hit() {
        let found = best_match("Foobar", &candidates(&["Foobar - extra content", "Foobar"]));
        assert_eq!(found, Some(1));
    }

    #[test]
    fn zero_score_survivor_is_not_selected() {
        // Not excluded, but never exceeds the 0.0 floor.
        assert_eq!(best_match("Foobar", &candidates(&["Quux"])), None);
    }

    #[test]
    fn punctuation_differences_do_not_match() {
        // Documented limitation: no punctuation or ™/® folding.
        assert_eq!(
            best_match("Foobar: Redux", &candidates(&["Foobar - Redux"])),
            None
        );
        assert_eq!(best_match("Foobar", &candidates(&["Foobar™"])), None);
    }

    #[test]
    fn deterministic_across_calls() {
        let cs = candidates(&["Foobar 2", "Foobar PC", "Foobar Deluxe"]);
        let first = best_match("Foobar", &cs);
        assert_eq!(first, best_match("Foobar", &cs));
        assert_eq!(first, Some(1));
    }
}
