//! Title normalization used to correlate media server and catalog manager items.
//!
//! Both sides name the same film differently ("Amélie (2001)" vs "Amelie",
//! "Tom &amp; Jerry" vs "Tom and Jerry"). The normalized key strips all of that
//! away; the year is compared separately.

use any_ascii::any_ascii;
use once_cell::sync::Lazy;
use regex::Regex;

/// A parenthesized year between 1900 and 2099: "(2010)"
static YEAR_IN_PARENS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\((19|20)\d{2}\)").unwrap());

/// Characters that are illegal in file names plus ASCII control characters
static ILLEGAL_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r#"[<>:"/\\|?*\x00-\x1f]+"#).unwrap());

static NON_ALPHANUMERIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-zA-Z0-9\s]+").unwrap());

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Reduce a display title to its comparison key.
///
/// The result contains only lowercase ASCII letters and digits. The function
/// is total and idempotent: `normalize_title(&normalize_title(x)) == normalize_title(x)`.
pub fn normalize_title(title: &str) -> String {
    let without_year = YEAR_IN_PARENS.replace_all(title, "");
    let legal = ILLEGAL_CHARS.replace_all(&without_year, "");
    let decoded = html_escape::decode_html_entities(&legal);
    let ascii = any_ascii(&decoded);
    let trimmed = ascii.trim_end();
    let spelled = trimmed.replace('&', "and");
    let alphanumeric = NON_ALPHANUMERIC.replace_all(&spelled, "");
    let lower = alphanumeric.to_lowercase();
    WHITESPACE.replace_all(&lower, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_year_in_parentheses() {
        assert_eq!(normalize_title("Inception (2010)"), "inception");
        assert_eq!(normalize_title("Inception (2010)"), normalize_title("Inception"));
        // Only 1900-2099 counts as a year
        assert_eq!(normalize_title("Blade Runner (2049)"), "bladerunner");
        assert_eq!(normalize_title("Space (1812)"), "space1812");
    }

    #[test]
    fn test_ampersand_equals_and() {
        assert_eq!(normalize_title("Tom & Jerry"), normalize_title("Tom and Jerry"));
        assert_eq!(normalize_title("Tom &amp; Jerry"), "tomandjerry");
    }

    #[test]
    fn test_transliterates_to_ascii() {
        assert_eq!(normalize_title("Amélie"), "amelie");
        assert_eq!(normalize_title("Pokémon: Detective Pikachu"), "pokemondetectivepikachu");
    }

    #[test]
    fn test_removes_punctuation_and_whitespace() {
        assert_eq!(normalize_title("Mission: Impossible - Fallout"), "missionimpossiblefallout");
        assert_eq!(normalize_title("  The   Office  "), "theoffice");
        assert_eq!(normalize_title("Who's Afraid?\t"), "whosafraid");
        assert_eq!(normalize_title("Se7en"), "se7en");
    }

    #[test]
    fn test_degenerate_titles() {
        assert_eq!(normalize_title(""), "");
        assert_eq!(normalize_title("(2020)"), "");
        assert_eq!(normalize_title("?!"), "");
    }

    #[test]
    fn test_idempotent() {
        for title in [
            "Inception (2010)",
            "Tom &amp; Jerry",
            "Amélie",
            "WALL·E",
            "Mission: Impossible - Fallout",
            "",
        ] {
            let once = normalize_title(title);
            assert_eq!(normalize_title(&once), once, "not idempotent for {:?}", title);
        }
    }
}
