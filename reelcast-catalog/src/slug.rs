//! Slug derivation for listing URLs and lookup keys.

/// Derives the URL slug of a title.
///
/// Drops everything except ASCII letters, digits and spaces, turns each
/// space into a dash and lowercases the result. Pure and deterministic, so
/// listing URLs built from it always find their record again.
///
/// # Examples
/// ```
/// use reelcast_catalog::slug::title_to_slug;
///
/// assert_eq!(title_to_slug("Re:Zero kara Hajimeru"), "rezero-kara-hajimeru");
/// ```
pub fn title_to_slug(title: &str) -> String {
    title
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == ' ')
        .map(|c| if c == ' ' { '-' } else { c.to_ascii_lowercase() })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_slug_examples() {
        assert_eq!(title_to_slug("Shingeki no Kyojin"), "shingeki-no-kyojin");
        assert_eq!(title_to_slug("Kaguya-sama: Love is War"), "kaguyasama-love-is-war");
        assert_eq!(title_to_slug("Jūjutsu Kaisen"), "jjutsu-kaisen");
        assert_eq!(title_to_slug("86"), "86");
    }

    #[test]
    fn test_fixture_titles_do_not_collide() {
        let titles = [
            "Shingeki no Kyojin",
            "Shingeki no Kyojin: The Final Season",
            "Kimetsu no Yaiba",
            "Boku no Hero Academia",
            "Spy x Family",
            "Oshi no Ko",
            "Sousou no Frieren",
            "Re:Zero kara Hajimeru Isekai Seikatsu",
        ];

        let slugs: HashSet<String> = titles.iter().map(|t| title_to_slug(t)).collect();
        assert_eq!(slugs.len(), titles.len());
    }

    proptest! {
        #[test]
        fn test_slug_is_url_safe_and_stable(title in "\\PC{0,60}") {
            let slug = title_to_slug(&title);
            prop_assert!(slug.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
            prop_assert_eq!(title_to_slug(&title), slug);
        }
    }
}
