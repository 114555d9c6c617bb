/// Derive a URL slug from an artwork title: lowercase, drop everything
/// that is not ASCII alphanumeric, underscore or whitespace, then join
/// the remaining words with single hyphens.
pub fn slugify(title: &str) -> String {
    let cleaned: String = title
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || c.is_whitespace())
        .collect();

    cleaned.split_whitespace().collect::<Vec<_>>().join("-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn punctuation_is_stripped() {
        assert_eq!(slugify("Sunset, Over Lahore!"), "sunset-over-lahore");
    }

    #[test]
    fn whitespace_runs_collapse_to_single_hyphens() {
        assert_eq!(slugify("Whispering   Dunes\t at dawn"), "whispering-dunes-at-dawn");
    }

    #[test]
    fn non_ascii_letters_are_dropped() {
        assert_eq!(slugify("Café Nights"), "caf-nights");
    }

    #[test]
    fn underscores_survive() {
        assert_eq!(slugify("study_04 Blue"), "study_04-blue");
    }

    #[test]
    fn edge_whitespace_leaves_no_stray_hyphens() {
        assert_eq!(slugify("  Lone Tree  "), "lone-tree");
    }
}
