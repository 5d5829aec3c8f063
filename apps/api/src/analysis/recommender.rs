/// Builds one suggestion per missing keyword, or a single congratulation when none are missing.
pub fn generate_recommendations(missing_keywords: &[String]) -> Vec<String> {
    if missing_keywords.is_empty() {
        return vec!["Your resume covers most of the required terms — great alignment!".to_string()];
    }

    missing_keywords
        .iter()
        .map(|kw| {
            format!(
                "Consider adding experience with **{kw}** — it appears in the job posting but not in your resume."
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_recommendation_per_missing_keyword() {
        let recs = generate_recommendations(&["kafka".to_string(), "terraform".to_string()]);
        assert_eq!(recs.len(), 2);
        assert!(recs[0].contains("**kafka**"));
        assert!(recs[1].contains("**terraform**"));
        assert_eq!(
            recs[0],
            "Consider adding experience with **kafka** — it appears in the job posting but not in your resume."
        );
    }

    #[test]
    fn test_no_missing_keywords_gives_positive_note() {
        let recs = generate_recommendations(&[]);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0], "Your resume covers most of the required terms — great alignment!");
    }
}
