use crate::overlap::types::Category;

/// Maps the flags of slot A and slot B to an overlap [`Category`].
pub fn classify(flagged_a: bool, flagged_b: bool) -> Category {
    match (flagged_a, flagged_b) {
        (true, true) => Category::BothFlagged,
        (true, false) => Category::OnlyAFlagged,
        (false, true) => Category::OnlyBFlagged,
        (false, false) => Category::NeitherFlagged,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_all_combinations() {
        assert_eq!(classify(true, true), Category::BothFlagged);
        assert_eq!(classify(true, false), Category::OnlyAFlagged);
        assert_eq!(classify(false, true), Category::OnlyBFlagged);
        assert_eq!(classify(false, false), Category::NeitherFlagged);
    }
}
