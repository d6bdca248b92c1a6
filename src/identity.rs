//! Student ID allocation.
//!
//! An ID is a fixed category prefix followed by a counter zero-padded to
//! three digits, e.g. `1020101001` for the first junior. Counters are scoped
//! per category and only ever move forward.

use crate::models::Category;

pub const JUNIOR_PREFIX: &str = "1020101";
pub const SENIOR_PREFIX: &str = "1020201";
const COUNTER_WIDTH: usize = 3;

pub fn prefix(category: Category) -> &'static str {
    match category {
        Category::Junior => JUNIOR_PREFIX,
        Category::Senior => SENIOR_PREFIX,
    }
}

/// Numeric tail of a stored ID, or `None` when the prefix is wrong or the
/// tail is not all digits.
pub fn parse_suffix(category: Category, id: &str) -> Option<u64> {
    let tail = id.strip_prefix(prefix(category))?;

    // u64::from_str accepts a leading '+', stored IDs never have one
    if tail.is_empty() || !tail.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    tail.parse().ok()
}

/// Result of scanning the IDs stored in one category.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SuffixScan {
    /// Highest well-formed suffix, 0 when there is none.
    pub highest: u64,
    pub malformed: Vec<String>,
}

/// Malformed IDs are set aside and never mask the well-formed ones.
pub fn scan_suffixes<'a, I>(category: Category, ids: I) -> SuffixScan
where
    I: IntoIterator<Item = &'a str>,
{
    let mut scan = SuffixScan::default();
    for id in ids {
        match parse_suffix(category, id) {
            Some(value) => scan.highest = scan.highest.max(value),
            None => scan.malformed.push(id.to_string()),
        }
    }
    scan
}

/// Next counter value given the persisted counter (if any) and the highest
/// well-formed suffix actually stored.
pub fn next_counter(persisted: Option<u64>, scanned: u64) -> u64 {
    persisted.unwrap_or(0).max(scanned) + 1
}

pub fn format_student_id(category: Category, counter: u64) -> String {
    format!("{}{:0width$}", prefix(category), counter, width = COUNTER_WIDTH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_ids_per_category() {
        let scan = scan_suffixes(Category::Junior, std::iter::empty());
        let next = next_counter(None, scan.highest);
        assert_eq!(next, 1);
        assert_eq!(format_student_id(Category::Junior, next), "1020101001");
        assert_eq!(format_student_id(Category::Senior, next), "1020201001");
    }

    #[test]
    fn increments_from_highest_stored_id() {
        let scan = scan_suffixes(Category::Junior, ["1020101007", "1020101041", "1020101009"]);
        assert_eq!(scan.highest, 41);
        assert!(scan.malformed.is_empty());
        assert_eq!(
            format_student_id(Category::Junior, next_counter(None, scan.highest)),
            "1020101042"
        );
    }

    #[test]
    fn malformed_suffixes_are_rejected() {
        for bad in ["1020101abc", "1020101", "1020101+12", "9999999001"] {
            assert_eq!(parse_suffix(Category::Junior, bad), None, "{bad}");
        }
    }

    #[test]
    fn malformed_ids_do_not_mask_valid_ones() {
        let scan = scan_suffixes(
            Category::Junior,
            ["1020101001", "1020101zzzz", "1020101003", "1020101abc"],
        );
        assert_eq!(scan.highest, 3);
        assert_eq!(scan.malformed, vec!["1020101zzzz", "1020101abc"]);
    }

    #[test]
    fn only_malformed_ids_count_from_one() {
        let scan = scan_suffixes(Category::Senior, ["1020201x9z"]);
        assert_eq!(next_counter(None, scan.highest), 1);
    }

    #[test]
    fn persisted_counter_wins_over_a_lower_scan() {
        // the student holding 005 was deleted, the counter remembers it
        assert_eq!(next_counter(Some(5), 3), 6);
    }

    #[test]
    fn scan_wins_over_a_stale_counter() {
        assert_eq!(next_counter(Some(2), 10), 11);
    }

    #[test]
    fn counter_grows_past_three_digits() {
        assert_eq!(format_student_id(Category::Junior, 999), "1020101999");
        assert_eq!(format_student_id(Category::Junior, 1000), "10201011000");
        assert_eq!(parse_suffix(Category::Junior, "10201011000"), Some(1000));
    }
}
