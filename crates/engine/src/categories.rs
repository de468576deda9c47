//! Expense categories.
//!
//! Categories are plain strings kept sorted and case-insensitively unique.
//! [`OTHER`] is reserved: it is always present and cannot be renamed or
//! deleted.

use crate::util::name_key;

/// The reserved fallback category.
pub const OTHER: &str = "Other";

pub const DEFAULT_CATEGORIES: [&str; 13] = [
    "Bank Charges",
    "Education",
    "Entertainment",
    "Food & Dining",
    "Gifts & Donations",
    "Groceries",
    "Healthcare",
    OTHER,
    "Personal Care",
    "Shopping",
    "Subscriptions & Memberships",
    "Transportation",
    "Travel",
];

pub fn default_categories() -> Vec<String> {
    let mut categories: Vec<String> = DEFAULT_CATEGORIES.iter().map(ToString::to_string).collect();
    sort_categories(&mut categories);
    categories
}

/// Sorts alphabetically ignoring case; ties fall back to the raw string so the
/// order is total.
pub fn sort_categories(categories: &mut [String]) {
    categories.sort_by(|a, b| name_key(a).cmp(&name_key(b)).then_with(|| a.cmp(b)));
}

/// Finds the stored spelling of `name`, compared case-insensitively.
pub fn find_category<'a>(categories: &'a [String], name: &str) -> Option<&'a str> {
    let key = name_key(name);
    categories
        .iter()
        .find(|category| name_key(category) == key)
        .map(String::as_str)
}

pub fn is_other(name: &str) -> bool {
    name_key(name) == name_key(OTHER)
}
