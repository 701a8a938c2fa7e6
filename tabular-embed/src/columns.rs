//! # Columns module
//!
//! Names of the generated embedding columns.

/// Generate `count` column names, `prefix` followed by the 1-based index.
///
/// ```
/// use tabular_embed::generate_names;
///
/// assert_eq!(generate_names("E_", 3), ["E_1", "E_2", "E_3"]);
/// ```
#[must_use]
pub fn generate_names(prefix: &str, count: usize) -> Vec<String> {
    (1..=count).map(|i| format!("{prefix}{i}")).collect()
}
