use unicode_normalization::UnicodeNormalization;

/// Folds text for comparison: NFKC followed by lowercase.
pub fn fold(input: &str) -> String {
	input.nfkc().collect::<String>().to_lowercase()
}

/// Returns the trimmed value when it carries a signal.
pub fn signal(value: Option<&str>) -> Option<&str> {
	value.map(str::trim).filter(|value| !value.is_empty())
}

/// Whitespace tokens with at least `min_chars` characters, in input order.
pub fn name_tokens(name: &str, min_chars: usize) -> Vec<&str> {
	name.split_whitespace().filter(|token| token.chars().count() >= min_chars).collect()
}
