use unicode_normalization::UnicodeNormalization;

/// Normalize a subject name for matching against a subject map.
///
/// NFC-composes, collapses runs of whitespace (including the non-breaking
/// spaces the portal pads cells with) into single spaces, and upper-cases.
pub fn normalize_subject_name(input: &str) -> String {
    let nfc: String = input.nfc().collect();
    nfc.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}

/// Trim the `:` separators and whitespace that surround label values.
pub fn trim_label_value(input: &str) -> String {
    input
        .trim_matches(|c: char| c == ':' || c.is_whitespace())
        .to_string()
}

/// Collapse whitespace in a cell value without changing case.
pub fn clean_cell(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}
