/// Increment the trailing three-digit serial of a USN, keeping it zero-padded.
///
/// Returns `None` when the USN does not end in three ASCII digits.
/// `"1AB23CS009"` becomes `"1AB23CS010"`; `"1AB23CS999"` becomes `"1AB23CS1000"`.
pub fn next_usn(usn: &str) -> Option<String> {
    let usn = usn.trim();
    if usn.len() < 3 || !usn.is_char_boundary(usn.len() - 3) {
        return None;
    }
    let (prefix, serial) = usn.split_at(usn.len() - 3);
    if !serial.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let number: u32 = serial.parse().ok()?;
    Some(format!("{prefix}{:03}", number + 1))
}

/// Whether a USN is a plain run of ASCII letters and digits, safe to use as
/// a file name.
pub fn is_plain_usn(usn: &str) -> bool {
    !usn.is_empty() && usn.bytes().all(|b| b.is_ascii_alphanumeric())
}
