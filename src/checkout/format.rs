//! As-you-type formatting for payment inputs.

/// Formats raw expiry input as `MM/YY`.
///
/// Non-digits are dropped. Once two digits are present a slash follows them
/// and at most two more digits are kept.
///
/// # Example
///
/// ```rust
/// use storefront_session::checkout::format_expiry_input;
///
/// assert_eq!(format_expiry_input("1234"), "12/34");
/// assert_eq!(format_expiry_input("99"), "99/");
/// assert_eq!(format_expiry_input("1"), "1");
/// ```
#[must_use]
pub fn format_expiry_input(input: &str) -> String {
    let digits: String = input.chars().filter(char::is_ascii_digit).collect();
    if digits.len() < 2 {
        return digits;
    }
    let year: String = digits[2..].chars().take(2).collect();
    format!("{}/{year}", &digits[..2])
}

/// Formats a card number in groups of four.
///
/// Non-digits are dropped and at most 16 digits are kept. Input with fewer
/// than four digits is returned as the bare digits.
///
/// # Example
///
/// ```rust
/// use storefront_session::checkout::format_card_number;
///
/// assert_eq!(format_card_number("4111111111111111"), "4111 1111 1111 1111");
/// assert_eq!(format_card_number("411111"), "4111 11");
/// ```
#[must_use]
pub fn format_card_number(input: &str) -> String {
    let digits: Vec<char> = input.chars().filter(char::is_ascii_digit).collect();
    if digits.len() < 4 {
        return digits.into_iter().collect();
    }
    digits
        .chunks(4)
        .take(4)
        .map(|group| group.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expiry_formatting() {
        assert_eq!(format_expiry_input("1234"), "12/34");
        assert_eq!(format_expiry_input("99"), "99/");
        assert_eq!(format_expiry_input("12/3"), "12/3");
        assert_eq!(format_expiry_input("123456"), "12/34");
        assert_eq!(format_expiry_input(""), "");
        assert_eq!(format_expiry_input("a1"), "1");
    }

    #[test]
    fn test_card_number_grouping() {
        assert_eq!(format_card_number("4111 1111 1111 1111"), "4111 1111 1111 1111");
        assert_eq!(format_card_number("41111111111111119999"), "4111 1111 1111 1111");
        assert_eq!(format_card_number("411"), "411");
        assert_eq!(format_card_number("4111-11"), "4111 11");
    }
}
