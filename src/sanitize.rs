/// Characters stripped from user-provided text before it reaches logs or the
/// completion API request body.
const FORBIDDEN_CHARS: [char; 8] = ['<', '>', '"', '\'', '&', '\0', '\r', '\n'];

/// Maximum length of sanitized text in characters.
const MAX_SANITIZED_LENGTH: usize = 50_000;

/// Remove forbidden characters and truncate to a reasonable length.
///
/// This is a total function: empty input yields an empty string and no input
/// can make it fail. It is not a security boundary against the model itself,
/// only against injection into logs and downstream formatting.
pub fn sanitize(text: &str) -> String {
    text.chars()
        .filter(|c| !FORBIDDEN_CHARS.contains(c))
        .take(MAX_SANITIZED_LENGTH)
        .collect()
}
