use crate::sanitize::sanitize;

/// Languages the prompt template knows how to ask documentation for.
pub const SUPPORTED_LANGUAGES: [&str; 14] = [
    "python",
    "javascript",
    "java",
    "cpp",
    "csharp",
    "go",
    "rust",
    "typescript",
    "php",
    "ruby",
    "swift",
    "kotlin",
    "scala",
    "r",
];

/// Fallback used when the requested language is not in the allow-list.
/// Unknown languages never fail a request, they degrade to this default.
const DEFAULT_LANGUAGE: &str = "python";

fn normalize_language(language: &str) -> String {
    if SUPPORTED_LANGUAGES.contains(&language.to_lowercase().as_str()) {
        language.to_string()
    } else {
        DEFAULT_LANGUAGE.to_string()
    }
}

/// Compose the documentation-generation instruction sent to the completion
/// API. Both inputs are sanitized first; the language is matched
/// case-insensitively against [`SUPPORTED_LANGUAGES`].
pub fn build_prompt(language: &str, code: &str) -> String {
    let language = normalize_language(&sanitize(language));
    let code = sanitize(code);

    format!(
        r#"Act as an expert senior software engineer specializing in {language}.

Write a comprehensive, well-formatted documentation block for the following code snippet, adhering to standard conventions for {language}.

For the documentation, please include:
1. A clear description of what the code does
2. Parameter descriptions (if applicable)
3. Return value description (if applicable)
4. Usage examples (if helpful)
5. Any important notes or warnings

Use appropriate documentation format for {language} (e.g., JSDoc for JavaScript, Google-style for Python, JavaDoc for Java, etc.).

Here is the code to document:

{code}

Please provide only the documentation block, formatted properly for the language."#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("rust")]
    #[case("typescript")]
    #[case("r")]
    fn test_supported_language_preserved(#[case] language: &str) {
        let prompt = build_prompt(language, "fn main() {}");
        assert!(prompt.contains(&format!("specializing in {}", language)));
    }

    #[test]
    fn test_language_match_is_case_insensitive() {
        let prompt = build_prompt("Rust", "fn main() {}");
        assert!(prompt.contains("specializing in Rust"));
    }

    #[rstest]
    #[case("cobol")]
    #[case("brainfuck")]
    #[case("")]
    fn test_unknown_language_falls_back_to_python(#[case] language: &str) {
        let prompt = build_prompt(language, "print(1)");
        assert!(prompt.contains("specializing in python"));
    }

    #[test]
    fn test_code_is_interpolated() {
        let prompt = build_prompt("go", "func add(a, b int) int { return a + b }");
        assert!(prompt.contains("func add(a, b int) int { return a + b }"));
    }

    #[test]
    fn test_inputs_are_sanitized() {
        let prompt = build_prompt("python", "<b>danger</b>\r\n");
        assert!(!prompt.contains('<'));
        assert!(!prompt.contains('\r'));
        assert!(prompt.contains("bdanger/b"));
    }
}
