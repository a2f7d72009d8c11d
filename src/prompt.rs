/// Section headers the model is asked to use, in order.
pub const SECTION_HEADERS: [&str; 4] = [
    "Summary",
    "Major Issues",
    "Minor Suggestions",
    "Questions for the Author",
];

/// Build the review instruction for one pull request.
///
/// Fields are inserted as-is, with no escaping. The diff is embedded whole;
/// callers that want a bound apply [`limit_diff`] first.
pub fn build_prompt(repo: &str, title: &str, body: &str, diff_text: &str) -> String {
    let mut prompt = String::with_capacity(diff_text.len() + body.len() + 1024);
    prompt.push_str("You are a senior software engineer performing a GitHub pull request review.\n\n");
    prompt.push_str(&format!("Repository: {repo}\n"));
    prompt.push_str(&format!("Pull Request Title: {title}\n\n"));
    prompt.push_str("Pull Request Description:\n");
    prompt.push_str(body);
    prompt.push_str("\n\nBelow is the full diff of the pull request.\n\n");
    prompt.push_str("Your task:\n");
    prompt.push_str("- Provide a concise summary\n");
    prompt.push_str("- Identify major issues (correctness, bugs, security)\n");
    prompt.push_str("- Identify minor suggestions (style, clarity, maintainability)\n");
    prompt.push_str("- Ask clarifying questions if intent is unclear\n\n");
    prompt.push_str("Use clear section headers:\n");
    for header in SECTION_HEADERS {
        prompt.push_str(header);
        prompt.push('\n');
    }
    prompt.push_str("\nDiff:\n");
    prompt.push_str(diff_text);
    prompt.push('\n');
    prompt
}

/// Cut `diff_text` down to at most `max_bytes` bytes, on a char boundary,
/// and append a marker saying how much was kept. `None` returns the diff unchanged.
pub fn limit_diff(diff_text: &str, max_bytes: Option<usize>) -> String {
    let Some(max_bytes) = max_bytes else {
        return diff_text.to_string();
    };
    if diff_text.len() <= max_bytes {
        return diff_text.to_string();
    }

    let mut cut = max_bytes;
    while !diff_text.is_char_boundary(cut) {
        cut -= 1;
    }
    let mut limited = String::with_capacity(cut + 64);
    limited.push_str(&diff_text[..cut]);
    if !limited.ends_with('\n') {
        limited.push('\n');
    }
    limited.push_str(&format!(
        "[diff truncated: showing {} of {} bytes]",
        cut,
        diff_text.len()
    ));
    limited
}
