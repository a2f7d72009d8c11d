use colored::Colorize;

/// Heading placed in front of every posted review.
pub const COMMENT_PREFIX: &str = "## 🤖 AI PR Review (Claude)\n\n";

/// Wrap review text into the PR comment body. The review is not altered.
pub fn render(review_text: &str) -> String {
    format!("{COMMENT_PREFIX}{review_text}")
}

pub fn reviewing_line(pr_number: u64) -> String {
    format!("Reviewing PR #{pr_number}")
}

pub fn posted_line() -> String {
    "Claude PR review posted successfully.".green().bold().to_string()
}
