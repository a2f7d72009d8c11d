/// Line counts for a unified diff. Used for logging only; the diff text
/// itself is passed to the model untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiffStats {
    pub files: usize,
    pub additions: usize,
    pub deletions: usize,
}

impl DiffStats {
    pub fn from_unified(diff_text: &str) -> Self {
        let mut stats = DiffStats::default();
        let mut in_hunk = false;

        for line in diff_text.lines() {
            if line.starts_with("diff --git ") {
                stats.files += 1;
                in_hunk = false;
                continue;
            }
            if line.starts_with("@@") {
                in_hunk = true;
                continue;
            }
            if !in_hunk {
                continue;
            }
            if line.starts_with('+') {
                stats.additions += 1;
            } else if line.starts_with('-') {
                stats.deletions += 1;
            }
        }

        stats
    }
}
