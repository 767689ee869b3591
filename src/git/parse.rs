//! Parsers for plain-text git output

use crate::git::CommitLogEntry;

/// Length of an abbreviated commit hash
pub const SHORT_HASH_LEN: usize = 7;

/// Parse `git log --oneline` output.
///
/// Each non-empty line yields its first 7 characters as the hash and
/// everything from offset 8 as the message (the separating space is skipped).
pub fn parse_commit_log(raw: &str) -> Vec<CommitLogEntry> {
    raw.trim()
        .split('\n')
        .filter(|line| !line.is_empty())
        .map(|line| CommitLogEntry {
            hash: line.chars().take(SHORT_HASH_LEN).collect(),
            message: line.chars().skip(SHORT_HASH_LEN + 1).collect(),
        })
        .collect()
}

/// Parse `git diff --name-only` output into a sorted list without blanks.
pub fn parse_file_list(raw: &str) -> Vec<String> {
    let mut files: Vec<String> = raw
        .trim()
        .split('\n')
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect();
    files.sort();
    files
}

/// Truncate a full hash to its abbreviated form
pub fn short_hash(hash: &str) -> String {
    hash.trim().chars().take(SHORT_HASH_LEN).collect()
}
