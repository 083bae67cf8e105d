//! ID prefix constants.
//!
//! Every entity ID is `{prefix}-{8 hex chars}`, generated in SQL by
//! `ComplyDb::generate_id`.

pub const PREFIX_ORGANIZATION: &str = "org";
pub const PREFIX_USER: &str = "usr";
pub const PREFIX_FRAMEWORK: &str = "fwk";
pub const PREFIX_PROGRESS: &str = "prg";
pub const PREFIX_TASK: &str = "tsk";
pub const PREFIX_DOCUMENT: &str = "doc";
pub const PREFIX_VERSION: &str = "ver";
pub const PREFIX_COMMENT: &str = "cmt";
pub const PREFIX_AUDIT: &str = "aud";

pub const ALL_PREFIXES: &[&str] = &[
    PREFIX_ORGANIZATION,
    PREFIX_USER,
    PREFIX_FRAMEWORK,
    PREFIX_PROGRESS,
    PREFIX_TASK,
    PREFIX_DOCUMENT,
    PREFIX_VERSION,
    PREFIX_COMMENT,
    PREFIX_AUDIT,
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn prefixes_are_unique_and_three_chars() {
        let unique: HashSet<_> = ALL_PREFIXES.iter().collect();
        assert_eq!(unique.len(), ALL_PREFIXES.len());
        assert!(ALL_PREFIXES.iter().all(|p| p.len() == 3));
    }
}
