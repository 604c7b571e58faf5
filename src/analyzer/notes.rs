use std::fmt::Write;

use chrono::NaiveDate;

use crate::domain::{RuleSet, SemanticChange};

/// Everything the release notes are rendered from
#[derive(Debug, Clone)]
pub struct NotesInput<'a> {
    pub version: &'a str,
    pub repo_url: &'a str,
    pub prior_tag: Option<&'a str>,
    pub next_tag: &'a str,
    pub release_date: Option<NaiveDate>,
    pub changes: &'a [SemanticChange],
}

/// Render markdown release notes.
///
/// Changes are grouped by rule group in rule-definition order; groups with
/// no changes are left out. The output depends only on the input, so
/// identical input always renders byte-identical notes.
pub fn generate_release_notes(input: &NotesInput<'_>, rules: &RuleSet) -> String {
    let link = match input.prior_tag {
        Some(prior) => format!("{}/compare/{}...{}", input.repo_url, prior, input.next_tag),
        None => format!("{}/releases/tag/{}", input.repo_url, input.next_tag),
    };

    let mut notes = String::new();
    let _ = write!(notes, "## [{}]({})", input.version, link);
    if let Some(date) = input.release_date {
        let _ = write!(notes, " ({})", date.format("%Y-%m-%d"));
    }
    notes.push('\n');

    for group in rules.groups() {
        let mut entries = input.changes.iter().filter(|c| c.group == group).peekable();
        if entries.peek().is_none() {
            continue;
        }

        let _ = write!(notes, "\n### {}\n", group);
        for change in entries {
            let _ = writeln!(
                notes,
                "* {} ([{}]({}/commit/{}))",
                change.matched_text, change.short_hash, input.repo_url, change.full_hash
            );
        }
    }

    notes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{default_rules, CommitRecord};

    const URL: &str = "https://github.com/acme/tools";

    fn rules() -> RuleSet {
        RuleSet::compile(default_rules()).unwrap()
    }

    fn changes(commits: &[(&str, &str, &str)]) -> Vec<SemanticChange> {
        let records: Vec<CommitRecord> = commits
            .iter()
            .map(|(subject, body, hash)| CommitRecord::new(*subject, *body, &hash[..7], *hash))
            .collect();
        rules().classify(&records)
    }

    #[test]
    fn test_first_release_notes() {
        let changes = changes(&[("feat: add X", "", "abc1234def567")]);
        let input = NotesInput {
            version: "1.0.0",
            repo_url: URL,
            prior_tag: None,
            next_tag: "foo-v1.0.0",
            release_date: NaiveDate::from_ymd_opt(2026, 10, 14),
            changes: &changes,
        };

        let notes = generate_release_notes(&input, &rules());
        assert_eq!(
            notes,
            "## [1.0.0](https://github.com/acme/tools/releases/tag/foo-v1.0.0) (2026-10-14)\n\
             \n\
             ### Features\n\
             * feat: add X ([abc1234](https://github.com/acme/tools/commit/abc1234def567))\n"
        );
    }

    #[test]
    fn test_groups_follow_rule_order_not_commit_order() {
        let changes = changes(&[
            ("chore: drop api", "BREAKING CHANGE: api removed", "3333333aaaa"),
            ("fix: y", "", "2222222aaaa"),
            ("feat: z", "", "1111111aaaa"),
        ]);
        let input = NotesInput {
            version: "2.0.0",
            repo_url: URL,
            prior_tag: Some("bar-v1.0.0"),
            next_tag: "bar-v2.0.0",
            release_date: None,
            changes: &changes,
        };

        let notes = generate_release_notes(&input, &rules());
        let features = notes.find("### Features").unwrap();
        let fixes = notes.find("### Fixes & improvements").unwrap();
        let breaking = notes.find("### BREAKING CHANGES").unwrap();
        assert!(features < fixes && fixes < breaking);
        assert!(notes.starts_with(
            "## [2.0.0](https://github.com/acme/tools/compare/bar-v1.0.0...bar-v2.0.0)\n"
        ));
        assert!(notes.contains("* api removed ([3333333]"));
    }

    #[test]
    fn test_empty_groups_are_omitted() {
        let changes = changes(&[("fix: y", "", "2222222aaaa")]);
        let input = NotesInput {
            version: "1.0.1",
            repo_url: URL,
            prior_tag: Some("bar-v1.0.0"),
            next_tag: "bar-v1.0.1",
            release_date: None,
            changes: &changes,
        };

        let notes = generate_release_notes(&input, &rules());
        assert!(!notes.contains("### Features"));
        assert!(!notes.contains("### BREAKING CHANGES"));
        assert!(notes.ends_with("))\n"));
    }

    #[test]
    fn test_notes_are_deterministic() {
        let changes = changes(&[
            ("feat: a", "", "1111111aaaa"),
            ("fix: b", "BREAKING CHANGES: c", "2222222aaaa"),
        ]);
        let input = NotesInput {
            version: "3.0.0",
            repo_url: URL,
            prior_tag: Some("foo-v2.4.1"),
            next_tag: "foo-v3.0.0",
            release_date: NaiveDate::from_ymd_opt(2026, 1, 2),
            changes: &changes,
        };

        let first = generate_release_notes(&input, &rules());
        for _ in 0..5 {
            assert_eq!(generate_release_notes(&input, &rules()), first);
        }
    }
}
