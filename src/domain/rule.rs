use regex::Regex;

use crate::domain::commit::CommitRecord;
use crate::domain::version::ReleaseType;
use crate::error::{ReleaseError, Result};

/// What a rule looks at in a commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleMatcher {
    /// Conventional subject prefixes such as `feat` or `fix`
    Prefixes(Vec<String>),
    /// Body footers such as `BREAKING CHANGE`
    Keywords(Vec<String>),
}

/// A classification rule mapping commits to a release severity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SemanticRule {
    pub group: String,
    pub release_type: ReleaseType,
    pub matcher: RuleMatcher,
}

impl SemanticRule {
    pub fn prefixes(group: &str, release_type: ReleaseType, prefixes: &[&str]) -> Self {
        SemanticRule {
            group: group.to_string(),
            release_type,
            matcher: RuleMatcher::Prefixes(prefixes.iter().map(|p| p.to_string()).collect()),
        }
    }

    pub fn keywords(group: &str, release_type: ReleaseType, keywords: &[&str]) -> Self {
        SemanticRule {
            group: group.to_string(),
            release_type,
            matcher: RuleMatcher::Keywords(keywords.iter().map(|k| k.to_string()).collect()),
        }
    }
}

/// The built-in rule list: features, fixes & improvements, breaking changes.
pub fn default_rules() -> Vec<SemanticRule> {
    vec![
        SemanticRule::prefixes("Features", ReleaseType::Minor, &["feat"]),
        SemanticRule::prefixes(
            "Fixes & improvements",
            ReleaseType::Patch,
            &["fix", "perf", "refactor", "docs"],
        ),
        SemanticRule::keywords(
            "BREAKING CHANGES",
            ReleaseType::Major,
            &["BREAKING CHANGE", "BREAKING CHANGES"],
        ),
    ]
}

/// A commit-derived fact implying a release severity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SemanticChange {
    pub group: String,
    pub release_type: ReleaseType,
    pub matched_text: String,
    pub subject: String,
    pub body: String,
    pub short_hash: String,
    pub full_hash: String,
}

fn alternation(terms: &[String]) -> String {
    terms
        .iter()
        .map(|t| regex::escape(t))
        .collect::<Vec<_>>()
        .join("|")
}

#[derive(Debug, Clone)]
struct CompiledRule {
    rule: SemanticRule,
    regex: Regex,
}

impl CompiledRule {
    fn compile(rule: SemanticRule) -> Result<Self> {
        if rule.group.trim().is_empty() {
            return Err(ReleaseError::config("semantic rule group must not be empty"));
        }

        let (terms, pattern) = match &rule.matcher {
            RuleMatcher::Prefixes(prefixes) => (
                prefixes,
                format!(r"^({})(\([^()]+\))?:\s.+$", alternation(prefixes)),
            ),
            RuleMatcher::Keywords(keywords) => {
                (keywords, format!(r"({}):\s(.+)", alternation(keywords)))
            }
        };

        if terms.is_empty() || terms.iter().any(|t| t.trim().is_empty()) {
            return Err(ReleaseError::config(format!(
                "semantic rule '{}' needs at least one non-empty prefix or keyword",
                rule.group
            )));
        }

        let regex = Regex::new(&pattern).map_err(|e| {
            ReleaseError::config(format!("semantic rule '{}': {}", rule.group, e))
        })?;

        Ok(CompiledRule { rule, regex })
    }

    /// The change description this rule extracts from a commit, if any.
    fn matched_text(&self, commit: &CommitRecord) -> Option<String> {
        match self.rule.matcher {
            RuleMatcher::Prefixes(_) => self
                .regex
                .find(&commit.subject)
                .map(|m| m.as_str().to_string()),
            RuleMatcher::Keywords(_) => self
                .regex
                .captures(&commit.body)
                .and_then(|c| c.get(2))
                .map(|m| m.as_str().trim().to_string()),
        }
    }
}

/// Immutable, compiled rule list handed to the rule engine
#[derive(Debug, Clone)]
pub struct RuleSet {
    rules: Vec<CompiledRule>,
}

impl RuleSet {
    /// Compile rules, failing on empty matchers or invalid patterns
    pub fn compile(rules: Vec<SemanticRule>) -> Result<Self> {
        let rules = rules
            .into_iter()
            .map(CompiledRule::compile)
            .collect::<Result<Vec<_>>>()?;
        Ok(RuleSet { rules })
    }

    pub fn rules(&self) -> impl Iterator<Item = &SemanticRule> {
        self.rules.iter().map(|c| &c.rule)
    }

    /// Distinct group names in rule-definition order
    pub fn groups(&self) -> Vec<&str> {
        let mut groups: Vec<&str> = Vec::new();
        for rule in self.rules() {
            if !groups.contains(&rule.group.as_str()) {
                groups.push(&rule.group);
            }
        }
        groups
    }

    /// Apply every rule to every commit.
    ///
    /// A commit may yield several changes (one per matching rule) or none.
    /// Output follows commit order, then rule order within a commit.
    pub fn classify(&self, commits: &[CommitRecord]) -> Vec<SemanticChange> {
        commits
            .iter()
            .flat_map(|commit| {
                self.rules.iter().filter_map(move |compiled| {
                    compiled.matched_text(commit).map(|matched_text| SemanticChange {
                        group: compiled.rule.group.clone(),
                        release_type: compiled.rule.release_type,
                        matched_text,
                        subject: commit.subject.clone(),
                        body: commit.body.clone(),
                        short_hash: commit.short_hash.clone(),
                        full_hash: commit.full_hash.clone(),
                    })
                })
            })
            .collect()
    }
}
