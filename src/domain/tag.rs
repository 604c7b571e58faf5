/// Release tag naming pattern for one package (e.g. `foo-v{version}`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagPattern {
    pattern: String,
}

const PLACEHOLDER: &str = "{version}";

impl TagPattern {
    /// The `<name>-v{version}` pattern every package releases under
    pub fn for_package(package_name: &str) -> Self {
        TagPattern {
            pattern: format!("{}-v{}", package_name, PLACEHOLDER),
        }
    }

    /// Everything before the version placeholder (e.g. `foo-v`)
    pub fn prefix(&self) -> &str {
        self.pattern
            .split_once(PLACEHOLDER)
            .map(|(prefix, _)| prefix)
            .unwrap_or(&self.pattern)
    }

    /// Format a version according to pattern
    /// Example: pattern="foo-v{version}", version="1.2.3" -> "foo-v1.2.3"
    pub fn format(&self, version: &str) -> String {
        self.pattern.replace(PLACEHOLDER, version)
    }

    /// Whether `tag` is a release tag of this package.
    ///
    /// The character after the prefix must be a digit so that `foo-v` does
    /// not claim tags of a package named `foo-vendor`.
    pub fn matches(&self, tag: &str) -> bool {
        self.version_part(tag)
            .and_then(|rest| rest.chars().next())
            .is_some_and(|c| c.is_ascii_digit())
    }

    /// Extract the version text from a tag (e.g. "foo-v1.2.3" -> "1.2.3")
    pub fn version_part<'t>(&self, tag: &'t str) -> Option<&'t str> {
        tag.strip_prefix(self.prefix())
    }

    /// Pick the reference tag from a most-recent-first tag listing.
    pub fn latest<'t>(&self, tags: &'t [String]) -> Option<&'t str> {
        tags.iter().map(String::as_str).find(|tag| self.matches(tag))
    }
}
