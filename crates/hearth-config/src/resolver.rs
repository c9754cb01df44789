//! Path-spec resolution for `<layer>.loader` configuration values.
//!
//! Resolution is a pure string transformation: substitution of `${name}`
//! occurrences, comma splitting, then per-token classification. No I/O
//! happens here; glob enumeration belongs to the context builder.

use camino::Utf8Path;

use crate::paths::{BASE_PROP, HOME_PROP};
use crate::properties::PropertyTable;
use crate::repository::Repository;

/// Substitution sources for `${name}` occurrences in a repository spec.
///
/// The two reserved names ([`HOME_PROP`] and [`BASE_PROP`]) resolve to the
/// supplied paths; every other name is looked up in the ambient property
/// table.
#[derive(Debug, Clone, Copy)]
pub struct Substitutions<'a> {
    home: &'a Utf8Path,
    base: &'a Utf8Path,
    table: &'a PropertyTable,
}

impl<'a> Substitutions<'a> {
    /// Bundles the reserved paths with the ambient property table.
    #[must_use]
    pub fn new(home: &'a Utf8Path, base: &'a Utf8Path, table: &'a PropertyTable) -> Self {
        Self { home, base, table }
    }

    fn lookup(&self, name: &str) -> Option<&'a str> {
        if name.is_empty() {
            return None;
        }
        if name == HOME_PROP {
            return Some(self.home.as_str());
        }
        if name == BASE_PROP {
            return Some(self.base.as_str());
        }
        self.table.get(name)
    }
}

/// Replaces `${name}` occurrences in `input` against the substitution set.
///
/// Unresolved names keep their literal `${name}` text. An unterminated
/// `${` truncates the scan: the remainder of the string is copied verbatim.
/// Callers rely on that leniency, so it is preserved rather than reported.
#[must_use]
pub fn substitute(input: &str, substitutions: &Substitutions<'_>) -> String {
    let Some(first) = input.find("${") else {
        return input.to_owned();
    };
    let mut result = String::with_capacity(input.len());
    // Byte index just past the last consumed `}`.
    let mut tail = 0usize;
    let mut search = Some(first);
    while let Some(start) = search {
        result.push_str(&input[tail..start]);
        let Some(offset) = input[start + 2..].find('}') else {
            // Unterminated marker: stop scanning and copy the rest verbatim.
            tail = start;
            break;
        };
        let end = start + 2 + offset;
        let name = &input[start + 2..end];
        match substitutions.lookup(name) {
            Some(value) => result.push_str(value),
            None => result.push_str(&input[start..=end]),
        }
        tail = end + 1;
        search = input[tail..].find("${").map(|index| tail + index);
    }
    result.push_str(&input[tail..]);
    result
}

/// Resolves a raw `<layer>.loader` value into ordered repository descriptors.
///
/// Substitution happens first over the whole value; the result is then split
/// on commas, tokens are trimmed, empty tokens are discarded, and each
/// surviving token is classified. Order and duplicates are preserved. An
/// absent or empty value yields no repositories, which signals the caller to
/// reuse the parent context.
#[must_use]
pub fn resolve(raw: Option<&str>, substitutions: &Substitutions<'_>) -> Vec<Repository> {
    let Some(raw) = raw else {
        return Vec::new();
    };
    let substituted = substitute(raw, substitutions);
    substituted
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(Repository::classify)
        .collect()
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::repository::RepositoryKind;

    fn table() -> PropertyTable {
        let mut table = PropertyTable::new();
        table.set("mirror.root", "https://mirror.example");
        table
    }

    fn with_substitutions<R>(run: impl FnOnce(&Substitutions<'_>) -> R) -> R {
        let table = table();
        let substitutions = Substitutions::new(
            Utf8Path::new("/opt/hearth"),
            Utf8Path::new("/var/hearth"),
            &table,
        );
        run(&substitutions)
    }

    #[test]
    fn substitution_is_identity_without_markers() {
        with_substitutions(|subs| {
            assert_eq!(substitute("/plain/path,/other", subs), "/plain/path,/other");
        });
    }

    #[rstest]
    #[case::home("${hearth.home}/lib", "/opt/hearth/lib")]
    #[case::base("${hearth.base}/lib", "/var/hearth/lib")]
    #[case::ambient("${mirror.root}/core.pack", "https://mirror.example/core.pack")]
    #[case::unresolved_keeps_literal("${undefined.prop}/lib", "${undefined.prop}/lib")]
    #[case::empty_name_keeps_literal("${}/lib", "${}/lib")]
    #[case::mixed(
        "${hearth.home}/lib,${undefined.prop}",
        "/opt/hearth/lib,${undefined.prop}"
    )]
    fn substitutes_reserved_and_ambient_names(#[case] input: &str, #[case] output: &str) {
        with_substitutions(|subs| {
            assert_eq!(substitute(input, subs), output);
        });
    }

    #[rstest]
    #[case::bare_marker("${", "${")]
    #[case::tail_preserved("a-${hearth.home", "a-${hearth.home")]
    #[case::resolved_then_unterminated("${hearth.home}/lib,${oops", "/opt/hearth/lib,${oops")]
    fn unterminated_marker_copies_remainder(#[case] input: &str, #[case] output: &str) {
        with_substitutions(|subs| {
            assert_eq!(substitute(input, subs), output);
        });
    }

    #[test]
    fn resolves_tokens_in_order_with_stated_kinds() {
        with_substitutions(|subs| {
            let repositories = resolve(
                Some("/a,/b/*.pack,/c.pack,https://mirror.example/d.pack"),
                subs,
            );
            let kinds: Vec<RepositoryKind> = repositories.iter().map(Repository::kind).collect();
            assert_eq!(
                kinds,
                vec![
                    RepositoryKind::Directory,
                    RepositoryKind::PackGlob,
                    RepositoryKind::Pack,
                    RepositoryKind::Url,
                ]
            );
            let glob = repositories.get(1).expect("glob descriptor");
            assert_eq!(glob.location(), "/b/");
        });
    }

    #[test]
    fn preserves_duplicates_and_discards_empty_tokens() {
        with_substitutions(|subs| {
            let repositories = resolve(Some(" /a , , /a ,"), subs);
            assert_eq!(repositories.len(), 2);
            assert!(repositories.iter().all(|r| r.location() == "/a"));
        });
    }

    #[rstest]
    #[case::absent(None)]
    #[case::empty(Some(""))]
    #[case::blank(Some("  ,  "))]
    fn empty_input_yields_no_repositories(#[case] raw: Option<&str>) {
        with_substitutions(|subs| {
            assert!(resolve(raw, subs).is_empty());
        });
    }
}
