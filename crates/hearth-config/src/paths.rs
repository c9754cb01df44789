//! Home/base path policy for the bootstrap substrate.
//!
//! `hearth.home` points at the installation; `hearth.base` points at the
//! instance. Single-instance deployments leave both at the same directory.

use camino::Utf8Path;
use tracing::debug;

use crate::defaults::MARKER_PACK;
use crate::properties::PropertyTable;

/// Reserved property naming the installation directory.
pub const HOME_PROP: &str = "hearth.home";

/// Reserved property naming the instance directory.
pub const BASE_PROP: &str = "hearth.base";

/// Applies the home/base fallback policy to the property table.
///
/// Performed once during bootstrap, in order: home, when unset, becomes the
/// canonicalised parent of the working directory if the marker archive
/// (`bootstrap.pack`) sits next to it, else the working directory itself.
/// Base, when unset, defaults to home (always set by that point) and
/// otherwise to the working directory. Already-set values are never touched.
pub fn ensure_home_and_base(table: &mut PropertyTable, cwd: &Utf8Path) {
    if !table.contains(HOME_PROP) {
        let home = derive_home(cwd);
        debug!(home = %home, "defaulted {HOME_PROP}");
        table.set(HOME_PROP, home);
    }
    if !table.contains(BASE_PROP) {
        let base = table
            .get(HOME_PROP)
            .map_or_else(|| cwd.as_str().to_owned(), ToOwned::to_owned);
        debug!(base = %base, "defaulted {BASE_PROP}");
        table.set(BASE_PROP, base);
    }
}

fn derive_home(cwd: &Utf8Path) -> String {
    if cwd.join(MARKER_PACK).exists() {
        // Marker next to the working directory: the process was launched from
        // the installation's bin directory, so home is one level up.
        match cwd.join("..").canonicalize_utf8() {
            Ok(parent) => return parent.into_string(),
            Err(error) => {
                debug!(%error, "failed to canonicalise parent, keeping cwd");
            }
        }
    }
    cwd.as_str().to_owned()
}

#[cfg(test)]
mod tests {
    use camino::Utf8PathBuf;
    use tempfile::TempDir;

    use super::*;

    fn utf8_dir(dir: &TempDir) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 temp path")
    }

    #[test]
    fn preset_values_are_untouched() {
        let mut table = PropertyTable::new();
        table.set(HOME_PROP, "/opt/hearth");
        table.set(BASE_PROP, "/var/hearth");
        ensure_home_and_base(&mut table, Utf8Path::new("/elsewhere"));
        assert_eq!(table.get(HOME_PROP), Some("/opt/hearth"));
        assert_eq!(table.get(BASE_PROP), Some("/var/hearth"));
    }

    #[test]
    fn base_defaults_to_preset_home() {
        let mut table = PropertyTable::new();
        table.set(HOME_PROP, "/opt/hearth");
        ensure_home_and_base(&mut table, Utf8Path::new("/elsewhere"));
        assert_eq!(table.get(BASE_PROP), Some("/opt/hearth"));
    }

    #[test]
    fn home_and_base_default_to_cwd_without_marker() {
        let dir = TempDir::new().expect("tempdir");
        let cwd = utf8_dir(&dir);
        let mut table = PropertyTable::new();
        ensure_home_and_base(&mut table, &cwd);
        assert_eq!(table.get(HOME_PROP), Some(cwd.as_str()));
        assert_eq!(table.get(BASE_PROP), Some(cwd.as_str()));
    }

    #[test]
    fn marker_selects_parent_of_cwd_for_home() {
        let dir = TempDir::new().expect("tempdir");
        let root = utf8_dir(&dir);
        let bin = root.join("bin");
        std::fs::create_dir(&bin).expect("create bin dir");
        std::fs::write(bin.join(MARKER_PACK), b"").expect("write marker");
        let mut table = PropertyTable::new();
        ensure_home_and_base(&mut table, &bin);
        let home = table.get(HOME_PROP).expect("home set");
        assert_eq!(
            Utf8Path::new(home),
            root.canonicalize_utf8().expect("canonical root")
        );
        // Home is always set by the time base is derived, so base follows it.
        assert_eq!(table.get(BASE_PROP), Some(home));
    }
}
