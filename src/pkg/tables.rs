use indexmap::IndexMap;

use crate::pkg::loader::PackageRecord;
use crate::pkg::names::NameList;

/// Marker separating the project path from the package-store key in
/// `System.packages` entries.
pub const PACKAGES_MARKER: &str = "jspm_packages/";

/// Top-level mapped name -> loader key (`github:org/repo@ref`).
pub type TopLevelTable = IndexMap<String, Option<String>>;

/// Child name -> child loader key.
pub type ChildMap = IndexMap<String, String>;

/// Canonical loader key -> the package's own child map.
pub type ChildDependencyTable = IndexMap<String, ChildMap>;

pub fn build_top_level_table(
    loader_map: &IndexMap<String, String>,
    name_filter: Option<&NameList>,
) -> TopLevelTable {
    match name_filter {
        None => loader_map
            .iter()
            .map(|(k, v)| (k.clone(), Some(v.clone())))
            .collect(),
        Some(names) => names
            .iter()
            .map(|n| (n.to_string(), loader_map.get(n).cloned()))
            .collect(),
    }
}

/// Re-keys `System.packages` by the mapped form of each package
/// (`.../jspm_packages/npm/x@1.0.0` -> `npm:x@1.0.0`). Entries without the
/// marker are not package-store packages and are skipped.
pub fn build_child_dependency_table(
    packages: &IndexMap<String, PackageRecord>,
    marker: &str,
) -> ChildDependencyTable {
    let mut out = ChildDependencyTable::new();
    for (key, record) in packages {
        let Some(canonical) = canonical_key(key, marker) else {
            continue;
        };
        out.insert(canonical, record.map.clone().unwrap_or_default());
    }
    out
}

pub fn canonical_key(store_key: &str, marker: &str) -> Option<String> {
    if marker.is_empty() {
        return None;
    }
    let mut parts = store_key.split(marker);
    parts.next();
    let tail = parts.next()?;
    Some(tail.replacen('/', ":", 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(pairs: &[(&str, &str)]) -> PackageRecord {
        PackageRecord {
            map: Some(
                pairs
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            ),
        }
    }

    #[test]
    fn top_level_without_filter_copies_everything() {
        let map = IndexMap::from([
            ("a".to_string(), "npm:a@1".to_string()),
            ("b".to_string(), "npm:b@2".to_string()),
        ]);
        let t = build_top_level_table(&map, None);
        assert_eq!(t.len(), 2);
        assert_eq!(t["b"].as_deref(), Some("npm:b@2"));
    }

    #[test]
    fn tables_keep_loader_insertion_order() {
        let map = IndexMap::from([
            ("zeta".to_string(), "npm:zeta@1".to_string()),
            ("alpha".to_string(), "npm:alpha@1".to_string()),
        ]);
        let t = build_top_level_table(&map, None);
        assert_eq!(t.keys().map(String::as_str).collect::<Vec<_>>(), vec!["zeta", "alpha"]);

        let packages = IndexMap::from([
            ("/app/jspm_packages/npm/zeta@1".to_string(), record(&[("y", "a"), ("b", "c")])),
            ("/app/jspm_packages/npm/alpha@1".to_string(), record(&[])),
        ]);
        let c = build_child_dependency_table(&packages, PACKAGES_MARKER);
        assert_eq!(
            c.keys().map(String::as_str).collect::<Vec<_>>(),
            vec!["npm:zeta@1", "npm:alpha@1"]
        );
        assert_eq!(
            c["npm:zeta@1"].keys().map(String::as_str).collect::<Vec<_>>(),
            vec!["y", "b"]
        );
    }

    #[test]
    fn top_level_filter_keeps_unknown_names_as_absent() {
        let map = IndexMap::from([("a".to_string(), "npm:a@1".to_string())]);
        let filter = NameList::from(["a", "zzz"]);
        let t = build_top_level_table(&map, Some(&filter));
        assert_eq!(t.len(), 2);
        assert_eq!(t["a"].as_deref(), Some("npm:a@1"));
        assert_eq!(t["zzz"], None);
    }

    #[test]
    fn child_table_rekeys_store_entries() {
        let packages = IndexMap::from([(
            "store/org/pkg@v1".to_string(),
            record(&[("dep", "store/org/dep@v2")]),
        )]);
        let t = build_child_dependency_table(&packages, "store/");
        assert_eq!(
            t,
            ChildDependencyTable::from([(
                "org:pkg@v1".to_string(),
                ChildMap::from([("dep".to_string(), "store/org/dep@v2".to_string())]),
            )])
        );
    }

    #[test]
    fn child_table_skips_keys_without_marker_and_defaults_missing_maps() {
        let packages = IndexMap::from([
            ("file:///app/src".to_string(), record(&[("x", "y")])),
            (
                "file:///app/jspm_packages/npm/plain@1.0.0".to_string(),
                PackageRecord { map: None },
            ),
        ]);
        let t = build_child_dependency_table(&packages, PACKAGES_MARKER);
        assert_eq!(t.len(), 1);
        assert!(t["npm:plain@1.0.0"].is_empty());
    }

    #[test]
    fn child_table_does_not_alias_loader_maps() {
        let packages = IndexMap::from([(
            "file:///app/jspm_packages/github/o/r@master".to_string(),
            record(&[("u", "npm:u@1")]),
        )]);
        let mut t = build_child_dependency_table(&packages, PACKAGES_MARKER);
        t.get_mut("github:o/r@master")
            .expect("entry")
            .insert("extra".into(), "npm:extra@1".into());

        let original = packages.values().next().and_then(|r| r.map.as_ref()).expect("map");
        assert_eq!(original.len(), 1);
        assert!(!original.contains_key("extra"));
    }

    #[test]
    fn canonical_key_uses_segment_after_first_marker() {
        assert_eq!(
            canonical_key("/a/jspm_packages/npm/x@1/jspm_packages/y", PACKAGES_MARKER).as_deref(),
            Some("npm:x@1/")
        );
        assert_eq!(canonical_key("/a/b", PACKAGES_MARKER), None);
        assert_eq!(canonical_key("/a/jspm_packages/", PACKAGES_MARKER).as_deref(), Some(""));
    }
}
