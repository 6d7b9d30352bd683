// Purpose: Answer dependency queries over a snapshot of loader state (top-level map + per-package maps).
// Inputs/Outputs: Built once from a Loader; returns loader keys, child maps, and flattened dependency lists.
// Invariants: Tables are never mutated after construction; lookups return None instead of failing.
// Gotchas: Dedup in the unique list is by resolved location, not by child name.

use std::collections::HashSet;

use crate::pkg::loader::Loader;
use crate::pkg::names::NameList;
use crate::pkg::tables::{
    ChildDependencyTable, ChildMap, PACKAGES_MARKER, TopLevelTable, build_child_dependency_table,
    build_top_level_table,
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageResolver {
    top_level_packages: TopLevelTable,
    child_package_map: ChildDependencyTable,
}

impl PackageResolver {
    /// Snapshots `loader`. `package_filter` limits the top-level table to those names.
    pub fn new(loader: &impl Loader, package_filter: Option<&NameList>) -> Self {
        Self::with_marker(loader, package_filter, PACKAGES_MARKER)
    }

    pub fn with_marker(
        loader: &impl Loader,
        package_filter: Option<&NameList>,
        marker: &str,
    ) -> Self {
        Self::from_tables(
            build_top_level_table(loader.map(), package_filter),
            build_child_dependency_table(loader.packages(), marker),
        )
    }

    pub fn from_tables(
        top_level_packages: TopLevelTable,
        child_package_map: ChildDependencyTable,
    ) -> Self {
        Self {
            top_level_packages,
            child_package_map,
        }
    }

    pub fn top_level_packages(&self) -> &TopLevelTable {
        &self.top_level_packages
    }

    pub fn child_package_map(&self) -> &ChildDependencyTable {
        &self.child_package_map
    }

    fn top_level_key(&self, top_level_name: &str) -> Option<&str> {
        self.top_level_packages
            .get(top_level_name)
            .and_then(|k| k.as_deref())
    }

    // Walks child names starting from `key`; None as soon as a hop is missing.
    fn walk<'a>(&'a self, key: &'a str, child_names: &NameList) -> Option<&'a str> {
        let mut current = key;
        for name in child_names.iter() {
            current = self.child_package_map.get(current)?.get(name)?.as_str();
        }
        Some(current)
    }

    /// Loader key reached from a top-level package through `child_names`.
    /// An empty list yields the top-level key itself.
    pub fn get_direct_dependency(
        &self,
        top_level_name: &str,
        child_names: impl Into<NameList>,
    ) -> Option<&str> {
        let key = self.top_level_key(top_level_name)?;
        if !self.child_package_map.contains_key(key) {
            return None;
        }
        let names: NameList = child_names.into();
        self.walk(key, &names)
    }

    /// Child map of a top-level package, or with `child_names` the child map
    /// of the node those names resolve to.
    pub fn get_direct_dependency_map(
        &self,
        top_level_name: &str,
        child_names: Option<NameList>,
    ) -> Option<&ChildMap> {
        let key = self.top_level_key(top_level_name)?;
        let top_map = self.child_package_map.get(key)?;
        let Some(names) = child_names else {
            return Some(top_map);
        };
        let resolved = self.walk(key, &names)?;
        self.child_package_map.get(resolved)
    }

    /// Every location reachable from the given top-level packages (all of
    /// them when `top_level_filter` is None), each listed once, breadth-first
    /// in order of discovery.
    pub fn get_unique_dependency_list(&self, top_level_filter: Option<NameList>) -> Vec<&str> {
        let filter = top_level_filter.unwrap_or_else(|| {
            NameList::new(self.top_level_packages.keys().cloned().collect())
        });

        let mut seen: HashSet<&str> = HashSet::new();
        let mut out: Vec<&str> = Vec::new();

        for name in filter.iter() {
            let Some(children) = self
                .top_level_key(name)
                .and_then(|k| self.child_package_map.get(k))
            else {
                continue;
            };
            push_unseen(children, &mut seen, &mut out);
        }

        // `out` doubles as the work queue and keeps growing while we walk it.
        let mut next = 0;
        while next < out.len() {
            if let Some(children) = self.child_package_map.get(out[next]) {
                push_unseen(children, &mut seen, &mut out);
            }
            next += 1;
        }

        out
    }
}

fn push_unseen<'a>(children: &'a ChildMap, seen: &mut HashSet<&'a str>, out: &mut Vec<&'a str>) {
    for location in children.values() {
        if seen.insert(location.as_str()) {
            out.push(location.as_str());
        }
    }
}
