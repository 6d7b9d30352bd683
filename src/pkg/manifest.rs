use anyhow::Context;
use serde_json::Value;
use indexmap::IndexMap;
use std::fs;
use std::path::Path;

use crate::pkg::diag::Reporter;

/// Dependency name -> location (`github:org/repo@ref`, `npm:name@1.0.0`).
/// `None` is a placeholder for a name the caller asked about.
pub type DependencyMap = IndexMap<String, Option<String>>;

pub const DEPENDENCIES: &str = "dependencies";
pub const DEV_DEPENDENCIES: &str = "devDependencies";

/// Parsed `package.json`. Kept as a raw JSON value so that malformed `jspm`
/// sections degrade to diagnostics instead of parse errors.
#[derive(Debug, Clone)]
pub struct PackageManifest {
    raw: Value,
}

impl PackageManifest {
    pub fn from_value(raw: Value) -> Self {
        Self { raw }
    }

    pub fn parse(json_text: &str) -> anyhow::Result<Self> {
        Ok(Self {
            raw: serde_json::from_str(json_text)?,
        })
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("parse {}", path.display()))
    }

    pub fn raw(&self) -> &Value {
        &self.raw
    }

    pub fn jspm_dependencies(&self, filter: Option<DependencyMap>, rep: &Reporter) -> DependencyMap {
        extract_dependency_field(&self.raw, DEPENDENCIES, filter, rep)
    }

    pub fn jspm_dev_dependencies(
        &self,
        filter: Option<DependencyMap>,
        rep: &Reporter,
    ) -> DependencyMap {
        extract_dependency_field(&self.raw, DEV_DEPENDENCIES, filter, rep)
    }
}

/// Reads `jspm.<field_name>` from a manifest.
///
/// With `filter_keys`, only those names are looked up and the filter map itself
/// is returned with found locations written over its values; names missing
/// from the manifest keep their old value. Without a filter the whole field is
/// copied. Missing sections return the filter (or an empty map) untouched.
pub fn extract_dependency_field(
    manifest: &Value,
    field_name: &str,
    filter_keys: Option<DependencyMap>,
    rep: &Reporter,
) -> DependencyMap {
    let Some(jspm) = manifest.get("jspm").and_then(Value::as_object) else {
        rep.warn("Warning: could not locate `jspm` entry in `package.json`.");
        return filter_keys.unwrap_or_default();
    };

    let Some(field) = jspm.get(field_name).and_then(Value::as_object) else {
        rep.warn(format!(
            "Warning: could not locate `jspm.{}` entry in `package.json`.",
            field_name
        ));
        return filter_keys.unwrap_or_default();
    };

    match filter_keys {
        Some(mut wanted) => {
            for (name, slot) in wanted.iter_mut() {
                match field.get(name).and_then(Value::as_str) {
                    Some(location) => *slot = Some(location.to_string()),
                    None => rep.warn(format!(
                        "Warning: could not locate package '{}' in `jspm.{}` entry in `package.json`.",
                        name, field_name
                    )),
                }
            }
            wanted
        }
        None => {
            let mut out = DependencyMap::new();
            for (name, value) in field {
                match value.as_str() {
                    Some(location) => {
                        out.insert(name.clone(), Some(location.to_string()));
                    }
                    None => rep.warn(format!(
                        "Warning: ignoring non-string location for '{}' in `jspm.{}`.",
                        name, field_name
                    )),
                }
            }
            out
        }
    }
}

/// Builds a filter map (`name -> None`) for `extract_dependency_field`.
pub fn filter_for<'a>(names: impl IntoIterator<Item = &'a str>) -> DependencyMap {
    names.into_iter().map(|n| (n.to_string(), None)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pkg::diag::MemorySink;
    use serde_json::json;

    fn sample() -> Value {
        json!({
            "name": "demo",
            "jspm": {
                "dependencies": {
                    "backbone": "github:typhonjs-backbone-parse/backbone-parse-es6@master"
                },
                "devDependencies": {
                    "babel": "npm:babel-core@5.8.35",
                    "babel-runtime": "npm:babel-runtime@5.8.35",
                    "core-js": "npm:core-js@1.2.6"
                }
            }
        })
    }

    #[test]
    fn whole_field_without_filter() {
        let sink = MemorySink::new();
        let rep = Reporter::new(&sink, "t", false);
        let m = PackageManifest::from_value(sample());

        let deps = m.jspm_dependencies(None, &rep);
        assert_eq!(deps.len(), 1);
        assert_eq!(
            deps["backbone"].as_deref(),
            Some("github:typhonjs-backbone-parse/backbone-parse-es6@master")
        );

        let dev = m.jspm_dev_dependencies(None, &rep);
        assert_eq!(
            dev.keys().map(String::as_str).collect::<Vec<_>>(),
            vec!["babel", "babel-runtime", "core-js"]
        );
        assert!(sink.is_empty());
    }

    #[test]
    fn filter_overlays_found_names_only() {
        let sink = MemorySink::new();
        let rep = Reporter::new(&sink, "t", false);
        let manifest = json!({ "jspm": { "dependencies": { "a": "x" } } });

        let got = extract_dependency_field(&manifest, DEPENDENCIES, Some(filter_for(["a"])), &rep);
        assert_eq!(got, DependencyMap::from([("a".into(), Some("x".into()))]));
        assert!(sink.is_empty());

        let got =
            extract_dependency_field(&manifest, DEPENDENCIES, Some(filter_for(["a", "b"])), &rep);
        assert_eq!(
            got,
            DependencyMap::from([("a".into(), Some("x".into())), ("b".into(), None)])
        );
        let msgs = sink.messages();
        assert_eq!(msgs.len(), 1);
        assert!(msgs[0].contains("'b'"), "{}", msgs[0]);
    }

    #[test]
    fn filter_keeps_existing_value_for_missing_name() {
        let rep_sink = MemorySink::new();
        let rep = Reporter::silent(&rep_sink);
        let manifest = json!({ "jspm": { "dependencies": { "a": "x" } } });
        let mut filter = filter_for(["a"]);
        filter.insert("keep".into(), Some("npm:keep@1.0.0".into()));

        let got = extract_dependency_field(&manifest, DEPENDENCIES, Some(filter), &rep);
        assert_eq!(got["keep"].as_deref(), Some("npm:keep@1.0.0"));
        assert_eq!(got.len(), 2);
        assert!(rep_sink.is_empty(), "silent reporter must not emit");
    }

    #[test]
    fn missing_sections_return_filter_unchanged() {
        let sink = MemorySink::new();
        let rep = Reporter::new(&sink, "t", false);

        let got = extract_dependency_field(&json!({ "name": "x" }), DEPENDENCIES, None, &rep);
        assert!(got.is_empty());

        let filter = filter_for(["a"]);
        let got = extract_dependency_field(
            &json!({ "jspm": { "dependencies": {} } }),
            DEV_DEPENDENCIES,
            Some(filter.clone()),
            &rep,
        );
        assert_eq!(got, filter);

        let got = extract_dependency_field(&json!({ "jspm": "nope" }), DEPENDENCIES, None, &rep);
        assert!(got.is_empty());

        let msgs = sink.messages();
        assert_eq!(msgs.len(), 3);
        assert!(msgs[0].contains("`jspm` entry"));
        assert!(msgs[1].contains("`jspm.devDependencies`"));
    }

    #[test]
    fn load_reports_path_on_bad_json() {
        let dir = std::env::temp_dir().join(format!("jspm-resolve-manifest-{}", std::process::id()));
        fs::create_dir_all(&dir).expect("mkdir");
        let p = dir.join("package.json");
        fs::write(&p, "{ not json").expect("write");

        let err = PackageManifest::load(&p).unwrap_err();
        assert!(format!("{:#}", err).contains("package.json"));

        fs::write(&p, sample().to_string()).expect("rewrite");
        let m = PackageManifest::load(&p).expect("load");
        assert_eq!(m.raw()["name"], "demo");

        let _ = fs::remove_dir_all(dir);
    }
}
