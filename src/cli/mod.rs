// Purpose: Command-line front end over manifest extraction, dependency resolution and path normalization.
// Inputs/Outputs: Reads argv plus package.json/loader.json from the project root; prints JSON or plain lines.
// Invariants: Results go to stdout, diagnostics and usage to stderr; exit code 1 on not-found or error.
// Gotchas: Global flags must precede the command name.

use anyhow::{Context, bail};
use std::path::PathBuf;
use strsim::jaro_winkler;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::pkg::diag::{Reporter, TracingSink};
use crate::pkg::host::HostContext;
use crate::pkg::loader::LoaderState;
use crate::pkg::manifest::{DependencyMap, PackageManifest, filter_for};
use crate::pkg::names::NameList;
use crate::pkg::normalize::{PackageNormalizer, RealFs};
use crate::pkg::resolver::PackageResolver;

static SINK: TracingSink = TracingSink;

pub fn init_logging() {
    let filter = EnvFilter::try_from_env("JSPM_RESOLVE_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[derive(Default)]
struct GlobalArgs {
    root: Option<PathBuf>,
    package_json: Option<PathBuf>,
    loader: Option<PathBuf>,
    silent: bool,
    log_title: Option<String>,
}

struct Session {
    root: PathBuf,
    cfg: Config,
    host: HostContext,
}

impl Session {
    fn open(g: GlobalArgs) -> anyhow::Result<Self> {
        let host = match g.root {
            Some(r) => HostContext::native(r),
            None => HostContext::detect().context("cannot determine current directory")?,
        };
        let root = host.cwd().map(PathBuf::from).unwrap_or_default();
        let mut cfg = Config::load(&root)?;
        if let Some(p) = g.package_json {
            cfg.package_json = p;
        }
        if let Some(p) = g.loader {
            cfg.loader = p;
        }
        if let Some(t) = g.log_title {
            cfg.log_title = t;
        }
        cfg.silent |= g.silent;
        Ok(Self { root, cfg, host })
    }

    fn reporter(&self) -> Reporter<'static> {
        Reporter::new(&SINK, self.cfg.log_title.clone(), self.cfg.silent)
    }

    fn manifest(&self) -> anyhow::Result<PackageManifest> {
        PackageManifest::load(&self.cfg.package_json_path(&self.root))
    }

    fn loader(&self) -> anyhow::Result<LoaderState> {
        LoaderState::load(&self.cfg.loader_path(&self.root))
    }

    fn resolver(&self, filter: Option<&NameList>) -> anyhow::Result<PackageResolver> {
        let filter = filter.or(self.cfg.top_level_filter.as_ref());
        Ok(PackageResolver::with_marker(
            &self.loader()?,
            filter,
            &self.cfg.packages_marker,
        ))
    }
}

pub fn run_cli<I>(args: I) -> i32
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter().peekable();
    let mut g = GlobalArgs::default();

    while let Some(arg) = args.peek().cloned() {
        if !arg.starts_with("--") {
            break;
        }
        args.next();
        let slot = match arg.as_str() {
            "--silent" => {
                g.silent = true;
                continue;
            }
            "--root" => &mut g.root,
            "--package" => &mut g.package_json,
            "--loader" => &mut g.loader,
            "--log-title" => {
                match args.next() {
                    Some(t) => g.log_title = Some(t),
                    None => {
                        eprintln!("expected value after --log-title");
                        return 1;
                    }
                }
                continue;
            }
            "--help" => {
                print_usage();
                return 0;
            }
            _ => {
                eprintln!("unknown argument: {}", arg);
                return 1;
            }
        };
        match args.next() {
            Some(v) => *slot = Some(PathBuf::from(v)),
            None => {
                eprintln!("expected path after {}", arg);
                return 1;
            }
        }
    }

    let Some(cmd) = args.next() else {
        print_usage();
        return 1;
    };
    let rest: Vec<String> = args.collect();

    let session = match Session::open(g) {
        Ok(s) => s,
        Err(err) => {
            eprintln!("{:#}", err);
            return 1;
        }
    };

    let result = match cmd.as_str() {
        "deps" => cmd_deps(&session, &rest),
        "top-level" => cmd_top_level(&session, &rest),
        "children" => cmd_children(&session),
        "dependency" => cmd_dependency(&session, &rest),
        "dependency-map" => cmd_dependency_map(&session, &rest),
        "unique" => cmd_unique(&session, &rest),
        "normalize" => cmd_normalize(&session, &rest),
        "root" => {
            println!("{}", session.host.root_path());
            Ok(0)
        }
        other => {
            eprintln!("unknown command: {}", other);
            print_usage();
            Ok(1)
        }
    };

    match result {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{:#}", err);
            1
        }
    }
}

fn print_usage() {
    eprintln!("usage: jspm-resolve [--root DIR] [--package FILE] [--loader FILE] [--silent] [--log-title T] <command>");
    eprintln!("commands:");
    eprintln!("  deps [--dev] [--only a,b]        jspm (dev)dependencies from package.json");
    eprintln!("  top-level [--filter a,b]         top-level name -> loader key");
    eprintln!("  children                         loader key -> child map");
    eprintln!("  dependency <top> [child...]      resolved loader key");
    eprintln!("  dependency-map <top> [child...]  child map of the resolved package");
    eprintln!("  unique [top...]                  every transitive dependency, once");
    eprintln!("  normalize <name> [--relative-to DIR]");
    eprintln!("  root                             root execution path");
}

fn split_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|x| !x.is_empty())
        .map(str::to_string)
        .collect()
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn cmd_deps(s: &Session, rest: &[String]) -> anyhow::Result<i32> {
    let mut dev = false;
    let mut only: Option<DependencyMap> = None;
    let mut it = rest.iter();
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--dev" => dev = true,
            "--only" => {
                let list = it.next().context("expected names after --only")?;
                let names = split_list(list);
                only = Some(filter_for(names.iter().map(String::as_str)));
            }
            other => bail!("unknown argument: {}", other),
        }
    }

    let manifest = s.manifest()?;
    let rep = s.reporter();
    let deps = if dev {
        manifest.jspm_dev_dependencies(only, &rep)
    } else {
        manifest.jspm_dependencies(only, &rep)
    };
    print_json(&deps)?;
    Ok(0)
}

fn cmd_top_level(s: &Session, rest: &[String]) -> anyhow::Result<i32> {
    let filter = match rest {
        [] => None,
        [flag, list] if flag == "--filter" => Some(NameList::new(split_list(list))),
        _ => bail!("usage: top-level [--filter a,b]"),
    };
    let resolver = s.resolver(filter.as_ref())?;
    print_json(resolver.top_level_packages())?;
    Ok(0)
}

fn cmd_children(s: &Session) -> anyhow::Result<i32> {
    let resolver = s.resolver(None)?;
    print_json(resolver.child_package_map())?;
    Ok(0)
}

fn split_top_and_children(rest: &[String]) -> anyhow::Result<(&str, NameList)> {
    let Some((top, children)) = rest.split_first() else {
        bail!("expected a top-level package name");
    };
    Ok((top.as_str(), NameList::from(children)))
}

fn cmd_dependency(s: &Session, rest: &[String]) -> anyhow::Result<i32> {
    let (top, children) = split_top_and_children(rest)?;
    let resolver = s.resolver(None)?;
    match resolver.get_direct_dependency(top, children) {
        Some(key) => {
            println!("{}", key);
            Ok(0)
        }
        None => {
            report_not_found(&resolver, top);
            Ok(1)
        }
    }
}

fn cmd_dependency_map(s: &Session, rest: &[String]) -> anyhow::Result<i32> {
    let (top, children) = split_top_and_children(rest)?;
    let children = if children.is_empty() {
        None
    } else {
        Some(children)
    };
    let resolver = s.resolver(None)?;
    match resolver.get_direct_dependency_map(top, children) {
        Some(map) => {
            print_json(map)?;
            Ok(0)
        }
        None => {
            report_not_found(&resolver, top);
            Ok(1)
        }
    }
}

fn cmd_unique(s: &Session, rest: &[String]) -> anyhow::Result<i32> {
    let filter = if rest.is_empty() {
        None
    } else {
        Some(NameList::from(rest))
    };
    let resolver = s.resolver(None)?;
    for dep in resolver.get_unique_dependency_list(filter) {
        println!("{}", dep);
    }
    Ok(0)
}

fn cmd_normalize(s: &Session, rest: &[String]) -> anyhow::Result<i32> {
    let (name, relative_to) = match rest {
        [name] => (name, None),
        [name, flag, dir] if flag == "--relative-to" => (name, Some(PathBuf::from(dir))),
        _ => bail!("usage: normalize <name> [--relative-to DIR]"),
    };
    let loader = s.loader()?;
    let rep = s.reporter();
    let mut normalizer =
        PackageNormalizer::new(&loader, &s.host, &RealFs).marker(&s.cfg.packages_marker);
    if let Some(dir) = relative_to {
        normalizer = normalizer.root_path(dir);
    }
    match normalizer.normalize(name, &rep) {
        Some(pkg) => {
            print_json(&pkg)?;
            Ok(0)
        }
        None => Ok(1),
    }
}

fn report_not_found(resolver: &PackageResolver, top: &str) {
    if resolver.top_level_packages().contains_key(top) {
        eprintln!("no dependency found under '{}'", top);
        return;
    }
    let candidates: Vec<&str> = resolver
        .top_level_packages()
        .keys()
        .map(String::as_str)
        .collect();
    match best_name_match(top, &candidates) {
        Some(best) => eprintln!(
            "unknown top-level package '{}'\nhelp: did you mean \"{}\"?",
            top, best
        ),
        None => eprintln!("unknown top-level package '{}'", top),
    }
}

fn best_name_match<'a>(needle: &str, candidates: &[&'a str]) -> Option<&'a str> {
    let mut best: Option<(&str, f64)> = None;
    for &c in candidates {
        let score = jaro_winkler(needle, c);
        if best.map(|(_, s)| score > s).unwrap_or(true) {
            best = Some((c, score));
        }
    }
    match best {
        Some((name, score)) if score >= 0.84 => Some(name),
        _ => None,
    }
}
