// Purpose: Define crate-level module surface for JSPM manifest, loader and dependency resolution.
// Inputs/Outputs: Re-exports the resolver API for the binary, tests and embedding tools.
// Invariants: Public module boundaries should remain stable for callers.

pub mod cli;
pub mod config;
pub mod error;
pub mod pkg;

pub use error::ResolveError;
pub use pkg::diag::{DiagnosticSink, MemorySink, Reporter, TracingSink};
pub use pkg::host::HostContext;
pub use pkg::loader::{Loader, LoaderState, PackageRecord};
pub use pkg::manifest::{DependencyMap, PackageManifest, extract_dependency_field};
pub use pkg::names::NameList;
pub use pkg::normalize::{FileSystem, NormalizedPackage, PackageNormalizer, RealFs, normalize_package};
pub use pkg::resolver::PackageResolver;
pub use pkg::tables::{
    ChildDependencyTable, ChildMap, TopLevelTable, build_child_dependency_table,
    build_top_level_table,
};
