// Purpose: Package-resolution module root: manifest fields, loader snapshot, tables, resolver, paths.
// Inputs/Outputs: Exposes the building blocks used by the CLI and by library callers.
// Gotchas: Only normalize.rs touches the filesystem, and only through the FileSystem trait.

pub mod diag;
pub mod host;
pub mod loader;
pub mod manifest;
pub mod names;
pub mod normalize;
pub mod resolver;
pub mod tables;
