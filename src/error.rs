use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// A "name or list of names" argument had some other shape.
    #[error("invalid argument `{param}`: expected a string or an array of strings, found {found}")]
    InvalidArgument {
        param: &'static str,
        found: &'static str,
    },
}
