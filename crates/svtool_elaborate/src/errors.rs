//! Elaboration error types.

/// Fatal elaboration errors.
///
/// Most ill-formed input degrades by omission; only structurally broken
/// generate loops abort elaboration.
#[derive(Debug, thiserror::Error)]
pub enum ElabError {
    /// A generate-for loop has no usable genvar loop variable.
    #[error("generate-for in module `{module}` is missing a genvar loop variable")]
    MissingGenvar {
        /// Name of the module containing the loop.
        module: String,
    },
}
