//! Resource construction errors.

use thiserror::Error;

use crate::store::StoreError;

/// Errors raised while building descriptors or the registry.
#[derive(Debug, Error)]
pub enum ResourceError {
    /// The resource spec carried no (or a blank) title.
    #[error("resource title is required")]
    MissingTitle,

    /// The document store rejected the schema.
    #[error("failed to register schema for `{name}`: {source}")]
    Registration {
        name: String,
        #[source]
        source: StoreError,
    },

    /// The named parent has not been registered.
    #[error("resource `{name}` references unknown parent `{parent}`")]
    UnknownParent { name: String, parent: String },
}
