pub type Result<T> = std::result::Result<T, Error>;

/// Ingestion-time integrity violations.
///
/// Every variant aborts the current ingestion pass; malformed documents are not retried.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid viewBox {raw:?}: expected four finite numbers")]
    InvalidViewBox { raw: String },

    #[error("Malformed transform {raw:?}: expected matrix(a,b,c,d,e,f) with finite values")]
    MalformedTransform { raw: String },

    #[error("Unbalanced transform stack: pop without a matching push")]
    UnbalancedTransformStack,

    #[error("Invalid numeric attribute `{attribute}` on <{element}>: {raw:?}")]
    InvalidNumericAttribute {
        element: String,
        attribute: String,
        raw: Option<String>,
    },

    #[error("Duplicate node name: {name}")]
    DuplicateNodeName { name: String },

    #[error("A node was resolved before the root element declared a viewBox")]
    MissingViewBox,

    #[error("Invalid path data on <path id={id:?}>: {message}")]
    InvalidPathData { id: String, message: String },

    #[error("Invalid fill color on <{element} id={id:?}>: {raw:?}")]
    InvalidFillColor {
        element: String,
        id: String,
        raw: String,
    },

    #[error("SVG document is not well-formed: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("Invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}
