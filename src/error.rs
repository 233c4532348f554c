use thiserror::Error;

/// I/O errors that can occur when fetching STAC item documents
#[derive(Debug, Clone, Error)]
pub enum IoError {
    /// Error from S3 or S3-compatible storage
    #[error("S3 error: {0}")]
    S3(String),

    /// Error from an HTTP(S) origin
    #[error("HTTP error: {0}")]
    Http(String),

    /// Error reading from the local filesystem
    #[error("Local I/O error: {0}")]
    Local(String),

    /// Network or connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Object not found
    #[error("Object not found: {0}")]
    NotFound(String),
}

/// Errors raised while resolving the dataset reference of a request
#[derive(Debug, Clone, Error)]
pub enum ResolveError {
    /// No `url` query parameter, or an empty one
    #[error("Missing dataset url: pass the STAC item location with ?url=")]
    MissingUrl,

    /// The locator could not be interpreted
    #[error("Invalid dataset url {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
}

/// Errors raised by a reader while opening a dataset or answering a query
#[derive(Debug, Clone, Error)]
pub enum ReaderError {
    /// I/O error while fetching the dataset
    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    /// The document is not a usable STAC item
    #[error("Invalid STAC item: {0}")]
    InvalidItem(String),

    /// The operation needs an asset selection and none was given
    #[error("No asset selected: pass ?assets=<name>[,<name>...]")]
    MissingAssets,

    /// An asset name that the item does not expose
    #[error("Invalid asset {asset}: available assets are [{available}]")]
    InvalidAsset { asset: String, available: String },

    /// A band index outside the asset's band range
    #[error("Invalid band index {index} for asset {asset} (asset has {count} band(s))")]
    InvalidBandIndex {
        asset: String,
        index: u32,
        count: usize,
    },

    /// The reader does not implement this operation
    #[error("Unsupported operation: {operation} is not available for {reader}")]
    Unsupported {
        operation: &'static str,
        reader: String,
    },

    /// Any other failure inside the reader
    #[error("Reader error: {0}")]
    Backend(String),
}

/// Errors surfaced by tiler endpoints
#[derive(Debug, Clone, Error)]
pub enum TilerError {
    /// Dataset reference resolution failed
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// Reader construction or a reader operation failed
    #[error(transparent)]
    Reader(#[from] ReaderError),

    /// A query parameter that must be numeric could not be parsed
    #[error("Invalid value for {name}: {value}")]
    InvalidParameter { name: &'static str, value: String },
}

impl From<IoError> for TilerError {
    fn from(err: IoError) -> Self {
        TilerError::Reader(ReaderError::Io(err))
    }
}
