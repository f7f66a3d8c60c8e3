use miette::Diagnostic;
use thiserror::Error;

/// Main error type for archmap operations
#[derive(Error, Diagnostic, Debug)]
pub enum ArchError {
    #[error("IO error: {0}")]
    #[diagnostic(code(archmap::io))]
    IoError(#[from] std::io::Error),

    #[error("IO error with {path}: {message}")]
    #[diagnostic(code(archmap::io))]
    Io {
        path: std::path::PathBuf,
        message: String,
    },

    #[error("Failed to load {count} file(s):\n  {message}")]
    #[diagnostic(code(archmap::io))]
    Load {
        count: usize,
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error("Parse error: {message}")]
    #[diagnostic(code(archmap::parse))]
    Parse {
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error("Configuration error: {message}")]
    #[diagnostic(code(archmap::config))]
    Config {
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error("Validation error: {message}")]
    #[diagnostic(code(archmap::validate))]
    Validation {
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error(transparent)]
    #[diagnostic(code(archmap::edit))]
    Edit(#[from] EditError),
}

/// Rejections from map editing operations.
///
/// These leave the map untouched: every placement is checked before any
/// cell is modified.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    #[error("position ({x}, {y}) is outside the {width}x{height} map")]
    OutOfBounds {
        x: i32,
        y: i32,
        width: usize,
        height: usize,
    },

    #[error("'{arch}' is already placed at ({x}, {y})")]
    Occupied { arch: String, x: i32, y: i32 },

    #[error("unknown archetype '{0}'")]
    UnknownArchetype(String),

    #[error("instance of '{0}' has no resolved archetype")]
    UnresolvedArchetype(String),

    #[error("instance is already linked to the map or an inventory")]
    NotDetached,

    #[error("an object of the same join list already occupies ({x}, {y})")]
    JoinOccupied { x: i32, y: i32 },

    #[error("join list {0} does not exist")]
    UnknownJoinList(usize),

    #[error("instance no longer exists")]
    MissingInstance,

    #[error("multi-tile objects cannot be stored in an inventory")]
    NotAContainer,
}

pub type Result<T> = std::result::Result<T, ArchError>;
