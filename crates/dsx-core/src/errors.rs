//! Error types for the DSX loader.

use thiserror::Error;

/// Fatal load failures.
///
/// A load that returns one of these never yields a scene; the partially built
/// tables are dropped as a unit.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Xml(#[from] XmlError),

    #[error("document root must be <dsx>, found <{found}>")]
    UnexpectedRoot { found: String },

    #[error("required section <{section}> is missing")]
    MissingSection { section: &'static str },

    #[error("<scene> does not name a root node")]
    MissingRootId,

    #[error("root node '{id}' is not declared in <primitives> or <components>")]
    MissingRoot { id: String },

    #[error("load rejected in strict mode: {message}")]
    Rejected { message: String },

    #[error("invalid load options: {0}")]
    Options(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Malformed XML input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed XML at line {line}: {message}")]
pub struct XmlError {
    pub line: usize,
    pub message: String,
}

impl XmlError {
    pub fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

/// A failure that stops a single element (one view, one material, one
/// component) while the rest of the document keeps loading.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ElementError {
    pub message: String,
}

impl ElementError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// A required attribute is absent or unreadable.
    pub fn missing_attribute(tag: &str, attribute: &str) -> Self {
        Self::new(format!("<{tag}> is missing required attribute '{attribute}'"))
    }

    /// A reference to an id that no table declares.
    pub fn unknown_reference(kind: &str, id: &str) -> Self {
        Self::new(format!("references unknown {kind} '{id}'"))
    }
}

/// Invalid primitive geometry.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ShapeError {
    #[error("{shape}: '{param}' must be positive, got {value}")]
    NonPositive {
        shape: &'static str,
        param: &'static str,
        value: f32,
    },

    #[error("{shape}: '{param}' must be at least {min}, got {value}")]
    TooFewDivisions {
        shape: &'static str,
        param: &'static str,
        min: u32,
        value: u32,
    },

    #[error("{shape}: '{param}' must be at most {max}, got {value}")]
    TooManyDivisions {
        shape: &'static str,
        param: &'static str,
        max: u32,
        value: u32,
    },

    #[error("rectangle has zero area")]
    DegenerateRectangle,

    #[error("triangle vertices are collinear")]
    DegenerateTriangle,

    #[error("patch of order {order_u}x{order_v} needs {expected} control points, got {found}")]
    ControlPointCount {
        order_u: u32,
        order_v: u32,
        expected: usize,
        found: usize,
    },
}

impl From<ShapeError> for ElementError {
    fn from(err: ShapeError) -> Self {
        ElementError::new(err.to_string())
    }
}
