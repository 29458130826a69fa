use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum TypeLookupError {
    #[error("Type not found: {0}")]
    NotFound(String),
    #[error("Type name {name} is ambiguous ({candidates} candidates)")]
    AmbiguousName { name: String, candidates: usize },
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum TypeDefinitionError {
    #[error("Type {0} already has a shape")]
    AlreadyDefined(String),
    #[error("Type {0} cannot declare base types, constructors or fields")]
    ShapeNotAllowed(String),
}

/// Why [`select_constructor`](crate::resolve::selector::select_constructor)
/// found nothing. Local to resolution; never escapes as a panic.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SelectionError {
    #[error("type is abstract or cannot be instantiated")]
    NotInstantiable,
    #[error("no resolvable constructor")]
    NoResolvableConstructor,
    #[error("{candidates} constructors tie for best")]
    Ambiguous { candidates: usize },
}

/// Caller-facing failure of a resolver lookup.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ResolutionError {
    #[error("Cannot resolve {0}")]
    Unresolvable(String),
    #[error("Cannot resolve {type_name}: {candidates} constructors tie for best")]
    Ambiguous { type_name: String, candidates: usize },
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConversionError {
    #[error("Cannot convert {text:?} to {type_name}")]
    InvalidFormat { type_name: String, text: String },
    #[error("{member:?} is not a member of {type_name}")]
    UnknownEnumMember { type_name: String, member: String },
    #[error("Text cannot be converted to {0}")]
    Unsupported(String),
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum FieldError {
    #[error("{type_name} has no field {field}")]
    UnknownField { type_name: String, field: String },
    #[error("Field {type_name}.{field} is read-only")]
    ReadOnly { type_name: String, field: String },
    #[error("Field {type_name}.{field} does not accept {value}")]
    TypeMismatch {
        type_name: String,
        field: String,
        value: String,
    },
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConstructionError {
    #[error("No type indicator {indicator:?} given for {declared}, which has no default")]
    MissingTypeIndicator { declared: String, indicator: String },
    #[error("Invalid type indicator {indicator:?}")]
    InvalidTypeIndicator {
        indicator: String,
        #[source]
        source: TypeLookupError,
    },
    #[error("{actual} is not assignable to {declared}")]
    IncompatibleType { declared: String, actual: String },
    #[error("{0} is abstract or cannot be instantiated")]
    NotInstantiable(String),
    #[error("{0} declares no constructors")]
    NoConstructor(String),
    #[error("Constructor of {type_name} failed: {message}")]
    Constructor { type_name: String, message: String },
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Invalid catalog: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Type {0} is declared twice")]
    Duplicate(String),
    #[error("{owner} refers to unknown type {name}")]
    UnknownType { owner: String, name: String },
    #[error("Invalid default for parameter {parameter} of {owner}: {source}")]
    InvalidDefault {
        owner: String,
        parameter: String,
        #[source]
        source: ConversionError,
    },
    #[error(transparent)]
    Definition(#[from] TypeDefinitionError),
}
