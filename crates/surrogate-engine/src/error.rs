//! Error types for proxy synthesis and forwarded invocation.

/// Errors raised while describing types, synthesizing proxies, or invoking methods
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProxyError {
    /// A type with this name was already defined in the dynamic module
    #[error("Type '{name}' is already defined in module '{module}'")]
    DuplicateDefinition {
        /// Module that rejected the definition
        module: String,
        /// Name of the rejected type
        name: String,
    },

    /// An interface method has no concrete implementation on a type
    #[error("Type '{type_name}' does not implement '{interface}.{method}'")]
    UnsatisfiedInterface {
        /// Implementing type
        type_name: String,
        /// Interface full name
        interface: String,
        /// Interface method name
        method: String,
    },

    /// A type was asked for a mapping of an interface it does not implement
    #[error("Type '{type_name}' does not implement interface '{interface}'")]
    InterfaceNotImplemented {
        /// Type that was queried
        type_name: String,
        /// Interface full name
        interface: String,
    },

    /// No method with the requested name and shape exists
    #[error("Method '{name}' not found on type '{type_name}'")]
    MethodNotFound {
        /// Type that was searched
        type_name: String,
        /// Requested method name
        name: String,
    },

    /// More than one method matched a late-bound lookup
    #[error("Ambiguous match for method '{name}' on type '{type_name}'")]
    AmbiguousMatch {
        /// Type that was searched
        type_name: String,
        /// Requested method name
        name: String,
    },

    /// Wrong number of arguments
    #[error("Method '{method}' expects {expected} argument(s), got {got}")]
    ArgumentCount {
        /// Method name
        method: String,
        /// Declared parameter count
        expected: usize,
        /// Supplied argument count
        got: usize,
    },

    /// An argument does not conform to its parameter type
    #[error("Argument {index} of '{method}' must be '{expected}', got '{got}'")]
    ArgumentType {
        /// Method name
        method: String,
        /// Zero-based parameter position
        index: usize,
        /// Declared parameter type
        expected: String,
        /// Runtime type of the supplied value
        got: String,
    },

    /// Wrong number of generic type arguments
    #[error("Method '{method}' expects {expected} type argument(s), got {got}")]
    GenericArity {
        /// Method name
        method: String,
        /// Declared generic parameter count
        expected: usize,
        /// Supplied type argument count
        got: usize,
    },

    /// A type argument violates a generic parameter constraint
    #[error("Type argument '{argument}' for '{parameter}' of '{method}' violates constraint '{constraint}'")]
    ConstraintViolation {
        /// Method name
        method: String,
        /// Generic parameter name
        parameter: String,
        /// Supplied type argument
        argument: String,
        /// Violated constraint
        constraint: String,
    },

    /// The late-bound calling path cannot bind by-reference parameters
    #[error("Method '{method}' takes by-reference parameters and cannot be bound late; obtain a method handle instead")]
    ByRefBinding {
        /// Method name
        method: String,
    },

    /// A receiver is not an instance of the expected type
    #[error("Invalid receiver: expected '{expected}', got '{got}'")]
    InvalidReceiver {
        /// Expected type
        expected: String,
        /// Runtime type of the receiver
        got: String,
    },

    /// The type cannot be used as a proxy source
    #[error("Cannot proxy type '{type_name}': {reason}")]
    InvalidProxyTarget {
        /// Offending type
        type_name: String,
        /// Reason for rejection
        reason: String,
    },

    /// No constructor taking a single source-typed argument
    #[error("Type '{type_name}' has no constructor accepting '{expected}'")]
    ConstructorMismatch {
        /// Synthesized type name
        type_name: String,
        /// Expected constructor parameter type
        expected: String,
    },

    /// An init-only field was written twice
    #[error("Field '{field}' is already initialized")]
    FieldAlreadyInitialized {
        /// Field name
        field: String,
    },

    /// A field was read before it was written
    #[error("Field '{field}' is not initialized")]
    FieldNotInitialized {
        /// Field name
        field: String,
    },

    /// An emitted method body failed validation or execution
    #[error("Invalid body for '{method}': {reason}")]
    InvalidBody {
        /// Method name
        method: String,
        /// What went wrong
        reason: String,
    },

    /// An abstract method was invoked directly
    #[error("Cannot invoke abstract method '{method}'")]
    AbstractCall {
        /// Method name
        method: String,
    },

    /// A method carries more than one rename attribute
    #[error("Method '{method}' has more than one rename attribute")]
    DuplicateMetadata {
        /// Method name
        method: String,
    },

    /// An attribute carries an invalid value
    #[error("Invalid metadata: {0}")]
    InvalidMetadata(String),

    /// A type description is malformed
    #[error("Invalid definition of type '{type_name}': {reason}")]
    InvalidTypeDefinition {
        /// Type name
        type_name: String,
        /// What is wrong with it
        reason: String,
    },

    /// Error raised by a wrapped method body
    #[error("{0}")]
    Raised(String),
}

impl ProxyError {
    /// Create an error raised from inside a method body
    pub fn raise(message: impl Into<String>) -> Self {
        ProxyError::Raised(message.into())
    }
}

impl From<String> for ProxyError {
    fn from(s: String) -> Self {
        ProxyError::Raised(s)
    }
}

impl From<&str> for ProxyError {
    fn from(s: &str) -> Self {
        ProxyError::Raised(s.to_string())
    }
}

/// Result type for proxy operations
pub type ProxyResult<T> = Result<T, ProxyError>;
