use thiserror::Error;

/// Errors raised when constructing an [`Address`](crate::address::Address).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("address must not be empty")]
    Empty,
}

/// Errors raised when converting a JSON value into a message [`Body`](crate::body::Body).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BodyError {
    #[error("message body must be a JSON object, got {0}")]
    NotAnObject(&'static str),
}

/// Failure side of a request-reply exchange.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BusError {
    /// The target address had no consumer when the request was sent.
    #[error("{message}")]
    NoHandlerRegistered { message: String },

    /// The consumer explicitly failed the message.
    #[error("consumer failed with code {code}: {message}")]
    ConsumerReportedFailure { code: i32, message: String },
}

impl BusError {
    /// The failure message as the consumer or the bus reported it.
    pub fn message(&self) -> &str {
        match self {
            Self::NoHandlerRegistered { message } => message,
            Self::ConsumerReportedFailure { message, .. } => message,
        }
    }
}

/// Errors from the component lifecycle manager.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LifecycleError {
    #[error("component '{component}' failed to start: {reason}")]
    ComponentStartFailed { component: String, reason: String },

    #[error("deployment {0} not found")]
    UnknownDeployment(String),

    #[error("deployment {0} is not started")]
    NotStarted(String),
}

/// Errors raised while registering a route.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("route template must start with '/': '{0}'")]
    NotAbsolute(String),

    #[error("empty parameter name in route template '{0}'")]
    EmptyParam(String),

    #[error("duplicate parameter '{param}' in route template '{template}'")]
    DuplicateParam { template: String, param: String },

    #[error("invalid route regex '{pattern}': {reason}")]
    InvalidRegex { pattern: String, reason: String },

    #[error("unsupported HTTP method '{0}'")]
    UnsupportedMethod(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_handler_display_is_the_bare_message() {
        let err = BusError::NoHandlerRegistered {
            message: "no consumer registered".to_string(),
        };
        assert_eq!(err.to_string(), "no consumer registered");
    }

    #[test]
    fn test_consumer_failure_display() {
        let err = BusError::ConsumerReportedFailure {
            code: 1,
            message: "Random Failure".to_string(),
        };
        assert_eq!(err.to_string(), "consumer failed with code 1: Random Failure");
        assert_eq!(err.message(), "Random Failure");
    }

    #[test]
    fn test_start_failed_display() {
        let err = LifecycleError::ComponentStartFailed {
            component: "event".to_string(),
            reason: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "component 'event' failed to start: boom");
    }

    #[test]
    fn test_duplicate_param_display() {
        let err = RouteError::DuplicateParam {
            template: "/a/:id/b/:id".to_string(),
            param: "id".to_string(),
        };
        assert!(err.to_string().contains("'id'"));
        assert!(err.to_string().contains("/a/:id/b/:id"));
    }
}
