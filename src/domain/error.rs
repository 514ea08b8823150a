use thiserror::Error;

/// Core domain errors
#[derive(Debug, Clone, Error)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Invalid parameter '{param}': {message}")]
    InvalidParameter { param: String, message: String },

    #[error("{fetcher} fetch failed: {message}")]
    Fetch { fetcher: String, message: String },

    #[error("{message}")]
    Upstream { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn invalid_parameter(param: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            param: param.into(),
            message: message.into(),
        }
    }

    pub fn fetch(fetcher: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Fetch {
            fetcher: fetcher.into(),
            message: message.into(),
        }
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        Self::Upstream {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_names_fetcher() {
        let error = DomainError::fetch("http", "HTTP 403 Forbidden");
        assert_eq!(error.to_string(), "http fetch failed: HTTP 403 Forbidden");
    }

    #[test]
    fn test_upstream_error_is_bare_message() {
        let error = DomainError::upstream("Fetching failed. last=boom");
        assert_eq!(error.to_string(), "Fetching failed. last=boom");
    }

    #[test]
    fn test_invalid_parameter_error() {
        let error = DomainError::invalid_parameter("page", "must be >= 1");
        assert_eq!(error.to_string(), "Invalid parameter 'page': must be >= 1");
    }
}
