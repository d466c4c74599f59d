/// Classified result of a single probe
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The request could not be completed (DNS, connect, TLS, timeout, ...)
    NetworkError(String),

    /// A response arrived, but not with the expected status
    UnexpectedStatus(String),

    /// The endpoint answered with the expected status
    Success(String),
}

impl Outcome {
    pub fn network_error(message: impl Into<String>) -> Self {
        Outcome::NetworkError(message.into())
    }

    pub fn unexpected_status(message: impl Into<String>) -> Self {
        Outcome::UnexpectedStatus(message.into())
    }

    pub fn success(message: impl Into<String>) -> Self {
        Outcome::Success(message.into())
    }

    /// Connectivity state this outcome implies. Both failure kinds map to
    /// the same state; only the message tells them apart.
    pub fn state(&self) -> ConnectivityState {
        match self {
            Outcome::NetworkError(_) | Outcome::UnexpectedStatus(_) => ConnectivityState::Failing,
            Outcome::Success(_) => ConnectivityState::Healthy,
        }
    }

    pub fn is_failure(&self) -> bool {
        self.state().is_failing()
    }

    pub fn message(&self) -> &str {
        match self {
            Outcome::NetworkError(message)
            | Outcome::UnexpectedStatus(message)
            | Outcome::Success(message) => message,
        }
    }

}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::NetworkError(message) => write!(f, "network error: {message}"),
            Outcome::UnexpectedStatus(message) => write!(f, "unexpected status: {message}"),
            Outcome::Success(message) => write!(f, "success: {message}"),
        }
    }
}

/// Whether the monitored endpoint is currently considered reachable
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConnectivityState {
    #[default]
    Healthy,
    Failing,
}

impl ConnectivityState {
    pub fn is_failing(self) -> bool {
        matches!(self, ConnectivityState::Failing)
    }

    pub fn from_failure(failure: bool) -> Self {
        if failure { ConnectivityState::Failing } else { ConnectivityState::Healthy }
    }
}

impl std::fmt::Display for ConnectivityState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectivityState::Healthy => write!(f, "up"),
            ConnectivityState::Failing => write!(f, "down"),
        }
    }
}
