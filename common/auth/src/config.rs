/// Runtime configuration for token verification.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Expected issuer claim (iss).
    pub issuer: String,
    /// Expected audience claim (aud).
    pub audience: String,
    /// Allowable clock skew in seconds when validating exp. Zero by default;
    /// expiry is checked against the verifier's current time with no leeway
    /// unless a deployment opts in.
    pub leeway_seconds: u32,
}

impl AuthConfig {
    pub fn new(issuer: impl Into<String>, audience: impl Into<String>) -> Self {
        Self {
            issuer: issuer.into(),
            audience: audience.into(),
            leeway_seconds: 0,
        }
    }

    /// Opt in to a clock-skew tolerance.
    pub fn with_leeway(mut self, seconds: u32) -> Self {
        self.leeway_seconds = seconds;
        self
    }
}
