use thiserror::Error;

/// Credential-exchange failures. `Clone` so a single in-flight refresh can
/// hand the same outcome to every waiting caller.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("no soundcloud credentials configured")]
    MissingCredentials,
    #[error("token endpoint returned {status}: {body}")]
    Exchange { status: u16, body: String },
    #[error("token request failed: {0}")]
    Transport(String),
    #[error("malformed token response: {0}")]
    Malformed(String),
}

/// Everything `StreamResolver::resolve` can report. None of these are retried
/// internally; retry policy belongs to the caller.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("track not found upstream")]
    NotFound,
    #[error("upstream denied access to the track")]
    Forbidden,
    /// The track exists but advertises no recognized playable format. A
    /// business outcome (region lock, premium-only), not a transport failure.
    #[error("track offers no playable rendition")]
    NoPlayableRendition,
    #[error("upstream returned {status}: {body}")]
    Upstream { status: u16, body: String },
    #[error("upstream request failed: {0}")]
    Transport(String),
    #[error("final stream url missing: {0}")]
    Resolution(String),
}
