use crate::soundcloud::StreamResolver;

/// Shared state handed to every request handler.
pub struct AppState {
    pub resolver: StreamResolver,
}
