use http::StatusCode;
use oidc_flow::FlowError;

/// Helper trait for converting errors to a standard response error format
pub trait IntoResponseError<T> {
    fn into_response_error(self) -> Result<T, (StatusCode, String)>;
}

/// Caller mistakes map to 400, collaborator failures to an opaque 500.
/// The body is always the public message; details stay in the log.
impl<T> IntoResponseError<T> for Result<T, FlowError> {
    fn into_response_error(self) -> Result<T, (StatusCode, String)> {
        self.map_err(|e| {
            let status = match e {
                FlowError::NotConfigured => StatusCode::BAD_REQUEST,
                FlowError::MissingParameters => StatusCode::BAD_REQUEST,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
            (status, e.public_message().to_string())
        })
    }
}
