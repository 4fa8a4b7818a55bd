/// Errors raised by the LTM client and Membership Fetcher (§7).
///
/// `AuthError` is handled internally by the fetcher (one retry after
/// dropping the cached token, per §4.1) before ever escalating to
/// `ApiError`; callers of the public API only ever see `ApiError`.
#[derive(Debug, thiserror::Error)]
pub enum LtmError {
    #[error("LTM authentication failed: {0}")]
    AuthError(String),
    #[error("LTM API request failed: {0}")]
    ApiError(String),
}
