use crate::accounts::{HttpAccountService, TransportError};

#[derive(Debug, Clone)]
pub struct GlobalArgs {
    pub api_url: String,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(api_url: String) -> Self {
        Self { api_url }
    }

    /// Builds the HTTP Account Service client for the configured base URL.
    ///
    /// # Errors
    /// Returns an error if the base URL is invalid or the client cannot be built.
    pub fn account_service(&self) -> Result<HttpAccountService, TransportError> {
        HttpAccountService::new(&self.api_url)
    }
}
