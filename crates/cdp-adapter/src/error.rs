use action_primitives::ActionError;
use chromiumoxide::error::CdpError;
use thiserror::Error;

/// Failures while bringing the browser up or tearing it down.
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("no Chromium executable found; set AUTOPROBE_CHROME_PATH or install chromium")]
    ExecutableNotFound,

    #[error("browser config error: {0}")]
    Config(String),

    #[error("failed to launch chromium: {0}")]
    Launch(#[source] CdpError),

    #[error("cdp i/o failure: {0}")]
    Cdp(#[from] CdpError),
}

impl From<AdapterError> for ActionError {
    fn from(err: AdapterError) -> Self {
        ActionError::Driver(err.to_string())
    }
}

pub(crate) fn driver_error(operation: &str, err: CdpError) -> ActionError {
    ActionError::Driver(format!("{operation}: {err}"))
}
