//! Conversions from external infrastructure errors into domain errors.

use mailsweep_common::resilience::BackoffError;
use mailsweep_domain::SweepError;
use reqwest::Error as HttpError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub SweepError);

impl From<InfraError> for SweepError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<SweepError> for InfraError {
    fn from(value: SweepError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoSweepError {
    fn into_sweep(self) -> SweepError;
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → SweepError */
/* -------------------------------------------------------------------------- */

impl IntoSweepError for HttpError {
    fn into_sweep(self) -> SweepError {
        if self.is_builder() {
            return SweepError::config(format!("invalid HTTP request: {self}"));
        }

        if self.is_timeout() {
            return SweepError::transport("HTTP request timed out");
        }

        if self.is_connect() {
            return SweepError::transport(format!("HTTP connection failure: {self}"));
        }

        if let Some(status) = self.status() {
            let code = status.as_u16();
            let message =
                format!("HTTP {} {}", code, status.canonical_reason().unwrap_or("unknown status"));

            return match code {
                401 => SweepError::auth(message),
                _ => SweepError::service(code, message),
            };
        }

        SweepError::transport(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_sweep())
    }
}

/* -------------------------------------------------------------------------- */
/* BackoffError → SweepError */
/* -------------------------------------------------------------------------- */

impl IntoSweepError for BackoffError {
    fn into_sweep(self) -> SweepError {
        SweepError::config(self.to_string())
    }
}

impl From<BackoffError> for InfraError {
    fn from(value: BackoffError) -> Self {
        InfraError(value.into_sweep())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
