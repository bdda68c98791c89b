//! Mapping of SDK failures onto [`StoreError`]

use aws_sdk_dynamodb::config::http::HttpResponse;
use aws_sdk_dynamodb::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};

use crate::error::StoreError;

pub(crate) const RESOURCE_IN_USE: &str = "ResourceInUseException";
pub(crate) const RESOURCE_NOT_FOUND: &str = "ResourceNotFoundException";
pub(crate) const CONDITIONAL_CHECK_FAILED: &str = "ConditionalCheckFailedException";

/// Service error codes a caller can outwait
const UNAVAILABLE_CODES: &[&str] = &[
  RESOURCE_NOT_FOUND,
  "ProvisionedThroughputExceededException",
  "ThrottlingException",
  "RequestLimitExceeded",
  "InternalServerError",
  "ServiceUnavailable",
];

/// Service error code of a failed call, if the service answered at all
pub(crate) fn error_code<E: ProvideErrorMetadata>(err: &SdkError<E, HttpResponse>) -> Option<&str> {
  err.as_service_error().and_then(|e| e.code())
}

/// Classify a failed data-plane call
pub(crate) fn classify<E>(operation: &str, err: SdkError<E, HttpResponse>) -> StoreError
where
  E: ProvideErrorMetadata + std::error::Error + 'static,
{
  let message = format!("{operation} failed: {}", DisplayErrorContext(&err));

  match &err {
    SdkError::TimeoutError(_) | SdkError::DispatchFailure(_) | SdkError::ResponseError(_) => {
      StoreError::backend_unavailable(message)
    }
    SdkError::ServiceError(context) => {
      let code = context.err().code().unwrap_or_default();
      let server_side = context.raw().status().as_u16() >= 500;
      if server_side || UNAVAILABLE_CODES.contains(&code) {
        StoreError::backend_unavailable(message)
      } else {
        StoreError::backend(message)
      }
    }
    _ => StoreError::backend(message),
  }
}

/// Classify a failed `CreateTable` call
pub(crate) fn classify_provisioning<E>(
  table: &str,
  err: SdkError<E, HttpResponse>,
) -> StoreError
where
  E: ProvideErrorMetadata + std::error::Error + 'static,
{
  if error_code(&err) == Some(RESOURCE_IN_USE) {
    return StoreError::schema_exists(table);
  }
  StoreError::provisioning(format!("CreateTable {table}: {}", DisplayErrorContext(&err)))
}
