//! Request extractors that report failures in the API error shape.

use axum::{
  extract::{FromRequest, Request, rejection::JsonRejection},
  response::{IntoResponse, Response},
};
use serde::{Serialize, de::DeserializeOwned};

use crate::error::ApiError;

/// Local version of [`axum::Json`]. A body that fails to parse becomes a
/// 400 with a `{"error": msg}` body instead of axum's plain-text 422.
pub struct Json<T>(pub T);

impl<T, S> FromRequest<S> for Json<T>
where
  T: DeserializeOwned,
  S: Send + Sync,
{
  type Rejection = ApiError;

  async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
    match axum::Json::<T>::from_request(req, state).await {
      Ok(axum::Json(value)) => Ok(Json(value)),
      Err(rejection) => Err(ApiError::BadRequest(rejection_message(rejection))),
    }
  }
}

impl<T: Serialize> IntoResponse for Json<T> {
  fn into_response(self) -> Response { axum::Json(self.0).into_response() }
}

fn rejection_message(rejection: JsonRejection) -> String {
  match rejection {
    JsonRejection::JsonDataError(e) => e.body_text(),
    JsonRejection::JsonSyntaxError(e) => e.body_text(),
    JsonRejection::MissingJsonContentType(_) => "expected an application/json body".to_string(),
    JsonRejection::BytesRejection(e) => e.body_text(),
    other => other.body_text(),
  }
}
