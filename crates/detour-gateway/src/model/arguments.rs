use axum::extract::{FromRequest, Request};
use axum::Json;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::AppError;
use crate::state::AppState;

pub const CSRF_TOKEN_KEY: &str = "__csrfToken";
pub const MODULE_ARGUMENTS_KEY: &str = "moduleArguments";
/// Header carrying the CSRF token for bodies without the envelope.
pub const CSRF_HEADER: &str = "x-csrf-token";

/// A request body, either wrapped as
/// `{"__csrfToken": "...", "moduleArguments": {...}}` or given bare.
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleArguments<T> {
    pub csrf_token: Option<String>,
    pub arguments: T,
}

impl<T: DeserializeOwned> ModuleArguments<T> {
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        match value {
            Value::Object(mut object) if object.contains_key(MODULE_ARGUMENTS_KEY) => {
                let csrf_token = object
                    .remove(CSRF_TOKEN_KEY)
                    .and_then(|token| token.as_str().map(str::to_string));
                let arguments = object.remove(MODULE_ARGUMENTS_KEY).unwrap_or(Value::Null);
                Ok(Self {
                    csrf_token,
                    arguments: serde_json::from_value(arguments)?,
                })
            }
            bare => Ok(Self {
                csrf_token: None,
                arguments: serde_json::from_value(bare)?,
            }),
        }
    }
}

/// Extracts the typed arguments of a mutation and checks its CSRF token.
pub struct Arguments<T>(pub T);

impl<T> FromRequest<AppState> for Arguments<T>
where
    T: DeserializeOwned + Send,
{
    type Rejection = AppError;

    async fn from_request(request: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let header_token = request
            .headers()
            .get(CSRF_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        let Json(value) = Json::<Value>::from_request(request, state)
            .await
            .map_err(|rejection| AppError::Malformed(rejection.body_text()))?;
        let envelope = ModuleArguments::<T>::from_value(value)
            .map_err(|error| AppError::Malformed(error.to_string()))?;

        state.verify_csrf(envelope.csrf_token.as_deref().or(header_token.as_deref()))?;
        Ok(Arguments(envelope.arguments))
    }
}
