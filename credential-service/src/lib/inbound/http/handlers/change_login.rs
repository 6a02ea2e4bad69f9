use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use axum::Json;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::account::errors::AccountError;
use crate::domain::account::models::AccountId;
use crate::domain::account::models::ChangeLoginCommand;
use crate::domain::account::models::LoginChanged;
use crate::domain::account::ports::AccountServicePort;
use crate::inbound::http::middleware::AuthenticatedAccount;
use crate::inbound::http::router::AppState;

pub async fn change_login(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedAccount>,
    Path(account_id): Path<String>,
    Json(body): Json<ChangeLoginRequestBody>,
) -> Result<ApiSuccess<ChangeLoginResponseData>, ApiError> {
    let account_id = AccountId::from_string(&account_id)
        .map_err(|e| ApiError::UnprocessableEntity(e.to_string()))?;

    // The token holder must own the account; a body username may only restate it.
    if let Some(claimed) = body
        .username
        .as_deref()
        .map(str::trim)
        .filter(|username| !username.is_empty())
    {
        if claimed != caller.username.as_str() {
            tracing::warn!(
                account_id = %account_id,
                caller = %caller.username,
                "Login change rejected: body username differs from token subject"
            );
            return Err(AccountError::AccountMismatch {
                account_id: account_id.to_string(),
                username: claimed.to_string(),
            }
            .into());
        }
    }

    let command = ChangeLoginCommand {
        account_id,
        username: Some(caller.username.to_string()),
        new_username: body.new_username,
        password: body.password,
    };

    let changed = state.account_service.change_login(command).await?;

    Ok(ApiSuccess::new(StatusCode::OK, changed.into()))
}

#[derive(Clone, Deserialize)]
pub struct ChangeLoginRequestBody {
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    new_username: String,
    #[serde(default)]
    password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeLoginResponseData {
    pub account_id: String,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub message: String,
}

impl From<LoginChanged> for ChangeLoginResponseData {
    fn from(changed: LoginChanged) -> Self {
        Self {
            account_id: changed.account_id.to_string(),
            username: changed.username.to_string(),
            password: changed.password,
            message: "Login and password changed".to_string(),
        }
    }
}
