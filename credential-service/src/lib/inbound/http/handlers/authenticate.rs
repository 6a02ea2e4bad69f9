use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::account::models::AccessToken;
use crate::domain::account::models::AuthenticateCommand;
use crate::domain::account::ports::AccountServicePort;
use crate::inbound::http::router::AppState;

pub async fn authenticate(
    State(state): State<AppState>,
    Json(body): Json<AuthenticateRequestBody>,
) -> Result<ApiSuccess<AuthenticateResponseData>, ApiError> {
    let token = state
        .account_service
        .authenticate(body.into_command())
        .await?;

    Ok(ApiSuccess::new(StatusCode::OK, (&token).into()))
}

/// Missing fields deserialize as empty so the service reports them together.
#[derive(Clone, Deserialize)]
pub struct AuthenticateRequestBody {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
}

impl AuthenticateRequestBody {
    fn into_command(self) -> AuthenticateCommand {
        AuthenticateCommand {
            username: self.username,
            password: self.password,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthenticateResponseData {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub message: String,
}

impl From<&AccessToken> for AuthenticateResponseData {
    fn from(token: &AccessToken) -> Self {
        Self {
            token: token.token.clone(),
            expires_at: token.expires_at,
            message: format!(
                "You are authenticated as user with username: {}",
                token.username
            ),
        }
    }
}
