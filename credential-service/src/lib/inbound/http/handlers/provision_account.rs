use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::account::models::CredentialPair;
use crate::domain::account::models::ProvisionAccountCommand;
use crate::domain::account::models::Role;
use crate::domain::account::ports::AccountServicePort;
use crate::inbound::http::middleware::authenticated_account;
use crate::inbound::http::router::AppState;

pub async fn provision_account(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<ProvisionAccountRequestBody>,
) -> Result<ApiSuccess<ProvisionAccountResponseData>, ApiError> {
    let role = body
        .role
        .ok_or_else(|| ApiError::Validation(vec!["role".to_string()]))?;

    // Trainee and trainer accounts are self-service; admins are made by admins.
    if role == Role::Admin {
        let caller = authenticated_account(&state, &headers)?;
        if caller.role != Role::Admin {
            tracing::warn!(
                caller = %caller.username,
                role = %caller.role,
                "Admin provisioning rejected"
            );
            return Err(ApiError::Forbidden(
                "Only admins can provision admin accounts".to_string(),
            ));
        }
    }

    let pair = state
        .account_service
        .provision_account(ProvisionAccountCommand {
            first_name: body.first_name,
            last_name: body.last_name,
            role,
        })
        .await?;

    Ok(ApiSuccess::new(StatusCode::CREATED, pair.into()))
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProvisionAccountRequestBody {
    #[serde(default)]
    first_name: String,
    #[serde(default)]
    last_name: String,
    #[serde(default)]
    role: Option<Role>,
}

/// Returned once; the password cannot be read back afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProvisionAccountResponseData {
    pub id: String,
    pub username: String,
    pub password: String,
}

impl From<CredentialPair> for ProvisionAccountResponseData {
    fn from(pair: CredentialPair) -> Self {
        Self {
            id: pair.account_id.to_string(),
            username: pair.username.to_string(),
            password: pair.password,
        }
    }
}
