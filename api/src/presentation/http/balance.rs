use axum::{
    Router,
    extract::State,
    routing::get,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::application::use_cases::balance::charge_balance::ChargeBalance;
use crate::application::use_cases::balance::get_balance::GetBalance;
use crate::application::use_cases::balance::list_transactions::ListBalanceTransactions;
use crate::bootstrap::app_context::AppContext;
use crate::domain::balance::balance::Balance;
use crate::domain::balance::transaction::BalanceTransaction;
use crate::presentation::http::extract::{AppJson, AppPath, AppQuery};
use crate::presentation::http::queue_token::ActiveQueueToken;
use crate::presentation::http::response::{ApiResult, ok};

#[derive(Debug, Deserialize, ToSchema)]
pub struct ChargeRequest {
    pub amount: i64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BalanceResponse {
    pub user_id: String,
    pub balance: i64,
    pub updated_at: DateTime<Utc>,
}

impl From<Balance> for BalanceResponse {
    fn from(b: Balance) -> Self {
        BalanceResponse {
            user_id: b.user_id,
            balance: b.amount,
            updated_at: b.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransactionResponse {
    pub transaction_id: Uuid,
    /// CHARGE | PAYMENT | REFUND
    pub transaction_type: String,
    pub amount: i64,
    pub balance_after: i64,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<BalanceTransaction> for TransactionResponse {
    fn from(t: BalanceTransaction) -> Self {
        TransactionResponse {
            transaction_id: t.id,
            transaction_type: t.kind.as_str().to_string(),
            amount: t.amount,
            balance_after: t.balance_after,
            description: t.description,
            created_at: t.created_at,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct LimitQuery {
    pub limit: Option<i64>,
}

#[utoipa::path(
    post,
    path = "/api/users/{userId}/balance",
    tag = "Balance",
    params(("userId" = String, Path, description = "User ID")),
    request_body = ChargeRequest,
    responses((status = 200, body = BalanceResponse), (status = 400, description = "Invalid amount")),
    security(("queue_token" = []))
)]
pub async fn charge_balance(
    State(ctx): State<AppContext>,
    token: ActiveQueueToken,
    AppPath(user_id): AppPath<String>,
    AppJson(req): AppJson<ChargeRequest>,
) -> ApiResult<BalanceResponse> {
    token.ensure_user(&user_id)?;
    let balances = ctx.balance_repo();
    let events = ctx.event_publisher();
    let uc = ChargeBalance {
        balances: balances.as_ref(),
        events: events.as_ref(),
    };
    ok(uc.execute(&user_id, req.amount).await?.into())
}

#[utoipa::path(
    get,
    path = "/api/users/{userId}/balance",
    tag = "Balance",
    params(("userId" = String, Path, description = "User ID")),
    responses((status = 200, body = BalanceResponse)),
    security(("queue_token" = []))
)]
pub async fn get_balance(
    State(ctx): State<AppContext>,
    token: ActiveQueueToken,
    AppPath(user_id): AppPath<String>,
) -> ApiResult<BalanceResponse> {
    token.ensure_user(&user_id)?;
    let balances = ctx.balance_repo();
    let uc = GetBalance {
        balances: balances.as_ref(),
    };
    ok(uc.execute(&user_id).await?.into())
}

#[utoipa::path(
    get,
    path = "/api/users/{userId}/balance/transactions",
    tag = "Balance",
    params(("userId" = String, Path, description = "User ID"), LimitQuery),
    responses((status = 200, body = [TransactionResponse])),
    security(("queue_token" = []))
)]
pub async fn list_transactions(
    State(ctx): State<AppContext>,
    token: ActiveQueueToken,
    AppPath(user_id): AppPath<String>,
    AppQuery(q): AppQuery<LimitQuery>,
) -> ApiResult<Vec<TransactionResponse>> {
    token.ensure_user(&user_id)?;
    let balances = ctx.balance_repo();
    let uc = ListBalanceTransactions {
        balances: balances.as_ref(),
    };
    let rows = uc.execute(&user_id, q.limit).await?;
    ok(rows.into_iter().map(TransactionResponse::from).collect())
}

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route(
            "/users/:user_id/balance",
            get(get_balance).post(charge_balance),
        )
        .route("/users/:user_id/balance/transactions", get(list_transactions))
        .with_state(ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presentation::http::test_app::{TestApp, send};
    use axum::http::{Method, StatusCode};

    #[tokio::test]
    async fn balance_routes_are_scoped_to_the_token_user() {
        let app = TestApp::new();
        app.store.set_balance("fan", 25_000);
        let token = app.active_token("fan");

        let (status, json) = send(
            routes(app.ctx.clone()),
            Method::GET,
            "/users/other/balance",
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(json["error"]["type"], "FORBIDDEN");

        let (status, json) = send(
            routes(app.ctx.clone()),
            Method::GET,
            "/users/fan/balance",
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["balance"], 25_000);

        let (status, json) = send(
            routes(app.ctx.clone()),
            Method::POST,
            "/users/fan/balance",
            Some(&token),
            Some(r#"{"amount":"lots"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["type"], "INVALID_ARGUMENT");
    }
}
