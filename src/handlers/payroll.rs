use actix_web::{web, HttpResponse, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use crate::handlers::shared::ApiResponse;
use crate::services::{recalculation, statement, StatementScope};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatementQuery {
    pub requester_id: Uuid,
    pub requester_role: String,
    pub owner_id: Option<Uuid>,
    /// Comma-separated object ids a manager-level caller may see.
    pub accessible_object_ids: Option<String>,
}

/// Generate (and backfill) the per-employee statement. Role checks happen
/// upstream; this layer only carries the requester identity for scoping and
/// the audit log.
pub async fn get_statement(
    path: web::Path<Uuid>,
    query: web::Query<StatementQuery>,
) -> Result<HttpResponse> {
    let employee_id = path.into_inner();
    let query = query.into_inner();

    let accessible_object_ids = match &query.accessible_object_ids {
        Some(raw) => Some(parse_id_list(raw)?),
        None => None,
    };

    let scope = StatementScope {
        owner_id: query.owner_id,
        accessible_object_ids,
    };

    let statement = statement::generate_statement(
        employee_id,
        query.requester_id,
        &query.requester_role,
        scope,
    )
    .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(statement)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecalculateInput {
    pub target_date: NaiveDate,
    pub owner_id: Option<Uuid>,
    pub actor_id: Uuid,
}

/// Manual or scheduled batch recalculation for one calendar date. Partial
/// failures come back in the summary's errors list.
pub async fn recalculate(input: web::Json<RecalculateInput>) -> Result<HttpResponse> {
    let input = input.into_inner();

    let summary =
        recalculation::recalculate(input.target_date, input.owner_id, input.actor_id).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(summary)))
}

fn parse_id_list(raw: &str) -> Result<Vec<Uuid>, crate::error::AppError> {
    raw.split(',')
        .filter(|part| !part.trim().is_empty())
        .map(|part| {
            part.trim().parse::<Uuid>().map_err(|_| {
                crate::error::AppError::BadRequest(format!("Invalid object id: {}", part))
            })
        })
        .collect()
}
