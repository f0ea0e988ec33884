use actix_web::{web, HttpResponse, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use crate::database::models::{AdjustmentCategory, AdjustmentInput, AdjustmentUpdateInput};
use crate::handlers::shared::ApiResponse;
use crate::services::ledger;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListAdjustmentsQuery {
    pub employee_id: Uuid,
    pub from: NaiveDate,
    pub until: NaiveDate,
    pub object_id: Option<Uuid>,
    pub category: Option<AdjustmentCategory>,
    pub applied: Option<bool>,
}

/// Period-scoped ledger query: adjustments whose effective date falls in
/// `[from, until]`.
pub async fn list_adjustments(query: web::Query<ListAdjustmentsQuery>) -> Result<HttpResponse> {
    let query = query.into_inner();

    let adjustments = ledger::list_for_period(
        query.employee_id,
        query.from,
        query.until,
        query.object_id,
        query.category,
        query.applied,
    )
    .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(adjustments)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnappliedAdjustmentsQuery {
    pub employee_id: Uuid,
    /// Omit for the final-settlement view: everything outstanding up to and
    /// including `until`, unbounded below.
    pub from: Option<NaiveDate>,
    pub until: NaiveDate,
}

pub async fn list_unapplied_adjustments(
    query: web::Query<UnappliedAdjustmentsQuery>,
) -> Result<HttpResponse> {
    let query = query.into_inner();

    let adjustments = ledger::list_unapplied(query.employee_id, query.from, query.until).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(adjustments)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAdjustmentRequest {
    #[serde(flatten)]
    pub input: AdjustmentInput,
    pub actor_id: Uuid,
}

/// Create a manual adjustment; the ledger applies the canonical sign and
/// triggers a recompute of any entry covering the effective date.
pub async fn create_adjustment(input: web::Json<CreateAdjustmentRequest>) -> Result<HttpResponse> {
    let request = input.into_inner();

    let adjustment = ledger::create_categorized(request.input, request.actor_id).await?;

    Ok(HttpResponse::Created().json(ApiResponse::success(adjustment)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAdjustmentRequest {
    #[serde(flatten)]
    pub update: AdjustmentUpdateInput,
    pub actor_id: Uuid,
}

pub async fn update_adjustment(
    path: web::Path<Uuid>,
    input: web::Json<UpdateAdjustmentRequest>,
) -> Result<HttpResponse> {
    let id = path.into_inner();
    let request = input.into_inner();

    let adjustment = ledger::update_adjustment(id, request.update, request.actor_id).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(adjustment)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteAdjustmentQuery {
    pub actor_id: Uuid,
}

pub async fn delete_adjustment(
    path: web::Path<Uuid>,
    query: web::Query<DeleteAdjustmentQuery>,
) -> Result<HttpResponse> {
    let id = path.into_inner();

    ledger::delete_adjustment(id, query.actor_id).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::<()>::success_with_message(
        None,
        "Adjustment deleted",
    )))
}
