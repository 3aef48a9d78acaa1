use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;

use super::billing::InvoiceId;
use super::deposits::DepositId;
use super::leases::LeaseId;
use super::policy::{Actor, ActorRole};
use super::repository::{RentalRepository, RepositoryError, TransitionNotifier};
use super::service::{BackOffice, BackOfficeError};
use super::tickets::{ChangelogId, IssueId};

/// Router builder exposing the back-office creation and transition endpoints.
pub fn rental_router<R, N>(service: Arc<BackOffice<R, N>>) -> Router
where
    R: RentalRepository + 'static,
    N: TransitionNotifier + 'static,
{
    Router::new()
        .route("/api/v1/leases", post(create_lease::<R, N>))
        .route("/api/v1/leases/:id", get(get_lease::<R, N>))
        .route(
            "/api/v1/leases/:id/transitions",
            post(transition_lease::<R, N>),
        )
        .route("/api/v1/issues", post(create_issue::<R, N>))
        .route("/api/v1/issues/:id", get(get_issue::<R, N>))
        .route(
            "/api/v1/issues/:id/transitions",
            post(transition_issue::<R, N>),
        )
        .route("/api/v1/changelogs", post(create_changelog::<R, N>))
        .route("/api/v1/changelogs/:id", get(get_changelog::<R, N>))
        .route(
            "/api/v1/changelogs/:id/transitions",
            post(transition_changelog::<R, N>),
        )
        .route("/api/v1/invoices", post(create_invoice::<R, N>))
        .route("/api/v1/invoices/:id", get(get_invoice::<R, N>))
        .route(
            "/api/v1/invoices/:id/transitions",
            post(transition_invoice::<R, N>),
        )
        .route("/api/v1/deposits", post(create_deposit::<R, N>))
        .route("/api/v1/deposits/:id", get(get_deposit::<R, N>))
        .route(
            "/api/v1/deposits/:id/settlement",
            post(settle_deposit::<R, N>),
        )
        .with_state(service)
}

fn actor_from_headers(headers: &HeaderMap) -> Actor {
    let id = headers
        .get("x-actor-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("anonymous")
        .to_string();
    let role = match headers
        .get("x-actor-role")
        .and_then(|value| value.to_str().ok())
    {
        Some("administrator") => ActorRole::Administrator,
        Some("tenant") => ActorRole::Tenant,
        _ => ActorRole::BackOffice,
    };
    Actor { id, role }
}

fn error_response(error: BackOfficeError) -> Response {
    let status = match &error {
        BackOfficeError::Forbidden { .. } => StatusCode::FORBIDDEN,
        BackOfficeError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        BackOfficeError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        BackOfficeError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
        BackOfficeError::Lease(_)
        | BackOfficeError::Invoice(_)
        | BackOfficeError::Issue(_)
        | BackOfficeError::Changelog(_)
        | BackOfficeError::Deposit(_) => StatusCode::UNPROCESSABLE_ENTITY,
    };
    let payload = json!({ "error": error.to_string() });
    (status, Json(payload)).into_response()
}

fn respond<T: serde::Serialize>(
    result: Result<T, BackOfficeError>,
    created: StatusCode,
) -> Response {
    match result {
        Ok(entity) => (created, Json(entity)).into_response(),
        Err(error) => error_response(error),
    }
}

// ── Leases ──────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub(crate) struct LeaseForm {
    pub tenant: String,
    pub starts_on: NaiveDate,
    pub ends_on: NaiveDate,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum LeaseTarget {
    Quotation,
    Option,
    Confirmed,
    Cancelled,
    Finalized,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LeaseTransitionForm {
    pub target: LeaseTarget,
    #[serde(default)]
    pub reason: Option<String>,
}

async fn create_lease<R, N>(
    State(service): State<Arc<BackOffice<R, N>>>,
    Json(form): Json<LeaseForm>,
) -> Response
where
    R: RentalRepository + 'static,
    N: TransitionNotifier + 'static,
{
    respond(
        service.register_lease(form.tenant, form.starts_on, form.ends_on),
        StatusCode::CREATED,
    )
}

async fn get_lease<R, N>(
    State(service): State<Arc<BackOffice<R, N>>>,
    Path(id): Path<String>,
) -> Response
where
    R: RentalRepository + 'static,
    N: TransitionNotifier + 'static,
{
    respond(service.lease(&LeaseId(id)), StatusCode::OK)
}

async fn transition_lease<R, N>(
    State(service): State<Arc<BackOffice<R, N>>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(form): Json<LeaseTransitionForm>,
) -> Response
where
    R: RentalRepository + 'static,
    N: TransitionNotifier + 'static,
{
    let actor = actor_from_headers(&headers);
    let id = LeaseId(id);
    let result = match form.target {
        LeaseTarget::Quotation => service.quote_lease(&actor, &id),
        LeaseTarget::Option => service.option_lease(&actor, &id),
        LeaseTarget::Confirmed => service.confirm_lease(&actor, &id),
        LeaseTarget::Cancelled => service.cancel_lease(&actor, &id, form.reason),
        LeaseTarget::Finalized => service.finalize_lease(&actor, &id),
    };
    respond(result, StatusCode::OK)
}

// ── Issues and changelogs ───────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub(crate) struct IssueForm {
    pub summary: String,
    pub reported_by: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChangelogForm {
    pub title: String,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum TicketTarget {
    Open,
    Closed,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TicketTransitionForm {
    pub target: TicketTarget,
}

async fn create_issue<R, N>(
    State(service): State<Arc<BackOffice<R, N>>>,
    Json(form): Json<IssueForm>,
) -> Response
where
    R: RentalRepository + 'static,
    N: TransitionNotifier + 'static,
{
    respond(
        service.report_issue(form.summary, form.reported_by),
        StatusCode::CREATED,
    )
}

async fn get_issue<R, N>(
    State(service): State<Arc<BackOffice<R, N>>>,
    Path(id): Path<String>,
) -> Response
where
    R: RentalRepository + 'static,
    N: TransitionNotifier + 'static,
{
    respond(service.issue(&IssueId(id)), StatusCode::OK)
}

async fn transition_issue<R, N>(
    State(service): State<Arc<BackOffice<R, N>>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(form): Json<TicketTransitionForm>,
) -> Response
where
    R: RentalRepository + 'static,
    N: TransitionNotifier + 'static,
{
    let actor = actor_from_headers(&headers);
    let id = IssueId(id);
    let result = match form.target {
        TicketTarget::Closed => service.close_issue(&actor, &id),
        TicketTarget::Open => service.reopen_issue(&actor, &id),
    };
    respond(result, StatusCode::OK)
}

async fn create_changelog<R, N>(
    State(service): State<Arc<BackOffice<R, N>>>,
    Json(form): Json<ChangelogForm>,
) -> Response
where
    R: RentalRepository + 'static,
    N: TransitionNotifier + 'static,
{
    respond(service.record_changelog(form.title), StatusCode::CREATED)
}

async fn get_changelog<R, N>(
    State(service): State<Arc<BackOffice<R, N>>>,
    Path(id): Path<String>,
) -> Response
where
    R: RentalRepository + 'static,
    N: TransitionNotifier + 'static,
{
    respond(service.changelog(&ChangelogId(id)), StatusCode::OK)
}

async fn transition_changelog<R, N>(
    State(service): State<Arc<BackOffice<R, N>>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(form): Json<TicketTransitionForm>,
) -> Response
where
    R: RentalRepository + 'static,
    N: TransitionNotifier + 'static,
{
    let actor = actor_from_headers(&headers);
    let id = ChangelogId(id);
    let result = match form.target {
        TicketTarget::Closed => service.close_changelog(&actor, &id),
        TicketTarget::Open => service.reopen_changelog(&actor, &id),
    };
    respond(result, StatusCode::OK)
}

// ── Invoices and deposits ───────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub(crate) struct InvoiceForm {
    pub lease_id: String,
    pub amount: Decimal,
    #[serde(default)]
    pub quotation: bool,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum InvoiceTarget {
    Quotation,
    QuotationDeclined,
    Open,
    Paid,
    Void,
    Uncollected,
}

#[derive(Debug, Deserialize)]
pub(crate) struct InvoiceTransitionForm {
    pub target: InvoiceTarget,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DepositForm {
    pub lease_id: String,
    pub paid_amount: Decimal,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SettlementForm {
    pub revoked_amount: Decimal,
}

async fn create_invoice<R, N>(
    State(service): State<Arc<BackOffice<R, N>>>,
    Json(form): Json<InvoiceForm>,
) -> Response
where
    R: RentalRepository + 'static,
    N: TransitionNotifier + 'static,
{
    let lease_id = LeaseId(form.lease_id);
    let result = if form.quotation {
        service.request_quotation(lease_id, form.amount)
    } else {
        service.draft_invoice(lease_id, form.amount)
    };
    respond(result, StatusCode::CREATED)
}

async fn get_invoice<R, N>(
    State(service): State<Arc<BackOffice<R, N>>>,
    Path(id): Path<String>,
) -> Response
where
    R: RentalRepository + 'static,
    N: TransitionNotifier + 'static,
{
    respond(service.invoice(&InvoiceId(id)), StatusCode::OK)
}

async fn transition_invoice<R, N>(
    State(service): State<Arc<BackOffice<R, N>>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(form): Json<InvoiceTransitionForm>,
) -> Response
where
    R: RentalRepository + 'static,
    N: TransitionNotifier + 'static,
{
    let actor = actor_from_headers(&headers);
    let id = InvoiceId(id);
    let result = match form.target {
        InvoiceTarget::Quotation => service.send_quotation(&actor, &id),
        InvoiceTarget::QuotationDeclined => service.decline_quotation(&actor, &id),
        InvoiceTarget::Open => service.open_invoice(&actor, &id),
        InvoiceTarget::Paid => service.mark_invoice_paid(&actor, &id),
        InvoiceTarget::Void => service.mark_invoice_void(&actor, &id),
        InvoiceTarget::Uncollected => service.mark_invoice_uncollected(&actor, &id),
    };
    respond(result, StatusCode::OK)
}

async fn create_deposit<R, N>(
    State(service): State<Arc<BackOffice<R, N>>>,
    Json(form): Json<DepositForm>,
) -> Response
where
    R: RentalRepository + 'static,
    N: TransitionNotifier + 'static,
{
    respond(
        service.register_deposit(LeaseId(form.lease_id), form.paid_amount),
        StatusCode::CREATED,
    )
}

async fn get_deposit<R, N>(
    State(service): State<Arc<BackOffice<R, N>>>,
    Path(id): Path<String>,
) -> Response
where
    R: RentalRepository + 'static,
    N: TransitionNotifier + 'static,
{
    respond(service.deposit(&DepositId(id)), StatusCode::OK)
}

async fn settle_deposit<R, N>(
    State(service): State<Arc<BackOffice<R, N>>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(form): Json<SettlementForm>,
) -> Response
where
    R: RentalRepository + 'static,
    N: TransitionNotifier + 'static,
{
    let actor = actor_from_headers(&headers);
    respond(
        service.settle_deposit(&actor, &DepositId(id), form.revoked_amount),
        StatusCode::OK,
    )
}
