// src/issue.rs

use std::collections::HashMap;

use actix_web::{web, HttpRequest, HttpResponse};
use chrono::Utc;
use log::{debug, info};
use mongodb::bson::{self, doc};
use serde_json::{json, Map, Value};

use crate::app_state::AppState;
use crate::error::{ApiError, StoreError};
use crate::models::issue::{
    list_filter, required_id, target_id, Issue, IssueUpdate, NewIssue,
};

/// JSON or URL-encoded body. A missing or unreadable body is treated as empty
/// so validation reports what is missing.
pub type IssuePayload =
    Option<web::Either<web::Json<Map<String, Value>>, web::Form<HashMap<String, String>>>>;

fn payload_fields(payload: IssuePayload) -> Map<String, Value> {
    match payload {
        Some(web::Either::Left(body)) => body.into_inner(),
        Some(web::Either::Right(form)) => form
            .into_inner()
            .into_iter()
            .map(|(key, value)| (key, Value::String(value)))
            .collect(),
        None => Map::new(),
    }
}

/// Project names double as collection names.
fn check_project_name(project: &str) -> Result<(), ApiError> {
    if project.contains('$') || project.contains('\0') || project.starts_with("system.") {
        return Err(ApiError::Validation("invalid project"));
    }
    Ok(())
}

/// The `{project}` route segment, or the configured default when there is none.
fn project_for(req: &HttpRequest, data: &AppState) -> Result<String, ApiError> {
    let project = match req.match_info().get("project").map(str::trim) {
        Some(p) if !p.is_empty() => p.to_string(),
        _ => data.config.default_project.clone(),
    };
    check_project_name(&project)?;
    Ok(project)
}

async fn fetch_issue(
    data: &AppState,
    project: &str,
    filter: bson::Document,
) -> Result<Option<Issue>, ApiError> {
    match data.store.find_one(project, filter).await? {
        Some(found) => Ok(Some(Issue::from_document(found)?)),
        None => Ok(None),
    }
}

/// GET /api/issues/{project}
/// Lists issues matching every query-string filter.
pub async fn list_issues(
    req: HttpRequest,
    data: web::Data<AppState>,
    query: web::Query<HashMap<String, String>>,
) -> Result<HttpResponse, ApiError> {
    let project = project_for(&req, &data)?;
    let filter = list_filter(&query)?;
    if data.config.debug_log {
        debug!("list_issues on {} with filter {:?}", project, filter);
    }

    let issues = data
        .store
        .find(&project, filter)
        .await?
        .into_iter()
        .map(Issue::from_document)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(HttpResponse::Ok().json(issues))
}

/// POST /api/issues/{project}
pub async fn create_issue(
    req: HttpRequest,
    data: web::Data<AppState>,
    payload: IssuePayload,
) -> Result<HttpResponse, ApiError> {
    let project = project_for(&req, &data)?;
    let fields = payload_fields(payload);
    if data.config.debug_log {
        debug!("create_issue on {} with payload {:?}", project, fields);
    }

    let new_issue = NewIssue::from_fields(&fields, Utc::now())?;
    let id = data
        .store
        .insert_one(&project, new_issue.to_document()?)
        .await?;

    // Return what the store actually holds.
    let issue = fetch_issue(&data, &project, doc! { "_id": id })
        .await?
        .ok_or_else(|| ApiError::not_found(id.to_hex()))?;

    info!("Issue created in {}: {}", project, id);
    Ok(HttpResponse::Created().json(issue))
}

/// PUT /api/issues/{project}
/// Sets the supplied non-blank fields and refreshes `updated_on`.
pub async fn update_issue(
    req: HttpRequest,
    data: web::Data<AppState>,
    payload: IssuePayload,
) -> Result<HttpResponse, ApiError> {
    let project = project_for(&req, &data)?;
    let fields = payload_fields(payload);
    if data.config.debug_log {
        debug!("update_issue on {} with payload {:?}", project, fields);
    }

    let IssueUpdate { id, mut changes } = IssueUpdate::from_fields(&fields)?;
    let oid = target_id(&id)?;
    let filter = doc! { "_id": oid };

    if data.store.find_one(&project, filter.clone()).await?.is_none() {
        return Err(ApiError::not_found(id));
    }

    let now = bson::to_bson(&Utc::now()).map_err(StoreError::from)?;
    changes.insert("updated_on", now);
    let modified = data.store.update_one(&project, filter.clone(), changes).await?;
    if modified == 0 {
        return Err(ApiError::UpdateFailed { id });
    }

    // Removed between the update and this read.
    let issue = fetch_issue(&data, &project, filter)
        .await?
        .ok_or_else(|| ApiError::not_found(id.clone()))?;

    info!("Issue updated in {}: {}", project, id);
    Ok(HttpResponse::Ok().json(issue))
}

/// DELETE /api/issues/{project}
pub async fn delete_issue(
    req: HttpRequest,
    data: web::Data<AppState>,
    payload: IssuePayload,
) -> Result<HttpResponse, ApiError> {
    let project = project_for(&req, &data)?;
    let fields = payload_fields(payload);
    if data.config.debug_log {
        debug!("delete_issue on {} with payload {:?}", project, fields);
    }

    let id = required_id(&fields)?;
    let filter = doc! { "_id": target_id(&id)? };

    if data.store.find_one(&project, filter.clone()).await?.is_none() {
        return Err(ApiError::not_found(id));
    }
    if data.store.delete_one(&project, filter).await? == 0 {
        return Err(ApiError::not_found(id));
    }

    info!("Issue deleted from {}: {}", project, id);
    Ok(HttpResponse::Ok().json(json!({ "result": "successfully deleted", "_id": id })))
}

/// DELETE /api/issues/{project}/reset
/// Drops every issue in the project. Never falls back to the default project.
/// Answers 200 with a JSON confirmation rather than 204, which cannot carry one.
pub async fn reset_project(
    req: HttpRequest,
    data: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let project = req
        .match_info()
        .get("project")
        .map(str::trim)
        .unwrap_or_default();
    if project.is_empty() {
        return Err(ApiError::Validation("missing project"));
    }
    check_project_name(project)?;

    data.store.drop_collection(project).await?;

    info!("Project reset: {}", project);
    Ok(HttpResponse::Ok().json(json!({ "result": format!("project '{}' reset", project) })))
}
