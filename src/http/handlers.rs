//! Handlers for `/api/issues/:project`.

use axum::extract::{Path, Query, State};
use issuetrack_lib::query::record_id;
use issuetrack_lib::{Filter, IssueUpdate, NewIssue};
use tracing::{debug, error, info};

use super::AppState;
use super::payload::RequestFields;
use super::response::ApiResponse;

/// `GET`: every issue in the project matching the query parameters.
pub async fn list_issues(
    State(state): State<AppState>,
    Path(project): Path<String>,
    Query(params): Query<Vec<(String, String)>>,
) -> ApiResponse {
    let filter = Filter::for_project(&project).overlay(params);
    debug!(%project, conditions = filter.len(), "listing issues");

    match state.run(move |store| store.find(&filter)).await {
        Ok(issues) => ApiResponse::Issues(issues),
        Err(e) => {
            error!(%project, error = %e, "failed to list issues");
            ApiResponse::ReadFailed
        }
    }
}

/// `POST`: create an issue in the project.
pub async fn create_issue(
    State(state): State<AppState>,
    Path(project): Path<String>,
    RequestFields(fields): RequestFields,
) -> ApiResponse {
    let new_issue = match NewIssue::from_fields(&project, &fields) {
        Ok(new_issue) => new_issue,
        Err(e) => {
            debug!(%project, reason = %e, "create rejected");
            return ApiResponse::MissingRequired;
        }
    };

    match state.run(move |store| store.insert(new_issue)).await {
        Ok(issue) => {
            info!(id = %issue.id, project = %issue.project, "issue created");
            ApiResponse::Created(issue)
        }
        Err(e) => {
            error!(%project, error = %e, "failed to create issue");
            ApiResponse::CreateFailed
        }
    }
}

/// `PUT`: merge the sent fields into the issue named by `_id`.
pub async fn update_issue(
    State(state): State<AppState>,
    RequestFields(fields): RequestFields,
) -> ApiResponse {
    let Some(id) = record_id(&fields) else {
        debug!("update without _id");
        return ApiResponse::MissingId;
    };

    let update = IssueUpdate::from_fields(&fields);
    if update.is_empty() {
        debug!(%id, "update without fields");
        return ApiResponse::NoUpdateFields { id };
    }
    let changed = update.changed_fields();

    let target = id.clone();
    match state
        .run(move |store| store.update_by_id(&target, &update))
        .await
    {
        Ok(_) => {
            info!(%id, fields = ?changed, "issue updated");
            ApiResponse::Updated { id }
        }
        Err(e) if e.is_not_found_like() => {
            debug!(%id, reason = %e, "update target not found");
            ApiResponse::CouldNotUpdate { id }
        }
        Err(e) => {
            error!(%id, error = %e, "failed to update issue");
            ApiResponse::UpdateFailed { id }
        }
    }
}

/// `DELETE`: remove the issue named by `_id`.
pub async fn delete_issue(
    State(state): State<AppState>,
    RequestFields(fields): RequestFields,
) -> ApiResponse {
    let Some(id) = record_id(&fields) else {
        debug!("delete without _id");
        return ApiResponse::MissingId;
    };

    let target = id.clone();
    match state.run(move |store| store.delete_by_id(&target)).await {
        Ok(0) => {
            debug!(%id, "delete target not found");
            ApiResponse::CouldNotDelete { id }
        }
        Ok(_) => {
            info!(%id, "issue deleted");
            ApiResponse::Deleted { id }
        }
        Err(e) if e.is_not_found_like() => {
            debug!(%id, reason = %e, "delete target rejected");
            ApiResponse::CouldNotDelete { id }
        }
        Err(e) => {
            error!(%id, error = %e, "failed to delete issue");
            ApiResponse::DeleteFailed { id }
        }
    }
}
