//! Assignment API Endpoints
//! Mission: Let users upload tasks to admins and admins review them

use crate::app::AppState;
use crate::assignments::models::{
    Assignment, AssignmentStatus, AssignmentView, StatusChangeResponse, UploadRequest,
};
use crate::auth::models::{Claims, Role};
use crate::error::{internal, ApiError};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use chrono::Local;
use serde_json::{json, Value};
use uuid::Uuid;

const UPLOAD_FIELDS: &str = "User name, task, and admin name are required.";

/// Upload endpoint - POST /upload (user only)
///
/// `userId` and `admin` are display names, resolved to accounts here.
pub async fn upload_assignment(
    State(state): State<AppState>,
    payload: Result<Json<UploadRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let Json(payload) =
        payload.map_err(|rejection| ApiError::from_json_rejection(rejection, UPLOAD_FIELDS))?;

    let present = |field: Option<String>| field.filter(|value| !value.trim().is_empty());
    let (Some(user_name), Some(task), Some(admin_name)) = (
        present(payload.user_name),
        present(payload.task),
        present(payload.admin),
    ) else {
        return Err(ApiError::Validation(UPLOAD_FIELDS));
    };

    const SERVER_ERROR: &str = "Server error, could not upload assignment";

    let user = state
        .accounts
        .get_by_name(&user_name, Role::User)
        .map_err(internal(SERVER_ERROR))?
        .ok_or(ApiError::NotFound("User not found"))?;

    let admin = state
        .accounts
        .get_by_name(&admin_name, Role::Admin)
        .map_err(internal(SERVER_ERROR))?
        .ok_or(ApiError::NotFound("Admin not found"))?;

    let assignment = Assignment::pending(user.id, admin.id, task);
    state
        .assignments
        .insert(&assignment)
        .map_err(internal(SERVER_ERROR))?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Assignment uploaded successfully" })),
    ))
}

/// Admin directory - GET /admins (user only)
pub async fn list_admins(State(state): State<AppState>) -> Result<Json<Vec<String>>, ApiError> {
    let names = state
        .accounts
        .list_names(Role::Admin)
        .map_err(internal("Server error, could not fetch admins"))?;

    Ok(Json(names))
}

/// Assignments addressed to the caller - GET /assignments (admin only)
pub async fn view_assignments(
    State(state): State<AppState>,
    claims: Claims,
) -> Result<Json<Vec<AssignmentView>>, ApiError> {
    let admin_id = caller_id(&claims)?;

    let rows = state
        .assignments
        .list_for_admin(admin_id)
        .map_err(internal("Server error, could not fetch assignments"))?;

    Ok(Json(
        rows.into_iter()
            .map(|row| AssignmentView::new(row, &Local))
            .collect(),
    ))
}

/// Accept endpoint - POST /assignments/:id/accept (admin only)
pub async fn accept_assignment(
    State(state): State<AppState>,
    claims: Claims,
    Path(id): Path<String>,
) -> Result<Json<StatusChangeResponse>, ApiError> {
    change_status(
        &state,
        &claims,
        &id,
        AssignmentStatus::Accepted,
        "Assignment accepted successfully",
        "Server error, could not accept assignment",
    )
}

/// Reject endpoint - POST /assignments/:id/reject (admin only)
pub async fn reject_assignment(
    State(state): State<AppState>,
    claims: Claims,
    Path(id): Path<String>,
) -> Result<Json<StatusChangeResponse>, ApiError> {
    change_status(
        &state,
        &claims,
        &id,
        AssignmentStatus::Rejected,
        "Assignment rejected successfully",
        "Server error, could not reject assignment",
    )
}

fn change_status(
    state: &AppState,
    claims: &Claims,
    id: &str,
    status: AssignmentStatus,
    success: &str,
    failure: &'static str,
) -> Result<Json<StatusChangeResponse>, ApiError> {
    let admin_id = caller_id(claims)?;

    let assignment = state
        .assignments
        .set_status(id, admin_id, status)
        .map_err(internal(failure))?
        .ok_or(ApiError::NotFoundOrUnauthorized)?;

    Ok(Json(StatusChangeResponse {
        message: success.to_string(),
        assignment,
    }))
}

fn caller_id(claims: &Claims) -> Result<Uuid, ApiError> {
    claims
        .account_id()
        .ok_or(ApiError::Unauthenticated("Invalid token"))
}
