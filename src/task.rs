// src/task.rs

use actix_web::{web, Responder};
use chrono::{DateTime, Utc};
use futures_util::StreamExt;
use log::{debug, error, info, warn};
use mongodb::bson::{doc, oid::ObjectId, Bson, Document};
use mongodb::options::ReturnDocument;
use mongodb::Collection;
use serde::{Deserialize, Serialize};

use crate::app_state::AppState;
use crate::response::{self, Page, ServiceResponse};
use crate::sanity_checks;

/// Task type that requires at least one tag.
pub const TASK_TYPE_OTHER: &str = "other";

const DEFAULT_PAGE: u64 = 1;
const DEFAULT_LIMIT: u64 = 10;

/// Recognized task statuses. A task starts `active` and can only ever
/// move to `inactive` (soft delete); there is no way back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Active,
    Inactive,
}

impl TaskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Active => "active",
            TaskStatus::Inactive => "inactive",
        }
    }
}

impl Default for TaskStatus {
    fn default() -> Self {
        TaskStatus::Active
    }
}

/// The user reference stored on a task (`createdBy` / `updatedBy`).
/// Extra fields sent by the client are tolerated and dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRef {
    #[serde(default)]
    pub user_id: String,
}

/// A task document in the `tasks` collection.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    pub task_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_description: Option<String>,

    /// e.g. "work", "errand", or the special "other"
    pub task_type: String,
    #[serde(default)]
    pub tags: Vec<String>,

    /// The user who created the task; owner for listing purposes.
    pub created_by: UserRef,
    /// Set equal to `createdBy` at creation.
    pub updated_by: UserRef,

    /// The folder this task sits in, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder_id: Option<ObjectId>,

    #[serde(default)]
    pub status: TaskStatus,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request payload for creating a task
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    #[serde(default)]
    pub task_name: String,
    pub task_description: Option<String>,
    #[serde(default)]
    pub task_type: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_by: Option<UserRef>,
}

/// Request payload for soft-deleting a task
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeTaskStatusRequest {
    #[serde(default)]
    pub task_id: String,
    pub created_by: Option<UserRef>,
}

/// Request payload for attaching/detaching a task and a folder
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderTaskRequest {
    #[serde(default)]
    pub folder_id: String,
    #[serde(default)]
    pub task_id: String,
    pub created_by: Option<UserRef>,
}

#[derive(Debug, Deserialize)]
pub struct TaskListQuery {
    pub uid: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FolderTasksQuery {
    pub uid: Option<String>,
    pub fid: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

/// Helper: get the tasks collection
fn tasks_coll(state: &AppState) -> Collection<Task> {
    state
        .mongodb
        .client
        .database(&state.config.database_name)
        .collection("tasks")
}

/// Validates a create request and builds the task to persist.
/// Returns `None` when the payload is unusable.
fn build_task(body: &CreateTaskRequest) -> Option<Task> {
    let created_by = body.created_by.as_ref()?;
    if !sanity_checks::is_valid_string(&body.task_name)
        || !sanity_checks::is_valid_string(&created_by.user_id)
        || !sanity_checks::is_valid_string(&body.task_type)
        || (body.task_type == TASK_TYPE_OTHER && !sanity_checks::is_valid_array(&body.tags))
    {
        return None;
    }

    let now = Utc::now();
    Some(Task {
        id: None,
        task_name: body.task_name.clone(),
        task_description: body.task_description.clone(),
        task_type: body.task_type.clone(),
        tags: body.tags.clone(),
        created_by: created_by.clone(),
        updated_by: created_by.clone(),
        folder_id: None,
        status: TaskStatus::Active,
        created_at: now,
        updated_at: now,
    })
}

/// Tasks owned by a user, excluding soft-deleted ones.
fn owned_tasks_filter(user_id: &str) -> Document {
    doc! {
        "createdBy.userId": user_id,
        "status": { "$ne": TaskStatus::Inactive.as_str() },
    }
}

/// Active tasks of a user sitting in a given folder.
fn folder_tasks_filter(user_id: &str, folder_id: ObjectId) -> Document {
    doc! {
        "folderId": folder_id,
        "status": TaskStatus::Active.as_str(),
        "createdBy.userId": user_id,
    }
}

/// Matches the task only while it has not been soft-deleted yet, so the
/// active -> inactive transition is enforced by the filter itself and a
/// second call simply matches nothing.
fn deactivate_filter(task_id: ObjectId) -> Document {
    doc! {
        "_id": task_id,
        "status": { "$ne": TaskStatus::Inactive.as_str() },
    }
}

fn deactivate_update() -> Document {
    doc! { "$set": { "status": TaskStatus::Inactive.as_str() } }
}

/// Folder attach requires the task to be active.
fn attach_filter(task_id: ObjectId) -> Document {
    doc! {
        "_id": task_id,
        "status": TaskStatus::Active.as_str(),
    }
}

fn attach_update(folder_id: ObjectId) -> Document {
    doc! { "$set": { "folderId": folder_id } }
}

/// Folder detach requires the task to currently sit in that exact folder.
fn detach_filter(task_id: ObjectId, folder_id: ObjectId) -> Document {
    doc! {
        "_id": task_id,
        "folderId": folder_id,
    }
}

fn detach_update() -> Document {
    doc! { "$set": { "folderId": Bson::Null } }
}

fn page_count(total: u64, limit: u64) -> u64 {
    total.div_ceil(limit.max(1))
}

fn page_offset(page: u64, limit: u64) -> u64 {
    page.saturating_sub(1).saturating_mul(limit)
}

/// The driver takes a signed limit; clamp instead of wrapping.
fn page_limit(limit: u64) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

/// Runs a paginated find: one count plus one skip/limit query.
async fn paginate(
    coll: &Collection<Task>,
    filter: Document,
    page: u64,
    limit: u64,
) -> mongodb::error::Result<Page<Task>> {
    let total = coll.count_documents(filter.clone()).await?;
    let mut cursor = coll
        .find(filter)
        .skip(page_offset(page, limit))
        .limit(page_limit(limit))
        .await?;

    let mut data = Vec::new();
    while let Some(task) = cursor.next().await {
        data.push(task?);
    }

    Ok(Page {
        data,
        total,
        pages: page_count(total, limit),
        page,
        limit,
    })
}

fn user_id_of(created_by: &Option<UserRef>) -> &str {
    created_by.as_ref().map(|u| u.user_id.as_str()).unwrap_or("")
}

/// POST /tasks
pub async fn create_task(
    data: web::Data<AppState>,
    payload: web::Json<CreateTaskRequest>,
) -> impl Responder {
    let body = payload.into_inner();
    let task = match build_task(&body) {
        Some(task) => task,
        None => {
            error!(
                "Missing info in create_task: taskName: {:?}. taskType: {:?}. tags: {:?}. createdBy: {:?}",
                body.task_name, body.task_type, body.tags, body.created_by
            );
            return ServiceResponse::<Task>::PayloadError.into_http();
        }
    };

    match tasks_coll(&data).insert_one(&task).await {
        Ok(res) => {
            let mut saved = task;
            saved.id = res.inserted_id.as_object_id();
            info!("Task created: {:?}", saved.id);
            ServiceResponse::Success(Some(saved)).into_http()
        }
        Err(e) => {
            error!("Error inserting task: {}", e);
            ServiceResponse::<Task>::ServerError.into_http()
        }
    }
}

/// GET /tasks?uid=&page=&limit=&status=
pub async fn get_all_tasks(
    data: web::Data<AppState>,
    query: web::Query<TaskListQuery>,
) -> impl Responder {
    let q = query.into_inner();
    let uid = q.uid.unwrap_or_default();
    if !sanity_checks::is_valid_string(&uid) {
        error!("Missing info in get_all_tasks: uid: {:?}", uid);
        return ServiceResponse::<Task>::PayloadError.into_http();
    }

    // The status param is accepted but never shapes the filter; listing
    // always excludes inactive tasks.
    // TODO: filter by the requested status once the intended semantics are settled
    if let Some(status) = &q.status {
        debug!("get_all_tasks: ignoring status param {:?}", status);
    }

    let page = q.page.unwrap_or(DEFAULT_PAGE);
    let limit = q.limit.unwrap_or(DEFAULT_LIMIT);
    match paginate(&tasks_coll(&data), owned_tasks_filter(&uid), page, limit).await {
        Ok(result) => ServiceResponse::SuccessPage(result).into_http(),
        Err(e) => {
            error!("Error in get_all_tasks: {}", e);
            ServiceResponse::<Task>::ServerError.into_http()
        }
    }
}

/// PUT /tasks: task editing is not wired up.
pub async fn edit_task() -> impl Responder {
    warn!("edit_task called; no edit behavior exists");
    response::not_implemented()
}

/// PATCH /tasks/status: soft delete.
pub async fn change_task_status(
    data: web::Data<AppState>,
    payload: web::Json<ChangeTaskStatusRequest>,
) -> impl Responder {
    let body = payload.into_inner();
    let user_id = user_id_of(&body.created_by);
    if !sanity_checks::is_valid_string(&body.task_id) || !sanity_checks::is_valid_string(user_id) {
        error!(
            "Missing info in change_task_status: taskId: {:?}. createdBy: {:?}",
            body.task_id, body.created_by
        );
        return ServiceResponse::<Task>::PayloadError.into_http();
    }

    // taskId is only checked for presence above; an unparsable id is
    // surfaced as a server fault.
    let task_id = match ObjectId::parse_str(&body.task_id) {
        Ok(oid) => oid,
        Err(e) => {
            error!("Unparsable taskId in change_task_status: {}", e);
            return ServiceResponse::<Task>::ServerError.into_http();
        }
    };

    match tasks_coll(&data)
        .find_one_and_update(deactivate_filter(task_id), deactivate_update())
        .return_document(ReturnDocument::After)
        .await
    {
        Ok(Some(task)) => {
            info!("Task {} set inactive", task_id);
            ServiceResponse::Success(Some(task)).into_http()
        }
        Ok(None) => ServiceResponse::<Task>::NotFoundError.into_http(),
        Err(e) => {
            error!("Error in change_task_status: {}", e);
            ServiceResponse::<Task>::ServerError.into_http()
        }
    }
}

/// GET /tasks/folder?uid=&fid=&page=&limit=
pub async fn get_folder_associated_tasks(
    data: web::Data<AppState>,
    query: web::Query<FolderTasksQuery>,
) -> impl Responder {
    let q = query.into_inner();
    let uid = q.uid.unwrap_or_default();
    let fid = q.fid.unwrap_or_default();
    let folder_id = match ObjectId::parse_str(&fid) {
        Ok(oid) if sanity_checks::is_valid_object_id(&uid) => oid,
        _ => {
            error!(
                "Missing info in get_folder_associated_tasks: uid: {:?}. fid: {:?}",
                uid, fid
            );
            return ServiceResponse::<Task>::PayloadError.into_http();
        }
    };

    let page = q.page.unwrap_or(DEFAULT_PAGE);
    let limit = q.limit.unwrap_or(DEFAULT_LIMIT);
    match paginate(
        &tasks_coll(&data),
        folder_tasks_filter(&uid, folder_id),
        page,
        limit,
    )
    .await
    {
        Ok(result) => ServiceResponse::SuccessPage(result).into_http(),
        Err(e) => {
            error!("Error in get_folder_associated_tasks: {}", e);
            ServiceResponse::<Task>::ServerError.into_http()
        }
    }
}

/// POST /tasks/folder: put an active task into a folder.
/// `createdBy` is shape-checked only; ownership of the task is not
/// verified against it.
pub async fn add_task_in_folder(
    data: web::Data<AppState>,
    payload: web::Json<FolderTaskRequest>,
) -> impl Responder {
    let body = payload.into_inner();
    let user_id = user_id_of(&body.created_by);
    let (folder_id, task_id) = match (
        ObjectId::parse_str(&body.folder_id),
        ObjectId::parse_str(&body.task_id),
    ) {
        (Ok(f), Ok(t)) if sanity_checks::is_valid_object_id(user_id) => (f, t),
        _ => {
            error!(
                "Missing info in add_task_in_folder: folderId: {:?}. taskId: {:?}. createdBy: {:?}",
                body.folder_id, body.task_id, body.created_by
            );
            return ServiceResponse::<Task>::PayloadError.into_http();
        }
    };

    match tasks_coll(&data)
        .find_one_and_update(attach_filter(task_id), attach_update(folder_id))
        .await
    {
        Ok(Some(_)) => {
            info!("Task {} moved into folder {}", task_id, folder_id);
            ServiceResponse::<Task>::Success(None).into_http()
        }
        Ok(None) => ServiceResponse::<Task>::NotFoundError.into_http(),
        Err(e) => {
            error!("Error in add_task_in_folder: {}", e);
            ServiceResponse::<Task>::ServerError.into_http()
        }
    }
}

/// DELETE /tasks/folder: take a task out of the folder it sits in.
pub async fn remove_task_from_folder(
    data: web::Data<AppState>,
    payload: web::Json<FolderTaskRequest>,
) -> impl Responder {
    let body = payload.into_inner();
    let user_id = user_id_of(&body.created_by);
    let folder_id = match ObjectId::parse_str(&body.folder_id) {
        Ok(oid) if sanity_checks::is_valid_object_id(user_id) => oid,
        _ => {
            error!(
                "Missing info in remove_task_from_folder: folderId: {:?}. createdBy: {:?}",
                body.folder_id, body.created_by
            );
            return ServiceResponse::<Task>::PayloadError.into_http();
        }
    };

    // taskId is not shape-checked, it only appears in the filter; an
    // unparsable value is surfaced as a server fault.
    let task_id = match ObjectId::parse_str(&body.task_id) {
        Ok(oid) => oid,
        Err(e) => {
            error!("Unparsable taskId in remove_task_from_folder: {}", e);
            return ServiceResponse::<Task>::ServerError.into_http();
        }
    };

    match tasks_coll(&data)
        .find_one_and_update(detach_filter(task_id, folder_id), detach_update())
        .await
    {
        Ok(Some(_)) => {
            info!("Task {} removed from folder {}", task_id, folder_id);
            ServiceResponse::<Task>::Success(None).into_http()
        }
        Ok(None) => ServiceResponse::<Task>::NotFoundError.into_http(),
        Err(e) => {
            error!("Error in remove_task_from_folder: {}", e);
            ServiceResponse::<Task>::ServerError.into_http()
        }
    }
}
