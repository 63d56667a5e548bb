use actix_web::{
    delete, get, post, put,
    web::{Json, Path, Query},
};

use common::{
    api::issue::{CreateIssueResponse, IssueResponse, PublicIssue},
    context::GeneralContext,
    error,
};

use crate::handlers::payload::IssueBody;
use crate::service::issue::{ChangeIssue, CreateIssue, DeleteIssue, IssueFilter, IssueService};

// Bodies go through `IssueBody`: JSON or form, missing fields left unset,
// so the caller always gets one of the documented payloads.

#[utoipa::path(
    params(
        ("project" = String, Path, description = "Project name"),
        IssueFilter,
    ),
    responses(
        (status = 200, body = [PublicIssue])
    )
)]
#[get("/issues/{project}")]
pub async fn get_issues(
    context: GeneralContext,
    project: Path<String>,
    Query(filter): Query<IssueFilter>,
) -> error::Result<Json<Vec<PublicIssue>>> {
    Ok(Json(
        IssueService::new(context)
            .find_all(project.into_inner(), filter)
            .await?,
    ))
}

#[utoipa::path(
    params(
        ("project" = String, Path, description = "Project name"),
    ),
    request_body(
        content = CreateIssue
    ),
    responses(
        (status = 200, description = "Created issue, or {error: \"required field(s) missing\"}", body = PublicIssue)
    )
)]
#[post("/issues/{project}")]
pub async fn post_issue(
    context: GeneralContext,
    project: Path<String>,
    data: IssueBody<CreateIssue>,
) -> error::Result<Json<CreateIssueResponse>> {
    let data = data.into_inner();
    Ok(Json(
        IssueService::new(context)
            .create(project.into_inner(), data)
            .await?,
    ))
}

#[utoipa::path(
    params(
        ("project" = String, Path, description = "Project name"),
    ),
    request_body(
        content = ChangeIssue
    ),
    responses(
        (status = 200, body = IssueResponse)
    )
)]
#[put("/issues/{project}")]
pub async fn put_issue(
    context: GeneralContext,
    _project: Path<String>,
    data: IssueBody<ChangeIssue>,
) -> error::Result<Json<IssueResponse>> {
    let data = data.into_inner();
    Ok(Json(IssueService::new(context).change(data).await?))
}

#[utoipa::path(
    params(
        ("project" = String, Path, description = "Project name"),
    ),
    request_body(
        content = DeleteIssue
    ),
    responses(
        (status = 200, body = IssueResponse)
    )
)]
#[delete("/issues/{project}")]
pub async fn delete_issue(
    context: GeneralContext,
    _project: Path<String>,
    data: IssueBody<DeleteIssue>,
) -> error::Result<Json<IssueResponse>> {
    let data = data.into_inner();
    Ok(Json(IssueService::new(context).delete(data).await?))
}
