//! `/admin/*`. Every handler takes [`AdminUser`], so non-admins get 403
//! before any work is done.

use std::str::FromStr;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use domains::{
    Artwork, Comment, ContentAction, DetailedStats, DomainError, ExportQuery, LogQuery,
    ModerationAction, ModerationLog, Page, Role, Stats, TargetType, User, UserStatus,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use services::moderation::Moderated;
use services::UsersCsv;

use crate::error::{ApiError, ApiResult};
use crate::extract::{AdminUser, ApiJson, ApiPath, ApiQuery, Pagination};
use crate::state::AppState;

/// What admins see of an account, including moderation state.
#[derive(Debug, Serialize)]
pub struct AdminUserView {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub role: Role,
    pub status: UserStatus,
    pub ban_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<&User> for AdminUserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            username: user.username.clone(),
            role: user.role,
            status: user.status,
            ban_reason: user.ban_reason.clone(),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct StatusBody {
    pub status: String,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct BanBody {
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FeatureBody {
    pub featured: bool,
}

#[derive(Debug, Deserialize)]
pub struct ModerateBody {
    pub action: String,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ExportParams {
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LogSearchParams {
    pub target_type: Option<String>,
    pub action: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

fn parse<T>(raw: Option<&str>) -> ApiResult<Option<T>>
where
    T: FromStr<Err = DomainError>,
{
    Ok(raw.map(str::parse).transpose()?)
}

#[derive(Clone, Copy)]
enum Bound {
    Start,
    End,
}

/// RFC 3339, or a bare `YYYY-MM-DD` taken as the start or end of that day
/// in UTC.
fn parse_date(field: &str, raw: &str, bound: Bound) -> ApiResult<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
        ApiError::bad_request(format!("`{field}` must be YYYY-MM-DD or RFC 3339"))
    })?;
    let time = match bound {
        Bound::Start => NaiveTime::MIN,
        Bound::End => NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN),
    };
    Ok(date.and_time(time).and_utc())
}

impl LogSearchParams {
    fn into_query(self) -> ApiResult<LogQuery> {
        let start = self
            .start_date
            .as_deref()
            .map(|raw| parse_date("start_date", raw, Bound::Start))
            .transpose()?;
        let end = self
            .end_date
            .as_deref()
            .map(|raw| parse_date("end_date", raw, Bound::End))
            .transpose()?;
        Ok(LogQuery {
            target_type: parse::<TargetType>(self.target_type.as_deref())?,
            action: parse::<ModerationAction>(self.action.as_deref())?,
            start,
            end,
            page: Some(Page::new(self.skip.unwrap_or(0), self.limit.unwrap_or(100))),
        })
    }
}

fn moderated<T: Serialize>(
    outcome: Moderated<T>,
    key: &str,
    deleted: &str,
) -> ApiResult<Json<Value>> {
    let mut body = Map::new();
    match outcome {
        Moderated::Updated(item) => {
            body.insert("message".into(), json!("Moderation applied"));
            let item = serde_json::to_value(item).map_err(DomainError::internal)?;
            body.insert(key.into(), item);
        }
        Moderated::Deleted => {
            body.insert("message".into(), json!(deleted));
        }
    }
    Ok(Json(Value::Object(body)))
}

pub async fn users(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    ApiQuery(pagination): ApiQuery<Pagination>,
) -> ApiResult<Json<Vec<AdminUserView>>> {
    let users = state
        .moderation
        .list_users(&admin, pagination.page(100))
        .await?;
    Ok(Json(users.iter().map(AdminUserView::from).collect()))
}

pub async fn set_status(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    ApiPath(id): ApiPath<i64>,
    ApiJson(body): ApiJson<StatusBody>,
) -> ApiResult<Json<AdminUserView>> {
    let status: UserStatus = body.status.parse()?;
    let user = state
        .moderation
        .set_status(&admin, id, status, body.reason)
        .await?;
    Ok(Json(AdminUserView::from(&user)))
}

pub async fn ban(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    ApiPath(id): ApiPath<i64>,
    ApiJson(body): ApiJson<BanBody>,
) -> ApiResult<Json<AdminUserView>> {
    let user = state.moderation.ban(&admin, id, body.reason).await?;
    Ok(Json(AdminUserView::from(&user)))
}

pub async fn unban(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<AdminUserView>> {
    let user = state.moderation.unban(&admin, id).await?;
    Ok(Json(AdminUserView::from(&user)))
}

pub async fn delete_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<StatusCode> {
    state.moderation.delete_user(&admin, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// CSV attachment named after the generation time.
pub async fn export_users(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    ApiQuery(params): ApiQuery<ExportParams>,
) -> ApiResult<Response> {
    let query = ExportQuery {
        search: params.search.filter(|s| !s.trim().is_empty()),
        sort: parse(params.sort_by.as_deref())?.unwrap_or_default(),
        order: parse(params.sort_order.as_deref())?.unwrap_or_default(),
    };
    let rows = state.moderation.export_users(&admin, query).await?;
    let csv = UsersCsv::render(&rows, Utc::now())?;
    let disposition = format!("attachment; filename=\"{}\"", csv.file_name);
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        csv.body,
    )
        .into_response())
}

pub async fn feature(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    ApiPath(id): ApiPath<i64>,
    ApiJson(body): ApiJson<FeatureBody>,
) -> ApiResult<Json<Artwork>> {
    Ok(Json(
        state.moderation.feature(&admin, id, body.featured).await?,
    ))
}

pub async fn moderate_artwork(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    ApiPath(id): ApiPath<i64>,
    ApiJson(body): ApiJson<ModerateBody>,
) -> ApiResult<Json<Value>> {
    let action: ContentAction = body.action.parse()?;
    let outcome: Moderated<Artwork> = state
        .moderation
        .moderate_artwork(&admin, id, action, body.reason)
        .await?;
    moderated(outcome, "artwork", "Artwork deleted")
}

pub async fn moderate_comment(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    ApiPath(id): ApiPath<i64>,
    ApiJson(body): ApiJson<ModerateBody>,
) -> ApiResult<Json<Value>> {
    let action: ContentAction = body.action.parse()?;
    let outcome: Moderated<Comment> = state
        .moderation
        .moderate_comment(&admin, id, action, body.reason)
        .await?;
    moderated(outcome, "comment", "Comment deleted")
}

pub async fn stats(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
) -> ApiResult<Json<Stats>> {
    Ok(Json(state.moderation.stats(&admin).await?))
}

pub async fn detailed_stats(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
) -> ApiResult<Json<DetailedStats>> {
    Ok(Json(state.moderation.detailed_stats(&admin).await?))
}

pub async fn logs(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    ApiQuery(pagination): ApiQuery<Pagination>,
) -> ApiResult<Json<Vec<ModerationLog>>> {
    Ok(Json(
        state
            .moderation
            .logs(&admin, pagination.page(100))
            .await?,
    ))
}

pub async fn search_logs(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    ApiQuery(params): ApiQuery<LogSearchParams>,
) -> ApiResult<Json<Vec<ModerationLog>>> {
    let query = params.into_query()?;
    Ok(Json(state.moderation.search_logs(&admin, query).await?))
}
