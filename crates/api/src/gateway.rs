//! One method per Everhour operation.
//!
//! Payloads are passed through as JSON values; the gateway only knows paths, verbs and the few
//! responses that need special treatment.

use crate::config::{ApiVersion, ClientConfig};
use crate::error::{ApiError, Result, UpstreamError};
use crate::routes::Routes;
use crate::transport::{ApiRequest, HttpTransport, Transport};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::debug;

/// Projects fetched by [`Gateway::list_all_sections`].
pub const ALL_SECTIONS_PROJECT_LIMIT: u64 = 20;
/// Projects actually scanned for sections, out of those fetched.
pub const ALL_SECTIONS_SCAN_LIMIT: usize = 10;

const SCHEDULE: &str = "Schedule/Resource Planning";

#[derive(Clone)]
pub struct Gateway {
    transport: Arc<dyn Transport>,
    routes: Routes,
}

impl std::fmt::Debug for Gateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateway")
            .field("api_version", &self.routes.version())
            .finish_non_exhaustive()
    }
}

impl Gateway {
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>, version: ApiVersion) -> Self {
        Self {
            transport,
            routes: Routes::new(version),
        }
    }

    /// Build a gateway over the reqwest transport.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Config`] if the client configuration is unusable.
    pub fn from_config(config: &ClientConfig, version: ApiVersion) -> Result<Self> {
        let transport = HttpTransport::new(config)?;
        Ok(Self::new(Arc::new(transport), version))
    }

    #[must_use]
    pub fn api_version(&self) -> ApiVersion {
        self.routes.version()
    }

    async fn call(&self, request: ApiRequest) -> Result<Value> {
        if request.has_empty_segment() {
            return Err(ApiError::InvalidArgument(format!(
                "blank id in {} {}",
                request.method, request.path
            )));
        }
        let response = self.transport.send(request).await?;
        if response.status.is_success() {
            Ok(response.body)
        } else {
            Err(ApiError::Upstream(UpstreamError::from_body(
                response.status.as_u16(),
                &response.body,
            )))
        }
    }

    async fn call_route(&self, mut request: ApiRequest, query: Option<&Value>) -> Result<Value> {
        if let Some(q) = query {
            request = request.with_query(q);
        }
        self.call(request).await
    }

    // Projects

    pub async fn list_projects(&self, params: &Value) -> Result<Value> {
        self.call(ApiRequest::get("/projects").with_query(params)).await
    }

    pub async fn get_project(&self, id: &str) -> Result<Value> {
        self.call(ApiRequest::get("/projects").segment(id)).await
    }

    pub async fn create_project(&self, body: Value) -> Result<Value> {
        self.call(ApiRequest::post("/projects").with_body(body)).await
    }

    pub async fn update_project(&self, id: &str, body: Value) -> Result<Value> {
        self.call(ApiRequest::put("/projects").segment(id).with_body(body))
            .await
    }

    pub async fn delete_project(&self, id: &str) -> Result<Value> {
        self.call(ApiRequest::delete("/projects").segment(id)).await
    }

    pub async fn project_time(&self, id: &str) -> Result<Value> {
        self.call(ApiRequest::get("/projects").segment(id).segment("time")).await
    }

    // Tasks

    /// Search tasks. `/tasks/search` rejects requests without criteria, so an empty search
    /// answers `[]` locally.
    pub async fn search_tasks(&self, params: &Value) -> Result<Value> {
        let has = |key: &str| {
            params
                .get(key)
                .is_some_and(|v| !v.is_null() && v.as_str() != Some(""))
        };
        if !has("query") && !has("project") {
            return Ok(json!([]));
        }
        self.call(ApiRequest::get("/tasks/search").with_query(params))
            .await
    }

    pub async fn get_task(&self, id: &str) -> Result<Value> {
        self.call(ApiRequest::get("/tasks").segment(id)).await
    }

    pub async fn create_task(&self, project_id: &str, body: Value) -> Result<Value> {
        let request = ApiRequest::post("/projects")
            .segment(project_id)
            .segment("tasks")
            .with_body(body);
        self.call(request).await
    }

    pub async fn update_task(&self, id: &str, body: Value) -> Result<Value> {
        self.call(ApiRequest::put("/tasks").segment(id).with_body(body))
            .await
    }

    pub async fn delete_task(&self, id: &str) -> Result<Value> {
        self.call(ApiRequest::delete("/tasks").segment(id)).await
    }

    pub async fn tasks_for_project(&self, project_id: &str, params: &Value) -> Result<Value> {
        self.call_route(self.routes.tasks_for_project(project_id), Some(params))
            .await
    }

    pub async fn update_task_estimate(&self, id: &str, estimate: Value) -> Result<Value> {
        self.call(ApiRequest::put("/tasks").segment(id).segment("estimate").with_body(estimate))
            .await
    }

    pub async fn delete_task_estimate(&self, id: &str) -> Result<Value> {
        self.call(ApiRequest::delete("/tasks").segment(id).segment("estimate"))
            .await
    }

    // Task time

    pub async fn task_time(&self, id: &str) -> Result<Value> {
        self.call(ApiRequest::get("/tasks").segment(id).segment("time")).await
    }

    pub async fn add_task_time(&self, id: &str, body: Value) -> Result<Value> {
        self.call(ApiRequest::post("/tasks").segment(id).segment("time").with_body(body))
            .await
    }

    pub async fn update_task_time(&self, id: &str, body: Value) -> Result<Value> {
        self.call(ApiRequest::put("/tasks").segment(id).segment("time").with_body(body))
            .await
    }

    pub async fn delete_task_time(&self, id: &str) -> Result<Value> {
        self.call(ApiRequest::delete("/tasks").segment(id).segment("time"))
            .await
    }

    // Time records

    pub async fn list_time_records(&self, params: &Value) -> Result<Value> {
        self.call(ApiRequest::get("/team/time").with_query(params))
            .await
    }

    pub async fn get_time_record(&self, id: u64) -> Result<Value> {
        self.call(ApiRequest::get("/time").segment(id)).await
    }

    pub async fn create_time_record(&self, body: Value) -> Result<Value> {
        self.call(ApiRequest::post("/time").with_body(body)).await
    }

    pub async fn update_time_record(&self, id: u64, body: Value) -> Result<Value> {
        self.call(ApiRequest::put("/time").segment(id).with_body(body))
            .await
    }

    pub async fn delete_time_record(&self, id: u64) -> Result<Value> {
        self.call(ApiRequest::delete("/time").segment(id)).await
    }

    /// `params` may carry `from`, `to`, `limit` and `page`.
    pub async fn user_time(&self, user_id: u64, params: &Value) -> Result<Value> {
        let request = ApiRequest::get("/users")
            .segment(user_id)
            .segment("time")
            .with_query(params);
        self.call(request).await
    }

    // Timers

    /// The caller's running timer, or `None` when the upstream answers 404.
    pub async fn current_timer(&self) -> Result<Option<Value>> {
        match self.call_route(self.routes.current_timer(), None).await {
            Ok(Value::Null) => Ok(None),
            Ok(timer) => Ok(Some(timer)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub async fn list_timers(&self, params: &Value) -> Result<Value> {
        self.call(ApiRequest::get("/timers").with_query(params)).await
    }

    pub async fn start_timer(&self, body: Value) -> Result<Value> {
        self.call(ApiRequest::post("/timers").with_body(body)).await
    }

    pub async fn start_timer_for_task(&self, task_id: &str, comment: Option<&str>) -> Result<Value> {
        self.call_route(self.routes.start_timer_for_task(task_id, comment), None)
            .await
    }

    /// Stop a timer. Without an id, the running timer is looked up first.
    ///
    /// The lookup and the stop are two requests; a timer stopped elsewhere in between makes the
    /// second one fail upstream.
    ///
    /// # Errors
    ///
    /// [`ApiError::NoActiveTimer`] when no id was given and nothing is running. No stop request
    /// is sent in that case.
    pub async fn stop_timer(&self, timer_id: Option<&str>) -> Result<Value> {
        let id = match timer_id {
            Some(id) => id.to_string(),
            None => {
                let timer = self.current_timer().await?.ok_or(ApiError::NoActiveTimer)?;
                active_timer_id(&timer).ok_or(ApiError::NoActiveTimer)?
            }
        };
        debug!(timer = %id, "stopping timer");
        self.call(ApiRequest::post("/timers").segment(id).segment("stop"))
            .await
    }

    // Clients

    pub async fn list_clients(&self, params: &Value) -> Result<Value> {
        self.call(ApiRequest::get("/clients").with_query(params)).await
    }

    pub async fn get_client(&self, id: u64) -> Result<Value> {
        self.call(ApiRequest::get("/clients").segment(id)).await
    }

    pub async fn create_client(&self, body: Value) -> Result<Value> {
        self.call(ApiRequest::post("/clients").with_body(body)).await
    }

    pub async fn update_client(&self, id: u64, body: Value) -> Result<Value> {
        self.call(ApiRequest::put("/clients").segment(id).with_body(body))
            .await
    }

    pub async fn delete_client(&self, id: u64) -> Result<Value> {
        self.call(ApiRequest::delete("/clients").segment(id)).await
    }

    // Users

    pub async fn list_team_users(&self, params: &Value) -> Result<Value> {
        self.call(ApiRequest::get("/team/users").with_query(params))
            .await
    }

    pub async fn current_user(&self) -> Result<Value> {
        self.call(ApiRequest::get("/users/me")).await
    }

    /// Find one team member. There is no per-user endpoint, so this filters the team list and
    /// reports an absent id as a 404-shaped upstream error.
    pub async fn get_user(&self, id: u64) -> Result<Value> {
        let team = self.list_team_users(&Value::Null).await?;
        team.as_array()
            .and_then(|users| {
                users
                    .iter()
                    .find(|u| u.get("id").and_then(Value::as_u64) == Some(id))
            })
            .cloned()
            .ok_or_else(|| {
                ApiError::Upstream(UpstreamError::from_body(
                    404,
                    &json!({ "message": format!("User {id} not found"), "code": "NOT_FOUND" }),
                ))
            })
    }

    // Sections

    pub async fn list_sections(&self, project_id: &str, params: &Value) -> Result<Value> {
        let request = ApiRequest::get("/projects")
            .segment(project_id)
            .segment("sections")
            .with_query(params);
        self.call(request).await
    }

    /// Sections across projects. There is no global endpoint: this fetches up to
    /// [`ALL_SECTIONS_PROJECT_LIMIT`] projects, scans the first [`ALL_SECTIONS_SCAN_LIMIT`], and
    /// skips projects whose lookup fails.
    pub async fn list_all_sections(&self, params: &Value) -> Result<Value> {
        let projects = self
            .list_projects(&json!({ "limit": ALL_SECTIONS_PROJECT_LIMIT }))
            .await?;
        let mut sections = Vec::new();
        for project in projects
            .as_array()
            .into_iter()
            .flatten()
            .take(ALL_SECTIONS_SCAN_LIMIT)
        {
            let Some(project_id) = id_string(project) else {
                continue;
            };
            match self.list_sections(&project_id, params).await {
                Ok(Value::Array(found)) => sections.extend(found),
                Ok(_) => {}
                Err(e) => debug!(project = %project_id, error = %e, "skipping project sections"),
            }
        }
        Ok(Value::Array(sections))
    }

    pub async fn get_section(&self, id: &str) -> Result<Value> {
        self.call(ApiRequest::get("/sections").segment(id)).await
    }

    pub async fn create_section(&self, body: Value) -> Result<Value> {
        self.call(ApiRequest::post("/sections").with_body(body)).await
    }

    pub async fn update_section(&self, id: &str, body: Value) -> Result<Value> {
        self.call(ApiRequest::put("/sections").segment(id).with_body(body))
            .await
    }

    pub async fn delete_section(&self, id: &str) -> Result<Value> {
        self.call(ApiRequest::delete("/sections").segment(id)).await
    }

    // Timecards

    pub async fn list_timecards(&self, params: &Value) -> Result<Value> {
        self.call(ApiRequest::get("/timecards").with_query(params))
            .await
    }

    pub async fn get_timecard(&self, id: u64) -> Result<Value> {
        self.call(ApiRequest::get("/timecards").segment(id)).await
    }

    pub async fn user_timecards(&self, user_id: u64, params: &Value) -> Result<Value> {
        let request = ApiRequest::get("/users")
            .segment(user_id)
            .segment("timecards")
            .with_query(params);
        self.call(request).await
    }

    pub async fn update_timecard(&self, id: u64, body: Value) -> Result<Value> {
        self.call(ApiRequest::put("/timecards").segment(id).with_body(body))
            .await
    }

    pub async fn delete_timecard(&self, id: u64) -> Result<Value> {
        self.call(ApiRequest::delete("/timecards").segment(id))
            .await
    }

    /// Clock a user in. `date` defaults to today (UTC).
    pub async fn clock_in(&self, user_id: u64, date: Option<&str>) -> Result<Value> {
        let date = date.map_or_else(
            || chrono::Utc::now().date_naive().format("%Y-%m-%d").to_string(),
            str::to_string,
        );
        self.call(
            ApiRequest::post("/timecards/clock-in").with_body(json!({ "user": user_id, "date": date })),
        )
        .await
    }

    pub async fn clock_out(&self, user_id: u64) -> Result<Value> {
        self.call(ApiRequest::post("/timecards/clock-out").with_body(json!({ "user": user_id })))
            .await
    }

    // Invoices

    pub async fn list_invoices(&self, params: &Value) -> Result<Value> {
        self.call(ApiRequest::get("/invoices").with_query(params))
            .await
    }

    pub async fn get_invoice(&self, id: u64) -> Result<Value> {
        self.call(ApiRequest::get("/invoices").segment(id)).await
    }

    pub async fn create_invoice(&self, body: Value) -> Result<Value> {
        self.call(ApiRequest::post("/invoices").with_body(body)).await
    }

    pub async fn update_invoice(&self, id: u64, body: Value) -> Result<Value> {
        self.call(ApiRequest::put("/invoices").segment(id).with_body(body))
            .await
    }

    pub async fn delete_invoice(&self, id: u64) -> Result<Value> {
        self.call(ApiRequest::delete("/invoices").segment(id)).await
    }

    pub async fn refresh_invoice_line_items(&self, id: u64) -> Result<Value> {
        self.call(ApiRequest::post("/invoices").segment(id).segment("refresh"))
            .await
    }

    pub async fn set_invoice_status(&self, id: u64, status: &str) -> Result<Value> {
        let request = ApiRequest::put("/invoices")
            .segment(id)
            .segment("status")
            .with_body(json!({ "status": status }));
        self.call(request).await
    }

    pub async fn export_invoice(&self, id: u64, system: &str) -> Result<Value> {
        let request = ApiRequest::post("/invoices")
            .segment(id)
            .segment("export")
            .with_body(json!({ "system": system }));
        self.call(request).await
    }

    // Expenses

    pub async fn list_expenses(&self, params: &Value) -> Result<Value> {
        self.call(ApiRequest::get("/expenses").with_query(params))
            .await
    }

    pub async fn create_expense(&self, body: Value) -> Result<Value> {
        self.call(ApiRequest::post("/expenses").with_body(body)).await
    }

    pub async fn update_expense(&self, id: u64, body: Value) -> Result<Value> {
        self.call(ApiRequest::put("/expenses").segment(id).with_body(body))
            .await
    }

    pub async fn delete_expense(&self, id: u64) -> Result<Value> {
        self.call(ApiRequest::delete("/expenses").segment(id)).await
    }

    pub async fn list_expense_categories(&self) -> Result<Value> {
        self.call(ApiRequest::get("/expenses/categories")).await
    }

    pub async fn create_expense_category(&self, name: &str) -> Result<Value> {
        self.call(ApiRequest::post("/expenses/categories").with_body(json!({ "name": name })))
            .await
    }

    pub async fn update_expense_category(&self, id: u64, name: &str) -> Result<Value> {
        self.call(
            ApiRequest::put("/expenses/categories").segment(id).with_body(json!({ "name": name })),
        )
        .await
    }

    pub async fn delete_expense_category(&self, id: u64) -> Result<Value> {
        self.call(ApiRequest::delete("/expenses/categories").segment(id))
            .await
    }

    pub async fn add_expense_attachment(&self, expense_id: u64, attachment_id: u64) -> Result<Value> {
        self.call(
            ApiRequest::post("/expenses")
                .segment(expense_id)
                .segment("attachments")
                .with_body(json!({ "attachmentId": attachment_id })),
        )
        .await
    }

    // Schedule assignments: no upstream endpoints exist.

    pub async fn list_schedule_assignments(&self, _params: &Value) -> Result<Value> {
        Err(ApiError::NotAvailable(SCHEDULE))
    }

    pub async fn create_schedule_assignment(&self, _body: Value) -> Result<Value> {
        Err(ApiError::NotAvailable(SCHEDULE))
    }

    pub async fn update_schedule_assignment(&self, _id: u64, _body: Value) -> Result<Value> {
        Err(ApiError::NotAvailable(SCHEDULE))
    }

    pub async fn delete_schedule_assignment(&self, _id: u64) -> Result<Value> {
        Err(ApiError::NotAvailable(SCHEDULE))
    }

    // Health

    /// Lightweight authenticated call used as the startup self-check.
    pub async fn ping(&self) -> Result<()> {
        self.current_user().await.map(|_| ())
    }
}

/// Id of a timer that is actually running. A timer reported with a non-`active` status, or
/// without an id, counts as no timer.
fn active_timer_id(timer: &Value) -> Option<String> {
    if let Some(status) = timer.get("status").and_then(Value::as_str)
        && status != "active"
    {
        return None;
    }
    id_string(timer)
}

fn id_string(value: &Value) -> Option<String> {
    match value.get("id")? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
