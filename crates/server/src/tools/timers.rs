use super::schema::{self, object};
use super::{count, formatted, json_result, soft_error};
use crate::descriptor::{ToolDescriptor, ToolResult, parse_args};
use everhour_api::Gateway;
use futures::future::BoxFuture;
use serde::Deserialize;
use serde_json::{Value, json};

const RESOURCES: &[&str] = &["timers"];
const ALREADY_RUNNING: &str =
    "A timer is already running. Stop the current timer before starting a new one.";

#[derive(Deserialize)]
#[serde(untagged)]
enum TimerId {
    Number(u64),
    Text(String),
}

impl TimerId {
    fn into_string(self) -> String {
        match self {
            Self::Number(n) => n.to_string(),
            Self::Text(s) => s,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StopArgs {
    timer_id: Option<TimerId>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StartForTaskArgs {
    task_id: String,
    comment: Option<String>,
}

pub(crate) fn tools() -> Vec<ToolDescriptor> {
    vec![
        ToolDescriptor::read(
            "everhour_get_current_timer",
            "Get the currently running timer, if any.",
            RESOURCES,
            schema::empty(),
            current_timer,
        )
        .readonly(),
        ToolDescriptor::write(
            "everhour_start_timer",
            "Start a new timer for a task or project. Fails if a timer is already running.",
            RESOURCES,
            object(
                json!({
                    "task": schema::string("Task ID to associate with the timer"),
                    "project": schema::string("Project ID to associate with the timer"),
                    "comment": schema::string("Optional comment for the timer"),
                }),
                &[],
            ),
            start_timer,
        ),
        ToolDescriptor::write(
            "everhour_stop_timer",
            "Stop a timer. Without a timer ID, the currently running timer is stopped.",
            RESOURCES,
            object(
                json!({
                    "timerId": {
                        "anyOf": [{ "type": "integer" }, { "type": "string", "minLength": 1 }],
                        "description": "Timer ID to stop (default: the running timer)"
                    }
                }),
                &[],
            ),
            stop_timer,
        ),
        ToolDescriptor::read(
            "everhour_list_timers",
            "List team timers.",
            RESOURCES,
            object(
                json!({
                    "page": schema::page(),
                    "limit": schema::limit("timers"),
                    "project": schema::string("Filter by project ID"),
                    "assignee": schema::integer("Filter by user ID"),
                    "from": schema::date("Start date (YYYY-MM-DD)"),
                    "to": schema::date("End date (YYYY-MM-DD)"),
                }),
                &[],
            ),
            list_timers,
        )
        .readonly(),
        ToolDescriptor::read(
            "everhour_timer_status",
            "Get a summary of timer status and activity.",
            RESOURCES,
            schema::empty(),
            timer_status,
        )
        .readonly(),
        ToolDescriptor::read(
            "everhour_get_running_timer",
            "Get the running timer with its formatted duration.",
            RESOURCES,
            schema::empty(),
            running_timer,
        )
        .readonly(),
        ToolDescriptor::write(
            "everhour_start_timer_for_task",
            "Start a timer directly for a specific task. Fails if a timer is already running.",
            RESOURCES,
            object(
                json!({
                    "taskId": schema::non_empty("Task ID to start the timer for"),
                    "comment": schema::string("Optional comment for the timer"),
                }),
                &["taskId"],
            ),
            start_timer_for_task,
        ),
    ]
}

fn is_active(timer: &Value) -> bool {
    timer.get("status").and_then(Value::as_str) == Some("active")
}

fn with_duration(timer: &Value) -> Value {
    let mut out = timer.clone();
    if let Some(obj) = out.as_object_mut() {
        obj.insert("durationFormatted".into(), formatted(timer, "duration"));
    }
    out
}

fn already_running(timer: &Value) -> ToolResult {
    Ok(soft_error(&json!({
        "success": false,
        "currentTimer": with_duration(timer),
        "message": ALREADY_RUNNING,
    })))
}

fn current_timer(gw: &Gateway, _args: Value) -> BoxFuture<'_, ToolResult> {
    Box::pin(async move {
        let timer = gw.current_timer().await?;
        Ok(json_result(&json!({ "timer": timer.as_ref().map(with_duration) })))
    })
}

fn start_timer(gw: &Gateway, args: Value) -> BoxFuture<'_, ToolResult> {
    Box::pin(async move {
        if let Some(timer) = gw.current_timer().await?
            && is_active(&timer)
        {
            return already_running(&timer);
        }
        let timer = gw.start_timer(args).await?;
        Ok(json_result(&json!({
            "success": true,
            "timer": timer,
            "message": "Timer started successfully",
        })))
    })
}

fn stop_timer(gw: &Gateway, args: Value) -> BoxFuture<'_, ToolResult> {
    Box::pin(async move {
        let StopArgs { timer_id } = parse_args(args)?;
        let timer_id = timer_id.map(TimerId::into_string);
        let record = gw.stop_timer(timer_id.as_deref()).await?;
        let recorded = formatted(&record, "time");
        let message = match recorded.as_str() {
            Some(t) => format!("Timer stopped successfully. Time recorded: {t}"),
            None => "Timer stopped successfully".to_string(),
        };
        Ok(json_result(&json!({
            "success": true,
            "timeFormatted": recorded,
            "timeRecord": record,
            "message": message,
        })))
    })
}

fn list_timers(gw: &Gateway, args: Value) -> BoxFuture<'_, ToolResult> {
    Box::pin(async move {
        let timers = gw.list_timers(&args).await?;
        Ok(json_result(&json!({ "total": count(&timers), "timers": timers })))
    })
}

fn timer_status(gw: &Gateway, _args: Value) -> BoxFuture<'_, ToolResult> {
    Box::pin(async move {
        let timer = gw.current_timer().await?;
        let (status, message) = match &timer {
            None => ("inactive".to_string(), "No timer is currently running"),
            Some(t) if is_active(t) => ("active".to_string(), "Timer is currently running"),
            Some(t) => (
                t.get("status")
                    .and_then(Value::as_str)
                    .unwrap_or("inactive")
                    .to_string(),
                "Last timer was stopped",
            ),
        };
        Ok(json_result(&json!({
            "status": status,
            "timer": timer.as_ref().map(with_duration),
            "message": message,
        })))
    })
}

fn running_timer(gw: &Gateway, _args: Value) -> BoxFuture<'_, ToolResult> {
    Box::pin(async move {
        match gw.current_timer().await? {
            Some(timer) if is_active(&timer) => Ok(json_result(&json!({
                "timer": with_duration(&timer),
                "message": "Timer is currently running",
            }))),
            _ => Ok(json_result(&json!({
                "timer": null,
                "message": "No timer is currently running",
            }))),
        }
    })
}

fn start_timer_for_task(gw: &Gateway, args: Value) -> BoxFuture<'_, ToolResult> {
    Box::pin(async move {
        let StartForTaskArgs { task_id, comment } = parse_args(args)?;
        if let Some(timer) = gw.current_timer().await?
            && is_active(&timer)
        {
            return already_running(&timer);
        }
        let timer = gw.start_timer_for_task(&task_id, comment.as_deref()).await?;
        Ok(json_result(&json!({
            "success": true,
            "timer": timer,
            "message": format!("Timer started successfully for task {task_id}"),
        })))
    })
}
