//! Task estimates, time logged directly on tasks, and per-project task listing.

use super::schema::{self, object};
use super::{count, formatted, json_result, normalize_time, split_off};
use crate::descriptor::{ToolDescriptor, ToolResult, parse_args};
use everhour_api::Gateway;
use futures::future::BoxFuture;
use serde::Deserialize;
use serde_json::{Value, json};

const TASKS: &[&str] = &["tasks"];
const TASK_TIME: &[&str] = &["tasks", "time"];

#[derive(Deserialize)]
struct IdArgs {
    id: String,
}

#[derive(Deserialize)]
struct EstimateArgs {
    id: String,
    estimate: u64,
}

pub(crate) fn tools() -> Vec<ToolDescriptor> {
    vec![
        ToolDescriptor::read(
            "everhour_get_tasks_for_project",
            "Get all tasks for a specific project.",
            TASKS,
            object(
                json!({
                    "projectId": schema::non_empty("Project ID to get tasks for"),
                    "page": schema::page(),
                    "limit": schema::limit("tasks"),
                    "query": schema::query("tasks"),
                    "status": schema::task_status(),
                    "assignee": schema::integer("Filter tasks by assignee user ID"),
                }),
                &["projectId"],
            ),
            tasks_for_project,
        )
        .readonly(),
        ToolDescriptor::write(
            "everhour_update_task_estimate",
            "Set the time estimate of a task, in seconds.",
            TASKS,
            object(
                json!({
                    "id": schema::non_empty("Task ID"),
                    "estimate": schema::positive("Estimate in seconds"),
                }),
                &["id", "estimate"],
            ),
            update_estimate,
        ),
        ToolDescriptor::delete(
            "everhour_delete_task_estimate",
            "Remove the time estimate from a task.",
            TASKS,
            object(json!({ "id": schema::non_empty("Task ID") }), &["id"]),
            delete_estimate,
        ),
        ToolDescriptor::read(
            "everhour_get_task_time",
            "List time records logged on a specific task.",
            TASK_TIME,
            object(json!({ "id": schema::non_empty("Task ID") }), &["id"]),
            task_time,
        )
        .readonly(),
        ToolDescriptor::write(
            "everhour_add_time_to_task",
            "Add time directly to a specific task.",
            TASK_TIME,
            object(
                json!({
                    "id": schema::non_empty("Task ID"),
                    "time": schema::time("Time in seconds, or text like \"1h 30m\", \"90m\", \"5400s\""),
                    "date": schema::date("Date in YYYY-MM-DD format"),
                    "comment": schema::string("Optional comment for the time record"),
                }),
                &["id", "time", "date"],
            ),
            add_task_time,
        ),
        ToolDescriptor::write(
            "everhour_update_task_time",
            "Update time logged on a specific task.",
            TASK_TIME,
            object(
                json!({
                    "id": schema::non_empty("Task ID"),
                    "time": schema::time("Time in seconds, or text like \"1h 30m\", \"90m\", \"5400s\""),
                    "date": schema::date("Date in YYYY-MM-DD format"),
                    "comment": schema::string("Comment for the time record"),
                }),
                &["id"],
            ),
            update_task_time,
        ),
        ToolDescriptor::delete(
            "everhour_delete_task_time",
            "Delete time logged on a specific task.",
            TASK_TIME,
            object(json!({ "id": schema::non_empty("Task ID") }), &["id"]),
            delete_task_time,
        ),
    ]
}

fn tasks_for_project(gw: &Gateway, args: Value) -> BoxFuture<'_, ToolResult> {
    Box::pin(async move {
        let (project_id, params): (String, Value) = split_off(args, "projectId")?;
        let tasks = gw.tasks_for_project(&project_id, &params).await?;
        Ok(json_result(&json!({
            "projectId": project_id,
            "total": count(&tasks),
            "tasks": tasks,
        })))
    })
}

fn update_estimate(gw: &Gateway, args: Value) -> BoxFuture<'_, ToolResult> {
    Box::pin(async move {
        let EstimateArgs { id, estimate } = parse_args(args)?;
        let task = gw
            .update_task_estimate(&id, json!({ "estimate": estimate }))
            .await?;
        Ok(json_result(&json!({
            "success": true,
            "task": task,
            "message": format!("Estimate set to {}", everhour_api::duration::encode(estimate)),
        })))
    })
}

fn delete_estimate(gw: &Gateway, args: Value) -> BoxFuture<'_, ToolResult> {
    Box::pin(async move {
        let IdArgs { id } = parse_args(args)?;
        gw.delete_task_estimate(&id).await?;
        Ok(json_result(&json!({
            "success": true,
            "message": format!("Estimate removed from task {id}"),
        })))
    })
}

fn task_time(gw: &Gateway, args: Value) -> BoxFuture<'_, ToolResult> {
    Box::pin(async move {
        let IdArgs { id } = parse_args(args)?;
        let records = gw.task_time(&id).await?;
        Ok(json_result(&json!({
            "taskId": id,
            "total": count(&records),
            "timeRecords": records,
        })))
    })
}

fn add_task_time(gw: &Gateway, args: Value) -> BoxFuture<'_, ToolResult> {
    Box::pin(async move {
        let (id, mut body): (String, Value) = split_off(args, "id")?;
        normalize_time(&mut body)?;
        let record = gw.add_task_time(&id, body).await?;
        Ok(json_result(&json!({
            "success": true,
            "timeFormatted": formatted(&record, "time"),
            "timeRecord": record,
        })))
    })
}

fn update_task_time(gw: &Gateway, args: Value) -> BoxFuture<'_, ToolResult> {
    Box::pin(async move {
        let (id, mut body): (String, Value) = split_off(args, "id")?;
        normalize_time(&mut body)?;
        let record = gw.update_task_time(&id, body).await?;
        Ok(json_result(&json!({
            "success": true,
            "timeFormatted": formatted(&record, "time"),
            "timeRecord": record,
        })))
    })
}

fn delete_task_time(gw: &Gateway, args: Value) -> BoxFuture<'_, ToolResult> {
    Box::pin(async move {
        let IdArgs { id } = parse_args(args)?;
        gw.delete_task_time(&id).await?;
        Ok(json_result(&json!({
            "success": true,
            "message": format!("Time deleted from task {id}"),
        })))
    })
}
