use super::schema::{self, object};
use super::{count, json_result, split_off};
use crate::descriptor::{ToolDescriptor, ToolResult, parse_args};
use everhour_api::Gateway;
use futures::future::BoxFuture;
use serde::Deserialize;
use serde_json::{Value, json};

const RESOURCES: &[&str] = &["tasks"];
const TASK_TYPES: &[&str] = &["task", "bug", "feature"];

#[derive(Deserialize)]
struct IdArgs {
    id: String,
}

pub(crate) fn tools() -> Vec<ToolDescriptor> {
    vec![
        ToolDescriptor::read(
            "everhour_list_tasks",
            "Search tasks in Everhour by name query and/or project. Returns an empty list when neither is given.",
            RESOURCES,
            object(
                json!({
                    "page": schema::page(),
                    "limit": schema::limit("tasks"),
                    "query": schema::query("tasks"),
                    "status": schema::task_status(),
                    "project": schema::string("Filter tasks by project ID"),
                    "assignee": schema::integer("Filter tasks by assignee user ID"),
                }),
                &[],
            ),
            list_tasks,
        )
        .readonly(),
        ToolDescriptor::read(
            "everhour_get_task",
            "Get details of a specific task by ID.",
            RESOURCES,
            object(json!({ "id": schema::non_empty("Task ID") }), &["id"]),
            get_task,
        )
        .readonly(),
        ToolDescriptor::write(
            "everhour_create_task",
            "Create a new task in Everhour.",
            RESOURCES,
            object(
                json!({
                    "name": schema::non_empty("Task name"),
                    "project": schema::non_empty("Project ID where the task will be created"),
                    "section": schema::string("Section ID within the project"),
                    "assignee": schema::integer("User ID to assign the task to"),
                    "type": schema::one_of(TASK_TYPES, "Task type"),
                    "description": schema::string("Task description"),
                    "labels": schema::strings("Labels to assign to the task"),
                }),
                &["name", "project"],
            ),
            create_task,
        ),
        ToolDescriptor::write(
            "everhour_update_task",
            "Update an existing task in Everhour.",
            RESOURCES,
            object(
                json!({
                    "id": schema::non_empty("Task ID"),
                    "name": schema::string("New task name"),
                    "status": schema::task_status(),
                    "type": schema::one_of(TASK_TYPES, "Task type"),
                    "assignee": schema::integer("User ID to assign the task to"),
                    "description": schema::string("Task description"),
                    "labels": schema::strings("Labels to assign to the task"),
                }),
                &["id"],
            ),
            update_task,
        ),
        ToolDescriptor::delete(
            "everhour_delete_task",
            "Delete a task from Everhour. This action cannot be undone.",
            RESOURCES,
            object(json!({ "id": schema::non_empty("Task ID to delete") }), &["id"]),
            delete_task,
        ),
    ]
}

fn list_tasks(gw: &Gateway, args: Value) -> BoxFuture<'_, ToolResult> {
    Box::pin(async move {
        let tasks = gw.search_tasks(&args).await?;
        Ok(json_result(&json!({ "total": count(&tasks), "tasks": tasks })))
    })
}

fn get_task(gw: &Gateway, args: Value) -> BoxFuture<'_, ToolResult> {
    Box::pin(async move {
        let IdArgs { id } = parse_args(args)?;
        let task = gw.get_task(&id).await?;
        Ok(json_result(&json!({ "task": task })))
    })
}

fn create_task(gw: &Gateway, args: Value) -> BoxFuture<'_, ToolResult> {
    Box::pin(async move {
        let (project, body): (String, Value) = split_off(args, "project")?;
        let task = gw.create_task(&project, body).await?;
        Ok(json_result(&json!({
            "success": true,
            "task": task,
            "message": "Task created successfully",
        })))
    })
}

fn update_task(gw: &Gateway, args: Value) -> BoxFuture<'_, ToolResult> {
    Box::pin(async move {
        let (id, body): (String, Value) = split_off(args, "id")?;
        let task = gw.update_task(&id, body).await?;
        Ok(json_result(&json!({
            "success": true,
            "task": task,
            "message": "Task updated successfully",
        })))
    })
}

fn delete_task(gw: &Gateway, args: Value) -> BoxFuture<'_, ToolResult> {
    Box::pin(async move {
        let IdArgs { id } = parse_args(args)?;
        gw.delete_task(&id).await?;
        Ok(json_result(&json!({
            "success": true,
            "message": format!("Task {id} deleted successfully"),
        })))
    })
}
