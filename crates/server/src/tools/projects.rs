use super::schema::{self, object};
use super::{count, json_result, split_off};
use crate::descriptor::{ToolDescriptor, ToolResult, parse_args};
use everhour_api::Gateway;
use futures::future::BoxFuture;
use serde::Deserialize;
use serde_json::{Value, json};

const RESOURCES: &[&str] = &["projects"];

#[derive(Deserialize)]
struct IdArgs {
    id: String,
}

pub(crate) fn tools() -> Vec<ToolDescriptor> {
    vec![
        ToolDescriptor::read(
            "everhour_list_projects",
            "List all projects from Everhour. Supports filtering by status, client, and search query.",
            RESOURCES,
            object(
                json!({
                    "page": schema::page(),
                    "limit": schema::limit("projects"),
                    "query": schema::query("projects"),
                    "status": schema::project_status(),
                    "client": schema::integer("Filter projects by client ID"),
                }),
                &[],
            ),
            list_projects,
        )
        .readonly(),
        ToolDescriptor::read(
            "everhour_get_project",
            "Get details of a specific project by ID.",
            RESOURCES,
            object(
                json!({ "id": schema::non_empty("Project ID (e.g. \"ev:1234567890\")") }),
                &["id"],
            ),
            get_project,
        )
        .readonly(),
        ToolDescriptor::write(
            "everhour_create_project",
            "Create a new project in Everhour.",
            RESOURCES,
            object(
                json!({
                    "name": schema::non_empty("Project name"),
                    "client": schema::integer("Client ID to associate with the project"),
                    "type": schema::one_of(&["board", "list"], "Project type (board or list)"),
                    "billing": schema::billing(),
                }),
                &["name"],
            ),
            create_project,
        ),
        ToolDescriptor::write(
            "everhour_update_project",
            "Update an existing project in Everhour.",
            RESOURCES,
            object(
                json!({
                    "id": schema::non_empty("Project ID"),
                    "name": schema::string("New project name"),
                    "status": schema::project_status(),
                    "billing": schema::billing(),
                }),
                &["id"],
            ),
            update_project,
        ),
        ToolDescriptor::delete(
            "everhour_delete_project",
            "Delete a project from Everhour. This action cannot be undone.",
            RESOURCES,
            object(json!({ "id": schema::non_empty("Project ID to delete") }), &["id"]),
            delete_project,
        ),
    ]
}

fn list_projects(gw: &Gateway, args: Value) -> BoxFuture<'_, ToolResult> {
    Box::pin(async move {
        let projects = gw.list_projects(&args).await?;
        Ok(json_result(&json!({ "total": count(&projects), "projects": projects })))
    })
}

fn get_project(gw: &Gateway, args: Value) -> BoxFuture<'_, ToolResult> {
    Box::pin(async move {
        let IdArgs { id } = parse_args(args)?;
        let project = gw.get_project(&id).await?;
        Ok(json_result(&json!({ "project": project })))
    })
}

fn create_project(gw: &Gateway, args: Value) -> BoxFuture<'_, ToolResult> {
    Box::pin(async move {
        let project = gw.create_project(args).await?;
        Ok(json_result(&json!({
            "success": true,
            "project": project,
            "message": "Project created successfully",
        })))
    })
}

fn update_project(gw: &Gateway, args: Value) -> BoxFuture<'_, ToolResult> {
    Box::pin(async move {
        let (id, body): (String, Value) = split_off(args, "id")?;
        let project = gw.update_project(&id, body).await?;
        Ok(json_result(&json!({
            "success": true,
            "project": project,
            "message": "Project updated successfully",
        })))
    })
}

fn delete_project(gw: &Gateway, args: Value) -> BoxFuture<'_, ToolResult> {
    Box::pin(async move {
        let IdArgs { id } = parse_args(args)?;
        gw.delete_project(&id).await?;
        Ok(json_result(&json!({
            "success": true,
            "message": format!("Project {id} deleted successfully"),
        })))
    })
}
