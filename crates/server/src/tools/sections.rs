use super::schema::{self, object};
use super::{count, json_result, split_off};
use crate::descriptor::{ToolDescriptor, ToolResult, parse_args};
use everhour_api::Gateway;
use everhour_api::gateway::ALL_SECTIONS_SCAN_LIMIT;
use futures::future::BoxFuture;
use serde::Deserialize;
use serde_json::{Value, json};

const RESOURCES: &[&str] = &["sections"];

#[derive(Deserialize)]
struct IdArgs {
    id: String,
}

fn list_properties() -> Value {
    json!({
        "page": schema::page(),
        "limit": schema::limit("sections"),
        "query": schema::query("sections"),
    })
}

pub(crate) fn tools() -> Vec<ToolDescriptor> {
    let mut project_props = list_properties();
    project_props["projectId"] = schema::non_empty("Project ID");

    vec![
        ToolDescriptor::read(
            "everhour_list_all_sections",
            "List sections across projects. Only the first projects of the account are scanned; use everhour_list_project_sections for a specific project.",
            RESOURCES,
            object(list_properties(), &[]),
            list_all_sections,
        )
        .readonly(),
        ToolDescriptor::read(
            "everhour_list_project_sections",
            "List the sections of one project.",
            RESOURCES,
            object(project_props, &["projectId"]),
            list_project_sections,
        )
        .readonly(),
        ToolDescriptor::read(
            "everhour_get_section",
            "Get details of a specific section by ID.",
            RESOURCES,
            object(json!({ "id": schema::non_empty("Section ID") }), &["id"]),
            get_section,
        )
        .readonly(),
        ToolDescriptor::write(
            "everhour_create_section",
            "Create a new section in a project.",
            RESOURCES,
            object(
                json!({
                    "name": schema::non_empty("Section name"),
                    "project": schema::non_empty("Project ID the section belongs to"),
                    "position": schema::integer("Position of the section within the project"),
                }),
                &["name", "project"],
            ),
            create_section,
        ),
        ToolDescriptor::write(
            "everhour_update_section",
            "Update an existing section.",
            RESOURCES,
            object(
                json!({
                    "id": schema::non_empty("Section ID"),
                    "name": schema::string("New section name"),
                    "position": schema::integer("New position within the project"),
                }),
                &["id"],
            ),
            update_section,
        ),
        ToolDescriptor::delete(
            "everhour_delete_section",
            "Delete a section. This action cannot be undone.",
            RESOURCES,
            object(json!({ "id": schema::non_empty("Section ID to delete") }), &["id"]),
            delete_section,
        ),
    ]
}

fn list_all_sections(gw: &Gateway, args: Value) -> BoxFuture<'_, ToolResult> {
    Box::pin(async move {
        let sections = gw.list_all_sections(&args).await?;
        Ok(json_result(&json!({
            "total": count(&sections),
            "sections": sections,
            "note": format!("Sections from at most {ALL_SECTIONS_SCAN_LIMIT} projects"),
        })))
    })
}

fn list_project_sections(gw: &Gateway, args: Value) -> BoxFuture<'_, ToolResult> {
    Box::pin(async move {
        let (project_id, params): (String, Value) = split_off(args, "projectId")?;
        let sections = gw.list_sections(&project_id, &params).await?;
        Ok(json_result(&json!({
            "projectId": project_id,
            "total": count(&sections),
            "sections": sections,
        })))
    })
}

fn get_section(gw: &Gateway, args: Value) -> BoxFuture<'_, ToolResult> {
    Box::pin(async move {
        let IdArgs { id } = parse_args(args)?;
        let section = gw.get_section(&id).await?;
        Ok(json_result(&json!({ "section": section })))
    })
}

fn create_section(gw: &Gateway, args: Value) -> BoxFuture<'_, ToolResult> {
    Box::pin(async move {
        let section = gw.create_section(args).await?;
        Ok(json_result(&json!({
            "success": true,
            "section": section,
            "message": "Section created successfully",
        })))
    })
}

fn update_section(gw: &Gateway, args: Value) -> BoxFuture<'_, ToolResult> {
    Box::pin(async move {
        let (id, body): (String, Value) = split_off(args, "id")?;
        let section = gw.update_section(&id, body).await?;
        Ok(json_result(&json!({
            "success": true,
            "section": section,
            "message": "Section updated successfully",
        })))
    })
}

fn delete_section(gw: &Gateway, args: Value) -> BoxFuture<'_, ToolResult> {
    Box::pin(async move {
        let IdArgs { id } = parse_args(args)?;
        gw.delete_section(&id).await?;
        Ok(json_result(&json!({
            "success": true,
            "message": format!("Section {id} deleted successfully"),
        })))
    })
}
