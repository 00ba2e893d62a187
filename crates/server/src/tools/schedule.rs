//! Resource-planning tools. Everhour has no public endpoints for these, so every handler fails
//! before any request is made.

use super::json_result;
use super::schema::{self, object};
use super::split_off;
use crate::descriptor::{ToolDescriptor, ToolResult, parse_args};
use everhour_api::Gateway;
use futures::future::BoxFuture;
use serde::Deserialize;
use serde_json::{Value, json};

const RESOURCES: &[&str] = &["schedule"];

#[derive(Deserialize)]
struct IdArgs {
    id: u64,
}

fn assignment_fields() -> Value {
    json!({
        "user": schema::integer("User ID"),
        "project": schema::string("Project ID"),
        "startDate": schema::date("Start date (YYYY-MM-DD)"),
        "endDate": schema::date("End date (YYYY-MM-DD)"),
        "time": schema::integer("Planned seconds per day"),
    })
}

pub(crate) fn tools() -> Vec<ToolDescriptor> {
    let mut update_props = assignment_fields();
    update_props["id"] = schema::integer("Assignment ID");

    vec![
        ToolDescriptor::read(
            "everhour_list_schedule_assignments",
            "List resource-planning assignments (not available in the Everhour API).",
            RESOURCES,
            object(
                json!({
                    "from": schema::date("Start date (YYYY-MM-DD)"),
                    "to": schema::date("End date (YYYY-MM-DD)"),
                }),
                &[],
            ),
            list_assignments,
        )
        .readonly(),
        ToolDescriptor::write(
            "everhour_create_schedule_assignment",
            "Create a resource-planning assignment (not available in the Everhour API).",
            RESOURCES,
            object(assignment_fields(), &["user"]),
            create_assignment,
        ),
        ToolDescriptor::write(
            "everhour_update_schedule_assignment",
            "Update a resource-planning assignment (not available in the Everhour API).",
            RESOURCES,
            object(update_props, &["id"]),
            update_assignment,
        ),
        ToolDescriptor::delete(
            "everhour_delete_schedule_assignment",
            "Delete a resource-planning assignment (not available in the Everhour API).",
            RESOURCES,
            object(json!({ "id": schema::integer("Assignment ID") }), &["id"]),
            delete_assignment,
        ),
    ]
}

fn list_assignments(gw: &Gateway, args: Value) -> BoxFuture<'_, ToolResult> {
    Box::pin(async move {
        let assignments = gw.list_schedule_assignments(&args).await?;
        Ok(json_result(&json!({ "assignments": assignments })))
    })
}

fn create_assignment(gw: &Gateway, args: Value) -> BoxFuture<'_, ToolResult> {
    Box::pin(async move {
        let assignment = gw.create_schedule_assignment(args).await?;
        Ok(json_result(&json!({ "assignment": assignment })))
    })
}

fn update_assignment(gw: &Gateway, args: Value) -> BoxFuture<'_, ToolResult> {
    Box::pin(async move {
        let (id, body): (u64, Value) = split_off(args, "id")?;
        let assignment = gw.update_schedule_assignment(id, body).await?;
        Ok(json_result(&json!({ "assignment": assignment })))
    })
}

fn delete_assignment(gw: &Gateway, args: Value) -> BoxFuture<'_, ToolResult> {
    Box::pin(async move {
        let IdArgs { id } = parse_args(args)?;
        gw.delete_schedule_assignment(id).await?;
        Ok(json_result(&json!({ "success": true })))
    })
}
