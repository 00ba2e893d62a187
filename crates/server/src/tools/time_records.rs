use super::schema::{self, object};
use super::{count, formatted, json_result, normalize_time, split_off};
use crate::descriptor::{ToolDescriptor, ToolResult, parse_args};
use everhour_api::Gateway;
use futures::future::BoxFuture;
use serde::Deserialize;
use serde_json::{Value, json};

const RESOURCES: &[&str] = &["time"];

#[derive(Deserialize)]
struct IdArgs {
    id: u64,
}

#[derive(Deserialize)]
struct ProjectArgs {
    id: String,
}

fn range_properties() -> Value {
    json!({
        "from": schema::date("Start date (YYYY-MM-DD)"),
        "to": schema::date("End date (YYYY-MM-DD)"),
        "page": schema::page(),
        "limit": schema::limit("records"),
    })
}

pub(crate) fn tools() -> Vec<ToolDescriptor> {
    let mut list_props = range_properties();
    list_props["project"] = schema::string("Filter by project ID");
    list_props["assignee"] = schema::integer("Filter by user ID");

    let mut user_props = range_properties();
    user_props["id"] = schema::integer("User ID");

    vec![
        ToolDescriptor::read(
            "everhour_list_time_records",
            "List team time records, optionally filtered by date range, project and user.",
            RESOURCES,
            object(list_props, &[]),
            list_time_records,
        )
        .readonly(),
        ToolDescriptor::read(
            "everhour_get_time_record",
            "Get a specific time record by ID.",
            RESOURCES,
            object(json!({ "id": schema::integer("Time record ID") }), &["id"]),
            get_time_record,
        )
        .readonly(),
        ToolDescriptor::write(
            "everhour_create_time_record",
            "Create a time record. Time may be given in seconds or as text like \"1h 30m\".",
            RESOURCES,
            object(
                json!({
                    "time": schema::time("Time in seconds, or text like \"1h 30m\", \"90m\", \"5400s\""),
                    "date": schema::date("Date in YYYY-MM-DD format"),
                    "task": schema::string("Task ID to log time against"),
                    "project": schema::string("Project ID to log time against"),
                    "comment": schema::string("Comment for the time record"),
                }),
                &["time", "date"],
            ),
            create_time_record,
        ),
        ToolDescriptor::write(
            "everhour_update_time_record",
            "Update an existing time record.",
            RESOURCES,
            object(
                json!({
                    "id": schema::integer("Time record ID"),
                    "time": schema::time("Time in seconds, or text like \"1h 30m\", \"90m\", \"5400s\""),
                    "date": schema::date("Date in YYYY-MM-DD format"),
                    "task": schema::string("Task ID"),
                    "project": schema::string("Project ID"),
                    "comment": schema::string("Comment for the time record"),
                }),
                &["id"],
            ),
            update_time_record,
        ),
        ToolDescriptor::delete(
            "everhour_delete_time_record",
            "Delete a time record. This action cannot be undone.",
            RESOURCES,
            object(json!({ "id": schema::integer("Time record ID to delete") }), &["id"]),
            delete_time_record,
        ),
        ToolDescriptor::read(
            "everhour_get_project_time",
            "List time records logged on a project.",
            &["projects", "time"],
            object(json!({ "id": schema::non_empty("Project ID") }), &["id"]),
            project_time,
        )
        .readonly(),
        ToolDescriptor::read(
            "everhour_get_user_time",
            "List time records of a user, optionally within a date range.",
            &["users", "time"],
            object(user_props, &["id"]),
            user_time,
        )
        .readonly(),
    ]
}

fn list_time_records(gw: &Gateway, args: Value) -> BoxFuture<'_, ToolResult> {
    Box::pin(async move {
        let records = gw.list_time_records(&args).await?;
        Ok(json_result(&json!({ "total": count(&records), "timeRecords": records })))
    })
}

fn get_time_record(gw: &Gateway, args: Value) -> BoxFuture<'_, ToolResult> {
    Box::pin(async move {
        let IdArgs { id } = parse_args(args)?;
        let record = gw.get_time_record(id).await?;
        Ok(json_result(&json!({
            "timeFormatted": formatted(&record, "time"),
            "timeRecord": record,
        })))
    })
}

fn create_time_record(gw: &Gateway, args: Value) -> BoxFuture<'_, ToolResult> {
    Box::pin(async move {
        let mut body = args;
        normalize_time(&mut body)?;
        let record = gw.create_time_record(body).await?;
        Ok(json_result(&json!({
            "success": true,
            "timeFormatted": formatted(&record, "time"),
            "timeRecord": record,
        })))
    })
}

fn update_time_record(gw: &Gateway, args: Value) -> BoxFuture<'_, ToolResult> {
    Box::pin(async move {
        let (id, mut body): (u64, Value) = split_off(args, "id")?;
        normalize_time(&mut body)?;
        let record = gw.update_time_record(id, body).await?;
        Ok(json_result(&json!({
            "success": true,
            "timeFormatted": formatted(&record, "time"),
            "timeRecord": record,
        })))
    })
}

fn delete_time_record(gw: &Gateway, args: Value) -> BoxFuture<'_, ToolResult> {
    Box::pin(async move {
        let IdArgs { id } = parse_args(args)?;
        gw.delete_time_record(id).await?;
        Ok(json_result(&json!({
            "success": true,
            "message": format!("Time record {id} deleted successfully"),
        })))
    })
}

fn project_time(gw: &Gateway, args: Value) -> BoxFuture<'_, ToolResult> {
    Box::pin(async move {
        let ProjectArgs { id } = parse_args(args)?;
        let records = gw.project_time(&id).await?;
        Ok(json_result(&json!({
            "projectId": id,
            "total": count(&records),
            "timeRecords": records,
        })))
    })
}

fn user_time(gw: &Gateway, args: Value) -> BoxFuture<'_, ToolResult> {
    Box::pin(async move {
        let (id, params): (u64, Value) = split_off(args, "id")?;
        let records = gw.user_time(id, &params).await?;
        Ok(json_result(&json!({
            "userId": id,
            "total": count(&records),
            "timeRecords": records,
        })))
    })
}
