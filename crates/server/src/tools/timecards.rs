use super::schema::{self, object};
use super::{count, json_result, split_off};
use crate::descriptor::{ToolDescriptor, ToolResult, parse_args};
use everhour_api::Gateway;
use futures::future::BoxFuture;
use serde::Deserialize;
use serde_json::{Value, json};

const RESOURCES: &[&str] = &["timecards"];

#[derive(Deserialize)]
struct IdArgs {
    id: u64,
}

#[derive(Deserialize)]
struct ClockInArgs {
    user: u64,
    date: Option<String>,
}

#[derive(Deserialize)]
struct ClockOutArgs {
    user: u64,
}

fn list_properties() -> Value {
    json!({
        "page": schema::page(),
        "limit": schema::limit("timecards"),
        "from": schema::date("Start date (YYYY-MM-DD)"),
        "to": schema::date("End date (YYYY-MM-DD)"),
    })
}

pub(crate) fn tools() -> Vec<ToolDescriptor> {
    let mut user_props = list_properties();
    user_props["userId"] = schema::integer("User ID");

    vec![
        ToolDescriptor::read(
            "everhour_list_timecards",
            "List team timecards (clock-in/clock-out records).",
            RESOURCES,
            object(list_properties(), &[]),
            list_timecards,
        )
        .readonly(),
        ToolDescriptor::read(
            "everhour_get_timecard",
            "Get a specific timecard by ID.",
            RESOURCES,
            object(json!({ "id": schema::integer("Timecard ID") }), &["id"]),
            get_timecard,
        )
        .readonly(),
        ToolDescriptor::read(
            "everhour_list_user_timecards",
            "List the timecards of one user.",
            &["timecards", "users"],
            object(user_props, &["userId"]),
            user_timecards,
        )
        .readonly(),
        ToolDescriptor::write(
            "everhour_update_timecard",
            "Update a timecard.",
            RESOURCES,
            object(
                json!({
                    "id": schema::integer("Timecard ID"),
                    "clockIn": schema::string("Clock-in time (HH:MM)"),
                    "clockOut": schema::string("Clock-out time (HH:MM)"),
                    "breakTime": schema::integer("Break time in seconds"),
                }),
                &["id"],
            ),
            update_timecard,
        ),
        ToolDescriptor::delete(
            "everhour_delete_timecard",
            "Delete a timecard. This action cannot be undone.",
            RESOURCES,
            object(json!({ "id": schema::integer("Timecard ID to delete") }), &["id"]),
            delete_timecard,
        ),
        ToolDescriptor::write(
            "everhour_clock_in",
            "Clock a user in. The date defaults to today (UTC).",
            RESOURCES,
            object(
                json!({
                    "user": schema::integer("User ID"),
                    "date": schema::date("Date (YYYY-MM-DD), default today"),
                }),
                &["user"],
            ),
            clock_in,
        ),
        ToolDescriptor::write(
            "everhour_clock_out",
            "Clock a user out.",
            RESOURCES,
            object(json!({ "user": schema::integer("User ID") }), &["user"]),
            clock_out,
        ),
    ]
}

fn list_timecards(gw: &Gateway, args: Value) -> BoxFuture<'_, ToolResult> {
    Box::pin(async move {
        let cards = gw.list_timecards(&args).await?;
        Ok(json_result(&json!({ "total": count(&cards), "timecards": cards })))
    })
}

fn get_timecard(gw: &Gateway, args: Value) -> BoxFuture<'_, ToolResult> {
    Box::pin(async move {
        let IdArgs { id } = parse_args(args)?;
        let card = gw.get_timecard(id).await?;
        Ok(json_result(&json!({ "timecard": card })))
    })
}

fn user_timecards(gw: &Gateway, args: Value) -> BoxFuture<'_, ToolResult> {
    Box::pin(async move {
        let (user_id, params): (u64, Value) = split_off(args, "userId")?;
        let cards = gw.user_timecards(user_id, &params).await?;
        Ok(json_result(&json!({
            "userId": user_id,
            "total": count(&cards),
            "timecards": cards,
        })))
    })
}

fn update_timecard(gw: &Gateway, args: Value) -> BoxFuture<'_, ToolResult> {
    Box::pin(async move {
        let (id, body): (u64, Value) = split_off(args, "id")?;
        let card = gw.update_timecard(id, body).await?;
        Ok(json_result(&json!({ "success": true, "timecard": card })))
    })
}

fn delete_timecard(gw: &Gateway, args: Value) -> BoxFuture<'_, ToolResult> {
    Box::pin(async move {
        let IdArgs { id } = parse_args(args)?;
        gw.delete_timecard(id).await?;
        Ok(json_result(&json!({
            "success": true,
            "message": format!("Timecard {id} deleted successfully"),
        })))
    })
}

fn clock_in(gw: &Gateway, args: Value) -> BoxFuture<'_, ToolResult> {
    Box::pin(async move {
        let ClockInArgs { user, date } = parse_args(args)?;
        let card = gw.clock_in(user, date.as_deref()).await?;
        Ok(json_result(&json!({
            "success": true,
            "timecard": card,
            "message": format!("User {user} clocked in"),
        })))
    })
}

fn clock_out(gw: &Gateway, args: Value) -> BoxFuture<'_, ToolResult> {
    Box::pin(async move {
        let ClockOutArgs { user } = parse_args(args)?;
        let card = gw.clock_out(user).await?;
        Ok(json_result(&json!({
            "success": true,
            "timecard": card,
            "message": format!("User {user} clocked out"),
        })))
    })
}
