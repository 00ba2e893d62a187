use super::schema::{self, object};
use super::{count, json_result};
use crate::descriptor::{ToolDescriptor, ToolResult, parse_args};
use everhour_api::Gateway;
use futures::future::BoxFuture;
use serde::Deserialize;
use serde_json::{Value, json};

const RESOURCES: &[&str] = &["users"];

#[derive(Deserialize)]
struct IdArgs {
    id: u64,
}

pub(crate) fn tools() -> Vec<ToolDescriptor> {
    vec![
        ToolDescriptor::read(
            "everhour_get_current_user",
            "Get the profile of the user who owns the API key.",
            RESOURCES,
            schema::empty(),
            current_user,
        )
        .readonly(),
        ToolDescriptor::read(
            "everhour_list_team_users",
            "List all users in the team.",
            RESOURCES,
            object(
                json!({
                    "page": schema::page(),
                    "limit": schema::limit("users"),
                }),
                &[],
            ),
            list_team_users,
        )
        .readonly(),
        ToolDescriptor::read(
            "everhour_get_user",
            "Get details of a specific team user by ID.",
            RESOURCES,
            object(json!({ "id": schema::integer("User ID") }), &["id"]),
            get_user,
        )
        .readonly(),
    ]
}

fn current_user(gw: &Gateway, _args: Value) -> BoxFuture<'_, ToolResult> {
    Box::pin(async move {
        let user = gw.current_user().await?;
        Ok(json_result(&json!({ "user": user })))
    })
}

fn list_team_users(gw: &Gateway, args: Value) -> BoxFuture<'_, ToolResult> {
    Box::pin(async move {
        let users = gw.list_team_users(&args).await?;
        Ok(json_result(&json!({ "total": count(&users), "users": users })))
    })
}

fn get_user(gw: &Gateway, args: Value) -> BoxFuture<'_, ToolResult> {
    Box::pin(async move {
        let IdArgs { id } = parse_args(args)?;
        let user = gw.get_user(id).await?;
        Ok(json_result(&json!({ "user": user })))
    })
}
