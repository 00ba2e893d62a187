use super::schema::{self, object};
use super::{count, json_result, split_off};
use crate::descriptor::{ToolDescriptor, ToolResult, parse_args};
use everhour_api::Gateway;
use futures::future::BoxFuture;
use serde::Deserialize;
use serde_json::{Value, json};

const RESOURCES: &[&str] = &["clients"];

#[derive(Deserialize)]
struct IdArgs {
    id: u64,
}

fn business_details() -> Value {
    json!({
        "type": "object",
        "properties": {
            "name": schema::string("Legal business name"),
            "address": schema::string("Business address"),
            "phone": schema::string("Phone number"),
            "website": schema::string("Website URL"),
        },
        "description": "Business details used on invoices"
    })
}

pub(crate) fn tools() -> Vec<ToolDescriptor> {
    vec![
        ToolDescriptor::read(
            "everhour_list_clients",
            "List all clients from Everhour.",
            RESOURCES,
            object(
                json!({
                    "page": schema::page(),
                    "limit": schema::limit("clients"),
                    "query": schema::query("clients"),
                }),
                &[],
            ),
            list_clients,
        )
        .readonly(),
        ToolDescriptor::read(
            "everhour_get_client",
            "Get details of a specific client by ID.",
            RESOURCES,
            object(json!({ "id": schema::integer("Client ID") }), &["id"]),
            get_client,
        )
        .readonly(),
        ToolDescriptor::write(
            "everhour_create_client",
            "Create a new client in Everhour.",
            RESOURCES,
            object(
                json!({
                    "name": schema::non_empty("Client name"),
                    "businessDetails": business_details(),
                }),
                &["name"],
            ),
            create_client,
        ),
        ToolDescriptor::write(
            "everhour_update_client",
            "Update an existing client in Everhour.",
            RESOURCES,
            object(
                json!({
                    "id": schema::integer("Client ID"),
                    "name": schema::string("New client name"),
                    "businessDetails": business_details(),
                }),
                &["id"],
            ),
            update_client,
        ),
        ToolDescriptor::delete(
            "everhour_delete_client",
            "Delete a client from Everhour. This action cannot be undone.",
            RESOURCES,
            object(json!({ "id": schema::integer("Client ID to delete") }), &["id"]),
            delete_client,
        ),
    ]
}

fn list_clients(gw: &Gateway, args: Value) -> BoxFuture<'_, ToolResult> {
    Box::pin(async move {
        let clients = gw.list_clients(&args).await?;
        Ok(json_result(&json!({ "total": count(&clients), "clients": clients })))
    })
}

fn get_client(gw: &Gateway, args: Value) -> BoxFuture<'_, ToolResult> {
    Box::pin(async move {
        let IdArgs { id } = parse_args(args)?;
        let client = gw.get_client(id).await?;
        Ok(json_result(&json!({ "client": client })))
    })
}

fn create_client(gw: &Gateway, args: Value) -> BoxFuture<'_, ToolResult> {
    Box::pin(async move {
        let client = gw.create_client(args).await?;
        Ok(json_result(&json!({
            "success": true,
            "client": client,
            "message": "Client created successfully",
        })))
    })
}

fn update_client(gw: &Gateway, args: Value) -> BoxFuture<'_, ToolResult> {
    Box::pin(async move {
        let (id, body): (u64, Value) = split_off(args, "id")?;
        let client = gw.update_client(id, body).await?;
        Ok(json_result(&json!({
            "success": true,
            "client": client,
            "message": "Client updated successfully",
        })))
    })
}

fn delete_client(gw: &Gateway, args: Value) -> BoxFuture<'_, ToolResult> {
    Box::pin(async move {
        let IdArgs { id } = parse_args(args)?;
        gw.delete_client(id).await?;
        Ok(json_result(&json!({
            "success": true,
            "message": format!("Client {id} deleted successfully"),
        })))
    })
}
