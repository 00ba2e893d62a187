use super::schema::{self, object};
use super::{count, json_result, split_off};
use crate::descriptor::{ToolDescriptor, ToolResult, parse_args};
use everhour_api::Gateway;
use futures::future::BoxFuture;
use serde::Deserialize;
use serde_json::{Value, json};

const RESOURCES: &[&str] = &["invoices"];
const STATUSES: &[&str] = &["draft", "sent", "paid"];
const EXPORT_SYSTEMS: &[&str] = &["xero", "quickbooks", "freshbooks"];

#[derive(Deserialize)]
struct IdArgs {
    id: u64,
}

#[derive(Deserialize)]
struct StatusArgs {
    id: u64,
    status: String,
}

#[derive(Deserialize)]
struct ExportArgs {
    id: u64,
    system: String,
}

fn invoice_fields() -> Value {
    json!({
        "client": schema::integer("Client ID"),
        "projects": schema::strings("Project IDs to include"),
        "issueDate": schema::date("Issue date (YYYY-MM-DD)"),
        "dueDate": schema::date("Due date (YYYY-MM-DD)"),
        "from": schema::date("Start of the billed period (YYYY-MM-DD)"),
        "to": schema::date("End of the billed period (YYYY-MM-DD)"),
        "publicNotes": schema::string("Notes shown on the invoice"),
        "tax": schema::number("Tax rate in percent"),
        "discount": schema::number("Discount in percent"),
    })
}

pub(crate) fn tools() -> Vec<ToolDescriptor> {
    let mut update_props = invoice_fields();
    update_props["id"] = schema::integer("Invoice ID");

    vec![
        ToolDescriptor::read(
            "everhour_list_invoices",
            "List invoices.",
            RESOURCES,
            object(
                json!({
                    "page": schema::page(),
                    "limit": schema::limit("invoices"),
                    "status": schema::one_of(STATUSES, "Filter by invoice status"),
                    "client": schema::integer("Filter by client ID"),
                }),
                &[],
            ),
            list_invoices,
        )
        .readonly(),
        ToolDescriptor::read(
            "everhour_get_invoice",
            "Get a specific invoice by ID.",
            RESOURCES,
            object(json!({ "id": schema::integer("Invoice ID") }), &["id"]),
            get_invoice,
        )
        .readonly(),
        ToolDescriptor::write(
            "everhour_create_invoice",
            "Create an invoice for a client.",
            RESOURCES,
            object(invoice_fields(), &["client"]),
            create_invoice,
        ),
        ToolDescriptor::write(
            "everhour_update_invoice",
            "Update an invoice.",
            RESOURCES,
            object(update_props, &["id"]),
            update_invoice,
        ),
        ToolDescriptor::delete(
            "everhour_delete_invoice",
            "Delete an invoice. This action cannot be undone.",
            RESOURCES,
            object(json!({ "id": schema::integer("Invoice ID to delete") }), &["id"]),
            delete_invoice,
        ),
        ToolDescriptor::write(
            "everhour_refresh_invoice_line_items",
            "Recalculate the line items of an invoice from tracked time and expenses.",
            RESOURCES,
            object(json!({ "id": schema::integer("Invoice ID") }), &["id"]),
            refresh_line_items,
        ),
        ToolDescriptor::write(
            "everhour_update_invoice_status",
            "Set the status of an invoice.",
            RESOURCES,
            object(
                json!({
                    "id": schema::integer("Invoice ID"),
                    "status": schema::one_of(STATUSES, "New invoice status"),
                }),
                &["id", "status"],
            ),
            update_status,
        ),
        ToolDescriptor::write(
            "everhour_export_invoice",
            "Export an invoice to an accounting system.",
            RESOURCES,
            object(
                json!({
                    "id": schema::integer("Invoice ID"),
                    "system": schema::one_of(EXPORT_SYSTEMS, "Accounting system"),
                }),
                &["id", "system"],
            ),
            export_invoice,
        ),
    ]
}

fn list_invoices(gw: &Gateway, args: Value) -> BoxFuture<'_, ToolResult> {
    Box::pin(async move {
        let invoices = gw.list_invoices(&args).await?;
        Ok(json_result(&json!({ "total": count(&invoices), "invoices": invoices })))
    })
}

fn get_invoice(gw: &Gateway, args: Value) -> BoxFuture<'_, ToolResult> {
    Box::pin(async move {
        let IdArgs { id } = parse_args(args)?;
        let invoice = gw.get_invoice(id).await?;
        Ok(json_result(&json!({ "invoice": invoice })))
    })
}

fn create_invoice(gw: &Gateway, args: Value) -> BoxFuture<'_, ToolResult> {
    Box::pin(async move {
        let invoice = gw.create_invoice(args).await?;
        Ok(json_result(&json!({ "success": true, "invoice": invoice })))
    })
}

fn update_invoice(gw: &Gateway, args: Value) -> BoxFuture<'_, ToolResult> {
    Box::pin(async move {
        let (id, body): (u64, Value) = split_off(args, "id")?;
        let invoice = gw.update_invoice(id, body).await?;
        Ok(json_result(&json!({ "success": true, "invoice": invoice })))
    })
}

fn delete_invoice(gw: &Gateway, args: Value) -> BoxFuture<'_, ToolResult> {
    Box::pin(async move {
        let IdArgs { id } = parse_args(args)?;
        gw.delete_invoice(id).await?;
        Ok(json_result(&json!({
            "success": true,
            "message": format!("Invoice {id} deleted successfully"),
        })))
    })
}

fn refresh_line_items(gw: &Gateway, args: Value) -> BoxFuture<'_, ToolResult> {
    Box::pin(async move {
        let IdArgs { id } = parse_args(args)?;
        let invoice = gw.refresh_invoice_line_items(id).await?;
        Ok(json_result(&json!({ "success": true, "invoice": invoice })))
    })
}

fn update_status(gw: &Gateway, args: Value) -> BoxFuture<'_, ToolResult> {
    Box::pin(async move {
        let StatusArgs { id, status } = parse_args(args)?;
        let invoice = gw.set_invoice_status(id, &status).await?;
        Ok(json_result(&json!({
            "success": true,
            "invoice": invoice,
            "message": format!("Invoice {id} marked as {status}"),
        })))
    })
}

fn export_invoice(gw: &Gateway, args: Value) -> BoxFuture<'_, ToolResult> {
    Box::pin(async move {
        let ExportArgs { id, system } = parse_args(args)?;
        let result = gw.export_invoice(id, &system).await?;
        Ok(json_result(&json!({
            "success": true,
            "export": result,
            "message": format!("Invoice {id} exported to {system}"),
        })))
    })
}
