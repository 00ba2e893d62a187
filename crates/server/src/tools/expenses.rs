use super::schema::{self, object};
use super::{count, json_result, split_off};
use crate::descriptor::{ToolDescriptor, ToolResult, parse_args};
use everhour_api::Gateway;
use futures::future::BoxFuture;
use serde::Deserialize;
use serde_json::{Value, json};

const EXPENSES: &[&str] = &["expenses"];
const CATEGORIES: &[&str] = &["expenses", "expense_categories"];

#[derive(Deserialize)]
struct IdArgs {
    id: u64,
}

#[derive(Deserialize)]
struct CategoryArgs {
    name: String,
}

#[derive(Deserialize)]
struct CategoryUpdateArgs {
    id: u64,
    name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AttachmentArgs {
    expense_id: u64,
    attachment_id: u64,
}

fn expense_fields() -> Value {
    json!({
        "category": schema::integer("Expense category ID"),
        "date": schema::date("Date (YYYY-MM-DD)"),
        "amount": schema::number("Amount"),
        "project": schema::string("Project ID"),
        "user": schema::integer("User ID the expense belongs to"),
        "details": schema::string("Description"),
        "billable": { "type": "boolean", "description": "Whether the expense is billable" },
    })
}

pub(crate) fn tools() -> Vec<ToolDescriptor> {
    let mut update_props = expense_fields();
    update_props["id"] = schema::integer("Expense ID");

    vec![
        ToolDescriptor::read(
            "everhour_list_expenses",
            "List expenses.",
            EXPENSES,
            object(
                json!({
                    "page": schema::page(),
                    "limit": schema::limit("expenses"),
                    "from": schema::date("Start date (YYYY-MM-DD)"),
                    "to": schema::date("End date (YYYY-MM-DD)"),
                    "project": schema::string("Filter by project ID"),
                }),
                &[],
            ),
            list_expenses,
        )
        .readonly(),
        ToolDescriptor::write(
            "everhour_create_expense",
            "Create an expense.",
            EXPENSES,
            object(expense_fields(), &["category", "date", "amount"]),
            create_expense,
        ),
        ToolDescriptor::write(
            "everhour_update_expense",
            "Update an expense.",
            EXPENSES,
            object(update_props, &["id"]),
            update_expense,
        ),
        ToolDescriptor::delete(
            "everhour_delete_expense",
            "Delete an expense. This action cannot be undone.",
            EXPENSES,
            object(json!({ "id": schema::integer("Expense ID to delete") }), &["id"]),
            delete_expense,
        ),
        ToolDescriptor::read(
            "everhour_list_expense_categories",
            "List expense categories.",
            CATEGORIES,
            schema::empty(),
            list_categories,
        )
        .readonly(),
        ToolDescriptor::write(
            "everhour_create_expense_category",
            "Create an expense category.",
            CATEGORIES,
            object(json!({ "name": schema::non_empty("Category name") }), &["name"]),
            create_category,
        ),
        ToolDescriptor::write(
            "everhour_update_expense_category",
            "Rename an expense category.",
            CATEGORIES,
            object(
                json!({
                    "id": schema::integer("Category ID"),
                    "name": schema::non_empty("New category name"),
                }),
                &["id", "name"],
            ),
            update_category,
        ),
        ToolDescriptor::delete(
            "everhour_delete_expense_category",
            "Delete an expense category.",
            CATEGORIES,
            object(json!({ "id": schema::integer("Category ID to delete") }), &["id"]),
            delete_category,
        ),
        ToolDescriptor::write(
            "everhour_add_expense_attachment",
            "Attach a previously uploaded attachment to an expense.",
            EXPENSES,
            object(
                json!({
                    "expenseId": schema::integer("Expense ID"),
                    "attachmentId": schema::integer("Attachment ID"),
                }),
                &["expenseId", "attachmentId"],
            ),
            add_attachment,
        ),
    ]
}

fn list_expenses(gw: &Gateway, args: Value) -> BoxFuture<'_, ToolResult> {
    Box::pin(async move {
        let expenses = gw.list_expenses(&args).await?;
        Ok(json_result(&json!({ "total": count(&expenses), "expenses": expenses })))
    })
}

fn create_expense(gw: &Gateway, args: Value) -> BoxFuture<'_, ToolResult> {
    Box::pin(async move {
        let expense = gw.create_expense(args).await?;
        Ok(json_result(&json!({ "success": true, "expense": expense })))
    })
}

fn update_expense(gw: &Gateway, args: Value) -> BoxFuture<'_, ToolResult> {
    Box::pin(async move {
        let (id, body): (u64, Value) = split_off(args, "id")?;
        let expense = gw.update_expense(id, body).await?;
        Ok(json_result(&json!({ "success": true, "expense": expense })))
    })
}

fn delete_expense(gw: &Gateway, args: Value) -> BoxFuture<'_, ToolResult> {
    Box::pin(async move {
        let IdArgs { id } = parse_args(args)?;
        gw.delete_expense(id).await?;
        Ok(json_result(&json!({
            "success": true,
            "message": format!("Expense {id} deleted successfully"),
        })))
    })
}

fn list_categories(gw: &Gateway, _args: Value) -> BoxFuture<'_, ToolResult> {
    Box::pin(async move {
        let categories = gw.list_expense_categories().await?;
        Ok(json_result(&json!({ "total": count(&categories), "categories": categories })))
    })
}

fn create_category(gw: &Gateway, args: Value) -> BoxFuture<'_, ToolResult> {
    Box::pin(async move {
        let CategoryArgs { name } = parse_args(args)?;
        let category = gw.create_expense_category(&name).await?;
        Ok(json_result(&json!({ "success": true, "category": category })))
    })
}

fn update_category(gw: &Gateway, args: Value) -> BoxFuture<'_, ToolResult> {
    Box::pin(async move {
        let CategoryUpdateArgs { id, name } = parse_args(args)?;
        let category = gw.update_expense_category(id, &name).await?;
        Ok(json_result(&json!({ "success": true, "category": category })))
    })
}

fn delete_category(gw: &Gateway, args: Value) -> BoxFuture<'_, ToolResult> {
    Box::pin(async move {
        let IdArgs { id } = parse_args(args)?;
        gw.delete_expense_category(id).await?;
        Ok(json_result(&json!({
            "success": true,
            "message": format!("Expense category {id} deleted successfully"),
        })))
    })
}

fn add_attachment(gw: &Gateway, args: Value) -> BoxFuture<'_, ToolResult> {
    Box::pin(async move {
        let AttachmentArgs {
            expense_id,
            attachment_id,
        } = parse_args(args)?;
        let expense = gw.add_expense_attachment(expense_id, attachment_id).await?;
        Ok(json_result(&json!({ "success": true, "expense": expense })))
    })
}
