use serde_json::{json, Value};
use crate::cli::OutputFormat;

/// Output a success message in the appropriate format
pub fn output_success(
    output_format: &OutputFormat,
    message: &str,
    data: Option<Value>,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            if let (Some(target), Some(Value::Object(extra))) = (response.as_object_mut(), data) {
                target.extend(extra);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Output an error message in the appropriate format
pub fn output_error(
    output_format: &OutputFormat,
    message: &str,
    error_code: Option<&str>,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": false,
                "error": message
            });

            if let Some(code) = error_code {
                response["error_code"] = json!(code);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            eprintln!("Error: {}", message);
        }
    }
    Ok(())
}

/// Output an empty collection in the appropriate format
pub fn output_empty_collection(
    output_format: &OutputFormat,
    collection_name: &str,
    message: &str,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json!({
                collection_name: []
            }))?);
        }
        OutputFormat::Text => {
            println!("{}", message);
        }
    }
    Ok(())
}

/// Output current item information in the appropriate format
pub fn output_current_item(
    output_format: &OutputFormat,
    item_type: &str,
    name: &str,
    details: Value,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json!({
                format!("current_{}", item_type): details
            }))?);
        }
        OutputFormat::Text => {
            println!("Current {}: {}", item_type, name);
            if let Some(url) = details.get("url").and_then(Value::as_str) {
                println!("URL: {}", url);
            }
            if let Some(user) = details.get("username").and_then(Value::as_str) {
                println!("User: {}", user);
            }
            if let Some(desc) = details.get("description").and_then(Value::as_str) {
                if !desc.is_empty() {
                    println!("Description: {}", desc);
                }
            }
        }
    }
    Ok(())
}

/// Output "no current item" message in the appropriate format
pub fn output_no_current_item(
    output_format: &OutputFormat,
    item_type: &str,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json!({
                format!("current_{}", item_type): null
            }))?);
        }
        OutputFormat::Text => {
            println!("No current {} set", item_type);
        }
    }
    Ok(())
}

/// Upper-case the first letter of an item type for messages
pub fn capitalize(item_type: &str) -> String {
    let mut chars = item_type.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Generic function to handle switching the current item
pub fn switch_current_item<F, G>(
    item_name: &str,
    item_type: &str,
    check_exists: F,
    update_current: G,
    output_format: &OutputFormat,
) -> anyhow::Result<()>
where
    F: Fn(&str) -> anyhow::Result<bool>,
    G: Fn(&str) -> anyhow::Result<()>,
{
    if !check_exists(item_name)? {
        return Err(anyhow::anyhow!("{} '{}' not found", capitalize(item_type), item_name));
    }

    update_current(item_name)?;

    output_success(
        output_format,
        &format!("Switched to {} '{}'", item_type, item_name),
        Some(json!({ format!("current_{}", item_type): item_name })),
    )?;

    Ok(())
}

/// Generic function to handle deleting items and clearing current if needed
pub fn delete_item_with_current_check<F, G, H>(
    item_name: &str,
    item_type: &str,
    check_exists: F,
    remove_item: G,
    clear_if_current: H,
    output_format: &OutputFormat,
) -> anyhow::Result<()>
where
    F: Fn(&str) -> anyhow::Result<bool>,
    G: Fn(&str) -> anyhow::Result<()>,
    H: Fn(&str) -> anyhow::Result<()>,
{
    if !check_exists(item_name)? {
        return Err(anyhow::anyhow!("{} '{}' not found", capitalize(item_type), item_name));
    }

    remove_item(item_name)?;
    clear_if_current(item_name)?;

    output_success(
        output_format,
        &format!("{} '{}' deleted successfully", capitalize(item_type), item_name),
        None,
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("server"), "Server");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn test_delete_missing_item_fails() {
        let err = delete_item_with_current_check(
            "ghost",
            "server",
            |_| Ok(false),
            |_| Ok(()),
            |_| Ok(()),
            &OutputFormat::Text,
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "Server 'ghost' not found");
    }

    #[test]
    fn test_switch_updates_current() {
        let current = RefCell::new(None::<String>);
        switch_current_item(
            "ci",
            "server",
            |_| Ok(true),
            |name| {
                *current.borrow_mut() = Some(name.to_string());
                Ok(())
            },
            &OutputFormat::Json,
        )
        .unwrap();
        assert_eq!(current.borrow().as_deref(), Some("ci"));
    }
}
