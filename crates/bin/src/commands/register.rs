//! Register commands: writes, point reads and listings.

use orderly::{ID, OrderedKeyValue};
use serde_json::{Value, json};

use crate::cli::{KeyArgs, ListArgs, MoveArgs, PutArgs};
use crate::output::{OutputFormat, display_value, print_table};

type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// Parse a command-line value as JSON, falling back to a plain string.
fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

fn print_written(op: &str, key: &str, hash: Option<&ID>, format: OutputFormat) -> CommandResult {
    match format {
        OutputFormat::Human => match hash {
            Some(hash) => println!("{op} {key} ({hash})"),
            None => println!("{op} {key}"),
        },
        OutputFormat::Json => {
            let hash = hash.map(ID::as_str);
            println!(
                "{}",
                serde_json::to_string(&json!({ "op": op, "key": key, "hash": hash }))?
            );
        }
    }
    Ok(())
}

/// Run the `put` command
pub async fn put(kv: &OrderedKeyValue, args: &PutArgs, format: OutputFormat) -> CommandResult {
    let value = parse_value(&args.value);
    let hash = match args.index {
        Some(index) => kv.put_at(&args.key, value, index).await?,
        None => kv.put(&args.key, value).await?,
    };
    print_written("put", &args.key, Some(&hash), format)
}

/// Run the `move` command
pub async fn move_to(kv: &OrderedKeyValue, args: &MoveArgs, format: OutputFormat) -> CommandResult {
    kv.move_to(&args.key, args.index).await?;
    print_written("move", &args.key, None, format)
}

/// Run the `del` command
pub async fn delete(kv: &OrderedKeyValue, args: &KeyArgs, format: OutputFormat) -> CommandResult {
    let hash = kv.delete(&args.key).await?;
    print_written("del", &args.key, Some(&hash), format)
}

/// Run the `get` command
pub async fn get(kv: &OrderedKeyValue, args: &KeyArgs, format: OutputFormat) -> CommandResult {
    let value = kv.get(&args.key).await?;
    match format {
        OutputFormat::Human => match value {
            Some(value) => println!("{}", display_value(&value)),
            None => eprintln!("Key '{}' not found.", args.key),
        },
        OutputFormat::Json => {
            println!("{}", serde_json::to_string(&value.unwrap_or(Value::Null))?);
        }
    }
    Ok(())
}

/// Run the `list` command
pub async fn list(kv: &OrderedKeyValue, args: &ListArgs, format: OutputFormat) -> CommandResult {
    let entries = kv.iter(args.limit).await?.collect_all().await?;

    match format {
        OutputFormat::Human => {
            if entries.is_empty() {
                println!("No entries found.");
                return Ok(());
            }
            let rows: Vec<Vec<String>> = entries
                .iter()
                .map(|e| {
                    vec![
                        e.key.clone(),
                        display_value(&e.value),
                        e.position.map_or_else(|| "-".to_string(), |p| p.to_string()),
                        e.hash.to_string(),
                    ]
                })
                .collect();
            print_table(&["KEY", "VALUE", "POSITION", "HASH"], &rows);
        }
        OutputFormat::Json => {
            let entries: Vec<Value> = entries
                .iter()
                .map(|e| {
                    json!({
                        "key": e.key,
                        "value": e.value,
                        "position": e.position,
                        "hash": e.hash,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string(&entries)?);
        }
    }
    Ok(())
}

/// Run the `all` command
pub async fn all(kv: &OrderedKeyValue, format: OutputFormat) -> CommandResult {
    let entries = kv.all().await?;

    match format {
        OutputFormat::Human => {
            if entries.is_empty() {
                println!("No entries found.");
                return Ok(());
            }
            let rows: Vec<Vec<String>> = entries
                .iter()
                .enumerate()
                .map(|(i, e)| {
                    vec![
                        i.to_string(),
                        e.key.clone(),
                        display_value(&e.value),
                        e.hash.to_string(),
                    ]
                })
                .collect();
            print_table(&["INDEX", "KEY", "VALUE", "HASH"], &rows);
        }
        OutputFormat::Json => {
            let entries: Vec<Value> = entries
                .iter()
                .map(|e| json!({ "key": e.key, "value": e.value, "hash": e.hash }))
                .collect();
            println!("{}", serde_json::to_string(&entries)?);
        }
    }
    Ok(())
}
