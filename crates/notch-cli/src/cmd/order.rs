use crate::output::{print_json, print_table};
use anyhow::{bail, Context};
use notch_core::parse::{format_steps, parse_steps};
use notch_core::paths::DEFAULT_DATA_DIR;
use notch_core::store::{save_order, DiskStore, OrderStore};
use notch_core::NotchError;
use std::io::Read;
use std::path::{Path, PathBuf};

fn resolve_dir(data_dir: Option<&Path>) -> PathBuf {
    data_dir
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
}

fn read_input(file: Option<&Path>) -> anyhow::Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("failed to read step text from stdin")?;
            Ok(text)
        }
    }
}

// ---------------------------------------------------------------------------
// show
// ---------------------------------------------------------------------------

pub fn show(data_dir: Option<&Path>, order_no: &str, text: bool, json: bool) -> anyhow::Result<()> {
    let store = DiskStore::open_existing(resolve_dir(data_dir))?;
    let order = match store.get(order_no.trim()) {
        Ok(order) => order,
        Err(NotchError::OrderNotFound(_)) => bail!("order '{}' not found", order_no.trim()),
        Err(e) => return Err(e.into()),
    };

    if text {
        print!("{}", format_steps(&order.steps));
        return Ok(());
    }

    if json {
        return print_json(&order);
    }

    println!("Order:   {}", order.order_no);
    println!("Total:   {}", order.total);
    if let Some(color) = &order.color {
        println!("Color:   {color}");
    }
    println!("Updated: {}", order.updated_at.format("%Y-%m-%d %H:%M:%S UTC"));
    println!();

    if order.steps.is_empty() {
        println!("No steps.");
        return Ok(());
    }

    let rows: Vec<Vec<String>> = order
        .steps
        .iter()
        .map(|s| vec![s.step.to_string(), s.notch.to_string()])
        .collect();
    print_table(&["STEP", "NOTCH"], &rows);
    Ok(())
}

// ---------------------------------------------------------------------------
// save
// ---------------------------------------------------------------------------

pub fn save(
    data_dir: Option<&Path>,
    order_no: &str,
    file: Option<&Path>,
    json: bool,
) -> anyhow::Result<()> {
    let text = read_input(file)?;
    let steps = parse_steps(&text)?;

    let dir = resolve_dir(data_dir);
    let store = DiskStore::open(&dir)
        .with_context(|| format!("data directory {} is not writable", dir.display()))?;
    let (order, placement) = save_order(&store, order_no, steps)?;

    if json {
        print_json(&serde_json::json!({
            "ok": true,
            "orderNo": order.order_no,
            "total": order.total,
            "where": placement.describe(),
        }))?;
    } else {
        println!(
            "Saved order '{}' ({} steps) to {}",
            order.order_no,
            order.total,
            placement.describe()
        );
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// check
// ---------------------------------------------------------------------------

pub fn check(file: Option<&Path>, json: bool) -> anyhow::Result<()> {
    let text = read_input(file)?;
    let steps = parse_steps(&text)?;

    if json {
        print_json(&serde_json::json!({
            "ok": true,
            "total": steps.len(),
            "steps": steps,
        }))?;
    } else {
        println!("ok: {} steps", steps.len());
    }
    Ok(())
}
