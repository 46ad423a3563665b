//! Read-only listings for operators.

use anyhow::{bail, Context};
use bartender_core::order::OrderStatus;
use bartender_db::repositories::{DrinkRepo, OrderRepo, SectionRepo};
use bartender_db::DbPool;

use crate::table::Table;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

pub async fn sections(pool: &DbPool) -> anyhow::Result<()> {
    let sections = SectionRepo::list(pool).await?;

    let mut table = Table::new(["order", "name", "drinks", "id"]);
    for section in &sections {
        let count = SectionRepo::count_drinks(pool, section.id).await?;
        table.row([
            section.display_order.to_string(),
            section.name.clone(),
            count.to_string(),
            section.id.to_string(),
        ]);
    }
    print!("{table}");
    Ok(())
}

pub async fn drinks(
    pool: &DbPool,
    section: Option<&str>,
    include_inactive: bool,
) -> anyhow::Result<()> {
    let section_id = match section {
        Some(name) => {
            let found = SectionRepo::list(pool)
                .await?
                .into_iter()
                .find(|s| s.name.eq_ignore_ascii_case(name));
            match found {
                Some(s) => Some(s.id),
                None => bail!("No section named '{name}'"),
            }
        }
        None => None,
    };

    let drinks = DrinkRepo::list_admin(pool, section_id, include_inactive).await?;

    let mut table = Table::new(["name", "section", "active", "image", "id"]);
    for drink in &drinks {
        table.row([
            drink.name.clone(),
            drink.section_name.clone(),
            drink.is_active.to_string(),
            if drink.image_url.is_empty() { "-" } else { "yes" }.to_string(),
            drink.id.to_string(),
        ]);
    }
    print!("{table}");
    println!("{} drink(s)", drinks.len());
    Ok(())
}

pub async fn orders(pool: &DbPool, status: Option<&str>, limit: i64) -> anyhow::Result<()> {
    let status = status
        .map(str::parse::<OrderStatus>)
        .transpose()
        .context("Invalid --status")?;

    let orders = OrderRepo::list_recent(pool, status, limit.max(1)).await?;

    let mut table = Table::new(["created", "status", "drink", "user", "id"]);
    for order in &orders {
        table.row([
            order.created_at.format(TIME_FORMAT).to_string(),
            order.status.to_string(),
            order.drink.name.clone(),
            order.username.clone().unwrap_or_default(),
            order.id.to_string(),
        ]);
    }
    print!("{table}");
    println!("{} order(s)", orders.len());
    Ok(())
}
