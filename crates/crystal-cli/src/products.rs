//! Product maintenance commands.

use crystal_db::{ListColumns, ProductRow};

/// One row whose stored list columns differ from their canonical text.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct Repair {
    pub id: i64,
    pub columns: ListColumns,
}

/// Selects the rows that need rewriting, in input order.
pub(crate) fn plan_repairs(rows: &[ProductRow]) -> Vec<Repair> {
    rows.iter()
        .filter(|row| row.needs_repair())
        .map(|row| Repair {
            id: row.id,
            columns: row.canonical_list_columns(),
        })
        .collect()
}

/// Decode every row's list columns and rewrite the ones that are not canonical.
///
/// # Errors
///
/// Returns an error if reading or updating a row fails.
pub(crate) async fn run_repair(pool: &sqlx::PgPool, dry_run: bool) -> anyhow::Result<()> {
    let rows = crystal_db::list_product_rows(pool).await?;
    let repairs = plan_repairs(&rows);

    if repairs.is_empty() {
        println!("scanned {} product(s); all list columns canonical", rows.len());
        return Ok(());
    }

    let mut rewritten = 0_usize;
    for repair in &repairs {
        if dry_run {
            println!(
                "would rewrite product {}: sizes={} images={} key_features={}",
                repair.id, repair.columns.sizes, repair.columns.images, repair.columns.key_features
            );
            continue;
        }
        if crystal_db::rewrite_list_columns(pool, repair.id, &repair.columns).await? {
            rewritten += 1;
            tracing::info!(product_id = repair.id, "rewrote list columns");
        }
    }

    if dry_run {
        println!(
            "scanned {} product(s); {} would be rewritten (dry run)",
            rows.len(),
            repairs.len()
        );
    } else {
        println!(
            "scanned {} product(s); rewrote {rewritten}",
            rows.len()
        );
    }
    Ok(())
}

/// Print every product as a table.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub(crate) async fn run_list(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let products = crystal_db::list_products(pool).await?;

    if products.is_empty() {
        println!("no products found");
        return Ok(());
    }

    println!("{:<8}{:<20}{:<10}NAME", "ID", "BRAND", "FEATURED");
    for product in &products {
        let name = if product.fields.name.chars().count() > 50 {
            format!("{}...", product.fields.name.chars().take(50).collect::<String>())
        } else {
            product.fields.name.clone()
        };
        println!(
            "{:<8}{:<20}{:<10}{}",
            product.id,
            product.fields.brand,
            if product.fields.featured { "yes" } else { "no" },
            name
        );
    }

    Ok(())
}
