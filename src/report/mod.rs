mod table;

pub use table::{Align, Table};

use crate::models::{PriceSnapshotRow, Product, Site};
use crate::parsers::format_price;
use crate::storage::TIMESTAMP_FORMAT;

/// Title-case a stored product name for display: "forbidden_city" → "Forbidden City".
pub fn display_name(name: &str) -> String {
    name.replace('_', " ")
        .split_whitespace()
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

pub fn product_list_table(products: &[Product]) -> Table {
    let mut table = Table::new(["Name"]);
    for product in products {
        table.add_row(vec![display_name(&product.name)]);
    }
    table
}

/// Name plus one right-aligned price column per site.
pub fn snapshot_table(rows: &[PriceSnapshotRow]) -> Table {
    let headers = std::iter::once("Name").chain(Site::ALL.iter().map(Site::display_name));
    let mut table = price_columns_right(Table::new(headers), 1);

    for row in rows {
        table.add_row(
            std::iter::once(display_name(&row.name))
                .chain(Site::ALL.iter().map(|site| format_price(row.price(*site))))
                .collect(),
        );
    }
    table
}

/// Every stored capture of one product, oldest first.
pub fn history_table(rows: &[PriceSnapshotRow]) -> Table {
    let headers = std::iter::once("Time").chain(Site::ALL.iter().map(Site::display_name));
    let mut table = price_columns_right(Table::new(headers), 1);

    for row in rows {
        table.add_row(
            std::iter::once(row.captured_at.format("%Y-%m-%d %H:%M").to_string())
                .chain(Site::ALL.iter().map(|site| format_price(row.price(*site))))
                .collect(),
        );
    }
    table
}

/// Cheapest site for each product in its latest capture.
pub fn compare_table(rows: &[PriceSnapshotRow]) -> Table {
    let mut table = Table::new(["Name", "Best Site", "Price"]).align(2, Align::Right);

    for row in rows {
        let (site, price) = match row.cheapest() {
            Some((site, price)) => (site.display_name().to_string(), format_price(price)),
            None => ("-".to_string(), "-".to_string()),
        };
        table.add_row(vec![display_name(&row.name), site, price]);
    }
    table
}

fn price_columns_right(table: Table, first: usize) -> Table {
    (first..first + Site::ALL.len()).fold(table, |table, col| table.align(col, Align::Right))
}

/// Chat message for a finished refresh cycle.
pub fn update_message(rows: &[PriceSnapshotRow], at: chrono::NaiveDateTime) -> String {
    format!(
        "{} Updated Prices - `{}`\n\n```\n{}\n```",
        crate::models::EMOJI_DICE,
        at.format(TIMESTAMP_FORMAT),
        snapshot_table(rows).render()
    )
}
