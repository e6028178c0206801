//! The built-in storefront schema and its reference rows.

use super::schema::{ColumnSpec, ColumnType, SchemaDefinition, TableSpec};
use super::seed::{SeedDataset, SeedTable, SeedValue};
use crate::error::Result;
use rust_decimal::Decimal;

macro_rules! row {
    ($($value:expr),* $(,)?) => {
        vec![$(SeedValue::from($value)),*]
    };
}

const MONEY: ColumnType = ColumnType::Decimal {
    precision: 10,
    scale: 2,
};

fn money(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}

fn varchar(name: &str, len: u16) -> ColumnSpec {
    ColumnSpec::new(name, ColumnType::Varchar(len))
}

fn int(name: &str) -> ColumnSpec {
    ColumnSpec::new(name, ColumnType::Int)
}

/// Customers, suppliers, categories, products, orders, order lines and payments.
pub fn schema() -> Result<SchemaDefinition> {
    SchemaDefinition::new(vec![
        TableSpec::new("customers")
            .column(ColumnSpec::primary_key("customer_id"))
            .column(varchar("name", 100).not_null())
            .column(varchar("email", 100).unique())
            .column(varchar("phone", 15))
            .column(varchar("address", 255))
            .column(ColumnSpec::new("registration_date", ColumnType::Date)),
        TableSpec::new("suppliers")
            .column(ColumnSpec::primary_key("supplier_id"))
            .column(varchar("supplier_name", 100).not_null().unique())
            .column(varchar("contact_email", 100))
            .column(varchar("contact_phone", 15))
            .column(varchar("address", 255)),
        TableSpec::new("categories")
            .column(ColumnSpec::primary_key("category_id"))
            .column(varchar("category_name", 100).not_null().unique()),
        TableSpec::new("products")
            .column(ColumnSpec::primary_key("product_id"))
            .column(varchar("product_name", 100).not_null().unique())
            .column(int("category_id"))
            .column(ColumnSpec::new("price", MONEY))
            .column(int("stock_quantity"))
            .column(int("supplier_id"))
            .references("category_id", "categories")
            .references("supplier_id", "suppliers"),
        TableSpec::new("orders")
            .column(ColumnSpec::primary_key("order_id"))
            .column(int("customer_id"))
            .column(ColumnSpec::new("order_date", ColumnType::Date))
            .column(ColumnSpec::new("total_amount", MONEY))
            .references("customer_id", "customers"),
        TableSpec::new("orderdetails")
            .column(ColumnSpec::primary_key("order_detail_id"))
            .column(int("order_id"))
            .column(int("product_id"))
            .column(int("quantity"))
            .column(ColumnSpec::new("price_at_purchase", MONEY))
            .references("order_id", "orders")
            .references("product_id", "products"),
        TableSpec::new("payments")
            .column(ColumnSpec::primary_key("payment_id"))
            .column(int("order_id"))
            .column(ColumnSpec::new("payment_date", ColumnType::Date))
            .column(varchar("payment_method", 50))
            .column(ColumnSpec::new("amount", MONEY))
            .references("order_id", "orders"),
    ])
}

/// Ten rows per table, in dependency order.
pub fn seed() -> SeedDataset {
    SeedDataset::new(vec![
        SeedTable::new(
            "customers",
            ["name", "email", "phone", "address", "registration_date"],
        )
        .row(row!["Alice Brown", "alice@example.com", "1234567890", "123 Elm Street", "2024-01-15"])
        .row(row!["Bob Smith", "bob@example.com", "1234567891", "456 Maple Avenue", "2024-02-20"])
        .row(row!["Charlie Davis", "charlie@example.com", "1234567892", "789 Oak Lane", "2024-03-10"])
        .row(row!["Diana Green", "diana@example.com", "1234567893", "101 Pine Road", "2024-01-25"])
        .row(row!["Ethan White", "ethan@example.com", "1234567894", "202 Cedar Street", "2024-03-15"])
        .row(row!["Fiona Black", "fiona@example.com", "1234567895", "303 Birch Avenue", "2024-02-10"])
        .row(row!["George Blue", "george@example.com", "1234567896", "404 Walnut Drive", "2024-03-20"])
        .row(row!["Hannah Gold", "hannah@example.com", "1234567897", "505 Chestnut Lane", "2024-01-05"])
        .row(row!["Ian Silver", "ian@example.com", "1234567898", "606 Ash Street", "2024-02-25"])
        .row(row!["Julia Violet", "julia@example.com", "1234567899", "707 Spruce Road", "2024-03-05"]),
        SeedTable::new(
            "suppliers",
            ["supplier_name", "contact_email", "contact_phone", "address"],
        )
        .row(row!["Tech Supplies Inc.", "contact@techsupplies.com", "9876543210", "1 Tech Park"])
        .row(row!["Home Essentials Co.", "support@homeessentials.com", "9876543211", "2 Home Street"])
        .row(row!["Office Depot", "sales@officedepot.com", "9876543212", "3 Office Lane"])
        .row(row!["Green Gadgets", "info@greengadgets.com", "9876543213", "4 Gadget Avenue"])
        .row(row!["Smart Electronics", "support@smartelectronics.com", "9876543214", "5 Smart Road"])
        .row(row!["Kitchen Wonders", "hello@kitchenwonders.com", "9876543215", "6 Kitchen Street"])
        .row(row!["Furniture Mart", "contact@furnituremart.com", "9876543216", "7 Furniture Way"])
        .row(row!["Book Haven", "sales@bookhaven.com", "9876543217", "8 Book Alley"])
        .row(row!["Fashion World", "info@fashionworld.com", "9876543218", "9 Fashion Lane"])
        .row(row!["Toy Universe", "support@toyuni.com", "9876543219", "10 Toy Street"]),
        [
            "Electronics",
            "Home Goods",
            "Books",
            "Furniture",
            "Fashion",
            "Toys",
            "Kitchenware",
            "Office Supplies",
            "Outdoor",
            "Fitness",
        ]
        .into_iter()
        .fold(SeedTable::new("categories", ["category_name"]), |table, name| {
            table.row(row![name])
        }),
        SeedTable::new(
            "products",
            ["product_name", "category_id", "price", "stock_quantity", "supplier_id"],
        )
        .row(row!["Smartphone", 1, money(69999), 50, 1])
        .row(row!["Laptop", 1, money(119999), 30, 1])
        .row(row!["Microwave Oven", 2, money(29999), 20, 2])
        .row(row!["Fiction Book", 3, money(1999), 100, 8])
        .row(row!["Office Chair", 4, money(9999), 40, 3])
        .row(row!["T-shirt", 5, money(1599), 150, 9])
        .row(row!["Toy Car", 6, money(1299), 200, 10])
        .row(row!["Blender", 7, money(4999), 60, 6])
        .row(row!["Printer", 8, money(8999), 25, 3])
        .row(row!["Camping Tent", 9, money(19999), 15, 4]),
        SeedTable::new("orders", ["customer_id", "order_date", "total_amount"])
            .row(row![1, "2024-04-01", money(71998)])
            .row(row![2, "2024-04-05", money(29999)])
            .row(row![3, "2024-04-10", money(129999)])
            .row(row![4, "2024-04-15", money(1599)])
            .row(row![5, "2024-04-20", money(9999)])
            .row(row![6, "2024-04-25", money(4999)])
            .row(row![7, "2024-04-30", money(19999)])
            .row(row![8, "2024-05-01", money(11999)])
            .row(row![9, "2024-05-05", money(29999)])
            .row(row![10, "2024-05-10", money(1299)]),
        SeedTable::new(
            "orderdetails",
            ["order_id", "product_id", "quantity", "price_at_purchase"],
        )
        .row(row![1, 1, 1, money(69999)])
        .row(row![1, 4, 1, money(1999)])
        .row(row![2, 3, 1, money(29999)])
        .row(row![3, 2, 1, money(129999)])
        .row(row![4, 6, 1, money(1599)])
        .row(row![5, 5, 1, money(9999)])
        .row(row![6, 8, 1, money(4999)])
        .row(row![7, 10, 1, money(19999)])
        .row(row![8, 9, 1, money(11999)])
        .row(row![9, 3, 1, money(29999)]),
        SeedTable::new(
            "payments",
            ["order_id", "payment_date", "payment_method", "amount"],
        )
        .row(row![1, "2024-04-02", "Credit Card", money(71998)])
        .row(row![2, "2024-04-06", "PayPal", money(29999)])
        .row(row![3, "2024-04-11", "Credit Card", money(129999)])
        .row(row![4, "2024-04-16", "Cash", money(1599)])
        .row(row![5, "2024-04-21", "Credit Card", money(9999)])
        .row(row![6, "2024-04-26", "PayPal", money(4999)])
        .row(row![7, "2024-05-01", "Credit Card", money(19999)])
        .row(row![8, "2024-05-02", "Debit Card", money(11999)])
        .row(row![9, "2024-05-06", "PayPal", money(29999)])
        .row(row![10, "2024-05-11", "Credit Card", money(1299)]),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DatabaseBackend;

    #[test]
    fn test_schema_is_valid() {
        let schema = schema().unwrap();
        let names: Vec<&str> = schema.creation_order().map(|t| t.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "customers",
                "suppliers",
                "categories",
                "products",
                "orders",
                "orderdetails",
                "payments"
            ]
        );
    }

    #[test]
    fn test_seed_matches_schema() {
        let schema = schema().unwrap();
        let seed = seed();
        seed.validate_against(&schema).unwrap();

        assert_eq!(seed.tables().len(), 7);
        assert!(seed.tables().iter().all(|t| t.rows.len() == 10));
    }

    #[test]
    fn test_natural_keys_are_unique() {
        let schema = schema().unwrap();
        for (table, column) in [
            ("customers", "email"),
            ("suppliers", "supplier_name"),
            ("categories", "category_name"),
            ("products", "product_name"),
        ] {
            let spec = schema.table(table).unwrap();
            let col = spec.columns.iter().find(|c| c.name == column).unwrap();
            assert!(col.unique, "{table}.{column} should be unique");
        }
    }

    #[test]
    fn test_prices_render_with_two_decimals() {
        let sql = seed().tables()[3].insert_sql(DatabaseBackend::Mysql);
        assert!(sql.contains("('Smartphone', 1, 699.99, 50, 1)"));
        assert!(sql.contains("('Fiction Book', 3, 19.99, 100, 8)"));
    }
}
