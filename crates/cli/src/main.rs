//! Corner Store CLI - database migrations and back-office tools.
//!
//! # Usage
//!
//! ```bash
//! # Run storefront database migrations
//! cs-cli migrate
//!
//! # Create a staff account (password from CS_ACCOUNT_PASSWORD)
//! cs-cli account create -u alice --staff
//!
//! # Record an order for customer 3: two of product 12, one of product 7
//! cs-cli order create -c 3 -i 12:2 -i 7:1
//!
//! # Load the catalog
//! cs-cli catalog seed -f catalog.yaml
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `account create` - Create login accounts
//! - `order create` / `order mark-paid` - Administrative orders
//! - `payment record` - Record a payment against an order
//! - `shipment record` - Record a shipment
//! - `catalog seed` / `catalog delete-category` - Catalog maintenance

#![cfg_attr(not(test), forbid(unsafe_code))]

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};

use corner_store_core::{CategoryId, CustomerId, OrderId, ProductId};
use corner_store_storefront::forms::ShipmentForm;

mod commands;

#[derive(Parser)]
#[command(name = "cs-cli")]
#[command(author, version, about = "Corner Store CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage login accounts
    Account {
        #[command(subcommand)]
        action: AccountAction,
    },
    /// Manage orders
    Order {
        #[command(subcommand)]
        action: OrderAction,
    },
    /// Record payments
    Payment {
        #[command(subcommand)]
        action: PaymentAction,
    },
    /// Record shipments
    Shipment {
        #[command(subcommand)]
        action: ShipmentAction,
    },
    /// Maintain categories and products
    Catalog {
        #[command(subcommand)]
        action: CatalogAction,
    },
}

#[derive(Subcommand)]
enum AccountAction {
    /// Create a new account (password from `CS_ACCOUNT_PASSWORD`)
    Create {
        /// Login name
        #[arg(short, long)]
        username: String,

        /// Grant catalog management rights
        #[arg(long)]
        staff: bool,
    },
    /// Grant or revoke catalog management rights
    SetRole {
        /// Login name
        #[arg(short, long)]
        username: String,

        /// Make the account staff; without it the account becomes a customer
        #[arg(long)]
        staff: bool,
    },
}

#[derive(Subcommand)]
enum OrderAction {
    /// Create an unpaid order at current prices
    Create {
        /// Customer ID
        #[arg(short, long)]
        customer: i32,

        /// Line item as `<productId>:<quantity>`; repeatable
        #[arg(short, long = "item", required = true, value_parser = commands::orders::parse_item)]
        items: Vec<(ProductId, u32)>,
    },
    /// Mark an order as paid
    MarkPaid {
        /// Order ID
        order: i32,
    },
}

#[derive(Subcommand)]
enum PaymentAction {
    /// Record a payment against an order
    Record {
        /// Order ID
        #[arg(short, long)]
        order: i32,

        /// Payment method label, e.g. `card`
        #[arg(short, long)]
        method: String,

        /// Amount, e.g. `23.50`
        #[arg(short, long)]
        amount: String,
    },
}

#[derive(Subcommand)]
enum ShipmentAction {
    /// Record a shipment, optionally tied to an order
    Record {
        /// Order ID
        #[arg(short, long)]
        order: Option<i32>,

        #[arg(long)]
        address: String,

        #[arg(long)]
        city: String,

        #[arg(long)]
        state: String,

        #[arg(long)]
        country: String,

        #[arg(long)]
        zip: String,

        /// Shipment date (RFC 3339); defaults to now
        #[arg(long, value_parser = commands::orders::parse_date)]
        date: Option<DateTime<Utc>>,
    },
}

#[derive(Subcommand)]
enum CatalogAction {
    /// Load categories and products from a YAML file
    Seed {
        /// Path to the YAML file
        #[arg(short, long)]
        file: String,
    },
    /// Delete a category and all of its products
    DeleteCategory {
        /// Category ID
        category: i32,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Account { action } => match action {
            AccountAction::Create { username, staff } => {
                commands::account::create(&username, staff).await?;
            }
            AccountAction::SetRole { username, staff } => {
                commands::account::set_role(&username, staff).await?;
            }
        },
        Commands::Order { action } => match action {
            OrderAction::Create { customer, items } => {
                commands::orders::create(CustomerId::new(customer), &items).await?;
            }
            OrderAction::MarkPaid { order } => {
                commands::orders::mark_paid(OrderId::new(order)).await?;
            }
        },
        Commands::Payment { action } => match action {
            PaymentAction::Record {
                order,
                method,
                amount,
            } => {
                commands::orders::record_payment(OrderId::new(order), &method, &amount).await?;
            }
        },
        Commands::Shipment { action } => match action {
            ShipmentAction::Record {
                order,
                address,
                city,
                state,
                country,
                zip,
                date,
            } => {
                let form = ShipmentForm {
                    address,
                    city,
                    state,
                    country,
                    zip_code: zip,
                };
                commands::orders::record_shipment(order.map(OrderId::new), date, &form).await?;
            }
        },
        Commands::Catalog { action } => match action {
            CatalogAction::Seed { file } => commands::catalog::seed(&file).await?,
            CatalogAction::DeleteCategory { category } => {
                commands::catalog::delete_category(CategoryId::new(category)).await?;
            }
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_order_items_parse() {
        let cli = Cli::try_parse_from(["cs-cli", "order", "create", "-c", "3", "-i", "12:2", "-i", "7:1"]);
        let Ok(Cli {
            command: Commands::Order {
                action: OrderAction::Create { customer, items },
            },
        }) = cli
        else {
            panic!("expected order create");
        };
        assert_eq!(customer, 3);
        assert_eq!(items, vec![(ProductId::new(12), 2), (ProductId::new(7), 1)]);
    }

    #[test]
    fn test_set_role_defaults_to_customer() {
        let cli = Cli::try_parse_from(["cs-cli", "account", "set-role", "-u", "bob"]);
        assert!(matches!(
            cli,
            Ok(Cli {
                command: Commands::Account {
                    action: AccountAction::SetRole { staff: false, .. },
                },
            })
        ));
    }

    #[test]
    fn test_order_create_requires_items() {
        assert!(Cli::try_parse_from(["cs-cli", "order", "create", "-c", "3"]).is_err());
    }
}
