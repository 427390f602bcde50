//! AgriLink CLI - marketplace, soil data and session tools.
//!
//! # Usage
//!
//! ```bash
//! # Log in (email from flag or AGRILINK_EMAIL, password from AGRILINK_PASSWORD)
//! agrilink login -e farmer@example.com
//!
//! # Check whether the stored session is still valid
//! agrilink session status
//!
//! # Browse listings
//! agrilink products list
//!
//! # Place an order for 2 units of product 7, cash on delivery
//! agrilink orders place -p 7 -q 2 --address "12 Canal Road" --city Nashik \
//!     --phone 9876543210
//!
//! # Submit a soil record and ask for a crop recommendation
//! agrilink soil recommend --location "North field" -n 90 --phosphorus 42 \
//!     -k 43 --ph 6.5 --rainfall 820 --temperature 26
//! ```
//!
//! # Commands
//!
//! - `login` / `logout` - session lifecycle
//! - `session status` - validity of the stored token pair
//! - `products list|show` - marketplace listings
//! - `orders list|place` - order history and submission
//! - `soil locations|submit|recommend` - soil records and recommendations
//! - `posts list|create` - community feed

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "agrilink")]
#[command(author, version, about = "AgriLink marketplace CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and persist the session tokens
    Login {
        /// Account email (falls back to `AGRILINK_EMAIL`)
        #[arg(short, long)]
        email: Option<String>,
    },
    /// Clear the stored session
    Logout,
    /// Inspect the stored session
    Session {
        #[command(subcommand)]
        action: SessionAction,
    },
    /// Marketplace listings
    Products {
        #[command(subcommand)]
        action: ProductAction,
    },
    /// Orders
    Orders {
        #[command(subcommand)]
        action: OrderAction,
    },
    /// Soil records and crop recommendations
    Soil {
        #[command(subcommand)]
        action: SoilAction,
    },
    /// Community feed
    Posts {
        #[command(subcommand)]
        action: PostAction,
    },
}

#[derive(Subcommand)]
enum SessionAction {
    /// Report whether the stored tokens are present and unexpired
    Status,
}

#[derive(Subcommand)]
enum ProductAction {
    /// List all listings
    List,
    /// Show one listing
    Show {
        /// Product ID
        id: i64,
    },
}

#[derive(Subcommand)]
enum OrderAction {
    /// List your orders
    List,
    /// Place an order for a single product
    Place {
        /// Product ID
        #[arg(short, long)]
        product: i64,

        /// Quantity of units
        #[arg(short, long, default_value_t = 1)]
        quantity: i64,

        /// Shipping street address
        #[arg(long)]
        address: String,

        /// Shipping city
        #[arg(long)]
        city: String,

        /// Contact phone number
        #[arg(long)]
        phone: String,

        /// Payment method (`cash_on_delivery`, `bank_transfer`, `crypto`)
        #[arg(long, default_value = "cash_on_delivery")]
        payment: String,
    },
}

#[derive(Subcommand)]
enum SoilAction {
    /// List saved soil locations
    Locations,
    /// Save a soil record
    Submit {
        #[command(flatten)]
        data: commands::soil::SoilArgs,
    },
    /// Get a crop recommendation for soil data
    Recommend {
        #[command(flatten)]
        data: commands::soil::SoilArgs,
    },
}

#[derive(Subcommand)]
enum PostAction {
    /// List community posts
    List,
    /// Publish a post
    Create {
        /// Post title
        #[arg(short, long)]
        title: String,

        /// Post body
        #[arg(short, long)]
        body: String,
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
        Commands::Login { email } => commands::session::login(email.as_deref()).await?,
        Commands::Logout => commands::session::logout().await?,
        Commands::Session { action } => match action {
            SessionAction::Status => commands::session::status()?,
        },
        Commands::Products { action } => match action {
            ProductAction::List => commands::marketplace::list_products().await?,
            ProductAction::Show { id } => commands::marketplace::show_product(id).await?,
        },
        Commands::Orders { action } => match action {
            OrderAction::List => commands::marketplace::list_orders().await?,
            OrderAction::Place {
                product,
                quantity,
                address,
                city,
                phone,
                payment,
            } => {
                commands::marketplace::place_order(product, quantity, &address, &city, &phone, &payment)
                    .await?;
            }
        },
        Commands::Soil { action } => match action {
            SoilAction::Locations => commands::soil::locations().await?,
            SoilAction::Submit { data } => commands::soil::submit(data).await?,
            SoilAction::Recommend { data } => commands::soil::recommend(data).await?,
        },
        Commands::Posts { action } => match action {
            PostAction::List => commands::community::list_posts().await?,
            PostAction::Create { title, body } => {
                commands::community::create_post(title, body).await?;
            }
        },
    }
    Ok(())
}
