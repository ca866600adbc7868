//! Command-line entry point: parse flags, load the model, run the form,
//! render the plan.
//!
//! Prompts and diagnostics go to stderr; the four result lines go to stdout.

use std::error::Error;
use std::io;
use std::path::PathBuf;
use std::process;

use clap::Parser;

use stockcast::form::prompt::{Prompter, RequestDraft};
use stockcast::form::{
    check_budget, check_daily_sales_percentage, check_market_share, parse_date, parse_flag,
    parse_machinery, parse_region, FieldError,
};
use stockcast::{InventoryPlan, SalesModel};

#[derive(Parser, Debug)]
#[command(
    name = "stockcast",
    version,
    about = "Sales quantity prediction and inventory planning."
)]
struct Args {
    /// Path to the XGBoost JSON model artifact.
    #[arg(long, default_value = "xgboost_model.json")]
    model: PathBuf,

    /// Request date (YYYY-MM-DD). Prompted for when omitted.
    #[arg(long)]
    date: Option<String>,

    /// Daily sales percentage, a fraction in [0, 1].
    #[arg(long)]
    daily_sales_percentage: Option<f64>,

    /// Market share percentage in [0, 100].
    #[arg(long)]
    market_share: Option<i64>,

    /// Political situation flag (0 or 1).
    #[arg(long)]
    political: Option<String>,

    /// Marketing strategy flag (0 or 1).
    #[arg(long)]
    marketing: Option<String>,

    /// Marketing budget, non-negative.
    #[arg(long)]
    budget: Option<f64>,

    /// Infrastructure machinery (1-based option number or exact label).
    #[arg(long)]
    machinery: Option<String>,

    /// Region (1-based option number or exact label).
    #[arg(long)]
    region: Option<String>,
}

/// Validate whatever fields arrived as flags; the prompter asks for the rest.
fn draft_from_args(args: &Args) -> Result<RequestDraft, FieldError> {
    Ok(RequestDraft {
        date: args.date.as_deref().map(parse_date).transpose()?,
        daily_sales_percentage: args
            .daily_sales_percentage
            .map(check_daily_sales_percentage)
            .transpose()?,
        market_share: args.market_share.map(check_market_share).transpose()?,
        political: args
            .political
            .as_deref()
            .map(|s| parse_flag("political situation", s))
            .transpose()?,
        marketing: args
            .marketing
            .as_deref()
            .map(|s| parse_flag("marketing strategy", s))
            .transpose()?,
        budget: args.budget.map(check_budget).transpose()?,
        machinery: args.machinery.as_deref().map(parse_machinery).transpose()?,
        region: args.region.as_deref().map(parse_region).transpose()?,
    })
}

fn render(plan: &InventoryPlan) {
    println!("Predicted Sales Quantity: {}", plan.predicted_quantity);
    println!("Safety Stock: {}", plan.safety_stock);
    println!("Reorder Point: {}", plan.reorder_point);
    println!("Inventory Suggestion: {}", plan.suggestion);
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let model = SalesModel::load(&args.model)?;
    let draft = draft_from_args(&args)?;

    let stdin = io::stdin();
    let request = Prompter::new(stdin.lock(), io::stderr()).fill(draft)?;

    render(&model.plan(&request));
    Ok(())
}

fn main() {
    env_logger::init();

    let args = Args::parse();
    if let Err(e) = run(args) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
