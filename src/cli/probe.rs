use clap::{Parser, Subcommand};
use comfy_table::{Cell, CellAlignment};
use itertools::Itertools;

use crate::{
    api::{
        CustomerType, Fuel,
        energy_made_easy::{Api, PlansQuery},
    },
    prelude::*,
    tables::new_table,
};

#[derive(Parser)]
pub struct ProbeArgs {
    #[command(subcommand)]
    pub command: ProbeCommand,
}

#[derive(Subcommand)]
pub enum ProbeCommand {
    /// List the supply areas serving a postcode, with their plan counts.
    SupplyAreas(ProbeQueryArgs),

    /// Count the raw plans per retailer, before any filtering.
    Plans(ProbeQueryArgs),
}

#[derive(Parser)]
pub struct ProbeQueryArgs {
    /// Postcode to search.
    pub postcode: String,

    #[clap(long, value_enum, default_value = "electricity", env = "QUOKKA_FUEL")]
    pub fuel: Fuel,

    #[clap(
        long = "customer-type",
        value_enum,
        default_value = "residential",
        env = "QUOKKA_CUSTOMER_TYPE"
    )]
    pub customer_type: CustomerType,

    /// Restrict to one supply area.
    #[clap(long = "supply-area", env = "QUOKKA_SUPPLY_AREA")]
    pub supply_area: Option<String>,
}

pub async fn probe(args: &ProbeArgs) -> Result {
    match &args.command {
        ProbeCommand::SupplyAreas(args) => probe_supply_areas(args).await,
        ProbeCommand::Plans(args) => probe_plans(args).await,
    }
}

#[instrument(skip_all, fields(postcode = args.postcode))]
async fn probe_supply_areas(args: &ProbeQueryArgs) -> Result {
    let api = Api::try_new()?;
    let areas = api.get_supply_areas(&args.postcode, args.fuel).await?;
    ensure!(!areas.is_empty(), "no supply areas serve postcode {}", args.postcode);

    let mut table = new_table(vec!["ID", "Supply Area", "Plans"]);
    for area in &areas {
        let query = PlansQuery::new(&args.postcode, args.fuel, args.customer_type, &area.id);
        let n_plans = api.get_plans(&query).await?.len();
        table.add_row(vec![
            Cell::new(&area.id),
            Cell::new(&area.name),
            Cell::new(n_plans).set_alignment(CellAlignment::Right),
        ]);
    }
    println!("{table}");
    Ok(())
}

#[instrument(skip_all, fields(postcode = args.postcode))]
async fn probe_plans(args: &ProbeQueryArgs) -> Result {
    let api = Api::try_new()?;
    let supply_area = args.supply_area.as_deref().unwrap_or_default();
    let query = PlansQuery::new(&args.postcode, args.fuel, args.customer_type, supply_area);
    let plans = api.get_plans(&query).await?;
    info!(n_plans = plans.len(), "fetched plans");

    let mut table = new_table(vec!["Retailer", "Plans"]);
    let counts = plans
        .iter()
        .map(|plan| plan.plan_data.retailer_name.as_str())
        .counts()
        .into_iter()
        .sorted_by_key(|(retailer, count)| (std::cmp::Reverse(*count), *retailer))
        .collect_vec();
    for (retailer, count) in counts {
        table.add_row(vec![
            Cell::new(retailer),
            Cell::new(count).set_alignment(CellAlignment::Right),
        ]);
    }
    println!("{table}");
    Ok(())
}
