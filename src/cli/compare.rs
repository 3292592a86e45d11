use std::path::PathBuf;

use chrono::Local;
use clap::Parser;
use enumset::EnumSet;
use itertools::Itertools;

use crate::{
    api::{
        CustomerType, Fuel,
        energy_made_easy::{Api, PlansQuery, SupplyArea},
    },
    core::{
        compared::ComparedPlan,
        eligibility::{EligibilityOptions, filter_plans},
        projection::{Sheet, project},
        scenario::UsageScenario,
    },
    prelude::*,
    quantity::energy::KilowattHours,
    reference::{DemandTariffRegistry, UsageProfile},
    tables,
    workbook::{self, RunMetadata, writer::write_workbook},
};

#[derive(Parser)]
pub struct CompareArgs {
    /// Postcode to search, for example 2000 or 2850.
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

    /// Supply area (distributor) identifier, or `all` for every area with plans.
    ///
    /// Required when the postcode sits on a distributor boundary; check your
    /// electricity bill if unsure.
    #[clap(long = "supply-area", env = "QUOKKA_SUPPLY_AREA")]
    pub supply_area: Option<String>,

    #[clap(flatten)]
    pub filter: FilterArgs,

    #[clap(flatten)]
    pub scenario: ScenarioArgs,

    #[clap(flatten)]
    pub output: OutputArgs,
}

#[derive(Parser)]
pub struct FilterArgs {
    /// Include plans that require a controlled load circuit.
    #[clap(long = "controlled-load", env = "QUOKKA_CONTROLLED_LOAD")]
    pub allow_controlled_load: bool,

    /// Include plans that require a demand meter.
    #[clap(long = "include-demand", env = "QUOKKA_INCLUDE_DEMAND")]
    pub allow_demand: bool,

    /// Disable eligibility filtering entirely (keep every plan the API returns).
    #[clap(long = "no-filter")]
    pub disable_filtering: bool,

    /// Demand tariff-code registry (TOML) overriding the built-in table.
    #[clap(long = "demand-codes", env = "QUOKKA_DEMAND_CODES")]
    pub demand_codes: Option<PathBuf>,
}

impl FilterArgs {
    pub const fn options(&self) -> EligibilityOptions {
        EligibilityOptions {
            allow_controlled_load: self.allow_controlled_load,
            allow_demand: self.allow_demand,
            disable_filtering: self.disable_filtering,
        }
    }

    pub fn registry(&self) -> Result<DemandTariffRegistry> {
        self.demand_codes
            .as_deref()
            .map_or_else(|| Ok(DemandTariffRegistry::default()), DemandTariffRegistry::load)
    }
}

#[derive(Parser)]
pub struct ScenarioArgs {
    /// Estimated daily consumption in kilowatt-hours.
    #[clap(long = "daily-usage-kwh", default_value = "20", env = "DAILY_USAGE_KWH")]
    pub daily_usage: KilowattHours,

    /// Estimated daily solar export in kilowatt-hours.
    #[clap(long = "solar-export-kwh", default_value = "10", env = "SOLAR_EXPORT_KWH")]
    pub daily_solar_export: KilowattHours,

    /// Peak/off-peak split used for time-of-use plans.
    #[clap(long = "usage-profile", value_enum, default_value = "flat", env = "USAGE_PROFILE")]
    pub usage_profile: UsageProfile,

    /// Daily kilowatt-hours on the controlled load circuit, when there is one.
    #[clap(long = "controlled-load-kwh", env = "CONTROLLED_LOAD_KWH")]
    pub controlled_load: Option<KilowattHours>,
}

impl ScenarioArgs {
    pub fn scenario(&self) -> UsageScenario {
        UsageScenario::builder()
            .daily_usage(self.daily_usage)
            .daily_solar_export(self.daily_solar_export)
            .peak_share(self.usage_profile.peak_share())
            .off_peak_share(self.usage_profile.off_peak_share())
            .maybe_controlled_load(self.controlled_load)
            .build()
    }
}

#[derive(Parser)]
pub struct OutputArgs {
    /// Output directory; derived from the postcode and supply area when omitted.
    #[clap(long = "output-dir", env = "QUOKKA_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Sheets to write, besides the always-present summary.
    #[clap(
        long = "sheets",
        value_enum,
        value_delimiter = ',',
        num_args = 1..,
        default_value = "all-plans,single-rate,time-of-use,best-solar-fit,cheapest-plans,plan-calculator",
    )]
    pub sheets: Vec<Sheet>,
}

impl OutputArgs {
    pub fn sheets(&self) -> EnumSet<Sheet> {
        self.sheets.iter().copied().collect()
    }

    pub fn directory(&self, postcode: &str, fuel: Fuel, area_names: &[String]) -> PathBuf {
        self.output_dir.clone().unwrap_or_else(|| {
            let area_suffix = match area_names {
                [single] => format!("_{}", sanitize(single)),
                _ => String::new(),
            };
            PathBuf::from(format!(
                "energy_plans_{postcode}_{}{area_suffix}_{}",
                fuel.code(),
                Local::now().format("%Y%m%d_%H%M%S"),
            ))
        })
    }
}

fn sanitize(name: &str) -> String {
    let safe: String = name
        .chars()
        .map(|character| {
            if character.is_alphanumeric() || character == '-' { character } else { '_' }
        })
        .collect();
    safe.trim_matches('_').chars().take(30).collect()
}

#[instrument(skip_all, fields(postcode = args.postcode))]
pub async fn compare(args: &CompareArgs) -> Result {
    let registry = args.filter.registry()?;
    let scenario = args.scenario.scenario();
    scenario.validate()?;

    let api = Api::try_new()?;

    let locations = api.validate_postcode(&args.postcode).await?;
    ensure!(
        !locations.is_empty(),
        "no locations found for postcode {} (Energy Made Easy covers NSW, QLD, SA, TAS and ACT)",
        args.postcode,
    );
    let location_names = locations
        .iter()
        .map(|location| format!("{}, {}", location.location, location.state))
        .join("; ");
    info!(locations = location_names.as_str(), "validated the postcode");

    let areas = api.get_supply_areas(&args.postcode, args.fuel).await?;
    let selected = select_supply_areas(areas, args.supply_area.as_deref())?;

    let mut compared = Vec::new();
    let mut area_names = Vec::new();
    for area in &selected {
        let query = PlansQuery::new(&args.postcode, args.fuel, args.customer_type, &area.id);
        let plans = api.get_plans(&query).await?;
        info!(supply_area = area.name.as_str(), n_plans = plans.len(), "fetched plans");
        if plans.is_empty() {
            continue;
        }
        area_names.push(area.name.clone());

        let (eligible, stats) = filter_plans(plans, &area.id, args.filter.options(), &registry);
        info!(
            stats.total,
            stats.demand_excluded,
            stats.controlled_load_excluded,
            stats.kept,
            "filtered plans",
        );

        for plan in &eligible {
            match ComparedPlan::try_new(plan, &args.postcode, &area.name, &scenario) {
                Ok(plan) => compared.push(plan),
                Err(error) => {
                    warn!(plan = plan.plan_data.plan_name.as_str(), %error, "skipping the plan");
                }
            }
        }
    }
    ensure!(!compared.is_empty(), "no plans available for postcode {}", args.postcode);
    info!(n_plans = compared.len(), "priced the plans");

    let metadata = RunMetadata {
        postcode: args.postcode.clone(),
        fuel: args.fuel,
        customer_type: args.customer_type,
        supply_areas: area_names.iter().join(" + "),
        generated_at: Local::now(),
    };
    let workbook = workbook::build(
        &metadata,
        &compared,
        args.output.sheets(),
        &scenario,
        args.scenario.usage_profile,
    );
    let directory = args.output.directory(&args.postcode, args.fuel, &area_names);
    write_workbook(&workbook, &directory)?;
    info!(directory = %directory.display(), n_sheets = workbook.sheets.len(), "wrote the workbook");

    let cheapest = project(&compared, Sheet::CheapestPlans);
    if !cheapest.rows.is_empty() {
        println!("Cheapest plans (medium usage, with discounts):");
        println!("{}", tables::build_cheapest_table(&cheapest.rows[..cheapest.rows.len().min(5)]));
    }
    let solar = project(&compared, Sheet::BestSolarFit);
    if !solar.rows.is_empty() {
        println!("Best solar feed-in tariffs:");
        println!("{}", tables::build_solar_table(&solar.rows[..solar.rows.len().min(5)]));
    }
    let calculator = project(&compared, Sheet::PlanCalculator);
    let mut by_scenario_cost = calculator.rows;
    by_scenario_cost.sort_by_key(|plan| plan.cost.net_per_day);
    println!("Your scenario ({} kWh/day, {} kWh/day exported):", scenario.daily_usage.0, scenario.daily_solar_export.0);
    println!("{}", tables::build_scenario_table(&by_scenario_cost[..by_scenario_cost.len().min(10)]));

    Ok(())
}

/// Pick the supply areas to fetch. Boundary postcodes are served by several
/// distributors and the right one depends on the street address, so an explicit
/// choice is required there.
fn select_supply_areas(
    areas: Vec<SupplyArea>,
    requested: Option<&str>,
) -> Result<Vec<SupplyArea>> {
    ensure!(!areas.is_empty(), "no supply areas serve this postcode");
    match requested {
        Some("all") => Ok(areas),
        Some(id) => {
            let area = areas.into_iter().find(|area| area.id == id);
            area.map_or_else(
                || bail!("unknown supply area `{id}`; rerun `quokka probe supply-areas` to list them"),
                |area| Ok(vec![area]),
            )
        }
        None if areas.len() == 1 => Ok(areas),
        None => {
            let choices =
                areas.iter().map(|area| format!("{} ({})", area.id, area.name)).join(", ");
            bail!(
                "this postcode is served by {} distributors: {choices}; \
                 pass --supply-area <id> or --supply-area all",
                areas.len(),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn areas() -> Vec<SupplyArea> {
        vec![
            SupplyArea { id: "4".to_owned(), name: "Ausgrid".to_owned() },
            SupplyArea { id: "13".to_owned(), name: "Endeavour Energy".to_owned() },
        ]
    }

    #[test]
    fn test_single_area_is_auto_selected() {
        let selected =
            select_supply_areas(vec![SupplyArea { id: "4".to_owned(), name: "Ausgrid".to_owned() }], None)
                .unwrap();
        assert_eq!(selected.len(), 1);
    }

    #[test]
    fn test_multiple_areas_require_a_choice() {
        assert!(select_supply_areas(areas(), None).is_err());
        assert_eq!(select_supply_areas(areas(), Some("13")).unwrap()[0].name, "Endeavour Energy");
        assert_eq!(select_supply_areas(areas(), Some("all")).unwrap().len(), 2);
        assert!(select_supply_areas(areas(), Some("99")).is_err());
    }

    #[test]
    fn test_sanitize_area_name() {
        assert_eq!(sanitize("Endeavour Energy"), "Endeavour_Energy");
        assert_eq!(sanitize("SA Power Networks (SAPN)"), "SA_Power_Networks__SAPN");
    }
}
