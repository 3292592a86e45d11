//! [Energy Made Easy](https://www.energymadeeasy.gov.au/) client.
//!
//! The API is public but expects browser-like headers, and returns ex-GST prices
//! while the website displays GST-inclusive ones.

use std::time::Duration;

use itertools::Itertools;
use reqwest::{
    Client,
    header::{self, HeaderMap, HeaderValue},
};
use serde::{Deserialize, Serialize};

use crate::{
    api::{CustomerType, Fuel},
    prelude::*,
};

const API_BASE: &str = "https://api.energymadeeasy.gov.au";

pub struct Api(Client);

impl Api {
    pub fn try_new() -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::USER_AGENT,
            HeaderValue::from_static(
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/144.0.0.0 Safari/537.36",
            ),
        );
        headers.insert(header::ACCEPT, HeaderValue::from_static("*/*"));
        headers.insert(header::ORIGIN, HeaderValue::from_static("https://www.energymadeeasy.gov.au"));
        headers.insert(header::REFERER, HeaderValue::from_static("https://www.energymadeeasy.gov.au/"));
        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(60))
            .build()?;
        Ok(Self(client))
    }

    /// Validate a postcode and return the matching locations.
    #[instrument(skip_all, fields(postcode = postcode))]
    pub async fn validate_postcode(&self, postcode: &str) -> Result<Vec<Location>> {
        let response: LocationsResponse = self
            .0
            .get(format!("{API_BASE}/location/postcodes/{postcode}"))
            .send()
            .await
            .context("failed to call the postcode API")?
            .error_for_status()
            .context("the postcode request failed")?
            .json()
            .await
            .context("failed to deserialize the postcode response")?;
        Ok(response.data)
    }

    /// Fetch the supply areas (distributors) serving a postcode, deduplicated and name-sorted.
    #[instrument(skip_all, fields(postcode = postcode))]
    pub async fn get_supply_areas(&self, postcode: &str, fuel: Fuel) -> Result<Vec<SupplyArea>> {
        let response: MetaResponse = self
            .0
            .get(format!("{API_BASE}/consumerplan/plans/{postcode}/meta"))
            .query(&[("fuelType", fuel.code())])
            .send()
            .await
            .context("failed to call the meta API")?
            .error_for_status()
            .context("the meta request failed")?
            .json()
            .await
            .context("failed to deserialize the meta response")?;
        Ok(response
            .data
            .into_iter()
            .flat_map(|entry| entry.plan_data.supply_areas)
            .unique_by(|area| area.id.clone())
            .sorted_by(|lhs, rhs| lhs.name.cmp(&rhs.name))
            .collect())
    }

    /// Fetch all plans matching the query. An empty list is a valid response.
    #[instrument(skip_all, fields(postcode = query.postcode))]
    pub async fn get_plans(&self, query: &PlansQuery<'_>) -> Result<Vec<Plan>> {
        let response: PlansResponse = self
            .0
            .get(format!("{API_BASE}/consumerplan/plans"))
            .query(query)
            .send()
            .await
            .context("failed to call the plans API")?
            .error_for_status()
            .context("the plans request failed")?
            .json()
            .await
            .context("failed to deserialize the plans response")?;
        Ok(response.data.plans)
    }
}

#[derive(Serialize)]
pub struct PlansQuery<'a> {
    #[serde(rename = "usageDataSource")]
    usage_data_source: &'a str,

    #[serde(rename = "customerType")]
    customer_type: &'a str,

    #[serde(rename = "distE")]
    electricity_supply_area: &'a str,

    #[serde(rename = "distG")]
    gas_supply_area: &'a str,

    #[serde(rename = "fuelType")]
    fuel_type: &'a str,

    journey: &'a str,

    pub postcode: &'a str,
}

impl<'a> PlansQuery<'a> {
    pub const fn new(
        postcode: &'a str,
        fuel: Fuel,
        customer_type: CustomerType,
        supply_area_id: &'a str,
    ) -> Self {
        Self {
            usage_data_source: "noUsageFrontier",
            customer_type: customer_type.code(),
            electricity_supply_area: match fuel {
                Fuel::Electricity => supply_area_id,
                Fuel::Gas => "",
            },
            gas_supply_area: match fuel {
                Fuel::Electricity => "",
                Fuel::Gas => supply_area_id,
            },
            fuel_type: fuel.code(),
            journey: fuel.code(),
            postcode,
        }
    }
}

#[derive(Deserialize)]
struct LocationsResponse {
    #[serde(default)]
    data: Vec<Location>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Location {
    #[serde(default)]
    pub location: String,

    #[serde(default)]
    pub state: String,
}

#[derive(Deserialize)]
struct MetaResponse {
    #[serde(default)]
    data: Vec<MetaEntry>,
}

#[derive(Deserialize)]
struct MetaEntry {
    #[serde(rename = "planData")]
    plan_data: MetaPlanData,
}

#[derive(Deserialize)]
struct MetaPlanData {
    #[serde(rename = "supplyArea", default)]
    supply_areas: Vec<SupplyArea>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct SupplyArea {
    pub id: String,
    pub name: String,
}

#[derive(Deserialize)]
struct PlansResponse {
    data: PlansData,
}

#[derive(Deserialize)]
struct PlansData {
    #[serde(default)]
    plans: Vec<Plan>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Plan {
    #[serde(rename = "planData")]
    pub plan_data: PlanData,

    #[serde(default)]
    pub pcr: Option<PlanCostReference>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct PlanData {
    #[serde(rename = "planId", default)]
    pub plan_id: String,

    #[serde(rename = "planName", default)]
    pub plan_name: String,

    #[serde(rename = "retailerName", default)]
    pub retailer_name: String,

    /// Raw network tariff-type code, checked against the demand-tariff registry.
    #[serde(rename = "tariffType", default)]
    pub tariff_type: String,

    #[serde(rename = "fuelType", default)]
    pub fuel_type: String,

    /// The first contract is the primary offer.
    #[serde(rename = "contract", default)]
    pub contracts: Vec<Contract>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Contract {
    /// `SR` (single rate) or `TOU` (time of use).
    #[serde(rename = "pricingModel", default)]
    pub pricing_model: String,

    #[serde(rename = "tariffPeriod", default)]
    pub tariff_periods: Vec<TariffPeriod>,

    #[serde(rename = "solarFit", default)]
    pub solar_fit: Vec<SolarFit>,

    #[serde(rename = "controlledLoad", default)]
    pub controlled_load: Vec<ControlledLoad>,

    #[serde(rename = "fee", default)]
    pub fees: Vec<Fee>,

    #[serde(rename = "discount", default)]
    pub discounts: Vec<Discount>,

    #[serde(rename = "paymentOption", default)]
    pub payment_options: Vec<String>,

    #[serde(rename = "meterType", default)]
    pub meter_types: Vec<String>,

    #[serde(rename = "termType", default)]
    pub term_type: String,

    #[serde(rename = "benefitPeriod", default)]
    pub benefit_period: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct TariffPeriod {
    /// Ex-GST cents per day.
    #[serde(rename = "dailySupplyCharge", default)]
    pub daily_supply_charge: Option<f64>,

    /// Single-rate usage blocks (ex-GST).
    #[serde(rename = "blockRate", default)]
    pub block_rates: Vec<BlockRate>,

    /// Time-of-use blocks (ex-GST).
    #[serde(rename = "touBlock", default)]
    pub tou_blocks: Vec<TouBlock>,

    /// Presence of any entry flags the plan as requiring a demand meter.
    #[serde(rename = "demandCharge", default)]
    pub demand_charges: Vec<serde_json::Value>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct BlockRate {
    #[serde(rename = "unitPrice", default)]
    pub unit_price: f64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct TouBlock {
    /// `P` (peak), `OP` (off-peak) or `S` (shoulder); not always present.
    #[serde(rename = "type", default)]
    pub kind: Option<String>,

    #[serde(rename = "blockRate", default)]
    pub block_rates: Vec<BlockRate>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct SolarFit {
    /// `R` (retailer) or `G` (legacy government bonus scheme).
    #[serde(rename = "type", default)]
    pub kind: Option<String>,

    /// Flat feed-in rate in cents per kilowatt-hour, GST exempt.
    #[serde(default)]
    pub rate: Option<f64>,

    #[serde(rename = "singleTariffRates", default)]
    pub single_tariff_rates: Vec<SingleTariffRate>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct SingleTariffRate {
    #[serde(rename = "unitPrice", default)]
    pub unit_price: f64,

    /// Daily volume cap in kilowatt-hours; `0` means uncapped.
    #[serde(default)]
    pub volume: f64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ControlledLoad {
    #[serde(rename = "singleRate", default)]
    pub single_rate: ControlledLoadRate,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ControlledLoadRate {
    #[serde(rename = "displayName", default)]
    pub display_name: String,

    #[serde(default)]
    pub rates: Vec<BlockRate>,

    #[serde(rename = "dailySupplyCharge", default)]
    pub daily_supply_charge: Option<f64>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Fee {
    #[serde(rename = "feeType", default)]
    pub fee_type: String,

    #[serde(default)]
    pub amount: f64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Discount {
    #[serde(default)]
    pub name: String,

    #[serde(rename = "discountPercent", default)]
    pub percent: Option<f64>,

    #[serde(rename = "discountAmount", default)]
    pub amount: Option<f64>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct PlanCostReference {
    #[serde(default)]
    pub costs: BenchmarkCosts,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct BenchmarkCosts {
    #[serde(default)]
    pub electricity: Option<FuelBenchmarks>,

    #[serde(default)]
    pub gas: Option<FuelBenchmarks>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct FuelBenchmarks {
    #[serde(default)]
    pub small: Option<Benchmark>,

    #[serde(default)]
    pub medium: Option<Benchmark>,

    #[serde(default)]
    pub large: Option<Benchmark>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Benchmark {
    #[serde(default)]
    pub yearly: Option<YearlyBenchmark>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct YearlyBenchmark {
    #[serde(rename = "allDiscounts", default)]
    pub all_discounts: Option<f64>,

    #[serde(rename = "noDiscounts", default)]
    pub no_discounts: Option<f64>,
}
