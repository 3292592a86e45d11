use comfy_table::{Attribute, Cell, CellAlignment, Color, Table, modifiers, presets};

use crate::{core::compared::ComparedPlan, quantity::cost::Cents};

pub fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL_CONDENSED)
        .apply_modifier(modifiers::UTF8_ROUND_CORNERS)
        .enforce_styling();
    table.set_header(header);
    table
}

/// Top plans by the medium-usage yearly benchmark.
pub fn build_cheapest_table(plans: &[&ComparedPlan]) -> Table {
    let mut table = new_table(vec!["Plan", "Retailer", "Tariff", "Est. $/year"]);
    for plan in plans {
        table.add_row(vec![
            Cell::new(&plan.plan_name),
            Cell::new(&plan.retailer).add_attribute(Attribute::Dim),
            Cell::new(plan.classification.label()),
            Cell::new(
                plan.benchmarks
                    .medium
                    .map_or_else(|| "-".to_owned(), |benchmark| format!("${:.0}", benchmark.0)),
            )
            .set_alignment(CellAlignment::Right)
            .fg(Color::Green),
        ]);
    }
    table
}

/// Top plans by the best feed-in rate.
pub fn build_solar_table(plans: &[&ComparedPlan]) -> Table {
    let mut table = new_table(vec!["Plan", "Retailer", "Feed-in tariff"]);
    for plan in plans {
        let min = plan.rate_model.min_feed_in_rate();
        let max = plan.rate_model.max_feed_in_rate();
        let range = if min == max {
            format!("{:.1}c/kWh", max.0)
        } else {
            format!("{:.1} - {:.1}c/kWh", min.0, max.0)
        };
        table.add_row(vec![
            Cell::new(&plan.plan_name),
            Cell::new(&plan.retailer).add_attribute(Attribute::Dim),
            Cell::new(range).set_alignment(CellAlignment::Right).fg(Color::DarkYellow),
        ]);
    }
    table
}

/// Plans priced against the active usage scenario, cheapest first.
pub fn build_scenario_table(plans: &[&ComparedPlan]) -> Table {
    let mean_net_per_day = {
        let total: Cents = plans.iter().map(|plan| plan.cost.net_per_day).sum();
        if plans.is_empty() { Cents::ZERO } else { Cents(total.0 / plans.len() as f64) }
    };

    let mut table =
        new_table(vec!["Plan", "Retailer", "Tariff", "Supply c/day", "Net c/day", "Net $/month"]);
    for plan in plans {
        let net_per_day = plan.cost.net_per_day;
        table.add_row(vec![
            Cell::new(&plan.plan_name),
            Cell::new(&plan.retailer).add_attribute(Attribute::Dim),
            Cell::new(plan.classification.label()),
            Cell::new(format!("{:.2}", plan.rate_model.supply_charge.0))
                .set_alignment(CellAlignment::Right)
                .add_attribute(Attribute::Dim),
            Cell::new(format!("{:.2}", net_per_day.0)).set_alignment(CellAlignment::Right).fg(
                if net_per_day <= Cents::ZERO {
                    Color::Green
                } else if net_per_day <= mean_net_per_day {
                    Color::DarkYellow
                } else {
                    Color::Red
                },
            ),
            Cell::new(format!("{:.2}", plan.cost.net_per_month.0))
                .set_alignment(CellAlignment::Right),
        ]);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tables_render_one_line_per_plan() {
        let plans = [ComparedPlan::fixture("a"), ComparedPlan::fixture("b")];
        let rows: Vec<&ComparedPlan> = plans.iter().collect();
        assert_eq!(build_scenario_table(&rows).row_iter().count(), 2);
        assert_eq!(build_cheapest_table(&rows).row_iter().count(), 2);
    }
}
