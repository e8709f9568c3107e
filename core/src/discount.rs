//! Time-value discounting of per-site costs.
//!
//! Rounding follows banker's rounding (ties to even) on the summed cash
//! flows, before the WACC uplift is applied.

use crate::{config::GlobalParameters, types::Usd};

/// Adds the present value of `opex`, paid once per year over the return
/// period, to `start`. Year zero is undiscounted. Terms are added onto
/// `start` in year order.
fn add_discounted_opex(start: Usd, opex: Usd, global: &GlobalParameters) -> Usd {
    let rate = global.discount_rate / 100.0;
    (0..global.return_period).fold(start, |total, year| {
        total + opex / (1.0 + rate).powf(f64::from(year))
    })
}

fn apply_wacc(cost: Usd, wacc: f64) -> Usd {
    cost * (1.0 + wacc / 100.0)
}

/// Capex plus the opex it implies, discounted and uplifted by WACC.
pub fn discount_capex_and_opex(capex: Usd, global: &GlobalParameters, wacc: f64) -> Usd {
    let opex = (capex * (global.opex_percentage_of_capex / 100.0)).round_ties_even();
    let total = add_discounted_opex(capex, opex, global).round_ties_even();
    apply_wacc(total, wacc)
}

/// Annual opex discounted over the return period and uplifted by WACC.
pub fn discount_opex(opex: Usd, global: &GlobalParameters, wacc: f64) -> Usd {
    apply_wacc(add_discounted_opex(0.0, opex, global).round_ties_even(), wacc)
}
