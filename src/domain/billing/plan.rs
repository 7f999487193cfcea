//! Subscription plans and their provider products.

use std::collections::HashMap;
use std::fmt;

/// Billing interval of a subscription plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BillingInterval {
    #[default]
    Month,
    Year,
}

impl BillingInterval {
    pub fn as_str(&self) -> &'static str {
        match self {
            BillingInterval::Month => "month",
            BillingInterval::Year => "year",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "month" => Some(BillingInterval::Month),
            "year" => Some(BillingInterval::Year),
            _ => None,
        }
    }
}

impl fmt::Display for BillingInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Maps `(plan, interval)` to the provider product sold for it.
///
/// Keys are `"{plan}_{interval}"`, e.g. `pro_month`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlanCatalog {
    products: HashMap<String, String>,
}

impl PlanCatalog {
    pub fn new(products: HashMap<String, String>) -> Self {
        Self { products }
    }

    pub fn with_product(
        mut self,
        plan_id: &str,
        interval: BillingInterval,
        product_id: impl Into<String>,
    ) -> Self {
        self.products
            .insert(Self::key(plan_id, interval), product_id.into());
        self
    }

    /// Provider product for the plan, ignoring blank entries.
    pub fn product_for(&self, plan_id: &str, interval: BillingInterval) -> Option<&str> {
        self.products
            .get(&Self::key(plan_id, interval))
            .map(|p| p.trim())
            .filter(|p| !p.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    fn key(plan_id: &str, interval: BillingInterval) -> String {
        format!("{}_{}", plan_id, interval.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn looks_up_by_plan_and_interval() {
        let catalog = PlanCatalog::default()
            .with_product("pro", BillingInterval::Month, "prod_pro_m")
            .with_product("pro", BillingInterval::Year, "prod_pro_y");

        assert_eq!(catalog.product_for("pro", BillingInterval::Month), Some("prod_pro_m"));
        assert_eq!(catalog.product_for("pro", BillingInterval::Year), Some("prod_pro_y"));
        assert_eq!(catalog.product_for("team", BillingInterval::Month), None);
    }

    #[test]
    fn blank_products_count_as_unconfigured() {
        let catalog = PlanCatalog::default().with_product("pro", BillingInterval::Month, "  ");
        assert_eq!(catalog.product_for("pro", BillingInterval::Month), None);
    }

    #[test]
    fn interval_parsing_is_strict() {
        assert_eq!(BillingInterval::parse("year"), Some(BillingInterval::Year));
        assert_eq!(BillingInterval::parse("yearly"), None);
        assert_eq!(BillingInterval::default(), BillingInterval::Month);
    }
}
