//! Payment configuration

use std::collections::HashMap;

use serde::Deserialize;

use super::error::ValidationError;
use crate::domain::billing::PlanCatalog;

/// Payment provider configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentConfig {
    /// Provider REST API base URL
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Provider API access token
    pub access_token: String,

    /// Standard Webhooks signing secret (`whsec_...`)
    pub webhook_secret: String,

    /// Where the provider sends buyers after checkout
    pub checkout_success_url: String,

    /// Subscription products keyed by `<plan>_<interval>`
    ///
    /// `COURSE_MARKET__PAYMENT__PLANS__PRO_MONTH=prod_123`
    #[serde(default)]
    pub plans: HashMap<String, String>,

    /// Days a processed webhook delivery is remembered for deduplication
    #[serde(default = "default_webhook_retention_days")]
    pub webhook_retention_days: u32,
}

impl PaymentConfig {
    /// Plan catalog built from the configured products.
    pub fn plan_catalog(&self) -> PlanCatalog {
        PlanCatalog::new(self.plans.clone())
    }

    /// Validate payment configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.access_token.is_empty() {
            return Err(ValidationError::MissingRequired("PAYMENT__ACCESS_TOKEN"));
        }
        if self.webhook_secret.is_empty() {
            return Err(ValidationError::MissingRequired("PAYMENT__WEBHOOK_SECRET"));
        }
        if self.checkout_success_url.is_empty() {
            return Err(ValidationError::MissingRequired(
                "PAYMENT__CHECKOUT_SUCCESS_URL",
            ));
        }
        if !self.api_base_url.starts_with("https://") && !self.api_base_url.starts_with("http://") {
            return Err(ValidationError::InvalidUrl("PAYMENT__API_BASE_URL"));
        }
        if self.webhook_retention_days == 0 {
            return Err(ValidationError::MissingRequired(
                "PAYMENT__WEBHOOK_RETENTION_DAYS",
            ));
        }
        if let Some(key) = self
            .plans
            .keys()
            .find(|k| !(k.ends_with("_month") || k.ends_with("_year")))
        {
            return Err(ValidationError::InvalidPlanKey(key.clone()));
        }

        Ok(())
    }
}

fn default_webhook_retention_days() -> u32 {
    30
}

fn default_api_base_url() -> String {
    "https://api.polar.sh".to_string()
}
