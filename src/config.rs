use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_path: String,
    /// Order status applied when a refund is reconciled (store-configurable).
    pub refunded_order_status: String,
    /// Payment method codes owned by this gateway module. The credit memo
    /// observer only touches orders paid through one of these.
    pub gateway_methods: Vec<String>,
    /// Method codes for alternative payment methods, which capture without
    /// an explicit authorization step.
    pub apm_methods: Vec<String>,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            database_path: env::var("DATABASE_PATH").unwrap_or_else(|_| "settler.db".to_string()),
            refunded_order_status: env::var("REFUNDED_ORDER_STATUS")
                .unwrap_or_else(|_| "refunded".to_string()),
            gateway_methods: env::var("GATEWAY_METHODS")
                .map(|v| parse_list(&v))
                .unwrap_or_else(|_| {
                    vec![
                        "gateway_cc".to_string(),
                        "gateway_apm".to_string(),
                        "gateway_vault".to_string(),
                    ]
                }),
            apm_methods: env::var("APM_METHODS")
                .map(|v| parse_list(&v))
                .unwrap_or_else(|_| vec!["gateway_apm".to_string()]),
        }
    }

    /// Whether an order's payment method belongs to this gateway module.
    pub fn is_gateway_method(&self, code: &str) -> bool {
        self.gateway_methods.iter().any(|m| m == code)
    }

    /// Whether an order's payment method captures without an authorization.
    pub fn is_apm_method(&self, code: &str) -> bool {
        self.apm_methods.iter().any(|m| m == code)
    }
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
