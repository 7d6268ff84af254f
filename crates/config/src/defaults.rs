pub fn default_app_name() -> String {
    "Bandstand".to_string()
}

pub fn default_base_url() -> String {
    "http://localhost:3000".to_string()
}

pub fn default_host() -> String {
    "0.0.0.0".to_string()
}

pub fn default_http_port() -> u16 {
    3000
}

pub fn default_max_connections() -> u32 {
    10
}

pub fn default_acquire_timeout() -> u64 {
    5
}

pub fn default_pooler() -> bool {
    true
}

pub fn default_retry_delay_ms() -> u64 {
    1000
}

pub fn default_run_migrations() -> bool {
    true
}

pub fn default_health_check_interval() -> u64 {
    30
}

pub fn default_payments_api_base() -> String {
    "https://api.stripe.com".to_string()
}

pub fn default_currency() -> String {
    "usd".to_string()
}

pub fn default_product_name() -> String {
    "Bandstand order".to_string()
}

pub fn default_log_format() -> String {
    "pretty".to_string()
}

pub fn default_metrics_port() -> u16 {
    9090
}
