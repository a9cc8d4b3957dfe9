// --- Default value functions ---

pub(super) fn default_name() -> String {
    "Courier".to_string()
}
pub(super) fn default_data_dir() -> String {
    "~/.courier".to_string()
}
pub(super) fn default_log_level() -> String {
    "info".to_string()
}
pub(super) fn default_command_prefix() -> String {
    "!".to_string()
}
pub(super) fn default_open_label() -> String {
    "🟢-open".to_string()
}
pub(super) fn default_closed_label() -> String {
    "🔴-closed".to_string()
}
pub(super) fn default_tracker_endpoint() -> String {
    "https://www.doordash.com/graphql/getConsumerOrderStatus".to_string()
}
pub(super) fn default_timezone() -> String {
    "America/New_York".to_string()
}
pub(super) fn default_tracker_interval() -> u64 {
    10
}
pub(super) fn default_request_timeout() -> u64 {
    15
}
pub(super) fn default_payments_file() -> String {
    "~/.courier/payments.json".to_string()
}
