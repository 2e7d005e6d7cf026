use std::path::PathBuf;

pub const DEFAULT_SUBMIT_EDIT_URL: &str =
    "https://e5y4is5ldimrkhhl3wbiuv67gu0uzfea.lambda-url.us-west-2.on.aws/";
pub const DEFAULT_EXECUTE_URL: &str =
    "https://ajrpop5gpwumnljpyhl765znoa0yjbrn.lambda-url.us-west-2.on.aws/";
pub const DEFAULT_FETCH_SOURCE_URL: &str =
    "https://dhcev3ep44ypxhhmgldoxly6dq0otbrp.lambda-url.us-west-2.on.aws/";

pub(super) fn default_submit_edit_url() -> String {
    DEFAULT_SUBMIT_EDIT_URL.to_string()
}

pub(super) fn default_execute_url() -> String {
    DEFAULT_EXECUTE_URL.to_string()
}

pub(super) fn default_fetch_source_url() -> String {
    DEFAULT_FETCH_SOURCE_URL.to_string()
}

pub(super) fn default_branch_name() -> String {
    "main".to_string()
}

pub(super) fn default_file_extension() -> String {
    ".py".to_string()
}

pub(super) fn default_timeframe() -> String {
    crate::runs::TIMEFRAMES[0].to_string()
}

/// Logs go to the user cache directory, falling back to the working directory
pub(super) fn default_log_dir() -> PathBuf {
    let mut path = dirs::cache_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("runboard");
    path.push("logs");

    path
}
