//! Resolves which file a view-code session is about from a navigation location
//!
//! Locations look like `/ViewCode?testName=tests/login.py`. Whatever trails the file extension
//! in `testName` is dropped.

/// Query parameter holding the target file
pub const TEST_NAME_PARAM: &str = "testName";

/// Path of the run details view, where a session navigates back to
pub const RUN_DETAILS_PATH: &str = "/RunDetails";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NavigationError {
    #[error("file path not provided in the location, expected a `testName` parameter")]
    MissingTestName,
}

/// Truncates at the first occurrence of `extension` and appends it again
///
/// A name without the extension gets it appended.
#[must_use]
pub fn normalize_test_name(raw: &str, extension: &str) -> String {
    if extension.is_empty() {
        return raw.to_string();
    }

    let stem = raw.find(extension).map_or(raw, |index| &raw[..index]);
    format!("{stem}{extension}")
}

/// Extracts and normalizes the target file from a location or bare query string
pub fn target_from_location(location: &str, extension: &str) -> Result<String, NavigationError> {
    let query = location
        .split_once('?')
        .map_or(location, |(_, query)| query);

    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == TEST_NAME_PARAM)
        .map(|(_, value)| value)
        .filter(|value| !value.trim().is_empty())
        .map(|value| normalize_test_name(value.trim(), extension))
        .ok_or(NavigationError::MissingTestName)
}

/// Location of the run details view for `test_name`
#[must_use]
pub fn run_details_location(test_name: &str) -> String {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair(TEST_NAME_PARAM, test_name)
        .finish();

    format!("{RUN_DETAILS_PATH}?{query}")
}
