/// The remote endpoints the dashboard talks to
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum_macros::Display,
    strum_macros::AsRefStr,
    strum_macros::EnumIter,
)]
#[strum(serialize_all = "snake_case")]
pub enum EndpointKind {
    /// Ask the service to rewrite code based on a natural language request
    SubmitEdit,
    /// Run code remotely and collect its output
    Execute,
    /// Fetch the contents of a file from the repository
    FetchSource,
}
