use futures::{stream::FuturesUnordered, Stream};
use serde_json::{Map, Value};

use crate::gateway::{
    requests::{self, ExecuteRequest},
    Gateway, GatewayError,
};

use super::Selected;

/// Re-runs every target concurrently
///
/// Results are yielded in completion order, tagged with the run id they belong to.
pub fn execute_batch<'a, G: Gateway + ?Sized>(
    gateway: &'a G,
    targets: &'a [Selected],
) -> impl Stream<Item = (String, Result<Map<String, Value>, GatewayError>)> + Send + 'a {
    targets
        .iter()
        .map(|target| async move {
            let request = ExecuteRequest::for_file(&target.file_path);
            let result = requests::execute_raw(gateway, &request).await;
            (target.run_id.clone(), result)
        })
        .collect::<FuturesUnordered<_>>()
}
