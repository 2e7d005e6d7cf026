use std::sync::Arc;

use anyhow::Result;
use futures::StreamExt as _;
use tokio::{sync::mpsc, task};

use crate::{frontend::App, gateway::Gateway, runs::execute_batch, runs::RunSource, session};

use super::{
    command::{Command, CommandEvent},
    responder::CommandResponse,
};

/// Commands always flow via the `CommandHandler`
///
/// It is the principle entry point for the backend, and performs every remote call
#[derive(Debug)]
pub struct CommandHandler {
    /// Receives commands
    rx: mpsc::UnboundedReceiver<CommandEvent>,
    /// Sends commands
    tx: mpsc::UnboundedSender<CommandEvent>,

    gateway: Arc<dyn Gateway>,
    run_source: Arc<dyn RunSource>,
}

impl CommandHandler {
    pub fn new(gateway: Arc<dyn Gateway>, run_source: Arc<dyn RunSource>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();

        CommandHandler {
            rx,
            tx,
            gateway,
            run_source,
        }
    }

    pub fn register_ui(&mut self, app: &mut App) {
        app.command_tx = Some(self.tx.clone());
    }

    /// Sender for commands, for driving the handler without an `App`
    #[must_use]
    pub fn sender(&self) -> mpsc::UnboundedSender<CommandEvent> {
        self.tx.clone()
    }

    /// Starts the command handler
    ///
    /// Runs until a `Quit` command arrives or every sender is dropped.
    #[must_use]
    pub fn start(self) -> tokio::task::JoinHandle<()> {
        let CommandHandler {
            mut rx,
            tx,
            gateway,
            run_source,
        } = self;
        // The handler is only driven from outside
        drop(tx);

        task::spawn(async move {
            // JoinSet aborts running calls on drop
            let mut joinset = tokio::task::JoinSet::new();

            while let Some(event) = rx.recv().await {
                if event.command().is_quit() {
                    tracing::warn!("Backend received quit command, shutting down");
                    joinset.shutdown().await;
                    tracing::warn!("Backend shutdown complete");

                    break;
                }

                let gateway = Arc::clone(&gateway);
                let run_source = Arc::clone(&run_source);

                joinset.spawn(async move {
                    let result =
                        handle_command_event(gateway.as_ref(), run_source.as_ref(), &event).await;

                    if let Err(error) = result {
                        tracing::error!(
                            ?error,
                            cmd = %event.command(),
                            "Failed to handle command {cmd} with error {error:#}",
                            cmd = event.command()
                        );
                        event.responder().system_message(
                            event.uuid(),
                            &format!("Failed to handle command: {error:#}"),
                        );
                    }

                    event
                        .responder()
                        .send(CommandResponse::Completed(event.uuid()));
                });

                // Reap finished calls so the set does not grow for the lifetime of the app
                while joinset.try_join_next().is_some() {}
            }

            tracing::warn!("CommandHandler shutting down");
        })
    }
}

#[tracing::instrument(skip_all, fields(cmd = %event.command(), uuid = %event.uuid()), err)]
async fn handle_command_event(
    gateway: &dyn Gateway,
    run_source: &dyn RunSource,
    event: &CommandEvent,
) -> Result<()> {
    let now = std::time::Instant::now();
    tracing::debug!("Handling command {}", event.command());

    match event.command() {
        Command::Session { effect } => {
            let completion = session::perform(gateway, effect).await;
            event
                .responder()
                .send(CommandResponse::Session(event.uuid(), completion));
        }
        Command::LoadRuns { timeframe } => {
            let runs = run_source
                .fetch(timeframe)
                .await
                .map_err(|error| format!("{error:#}"));

            if let Err(error) = &runs {
                tracing::error!(%timeframe, "Failed to load runs: {error}");
            }
            event
                .responder()
                .send(CommandResponse::RunsLoaded(event.uuid(), runs));
        }
        Command::RerunTests { targets } => {
            let mut results = execute_batch(gateway, targets);
            while let Some((run_id, result)) = results.next().await {
                event
                    .responder()
                    .send(CommandResponse::RunResult(event.uuid(), run_id, result));
            }
        }
        Command::Quit => anyhow::bail!("Quit should be handled before dispatching"),
    }

    tracing::debug!(
        elapsed_ms = now.elapsed().as_millis(),
        "Command {} done",
        event.command()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use serde_json::json;
    use uuid::Uuid;

    use super::*;
    use crate::{
        commands::Responder,
        gateway::{requests::FetchSourceRequest, EndpointKind, GatewayError, MockGateway},
        runs::{Selected, UnconfiguredRunSource},
        session::{SessionAction, SessionEffect},
    };

    /// Collects responses and signals once a command completes
    #[derive(Debug)]
    struct Collect {
        responses: Mutex<Vec<CommandResponse>>,
        done: mpsc::UnboundedSender<()>,
    }

    impl Responder for Collect {
        fn send(&self, response: CommandResponse) {
            let completed = matches!(response, CommandResponse::Completed(_));
            self.responses.lock().unwrap().push(response);
            if completed {
                let _ = self.done.send(());
            }
        }
    }

    async fn run_command(
        gateway: MockGateway,
        command: Command,
    ) -> (Uuid, Vec<CommandResponse>) {
        let handler = CommandHandler::new(Arc::new(gateway), Arc::new(UnconfiguredRunSource));
        let tx = handler.sender();
        let handle = handler.start();

        let (done_tx, mut done_rx) = mpsc::unbounded_channel();
        let collect = Arc::new(Collect {
            responses: Mutex::new(Vec::new()),
            done: done_tx,
        });
        let uuid = Uuid::new_v4();

        tx.send(
            CommandEvent::builder()
                .command(command)
                .uuid(uuid)
                .responder(collect.clone() as Arc<dyn Responder>)
                .build()
                .unwrap(),
        )
        .unwrap();
        done_rx.recv().await.unwrap();

        tx.send(CommandEvent::quit()).unwrap();
        handle.await.unwrap();

        let responses = collect.responses.lock().unwrap().clone();
        (uuid, responses)
    }

    #[test_log::test(tokio::test)]
    async fn test_session_command_reports_completion_action() {
        let mut gateway = MockGateway::new();
        gateway
            .expect_call()
            .withf(|endpoint, _| *endpoint == EndpointKind::FetchSource)
            .returning(|_, _| Ok(json!("print(1)")));

        let effect = SessionEffect::FetchSource(FetchSourceRequest::new("a.py", "main"));
        let (uuid, responses) = run_command(gateway, Command::Session { effect }).await;

        assert_eq!(responses.len(), 2);
        assert!(matches!(
            &responses[0],
            CommandResponse::Session(id, SessionAction::SourceFetched(Ok(source)))
                if *id == uuid && source == "print(1)"
        ));
        assert!(matches!(responses[1], CommandResponse::Completed(id) if id == uuid));
    }

    #[test_log::test(tokio::test)]
    async fn test_rerun_reports_every_result() {
        let mut gateway = MockGateway::new();
        gateway
            .expect_call()
            .withf(|endpoint, _| *endpoint == EndpointKind::Execute)
            .times(2)
            .returning(|endpoint, payload| {
                if payload["filePath"] == "bad.py" {
                    Err(GatewayError::remote(endpoint, "boom"))
                } else {
                    Ok(json!({ "status": "Passed" }))
                }
            });

        let targets = vec![
            Selected {
                run_id: "1".into(),
                file_path: "good.py".into(),
            },
            Selected {
                run_id: "2".into(),
                file_path: "bad.py".into(),
            },
        ];
        let (_, responses) = run_command(gateway, Command::RerunTests { targets }).await;

        let mut results = responses
            .iter()
            .filter_map(|response| match response {
                CommandResponse::RunResult(_, run_id, result) => {
                    Some((run_id.clone(), result.is_ok()))
                }
                _ => None,
            })
            .collect::<Vec<_>>();
        results.sort();

        assert_eq!(results, [("1".to_string(), true), ("2".to_string(), false)]);
    }

    #[test_log::test(tokio::test)]
    async fn test_load_runs_reports_source_errors() {
        let (_, responses) = run_command(
            MockGateway::new(),
            Command::LoadRuns {
                timeframe: "today".into(),
            },
        )
        .await;

        assert!(matches!(
            &responses[0],
            CommandResponse::RunsLoaded(_, Err(message)) if message.contains("configured")
        ));
    }
}
