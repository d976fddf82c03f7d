//! A `Backend` whose answers, and how long each takes, are queued up by a test.

use crate::api::{Backend, Command, Envelope, Status};
use crate::Result;
use anyhow::bail;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

enum Outcome {
    Reply(Envelope),
    Unreachable,
}

struct Scripted {
    delay: Duration,
    outcome: Outcome,
}

/// Answers each command from its own queue, in call order. When a queue runs dry the command
/// answers `200` with a `null` message.
#[derive(Default)]
pub(crate) struct ScriptedBackend {
    queues: Mutex<HashMap<Command, VecDeque<Scripted>>>,
    calls: Mutex<Vec<(Command, Value)>>,
}

impl ScriptedBackend {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn push(&self, command: Command, delay: Duration, outcome: Outcome) {
        self.queues
            .lock()
            .unwrap()
            .entry(command)
            .or_default()
            .push_back(Scripted { delay, outcome });
    }

    /// Queues a successful answer carrying `message`.
    pub(crate) fn respond(&self, command: Command, delay: Duration, message: Value) {
        self.push(command, delay, Outcome::Reply(Envelope::ok("scripted", message)));
    }

    /// Queues an answer with an error status.
    pub(crate) fn reject(&self, command: Command, delay: Duration, status: Status) {
        self.push(
            command,
            delay,
            Outcome::Reply(Envelope::empty(status, "scripted rejection")),
        );
    }

    /// Queues a transport failure.
    pub(crate) fn fail(&self, command: Command, delay: Duration) {
        self.push(command, delay, Outcome::Unreachable);
    }

    pub(crate) fn calls(&self, command: Command) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(c, _)| *c == command)
            .count()
    }

    /// The arguments of every call to `command`, oldest first.
    pub(crate) fn args(&self, command: Command) -> Vec<Value> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(c, _)| *c == command)
            .map(|(_, args)| args.clone())
            .collect()
    }
}

#[async_trait::async_trait]
impl Backend for ScriptedBackend {
    async fn invoke(&self, command: Command, args: Value) -> Result<Envelope> {
        self.calls.lock().unwrap().push((command, args));
        let next = self
            .queues
            .lock()
            .unwrap()
            .get_mut(&command)
            .and_then(VecDeque::pop_front);
        let Some(scripted) = next else {
            return Ok(Envelope::empty(Status::Ok, "scripted default"));
        };
        tokio::time::sleep(scripted.delay).await;
        match scripted.outcome {
            Outcome::Reply(envelope) => Ok(envelope),
            Outcome::Unreachable => bail!("scripted transport failure for {command}"),
        }
    }
}
