//! Terminal loop hosting the view controller.
use anyhow::Result;
use stats_core::{
    fetch_submission_counts, ClientConfig, Effect, StatsClient, TransitionError, UserAction,
    ViewController,
};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::{info, warn};

use crate::render::render;
use crate::transport::UreqTransport;

type Input = Lines<BufReader<Stdin>>;

/// A line typed by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    /// Bare enter: activate whatever the screen offers.
    Activate,
    Quit,
    Unknown,
}

/// Whether the input loop keeps going after handling a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

impl Command {
    fn parse(line: &str) -> Self {
        match line.trim() {
            "" | "f" | "fetch" | "r" | "retry" => Command::Activate,
            "q" | "quit" => Command::Quit,
            _ => Command::Unknown,
        }
    }
}

pub struct CliApp {
    client: StatsClient,
    transport: UreqTransport,
    controller: ViewController,
}

impl CliApp {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            client: StatsClient::new(config),
            transport: UreqTransport,
            controller: ViewController::new(),
        }
    }

    pub async fn run(mut self) -> Result<()> {
        let mut input = BufReader::new(tokio::io::stdin()).lines();
        println!("{}", render(self.controller.state()));

        while let Some(line) = input.next_line().await? {
            match Command::parse(&line) {
                Command::Quit => break,
                Command::Unknown => println!("enter to continue, q to quit"),
                Command::Activate => {
                    let Some(action) = self.controller.available_action() else {
                        continue;
                    };
                    let effect = match action {
                        UserAction::Fetch => self.controller.trigger_fetch(),
                        UserAction::Retry => self.controller.trigger_retry(),
                    };
                    if self.apply(effect, &mut input).await? == Flow::Quit {
                        break;
                    }
                }
            }
        }
        Ok(())
    }

    async fn apply(
        &mut self,
        effect: Result<Effect, TransitionError>,
        input: &mut Input,
    ) -> Result<Flow> {
        match effect {
            Ok(Effect::InvokeClient) => self.fetch(input).await,
            Ok(Effect::None) => Ok(Flow::Continue),
            Err(err) => {
                warn!(%err, "ignored user action");
                Ok(Flow::Continue)
            }
        }
    }

    /// Run one fetch off the input loop and resolve the controller with it.
    ///
    /// Input that arrives meanwhile goes through `while_loading`. Quitting
    /// abandons the fetch and leaves the controller in `Loading`.
    async fn fetch(&mut self, input: &mut Input) -> Result<Flow> {
        println!("{}", render(self.controller.state()));

        let client = self.client.clone();
        let transport = self.transport;
        let mut task =
            tokio::task::spawn_blocking(move || fetch_submission_counts(&client, &transport));

        let mut input_open = true;
        let outcome = loop {
            tokio::select! {
                joined = &mut task => break joined?,
                line = input.next_line(), if input_open => match line? {
                    Some(line) => {
                        if self.while_loading(&line) == Flow::Quit {
                            return Ok(Flow::Quit);
                        }
                    }
                    None => input_open = false,
                },
            }
        };

        self.controller.resolve(outcome)?;
        println!("{}", render(self.controller.state()));
        Ok(Flow::Continue)
    }

    /// A line typed while a fetch is in flight. Anything but quit is
    /// offered to the controller, which refuses it.
    fn while_loading(&mut self, line: &str) -> Flow {
        match Command::parse(line) {
            Command::Quit => Flow::Quit,
            _ => {
                if let Err(err) = self.controller.trigger_fetch() {
                    info!(%err, "fetch already in flight");
                }
                Flow::Continue
            }
        }
    }
}
