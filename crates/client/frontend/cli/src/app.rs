//! Line-based console frontend.
//!
//! One loop owns the output and multiplexes three sources: bus events, input
//! lines and results of commands running in the background. Bus events are
//! polled first so narration always lands before the next prompt.
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use battle_runtime::{BattleSession, ClickOutcome, Event, Topic};
use client_frontend_core::{
    BattleLogConsumer, EventConsumer, Frontend, FrontendConfig, Hotbar, MessageLog, SkillCatalog,
    StatusPanel,
};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::{broadcast, mpsc};

use crate::command::{Command, HELP};
use crate::config::CliConfig;
use crate::presentation;

pub struct CliFrontend {
    frontend_config: FrontendConfig,
    cli_config: CliConfig,
    status: Arc<StatusPanel>,
}

impl CliFrontend {
    /// `status` must be the panel the session was built with.
    pub fn new(frontend_config: FrontendConfig, cli_config: CliConfig, status: Arc<StatusPanel>) -> Self {
        Self {
            frontend_config,
            cli_config,
            status,
        }
    }

    /// Runs the console over arbitrary streams and hands the output back.
    pub async fn run_with<R, W>(&self, session: BattleSession, input: R, output: W) -> Result<W>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let _animator = session.spawn_animator();
        let catalog = SkillCatalog::fetch(session.channel().as_ref()).await;

        let mut console = Console {
            session,
            output,
            prompt: self.cli_config.ui.prompt.clone(),
            show_cues: self.cli_config.ui.show_cues,
            log: BattleLogConsumer::new(MessageLog::new(self.frontend_config.messages.capacity)),
            status: Arc::clone(&self.status),
            catalog,
            hotbar: Hotbar::new(),
        };
        console.run(input).await?;
        Ok(console.output)
    }
}

#[async_trait]
impl Frontend for CliFrontend {
    async fn run(&mut self, session: BattleSession) -> Result<()> {
        let input = BufReader::new(tokio::io::stdin());
        let mut output = self.run_with(session, input, tokio::io::stdout()).await?;
        output.flush().await?;
        Ok(())
    }
}

struct Console<W> {
    session: BattleSession,
    output: W,
    prompt: String,
    show_cues: bool,
    log: BattleLogConsumer,
    status: Arc<StatusPanel>,
    catalog: SkillCatalog,
    hotbar: Hotbar,
}

enum Flow {
    Continue,
    Quit,
}

impl<W: AsyncWrite + Unpin> Console<W> {
    async fn run<R: AsyncBufRead + Unpin>(&mut self, input: R) -> Result<()> {
        let mut narration = self.session.subscribe(Topic::Narration);
        let mut presentation = self.session.subscribe(Topic::Presentation);
        let mut turns = self.session.subscribe(Topic::Turn);
        let (done_tx, mut done_rx) = mpsc::unbounded_channel::<String>();
        let mut lines = input.lines();

        self.write("type `help` for commands").await?;
        self.write_prompt().await?;

        loop {
            tokio::select! {
                biased;
                event = narration.recv() => self.on_bus(event).await?,
                event = presentation.recv() => self.on_bus(event).await?,
                event = turns.recv() => self.on_bus(event).await?,
                Some(result) = done_rx.recv() => self.write(&result).await?,
                line = lines.next_line() => {
                    let Some(line) = line? else { break };
                    if let Flow::Quit = self.on_line(&line, &done_tx).await? {
                        break;
                    }
                    self.write_prompt().await?;
                }
            }
        }

        // Flush what the last command narrated.
        for rx in [&mut narration, &mut presentation, &mut turns] {
            while let Ok(event) = rx.try_recv() {
                self.on_event(&event).await?;
            }
        }
        self.output.flush().await?;
        Ok(())
    }

    async fn on_bus(&mut self, event: Result<Event, broadcast::error::RecvError>) -> Result<()> {
        match event {
            Ok(event) => self.on_event(&event).await,
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "console fell behind the event bus");
                Ok(())
            }
            Err(broadcast::error::RecvError::Closed) => Ok(()),
        }
    }

    async fn on_event(&mut self, event: &Event) -> Result<()> {
        self.log.on_event(event);
        let line = match event {
            Event::Narration(line) if !line.text.trim().is_empty() => {
                Some(presentation::narration(line))
            }
            Event::Narration(_) => None,
            Event::Presentation(cue) => self.show_cues.then(|| presentation::cue(cue)),
            Event::Turn(turn) => presentation::turn(turn),
        };
        match line {
            Some(line) => self.write(&line).await,
            None => Ok(()),
        }
    }

    async fn on_line(&mut self, line: &str, done: &mpsc::UnboundedSender<String>) -> Result<Flow> {
        let command = match Command::parse(line) {
            Ok(Some(command)) => command,
            Ok(None) => return Ok(Flow::Continue),
            Err(err) => {
                self.write(&err.to_string()).await?;
                return Ok(Flow::Continue);
            }
        };
        tracing::debug!(?command, "console command");

        match command {
            Command::Start => {
                let turns = Arc::clone(self.session.turns());
                spawn_reporting(done, async move {
                    match turns.start_battle().await {
                        Ok(state) => format!("battle started ({})", state.phase),
                        Err(err) => format!("start failed: {err}"),
                    }
                });
            }
            Command::End => {
                let turns = Arc::clone(self.session.turns());
                spawn_reporting(done, async move {
                    match turns.end_turn().await {
                        Ok(state) => format!("turn ended ({})", state.phase),
                        Err(err) => format!("cannot end turn: {err}"),
                    }
                });
            }
            Command::Click(cell) => {
                let router = Arc::clone(self.session.router());
                spawn_reporting(done, async move {
                    match router.resolve_click(cell).await {
                        ClickOutcome::Moved { to } => format!("moved to {to}"),
                        ClickOutcome::Attacked { target } => format!("attacked {target}"),
                        ClickOutcome::AbilityUsed { target, ability_id } => {
                            format!("used {ability_id} on {target}")
                        }
                        ClickOutcome::Cancelled => "targeting cancelled".to_string(),
                        ClickOutcome::Rejected(reason) => format!("rejected: {reason}"),
                        ClickOutcome::Failed { message } => format!("failed: {message}"),
                    }
                });
            }
            Command::Target(ability_id) => {
                if let Err(err) = self.session.router().start_targeting(ability_id) {
                    self.write(&format!("cannot target: {err}")).await?;
                }
            }
            Command::Slot(key) => {
                if let Err(err) = self.hotbar.activate(key, self.session.router()) {
                    self.write(&format!("cannot use key {key}: {err}")).await?;
                }
            }
            Command::Bind { key, skill_id } => {
                if let Err(err) = self.hotbar.bind(key, skill_id, self.session.bus()) {
                    self.write(&err.to_string()).await?;
                }
            }
            Command::Skills => {
                let lines = presentation::skills(&self.catalog);
                self.write_all(&lines).await?;
            }
            Command::Status => {
                let state = self.session.turns().state();
                let mut lines = presentation::status_card(self.status.card().as_ref());
                lines.push(match &state.current_turn {
                    Some(actor) => format!("phase: {} ({actor})", state.phase),
                    None => format!("phase: {}", state.phase),
                });
                lines.push(format!("mode: {:?}", self.session.router().mode()));
                lines.push(format!(
                    "hotbar: {}",
                    presentation::hotbar(&self.hotbar, &self.catalog)
                ));
                self.write_all(&lines).await?;
            }
            Command::Help => self.write(HELP).await?,
            Command::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    async fn write(&mut self, line: &str) -> Result<()> {
        self.output.write_all(line.as_bytes()).await?;
        self.output.write_all(b"\n").await?;
        self.output.flush().await?;
        Ok(())
    }

    async fn write_all(&mut self, lines: &[String]) -> Result<()> {
        for line in lines {
            self.write(line).await?;
        }
        Ok(())
    }

    async fn write_prompt(&mut self) -> Result<()> {
        self.output.write_all(self.prompt.as_bytes()).await?;
        self.output.flush().await?;
        Ok(())
    }
}

/// Runs a command in the background and reports its result line.
fn spawn_reporting<F>(done: &mpsc::UnboundedSender<String>, task: F)
where
    F: std::future::Future<Output = String> + Send + 'static,
{
    let done = done.clone();
    tokio::spawn(async move {
        let _ = done.send(task.await);
    });
}
