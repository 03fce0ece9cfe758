//! Echo Bot Example
//!
//! A console bot that reads chat updates as JSON lines from stdin and
//! answers on stdout. It shows how handler groups interact:
//!
//! ```text
//! group -10  moderation   banned users end dispatch for the update
//! group   0  audit        logs every message, lets the commands below try
//!            commands     /echo, /ping, /help, /fail (first match wins)
//! group  10  stats        counts every update that got this far
//! ```
//!
//! # Usage
//!
//! ```bash
//! echo '{"update_id":1,"user":"ada","text":"/echo hi"}' | cargo run --package echo-bot
//! ```

use std::any::Any;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::{Context as _, Result, anyhow};
use clap::Parser;
use serde::Deserialize;
use switchyard::prelude::*;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

// ============================================================================
// Command line
// ============================================================================

#[derive(Debug, Parser)]
#[command(version, about = "Console echo bot built on Switchyard")]
struct Args {
    /// Configuration file (TOML).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Configuration profile.
    #[arg(short, long, default_value = "development")]
    profile: String,

    /// Users whose messages are dropped.
    #[arg(long = "ban", value_name = "USER")]
    banned: Vec<String>,
}

// ============================================================================
// Updates and bot
// ============================================================================

/// One chat message, as read from stdin.
#[derive(Debug, Clone, Deserialize)]
struct ChatMessage {
    update_id: i64,
    user: String,
    text: String,
}

impl Event for ChatMessage {
    fn event_name(&self) -> &'static str {
        "chat_message"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn update_id(&self) -> Option<i64> {
        Some(self.update_id)
    }
}

/// Writes replies to stdout.
struct ConsoleBot;

impl ConsoleBot {
    fn reply(&self, to: &ChatMessage, text: &str) {
        println!("[to {}] {}", to.user, text);
    }
}

impl Bot for ConsoleBot {
    fn id(&self) -> &str {
        "console"
    }

    fn as_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

fn console(bot: &BoxedBot) -> Option<Arc<ConsoleBot>> {
    Arc::clone(bot).as_any().downcast::<ConsoleBot>().ok()
}

/// Raised by the moderation handler; carries the signal that ends dispatch.
#[derive(Debug, thiserror::Error)]
#[error("user {user} is banned")]
struct Banned {
    user: String,
    #[source]
    signal: DispatchSignal,
}

// ============================================================================
// Handlers
// ============================================================================

fn command(message: &BoxedEvent, name: &str) -> bool {
    message
        .downcast_ref::<ChatMessage>()
        .and_then(|m| m.text.split_whitespace().next())
        .is_some_and(|word| word == name)
}

fn register_handlers(dispatcher: &Dispatcher, banned: HashSet<String>, seen: Arc<AtomicU64>) {
    dispatcher.add_to_group(
        -10,
        HandlerBuilder::new()
            .id("moderation")
            .on::<ChatMessage>()
            .check(move |event| {
                event
                    .downcast_ref::<ChatMessage>()
                    .is_some_and(|m| banned.contains(&m.user))
            })
            .handle(|_bot, ctx| async move {
                let user = ctx
                    .event_as::<ChatMessage>()
                    .map(|m| m.user.clone())
                    .unwrap_or_default();
                warn!(%user, "Dropping message from banned user");
                Err::<(), _>(Banned {
                    user,
                    signal: DispatchSignal::EndGroups,
                })
            }),
    );

    dispatcher.add(
        HandlerBuilder::new()
            .id("audit")
            .on::<ChatMessage>()
            .handle(|_bot, ctx| async move {
                if let Some(m) = ctx.event_as::<ChatMessage>() {
                    info!(update = m.update_id, user = %m.user, "{}", m.text);
                }
                Outcome::ContinueGroup
            }),
    );

    dispatcher.add(
        HandlerBuilder::new()
            .id("echo")
            .check(|event| command(event, "/echo"))
            .handle(|bot, ctx| async move {
                let (Some(bot), Some(m)) = (console(&bot), ctx.event_as::<ChatMessage>()) else {
                    return;
                };
                let text = m.text.trim_start_matches("/echo").trim();
                bot.reply(m, if text.is_empty() { "(nothing to echo)" } else { text });
            }),
    );

    dispatcher.add(
        HandlerBuilder::new()
            .id("ping")
            .check(|event| command(event, "/ping"))
            .handle(|bot, ctx| async move {
                if let (Some(bot), Some(m)) = (console(&bot), ctx.event_as::<ChatMessage>()) {
                    bot.reply(m, "Pong!");
                }
            }),
    );

    dispatcher.add(
        HandlerBuilder::new()
            .id("help")
            .check(|event| command(event, "/help"))
            .handle(|bot, ctx| async move {
                if let (Some(bot), Some(m)) = (console(&bot), ctx.event_as::<ChatMessage>()) {
                    bot.reply(m, "Commands: /echo <text>, /ping, /help, /fail");
                }
            }),
    );

    dispatcher.add(
        HandlerBuilder::new()
            .id("fail")
            .check(|event| command(event, "/fail"))
            .handle(|_bot, _ctx| async { Err::<(), _>(anyhow!("asked to fail")) }),
    );

    dispatcher.add_to_group(
        10,
        HandlerBuilder::new().id("stats").handle(move |_bot, _ctx| {
            let seen = Arc::clone(&seen);
            async move {
                seen.fetch_add(1, Ordering::Relaxed);
            }
        }),
    );
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut builder = SwitchyardRuntime::builder()
        .profile(&args.profile)
        .error_reporter(|bot, event, err| {
            warn!(bot = bot.id(), update = ?event.update_id(), "Handler failed: {err}");
        });
    if let Some(path) = &args.config {
        builder = builder.config_file(path);
    }
    let runtime = builder.build().context("failed to start runtime")?;

    let seen = Arc::new(AtomicU64::new(0));
    register_handlers(
        runtime.dispatcher(),
        args.banned.into_iter().collect(),
        Arc::clone(&seen),
    );

    let (sender, receiver) = runtime.channel();
    let producer = tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<ChatMessage>(&line) {
                Ok(message) => sender.send(message).await?,
                Err(e) => warn!("Skipping malformed update: {e}"),
            }
        }
        anyhow::Ok(())
    });

    let stats = runtime.run(Arc::new(ConsoleBot), receiver).await;
    producer.await??;

    info!(
        updates = stats.updates,
        failures = stats.failures,
        reached_stats = seen.load(Ordering::Relaxed),
        "Input exhausted"
    );
    Ok(())
}
