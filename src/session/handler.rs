//! Command dispatch and the streaming-feed commands

use std::sync::Arc;

use tracing::debug;

use super::state::{Features, Session, SessionState};
use crate::command::{Command, CommandLine};
use crate::constants::server::IMPLEMENTATION;
use crate::metrics::WorkerCounters;
use crate::protocol::{codes, push_line, push_status, push_terminator};
use crate::queue::ByteQueue;
use crate::render::ContentRenderer;
use crate::source::Refresher;
use crate::store::SharedStore;

/// Executes client commands against the shared store
///
/// One handler is shared by every worker. It keeps no per-connection
/// state; that lives in [`Session`].
#[derive(Clone)]
pub struct ProtocolHandler {
    pub(super) refresher: Refresher,
    pub(super) renderer: Arc<dyn ContentRenderer>,
    features: Features,
    name: String,
}

impl ProtocolHandler {
    pub fn new(refresher: Refresher, renderer: Arc<dyn ContentRenderer>, features: Features) -> Self {
        Self {
            refresher,
            renderer,
            features,
            name: IMPLEMENTATION.to_string(),
        }
    }

    #[must_use]
    pub fn features(&self) -> Features {
        self.features
    }

    #[inline]
    pub(super) fn store(&self) -> &SharedStore {
        self.refresher.store()
    }

    /// Queue the connection greeting
    pub fn greeting(&self, out: &mut ByteQueue) {
        push_status(out, codes::SERVICE_READY, &format!("{} ready.", self.name));
    }

    /// Process one command line (terminator already stripped)
    ///
    /// May await an origin refresh, which stalls the calling worker until
    /// it completes.
    pub async fn handle_line(
        &self,
        session: &mut Session,
        line: &str,
        out: &mut ByteQueue,
        counters: &mut WorkerCounters,
    ) {
        debug!(conn = session.id(), "<- {}", line);

        if session.state() != SessionState::Normal {
            self.handle_transfer_line(session, line, out, counters);
            return;
        }

        let parsed = CommandLine::parse(line);
        let arg = parsed.arg;
        let Some(command) = parsed.command() else {
            push_status(
                out,
                codes::COMMAND_NOT_RECOGNIZED,
                &format!("Unknown command (I saw {}).", parsed.name),
            );
            return;
        };

        match command {
            Command::List => self.handle_list(arg, out),
            Command::Group => self.handle_group(session, arg, out, false).await,
            Command::ListGroup => self.handle_group(session, arg, out, true).await,
            Command::NewGroups => {
                push_status(out, codes::NEW_GROUPS_FOLLOW, "no new groups are announced");
                push_terminator(out);
            }
            Command::Head | Command::Article | Command::Body => {
                self.handle_article(session, command, arg, out)
            }
            Command::XOver => self.handle_xover(session, arg, out),
            Command::Capabilities => self.handle_capabilities(out),
            Command::Mode => self.handle_mode(arg, out),
            Command::Check => self.handle_check(arg, out, counters),
            Command::TakeThis | Command::IHave => {
                self.handle_offer(session, command, arg, out, counters)
            }
            Command::Quit => {
                session.close();
                self.store().lock().expunge_and_persist();
            }
        }
    }

    /// Article payload lines are discarded until the terminator
    fn handle_transfer_line(
        &self,
        session: &mut Session,
        line: &str,
        out: &mut ByteQueue,
        counters: &mut WorkerCounters,
    ) {
        if line != "." {
            return;
        }
        let (state, msgid) = session.end_transfer();
        let code = match state {
            SessionState::IHave => codes::TRANSFER_OK,
            _ => codes::TAKETHIS_OK,
        };
        push_status(out, code, &msgid);
        counters.accepted += 1;
    }

    fn handle_capabilities(&self, out: &mut ByteQueue) {
        push_status(out, codes::CAPABILITY_LIST, "Capability list:");
        push_line(out, "VERSION 2");
        push_line(
            out,
            &format!("IMPLEMENTATION {} {}", self.name, env!("CARGO_PKG_VERSION")),
        );
        push_line(out, "READER");
        push_line(out, "LIST ACTIVE OVERVIEW.FMT");
        if self.features.ihave {
            push_line(out, "IHAVE");
        }
        if self.features.streaming {
            push_line(out, "STREAMING");
        }
        push_terminator(out);
    }

    fn handle_mode(&self, arg: Option<&str>, out: &mut ByteQueue) {
        match arg {
            Some(mode) if mode.eq_ignore_ascii_case("STREAM") && self.features.streaming => {
                push_status(out, codes::STREAMING_OK, "Streaming OK.");
            }
            Some(mode) if mode.eq_ignore_ascii_case("READER") => {
                push_status(out, codes::NO_POSTING, "Hello, you can't post");
            }
            _ => push_status(out, codes::COMMAND_SYNTAX_ERROR, "Unknown MODE."),
        }
    }

    /// CHECK always wants the article
    fn handle_check(&self, arg: Option<&str>, out: &mut ByteQueue, counters: &mut WorkerCounters) {
        let Some(msgid) = self.transfer_arg(self.features.streaming, arg, out) else {
            return;
        };
        counters.offered += 1;
        push_status(out, codes::CHECK_SEND, msgid);
    }

    fn handle_offer(
        &self,
        session: &mut Session,
        command: Command,
        arg: Option<&str>,
        out: &mut ByteQueue,
        counters: &mut WorkerCounters,
    ) {
        if command == Command::IHave {
            let Some(msgid) = self.transfer_arg(self.features.ihave, arg, out) else {
                return;
            };
            push_status(out, codes::SEND_ARTICLE_TRANSFER, msgid);
            session.begin_transfer(SessionState::IHave, msgid);
            counters.offered += 1;
        } else {
            let Some(msgid) = self.transfer_arg(self.features.streaming, arg, out) else {
                return;
            };
            session.begin_transfer(SessionState::TakeThis, msgid);
        }
    }

    /// Message-id argument of a transfer command, or the error reply
    fn transfer_arg<'a>(
        &self,
        enabled: bool,
        arg: Option<&'a str>,
        out: &mut ByteQueue,
    ) -> Option<&'a str> {
        if !enabled {
            push_status(out, codes::COMMAND_NOT_RECOGNIZED, "Unknown command.");
            return None;
        }
        if arg.is_none() {
            push_status(out, codes::COMMAND_SYNTAX_ERROR, "Missing message-id.");
        }
        arg
    }
}
