//! HEAD, ARTICLE, BODY and XOVER

use tracing::debug;

use super::handler::ProtocolHandler;
use super::state::Session;
use crate::command::{ArticleSpec, Command, parse_range};
use crate::protocol::{codes, push_line, push_status, push_terminator, push_text};
use crate::queue::ByteQueue;
use crate::render::Article;

impl ProtocolHandler {
    pub(super) fn handle_article(
        &self,
        session: &Session,
        command: Command,
        arg: Option<&str>,
        out: &mut ByteQueue,
    ) {
        let Some(arg) = arg else {
            push_status(out, codes::COMMAND_SYNTAX_ERROR, "no article specified");
            return;
        };
        let Some(spec) = ArticleSpec::parse(arg) else {
            push_status(out, codes::COMMAND_SYNTAX_ERROR, "expected a number or <message-id>");
            return;
        };

        let rendered = {
            let store = self.store().lock();
            let target = match spec {
                ArticleSpec::MessageId(msgid) => self
                    .renderer
                    .object_id(msgid)
                    .map(|id| (0, id)),
                ArticleSpec::Number(number) => {
                    let Some(group) = session.group() else {
                        push_status(out, codes::NO_GROUP_SELECTED, "no newsgroup selected");
                        return;
                    };
                    store
                        .newsrc
                        .group(group)
                        .and_then(|g| g.id_of(number))
                        .map(|id| (number, id))
                }
            };
            let Some((number, object)) =
                target.and_then(|(n, id)| store.spool.retrieve(id).map(|o| (n, o)))
            else {
                push_status(out, codes::NO_SUCH_ARTICLE_NUMBER, "no such article");
                return;
            };
            self.renderer
                .render(&store.spool, object)
                .map(|article| (number, article))
        };

        let (number, article) = match rendered {
            Ok(found) => found,
            Err(e) => {
                debug!(conn = session.id(), "Cannot render article: {}", e);
                push_status(out, codes::FEATURE_NOT_SUPPORTED, "failure generating message");
                return;
            }
        };

        let (code, head, body) = match command {
            Command::Article => (codes::ARTICLE_FOLLOWS, true, true),
            Command::Head => (codes::HEAD_FOLLOWS, true, false),
            _ => (codes::BODY_FOLLOWS, false, true),
        };
        push_status(
            out,
            code,
            &format!("{} {} message generated, text follows", number, article.message_id),
        );
        write_article(out, &article, head, body);
        push_terminator(out);
    }

    pub(super) fn handle_xover(&self, session: &Session, arg: Option<&str>, out: &mut ByteQueue) {
        let Some(group) = session.group() else {
            push_status(out, codes::NO_GROUP_SELECTED, "no newsgroup selected");
            return;
        };
        let Some(arg) = arg else {
            push_status(out, codes::NO_CURRENT_ARTICLE, "No current article selected");
            return;
        };
        let Some(range) = parse_range(arg) else {
            push_status(out, codes::NO_CURRENT_ARTICLE, "No article(s) selected");
            return;
        };

        push_status(out, codes::OVERVIEW_FOLLOWS, "Overview information follows");
        let store = self.store().lock();
        if let Some(map) = store.newsrc.group(group) {
            for (number, id) in map.articles_in(range) {
                // Expunged or unrenderable articles are left out
                let Some(object) = store.spool.retrieve(id) else {
                    continue;
                };
                if let Ok(article) = self.renderer.render(&store.spool, object) {
                    push_line(out, &article.overview(number));
                }
            }
        }
        push_terminator(out);
    }
}

fn write_article(out: &mut ByteQueue, article: &Article, head: bool, body: bool) {
    if head {
        push_text(out, &article.header_text());
    }
    if head && body {
        push_line(out, "");
    }
    if body {
        push_text(out, &article.body);
    }
}
