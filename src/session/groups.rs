//! LIST, GROUP and LISTGROUP

use super::handler::ProtocolHandler;
use super::state::Session;
use crate::protocol::{OVERVIEW_FMT, codes, push_line, push_status, push_terminator};
use crate::queue::ByteQueue;

impl ProtocolHandler {
    pub(super) fn handle_list(&self, arg: Option<&str>, out: &mut ByteQueue) {
        match arg {
            None => self.list_active(out),
            Some(keyword) if keyword.eq_ignore_ascii_case("ACTIVE") => self.list_active(out),
            Some(keyword) if keyword.eq_ignore_ascii_case("OVERVIEW.FMT") => {
                push_status(out, codes::INFORMATION_FOLLOWS, "Order of fields in overview database");
                for field in OVERVIEW_FMT {
                    push_line(out, field);
                }
                push_terminator(out);
            }
            Some(_) => push_status(out, codes::COMMAND_SYNTAX_ERROR, "keyword not recognized"),
        }
    }

    /// `name high low n` for every known group
    fn list_active(&self, out: &mut ByteQueue) {
        push_status(out, codes::INFORMATION_FOLLOWS, "list of newsgroups follows");
        let store = self.store().lock();
        for (name, group) in store.newsrc.groups() {
            push_line(out, &format!("{} {} {} n", name, group.high(), group.low()));
        }
        push_terminator(out);
    }

    /// Refresh and select a group; LISTGROUP also lists its numbers
    ///
    /// LISTGROUP lists every assigned number up to and including the high
    /// watermark, matching the `211 count low high` line sent before it.
    /// Numbers of expunged articles stay assigned, so the listing can hold
    /// numbers whose articles answer 423.
    pub(super) async fn handle_group(
        &self,
        session: &mut Session,
        arg: Option<&str>,
        out: &mut ByteQueue,
        list_numbers: bool,
    ) {
        let Some(name) = arg else {
            push_status(out, codes::COMMAND_SYNTAX_ERROR, "group must be specified");
            return;
        };

        if self.refresher.refresh_group(name).await {
            self.store().lock().expunge_and_persist();
        }

        let store = self.store().lock();
        let Some(group) = store.newsrc.group(name) else {
            push_status(out, codes::NO_SUCH_GROUP, "no such group");
            return;
        };

        push_status(
            out,
            codes::GROUP_SELECTED,
            &format!("{} {} {} {}", group.count(), group.low(), group.high(), name),
        );
        if list_numbers {
            for number in group.numbers() {
                push_line(out, &number.to_string());
            }
            push_terminator(out);
        }
        session.select_group(name);
    }
}
