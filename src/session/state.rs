//! Per-connection protocol state

/// Where a connection is in the command protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Reading commands
    #[default]
    Normal,
    /// Receiving a TAKETHIS article, answered with 239 at its terminator
    TakeThis,
    /// Receiving an IHAVE article, answered with 235 at its terminator
    IHave,
}

/// Transfer commands the server offers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Features {
    pub ihave: bool,
    pub streaming: bool,
}

impl Default for Features {
    fn default() -> Self {
        Self {
            ihave: true,
            streaming: true,
        }
    }
}

/// State of one client session
#[derive(Debug, Default)]
pub struct Session {
    id: u64,
    state: SessionState,
    pending_msgid: Option<String>,
    group: Option<String>,
    closing: bool,
}

impl Session {
    #[must_use]
    pub fn new(id: u64) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    #[inline]
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Message-id of the article being received, if any
    #[must_use]
    pub fn pending_msgid(&self) -> Option<&str> {
        self.pending_msgid.as_deref()
    }

    /// Currently selected group
    #[must_use]
    pub fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    pub fn select_group(&mut self, name: &str) {
        self.group = Some(name.to_string());
    }

    /// Whether QUIT (or an I/O failure) has ended the session
    #[inline]
    #[must_use]
    pub fn is_closing(&self) -> bool {
        self.closing
    }

    pub fn close(&mut self) {
        self.closing = true;
    }

    /// Start receiving an article for `msgid`
    pub fn begin_transfer(&mut self, state: SessionState, msgid: &str) {
        debug_assert!(state != SessionState::Normal);
        self.state = state;
        self.pending_msgid = Some(msgid.to_string());
    }

    /// Finish the current transfer, returning its state and message-id
    pub fn end_transfer(&mut self) -> (SessionState, String) {
        let state = std::mem::take(&mut self.state);
        (state, self.pending_msgid.take().unwrap_or_default())
    }
}
