//! NNTP status codes used by the gateway (RFC 3977, RFC 4644)

// 1xx - Informational (RFC 3977 §3.2.1.1)

/// Capability list follows (RFC 3977 §5.2)
pub const CAPABILITY_LIST: u16 = 101;

// 2xx - Success (RFC 3977 §3.2.1.2)

/// Server ready, posting allowed (RFC 3977 §5.1.1)
pub const SERVICE_READY: u16 = 200;
/// Reader mode, no posting (RFC 3977 §5.3)
pub const NO_POSTING: u16 = 201;
/// Streaming permitted (RFC 4644 §2.3)
pub const STREAMING_OK: u16 = 203;
/// Group selected (RFC 3977 §6.1.1)
pub const GROUP_SELECTED: u16 = 211;
/// Information follows (RFC 3977 §7.6.1)
pub const INFORMATION_FOLLOWS: u16 = 215;
/// Article follows (RFC 3977 §6.2.1)
pub const ARTICLE_FOLLOWS: u16 = 220;
/// Head follows (RFC 3977 §6.2.2)
pub const HEAD_FOLLOWS: u16 = 221;
/// Body follows (RFC 3977 §6.2.3)
pub const BODY_FOLLOWS: u16 = 222;
/// Overview follows (RFC 3977 §8.3)
pub const OVERVIEW_FOLLOWS: u16 = 224;
/// New groups follow (RFC 3977 §7.3)
pub const NEW_GROUPS_FOLLOW: u16 = 231;
/// Article transferred OK (RFC 3977 §6.3.2)
pub const TRANSFER_OK: u16 = 235;
/// Send article, CHECK answer (RFC 4644 §2.4)
pub const CHECK_SEND: u16 = 238;
/// Article received, TAKETHIS answer (RFC 4644 §2.5)
pub const TAKETHIS_OK: u16 = 239;

// 3xx - Continuation (RFC 3977 §3.2.1.3)

/// Send article to be transferred (RFC 3977 §6.3.2)
pub const SEND_ARTICLE_TRANSFER: u16 = 335;

// 4xx - Temporary errors (RFC 3977 §3.2.1.4)

/// No such newsgroup (RFC 3977 §6.1.1)
pub const NO_SUCH_GROUP: u16 = 411;
/// No newsgroup selected (RFC 3977 §6.1.1)
pub const NO_GROUP_SELECTED: u16 = 412;
/// No current article / bad range (RFC 3977 §8.3)
pub const NO_CURRENT_ARTICLE: u16 = 420;
/// No article with that number (RFC 3977 §6.2.1)
pub const NO_SUCH_ARTICLE_NUMBER: u16 = 423;

// 5xx - Permanent errors (RFC 3977 §3.2.1.5)

/// Command not recognized (RFC 3977 §3.2.1)
pub const COMMAND_NOT_RECOGNIZED: u16 = 500;
/// Command syntax error (RFC 3977 §3.2.1)
pub const COMMAND_SYNTAX_ERROR: u16 = 501;
/// Feature not supported / cannot render (RFC 3977 §3.2.1)
pub const FEATURE_NOT_SUPPORTED: u16 = 503;
