//! Command argument types

use std::ops::RangeInclusive;

/// Article selector for HEAD, ARTICLE and BODY
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArticleSpec<'a> {
    /// Article number in the selected group
    Number(u64),
    /// Bracketed message-id, brackets included
    MessageId(&'a str),
}

impl<'a> ArticleSpec<'a> {
    /// Parse an argument; `None` means a syntax error
    ///
    /// Leading digits are an article number and anything after them is
    /// ignored. An argument without leading digits must be `<...>`.
    #[must_use]
    pub fn parse(arg: &'a str) -> Option<Self> {
        let digits = leading_digits(arg);
        if digits == 0 {
            return (arg.len() > 2 && arg.starts_with('<') && arg.ends_with('>'))
                .then_some(Self::MessageId(arg));
        }
        arg[..digits].parse().ok().map(Self::Number)
    }
}

/// Article number range for XOVER: `N`, `N-` or `N-M`
///
/// `None` means the range is malformed.
#[must_use]
pub fn parse_range(arg: &str) -> Option<RangeInclusive<u64>> {
    let digits = leading_digits(arg);
    if digits == 0 {
        return None;
    }
    let start: u64 = arg[..digits].parse().ok()?;
    match &arg[digits..] {
        "" => Some(start..=start),
        "-" => Some(start..=u64::MAX),
        rest => {
            let end = rest.strip_prefix('-')?;
            if end.is_empty() || leading_digits(end) != end.len() {
                return None;
            }
            Some(start..=end.parse().ok()?)
        }
    }
}

fn leading_digits(s: &str) -> usize {
    s.bytes().take_while(u8::is_ascii_digit).count()
}
