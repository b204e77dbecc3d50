//! Nom parsers for the two tokens whose shape decides how a line parses.

use nom::{
    bytes::complete::take_till1,
    character::complete::{char, digit1},
    combinator::{all_consuming, map_res, opt},
    error::{context, VerboseError},
    sequence::preceded,
    IResult,
};

type ParseResult<I, O> = IResult<I, O, VerboseError<I>>;

/// A whole token of ASCII digits that fits a reply code.
fn numeric(input: &str) -> ParseResult<&str, u16> {
    context(
        "parsing reply numeric",
        all_consuming(map_res(digit1, |digits: &str| digits.parse::<u16>())),
    )(input)
}

/// The nick part of a `[:]nick!user@host` prefix.
fn nick(input: &str) -> ParseResult<&str, &str> {
    context(
        "parsing acting nick",
        preceded(opt(char(':')), take_till1(|c| c == '!' || c == '@')),
    )(input)
}

/// Returns the reply code if `token` is numeric.
pub(crate) fn reply_code(token: &str) -> Option<u16> {
    numeric(token).ok().map(|(_, code)| code)
}

/// Returns the acting nick encoded in a verb line's first token.
pub(crate) fn acting_nick(token: &str) -> Option<&str> {
    nick(token).ok().map(|(_, nick)| nick)
}
