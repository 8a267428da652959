use std::str::FromStr;

use nom::{
    bytes::complete::{take_till1, take_while},
    character::complete::anychar,
    combinator::{map, map_res},
    sequence::preceded,
    IResult, Parser,
};

pub const CMD_INSERT: char = 'k';
pub const CMD_QUERY: char = 'q';

#[derive(Clone, Debug, PartialEq)]
pub enum Command<T> {
    Insert(T),
    Query(T, T),
}

/// A command that could not be parsed, with the input starting at the
/// offending token.
#[derive(Debug, PartialEq)]
pub enum Rejected<'a> {
    UnknownCommand(&'a str),
    WrongInput(&'a str),
}

/// Separators between tokens: the C `isspace` set, which includes vertical
/// tab and form feed.
pub fn is_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\x0b' | '\x0c' | '\r')
}

pub fn arg<T: FromStr>(input: &str) -> IResult<&str, T> {
    preceded(
        take_while(is_space),
        map_res(take_till1(is_space), str::parse::<T>),
    )
    .parse(input)
}

pub fn insert<T: FromStr>(input: &str) -> IResult<&str, Command<T>> {
    map(arg::<T>, Command::Insert).parse(input)
}

pub fn query<T: FromStr>(input: &str) -> IResult<&str, Command<T>> {
    map((arg::<T>, arg::<T>), |(first, last)| Command::Query(first, last)).parse(input)
}

/// Parses the next command, or returns `Ok(None)` once only whitespace is
/// left.
///
/// The command is a single character; its arguments may follow it directly
/// or after whitespace, so `k5` and `k 5` are the same command.
pub fn next_command<T: FromStr>(input: &str) -> Result<Option<(&str, Command<T>)>, Rejected<'_>> {
    let token = input.trim_start_matches(is_space);
    let head: IResult<&str, char> = anychar(token);
    let Ok((args, cmd)) = head else {
        return Ok(None);
    };
    let parsed = match cmd {
        CMD_INSERT => insert::<T>(args),
        CMD_QUERY => query::<T>(args),
        _ => return Err(Rejected::UnknownCommand(token)),
    };
    match parsed {
        Ok((rest, command)) => Ok(Some((rest, command))),
        Err(nom::Err::Error(e) | nom::Err::Failure(e)) => Err(Rejected::WrongInput(e.input)),
        Err(nom::Err::Incomplete(_)) => Err(Rejected::WrongInput(args)),
    }
}
