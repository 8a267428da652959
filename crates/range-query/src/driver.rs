use std::io::{Read, Write};
use std::str::FromStr;

use crate::container::{range_query, Container};
use crate::error::DriverError;
use crate::parser::{next_command, Command, Rejected};

/// Executes every command in `input` against a fresh `C`, writing one line
/// per query to `out`.
///
/// Processing stops at the first bad command. Results of the queries before
/// it have already been written.
pub fn driver<C, T, W>(input: &str, out: &mut W) -> Result<C, DriverError>
where
    C: Container<T>,
    T: FromStr + Ord,
    W: Write,
{
    let offset = |rest: &str| input.len() - rest.len();
    let mut container = C::default();
    let mut rest = input;
    let mut queries = 0usize;

    loop {
        let (next, command) = match next_command::<T>(rest) {
            Ok(Some(parsed)) => parsed,
            Ok(None) => break,
            Err(Rejected::UnknownCommand(at)) => {
                return Err(DriverError::UnknownCommand { offset: offset(at) })
            }
            Err(Rejected::WrongInput(at)) => {
                return Err(DriverError::WrongInput { offset: offset(at) })
            }
        };
        match command {
            Command::Insert(value) => container.insert(value),
            Command::Query(first, last) => {
                writeln!(out, "{}", range_query(&container, &first, &last))?;
                queries += 1;
            }
        }
        rest = next;
    }

    tracing::debug!(values = container.len(), queries, "input processed");
    Ok(container)
}

/// Reads all of `input` and runs [`driver`] over it.
pub fn run<C, T, R, W>(mut input: R, mut out: W) -> Result<C, DriverError>
where
    C: Container<T>,
    T: FromStr + Ord,
    R: Read,
    W: Write,
{
    let mut buf = String::new();
    input.read_to_string(&mut buf)?;
    let container = driver::<C, T, W>(&buf, &mut out)?;
    out.flush()?;
    Ok(container)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use balanced_tree::BalancedTree;

    use super::*;

    fn output<C: Container<i64>>(input: &str) -> (Result<C, DriverError>, String) {
        let mut out = Vec::new();
        let result = driver::<C, i64, _>(input, &mut out);
        (result, String::from_utf8(out).unwrap())
    }

    #[test]
    fn counts_range() {
        let (result, out) = output::<BalancedTree<i64>>("k 1 k 3 k 5 q 0 10");
        assert_eq!(result.unwrap().len(), 3);
        assert_eq!(out, "3\n");
    }

    #[test]
    fn matches_reference() {
        let input = "k 10 k -4 q -5 5 k 7 q 7 7 q 8 100 k 7 q -100 100 q 3 2\n";
        let (_, ours) = output::<BalancedTree<i64>>(input);
        let (_, reference) = output::<BTreeSet<i64>>(input);
        assert_eq!(ours, "1\n1\n1\n3\n0\n");
        assert_eq!(ours, reference);
    }

    #[test]
    fn empty_input() {
        let (result, out) = output::<BalancedTree<i64>>(" \n ");
        assert!(result.unwrap().is_empty());
        assert_eq!(out, "");
    }

    #[test]
    fn unknown_command() {
        let (result, out) = output::<BalancedTree<i64>>("k 19 q 0 20 a 5 6");
        assert!(matches!(result, Err(DriverError::UnknownCommand { offset: 12 })));
        assert_eq!(out, "1\n");
    }

    #[test]
    fn wrong_input() {
        let (result, _) = output::<BTreeSet<i64>>("k e-5");
        assert!(matches!(result, Err(DriverError::WrongInput { offset: 2 })));

        let (result, _) = output::<BalancedTree<i64>>("q 7 abc");
        assert!(matches!(result, Err(DriverError::WrongInput { offset: 4 })));

        let (result, _) = output::<BalancedTree<i64>>("k 1 q 2");
        assert!(matches!(result, Err(DriverError::WrongInput { offset: 7 })));
    }

    #[test]
    fn any_isspace_separates() {
        let (result, out) = output::<BalancedTree<i64>>("k 1\x0cq 0 5");
        assert_eq!(result.unwrap().len(), 1);
        assert_eq!(out, "1\n");

        let (result, out) = output::<BalancedTree<i64>>("k 1\x0bk\x0b2\x0cq 0 5\x0b");
        assert_eq!(result.unwrap().len(), 2);
        assert_eq!(out, "2\n");
    }

    #[test]
    fn leading_command_char_wins() {
        let (result, _) = output::<BalancedTree<i64>>("query 1 2");
        assert!(matches!(result, Err(DriverError::WrongInput { offset: 1 })));

        let (result, _) = output::<BalancedTree<i64>>("kk 5");
        assert!(matches!(result, Err(DriverError::WrongInput { offset: 1 })));

        let (result, _) = output::<BalancedTree<i64>>("x 1");
        assert!(matches!(result, Err(DriverError::UnknownCommand { offset: 0 })));
    }

    #[test]
    fn run_reads_stream() {
        let mut out = Vec::new();
        let tree = run::<BalancedTree<i64>, i64, _, _>(&b"k 2 k 4 q 1 3"[..], &mut out).unwrap();
        assert_eq!(tree.len(), 2);
        assert_eq!(out, b"1\n");
    }

    #[test]
    fn run_rejects_invalid_utf8() {
        let result = run::<BTreeSet<i64>, i64, _, _>(&[b'k', b' ', 0xff][..], Vec::new());
        assert!(matches!(result, Err(DriverError::Io(_))));
    }
}
