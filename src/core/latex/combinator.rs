//! A small backtracking parser-combinator library.
//!
//! A [`Parser<T>`] is an explicit value wrapping a run function
//! `(input, position) -> Step<T>`; combinators compose by ordinary
//! function composition, with no shared state. `or` is an ordered
//! alternative that retries the second branch from the original position,
//! and every step threads the *furthest* failure seen so that the final
//! error message points at the deepest point the grammar reached (which is
//! how an unrecognized control sequence wins over the later "expected
//! EOF").

use regex::Regex;
use std::rc::Rc;

use crate::utils::error::ParseFailure;

/// A failure record: how far the parser got and what it wanted there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub furthest: usize,
    pub expected: String,
}

impl Failure {
    fn new(furthest: usize, expected: impl Into<String>) -> Self {
        Failure {
            furthest,
            expected: expected.into(),
        }
    }
}

/// Keep whichever failure got further; ties prefer the earlier record.
fn merge(a: Option<Failure>, b: Option<Failure>) -> Option<Failure> {
    match (a, b) {
        (None, b) => b,
        (a, None) => a,
        (Some(a), Some(b)) => {
            if b.furthest > a.furthest {
                Some(b)
            } else {
                Some(a)
            }
        }
    }
}

/// Outcome of running a parser at a position. Successes still carry the
/// furthest failure encountered while producing them, so later combinators
/// can report the most precise error.
#[derive(Debug, Clone)]
pub enum Step<T> {
    Ok {
        value: T,
        pos: usize,
        fail: Option<Failure>,
    },
    Err(Failure),
}

type RunFn<T> = dyn Fn(&str, usize) -> Step<T>;

/// A composable parser producing a `T`.
pub struct Parser<T> {
    run: Rc<RunFn<T>>,
}

impl<T> Clone for Parser<T> {
    fn clone(&self) -> Self {
        Parser {
            run: Rc::clone(&self.run),
        }
    }
}

impl<T: 'static> Parser<T> {
    /// Wrap a raw run function.
    pub fn new(f: impl Fn(&str, usize) -> Step<T> + 'static) -> Self {
        Parser { run: Rc::new(f) }
    }

    /// Run at a position.
    pub fn run(&self, input: &str, pos: usize) -> Step<T> {
        (self.run)(input, pos)
    }

    /// Run from the start of `input`. Trailing input is not an error here;
    /// grammars that require full consumption say so with [`eof`].
    pub fn parse(&self, input: &str) -> Result<T, ParseFailure> {
        match self.run(input, 0) {
            Step::Ok { value, .. } => Ok(value),
            Step::Err(f) => Err(ParseFailure::new(f.furthest, f.expected)),
        }
    }

    /// Always succeed with `value`, consuming nothing.
    pub fn succeed(value: T) -> Self
    where
        T: Clone,
    {
        Parser::new(move |_, pos| Step::Ok {
            value: value.clone(),
            pos,
            fail: None,
        })
    }

    /// Always fail with the given expectation.
    pub fn fail(expected: impl Into<String>) -> Self {
        let expected = expected.into();
        Parser::new(move |_, pos| Step::Err(Failure::new(pos, expected.clone())))
    }

    /// Defer construction of a parser until it runs; required for the
    /// grammar's recursive productions.
    pub fn lazy(f: impl Fn() -> Parser<T> + 'static) -> Self {
        Parser::new(move |input, pos| f().run(input, pos))
    }

    /// Transform the produced value.
    pub fn map<U: 'static>(&self, f: impl Fn(T) -> U + 'static) -> Parser<U> {
        let inner = self.clone();
        Parser::new(move |input, pos| match inner.run(input, pos) {
            Step::Ok { value, pos, fail } => Step::Ok {
                value: f(value),
                pos,
                fail,
            },
            Step::Err(e) => Step::Err(e),
        })
    }

    /// Monadic bind: feed the value into `f` and continue with the parser
    /// it returns.
    pub fn then<U: 'static>(&self, f: impl Fn(T) -> Parser<U> + 'static) -> Parser<U> {
        let inner = self.clone();
        Parser::new(move |input, pos| match inner.run(input, pos) {
            Step::Ok { value, pos, fail } => match f(value).run(input, pos) {
                Step::Ok {
                    value,
                    pos,
                    fail: fail2,
                } => Step::Ok {
                    value,
                    pos,
                    fail: merge(fail, fail2),
                },
                Step::Err(e) => Step::Err(merge(fail, Some(e)).expect("merged failure")),
            },
            Step::Err(e) => Step::Err(e),
        })
    }

    /// Ordered alternative: try `self`; on failure, retry `other` from the
    /// same position. First success wins.
    pub fn or(&self, other: Parser<T>) -> Parser<T> {
        let first = self.clone();
        Parser::new(move |input, pos| match first.run(input, pos) {
            ok @ Step::Ok { .. } => ok,
            Step::Err(e1) => match other.run(input, pos) {
                Step::Ok { value, pos, fail } => Step::Ok {
                    value,
                    pos,
                    fail: merge(Some(e1), fail),
                },
                Step::Err(e2) => Step::Err(merge(Some(e1), Some(e2)).expect("merged failure")),
            },
        })
    }

    /// Run `self`, then `next`, keeping `self`'s value.
    pub fn skip<U: 'static>(&self, next: Parser<U>) -> Parser<T> {
        let inner = self.clone();
        Parser::new(move |input, pos| match inner.run(input, pos) {
            Step::Ok { value, pos, fail } => match next.run(input, pos) {
                Step::Ok {
                    pos, fail: fail2, ..
                } => Step::Ok {
                    value,
                    pos,
                    fail: merge(fail, fail2),
                },
                Step::Err(e) => Step::Err(merge(fail, Some(e)).expect("merged failure")),
            },
            Step::Err(e) => Step::Err(e),
        })
    }

    /// Replace the produced value.
    pub fn result<U: Clone + 'static>(&self, value: U) -> Parser<U> {
        self.map(move |_| value.clone())
    }

    /// Zero-or-more repetitions, greedy.
    pub fn many(&self) -> Parser<Vec<T>> {
        let inner = self.clone();
        Parser::new(move |input, pos| {
            let mut values = Vec::new();
            let mut cur = pos;
            let mut fail = None;
            loop {
                match inner.run(input, cur) {
                    Step::Ok {
                        value,
                        pos: next,
                        fail: f,
                    } => {
                        // a parser that consumes nothing would loop forever
                        if next == cur {
                            values.push(value);
                            fail = merge(fail, f);
                            break;
                        }
                        values.push(value);
                        fail = merge(fail, f);
                        cur = next;
                    }
                    Step::Err(e) => {
                        fail = merge(fail, Some(e));
                        break;
                    }
                }
            }
            Step::Ok {
                value: values,
                pos: cur,
                fail,
            }
        })
    }

    /// Exactly `n` repetitions.
    pub fn times(&self, n: usize) -> Parser<Vec<T>> {
        let inner = self.clone();
        Parser::new(move |input, pos| {
            let mut values = Vec::with_capacity(n);
            let mut cur = pos;
            let mut fail = None;
            for _ in 0..n {
                match inner.run(input, cur) {
                    Step::Ok {
                        value,
                        pos: next,
                        fail: f,
                    } => {
                        values.push(value);
                        fail = merge(fail, f);
                        cur = next;
                    }
                    Step::Err(e) => {
                        return Step::Err(merge(fail, Some(e)).expect("merged failure"));
                    }
                }
            }
            Step::Ok {
                value: values,
                pos: cur,
                fail,
            }
        })
    }
}

/// Match an exact string.
pub fn string(expected: &'static str) -> Parser<String> {
    Parser::new(move |input, pos| {
        if input[pos..].starts_with(expected) {
            Step::Ok {
                value: expected.to_string(),
                pos: pos + expected.len(),
                fail: None,
            }
        } else {
            Step::Err(Failure::new(pos, format!("'{}'", expected)))
        }
    })
}

/// Match a regular expression at the current position. The pattern must be
/// anchored with `^` (all grammar patterns are).
pub fn regex(re: Regex) -> Parser<String> {
    Parser::new(move |input, pos| match re.find(&input[pos..]) {
        Some(m) if m.start() == 0 => Step::Ok {
            value: m.as_str().to_string(),
            pos: pos + m.end(),
            fail: None,
        },
        _ => Step::Err(Failure::new(pos, format!("/{}/", re.as_str()))),
    })
}

/// A single character matched by `pred`, described by `expected`.
fn satisfy(expected: &'static str, pred: impl Fn(char) -> bool + 'static) -> Parser<char> {
    Parser::new(move |input, pos| match input[pos..].chars().next() {
        Some(c) if pred(c) => Step::Ok {
            value: c,
            pos: pos + c.len_utf8(),
            fail: None,
        },
        _ => Step::Err(Failure::new(pos, expected)),
    })
}

/// One ASCII letter.
pub fn letter() -> Parser<char> {
    satisfy("a letter", |c| c.is_ascii_alphabetic())
}

/// One ASCII digit.
pub fn digit() -> Parser<char> {
    satisfy("a digit", |c| c.is_ascii_digit())
}

/// Any one character.
pub fn any_char() -> Parser<char> {
    satisfy("any character", |_| true)
}

/// The rest of the input, possibly empty.
pub fn all() -> Parser<String> {
    Parser::new(|input, pos| Step::Ok {
        value: input[pos..].to_string(),
        pos: input.len(),
        fail: None,
    })
}

/// End of input.
pub fn eof() -> Parser<()> {
    Parser::new(|input, pos| {
        if pos >= input.len() {
            Step::Ok {
                value: (),
                pos,
                fail: None,
            }
        } else {
            Step::Err(Failure::new(pos, "EOF"))
        }
    })
}

/// Zero or more whitespace characters.
pub fn opt_whitespace() -> Parser<()> {
    Parser::new(|input, pos| {
        let rest = &input[pos..];
        let skipped = rest.len() - rest.trim_start().len();
        Step::Ok {
            value: (),
            pos: pos + skipped,
            fail: None,
        }
    })
}

/// One or more whitespace characters.
pub fn whitespace() -> Parser<String> {
    Parser::new(|input, pos| {
        let rest = &input[pos..];
        let skipped = rest.len() - rest.trim_start().len();
        if skipped == 0 {
            Step::Err(Failure::new(pos, "whitespace"))
        } else {
            Step::Ok {
                value: rest[..skipped].to_string(),
                pos: pos + skipped,
                fail: None,
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_match() {
        assert_eq!(string("ab").parse("abc").unwrap(), "ab");
        assert!(string("ab").parse("ba").is_err());
    }

    #[test]
    fn test_or_backtracks() {
        let p = string("ab").or(string("a"));
        assert_eq!(p.parse("a!").unwrap(), "a");
    }

    #[test]
    fn test_then_sequences() {
        let p = string("a").then(|_| string("b"));
        assert_eq!(p.parse("ab").unwrap(), "b");
        assert!(p.parse("ax").is_err());
    }

    #[test]
    fn test_many_is_greedy_and_total() {
        let p = digit().many();
        assert_eq!(p.parse("123x").unwrap(), vec!['1', '2', '3']);
        assert_eq!(p.parse("x").unwrap(), Vec::<char>::new());
    }

    #[test]
    fn test_times_exact() {
        let p = digit().times(2);
        assert_eq!(p.parse("12").unwrap(), vec!['1', '2']);
        assert!(digit().times(3).parse("12").is_err());
    }

    #[test]
    fn test_skip_keeps_first_value() {
        let p = string("a").skip(string("b"));
        assert_eq!(p.parse("ab").unwrap(), "a");
    }

    #[test]
    fn test_eof() {
        assert!(string("a").skip(eof()).parse("a").is_ok());
        assert!(string("a").skip(eof()).parse("ab").is_err());
    }

    #[test]
    fn test_regex_anchored() {
        let p = regex(Regex::new(r"^[a-z]+").unwrap());
        assert_eq!(p.parse("abc1").unwrap(), "abc");
        assert!(p.parse("1abc").is_err());
    }

    #[test]
    fn test_furthest_failure_reported() {
        // the deeper failure (inside the committed branch) wins over the
        // shallow alternative
        let deep = string("ab").then(|_| Parser::<String>::fail("something specific"));
        let p = deep.or(string("zz"));
        let err = p.parse("abx").unwrap_err();
        assert_eq!(err.position, 2);
        assert_eq!(err.expected, "something specific");
    }

    #[test]
    fn test_failure_survives_many_recovery() {
        // `many` swallows the failure that ended the loop, but it must
        // still surface if a later step fails shallower
        let p = string("ab").many().skip(eof());
        let err = p.parse("ababx").unwrap_err();
        assert_eq!(err.position, 4);
    }

    #[test]
    fn test_lazy_recursion() {
        fn parens() -> Parser<usize> {
            string("(")
                .then(|_| Parser::lazy(parens).or(Parser::succeed(0)))
                .then(|depth| string(")").result(depth + 1))
        }
        assert_eq!(parens().parse("((()))").unwrap(), 3);
        assert!(parens().parse("((())").is_err());
    }

    #[test]
    fn test_opt_whitespace() {
        let p = opt_whitespace().then(|_| string("a"));
        assert_eq!(p.parse("   a").unwrap(), "a");
        assert_eq!(p.parse("a").unwrap(), "a");
    }
}
