/*
Descriptor Parsing
==================

A small recursive-descent parser over the descriptor alphabet:

  expr    := term (('+' | '-') term)*
  term    := unary (('*' | '/') unary)*
  unary   := '-' unary | power
  power   := primary ('**' unary)?
  primary := NUMBER | NAME | NAME '(' args ')' | '(' expr ')'

Call arguments are numeric literals; a bare NAME resolves against the
patch being read, so a script can build on its own earlier lines.
`**` is right-associative and binds tighter than a leading minus, as
in `a ** b ** c` and `-a ** b`.

Everything a signal can print, this parses back to the same tree, and
every failure is a `ParseError` rather than a panic: rates that the
constructors would reject are checked here first.
*/

use std::str::FromStr;

use thiserror::Error;

use super::{decay, noise, saw, shot_noise, sine, square, BinaryOp, Patch, Signal, SignalNode};
use crate::voices::{crackle, epiano, vinyl};

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("unexpected character {found:?} at byte {at}")]
    UnexpectedChar { found: char, at: usize },
    #[error("unexpected end of expression")]
    UnexpectedEnd,
    #[error("expected {expected} at byte {at}")]
    Expected { expected: &'static str, at: usize },
    #[error("malformed number `{0}`")]
    BadNumber(String),
    #[error("unknown name `{0}`")]
    UnknownName(String),
    #[error("`{name}` takes {expected} argument(s), got {got}")]
    WrongArity {
        name: String,
        expected: usize,
        got: usize,
    },
    #[error("bad argument for `{name}`: {reason}")]
    BadArgument { name: String, reason: String },
    #[error("division by the zero signal")]
    DivisionByZero,
    #[error("line {line}: expected `name = expression`")]
    MalformedBinding { line: usize },
    #[error("line {line}: {source}")]
    AtLine {
        line: usize,
        #[source]
        source: Box<ParseError>,
    },
}

#[derive(Clone, Debug, PartialEq)]
enum Tok {
    Num(f64),
    Name(String),
    Plus,
    Minus,
    Star,
    StarStar,
    Slash,
    LParen,
    RParen,
    Comma,
}

fn lex(input: &str) -> Result<Vec<(usize, Tok)>, ParseError> {
    let mut toks = Vec::new();
    let bytes = input.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        let c = bytes[i] as char;
        match c {
            ' ' | '\t' => i += 1,
            '+' => {
                toks.push((i, Tok::Plus));
                i += 1;
            }
            '-' => {
                toks.push((i, Tok::Minus));
                i += 1;
            }
            '*' => {
                if bytes.get(i + 1) == Some(&b'*') {
                    toks.push((i, Tok::StarStar));
                    i += 2;
                } else {
                    toks.push((i, Tok::Star));
                    i += 1;
                }
            }
            '/' => {
                toks.push((i, Tok::Slash));
                i += 1;
            }
            '(' => {
                toks.push((i, Tok::LParen));
                i += 1;
            }
            ')' => {
                toks.push((i, Tok::RParen));
                i += 1;
            }
            ',' => {
                toks.push((i, Tok::Comma));
                i += 1;
            }
            '0'..='9' | '.' => {
                let start = i;
                while i < bytes.len() && matches!(bytes[i], b'0'..=b'9' | b'.') {
                    i += 1;
                }
                let text = &input[start..i];
                let value = f64::from_str(text)
                    .map_err(|_| ParseError::BadNumber(text.to_string()))?;
                toks.push((start, Tok::Num(value)));
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let start = i;
                while i < bytes.len()
                    && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_')
                {
                    i += 1;
                }
                toks.push((start, Tok::Name(input[start..i].to_string())));
            }
            other => return Err(ParseError::UnexpectedChar { found: other, at: i }),
        }
    }
    Ok(toks)
}

struct Parser<'a> {
    toks: Vec<(usize, Tok)>,
    pos: usize,
    env: &'a Patch,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&Tok> {
        self.toks.get(self.pos).map(|(_, t)| t)
    }

    fn at(&self) -> usize {
        self.toks.get(self.pos).map_or(usize::MAX, |(at, _)| *at)
    }

    fn eat(&mut self, tok: &Tok) -> bool {
        if self.peek() == Some(tok) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, tok: Tok, expected: &'static str) -> Result<(), ParseError> {
        if self.eat(&tok) {
            Ok(())
        } else if self.peek().is_none() {
            Err(ParseError::UnexpectedEnd)
        } else {
            Err(ParseError::Expected {
                expected,
                at: self.at(),
            })
        }
    }

    fn expr(&mut self) -> Result<Signal, ParseError> {
        let mut lhs = self.term()?;
        loop {
            if self.eat(&Tok::Plus) {
                lhs = lhs + self.term()?;
            } else if self.eat(&Tok::Minus) {
                lhs = lhs - self.term()?;
            } else {
                return Ok(lhs);
            }
        }
    }

    fn term(&mut self) -> Result<Signal, ParseError> {
        let mut lhs = self.unary()?;
        loop {
            if self.eat(&Tok::Star) {
                lhs = lhs * self.unary()?;
            } else if self.eat(&Tok::Slash) {
                let rhs = self.unary()?;
                if matches!(rhs.node(), SignalNode::Const(c) if *c == 0.0) {
                    return Err(ParseError::DivisionByZero);
                }
                lhs = Signal::from_node(SignalNode::Binary {
                    op: BinaryOp::Div,
                    lhs,
                    rhs,
                });
            } else {
                return Ok(lhs);
            }
        }
    }

    fn unary(&mut self) -> Result<Signal, ParseError> {
        if self.eat(&Tok::Minus) {
            // negation of a literal folds into the constant
            return Ok(-self.unary()?);
        }
        self.power()
    }

    fn power(&mut self) -> Result<Signal, ParseError> {
        let base = self.primary()?;
        if self.eat(&Tok::StarStar) {
            return Ok(base.pow(self.unary()?));
        }
        Ok(base)
    }

    fn primary(&mut self) -> Result<Signal, ParseError> {
        match self.toks.get(self.pos).cloned() {
            Some((_, Tok::Num(value))) => {
                self.pos += 1;
                Ok(Signal::constant(value))
            }
            Some((_, Tok::Name(name))) => {
                self.pos += 1;
                if self.eat(&Tok::LParen) {
                    let args = self.args()?;
                    self.expect(Tok::RParen, "`)`")?;
                    self.call(&name, &args)
                } else {
                    self.env
                        .get(&name)
                        .cloned()
                        .ok_or(ParseError::UnknownName(name))
                }
            }
            Some((_, Tok::LParen)) => {
                self.pos += 1;
                let inner = self.expr()?;
                self.expect(Tok::RParen, "`)`")?;
                Ok(inner)
            }
            Some((at, _)) => Err(ParseError::Expected {
                expected: "a number, a name, or `(`",
                at,
            }),
            None => Err(ParseError::UnexpectedEnd),
        }
    }

    fn args(&mut self) -> Result<Vec<f64>, ParseError> {
        let mut args = Vec::new();
        if self.peek() == Some(&Tok::RParen) {
            return Ok(args);
        }
        loop {
            args.push(self.number_arg()?);
            if !self.eat(&Tok::Comma) {
                return Ok(args);
            }
        }
    }

    fn number_arg(&mut self) -> Result<f64, ParseError> {
        let neg = self.eat(&Tok::Minus);
        match self.toks.get(self.pos) {
            Some((_, Tok::Num(value))) => {
                self.pos += 1;
                Ok(if neg { -value } else { *value })
            }
            Some((at, _)) => Err(ParseError::Expected {
                expected: "a numeric argument",
                at: *at,
            }),
            None => Err(ParseError::UnexpectedEnd),
        }
    }

    fn call(&mut self, name: &str, args: &[f64]) -> Result<Signal, ParseError> {
        let expected = match name {
            "noise" | "vinyl" => 0,
            "sine" | "square" | "saw" | "decay" | "shot_noise" | "crackle" | "epiano" => 1,
            _ => return Err(ParseError::UnknownName(name.to_string())),
        };
        if args.len() != expected {
            return Err(ParseError::WrongArity {
                name: name.to_string(),
                expected,
                got: args.len(),
            });
        }
        match name {
            "sine" => Ok(sine(args[0])),
            "square" => Ok(square(args[0])),
            "saw" => Ok(saw(args[0])),
            "decay" => Ok(decay(args[0])),
            "noise" => Ok(noise()),
            "shot_noise" | "crackle" => {
                let rate = args[0];
                if !(rate.is_finite() && rate > 0.0) {
                    return Err(ParseError::BadArgument {
                        name: name.to_string(),
                        reason: format!("rate must be positive, got {rate}"),
                    });
                }
                Ok(if name == "crackle" {
                    crackle(rate)
                } else {
                    shot_noise(rate)
                })
            }
            "vinyl" => Ok(vinyl()),
            "epiano" => Ok(epiano(args[0])),
            _ => unreachable!("arity table covers the alphabet"),
        }
    }
}

fn parse_in(input: &str, env: &Patch) -> Result<Signal, ParseError> {
    let mut parser = Parser {
        toks: lex(input)?,
        pos: 0,
        env,
    };
    if parser.peek().is_none() {
        return Err(ParseError::UnexpectedEnd);
    }
    let signal = parser.expr()?;
    if let Some((at, _)) = parser.toks.get(parser.pos) {
        return Err(ParseError::Expected {
            expected: "end of expression",
            at: *at,
        });
    }
    Ok(signal)
}

/// Parses a single descriptor expression.
pub fn parse(input: &str) -> Result<Signal, ParseError> {
    parse_in(input, &Patch::new())
}

/// Parses a patch script: one `name = expression` binding per line.
///
/// Blank lines and lines starting with `#` are skipped. Each
/// expression may refer to names bound on earlier lines.
pub fn parse_patch(input: &str) -> Result<Patch, ParseError> {
    let mut patch = Patch::new();
    for (idx, raw) in input.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let lineno = idx + 1;
        let (name, expr) = line
            .split_once('=')
            .ok_or(ParseError::MalformedBinding { line: lineno })?;
        let name = name.trim();
        let mut chars = name.chars();
        let well_formed = chars
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
            && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !well_formed {
            return Err(ParseError::MalformedBinding { line: lineno });
        }
        let signal = parse_in(expr, &patch).map_err(|e| ParseError::AtLine {
            line: lineno,
            source: Box::new(e),
        })?;
        patch.bind(name, signal);
    }
    Ok(patch)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trips(text: &str) {
        let parsed = parse(text).unwrap();
        assert_eq!(parsed.descriptor(), text);
    }

    #[test]
    fn descriptors_reload_verbatim() {
        round_trips("sine(220)");
        round_trips("sine(220) + sine(275) * decay(4)");
        round_trips("(sine(220) + sine(275)) * decay(4)");
        round_trips("sine(1) - (square(1) - 1)");
        round_trips("sine(2)/2");
        round_trips("saw(55)**2**0.5");
        round_trips("(saw(55)**2)**0.5");
        round_trips("(-sine(3))");
        round_trips("sine(3) * -0.5");
        round_trips("(-2)**3");
        round_trips("shot_noise(8) * noise()");
        round_trips("vinyl() + epiano(440)/4");
        round_trips("crackle(8)");
    }

    #[test]
    fn printed_trees_parse_back_to_equal_samples() {
        let built = (sine(220.0) + sine(275.0)).pow(2.0) * decay(4.0) - 0.25;
        let reloaded = parse(&built.descriptor()).unwrap();
        assert_eq!(built.descriptor(), reloaded.descriptor());
        for i in 0..64 {
            let t = i as f64 / 97.0;
            assert!((built.at(t) - reloaded.at(t)).abs() < 1e-12);
        }
    }

    #[test]
    fn hand_written_spacing_is_accepted() {
        let tight = parse("sine(220)+sine(275)*decay(4)").unwrap();
        let spaced = parse("sine(220) + sine(275) * decay(4)").unwrap();
        assert_eq!(tight.descriptor(), spaced.descriptor());
    }

    #[test]
    fn leading_minus_binds_below_power() {
        let s = parse("-sine(2)**2").unwrap();
        assert_eq!(s.descriptor(), "(-(sine(2)**2))");
        assert!((s.at(0.125) - -1.0).abs() < 1e-12);
    }

    #[test]
    fn patch_scripts_reload_and_reprint() {
        let script = "#!blockwave\ncarrier = sine(220)\nlead = carrier * decay(2)\n";
        let patch = parse_patch(script).unwrap();
        assert_eq!(patch.len(), 2);
        assert_eq!(patch.script(), script);
    }

    #[test]
    fn patch_lines_build_on_earlier_names() {
        let patch = parse_patch("a = sine(110)\nb = a + a\n").unwrap();
        let b = patch.get("b").unwrap();
        let a = patch.get("a").unwrap();
        assert!((b.at(0.3) - 2.0 * a.at(0.3)).abs() < 1e-12);
    }

    #[test]
    fn comments_and_blanks_are_skipped() {
        let patch = parse_patch("# warm pad\n\npad = sine(110) * 0.5\n").unwrap();
        assert_eq!(patch.len(), 1);
    }

    #[test]
    fn errors_name_the_problem() {
        assert!(matches!(
            parse("warble(3)"),
            Err(ParseError::UnknownName(name)) if name == "warble"
        ));
        assert!(matches!(
            parse("sine()"),
            Err(ParseError::WrongArity { expected: 1, got: 0, .. })
        ));
        assert!(matches!(parse("sine(1)/0"), Err(ParseError::DivisionByZero)));
        assert!(matches!(
            parse("shot_noise(0)"),
            Err(ParseError::BadArgument { .. })
        ));
        assert!(matches!(parse("sine(1) +"), Err(ParseError::UnexpectedEnd)));
        assert!(matches!(
            parse("sine(1) @ 2"),
            Err(ParseError::UnexpectedChar { found: '@', .. })
        ));
        assert!(matches!(
            parse("1.2.3 + sine(1)"),
            Err(ParseError::BadNumber(_))
        ));
    }

    #[test]
    fn patch_errors_carry_line_numbers() {
        let err = parse_patch("a = sine(110)\nb = wrong(2)\n").unwrap_err();
        assert!(matches!(err, ParseError::AtLine { line: 2, .. }));

        let err = parse_patch("just some words\n").unwrap_err();
        assert!(matches!(err, ParseError::MalformedBinding { line: 1 }));
    }

    #[test]
    fn unbound_names_are_rejected() {
        let err = parse_patch("b = a + 1\n").unwrap_err();
        assert!(matches!(err, ParseError::AtLine { line: 1, .. }));
    }
}
