//! A small hand-written line-oriented lexer producing the [`Token`] stream
//! from source text, in the recursive-descent-adjacent, explicit-`Cursor`
//! style `cranelift-reader` uses for CLIF text (no reader source ships in
//! the retrieval pack for this crate's teacher, so this follows the same
//! idiom applied elsewhere in the workspace: explicit token types, no
//! parser-combinator crate). This is supplementary plumbing so the ingest
//! contract is exercisable end-to-end; it covers the RTLIL subset spec.md
//! §4.C names, not a full Verilog/RTLIL frontend (those stay external per
//! §1).

use crate::token::Token;

/// Splits `s` on top-level whitespace, treating `{ ... }` groups as a
/// single token even though they contain internal spaces (needed for
/// concatenation literals inside a `connect` statement).
pub(crate) fn split_top_level(s: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut depth = 0i32;
    let mut cur = String::new();
    for ch in s.chars() {
        match ch {
            '{' => {
                depth += 1;
                cur.push(ch);
            }
            '}' => {
                depth -= 1;
                cur.push(ch);
            }
            c if c.is_whitespace() && depth == 0 => {
                if !cur.is_empty() {
                    tokens.push(std::mem::take(&mut cur));
                }
            }
            c => cur.push(c),
        }
    }
    if !cur.is_empty() {
        tokens.push(cur);
    }
    tokens
}

pub(crate) fn strip_backslash(s: &str) -> String {
    s.strip_prefix('\\').unwrap_or(s).to_string()
}

fn parse_wire_words(words: &[&str]) -> Token {
    let mut width = 1u32;
    let mut offset = 0i32;
    let mut upto = false;
    let mut signed = false;
    let mut input = None;
    let mut output = None;
    let mut name = String::new();
    let mut i = 1;
    while i < words.len() {
        match words[i] {
            "width" => {
                width = words.get(i + 1).and_then(|w| w.parse().ok()).unwrap_or(1);
                i += 2;
            }
            "offset" => {
                offset = words.get(i + 1).and_then(|w| w.parse().ok()).unwrap_or(0);
                i += 2;
            }
            "upto" => {
                upto = true;
                i += 1;
            }
            "signed" => {
                signed = true;
                i += 1;
            }
            "input" => {
                input = words.get(i + 1).and_then(|w| w.parse().ok());
                i += 2;
            }
            "output" => {
                output = words.get(i + 1).and_then(|w| w.parse().ok());
                i += 2;
            }
            other => {
                name = strip_backslash(other);
                i += 1;
            }
        }
    }
    Token::Wire {
        name,
        width,
        offset,
        upto,
        signed,
        input,
        output,
    }
}

/// Tokenizes RTLIL-shaped source text, one statement per non-blank,
/// non-comment line.
pub struct Lexer<'a> {
    lines: std::str::Lines<'a>,
}

impl<'a> Lexer<'a> {
    /// Build a lexer over `src`.
    pub fn new(src: &'a str) -> Self {
        Lexer { lines: src.lines() }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        loop {
            let raw = self.lines.next()?;
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let words: Vec<&str> = line.split_whitespace().collect();
            let keyword = words[0];
            return Some(match keyword {
                "module" => Token::Module {
                    name: strip_backslash(words.get(1).copied().unwrap_or("")),
                },
                "wire" => parse_wire_words(&words),
                "cell" => Token::CellBegin {
                    ty: words.get(1).copied().unwrap_or("").to_string(),
                    name: strip_backslash(words.get(2).copied().unwrap_or("")),
                },
                "parameter" => Token::Parameter {
                    key: strip_backslash(words.get(1).copied().unwrap_or("")),
                    value: words.get(2..).map(|w| w.join(" ")).unwrap_or_default(),
                },
                "attribute" => Token::Attribute {
                    key: strip_backslash(words.get(1).copied().unwrap_or("")),
                    value: words.get(2..).map(|w| w.join(" ")).unwrap_or_default(),
                },
                "connect" => {
                    let rest = line["connect".len()..].trim();
                    let parts = split_top_level(rest);
                    if parts.len() == 2 {
                        Token::Connect {
                            lhs: parts[0].clone(),
                            rhs: parts[1].clone(),
                        }
                    } else {
                        Token::Invalid(line.to_string())
                    }
                }
                "end" => Token::End,
                _ => Token::Invalid(line.to_string()),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lexes_a_small_module() {
        let src = "\
module \\top
  wire width 4 input 1 \\a
  wire width 4 input 2 \\b
  wire width 5 output 1 \\s
  cell $add $1
    connect \\A \\a
    connect \\B \\b
    connect \\Y \\s
  end
end
";
        let toks: Vec<Token> = Lexer::new(src).collect();
        assert_eq!(
            toks[0],
            Token::Module {
                name: "top".into()
            }
        );
        assert_eq!(
            toks[1],
            Token::Wire {
                name: "a".into(),
                width: 4,
                offset: 0,
                upto: false,
                signed: false,
                input: Some(1),
                output: None,
            }
        );
        assert_eq!(toks.last(), Some(&Token::End));
        assert_eq!(toks.iter().filter(|t| **t == Token::End).count(), 2);
    }

    #[test]
    fn splits_concat_connect_as_one_top_level_token() {
        let src = "connect \\Y { \\a \\b }\n";
        let toks: Vec<Token> = Lexer::new(src).collect();
        assert_eq!(
            toks[0],
            Token::Connect {
                lhs: "\\Y".into(),
                rhs: "{ \\a \\b }".into(),
            }
        );
    }
}
