//! Builds a [`Lib`] from a [`Token`] stream (spec §4.C "Parsing"). This is
//! the consuming half of the ingest contract; [`crate::lex::Lexer`] or any
//! external front-end can produce the token stream this module drives.

use wln_ir::NameId;

use crate::cell::{Cell, CellMark, CellTarget};
use crate::error::{Error, Loc, Result};
use crate::ids::ModuleId;
use crate::lex::{split_top_level, strip_backslash};
use crate::library::Lib;
use crate::pool::ConstValue;
use crate::signal::{Signal, SliceDescriptor};
use crate::token::Token;
use crate::wire::{Wire, WireIo};

/// Accumulates a cell's fields between `CellBegin` and the matching `End`.
struct CellBuilder {
    ty: String,
    name: String,
    attrs: Vec<(NameId, NameId)>,
    params: Vec<(NameId, NameId)>,
    connections: Vec<(NameId, Signal)>,
}

/// Drive `tokens` through the statement-level state machine described in
/// spec §4.C, populating `lib` with modules, wires, cells, and
/// free-standing connections. Returns the ids of the modules declared, in
/// declaration order. Does **not** run normalization (spec §4.C's four
/// steps run afterwards via [`Lib::normalize`]).
pub fn ingest(lib: &mut Lib, tokens: impl Iterator<Item = Token>) -> Result<Vec<ModuleId>> {
    let mut declared = Vec::new();
    let mut cur_module: Option<ModuleId> = None;
    let mut cur_cell: Option<CellBuilder> = None;
    let mut pending_attrs: Vec<(NameId, NameId)> = Vec::new();

    for (line_no, tok) in tokens.enumerate() {
        let loc = Loc::new(line_no as u32 + 1);
        match tok {
            Token::Attribute { key, value } => {
                let k = lib.names().intern_str(&key);
                let v = lib.names().intern_str(&value);
                pending_attrs.push((k, v));
            }
            Token::Module { name } => {
                let name_id = lib.names().intern_str(&name);
                let mid = lib
                    .add_module(name_id)
                    .map_err(|_| Error::ParseError(loc, format!("duplicate module {name}")))?;
                cur_module = Some(mid);
                declared.push(mid);
                pending_attrs.clear();
            }
            Token::Wire {
                name,
                width,
                offset,
                upto,
                signed,
                input,
                output,
            } => {
                let mid = cur_module
                    .ok_or_else(|| Error::ParseError(loc, "wire outside module".into()))?;
                let name_id = lib.names().intern_str(&name);
                let io = match (input, output) {
                    (Some(n), _) => WireIo::Input(n),
                    (_, Some(n)) => WireIo::Output(n),
                    _ => WireIo::Internal,
                };
                let wire = Wire {
                    name: name_id,
                    width,
                    offset,
                    upto,
                    signed,
                    io,
                };
                lib.module_mut(mid)
                    .add_wire(wire)
                    .ok_or_else(|| Error::ParseError(loc, format!("duplicate wire {name}")))?;
                pending_attrs.clear();
            }
            Token::CellBegin { ty, name } => {
                if cur_module.is_none() {
                    return Err(Error::ParseError(loc, "cell outside module".into()));
                }
                cur_cell = Some(CellBuilder {
                    ty,
                    name,
                    attrs: std::mem::take(&mut pending_attrs),
                    params: Vec::new(),
                    connections: Vec::new(),
                });
            }
            Token::Parameter { key, value } => {
                let builder = cur_cell
                    .as_mut()
                    .ok_or_else(|| Error::ParseError(loc, "parameter outside cell".into()))?;
                let k = lib.names().intern_str(&key);
                let v = lib.names().intern_str(&value);
                builder.params.push((k, v));
            }
            Token::Connect { lhs, rhs } => {
                let mid = cur_module
                    .ok_or_else(|| Error::ParseError(loc, "connect outside module".into()))?;
                if let Some(builder) = cur_cell.as_mut() {
                    let port = lib.names().intern_str(&strip_backslash(&lhs));
                    let sig = parse_signal(lib, mid, &rhs, loc)?;
                    builder.connections.push((port, sig));
                } else {
                    let lhs_sig = parse_signal(lib, mid, &lhs, loc)?;
                    let rhs_sig = parse_signal(lib, mid, &rhs, loc)?;
                    lib.module_mut(mid).add_connect(lhs_sig, rhs_sig);
                }
            }
            Token::End => {
                let mid = cur_module
                    .ok_or_else(|| Error::ParseError(loc, "`end` outside module".into()))?;
                match cur_cell.take() {
                    Some(builder) => {
                        let type_name = lib.names().intern_str(&builder.ty);
                        let instance_name = lib.names().intern_str(&builder.name);
                        let input_count = builder.connections.len() as u32;
                        let cell = Cell {
                            type_name,
                            instance_name,
                            target: CellTarget::Unresolved(type_name),
                            attrs: builder.attrs,
                            params: builder.params,
                            connections: builder.connections,
                            input_count,
                            mark: CellMark::default(),
                        };
                        lib.module_mut(mid).add_cell(cell);
                    }
                    None => {
                        cur_module = None;
                    }
                }
            }
            Token::Invalid(line) => {
                return Err(Error::ParseError(loc, format!("unrecognized line: {line}")));
            }
        }
    }
    if cur_module.is_some() {
        return Err(Error::ParseError(
            Loc::new(0),
            "unterminated module (missing `end`)".into(),
        ));
    }
    Ok(declared)
}

/// Resolve a signal-expression string into a [`Signal`], interning
/// constants/slices/concats as needed. Requires `module`'s wires declared
/// so far to already contain anything a bare `\name` reference resolves to
/// (spec §4.C assumes declaration precedes use within a module, matching
/// RTLIL's own convention of wires-before-statements).
pub fn parse_signal(lib: &mut Lib, module: ModuleId, text: &str, loc: Loc) -> Result<Signal> {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix('{') {
        let inner = stripped.trim_end_matches('}').trim();
        let parts = split_top_level(inner);
        let mut children = Vec::with_capacity(parts.len());
        for part in parts {
            children.push(parse_signal(lib, module, &part, loc)?);
        }
        return Ok(Signal::Concat(lib.concats().intern(children)));
    }

    if let Some(tick) = text.find('\'') {
        let width_str = &text[..tick];
        if let Ok(width) = width_str.parse::<i32>() {
            let const_text = lib.names().intern_str(text);
            let id = lib.consts().intern(ConstValue {
                width,
                text: const_text,
            });
            return Ok(Signal::Const(id));
        }
    }
    if text.parse::<i64>().is_ok() {
        let const_text = lib.names().intern_str(text);
        let id = lib.consts().intern(ConstValue {
            width: -1,
            text: const_text,
        });
        return Ok(Signal::Const(id));
    }

    if let Some(bracket) = text.find('[') {
        let name_part = &text[..bracket];
        let name_id = lib.names().intern_str(&strip_backslash(name_part));
        let close = text
            .rfind(']')
            .ok_or_else(|| Error::ParseError(loc, format!("unterminated slice: {text}")))?;
        let inner = &text[bracket + 1..close];
        let (msb, lsb) = if let Some(colon) = inner.find(':') {
            let hi: i32 = inner[..colon]
                .parse()
                .map_err(|_| Error::ParseError(loc, format!("bad slice bound: {inner}")))?;
            let lo: i32 = inner[colon + 1..]
                .parse()
                .map_err(|_| Error::ParseError(loc, format!("bad slice bound: {inner}")))?;
            (hi, lo)
        } else {
            let bit: i32 = inner
                .parse()
                .map_err(|_| Error::ParseError(loc, format!("bad slice bound: {inner}")))?;
            (bit, bit)
        };
        let id = lib.slices().intern(SliceDescriptor {
            base_name: name_id,
            msb,
            lsb,
        });
        return Ok(Signal::Slice(id));
    }

    let name_id = lib.names().intern_str(&strip_backslash(text));
    match lib.module(module).wire_named(name_id) {
        Some(wid) => Ok(Signal::Wire(wid)),
        None => Err(Error::NotFound(format!("wire {text}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lex::Lexer;

    #[test]
    fn ingest_a_small_adder_module() {
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
        let mut lib = Lib::new();
        let mods = ingest(&mut lib, Lexer::new(src)).unwrap();
        assert_eq!(mods.len(), 1);
        let m = lib.module(mods[0]);
        assert_eq!(m.wires().len(), 3);
        assert_eq!(m.cells().len(), 1);
        let cell = m.cell(m.cells()[0]);
        assert_eq!(cell.connections.len(), 3);
    }

    #[test]
    fn parses_sized_constant_and_slice() {
        let src = "\
module \\top
  wire width 4 input 1 \\a
  wire width 1 output 1 \\o
  connect \\o \\a[0]
end
";
        let mut lib = Lib::new();
        let mods = ingest(&mut lib, Lexer::new(src)).unwrap();
        let m = lib.module(mods[0]);
        assert_eq!(m.connects.len(), 1);
        assert!(matches!(m.connects[0].1, Signal::Slice(_)));
    }

    #[test]
    fn unterminated_module_is_parse_error() {
        let src = "module \\top\n  wire width 1 \\a\n";
        let mut lib = Lib::new();
        assert!(ingest(&mut lib, Lexer::new(src)).is_err());
    }
}
