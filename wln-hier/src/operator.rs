//! The operator-name table: maps textual cell-type tags (`$add`, `$mux`,
//! ...) to the WLN/AIG type taxonomy `wln_ir::ObjectType` already defines
//! (spec §4.C "Operator coverage").

use wln_ir::ObjectType;

/// How many data-input connections a cell type expects, beyond any
/// selector input it also carries (spec §4.C: "Unary operators read one
/// data input; binary operators two; `NMUX`/`PMUX` three[+]").
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Arity {
    /// A single data input (`$not`, reductions, `$pos`/negate, shifts by
    /// constant, sign/zero-extension).
    Unary,
    /// Two data inputs (arithmetic, bitwise, comparisons, variable
    /// shifts).
    Binary,
    /// A selector input plus a variable number of data inputs
    /// (`NMUX`/`PMUX`/`DECODER`); the exact data-input count is read from
    /// the cell's parameters at blast time, not fixed here.
    Selecting,
}

/// Look up the `ObjectType`/arity a textual operator tag maps to. Returns
/// `None` for tags this table does not recognize (the cell is then
/// reported, but parsing is not aborted — resolution failures are not
/// fatal per spec §4.C step 2).
pub fn lookup(tag: &str) -> Option<(ObjectType, Arity)> {
    use Arity::*;
    use ObjectType::*;
    Some(match tag {
        "$buf" => (BUF, Unary),
        "$not" => (INV, Unary),
        "$and" => (AND, Binary),
        "$or" => (OR, Binary),
        "$xor" => (XOR, Binary),
        "$nand" => (NAND, Binary),
        "$nor" => (NOR, Binary),
        "$xnor" => (NXOR, Binary),
        "$reduce_and" => (RED_AND, Unary),
        "$reduce_or" => (RED_OR, Unary),
        "$reduce_xor" => (RED_XOR, Unary),
        "$reduce_nand" => (RED_NAND, Unary),
        "$reduce_nor" => (RED_NOR, Unary),
        "$reduce_xnor" => (RED_NXOR, Unary),
        "$logic_not" => (LOGIC_NOT, Unary),
        "$logic_and" => (LOGIC_AND, Binary),
        "$logic_or" => (LOGIC_OR, Binary),
        "$logic_xor" => (LOGIC_XOR, Binary),
        "$logic_impl" => (LOGIC_IMPL, Binary),
        "$mux" => (MUX, Selecting),
        "$nmux" => (NMUX, Selecting),
        "$pmux" => (PMUX, Selecting),
        "$decoder" => (DECODER, Unary),
        "$add" => (ADD, Binary),
        "$sub" => (SUB, Binary),
        "$addsub" => (ADDSUB, Binary),
        "$mul" => (MUL, Binary),
        "$div" => (DIV, Binary),
        "$mod" => (MOD, Binary),
        "$rem" => (REM, Binary),
        "$pow" => (POW, Binary),
        "$sqrt" => (SQRT, Unary),
        "$square" => (SQUARE, Unary),
        "$neg" => (MIN, Unary),
        "$shl" => (SHIFT_L, Binary),
        "$shr" => (SHIFT_R, Binary),
        "$sshl" => (SHIFT_LA, Binary),
        "$sshr" => (SHIFT_RA, Binary),
        "$rotl" => (SHIFT_ROTL, Binary),
        "$rotr" => (SHIFT_ROTR, Binary),
        "$signext" => (SIGNEXT, Unary),
        "$zeropad" => (ZEROPAD, Unary),
        "$eq" => (COMP_EQU, Binary),
        "$ne" => (COMP_NOTEQU, Binary),
        "$lt" => (COMP_LESS, Binary),
        "$le" => (COMP_LESSEQU, Binary),
        "$gt" => (COMP_MORE, Binary),
        "$ge" => (COMP_MOREEQU, Binary),
        "$table" => (TABLE, Selecting),
        "$lut" => (LUT, Selecting),
        "$ramr" => (RAMR, Selecting),
        "$ramw" => (RAMW, Selecting),
        "$dffrse" => (DFFRSE, Selecting),
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_tags_resolve() {
        assert_eq!(lookup("$add"), Some((ObjectType::ADD, Arity::Binary)));
        assert_eq!(lookup("$not"), Some((ObjectType::INV, Arity::Unary)));
        assert_eq!(
            lookup("$dffrse"),
            Some((ObjectType::DFFRSE, Arity::Selecting))
        );
    }

    #[test]
    fn unknown_tag_is_none() {
        assert_eq!(lookup("$frobnicate"), None);
    }
}
