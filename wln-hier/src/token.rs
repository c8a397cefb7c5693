//! The RTLIL-shaped token stream contract (spec §4.C "Parsing"). This is
//! the narrow *input-side* contract the library's `ingest` function
//! consumes — any reader (the hand-written [`crate::lex::Lexer`], or an
//! external Verilog/SMT-LIB/RTLIL front-end) can produce it.

/// One statement-level token. Connection endpoints (`Connect::lhs/rhs`,
/// `Wire`'s numeric fields) are carried as already-split strings; resolving
/// a signal expression string into a [`crate::signal::Signal`] happens in
/// [`crate::parse::parse_signal`], since that requires library/module
/// context the lexer does not have.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Token {
    /// `attribute key value` — applies to the next wire/cell.
    Attribute {
        /// Attribute key, without its leading backslash.
        key: String,
        /// Attribute value, verbatim.
        value: String,
    },
    /// `module \name`.
    Module {
        /// Module name, without its leading backslash.
        name: String,
    },
    /// `wire width W [offset O] [upto] [signed] [input N | output N] \name`.
    Wire {
        /// Wire name, without its leading backslash.
        name: String,
        /// Declared bit width.
        width: u32,
        /// Declared offset, `0` if absent.
        offset: i32,
        /// Whether the `upto` attribute was present.
        upto: bool,
        /// Whether the `signed` attribute was present.
        signed: bool,
        /// Present when declared `input N`.
        input: Option<u32>,
        /// Present when declared `output N`.
        output: Option<u32>,
    },
    /// `cell <type> \name` — opens a cell context, closed by [`Token::End`].
    CellBegin {
        /// The cell's type tag, as written (e.g. `$add`, or a module name).
        ty: String,
        /// Instance name, without its leading backslash.
        name: String,
    },
    /// `parameter \key value`, inside a cell context.
    Parameter {
        /// Parameter key, without its leading backslash.
        key: String,
        /// Parameter value, verbatim.
        value: String,
    },
    /// `connect lhs rhs`. Inside a cell context, `lhs` is a port name and
    /// `rhs` a signal expression; at module scope both are signal
    /// expressions (a free-standing connect statement).
    Connect {
        /// Left-hand side, exactly as written.
        lhs: String,
        /// Right-hand side, exactly as written.
        rhs: String,
    },
    /// `end` — closes the innermost open cell or module context.
    End,
    /// A line the lexer could not classify; carried through (rather than
    /// failing eagerly) so [`crate::parse::ingest`] can report a
    /// `ParseError` naming the offending line.
    Invalid(String),
}
