//! The textual emitter: the exact inverse of `wln_hier::lex`/`parse`'s
//! RTLIL-shaped grammar, so anything `write` produces can be read back by
//! `read` unchanged (spec §6.1 `write`, §6.4 constant textual form).

use wln_hier::{Cell, CellId, Lib, Module, ModuleId, Signal, WireId, WireIo};

/// Emit every module in `lib`, in its current enumeration order, as one
/// document.
pub fn emit_library(lib: &Lib) -> String {
    let mut out = String::new();
    for (mid, _) in lib.modules() {
        out.push_str(&emit_module(lib, mid));
        out.push('\n');
    }
    out
}

/// Emit one module's `module \name ... end` block.
pub fn emit_module(lib: &Lib, mid: ModuleId) -> String {
    let module = lib.module(mid);
    let mut out = format!("module \\{}\n", lib.names_ro().get_str(module.name()));
    for item in &module.items {
        match *item {
            wln_hier::ModuleItem::Wire(wid) => emit_wire(lib, module, wid, &mut out),
            wln_hier::ModuleItem::Cell(cid) => emit_cell(lib, module, cid, &mut out),
            wln_hier::ModuleItem::Connect(idx) => {
                let (lhs, rhs) = module.connects[idx];
                out.push_str(&format!(
                    "  connect {} {}\n",
                    render_signal(lib, module, lhs),
                    render_signal(lib, module, rhs),
                ));
            }
        }
    }
    out.push_str("end\n");
    out
}

fn emit_wire(lib: &Lib, module: &Module, wid: WireId, out: &mut String) {
    let wire = module.wire(wid);
    let mut line = format!("  wire width {}", wire.width);
    if wire.offset != 0 {
        line.push_str(&format!(" offset {}", wire.offset));
    }
    if wire.upto {
        line.push_str(" upto");
    }
    if wire.signed {
        line.push_str(" signed");
    }
    match wire.io {
        WireIo::Input(n) => line.push_str(&format!(" input {n}")),
        WireIo::Output(n) => line.push_str(&format!(" output {n}")),
        WireIo::Internal => {}
    }
    line.push_str(&format!(" \\{}\n", lib.names_ro().get_str(wire.name)));
    out.push_str(&line);
}

fn emit_cell(lib: &Lib, module: &Module, cid: CellId, out: &mut String) {
    let cell: &Cell = module.cell(cid);
    for &(k, v) in &cell.attrs {
        out.push_str(&format!(
            "  attribute \\{} {}\n",
            lib.names_ro().get_str(k),
            lib.names_ro().get_str(v),
        ));
    }
    out.push_str(&format!(
        "  cell {} \\{}\n",
        lib.names_ro().get_str(cell.type_name),
        lib.names_ro().get_str(cell.instance_name),
    ));
    for &(k, v) in &cell.params {
        out.push_str(&format!(
            "    parameter \\{} {}\n",
            lib.names_ro().get_str(k),
            lib.names_ro().get_str(v),
        ));
    }
    for &(port, sig) in &cell.connections {
        out.push_str(&format!(
            "    connect \\{} {}\n",
            lib.names_ro().get_str(port),
            render_signal(lib, module, sig),
        ));
    }
    out.push_str("  end\n");
}

/// Render a `Signal` back to the textual form `parse::parse_signal`
/// accepts: a bare `\name` for a whole wire, the interned literal text for
/// a constant, `\base[msb:lsb]`/`\base[bit]` for a slice, and `{ ... }` for
/// a concatenation.
fn render_signal(lib: &Lib, module: &Module, sig: Signal) -> String {
    match sig {
        Signal::Wire(wid) => format!("\\{}", lib.names_ro().get_str(module.wire(wid).name)),
        Signal::Const(cid) => {
            let value = lib.consts_ro().get(cid);
            lib.names_ro().get_str(value.text).to_string()
        }
        Signal::Slice(sid) => {
            let desc = lib.slices_ro().get(sid);
            let base = lib.names_ro().get_str(desc.base_name);
            if desc.msb == desc.lsb {
                format!("\\{base}[{}]", desc.msb)
            } else {
                format!("\\{base}[{}:{}]", desc.msb, desc.lsb)
            }
        }
        Signal::Concat(ccid) => {
            let children: Vec<String> = lib
                .concats_ro()
                .get(ccid)
                .iter()
                .map(|&child| render_signal(lib, module, child))
                .collect();
            format!("{{ {} }}", children.join(" "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wln_hier::lex::Lexer;

    #[test]
    fn emitted_adder_reads_back_unchanged() {
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
        wln_hier::ingest(&mut lib, Lexer::new(src)).unwrap();
        lib.normalize().unwrap();
        let emitted = emit_library(&lib);

        let mut reread = Lib::new();
        let mods = wln_hier::ingest(&mut reread, Lexer::new(&emitted)).unwrap();
        assert_eq!(mods.len(), 1);
        let m = reread.module(mods[0]);
        assert_eq!(m.wires().len(), 3);
        assert_eq!(m.cells().len(), 1);
        let cell = m.cell(m.cells()[0]);
        assert_eq!(cell.connections.len(), 3);
    }

    #[test]
    fn slice_signal_round_trips() {
        let src = "\
module \\top
  wire width 4 input 1 \\a
  wire width 1 output 1 \\o
  connect \\o \\a[0]
end
";
        let mut lib = Lib::new();
        wln_hier::ingest(&mut lib, Lexer::new(src)).unwrap();
        lib.normalize().unwrap();
        let emitted = emit_library(&lib);
        assert!(emitted.contains("\\a[0]"));

        let mut reread = Lib::new();
        let mods = wln_hier::ingest(&mut reread, Lexer::new(&emitted)).unwrap();
        let m = reread.module(mods[0]);
        assert_eq!(m.connects.len(), 1);
        assert!(matches!(m.connects[0].1, Signal::Slice(_)));
    }
}
