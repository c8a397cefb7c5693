//! Interned names for the fixed RTLIL-style connection port names every
//! operator cell uses (`A`, `B`, `Y`, `S`, ...), looked up once per
//! session rather than re-interned on every cell visited.

use wln_ir::NameId;
use wln_hier::Lib;

/// Every operator port name a blast pass needs, interned once per
/// [`crate::blast::BlastSession`].
pub struct PortNames {
    pub a: NameId,
    pub b: NameId,
    pub y: NameId,
    pub s: NameId,
    pub ci: NameId,
    pub co: NameId,
    pub d: NameId,
    pub q: NameId,
    pub clk: NameId,
    pub arst: NameId,
    pub a_signed: NameId,
    pub b_signed: NameId,
    pub booth: NameId,
    pub non_rest: NameId,
    pub r#async: NameId,
    pub table: NameId,
    /// `B0`..`B63`: data-input ports for `NMUX`, read by index.
    data: Vec<NameId>,
}

impl PortNames {
    pub fn new(lib: &mut Lib) -> Self {
        let data = (0..64)
            .map(|i| lib.names().intern_str(&format!("B{i}")))
            .collect();
        let names = lib.names();
        PortNames {
            a: names.intern_str("A"),
            b: names.intern_str("B"),
            y: names.intern_str("Y"),
            s: names.intern_str("S"),
            ci: names.intern_str("CI"),
            co: names.intern_str("CO"),
            d: names.intern_str("D"),
            q: names.intern_str("Q"),
            clk: names.intern_str("CLK"),
            arst: names.intern_str("ARST"),
            a_signed: names.intern_str("A_SIGNED"),
            b_signed: names.intern_str("B_SIGNED"),
            booth: names.intern_str("BOOTH"),
            non_rest: names.intern_str("NON_REST"),
            r#async: names.intern_str("ASYNC"),
            table: names.intern_str("TABLE"),
            data,
        }
    }

    /// The `B<i>` port name used by `NMUX`'s data inputs.
    pub fn data_port(&self, i: usize) -> NameId {
        self.data[i]
    }
}
