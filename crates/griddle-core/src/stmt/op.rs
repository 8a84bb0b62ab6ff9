/// Filter operator mnemonics of the wire grammar.
///
/// A leading `n` on the wire opcode negates the operator (`nin`, `nbt`,
/// `ncs`, ...). The opcode table is part of the external contract and must
/// not change shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterOp {
    /// `eq` — equality
    Eq,
    /// `lt` — lower than
    Lt,
    /// `le` — lower or equal
    Le,
    /// `ge` — greater or equal
    Ge,
    /// `gt` — greater than
    Gt,
    /// `bt` — inclusive range, two operands
    Bt,
    /// `in` — set membership, variadic
    In,
    /// `is` — null test
    Is,
    /// `cs` — contains substring
    Cs,
    /// `sw` — starts with
    Sw,
    /// `ew` — ends with
    Ew,
    /// `sir` — spatial radius search: x, y, radius, srid, table srid
    Sir,
    /// `sib` — spatial bounding box: xmin, ymin, xmax, ymax, srid, table srid
    Sib,
    /// `sco` — geometry contains
    Sco,
    /// `scr` — geometry crosses
    Scr,
    /// `sdi` — geometry disjoint
    Sdi,
    /// `seq` — geometry equals
    Seq,
    /// `sin` — geometry intersects
    Sin,
    /// `sov` — geometry overlaps
    Sov,
    /// `sto` — geometry touches
    Sto,
    /// `swi` — geometry within
    Swi,
    /// `sic` — geometry is closed
    Sic,
    /// `sis` — geometry is simple
    Sis,
    /// `siv` — geometry is valid
    Siv,
}

/// Number of operands an operator accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandCount {
    Exactly(usize),
    AtLeast(usize),
}

impl OperandCount {
    pub fn accepts(&self, count: usize) -> bool {
        match *self {
            OperandCount::Exactly(n) => count == n,
            OperandCount::AtLeast(n) => count >= n,
        }
    }
}

impl std::fmt::Display for OperandCount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            OperandCount::Exactly(n) => write!(f, "{n}"),
            OperandCount::AtLeast(n) => write!(f, "at least {n}"),
        }
    }
}

impl FilterOp {
    /// Parses a wire opcode, handling the leading-`n` negation prefix.
    pub fn parse(code: &str) -> Option<(FilterOp, bool)> {
        if let Some(op) = Self::lookup(code) {
            return Some((op, false));
        }
        code.strip_prefix('n')
            .and_then(Self::lookup)
            .map(|op| (op, true))
    }

    fn lookup(code: &str) -> Option<FilterOp> {
        Some(match code {
            "eq" => FilterOp::Eq,
            "lt" => FilterOp::Lt,
            "le" => FilterOp::Le,
            "ge" => FilterOp::Ge,
            "gt" => FilterOp::Gt,
            "bt" => FilterOp::Bt,
            "in" => FilterOp::In,
            "is" => FilterOp::Is,
            "cs" => FilterOp::Cs,
            "sw" => FilterOp::Sw,
            "ew" => FilterOp::Ew,
            "sir" => FilterOp::Sir,
            "sib" => FilterOp::Sib,
            "sco" => FilterOp::Sco,
            "scr" => FilterOp::Scr,
            "sdi" => FilterOp::Sdi,
            "seq" => FilterOp::Seq,
            "sin" => FilterOp::Sin,
            "sov" => FilterOp::Sov,
            "sto" => FilterOp::Sto,
            "swi" => FilterOp::Swi,
            "sic" => FilterOp::Sic,
            "sis" => FilterOp::Sis,
            "siv" => FilterOp::Siv,
            _ => return None,
        })
    }

    /// The canonical (non-negated) wire opcode.
    pub fn opcode(&self) -> &'static str {
        match self {
            FilterOp::Eq => "eq",
            FilterOp::Lt => "lt",
            FilterOp::Le => "le",
            FilterOp::Ge => "ge",
            FilterOp::Gt => "gt",
            FilterOp::Bt => "bt",
            FilterOp::In => "in",
            FilterOp::Is => "is",
            FilterOp::Cs => "cs",
            FilterOp::Sw => "sw",
            FilterOp::Ew => "ew",
            FilterOp::Sir => "sir",
            FilterOp::Sib => "sib",
            FilterOp::Sco => "sco",
            FilterOp::Scr => "scr",
            FilterOp::Sdi => "sdi",
            FilterOp::Seq => "seq",
            FilterOp::Sin => "sin",
            FilterOp::Sov => "sov",
            FilterOp::Sto => "sto",
            FilterOp::Swi => "swi",
            FilterOp::Sic => "sic",
            FilterOp::Sis => "sis",
            FilterOp::Siv => "siv",
        }
    }

    pub fn operands(&self) -> OperandCount {
        match self {
            FilterOp::Is | FilterOp::Sic | FilterOp::Sis | FilterOp::Siv => {
                OperandCount::Exactly(0)
            }
            FilterOp::Bt => OperandCount::Exactly(2),
            FilterOp::In => OperandCount::AtLeast(1),
            FilterOp::Sir => OperandCount::Exactly(5),
            FilterOp::Sib => OperandCount::Exactly(6),
            // geometry literals contain commas; the remainder of the wire
            // code is one operand
            FilterOp::Sco
            | FilterOp::Scr
            | FilterOp::Sdi
            | FilterOp::Seq
            | FilterOp::Sin
            | FilterOp::Sov
            | FilterOp::Sto
            | FilterOp::Swi => OperandCount::AtLeast(1),
            _ => OperandCount::Exactly(1),
        }
    }

    /// True for operators that only apply to geometry columns.
    pub fn is_spatial(&self) -> bool {
        matches!(
            self,
            FilterOp::Sir
                | FilterOp::Sib
                | FilterOp::Sco
                | FilterOp::Scr
                | FilterOp::Sdi
                | FilterOp::Seq
                | FilterOp::Sin
                | FilterOp::Sov
                | FilterOp::Sto
                | FilterOp::Swi
                | FilterOp::Sic
                | FilterOp::Sis
                | FilterOp::Siv
        )
    }
}
