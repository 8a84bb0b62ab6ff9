/// Sort direction. The wire default is descending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    Asc,
    #[default]
    Desc,
}

impl Direction {
    fn parse(raw: &str) -> Direction {
        if raw.trim().eq_ignore_ascii_case("asc") {
            Direction::Asc
        } else {
            Direction::Desc
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

/// An order specification parsed from `column[,asc|desc]`.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub attribute: String,
    pub direction: Direction,
}

impl OrderBy {
    pub fn parse(raw: &str) -> OrderBy {
        match raw.split_once(',') {
            Some((attribute, direction)) => OrderBy {
                attribute: attribute.trim().to_string(),
                direction: Direction::parse(direction),
            },
            None => OrderBy {
                attribute: raw.trim().to_string(),
                direction: Direction::default(),
            },
        }
    }
}
