use crate::{Error, Result};

/// Page size applied when a page is requested without an explicit size.
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// A 1-based page specification, parsed from `page[,size]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub number: i64,
    pub size: Option<i64>,
}

impl Page {
    pub fn parse(raw: &str) -> Result<Page> {
        let (number, size) = match raw.split_once(',') {
            Some((number, size)) => (number, Some(size)),
            None => (raw, None),
        };

        let number = number
            .trim()
            .parse()
            .map_err(|_| Error::filter(format!("invalid page specification >{raw}<")))?;
        let size = match size {
            Some(size) => Some(
                size.trim()
                    .parse()
                    .map_err(|_| Error::filter(format!("invalid page specification >{raw}<")))?,
            ),
            None => None,
        };

        Ok(Page { number, size })
    }

    /// Row offset of this page for the effective page size. Page numbers
    /// are 1-based: page 2 of size 10 selects rows 11-20.
    pub fn offset(&self, size: i64) -> i64 {
        size * self.number - size
    }
}
