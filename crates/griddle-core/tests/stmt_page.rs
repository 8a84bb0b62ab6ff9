use griddle_core::stmt::{Direction, OrderBy, Page, DEFAULT_PAGE_SIZE};

use pretty_assertions::assert_eq;

#[test]
fn offset_is_one_based() {
    let page = Page::parse("2").unwrap();
    // page 2 of size 10 selects rows 11-20
    assert_eq!(page.offset(10), 10);
    assert_eq!(Page::parse("1").unwrap().offset(10), 0);
    assert_eq!(Page::parse("5").unwrap().offset(20), 80);
}

#[test]
fn page_spec_may_carry_its_own_size() {
    let page = Page::parse("3,25").unwrap();
    assert_eq!(page.number, 3);
    assert_eq!(page.size, Some(25));

    let bare = Page::parse("3").unwrap();
    assert_eq!(bare.size, None);
}

#[test]
fn malformed_page_specs_fail() {
    assert!(Page::parse("x").unwrap_err().is_filter());
    assert!(Page::parse("2,x").is_err());
    assert!(Page::parse("").is_err());
}

#[test]
fn default_page_size_is_twenty() {
    assert_eq!(DEFAULT_PAGE_SIZE, 20);
}

#[test]
fn order_defaults_to_descending() {
    let order = OrderBy::parse("name");
    assert_eq!(order.attribute, "name");
    assert_eq!(order.direction, Direction::Desc);

    let asc = OrderBy::parse("name,asc");
    assert_eq!(asc.direction, Direction::Asc);

    let explicit = OrderBy::parse("name,DESC");
    assert_eq!(explicit.direction, Direction::Desc);
}
