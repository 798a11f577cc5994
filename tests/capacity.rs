use docxide_expand::ExpandErrorKind;
use docxide_expand::expand::{CapacityPlan, FillPlan};

fn plan(items: usize, rows_per_item: usize, first: usize, steady: usize) -> CapacityPlan {
    CapacityPlan::new("goods", items, rows_per_item, first, steady).expect("valid plan")
}

#[test]
fn page_count_matches_closed_form() {
    for rows_per_item in 1..=3 {
        for first_items in 1..=4 {
            for steady_items in 1..=4 {
                let first = first_items * rows_per_item;
                let steady = steady_items * rows_per_item;
                for items in 0..=20 {
                    let p = plan(items, rows_per_item, first, steady);
                    let rows = items * rows_per_item;
                    let expected = if rows <= first {
                        1
                    } else {
                        1 + (rows - first).div_ceil(steady)
                    };
                    assert_eq!(
                        p.page_count(),
                        expected,
                        "items={items} r={rows_per_item} F={first} S={steady}"
                    );
                    if items > 0 {
                        assert_eq!(p.page_of(items - 1) + 1, expected);
                    }
                }
            }
        }
    }
}

#[test]
fn exact_multiple_does_not_add_an_empty_page() {
    // 29 on page one, then exactly two full pages of 29
    let p = plan(87, 1, 29, 29);
    assert_eq!(p.page_count(), 3);
    assert_eq!(p.page_of(86), 2);
}

#[test]
fn scenario_b_split() {
    let p = plan(65, 1, 29, 29);
    assert_eq!(p.page_count(), 3);
    assert!(p.on_first_page(28));
    assert!(!p.on_first_page(29));
    assert!(p.is_page_start(0));
    assert!(p.is_page_start(29));
    assert!(p.is_page_start(58));
    assert!(!p.is_page_start(30));
    assert_eq!(p.page_of(64), 2);
    // 7 items on the last page leave 22 rows to pad
    assert_eq!(p.last_page_fill(2, 7), FillPlan::Rows(22));
}

#[test]
fn first_page_defaults_to_steady_capacity() {
    let p = plan(4, 1, 0, 10);
    assert_eq!(p.first_rows, 10);
    assert_eq!(p.page_count(), 1);
    assert_eq!(p.last_page_fill(0, 4), FillPlan::Rows(6));
}

#[test]
fn different_first_page_capacity() {
    let p = plan(10, 2, 4, 6);
    assert_eq!(p.first_page_items(), 2);
    assert_eq!(p.steady_page_items(), 3);
    assert_eq!(p.page_count(), 4);
    assert!(p.is_page_start(2));
    assert!(p.is_page_start(5));
    assert!(p.is_page_start(8));
    assert!(!p.is_page_start(3));
    assert_eq!(p.page_capacity_rows(0), 4);
    assert_eq!(p.page_capacity_rows(3), 6);
}

#[test]
fn rows_per_item_not_dividing_first_page_is_rejected() {
    let err = CapacityPlan::new("goods", 5, 2, 3, 4).unwrap_err();
    assert_eq!(err.kind(), Some(ExpandErrorKind::Configuration));
    assert!(err.to_string().contains("goods"));
}

#[test]
fn rows_per_item_above_first_page_is_rejected() {
    let err = CapacityPlan::new("goods", 5, 4, 2, 8).unwrap_err();
    assert_eq!(err.kind(), Some(ExpandErrorKind::Configuration));
}

#[test]
fn steady_capacity_must_be_multiple() {
    let err = CapacityPlan::new("goods", 5, 2, 4, 5).unwrap_err();
    assert_eq!(err.kind(), Some(ExpandErrorKind::Configuration));
    assert!(CapacityPlan::new("goods", 5, 0, 4, 4).is_err());
    assert!(CapacityPlan::new("goods", 5, 1, 0, 0).is_err());
}

#[test]
fn reduce_and_footer_shrink_padding() {
    let p = plan(4, 1, 0, 10).with_footer(2, 1);
    assert_eq!(p.last_page_fill(0, 4), FillPlan::Rows(3));

    // footer fits exactly: nothing to pad
    let p = plan(8, 1, 0, 10).with_footer(2, 0);
    assert_eq!(p.last_page_fill(0, 8), FillPlan::None);
}

#[test]
fn reduce_never_pushes_footer_to_next_page() {
    // 8 rows + 2 footer fit in 10; the reduce margin only removes padding
    let p = plan(8, 1, 0, 10).with_footer(2, 3);
    assert_eq!(p.last_page_fill(0, 8), FillPlan::None);
}

#[test]
fn footer_overflow_splits_fill_across_pages() {
    let p = plan(9, 1, 0, 10).with_footer(3, 0);
    assert_eq!(
        p.last_page_fill(0, 9),
        FillPlan::SplitFooter {
            current: 1,
            next: 7
        }
    );

    // page exactly full, reduce applies to the new page
    let p = plan(10, 1, 0, 10).with_footer(3, 2);
    assert_eq!(
        p.last_page_fill(0, 10),
        FillPlan::SplitFooter {
            current: 0,
            next: 5
        }
    );
}
