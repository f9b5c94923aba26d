use super::*;

fn dec(units: i64) -> Decimal {
    Decimal::from(units)
}

fn price_break(min_qty: u32, unit_price: Decimal) -> PriceBreak {
    PriceBreak {
        min_qty,
        unit_price,
        active: true,
        promo_descriptor: None,
    }
}

fn vendor(id: &str, breaks: Vec<PriceBreak>) -> VendorOffer {
    VendorOffer {
        vendor_id: id.to_string(),
        vendor_name: format!("Vendor {id}"),
        price_breaks: breaks,
        shipping_cost: Decimal::ZERO,
        free_shipping_threshold: None,
        in_stock: true,
        inventory: None,
    }
}

fn landed(ranking: &Ranking) -> Vec<Decimal> {
    ranking.eligible.iter().map(|r| r.landed_price).collect()
}

#[test]
fn empty_offers_yield_empty_set_and_rank_zero() {
    let ranking = rank_offers(&[], 1, false, "17357");
    assert!(ranking.eligible.is_empty());
    assert_eq!(ranking.rank, 0);
}

#[test]
fn no_vendor_at_tier_yields_empty_set() {
    let offers = vec![
        vendor("1", vec![price_break(5, dec(10))]),
        vendor("2", vec![price_break(10, dec(9))]),
    ];
    let ranking = rank_offers(&offers, 1, false, "1");
    assert!(ranking.eligible.is_empty());
    assert_eq!(ranking.rank, 0);
}

#[test]
fn offers_without_price_breaks_are_skipped() {
    let offers = vec![vendor("1", vec![]), vendor("2", vec![price_break(1, dec(9))])];
    let ranking = rank_offers(&offers, 1, false, "2");
    assert_eq!(ranking.eligible.len(), 1);
    assert_eq!(ranking.rank, 1);
}

#[test]
fn sorts_two_vendors_ascending() {
    let offers = vec![
        vendor("A", vec![price_break(1, dec(10))]),
        vendor("B", vec![price_break(1, dec(9))]),
    ];
    let ranking = rank_offers(&offers, 1, false, "A");
    assert_eq!(landed(&ranking), vec![dec(9), dec(10)]);
    assert_eq!(ranking.rank, 2);
}

#[test]
fn duplicate_vendor_keeps_first_matching_offer() {
    let offers = vec![
        vendor("A", vec![price_break(1, dec(10))]),
        vendor("A", vec![price_break(1, dec(5))]),
        vendor("B", vec![price_break(1, dec(9))]),
    ];
    let ranking = rank_offers(&offers, 1, false, "A");
    assert_eq!(ranking.eligible.len(), 2);
    assert_eq!(landed(&ranking), vec![dec(9), dec(10)]);
}

#[test]
fn short_expiry_excludes_whole_vendor_at_tier() {
    let mut short = price_break(1, dec(5));
    short.promo_descriptor = Some("SHORT EXPIRY".to_string());
    let offers = vec![
        vendor("A", vec![short]),
        vendor("B", vec![price_break(1, dec(9))]),
    ];
    let ranking = rank_offers(&offers, 1, false, "B");
    assert_eq!(ranking.eligible.len(), 1);
    assert_eq!(ranking.eligible[0].offer.vendor_id, "B");
    assert_eq!(ranking.rank, 1);
}

#[test]
fn short_expiry_sibling_break_excludes_vendor_even_with_clean_break() {
    let mut exp = price_break(1, dec(4));
    exp.promo_descriptor = Some("exp 01/2027".to_string());
    let offers = vec![vendor("A", vec![price_break(1, dec(6)), exp])];
    let ranking = rank_offers(&offers, 1, false, "A");
    assert!(ranking.eligible.is_empty());
    assert_eq!(ranking.rank, 0);
}

#[test]
fn short_expiry_at_other_tier_does_not_exclude() {
    let mut exp = price_break(10, dec(4));
    exp.promo_descriptor = Some("Short dated".to_string());
    let offers = vec![vendor("A", vec![price_break(1, dec(6)), exp])];
    let ranking = rank_offers(&offers, 1, false, "A");
    assert_eq!(ranking.eligible.len(), 1);
}

#[test]
fn inactive_break_does_not_qualify() {
    let mut inactive = price_break(1, dec(3));
    inactive.active = false;
    let offers = vec![vendor("A", vec![inactive])];
    let ranking = rank_offers(&offers, 1, false, "A");
    assert!(ranking.eligible.is_empty());
}

#[test]
fn duplicate_breaks_collapse_to_last_listed() {
    let offers = vec![vendor(
        "A",
        vec![
            price_break(1, dec(7)),
            price_break(10, dec(6)),
            price_break(1, dec(8)),
        ],
    )];
    let ranking = rank_offers(&offers, 1, false, "A");
    let ranked = &ranking.eligible[0];
    assert_eq!(ranked.unit_price, dec(8));
    assert_eq!(ranked.offer.price_breaks.len(), 2);
    assert_eq!(ranked.offer.price_breaks[0].min_qty, 10);
    assert_eq!(ranked.offer.price_breaks[1].unit_price, dec(8));
}

#[test]
fn shipping_mode_uses_landed_price() {
    let mut a = vendor("A", vec![price_break(1, dec(10))]);
    a.shipping_cost = dec(5);
    a.free_shipping_threshold = Some(dec(50));
    let mut b = vendor("B", vec![price_break(1, dec(12))]);
    b.shipping_cost = Decimal::ZERO;
    b.free_shipping_threshold = Some(dec(10));

    let ranking = rank_offers(&[a.clone(), b.clone()], 1, true, "A");
    assert_eq!(landed(&ranking), vec![dec(12), dec(15)]);
    assert_eq!(ranking.eligible[0].offer.vendor_id, "B");
    assert_eq!(ranking.rank, 2);

    let unit_only = rank_offers(&[a, b], 1, false, "A");
    assert_eq!(landed(&unit_only), vec![dec(10), dec(12)]);
    assert_eq!(unit_only.rank, 1);
}

#[test]
fn unset_threshold_always_charges_shipping() {
    let mut a = vendor("A", vec![price_break(1, dec(2000))]);
    a.shipping_cost = dec(7);
    let ranking = rank_offers(&[a], 1, true, "A");
    assert_eq!(ranking.eligible[0].landed_price, dec(2007));
}

#[test]
fn price_at_threshold_ships_free() {
    let mut a = vendor("A", vec![price_break(1, dec(50))]);
    a.shipping_cost = dec(5);
    a.free_shipping_threshold = Some(dec(50));
    let ranking = rank_offers(&[a], 1, true, "A");
    assert_eq!(ranking.eligible[0].landed_price, dec(50));
}

#[test]
fn equal_prices_keep_listing_order() {
    let offers = vec![
        vendor("C", vec![price_break(1, dec(9))]),
        vendor("A", vec![price_break(1, dec(9))]),
        vendor("B", vec![price_break(1, dec(8))]),
    ];
    let ranking = rank_offers(&offers, 1, false, "A");
    let ids: Vec<&str> = ranking
        .eligible
        .iter()
        .map(|r| r.offer.vendor_id.as_str())
        .collect();
    assert_eq!(ids, vec!["B", "C", "A"]);
    assert_eq!(ranking.rank, 3);
}

#[test]
fn own_vendor_absent_ranks_zero() {
    let offers = vec![vendor("A", vec![price_break(1, dec(9))])];
    let ranking = rank_offers(&offers, 1, false, "17357");
    assert_eq!(ranking.eligible.len(), 1);
    assert_eq!(ranking.rank, 0);
}

#[test]
fn ranking_is_repeatable() {
    let offers = vec![
        vendor("A", vec![price_break(1, dec(11))]),
        vendor("B", vec![price_break(1, dec(9)), price_break(1, dec(12))]),
        vendor("C", vec![price_break(1, dec(10))]),
    ];
    let first = rank_offers(&offers, 1, false, "C");
    let second = rank_offers(&offers, 1, false, "C");
    assert_eq!(first, second);
}

#[test]
fn middle_excludes_lowest_and_highest() {
    let offers = vec![
        vendor("A", vec![price_break(1, dec(1))]),
        vendor("B", vec![price_break(1, dec(2))]),
        vendor("C", vec![price_break(1, dec(3))]),
        vendor("D", vec![price_break(1, dec(4))]),
    ];
    let ranking = rank_offers(&offers, 1, false, "A");
    let middle: Vec<&str> = ranking
        .middle()
        .iter()
        .map(|r| r.offer.vendor_id.as_str())
        .collect();
    assert_eq!(middle, vec!["B", "C"]);
    assert_eq!(ranking.lowest().map(|r| r.unit_price), Some(dec(1)));
    assert_eq!(ranking.highest().map(|r| r.unit_price), Some(dec(4)));
}
