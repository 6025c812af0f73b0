use std::collections::HashSet;

use chrono::Duration;
use futures::future::join_all;
use rust_decimal::Decimal;
use uuid::Uuid;

use boxoffice_domain::clock::Clock;
use boxoffice_domain::error::AdmissionError;
use boxoffice_domain::event::Event;
use boxoffice_domain::order::{OrderStatus, PaymentStatus, TicketOrder};
use boxoffice_domain::package::TicketPackage;
use boxoffice_domain::promotion::{PromoType, Promotion};
use boxoffice_domain::seat::SeatStatus;
use boxoffice_domain::ticket::{Attendee, EventTicket, TicketStatus};
use boxoffice_testing::fixture;
use boxoffice_ticketing::domain::repository::OrderRepository;
use boxoffice_ticketing::domain::types::{IssueOrder, OrderItem};
use boxoffice_ticketing::error::TicketingServiceError;
use boxoffice_ticketing::usecase::order::CancelOrderInput;

use crate::helpers::{Venue, buyer, is_admission, open_orders};

#[tokio::test]
async fn should_stop_selling_at_quantity_available() {
    let venue = Venue::general_admission(Some(2));
    let uc = venue.create_order();

    uc.execute(venue.ga_request(buyer(), 1)).await.unwrap();
    uc.execute(venue.ga_request(buyer(), 1)).await.unwrap();
    let third = uc.execute(venue.ga_request(buyer(), 1)).await;

    assert!(
        is_admission(&third, AdmissionError::CapacityExceeded),
        "expected CapacityExceeded, got {third:?}"
    );
    assert_eq!(venue.store.package(venue.package.id).quantity_sold, 2);
    assert_eq!(venue.store.event(venue.event.id).registered_count, 2);
}

#[tokio::test]
async fn should_issue_pending_order_with_unique_tickets() {
    let venue = Venue::general_admission(None);
    let buyer_id = buyer();
    let mut request = venue.ga_request(buyer_id, 3);
    request.items[0].attendees = vec![Attendee {
        name: Some("Ada".to_owned()),
        ..Default::default()
    }];

    let created = venue.create_order().execute(request).await.unwrap();

    let order = &created.order;
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.payment_status, PaymentStatus::Pending);
    assert_eq!(order.total_amount, Decimal::from(60));
    assert_eq!(order.expires_at, fixture::t0() + Duration::minutes(15));
    assert_eq!(created.tickets.len(), 3);
    assert!(created.tickets.iter().all(|t| t.status == TicketStatus::Valid));
    assert_eq!(created.tickets[0].attendee.name.as_deref(), Some("Ada"));
    let codes: HashSet<_> = created.tickets.iter().map(|t| &t.qr_code).collect();
    assert_eq!(codes.len(), 3, "qr payloads must be distinct");
    assert_eq!(venue.store.order(order.id), *order);
}

#[tokio::test]
async fn should_fail_seated_order_entirely_when_one_seat_is_sold() {
    let venue = Venue::seated(3);
    venue
        .store
        .update_seat(venue.seat_id(2), |s| s.status = SeatStatus::Sold);

    let result = venue
        .create_order()
        .execute(venue.seated_request(
            buyer(),
            vec![venue.seat_id(0), venue.seat_id(1), venue.seat_id(2)],
        ))
        .await;

    assert!(is_admission(&result, AdmissionError::NotAvailable));
    for n in 0..2 {
        assert_eq!(
            venue.store.seat(venue.seat_id(n)).status,
            SeatStatus::Available
        );
    }
    assert_eq!(venue.store.package(venue.package.id).quantity_sold, 0);
    assert_eq!(open_orders(&venue.store, venue.event.id), 0);
}

fn ticket_for(order: &TicketOrder, package_id: Uuid, seat_id: Option<Uuid>) -> EventTicket {
    EventTicket {
        id: Uuid::new_v4(),
        event_id: order.event_id,
        package_id,
        order_id: order.id,
        attendee: Attendee::default(),
        qr_code: Uuid::new_v4().simple().to_string(),
        status: TicketStatus::Valid,
        checked_in_at: None,
        seat_id,
        price: Decimal::from(20),
        created_at: order.created_at,
    }
}

fn pending_order(venue: &Venue, buyer_id: Uuid) -> TicketOrder {
    let now = venue.clock.now();
    TicketOrder {
        id: Uuid::new_v4(),
        buyer_id,
        event_id: venue.event.id,
        total_amount: Decimal::from(40),
        discount_amount: Decimal::ZERO,
        status: OrderStatus::Pending,
        payment_status: PaymentStatus::Pending,
        promo_code: None,
        promotion_id: None,
        expires_at: now + Duration::minutes(15),
        created_at: now,
        updated_at: now,
    }
}

#[tokio::test]
async fn should_roll_back_issuance_when_second_package_is_full() {
    let venue = Venue::seated(1);
    let vip = TicketPackage {
        name: "VIP".to_owned(),
        quantity_available: Some(1),
        quantity_sold: 1,
        ..fixture::package(venue.event.id)
    };
    venue.store.add_package(vip.clone());
    let before = venue.store.snapshot();

    let order = pending_order(&venue, buyer());
    let issue = IssueOrder {
        tickets: vec![
            ticket_for(&order, venue.package.id, Some(venue.seat_id(0))),
            ticket_for(&order, vip.id, None),
        ],
        order,
    };
    let result = venue.store.issue(&issue, venue.clock.now()).await;

    assert!(is_admission(&result, AdmissionError::CapacityExceeded));
    assert_eq!(venue.store.snapshot(), before, "no partial effects may remain");
}

#[tokio::test]
async fn should_never_oversell_under_concurrent_checkouts() {
    let venue = Venue::general_admission(Some(5));
    let uc = venue.create_order();

    let results = join_all((0..20).map(|_| uc.execute(venue.ga_request(buyer(), 1)))).await;

    let sold = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(sold, 5);
    assert!(results
        .iter()
        .filter(|r| r.is_err())
        .all(|r| is_admission(r, AdmissionError::CapacityExceeded)));
    assert_eq!(venue.store.package(venue.package.id).quantity_sold, 5);
    assert_eq!(venue.store.event(venue.event.id).registered_count, 5);
}

#[tokio::test]
async fn should_enforce_max_attendees_across_packages() {
    let venue = Venue::general_admission(None);
    venue.store.add_event(Event {
        max_attendees: Some(3),
        ..venue.event.clone()
    });
    let uc = venue.create_order();

    uc.execute(venue.ga_request(buyer(), 2)).await.unwrap();
    let over = uc.execute(venue.ga_request(buyer(), 2)).await;

    assert!(is_admission(&over, AdmissionError::CapacityExceeded));
    assert_eq!(venue.store.event(venue.event.id).registered_count, 2);
}

#[tokio::test]
async fn should_reject_malformed_requests() {
    let venue = Venue::seated(2);
    let uc = venue.create_order();

    let zero = uc.execute(venue.seated_request(buyer(), vec![])).await;
    assert!(is_admission(&zero, AdmissionError::InvalidQuantity));

    let mut mismatched = venue.seated_request(buyer(), vec![venue.seat_id(0)]);
    mismatched.items[0].quantity = 2;
    let result = uc.execute(mismatched).await;
    assert!(is_admission(&result, AdmissionError::InvalidQuantity));

    let duplicated = venue.seated_request(buyer(), vec![venue.seat_id(0), venue.seat_id(0)]);
    let result = uc.execute(duplicated).await;
    assert!(is_admission(&result, AdmissionError::InvalidQuantity));

    let mut empty = venue.seated_request(buyer(), vec![venue.seat_id(0)]);
    empty.items.clear();
    let result = uc.execute(empty).await;
    assert!(matches!(result, Err(TicketingServiceError::MissingData)));
}

#[tokio::test]
async fn should_reject_quantities_that_overflow_when_summed() {
    let venue = Venue::general_admission(None);
    let before = venue.store.snapshot();
    let mut request = venue.ga_request(buyer(), u32::MAX);
    request.items.push(request.items[0].clone());

    let result = venue.create_order().execute(request.clone()).await;
    assert!(
        is_admission(&result, AdmissionError::InvalidQuantity),
        "expected InvalidQuantity, got {result:?}"
    );
    let quote = venue.quote_order().execute(request).await;
    assert!(is_admission(&quote, AdmissionError::InvalidQuantity));
    assert_eq!(venue.store.snapshot(), before);
}

#[tokio::test]
async fn should_reject_seats_for_unseated_event() {
    let venue = Venue::general_admission(None);
    let mut request = venue.ga_request(buyer(), 1);
    request.items[0].seat_ids = vec![Uuid::new_v4()];

    let result = venue.create_order().execute(request).await;
    assert!(matches!(result, Err(TicketingServiceError::SeatNotFound)));
}

#[tokio::test]
async fn should_enforce_per_order_bounds_and_sale_window() {
    let venue = Venue::general_admission(None);
    let uc = venue.create_order();

    let too_many = uc.execute(venue.ga_request(buyer(), 11)).await;
    assert!(is_admission(&too_many, AdmissionError::InvalidQuantity));

    venue.clock.set(fixture::t0() + Duration::days(8));
    let late = uc.execute(venue.ga_request(buyer(), 1)).await;
    assert!(is_admission(&late, AdmissionError::ExpiredWindow));

    venue.store.add_package(TicketPackage {
        is_active: false,
        ..venue.package.clone()
    });
    venue.clock.set(fixture::t0());
    let inactive = uc.execute(venue.ga_request(buyer(), 1)).await;
    assert!(is_admission(&inactive, AdmissionError::NotAvailable));
}

#[tokio::test]
async fn should_refuse_orders_for_removed_event() {
    let venue = Venue::general_admission(None);
    venue.store.add_event(Event {
        removed_at: Some(fixture::t0() - Duration::hours(1)),
        ..venue.event.clone()
    });

    let result = venue.create_order().execute(venue.ga_request(buyer(), 1)).await;
    assert!(is_admission(&result, AdmissionError::NotAvailable));
}

#[tokio::test]
async fn should_price_seats_with_modifier_and_floor_at_zero() {
    let venue = Venue::seated(2);
    venue
        .store
        .update_seat(venue.seat_id(0), |s| s.price_modifier = Decimal::from(5));
    venue
        .store
        .update_seat(venue.seat_id(1), |s| s.price_modifier = Decimal::from(-30));

    let quote = venue
        .quote_order()
        .execute(venue.seated_request(buyer(), vec![venue.seat_id(0), venue.seat_id(1)]))
        .await
        .unwrap();

    assert_eq!(quote.lines[0].unit_price, Decimal::from(25));
    assert_eq!(quote.lines[1].unit_price, Decimal::ZERO);
    assert_eq!(quote.subtotal, Decimal::from(25));
}

#[tokio::test]
async fn should_let_holder_buy_own_held_seat_only() {
    let venue = Venue::seated(1);
    let (holder, other) = (buyer(), buyer());
    venue
        .reserve_seats()
        .execute(boxoffice_ticketing::usecase::hold::ReserveSeatsInput {
            event_id: venue.event.id,
            buyer_id: holder,
            seat_ids: vec![venue.seat_id(0)],
            hold_minutes: Some(5),
        })
        .await
        .unwrap();
    let uc = venue.create_order();

    let stolen = uc
        .execute(venue.seated_request(other, vec![venue.seat_id(0)]))
        .await;
    assert!(is_admission(&stolen, AdmissionError::NotAvailable));

    let created = uc
        .execute(venue.seated_request(holder, vec![venue.seat_id(0)]))
        .await
        .unwrap();
    let seat = venue.store.seat(venue.seat_id(0));
    assert_eq!(seat.status, SeatStatus::Reserved);
    assert_eq!(seat.held_by, Some(holder));
    assert_eq!(seat.held_by_order, Some(created.order.id));
    assert_eq!(seat.reserved_until, Some(created.order.expires_at));
}

#[tokio::test]
async fn should_not_put_seat_of_pending_order_into_second_order() {
    let venue = Venue::seated(1);
    let buyer_id = buyer();
    let uc = venue.create_order();

    let first = uc
        .execute(venue.seated_request(buyer_id, vec![venue.seat_id(0)]))
        .await
        .unwrap();
    let second = uc
        .execute(venue.seated_request(buyer_id, vec![venue.seat_id(0)]))
        .await;

    assert!(
        is_admission(&second, AdmissionError::NotAvailable),
        "expected NotAvailable, got {second:?}"
    );
    let bound = venue
        .store
        .snapshot()
        .tickets
        .into_iter()
        .filter(|t| t.seat_id == Some(venue.seat_id(0)) && t.status == TicketStatus::Valid)
        .count();
    assert_eq!(bound, 1);
    assert_eq!(venue.store.package(venue.package.id).quantity_sold, 1);
    assert_eq!(venue.store.event(venue.event.id).registered_count, 1);
    assert_eq!(
        venue.store.seat(venue.seat_id(0)).held_by_order,
        Some(first.order.id)
    );
}

#[tokio::test]
async fn should_release_only_the_cancelled_orders_seats() {
    let venue = Venue::seated(2);
    let buyer_id = buyer();
    let uc = venue.create_order();
    let first = uc
        .execute(venue.seated_request(buyer_id, vec![venue.seat_id(0)]))
        .await
        .unwrap();
    let second = uc
        .execute(venue.seated_request(buyer_id, vec![venue.seat_id(1)]))
        .await
        .unwrap();

    venue
        .cancel_order()
        .execute(CancelOrderInput {
            order_id: first.order.id,
            requested_by: buyer_id,
            is_staff: false,
        })
        .await
        .unwrap();

    assert_eq!(
        venue.store.seat(venue.seat_id(0)).status,
        SeatStatus::Available
    );
    let kept = venue.store.seat(venue.seat_id(1));
    assert_eq!(kept.status, SeatStatus::Reserved);
    assert_eq!(kept.held_by_order, Some(second.order.id));
}

#[tokio::test]
async fn should_quote_without_touching_state() {
    let venue = Venue::seated(2);
    let promo = fixture::promotion("SPRING10");
    venue.store.add_promotion(promo.clone());
    let before = venue.store.snapshot();

    let mut request = venue.seated_request(buyer(), vec![venue.seat_id(0), venue.seat_id(1)]);
    request.promo_code = Some("SPRING10".to_owned());
    let quote = venue.quote_order().execute(request).await.unwrap();

    assert_eq!(quote.subtotal, Decimal::from(40));
    assert_eq!(quote.discount_amount, Decimal::from(4));
    assert_eq!(quote.total_amount, Decimal::from(36));
    assert_eq!(quote.promotion.map(|p| p.id), Some(promo.id));
    assert_eq!(venue.store.snapshot(), before);
}

#[tokio::test]
async fn should_apply_code_without_counting_usage_before_payment() {
    let venue = Venue::general_admission(None);
    let promo = fixture::promotion("SPRING10");
    venue.store.add_promotion(promo.clone());

    let mut request = venue.ga_request(buyer(), 2);
    request.promo_code = Some("SPRING10".to_owned());
    let created = venue.create_order().execute(request).await.unwrap();

    assert_eq!(created.order.promo_code.as_deref(), Some("SPRING10"));
    assert_eq!(created.order.promotion_id, Some(promo.id));
    assert_eq!(created.order.discount_amount, Decimal::from(4));
    assert_eq!(venue.store.promotion(promo.id).usage_count, 0);
}

#[tokio::test]
async fn should_reject_unknown_or_ineligible_code() {
    let venue = Venue::general_admission(None);
    venue.store.add_promotion(Promotion {
        end_date: fixture::t0() - Duration::hours(1),
        ..fixture::promotion("OLD")
    });
    venue.store.add_promotion(Promotion {
        usage_limit: Some(5),
        usage_count: 5,
        ..fixture::promotion("GONE")
    });
    let uc = venue.create_order();

    let mut request = venue.ga_request(buyer(), 1);
    request.promo_code = Some("NOPE".to_owned());
    let unknown = uc.execute(request.clone()).await;
    assert!(matches!(unknown, Err(TicketingServiceError::PromoNotFound)));

    for code in ["OLD", "GONE"] {
        request.promo_code = Some(code.to_owned());
        let result = uc.execute(request.clone()).await;
        assert!(
            is_admission(&result, AdmissionError::PromoIneligible),
            "{code} should be ineligible, got {result:?}"
        );
    }
    assert_eq!(open_orders(&venue.store, venue.event.id), 0);
}

#[tokio::test]
async fn should_pick_highest_priority_automatic_promotion() {
    let venue = Venue::general_admission(None);
    let low = Promotion {
        promo_type: PromoType::FixedAmount,
        discount_value: Decimal::from(5),
        ..fixture::automatic_promotion(1)
    };
    let high = fixture::automatic_promotion(5);
    let gated = Promotion {
        min_booking_amount: Some(Decimal::from(1_000)),
        ..fixture::automatic_promotion(9)
    };
    for p in [&low, &high, &gated] {
        venue.store.add_promotion(p.clone());
    }

    let quote = venue
        .quote_order()
        .execute(venue.ga_request(buyer(), 2))
        .await
        .unwrap();

    assert_eq!(quote.promotion.as_ref().map(|p| p.id), Some(high.id));
    assert_eq!(quote.discount_amount, Decimal::from(4));
}

#[tokio::test]
async fn should_count_pending_orders_toward_per_customer_limit() {
    let venue = Venue::general_admission(None);
    venue.store.add_promotion(Promotion {
        per_customer_limit: Some(1),
        ..fixture::promotion("ONCE")
    });
    let buyer_id = buyer();
    let uc = venue.create_order();

    let mut request = venue.ga_request(buyer_id, 1);
    request.promo_code = Some("ONCE".to_owned());
    uc.execute(request.clone()).await.unwrap();

    let second = uc.execute(request.clone()).await;
    assert!(is_admission(&second, AdmissionError::PromoIneligible));

    request.buyer_id = buyer();
    uc.execute(request).await.unwrap();
}

#[tokio::test]
async fn should_require_two_tickets_for_bundle() {
    let venue = Venue::general_admission(None);
    venue.store.add_promotion(Promotion {
        promo_type: PromoType::Bundle,
        discount_value: Decimal::from(7),
        ..fixture::promotion("PAIR")
    });
    let uc = venue.quote_order();

    let mut single = venue.ga_request(buyer(), 1);
    single.promo_code = Some("PAIR".to_owned());
    let result = uc.execute(single).await;
    assert!(is_admission(&result, AdmissionError::PromoIneligible));

    let pair = OrderItem {
        package_id: venue.package.id,
        quantity: 1,
        ..Default::default()
    };
    let mut split = venue.ga_request(buyer(), 1);
    split.items.push(pair);
    split.promo_code = Some("PAIR".to_owned());
    let quote = uc.execute(split).await.unwrap();
    assert_eq!(quote.discount_amount, Decimal::from(7));
    assert_eq!(quote.total_amount, Decimal::from(33));
}

#[tokio::test]
async fn should_expire_abandoned_order_before_next_checkout() {
    let venue = Venue::general_admission(Some(1));
    let uc = venue.create_order();
    let abandoned = uc.execute(venue.ga_request(buyer(), 1)).await.unwrap();

    venue.clock.advance(Duration::minutes(16));
    uc.execute(venue.ga_request(buyer(), 1)).await.unwrap();

    let order = venue.store.order(abandoned.order.id);
    assert_eq!(order.status, OrderStatus::Cancelled);
    assert_eq!(order.payment_status, PaymentStatus::Pending);
    assert_eq!(venue.store.package(venue.package.id).quantity_sold, 1);
}

#[tokio::test]
async fn should_expire_lapsed_order_when_read() {
    let venue = Venue::seated(1);
    let buyer_id = buyer();
    let created = venue
        .create_order()
        .execute(venue.seated_request(buyer_id, vec![venue.seat_id(0)]))
        .await
        .unwrap();

    venue.clock.advance(Duration::minutes(15));
    let still = venue.get_order().execute(created.order.id).await.unwrap();
    assert_eq!(still.order.status, OrderStatus::Pending);

    venue.clock.advance(Duration::seconds(1));
    let expired = venue.get_order().execute(created.order.id).await.unwrap();
    assert_eq!(expired.order.status, OrderStatus::Cancelled);
    assert!(expired
        .tickets
        .iter()
        .all(|t| t.status == TicketStatus::Cancelled));
    assert_eq!(
        venue.store.seat(venue.seat_id(0)).status,
        SeatStatus::Available
    );
    assert_eq!(venue.store.package(venue.package.id).quantity_sold, 0);
    assert_eq!(venue.store.event(venue.event.id).registered_count, 0);
}

#[tokio::test]
async fn should_cancel_own_pending_order_and_release_inventory() {
    let venue = Venue::seated(2);
    let buyer_id = buyer();
    let created = venue
        .create_order()
        .execute(venue.seated_request(buyer_id, vec![venue.seat_id(0), venue.seat_id(1)]))
        .await
        .unwrap();

    let stranger = venue
        .cancel_order()
        .execute(CancelOrderInput {
            order_id: created.order.id,
            requested_by: buyer(),
            is_staff: false,
        })
        .await;
    assert!(matches!(stranger, Err(TicketingServiceError::OrderNotFound)));

    let cancelled = venue
        .cancel_order()
        .execute(CancelOrderInput {
            order_id: created.order.id,
            requested_by: buyer_id,
            is_staff: false,
        })
        .await
        .unwrap();

    assert_eq!(cancelled.order.status, OrderStatus::Cancelled);
    assert_eq!(cancelled.order.payment_status, PaymentStatus::Pending);
    for n in 0..2 {
        assert_eq!(
            venue.store.seat(venue.seat_id(n)).status,
            SeatStatus::Available
        );
    }
    assert_eq!(venue.store.package(venue.package.id).quantity_sold, 0);
    assert_eq!(venue.store.event(venue.event.id).registered_count, 0);

    let again = venue
        .cancel_order()
        .execute(CancelOrderInput {
            order_id: created.order.id,
            requested_by: buyer_id,
            is_staff: false,
        })
        .await;
    assert!(is_admission(&again, AdmissionError::InvalidTransition));
}
