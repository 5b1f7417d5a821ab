mod common;

use assert_matches::assert_matches;
use chrono::{Duration, NaiveDate};
use uuid::Uuid;

use appointment_cell::models::{AppointmentError, AppointmentFilter, AppointmentStatus, RescheduleRequest};
use appointment_cell::store::AppointmentStore;
use barber_cell::models::{CreateBarberRequest, CreateServiceRequest, ServiceRef, UpdateBarberRequest};

use common::{hm, instant, local, monday, sunday_noon, tuesday, Fixture, PHONE, PHONE_DIGITS};

// ==============================================================================
// SLOTS
// ==============================================================================

#[tokio::test]
async fn open_morning_offers_every_half_hour() {
    let fx = Fixture::at(sunday_noon()).await;

    let slots = fx
        .state
        .slots
        .available_slots(fx.barber.id, monday(), fx.haircut_ref())
        .await
        .unwrap();

    assert_eq!(
        slots,
        vec![hm(9, 0), hm(9, 30), hm(10, 0), hm(10, 30), hm(11, 0), hm(11, 30)]
    );
}

#[tokio::test]
async fn booked_slot_disappears_from_availability() {
    let fx = Fixture::at(sunday_noon()).await;
    fx.state.booking.book(fx.haircut_at(local(monday(), 10, 0))).await.unwrap();

    let slots = fx
        .state
        .slots
        .available_slots(fx.barber.id, monday(), fx.haircut_ref())
        .await
        .unwrap();

    assert_eq!(slots, vec![hm(9, 0), hm(9, 30), hm(10, 30), hm(11, 0), hm(11, 30)]);
}

#[tokio::test]
async fn longer_service_may_end_at_closing_time() {
    let fx = Fixture::at(sunday_noon()).await;

    // Tuesday opens 09:00-10:00; the beard service takes 45 minutes.
    let slots = fx
        .state
        .slots
        .available_slots(fx.barber.id, tuesday(), fx.beard_ref())
        .await
        .unwrap();

    assert_eq!(slots, vec![hm(9, 0)]);
}

#[tokio::test]
async fn same_day_slots_start_after_now() {
    let fx = Fixture::at(instant(monday(), 10, 10)).await;
    let slots = fx
        .state
        .slots
        .available_slots(fx.barber.id, monday(), fx.haircut_ref())
        .await
        .unwrap();
    assert_eq!(slots, vec![hm(10, 30), hm(11, 0), hm(11, 30)]);

    let late = Fixture::at(instant(monday(), 11, 45)).await;
    assert!(late
        .state
        .slots
        .available_slots(late.barber.id, monday(), late.haircut_ref())
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn inactive_barber_has_no_slots_and_unknown_barber_is_not_found() {
    let fx = Fixture::at(sunday_noon()).await;
    fx.catalog
        .update_barber(
            fx.barber.id,
            UpdateBarberRequest {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert!(fx
        .state
        .slots
        .available_slots(fx.barber.id, monday(), fx.haircut_ref())
        .await
        .unwrap()
        .is_empty());

    assert_matches!(
        fx.state
            .slots
            .available_slots(Uuid::new_v4(), monday(), fx.haircut_ref())
            .await,
        Err(AppointmentError::NotFound("Barber"))
    );
}

// ==============================================================================
// BOOKING
// ==============================================================================

#[tokio::test]
async fn booking_snapshots_service_and_normalizes_phone() {
    let fx = Fixture::at(sunday_noon()).await;

    let appointment = fx
        .state
        .booking
        .book(fx.haircut_at(local(monday(), 9, 30)))
        .await
        .unwrap();

    assert_eq!(appointment.status, AppointmentStatus::Scheduled);
    assert_eq!(appointment.customer_phone, PHONE_DIGITS);
    assert_eq!(appointment.service_name, "Corte");
    assert_eq!(appointment.price, 45.0);
    assert_eq!(appointment.start_time, instant(monday(), 9, 30));
    assert_eq!(appointment.end_time - appointment.start_time, Duration::minutes(30));
    assert_eq!(appointment.service_ref(), fx.haircut_ref());
}

#[tokio::test]
async fn booking_rejects_invalid_requests_before_touching_the_store() {
    let fx = Fixture::at(instant(monday(), 10, 10)).await;
    let booking = &fx.state.booking;

    let mut blank_name = fx.haircut_at(local(monday(), 11, 0));
    blank_name.customer_name = "  ".to_string();
    assert_matches!(booking.book(blank_name).await, Err(AppointmentError::Validation(_)));

    let mut short_phone = fx.haircut_at(local(monday(), 11, 0));
    short_phone.customer_phone = "1234".to_string();
    assert_matches!(booking.book(short_phone).await, Err(AppointmentError::Validation(_)));

    assert_matches!(
        booking.book(fx.haircut_at(local(monday(), 9, 30))).await,
        Err(AppointmentError::Validation(_))
    );
    assert_matches!(
        booking.book(fx.haircut_at(local(monday(), 11, 45))).await,
        Err(AppointmentError::Validation(_))
    );
    assert_matches!(
        booking.book(fx.haircut_at(local(monday() + Duration::days(2), 10, 0))).await,
        Err(AppointmentError::Validation(_))
    );

    let mut unknown_barber = fx.haircut_at(local(monday(), 11, 0));
    unknown_barber.barber_id = Uuid::new_v4();
    assert_matches!(booking.book(unknown_barber).await, Err(AppointmentError::NotFound("Barber")));

    let mut unknown_service = fx.haircut_at(local(monday(), 11, 0));
    unknown_service.service = ServiceRef::Global(Uuid::new_v4());
    assert_matches!(booking.book(unknown_service).await, Err(AppointmentError::NotFound("Service")));

    assert!(fx.appointments.list(&AppointmentFilter::default()).await.unwrap().is_empty());
}

#[tokio::test]
async fn barber_service_of_another_barber_is_not_bookable() {
    let fx = Fixture::at(sunday_noon()).await;
    let other = fx
        .catalog
        .create_barber(CreateBarberRequest {
            name: "Bruno".to_string(),
            bio: None,
            photo_url: None,
            is_active: None,
        })
        .await
        .unwrap();
    let others_service = fx
        .catalog
        .create_barber_service(
            other.id,
            CreateServiceRequest {
                name: "Navalhado".to_string(),
                duration_minutes: 30,
                price: 60.0,
                discount_price: None,
            },
        )
        .await
        .unwrap();

    let mut request = fx.haircut_at(local(monday(), 9, 0));
    request.service = ServiceRef::ProfessionalOverride(others_service.id);

    assert_matches!(
        fx.state.booking.book(request).await,
        Err(AppointmentError::NotFound("Service"))
    );
}

#[tokio::test]
async fn overlapping_booking_is_a_conflict() {
    let fx = Fixture::at(sunday_noon()).await;
    fx.state.booking.book(fx.haircut_at(local(monday(), 10, 0))).await.unwrap();

    let mut beard = fx.haircut_at(local(monday(), 9, 30));
    beard.service = fx.beard_ref();
    assert_matches!(fx.state.booking.book(beard).await, Err(AppointmentError::Conflict));

    // Touching the end of the existing appointment is fine.
    assert!(fx.state.booking.book(fx.haircut_at(local(monday(), 10, 30))).await.is_ok());
}

#[tokio::test]
async fn two_customers_racing_for_the_last_slot() {
    let fx = Fixture::at(sunday_noon()).await;
    let booking = fx.state.booking.clone();

    let (first, second) = tokio::join!(
        booking.book(fx.haircut_at(local(monday(), 11, 30))),
        booking.book(fx.haircut_at(local(monday(), 11, 30))),
    );

    let outcomes = [first, second];
    assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
    assert_eq!(
        outcomes
            .iter()
            .filter(|r| matches!(r, Err(AppointmentError::Conflict)))
            .count(),
        1
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_bookings_never_overlap() {
    let fx = Fixture::at(sunday_noon()).await;

    let mut handles = Vec::new();
    for i in 0..24 {
        let booking = fx.state.booking.clone();
        // Mix exact duplicates with partially overlapping 45 minute requests.
        let mut request = fx.haircut_at(local(monday(), 10, if i % 2 == 0 { 0 } else { 15 }));
        if i % 3 == 0 {
            request.service = fx.beard_ref();
        }
        handles.push(tokio::spawn(async move { booking.book(request).await }));
    }

    let mut successes = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => successes += 1,
            Err(e) => assert_matches!(e, AppointmentError::Conflict),
        }
    }
    assert_eq!(successes, 1);

    let stored = fx
        .appointments
        .list(&AppointmentFilter {
            status: Some(AppointmentStatus::Scheduled),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(stored.len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn identical_requests_have_exactly_one_winner() {
    let fx = Fixture::at(sunday_noon()).await;

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let booking = fx.state.booking.clone();
            let request = fx.haircut_at(local(monday(), 9, 0));
            tokio::spawn(async move { booking.book(request).await })
        })
        .collect();

    let mut results = Vec::new();
    for handle in handles {
        results.push(handle.await.unwrap());
    }

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert_eq!(
        results
            .iter()
            .filter(|r| matches!(r, Err(AppointmentError::Conflict)))
            .count(),
        15
    );
}

#[tokio::test]
async fn bookings_publish_availability_changes() {
    let fx = Fixture::at(sunday_noon()).await;
    let mut events = fx.state.notifier.subscribe();

    fx.state.booking.book(fx.haircut_at(local(monday(), 9, 0))).await.unwrap();

    let event = events.recv().await.unwrap();
    assert_eq!(event.barber_id, fx.barber.id);
    assert_eq!(event.date, monday());
}

// ==============================================================================
// RESCHEDULE
// ==============================================================================

#[tokio::test]
async fn reschedule_books_new_time_then_cancels_old() {
    let fx = Fixture::at(sunday_noon()).await;
    let original = fx.state.booking.book(fx.haircut_at(local(monday(), 9, 0))).await.unwrap();

    let outcome = fx
        .state
        .booking
        .reschedule(
            original.id,
            RescheduleRequest {
                start_time: local(monday(), 11, 0),
                customer_phone: PHONE.to_string(),
                barber_id: None,
                service: None,
            },
        )
        .await
        .unwrap();

    assert!(outcome.cancelled_previous);
    assert_eq!(outcome.appointment.start_time, instant(monday(), 11, 0));
    assert_eq!(outcome.appointment.service_ref(), original.service_ref());
    assert_eq!(
        fx.state.booking.get(original.id).await.unwrap().status,
        AppointmentStatus::Cancelled
    );

    let slots = fx
        .state
        .slots
        .available_slots(fx.barber.id, monday(), fx.haircut_ref())
        .await
        .unwrap();
    assert!(slots.contains(&hm(9, 0)));
    assert!(!slots.contains(&hm(11, 0)));
}

#[tokio::test]
async fn failed_reschedule_keeps_original() {
    let fx = Fixture::at(sunday_noon()).await;
    let original = fx.state.booking.book(fx.haircut_at(local(monday(), 9, 0))).await.unwrap();

    let mut someone_else = fx.haircut_at(local(monday(), 11, 0));
    someone_else.customer_phone = "21912345678".to_string();
    fx.state.booking.book(someone_else).await.unwrap();

    let result = fx
        .state
        .booking
        .reschedule(
            original.id,
            RescheduleRequest {
                start_time: local(monday(), 11, 0),
                customer_phone: PHONE.to_string(),
                barber_id: None,
                service: None,
            },
        )
        .await;

    assert_matches!(result, Err(AppointmentError::Conflict));
    assert_eq!(
        fx.state.booking.get(original.id).await.unwrap().status,
        AppointmentStatus::Scheduled
    );
}

#[tokio::test]
async fn reschedule_requires_matching_phone() {
    let fx = Fixture::at(sunday_noon()).await;
    let original = fx.state.booking.book(fx.haircut_at(local(monday(), 9, 0))).await.unwrap();

    let result = fx
        .state
        .booking
        .reschedule(
            original.id,
            RescheduleRequest {
                start_time: local(monday(), 11, 0),
                customer_phone: "21912345678".to_string(),
                barber_id: None,
                service: None,
            },
        )
        .await;

    assert_matches!(result, Err(AppointmentError::PhoneMismatch));
}

#[tokio::test]
async fn reschedule_after_start_is_rejected() {
    let fx = Fixture::at(instant(monday(), 10, 30)).await;
    let started = fx
        .appointments
        .insert_if_free(fx.stored(instant(monday(), 9, 0), AppointmentStatus::Scheduled, "Barba", 30.0))
        .await
        .unwrap();

    assert_matches!(
        fx.state.booking.cancel_by_customer(started.id, PHONE).await,
        Err(AppointmentError::Validation(_))
    );

    let result = fx
        .state
        .booking
        .reschedule(
            started.id,
            RescheduleRequest {
                start_time: local(monday(), 11, 0),
                customer_phone: PHONE.to_string(),
                barber_id: None,
                service: None,
            },
        )
        .await;

    assert_matches!(result, Err(AppointmentError::Validation(_)));
    assert_eq!(
        fx.state.booking.get(started.id).await.unwrap().status,
        AppointmentStatus::Scheduled
    );
    assert_eq!(fx.appointments.list(&AppointmentFilter::default()).await.unwrap().len(), 1);
}

#[tokio::test]
async fn dates_past_the_booking_horizon_are_rejected() {
    let fx = Fixture::at(sunday_noon()).await;
    let booking = &fx.state.booking;

    // 2031-01-13 is a Monday more than a year out.
    let next_year = NaiveDate::from_ymd_opt(2031, 1, 13).unwrap();
    assert_matches!(
        booking.book(fx.haircut_at(local(next_year, 10, 0))).await,
        Err(AppointmentError::Validation(_))
    );
    assert_matches!(
        booking.book(fx.haircut_at(local(NaiveDate::MAX, 23, 45))).await,
        Err(AppointmentError::Validation(_))
    );
    assert_matches!(
        fx.state
            .slots
            .available_slots(fx.barber.id, NaiveDate::MAX, fx.haircut_ref())
            .await,
        Err(AppointmentError::Validation(_))
    );

    assert!(fx.appointments.list(&AppointmentFilter::default()).await.unwrap().is_empty());
}

// ==============================================================================
// LIFECYCLE
// ==============================================================================

#[tokio::test]
async fn customer_cancel_frees_the_slot_once() {
    let fx = Fixture::at(sunday_noon()).await;
    let appointment = fx.state.booking.book(fx.haircut_at(local(monday(), 10, 0))).await.unwrap();

    let cancelled = fx
        .state
        .booking
        .cancel_by_customer(appointment.id, "11 98765 4321")
        .await
        .unwrap();
    assert_eq!(cancelled.status, AppointmentStatus::Cancelled);

    assert_matches!(
        fx.state.booking.cancel_by_customer(appointment.id, PHONE).await,
        Err(AppointmentError::InvalidStatusTransition { .. })
    );
    let moved = fx
        .state
        .booking
        .reschedule(
            appointment.id,
            RescheduleRequest {
                start_time: local(monday(), 11, 0),
                customer_phone: PHONE.to_string(),
                barber_id: None,
                service: None,
            },
        )
        .await;
    assert_matches!(moved, Err(AppointmentError::InvalidStatusTransition { .. }));
    assert!(fx.state.booking.book(fx.haircut_at(local(monday(), 10, 0))).await.is_ok());
}

#[tokio::test]
async fn staff_close_out_after_start() {
    let before = Fixture::at(sunday_noon()).await;
    let appointment = before
        .state
        .booking
        .book(before.haircut_at(local(monday(), 10, 0)))
        .await
        .unwrap();
    assert_matches!(
        before.state.booking.complete(appointment.id).await,
        Err(AppointmentError::Validation(_))
    );

    // Same store seen from later in the day.
    let after = Fixture::at(instant(monday(), 10, 45)).await;
    let stored = after
        .appointments
        .insert_if_free(after.stored(instant(monday(), 10, 0), AppointmentStatus::Scheduled, "Corte", 45.0))
        .await
        .unwrap();

    let completed = after.state.booking.complete(stored.id).await.unwrap();
    assert_eq!(completed.status, AppointmentStatus::Completed);
    assert_matches!(
        after.state.booking.mark_no_show(stored.id).await,
        Err(AppointmentError::InvalidStatusTransition { .. })
    );
    assert_matches!(
        after.state.booking.cancel_by_customer(stored.id, PHONE).await,
        Err(AppointmentError::InvalidStatusTransition { .. })
    );
}

#[tokio::test]
async fn staff_listing_filters_and_orders_newest_first() {
    let fx = Fixture::at(sunday_noon()).await;
    let early = fx.state.booking.book(fx.haircut_at(local(monday(), 9, 0))).await.unwrap();
    let late = fx.state.booking.book(fx.haircut_at(local(monday(), 11, 0))).await.unwrap();
    fx.state.booking.cancel_by_staff(early.id).await.unwrap();

    let all = fx.state.booking.list(AppointmentFilter::default()).await.unwrap();
    assert_eq!(all.iter().map(|a| a.id).collect::<Vec<_>>(), vec![late.id, early.id]);

    let by_phone = fx
        .state
        .booking
        .list(AppointmentFilter {
            customer_phone: Some(PHONE.to_string()),
            status: Some(AppointmentStatus::Scheduled),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(by_phone.len(), 1);
    assert_eq!(by_phone[0].id, late.id);
}
