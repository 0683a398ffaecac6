use salon_core::db::open_db_in_memory;
use salon_core::{
    InMemorySalonRepository, ManualClock, Principal, RatingPolicy, SalonRepository, SalonService,
    SalonServiceError, SaloonPayload, ServiceRenderedPayload, SqliteSalonRepository,
    INITIAL_RATING,
};

fn owner_x() -> Principal {
    Principal::from_text("owner-x")
}

fn caller_y() -> Principal {
    Principal::from_text("caller-y")
}

fn cuts_payload() -> SaloonPayload {
    SaloonPayload {
        saloon_name: "Cuts".to_string(),
        saloon_location: "Main St".to_string(),
        attachment_url: "img.png".to_string(),
    }
}

fn trim_payload() -> ServiceRenderedPayload {
    ServiceRenderedPayload {
        service_name: "Trim".to_string(),
        service_description: "Quick trim".to_string(),
        service_amount: 15.0,
    }
}

fn memory_service(clock: &ManualClock) -> SalonService<InMemorySalonRepository, &ManualClock> {
    SalonService::with_clock(InMemorySalonRepository::new(), clock)
}

#[test]
fn create_then_get_returns_equal_record() {
    let clock = ManualClock::new(100);
    let service = memory_service(&clock);

    let created = service.create_salon(&owner_x(), cuts_payload()).unwrap();
    assert_eq!(created.owner, owner_x());
    assert_eq!(created.rating, INITIAL_RATING);
    assert!(created.services_rendered.is_empty());
    assert_eq!(created.created_at, 100);
    assert_eq!(created.updated_at, None);

    let loaded = service.get_salon(&created.id).unwrap();
    assert_eq!(loaded, created);
}

#[test]
fn create_accepts_empty_payload_fields() {
    let clock = ManualClock::new(1);
    let service = memory_service(&clock);

    let created = service
        .create_salon(&owner_x(), SaloonPayload::default())
        .unwrap();
    assert_eq!(created.saloon_name, "");
    assert_eq!(service.list_salons().unwrap().len(), 1);
}

#[test]
fn get_missing_salon_names_the_id() {
    let clock = ManualClock::new(1);
    let service = memory_service(&clock);

    let err = service.get_salon("nonexistent").unwrap_err();
    assert!(matches!(&err, SalonServiceError::NotFound(id) if id == "nonexistent"));
    assert!(err.to_string().contains("nonexistent"));
}

#[test]
fn delete_then_get_yields_not_found() {
    let clock = ManualClock::new(1);
    let service = memory_service(&clock);
    let created = service.create_salon(&owner_x(), cuts_payload()).unwrap();

    let removed = service.delete_salon(&owner_x(), &created.id).unwrap();
    assert_eq!(removed, created);

    let err = service.get_salon(&created.id).unwrap_err();
    assert!(matches!(err, SalonServiceError::NotFound(_)));

    let again = service.delete_salon(&owner_x(), &created.id).unwrap_err();
    assert!(matches!(again, SalonServiceError::NotFound(_)));
}

#[test]
fn non_owner_delete_is_forbidden_and_salon_survives() {
    let clock = ManualClock::new(1);
    let service = memory_service(&clock);
    let created = service.create_salon(&owner_x(), cuts_payload()).unwrap();

    let err = service.delete_salon(&caller_y(), &created.id).unwrap_err();
    assert!(matches!(
        &err,
        SalonServiceError::Forbidden { salon_id, caller }
            if salon_id == &created.id && caller == &caller_y()
    ));
    assert_eq!(err.to_string(), "You are not the owner of this saloon");

    let all = service.list_salons().unwrap();
    assert_eq!(all, vec![created]);
}

#[test]
fn non_owner_writes_leave_stored_record_unchanged() {
    let clock = ManualClock::new(1);
    let service = memory_service(&clock);
    let created = service.create_salon(&owner_x(), cuts_payload()).unwrap();
    clock.advance(10);

    let update_err = service
        .update_salon(
            &caller_y(),
            &created.id,
            SaloonPayload {
                saloon_name: "Hijacked".to_string(),
                ..cuts_payload()
            },
        )
        .unwrap_err();
    assert!(matches!(update_err, SalonServiceError::Forbidden { .. }));

    let service_err = service
        .add_service(&caller_y(), &created.id, trim_payload())
        .unwrap_err();
    assert!(matches!(service_err, SalonServiceError::Forbidden { .. }));

    assert_eq!(service.get_salon(&created.id).unwrap(), created);
}

#[test]
fn owner_writes_on_missing_salon_are_not_found() {
    let clock = ManualClock::new(1);
    let service = memory_service(&clock);

    let update_err = service
        .update_salon(&owner_x(), "missing", cuts_payload())
        .unwrap_err();
    assert!(matches!(update_err, SalonServiceError::NotFound(id) if id == "missing"));

    let service_err = service
        .add_service(&owner_x(), "missing", trim_payload())
        .unwrap_err();
    assert!(matches!(service_err, SalonServiceError::NotFound(_)));

    let rate_err = service.rate_salon("missing", 4.0).unwrap_err();
    assert!(matches!(rate_err, SalonServiceError::NotFound(_)));
    assert_eq!(service.repo().count_salons().unwrap(), 0);
}

#[test]
fn add_service_appends_exactly_one_matching_entry() {
    let clock = ManualClock::new(1);
    let service = memory_service(&clock);
    let created = service.create_salon(&owner_x(), cuts_payload()).unwrap();
    clock.set(50);

    let updated = service
        .add_service(&owner_x(), &created.id, trim_payload())
        .unwrap();
    assert_eq!(updated.services_rendered.len(), 1);
    let entry = &updated.services_rendered[0];
    assert_eq!(entry.service_name, "Trim");
    assert_eq!(entry.service_description, "Quick trim");
    assert_eq!(entry.service_amount, 15.0);
    assert_eq!(entry.created_at, 50);
    assert!(!entry.id.is_empty());
    assert_eq!(updated.updated_at, Some(50));
    assert_eq!(updated.rating, INITIAL_RATING);

    clock.set(60);
    let second = service
        .add_service(
            &owner_x(),
            &created.id,
            ServiceRenderedPayload {
                service_name: "Colour".to_string(),
                service_description: String::new(),
                service_amount: 40.0,
            },
        )
        .unwrap();
    assert_eq!(second.services_rendered.len(), 2);
    assert_eq!(second.services_rendered[0], updated.services_rendered[0]);
    assert_eq!(second.services_rendered[1].service_name, "Colour");
    assert_eq!(service.get_salon(&created.id).unwrap(), second);
}

#[test]
fn update_replaces_text_fields_only() {
    let clock = ManualClock::new(1);
    let service = memory_service(&clock);
    let created = service.create_salon(&owner_x(), cuts_payload()).unwrap();
    service
        .add_service(&owner_x(), &created.id, trim_payload())
        .unwrap();
    clock.set(99);

    let updated = service
        .update_salon(
            &owner_x(),
            &created.id,
            SaloonPayload {
                saloon_name: "Cuts 2".to_string(),
                saloon_location: "Side St".to_string(),
                attachment_url: "img2.png".to_string(),
            },
        )
        .unwrap();

    assert_eq!(updated.id, created.id);
    assert_eq!(updated.owner, created.owner);
    assert_eq!(updated.saloon_name, "Cuts 2");
    assert_eq!(updated.saloon_location, "Side St");
    assert_eq!(updated.attachment_url, "img2.png");
    assert_eq!(updated.services_rendered.len(), 1);
    assert_eq!(updated.rating, INITIAL_RATING);
    assert_eq!(updated.created_at, created.created_at);
    assert_eq!(updated.updated_at, Some(99));
}

#[test]
fn weighted_average_rating_applies_to_updated_value() {
    let clock = ManualClock::new(1);
    let service = memory_service(&clock);
    let salon = service.create_salon(&owner_x(), cuts_payload()).unwrap();
    assert_eq!(salon.rating, 1.0);

    // Rating needs no ownership.
    let first = service.rate_salon(&salon.id, 5.0).unwrap();
    assert_eq!(first.rating, 3.0);

    let second = service.rate_salon(&salon.id, 3.0).unwrap();
    assert_eq!(second.rating, 3.0);
    assert_ne!(second.rating, RatingPolicy::WeightedAverage.apply(1.0, 3.0));
    assert_eq!(service.get_salon(&salon.id).unwrap().rating, 3.0);
}

#[test]
fn divide_by_five_rating_applies_to_updated_value() {
    let clock = ManualClock::new(1);
    let service = memory_service(&clock).with_rating_policy(RatingPolicy::DivideByFive);
    let salon = service.create_salon(&owner_x(), cuts_payload()).unwrap();

    let first = service.rate_salon(&salon.id, 5.0).unwrap();
    assert!((first.rating - 1.2).abs() < 1e-6);

    let second = service.rate_salon(&salon.id, 3.0).unwrap();
    assert!((second.rating - 0.84).abs() < 1e-6);
}

#[test]
fn rating_is_not_clamped() {
    let clock = ManualClock::new(1);
    let service = memory_service(&clock);
    let salon = service.create_salon(&owner_x(), cuts_payload()).unwrap();

    let rated = service.rate_salon(&salon.id, 100.0).unwrap();
    assert!(rated.rating > 5.0);
}

#[test]
fn sqlite_backed_registry_persists_across_services() {
    let conn = open_db_in_memory().unwrap();
    let clock = ManualClock::new(7);

    let created = {
        let service =
            SalonService::with_clock(SqliteSalonRepository::try_new(&conn).unwrap(), &clock);
        let created = service.create_salon(&owner_x(), cuts_payload()).unwrap();
        service
            .add_service(&owner_x(), &created.id, trim_payload())
            .unwrap();
        service.rate_salon(&created.id, 5.0).unwrap();
        created
    };

    let service =
        SalonService::with_clock(SqliteSalonRepository::try_new(&conn).unwrap(), &clock);
    let loaded = service.get_salon(&created.id).unwrap();
    assert_eq!(loaded.services_rendered.len(), 1);
    assert_eq!(loaded.rating, 3.0);

    let err = service.delete_salon(&caller_y(), &created.id).unwrap_err();
    assert!(matches!(err, SalonServiceError::Forbidden { .. }));
    assert_eq!(service.list_salons().unwrap().len(), 1);

    service.delete_salon(&owner_x(), &created.id).unwrap();
    assert!(service.list_salons().unwrap().is_empty());
}

#[test]
fn sqlite_rejects_rating_that_would_divide_by_zero() {
    let conn = open_db_in_memory().unwrap();
    let clock = ManualClock::new(1);
    let service = SalonService::with_clock(SqliteSalonRepository::try_new(&conn).unwrap(), &clock);
    let a = service.create_salon(&owner_x(), cuts_payload()).unwrap();
    let b = service.create_salon(&owner_x(), cuts_payload()).unwrap();

    let lowered = service.rate_salon(&a.id, -3.0).unwrap();
    assert_eq!(lowered.rating, -1.0);
    clock.advance(5);

    let err = service.rate_salon(&a.id, 2.0).unwrap_err();
    assert!(matches!(&err, SalonServiceError::InvalidInput { salon_id, .. } if salon_id == &a.id));
    assert_eq!(err.code(), "invalid_input");

    let nan_err = service.rate_salon(&b.id, f32::NAN).unwrap_err();
    assert!(matches!(nan_err, SalonServiceError::InvalidInput { .. }));

    assert_eq!(service.get_salon(&a.id).unwrap(), lowered);
    assert_eq!(service.get_salon(&b.id).unwrap(), b);
    assert_eq!(service.list_salons().unwrap().len(), 2);
}

#[test]
fn sqlite_rejects_non_finite_service_amount() {
    let conn = open_db_in_memory().unwrap();
    let clock = ManualClock::new(1);
    let service = SalonService::with_clock(SqliteSalonRepository::try_new(&conn).unwrap(), &clock);
    let created = service.create_salon(&owner_x(), cuts_payload()).unwrap();

    for amount in [f64::INFINITY, f64::NEG_INFINITY, f64::NAN] {
        let err = service
            .add_service(
                &owner_x(),
                &created.id,
                ServiceRenderedPayload {
                    service_amount: amount,
                    ..trim_payload()
                },
            )
            .unwrap_err();
        assert!(matches!(err, SalonServiceError::InvalidInput { .. }), "{amount}");
    }

    // Ownership is checked before the amount.
    let forbidden = service
        .add_service(
            &caller_y(),
            &created.id,
            ServiceRenderedPayload {
                service_amount: f64::INFINITY,
                ..trim_payload()
            },
        )
        .unwrap_err();
    assert!(matches!(forbidden, SalonServiceError::Forbidden { .. }));

    assert_eq!(service.get_salon(&created.id).unwrap(), created);
    assert_eq!(service.list_salons().unwrap(), vec![created]);
}

#[test]
fn sqlite_non_owner_writes_leave_stored_record_unchanged() {
    let conn = open_db_in_memory().unwrap();
    let clock = ManualClock::new(1);
    let service = SalonService::with_clock(SqliteSalonRepository::try_new(&conn).unwrap(), &clock);
    let created = service.create_salon(&owner_x(), cuts_payload()).unwrap();
    clock.advance(10);

    let update_err = service
        .update_salon(
            &caller_y(),
            &created.id,
            SaloonPayload {
                saloon_name: "Hijacked".to_string(),
                ..cuts_payload()
            },
        )
        .unwrap_err();
    assert!(matches!(update_err, SalonServiceError::Forbidden { .. }));

    let service_err = service
        .add_service(&caller_y(), &created.id, trim_payload())
        .unwrap_err();
    assert!(matches!(service_err, SalonServiceError::Forbidden { .. }));

    // A fresh repository reads the row straight from SQLite.
    let reread = SqliteSalonRepository::try_new(&conn).unwrap();
    assert_eq!(reread.get_salon(&created.id).unwrap(), Some(created));
}
