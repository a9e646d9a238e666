use chrono::{DateTime, Duration, TimeZone, Utc};
use parkside_catalog::{SlotRegistry, Tariff, VehicleType};
use parkside_ledger::{BookingLedger, CreateOutcome, User};
use parkside_store::{BookingStore, FileStore};

fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 14, hour, minute, 0).unwrap()
}

fn book(
    ledger: &mut BookingLedger,
    registry: &mut SlotRegistry,
    name: &str,
    vehicle: &str,
    entry: DateTime<Utc>,
    exit: DateTime<Utc>,
) -> CreateOutcome {
    ledger.create(
        registry,
        User::new(name, vehicle, "900000000"),
        entry,
        exit,
        &VehicleType::Car,
    )
}

#[test]
fn test_full_session_exhaustion_promotion_and_reload() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::new(
        dir.path().join("bookings.txt"),
        dir.path().join("waitlist.txt"),
    );

    let mut registry = SlotRegistry::default_layout();
    let mut ledger = BookingLedger::new(Tariff::default(), Duration::hours(2));

    // Fill both car slots: a long stay takes the farthest slot first
    let first = match book(&mut ledger, &mut registry, "Asha", "KA01AB1234", at(10, 0), at(14, 0)) {
        CreateOutcome::Booked(b) => b,
        CreateOutcome::NoCapacity => panic!("expected capacity"),
    };
    assert_eq!(first.slot_id, 103);

    let second = match book(&mut ledger, &mut registry, "Ravi", "KA02CD5678", at(10, 0), at(11, 0)) {
        CreateOutcome::Booked(b) => b,
        CreateOutcome::NoCapacity => panic!("expected capacity"),
    };
    assert_eq!(second.slot_id, 101);

    // Third car has nowhere to go and joins the waitlist
    let outcome = book(&mut ledger, &mut registry, "Meera", "KA03EF9012", at(10, 0), at(11, 0));
    assert!(matches!(outcome, CreateOutcome::NoCapacity));
    ledger.enqueue_waitlist(User::new("Meera", "KA03EF9012", "900000003"));

    store.save_bookings(&ledger).unwrap();
    store.save_waitlist(ledger.waitlist()).unwrap();

    // Cancel promotes the waitlist head onto the freed slot
    let release = ledger.cancel(&mut registry, first.id).unwrap();
    let promoted = release.promoted.expect("waitlisted user should be promoted");
    assert_eq!(promoted.slot_id, 103);
    assert_eq!(promoted.id, 3);
    assert!(!registry.find(103).unwrap().is_available());
    assert!(ledger.waitlist().is_empty());

    store.save_bookings(&ledger).unwrap();
    store.save_waitlist(ledger.waitlist()).unwrap();

    // Reload into a fresh process image
    let mut fresh_registry = SlotRegistry::default_layout();
    let mut fresh_ledger = BookingLedger::new(Tariff::default(), Duration::hours(2));
    let count = fresh_ledger.restore(store.load_bookings().unwrap(), &mut fresh_registry);
    fresh_ledger.restore_waitlist(store.load_waitlist().unwrap());

    assert_eq!(count, 2);
    assert!(fresh_ledger.waitlist().is_empty());
    assert_eq!(fresh_ledger.next_id(), 4);
    assert!(!fresh_registry.find(101).unwrap().is_available());
    assert!(!fresh_registry.find(103).unwrap().is_available());

    // The promoted booking survived the round trip with its fee
    let reloaded = fresh_ledger.get(promoted.id).unwrap();
    assert_eq!(reloaded.fee, promoted.fee);
    assert_eq!(reloaded.user.name, "Meera");

    // Ids keep increasing after the reload
    fresh_ledger.cancel(&mut fresh_registry, second.id).unwrap();
    let next = match book(
        &mut fresh_ledger,
        &mut fresh_registry,
        "Dev",
        "KA04GH3456",
        at(15, 0),
        at(16, 0),
    ) {
        CreateOutcome::Booked(b) => b,
        CreateOutcome::NoCapacity => panic!("expected capacity"),
    };
    assert_eq!(next.id, 4);
}
