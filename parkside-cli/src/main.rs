use anyhow::Context;
use chrono::{Duration, NaiveDateTime, TimeZone, Utc};
use parkside_catalog::{SlotRegistry, Tariff, VehicleType};
use parkside_ledger::{BookingLedger, CreateOutcome, User};
use parkside_store::{BookingStore, Config, FileStore};
use std::io::{self, Write};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "parkside=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("Failed to load config")?;
    let mut registry = SlotRegistry::default_layout();
    let mut ledger = BookingLedger::new(
        Tariff::new(config.business_rules.rate_per_hour),
        Duration::hours(config.business_rules.default_promotion_hours),
    );
    let store = FileStore::new(
        &config.storage.bookings_file,
        &config.storage.waitlist_file,
    );

    match store.load_bookings() {
        Ok(records) => {
            let count = ledger.restore(records, &mut registry);
            tracing::info!(count, "loaded bookings");
        }
        Err(e) => tracing::error!("could not load bookings: {e}"),
    }
    match store.load_waitlist() {
        Ok(users) => {
            let count = ledger.restore_waitlist(users);
            tracing::info!(count, "loaded waitlist users");
        }
        Err(e) => tracing::error!("could not load waitlist: {e}"),
    }

    loop {
        println!("\n--- Parkside Menu ---");
        println!("1. View available slots");
        println!("2. Book a slot");
        println!("3. Cancel booking");
        println!("4. Update booking");
        println!("5. View all bookings");
        println!("6. Find booking by vehicle number");
        println!("7. View waitlist");
        println!("8. Check fare by vehicle number");
        println!("9. Exit");

        let choice = prompt("Choose an option: ")?;
        match choice.as_str() {
            "1" => view_available(&registry),
            "2" => {
                book_slot(&mut ledger, &mut registry)?;
                checkpoint(&store, &ledger);
            }
            "3" => {
                cancel_booking(&mut ledger, &mut registry)?;
                checkpoint(&store, &ledger);
            }
            "4" => {
                update_booking(&mut ledger, &mut registry)?;
                checkpoint(&store, &ledger);
            }
            "5" => view_all(&ledger, &registry),
            "6" => find_by_vehicle(&ledger)?,
            "7" => view_waitlist(&ledger),
            "8" => check_fare(&ledger)?,
            "9" => {
                checkpoint(&store, &ledger);
                println!("Goodbye!");
                return Ok(());
            }
            other => println!("Invalid option: {other}"),
        }
    }
}

fn view_available(registry: &SlotRegistry) {
    println!("\n--- Available Parking Slots ---");
    let mut found = false;
    for slot in registry.iter().filter(|s| s.is_available()) {
        found = true;
        println!(
            "Slot {} | Floor {} | {}",
            slot.id, slot.floor, slot.vehicle_type
        );
    }
    if !found {
        println!("No slots available at the moment.");
    }
}

fn book_slot(ledger: &mut BookingLedger, registry: &mut SlotRegistry) -> anyhow::Result<()> {
    let name = prompt("Enter your name: ")?;
    let type_input = prompt("Enter vehicle type (Car/Bike): ")?;
    let vehicle_type: VehicleType = match type_input.parse() {
        Ok(t) => t,
        Err(e) => {
            println!("{e}");
            return Ok(());
        }
    };
    let vehicle_number = prompt("Enter vehicle number: ")?;
    let contact = prompt("Enter contact: ")?;
    let hours: i64 = match prompt("Enter stay duration in hours: ")?.parse() {
        Ok(h) => h,
        Err(_) => {
            println!("Invalid duration.");
            return Ok(());
        }
    };

    let entry = Utc::now();
    let exit = entry + Duration::hours(hours);
    let user = User::new(name, vehicle_number, contact);

    match ledger.create(registry, user.clone(), entry, exit, &vehicle_type) {
        CreateOutcome::Booked(booking) => {
            println!(
                "Booking {} created on slot {} (fee {}).",
                booking.id, booking.slot_id, booking.fee
            );
        }
        CreateOutcome::NoCapacity => {
            println!("No available slots for vehicle type {vehicle_type}.");
            let join = prompt("Join the waitlist? (Y/N): ")?;
            if join.eq_ignore_ascii_case("y") {
                ledger.enqueue_waitlist(user);
                println!("Added to the waitlist.");
            } else {
                println!("Booking abandoned; not added to the waitlist.");
            }
        }
    }
    Ok(())
}

fn cancel_booking(ledger: &mut BookingLedger, registry: &mut SlotRegistry) -> anyhow::Result<()> {
    let id: u32 = match prompt("Enter booking ID to cancel: ")?.parse() {
        Ok(id) => id,
        Err(_) => {
            println!("Invalid booking ID.");
            return Ok(());
        }
    };

    match ledger.cancel(registry, id) {
        Ok(release) => {
            println!(
                "Booking {} cancelled. Slot {} released.",
                id, release.booking.slot_id
            );
            if let Some(promoted) = release.promoted {
                println!(
                    "Waitlisted user {} booked into slot {} under booking {}.",
                    promoted.user.details(),
                    promoted.slot_id,
                    promoted.id
                );
            }
        }
        Err(e) => println!("{e}"),
    }
    Ok(())
}

fn update_booking(ledger: &mut BookingLedger, registry: &mut SlotRegistry) -> anyhow::Result<()> {
    let id: u32 = match prompt("Enter booking ID to update: ")?.parse() {
        Ok(id) => id,
        Err(_) => {
            println!("Invalid booking ID.");
            return Ok(());
        }
    };
    let Some(booking) = ledger.get(id) else {
        println!("Booking {id} not found.");
        return Ok(());
    };

    println!("\n--- Update Booking {id} ---");
    println!("Current entry time: {}", booking.entry_time.format(TIME_FORMAT));
    println!("Current exit  time: {}", booking.exit_time.format(TIME_FORMAT));
    println!("1. Change vehicle number");
    println!("2. Change exit time");
    println!("3. Mark early exit (leave now)");

    match prompt("Choose an option: ")?.as_str() {
        "1" => {
            let new_number = prompt("Enter new vehicle number: ")?;
            match ledger.update_vehicle_number(id, new_number) {
                Ok(()) => println!("Vehicle number updated."),
                Err(e) => println!("{e}"),
            }
        }
        "2" => {
            let input = prompt("Enter new exit time (YYYY-MM-DD HH:MM): ")?;
            let new_exit = match NaiveDateTime::parse_from_str(&input, TIME_FORMAT) {
                Ok(naive) => Utc.from_utc_datetime(&naive),
                Err(_) => {
                    println!("Invalid date-time.");
                    return Ok(());
                }
            };
            match ledger.update_exit_time(id, new_exit) {
                Ok(fee) => println!("Exit time updated. Fee recalculated: {fee}"),
                Err(e) => println!("{e}"),
            }
        }
        "3" => match ledger.early_exit(registry, id, Utc::now()) {
            Ok(release) => {
                println!(
                    "Early exit marked. Fee remains unchanged: {}",
                    release.booking.fee
                );
                if let Some(promoted) = release.promoted {
                    println!(
                        "Waitlisted user {} booked into slot {} under booking {}.",
                        promoted.user.details(),
                        promoted.slot_id,
                        promoted.id
                    );
                }
            }
            Err(e) => println!("{e}"),
        },
        other => println!("Invalid option: {other}"),
    }
    Ok(())
}

fn view_all(ledger: &BookingLedger, registry: &SlotRegistry) {
    if ledger.is_empty() {
        println!("No bookings found.");
        return;
    }

    println!("\nAll bookings:");
    for booking in ledger.bookings() {
        let slot_type = registry
            .find(booking.slot_id)
            .map(|s| s.vehicle_type.to_string())
            .unwrap_or_else(|| "?".to_string());
        println!("---------------------------");
        println!("Booking ID: {}", booking.id);
        println!("User: {}", booking.user.details());
        println!("Slot: {} ({slot_type})", booking.slot_id);
        println!("Entry time: {}", booking.entry_time.format(TIME_FORMAT));
        println!("Exit time: {}", booking.exit_time.format(TIME_FORMAT));
        println!("Fee: {}", booking.fee);
    }
}

fn find_by_vehicle(ledger: &BookingLedger) -> anyhow::Result<()> {
    let number = prompt("Enter vehicle number: ")?;
    match ledger.find_by_vehicle(&number) {
        Some(booking) => {
            println!("Booking ID: {}", booking.id);
            println!("Slot: {}", booking.slot_id);
            println!("Entry time: {}", booking.entry_time.format(TIME_FORMAT));
            println!("Exit time: {}", booking.exit_time.format(TIME_FORMAT));
        }
        None => println!("Vehicle not found."),
    }
    Ok(())
}

fn view_waitlist(ledger: &BookingLedger) {
    println!("\nCurrent waitlist:");
    if ledger.waitlist().is_empty() {
        println!("No users are currently waiting.");
        return;
    }
    for (pos, user) in ledger.waitlist().iter().enumerate() {
        println!("{}. {}", pos + 1, user.details());
    }
}

fn check_fare(ledger: &BookingLedger) -> anyhow::Result<()> {
    let number = prompt("Enter vehicle number: ")?;
    match ledger.find_by_vehicle(&number) {
        Some(booking) => println!("Total fare for booking {}: {}", booking.id, booking.fee),
        None => println!("Vehicle not found."),
    }
    Ok(())
}

/// Persist ledger and waitlist after a mutating operation. Save failures
/// are reported but the in-memory state is kept as-is.
fn checkpoint(store: &FileStore, ledger: &BookingLedger) {
    if let Err(e) = store.save_bookings(ledger) {
        tracing::error!("could not save bookings: {e}");
    }
    if let Err(e) = store.save_waitlist(ledger.waitlist()) {
        tracing::error!("could not save waitlist: {e}");
    }
}

fn prompt(label: &str) -> anyhow::Result<String> {
    print!("{label}");
    io::stdout().flush()?;
    let mut line = String::new();
    let read = io::stdin().read_line(&mut line)?;
    anyhow::ensure!(read > 0, "input stream closed");
    Ok(line.trim().to_string())
}
