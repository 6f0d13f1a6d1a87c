use chrono::{NaiveDate, NaiveDateTime};
use std::sync::{Arc, Barrier};
use std::thread;
use uniadmin_core::{
    DirectoryError, IdType, Role, Specialty, StaffDirectory, StaffRegistration, StudentProfile,
    TimeInterval, User, UserCore,
};

fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 6, day)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap()
}

fn slot(day: u32, from: (u32, u32), to: (u32, u32)) -> TimeInterval {
    TimeInterval::new(at(day, from.0, from.1), at(day, to.0, to.1))
}

fn directory_with(ids: &[&str]) -> StaffDirectory {
    let directory = StaffDirectory::new();
    for id in ids {
        directory
            .register(StaffRegistration {
                id: id.to_string(),
                display_name: format!("Staff {id}"),
                role: Role::Teacher,
                specialty: None,
            })
            .unwrap();
    }
    directory
}

fn core(id: &str, role: Role) -> UserCore {
    UserCore {
        id: id.to_string(),
        id_type: IdType::Cc,
        full_name: "Maria Lopez".to_string(),
        phone: 3_001_234_567,
        email: "maria.lopez@uni.edu.co".to_string(),
        role,
        active: true,
    }
}

#[test]
fn adjacent_slots_are_accepted_and_overlaps_rejected() {
    let directory = directory_with(&["T-1"]);

    directory
        .add_availability("T-1", slot(1, (10, 0), (11, 0)))
        .unwrap();
    directory
        .add_availability("T-1", slot(1, (11, 0), (12, 0)))
        .unwrap();
    let first = directory
        .add_availability("T-1", slot(1, (8, 0), (9, 0)))
        .unwrap();

    let err = directory
        .add_availability("T-1", slot(1, (8, 30), (9, 30)))
        .unwrap_err();
    assert!(matches!(err, DirectoryError::OverlapConflict { existing } if existing == first.id));

    let record = directory.get("T-1").unwrap();
    let starts: Vec<_> = record.schedule.iter().map(|e| e.start).collect();
    assert_eq!(starts, [at(1, 8, 0), at(1, 10, 0), at(1, 11, 0)]);
}

#[test]
fn degenerate_intervals_are_not_stored() {
    let directory = directory_with(&["T-1"]);

    let empty = directory.add_availability("T-1", slot(1, (9, 0), (9, 0)));
    let reversed = directory.add_availability("T-1", slot(1, (10, 0), (9, 0)));

    assert!(matches!(empty, Err(DirectoryError::InvalidInterval { .. })));
    assert!(matches!(reversed, Err(DirectoryError::InvalidInterval { .. })));
    assert!(directory.get("T-1").unwrap().schedule.is_empty());
}

#[test]
fn removing_an_entry_twice_reports_not_found() {
    let directory = directory_with(&["T-1"]);
    let entry = directory
        .add_availability("T-1", slot(1, (9, 0), (10, 0)))
        .unwrap();

    directory.remove_availability("T-1", entry.id).unwrap();
    let err = directory.remove_availability("T-1", entry.id).unwrap_err();
    assert!(matches!(err, DirectoryError::EntryNotFound(id) if id == entry.id));
}

#[test]
fn operations_on_unknown_staff_fail_with_staff_not_found() {
    let directory = directory_with(&[]);

    let add = directory.add_availability("ghost", slot(1, (9, 0), (10, 0)));
    let role = directory.change_role("ghost", "TEACHER");
    let delete = directory.delete("ghost");

    assert!(matches!(add, Err(DirectoryError::StaffNotFound(_))));
    assert!(matches!(role, Err(DirectoryError::StaffNotFound(_))));
    assert!(matches!(delete, Err(DirectoryError::StaffNotFound(_))));
}

#[test]
fn role_and_specialty_updates_validate_before_touching_the_record() {
    let directory = directory_with(&["T-1"]);

    let bad_role = directory.change_role("T-1", "astronaut").unwrap_err();
    assert!(matches!(bad_role, DirectoryError::InvalidRole(text) if text == "astronaut"));
    let student = directory.change_role("T-1", "student").unwrap_err();
    assert!(matches!(student, DirectoryError::IncompatibleRole { .. }));
    let bad_specialty = directory.change_specialty("T-1", "astrology").unwrap_err();
    assert!(matches!(bad_specialty, DirectoryError::InvalidSpecialty(_)));

    let unchanged = directory.get("T-1").unwrap();
    assert_eq!(unchanged.role, Role::Teacher);
    assert_eq!(unchanged.specialty, None);

    let updated = directory.change_role("T-1", " wellness_staff ").unwrap();
    assert_eq!(updated.role, Role::WellnessStaff);
    let updated = directory.change_specialty("T-1", "yoga_instructor").unwrap();
    assert_eq!(updated.specialty, Some(Specialty::YogaInstructor));
    let cleared = directory.change_specialty("T-1", "NONE").unwrap();
    assert_eq!(cleared.specialty, None);
}

#[test]
fn delete_drops_the_record_and_its_entries() {
    let directory = directory_with(&["T-1", "T-2"]);
    directory
        .add_availability("T-1", slot(1, (9, 0), (10, 0)))
        .unwrap();
    directory
        .add_availability("T-1", slot(2, (9, 0), (10, 0)))
        .unwrap();

    let removed = directory.delete("T-1").unwrap();
    assert_eq!(removed.schedule.len(), 2);
    assert!(!directory.contains("T-1"));
    assert!(directory
        .find_available_on(NaiveDate::from_ymd_opt(2025, 6, 1).unwrap())
        .is_empty());

    let again = directory.delete("T-1").unwrap_err();
    assert!(matches!(again, DirectoryError::StaffNotFound(_)));
    assert_eq!(directory.len(), 1);
}

#[test]
fn concurrent_overlapping_adds_admit_exactly_one() {
    for _ in 0..50 {
        let directory = Arc::new(directory_with(&["T-1"]));
        let barrier = Arc::new(Barrier::new(2));

        let handles: Vec<_> = [slot(1, (9, 0), (10, 0)), slot(1, (9, 30), (10, 30))]
            .into_iter()
            .map(|interval| {
                let directory = Arc::clone(&directory);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    directory.add_availability("T-1", interval)
                })
            })
            .collect();
        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        let successes = results.iter().filter(|r| r.is_ok()).count();
        let conflicts = results
            .iter()
            .filter(|r| matches!(r, Err(DirectoryError::OverlapConflict { .. })))
            .count();
        assert_eq!((successes, conflicts), (1, 1));
        assert_eq!(directory.get("T-1").unwrap().schedule.len(), 1);
    }
}

#[test]
fn writers_on_different_staff_do_not_interfere() {
    let ids: Vec<String> = (0..8).map(|i| format!("T-{i}")).collect();
    let id_refs: Vec<&str> = ids.iter().map(String::as_str).collect();
    let directory = Arc::new(directory_with(&id_refs));

    let handles: Vec<_> = ids
        .iter()
        .cloned()
        .map(|id| {
            let directory = Arc::clone(&directory);
            thread::spawn(move || {
                for hour in 8..16 {
                    directory
                        .add_availability(&id, slot(1, (hour, 0), (hour + 1, 0)))
                        .unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    for record in directory.records() {
        assert_eq!(record.schedule.len(), 8);
    }
}

#[test]
fn register_user_accepts_staff_and_rejects_students() {
    let directory = StaffDirectory::new();

    let trainer = directory
        .register_user(User::staff(core("1020304050", Role::Trainer), None))
        .unwrap();
    assert_eq!(trainer.specialty, Some(Specialty::FitnessCoach));
    assert_eq!(trainer.display_name, "Maria Lopez");

    let student = User::student(
        core("5060708090", Role::Student),
        StudentProfile {
            student_code: "2025001".to_string(),
            program: "Systems Engineering".to_string(),
            semester: 3,
            address: "Calle 1".to_string(),
        },
    );
    let err = directory.register_user(student).unwrap_err();
    assert!(matches!(err, DirectoryError::NotStaff(id) if id == "5060708090"));

    let mut bad_email = core("1122334455", Role::Teacher);
    bad_email.email = "not-an-email".to_string();
    let err = directory
        .register_user(User::staff(bad_email, None))
        .unwrap_err();
    assert!(matches!(err, DirectoryError::InvalidUser(_)));
    assert_eq!(directory.len(), 1);
}

#[test]
fn delete_racing_an_add_never_loses_or_resurrects_the_entry() {
    for _ in 0..100 {
        let directory = Arc::new(directory_with(&["T-1"]));
        directory
            .add_availability("T-1", slot(1, (9, 0), (10, 0)))
            .unwrap();
        let barrier = Arc::new(Barrier::new(2));

        let deleter = {
            let directory = Arc::clone(&directory);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                directory.delete("T-1")
            })
        };
        let adder = {
            let directory = Arc::clone(&directory);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                directory.add_availability("T-1", slot(1, (11, 0), (12, 0)))
            })
        };

        let removed = deleter.join().unwrap().unwrap();
        match adder.join().unwrap() {
            Ok(entry) => assert!(removed.schedule.contains(&entry)),
            Err(err) => {
                assert!(matches!(err, DirectoryError::StaffNotFound(id) if id == "T-1"));
                assert_eq!(removed.schedule.len(), 1);
            }
        }

        assert!(!directory.contains("T-1"));
        assert!(matches!(
            directory.get("T-1"),
            Err(DirectoryError::StaffNotFound(_))
        ));
        assert!(directory.records().is_empty());
    }
}
