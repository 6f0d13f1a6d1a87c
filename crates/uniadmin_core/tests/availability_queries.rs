use chrono::{NaiveDate, NaiveDateTime};
use uniadmin_core::{
    AvailabilityQueryEngine, Role, Specialty, SpecialtyMatcher, StaffDirectory,
    StaffRegistration, TimeInterval,
};

fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 6, day)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap()
}

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, day).unwrap()
}

fn register(
    directory: &StaffDirectory,
    id: &str,
    role: Role,
    specialty: Option<Specialty>,
) {
    directory
        .register(StaffRegistration {
            id: id.to_string(),
            display_name: format!("Staff {id}"),
            role,
            specialty,
        })
        .unwrap();
}

fn ids(records: Vec<uniadmin_core::StaffRecord>) -> Vec<String> {
    records.into_iter().map(|record| record.id).collect()
}

fn seeded() -> StaffDirectory {
    let directory = StaffDirectory::new();
    register(&directory, "A", Role::MedicalStaff, Some(Specialty::Dentistry));
    register(&directory, "B", Role::MedicalStaff, Some(Specialty::Psychology));
    register(&directory, "C", Role::Trainer, None);
    register(&directory, "D", Role::Prefect, None);

    directory
        .add_availability("A", TimeInterval::new(at(1, 9, 0), at(1, 10, 0)))
        .unwrap();
    directory
        .add_availability("B", TimeInterval::new(at(1, 23, 0), at(2, 1, 0)))
        .unwrap();
    directory
        .add_availability("C", TimeInterval::new(at(2, 7, 0), at(2, 8, 0)))
        .unwrap();
    directory
}

#[test]
fn date_query_covers_exactly_the_calendar_day() {
    let directory = seeded();

    assert_eq!(ids(directory.find_available_on(date(1))), ["A", "B"]);
    assert_eq!(ids(directory.find_available_on(date(2))), ["B", "C"]);
    assert!(directory.find_available_on(date(3)).is_empty());
}

#[test]
fn explicit_window_excludes_touching_entries() {
    let directory = seeded();

    let touching_end = directory.find_available(at(1, 10, 0), at(1, 11, 0));
    assert!(touching_end.is_empty());
    let touching_start = directory.find_available(at(1, 8, 0), at(1, 9, 0));
    assert!(touching_start.is_empty());

    let inside = directory.find_available(at(1, 9, 59), at(1, 10, 30));
    assert_eq!(ids(inside), ["A"]);
}

#[test]
fn invalid_window_matches_nothing() {
    let directory = seeded();

    assert!(directory.find_available(at(1, 10, 0), at(1, 9, 0)).is_empty());
    assert!(directory.find_available(at(1, 9, 30), at(1, 9, 30)).is_empty());
}

#[test]
fn active_only_engine_skips_inactive_staff() {
    let directory = seeded();
    directory.set_active("A", false).unwrap();

    let everyone = AvailabilityQueryEngine::new(&directory).available_on(date(1));
    let active = AvailabilityQueryEngine::new(&directory)
        .active_only(true)
        .available_on(date(1));

    assert_eq!(ids(everyone), ["A", "B"]);
    assert_eq!(ids(active), ["B"]);
}

#[test]
fn exact_specialty_text_uses_exact_set_semantics() {
    let directory = seeded();

    assert_eq!(ids(directory.match_specialty("DENTISTRY")), ["A"]);
    assert_eq!(ids(directory.match_specialty("  dentistry ")), ["A"]);
    assert_eq!(
        SpecialtyMatcher::resolve("fitness_coach"),
        Some(Specialty::FitnessCoach)
    );
    assert_eq!(ids(directory.match_specialty("FITNESS_COACH")), ["C"]);
}

#[test]
fn unknown_specialty_text_falls_back_to_substring() {
    let directory = seeded();

    assert_eq!(ids(directory.match_specialty("dent")), ["A"]);
    assert_eq!(ids(directory.match_specialty("PSYCH")), ["B"]);
    assert_eq!(ids(directory.match_specialty("coach")), ["C"]);
    assert!(directory.match_specialty("surgery").is_empty());
}

#[test]
fn staff_without_specialty_never_match() {
    let directory = seeded();

    let everything = directory.match_specialty("");
    assert_eq!(ids(everything), ["A", "B", "C"]);
    assert!(!ids(directory.match_specialty("o")).contains(&"D".to_string()));
}
