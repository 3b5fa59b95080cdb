//! End-to-end flows through the security service against in-memory SQLite.

use passguard::core::service::{SecurityService, ServiceError};
use passguard::db::Database;
use passguard::generators::GenerationOptions;
use passguard::models::{Severity, TestFilter};

async fn memory_service() -> SecurityService {
    let db = Database::new("sqlite::memory:")
        .await
        .expect("in-memory database");
    SecurityService::new(db)
}

// Service plus a second handle on the same pool, for seeding rows with
// exact scores without going through the analyzer
async fn memory_service_with_db() -> (SecurityService, Database) {
    let db = Database::new("sqlite::memory:")
        .await
        .expect("in-memory database");
    (SecurityService::new(db.clone()), db)
}

#[tokio::test]
async fn test_new_account_starts_with_welcome_breach() {
    let service = memory_service().await;

    let user = service.create_user("alice", "S3cure!pass").await.unwrap();
    assert_eq!(user.username, "alice");

    let breaches = service.user_breaches("alice").await.unwrap();
    assert_eq!(breaches.len(), 1);
    assert_eq!(breaches[0].breach_name, "New User Security Check");
    assert_eq!(breaches[0].severity, Severity::Low);
    assert_eq!(breaches[0].affected_count, 0);
}

#[tokio::test]
async fn test_duplicate_username_leaves_original_account_intact() {
    let service = memory_service().await;
    service.create_user("bob", "original-pw").await.unwrap();

    let err = service.create_user("bob", "other-pw").await.unwrap_err();
    assert!(matches!(err, ServiceError::DuplicateUser(_)));

    // the first account still authenticates and kept exactly one breach
    let login = service.authenticate("bob", "original-pw").await.unwrap();
    assert!(login.is_some());
    assert_eq!(service.user_breaches("bob").await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_authentication_does_not_reveal_which_part_failed() {
    let service = memory_service().await;
    service.create_user("carol", "right-horse").await.unwrap();

    let unknown_user = service.authenticate("nobody", "right-horse").await.unwrap();
    let wrong_password = service.authenticate("carol", "wrong-horse").await.unwrap();
    assert!(unknown_user.is_none());
    assert!(wrong_password.is_none());

    let user = service
        .authenticate("carol", "right-horse")
        .await
        .unwrap()
        .expect("correct credentials");
    assert_eq!(user.username, "carol");
}

#[tokio::test]
async fn test_tested_passwords_land_in_history_with_their_scores() {
    let service = memory_service().await;
    service.create_user("dave", "pw").await.unwrap();

    let weak = service.test_password("dave", "aaa111").await.unwrap();
    assert_eq!(weak.analysis.score, 5);
    assert!(weak
        .suggestions
        .contains(&"Consider using a password generator for better security".to_string()));

    let strong = service.test_password("dave", "Passw0rd!9317").await.unwrap();
    assert_eq!(strong.analysis.score, 65);
    assert!(strong.suggestions.is_empty());

    let history = service.test_history("dave", TestFilter::All).await.unwrap();
    assert_eq!(history.len(), 2);
    assert!(history.iter().all(|test| !test.is_generated));
    assert_eq!(history[0].score, 5);
    assert_eq!(history[1].score, 65);
    assert!(history[1].is_strong());
}

#[tokio::test]
async fn test_generated_passwords_honor_options_and_are_recorded() {
    let service = memory_service().await;
    service.create_user("erin", "pw").await.unwrap();

    let options = GenerationOptions {
        length: 20,
        use_uppercase: true,
        use_digits: true,
        use_symbols: false,
    };
    let outcome = service.generate_password("erin", &options).await.unwrap();

    assert_eq!(outcome.password.chars().count(), 20);
    assert!(outcome.password.chars().any(|c| c.is_ascii_uppercase()));
    assert!(outcome.password.chars().any(|c| c.is_ascii_digit()));
    assert!(outcome.password.chars().all(|c| c.is_ascii_alphanumeric()));

    let history = service
        .test_history("erin", TestFilter::GeneratedOnly)
        .await
        .unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].id, outcome.test_id);
    assert_eq!(history[0].score, i64::from(outcome.analysis.score));
}

#[tokio::test]
async fn test_generate_multiple_records_each_candidate() {
    let service = memory_service().await;
    service.create_user("felix", "pw").await.unwrap();

    let outcomes = service.generate_multiple("felix", 5, 14).await.unwrap();
    assert_eq!(outcomes.len(), 5);
    assert!(outcomes
        .iter()
        .all(|outcome| outcome.password.chars().count() == 14));

    // every candidate got its own row
    let ids: Vec<i64> = outcomes.iter().map(|outcome| outcome.test_id).collect();
    assert!(ids.windows(2).all(|pair| pair[0] < pair[1]));

    let generated = service
        .test_history("felix", TestFilter::GeneratedOnly)
        .await
        .unwrap();
    assert_eq!(generated.len(), 5);
    let tested = service
        .test_history("felix", TestFilter::TestedOnly)
        .await
        .unwrap();
    assert!(tested.is_empty());
}

#[tokio::test]
async fn test_association_flow_is_idempotent_and_validated() {
    let service = memory_service().await;
    service.create_user("gina", "pw").await.unwrap();

    let outcome = service.test_password("gina", "aaa111").await.unwrap();
    let breach = service
        .report_breach("gina", "LeakedSite", Severity::High)
        .await
        .unwrap();

    service
        .associate_test_with_breach(breach.id, outcome.test_id)
        .await
        .unwrap();
    service
        .associate_test_with_breach(breach.id, outcome.test_id)
        .await
        .unwrap();

    let affected = service.breach_affected_tests(breach.id).await.unwrap();
    assert_eq!(affected.len(), 1);
    assert_eq!(affected[0].id, outcome.test_id);
    assert_eq!(affected[0].breach_count, 1);

    let missing_breach = service
        .associate_test_with_breach(9999, outcome.test_id)
        .await
        .unwrap_err();
    assert!(matches!(missing_breach, ServiceError::NotFound(_)));
    let missing_test = service
        .associate_test_with_breach(breach.id, 9999)
        .await
        .unwrap_err();
    assert!(matches!(missing_test, ServiceError::NotFound(_)));
    assert!(matches!(
        service.breach_affected_tests(9999).await.unwrap_err(),
        ServiceError::NotFound(_)
    ));
}

#[tokio::test]
async fn test_stats_track_the_full_journey() {
    let service = memory_service().await;
    service.create_user("hana", "pw").await.unwrap();

    // fresh account: no tests yet, average reads 0.0
    let empty = service.user_stats("hana").await.unwrap();
    assert_eq!(empty.tests_performed, 0);
    assert_eq!(empty.strong_passwords, 0);
    assert_eq!(empty.average_score, 0.0);

    service.test_password("hana", "aaa111").await.unwrap(); // 5
    service.test_password("hana", "Passw0rd!9317").await.unwrap(); // 65
    service
        .test_password("hana", "Vb7!Qm2@Xr9%Kd4&")
        .await
        .unwrap(); // 70
    service
        .report_breach("hana", "Forum Dump", Severity::Low)
        .await
        .unwrap();

    let stats = service.user_stats("hana").await.unwrap();
    assert_eq!(stats.username, "hana");
    assert_eq!(stats.tests_performed, 3);
    assert_eq!(stats.passwords_generated, 0);
    assert_eq!(stats.strong_passwords, 2);
    // welcome breach plus the reported one
    assert_eq!(stats.breach_count, 2);
    // (5 + 65 + 70) / 3 = 46.666..., rounded to two decimals
    assert_eq!(stats.average_score, 46.67);
}

#[tokio::test]
async fn test_overview_counts_tests_and_generated_separately() {
    let (service, db) = memory_service_with_db().await;
    let ada = service.create_user("ada", "pw").await.unwrap();
    let bea = service.create_user("bea", "pw").await.unwrap();

    db.insert_test(ada.id, 39, false).await.unwrap();
    db.insert_test(ada.id, 40, false).await.unwrap();
    db.insert_test(bea.id, 85, true).await.unwrap();

    let overview = service.system_overview().await.unwrap();
    assert_eq!(overview.total_users, 2);
    assert_eq!(overview.total_tests, 2);
    assert_eq!(overview.total_generated, 1);
    // default threshold 40, strictly below: only the 39
    assert_eq!(overview.weak_tests, 1);
    // the two welcome breaches
    assert_eq!(overview.total_breaches, 2);
}

#[tokio::test]
async fn test_weak_password_search_uses_a_strict_threshold() {
    let (service, db) = memory_service_with_db().await;
    let user = service.create_user("ivan", "pw").await.unwrap();

    db.insert_test(user.id, 39, false).await.unwrap();
    db.insert_test(user.id, 40, false).await.unwrap();
    db.insert_test(user.id, 41, true).await.unwrap();

    let weak = service.weak_tests(40).await.unwrap();
    assert_eq!(weak.len(), 1);
    assert_eq!(weak[0].score, 39);

    // raising the bar pulls in the boundary row
    assert_eq!(service.weak_tests(41).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_deleting_a_user_cascades_and_spares_others() {
    let service = memory_service().await;
    service.create_user("jack", "pw").await.unwrap();
    service.create_user("kate", "pw").await.unwrap();

    let outcome = service.test_password("jack", "aaa111").await.unwrap();
    let breach = service
        .report_breach("jack", "Old Leak", Severity::High)
        .await
        .unwrap();
    service
        .associate_test_with_breach(breach.id, outcome.test_id)
        .await
        .unwrap();
    service.test_password("kate", "Passw0rd!9317").await.unwrap();

    service.delete_user("jack").await.unwrap();

    assert!(service.authenticate("jack", "pw").await.unwrap().is_none());

    let users = service.list_users().await.unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].username, "kate");
    assert_eq!(users[0].tests_performed, 1);
    assert_eq!(users[0].passwords_generated, 0);
    assert_eq!(users[0].breach_count, 1);

    let overview = service.system_overview().await.unwrap();
    assert_eq!(overview.total_users, 1);
    assert_eq!(overview.total_tests, 1);
    assert_eq!(overview.total_breaches, 1);

    // only kate's welcome breach survives
    let breaches = service.all_breaches().await.unwrap();
    assert!(breaches
        .iter()
        .all(|b| b.breach_name == "New User Security Check"));
}

#[tokio::test]
async fn test_severity_parsing_is_lenient_and_round_trips() {
    let service = memory_service().await;
    service.create_user("lena", "pw").await.unwrap();

    assert_eq!(Severity::from_input("HIGH"), Severity::High);
    assert_eq!(Severity::from_input(" high "), Severity::High);
    // anything else falls back to Low
    assert_eq!(Severity::from_input("critical"), Severity::Low);

    let breach = service
        .report_breach("lena", "Mystery Dump", Severity::from_input("severe"))
        .await
        .unwrap();
    assert_eq!(breach.severity, Severity::Low);

    let stored = service.user_breaches("lena").await.unwrap();
    let found = stored
        .iter()
        .find(|b| b.breach_name == "Mystery Dump")
        .expect("reported breach is listed");
    assert_eq!(found.severity, Severity::Low);
    assert_eq!(found.severity.level(), 1);
}
