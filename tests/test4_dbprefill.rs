mod common;

use common::{FIXTURE_SQL, admin, setup_test_context};
use golf_tracker::controller::db_prefill::{PrefillSummary, db_prefill};
use golf_tracker::storage::Storage;

#[tokio::test]
async fn test_dbprefill_into_empty_db() -> Result<(), Box<dyn std::error::Error>> {
    let storage = setup_test_context("").await?;
    assert!(storage.list_clubs().await?.is_empty());

    let json = serde_json::from_str(include_str!("test4_dbprefill.json"))?;
    let summary = db_prefill(&json, &storage).await?;
    assert_eq!(
        summary,
        PrefillSummary {
            clubs: 2,
            courses: 3,
            players: 4
        }
    );

    let courses = storage.list_courses().await?;
    let east = courses
        .iter()
        .find(|c| c.name == "East")
        .expect("east course loaded");
    assert_eq!(east.number_of_holes, 3);
    assert_eq!(east.default_par, 12);
    let holes = storage.holes_for_course(east.golf_course_id).await?;
    assert_eq!(holes.iter().map(|h| h.par).collect::<Vec<_>>(), vec![4, 3, 5]);
    assert_eq!(holes[2].length_yards, Some(510));

    let erin = storage.player_for_user("erin").await?.expect("erin loaded");
    assert_eq!(erin.handicap, Some(3.5));

    // loading again adds nothing
    let again = db_prefill(&json, &storage).await?;
    assert_eq!(again, PrefillSummary::default());
    Ok(())
}

#[tokio::test]
async fn test_dbprefill_skips_existing_rows() -> Result<(), Box<dyn std::error::Error>> {
    let storage = setup_test_context(FIXTURE_SQL).await?;

    let json = serde_json::from_str(include_str!("test4_dbprefill.json"))?;
    let summary = db_prefill(&json, &storage).await?;
    // the club, North, Alice and her Bob are already in the fixture
    assert_eq!(
        summary,
        PrefillSummary {
            clubs: 1,
            courses: 2,
            players: 2
        }
    );
    assert_eq!(storage.list_clubs().await?.len(), 2);
    assert_eq!(storage.list_players(&admin("root")).await?.len(), 6);
    Ok(())
}

#[tokio::test]
async fn test_dbprefill_rejects_bad_layout() -> Result<(), Box<dyn std::error::Error>> {
    let storage = setup_test_context("").await?;
    let json = serde_json::json!({ "clubs": [ { "courses": [] } ] });
    assert!(db_prefill(&json, &storage).await.is_err());
    Ok(())
}

#[tokio::test]
async fn test_dbprefill_course_listed_twice() -> Result<(), Box<dyn std::error::Error>> {
    let storage = setup_test_context("").await?;
    let json = serde_json::json!({
        "clubs": [ { "name": "C", "courses": [ { "name": "A" }, { "name": "A" } ] } ]
    });
    let summary = db_prefill(&json, &storage).await?;
    assert_eq!(summary.clubs, 1);
    assert_eq!(summary.courses, 1);
    assert_eq!(storage.list_courses().await?.len(), 1);
    Ok(())
}
