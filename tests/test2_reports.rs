mod common;

use chrono::NaiveDate;
use common::{FIXTURE_SQL, caller, setup_test_context};
use golf_tracker::controller::report::data_service;
use golf_tracker::controller::workflow::{
    HoleScoreInput, HoleScoreRequest, RoundRequest, RoundWorkflow,
};
use golf_tracker::model::{
    NewGolfClub, NewGolfCourse, NewHole, ReportFilter, RoundStatus, RoundType,
};
use golf_tracker::storage::Storage;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[tokio::test]
async fn test_dashboard_stats() -> Result<(), Box<dyn std::error::Error>> {
    let storage = setup_test_context(FIXTURE_SQL).await?;

    let stats = data_service::dashboard_stats(&storage, &caller("alice")).await?;
    // the in-progress round does not count
    assert_eq!(stats.total_rounds, 2);
    assert_eq!(stats.best_score, Some(34));
    assert_eq!(stats.best_score_round_id, Some(2));
    assert_eq!(stats.best_score_date, Some(date(2024, 5, 8)));
    assert_eq!(stats.average_score, Some(35.0));
    assert_eq!(stats.average_to_par, Some(-1.0));
    assert_eq!(stats.lowest_to_par, Some(-2));
    assert_eq!(stats.favorite_course_name.as_deref(), Some("North"));
    assert_eq!(stats.favorite_course_rounds, 2);
    assert_eq!(stats.last_round_date, Some(date(2024, 5, 8)));
    assert_eq!(stats.current_streak, 0);

    let empty = data_service::dashboard_stats(&storage, &caller("nobody")).await?;
    assert_eq!(empty.total_rounds, 0);
    assert!(empty.best_score.is_none());
    Ok(())
}

#[tokio::test]
async fn test_playing_partners() -> Result<(), Box<dyn std::error::Error>> {
    let storage = setup_test_context(FIXTURE_SQL).await?;

    let partners = data_service::playing_partners(&storage, &caller("alice"), 5).await?;
    assert_eq!(partners.len(), 1);
    let bob = &partners[0];
    assert_eq!(bob.partner_id, 2);
    assert_eq!(bob.partner_name, "Bob Brown");
    assert_eq!(bob.rounds_together, 2);
    assert_eq!(bob.user_wins, 2);
    assert_eq!(bob.partner_wins, 0);
    assert_eq!(bob.ties, 0);
    assert_eq!(bob.last_played_date, date(2024, 5, 8));

    assert!(data_service::playing_partners(&storage, &caller("alice"), 0).await?.is_empty());
    assert!(data_service::playing_partners(&storage, &caller("carol"), 5).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_scoring_distribution_and_par_groups() -> Result<(), Box<dyn std::error::Error>> {
    let storage = setup_test_context(FIXTURE_SQL).await?;

    let distribution =
        data_service::scoring_distribution(&storage, 1, &ReportFilter::default()).await?;
    assert_eq!(distribution.total_holes, 18);
    assert_eq!(distribution.birdie_count, 2);
    assert_eq!(distribution.par_count, 16);
    assert_eq!(distribution.bogey_count, 0);
    assert!((distribution.par_percentage - 16.0 / 18.0 * 100.0).abs() < 1e-9);

    let friendly_only = ReportFilter {
        round_type: Some(RoundType::Friendly),
        ..ReportFilter::default()
    };
    let friendly = data_service::scoring_distribution(&storage, 1, &friendly_only).await?;
    assert_eq!(friendly.total_holes, 9);
    assert_eq!(friendly.birdie_count, 0);

    let by_par = data_service::performance_by_par(&storage, 1, &ReportFilter::default()).await?;
    assert!(by_par.has_valid_data);
    assert_eq!(by_par.par3.count, 4);
    assert!((by_par.par3.average - 2.75).abs() < 1e-9);
    assert!((by_par.par3.relative_to_par + 0.25).abs() < 1e-9);
    assert_eq!(by_par.par4.count, 10);
    assert!((by_par.par4.average - 3.9).abs() < 1e-9);
    assert_eq!(by_par.par5.count, 4);
    assert!((by_par.par5.average - 5.0).abs() < 1e-9);
    Ok(())
}

#[tokio::test]
async fn test_performance_summary_and_recent_rounds() -> Result<(), Box<dyn std::error::Error>> {
    let storage = setup_test_context(FIXTURE_SQL).await?;
    let alice = caller("alice");

    let points =
        data_service::performance_summary(&storage, &alice, 7, &ReportFilter::default()).await?;
    assert_eq!(
        points.iter().map(|p| p.round_id).collect::<Vec<_>>(),
        vec![1, 2]
    );
    assert_eq!(points[1].total_score, 34);
    assert_eq!(points[1].score_vs_par, -2);

    let last_only =
        data_service::performance_summary(&storage, &alice, 1, &ReportFilter::default()).await?;
    assert_eq!(last_only.len(), 1);
    assert_eq!(last_only[0].round_id, 2);

    let may_first_week = ReportFilter {
        end_date: Some(date(2024, 5, 7)),
        ..ReportFilter::default()
    };
    let early = data_service::performance_summary(&storage, &alice, 7, &may_first_week).await?;
    assert_eq!(early.len(), 1);
    assert_eq!(early[0].round_id, 1);

    let recent = data_service::recent_rounds(&storage, &alice, 5).await?;
    assert_eq!(recent.len(), 3);
    assert_eq!(recent[0].round_id, 3);
    assert_eq!(recent[0].status, RoundStatus::InProgress);
    assert_eq!(recent[1].player_count, 2);
    Ok(())
}

#[tokio::test]
async fn test_player_report() -> Result<(), Box<dyn std::error::Error>> {
    let storage = setup_test_context(FIXTURE_SQL).await?;
    let bob = storage.get_player(2).await?.expect("fixture player");

    let report = data_service::player_report(&storage, bob, &ReportFilter::default()).await?;
    assert_eq!(report.player.player_id, 2);
    assert_eq!(report.filter_courses.len(), 1);
    assert_eq!(report.filter_courses[0].name, "North");
    assert_eq!(
        report
            .performance_data
            .iter()
            .map(|p| p.total_score)
            .collect::<Vec<_>>(),
        vec![45, 36]
    );
    Ok(())
}

#[tokio::test]
async fn test_player_report_keeps_same_named_courses_apart() -> Result<(), Box<dyn std::error::Error>> {
    let storage = setup_test_context(FIXTURE_SQL).await?;
    let club = storage
        .add_club(&NewGolfClub {
            name: "Harbor Links".to_string(),
            city: None,
            country: None,
            website: None,
        })
        .await?;
    let other_north = storage
        .add_course(&NewGolfCourse {
            golf_club_id: club.golf_club_id,
            name: "North".to_string(),
            default_par: None,
            holes: vec![NewHole {
                hole_number: 1,
                par: 3,
                stroke_index: None,
                length_yards: None,
            }],
        })
        .await?;

    let alice = caller("alice");
    let workflow = RoundWorkflow::new(&storage, &alice);
    let mut session = workflow.start(date(2024, 5, 20));
    let request = RoundRequest {
        golf_course_id: Some(other_north.golf_course_id),
        holes_played: Some(1),
        player_ids: vec![1],
        scores: vec![HoleScoreRequest {
            player_id: 1,
            hole_number: 1,
            input: HoleScoreInput {
                strokes: Some(3),
                putts: None,
                fairway_hit: None,
            },
        }],
        ..RoundRequest::default()
    };
    workflow.submit(&mut session, request).await?;

    let player = storage.get_player(1).await?.expect("fixture player");
    let report = data_service::player_report(&storage, player, &ReportFilter::default()).await?;
    assert_eq!(
        report
            .filter_courses
            .iter()
            .map(|c| (c.golf_course_id, c.name.as_str()))
            .collect::<Vec<_>>(),
        vec![(1, "North"), (other_north.golf_course_id, "North")]
    );
    Ok(())
}
