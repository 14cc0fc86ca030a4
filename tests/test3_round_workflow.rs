mod common;

use chrono::NaiveDate;
use common::{FIXTURE_SQL, caller, setup_test_context};
use golf_tracker::controller::workflow::{
    GuestPlayer, HoleScoreInput, HoleScoreRequest, RoundRequest, RoundWorkflow, SessionStage,
    WorkflowError,
};
use golf_tracker::model::{RoundStatus, RoundType};
use golf_tracker::storage::Storage;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
}

fn strokes(player_id: i64, hole_number: i32, strokes: i32) -> HoleScoreRequest {
    HoleScoreRequest {
        player_id,
        hole_number,
        input: HoleScoreInput {
            strokes: Some(strokes),
            putts: Some(2),
            fairway_hit: None,
        },
    }
}

fn nine_holes(player_ids: Vec<i64>) -> RoundRequest {
    RoundRequest {
        golf_course_id: Some(1),
        holes_played: Some(9),
        round_type: Some(RoundType::Friendly),
        player_ids,
        ..RoundRequest::default()
    }
}

#[tokio::test]
async fn test_save_round_with_scores() -> Result<(), Box<dyn std::error::Error>> {
    let storage = setup_test_context(FIXTURE_SQL).await?;
    let alice = caller("alice");
    let workflow = RoundWorkflow::new(&storage, &alice);

    let mut session = workflow.start(today());
    let mut request = nine_holes(vec![1, 2]);
    request.scores = (1..=9).map(|hole| strokes(1, hole, 5)).collect();
    let round_id = workflow.submit(&mut session, request).await?;
    assert_eq!(session.stage, SessionStage::Saved { round_id });

    let round = storage.get_round(round_id).await?.expect("round was saved");
    assert_eq!(round.status, RoundStatus::Completed);
    assert_eq!(round.date_played, today());
    assert_eq!(round.created_by, "alice");
    assert_eq!(round.player_ids, vec![1, 2]);
    assert_eq!(round.scores.len(), 9);
    assert_eq!(round.total_strokes_for(1), 45);
    assert_eq!(round.total_strokes_for(2), 0);
    Ok(())
}

#[tokio::test]
async fn test_save_round_without_scores_is_in_progress() -> Result<(), Box<dyn std::error::Error>> {
    let storage = setup_test_context(FIXTURE_SQL).await?;
    let alice = caller("alice");
    let workflow = RoundWorkflow::new(&storage, &alice);

    let mut session = workflow.start(today());
    let round_id = workflow.submit(&mut session, nine_holes(vec![1])).await?;
    let round = storage.get_round(round_id).await?.expect("round was saved");
    assert_eq!(round.status, RoundStatus::InProgress);
    assert!(round.scores.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_edit_replaces_scores() -> Result<(), Box<dyn std::error::Error>> {
    let storage = setup_test_context(FIXTURE_SQL).await?;
    let alice = caller("alice");
    let workflow = RoundWorkflow::new(&storage, &alice);

    let mut session = workflow.load(2).await?;
    assert_eq!(session.round_id, Some(2));
    assert_eq!(session.players.len(), 2);

    let request = RoundRequest {
        player_ids: vec![1],
        scores: vec![strokes(1, 1, 4)],
        notes: Some("windy".to_string()),
        ..RoundRequest::default()
    };
    let round_id = workflow.submit(&mut session, request).await?;
    assert_eq!(round_id, 2);

    let round = storage.get_round(2).await?.expect("round still exists");
    assert_eq!(round.player_ids, vec![1]);
    assert_eq!(round.scores.len(), 1);
    assert_eq!(round.scores[0].hole_number, 1);
    assert_eq!(round.notes.as_deref(), Some("windy"));
    assert_eq!(round.status, RoundStatus::Completed);
    // untouched setup survives the edit
    assert_eq!(round.round_type, RoundType::Competitive);
    assert_eq!(round.holes_played, 9);
    Ok(())
}

#[tokio::test]
async fn test_validation_failures() -> Result<(), Box<dyn std::error::Error>> {
    let storage = setup_test_context(FIXTURE_SQL).await?;
    let alice = caller("alice");
    let workflow = RoundWorkflow::new(&storage, &alice);

    let mut session = workflow.start(today());
    let request = RoundRequest {
        golf_course_id: Some(999),
        ..RoundRequest::default()
    };
    match workflow.submit(&mut session, request).await {
        Err(WorkflowError::Validation(messages)) => {
            assert!(messages.contains(&"Please select a golf course".to_string()));
            assert!(messages.contains(&"At least one player is required".to_string()));
        }
        other => panic!("expected validation failure, got {other:?}"),
    }

    let mut session = workflow.start(today());
    let result = workflow.submit(&mut session, nine_holes(vec![3])).await;
    assert_eq!(result, Err(WorkflowError::PlayerNotVisible(3)));

    let mut session = workflow.start(today());
    let mut request = nine_holes(vec![1]);
    request.scores = vec![strokes(1, 1, 0)];
    assert!(matches!(
        workflow.submit(&mut session, request).await,
        Err(WorkflowError::Validation(_))
    ));
    assert_eq!(storage.rounds_for_player(1, None).await?.len(), 3);
    Ok(())
}

#[tokio::test]
async fn test_guest_players_and_wrapping_holes() -> Result<(), Box<dyn std::error::Error>> {
    let storage = setup_test_context(FIXTURE_SQL).await?;
    let alice = caller("alice");
    let workflow = RoundWorkflow::new(&storage, &alice);

    let mut session = workflow.start(today());
    let request = RoundRequest {
        golf_course_id: Some(1),
        starting_hole: Some(8),
        holes_played: Some(4),
        player_ids: vec![1],
        guest_players: vec![GuestPlayer {
            first_name: "Gus".to_string(),
            last_name: "Guest".to_string(),
            handicap: None,
        }],
        scores: vec![strokes(1, 8, 6), strokes(1, 2, 3)],
        ..RoundRequest::default()
    };
    let round_id = workflow.submit(&mut session, request).await?;
    assert_eq!(session.hole_numbers(), vec![8, 9, 1, 2]);

    let round = storage.get_round(round_id).await?.expect("round was saved");
    assert_eq!(round.player_ids.len(), 2);
    assert_eq!(round.total_strokes_for(1), 9);

    let guest_id = round.player_ids.iter().copied().find(|id| *id != 1).expect("guest");
    let guest = storage.get_player(guest_id).await?.expect("guest was stored");
    assert!(guest.is_visible_to(&alice));
    assert!(!guest.is_visible_to(&caller("carol")));
    Ok(())
}

#[tokio::test]
async fn test_edit_with_only_a_guest_keeps_the_round() -> Result<(), Box<dyn std::error::Error>> {
    let storage = setup_test_context(FIXTURE_SQL).await?;
    let alice = caller("alice");
    let workflow = RoundWorkflow::new(&storage, &alice);

    let before = storage.get_round(2).await?.expect("fixture round");
    assert_eq!(before.scores.len(), 18);

    let mut session = workflow.load(2).await?;
    let request = RoundRequest {
        guest_players: vec![GuestPlayer {
            first_name: "Gus".to_string(),
            last_name: "Guest".to_string(),
            handicap: None,
        }],
        ..RoundRequest::default()
    };
    workflow.submit(&mut session, request).await?;

    let after = storage.get_round(2).await?.expect("round still exists");
    assert_eq!(after.player_ids.len(), 3);
    assert!(after.player_ids.starts_with(&[1, 2]));
    assert_eq!(after.scores.len(), 18);
    assert_eq!(after.status, RoundStatus::Completed);
    assert_eq!(after.total_strokes_for(1), 34);
    Ok(())
}

#[tokio::test]
async fn test_blank_notes_clear_on_edit() -> Result<(), Box<dyn std::error::Error>> {
    let storage = setup_test_context(FIXTURE_SQL).await?;
    let alice = caller("alice");
    let workflow = RoundWorkflow::new(&storage, &alice);

    let mut session = workflow.load(2).await?;
    let request = RoundRequest {
        notes: Some("windy".to_string()),
        ..RoundRequest::default()
    };
    workflow.submit(&mut session, request).await?;
    assert_eq!(
        storage.get_round(2).await?.and_then(|r| r.notes).as_deref(),
        Some("windy")
    );

    // leaving notes out keeps them
    let mut session = workflow.load(2).await?;
    workflow.submit(&mut session, RoundRequest::default()).await?;
    assert_eq!(
        storage.get_round(2).await?.and_then(|r| r.notes).as_deref(),
        Some("windy")
    );

    let mut session = workflow.load(2).await?;
    let request = RoundRequest {
        notes: Some("  ".to_string()),
        ..RoundRequest::default()
    };
    workflow.submit(&mut session, request).await?;
    let round = storage.get_round(2).await?.expect("round still exists");
    assert!(round.notes.is_none());
    assert_eq!(round.scores.len(), 18);
    Ok(())
}

#[tokio::test]
async fn test_score_outside_the_round_is_a_validation_error() -> Result<(), Box<dyn std::error::Error>> {
    let storage = setup_test_context(FIXTURE_SQL).await?;
    let alice = caller("alice");
    let workflow = RoundWorkflow::new(&storage, &alice);

    let mut session = workflow.start(today());
    let mut request = nine_holes(vec![1]);
    request.scores = vec![strokes(1, 12, 4)];
    match workflow.submit(&mut session, request).await {
        Err(WorkflowError::Validation(messages)) => {
            assert_eq!(messages, vec!["Cannot score hole 12 in this round".to_string()]);
        }
        other => panic!("expected validation failure, got {other:?}"),
    }

    let mut session = workflow.start(today());
    let mut request = nine_holes(vec![1]);
    request.scores = vec![strokes(2, 1, 4)];
    assert!(matches!(
        workflow.submit(&mut session, request).await,
        Err(WorkflowError::Validation(_))
    ));
    assert_eq!(storage.rounds_for_player(1, None).await?.len(), 3);
    Ok(())
}
