mod common;

use common::*;
use gameplan_core::gateway::EventOperation;
use gameplan_core::store::Store;
use gameplan_core::sync::{Reconciler, RunContext, Strategy};
use gameplan_core::{Calendar, GameId, GameplanError, Role};

const STRATEGIES: [Strategy; 2] = [Strategy::Sequential, Strategy::Batched];

async fn reconcile(store: &Store, gateway: &FakeGateway, strategy: Strategy) -> RunContext {
    let settings = settings();
    let mut ctx = RunContext::new();
    Reconciler::new(store, gateway, &settings)
        .check_games(&mut ctx, strategy)
        .await
        .unwrap();
    ctx
}

fn g1() -> GameId {
    GameId::from("g1")
}

#[tokio::test]
async fn test_new_game_creates_club_and_team_events() {
    for strategy in STRATEGIES {
        let (_dir, store) = registered_store();
        store
            .upsert_game(&raw_game("g1", Some("2024-09-01T20:00:00+02:00"), "Hall1"))
            .unwrap();
        store.set_team_calendar(&g1(), "A").unwrap();
        let gateway = FakeGateway::new();

        let ctx = reconcile(&store, &gateway, strategy).await;

        assert_eq!(ctx.counters.created_club, 1, "{strategy}");
        assert_eq!(ctx.counters.created_team, 1, "{strategy}");
        assert_eq!(ctx.counters.updated(), 0);
        assert_eq!(ctx.counters.unchanged_total(), 0);
        assert_eq!(ctx.counters.no_date, 0);
        assert_eq!(ctx.counters.failed, 0);

        let game = store.game(&g1()).unwrap().unwrap();
        let club_id = game.club_calendar_event_id.clone().unwrap();
        let team_id = game.team_calendar_event_id.clone().unwrap();

        let club_event = gateway.event(CLUB_CAL, &club_id).unwrap();
        assert_eq!(club_event.location.as_deref(), Some("Hall1"));
        assert_eq!(club_event.summary, "A Home g1 vs. Lions");
        assert!(gateway.event(LEAGUE_CAL, &team_id).is_some());
    }
}

#[tokio::test]
async fn test_batched_strategy_groups_by_role_and_kind() {
    let (_dir, store) = registered_store();
    for id in ["g1", "g2"] {
        store
            .upsert_game(&raw_game(id, Some("2024-09-01T20:00:00+02:00"), "Hall1"))
            .unwrap();
    }
    let gateway = FakeGateway::new();

    reconcile(&store, &gateway, Strategy::Batched).await;

    // club-create then team-create
    assert_eq!(gateway.batch_sizes(), vec![2, 2]);
    let calendars: Vec<String> = gateway
        .operations()
        .iter()
        .map(|op| op.calendar_id().to_string())
        .collect();
    assert_eq!(calendars, vec![CLUB_CAL, CLUB_CAL, LEAGUE_CAL, LEAGUE_CAL]);
}

#[tokio::test]
async fn test_team_calendar_is_resolved_and_persisted() {
    let (_dir, store) = registered_store();
    store
        .upsert_game(&raw_game("g1", Some("2024-09-01T20:00:00+02:00"), "Hall1"))
        .unwrap();
    let gateway = FakeGateway::new();

    reconcile(&store, &gateway, Strategy::Sequential).await;

    let game = store.game(&g1()).unwrap().unwrap();
    assert_eq!(game.team_calendar_id.as_deref(), Some("A"));
}

#[tokio::test]
async fn test_matching_event_is_left_alone() {
    for strategy in STRATEGIES {
        let (_dir, store) = registered_store();
        store
            .upsert_game(&raw_game("g1", Some("2024-09-01T20:00:00+02:00"), "Hall1"))
            .unwrap();
        store.set_event_id(&g1(), Role::Club, Some("ev1")).unwrap();
        let gateway = FakeGateway::new();
        gateway.seed_event(
            CLUB_CAL,
            remote_event("ev1", "2024-09-01T20:00:00+02:00", "Hall1"),
        );

        let ctx = reconcile(&store, &gateway, strategy).await;

        assert_eq!(ctx.counters.unchanged_club, 1);
        assert_eq!(ctx.counters.created_club, 0);
        assert_eq!(ctx.counters.created_team, 1);
        assert!(
            gateway
                .operations()
                .iter()
                .all(|op| op.calendar_id() != CLUB_CAL)
        );

        let game = store.game(&g1()).unwrap().unwrap();
        assert_eq!(game.club_calendar_event_id.as_deref(), Some("ev1"));
    }
}

#[tokio::test]
async fn test_offset_representation_does_not_trigger_update() {
    let (_dir, store) = registered_store();
    store
        .upsert_game(&raw_game("g1", Some("2024-06-28T09:00:00+02:00"), "Hall1"))
        .unwrap();
    store.set_event_id(&g1(), Role::Club, Some("ev1")).unwrap();
    let gateway = FakeGateway::new();
    gateway.seed_event(
        CLUB_CAL,
        remote_event("ev1", "2024-06-28T07:00:00+00:00", "Hall1"),
    );

    let ctx = reconcile(&store, &gateway, Strategy::Sequential).await;

    assert_eq!(ctx.counters.unchanged_club, 1);
    assert_eq!(ctx.counters.updated_club, 0);
}

#[tokio::test]
async fn test_second_run_is_idempotent() {
    for strategy in STRATEGIES {
        let (_dir, store) = registered_store();
        for id in ["g1", "g2", "g3"] {
            store
                .upsert_game(&raw_game(id, Some("2024-09-01T20:00:00+02:00"), "Hall1"))
                .unwrap();
        }
        let gateway = FakeGateway::new();

        let first = reconcile(&store, &gateway, strategy).await;
        assert_eq!(first.counters.created(), 6);

        gateway.clear_operations();
        let second = reconcile(&store, &gateway, strategy).await;

        assert_eq!(second.counters.created(), 0);
        assert_eq!(second.counters.updated(), 0);
        assert_eq!(second.counters.unchanged_total(), 6);
        assert!(gateway.operations().is_empty());
        assert!(gateway.batch_sizes().is_empty());
    }
}

#[tokio::test]
async fn test_gym_change_updates_both_roles() {
    for strategy in STRATEGIES {
        let (_dir, store) = registered_store();
        store
            .upsert_game(&raw_game("g1", Some("2024-09-01T20:00:00+02:00"), "Hall1"))
            .unwrap();
        let gateway = FakeGateway::new();
        reconcile(&store, &gateway, strategy).await;

        store
            .upsert_game(&raw_game("g1", Some("2024-09-01T20:00:00+02:00"), "Hall2"))
            .unwrap();
        let ctx = reconcile(&store, &gateway, strategy).await;

        assert_eq!(ctx.counters.updated_club, 1);
        assert_eq!(ctx.counters.updated_team, 1);
        assert_eq!(ctx.counters.created(), 0);

        let game = store.game(&g1()).unwrap().unwrap();
        let club_id = game.club_calendar_event_id.unwrap();
        let event = gateway.event(CLUB_CAL, &club_id).unwrap();
        assert_eq!(event.location.as_deref(), Some("Hall2"));
    }
}

#[tokio::test]
async fn test_team_name_or_result_change_is_not_an_update() {
    let (_dir, store) = registered_store();
    store
        .upsert_game(&raw_game("g1", Some("2024-09-01T20:00:00+02:00"), "Hall1"))
        .unwrap();
    let gateway = FakeGateway::new();
    reconcile(&store, &gateway, Strategy::Sequential).await;

    let mut renamed = raw_game("g1", Some("2024-09-01T20:00:00+02:00"), "Hall1");
    renamed.home_team = "BC Emmen II".into();
    renamed.result = "70:65".into();
    store.upsert_game(&renamed).unwrap();

    let ctx = reconcile(&store, &gateway, Strategy::Sequential).await;
    assert_eq!(ctx.counters.updated(), 0);
    assert_eq!(ctx.counters.unchanged_total(), 2);
}

#[tokio::test]
async fn test_rescheduled_game_moves_its_events() {
    let (_dir, store) = registered_store();
    store
        .upsert_game(&raw_game("g1", Some("2024-09-01T20:00:00+02:00"), "Hall1"))
        .unwrap();
    let gateway = FakeGateway::new();
    reconcile(&store, &gateway, Strategy::Batched).await;

    store
        .upsert_game(&raw_game("g1", Some("2024-09-08T18:00:00+02:00"), "Hall1"))
        .unwrap();
    let ctx = reconcile(&store, &gateway, Strategy::Batched).await;
    assert_eq!(ctx.counters.updated(), 2);

    let game = store.game(&g1()).unwrap().unwrap();
    let event = gateway
        .event(LEAGUE_CAL, game.team_calendar_event_id.as_deref().unwrap())
        .unwrap();
    assert_eq!(
        event.start.instant(),
        Some(date("2024-09-08T18:00:00+02:00"))
    );
}

#[tokio::test]
async fn test_undated_game_is_retracted() {
    for strategy in STRATEGIES {
        let (_dir, store) = registered_store();
        store
            .upsert_game(&raw_game("g1", Some("2024-09-01T20:00:00+02:00"), "Hall1"))
            .unwrap();
        let gateway = FakeGateway::new();
        reconcile(&store, &gateway, strategy).await;
        gateway.clear_operations();

        store.upsert_game(&raw_game("g1", None, "Hall1")).unwrap();
        let ctx = reconcile(&store, &gateway, strategy).await;

        assert_eq!(ctx.counters.no_date, 1);
        assert_eq!(ctx.counters.deleted, 2);
        assert_eq!(ctx.counters.created(), 0);
        assert_eq!(ctx.counters.updated(), 0);

        let deletes = gateway
            .operations()
            .iter()
            .filter(|op| matches!(op, EventOperation::Delete { .. }))
            .count();
        assert_eq!(deletes, 2);
        assert!(gateway.events(CLUB_CAL).is_empty());
        assert!(gateway.events(LEAGUE_CAL).is_empty());
        assert!(store.game(&g1()).unwrap().is_none());
    }
}

#[tokio::test]
async fn test_failed_retraction_keeps_the_row_for_retry() {
    for strategy in STRATEGIES {
        let (_dir, store) = registered_store();
        store
            .upsert_game(&raw_game("g1", Some("2024-09-01T20:00:00+02:00"), "Hall1"))
            .unwrap();
        let gateway = FakeGateway {
            fail_deletes_in: vec![LEAGUE_CAL.into()],
            ..FakeGateway::default()
        };
        reconcile(&store, &gateway, strategy).await;
        let team_id = store
            .game(&g1())
            .unwrap()
            .unwrap()
            .team_calendar_event_id
            .unwrap();

        store.upsert_game(&raw_game("g1", None, "Hall1")).unwrap();
        let ctx = reconcile(&store, &gateway, strategy).await;

        assert_eq!(ctx.counters.deleted, 1, "{strategy}");
        assert_eq!(ctx.counters.failed, 1, "{strategy}");
        assert!(gateway.events(CLUB_CAL).is_empty());

        let game = store.game(&g1()).unwrap().unwrap();
        assert_eq!(game.club_calendar_event_id, None);
        assert_eq!(game.team_calendar_event_id.as_deref(), Some(team_id.as_str()));
    }
}

#[tokio::test]
async fn test_recreated_calendars_get_fresh_events() {
    for strategy in STRATEGIES {
        let (_dir, store) = registered_store();
        store
            .upsert_game(&raw_game("g1", Some("2024-09-01T20:00:00+02:00"), "Hall1"))
            .unwrap();
        let gateway = FakeGateway::new();
        reconcile(&store, &gateway, strategy).await;

        store.delete_calendar_by_remote_id(CLUB_CAL).unwrap();
        store.delete_calendar_by_remote_id(LEAGUE_CAL).unwrap();
        store
            .insert_calendar_if_absent(&Calendar::club("new-club"))
            .unwrap();
        store
            .insert_calendar_if_absent(&Calendar::for_league("A", "new-a"))
            .unwrap();

        let ctx = reconcile(&store, &gateway, strategy).await;

        assert_eq!(ctx.counters.missing, 0, "{strategy}");
        assert_eq!(ctx.counters.created_club, 1, "{strategy}");
        assert_eq!(ctx.counters.created_team, 1, "{strategy}");
        assert_eq!(gateway.events("new-club").len(), 1);
        assert_eq!(gateway.events("new-a").len(), 1);

        let ctx = reconcile(&store, &gateway, strategy).await;
        assert_eq!(ctx.counters.created(), 0);
        assert_eq!(ctx.counters.unchanged_total(), 2);
    }
}

#[tokio::test]
async fn test_undated_game_without_events_queues_nothing() {
    let (_dir, store) = registered_store();
    store.upsert_game(&raw_game("g1", None, "Hall1")).unwrap();
    let gateway = FakeGateway::new();

    let ctx = reconcile(&store, &gateway, Strategy::Batched).await;

    assert_eq!(ctx.counters.no_date, 1);
    assert!(gateway.operations().is_empty());
}

#[tokio::test]
async fn test_partial_batch_failure_keeps_successful_writes() {
    let (_dir, store) = registered_store();
    for id in ["g1", "g2", "g3"] {
        store
            .upsert_game(&raw_game(id, Some("2024-09-01T20:00:00+02:00"), "Hall1"))
            .unwrap();
    }
    let gateway = FakeGateway {
        fail_summaries: vec!["Home g2".into()],
        ..FakeGateway::default()
    };

    let ctx = reconcile(&store, &gateway, Strategy::Batched).await;

    assert_eq!(gateway.batch_sizes(), vec![3, 3]);
    assert_eq!(ctx.counters.created_club, 2);
    assert_eq!(ctx.counters.created_team, 2);
    // Club and team create of g2.
    assert_eq!(ctx.counters.failed, 2);
    assert!(ctx.failures.iter().all(|f| f.game_id == GameId::from("g2")));

    for id in ["g1", "g3"] {
        let game = store.game(&GameId::from(id)).unwrap().unwrap();
        assert!(game.club_calendar_event_id.is_some());
        assert!(game.team_calendar_event_id.is_some());
    }
    let failed = store.game(&GameId::from("g2")).unwrap().unwrap();
    assert_eq!(failed.club_calendar_event_id, None);
    assert_eq!(failed.team_calendar_event_id, None);
}

#[tokio::test]
async fn test_failed_batch_marks_every_operation_failed() {
    let (_dir, store) = registered_store();
    for id in ["g1", "g2"] {
        store
            .upsert_game(&raw_game(id, Some("2024-09-01T20:00:00+02:00"), "Hall1"))
            .unwrap();
    }
    let gateway = FakeGateway {
        fail_batches: true,
        ..FakeGateway::default()
    };

    let ctx = reconcile(&store, &gateway, Strategy::Batched).await;

    assert_eq!(ctx.counters.created(), 0);
    assert_eq!(ctx.counters.failed, 4);
    assert!(
        store
            .games()
            .unwrap()
            .iter()
            .all(|g| !g.has_any_event())
    );
}

#[tokio::test]
async fn test_failed_sequential_create_does_not_stop_the_run() {
    let (_dir, store) = registered_store();
    for id in ["g1", "g2"] {
        store
            .upsert_game(&raw_game(id, Some("2024-09-01T20:00:00+02:00"), "Hall1"))
            .unwrap();
    }
    let gateway = FakeGateway {
        fail_summaries: vec!["Home g1".into()],
        ..FakeGateway::default()
    };

    let ctx = reconcile(&store, &gateway, Strategy::Sequential).await;

    assert_eq!(ctx.counters.created(), 2);
    assert_eq!(ctx.counters.failed, 2);
}

#[tokio::test]
async fn test_missing_remote_event_is_not_recreated() {
    let (_dir, store) = registered_store();
    store
        .upsert_game(&raw_game("g1", Some("2024-09-01T20:00:00+02:00"), "Hall1"))
        .unwrap();
    store.set_event_id(&g1(), Role::Club, Some("gone")).unwrap();
    let gateway = FakeGateway::new();

    let ctx = reconcile(&store, &gateway, Strategy::Sequential).await;

    assert_eq!(ctx.counters.missing, 1);
    assert_eq!(ctx.counters.created_club, 0);
    assert_eq!(ctx.counters.created_team, 1);
}

#[tokio::test]
async fn test_game_without_league_calendar_is_skipped() {
    let (_dir, store) = registered_store();
    let mut game = raw_game("g1", Some("2024-09-01T20:00:00+02:00"), "Hall1");
    game.league = "B".into();
    store.upsert_game(&game).unwrap();
    let gateway = FakeGateway::new();

    let ctx = reconcile(&store, &gateway, Strategy::Batched).await;

    assert_eq!(ctx.counters.skipped_no_calendar, 1);
    assert!(gateway.operations().is_empty());
}

#[tokio::test]
async fn test_missing_club_calendar_aborts() {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::open(dir.path().join("games.db")).unwrap();
    let gateway = FakeGateway::new();
    let settings = settings();
    let mut ctx = RunContext::new();

    let result = Reconciler::new(&store, &gateway, &settings)
        .check_games(&mut ctx, Strategy::Batched)
        .await;

    assert!(matches!(result, Err(GameplanError::Configuration(_))));
}
