//! Exercised flows keep loading, selection and mutation sequencing reliable end to end.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use chrono::NaiveDate;
    use planboard_client::{Method, StubTransport};
    use planboard_core::model::{Selection, TaskStatus};
    use planboard_core::Session;
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};

    use crate::app::message::{Effect, Message};
    use crate::app::options::PlannerOptions;
    use crate::app::planner::Planner;
    use crate::app::state::{DeletePhase, NavigationRequest, Phase, ToastKind};
    use crate::telemetry::Event as TelemetryEvent;

    const GOALS: &str = "/users/user123/goal_breakdown_all";
    const REMINDERS: &str = "/users/user123/article_reminders";
    const HABITS: &str = "/users/user123/habit_building";

    fn goal_path(goal_id: &str) -> String {
        format!("/users/user123/goal_breakdown/{}", goal_id)
    }

    fn tasks_path(goal_id: &str) -> String {
        format!("{}/tasks", goal_path(goal_id))
    }

    fn stub_with(goals: Value, reminders: Value, habits: Value) -> Arc<StubTransport> {
        let stub = StubTransport::new();
        stub.respond(Method::Get, GOALS, 200, json!({ "goals": goals }));
        stub.respond(Method::Get, REMINDERS, 200, json!({ "reminders": reminders }));
        stub.respond(Method::Get, HABITS, 200, json!({ "habits": habits }));
        stub
    }

    fn planner(stub: &Arc<StubTransport>) -> Planner {
        Planner::new(
            stub.fetcher(),
            Session::new("user123"),
            PlannerOptions {
                refresh_settle: Duration::ZERO,
                toast_ttl: Duration::from_secs(60),
            },
        )
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn reading_goal() -> Value {
        json!({
            "id": "g1",
            "eventName": "Read more",
            "eventDeadLine": "2025-05-31",
            "tasks": [{"id": "t1", "due_date": "2025-04-23", "task_name": "Read", "priority": "high", "order": 1}]
        })
    }

    /// Resolve one round of effects and return whatever they produce next.
    async fn step(app: &mut Planner, effect: Effect) -> Effect {
        let mut next = Vec::new();
        for future in effect.into_futures() {
            let message = future.await;
            next.push(app.react(message));
        }
        Effect::batch(next)
    }

    fn requested_paths(stub: &StubTransport) -> Vec<String> {
        stub.requests()
            .into_iter()
            .map(|request| format!("{} {}", request.method, request.path))
            .collect()
    }

    #[tokio::test]
    async fn default_goal_with_embedded_tasks_is_indexed_without_fetching() {
        let stub = stub_with(json!([reading_goal()]), json!([]), json!([]));
        let mut app = planner(&stub);

        app.mount(None).await;

        assert_eq!(app.selection(), Selection::Goal("g1".into()));
        assert_eq!(app.phase(), &Phase::Ready);
        assert!(!app.initial_load_in_progress());
        assert!(!app.aggregate_fetch_in_flight());

        let dates: Vec<NaiveDate> = app.date_index().dates().collect();
        assert_eq!(dates, vec![day(2025, 4, 23)]);
        let on_day = app.tasks_on(day(2025, 4, 23));
        assert_eq!(on_day.len(), 1);
        assert_eq!(on_day[0].name, "Read");
        assert_eq!(on_day[0].status, TaskStatus::Pending);

        assert_eq!(stub.count(Method::Get, &tasks_path("g1")), 0);
        assert_eq!(
            app.take_navigations(),
            vec![NavigationRequest::Replace(Some("g1".into()))]
        );
    }

    #[tokio::test]
    async fn url_goal_is_selected_and_its_tasks_fetched() {
        let stub = stub_with(json!([{"id": "g1"}, {"id": "g2"}]), json!([]), json!([]));
        stub.respond(
            Method::Get,
            &tasks_path("g2"),
            200,
            json!({"tasks": [{"id": "t9", "dueDate": "2025-04-24T10:00:00", "title": "Plan"}]}),
        );
        let mut app = planner(&stub);

        app.mount(Some("g2".into())).await;

        assert_eq!(app.selection(), Selection::Goal("g2".into()));
        assert_eq!(app.tasks().len(), 1);
        assert_eq!(app.tasks()[0].name, "Plan");
        assert!(app.take_navigations().is_empty());
    }

    #[tokio::test]
    async fn reminders_come_before_habits_and_selection_stays_exclusive() {
        let stub = stub_with(
            json!([]),
            json!([{"id": "r1", "eventName": "Read paper", "eventDeadLine": "2025-05-03"}]),
            json!([{"id": "h1", "name": "Walk", "frequency": "high",
                    "tasks": [{"id": "w1", "dueDate": "2025-05-01", "title": "Walk 5k"}]}]),
        );
        let mut app = planner(&stub);

        app.mount(None).await;
        assert_eq!(app.selection(), Selection::Reminder("r1".into()));
        assert!(app.active_reminder().is_some());
        assert!(app.active_goal().is_none() && app.active_habit().is_none());
        assert!(app.tasks().is_empty());
        assert!(app.take_navigations().is_empty());

        app.select(Selection::Habit("h1".into())).await;
        assert!(app.active_habit().is_some());
        assert!(app.active_goal().is_none() && app.active_reminder().is_none());
        assert_eq!(app.tasks().len(), 1);
        assert!(app.take_navigations().is_empty());
    }

    #[tokio::test]
    async fn failing_collection_does_not_hide_the_others() {
        let stub = StubTransport::new();
        stub.respond(Method::Get, GOALS, 200, json!({"goals": [reading_goal()]}));
        stub.respond(Method::Get, REMINDERS, 503, json!({"error": "unavailable"}));
        stub.fail(Method::Get, HABITS);
        let mut app = planner(&stub);

        app.mount(None).await;

        assert_eq!(app.items().len(), 1);
        assert_eq!(app.selection(), Selection::Goal("g1".into()));
        assert!(app.toast().is_none());
        if app.telemetry().is_enabled() {
            let failed = app
                .telemetry()
                .events()
                .into_iter()
                .filter(|event| matches!(event, TelemetryEvent::CollectionFailed { .. }))
                .count();
            assert_eq!(failed, 2);
            assert_eq!(app.telemetry().api_calls().len(), 3);
        }
    }

    #[tokio::test]
    async fn failed_status_update_leaves_tasks_untouched() {
        let stub = stub_with(json!([reading_goal()]), json!([]), json!([]));
        let patch = format!("{}/t1", tasks_path("g1"));
        stub.respond(Method::Patch, &patch, 500, json!({"error": "boom"}));
        let mut app = planner(&stub);
        app.mount(None).await;
        let version = app.board.version();

        let applied = app.toggle_status("g1", "t1").await;

        assert!(!applied);
        assert_eq!(app.tasks()[0].status, TaskStatus::Pending);
        assert_eq!(app.board.version(), version);
        let toast = app.toast().unwrap();
        assert_eq!(toast.kind, ToastKind::Error);
        assert!(toast.message.contains("boom"));

        let patches: Vec<_> = stub
            .requests()
            .into_iter()
            .filter(|request| request.method == Method::Patch)
            .collect();
        assert_eq!(patches.len(), 1);
        assert_eq!(patches[0].body, Some(json!({"status": "completed"})));
    }

    #[tokio::test]
    async fn confirmed_status_update_flips_task_in_both_views() {
        let stub = stub_with(json!([reading_goal()]), json!([]), json!([]));
        let patch = format!("{}/t1", tasks_path("g1"));
        stub.respond(Method::Patch, &patch, 200, json!({"message": "updated"}));
        let mut app = planner(&stub);
        app.mount(None).await;

        assert!(app.toggle_status("g1", "t1").await);
        assert_eq!(app.tasks()[0].status, TaskStatus::Completed);
        assert_eq!(
            app.tasks_on(day(2025, 4, 23))[0].status,
            TaskStatus::Completed
        );
        assert_eq!(app.toast().map(|toast| toast.kind), Some(ToastKind::Info));

        assert!(app.toggle_status("g1", "t1").await);
        assert_eq!(app.tasks()[0].status, TaskStatus::Pending);
        let last = stub.requests().pop().unwrap();
        assert_eq!(last.body, Some(json!({"status": "pending"})));
    }

    #[tokio::test]
    async fn second_toggle_of_same_task_waits_for_the_first() {
        let stub = stub_with(json!([reading_goal()]), json!([]), json!([]));
        let mut app = planner(&stub);
        app.mount(None).await;

        let first = app.react(Message::ToggleTaskStatus {
            goal_id: "g1".into(),
            task_id: "t1".into(),
        });
        let second = app.react(Message::ToggleTaskStatus {
            goal_id: "g1".into(),
            task_id: "t1".into(),
        });
        assert!(!first.is_none());
        assert!(second.is_none());
    }

    #[tokio::test]
    async fn deleting_the_only_goal_clears_everything_and_unscopes_the_route() {
        let stub = stub_with(json!([reading_goal()]), json!([]), json!([]));
        stub.respond(Method::Get, GOALS, 200, json!({"goals": []}));
        stub.respond(Method::Delete, &goal_path("g1"), 200, json!({}));
        let mut app = planner(&stub);
        app.mount(None).await;
        app.take_navigations();

        assert!(app.delete_goal("g1").await);

        assert!(app.active().is_none());
        assert!(app.tasks().is_empty());
        assert!(app.date_index().is_empty());
        assert_eq!(app.delete_phase(), &DeletePhase::Idle);
        assert!(app.overlay().is_none());
        assert_eq!(app.take_navigations(), vec![NavigationRequest::Replace(None)]);
        assert_eq!(
            requested_paths(&stub)[3..],
            [
                format!("DELETE {}", goal_path("g1")),
                format!("GET {}", GOALS)
            ]
        );
    }

    #[tokio::test]
    async fn deletion_moves_to_the_first_remaining_goal() {
        let stub = stub_with(json!([reading_goal(), {"id": "g2", "tasks": []}]), json!([]), json!([]));
        stub.respond(Method::Get, GOALS, 200, json!({"goals": [{"id": "g2", "tasks": []}]}));
        stub.respond(Method::Delete, &goal_path("g1"), 200, json!({}));
        let mut app = planner(&stub);
        app.mount(None).await;
        app.take_navigations();

        assert!(app.delete_goal("g1").await);

        assert_eq!(app.selection(), Selection::Goal("g2".into()));
        assert_eq!(
            app.take_navigations(),
            vec![NavigationRequest::Replace(Some("g2".into()))]
        );
    }

    #[tokio::test]
    async fn failed_deletion_changes_nothing() {
        let stub = stub_with(json!([reading_goal()]), json!([]), json!([]));
        stub.respond(Method::Delete, &goal_path("g1"), 500, json!({"error": "locked"}));
        let mut app = planner(&stub);
        app.mount(None).await;

        assert!(!app.delete_goal("g1").await);

        assert_eq!(app.selection(), Selection::Goal("g1".into()));
        assert_eq!(app.tasks().len(), 1);
        assert_eq!(app.delete_phase(), &DeletePhase::Idle);
        assert_eq!(app.toast().map(|toast| toast.kind), Some(ToastKind::Error));
        assert_eq!(stub.count(Method::Get, GOALS), 1);
    }

    #[tokio::test]
    async fn overlay_blocks_interaction_until_deletion_finishes() {
        let stub = stub_with(json!([reading_goal(), {"id": "g2", "tasks": []}]), json!([]), json!([]));
        stub.respond(Method::Delete, &goal_path("g1"), 200, json!({}));
        let mut app = planner(&stub);
        app.mount(None).await;

        let requested = app.react(Message::RequestDeleteGoal("g1".into()));
        assert!(requested.is_none());
        assert!(app.overlay().is_none());
        assert_eq!(stub.count(Method::Delete, &goal_path("g1")), 0);

        let deleting = app.react(Message::ConfirmDelete);
        assert!(app.overlay().is_some());
        assert!(app.react(Message::SelectItem(Selection::Goal("g2".into()))).is_none());
        assert_eq!(app.selection(), Selection::Goal("g1".into()));

        app.drive(deleting).await;
        assert!(app.overlay().is_none());
    }

    #[tokio::test]
    async fn cancelled_deletion_sends_nothing() {
        let stub = stub_with(json!([reading_goal()]), json!([]), json!([]));
        let mut app = planner(&stub);
        app.mount(None).await;

        app.dispatch(Message::RequestDeleteGoal("g1".into())).await;
        app.dispatch(Message::CancelDelete).await;

        assert_eq!(app.delete_phase(), &DeletePhase::Idle);
        assert_eq!(stub.count(Method::Delete, &goal_path("g1")), 0);
    }

    #[tokio::test]
    async fn late_response_for_earlier_selection_is_discarded() {
        let stub = stub_with(
            json!([{"id": "g1"}, {"id": "g2"}]),
            json!([{"id": "r1", "eventName": "Read"}]),
            json!([]),
        );
        stub.respond(
            Method::Get,
            &tasks_path("g1"),
            200,
            json!({"tasks": [{"id": "a", "due_date": "2025-04-01", "task_name": "from g1"}]}),
        );
        stub.respond(
            Method::Get,
            &tasks_path("g2"),
            200,
            json!({"tasks": [{"id": "b", "due_date": "2025-04-02", "task_name": "from g2"}]}),
        );
        let mut app = planner(&stub);
        app.mount(None).await;
        app.select(Selection::Reminder("r1".into())).await;

        let for_g1 = app.react(Message::SelectItem(Selection::Goal("g1".into())));
        let for_g2 = app.react(Message::SelectItem(Selection::Goal("g2".into())));
        app.drive(for_g2).await;
        app.drive(for_g1).await;

        assert_eq!(app.selection(), Selection::Goal("g2".into()));
        let names: Vec<&str> = app.tasks().iter().map(|task| task.name.as_str()).collect();
        assert_eq!(names, vec!["from g2"]);
        if app.telemetry().is_enabled() {
            assert!(app
                .telemetry()
                .events()
                .iter()
                .any(|event| matches!(event, TelemetryEvent::StaleResponseDiscarded { .. })));
        }
    }

    #[tokio::test]
    async fn route_echo_of_own_rewrite_triggers_no_fetch() {
        let stub = stub_with(json!([reading_goal(), {"id": "g2", "tasks": []}]), json!([]), json!([]));
        let mut app = planner(&stub);
        app.mount(None).await;

        app.select(Selection::Goal("g2".into())).await;
        let navigations = app.take_navigations();
        assert_eq!(
            navigations.last(),
            Some(&NavigationRequest::Replace(Some("g2".into())))
        );

        let echo = app.react(Message::RouteChanged(Some("g2".into())));
        assert!(echo.is_none());
        assert_eq!(stub.count(Method::Get, &goal_path("g2")), 0);
    }

    #[tokio::test]
    async fn external_navigation_loads_detail_then_tasks_then_goal_list() {
        let stub = stub_with(json!([reading_goal()]), json!([]), json!([]));
        stub.respond(
            Method::Get,
            &goal_path("g2"),
            200,
            json!({"eventName": "Run a marathon", "eventDeadLine": "2025-10-01"}),
        );
        stub.respond(
            Method::Get,
            &tasks_path("g2"),
            200,
            json!({"tasks": [{"id": "r", "due_date": "2025-09-01", "task_name": "Long run"}]}),
        );
        let mut app = planner(&stub);
        app.mount(None).await;
        let before = stub.requests().len();

        app.navigate(Some("g2".into())).await;

        assert_eq!(
            requested_paths(&stub)[before..],
            [
                format!("GET {}", goal_path("g2")),
                format!("GET {}", tasks_path("g2")),
                format!("GET {}", GOALS)
            ]
        );
        assert_eq!(app.selection(), Selection::Goal("g2".into()));
        assert_eq!(app.active_goal().unwrap().event_name, "Run a marathon");
        assert_eq!(app.tasks()[0].name, "Long run");
        assert_eq!(app.phase(), &Phase::Ready);
        assert!(!app.aggregate_fetch_in_flight());
    }

    #[tokio::test]
    async fn navigation_during_initial_load_is_left_to_the_load() {
        let stub = stub_with(json!([reading_goal()]), json!([]), json!([]));
        let mut app = planner(&stub);

        let loading = app.react(Message::Mount(None));
        assert!(app.initial_load_in_progress());
        assert!(app.react(Message::RouteChanged(Some("g7".into()))).is_none());
        assert!(app.react(Message::Reload).is_none());
        app.drive(loading).await;

        assert_eq!(stub.count(Method::Get, &goal_path("g7")), 0);
        assert_eq!(stub.count(Method::Get, GOALS), 1);
        assert!(!app.initial_load_in_progress());
    }

    #[tokio::test]
    async fn failed_goal_detail_reports_a_page_error() {
        let stub = stub_with(json!([reading_goal()]), json!([]), json!([]));
        let mut app = planner(&stub);
        app.mount(None).await;

        app.navigate(Some("missing".into())).await;

        assert!(app.page_error().is_some());
        assert_eq!(app.phase(), &Phase::Ready);
        assert_eq!(app.selection(), Selection::Goal("g1".into()));
    }

    #[tokio::test]
    async fn failed_tasks_fetch_clears_tasks_quietly() {
        let stub = stub_with(json!([reading_goal(), {"id": "g2"}]), json!([]), json!([]));
        stub.respond(Method::Get, &tasks_path("g2"), 500, json!({"error": "nope"}));
        let mut app = planner(&stub);
        app.mount(None).await;
        assert_eq!(app.tasks().len(), 1);

        app.select(Selection::Goal("g2".into())).await;

        assert_eq!(app.selection(), Selection::Goal("g2".into()));
        assert!(app.tasks().is_empty());
        assert!(app.toast().is_none());
        assert_eq!(stub.count(Method::Get, &tasks_path("g2")), 1);
    }

    #[tokio::test]
    async fn batched_echoes_of_own_rewrites_trigger_no_fetch() {
        let stub = stub_with(
            json!([reading_goal(), {"id": "g2", "tasks": []}, {"id": "g3", "tasks": []}]),
            json!([]),
            json!([]),
        );
        let mut app = planner(&stub);
        app.mount(None).await;
        app.take_navigations();

        assert!(app.react(Message::SelectItem(Selection::Goal("g2".into()))).is_none());
        assert!(app.react(Message::SelectItem(Selection::Goal("g3".into()))).is_none());
        let navigations = app.take_navigations();
        assert_eq!(
            navigations,
            vec![
                NavigationRequest::Replace(Some("g2".into())),
                NavigationRequest::Replace(Some("g3".into())),
            ]
        );

        for navigation in navigations {
            let echo = app.react(Message::RouteChanged(navigation.target().map(str::to_string)));
            assert!(echo.is_none());
        }

        assert_eq!(app.selection(), Selection::Goal("g3".into()));
        assert_eq!(app.route(), Some("g3"));
        assert_eq!(stub.count(Method::Get, &goal_path("g2")), 0);
        assert_eq!(stub.count(Method::Get, &goal_path("g3")), 0);
    }

    #[tokio::test]
    async fn echoes_arriving_out_of_order_are_still_recognised() {
        let stub = stub_with(
            json!([reading_goal(), {"id": "g2", "tasks": []}, {"id": "g3", "tasks": []}]),
            json!([]),
            json!([]),
        );
        let mut app = planner(&stub);
        app.mount(None).await;

        app.select(Selection::Goal("g2".into())).await;
        app.select(Selection::Goal("g3".into())).await;

        assert!(app.react(Message::RouteChanged(Some("g3".into()))).is_none());
        assert!(app.react(Message::RouteChanged(Some("g2".into()))).is_none());
        assert_eq!(stub.count(Method::Get, &goal_path("g2")), 0);

        // Once its echo is consumed, the same route from outside is real navigation.
        stub.respond(Method::Get, &goal_path("g2"), 200, json!({"eventName": "Swim"}));
        app.navigate(Some("g2".into())).await;
        assert_eq!(stub.count(Method::Get, &goal_path("g2")), 1);
        assert_eq!(app.selection(), Selection::Goal("g2".into()));
    }

    #[tokio::test]
    async fn reload_during_navigation_goal_list_still_fetches_every_collection() {
        let stub = stub_with(json!([reading_goal(), {"id": "g2"}]), json!([]), json!([]));
        stub.respond(
            Method::Get,
            REMINDERS,
            200,
            json!({"reminders": [{"id": "r1", "eventName": "Pay rent"}]}),
        );
        stub.respond(Method::Get, &goal_path("g2"), 200, json!({"eventName": "Swim"}));
        stub.respond(Method::Get, &tasks_path("g2"), 200, json!({"tasks": []}));
        let mut app = planner(&stub);
        app.mount(None).await;
        assert!(app.collections().reminders.is_empty());

        let detail = app.react(Message::RouteChanged(Some("g2".into())));
        let tasks = step(&mut app, detail).await;
        let goal_list = step(&mut app, tasks).await;
        assert!(!goal_list.is_none());
        assert!(app.goal_list_fetch_in_flight());
        assert!(!app.aggregate_fetch_in_flight());

        let reload = app.react(Message::Reload);
        assert!(!reload.is_none());
        app.drive(reload).await;
        app.drive(goal_list).await;

        assert_eq!(stub.count(Method::Get, REMINDERS), 2);
        assert_eq!(app.collections().reminders.len(), 1);
        assert!(!app.goal_list_fetch_in_flight());
        assert!(!app.aggregate_fetch_in_flight());
        assert_eq!(app.phase(), &Phase::Ready);
    }

    #[tokio::test]
    async fn reload_refreshes_the_kept_selection() {
        let stub = stub_with(json!([reading_goal()]), json!([]), json!([]));
        let mut renamed = reading_goal();
        renamed["eventName"] = json!("Read even more");
        stub.respond(Method::Get, GOALS, 200, json!({ "goals": [renamed] }));
        let mut app = planner(&stub);
        app.mount(None).await;
        assert_eq!(app.active_goal().unwrap().event_name, "Read more");

        app.reload().await;

        assert_eq!(app.selection(), Selection::Goal("g1".into()));
        assert_eq!(app.active_goal().unwrap().event_name, "Read even more");
        assert_eq!(
            app.active().map(|item| item.label()),
            Some("Read even more (deadline: 2025-05-31)".to_string())
        );
    }
}
