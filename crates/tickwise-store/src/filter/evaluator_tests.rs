//! Tests for filter evaluation.

use super::*;
use crate::filter::{apply_advanced_filter, parse_and_evaluate, FilterParser};
use chrono::Duration;
use tickwise_model::models::Priority;

// ==================== Test Helpers ====================

/// A fixed Wednesday.
fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 12).unwrap()
}

fn ctx() -> FilterContext {
    FilterContext::new().with_today(today())
}

fn make_task(id: &str, content: &str) -> Task {
    Task::new(id, content, Utc::now())
}

fn due_in(days: i64) -> Task {
    let mut task = make_task("due", "Due task");
    task.due_date = Some(today() + Duration::days(days));
    task
}

fn local_noon(date: NaiveDate) -> DateTime<Utc> {
    Local
        .from_local_datetime(&date.and_hms_opt(12, 0, 0).unwrap())
        .earliest()
        .unwrap()
        .with_timezone(&Utc)
}

fn completed_on(date: NaiveDate) -> Task {
    let mut task = make_task("done", "Finished");
    task.completed = true;
    task.completed_at = Some(local_noon(date));
    task
}

fn eval(query: &str, task: &Task) -> bool {
    parse_and_evaluate(query, task, &ctx())
}

// ==================== Boolean Logic ====================

#[test]
fn test_empty_query_matches_everything() {
    let tasks = [
        make_task("1", "a"),
        completed_on(today()),
        due_in(-3),
    ];
    for task in &tasks {
        assert!(eval("", task));
        assert!(eval("   ", task));
    }
}

#[test]
fn test_and_truth_table() {
    for (priority, completed) in [(true, true), (true, false), (false, true), (false, false)] {
        let mut task = make_task("1", "t");
        task.priority = Some(if priority { Priority::P1 } else { Priority::P3 });
        task.completed = completed;

        assert_eq!(
            eval("priority:p1 AND status:active", &task),
            priority && !completed,
            "priority={priority} completed={completed}"
        );
    }
}

#[test]
fn test_or_truth_table() {
    for priority in Priority::ALL {
        let mut task = make_task("1", "t");
        task.priority = Some(priority);
        let expected = matches!(priority, Priority::P1 | Priority::P2);
        assert_eq!(eval("priority:p1 OR priority:p2", &task), expected);
    }
}

#[test]
fn test_not_is_negation() {
    let mut open = make_task("1", "open");
    let done = completed_on(today());
    open.completed = false;

    for task in [&open, &done] {
        assert_eq!(
            eval("NOT status:completed", task),
            !eval("status:completed", task)
        );
    }
}

#[test]
fn test_parenthesization_changes_grouping() {
    let mut p1 = make_task("1", "p1");
    p1.priority = Some(Priority::P1);
    let mut p3 = make_task("3", "p3");
    p3.priority = Some(Priority::P3);

    let query = "(priority:p1 OR priority:p2) AND status:active";
    assert!(eval(query, &p1));
    assert!(!eval(query, &p3));
}

#[test]
fn test_unknown_field_fails_closed() {
    let task = make_task("1", "t");
    assert!(!eval("bogus$$field", &task));
    assert!(!eval("bogus:value", &task));
    assert!(eval("NOT bogus:value", &task));
}

#[test]
fn test_malformed_query_fails_closed() {
    let task = make_task("1", "t");
    for query in ["priority:p1 AND", "OR", ")", "priority:", "NOT"] {
        assert!(!eval(query, &task), "query: {query}");
    }
}

// ==================== Text Fields ====================

#[test]
fn test_priority_exact_match() {
    let mut task = make_task("1", "t");
    task.priority = Some(Priority::P2);
    assert!(eval("priority:p2", &task));
    assert!(eval("priority=p2", &task));
    assert!(!eval("priority:p1", &task));
    assert!(eval("priority!=p1", &task));
    assert!(!eval("priority>p1", &task));

    let unprioritized = make_task("2", "t");
    assert!(!eval("priority:p4", &unprioritized));
}

#[test]
fn test_status_and_state_aliases() {
    let open = make_task("1", "t");
    let done = completed_on(today());

    assert!(eval("status:active", &open));
    assert!(eval("state:active", &open));
    assert!(eval("status:done", &done));
    assert!(eval("status:completed", &done));
    assert!(!eval("status:active", &done));
    assert!(!eval("status:whatever", &open));
}

#[test]
fn test_label_substring_match() {
    let mut task = make_task("1", "t");
    task.labels.insert("urgent-work".to_string());

    assert!(eval("label:urgent", &task));
    assert!(eval("labels:work", &task));
    assert!(!eval("label:home", &task));
    assert!(!eval("label:urgent", &make_task("2", "no labels")));
}

#[test]
fn test_project_substring_match() {
    let mut task = make_task("1", "t");
    task.project_id = Some("proj-house".to_string());

    assert!(eval("project:house", &task));
    assert!(!eval("project:garden", &task));
    assert!(!eval("project:house", &make_task("2", "inbox")));
}

#[test]
fn test_assigned_me_uses_current_user() {
    let mut task = make_task("1", "t");
    task.assignees = vec!["alice".to_string()];

    assert!(!eval("assigned:me", &task));

    let as_alice = ctx().with_current_user("alice");
    let as_bob = ctx().with_current_user("bob");
    assert!(parse_and_evaluate("assigned:me", &task, &as_alice));
    assert!(!parse_and_evaluate("assigned:me", &task, &as_bob));
}

#[test]
fn test_assigned_unassigned_and_substring() {
    let mut task = make_task("1", "t");
    task.assignees = vec!["user-42".to_string()];

    assert!(eval("assignee:42", &task));
    assert!(!eval("assigned:unassigned", &task));
    assert!(eval("assigned:unassigned", &make_task("2", "free")));
}

#[test]
fn test_mycreated_exact_match() {
    let mut task = make_task("1", "t");
    task.created_by = Some("alice".to_string());

    assert!(eval("mycreated:alice", &task));
    assert!(eval("mycreations:alice", &task));
    assert!(!eval("mycreated:ali", &task));
}

#[test]
fn test_shared_flag() {
    let task = make_task("1", "t");
    assert!(eval("shared:true", &task));
    assert!(eval("inshared:yes", &task));
    assert!(!eval("shared:false", &task));
}

#[test]
fn test_search_content_or_description() {
    let mut task = make_task("1", "Call the Plumber");
    task.description = Some("Kitchen sink LEAK".to_string());

    assert!(eval("search:plumber", &task));
    assert!(eval("text:leak", &task));
    assert!(eval("search:\"the plumber\"", &task));
    assert!(!eval("search:electrician", &task));
}

#[test]
fn test_subtask_field() {
    let parent = make_task("1", "parent");
    let mut child = make_task("2", "child");
    child.parent_task_id = Some("1".to_string());

    assert!(eval("subtask:parent", &parent));
    assert!(eval("subtasks:hassubtasks", &parent));
    assert!(!eval("subtask:child", &parent));
    assert!(eval("subtask:child", &child));
    assert!(eval("subtask:subtask", &child));
}

// ==================== Due Date Buckets ====================

#[test]
fn test_due_now_matches_today() {
    let mut task = make_task("1", "t");
    task.due_date = Some(today());
    task.due_time = Some(Local::now().time());

    assert!(eval("due:today", &task));
    assert!(!eval("due:overdue", &task));
    assert!(!eval("due:upcoming", &task));
}

#[test]
fn test_due_24h_ago_is_overdue() {
    let mut task = due_in(-1);
    task.due_time = Some(Local::now().time());

    assert!(eval("due:overdue", &task));
    assert!(!eval("due:today", &task));
}

#[test]
fn test_due_tomorrow_is_upcoming() {
    let task = due_in(1);
    assert!(eval("due:tomorrow", &task));
    assert!(eval("due:upcoming", &task));
    assert!(eval("duedate:upcoming", &task));
}

#[test]
fn test_due_thisweek_respects_week_start() {
    // Wednesday 2025-03-12: Monday-start week is 03-10..03-16
    assert!(eval("due:thisweek", &due_in(-2)));
    assert!(eval("due:thisweek", &due_in(4)));
    assert!(!eval("due:thisweek", &due_in(5)));
    assert!(!eval("due:thisweek", &due_in(-3)));

    // Sunday-start week is 03-09..03-15
    let sunday = ctx().with_week_start(Weekday::Sun);
    assert!(parse_and_evaluate("due:thisweek", &due_in(-3), &sunday));
    assert!(!parse_and_evaluate("due:thisweek", &due_in(4), &sunday));
}

#[test]
fn test_due_none() {
    let undated = make_task("1", "t");
    assert!(eval("due:none", &undated));
    assert!(eval("due:nodate", &undated));
    assert!(!eval("due:none", &due_in(0)));
    assert!(!eval("due:today", &undated));
    assert!(!eval("due:overdue", &undated));
}

#[test]
fn test_due_iso_date_and_comparisons() {
    let task = due_in(0);
    assert!(eval("due:2025-03-12", &task));
    assert!(eval("due<2025-03-13", &task));
    assert!(eval("due<=2025-03-12", &task));
    assert!(!eval("due>2025-03-12", &task));
    assert!(eval("due>=today", &task));
    assert!(eval("due<tomorrow", &task));
    assert!(!eval("due<2025-03-13", &make_task("2", "undated")));
}

#[test]
fn test_due_range_inclusive() {
    let query = "due:2025-03-01 2025-03-12";
    assert!(eval(query, &due_in(0)));
    assert!(eval(query, &due_in(-11)));
    assert!(!eval(query, &due_in(1)));
    assert!(!eval("due:2025-03-01 not-a-date", &due_in(0)));
}

#[test]
fn test_due_not_equal_negates() {
    assert!(eval("due!=today", &due_in(1)));
    assert!(!eval("due!=today", &due_in(0)));
}

// ==================== Created / Completed ====================

#[test]
fn test_created_today() {
    let task = make_task("1", "fresh");
    let now_ctx = FilterContext::new();

    assert!(parse_and_evaluate("created:today", &task, &now_ctx));
    assert!(parse_and_evaluate("createddate:today", &task, &now_ctx));
    assert!(!parse_and_evaluate("created:yesterday", &task, &now_ctx));
}

#[test]
fn test_completed_buckets() {
    assert!(eval("completed:today", &completed_on(today())));
    assert!(eval("completed:yesterday", &completed_on(today() - Duration::days(1))));
    assert!(eval("completed:thisweek", &completed_on(today() - Duration::days(2))));
    assert!(!eval("completed:thisweek", &completed_on(today() - Duration::days(3))));
    assert!(eval("completeddate:thismonth", &completed_on(today() - Duration::days(11))));
    assert!(!eval("completed:thismonth", &completed_on(today() - Duration::days(12))));
    assert!(!eval("completed:today", &make_task("1", "open")));
}

#[test]
fn test_completed_between_dates_and_timestamps() {
    let task = completed_on(today());

    assert!(eval("completed:2025-03-01 2025-03-13", &task));
    assert!(!eval("completed:2025-03-13 2025-03-20", &task));
    // Upper bound is midnight, so the day itself is excluded
    assert!(!eval("completed:2025-03-01 2025-03-12", &task));

    let start = local_noon(today()) - Duration::hours(1);
    let end = local_noon(today()) + Duration::hours(1);
    // Timestamps contain ':' and must be quoted
    let query = format!(
        "completed:\"{}\" \"{}\"",
        start.to_rfc3339(),
        end.to_rfc3339()
    );
    assert!(eval(&query, &task));
}

// ==================== Comments ====================

#[test]
fn test_comments_default_to_zero() {
    let task = make_task("1", "t");
    assert!(eval("comments=0", &task));
    assert!(eval("comments<1", &task));
    assert!(!eval("comments>=5", &task));
}

#[test]
fn test_comments_use_context_counts() {
    let task = make_task("busy", "t");
    let counts = HashMap::from([("busy".to_string(), 7)]);
    let context = ctx().with_comment_counts(counts);

    assert!(parse_and_evaluate("comments>=5", &task, &context));
    assert!(parse_and_evaluate("commentcount>6", &task, &context));
    assert!(parse_and_evaluate("comments!=3", &task, &context));
    assert!(parse_and_evaluate("comments:5 10", &task, &context));
    assert!(!parse_and_evaluate("comments:8 10", &task, &context));
    assert!(!parse_and_evaluate("comments>=many", &task, &context));
}

// ==================== Registry ====================

fn always(_: &Condition, _: &Task, _: &FilterContext) -> bool {
    true
}

#[test]
fn test_registry_custom_field() {
    let mut registry = FieldRegistry::with_builtins();
    registry.register("Anything", always);

    let filter = FilterParser::parse("anything:x AND priority:p1").unwrap();
    let mut task = make_task("1", "t");
    task.priority = Some(Priority::P1);

    let context = ctx();
    let custom = FilterEvaluator::with_registry(&filter, &context, &registry);
    let builtin = FilterEvaluator::new(&filter, &context);
    assert!(custom.matches(&task));
    assert!(!builtin.matches(&task));
}

#[test]
fn test_registry_lookup_is_case_insensitive() {
    let registry = FieldRegistry::builtins();
    assert!(registry.contains("PRIORITY"));
    assert!(registry.contains("commentcount"));
    assert!(!registry.contains("bogus"));
    assert_eq!(registry.suggest("lable").as_deref(), Some("label"));
    assert_eq!(registry.suggest("label"), None);
}

// ==================== Filtering Lists ====================

#[test]
fn test_end_to_end_scenario() {
    let mut first = make_task("1", "first");
    first.priority = Some(Priority::P1);
    first.labels.insert("urgent".to_string());

    let mut second = make_task("2", "second");
    second.priority = Some(Priority::P2);
    second.completed = true;
    second.labels.insert("urgent".to_string());

    let mut third = make_task("3", "third");
    third.priority = Some(Priority::P1);
    third.completed = true;

    let tasks = vec![first, second, third];
    let matched = apply_advanced_filter(
        "priority:p1 AND status:active AND label:urgent",
        &tasks,
        &ctx(),
    );
    let ids: Vec<&str> = matched.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["1"]);
}

#[test]
fn test_filter_is_subset_of_input() {
    let mut tasks = Vec::new();
    for (i, priority) in Priority::ALL.into_iter().enumerate() {
        let mut task = due_in(i as i64 - 2);
        task.id = format!("t{i}");
        task.priority = Some(priority);
        task.completed = i % 2 == 0;
        tasks.push(task);
    }

    for query in [
        "",
        "priority:p1",
        "due:overdue OR status:done",
        "NOT (priority:p2 OR priority:p3)",
        "garbage((",
    ] {
        let matched = apply_advanced_filter(query, &tasks, &ctx());
        assert!(matched.len() <= tasks.len());
        for task in matched {
            assert!(eval(query, task), "query {query} returned non-matching task");
        }
    }
}

#[test]
fn test_unparsable_filter_returns_nothing() {
    let tasks = vec![make_task("1", "a"), make_task("2", "b")];
    assert!(apply_advanced_filter("priority:p1 AND", &tasks, &ctx()).is_empty());
    assert_eq!(apply_advanced_filter("", &tasks, &ctx()).len(), 2);
}
