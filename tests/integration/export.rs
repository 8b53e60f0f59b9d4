//! End-to-end export runs against the mock tracker.

use serde_json::{Value, json};

use crate::{
	assert_traced,
	common::{TestContext, issue, with_epic_link, with_parent},
};

fn checkout_board() -> Value {
	json!({
		"issues": [
			issue("P-1", "Initiative", "Payments"),
			with_parent(issue("P-2", "Epic", "Checkout"), "P-1", "Initiative"),
			with_parent(issue("P-3", "Story", "Pay by card"), "P-2", "Epic"),
			issue("P-4", "Task", "Update docs"),
		]
	})
}

#[test]
fn test_board_export_builds_hierarchy() {
	let ctx = TestContext::new();
	ctx.setup_mock_state(&checkout_board());

	let (status, stdout, stderr) = ctx.run(&[]);
	assert!(status.success(), "stdout: {stdout}\nstderr: {stderr}");

	insta::assert_snapshot!(ctx.tree(), @r"
	0-UNASSIGNED
	0-UNASSIGNED/TASK-P-4-Update docs
	0-UNASSIGNED/TASK-P-4-Update docs/metadata.json
	0-UNASSIGNED/TASK-P-4-Update docs/ticket.md
	INI-P-1-Payments
	INI-P-1-Payments/EPIC-P-2-Checkout
	INI-P-1-Payments/EPIC-P-2-Checkout/STORY-P-3-Pay by card
	INI-P-1-Payments/EPIC-P-2-Checkout/STORY-P-3-Pay by card/metadata.json
	INI-P-1-Payments/EPIC-P-2-Checkout/STORY-P-3-Pay by card/ticket.md
	INI-P-1-Payments/EPIC-P-2-Checkout/metadata.json
	INI-P-1-Payments/EPIC-P-2-Checkout/ticket.md
	INI-P-1-Payments/metadata.json
	INI-P-1-Payments/ticket.md
	");

	assert!(stdout.contains("Synced 4 issues into"), "stdout: {stdout}");
	assert!(stdout.contains("- Initiatives: 1\n- Epics: 1\n- Stories/Tasks: 2"), "stdout: {stdout}");
}

#[test]
fn test_metadata_document() {
	let ctx = TestContext::new();
	ctx.setup_mock_state(&checkout_board());

	let (status, _, stderr) = ctx.run(&[]);
	assert!(status.success(), "stderr: {stderr}");

	let raw = ctx.read("INI-P-1-Payments/EPIC-P-2-Checkout/STORY-P-3-Pay by card/metadata.json");
	assert!(raw.ends_with("}\n"));
	let metadata: Value = serde_json::from_str(&raw).unwrap();
	assert_eq!(
		metadata,
		json!({
			"key": "P-3",
			"id": "13",
			"url": "https://example.atlassian.net/browse/P-3",
			"type": "Story",
			"status": "Open",
			"summary": "Pay by card",
			"reporter": "Ann Reporter",
			"assignee": null,
			"updated": "2024-05-01T12:00:00.000+0000",
			"parent": { "key": "P-2", "type": "Epic" },
		})
	);

	let top: Value = serde_json::from_str(&ctx.read("INI-P-1-Payments/metadata.json")).unwrap();
	assert!(top.get("parent").is_none());
}

#[test]
fn test_ticket_document_with_comments() {
	let ctx = TestContext::new();
	let mut story = with_parent(issue("P-3", "Story", "Pay by card"), "P-2", "Epic");
	story["description"] = json!("Card payments.");
	ctx.setup_mock_state(&json!({
		"issues": [issue("P-2", "Epic", "Checkout"), story],
		"comments": {
			"P-3": [{ "author": "Bob", "updated": "2024-05-02T09:00:00.000+0000", "body": "Looks good" }]
		}
	}));

	let (status, _, stderr) = ctx.run(&[]);
	assert!(status.success(), "stderr: {stderr}");

	let expected = "# P-3: Pay by card\n\n\
		# Metadata\n\n\
		- Type: Story\n\
		- Status: Open\n\
		- Reporter: Ann Reporter\n\
		- Assignee: Unassigned\n\
		- Updated: 2024-05-01T12:00:00.000+0000\n\
		- URL: https://example.atlassian.net/browse/P-3\n\
		- Parent: [P-2](https://example.atlassian.net/browse/P-2)\n\n\
		# Description\n\n\
		Card payments.\n\n\
		# Comments\n\n\
		## Bob - 2024-05-02T09:00:00.000+0000\n\n\
		Looks good\n\n\n";
	assert_eq!(ctx.read("EPIC-P-2-Checkout/STORY-P-3-Pay by card/ticket.md"), expected);

	let epic = ctx.read("EPIC-P-2-Checkout/ticket.md");
	assert!(epic.contains("# Description\n\n_No description provided_\n\n"));
	assert!(!epic.contains("# Comments"));
}

#[test]
fn test_unknown_parent_goes_to_unassigned() {
	let ctx = TestContext::new();
	ctx.setup_mock_state(&json!({
		"issues": [
			with_parent(issue("P-7", "Task", "Orphan"), "X-99", "Epic"),
			with_epic_link(issue("P-8", "Story", "Linked"), "P-9"),
		]
	}));

	let (status, _, stderr) = ctx.run(&[]);
	assert!(status.success(), "stderr: {stderr}");

	assert!(ctx.exists("0-UNASSIGNED/TASK-P-7-Orphan/metadata.json"), "tree:\n{}", ctx.tree());
	assert!(ctx.exists("0-UNASSIGNED/STORY-P-8-Linked/metadata.json"), "tree:\n{}", ctx.tree());

	// the recorded parent is whatever the ticket points at, even outside the export
	let metadata: Value = serde_json::from_str(&ctx.read("0-UNASSIGNED/STORY-P-8-Linked/metadata.json")).unwrap();
	assert_eq!(metadata["parent"], json!({ "key": "P-9", "type": "Epic" }));

	assert!(ctx.trace().has_warning("parent not part of this export"));
}

#[test]
fn test_epic_link_nests_story() {
	let ctx = TestContext::new();
	ctx.setup_mock_state(&json!({
		"issues": [
			issue("P-2", "Epic", "Checkout"),
			with_epic_link(issue("P-5", "Story", "Legacy"), "P-2"),
		]
	}));

	let (status, _, stderr) = ctx.run(&[]);
	assert!(status.success(), "stderr: {stderr}");
	assert!(ctx.exists("EPIC-P-2-Checkout/STORY-P-5-Legacy/ticket.md"), "tree:\n{}", ctx.tree());
}

#[test]
fn test_resolve_epic_links_records_real_parent() {
	let ctx = TestContext::new();
	ctx.setup_mock_state(&json!({
		"issues": [
			issue("P-1", "Initiative", "Payments"),
			with_epic_link(issue("P-5", "Story", "Legacy"), "P-1"),
		]
	}));

	let (status, _, stderr) = ctx.run(&["--resolve-epic-links"]);
	assert!(status.success(), "stderr: {stderr}");

	let dir = "INI-P-1-Payments/STORY-P-5-Legacy";
	let metadata: Value = serde_json::from_str(&ctx.read(&format!("{dir}/metadata.json"))).unwrap();
	assert_eq!(metadata["parent"], json!({ "key": "P-1", "type": "Initiative" }));
	assert!(ctx.read(&format!("{dir}/ticket.md")).contains("- Parent: [P-1](https://example.atlassian.net/browse/P-1) - Payments\n"));
	assert_traced!(ctx.trace(), "fetch_issue", "P-1");
}

#[test]
fn test_long_summary_is_truncated() {
	let ctx = TestContext::new();
	let summary = "a".repeat(60);
	ctx.setup_mock_state(&json!({ "issues": [issue("P-4", "Task", &summary)] }));

	let (status, _, stderr) = ctx.run(&[]);
	assert!(status.success(), "stderr: {stderr}");

	let leaf = format!("TASK-P-4-{}...", "a".repeat(47));
	assert!(ctx.exists(&format!("0-UNASSIGNED/{leaf}/ticket.md")), "tree:\n{}", ctx.tree());
	// the document keeps the full summary
	assert!(ctx.read(&format!("0-UNASSIGNED/{leaf}/ticket.md")).starts_with(&format!("# P-4: {summary}\n")));
}

#[test]
fn test_rerun_refuses_non_empty_output() {
	let ctx = TestContext::new();
	ctx.setup_mock_state(&checkout_board());

	let (status, _, _) = ctx.run(&[]);
	assert!(status.success());
	let before = ctx.tree();

	let (status, _, stderr) = ctx.run(&[]);
	assert_eq!(status.code(), Some(2), "stderr: {stderr}");
	assert!(stderr.contains("is not empty"), "stderr: {stderr}");
	assert_eq!(ctx.tree(), before);
}

#[test]
fn test_clean_replaces_previous_export() {
	let ctx = TestContext::new();
	ctx.setup_mock_state(&checkout_board());
	let (status, _, _) = ctx.run(&[]);
	assert!(status.success());
	std::fs::write(ctx.output.join("stale.txt"), "left over").unwrap();

	ctx.setup_mock_state(&json!({ "issues": [issue("P-4", "Task", "Update docs")] }));
	let (status, stdout, stderr) = ctx.run(&["--clean"]);
	assert!(status.success(), "stderr: {stderr}");
	assert!(stdout.contains("Synced 1 issues"), "stdout: {stdout}");

	insta::assert_snapshot!(ctx.tree(), @r"
	0-UNASSIGNED
	0-UNASSIGNED/TASK-P-4-Update docs
	0-UNASSIGNED/TASK-P-4-Update docs/metadata.json
	0-UNASSIGNED/TASK-P-4-Update docs/ticket.md
	");
}

#[test]
fn test_output_is_a_file() {
	let ctx = TestContext::new();
	ctx.setup_mock_state(&checkout_board());
	std::fs::write(&ctx.output, "not a dir").unwrap();

	let (status, _, stderr) = ctx.run(&[]);
	assert_eq!(status.code(), Some(2), "stderr: {stderr}");
	assert!(stderr.contains("not a directory"), "stderr: {stderr}");
}

#[test]
fn test_single_ticket() {
	let ctx = TestContext::new();
	ctx.setup_mock_state(&checkout_board());

	let (status, stdout, stderr) = ctx.run(&["P-2"]);
	assert!(status.success(), "stderr: {stderr}");
	assert!(stdout.contains("Synced 1 issues"), "stdout: {stdout}");

	// its initiative is not exported, so the epic sits at the top
	insta::assert_snapshot!(ctx.tree(), @r"
	0-UNASSIGNED
	EPIC-P-2-Checkout
	EPIC-P-2-Checkout/metadata.json
	EPIC-P-2-Checkout/ticket.md
	");
	assert!(!ctx.trace().has_mock_call("search"));
}

#[test]
fn test_single_ticket_recursive() {
	let ctx = TestContext::new();
	ctx.setup_mock_state(&checkout_board());

	let (status, stdout, stderr) = ctx.run(&["P-1", "--recursive"]);
	assert!(status.success(), "stderr: {stderr}");
	assert!(stdout.contains("Synced 3 issues"), "stdout: {stdout}");
	assert!(ctx.exists("INI-P-1-Payments/EPIC-P-2-Checkout/STORY-P-3-Pay by card/ticket.md"), "tree:\n{}", ctx.tree());
	assert!(!ctx.exists("0-UNASSIGNED/TASK-P-4-Update docs"));
}

#[test]
fn test_unknown_ticket_fails() {
	let ctx = TestContext::new();
	ctx.setup_mock_state(&checkout_board());

	let (status, _, stderr) = ctx.run(&["P-404"]);
	assert_eq!(status.code(), Some(2), "stderr: {stderr}");
	assert!(stderr.contains("Issue P-404 not found"), "stderr: {stderr}");
}

#[test]
fn test_limit() {
	let ctx = TestContext::new();
	ctx.setup_mock_state(&checkout_board());

	let (status, stdout, stderr) = ctx.run(&["--limit", "2"]);
	assert!(status.success(), "stderr: {stderr}");
	assert!(stdout.contains("Synced 2 issues"), "stdout: {stdout}");
	assert!(ctx.exists("INI-P-1-Payments/EPIC-P-2-Checkout/metadata.json"), "tree:\n{}", ctx.tree());
	assert!(!ctx.exists("0-UNASSIGNED/TASK-P-4-Update docs"));
}

#[test]
fn test_board_pages_through_results() {
	let mut ctx = TestContext::new();
	ctx.set_env("JIRA_PAGE_SIZE", Some("3"));
	ctx.setup_mock_state(&checkout_board());

	let (status, stdout, stderr) = ctx.run(&[]);
	assert!(status.success(), "stderr: {stderr}");
	assert!(stdout.contains("Synced 4 issues"), "stdout: {stdout}");
	assert_eq!(ctx.trace().count("search"), 2);
}

#[test]
fn test_comments_fetched_for_every_ticket() {
	let ctx = TestContext::new();
	ctx.setup_mock_state(&checkout_board());

	let (status, _, stderr) = ctx.run(&[]);
	assert!(status.success(), "stderr: {stderr}");

	let trace = ctx.trace();
	assert_traced!(trace, "search");
	for key in ["P-1", "P-2", "P-3", "P-4"] {
		assert_traced!(trace, "fetch_comments", key);
	}
	assert_eq!(trace.count("fetch_comments"), 4);
}

#[test]
fn test_network_error_aborts_run() {
	let ctx = TestContext::new();
	let mut state = checkout_board();
	state["failing_comments"] = json!(["P-2"]);
	ctx.setup_mock_state(&state);

	let (status, _, stderr) = ctx.run(&[]);
	assert_eq!(status.code(), Some(2), "stderr: {stderr}");
	assert!(stderr.contains("Failed to fetch comments for P-2"), "stderr: {stderr}");

	insta::assert_snapshot!(ctx.tree(), @r"
	0-UNASSIGNED
	INI-P-1-Payments
	INI-P-1-Payments/metadata.json
	INI-P-1-Payments/ticket.md
	");
}
