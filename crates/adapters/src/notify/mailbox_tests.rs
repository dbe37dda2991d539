// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::notify::NotificationKind;

fn message(n: u32) -> Notification {
    Notification {
        kind: NotificationKind::Confirmation,
        booking_id: format!("BSC-{n}").into(),
        recipient: "jane@example.com".into(),
        subject: format!("Booking {n}"),
        body: "line one\nline two".into(),
    }
}

#[tokio::test]
async fn spools_one_line_per_message() {
    let dir = tempfile::tempdir().unwrap();
    let mailbox = MailboxAdapter::new(dir.path().join("outbox").join("mail.jsonl"));

    mailbox.send(&message(1)).await.unwrap();
    mailbox.send(&message(2)).await.unwrap();

    let content = std::fs::read_to_string(mailbox.path()).unwrap();
    assert_eq!(content.lines().count(), 2);
    assert_eq!(mailbox.read_all().await.unwrap(), vec![message(1), message(2)]);
}

#[tokio::test]
async fn empty_mailbox_reads_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let mailbox = MailboxAdapter::new(dir.path().join("mail.jsonl"));
    assert!(mailbox.read_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn concurrent_sends_do_not_interleave() {
    let dir = tempfile::tempdir().unwrap();
    let mailbox = MailboxAdapter::new(dir.path().join("mail.jsonl"));

    let mut tasks = Vec::new();
    for n in 0..20 {
        let mailbox = mailbox.clone();
        tasks.push(tokio::spawn(async move { mailbox.send(&message(n)).await }));
    }
    for task in tasks {
        task.await.unwrap().unwrap();
    }
    assert_eq!(mailbox.read_all().await.unwrap().len(), 20);
}
